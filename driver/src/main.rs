//! `driver` CLI: step and restart a Hermes-3 transport run, or query the
//! processor count a mesh supports.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use driver::core::error::{DecompositionError, RequestFailure};
use driver::core::topology::DEFAULT_GUARD_CELLS;
use driver::exit_codes;
use driver::io::config::load_config;
use driver::io::gridgen::CommandGenerator;
use driver::io::launcher::MpiLauncher;
use driver::nproc::choose_processor_count;
use driver::step::{Driver, run_restart};

#[derive(Parser)]
#[command(
    name = "driver",
    version,
    about = "Mesh generation and restartable transport runs"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the mesh (if configured) and run one transport solver step.
    Step {
        /// Workspace root holding `.driver/` state and the options file.
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Configuration file.
        #[arg(long, default_value = "driver.toml")]
        config: PathBuf,
        /// Simulation time of this step, for logging.
        #[arg(long, default_value_t = 0.0)]
        timestamp: f64,
    },
    /// Make the next step start a fresh solve instead of restarting.
    Restart {
        #[arg(long, default_value = ".")]
        root: PathBuf,
    },
    /// Print the largest usable processor count for a mesh.
    Nproc {
        /// Mesh metadata file (`name = value` lines).
        #[arg(long)]
        mesh: PathBuf,
        /// Upper bound on the processor count.
        #[arg(long, allow_negative_numbers = true)]
        max: u32,
        #[arg(long, default_value_t = DEFAULT_GUARD_CELLS)]
        guard_x: u32,
        #[arg(long, default_value_t = DEFAULT_GUARD_CELLS)]
        guard_y: u32,
    },
}

fn main() {
    driver::logging::init();
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            if !err.use_stderr() {
                err.exit();
            }
            // clap's own usage code is NO_DECOMPOSITION.
            let _ = err.print();
            std::process::exit(exit_codes::INVALID);
        }
    };
    let code = match run(cli) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_code_for(&err)
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Step {
            root,
            config,
            timestamp,
        } => cmd_step(root, config, timestamp),
        Command::Restart { root } => {
            run_restart(&root)?;
            Ok(())
        }
        Command::Nproc {
            mesh,
            max,
            guard_x,
            guard_y,
        } => {
            let choice = choose_processor_count(&mesh, guard_x, guard_y, max)?;
            println!("{}", choice.decomposition.total_processors);
            Ok(())
        }
    }
}

fn cmd_step(root: PathBuf, config: PathBuf, timestamp: f64) -> Result<()> {
    let cfg = load_config(&root.join(config))?;
    let generator = CommandGenerator::new(
        cfg.gridgen
            .as_ref()
            .map(|gridgen| gridgen.command.clone())
            .unwrap_or_default(),
    );
    let launcher = MpiLauncher::new(cfg.launch.command.clone());
    let outcome = Driver::new(&root, &cfg, &generator, &launcher).step(timestamp)?;
    println!(
        "step {} finished on {} processors ({:?})",
        outcome.step, outcome.processors, outcome.launched_as
    );
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<DecompositionError>());
    match kind {
        Some(DecompositionError::InvalidRequest {
            reason: RequestFailure::NoValidDecomposition,
            ..
        }) => exit_codes::NO_DECOMPOSITION,
        _ => exit_codes::INVALID,
    }
}

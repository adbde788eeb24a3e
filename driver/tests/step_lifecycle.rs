//! Multi-step driver scenarios with scripted collaborators.
//!
//! These tests drive `Driver::call` through several steps and restarts to
//! verify the run mode threaded through the persisted state, the restart
//! directive handed to the launcher, and that failures leave state intact.

use driver::core::run_mode::RunMode;
use driver::io::run_state::{RunState, load_run_state};
use driver::step::{Call, CallOutcome, Driver};
use driver::test_support::{
    ScriptedGenerator, ScriptedLauncher, TestWorkspace, double_null_topology,
    single_null_topology,
};

/// Execution sequence:
/// 1. Step → launched fresh, state becomes restarting.
/// 2. Step → launch fails, state unchanged.
/// 3. Step → launched restarting.
/// 4. Restart → state fresh, step count kept.
/// 5. Step → launched fresh again.
#[test]
fn restart_flag_threads_through_steps() {
    let workspace = TestWorkspace::new(&single_null_topology(), 16).expect("workspace");
    let generator = ScriptedGenerator::new();
    let launcher = ScriptedLauncher::new(vec![true, false, true], true);
    let driver = Driver::new(workspace.root(), &workspace.config, &generator, &launcher);

    let first = driver.call(Call::Step { timestamp: 0.0 }).expect("step 1");
    let CallOutcome::Stepped(first) = first else {
        panic!("expected step outcome");
    };
    assert_eq!(first.step, 1);
    assert_eq!(first.launched_as, RunMode::Fresh);
    assert_eq!(first.processors, 16);

    let err = driver
        .call(Call::Step { timestamp: 1.0 })
        .expect_err("step 2 fails");
    assert!(format!("{err:#}").contains("scripted launch failure"));
    assert_eq!(
        load_run_state(&driver.paths.run_state_path).expect("load"),
        RunState {
            mode: RunMode::Restarting,
            steps_completed: 1,
            last_processor_count: Some(16),
        }
    );

    let third = driver.step(1.0).expect("step 3");
    assert_eq!(third.step, 2);
    assert_eq!(third.launched_as, RunMode::Restarting);

    driver.call(Call::Restart).expect("restart");
    let fifth = driver.step(2.0).expect("step 5");
    assert_eq!(fifth.step, 3);
    assert_eq!(fifth.launched_as, RunMode::Fresh);

    let modes: Vec<RunMode> = launcher.requests().iter().map(|r| r.mode).collect();
    assert_eq!(
        modes,
        vec![
            RunMode::Fresh,
            RunMode::Restarting,
            RunMode::Restarting,
            RunMode::Fresh,
        ]
    );
    let logs: Vec<Option<String>> = launcher
        .requests()
        .iter()
        .map(|r| {
            r.log_path
                .file_name()
                .and_then(|name| name.to_str())
                .map(str::to_string)
        })
        .collect();
    assert_eq!(logs[0].as_deref(), Some("step-1.transport.log"));
    assert_eq!(logs[1].as_deref(), Some("step-2.transport.log"));
    assert_eq!(logs[3].as_deref(), Some("step-3.transport.log"));
}

#[test]
fn unsatisfiable_bound_never_launches() {
    let workspace = TestWorkspace::new(&double_null_topology(), 7).expect("workspace");
    let generator = ScriptedGenerator::new();
    let launcher = ScriptedLauncher::succeeding();
    let driver = Driver::new(workspace.root(), &workspace.config, &generator, &launcher);

    let err = driver.step(0.0).expect_err("no decomposition");
    assert!(format!("{err:#}").contains("max_processors=7"));
    assert!(launcher.requests().is_empty());
    assert!(!driver.paths.run_state_path.exists());
}

#[test]
fn options_file_tracks_mesh() {
    let workspace = TestWorkspace::new(&double_null_topology(), 64).expect("workspace");
    let generator = ScriptedGenerator::new();
    let launcher = ScriptedLauncher::succeeding();
    let driver = Driver::new(workspace.root(), &workspace.config, &generator, &launcher);

    let outcome = driver.step(0.0).expect("step");
    assert_eq!(outcome.processors, 40);
    let options = std::fs::read_to_string(&driver.paths.options_path).expect("options");
    assert!(options.contains("file = \"bout.grd.nc\""));
    assert!(options.contains("nx = 24\n"));
    assert_eq!(
        launcher.requests()[0].options_path,
        driver.paths.options_path
    );
}

use super::generate::{self, GeneratedInput};
use crate::core::io::pwscf_output::PwOutput;
use crate::engine::config::SweepConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use rayon::prelude::*;
use std::fs::File;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, info, instrument, warn};

/// How much of a failing run's stderr ends up in the log.
const STDERR_TAIL_LINES: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    Completed,
    /// The output already held a converged energy.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub lattice_angstrom: f64,
    pub status: RunStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionSummary {
    pub outcomes: Vec<RunOutcome>,
}

impl ExecutionSummary {
    fn count(&self, pred: impl Fn(&RunStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }

    pub fn completed(&self) -> usize {
        self.count(|s| matches!(s, RunStatus::Completed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, RunStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, RunStatus::Failed(_)))
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, RunStatus::Failed(_)))
    }

    /// One `a = ... Å (reason)` entry per failed point, comma separated.
    pub fn describe_failures(&self) -> String {
        self.outcomes
            .iter()
            .filter_map(|o| match &o.status {
                RunStatus::Failed(reason) => {
                    Some(format!("a = {:.3} Å ({})", o.lattice_angstrom, reason))
                }
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Runs the configured `pw.x` command on every input of the sweep found in `dir`.
///
/// Each run reads its `.in` file on stdin and writes stdout to the matching `.out`
/// file, mirroring `pw.x < in > out`. At most `max_concurrent` runs are alive at once.
///
/// # Errors
///
/// Fails if an input is missing, the program cannot be launched, or any run exits
/// unsuccessfully (after all runs have finished).
#[instrument(skip_all, name = "execute_workflow", fields(dir = %dir.display()))]
pub fn run(
    config: &SweepConfig,
    dir: &Path,
    reporter: &ProgressReporter,
) -> Result<ExecutionSummary, EngineError> {
    let planned = generate::plan(config, dir);
    if let Some(missing) = planned.iter().find(|p| !p.input_path.exists()) {
        return Err(EngineError::io(
            &missing.input_path,
            io::Error::new(io::ErrorKind::NotFound, "input file not found"),
        ));
    }

    let execution = &config.execution;
    info!(
        "Running '{}' on {} input(s), {} at a time.",
        execution.command.join(" "),
        planned.len(),
        execution.max_concurrent
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(execution.max_concurrent)
        .build()
        .map_err(|e| EngineError::Internal(format!("Failed to build run pool: {}", e)))?;

    reporter.report(Progress::PhaseStart {
        name: "Running calculations",
    });
    reporter.report(Progress::TaskStart {
        total_steps: planned.len() as u64,
    });

    let results: Vec<Result<RunOutcome, EngineError>> = pool.install(|| {
        planned
            .par_iter()
            .map(|point| {
                let outcome = run_point(config, point)?;
                if outcome.status == RunStatus::Skipped {
                    reporter.message(format!(
                        "a = {:.3} Å already converged, skipped",
                        point.lattice_angstrom
                    ));
                }
                reporter.report(Progress::PointDone {
                    lattice_angstrom: point.lattice_angstrom,
                });
                Ok(outcome)
            })
            .collect()
    });

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let outcomes = results.into_iter().collect::<Result<Vec<_>, _>>()?;
    let summary = ExecutionSummary { outcomes };

    info!(
        "Execution finished: {} completed, {} skipped, {} failed.",
        summary.completed(),
        summary.skipped(),
        summary.failed()
    );
    if summary.failed() > 0 {
        return Err(EngineError::Execution { summary });
    }
    Ok(summary)
}

fn run_point(config: &SweepConfig, point: &GeneratedInput) -> Result<RunOutcome, EngineError> {
    let execution = &config.execution;
    if execution.skip_completed && has_converged_output(&point.output_path) {
        debug!(
            "Skipping a = {:.3} Å: {:?} already converged.",
            point.lattice_angstrom, point.output_path
        );
        return Ok(RunOutcome {
            lattice_angstrom: point.lattice_angstrom,
            status: RunStatus::Skipped,
        });
    }

    let stdin = File::open(&point.input_path).map_err(|e| EngineError::io(&point.input_path, e))?;
    let stdout =
        File::create(&point.output_path).map_err(|e| EngineError::io(&point.output_path, e))?;

    let program = &execution.command[0];
    debug!("Launching {} < {:?}", program, point.input_path);
    let output = Command::new(program)
        .args(&execution.command[1..])
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| EngineError::Launch {
            program: program.clone(),
            source,
        })?;

    let status = if output.status.success() {
        RunStatus::Completed
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(STDERR_TAIL_LINES).collect();
        let reason = format!("exited with {}", output.status);
        warn!(
            "Calculation for a = {:.3} Å {}. stderr tail: {}",
            point.lattice_angstrom,
            reason,
            tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
        );
        RunStatus::Failed(reason)
    };

    Ok(RunOutcome {
        lattice_angstrom: point.lattice_angstrom,
        status,
    })
}

fn has_converged_output(path: &Path) -> bool {
    path.exists()
        && PwOutput::read_from_path(path)
            .map(|output| output.is_converged())
            .unwrap_or(false)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::io::pwscf_input::PwParameters;
    use crate::core::lattice::LatticeSweep;
    use crate::engine::config::SweepConfigBuilder;
    use std::fs;
    use std::sync::Mutex;

    fn config_with_command(command: &[&str], skip_completed: bool) -> SweepConfig {
        SweepConfigBuilder::new()
            .sweep(LatticeSweep::new(2.2, 2.4, 3))
            .pw_parameters(PwParameters::default())
            .command(command.iter().map(|s| s.to_string()).collect())
            .max_concurrent(2)
            .skip_completed(skip_completed)
            .build()
            .unwrap()
    }

    #[test]
    fn run_pipes_input_to_output() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with_command(&["cat"], false);
        generate::run(&config, temp.path(), &ProgressReporter::new()).unwrap();

        let summary = run(&config, temp.path(), &ProgressReporter::new()).unwrap();

        assert_eq!(summary.completed(), 3);
        for point in generate::plan(&config, temp.path()) {
            assert_eq!(
                fs::read_to_string(&point.output_path).unwrap(),
                fs::read_to_string(&point.input_path).unwrap()
            );
        }
    }

    #[test]
    fn converged_outputs_are_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with_command(&["cat"], true);
        let planned = generate::run(&config, temp.path(), &ProgressReporter::new()).unwrap();
        fs::write(
            &planned[0].output_path,
            "!    total energy              =    -213.08917263 Ry\n",
        )
        .unwrap();

        let messages = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::Message(text) = event {
                messages.lock().unwrap().push(text);
            }
        }));

        let summary = run(&config, temp.path(), &reporter).unwrap();
        drop(reporter);

        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.completed(), 2);
        assert_eq!(
            messages.into_inner().unwrap(),
            vec!["a = 2.200 Å already converged, skipped".to_string()]
        );
        assert!(
            fs::read_to_string(&planned[0].output_path)
                .unwrap()
                .contains("-213.08917263")
        );
    }

    #[test]
    fn failing_command_is_reported_after_all_runs() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with_command(&["false"], false);
        generate::run(&config, temp.path(), &ProgressReporter::new()).unwrap();

        let result = run(&config, temp.path(), &ProgressReporter::new());

        let Err(EngineError::Execution { summary }) = result else {
            panic!("expected an execution error");
        };
        assert_eq!(summary.failed(), 3);
        assert_eq!(summary.outcomes.len(), 3);
    }

    #[test]
    fn failed_point_is_identified_in_the_error() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with_command(
            &["sh", "-c", "grep -q 'a2.300' && exit 3; cat"],
            false,
        );
        generate::run(&config, temp.path(), &ProgressReporter::new()).unwrap();

        let result = run(&config, temp.path(), &ProgressReporter::new());

        let Err(EngineError::Execution { summary }) = result else {
            panic!("expected an execution error");
        };
        assert_eq!(summary.completed(), 2);
        let failed: Vec<&RunOutcome> = summary.failures().collect();
        assert_eq!(failed.len(), 1);
        assert!((failed[0].lattice_angstrom - 2.3).abs() < 1e-12);
        assert!(matches!(&failed[0].status, RunStatus::Failed(reason) if reason.contains('3')));

        let message = EngineError::Execution { summary }.to_string();
        assert!(message.starts_with("1 of 3 calculation(s) failed"));
        assert!(message.contains("a = 2.300 Å"));
    }

    #[test]
    fn missing_program_is_launch_error() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with_command(&["latsweep-no-such-program"], false);
        generate::run(&config, temp.path(), &ProgressReporter::new()).unwrap();

        let result = run(&config, temp.path(), &ProgressReporter::new());

        assert!(matches!(result, Err(EngineError::Launch { .. })));
    }

    #[test]
    fn missing_inputs_are_rejected_before_launch() {
        let temp = tempfile::tempdir().unwrap();
        let config = config_with_command(&["cat"], false);

        let result = run(&config, temp.path(), &ProgressReporter::new());

        assert!(matches!(result, Err(EngineError::Io { .. })));
    }
}

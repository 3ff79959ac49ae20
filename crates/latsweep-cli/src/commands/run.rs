use crate::cli::RunArgs;
use crate::commands::progress_handler;
use crate::config::{CommandOverrides, build_config};
use crate::error::{CliError, Result};
use crate::utils::parser;
use latsweep::engine::error::EngineError;
use latsweep::engine::progress::ProgressReporter;
use latsweep::workflows::{
    self,
    execute::{ExecutionSummary, RunStatus},
};
use tracing::info;

pub fn run(args: RunArgs, quiet: bool) -> Result<()> {
    let command = args
        .run_command
        .as_deref()
        .map(|text| parser::parse_command(text, "--command"))
        .transpose()
        .map_err(|e| CliError::Argument(e.to_string()))?;
    let overrides = CommandOverrides {
        command,
        max_concurrent: args.jobs,
        rerun: args.rerun,
        ..Default::default()
    };
    let config = build_config(&args.config, &args.sweep, &overrides)?;

    let progress_handler = progress_handler(quiet);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let planned = workflows::generate::plan(&config, &args.dir);
    if planned.iter().any(|p| !p.input_path.exists()) {
        info!("Some inputs are missing; generating the sweep first.");
        let generated = workflows::generate::run(&config, &args.dir, &reporter)?;
        println!(
            "Generated {} input files in '{}/' directory",
            generated.len(),
            args.dir.display()
        );
    }

    println!(
        "Running '{}' on {} input file(s), {} at a time...",
        config.execution.command.join(" "),
        planned.len(),
        config.execution.max_concurrent
    );
    let summary = match workflows::execute::run(&config, &args.dir, &reporter) {
        Ok(summary) => summary,
        Err(EngineError::Execution { summary }) => {
            print_failures(&summary);
            return Err(EngineError::Execution { summary }.into());
        }
        Err(e) => return Err(e.into()),
    };

    println!(
        "\n{} completed, {} skipped. Analyze with: latsweep analyze -d {}",
        summary.completed(),
        summary.skipped(),
        args.dir.display()
    );
    Ok(())
}

fn print_failures(summary: &ExecutionSummary) {
    println!(
        "\n{} of {} calculation(s) failed:",
        summary.failed(),
        summary.outcomes.len()
    );
    for outcome in summary.failures() {
        if let RunStatus::Failed(reason) = &outcome.status {
            println!("  a = {:.3} Å: {}", outcome.lattice_angstrom, reason);
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cli::{ConfigArgs, SweepOverrides};
    use std::fs;

    fn run_args(dir: &std::path::Path, command: &str) -> RunArgs {
        RunArgs {
            config: ConfigArgs::default(),
            sweep: SweepOverrides {
                points: Some(2),
                ..Default::default()
            },
            dir: dir.to_path_buf(),
            run_command: Some(command.to_string()),
            jobs: Some(2),
            rerun: false,
        }
    }

    #[test]
    fn missing_inputs_are_generated_before_running() {
        let temp = tempfile::tempdir().unwrap();

        run(run_args(temp.path(), "cat"), true).unwrap();

        let output = fs::read_to_string(temp.path().join("cu_a2.900.out")).unwrap();
        assert!(output.contains("celldm(1) = 5.48020795"));
    }

    #[test]
    fn failing_runs_fail_the_command() {
        let temp = tempfile::tempdir().unwrap();

        let result = run(run_args(temp.path(), "false"), true);

        let Err(CliError::Core(EngineError::Execution { summary })) = result else {
            panic!("expected an execution failure");
        };
        assert_eq!(summary.failed(), 2);
        assert!(
            summary
                .failures()
                .any(|o| (o.lattice_angstrom - 2.9).abs() < 1e-12)
        );
    }

    #[test]
    fn blank_command_is_rejected() {
        let temp = tempfile::tempdir().unwrap();

        let result = run(run_args(temp.path(), "   "), true);

        assert!(matches!(result, Err(CliError::Argument(_))));
    }
}

use crate::core::io::pwscf_input::PwInput;
use crate::core::units::angstrom_to_bohr;
use crate::engine::config::SweepConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// One point of the sweep and the files that belong to it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedInput {
    pub lattice_angstrom: f64,
    pub lattice_bohr: f64,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

/// Lists the sweep points and their file paths under `dir` without touching the disk.
pub fn plan(config: &SweepConfig, dir: &Path) -> Vec<GeneratedInput> {
    config
        .sweep
        .points()
        .into_iter()
        .map(|a| GeneratedInput {
            lattice_angstrom: a,
            lattice_bohr: angstrom_to_bohr(a),
            input_path: config.input_path(dir, a),
            output_path: config.output_path(dir, a),
        })
        .collect()
}

/// Writes one SCF input per lattice parameter into `output_dir`, creating it if needed.
///
/// Existing inputs with the same name are overwritten. The returned list follows the
/// sweep order.
#[instrument(skip_all, name = "generate_workflow", fields(dir = %output_dir.display()))]
pub fn run(
    config: &SweepConfig,
    output_dir: &Path,
    reporter: &ProgressReporter,
) -> Result<Vec<GeneratedInput>, EngineError> {
    fs::create_dir_all(output_dir).map_err(|e| EngineError::io(output_dir, e))?;

    let planned = plan(config, output_dir);
    info!(
        "Generating {} input file(s) for {} {}.",
        planned.len(),
        config.pw.lattice,
        config.pw.species.symbol
    );

    reporter.report(Progress::PhaseStart {
        name: "Generating inputs",
    });
    reporter.report(Progress::TaskStart {
        total_steps: planned.len() as u64,
    });

    for point in &planned {
        let input = PwInput::new(
            &config.pw,
            &config.prefix(point.lattice_angstrom),
            point.lattice_angstrom,
        );
        input
            .write_to_path(&point.input_path)
            .map_err(|e| EngineError::io(&point.input_path, e))?;
        debug!(
            "Wrote {:?} (a = {:.3} Å, celldm(1) = {:.6} Bohr)",
            point.input_path, point.lattice_angstrom, point.lattice_bohr
        );
        reporter.report(Progress::PointDone {
            lattice_angstrom: point.lattice_angstrom,
        });
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(planned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::pwscf_input::PwParameters;
    use crate::core::lattice::LatticeSweep;
    use crate::engine::config::SweepConfigBuilder;
    use std::sync::Mutex;

    fn copper_config(points: usize) -> SweepConfig {
        SweepConfigBuilder::new()
            .sweep(LatticeSweep::new(2.2, 2.9, points))
            .pw_parameters(PwParameters::default())
            .build()
            .unwrap()
    }

    #[test]
    fn run_writes_one_input_per_point_into_new_directory() {
        let temp = tempfile::tempdir().unwrap();
        let dir = temp.path().join("calculations");

        let generated = run(&copper_config(12), &dir, &ProgressReporter::new()).unwrap();

        assert_eq!(generated.len(), 12);
        assert_eq!(generated[0].input_path, dir.join("cu_a2.200.in"));
        assert_eq!(generated[11].output_path, dir.join("cu_a2.900.out"));
        for point in &generated {
            assert!(point.input_path.exists());
            assert!(!point.output_path.exists());
        }

        let first = fs::read_to_string(&generated[0].input_path).unwrap();
        assert!(first.contains("prefix = 'cu_sc_a2.200'"));
        assert!(first.contains("celldm(1) = 4.15739913"));
    }

    #[test]
    fn run_reports_each_point() {
        let temp = tempfile::tempdir().unwrap();
        let done = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::PointDone { lattice_angstrom } = event {
                done.lock().unwrap().push(lattice_angstrom);
            }
        }));

        run(&copper_config(3), temp.path(), &reporter).unwrap();
        drop(reporter);

        let done = done.into_inner().unwrap();
        assert_eq!(done.len(), 3);
        assert!((done[1] - 2.55).abs() < 1e-12);
    }

    #[test]
    fn run_fails_when_directory_cannot_be_created() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("file");
        fs::write(&blocker, "").unwrap();

        let result = run(
            &copper_config(2),
            &blocker.join("calculations"),
            &ProgressReporter::new(),
        );

        assert!(matches!(result, Err(EngineError::Io { .. })));
    }
}

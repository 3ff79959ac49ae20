use crate::core::fit::eos::{BirchMurnaghanParams, fit_birch_murnaghan};
use crate::core::fit::polynomial::{Polynomial, grid_minimum, linspace};
use crate::core::io::naming::OutputNamePattern;
use crate::core::io::pwscf_output::PwOutput;
use crate::core::io::results::EnergyPoint;
use crate::core::plot::tikz::{self, EnergyPlot};
use crate::core::units::{angstrom_to_bohr, rydberg_to_ev};
use crate::engine::config::SweepConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Output `alat` values are printed with four decimals.
const ALAT_TOLERANCE_BOHR: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equilibrium {
    pub lattice_angstrom: f64,
    pub energy_ev: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    /// Converged points sorted by lattice parameter.
    pub points: Vec<EnergyPoint>,
    /// Outputs that matched the naming pattern but held no final energy.
    pub skipped: Vec<PathBuf>,
    pub polynomial: Polynomial,
    /// The fitted polynomial evaluated on the dense grid used to find the minimum.
    pub curve: Vec<(f64, f64)>,
    pub equilibrium: Equilibrium,
    pub birch_murnaghan: Option<BirchMurnaghanParams>,
}

impl AnalysisReport {
    /// Lattice parameter corresponding to the Birch–Murnaghan equilibrium volume.
    pub fn birch_murnaghan_lattice(&self, config: &SweepConfig) -> Option<f64> {
        let unit_volume = config.pw.lattice.volume_per_atom(1.0);
        self.birch_murnaghan
            .map(|params| (params.v0 / unit_volume).cbrt())
    }

    pub fn render_tikz(&self, config: &SweepConfig) -> String {
        let points: Vec<(f64, f64)> = self
            .points
            .iter()
            .map(|p| (p.lattice_angstrom, p.energy_ev))
            .collect();
        let plot = EnergyPlot {
            title: format!(
                "Energy vs Lattice Parameter for {} {}",
                config.pw.lattice, config.pw.species.symbol
            ),
            points: &points,
            curve: &self.curve,
            curve_samples: config.analysis.curve_samples,
            fit_degree: self.polynomial.degree(),
            equilibrium: self.equilibrium.lattice_angstrom,
            margin: config.analysis.plot_margin,
        };
        tikz::render(&plot)
    }
}

/// Output files in `dir` that belong to this sweep, sorted by name.
pub fn find_outputs(config: &SweepConfig, dir: &Path) -> Result<Vec<(f64, PathBuf)>, EngineError> {
    let pattern = OutputNamePattern::new(&config.file_stem)
        .map_err(|e| EngineError::Internal(format!("Invalid output name pattern: {}", e)))?;

    let mut outputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| EngineError::io(dir, e))? {
        let entry = entry.map_err(|e| EngineError::io(dir, e))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if let Some(a) = pattern.lattice_parameter(name) {
            outputs.push((a, entry.path()));
        }
    }
    outputs.sort_by(|(_, p1), (_, p2)| p1.cmp(p2));
    Ok(outputs)
}

/// Reads every output of the sweep in parallel and returns the converged points sorted
/// by lattice parameter, together with the outputs that had no final energy.
pub fn collect_points(
    config: &SweepConfig,
    dir: &Path,
    reporter: &ProgressReporter,
) -> Result<(Vec<EnergyPoint>, Vec<PathBuf>), EngineError> {
    let outputs = find_outputs(config, dir)?;
    debug!("Found {} output file(s) in {:?}", outputs.len(), dir);

    reporter.report(Progress::TaskStart {
        total_steps: outputs.len() as u64,
    });
    let parsed: Vec<Result<(f64, PathBuf, PwOutput), EngineError>> = outputs
        .into_par_iter()
        .map(|(a, path)| {
            let output =
                PwOutput::read_from_path(&path).map_err(|source| EngineError::Output {
                    path: path.clone(),
                    source,
                })?;
            reporter.report(Progress::PointDone {
                lattice_angstrom: a,
            });
            Ok((a, path, output))
        })
        .collect();
    reporter.report(Progress::TaskFinish);

    let atoms = config.pw.lattice.atoms_per_cell() as f64;
    let mut points = Vec::new();
    let mut skipped = Vec::new();
    for result in parsed {
        let (a, path, output) = result?;
        let Some(energy_ry) = output.total_energy_ry else {
            warn!("No final total energy in {:?}; skipping.", path);
            reporter.message(format!(
                "a = {:.3} Å: no final energy in {}, skipped",
                a,
                path.display()
            ));
            skipped.push(path);
            continue;
        };
        if let Some(alat) = output.alat_bohr {
            let expected = angstrom_to_bohr(a);
            if (alat - expected).abs() > ALAT_TOLERANCE_BOHR {
                warn!(
                    "{:?} reports alat = {:.4} Bohr but its name implies {:.4} Bohr.",
                    path, alat, expected
                );
            }
        }
        points.push(EnergyPoint {
            lattice_angstrom: a,
            volume_per_atom: config.pw.lattice.volume_per_atom(a),
            energy_ev: rydberg_to_ev(energy_ry) / atoms,
        });
    }

    points.sort_by(|p1, p2| p1.lattice_angstrom.total_cmp(&p2.lattice_angstrom));
    Ok((points, skipped))
}

/// Extracts the sweep energies from `dir`, fits them and locates the equilibrium
/// lattice parameter.
///
/// The equilibrium is the lowest point of the fitted polynomial on a dense grid spanning
/// the calculated lattice parameters. A third-order Birch–Murnaghan fit on volume per
/// atom is attempted as well when at least four points are available; its failure is
/// logged and does not abort the analysis.
///
/// # Errors
///
/// Returns [`EngineError::NoEnergies`] when no output holds a final energy and
/// [`EngineError::Fit`] when there are too few points for the polynomial degree.
#[instrument(skip_all, name = "analyze_workflow", fields(dir = %dir.display()))]
pub fn run(
    config: &SweepConfig,
    dir: &Path,
    reporter: &ProgressReporter,
) -> Result<AnalysisReport, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Reading outputs",
    });
    let (points, skipped) = collect_points(config, dir, reporter)?;
    reporter.report(Progress::PhaseFinish);

    if points.is_empty() {
        return Err(EngineError::NoEnergies {
            dir: dir.to_path_buf(),
        });
    }
    info!(
        "Extracted {} energies ({} output(s) skipped).",
        points.len(),
        skipped.len()
    );

    reporter.report(Progress::PhaseStart { name: "Fitting" });
    let lattices: Vec<f64> = points.iter().map(|p| p.lattice_angstrom).collect();
    let energies: Vec<f64> = points.iter().map(|p| p.energy_ev).collect();

    let polynomial = Polynomial::fit(&lattices, &energies, config.analysis.polynomial_degree)?;
    let (a_min, a_max) = (lattices[0], lattices[lattices.len() - 1]);
    let curve: Vec<(f64, f64)> = linspace(a_min, a_max, config.analysis.grid_points)
        .into_iter()
        .map(|a| (a, polynomial.eval(a)))
        .collect();
    let (lattice_angstrom, energy_ev) =
        grid_minimum(&polynomial, a_min, a_max, config.analysis.grid_points).ok_or_else(
            || EngineError::Internal("Evaluation grid for the minimum is empty".to_string()),
        )?;
    info!(
        "Equilibrium lattice parameter {:.4} Å at {:.6} eV/atom.",
        lattice_angstrom, energy_ev
    );

    let birch_murnaghan = if points.len() >= 4 {
        let volumes: Vec<f64> = points.iter().map(|p| p.volume_per_atom).collect();
        match fit_birch_murnaghan(&volumes, &energies) {
            Ok(params) => {
                debug!("Birch–Murnaghan fit: {:?}", params);
                Some(params)
            }
            Err(e) => {
                warn!("Birch–Murnaghan fit failed: {}", e);
                None
            }
        }
    } else {
        debug!("Fewer than four points; skipping the Birch–Murnaghan fit.");
        None
    };
    reporter.report(Progress::PhaseFinish);

    Ok(AnalysisReport {
        points,
        skipped,
        polynomial,
        curve,
        equilibrium: Equilibrium {
            lattice_angstrom,
            energy_ev,
        },
        birch_murnaghan,
    })
}

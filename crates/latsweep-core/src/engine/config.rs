use crate::core::io::naming;
use crate::core::io::pwscf_input::PwParameters;
use crate::core::lattice::{LatticeError, LatticeSweep};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    Invalid {
        parameter: &'static str,
        reason: String,
    },
}

impl From<LatticeError> for ConfigError {
    fn from(e: LatticeError) -> Self {
        ConfigError::Invalid {
            parameter: "sweep",
            reason: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub polynomial_degree: usize,
    pub grid_points: usize,
    pub curve_samples: usize,
    /// Fraction of the energy range added above and below the equilibrium marker.
    pub plot_margin: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            polynomial_degree: 4,
            grid_points: 1000,
            curve_samples: 100,
            plot_margin: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    /// Program and leading arguments, e.g. `["mpirun", "-np", "4", "pw.x"]`.
    pub command: Vec<String>,
    pub max_concurrent: usize,
    pub skip_completed: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            command: vec!["pw.x".to_string()],
            max_concurrent: 1,
            skip_completed: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub sweep: LatticeSweep,
    pub pw: PwParameters,
    pub file_stem: String,
    pub analysis: AnalysisConfig,
    pub execution: ExecutionConfig,
}

impl SweepConfig {
    pub fn prefix(&self, a_angstrom: f64) -> String {
        naming::calculation_prefix(&self.file_stem, self.pw.lattice, a_angstrom)
    }

    pub fn input_path(&self, dir: &Path, a_angstrom: f64) -> PathBuf {
        dir.join(naming::input_file_name(&self.file_stem, a_angstrom))
    }

    pub fn output_path(&self, dir: &Path, a_angstrom: f64) -> PathBuf {
        dir.join(naming::output_file_name(&self.file_stem, a_angstrom))
    }
}

#[derive(Default)]
pub struct SweepConfigBuilder {
    sweep: Option<LatticeSweep>,
    pw: Option<PwParameters>,
    file_stem: Option<String>,
    analysis: AnalysisConfig,
    execution: ExecutionConfig,
}

impl SweepConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sweep(mut self, sweep: LatticeSweep) -> Self {
        self.sweep = Some(sweep);
        self
    }
    pub fn pw_parameters(mut self, params: PwParameters) -> Self {
        self.pw = Some(params);
        self
    }
    pub fn file_stem(mut self, stem: impl Into<String>) -> Self {
        self.file_stem = Some(stem.into());
        self
    }
    pub fn polynomial_degree(mut self, degree: usize) -> Self {
        self.analysis.polynomial_degree = degree;
        self
    }
    pub fn grid_points(mut self, n: usize) -> Self {
        self.analysis.grid_points = n;
        self
    }
    pub fn curve_samples(mut self, n: usize) -> Self {
        self.analysis.curve_samples = n;
        self
    }
    pub fn plot_margin(mut self, fraction: f64) -> Self {
        self.analysis.plot_margin = fraction;
        self
    }
    pub fn command(mut self, command: Vec<String>) -> Self {
        self.execution.command = command;
        self
    }
    pub fn max_concurrent(mut self, n: usize) -> Self {
        self.execution.max_concurrent = n;
        self
    }
    pub fn skip_completed(mut self, skip: bool) -> Self {
        self.execution.skip_completed = skip;
        self
    }

    /// Validates and assembles the configuration.
    ///
    /// The file stem defaults to the lowercase element symbol (`Cu` gives `cu`).
    pub fn build(self) -> Result<SweepConfig, ConfigError> {
        let sweep = self.sweep.ok_or(ConfigError::MissingParameter("sweep"))?;
        sweep.validate()?;
        let mut names = HashSet::new();
        if let Some(a) = sweep
            .points()
            .into_iter()
            .find(|&a| !names.insert(naming::input_file_name("", a)))
        {
            return Err(invalid(
                "sweep",
                &format!(
                    "two points share the file name label a{:.3}; use fewer points or a wider range",
                    a
                ),
            ));
        }
        let pw = self.pw.ok_or(ConfigError::MissingParameter("pw_parameters"))?;

        let file_stem = self
            .file_stem
            .unwrap_or_else(|| pw.species.symbol.to_lowercase());
        if file_stem.is_empty() || file_stem.contains(['/', '\\']) {
            return Err(invalid("file_stem", "must be a non-empty file name"));
        }
        if pw.species.symbol.trim().is_empty() {
            return Err(invalid("species.symbol", "must not be empty"));
        }
        if !is_positive(pw.species.mass) {
            return Err(invalid("species.mass", "must be positive"));
        }
        if !is_positive(pw.ecutwfc) {
            return Err(invalid("ecutwfc", "must be positive"));
        }
        if pw.kpoints.mesh.contains(&0) {
            return Err(invalid("kpoints.mesh", "every dimension must be at least 1"));
        }
        if pw.kpoints.shift.iter().any(|&s| s > 1) {
            return Err(invalid("kpoints.shift", "each shift must be 0 or 1"));
        }

        let analysis = self.analysis;
        if analysis.polynomial_degree == 0 {
            return Err(invalid("polynomial_degree", "must be at least 1"));
        }
        if analysis.grid_points < 2 {
            return Err(invalid("grid_points", "must be at least 2"));
        }
        if analysis.curve_samples < 2 {
            return Err(invalid("curve_samples", "must be at least 2"));
        }
        if !is_positive(analysis.plot_margin) {
            return Err(invalid("plot_margin", "must be positive"));
        }

        let execution = self.execution;
        if execution.command.is_empty() || execution.command[0].trim().is_empty() {
            return Err(invalid("command", "must name a program"));
        }
        if execution.max_concurrent == 0 {
            return Err(invalid("max_concurrent", "must be at least 1"));
        }

        Ok(SweepConfig {
            sweep,
            pw,
            file_stem,
            analysis,
            execution,
        })
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(parameter: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        parameter,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_builder() -> SweepConfigBuilder {
        SweepConfigBuilder::new()
            .sweep(LatticeSweep::new(2.2, 2.9, 12))
            .pw_parameters(PwParameters::default())
    }

    #[test]
    fn build_fills_defaults_and_derives_stem() {
        let config = minimal_builder().build().unwrap();
        assert_eq!(config.file_stem, "cu");
        assert_eq!(config.analysis, AnalysisConfig::default());
        assert_eq!(config.execution.command, vec!["pw.x".to_string()]);
    }

    #[test]
    fn build_fails_without_sweep() {
        let result = SweepConfigBuilder::new()
            .pw_parameters(PwParameters::default())
            .build();
        assert_eq!(result, Err(ConfigError::MissingParameter("sweep")));
    }

    #[test]
    fn build_rejects_invalid_sweep_and_analysis_settings() {
        let result = minimal_builder()
            .sweep(LatticeSweep::new(2.2, 2.9, 0))
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                parameter: "sweep",
                ..
            })
        ));

        let result = minimal_builder().polynomial_degree(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                parameter: "polynomial_degree",
                ..
            })
        ));

        let result = minimal_builder().max_concurrent(0).build();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                parameter: "max_concurrent",
                ..
            })
        ));
    }

    #[test]
    fn build_rejects_sweeps_with_colliding_file_names() {
        let result = minimal_builder()
            .sweep(LatticeSweep::new(2.2, 2.201, 5))
            .build();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid {
                parameter: "sweep",
                ref reason,
            }) if reason.contains("a2.200")
        ));

        assert!(
            minimal_builder()
                .sweep(LatticeSweep::new(2.2, 2.204, 5))
                .build()
                .is_ok()
        );
        assert!(
            minimal_builder()
                .sweep(LatticeSweep::new(2.3, 2.3, 1))
                .build()
                .is_ok()
        );
    }

    #[test]
    fn build_requires_a_positive_plot_margin() {
        for margin in [0.0, -0.1, f64::NAN] {
            let result = minimal_builder().plot_margin(margin).build();
            assert!(matches!(
                result,
                Err(ConfigError::Invalid {
                    parameter: "plot_margin",
                    ..
                })
            ));
        }
        assert!(minimal_builder().plot_margin(0.05).build().is_ok());
    }

    #[test]
    fn paths_and_prefix_follow_naming_scheme() {
        let config = minimal_builder().file_stem("copper").build().unwrap();
        let dir = Path::new("calculations");
        assert_eq!(
            config.input_path(dir, 2.2),
            PathBuf::from("calculations/copper_a2.200.in")
        );
        assert_eq!(
            config.output_path(dir, 2.2),
            PathBuf::from("calculations/copper_a2.200.out")
        );
        assert_eq!(config.prefix(2.2), "copper_sc_a2.200");
    }
}

use super::defaults::DefaultsConfig;
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSweepConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_points: Option<usize>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileStructureConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lattice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mass: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pseudopotential: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileCalculationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outdir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pseudo_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ecutwfc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupations: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smearing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degauss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_dft: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conv_thr: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixing_beta: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpoints: Option<[u32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kpoint_shift: Option<[u32; 3]>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileAnalysisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polynomial_degree: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_points: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub curve_samples: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot_margin: Option<f64>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileExecutionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_completed: Option<bool>,
}

/// The on-disk TOML configuration. Every key is optional.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_stem: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep: Option<FileSweepConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<FileStructureConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculation: Option<FileCalculationConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<FileAnalysisConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<FileExecutionConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize configuration: {}", e)))
    }
}

impl From<&DefaultsConfig> for FileConfig {
    fn from(defaults: &DefaultsConfig) -> Self {
        let pw = &defaults.pw;
        Self {
            file_stem: None,
            sweep: Some(FileSweepConfig {
                start: Some(defaults.sweep_start),
                end: Some(defaults.sweep_end),
                num_points: Some(defaults.sweep_points),
            }),
            structure: Some(FileStructureConfig {
                lattice: Some(pw.lattice.tag().to_string()),
                element: Some(pw.species.symbol.clone()),
                mass: Some(pw.species.mass),
                pseudopotential: Some(pw.species.pseudopotential.clone()),
            }),
            calculation: Some(FileCalculationConfig {
                outdir: Some(pw.outdir.clone()),
                pseudo_dir: Some(pw.pseudo_dir.clone()),
                verbosity: Some(pw.verbosity.clone()),
                ecutwfc: Some(pw.ecutwfc),
                occupations: Some(pw.occupations.clone()),
                smearing: Some(pw.smearing.clone()),
                degauss: Some(pw.degauss),
                input_dft: Some(pw.input_dft.clone()),
                conv_thr: Some(pw.conv_thr),
                mixing_beta: Some(pw.mixing_beta),
                kpoints: Some(pw.kpoints.mesh),
                kpoint_shift: Some(pw.kpoints.shift),
            }),
            analysis: Some(FileAnalysisConfig {
                polynomial_degree: Some(defaults.analysis.polynomial_degree),
                grid_points: Some(defaults.analysis.grid_points),
                curve_samples: Some(defaults.analysis.curve_samples),
                plot_margin: Some(defaults.analysis.plot_margin),
            }),
            execution: Some(FileExecutionConfig {
                command: Some(defaults.execution.command.clone()),
                max_concurrent: Some(defaults.execution.max_concurrent),
                skip_completed: Some(defaults.execution.skip_completed),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_survive_toml_serialization() {
        let config = FileConfig::from(&DefaultsConfig::default());
        let text = config.to_toml().unwrap();

        assert!(text.contains("[sweep]"));
        assert!(text.contains("num-points = 12"));
        assert!(text.contains("pseudo-dir = \"./pseudo\""));

        let parsed: FileConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latsweep.toml");
        std::fs::write(&path, "[sweep]\nstart = 2.2\nstep = 0.1\n").unwrap();

        let result = FileConfig::from_file(&path);

        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn partial_file_leaves_other_sections_empty() {
        let config: FileConfig =
            toml::from_str("[structure]\nelement = \"Al\"\nlattice = \"fcc\"\n").unwrap();
        let structure = config.structure.unwrap();
        assert_eq!(structure.element.as_deref(), Some("Al"));
        assert_eq!(structure.mass, None);
        assert!(config.sweep.is_none());
    }
}

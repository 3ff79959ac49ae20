use latsweep::core::io::pwscf_input::PwParameters;
use latsweep::engine::config::{AnalysisConfig, ExecutionConfig};

/// Built-in settings: a 12-point sweep of simple cubic copper from 2.2 to 2.9 Å.
pub struct DefaultsConfig {
    pub sweep_start: f64,
    pub sweep_end: f64,
    pub sweep_points: usize,
    pub pw: PwParameters,
    pub analysis: AnalysisConfig,
    pub execution: ExecutionConfig,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            sweep_start: 2.2,
            sweep_end: 2.9,
            sweep_points: 12,
            pw: PwParameters::default(),
            analysis: AnalysisConfig::default(),
            execution: ExecutionConfig::default(),
        }
    }
}

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

static TOTAL_ENERGY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"!\s+total energy\s+=\s+([-\d.]+)\s+Ry").expect("valid total energy regex")
});

static LATTICE_PARAMETER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"lattice parameter \(alat\)\s+=\s+([-\d.]+)\s+a\.u\.")
        .expect("valid lattice parameter regex")
});

const JOB_DONE_MARKER: &str = "JOB DONE.";

#[derive(Debug, Error)]
pub enum PwOutputError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed {field} value: '{value}'")]
    MalformedNumber { field: &'static str, value: String },
}

/// Quantities extracted from a `pw.x` output file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PwOutput {
    /// The `!`-marked converged total energy in Rydberg, if the SCF finished.
    pub total_energy_ry: Option<f64>,
    pub alat_bohr: Option<f64>,
    pub job_done: bool,
}

impl PwOutput {
    pub fn parse(content: &str) -> Result<Self, PwOutputError> {
        Ok(Self {
            total_energy_ry: first_capture(&TOTAL_ENERGY, content, "total energy")?,
            alat_bohr: first_capture(&LATTICE_PARAMETER, content, "lattice parameter")?,
            job_done: content.contains(JOB_DONE_MARKER),
        })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, PwOutputError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn is_converged(&self) -> bool {
        self.total_energy_ry.is_some()
    }
}

fn first_capture(
    regex: &Regex,
    content: &str,
    field: &'static str,
) -> Result<Option<f64>, PwOutputError> {
    let Some(value) = regex
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return Ok(None);
    };
    value
        .parse()
        .map(Some)
        .map_err(|_| PwOutputError::MalformedNumber {
            field,
            value: value.to_string(),
        })
}

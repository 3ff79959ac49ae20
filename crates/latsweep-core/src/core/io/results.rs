use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One converged point of a lattice sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyPoint {
    #[serde(rename = "lattice_parameter_angstrom")]
    pub lattice_angstrom: f64,
    #[serde(rename = "volume_per_atom_angstrom3")]
    pub volume_per_atom: f64,
    #[serde(rename = "energy_ev")]
    pub energy_ev: f64,
}

pub fn write_points(points: &[EnergyPoint], writer: impl Write) -> Result<(), ResultsError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for point in points {
        csv_writer.serialize(point)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_points_to_path<P: AsRef<Path>>(
    points: &[EnergyPoint],
    path: P,
) -> Result<(), ResultsError> {
    let file = std::fs::File::create(path)?;
    write_points(points, file)
}

pub fn read_points(reader: impl Read) -> Result<Vec<EnergyPoint>, ResultsError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    csv_reader
        .deserialize()
        .collect::<Result<Vec<EnergyPoint>, _>>()
        .map_err(ResultsError::from)
}

use crate::core::fit::polynomial::linspace;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LatticeError {
    #[error("A sweep needs at least one point")]
    NoPoints,
    #[error("Lattice parameter must be finite and positive (got {0})")]
    InvalidParameter(f64),
}

/// Cubic Bravais lattices with a single atom in the primitive cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BravaisLattice {
    #[default]
    SimpleCubic,
    FaceCenteredCubic,
    BodyCenteredCubic,
}

impl BravaisLattice {
    /// The `ibrav` index understood by `pw.x`.
    pub fn ibrav(self) -> u8 {
        match self {
            BravaisLattice::SimpleCubic => 1,
            BravaisLattice::FaceCenteredCubic => 2,
            BravaisLattice::BodyCenteredCubic => 3,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            BravaisLattice::SimpleCubic => "sc",
            BravaisLattice::FaceCenteredCubic => "fcc",
            BravaisLattice::BodyCenteredCubic => "bcc",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BravaisLattice::SimpleCubic => "Simple Cubic",
            BravaisLattice::FaceCenteredCubic => "FCC",
            BravaisLattice::BodyCenteredCubic => "BCC",
        }
    }

    pub fn atoms_per_cell(self) -> usize {
        1
    }

    /// Volume of the primitive cell divided by the number of atoms it holds.
    pub fn volume_per_atom(self, a: f64) -> f64 {
        let conventional = a.powi(3);
        let primitive = match self {
            BravaisLattice::SimpleCubic => conventional,
            BravaisLattice::FaceCenteredCubic => conventional / 4.0,
            BravaisLattice::BodyCenteredCubic => conventional / 2.0,
        };
        primitive / self.atoms_per_cell() as f64
    }
}

impl fmt::Display for BravaisLattice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// An evenly spaced, endpoint-inclusive range of lattice parameters in Angstrom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatticeSweep {
    pub start: f64,
    pub end: f64,
    pub num_points: usize,
}

impl LatticeSweep {
    pub fn new(start: f64, end: f64, num_points: usize) -> Self {
        Self {
            start,
            end,
            num_points,
        }
    }

    pub fn validate(&self) -> Result<(), LatticeError> {
        if self.num_points == 0 {
            return Err(LatticeError::NoPoints);
        }
        for value in [self.start, self.end] {
            if !value.is_finite() || value <= 0.0 {
                return Err(LatticeError::InvalidParameter(value));
            }
        }
        Ok(())
    }

    pub fn points(&self) -> Vec<f64> {
        linspace(self.start, self.end, self.num_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn default_sweep_has_twelve_evenly_spaced_points() {
        let points = LatticeSweep::new(2.2, 2.9, 12).points();
        assert_eq!(points.len(), 12);
        assert!((points[0] - 2.2).abs() < TOLERANCE);
        assert!((points[11] - 2.9).abs() < TOLERANCE);
        let step = 0.7 / 11.0;
        for pair in points.windows(2) {
            assert!((pair[1] - pair[0] - step).abs() < 1e-12);
        }
    }

    #[test]
    fn single_point_sweep_yields_start() {
        assert_eq!(LatticeSweep::new(3.6, 4.0, 1).points(), vec![3.6]);
    }

    #[test]
    fn validate_rejects_empty_and_non_positive_sweeps() {
        assert_eq!(
            LatticeSweep::new(2.2, 2.9, 0).validate(),
            Err(LatticeError::NoPoints)
        );
        assert_eq!(
            LatticeSweep::new(-1.0, 2.9, 5).validate(),
            Err(LatticeError::InvalidParameter(-1.0))
        );
        assert!(LatticeSweep::new(2.2, f64::NAN, 5).validate().is_err());
        assert!(LatticeSweep::new(2.9, 2.2, 5).validate().is_ok());
    }

    #[test]
    fn volume_per_atom_accounts_for_primitive_cell() {
        let a = 2.0;
        assert!((BravaisLattice::SimpleCubic.volume_per_atom(a) - 8.0).abs() < TOLERANCE);
        assert!((BravaisLattice::FaceCenteredCubic.volume_per_atom(a) - 2.0).abs() < TOLERANCE);
        assert!((BravaisLattice::BodyCenteredCubic.volume_per_atom(a) - 4.0).abs() < TOLERANCE);
    }

    #[test]
    fn ibrav_and_tags_match_pw_conventions() {
        assert_eq!(BravaisLattice::SimpleCubic.ibrav(), 1);
        assert_eq!(BravaisLattice::FaceCenteredCubic.ibrav(), 2);
        assert_eq!(BravaisLattice::BodyCenteredCubic.ibrav(), 3);
        assert_eq!(BravaisLattice::default().tag(), "sc");
    }
}

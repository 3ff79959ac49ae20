//! # Core Module
//!
//! Stateless building blocks for lattice-parameter sweeps.
//!
//! - **Units** ([`units`]) - Angstrom/Bohr and Rydberg/eV conversions
//! - **Elements** ([`elements`]) - Standard atomic masses
//! - **Lattices** ([`lattice`]) - Cubic Bravais lattices and evenly spaced sweeps
//! - **File I/O** ([`io`]) - `pw.x` inputs, outputs, file naming and CSV results
//! - **Fitting** ([`fit`]) - Least-squares polynomials and the Birch–Murnaghan equation of state
//! - **Plotting** ([`plot`]) - pgfplots/TikZ rendering of an analysis

pub mod elements;
pub mod fit;
pub mod io;
pub mod lattice;
pub mod plot;
pub mod units;

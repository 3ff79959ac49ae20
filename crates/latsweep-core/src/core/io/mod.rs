//! Reading and writing the files of a lattice sweep.
//!
//! `pw.x` inputs are assembled from Fortran namelists and cards, outputs are scanned
//! for the converged total energy, and collected energies can be exported as CSV.

pub mod namelist;
pub mod naming;
pub mod pwscf_input;
pub mod pwscf_output;
pub mod results;

//! Least-squares fitting of energy curves.
//!
//! [`polynomial`] provides the general polynomial fit used to locate the equilibrium
//! lattice parameter; [`eos`] builds the third-order Birch–Murnaghan equation of state
//! on top of it.

pub mod eos;
pub mod polynomial;

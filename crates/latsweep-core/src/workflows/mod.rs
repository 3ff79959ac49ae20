//! # Workflows Module
//!
//! End-to-end procedures over a lattice sweep, each driven by a
//! [`SweepConfig`](crate::engine::config::SweepConfig) and reporting through a
//! [`ProgressReporter`](crate::engine::progress::ProgressReporter):
//!
//! - **Generation** ([`generate`]) - Write one `pw.x` input per lattice parameter
//! - **Execution** ([`execute`]) - Run `pw.x` on the generated inputs
//! - **Analysis** ([`analyze`]) - Extract energies, fit them and locate the equilibrium

pub mod analyze;
pub mod execute;
pub mod generate;

//! # latsweep Core Library
//!
//! Lattice-parameter sweeps for plane-wave DFT calculations run with `pw.x`: generating
//! one input file per lattice parameter, extracting converged total energies from the
//! resulting outputs, and fitting them to locate the equilibrium lattice constant.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer layout:
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: unit conversions, Bravais
//!   lattices and sweeps, `pw.x` input/output formats, polynomial and equation-of-state
//!   fitting, and TikZ plot rendering.
//!
//! - **[`engine`]: Shared Machinery.** The validated [`engine::config::SweepConfig`], the
//!   error type returned by workflows, and progress reporting.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures (`generate`, `execute`,
//!   `analyze`) that tie `core` and `engine` together.

pub mod core;
pub mod engine;
pub mod workflows;

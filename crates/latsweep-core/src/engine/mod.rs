//! # Engine Module
//!
//! Shared machinery for the sweep workflows: the validated [`config::SweepConfig`],
//! the [`error::EngineError`] they return, and the [`progress`] reporting channel used
//! by front-ends to render progress bars.

pub mod config;
pub mod error;
pub mod progress;

//! # Stress Rules
//!
//! The bounded stress meter that decides when a session is lost. It owns
//! a single value in `[0, max]`, reports danger-zone crossings as edges,
//! and latches an exhausted state once the maximum is reached.
//! This crate knows nothing about where stress comes from; see
//! `stress_feeders` for that.

pub mod config;
pub mod events;
pub mod meter;
pub mod readout;

pub use config::*;
pub use events::*;
pub use meter::*;
pub use readout::*;

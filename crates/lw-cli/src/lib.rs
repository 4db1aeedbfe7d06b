//! logweave command-line front end.
//!
//! Exposes the config, argument and app modules so `lw-e2e-tests` can drive
//! a full run without spawning the binary.

pub mod app;
pub mod cli;
pub mod config;

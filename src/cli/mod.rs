//! Command-line interface
//!
//! Argument definitions and command handlers for the `lander` binary.

pub mod args;
pub mod commands;

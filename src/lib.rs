//! `Lander` - Sequential mission-phase controller
//!
//! A lunar lander moves through a fixed chain of phases
//! (orbit → descending → engine-cutoff → landed). Each advance runs the
//! current phase, notifies attached listeners, and then swaps in the next
//! phase.

pub mod cli;
pub mod config;
pub mod error;
pub mod observability;
pub mod phase;

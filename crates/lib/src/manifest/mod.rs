//! Gemfile statement model.
//!
//! A [`Manifest`] is the captured result of evaluating a Gemfile: its sources,
//! ruby version pins, and dependencies bucketed by group.

mod types;

pub use types::*;

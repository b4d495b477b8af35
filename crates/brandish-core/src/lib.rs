#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Core data structures shared by the Brandish scanner, parser and passes.

mod location;


pub use location::{ANONYMOUS_FILE, Bounds, Location, LocationError};

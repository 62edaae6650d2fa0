//! CLI command implementations

pub mod generate;
pub mod inspect;
pub mod repitch;
pub mod split;

mod reporting;

//! Core types shared by the scanner crates: validated targets, validation errors and launch pacing.

pub mod pacing;
pub mod target;

pub use target::{validate, Target, ValidationError};

pub const fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

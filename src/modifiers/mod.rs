//! Modifier operations for SDFs
//!
//! Modifiers deform the space before evaluating the child SDF.

mod oscillate;
mod repeat;
mod twist;

pub use oscillate::{modifier_oscillate, modifier_oscillate_offset};
pub use repeat::modifier_repeat;
pub use twist::modifier_twist;

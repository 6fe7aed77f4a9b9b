//! CIL method bodies: header parsing, owned code regions, and instruction iteration.
//!
//! # Key Types
//! - [`MethodBody`] - Decoded header fields plus the owned code region
//! - [`InstructionIterator`] - Sequential cursor over a body's instructions
//! - [`LocalVariable`] / [`Parameter`] - Externally resolved descriptor values
//! - [`MethodBodyFlags`] - Header flag word of ECMA-335 §II.25.4

mod body;
mod iter;
mod types;

pub use body::MethodBody;
pub use iter::InstructionIterator;
pub use types::{LocalVariable, MethodBodyFlags, Parameter};

//! Metadata-facing types of the method body decoder.
//!
//! This module holds everything that crosses the boundary to the owning assembly's metadata:
//! opaque [`token::Token`] operands, opaque [`typesystem::CilTypeHandle`] values produced by
//! an external type system, and the [`method`] module with the method body itself.

pub mod method;
/// Commonly used metadata token type
pub mod token;
pub mod typesystem;

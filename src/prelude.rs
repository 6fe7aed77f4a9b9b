//! # cilbody Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of the crate.
//! Import it to get quick access to the essential types for method body decoding.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cilbody operations
pub use crate::Error;

/// The result type used throughout cilbody
pub use crate::Result;

// ================================================================================================
// Main Entry Points
// ================================================================================================

/// Method body parsing and instruction iteration
pub use crate::metadata::method::{InstructionIterator, MethodBody};

/// Low-level byte cursor
pub use crate::Parser;

// ================================================================================================
// Metadata-Facing Types
// ================================================================================================

/// Metadata token type carried through instruction operands
pub use crate::metadata::token::Token;

/// Opaque handle to an externally resolved runtime type
pub use crate::metadata::typesystem::CilTypeHandle;

/// Descriptor values for locals and parameters
pub use crate::metadata::method::{LocalVariable, MethodBodyFlags, Parameter};

// ================================================================================================
// Disassembler
// ================================================================================================

/// CIL instruction decoding
pub use crate::disassembler::{
    decode_at, decode_instruction, decode_stream, CilOpcode, FlowType, Immediate, Instruction,
    Operand, OperandType, StackBehavior, INSTRUCTIONS, INSTRUCTIONS_FE,
};

//! CIL (Common Intermediate Language) instruction decoding engine.
//!
//! This module turns the raw bytes of a method's code region into decoded instructions: a
//! static opcode table covering the one- and two-byte opcode spaces, and the decoder functions
//! that consult it. Control-flow traits and stack effects are part of the table, so later
//! stages never re-derive them from mnemonics.
//!
//! # Key Types
//! - [`Instruction`] - Represents a decoded CIL instruction
//! - [`Operand`] - Instruction operands (immediates, tokens, switch targets)
//! - [`FlowType`] - How instructions affect control flow
//! - [`CilOpcode`] - One static opcode table entry
//!
//! # Main Functions
//! - [`decode_instruction`] - Decode a single instruction at a cursor
//! - [`decode_at`] - Decode the instruction at a given offset
//! - [`decode_stream`] - Decode a sequence of instructions
//!
//! # Example
//! ```rust
//! use cilbody::disassembler::decode_instruction;
//! use cilbody::Parser;
//! let bytecode = &[0x00, 0x2A]; // nop, ret
//! let mut parser = Parser::new(bytecode);
//! let instruction = decode_instruction(&mut parser)?;
//! assert_eq!(instruction.mnemonic, "nop");
//! # Ok::<(), cilbody::Error>(())
//! ```

mod decoder;
mod instruction;
mod instructions;

pub use decoder::{decode_at, decode_instruction, decode_stream};
pub use instruction::{FlowType, Immediate, Instruction, Operand, OperandType, StackBehavior};
pub use instructions::{CilOpcode, INSTRUCTIONS, INSTRUCTIONS_FE};

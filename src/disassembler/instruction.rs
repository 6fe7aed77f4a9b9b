//! Decoded CIL instruction representation.
//!
//! The types here are produced by the decoder in [`crate::disassembler::decoder`] and describe
//! one instruction each: its position and extent in the code region, the descriptor data looked
//! up from the opcode table, and the decoded operand.

use crate::metadata::token::Token;

/// Operand encoding of an opcode.
///
/// Every opcode except `switch` has a fixed operand width that is a constant of the opcode
/// table; `switch` is the one variable-width encoding and is handled as an explicit special
/// case by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// No operand bytes
    None,
    /// 1-byte signed immediate (short branch targets, `ldc.i4.s`)
    Int8,
    /// 1-byte unsigned immediate (short variable/argument indices)
    UInt8,
    /// 2-byte signed immediate
    Int16,
    /// 2-byte unsigned immediate (long variable/argument indices)
    UInt16,
    /// 4-byte signed immediate (long branch targets, `ldc.i4`)
    Int32,
    /// 4-byte unsigned immediate
    UInt32,
    /// 8-byte signed immediate (`ldc.i8`)
    Int64,
    /// 8-byte unsigned immediate
    UInt64,
    /// 4-byte floating literal (`ldc.r4`)
    Float32,
    /// 8-byte floating literal (`ldc.r8`)
    Float64,
    /// 4-byte metadata token, opaque to this layer
    Token,
    /// 4-byte case count followed by that many 4-byte relative targets
    Switch,
}

impl OperandType {
    /// Fixed operand width in bytes.
    ///
    /// For [`OperandType::Switch`] this is the width of the leading case-count word only; the
    /// target slots that follow depend on the decoded count.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            OperandType::None => 0,
            OperandType::Int8 | OperandType::UInt8 => 1,
            OperandType::Int16 | OperandType::UInt16 => 2,
            OperandType::Int32
            | OperandType::UInt32
            | OperandType::Float32
            | OperandType::Token
            | OperandType::Switch => 4,
            OperandType::Int64 | OperandType::UInt64 | OperandType::Float64 => 8,
        }
    }
}

/// How an instruction affects control flow.
///
/// The flow type is a looked-up trait of the opcode table, never recomputed from the mnemonic,
/// so downstream stages (basic-block builders, interpreters) can branch on it directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Execution continues at the next instruction
    Sequential,
    /// Transfers control to a target when a popped condition holds
    ConditionalBranch,
    /// Always transfers control to the target
    UnconditionalBranch,
    /// Transfers control into another method
    Call,
    /// Leaves the current method or protected region
    Return,
    /// Raises an exception
    Throw,
    /// Multi-way transfer selected by a popped index
    Switch,
}

impl FlowType {
    /// Returns true for unconditional single-target transfers.
    #[must_use]
    pub const fn is_unconditional_branch(self) -> bool {
        matches!(self, FlowType::UnconditionalBranch)
    }

    /// Returns true for condition-guarded transfers.
    #[must_use]
    pub const fn is_conditional_branch(self) -> bool {
        matches!(self, FlowType::ConditionalBranch)
    }

    /// Returns true for call-like transfers into another method.
    #[must_use]
    pub const fn is_call(self) -> bool {
        matches!(self, FlowType::Call)
    }

    /// Returns true for instructions that leave the method or protected region.
    #[must_use]
    pub const fn is_return(self) -> bool {
        matches!(self, FlowType::Return)
    }

    /// Returns true for instructions that raise an exception.
    #[must_use]
    pub const fn is_throw(self) -> bool {
        matches!(self, FlowType::Throw)
    }

    /// Returns true for any instruction with explicit branch targets.
    #[must_use]
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            FlowType::ConditionalBranch | FlowType::UnconditionalBranch | FlowType::Switch
        )
    }
}

/// An immediate operand value, preserving the encoded width and signedness.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    /// 1-byte signed value
    Int8(i8),
    /// 1-byte unsigned value
    UInt8(u8),
    /// 2-byte signed value
    Int16(i16),
    /// 2-byte unsigned value
    UInt16(u16),
    /// 4-byte signed value
    Int32(i32),
    /// 4-byte unsigned value
    UInt32(u32),
    /// 8-byte signed value
    Int64(i64),
    /// 8-byte unsigned value
    UInt64(u64),
    /// 4-byte floating value
    Float32(f32),
    /// 8-byte floating value
    Float64(f64),
}

impl Immediate {
    /// The integral value widened to `i64`: signed variants sign-extend, unsigned variants
    /// zero-extend. Returns `None` for floating immediates and for `UInt64` values that do not
    /// fit.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Immediate::Int8(v) => Some(i64::from(v)),
            Immediate::UInt8(v) => Some(i64::from(v)),
            Immediate::Int16(v) => Some(i64::from(v)),
            Immediate::UInt16(v) => Some(i64::from(v)),
            Immediate::Int32(v) => Some(i64::from(v)),
            Immediate::UInt32(v) => Some(i64::from(v)),
            Immediate::Int64(v) => Some(v),
            Immediate::UInt64(v) => i64::try_from(v).ok(),
            Immediate::Float32(_) | Immediate::Float64(_) => None,
        }
    }
}

/// A fully decoded operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// The opcode takes no operand
    None,
    /// A fixed-width immediate value
    Immediate(Immediate),
    /// A metadata token, to be interpreted by an external resolver
    Token(Token),
    /// Switch targets as signed offsets relative to the end of the instruction
    Switch(Vec<i32>),
}

/// Net effect of an instruction on the evaluation stack.
///
/// Signature-dependent opcodes (the call family and `ret`) report the fixed part only; their
/// real arity comes from the method signature, which an external reader supplies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackBehavior {
    /// Number of slots popped
    pub pops: u8,
    /// Number of slots pushed
    pub pushes: u8,
    /// `pushes - pops`
    pub net_effect: i8,
}

/// Represents a decoded CIL instruction.
///
/// Instances are transient: the decoder produces one per call and nothing in this crate
/// retains them. `offset` and `size` are relative to the code region the instruction was
/// decoded from, so `offset + size` is the start of the following instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Start offset of the instruction within the code region
    pub offset: usize,
    /// Total encoded length in bytes, opcode bytes plus operand
    pub size: usize,
    /// `0xFE` for two-byte opcodes, `0` otherwise
    pub prefix: u8,
    /// The opcode byte (the second byte for `0xFE`-prefixed opcodes)
    pub opcode: u8,
    /// Human readable opcode name
    pub mnemonic: &'static str,
    /// How this instruction affects control flow
    pub flow_type: FlowType,
    /// Fixed stack effect of this instruction
    pub stack_behavior: StackBehavior,
    /// Absolute code offsets this instruction may transfer control to
    pub branch_targets: Vec<u64>,
    /// The decoded operand
    pub operand: Operand,
}

impl Instruction {
    /// Offset of the byte immediately following this instruction.
    #[must_use]
    pub fn next_offset(&self) -> usize {
        self.offset + self.size
    }

    /// The operand reinterpreted as a signed integer per its encoded width.
    ///
    /// Covers integer immediates and branch displacements; token, switch, floating and absent
    /// operands yield `None`.
    #[must_use]
    pub fn operand_value(&self) -> Option<i64> {
        match &self.operand {
            Operand::Immediate(imm) => imm.as_i64(),
            _ => None,
        }
    }

    /// The metadata token operand, if this instruction carries one.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        match &self.operand {
            Operand::Token(token) => Some(*token),
            _ => None,
        }
    }

    /// The switch target displacements, if this is a `switch` instruction.
    #[must_use]
    pub fn switch_targets(&self) -> Option<&[i32]> {
        match &self.operand {
            Operand::Switch(targets) => Some(targets),
            _ => None,
        }
    }
}

//! CIL instruction decoding.
//!
//! This module provides the low-level functions that turn raw bytecode into
//! [`crate::disassembler::Instruction`] values: [`decode_instruction`] for cursor-driven
//! decoding, [`decode_at`] for random access into a code buffer, and [`decode_stream`] for
//! linearly decoding a whole region.
//!
//! Decoding is a table lookup plus a fixed-width operand read for every opcode except
//! `switch`, whose operand region depends on a case count read mid-decode. All failure modes
//! are typed errors carrying the start offset of the offending instruction; no partially
//! decoded data is ever returned.
//!
//! # Example: Decoding a Single Instruction
//!
//! ```rust
//! use cilbody::{Parser, disassembler::decode_instruction};
//! let code = [0x2A]; // ret
//! let mut parser = Parser::new(&code);
//! let instr = decode_instruction(&mut parser)?;
//! assert_eq!(instr.mnemonic, "ret");
//! # Ok::<(), cilbody::Error>(())
//! ```
//!
//! # Example: Decoding a Stream of Instructions
//!
//! ```rust
//! use cilbody::{Parser, disassembler::decode_stream};
//! let code = [0x00, 0x2A]; // nop, ret
//! let mut parser = Parser::new(&code);
//! let instrs = decode_stream(&mut parser)?;
//! assert_eq!(instrs.len(), 2);
//! # Ok::<(), cilbody::Error>(())
//! ```

use crate::{
    disassembler::{
        Immediate, Instruction, Operand, OperandType, StackBehavior, INSTRUCTIONS,
        INSTRUCTIONS_FE,
    },
    metadata::token::Token,
    parser::Parser,
    Error, Result,
};

/// Decodes a single CIL instruction from the current parser position.
///
/// Handles both single-byte and `0xFE`-prefixed opcodes, reads the operand declared by the
/// opcode table, and advances the parser to the start of the following instruction. The
/// returned [`Instruction`] records its start offset and total encoded size, so
/// `offset + size` of consecutive decodes tile the code region without gaps or overlaps.
///
/// The end of the parser's data is the end of the code region: an operand running past it is
/// a truncation error even if the caller owns more bytes elsewhere.
///
/// # Arguments
///
/// * `parser` - A parser positioned at the start of an instruction
///
/// # Errors
///
/// - [`crate::Error::UnknownOpcode`] if the opcode byte (or the byte after `0xFE`) has no
///   table entry
/// - [`crate::Error::TruncatedOperand`] if the declared operand, the switch count word, the
///   switch targets, or the second opcode byte after `0xFE` would read past the region end
/// - [`crate::Error::Malformed`] if a switch count is negative
/// - [`crate::Error::OutOfBounds`] if the parser is already exhausted
///
/// # Examples
///
/// ```rust
/// use cilbody::{Parser, disassembler::{decode_instruction, Operand}};
///
/// // ldstr with string token 0x70000001
/// let code = [0x72, 0x01, 0x00, 0x00, 0x70];
/// let mut parser = Parser::new(&code);
///
/// let instruction = decode_instruction(&mut parser)?;
///
/// assert_eq!(instruction.mnemonic, "ldstr");
/// assert_eq!(instruction.size, 5);
/// if let Operand::Token(token) = &instruction.operand {
///     assert_eq!(token.value(), 0x70000001);
/// }
/// # Ok::<(), cilbody::Error>(())
/// ```
pub fn decode_instruction(parser: &mut Parser) -> Result<Instruction> {
    let offset = parser.pos();
    let first_byte = parser.read_le::<u8>()?;

    let (descriptor, prefix, opcode) = match first_byte {
        0xFE => {
            let Ok(second_byte) = parser.read_le::<u8>() else {
                return Err(Error::TruncatedOperand { offset });
            };

            match INSTRUCTIONS_FE.get(second_byte as usize) {
                Some(instr) if !instr.mnemonic.is_empty() => (instr, 0xFE_u8, second_byte),
                _ => {
                    return Err(Error::UnknownOpcode {
                        offset,
                        prefix: 0xFE,
                        opcode: second_byte,
                    })
                }
            }
        }
        _ => {
            let instr = &INSTRUCTIONS[first_byte as usize];
            if instr.mnemonic.is_empty() {
                return Err(Error::UnknownOpcode {
                    offset,
                    prefix: 0,
                    opcode: first_byte,
                });
            }
            (instr, 0_u8, first_byte)
        }
    };

    if descriptor.operand != OperandType::Switch && parser.remaining() < descriptor.operand.width()
    {
        return Err(Error::TruncatedOperand { offset });
    }

    let operand = match descriptor.operand {
        OperandType::None => Operand::None,
        OperandType::Int8 => Operand::Immediate(Immediate::Int8(parser.read_le::<i8>()?)),
        OperandType::UInt8 => Operand::Immediate(Immediate::UInt8(parser.read_le::<u8>()?)),
        OperandType::Int16 => Operand::Immediate(Immediate::Int16(parser.read_le::<i16>()?)),
        OperandType::UInt16 => Operand::Immediate(Immediate::UInt16(parser.read_le::<u16>()?)),
        OperandType::Int32 => Operand::Immediate(Immediate::Int32(parser.read_le::<i32>()?)),
        OperandType::UInt32 => Operand::Immediate(Immediate::UInt32(parser.read_le::<u32>()?)),
        OperandType::Int64 => Operand::Immediate(Immediate::Int64(parser.read_le::<i64>()?)),
        OperandType::UInt64 => Operand::Immediate(Immediate::UInt64(parser.read_le::<u64>()?)),
        OperandType::Float32 => Operand::Immediate(Immediate::Float32(parser.read_le::<f32>()?)),
        OperandType::Float64 => Operand::Immediate(Immediate::Float64(parser.read_le::<f64>()?)),
        OperandType::Token => Operand::Token(Token::new(parser.read_le::<u32>()?)),
        OperandType::Switch => {
            if parser.remaining() < 4 {
                return Err(Error::TruncatedOperand { offset });
            }

            let case_count = parser.read_le::<i32>()?;
            if case_count < 0 {
                return Err(malformed_error!(
                    "switch at offset {} has negative case count {}",
                    offset,
                    case_count
                ));
            }

            let case_count = case_count as usize;
            if parser.remaining() < case_count * 4 {
                return Err(Error::TruncatedOperand { offset });
            }

            let mut targets = Vec::with_capacity(case_count);
            for _ in 0..case_count {
                targets.push(parser.read_le::<i32>()?);
            }

            Operand::Switch(targets)
        }
    };

    let size = parser.pos() - offset;

    let mut instruction = Instruction {
        offset,
        size,
        prefix,
        opcode,
        mnemonic: descriptor.mnemonic,
        flow_type: descriptor.flow,
        stack_behavior: StackBehavior {
            pops: descriptor.pops,
            pushes: descriptor.pushes,
            // Allow wrapping cast - stack effects can legitimately be negative
            #[allow(clippy::cast_possible_wrap)]
            net_effect: descriptor.pushes as i8 - descriptor.pops as i8,
        },
        branch_targets: Vec::new(),
        operand,
    };

    let next_offset = instruction.next_offset() as u64;
    match &instruction.operand {
        Operand::Immediate(value) if instruction.flow_type.is_branch() => {
            if let Some(displacement) = value.as_i64() {
                instruction
                    .branch_targets
                    .push(next_offset.wrapping_add(displacement as u64));
            }
        }
        Operand::Switch(targets) => {
            for &target in targets {
                instruction
                    .branch_targets
                    .push(next_offset.wrapping_add(i64::from(target) as u64));
            }
        }
        _ => {}
    }

    Ok(instruction)
}

/// Decodes the instruction starting at `offset` within `code`.
///
/// This is the random-access form of [`decode_instruction`]: it does not hold cursor state,
/// so callers can probe arbitrary positions of an immutable buffer. The returned
/// [`Instruction::size`] is the total encoded length including all operand bytes.
///
/// # Arguments
///
/// * `code` - The code region to decode from
/// * `offset` - Start offset of the instruction, `0 <= offset < code.len()`
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if `offset` is outside `code`, otherwise any error
/// of [`decode_instruction`].
///
/// # Examples
///
/// ```rust
/// use cilbody::disassembler::decode_at;
///
/// let code = [0x00, 0x1F, 0x05, 0x2A]; // nop, ldc.i4.s 5, ret
///
/// let instr = decode_at(&code, 1)?;
/// assert_eq!(instr.mnemonic, "ldc.i4.s");
/// assert_eq!(instr.offset, 1);
/// assert_eq!(instr.size, 2);
/// # Ok::<(), cilbody::Error>(())
/// ```
pub fn decode_at(code: &[u8], offset: usize) -> Result<Instruction> {
    let mut parser = Parser::new(code);
    parser.seek(offset)?;

    decode_instruction(&mut parser)
}

/// Decodes a continuous stream of CIL instructions from a byte stream.
///
/// Instructions are decoded in linear order until the parser runs out of data. The decode is
/// all-or-nothing: the first malformed instruction fails the whole call.
///
/// # Arguments
///
/// * `parser` - A parser positioned at the start of the instruction stream
///
/// # Errors
///
/// Propagates the first error of [`decode_instruction`], with the offset of the instruction
/// that failed to decode.
///
/// # Examples
///
/// ```rust
/// use cilbody::{Parser, disassembler::decode_stream};
///
/// // nop, ldloc.0, ret
/// let code = [0x00, 0x06, 0x2A];
/// let mut parser = Parser::new(&code);
///
/// let instructions = decode_stream(&mut parser)?;
///
/// assert_eq!(instructions.len(), 3);
/// assert_eq!(instructions[0].mnemonic, "nop");
/// assert_eq!(instructions[1].mnemonic, "ldloc.0");
/// assert_eq!(instructions[2].mnemonic, "ret");
/// # Ok::<(), cilbody::Error>(())
/// ```
pub fn decode_stream(parser: &mut Parser) -> Result<Vec<Instruction>> {
    let mut instructions = Vec::new();

    while parser.has_more_data() {
        instructions.push(decode_instruction(parser)?);
    }

    Ok(instructions)
}

#[cfg(test)]
mod tests {
    use crate::{
        disassembler::{
            decode_at, decode_instruction, decode_stream, FlowType, Immediate, Operand,
        },
        Error, Parser,
    };

    #[test]
    fn decode_instruction_basic() {
        // ldloc.s 0x10
        let mut parser = Parser::new(&[0x11, 0x10]);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.offset, 0);
        assert_eq!(result.size, 2);
        assert_eq!(result.opcode, 0x11);
        assert_eq!(result.prefix, 0);
        assert_eq!(result.mnemonic, "ldloc.s");
        assert_eq!(result.flow_type, FlowType::Sequential);
        match &result.operand {
            Operand::Immediate(Immediate::UInt8(val)) => assert_eq!(*val, 0x10),
            _ => panic!("Expected Operand::Immediate(Immediate::UInt8)"),
        }
    }

    #[test]
    fn decode_instruction_two_byte() {
        // ceq (0xFE, 0x01)
        let mut parser = Parser::new(&[0xFE, 0x01]);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.opcode, 0x01);
        assert_eq!(result.prefix, 0xFE);
        assert_eq!(result.size, 2);
        assert_eq!(result.mnemonic, "ceq");
        assert_eq!(result.flow_type, FlowType::Sequential);
        assert_eq!(result.stack_behavior.pops, 2);
        assert_eq!(result.stack_behavior.pushes, 1);
        assert_eq!(result.stack_behavior.net_effect, -1);
    }

    #[test]
    fn decode_instruction_branch() {
        // br.s 10
        let mut parser = Parser::new(&[0x2B, 0x0A]);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.mnemonic, "br.s");
        assert_eq!(result.flow_type, FlowType::UnconditionalBranch);
        assert_eq!(result.branch_targets.len(), 1);
        assert_eq!(result.branch_targets[0], 12); // next offset (2) + displacement (10)
    }

    #[test]
    fn decode_instruction_backward_branch() {
        // ...nop, nop, br.s -4 (back to offset 0)
        let code = [0x00, 0x00, 0x2B, 0xFC];
        let result = decode_at(&code, 2).unwrap();

        assert_eq!(result.operand_value(), Some(-4));
        assert_eq!(result.branch_targets[0], 0); // next offset (4) - 4
    }

    #[test]
    fn decode_instruction_switch() {
        let mut parser = Parser::new(&[
            0x45, 0x02, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00, 0x14, 0x00, 0x00, 0x00,
        ]);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.mnemonic, "switch");
        assert_eq!(result.flow_type, FlowType::Switch);
        assert_eq!(result.size, 13);
        assert_eq!(result.switch_targets(), Some(&[10, 20][..]));
        assert_eq!(result.branch_targets.len(), 2);
        assert_eq!(result.branch_targets[0], 23); // next offset (13) + displacement (10)
        assert_eq!(result.branch_targets[1], 33); // next offset (13) + displacement (20)
    }

    #[test]
    fn decode_instruction_switch_empty() {
        // switch with zero cases is a valid 5-byte instruction
        let mut parser = Parser::new(&[0x45, 0x00, 0x00, 0x00, 0x00]);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.size, 5);
        assert_eq!(result.switch_targets(), Some(&[][..]));
        assert!(result.branch_targets.is_empty());
    }

    #[test]
    fn decode_instruction_switch_negative_count() {
        let mut parser = Parser::new(&[0x45, 0xFF, 0xFF, 0xFF, 0xFF]);

        let result = decode_instruction(&mut parser);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn decode_instruction_switch_truncated_targets() {
        // switch declares 3 cases but only one target slot is present
        let mut parser = Parser::new(&[0x45, 0x03, 0x00, 0x00, 0x00, 0x0A, 0x00, 0x00, 0x00]);

        let result = decode_instruction(&mut parser);
        assert!(matches!(
            result,
            Err(Error::TruncatedOperand { offset: 0 })
        ));
    }

    #[test]
    fn decode_instruction_invalid_opcode() {
        let mut parser = Parser::new(&[0xFF, 0xFF]);

        let result = decode_instruction(&mut parser);
        assert!(matches!(
            result,
            Err(Error::UnknownOpcode {
                offset: 0,
                prefix: 0,
                opcode: 0xFF
            })
        ));
    }

    #[test]
    fn decode_instruction_invalid_fe_opcode() {
        let mut parser = Parser::new(&[0xFE, 0xFF]);

        let result = decode_instruction(&mut parser);
        assert!(matches!(
            result,
            Err(Error::UnknownOpcode {
                offset: 0,
                prefix: 0xFE,
                opcode: 0xFF
            })
        ));
    }

    #[test]
    fn decode_instruction_reserved_fe_slot() {
        // 0xFE 0x08 is inside the table bounds but unassigned
        let mut parser = Parser::new(&[0xFE, 0x08]);

        let result = decode_instruction(&mut parser);
        assert!(matches!(
            result,
            Err(Error::UnknownOpcode {
                prefix: 0xFE,
                opcode: 0x08,
                ..
            })
        ));
    }

    #[test]
    fn decode_instruction_dangling_fe_prefix() {
        let mut parser = Parser::new(&[0xFE]);

        let result = decode_instruction(&mut parser);
        assert!(matches!(result, Err(Error::TruncatedOperand { offset: 0 })));
    }

    #[test]
    fn decode_instruction_truncated_operand() {
        // br expects a 4-byte displacement, only 2 bytes remain
        let mut parser = Parser::new(&[0x38, 0x01, 0x02]);

        let result = decode_instruction(&mut parser);
        assert!(matches!(result, Err(Error::TruncatedOperand { offset: 0 })));
    }

    #[test]
    fn decode_instruction_token() {
        // ldtoken 0x02000001
        let mut parser = Parser::new(&[0xD0, 0x01, 0x00, 0x00, 0x02]);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.mnemonic, "ldtoken");
        assert_eq!(result.token().map(|t| t.value()), Some(0x0200_0001));
    }

    #[test]
    fn decode_instruction_int64_operand() {
        // ldc.i8 -1
        let mut parser = Parser::new(&[0x21, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.mnemonic, "ldc.i8");
        assert_eq!(result.size, 9);
        assert_eq!(result.operand_value(), Some(-1));
    }

    #[test]
    fn decode_instruction_long_index_operand() {
        // ldarg 0xFFFF (FE 09) carries an unsigned 16-bit index
        let mut parser = Parser::new(&[0xFE, 0x09, 0xFF, 0xFF]);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.mnemonic, "ldarg");
        assert_eq!(result.size, 4);
        match &result.operand {
            Operand::Immediate(Immediate::UInt16(val)) => assert_eq!(*val, 0xFFFF),
            _ => panic!("Expected Operand::Immediate(Immediate::UInt16)"),
        }
    }

    #[test]
    fn decode_instruction_float_operand() {
        let mut encoded = vec![0x22];
        encoded.extend_from_slice(&1.5f32.to_le_bytes());
        let mut parser = Parser::new(&encoded);

        let result = decode_instruction(&mut parser).unwrap();

        assert_eq!(result.mnemonic, "ldc.r4");
        assert_eq!(result.size, 5);
        match &result.operand {
            Operand::Immediate(Immediate::Float32(val)) => assert_eq!(*val, 1.5),
            _ => panic!("Expected Operand::Immediate(Immediate::Float32)"),
        }
        assert_eq!(result.operand_value(), None);
    }

    #[test]
    fn decode_at_positions() {
        let code = [0x00, 0x1F, 0x05, 0x2A]; // nop, ldc.i4.s 5, ret

        assert_eq!(decode_at(&code, 0).unwrap().mnemonic, "nop");

        let ldc = decode_at(&code, 1).unwrap();
        assert_eq!(ldc.mnemonic, "ldc.i4.s");
        assert_eq!(ldc.offset, 1);
        assert_eq!(ldc.next_offset(), 3);

        assert_eq!(decode_at(&code, 3).unwrap().mnemonic, "ret");
    }

    #[test]
    fn decode_at_out_of_bounds() {
        let code = [0x00, 0x2A];

        assert!(matches!(decode_at(&code, 2), Err(Error::OutOfBounds)));
        assert!(matches!(decode_at(&[], 0), Err(Error::OutOfBounds)));
    }

    #[test]
    fn decode_at_reports_error_offset() {
        // valid nop followed by a truncated long branch
        let code = [0x00, 0x38, 0x01];

        let result = decode_at(&code, 1);
        assert!(matches!(result, Err(Error::TruncatedOperand { offset: 1 })));
    }

    #[test]
    fn decode_stream_complex() {
        let code = [
            0x00, // nop
            0x2C, 0x05, // brfalse.s 5
            0x00, // nop
            0x2B, 0x03, // br.s 3
            0x00, // nop
            0x2A, // ret
            0x00, // nop
            0x2A, // ret
        ];

        let mut parser = Parser::new(&code);
        let result = decode_stream(&mut parser).unwrap();

        assert_eq!(result.len(), 8);

        let total: usize = result.iter().map(|i| i.size).sum();
        assert_eq!(total, code.len());
    }

    #[test]
    fn decode_stream_empty() {
        let mut parser = Parser::new(&[]);

        let result = decode_stream(&mut parser).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn decode_stream_propagates_offset() {
        // nop, nop, then an unknown opcode at offset 2
        let mut parser = Parser::new(&[0x00, 0x00, 0xC7]);

        let result = decode_stream(&mut parser);
        assert!(matches!(
            result,
            Err(Error::UnknownOpcode { offset: 2, .. })
        ));
    }
}

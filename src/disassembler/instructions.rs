//! Static opcode tables for CIL instruction decoding.
//!
//! Two lookup tables cover the whole instruction set of ECMA-335 §III: [`INSTRUCTIONS`] for
//! the single-byte opcode space and [`INSTRUCTIONS_FE`] for the space behind the `0xFE` escape
//! byte. Each slot is a [`CilOpcode`] descriptor carrying the mnemonic, the operand encoding,
//! the control-flow trait, and the fixed stack effect; unassigned encodings carry an empty
//! mnemonic and are rejected by the decoder.
//!
//! Both tables are built by explicit `const fn` routines and live as immutable `'static`
//! data, so any number of decoders and iterators can share them without synchronization.

use crate::disassembler::instruction::{FlowType as Flow, OperandType as Op};

/// Static description of one CIL opcode.
#[derive(Debug, Clone, Copy)]
pub struct CilOpcode {
    /// Opcode mnemonic; empty for unassigned encodings
    pub mnemonic: &'static str,
    /// Operand encoding following the opcode bytes
    pub operand: Op,
    /// Control-flow trait of the instruction
    pub flow: Flow,
    /// Fixed number of stack slots popped
    pub pops: u8,
    /// Fixed number of stack slots pushed
    pub pushes: u8,
}

const fn opcode(mnemonic: &'static str, operand: Op, flow: Flow, pops: u8, pushes: u8) -> CilOpcode {
    CilOpcode {
        mnemonic,
        operand,
        flow,
        pops,
        pushes,
    }
}

/// Placeholder for encodings the standard leaves unassigned.
const RESERVED: CilOpcode = opcode("", Op::None, Flow::Sequential, 0, 0);

/// Descriptors for the single-byte opcode space, indexed by the opcode byte.
///
/// Slot `0xFE` stays reserved here: the decoder intercepts the escape byte and dispatches
/// into [`INSTRUCTIONS_FE`] before consulting this table.
pub static INSTRUCTIONS: [CilOpcode; 256] = single_byte_table();

/// Descriptors for the two-byte opcode space, indexed by the byte following `0xFE`.
pub static INSTRUCTIONS_FE: [CilOpcode; 0x1F] = two_byte_table();

#[rustfmt::skip]
const fn single_byte_table() -> [CilOpcode; 256] {
    let mut t = [RESERVED; 256];

    t[0x00] = opcode("nop", Op::None, Flow::Sequential, 0, 0);
    t[0x01] = opcode("break", Op::None, Flow::Sequential, 0, 0);
    t[0x02] = opcode("ldarg.0", Op::None, Flow::Sequential, 0, 1);
    t[0x03] = opcode("ldarg.1", Op::None, Flow::Sequential, 0, 1);
    t[0x04] = opcode("ldarg.2", Op::None, Flow::Sequential, 0, 1);
    t[0x05] = opcode("ldarg.3", Op::None, Flow::Sequential, 0, 1);
    t[0x06] = opcode("ldloc.0", Op::None, Flow::Sequential, 0, 1);
    t[0x07] = opcode("ldloc.1", Op::None, Flow::Sequential, 0, 1);
    t[0x08] = opcode("ldloc.2", Op::None, Flow::Sequential, 0, 1);
    t[0x09] = opcode("ldloc.3", Op::None, Flow::Sequential, 0, 1);
    t[0x0A] = opcode("stloc.0", Op::None, Flow::Sequential, 1, 0);
    t[0x0B] = opcode("stloc.1", Op::None, Flow::Sequential, 1, 0);
    t[0x0C] = opcode("stloc.2", Op::None, Flow::Sequential, 1, 0);
    t[0x0D] = opcode("stloc.3", Op::None, Flow::Sequential, 1, 0);
    t[0x0E] = opcode("ldarg.s", Op::UInt8, Flow::Sequential, 0, 1);
    t[0x0F] = opcode("ldarga.s", Op::UInt8, Flow::Sequential, 0, 1);
    t[0x10] = opcode("starg.s", Op::UInt8, Flow::Sequential, 1, 0);
    t[0x11] = opcode("ldloc.s", Op::UInt8, Flow::Sequential, 0, 1);
    t[0x12] = opcode("ldloca.s", Op::UInt8, Flow::Sequential, 0, 1);
    t[0x13] = opcode("stloc.s", Op::UInt8, Flow::Sequential, 1, 0);
    t[0x14] = opcode("ldnull", Op::None, Flow::Sequential, 0, 1);
    t[0x15] = opcode("ldc.i4.m1", Op::None, Flow::Sequential, 0, 1);
    t[0x16] = opcode("ldc.i4.0", Op::None, Flow::Sequential, 0, 1);
    t[0x17] = opcode("ldc.i4.1", Op::None, Flow::Sequential, 0, 1);
    t[0x18] = opcode("ldc.i4.2", Op::None, Flow::Sequential, 0, 1);
    t[0x19] = opcode("ldc.i4.3", Op::None, Flow::Sequential, 0, 1);
    t[0x1A] = opcode("ldc.i4.4", Op::None, Flow::Sequential, 0, 1);
    t[0x1B] = opcode("ldc.i4.5", Op::None, Flow::Sequential, 0, 1);
    t[0x1C] = opcode("ldc.i4.6", Op::None, Flow::Sequential, 0, 1);
    t[0x1D] = opcode("ldc.i4.7", Op::None, Flow::Sequential, 0, 1);
    t[0x1E] = opcode("ldc.i4.8", Op::None, Flow::Sequential, 0, 1);
    t[0x1F] = opcode("ldc.i4.s", Op::Int8, Flow::Sequential, 0, 1);
    t[0x20] = opcode("ldc.i4", Op::Int32, Flow::Sequential, 0, 1);
    t[0x21] = opcode("ldc.i8", Op::Int64, Flow::Sequential, 0, 1);
    t[0x22] = opcode("ldc.r4", Op::Float32, Flow::Sequential, 0, 1);
    t[0x23] = opcode("ldc.r8", Op::Float64, Flow::Sequential, 0, 1);
    t[0x25] = opcode("dup", Op::None, Flow::Sequential, 1, 2);
    t[0x26] = opcode("pop", Op::None, Flow::Sequential, 1, 0);
    t[0x27] = opcode("jmp", Op::Token, Flow::Call, 0, 0);
    t[0x28] = opcode("call", Op::Token, Flow::Call, 0, 0);
    t[0x29] = opcode("calli", Op::Token, Flow::Call, 0, 0);
    t[0x2A] = opcode("ret", Op::None, Flow::Return, 0, 0);
    t[0x2B] = opcode("br.s", Op::Int8, Flow::UnconditionalBranch, 0, 0);
    t[0x2C] = opcode("brfalse.s", Op::Int8, Flow::ConditionalBranch, 1, 0);
    t[0x2D] = opcode("brtrue.s", Op::Int8, Flow::ConditionalBranch, 1, 0);
    t[0x2E] = opcode("beq.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x2F] = opcode("bge.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x30] = opcode("bgt.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x31] = opcode("ble.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x32] = opcode("blt.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x33] = opcode("bne.un.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x34] = opcode("bge.un.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x35] = opcode("bgt.un.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x36] = opcode("ble.un.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x37] = opcode("blt.un.s", Op::Int8, Flow::ConditionalBranch, 2, 0);
    t[0x38] = opcode("br", Op::Int32, Flow::UnconditionalBranch, 0, 0);
    t[0x39] = opcode("brfalse", Op::Int32, Flow::ConditionalBranch, 1, 0);
    t[0x3A] = opcode("brtrue", Op::Int32, Flow::ConditionalBranch, 1, 0);
    t[0x3B] = opcode("beq", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x3C] = opcode("bge", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x3D] = opcode("bgt", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x3E] = opcode("ble", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x3F] = opcode("blt", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x40] = opcode("bne.un", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x41] = opcode("bge.un", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x42] = opcode("bgt.un", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x43] = opcode("ble.un", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x44] = opcode("blt.un", Op::Int32, Flow::ConditionalBranch, 2, 0);
    t[0x45] = opcode("switch", Op::Switch, Flow::Switch, 1, 0);
    t[0x46] = opcode("ldind.i1", Op::None, Flow::Sequential, 1, 1);
    t[0x47] = opcode("ldind.u1", Op::None, Flow::Sequential, 1, 1);
    t[0x48] = opcode("ldind.i2", Op::None, Flow::Sequential, 1, 1);
    t[0x49] = opcode("ldind.u2", Op::None, Flow::Sequential, 1, 1);
    t[0x4A] = opcode("ldind.i4", Op::None, Flow::Sequential, 1, 1);
    t[0x4B] = opcode("ldind.u4", Op::None, Flow::Sequential, 1, 1);
    t[0x4C] = opcode("ldind.i8", Op::None, Flow::Sequential, 1, 1);
    t[0x4D] = opcode("ldind.i", Op::None, Flow::Sequential, 1, 1);
    t[0x4E] = opcode("ldind.r4", Op::None, Flow::Sequential, 1, 1);
    t[0x4F] = opcode("ldind.r8", Op::None, Flow::Sequential, 1, 1);
    t[0x50] = opcode("ldind.ref", Op::None, Flow::Sequential, 1, 1);
    t[0x51] = opcode("stind.ref", Op::None, Flow::Sequential, 2, 0);
    t[0x52] = opcode("stind.i1", Op::None, Flow::Sequential, 2, 0);
    t[0x53] = opcode("stind.i2", Op::None, Flow::Sequential, 2, 0);
    t[0x54] = opcode("stind.i4", Op::None, Flow::Sequential, 2, 0);
    t[0x55] = opcode("stind.i8", Op::None, Flow::Sequential, 2, 0);
    t[0x56] = opcode("stind.r4", Op::None, Flow::Sequential, 2, 0);
    t[0x57] = opcode("stind.r8", Op::None, Flow::Sequential, 2, 0);
    t[0x58] = opcode("add", Op::None, Flow::Sequential, 2, 1);
    t[0x59] = opcode("sub", Op::None, Flow::Sequential, 2, 1);
    t[0x5A] = opcode("mul", Op::None, Flow::Sequential, 2, 1);
    t[0x5B] = opcode("div", Op::None, Flow::Sequential, 2, 1);
    t[0x5C] = opcode("div.un", Op::None, Flow::Sequential, 2, 1);
    t[0x5D] = opcode("rem", Op::None, Flow::Sequential, 2, 1);
    t[0x5E] = opcode("rem.un", Op::None, Flow::Sequential, 2, 1);
    t[0x5F] = opcode("and", Op::None, Flow::Sequential, 2, 1);
    t[0x60] = opcode("or", Op::None, Flow::Sequential, 2, 1);
    t[0x61] = opcode("xor", Op::None, Flow::Sequential, 2, 1);
    t[0x62] = opcode("shl", Op::None, Flow::Sequential, 2, 1);
    t[0x63] = opcode("shr", Op::None, Flow::Sequential, 2, 1);
    t[0x64] = opcode("shr.un", Op::None, Flow::Sequential, 2, 1);
    t[0x65] = opcode("neg", Op::None, Flow::Sequential, 1, 1);
    t[0x66] = opcode("not", Op::None, Flow::Sequential, 1, 1);
    t[0x67] = opcode("conv.i1", Op::None, Flow::Sequential, 1, 1);
    t[0x68] = opcode("conv.i2", Op::None, Flow::Sequential, 1, 1);
    t[0x69] = opcode("conv.i4", Op::None, Flow::Sequential, 1, 1);
    t[0x6A] = opcode("conv.i8", Op::None, Flow::Sequential, 1, 1);
    t[0x6B] = opcode("conv.r4", Op::None, Flow::Sequential, 1, 1);
    t[0x6C] = opcode("conv.r8", Op::None, Flow::Sequential, 1, 1);
    t[0x6D] = opcode("conv.u4", Op::None, Flow::Sequential, 1, 1);
    t[0x6E] = opcode("conv.u8", Op::None, Flow::Sequential, 1, 1);
    t[0x6F] = opcode("callvirt", Op::Token, Flow::Call, 0, 0);
    t[0x70] = opcode("cpobj", Op::Token, Flow::Sequential, 2, 0);
    t[0x71] = opcode("ldobj", Op::Token, Flow::Sequential, 1, 1);
    t[0x72] = opcode("ldstr", Op::Token, Flow::Sequential, 0, 1);
    t[0x73] = opcode("newobj", Op::Token, Flow::Call, 0, 1);
    t[0x74] = opcode("castclass", Op::Token, Flow::Sequential, 1, 1);
    t[0x75] = opcode("isinst", Op::Token, Flow::Sequential, 1, 1);
    t[0x76] = opcode("conv.r.un", Op::None, Flow::Sequential, 1, 1);
    t[0x79] = opcode("unbox", Op::Token, Flow::Sequential, 1, 1);
    t[0x7A] = opcode("throw", Op::None, Flow::Throw, 1, 0);
    t[0x7B] = opcode("ldfld", Op::Token, Flow::Sequential, 1, 1);
    t[0x7C] = opcode("ldflda", Op::Token, Flow::Sequential, 1, 1);
    t[0x7D] = opcode("stfld", Op::Token, Flow::Sequential, 2, 0);
    t[0x7E] = opcode("ldsfld", Op::Token, Flow::Sequential, 0, 1);
    t[0x7F] = opcode("ldsflda", Op::Token, Flow::Sequential, 0, 1);
    t[0x80] = opcode("stsfld", Op::Token, Flow::Sequential, 1, 0);
    t[0x81] = opcode("stobj", Op::Token, Flow::Sequential, 2, 0);
    t[0x82] = opcode("conv.ovf.i1.un", Op::None, Flow::Sequential, 1, 1);
    t[0x83] = opcode("conv.ovf.i2.un", Op::None, Flow::Sequential, 1, 1);
    t[0x84] = opcode("conv.ovf.i4.un", Op::None, Flow::Sequential, 1, 1);
    t[0x85] = opcode("conv.ovf.i8.un", Op::None, Flow::Sequential, 1, 1);
    t[0x86] = opcode("conv.ovf.u1.un", Op::None, Flow::Sequential, 1, 1);
    t[0x87] = opcode("conv.ovf.u2.un", Op::None, Flow::Sequential, 1, 1);
    t[0x88] = opcode("conv.ovf.u4.un", Op::None, Flow::Sequential, 1, 1);
    t[0x89] = opcode("conv.ovf.u8.un", Op::None, Flow::Sequential, 1, 1);
    t[0x8A] = opcode("conv.ovf.i.un", Op::None, Flow::Sequential, 1, 1);
    t[0x8B] = opcode("conv.ovf.u.un", Op::None, Flow::Sequential, 1, 1);
    t[0x8C] = opcode("box", Op::Token, Flow::Sequential, 1, 1);
    t[0x8D] = opcode("newarr", Op::Token, Flow::Sequential, 1, 1);
    t[0x8E] = opcode("ldlen", Op::None, Flow::Sequential, 1, 1);
    t[0x8F] = opcode("ldelema", Op::Token, Flow::Sequential, 2, 1);
    t[0x90] = opcode("ldelem.i1", Op::None, Flow::Sequential, 2, 1);
    t[0x91] = opcode("ldelem.u1", Op::None, Flow::Sequential, 2, 1);
    t[0x92] = opcode("ldelem.i2", Op::None, Flow::Sequential, 2, 1);
    t[0x93] = opcode("ldelem.u2", Op::None, Flow::Sequential, 2, 1);
    t[0x94] = opcode("ldelem.i4", Op::None, Flow::Sequential, 2, 1);
    t[0x95] = opcode("ldelem.u4", Op::None, Flow::Sequential, 2, 1);
    t[0x96] = opcode("ldelem.i8", Op::None, Flow::Sequential, 2, 1);
    t[0x97] = opcode("ldelem.i", Op::None, Flow::Sequential, 2, 1);
    t[0x98] = opcode("ldelem.r4", Op::None, Flow::Sequential, 2, 1);
    t[0x99] = opcode("ldelem.r8", Op::None, Flow::Sequential, 2, 1);
    t[0x9A] = opcode("ldelem.ref", Op::None, Flow::Sequential, 2, 1);
    t[0x9B] = opcode("stelem.i", Op::None, Flow::Sequential, 3, 0);
    t[0x9C] = opcode("stelem.i1", Op::None, Flow::Sequential, 3, 0);
    t[0x9D] = opcode("stelem.i2", Op::None, Flow::Sequential, 3, 0);
    t[0x9E] = opcode("stelem.i4", Op::None, Flow::Sequential, 3, 0);
    t[0x9F] = opcode("stelem.i8", Op::None, Flow::Sequential, 3, 0);
    t[0xA0] = opcode("stelem.r4", Op::None, Flow::Sequential, 3, 0);
    t[0xA1] = opcode("stelem.r8", Op::None, Flow::Sequential, 3, 0);
    t[0xA2] = opcode("stelem.ref", Op::None, Flow::Sequential, 3, 0);
    t[0xA3] = opcode("ldelem", Op::Token, Flow::Sequential, 2, 1);
    t[0xA4] = opcode("stelem", Op::Token, Flow::Sequential, 3, 0);
    t[0xA5] = opcode("unbox.any", Op::Token, Flow::Sequential, 1, 1);
    t[0xB3] = opcode("conv.ovf.i1", Op::None, Flow::Sequential, 1, 1);
    t[0xB4] = opcode("conv.ovf.u1", Op::None, Flow::Sequential, 1, 1);
    t[0xB5] = opcode("conv.ovf.i2", Op::None, Flow::Sequential, 1, 1);
    t[0xB6] = opcode("conv.ovf.u2", Op::None, Flow::Sequential, 1, 1);
    t[0xB7] = opcode("conv.ovf.i4", Op::None, Flow::Sequential, 1, 1);
    t[0xB8] = opcode("conv.ovf.u4", Op::None, Flow::Sequential, 1, 1);
    t[0xB9] = opcode("conv.ovf.i8", Op::None, Flow::Sequential, 1, 1);
    t[0xBA] = opcode("conv.ovf.u8", Op::None, Flow::Sequential, 1, 1);
    t[0xC2] = opcode("refanyval", Op::Token, Flow::Sequential, 1, 1);
    t[0xC3] = opcode("ckfinite", Op::None, Flow::Sequential, 1, 1);
    t[0xC6] = opcode("mkrefany", Op::Token, Flow::Sequential, 1, 1);
    t[0xD0] = opcode("ldtoken", Op::Token, Flow::Sequential, 0, 1);
    t[0xD1] = opcode("conv.u2", Op::None, Flow::Sequential, 1, 1);
    t[0xD2] = opcode("conv.u1", Op::None, Flow::Sequential, 1, 1);
    t[0xD3] = opcode("conv.i", Op::None, Flow::Sequential, 1, 1);
    t[0xD4] = opcode("conv.ovf.i", Op::None, Flow::Sequential, 1, 1);
    t[0xD5] = opcode("conv.ovf.u", Op::None, Flow::Sequential, 1, 1);
    t[0xD6] = opcode("add.ovf", Op::None, Flow::Sequential, 2, 1);
    t[0xD7] = opcode("add.ovf.un", Op::None, Flow::Sequential, 2, 1);
    t[0xD8] = opcode("mul.ovf", Op::None, Flow::Sequential, 2, 1);
    t[0xD9] = opcode("mul.ovf.un", Op::None, Flow::Sequential, 2, 1);
    t[0xDA] = opcode("sub.ovf", Op::None, Flow::Sequential, 2, 1);
    t[0xDB] = opcode("sub.ovf.un", Op::None, Flow::Sequential, 2, 1);
    t[0xDC] = opcode("endfinally", Op::None, Flow::Return, 0, 0);
    t[0xDD] = opcode("leave", Op::Int32, Flow::UnconditionalBranch, 0, 0);
    t[0xDE] = opcode("leave.s", Op::Int8, Flow::UnconditionalBranch, 0, 0);
    t[0xDF] = opcode("stind.i", Op::None, Flow::Sequential, 2, 0);
    t[0xE0] = opcode("conv.u", Op::None, Flow::Sequential, 1, 1);

    t
}

#[rustfmt::skip]
const fn two_byte_table() -> [CilOpcode; 0x1F] {
    let mut t = [RESERVED; 0x1F];

    t[0x00] = opcode("arglist", Op::None, Flow::Sequential, 0, 1);
    t[0x01] = opcode("ceq", Op::None, Flow::Sequential, 2, 1);
    t[0x02] = opcode("cgt", Op::None, Flow::Sequential, 2, 1);
    t[0x03] = opcode("cgt.un", Op::None, Flow::Sequential, 2, 1);
    t[0x04] = opcode("clt", Op::None, Flow::Sequential, 2, 1);
    t[0x05] = opcode("clt.un", Op::None, Flow::Sequential, 2, 1);
    t[0x06] = opcode("ldftn", Op::Token, Flow::Sequential, 0, 1);
    t[0x07] = opcode("ldvirtftn", Op::Token, Flow::Sequential, 1, 1);
    t[0x09] = opcode("ldarg", Op::UInt16, Flow::Sequential, 0, 1);
    t[0x0A] = opcode("ldarga", Op::UInt16, Flow::Sequential, 0, 1);
    t[0x0B] = opcode("starg", Op::UInt16, Flow::Sequential, 1, 0);
    t[0x0C] = opcode("ldloc", Op::UInt16, Flow::Sequential, 0, 1);
    t[0x0D] = opcode("ldloca", Op::UInt16, Flow::Sequential, 0, 1);
    t[0x0E] = opcode("stloc", Op::UInt16, Flow::Sequential, 1, 0);
    t[0x0F] = opcode("localloc", Op::None, Flow::Sequential, 1, 1);
    t[0x11] = opcode("endfilter", Op::None, Flow::Return, 1, 0);
    t[0x12] = opcode("unaligned.", Op::UInt8, Flow::Sequential, 0, 0);
    t[0x13] = opcode("volatile.", Op::None, Flow::Sequential, 0, 0);
    t[0x14] = opcode("tail.", Op::None, Flow::Sequential, 0, 0);
    t[0x15] = opcode("initobj", Op::Token, Flow::Sequential, 1, 0);
    t[0x16] = opcode("constrained.", Op::Token, Flow::Sequential, 0, 0);
    t[0x17] = opcode("cpblk", Op::None, Flow::Sequential, 3, 0);
    t[0x18] = opcode("initblk", Op::None, Flow::Sequential, 3, 0);
    t[0x19] = opcode("no.", Op::UInt8, Flow::Sequential, 0, 0);
    t[0x1A] = opcode("rethrow", Op::None, Flow::Throw, 0, 0);
    t[0x1C] = opcode("sizeof", Op::Token, Flow::Sequential, 0, 1);
    t[0x1D] = opcode("refanytype", Op::None, Flow::Sequential, 1, 1);
    t[0x1E] = opcode("readonly.", Op::None, Flow::Sequential, 0, 0);

    t
}

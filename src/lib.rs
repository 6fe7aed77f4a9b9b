// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # cilbody
//!
//! A decoder and instruction-stream model for CIL (Common Intermediate Language) method
//! bodies, the per-method bytecode blobs of ECMA-335 §II.25.4. Built in pure Rust, `cilbody`
//! parses tiny and fat method headers, owns the code region as an immutable buffer, and
//! decodes the variable-length instruction encoding (including the two-byte `0xFE` opcode
//! space and the data-dependent `switch` instruction) safely over truncated or malformed
//! input.
//!
//! The crate is the front end of a JIT or IL interpreter pipeline: basic-block construction,
//! IR lowering and verification all consume the instruction stream produced here. Everything
//! around that front end stays external: loading the image, resolving metadata tokens, and
//! parsing signature blobs are collaborator interfaces, not features of this crate.
//!
//! ## Features
//!
//! - **Header parsing** - Tiny and fat method headers with strict validation
//! - **Complete opcode table** - The full one- and two-byte opcode spaces as immutable static data
//! - **Bounds-checked decoding** - Truncated input surfaces as typed errors with offsets, never reads past the buffer
//! - **Cheap iteration** - Independent cursors over whole bodies or explicit sub-ranges
//! - **Allocation-light** - One owned copy of the code region per body; decoding borrows
//!
//! ## Quick Start
//!
//! ```rust
//! use cilbody::prelude::*;
//!
//! // Tiny header declaring two code bytes: nop, ret
//! let blob = [0x0A, 0x00, 0x2A];
//! let body = MethodBody::parse(&blob, 0)?;
//!
//! let mut il = body.instructions();
//! while il.move_next()? {
//!     println!("{:04x}: {}", il.index(), il.mnemonic());
//! }
//! # Ok::<(), cilbody::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `cilbody` is organized into a few small modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`metadata`] - [`MethodBody`], descriptor values, and the opaque token/type handles
//! - [`disassembler`] - The opcode table and instruction decoding
//! - [`Error`] and [`Result`] - Typed decode failures carrying byte offsets
//!
//! Decoding is strictly layered: [`Parser`] provides bounds-checked little-endian reads, the
//! [`disassembler`] turns bytes into [`disassembler::Instruction`] values via the static
//! opcode table, and [`MethodBody`] ties header fields, code bytes and externally resolved
//! locals together. Malformed bytecode is a deterministic, permanent condition: every failure
//! is reported once, with its offset, and nothing is silently skipped.
//!
//! ## Standards Compliance
//!
//! `cilbody` implements the method body and instruction encodings of the **ECMA-335
//! specification** (6th edition), Partition II §25.4 and Partition III.
//!
//! ### References
//!
//! - [ECMA-335 Standard](https://ecma-international.org/wp-content/uploads/ECMA-335_6th_edition_june_2012.pdf) - Official CLI specification
//! - [.NET Runtime](https://github.com/dotnet/runtime) - Microsoft's reference implementation
//!
//! ## Thread Safety
//!
//! The opcode tables are immutable `'static` data and a constructed [`MethodBody`] is never
//! mutated, so bodies can be shared across threads and iterated concurrently without locking.
//! Construction itself is a one-shot operation by a single owning thread.
//!
//! ## Development and Testing
//!
//! The crate includes fuzzing support for robustness against hostile input:
//!
//! ```bash
//! # Install fuzzing tools
//! cargo install cargo-fuzz
//!
//! # Run fuzzer
//! cargo +nightly fuzz run methodbody --release
//! ```

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cilbody::prelude::*;
///
/// let body = MethodBody::parse(&[0x06, 0x2A], 0)?;
/// assert_eq!(body.size_code(), 1);
/// # Ok::<(), cilbody::Error>(())
/// ```
pub mod prelude;

/// Byte-order primitives shared by all decoding layers.
pub mod io;

/// Bounds-checked byte cursor used by the header parser and the instruction decoder.
pub mod parser;

/// Instructions and instruction decoding based on ECMA-335 Partition III.
///
/// # Key Types
///
/// - [`disassembler::Instruction`] - Represents a decoded CIL instruction
/// - [`disassembler::Operand`] - Instruction operands (immediates, tokens, switch targets)
/// - [`disassembler::FlowType`] - How instructions affect control flow
/// - [`disassembler::INSTRUCTIONS`] / [`disassembler::INSTRUCTIONS_FE`] - The static opcode tables
///
/// # Main Functions
///
/// - [`disassembler::decode_instruction`] - Decode a single instruction at a cursor
/// - [`disassembler::decode_at`] - Decode the instruction at a given offset
/// - [`disassembler::decode_stream`] - Decode a sequence of instructions
pub mod disassembler;

/// Method bodies and metadata-facing value types based on ECMA-335 Partition II.
///
/// # Key Types
///
/// - [`metadata::method::MethodBody`] - Header fields plus the owned code region
/// - [`metadata::method::InstructionIterator`] - Cursor over a body's instruction stream
/// - [`metadata::token::Token`] - Opaque 4-byte metadata token
/// - [`metadata::typesystem::CilTypeHandle`] - Opaque externally resolved type handle
pub mod metadata;

pub use error::Error;

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

pub use metadata::{method::MethodBody, token::Token};
pub use parser::Parser;

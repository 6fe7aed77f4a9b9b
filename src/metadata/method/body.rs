//! Representation and parsing of CIL method bodies.
//!
//! This module decodes the per-method byte blob laid out by ECMA-335 §II.25.4: the tiny or
//! fat header followed by the code region. The result is an immutable [`MethodBody`] owning
//! its code bytes, which instruction iterators borrow without ever being able to mutate.
//!
//! Local variables are not decoded here: the header only carries a signature token, and an
//! external resolver turns that token into an ordered list of type handles (see
//! [`MethodBody::parse_with_locals`]).
//!
//! # Examples
//!
//! ```rust
//! use cilbody::MethodBody;
//!
//! // Tiny header declaring two code bytes, followed by nop, ret
//! let blob = [0x0A, 0x00, 0x2A];
//! let body = MethodBody::parse(&blob, 0)?;
//!
//! assert_eq!(body.max_stack(), 8);
//! assert_eq!(body.code(), &[0x00, 0x2A]);
//! assert!(!body.is_fat());
//! # Ok::<(), cilbody::Error>(())
//! ```
//!
//! # References
//! - ECMA-335 6th Edition, Partition II, Section 25.4 - Method Header Format

use crate::{
    io::read_le_at,
    metadata::{
        method::{InstructionIterator, LocalVariable, MethodBodyFlags},
        token::Token,
        typesystem::CilTypeHandle,
    },
    Error::{HeaderFormat, OutOfBounds, TruncatedHeader, UnsupportedFeature},
    Result,
};

/// Size in bytes of a fat method header (3 four-byte words).
const FAT_HEADER_SIZE: usize = 12;

/// Describes one method that has been compiled to CIL bytecode.
///
/// A `MethodBody` holds the decoded header fields, its own immutable copy of the code region,
/// and the externally resolved local-variable descriptors. Nothing about it can change after
/// construction, so any number of iterators, on any number of threads, may walk the same
/// body concurrently.
pub struct MethodBody {
    /// The method's code region, owned and immutable
    code: Box<[u8]>,
    /// Size of the method header in bytes
    size_header: usize,
    /// Token of the local-variable signature; null when the method declares no locals
    local_var_sig_token: Token,
    /// Maximum number of items on the operand stack
    max_stack: usize,
    /// Flag, indicating the type of the method header
    is_fat: bool,
    /// Flag, indicating to zero-initialize all local variables
    is_init_local: bool,
    /// Externally resolved local variables, one per declared slot
    locals: Vec<LocalVariable>,
}

impl MethodBody {
    /// Parse a method body from its raw byte blob.
    ///
    /// `offset` is the position of the first header byte within `data`; its two low bits
    /// select the tiny or fat encoding. The code region is copied into the returned body, so
    /// the input buffer can be discarded afterwards. Locals are left empty; use
    /// [`MethodBody::parse_with_locals`] when a signature resolver is available.
    ///
    /// # Arguments
    /// * `data` - The byte blob holding the method header and code
    /// * `offset` - Position of the first header byte within `data`
    ///
    /// # Errors
    /// - [`crate::Error::HeaderFormat`] if the low bits select neither encoding, or a fat
    ///   header's size field is not 3 words
    /// - [`crate::Error::TruncatedHeader`] if a fixed-size header field runs past `data`
    /// - [`crate::Error::UnsupportedFeature`] if a fat header announces extra data sections
    /// - [`crate::Error::OutOfBounds`] if the declared code region runs past `data`
    pub fn parse(data: &[u8], offset: usize) -> Result<MethodBody> {
        if offset >= data.len() {
            return Err(TruncatedHeader { offset });
        }

        let first_byte = data[offset];
        match MethodBodyFlags::from_bits_truncate(u16::from(first_byte & 0b_0000_0011_u8)) {
            MethodBodyFlags::TINY_FORMAT => {
                let size_code = (first_byte >> 2) as usize;
                let code_start = offset + 1;
                if code_start + size_code > data.len() {
                    return Err(OutOfBounds);
                }

                Ok(MethodBody {
                    code: data[code_start..code_start + size_code].into(),
                    size_header: 1,
                    local_var_sig_token: Token::new(0),
                    max_stack: 8,
                    is_fat: false,
                    is_init_local: false,
                    locals: Vec::new(),
                })
            }
            MethodBodyFlags::FAT_FORMAT => {
                if offset + FAT_HEADER_SIZE > data.len() {
                    return Err(TruncatedHeader { offset });
                }

                let mut cursor = offset;
                let first_duo = read_le_at::<u16>(data, &mut cursor)?;

                let size_header_words = first_duo >> 12;
                if size_header_words != 3 {
                    return Err(HeaderFormat {
                        offset,
                        detail: "fat header size field must be 3 words",
                    });
                }

                let flags_header =
                    MethodBodyFlags::from_bits_truncate(first_duo & 0b_0000_1111_1111_1111_u16);
                let max_stack = read_le_at::<u16>(data, &mut cursor)? as usize;
                let size_code = read_le_at::<u32>(data, &mut cursor)? as usize;
                let local_var_sig_token = Token::new(read_le_at::<u32>(data, &mut cursor)?);

                // Extra sections carry exception handler tables (II.25.4.5), which are not
                // interpreted by this crate and must not be skipped over silently.
                if flags_header.contains(MethodBodyFlags::MORE_SECTS) {
                    return Err(UnsupportedFeature {
                        offset,
                        feature: "exception handler sections",
                    });
                }

                let code_start = offset + FAT_HEADER_SIZE;
                let Some(code_end) = code_start.checked_add(size_code) else {
                    return Err(OutOfBounds);
                };
                if code_end > data.len() {
                    return Err(OutOfBounds);
                }

                Ok(MethodBody {
                    code: data[code_start..code_end].into(),
                    size_header: FAT_HEADER_SIZE,
                    local_var_sig_token,
                    max_stack,
                    is_fat: true,
                    is_init_local: flags_header.contains(MethodBodyFlags::INIT_LOCALS),
                    locals: Vec::new(),
                })
            }
            _ => Err(HeaderFormat {
                offset,
                detail: "header is neither fat nor tiny",
            }),
        }
    }

    /// Parse a method body and resolve its local-variable signature.
    ///
    /// `resolve` is invoked once with the header's signature token when that token is
    /// non-null; the type handles it returns are bound to slots `0..n` in order. Bodies
    /// without locals never invoke the resolver.
    ///
    /// # Arguments
    /// * `data` - The byte blob holding the method header and code
    /// * `offset` - Position of the first header byte within `data`
    /// * `resolve` - Resolver mapping the signature token to the declared local types
    ///
    /// # Errors
    /// Any error of [`MethodBody::parse`], or whatever error `resolve` returns.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cilbody::{metadata::typesystem::CilTypeHandle, MethodBody};
    ///
    /// // Fat header (size 3, max stack 2, one code byte), locals token 0x11000001
    /// let blob = [
    ///     0x03, 0x30, 0x02, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x11,
    ///     0x2A, // ret
    /// ];
    ///
    /// let body = MethodBody::parse_with_locals(&blob, 0, |token| {
    ///     assert_eq!(token.value(), 0x11000001);
    ///     Ok(vec![CilTypeHandle::new(1), CilTypeHandle::new(2)])
    /// })?;
    ///
    /// assert_eq!(body.locals().len(), 2);
    /// assert_eq!(body.locals()[1].slot, 1);
    /// # Ok::<(), cilbody::Error>(())
    /// ```
    pub fn parse_with_locals<F>(data: &[u8], offset: usize, resolve: F) -> Result<MethodBody>
    where
        F: FnOnce(Token) -> Result<Vec<CilTypeHandle>>,
    {
        let mut body = Self::parse(data, offset)?;

        if !body.local_var_sig_token.is_null() {
            let types = resolve(body.local_var_sig_token)?;

            let mut locals = Vec::with_capacity(types.len());
            for (slot, ty) in types.into_iter().enumerate() {
                let Ok(slot) = u16::try_from(slot) else {
                    return Err(malformed_error!(
                        "local variable signature {} declares too many slots",
                        body.local_var_sig_token
                    ));
                };
                locals.push(LocalVariable { ty, slot });
            }
            body.locals = locals;
        }

        Ok(body)
    }

    /// The method's code region.
    #[must_use]
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Size of the method's code region in bytes.
    #[must_use]
    pub fn size_code(&self) -> usize {
        self.code.len()
    }

    /// Size of the method header in bytes: 1 for tiny bodies, 12 for fat ones.
    #[must_use]
    pub fn size_header(&self) -> usize {
        self.size_header
    }

    /// Get the full size of this method
    #[must_use]
    pub fn size(&self) -> usize {
        self.code.len() + self.size_header
    }

    /// Maximum number of items on the operand stack; 8 for tiny bodies.
    #[must_use]
    pub fn max_stack(&self) -> usize {
        self.max_stack
    }

    /// Token of the local-variable signature; null when the method declares no locals.
    #[must_use]
    pub fn local_var_sig_token(&self) -> Token {
        self.local_var_sig_token
    }

    /// Whether the body uses the fat header encoding.
    #[must_use]
    pub fn is_fat(&self) -> bool {
        self.is_fat
    }

    /// Whether local variables must be zero-initialized before execution.
    #[must_use]
    pub fn is_init_local(&self) -> bool {
        self.is_init_local
    }

    /// The externally resolved local variables, ordered by slot.
    #[must_use]
    pub fn locals(&self) -> &[LocalVariable] {
        &self.locals
    }

    /// An iterator over the body's whole instruction stream.
    #[must_use]
    pub fn instructions(&self) -> InstructionIterator<'_> {
        InstructionIterator::new(self)
    }

    /// An iterator over the instructions of the code sub-range `start..end`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] unless `start <= end <= code length`.
    pub fn instructions_in(&self, start: usize, end: usize) -> Result<InstructionIterator<'_>> {
        InstructionIterator::with_range(self, start, end)
    }
}

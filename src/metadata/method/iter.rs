//! Sequential cursor over a method body's instruction stream.
//!
//! [`InstructionIterator`] walks the code region of a [`crate::metadata::method::MethodBody`]
//! one instruction at a time, either over the whole region or over an explicit sub-range.
//! Iterators are cheap values holding a borrow of the body's immutable code buffer: any
//! number of them can traverse the same body independently, and re-walking a body always
//! reproduces the identical instruction sequence.

use crate::{
    disassembler::{decode_at, FlowType, Instruction, Operand, StackBehavior},
    metadata::method::MethodBody,
    Error::OutOfBounds,
    Result,
};

/// A cursor over the instructions of a method body.
///
/// The cursor starts *before* the first instruction: call [`InstructionIterator::move_next`]
/// to decode one instruction and advance. The per-instruction accessors ([`index`](Self::index),
/// [`mnemonic`](Self::mnemonic), [`operand_value`](Self::operand_value), ...) refer to the
/// most recently decoded instruction and may only be used after `move_next` has returned
/// `Ok(true)` at least once.
///
/// A decode failure is final: `move_next` propagates the error with the offset of the
/// malformed instruction, and advancing the iterator afterwards is a programming error that
/// panics rather than silently resuming inside a malformed stream.
///
/// # Examples
///
/// ```rust
/// use cilbody::MethodBody;
///
/// let blob = [0x0A, 0x00, 0x2A]; // tiny header, then nop, ret
/// let body = MethodBody::parse(&blob, 0)?;
///
/// let mut iter = body.instructions();
/// while iter.move_next()? {
///     println!("{:04x}: {}", iter.index(), iter.mnemonic());
/// }
/// assert!(!iter.has_next());
/// # Ok::<(), cilbody::Error>(())
/// ```
pub struct InstructionIterator<'a> {
    /// The body's code bytes, truncated at the region end
    code: &'a [u8],
    /// Start offset of the next instruction to decode
    position: usize,
    /// Exclusive end of the region being iterated
    end: usize,
    /// The most recently decoded instruction
    current: Option<Instruction>,
    /// Set once a decode failure has been propagated
    poisoned: bool,
}

impl<'a> InstructionIterator<'a> {
    /// Create an iterator over the body's whole code region.
    #[must_use]
    pub fn new(body: &'a MethodBody) -> Self {
        InstructionIterator {
            code: body.code(),
            position: 0,
            end: body.code().len(),
            current: None,
            poisoned: false,
        }
    }

    /// Create an iterator over the code sub-range `start..end`.
    ///
    /// Bounded iterators serve callers that need to walk one region of a larger body, such
    /// as a protected block whose extent an external exception-handler reader supplied. An
    /// operand running past `end` is a truncation error even when the body owns more bytes.
    ///
    /// # Arguments
    /// * `body` - The method body to iterate
    /// * `start` - Inclusive start offset within the code region
    /// * `end` - Exclusive end offset within the code region
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] unless `start <= end <= code length`.
    pub fn with_range(body: &'a MethodBody, start: usize, end: usize) -> Result<Self> {
        if start > end || end > body.code().len() {
            return Err(OutOfBounds);
        }

        Ok(InstructionIterator {
            code: &body.code()[..end],
            position: start,
            end,
            current: None,
            poisoned: false,
        })
    }

    /// Returns `true` while undecoded bytes remain in the region.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.position < self.end
    }

    /// Decode the next instruction and advance the cursor.
    ///
    /// Returns `Ok(false)` once the region is exhausted, leaving the iterator state
    /// unchanged.
    ///
    /// # Errors
    /// Propagates the decoder failure verbatim, including the offset of the malformed
    /// instruction. After an error the iterator is poisoned.
    ///
    /// # Panics
    /// Panics if called again after a previous call returned an error.
    pub fn move_next(&mut self) -> Result<bool> {
        assert!(
            !self.poisoned,
            "InstructionIterator advanced after a decode failure"
        );

        if !self.has_next() {
            return Ok(false);
        }

        match decode_at(self.code, self.position) {
            Ok(instruction) => {
                self.position = instruction.next_offset();
                self.current = Some(instruction);
                Ok(true)
            }
            Err(error) => {
                self.poisoned = true;
                Err(error)
            }
        }
    }

    /// The most recently decoded instruction.
    ///
    /// # Panics
    /// Panics if no instruction has been decoded yet.
    #[must_use]
    pub fn instruction(&self) -> &Instruction {
        match &self.current {
            Some(instruction) => instruction,
            None => panic!("no current instruction; call move_next first"),
        }
    }

    /// Start offset of the current instruction.
    ///
    /// # Panics
    /// Panics if no instruction has been decoded yet.
    #[must_use]
    pub fn index(&self) -> usize {
        self.instruction().offset
    }

    /// Offset of the byte immediately following the current instruction.
    ///
    /// # Panics
    /// Panics if no instruction has been decoded yet.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.instruction().next_offset()
    }

    /// Mnemonic of the current instruction.
    ///
    /// # Panics
    /// Panics if no instruction has been decoded yet.
    #[must_use]
    pub fn mnemonic(&self) -> &'static str {
        self.instruction().mnemonic
    }

    /// Control-flow trait of the current instruction.
    ///
    /// # Panics
    /// Panics if no instruction has been decoded yet.
    #[must_use]
    pub fn flow_type(&self) -> FlowType {
        self.instruction().flow_type
    }

    /// Fixed stack effect of the current instruction.
    ///
    /// # Panics
    /// Panics if no instruction has been decoded yet.
    #[must_use]
    pub fn stack_behavior(&self) -> StackBehavior {
        self.instruction().stack_behavior
    }

    /// The current instruction's decoded operand.
    ///
    /// # Panics
    /// Panics if no instruction has been decoded yet.
    #[must_use]
    pub fn operand(&self) -> &Operand {
        &self.instruction().operand
    }

    /// The current operand reinterpreted as a signed integer per its encoded width.
    ///
    /// # Panics
    /// Panics if no instruction has been decoded yet.
    #[must_use]
    pub fn operand_value(&self) -> Option<i64> {
        self.instruction().operand_value()
    }

    /// The current instruction's switch displacements, if it is a `switch`.
    ///
    /// # Panics
    /// Panics if no instruction has been decoded yet.
    #[must_use]
    pub fn switch_targets(&self) -> Option<&[i32]> {
        self.instruction().switch_targets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn tiny_body(code: &[u8]) -> MethodBody {
        assert!(code.len() < 64);
        let mut blob = vec![((code.len() as u8) << 2) | 0b10];
        blob.extend_from_slice(code);
        MethodBody::parse(&blob, 0).unwrap()
    }

    #[test]
    fn walks_whole_body() {
        let body = tiny_body(&[0x00, 0x2A]); // nop, ret
        let mut iter = body.instructions();

        assert!(iter.has_next());
        assert!(iter.move_next().unwrap());
        assert_eq!(iter.index(), 0);
        assert_eq!(iter.next_index(), 1);
        assert_eq!(iter.mnemonic(), "nop");

        assert!(iter.move_next().unwrap());
        assert_eq!(iter.index(), 1);
        assert_eq!(iter.mnemonic(), "ret");
        assert_eq!(iter.flow_type(), FlowType::Return);

        assert!(!iter.has_next());
        assert!(!iter.move_next().unwrap());
        // Exhaustion leaves the last instruction in place
        assert_eq!(iter.mnemonic(), "ret");
    }

    #[test]
    fn sub_range_iteration() {
        // nop | ldc.i4.s 7, ret | nop
        let body = tiny_body(&[0x00, 0x1F, 0x07, 0x2A, 0x00]);
        let mut iter = body.instructions_in(1, 4).unwrap();

        assert!(iter.move_next().unwrap());
        assert_eq!(iter.index(), 1);
        assert_eq!(iter.mnemonic(), "ldc.i4.s");
        assert_eq!(iter.operand_value(), Some(7));

        assert!(iter.move_next().unwrap());
        assert_eq!(iter.mnemonic(), "ret");
        assert!(!iter.move_next().unwrap());
    }

    #[test]
    fn sub_range_bounds_operands() {
        // The 4-byte displacement of br lies past the range end
        let body = tiny_body(&[0x38, 0x01, 0x00, 0x00, 0x00, 0x2A]);
        let mut iter = body.instructions_in(0, 2).unwrap();

        let result = iter.move_next();
        assert!(matches!(result, Err(Error::TruncatedOperand { offset: 0 })));
    }

    #[test]
    fn invalid_range_rejected() {
        let body = tiny_body(&[0x00, 0x2A]);

        assert!(matches!(
            body.instructions_in(1, 0),
            Err(Error::OutOfBounds)
        ));
        assert!(matches!(
            body.instructions_in(0, 3),
            Err(Error::OutOfBounds)
        ));
    }

    #[test]
    fn empty_range_is_exhausted() {
        let body = tiny_body(&[0x00, 0x2A]);
        let mut iter = body.instructions_in(1, 1).unwrap();

        assert!(!iter.has_next());
        assert!(!iter.move_next().unwrap());
    }

    #[test]
    fn iterators_are_independent() {
        let body = tiny_body(&[0x00, 0x00, 0x2A]);

        let mut first = body.instructions();
        let mut second = body.instructions();

        assert!(first.move_next().unwrap());
        assert!(first.move_next().unwrap());
        assert_eq!(first.index(), 1);

        // The second iterator is unaffected by the first's progress
        assert!(second.move_next().unwrap());
        assert_eq!(second.index(), 0);
    }

    #[test]
    fn reiteration_is_deterministic() {
        let body = tiny_body(&[0x00, 0x1F, 0x2A, 0x16, 0x2A]); // nop, ldc.i4.s 0x2A, ldc.i4.0, ret

        let mut walk = |mut iter: InstructionIterator| {
            let mut seen = Vec::new();
            while iter.move_next().unwrap() {
                seen.push((iter.index(), iter.mnemonic(), iter.flow_type()));
            }
            seen
        };

        assert_eq!(walk(body.instructions()), walk(body.instructions()));
    }

    #[test]
    fn propagates_decode_failure() {
        // nop, then an unassigned opcode at offset 1
        let body = tiny_body(&[0x00, 0xC7]);
        let mut iter = body.instructions();

        assert!(iter.move_next().unwrap());
        let result = iter.move_next();
        assert!(matches!(
            result,
            Err(Error::UnknownOpcode { offset: 1, .. })
        ));
    }

    #[test]
    #[should_panic(expected = "advanced after a decode failure")]
    fn poisoned_iterator_panics() {
        let body = tiny_body(&[0xC7]);
        let mut iter = body.instructions();

        let _ = iter.move_next();
        let _ = iter.move_next();
    }

    #[test]
    #[should_panic(expected = "no current instruction")]
    fn accessor_before_first_decode_panics() {
        let body = tiny_body(&[0x2A]);
        let iter = body.instructions();

        let _ = iter.mnemonic();
    }
}

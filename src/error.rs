use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every failure mode of method-body decoding is a permanent, deterministic condition of the
/// input bytes: there is no retry policy and no partial result. Each decode variant carries the
/// byte offset at which decoding failed, so callers can report "malformed method body at
/// offset N" directly.
///
/// # Error Categories
///
/// ## Method Header Errors
/// - [`Error::HeaderFormat`] - Header is neither tiny nor fat, or a fat header field is invalid
/// - [`Error::TruncatedHeader`] - A fixed-size header field would read past the buffer end
/// - [`Error::UnsupportedFeature`] - Header announces data this crate does not interpret
///
/// ## Instruction Decoding Errors
/// - [`Error::UnknownOpcode`] - An opcode byte with no table entry
/// - [`Error::TruncatedOperand`] - An instruction's operand would read past the code-region end
///
/// ## General Errors
/// - [`Error::OutOfBounds`] - Attempted to read or seek beyond buffer boundaries
/// - [`Error::Malformed`] - Input value that is structurally readable but nonsensical
///
/// # Examples
///
/// ```rust
/// use cilbody::{Error, MethodBody};
///
/// // Low bits 0b00 are neither a tiny nor a fat header.
/// match MethodBody::parse(&[0x00], 0) {
///     Err(Error::HeaderFormat { offset, .. }) => assert_eq!(offset, 0),
///     other => panic!("unexpected result: {:?}", other.err()),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The method header bytes do not form a valid tiny or fat header.
    ///
    /// Raised when the low two bits of the first header byte are neither the tiny (`0b10`) nor
    /// the fat (`0b11`) pattern, and when a fat header's size field (bits 12-15 of the first
    /// 16-bit word) is not exactly 3 four-byte words.
    #[error("malformed method header at offset {offset}: {detail}")]
    HeaderFormat {
        /// Offset of the header within the parsed buffer
        offset: usize,
        /// What about the header was malformed
        detail: &'static str,
    },

    /// A fixed-size method header field would read past the end of the buffer.
    #[error("method header truncated at offset {offset}")]
    TruncatedHeader {
        /// Offset of the header within the parsed buffer
        offset: usize,
    },

    /// The method header announces data this crate does not interpret.
    ///
    /// Currently this is the fat header's more-sections flag: extra sections carry exception
    /// handler tables, which are outside the scope of this crate and must not be silently
    /// skipped over.
    #[error("unsupported method body feature at offset {offset}: {feature}")]
    UnsupportedFeature {
        /// Offset of the header within the parsed buffer
        offset: usize,
        /// The announced feature that is not supported
        feature: &'static str,
    },

    /// An opcode byte (or the second byte after the `0xFE` escape) has no table entry.
    #[error("unknown opcode {prefix:#04x} {opcode:#04x} at offset {offset}")]
    UnknownOpcode {
        /// Start offset of the instruction within the code region
        offset: usize,
        /// `0xFE` for two-byte opcodes, `0` otherwise
        prefix: u8,
        /// The offending opcode byte
        opcode: u8,
    },

    /// An instruction's operand bytes would read past the end of the code region.
    ///
    /// Covers fixed-width operands, the switch count word, switch target slots, and the second
    /// opcode byte promised by a trailing `0xFE` escape.
    #[error("truncated instruction operand at offset {offset}")]
    TruncatedOperand {
        /// Start offset of the instruction within the code region
        offset: usize,
    },

    /// An out of bound access was attempted while parsing the buffer.
    ///
    /// This error occurs when trying to read or seek beyond the end of the data, or when a
    /// declared code region extends past the provided buffer. It's a safety check to prevent
    /// buffer overruns during parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The input is damaged in a way no dedicated variant describes.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}

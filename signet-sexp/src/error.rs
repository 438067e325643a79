//! Errors for parsing canonically encoded S-expressions.

/// An error that can occur when parsing a canonically encoded S-expression.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input ended before the expression was complete.
    #[error("Unexpected end of input at offset {offset}")]
    UnexpectedEnd {
        /// The offset at which further input was expected.
        offset: usize,
    },

    /// A byte that starts neither an atom nor a list was encountered.
    #[error("Unexpected byte {byte:#04x} at offset {offset}")]
    UnexpectedByte {
        /// The offending byte.
        byte: u8,
        /// The offset of the offending byte.
        offset: usize,
    },

    /// An atom length prefix does not fit into memory.
    #[error("Atom length at offset {offset} is too large")]
    LengthOverflow {
        /// The offset of the length prefix.
        offset: usize,
    },

    /// An atom length prefix carries a superfluous leading zero.
    #[error("Atom length at offset {offset} has a leading zero")]
    LeadingZero {
        /// The offset of the length prefix.
        offset: usize,
    },

    /// Lists are nested more deeply than the supported maximum.
    #[error("Expression exceeds the maximum nesting depth of {max_depth}")]
    NestedTooDeeply {
        /// The maximum supported nesting depth.
        max_depth: usize,
    },

    /// Further data follows the first complete expression.
    #[error("Trailing data after complete expression at offset {offset}")]
    TrailingData {
        /// The offset of the first trailing byte.
        offset: usize,
    },
}

//! Canonical S-expression model for cryptographic key objects and signature values.
//!
//! S-expressions are the lingua franca of gcrypt-compatible key stores and signing
//! backends: private keys, shadowed key stubs and signature values all travel as
//! nested lists of byte-string atoms. This crate provides the [`Sexp`] tree, a
//! strict parser for the *canonical* encoding (each atom prefixed with its decimal
//! length and a colon, for example `(7:sig-val(3:rsa(1:s4:\x01\x02\x03\x04)))`), a
//! writer producing the same encoding, and lookup helpers for navigating key
//! objects.
//!
//! Atoms may hold secret key parameters, so [`Sexp`] implements [`Zeroize`] and
//! wipes the whole tree recursively.
//!
//! # Examples
//!
//! ```
//! use signet_sexp::Sexp;
//!
//! # fn main() -> testresult::TestResult {
//! let sexp = Sexp::from_canonical(b"(7:sig-val(3:rsa(1:s3:abc)))")?;
//!
//! let rsa = sexp.find_token(b"rsa").ok_or("missing rsa list")?;
//! let s = rsa.find_token(b"s").ok_or("missing s list")?;
//! assert_eq!(s.nth(1).and_then(Sexp::as_atom), Some(b"abc".as_slice()));
//!
//! assert_eq!(sexp.to_canonical(), b"(7:sig-val(3:rsa(1:s3:abc)))");
//! # Ok(())
//! # }
//! ```

use std::fmt::{Display, Formatter};

use zeroize::Zeroize;

mod error;

pub use error::Error;

/// A single node of an S-expression tree.
///
/// A node is either a byte-string atom or a list of further nodes. Lists
/// describing key objects and signature values conventionally start with an
/// atom naming the list, for example `(q <bytes>)` or `(sig-val …)`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Sexp {
    /// A byte-string atom.
    Atom(Vec<u8>),
    /// A parenthesized list of nodes.
    List(Vec<Sexp>),
}

impl Sexp {
    /// The maximum nesting depth accepted by [`Sexp::from_canonical`].
    pub const MAX_DEPTH: usize = 64;

    /// Creates an atom from bytes.
    pub fn atom(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Atom(bytes.into())
    }

    /// Creates a list from nodes.
    pub fn list(items: impl Into<Vec<Sexp>>) -> Self {
        Self::List(items.into())
    }

    /// Returns the atom bytes if this node is an atom.
    pub fn as_atom(&self) -> Option<&[u8]> {
        match self {
            Self::Atom(bytes) => Some(bytes),
            Self::List(_) => None,
        }
    }

    /// Returns the list elements if this node is a list.
    pub fn as_list(&self) -> Option<&[Sexp]> {
        match self {
            Self::Atom(_) => None,
            Self::List(items) => Some(items),
        }
    }

    /// Returns the `index`-th element of a list.
    ///
    /// Returns [`None`] for atoms and for out of range indices.
    pub fn nth(&self, index: usize) -> Option<&Sexp> {
        self.as_list()?.get(index)
    }

    /// Returns the first element of a list as atom bytes.
    ///
    /// The first element of a named list is its tag, for example `sig-val` in
    /// `(sig-val …)`. Returns [`None`] for atoms, empty lists and lists that
    /// start with a sublist.
    pub fn head(&self) -> Option<&[u8]> {
        self.nth(0)?.as_atom()
    }

    /// Searches depth-first for a list whose first element is an atom equal
    /// to `token`.
    ///
    /// The receiver itself is the first candidate, so an enclosing tagged
    /// list wins over any tagged list nested inside it.
    ///
    /// # Examples
    ///
    /// ```
    /// use signet_sexp::Sexp;
    ///
    /// # fn main() -> testresult::TestResult {
    /// let key = Sexp::from_canonical(b"(11:private-key(3:dsa(1:q2:ab)))")?;
    ///
    /// let q = key.find_token(b"q").ok_or("missing q")?;
    /// assert_eq!(q.nth(1).and_then(Sexp::as_atom), Some(b"ab".as_slice()));
    /// assert!(key.find_token(b"p").is_none());
    /// # Ok(())
    /// # }
    /// ```
    pub fn find_token(&self, token: &[u8]) -> Option<&Sexp> {
        match self {
            Self::Atom(_) => None,
            Self::List(items) => {
                if let Some(Self::Atom(head)) = items.first() {
                    if head.as_slice() == token {
                        return Some(self);
                    }
                }
                items.iter().find_map(|item| item.find_token(token))
            }
        }
    }

    /// Parses a canonically encoded S-expression.
    ///
    /// The canonical encoding prefixes every atom with its decimal byte length
    /// and a colon and wraps lists in parentheses without any whitespace. The
    /// entire input must consist of exactly one expression.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if
    /// - the input ends before the expression is complete,
    /// - a byte starts neither an atom nor a list where one is expected,
    /// - an atom length prefix overflows, or carries a leading zero,
    /// - lists are nested more deeply than [`Sexp::MAX_DEPTH`],
    /// - data follows the first complete expression.
    ///
    /// # Examples
    ///
    /// ```
    /// use signet_sexp::Sexp;
    ///
    /// # fn main() -> testresult::TestResult {
    /// let sexp = Sexp::from_canonical(b"(4:data5:hello)")?;
    /// assert_eq!(sexp.head(), Some(b"data".as_slice()));
    ///
    /// assert!(Sexp::from_canonical(b"(4:data").is_err());
    /// assert!(Sexp::from_canonical(b"(4:data5:hello))").is_err());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_canonical(input: &[u8]) -> Result<Self, Error> {
        let mut parser = Parser { input, offset: 0 };
        let sexp = parser.element(0)?;
        if parser.offset != input.len() {
            return Err(Error::TrailingData {
                offset: parser.offset,
            });
        }
        Ok(sexp)
    }

    /// Appends the canonical encoding of this expression to `output`.
    pub fn write_canonical(&self, output: &mut Vec<u8>) {
        match self {
            Self::Atom(bytes) => {
                output.extend_from_slice(bytes.len().to_string().as_bytes());
                output.push(b':');
                output.extend_from_slice(bytes);
            }
            Self::List(items) => {
                output.push(b'(');
                for item in items {
                    item.write_canonical(output);
                }
                output.push(b')');
            }
        }
    }

    /// Returns the canonical encoding of this expression.
    pub fn to_canonical(&self) -> Vec<u8> {
        let mut output = Vec::new();
        self.write_canonical(&mut output);
        output
    }
}

impl Zeroize for Sexp {
    fn zeroize(&mut self) {
        match self {
            Self::Atom(bytes) => bytes.zeroize(),
            Self::List(items) => items.zeroize(),
        }
    }
}

/// Displays the expression in advanced form for diagnostics.
///
/// Atoms made up of token characters print verbatim, all other atoms print as
/// `#`-delimited hex. This form is for humans; interchange uses
/// [`Sexp::to_canonical`].
impl Display for Sexp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Atom(bytes) => {
                if is_token(bytes) {
                    for byte in bytes {
                        write!(f, "{}", char::from(*byte))?;
                    }
                    Ok(())
                } else {
                    write!(f, "#")?;
                    for byte in bytes {
                        write!(f, "{byte:02x}")?;
                    }
                    write!(f, "#")
                }
            }
            Self::List(items) => {
                write!(f, "(")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Checks whether an atom consists of token characters only.
///
/// Token atoms must not be empty and must not start with a digit, as that
/// would collide with a length prefix in the advanced form.
fn is_token(bytes: &[u8]) -> bool {
    !bytes.is_empty()
        && !bytes[0].is_ascii_digit()
        && bytes.iter().all(|byte| {
            byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'/' | b'+' | b'*' | b'=')
        })
}

struct Parser<'a> {
    input: &'a [u8],
    offset: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.offset).copied()
    }

    fn element(&mut self, depth: usize) -> Result<Sexp, Error> {
        match self.peek() {
            None => Err(Error::UnexpectedEnd {
                offset: self.offset,
            }),
            Some(b'(') => self.list(depth),
            Some(byte) if byte.is_ascii_digit() => self.atom(),
            Some(byte) => Err(Error::UnexpectedByte {
                byte,
                offset: self.offset,
            }),
        }
    }

    fn list(&mut self, depth: usize) -> Result<Sexp, Error> {
        if depth >= Sexp::MAX_DEPTH {
            return Err(Error::NestedTooDeeply {
                max_depth: Sexp::MAX_DEPTH,
            });
        }
        // consume '('
        self.offset += 1;
        let mut items = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(Error::UnexpectedEnd {
                        offset: self.offset,
                    });
                }
                Some(b')') => {
                    self.offset += 1;
                    return Ok(Sexp::List(items));
                }
                Some(_) => items.push(self.element(depth + 1)?),
            }
        }
    }

    fn atom(&mut self) -> Result<Sexp, Error> {
        let start = self.offset;
        let mut length: usize = 0;
        while let Some(byte) = self.peek() {
            if byte == b':' {
                break;
            }
            if !byte.is_ascii_digit() {
                return Err(Error::UnexpectedByte {
                    byte,
                    offset: self.offset,
                });
            }
            length = length
                .checked_mul(10)
                .and_then(|length| length.checked_add(usize::from(byte - b'0')))
                .ok_or(Error::LengthOverflow { offset: start })?;
            self.offset += 1;
        }
        if self.peek() != Some(b':') {
            return Err(Error::UnexpectedEnd {
                offset: self.offset,
            });
        }
        if self.offset - start > 1 && self.input[start] == b'0' {
            return Err(Error::LeadingZero { offset: start });
        }
        // consume ':'
        self.offset += 1;
        let end = self
            .offset
            .checked_add(length)
            .ok_or(Error::LengthOverflow { offset: start })?;
        if end > self.input.len() {
            return Err(Error::UnexpectedEnd {
                offset: self.input.len(),
            });
        }
        let bytes = self.input[self.offset..end].to_vec();
        self.offset = end;
        Ok(Sexp::Atom(bytes))
    }
}

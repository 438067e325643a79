//! Signature values and their wire format.

use signet_sexp::Sexp;

use crate::key::KeyFamily;

/// A signature produced by one of the signing backends.
///
/// Components are big-endian integers in signed-magnitude form: a value whose
/// most significant bit is set carries a leading zero byte.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Signature {
    /// An RSA signature.
    Rsa {
        /// The signature value.
        s: Vec<u8>,
    },

    /// A DSA signature.
    Dsa {
        /// The first signature component.
        r: Vec<u8>,
        /// The second signature component.
        s: Vec<u8>,
    },

    /// An ECDSA signature.
    Ecdsa {
        /// The first signature component.
        r: Vec<u8>,
        /// The second signature component.
        s: Vec<u8>,
    },

    /// An EdDSA signature.
    EdDsa {
        /// The first signature component.
        r: Vec<u8>,
        /// The second signature component.
        s: Vec<u8>,
    },
}

impl Signature {
    /// Returns the family of the key that produced this signature.
    pub fn family(&self) -> KeyFamily {
        match self {
            Self::Rsa { .. } => KeyFamily::Rsa,
            Self::Dsa { .. } => KeyFamily::Dsa,
            Self::Ecdsa { .. } => KeyFamily::Ecdsa,
            Self::EdDsa { .. } => KeyFamily::EdDsa,
        }
    }

    /// Renders the signature as a `sig-val` S-expression.
    ///
    /// The form is `(sig-val (rsa (s <bytes>)))` for RSA signatures and
    /// `(sig-val (<family> (r <bytes>) (s <bytes>)))` for the two component
    /// families `dsa`, `ecdsa` and `eddsa`.
    pub fn to_sexp(&self) -> Sexp {
        let component =
            |name: &[u8], bytes: &[u8]| Sexp::list([Sexp::atom(name), Sexp::atom(bytes)]);
        let components = match self {
            Self::Rsa { s } => vec![component(b"s", s)],
            Self::Dsa { r, s } | Self::Ecdsa { r, s } | Self::EdDsa { r, s } => {
                vec![component(b"r", r), component(b"s", s)]
            }
        };

        let mut family = vec![Sexp::atom(<&'static str>::from(self.family()).as_bytes())];
        family.extend(components);
        Sexp::list([Sexp::atom(*b"sig-val"), Sexp::list(family)])
    }

    /// Appends the canonical wire encoding of the signature to `output`.
    ///
    /// # Examples
    ///
    /// ```
    /// use signet_sign::Signature;
    ///
    /// let signature = Signature::Rsa {
    ///     s: vec![0x01, 0x02, 0x03],
    /// };
    ///
    /// let mut wire = Vec::new();
    /// signature.write_canonical(&mut wire);
    /// assert_eq!(wire, b"(7:sig-val(3:rsa(1:s3:\x01\x02\x03)))");
    /// ```
    pub fn write_canonical(&self, output: &mut Vec<u8>) {
        self.to_sexp().write_canonical(output);
    }
}

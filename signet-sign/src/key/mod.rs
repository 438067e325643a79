//! Key identifiers, key handles and algorithm classification.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use signet_sexp::Sexp;
use zeroize::{Zeroize, ZeroizeOnDrop};

mod classify;

pub use classify::classify;

/// An error that can occur when dealing with keys.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A keygrip is not valid.
    #[error("Invalid keygrip: {keygrip}")]
    InvalidKeygrip {
        /// The string that does not constitute a valid keygrip.
        keygrip: String,
    },

    /// A key object cannot be validated.
    #[error("Unable to validate the key object: no recognized key list found")]
    UnrecognizedKey,
}

/// The keygrip of a key.
///
/// A keygrip is a 20 byte identifier computed over the public parameters of a
/// key, independent of the key's storage format and of the protocol the key
/// is used with. It is written as 40 hexadecimal characters.
///
/// # Examples
///
/// ```
/// use signet_sign::Keygrip;
///
/// # fn main() -> testresult::TestResult {
/// let keygrip: Keygrip = "5EA4DC50BB05BDCC66F199A22CEF800C276C75C8".parse()?;
/// assert_eq!(keygrip.to_string(), "5ea4dc50bb05bdcc66f199a22cef800c276c75c8");
///
/// // the input must be exactly 40 hexadecimal characters
/// assert!("5ea4dc50".parse::<Keygrip>().is_err());
/// assert!("not-a-keygrip-but-40-characters-long....".parse::<Keygrip>().is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(into = "String", try_from = "String")]
pub struct Keygrip([u8; 20]);

impl Keygrip {
    /// Creates a new keygrip from a hexadecimal string.
    ///
    /// # Errors
    ///
    /// Returns an [`Error::InvalidKeygrip`] if the input is not exactly 40
    /// hexadecimal characters.
    pub fn new(keygrip: &str) -> Result<Self, Error> {
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(keygrip, &mut bytes).map_err(|_| Error::InvalidKeygrip {
            keygrip: keygrip.to_string(),
        })?;
        Ok(Self(bytes))
    }

    /// Returns the raw bytes of the keygrip.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl From<[u8; 20]> for Keygrip {
    fn from(value: [u8; 20]) -> Self {
        Self(value)
    }
}

impl From<Keygrip> for String {
    fn from(value: Keygrip) -> Self {
        value.to_string()
    }
}

impl FromStr for Keygrip {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Display for Keygrip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl TryFrom<&str> for Keygrip {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for Keygrip {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Private key material in its S-expression form.
///
/// Wraps one of the key object forms `private-key`, `protected-private-key`,
/// `shadowed-private-key` or `public-key`. The wrapped expression may contain
/// secret parameters and is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial(Sexp);

impl KeyMaterial {
    /// Creates key material from a parsed key object.
    pub fn new(sexp: Sexp) -> Self {
        Self(sexp)
    }

    /// Parses key material from its canonical encoding.
    ///
    /// # Errors
    ///
    /// Returns a [`signet_sexp::Error`] if the input is not a valid canonical
    /// S-expression.
    pub fn from_canonical(input: &[u8]) -> Result<Self, signet_sexp::Error> {
        Ok(Self(Sexp::from_canonical(input)?))
    }

    /// Returns the key object.
    pub fn sexp(&self) -> &Sexp {
        &self.0
    }
}

/// Key material may contain secret parameters which must not end up in logs.
impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("KeyMaterial").field(&"[REDACTED]").finish()
    }
}

/// The device slot description of a key stored on an external device.
///
/// Shadowed key objects do not carry private parameters. Instead they
/// reference a key on an external device, for example by serial number and
/// key reference. The content is opaque to the engine and passed to the
/// device signer verbatim.
#[derive(Clone, Debug)]
pub struct ShadowInfo(Sexp);

impl ShadowInfo {
    /// Creates a device slot description from its S-expression form.
    pub fn new(sexp: Sexp) -> Self {
        Self(sexp)
    }

    /// Returns the S-expression form.
    pub fn sexp(&self) -> &Sexp {
        &self.0
    }
}

/// A private key resolved from the key store.
#[derive(Clone, Debug)]
pub enum KeyHandle {
    /// A key whose private parameters are available locally.
    Local(KeyMaterial),

    /// A key that lives on an external device.
    Diverted {
        /// The shadowed key object, used for algorithm classification.
        key: KeyMaterial,
        /// The opaque device slot description.
        shadow_info: ShadowInfo,
    },
}

impl KeyHandle {
    /// Returns the key object backing the handle.
    ///
    /// For diverted keys this is the shadowed key object, which carries the
    /// public parameters needed for classification.
    pub fn key(&self) -> &KeyMaterial {
        match self {
            Self::Local(key) | Self::Diverted { key, .. } => key,
        }
    }
}

/// The algorithm family of a key.
#[derive(
    Clone,
    Copy,
    Debug,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum KeyFamily {
    /// RSA.
    Rsa,

    /// DSA over a multiplicative subgroup.
    Dsa,

    /// ECDSA over a Weierstrass curve.
    Ecdsa,

    /// EdDSA over a twisted Edwards curve.
    EdDsa,
}

/// The classification of a key object.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct KeyAlgorithmInfo {
    /// The algorithm family of the key.
    pub family: KeyFamily,

    /// The bit size of the subgroup or curve order.
    ///
    /// Drives the digest size requirements for DSA and ECDSA keys. `0` when
    /// the key object does not reveal it.
    pub group_bits: u32,

    /// The overall public bit size of the key.
    ///
    /// The modulus size for RSA, the prime size for DSA and the curve size
    /// for elliptic curve keys. `0` when the key object does not reveal it.
    pub key_bits: u32,
}

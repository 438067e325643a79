//! The signing request model.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::key::Keygrip;

/// A digest algorithm known to the signing engine.
///
/// The canonical names are lower case (`sha256`, `ripemd160`, …).
/// [`DigestAlgorithm::Md5Sha1`] identifies the combined MD5 and SHA-1 digest
/// used by TLS 1.0, a 36 byte concatenation that carries no digest info
/// structure of its own. Names this crate does not know are preserved in
/// [`DigestAlgorithm::Other`], so that requests for unusual algorithms keep
/// working.
///
/// # Examples
///
/// ```
/// use signet_sign::DigestAlgorithm;
///
/// # fn main() -> testresult::TestResult {
/// // parsing is case insensitive
/// assert_eq!("SHA256".parse::<DigestAlgorithm>()?, DigestAlgorithm::Sha256);
/// assert_eq!(DigestAlgorithm::Sha256.to_string(), "sha256");
///
/// // unknown names are preserved
/// let algorithm: DigestAlgorithm = "whirlpool".parse()?;
/// assert_eq!(algorithm, DigestAlgorithm::Other("whirlpool".to_string()));
/// # Ok(())
/// # }
/// ```
#[derive(
    Clone,
    Debug,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
)]
#[serde(into = "String", try_from = "String")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum DigestAlgorithm {
    /// The MD5 digest algorithm.
    Md5,

    /// The SHA-1 digest algorithm.
    Sha1,

    /// The RIPEMD-160 digest algorithm.
    Ripemd160,

    /// The SHA-224 digest algorithm.
    Sha224,

    /// The SHA-256 digest algorithm.
    Sha256,

    /// The SHA-384 digest algorithm.
    Sha384,

    /// The SHA-512 digest algorithm.
    Sha512,

    /// The SHA3-256 digest algorithm.
    #[strum(serialize = "sha3-256")]
    Sha3_256,

    /// The SHA3-512 digest algorithm.
    #[strum(serialize = "sha3-512")]
    Sha3_512,

    /// The combined MD5 and SHA-1 digest used by TLS 1.0.
    #[strum(serialize = "tls-md5sha1")]
    Md5Sha1,

    /// A digest algorithm unknown to this crate.
    #[strum(default)]
    Other(String),
}

impl DigestAlgorithm {
    /// Returns the lower cased name of the digest algorithm.
    pub fn name(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

impl From<DigestAlgorithm> for String {
    fn from(value: DigestAlgorithm) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for DigestAlgorithm {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The passphrase cache behavior the key store applies when unlocking a key.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    Eq,
    Hash,
    PartialEq,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
pub enum CacheMode {
    /// Do not consult the passphrase cache.
    Ignore,

    /// Use the passphrase cache the default way.
    #[default]
    Normal,

    /// Use the cache slot for user initiated operations.
    User,

    /// Use the cache slot for SSH operations.
    Ssh,

    /// Use a caller provided cache nonce.
    Nonce,
}

/// The digest to be signed, together with its declared algorithm.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RequestDigest {
    algorithm: DigestAlgorithm,
    #[serde(
        deserialize_with = "hex::serde::deserialize",
        serialize_with = "hex::serde::serialize"
    )]
    value: Vec<u8>,
    #[serde(default)]
    raw_value: bool,
}

impl RequestDigest {
    /// Creates a digest from its algorithm and value.
    pub fn new(algorithm: DigestAlgorithm, value: impl Into<Vec<u8>>) -> Self {
        Self {
            algorithm,
            value: value.into(),
            raw_value: false,
        }
    }

    /// Marks the digest to be signed as a bare integer, without a PKCS#1 frame.
    #[must_use]
    pub fn into_raw(mut self) -> Self {
        self.raw_value = true;
        self
    }

    /// Returns the algorithm the digest was created with.
    pub fn algorithm(&self) -> &DigestAlgorithm {
        &self.algorithm
    }

    /// Returns the digest bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Returns whether the digest is signed as a bare integer.
    pub fn is_raw(&self) -> bool {
        self.raw_value
    }
}

/// A request to produce a signature over a digest.
///
/// Carries everything the engine needs for one signing operation: the keygrip
/// of the signing key, the digest (or override data) to sign and the cache
/// hints forwarded to the key store. Requests are built once and are immutable
/// afterwards.
///
/// # Examples
///
/// ```
/// use signet_sign::{DigestAlgorithm, RequestDigest, SigningRequest};
///
/// # fn main() -> testresult::TestResult {
/// let request = SigningRequest::new(RequestDigest::new(DigestAlgorithm::Sha256, [0x11; 32]))
///     .with_keygrip("5e2f2a5282b72f2ebfc588ff925c73a5a452ca19".parse()?)
///     .with_description("Please confirm signing the release manifest");
///
/// assert_eq!(request.data_to_sign(), [0x11; 32]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SigningRequest {
    keygrip: Option<Keygrip>,
    digest: RequestDigest,
    override_data: Option<Vec<u8>>,
    cache_nonce: Option<String>,
    description: Option<String>,
    #[serde(default)]
    cache_mode: CacheMode,
    cache_ttl: Option<Duration>,
}

impl SigningRequest {
    /// Creates a new signing request for `digest`.
    pub fn new(digest: RequestDigest) -> Self {
        Self {
            keygrip: None,
            digest,
            override_data: None,
            cache_nonce: None,
            description: None,
            cache_mode: CacheMode::default(),
            cache_ttl: None,
        }
    }

    /// Sets the keygrip of the key to sign with.
    #[must_use]
    pub fn with_keygrip(mut self, keygrip: Keygrip) -> Self {
        self.keygrip = Some(keygrip);
        self
    }

    /// Replaces the data to be signed.
    ///
    /// When set, the signature covers this data instead of the digest value.
    /// For EdDSA keys the engine passes it on verbatim.
    #[must_use]
    pub fn with_override_data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.override_data = Some(data.into());
        self
    }

    /// Attaches a cache nonce forwarded to the key store.
    #[must_use]
    pub fn with_cache_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.cache_nonce = Some(nonce.into());
        self
    }

    /// Attaches a description of what is being signed.
    ///
    /// Key stores that prompt for a passphrase display this text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the passphrase cache mode forwarded to the key store.
    #[must_use]
    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    /// Sets the passphrase cache time to live forwarded to the key store.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// Returns the keygrip of the key to sign with.
    pub fn keygrip(&self) -> Option<&Keygrip> {
        self.keygrip.as_ref()
    }

    /// Returns the digest to be signed.
    pub fn digest(&self) -> &RequestDigest {
        &self.digest
    }

    /// Returns the override data, if any.
    pub fn override_data(&self) -> Option<&[u8]> {
        self.override_data.as_deref()
    }

    /// Returns the data the signature must cover.
    ///
    /// This is the override data if set and the digest value otherwise.
    pub fn data_to_sign(&self) -> &[u8] {
        match &self.override_data {
            Some(data) => data,
            None => self.digest.value(),
        }
    }

    /// Returns the cache nonce, if any.
    pub fn cache_nonce(&self) -> Option<&str> {
        self.cache_nonce.as_deref()
    }

    /// Returns the description of what is being signed, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the passphrase cache mode.
    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    /// Returns the passphrase cache time to live, if any.
    pub fn cache_ttl(&self) -> Option<Duration> {
        self.cache_ttl
    }
}

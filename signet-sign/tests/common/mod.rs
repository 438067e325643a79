//! Utilities used for test setups.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use signet_sexp::Sexp;
use signet_sign::{
    CacheMode,
    DeviceError,
    DeviceSigner,
    DigestAlgorithm,
    EncodedDigest,
    KeyHandle,
    KeyLookupError,
    KeyMaterial,
    KeyStore,
    Keygrip,
    PrimitiveError,
    ShadowInfo,
    Signature,
    SigningPrimitive,
};

pub static DEFAULT_KEYGRIP: &str = "5e2f2a5282b72f2ebfc588ff925c73a5a452ca19";

/// The passphrase cache hints a key store received with a lookup.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CacheHints {
    pub cache_nonce: Option<String>,
    pub description: Option<String>,
    pub cache_mode: CacheMode,
    pub ttl: Option<Duration>,
}

/// A key store resolving keygrips from a fixed table.
///
/// Records the cache hints of every lookup.
#[derive(Debug)]
pub struct MemoryKeyStore {
    keys: HashMap<Keygrip, KeyHandle>,
    pub hints: Arc<Mutex<Vec<CacheHints>>>,
}

impl MemoryKeyStore {
    pub fn new(entries: impl IntoIterator<Item = (Keygrip, KeyHandle)>) -> Self {
        Self {
            keys: entries.into_iter().collect(),
            hints: Arc::default(),
        }
    }
}

impl KeyStore for MemoryKeyStore {
    fn resolve(
        &self,
        keygrip: &Keygrip,
        cache_nonce: Option<&str>,
        description: Option<&str>,
        cache_mode: CacheMode,
        ttl: Option<Duration>,
    ) -> Result<KeyHandle, KeyLookupError> {
        self.hints.lock().unwrap().push(CacheHints {
            cache_nonce: cache_nonce.map(str::to_string),
            description: description.map(str::to_string),
            cache_mode,
            ttl,
        });
        self.keys
            .get(keygrip)
            .cloned()
            .ok_or(KeyLookupError::NoSecretKey)
    }
}

/// A key store whose backing storage fails on every lookup.
#[derive(Debug)]
pub struct BrokenKeyStore;

impl KeyStore for BrokenKeyStore {
    fn resolve(
        &self,
        _keygrip: &Keygrip,
        _cache_nonce: Option<&str>,
        _description: Option<&str>,
        _cache_mode: CacheMode,
        _ttl: Option<Duration>,
    ) -> Result<KeyHandle, KeyLookupError> {
        Err(KeyLookupError::Backend {
            context: "reading the key file",
            source: std::io::Error::other("storage is gone").into(),
        })
    }
}

/// A device that answers every request with a fixed buffer.
///
/// Records the data of every request.
#[derive(Debug)]
pub struct ScriptedDevice {
    response: Vec<u8>,
    pub seen: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ScriptedDevice {
    pub fn new(response: impl Into<Vec<u8>>) -> Self {
        Self {
            response: response.into(),
            seen: Arc::default(),
        }
    }
}

impl DeviceSigner for ScriptedDevice {
    fn sign_digest(
        &self,
        data: &[u8],
        _algorithm: &DigestAlgorithm,
        _shadow_info: &ShadowInfo,
    ) -> Result<Vec<u8>, DeviceError> {
        self.seen.lock().unwrap().push(data.to_vec());
        Ok(self.response.clone())
    }
}

/// A device backed by an actual Ed25519 key.
#[derive(Debug)]
pub struct Ed25519Device {
    key: SigningKey,
}

impl Ed25519Device {
    pub fn new(seed: [u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        self.key.verifying_key()
    }
}

impl DeviceSigner for Ed25519Device {
    fn sign_digest(
        &self,
        data: &[u8],
        _algorithm: &DigestAlgorithm,
        _shadow_info: &ShadowInfo,
    ) -> Result<Vec<u8>, DeviceError> {
        Ok(self.key.sign(data).to_bytes().to_vec())
    }
}

/// A device that is not connected.
#[derive(Debug)]
pub struct OfflineDevice;

impl DeviceSigner for OfflineDevice {
    fn sign_digest(
        &self,
        _data: &[u8],
        _algorithm: &DigestAlgorithm,
        _shadow_info: &ShadowInfo,
    ) -> Result<Vec<u8>, DeviceError> {
        Err(DeviceError {
            context: "talking to the device",
            source: "no device is connected".into(),
        })
    }
}

/// A primitive that returns a fixed signature.
///
/// Records the encoded digests it is called with.
#[derive(Debug)]
pub struct RecordingPrimitive {
    signature: Signature,
    pub seen: Arc<Mutex<Vec<EncodedDigest>>>,
}

impl RecordingPrimitive {
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            seen: Arc::default(),
        }
    }
}

impl SigningPrimitive for RecordingPrimitive {
    fn sign(
        &self,
        digest: &EncodedDigest,
        _key: &KeyMaterial,
    ) -> Result<Signature, PrimitiveError> {
        self.seen.lock().unwrap().push(digest.clone());
        Ok(self.signature.clone())
    }
}

/// A primitive whose signing arithmetic fails.
#[derive(Debug)]
pub struct FailingPrimitive;

impl SigningPrimitive for FailingPrimitive {
    fn sign(
        &self,
        _digest: &EncodedDigest,
        _key: &KeyMaterial,
    ) -> Result<Signature, PrimitiveError> {
        Err(PrimitiveError {
            context: "creating a signature",
            source: "the key material is garbled".into(),
        })
    }
}

/// An integer atom of exactly `bits` bits with the top bit set.
pub fn integer(bits: usize) -> Sexp {
    let mut bytes = vec![0u8; bits.div_ceil(8)];
    bytes[0] = 0x80 >> (bytes.len() * 8 - bits);
    Sexp::atom(bytes)
}

/// A named parameter list, such as `(n <value>)`.
pub fn parameter(name: &[u8], value: Sexp) -> Sexp {
    Sexp::list([Sexp::atom(name), value])
}

/// Builds a local RSA key object with a modulus of `bits` bits.
pub fn rsa_key(bits: usize) -> KeyMaterial {
    KeyMaterial::new(Sexp::list([
        Sexp::atom(*b"private-key"),
        Sexp::list([
            Sexp::atom(*b"rsa"),
            parameter(b"n", integer(bits)),
            parameter(b"e", Sexp::atom(*b"\x01\x00\x01")),
            parameter(b"d", integer(bits)),
        ]),
    ]))
}

/// Builds a local DSA key object with a `p_bits` prime and a `q_bits` subgroup.
pub fn dsa_key(p_bits: usize, q_bits: usize) -> KeyMaterial {
    KeyMaterial::new(Sexp::list([
        Sexp::atom(*b"private-key"),
        Sexp::list([
            Sexp::atom(*b"dsa"),
            parameter(b"p", integer(p_bits)),
            parameter(b"q", integer(q_bits)),
            parameter(b"g", integer(p_bits - 1)),
            parameter(b"y", integer(p_bits - 1)),
            parameter(b"x", integer(q_bits - 1)),
        ]),
    ]))
}

/// Builds a local elliptic curve key object on the named curve.
pub fn ecc_key(curve: &str, eddsa: bool) -> KeyMaterial {
    KeyMaterial::new(Sexp::list([
        Sexp::atom(*b"private-key"),
        ecc_parameters(curve, eddsa),
    ]))
}

/// Builds a diverted key handle for a key stored on a device.
pub fn diverted_handle(curve: &str, eddsa: bool) -> KeyHandle {
    let key = KeyMaterial::new(Sexp::list([
        Sexp::atom(*b"shadowed-private-key"),
        ecc_parameters(curve, eddsa),
    ]));
    let shadow_info = ShadowInfo::new(Sexp::list([
        Sexp::atom(*b"D2760001240102000000000000010000"),
        Sexp::atom(*b"OPENPGP.1"),
    ]));
    KeyHandle::Diverted { key, shadow_info }
}

fn ecc_parameters(curve: &str, eddsa: bool) -> Sexp {
    let mut parameters = vec![
        Sexp::atom(*b"ecc"),
        parameter(b"curve", Sexp::atom(curve.as_bytes())),
    ];
    if eddsa {
        parameters.push(Sexp::list([Sexp::atom(*b"flags"), Sexp::atom(*b"eddsa")]));
    }
    parameters.push(parameter(b"q", integer(256)));
    Sexp::list(parameters)
}

//! Algorithm classification of key objects.

use signet_sexp::Sexp;

use super::{Error, KeyAlgorithmInfo, KeyFamily, KeyMaterial};

/// The key object tags tried when locating the algorithm parameters.
const KEY_OBJECT_TAGS: [&[u8]; 4] = [
    b"private-key",
    b"protected-private-key",
    b"shadowed-private-key",
    b"public-key",
];

/// Classifies a key object into its algorithm family and bit sizes.
///
/// The key object is one of the list forms `(private-key (<algo> …))`,
/// `(protected-private-key …)`, `(shadowed-private-key …)` or
/// `(public-key …)`. The algorithm name decides the family: `dsa` keys are
/// DSA, `ecc` keys carrying an `eddsa` flag (as well as `eddsa` keys) are
/// EdDSA, remaining `ecc` and `ecdsa` keys are ECDSA and every other name is
/// treated as RSA.
///
/// The group size is taken from the `q` parameter for DSA keys and from the
/// `curve` name for elliptic curve keys. The overall key size is the bit
/// length of the RSA modulus `n`, of the DSA prime `p`, or the curve size.
/// Sizes a key object does not reveal are reported as `0`.
///
/// # Errors
///
/// Returns an [`Error::UnrecognizedKey`] if none of the known key object
/// forms is present or the algorithm parameter list is missing.
///
/// # Examples
///
/// ```
/// use signet_sexp::Sexp;
/// use signet_sign::{KeyFamily, KeyMaterial, classify_key};
///
/// # fn main() -> testresult::TestResult {
/// let key = KeyMaterial::new(Sexp::list([
///     Sexp::atom(*b"shadowed-private-key"),
///     Sexp::list([
///         Sexp::atom(*b"ecc"),
///         Sexp::list([Sexp::atom(*b"curve"), Sexp::atom(*b"NIST P-256")]),
///     ]),
/// ]));
///
/// let info = classify_key(&key)?;
/// assert_eq!(info.family, KeyFamily::Ecdsa);
/// assert_eq!(info.group_bits, 256);
/// # Ok(())
/// # }
/// ```
pub fn classify(key: &KeyMaterial) -> Result<KeyAlgorithmInfo, Error> {
    let parameters = key_parameters(key.sexp()).ok_or(Error::UnrecognizedKey)?;
    let name = parameters.head().ok_or(Error::UnrecognizedKey)?;

    let family = match name {
        b"dsa" => KeyFamily::Dsa,
        b"eddsa" => KeyFamily::EdDsa,
        b"ecc" => {
            if has_eddsa_flag(parameters) {
                KeyFamily::EdDsa
            } else {
                KeyFamily::Ecdsa
            }
        }
        b"ecdsa" => KeyFamily::Ecdsa,
        _ => KeyFamily::Rsa,
    };

    Ok(match family {
        KeyFamily::Rsa => KeyAlgorithmInfo {
            family,
            group_bits: 0,
            key_bits: parameter_bits(parameters, b"n"),
        },
        KeyFamily::Dsa => KeyAlgorithmInfo {
            family,
            group_bits: parameter_bits(parameters, b"q"),
            key_bits: parameter_bits(parameters, b"p"),
        },
        KeyFamily::Ecdsa | KeyFamily::EdDsa => {
            let bits = curve_bits(parameters);
            KeyAlgorithmInfo {
                family,
                group_bits: bits,
                key_bits: bits,
            }
        }
    })
}

/// Locates the algorithm parameter list inside a key object.
///
/// Tries the known key object tags in order and returns the second element of
/// the first matching list.
fn key_parameters(key: &Sexp) -> Option<&Sexp> {
    KEY_OBJECT_TAGS
        .iter()
        .copied()
        .find_map(|tag| key.find_token(tag))
        .and_then(|object| object.nth(1))
}

/// Checks whether the parameter list carries an `eddsa` flag.
fn has_eddsa_flag(parameters: &Sexp) -> bool {
    parameters
        .find_token(b"flags")
        .and_then(Sexp::as_list)
        .is_some_and(|items| {
            items[1..]
                .iter()
                .any(|item| item.as_atom() == Some(b"eddsa".as_slice()))
        })
}

/// Returns the bit length of a named integer parameter, or `0` if absent.
fn parameter_bits(parameters: &Sexp, name: &[u8]) -> u32 {
    parameters
        .find_token(name)
        .and_then(|list| list.nth(1))
        .and_then(Sexp::as_atom)
        .map(bit_length)
        .unwrap_or(0)
}

/// Returns the position of the highest set bit of a big-endian integer.
///
/// Leading zero bytes do not contribute. Returns `0` for an empty or all zero
/// value.
fn bit_length(bytes: &[u8]) -> u32 {
    for (index, byte) in bytes.iter().enumerate() {
        if *byte != 0 {
            return ((bytes.len() - index) * 8) as u32 - byte.leading_zeros();
        }
    }
    0
}

/// Returns the bit size of the curve named in the parameter list.
///
/// Covers the curves key objects in the wild use. Unknown and missing curve
/// names yield `0`, which downstream validation rejects.
fn curve_bits(parameters: &Sexp) -> u32 {
    let Some(curve) = parameters
        .find_token(b"curve")
        .and_then(|list| list.nth(1))
        .and_then(Sexp::as_atom)
    else {
        return 0;
    };

    match String::from_utf8_lossy(curve).to_ascii_lowercase().as_str() {
        "nist p-256" | "secp256r1" | "prime256v1" | "nistp256" => 256,
        "nist p-384" | "secp384r1" | "nistp384" => 384,
        "nist p-521" | "secp521r1" | "nistp521" => 521,
        "secp256k1" => 256,
        "brainpoolp256r1" => 256,
        "brainpoolp384r1" => 384,
        "brainpoolp512r1" => 512,
        "ed25519" | "curve25519" | "x25519" => 255,
        "ed448" | "x448" => 448,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testresult::TestResult;

    use super::*;

    /// Builds a key object with `tag` around an algorithm parameter list.
    fn key_object(tag: &[u8], parameters: Sexp) -> KeyMaterial {
        KeyMaterial::new(Sexp::list([Sexp::atom(tag), parameters]))
    }

    /// An integer atom of `bits` bits with the top bit set.
    fn integer(bits: usize) -> Sexp {
        let mut bytes = vec![0u8; bits.div_ceil(8)];
        bytes[0] = 0x80 >> (bytes.len() * 8 - bits);
        Sexp::atom(bytes)
    }

    fn parameter(name: &[u8], value: Sexp) -> Sexp {
        Sexp::list([Sexp::atom(name), value])
    }

    #[rstest]
    #[case::private(b"private-key".as_slice())]
    #[case::protected(b"protected-private-key".as_slice())]
    #[case::shadowed(b"shadowed-private-key".as_slice())]
    #[case::public(b"public-key".as_slice())]
    fn classify_finds_every_key_object_form(#[case] tag: &[u8]) -> TestResult {
        let key = key_object(
            tag,
            Sexp::list([
                Sexp::atom(*b"rsa"),
                parameter(b"n", integer(2048)),
                parameter(b"e", Sexp::atom([0x01, 0x00, 0x01])),
            ]),
        );

        let info = classify(&key)?;
        assert_eq!(info.family, KeyFamily::Rsa);
        assert_eq!(info.group_bits, 0);
        assert_eq!(info.key_bits, 2048);
        Ok(())
    }

    #[test]
    fn classify_reads_dsa_group_and_prime_sizes() -> TestResult {
        let key = key_object(
            b"private-key",
            Sexp::list([
                Sexp::atom(*b"dsa"),
                parameter(b"p", integer(3072)),
                parameter(b"q", integer(256)),
            ]),
        );

        let info = classify(&key)?;
        assert_eq!(info.family, KeyFamily::Dsa);
        assert_eq!(info.group_bits, 256);
        assert_eq!(info.key_bits, 3072);
        Ok(())
    }

    #[test]
    fn classify_reports_missing_dsa_group_as_zero() -> TestResult {
        let key = key_object(
            b"private-key",
            Sexp::list([Sexp::atom(*b"dsa"), parameter(b"p", integer(3072))]),
        );

        let info = classify(&key)?;
        assert_eq!(info.group_bits, 0);
        Ok(())
    }

    #[rstest]
    #[case(b"NIST P-256".as_slice(), 256)]
    #[case(b"secp384r1".as_slice(), 384)]
    #[case(b"NIST P-521".as_slice(), 521)]
    #[case(b"brainpoolP512r1".as_slice(), 512)]
    #[case(b"unknown-curve".as_slice(), 0)]
    fn classify_resolves_curve_sizes(#[case] curve: &[u8], #[case] bits: u32) -> TestResult {
        let key = key_object(
            b"shadowed-private-key",
            Sexp::list([Sexp::atom(*b"ecc"), parameter(b"curve", Sexp::atom(curve))]),
        );

        let info = classify(&key)?;
        assert_eq!(info.family, KeyFamily::Ecdsa);
        assert_eq!(info.group_bits, bits);
        assert_eq!(info.key_bits, bits);
        Ok(())
    }

    #[rstest]
    #[case::flagged_ecc(
        Sexp::list([
            Sexp::atom(*b"ecc"),
            Sexp::list([Sexp::atom(*b"flags"), Sexp::atom(*b"eddsa")]),
            Sexp::list([Sexp::atom(*b"curve"), Sexp::atom(*b"Ed25519")]),
        ]),
        255
    )]
    #[case::legacy_name(
        Sexp::list([
            Sexp::atom(*b"eddsa"),
            Sexp::list([Sexp::atom(*b"curve"), Sexp::atom(*b"Ed448")]),
        ]),
        448
    )]
    fn classify_detects_eddsa_keys(#[case] parameters: Sexp, #[case] bits: u32) -> TestResult {
        let key = key_object(b"private-key", parameters);
        let info = classify(&key)?;
        assert_eq!(info.family, KeyFamily::EdDsa);
        assert_eq!(info.group_bits, bits);
        Ok(())
    }

    #[test]
    fn ecc_without_eddsa_flag_is_ecdsa() -> TestResult {
        let key = key_object(
            b"private-key",
            Sexp::list([
                Sexp::atom(*b"ecc"),
                Sexp::list([Sexp::atom(*b"flags"), Sexp::atom(*b"param")]),
                parameter(b"curve", Sexp::atom(*b"NIST P-384")),
            ]),
        );

        assert_eq!(classify(&key)?.family, KeyFamily::Ecdsa);
        Ok(())
    }

    #[test]
    fn unknown_algorithm_names_classify_as_rsa() -> TestResult {
        let key = key_object(
            b"private-key",
            Sexp::list([Sexp::atom(*b"elg"), parameter(b"p", integer(2048))]),
        );

        assert_eq!(classify(&key)?.family, KeyFamily::Rsa);
        Ok(())
    }

    #[rstest]
    #[case::no_key_object(Sexp::list([
        Sexp::atom(*b"sig-val"),
        Sexp::list([Sexp::atom(*b"rsa")]),
    ]))]
    #[case::missing_parameters(Sexp::list([Sexp::atom(*b"private-key")]))]
    #[case::bare_atom(Sexp::atom(*b"private-key"))]
    fn unreadable_key_objects_are_rejected(#[case] sexp: Sexp) {
        assert!(matches!(
            classify(&KeyMaterial::new(sexp)),
            Err(Error::UnrecognizedKey)
        ));
    }

    #[rstest]
    #[case(&[][..], 0)]
    #[case(&[0x00][..], 0)]
    #[case(&[0x01][..], 1)]
    #[case(&[0x80][..], 8)]
    #[case(&[0x00, 0xff][..], 8)]
    #[case(&[0x01, 0x00, 0x00][..], 17)]
    fn bit_length_of_big_endian_integers(#[case] bytes: &[u8], #[case] bits: u32) {
        assert_eq!(bit_length(bytes), bits);
    }
}

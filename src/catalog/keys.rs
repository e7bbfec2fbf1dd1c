use p256::ecdsa::SigningKey;
use pkcs8::{DecodePrivateKey, ObjectIdentifier, PrivateKeyInfo};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;

use super::ValueError;
use crate::registry::TypeInfo;
use crate::value::Value;

const RSA: &str = "RSA";
const ECDSA: &str = "ECDSA";

/// `rsaEncryption`
const RSA_ENCRYPTION: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
/// `id-ecPublicKey`
const EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");

/// Decode the PEM block and, for the family-neutral `PRIVATE KEY` envelope,
/// check the algorithm before handing the DER to the family's decoder.
fn decode_pem<T>(
    raw: &str,
    family: &'static str,
    native_tag: &str,
    algorithm: ObjectIdentifier,
    native: impl FnOnce(&[u8]) -> Result<T, String>,
    generic: impl FnOnce(&[u8]) -> Result<T, String>,
) -> Result<T, ValueError> {
    let block = pem::parse(raw).map_err(|_| ValueError::Pem(family))?;
    let der = block.contents();
    let key_error = |reason| ValueError::Key { family, reason };

    match block.tag() {
        tag if tag == native_tag => native(der).map_err(key_error),
        "PRIVATE KEY" => {
            let info = PrivateKeyInfo::try_from(der)
                .map_err(|e| key_error(format!("malformed PKCS#8: {e}")))?;
            if info.algorithm.oid != algorithm {
                return Err(ValueError::WrongFamily(family));
            }
            generic(der).map_err(key_error)
        }
        tag => Err(ValueError::PemTag {
            family,
            tag: tag.to_string(),
        }),
    }
}

/// PEM `RSA PRIVATE KEY` (PKCS#1) or `PRIVATE KEY` (PKCS#8).
pub fn parse_rsa_key(raw: &str) -> Result<RsaPrivateKey, ValueError> {
    decode_pem(
        raw,
        RSA,
        "RSA PRIVATE KEY",
        RSA_ENCRYPTION,
        |der| RsaPrivateKey::from_pkcs1_der(der).map_err(|e| e.to_string()),
        |der| RsaPrivateKey::from_pkcs8_der(der).map_err(|e| e.to_string()),
    )
}

/// PEM `EC PRIVATE KEY` (SEC1) or `PRIVATE KEY` (PKCS#8), P-256 only.
pub fn parse_ecdsa_key(raw: &str) -> Result<SigningKey, ValueError> {
    decode_pem(
        raw,
        ECDSA,
        "EC PRIVATE KEY",
        EC_PUBLIC_KEY,
        |der| {
            p256::SecretKey::from_sec1_der(der)
                .map(SigningKey::from)
                .map_err(|e| e.to_string())
        },
        |der| SigningKey::from_pkcs8_der(der).map_err(|e| e.to_string()),
    )
}

impl Value for RsaPrivateKey {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<RsaPrivateKey>("RsaPrivateKey")
    }

    fn is_zero(&self) -> bool {
        false
    }

    /// Only the modulus size; key material never leaves the value.
    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(format!("RsaPrivateKey({} bits)", self.size() * 8))
    }
}

impl Value for SigningKey {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<SigningKey>("SigningKey")
    }

    fn is_zero(&self) -> bool {
        false
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String("EcdsaSigningKey(P-256)".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;
    use crate::render::SECRET_MARKER;

    const RSA_PKCS1: &str = include_str!("../../tests/fixtures/rsa_pkcs1.pem");
    const RSA_PKCS8: &str = include_str!("../../tests/fixtures/rsa_pkcs8.pem");
    const EC_SEC1: &str = include_str!("../../tests/fixtures/ec_sec1.pem");
    const EC_PKCS8: &str = include_str!("../../tests/fixtures/ec_pkcs8.pem");

    #[test]
    fn rsa_from_both_envelopes() {
        let pkcs1 = parse_rsa_key(RSA_PKCS1).unwrap();
        let pkcs8 = parse_rsa_key(RSA_PKCS8).unwrap();
        assert_eq!(pkcs1, pkcs8);
        assert_eq!(pkcs1.size() * 8, 2048);
    }

    #[test]
    fn ecdsa_from_both_envelopes() {
        let sec1 = parse_ecdsa_key(EC_SEC1).unwrap();
        let pkcs8 = parse_ecdsa_key(EC_PKCS8).unwrap();
        assert_eq!(sec1.verifying_key(), pkcs8.verifying_key());
    }

    #[test]
    fn pkcs8_of_the_wrong_family_is_rejected() {
        let err = parse_rsa_key(EC_PKCS8).unwrap_err();
        assert_eq!(err.to_string(), "PKCS#8 key is not an RSA private key");

        let err = parse_ecdsa_key(RSA_PKCS8).unwrap_err();
        assert_eq!(err.to_string(), "PKCS#8 key is not an ECDSA private key");
    }

    #[test]
    fn native_envelope_of_the_other_family_is_rejected() {
        let err = parse_rsa_key(EC_SEC1).unwrap_err();
        assert!(matches!(err, ValueError::PemTag { family: "RSA", .. }), "{err}");
    }

    #[test]
    fn not_pem() {
        let err = parse_rsa_key("not a key").unwrap_err();
        assert_eq!(err.to_string(), "invalid PEM format for RSA private key");
    }

    #[test]
    fn optional_form_through_registry() {
        let registry = Registry::new();
        let key: Option<SigningKey> = registry.dispatch(EC_SEC1).unwrap();
        assert!(key.is_some());
    }

    #[test]
    fn snapshots_carry_no_key_material() {
        let key = parse_rsa_key(RSA_PKCS1).unwrap();
        assert_eq!(key.snapshot(), "RsaPrivateKey(2048 bits)");
        assert_eq!(key.masked(), SECRET_MARKER);
    }
}

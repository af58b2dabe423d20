// src/encoding.rs
use crate::config::Argon2Params;
use crate::error::{EncodingError, EncodingResult};
use log;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chacha20poly1305::{
    aead::{Aead, NewAead, Payload},
    ChaCha20Poly1305, Key, Nonce
};
use rand::rngs::OsRng;
use rand::RngCore;

pub const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;

/// Reversible transform between a plaintext secret and its stored form.
pub trait SecretCodec: Send + Sync {
    fn encode(&self, plaintext: &str) -> EncodingResult<String>;

    fn decode(&self, encoded: &str) -> EncodingResult<String>;

    /// Whether `decode` would succeed. Never fails.
    fn is_valid(&self, encoded: &str) -> bool {
        self.decode(encoded).is_ok()
    }
}

/// Base64 over the UTF-8 bytes of the secret.
///
/// Provides no confidentiality: anyone holding the stored value can read the
/// secret. Kept as the default so existing records stay readable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl SecretCodec for Base64Codec {
    fn encode(&self, plaintext: &str) -> EncodingResult<String> {
        Ok(STANDARD.encode(plaintext.as_bytes()))
    }

    fn decode(&self, encoded: &str) -> EncodingResult<String> {
        let bytes = STANDARD
            .decode(encoded)
            .map_err(|e| EncodingError::Decode(format!("invalid base64: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| EncodingError::Decode(format!("decoded bytes are not UTF-8: {}", e)))
    }
}

/// ChaCha20-Poly1305 under a key derived locally from a passphrase.
///
/// Stored form is `base64(nonce || ciphertext)`. A fresh nonce is drawn on
/// every encode, so two encodes of the same secret never match.
pub struct SealedCodec {
    key: [u8; 32],
}

impl SealedCodec {
    pub fn new(key: [u8; 32]) -> Self {
        SealedCodec { key }
    }

    pub fn from_passphrase(passphrase: &str, salt: &[u8], argon2_config: &Argon2Params) -> EncodingResult<Self> {
        let key = derive_key(passphrase, salt, argon2_config)?;
        Ok(SealedCodec::new(key))
    }
}

impl SecretCodec for SealedCodec {
    fn encode(&self, plaintext: &str) -> EncodingResult<String> {
        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, Payload { msg: plaintext.as_bytes(), aad: &[] })
            .map_err(|e| {
                let msg = format!("{}", e);
                log::error!("SealedCodec::encode: {}", msg);
                EncodingError::Seal(msg)
            })?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    fn decode(&self, encoded: &str) -> EncodingResult<String> {
        let sealed = STANDARD
            .decode(encoded)
            .map_err(|e| EncodingError::Decode(format!("invalid base64: {}", e)))?;
        if sealed.len() < NONCE_LEN {
            return Err(EncodingError::Decode(format!(
                "sealed value too short (len: {})",
                sealed.len()
            )));
        }
        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LEN);

        let cipher = ChaCha20Poly1305::new(Key::from_slice(&self.key));
        let plaintext = cipher
            .decrypt(Nonce::from_slice(nonce_bytes), Payload { msg: ciphertext, aad: &[] })
            .map_err(|e| {
                // Wrong key or tampered value.
                let msg = format!("authentication failed: {}", e);
                log::warn!("SealedCodec::decode: {}", msg);
                EncodingError::Decode(msg)
            })?;

        String::from_utf8(plaintext)
            .map_err(|e| EncodingError::Decode(format!("decrypted bytes are not UTF-8: {}", e)))
    }
}

pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// Derives a 32-byte key from a passphrase and salt using Argon2id.
pub fn derive_key(passphrase: &str, salt: &[u8], argon2_config: &Argon2Params) -> EncodingResult<[u8; 32]> {
    let params = argon2::Params::new(argon2_config.m_cost, argon2_config.t_cost, argon2_config.p_cost, Some(32))
        .map_err(|e| {
            let msg = format!("Argon2 params error for key derivation: {}", e);
            log::error!("derive_key: {}", msg);
            EncodingError::KeyDerivation(msg)
        })?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key_bytes = [0u8; 32];
    argon2.hash_password_into(passphrase.as_bytes(), salt, &mut key_bytes)
        .map_err(|e| {
            let msg = format!("Key derivation failed: {}", e);
            log::error!("derive_key: {}", msg);
            EncodingError::KeyDerivation(msg)
        })?;

    Ok(key_bytes)
}

/// Produces the PHC verifier string stored next to the salt.
pub fn hash_passphrase(passphrase: &str, salt_bytes: &[u8], argon2_config: &Argon2Params) -> EncodingResult<String> {
    let salt = SaltString::b64_encode(salt_bytes)
        .map_err(|e| EncodingError::KeyDerivation(format!("Salt encoding failed: {}", e)))?;

    let params = argon2::Params::new(argon2_config.m_cost, argon2_config.t_cost, argon2_config.p_cost, None)
        .map_err(|e| EncodingError::KeyDerivation(format!("Argon2 params error for hashing: {}", e)))?;
    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| {
            let msg = format!("Hashing failed: {}", e);
            log::error!("hash_passphrase: {}", msg);
            EncodingError::KeyDerivation(msg)
        })?
        .to_string();

    Ok(hash)
}

pub fn verify_passphrase(verifier: &str, passphrase: &str) -> EncodingResult<bool> {
    let parsed_hash = PasswordHash::new(verifier)
        .map_err(|e| EncodingError::KeyDerivation(format!("Parsing verifier failed: {}", e)))?;

    // Parameters come from the PHC string itself.
    match Argon2::default().verify_password(passphrase.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => {
            log::warn!("verify_passphrase: passphrase mismatch.");
            Ok(false)
        }
        Err(e) => {
            let msg = format!("Verification failed: {}", e);
            log::error!("verify_passphrase: {}", msg);
            Err(EncodingError::KeyDerivation(msg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> Argon2Params {
        Argon2Params { m_cost: 256, t_cost: 1, p_cost: 1 }
    }

    #[test]
    fn test_base64_round_trip() {
        let codec = Base64Codec;
        for plaintext in ["hunter2", "", "pässwörd ✓ 秘密", "with\nnewline and spaces  "] {
            let encoded = codec.encode(plaintext).unwrap();
            assert!(codec.is_valid(&encoded));
            assert_eq!(codec.decode(&encoded).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_base64_matches_known_value() {
        assert_eq!(Base64Codec.encode("hunter2").unwrap(), "aHVudGVyMg==");
        assert_eq!(Base64Codec.decode("c2VjcmV0MQ==").unwrap(), "secret1");
    }

    #[test]
    fn test_base64_distinct_plaintexts_give_distinct_encodings() {
        let codec = Base64Codec;
        assert_ne!(codec.encode("old").unwrap(), codec.encode("new").unwrap());
    }

    #[test]
    fn test_base64_rejects_malformed_input() {
        let codec = Base64Codec;
        assert!(!codec.is_valid("not base64!"));
        match codec.decode("%%%") {
            Err(EncodingError::Decode(_)) => {}
            other => panic!("Expected decode error, got {:?}", other),
        }
        // Valid base64 of invalid UTF-8.
        let invalid_utf8 = STANDARD.encode([0xff, 0xfe]);
        assert!(!codec.is_valid(&invalid_utf8));
    }

    #[test]
    fn test_sealed_round_trip_and_fresh_nonce() {
        let codec = SealedCodec::new([7u8; 32]);
        let first = codec.encode("hunter2").unwrap();
        let second = codec.encode("hunter2").unwrap();
        assert_ne!(first, second);
        assert!(codec.is_valid(&first));
        assert_eq!(codec.decode(&first).unwrap(), "hunter2");
        assert_eq!(codec.decode(&second).unwrap(), "hunter2");
    }

    #[test]
    fn test_sealed_wrong_key_fails() {
        let encoded = SealedCodec::new([1u8; 32]).encode("secret").unwrap();
        let other = SealedCodec::new([2u8; 32]);
        assert!(!other.is_valid(&encoded));
        assert!(matches!(other.decode(&encoded), Err(EncodingError::Decode(_))));
    }

    #[test]
    fn test_sealed_rejects_plain_base64_and_short_input() {
        let codec = SealedCodec::new([3u8; 32]);
        assert!(!codec.is_valid(&Base64Codec.encode("hunter2").unwrap()));
        assert!(!codec.is_valid("AAAA"));
    }

    #[test]
    fn test_derive_key_is_deterministic_per_salt() {
        let params = fast_params();
        let salt = generate_salt();
        let key1 = derive_key("masterkey123", &salt, &params).unwrap();
        let key2 = derive_key("masterkey123", &salt, &params).unwrap();
        assert_eq!(key1, key2);

        let salt2 = generate_salt();
        assert_ne!(salt, salt2);
        assert_ne!(key1, derive_key("masterkey123", &salt2, &params).unwrap());
        assert_ne!(key1, derive_key("anotherpassword", &salt, &params).unwrap());
    }

    #[test]
    fn test_passphrase_verifier() {
        let params = fast_params();
        let salt = generate_salt();
        let verifier = hash_passphrase("strongpassword123", &salt, &params).unwrap();
        assert!(verify_passphrase(&verifier, "strongpassword123").unwrap());
        assert!(!verify_passphrase(&verifier, "wrongpassword").unwrap());
    }

    #[test]
    fn test_default_argon2_params_are_valid() {
        let defaults = Argon2Params::default();
        let params = argon2::Params::new(defaults.m_cost, defaults.t_cost, defaults.p_cost, None);
        assert!(params.is_ok());
    }
}

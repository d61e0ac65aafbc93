//! Credential obfuscation for transit.
//!
//! Produces the OpenSSL "salted" envelope the analysis backend decodes:
//!
//! ```text
//! base64( "Salted__" | salt[8] | AES-256-CBC-PKCS7(secret) )
//! ```
//!
//! Key and IV come from `EVP_BytesToKey` (MD5, one round) over the shared
//! passphrase and a fresh random salt, so two tokens for the same secret differ.
//!
//! # Known limitation
//! The passphrase ships inside this binary. Anyone holding the binary can
//! recover the secret from a captured token. This guards against passive
//! inspection of traffic and logs only; it is not a security boundary. Changing
//! that needs a key-distribution design on both client and server.

use aes::cipher::{block_padding::Pkcs7, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use md5::{Digest, Md5};
use rand::RngCore;

use super::{Credential, ObfuscatedToken};
use crate::errors::AppError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Passphrase shared with the analysis backend.
pub const SHARED_PASSPHRASE: &str = "elevate-resume-ai-secret-key-2024";

const SALT_MAGIC: &[u8; 8] = b"Salted__";
const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;

/// Obfuscates a credential with the shared passphrase.
///
/// Fails with `AppError::Encoding` for an empty secret or a cipher failure.
pub fn obfuscate(secret: &Credential) -> Result<ObfuscatedToken, AppError> {
    obfuscate_with(secret.expose(), SHARED_PASSPHRASE.as_bytes())
}

fn obfuscate_with(secret: &str, passphrase: &[u8]) -> Result<ObfuscatedToken, AppError> {
    if secret.is_empty() {
        return Err(AppError::Encoding("credential is empty".to_string()));
    }

    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng()
        .try_fill_bytes(&mut salt)
        .map_err(|e| AppError::Encoding(format!("salt generation failed: {e}")))?;

    let (key, iv) = derive_key_and_iv(passphrase, &salt);
    let cipher = Aes256CbcEnc::new_from_slices(&key, &iv)
        .map_err(|e| AppError::Encoding(format!("cipher init failed: {e}")))?;
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(secret.as_bytes());

    let mut envelope = Vec::with_capacity(SALT_MAGIC.len() + SALT_LEN + ciphertext.len());
    envelope.extend_from_slice(SALT_MAGIC);
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&ciphertext);

    Ok(ObfuscatedToken(STANDARD.encode(envelope)))
}

/// OpenSSL `EVP_BytesToKey` with MD5 and a single iteration.
fn derive_key_and_iv(passphrase: &[u8], salt: &[u8]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut derived = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
    let mut block: Vec<u8> = Vec::new();

    while derived.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(passphrase);
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        derived.extend_from_slice(&block);
    }

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&derived[..KEY_LEN]);
    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&derived[KEY_LEN..KEY_LEN + IV_LEN]);
    (key, iv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aes::cipher::BlockDecryptMut;

    type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

    /// Server-side decode, reproduced here only to prove reversibility.
    fn reveal(token: &ObfuscatedToken, passphrase: &[u8]) -> Option<String> {
        let raw = STANDARD.decode(token.as_str()).ok()?;
        if raw.len() < 16 || &raw[..8] != SALT_MAGIC {
            return None;
        }
        let (key, iv) = derive_key_and_iv(passphrase, &raw[8..16]);
        let plain = Aes256CbcDec::new_from_slices(&key, &iv)
            .ok()?
            .decrypt_padded_vec_mut::<Pkcs7>(&raw[16..])
            .ok()?;
        String::from_utf8(plain).ok()
    }

    #[test]
    fn test_round_trip_with_shared_passphrase() {
        let secret = Credential::new("AIzaSyD-example-key_123");
        let token = obfuscate(&secret).unwrap();
        assert_eq!(
            reveal(&token, SHARED_PASSPHRASE.as_bytes()).as_deref(),
            Some("AIzaSyD-example-key_123")
        );
    }

    #[test]
    fn test_same_secret_yields_different_tokens() {
        let secret = Credential::new("repeatable");
        let a = obfuscate(&secret).unwrap();
        let b = obfuscate(&secret).unwrap();
        assert_ne!(a, b, "random salt must vary the token");
        assert_eq!(reveal(&a, SHARED_PASSPHRASE.as_bytes()), reveal(&b, SHARED_PASSPHRASE.as_bytes()));
    }

    #[test]
    fn test_wrong_passphrase_does_not_reveal() {
        let token = obfuscate(&Credential::new("top-secret-value")).unwrap();
        let revealed = reveal(&token, b"some-other-passphrase");
        assert_ne!(revealed.as_deref(), Some("top-secret-value"));
    }

    #[test]
    fn test_empty_secret_is_encoding_error() {
        let err = obfuscate(&Credential::default()).unwrap_err();
        assert!(matches!(err, AppError::Encoding(_)));
    }

    #[test]
    fn test_token_has_salted_prefix() {
        let token = obfuscate(&Credential::new("k")).unwrap();
        let raw = STANDARD.decode(token.as_str()).unwrap();
        assert_eq!(&raw[..8], b"Salted__");
        // 8 magic + 8 salt + one AES block for a 1-byte secret
        assert_eq!(raw.len(), 32);
    }

    #[test]
    fn test_derivation_is_deterministic_for_fixed_salt() {
        let salt = [7u8; SALT_LEN];
        assert_eq!(
            derive_key_and_iv(b"passphrase", &salt),
            derive_key_and_iv(b"passphrase", &salt)
        );
        assert_ne!(
            derive_key_and_iv(b"passphrase", &salt).0,
            derive_key_and_iv(b"passphrase", &[8u8; SALT_LEN]).0
        );
    }
}

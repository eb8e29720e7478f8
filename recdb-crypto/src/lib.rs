//! # recdb-crypto
//!
//! Field-level symmetric encryption for confidential fields: a
//! password-derived AES-128-CBC key, a 4-byte random salt folded into the
//! IV, a CRC-32 integrity trailer, and base64/`encrypted-` framing for the
//! textual field value.

use aes::cipher::{block_padding::NoPadding, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rand::RngCore;
use recdb_core::{Record, RSet};
use thiserror::Error;

const BLOCK_SIZE: usize = 16;
const KEY_SIZE: usize = 16;
const SALT_SIZE: usize = 4;

/// The literal prefix every encrypted field value begins with.
pub const ENCRYPTED_PREFIX: &str = "encrypted-";

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// Errors from the encryption/decryption routines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// The password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// The ciphertext length didn't fit a whole number of AES blocks (with
    /// or without a trailing salt).
    #[error("ciphertext has invalid length")]
    InvalidLength,
    /// Decryption succeeded but the CRC-32 trailer didn't match: wrong
    /// password, or corrupted data.
    #[error("CRC mismatch after decryption (wrong password?)")]
    CrcMismatch,
    /// The base64 wrapper around an `encrypted-` value was malformed.
    #[error("malformed base64 payload")]
    MalformedBase64,
}

fn derive_key(password: &str) -> Result<[u8; KEY_SIZE], CryptoError> {
    if password.is_empty() {
        return Err(CryptoError::EmptyPassword);
    }
    let bytes = password.as_bytes();
    let mut key = [0u8; KEY_SIZE];
    for (i, slot) in key.iter_mut().enumerate() {
        *slot = bytes[i % bytes.len()];
    }
    Ok(key)
}

fn build_iv(salt: [u8; SALT_SIZE]) -> [u8; BLOCK_SIZE] {
    let mut iv = [0u8; BLOCK_SIZE];
    iv[..SALT_SIZE].copy_from_slice(&salt);
    for (i, slot) in iv.iter_mut().enumerate().skip(SALT_SIZE) {
        *slot = i as u8;
    }
    iv
}

/// Encrypts `plaintext` under `password`, returning `ciphertext ‖ salt`.
///
/// The plaintext is extended with a little-endian CRC-32 of itself, padded
/// with `\0` bytes to a whole number of AES blocks, encrypted with
/// AES-128-CBC under a key cycled from `password`, and the 4-byte random
/// salt used to build the IV is appended to the output.
pub fn encrypt(plaintext: &[u8], password: &str) -> Result<Vec<u8>, CryptoError> {
    let key = derive_key(password)?;

    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);
    let iv = build_iv(salt);

    let crc = crc32fast::hash(plaintext);
    let mut input = Vec::with_capacity(plaintext.len() + 4);
    input.extend_from_slice(plaintext);
    input.extend_from_slice(&crc.to_le_bytes());

    let padding = (BLOCK_SIZE - (input.len() % BLOCK_SIZE)) % BLOCK_SIZE;
    input.resize(input.len() + padding, 0);

    let mut buf = input;
    let encryptor = Aes128CbcEnc::new(&key.into(), &iv.into());
    let ct_len = buf.len();
    encryptor
        .encrypt_padded_mut::<NoPadding>(&mut buf, ct_len)
        .map_err(|_| CryptoError::InvalidLength)?;

    buf.extend_from_slice(&salt);
    Ok(buf)
}

/// Decrypts `data` (as produced by [`encrypt`]) under `password`.
pub fn decrypt(data: &[u8], password: &str) -> Result<Vec<u8>, CryptoError> {
    let key = derive_key(password)?;

    let salt_size = if data.len() >= SALT_SIZE && (data.len() - SALT_SIZE) % BLOCK_SIZE == 0 {
        SALT_SIZE
    } else if data.len() % BLOCK_SIZE == 0 {
        0
    } else {
        return Err(CryptoError::InvalidLength);
    };

    let (ciphertext, salt_bytes) = data.split_at(data.len() - salt_size);
    let mut salt = [0u8; SALT_SIZE];
    salt[..salt_size].copy_from_slice(salt_bytes);
    let iv = build_iv(salt);

    let mut buf = ciphertext.to_vec();
    let decryptor = Aes128CbcDec::new(&key.into(), &iv.into());
    decryptor
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|_| CryptoError::InvalidLength)?;

    // Explicit bounds check before touching the trailing 4 bytes: the
    // original C implementation used `strlen(buf) > 4` here, which reads
    // past the buffer when the plaintext contains an embedded `\0` shorter
    // than 4 bytes from the end (CVE-2019-6455). Check the real buffer
    // length instead.
    if buf.len() < 4 {
        return Err(CryptoError::CrcMismatch);
    }
    let crc_offset = buf.len() - 4;
    let stored_crc = u32::from_le_bytes(buf[crc_offset..].try_into().unwrap());
    if crc32fast::hash(&buf[..crc_offset]) != stored_crc {
        return Err(CryptoError::CrcMismatch);
    }
    buf.truncate(crc_offset);
    Ok(buf)
}

/// Whether `value` is already framed as an encrypted field value.
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(ENCRYPTED_PREFIX)
}

/// Encrypts a single field value, base64-wraps it, and prepends
/// [`ENCRYPTED_PREFIX`]. A no-op if `value` is already encrypted.
pub fn encrypt_value(value: &str, password: &str) -> Result<String, CryptoError> {
    if is_encrypted(value) {
        return Ok(value.to_string());
    }
    let ciphertext = encrypt(value.as_bytes(), password)?;
    Ok(format!("{ENCRYPTED_PREFIX}{}", BASE64.encode(ciphertext)))
}

/// Decrypts a single field value previously produced by
/// [`encrypt_value`]. Returns `value` unchanged if it isn't encrypted.
pub fn decrypt_value(value: &str, password: &str) -> Result<String, CryptoError> {
    let Some(b64) = value.strip_prefix(ENCRYPTED_PREFIX) else {
        return Ok(value.to_string());
    };
    let raw = BASE64.decode(b64).map_err(|_| CryptoError::MalformedBase64)?;
    let plaintext = decrypt(&raw, password)?;
    String::from_utf8(plaintext).map_err(|_| CryptoError::MalformedBase64)
}

/// Encrypts every confidential field of `record`, as declared by `rset`,
/// in place. Fields already encrypted are left untouched. The first crypto
/// error encountered aborts and is returned; fields processed before the
/// failure stay encrypted.
pub fn encrypt_record(record: &mut Record, rset: &RSet, password: &str) -> Result<(), CryptoError> {
    for name in rset.derived().confidential.clone() {
        let n = record.num_fields_by_name(&name);
        for k in 0..n {
            if let Some(field) = record.field_by_name_mut(&name, k) {
                let new_value = encrypt_value(field.value(), password)?;
                field.set_value(new_value);
            }
        }
    }
    Ok(())
}

/// Decrypts every confidential field of `record`, as declared by `rset`, in
/// place. A field that fails to decrypt under this password (wrong
/// password, or corrupted ciphertext) is left as-is rather than aborting
/// the rest of the record.
pub fn decrypt_record(record: &mut Record, rset: &RSet, password: &str) {
    for name in rset.derived().confidential.clone() {
        let n = record.num_fields_by_name(&name);
        for k in 0..n {
            if let Some(field) = record.field_by_name_mut(&name, k) {
                match decrypt_value(field.value(), password) {
                    Ok(plain) => field.set_value(plain),
                    Err(e) => tracing::debug!(field = %name, error = %e, "leaving field encrypted, decrypt failed"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_decrypt_round_trip() {
        let ciphertext = encrypt(b"hello world", "secret").unwrap();
        let plain = decrypt(&ciphertext, "secret").unwrap();
        assert_eq!(plain, b"hello world");
    }

    #[test]
    fn wrong_password_fails_crc() {
        let ciphertext = encrypt(b"hello", "secret").unwrap();
        assert_eq!(decrypt(&ciphertext, "SECRET"), Err(CryptoError::CrcMismatch));
    }

    #[test]
    fn field_value_round_trip_and_prefix() {
        let encrypted = encrypt_value("hello", "secret").unwrap();
        assert!(encrypted.starts_with(ENCRYPTED_PREFIX));
        let decrypted = decrypt_value(&encrypted, "secret").unwrap();
        assert_eq!(decrypted, "hello");
    }

    #[test]
    fn encrypt_value_is_idempotent() {
        let encrypted = encrypt_value("hello", "secret").unwrap();
        let encrypted_again = encrypt_value(&encrypted, "other-password").unwrap();
        assert_eq!(encrypted, encrypted_again);
    }

    #[test]
    fn decrypt_value_passthrough_when_not_encrypted() {
        assert_eq!(decrypt_value("plain", "secret").unwrap(), "plain");
    }

    #[test]
    fn short_plaintext_does_not_panic_on_decrypt() {
        // A plaintext of 0..3 bytes still round-trips (CVE-2019-6455 guard).
        for len in 0..4 {
            let data = vec![b'x'; len];
            let ciphertext = encrypt(&data, "secret").unwrap();
            let plain = decrypt(&ciphertext, "secret").unwrap();
            assert_eq!(plain, data);
        }
    }
}

//! End-to-end payload encryption: per-channel passwords and the `{ct, iv, s}` envelope.
//!
//! Key and IV come from an MD5 chain over `prev || "." || password || "." || salt`
//! (raw bytes), run until 48 bytes exist: bytes 0..32 are the AES-256 key,
//! bytes 32..48 the CBC IV. Plaintext is the JSON text of the payload,
//! PKCS#7 padded.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use md5::{Digest, Md5};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use tracing::debug;

use super::signature::sha256_hex;
use crate::error::{AppError, AppResult};
use crate::models::EncryptedEnvelope;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

pub const SALT_LEN: usize = 8;
const KEY_LEN: usize = 32;
const IV_LEN: usize = 16;
const PASSWORD_HEX_LEN: usize = 32;

/// Channel-scoped password: first 32 hex chars of `sha256("{key}:{channel}")`.
pub fn derive_password(encryption_key: &str, channel: &str) -> String {
    let mut digest = sha256_hex(&format!("{}:{}", encryption_key, channel));
    digest.truncate(PASSWORD_HEX_LEN);
    digest
}

/// Channel-independent password for the outer presence pass: first 32 hex
/// chars of `sha256("{app_id}:{secret}")`.
pub fn derive_app_password(app_id: &str, secret: &str) -> String {
    let mut digest = sha256_hex(&format!("{}:{}", app_id, secret));
    digest.truncate(PASSWORD_HEX_LEN);
    digest
}

fn derive_key_iv(password: &str, salt: &[u8]) -> ([u8; KEY_LEN], [u8; IV_LEN]) {
    let mut material = Vec::with_capacity(KEY_LEN + IV_LEN + 16);
    let mut block: Vec<u8> = Vec::new();
    while material.len() < KEY_LEN + IV_LEN {
        let mut hasher = Md5::new();
        hasher.update(&block);
        hasher.update(b".");
        hasher.update(password.as_bytes());
        hasher.update(b".");
        hasher.update(salt);
        block = hasher.finalize().to_vec();
        material.extend_from_slice(&block);
    }

    let mut key = [0u8; KEY_LEN];
    let mut iv = [0u8; IV_LEN];
    key.copy_from_slice(&material[..KEY_LEN]);
    iv.copy_from_slice(&material[KEY_LEN..KEY_LEN + IV_LEN]);
    (key, iv)
}

/// Encrypt the JSON form of `data` under `password` with a fresh random salt.
pub fn encrypt_payload<T: Serialize + ?Sized>(data: &T, password: &str) -> AppResult<EncryptedEnvelope> {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    encrypt_with_salt(data, password, &salt)
}

pub(crate) fn encrypt_with_salt<T: Serialize + ?Sized>(
    data: &T,
    password: &str,
    salt: &[u8; SALT_LEN],
) -> AppResult<EncryptedEnvelope> {
    let plaintext = serde_json::to_string(data)?;
    let (key, iv) = derive_key_iv(password, salt);

    let cipher = Aes256CbcEnc::new(&key.into(), &iv.into());
    let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    debug!(bytes = plaintext.len(), "payload encrypted");

    Ok(EncryptedEnvelope {
        ct: BASE64.encode(ciphertext),
        iv: hex::encode(iv),
        s: hex::encode(salt),
    })
}

/// Reverse of [`encrypt_payload`]: returns the original JSON value.
pub fn decrypt_payload(envelope: &EncryptedEnvelope, password: &str) -> AppResult<serde_json::Value> {
    let salt = hex::decode(&envelope.s).map_err(|e| AppError::Crypto(format!("salt: {}", e)))?;
    let iv: [u8; IV_LEN] = hex::decode(&envelope.iv)
        .map_err(|e| AppError::Crypto(format!("iv: {}", e)))?
        .try_into()
        .map_err(|_| AppError::Crypto("iv must be 16 bytes".to_string()))?;
    let ciphertext = BASE64
        .decode(&envelope.ct)
        .map_err(|e| AppError::Crypto(format!("ciphertext: {}", e)))?;

    let (key, _) = derive_key_iv(password, &salt);
    let plaintext = Aes256CbcDec::new(&key.into(), &iv.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
        .map_err(|e| AppError::Crypto(format!("decryption failed: {}", e)))?;

    Ok(serde_json::from_slice(&plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn password_is_channel_scoped() {
        let a = derive_password("My-test", "a");
        let b = derive_password("My-test", "b");
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert_eq!(
            derive_password("My-test", "some-channel"),
            "2c5e53cb2b4465f56fefe89b79c60549"
        );
        assert_eq!(
            derive_password("My-test", "private-app.20"),
            "2847e4abe99c492fc83d89bd451d440f"
        );
    }

    #[test]
    fn app_password_ignores_channel() {
        assert_eq!(
            derive_app_password("s-1-J2PCu8g8sAejZeXx", "cdKBpcruwYQ96kvIaYiorbTFxRDCbVfj"),
            "9e0a48b589310a706802c5de15e91982"
        );
    }

    #[test]
    fn fixed_salt_produces_known_ciphertext() {
        let password = derive_password("My-test", "some-channel");
        let salt = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let env = encrypt_with_salt(&json!({"food": "cupcake"}), &password, &salt).unwrap();
        assert_eq!(env.ct, "FvLAMGj9QORRkZoIenmEdj0tcpAbV3fQfho8WKV7D+I=");
        assert_eq!(env.iv, "ad46dbca9de3cfd96a7d97bb682fd8a8");
        assert_eq!(env.s, "0001020304050607");
    }

    #[test]
    fn key_material_is_raw_bytes() {
        let (key, iv) = derive_key_iv("2c5e53cb2b4465f56fefe89b79c60549", &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(
            hex::encode(key),
            "12490f3f3329fb32b15643f01af1ef0be257f4214f39719ae9e87eb631507512"
        );
        assert_eq!(hex::encode(iv), "ad46dbca9de3cfd96a7d97bb682fd8a8");
    }

    #[test]
    fn round_trip_restores_payload() {
        let password = derive_password("key", "presence-room");
        let payload = json!({
            "user_id": 20,
            "info": {"name": "Ana", "tags": ["a", "b"], "active": true},
            "note": "ünïcödé ✓",
        });
        let env = encrypt_payload(&payload, &password).unwrap();
        assert_eq!(env.s.len(), SALT_LEN * 2);
        assert_eq!(env.iv.len(), IV_LEN * 2);
        assert_eq!(decrypt_payload(&env, &password).unwrap(), payload);
    }

    #[test]
    fn fresh_salt_per_call() {
        let password = derive_password("key", "c");
        let a = encrypt_payload(&json!("same"), &password).unwrap();
        let b = encrypt_payload(&json!("same"), &password).unwrap();
        assert_ne!(a.s, b.s);
        assert_ne!(a.ct, b.ct);
    }

    #[test]
    fn wrong_password_does_not_restore_payload() {
        let payload = json!({"secret": "value"});
        let env = encrypt_payload(&payload, &derive_password("key", "a")).unwrap();
        let res = decrypt_payload(&env, &derive_password("key", "b"));
        assert!(res.map(|v| v != payload).unwrap_or(true));
    }

    #[test]
    fn malformed_envelope_is_crypto_error() {
        let env = EncryptedEnvelope {
            ct: "not base64!".into(),
            iv: "zz".into(),
            s: "0001020304050607".into(),
        };
        assert!(matches!(decrypt_payload(&env, "pw"), Err(AppError::Crypto(_))));
    }
}

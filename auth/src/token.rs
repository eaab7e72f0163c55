//! Encrypted session tokens.
//!
//! Tokens use the compact JWE serialization with direct key agreement
//! (`alg: "dir"`) and AES-256-GCM content encryption (`enc: "A256GCM"`):
//!
//! ```text
//! BASE64URL(header) . "" . BASE64URL(iv) . BASE64URL(ciphertext) . BASE64URL(tag)
//! ```
//!
//! The encoded protected header is the additional authenticated data, so a
//! token whose header was tampered with fails to decrypt.

use crate::config::KeyDerivation;
use crate::error::{Result, SessionError};
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng, Payload},
    Aes256Gcm, Nonce,
};
use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD},
    Engine as _,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

const ALG_DIR: &str = "dir";
const ENC_A256GCM: &str = "A256GCM";
const IV_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// `aud` claim: a single audience or a list of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    /// `"aud": "console"`
    One(String),
    /// `"aud": ["console", "mobile"]`
    Many(Vec<String>),
}

impl Audience {
    /// Whether `audience` is among the token's audiences.
    #[must_use]
    pub fn contains(&self, audience: &str) -> bool {
        match self {
            Self::One(value) => value == audience,
            Self::Many(values) => values.iter().any(|v| v == audience),
        }
    }
}

/// Claims carried inside a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Backend user id.
    #[serde(default)]
    pub sub: String,

    /// Display name (`user.nome`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Login (`user.usuario`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Bearer token for the backend API.
    #[serde(
        rename = "accessToken",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub access_token: Option<String>,

    /// Issued at (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration (seconds since epoch).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Token id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Issuer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<Audience>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProtectedHeader {
    alg: String,
    enc: String,
}

/// AES-256-GCM key derived from the shared session secret.
///
/// Cloning shares the cipher; every encryption draws a fresh random IV.
#[derive(Clone)]
pub struct SessionKey {
    cipher: Arc<Aes256Gcm>,
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SessionKey(<redacted>)")
    }
}

impl SessionKey {
    /// Derive the content-encryption key from `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidKey`] if a base64 secret is malformed or
    /// does not decode to 32 bytes.
    pub fn derive(secret: &str, derivation: KeyDerivation) -> Result<Self> {
        let key_bytes = match derivation {
            KeyDerivation::Sha256 => Sha256::digest(secret.as_bytes()).to_vec(),
            KeyDerivation::Base64 => STANDARD
                .decode(secret.trim())
                .map_err(|e| SessionError::InvalidKey(format!("secret is not base64: {e}")))?,
        };

        if key_bytes.len() != 32 {
            return Err(SessionError::InvalidKey(format!(
                "expected 32 bytes for AES-256-GCM, got {}",
                key_bytes.len()
            )));
        }

        let cipher = Aes256Gcm::new_from_slice(&key_bytes)
            .map_err(|e| SessionError::InvalidKey(e.to_string()))?;

        Ok(Self {
            cipher: Arc::new(cipher),
        })
    }

    /// Encrypt `claims` into a compact JWE.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EncryptionFailed`] if serialization or
    /// encryption fails.
    pub fn encrypt(&self, claims: &SessionClaims) -> Result<String> {
        let header = ProtectedHeader {
            alg: ALG_DIR.to_string(),
            enc: ENC_A256GCM.to_string(),
        };
        let header_json = serde_json::to_vec(&header)
            .map_err(|e| SessionError::EncryptionFailed(e.to_string()))?;
        let protected = URL_SAFE_NO_PAD.encode(header_json);

        let plaintext = serde_json::to_vec(claims)
            .map_err(|e| SessionError::EncryptionFailed(e.to_string()))?;

        let iv = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(
                &iv,
                Payload {
                    msg: &plaintext,
                    aad: protected.as_bytes(),
                },
            )
            .map_err(|e| SessionError::EncryptionFailed(e.to_string()))?;

        // aes-gcm appends the tag to the ciphertext
        let (ciphertext, tag) = sealed.split_at(sealed.len() - TAG_LEN);

        Ok(format!(
            "{protected}..{}.{}.{}",
            URL_SAFE_NO_PAD.encode(iv),
            URL_SAFE_NO_PAD.encode(ciphertext),
            URL_SAFE_NO_PAD.encode(tag),
        ))
    }

    /// Decrypt a compact JWE into its claims.
    ///
    /// Only authenticity is checked here; expiry and issuer/audience are the
    /// gate's job.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Invalid`] for malformed tokens, unsupported
    /// algorithms, authentication failures and undecodable claims.
    pub fn decrypt(&self, token: &str) -> Result<SessionClaims> {
        let parts: Vec<&str> = token.trim().split('.').collect();
        let [protected, encrypted_key, iv, ciphertext, tag] = parts.as_slice() else {
            return Err(SessionError::invalid(format!(
                "expected 5 segments, found {}",
                parts.len()
            )));
        };

        if !encrypted_key.is_empty() {
            return Err(SessionError::invalid("encrypted key must be empty for alg=dir"));
        }

        let header: ProtectedHeader = serde_json::from_slice(&decode_segment(protected, "header")?)
            .map_err(|e| SessionError::invalid(format!("bad header: {e}")))?;
        if header.alg != ALG_DIR || header.enc != ENC_A256GCM {
            return Err(SessionError::invalid(format!(
                "unsupported algorithm {}/{}",
                header.alg, header.enc
            )));
        }

        let iv = decode_segment(iv, "iv")?;
        if iv.len() != IV_LEN {
            return Err(SessionError::invalid("invalid IV length (expected 12 bytes)"));
        }
        let tag = decode_segment(tag, "tag")?;
        if tag.len() != TAG_LEN {
            return Err(SessionError::invalid("invalid tag length (expected 16 bytes)"));
        }

        let mut sealed = decode_segment(ciphertext, "ciphertext")?;
        sealed.extend_from_slice(&tag);

        let plaintext = self
            .cipher
            .decrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: &sealed,
                    aad: protected.as_bytes(),
                },
            )
            .map_err(|_| SessionError::invalid("decryption failed"))?;

        serde_json::from_slice(&plaintext)
            .map_err(|e| SessionError::invalid(format!("bad claims: {e}")))
    }
}

fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| SessionError::invalid(format!("bad {name} encoding: {e}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn claims() -> SessionClaims {
        SessionClaims {
            sub: "7".to_string(),
            name: Some("Maria Souza".to_string()),
            email: Some("maria".to_string()),
            access_token: Some("backend-token".to_string()),
            iat: Some(1_700_000_000),
            exp: Some(1_700_086_400),
            jti: Some("abc".to_string()),
            iss: None,
            aud: Some(Audience::Many(vec!["console".to_string()])),
        }
    }

    #[test]
    fn test_encrypt_then_decrypt_restores_claims() {
        let key = SessionKey::derive("s3cret", KeyDerivation::Sha256).unwrap();

        let token = key.encrypt(&claims()).unwrap();

        assert_eq!(token.split('.').count(), 5);
        assert_eq!(key.decrypt(&token).unwrap(), claims());
    }

    #[test]
    fn test_wrong_secret_fails() {
        let key = SessionKey::derive("s3cret", KeyDerivation::Sha256).unwrap();
        let other = SessionKey::derive("other", KeyDerivation::Sha256).unwrap();

        let token = key.encrypt(&claims()).unwrap();

        assert!(matches!(other.decrypt(&token), Err(SessionError::Invalid { .. })));
    }

    #[test]
    fn test_tampered_header_fails() {
        let key = SessionKey::derive("s3cret", KeyDerivation::Sha256).unwrap();
        let token = key.encrypt(&claims()).unwrap();

        let forged_header = URL_SAFE_NO_PAD.encode(br#"{"enc":"A256GCM","alg":"dir"}"#);
        let rest = token.split_once('.').unwrap().1;
        let forged = format!("{forged_header}.{rest}");

        assert!(matches!(key.decrypt(&forged), Err(SessionError::Invalid { .. })));
    }

    #[test]
    fn test_malformed_tokens_are_invalid() {
        let key = SessionKey::derive("s3cret", KeyDerivation::Sha256).unwrap();

        for token in ["", "a.b.c", "a.b.c.d.e", "not a token at all"] {
            assert!(matches!(key.decrypt(token), Err(SessionError::Invalid { .. })), "{token}");
        }
    }

    #[test]
    fn test_base64_key_must_be_32_bytes() {
        let good = STANDARD.encode([7u8; 32]);
        assert!(SessionKey::derive(&good, KeyDerivation::Base64).is_ok());

        let short = STANDARD.encode([7u8; 16]);
        assert!(matches!(
            SessionKey::derive(&short, KeyDerivation::Base64),
            Err(SessionError::InvalidKey(_))
        ));

        assert!(matches!(
            SessionKey::derive("%%%", KeyDerivation::Base64),
            Err(SessionError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_audience_contains() {
        assert!(Audience::One("console".into()).contains("console"));
        assert!(!Audience::One("console".into()).contains("api"));
        assert!(Audience::Many(vec!["a".into(), "b".into()]).contains("b"));
    }
}

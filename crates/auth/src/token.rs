//! Signed bearer token codec.
//!
//! Tokens are stateless: everything needed to verify them is the shared
//! secret, so the request path never touches the credential store. The cost
//! is delayed revocation, bounded by [`TOKEN_TTL_SECS`](crate::TOKEN_TTL_SECS).

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use backoffice_core::AccountId;

use crate::claims::{Claims, TOKEN_TTL_SECS};
use crate::Role;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Structurally invalid token (not three segments, bad base64, bad JSON).
    #[error("token is malformed")]
    Malformed,

    /// The MAC does not match; the payload must not be trusted.
    #[error("token signature is invalid")]
    SignatureInvalid,

    /// Signature checks out but the embedded expiry has passed.
    #[error("token has expired")]
    Expired,

    /// Signing failed while issuing a token.
    #[error("token could not be issued")]
    Issuance,
}

/// Verification seam for the request path.
///
/// Object-safe so the HTTP layer can hold `Arc<dyn TokenVerifier>` without
/// caring which scheme signs the tokens.
pub trait TokenVerifier: Send + Sync {
    /// Verify signature and expiry; claims are returned only on success.
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// HS256 codec over a shared secret.
///
/// The secret is injected at construction and is the only process-wide
/// state of the codec; nothing in this module reads ambient configuration.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a claim set for `sub`, expiring [`TOKEN_TTL_SECS`] after `now`.
    pub fn issue(
        &self,
        sub: AccountId,
        username: &str,
        roles: Vec<Role>,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub,
            username: username.to_string(),
            roles,
            iat: now.timestamp(),
            exp: now.timestamp() + TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|_| TokenError::Issuance)
    }
}

impl TokenVerifier for Hs256TokenCodec {
    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn codec() -> Hs256TokenCodec {
        Hs256TokenCodec::new(b"test-secret")
    }

    fn roles(names: &[&'static str]) -> Vec<Role> {
        names.iter().map(|n| Role::new(*n)).collect()
    }

    #[test]
    fn roundtrip_within_ttl() {
        let codec = codec();
        let sub = AccountId::new();
        let now = Utc::now();

        let token = codec
            .issue(sub, "alice", roles(&["viewer"]), now)
            .unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.sub, sub);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.roles, roles(&["viewer"]));
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn expired_token_rejected() {
        let codec = codec();
        let issued = Utc::now() - Duration::seconds(TOKEN_TTL_SECS + 60);

        let token = codec
            .issue(AccountId::new(), "alice", roles(&["viewer"]), issued)
            .unwrap();

        assert_eq!(codec.verify(&token).unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn foreign_secret_is_signature_invalid() {
        let token = Hs256TokenCodec::new(b"other-secret")
            .issue(AccountId::new(), "alice", roles(&["viewer"]), Utc::now())
            .unwrap();

        assert_eq!(
            codec().verify(&token).unwrap_err(),
            TokenError::SignatureInvalid
        );
    }

    #[test]
    fn tampered_token_never_verifies() {
        let codec = codec();
        let token = codec
            .issue(AccountId::new(), "alice", roles(&["viewer"]), Utc::now())
            .unwrap();

        // Flip one byte anywhere in the token; verification must fail.
        let bytes = token.into_bytes();
        for i in 0..bytes.len() {
            let mut tampered = bytes.clone();
            tampered[i] = if tampered[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(tampered).unwrap();
            assert!(codec.verify(&tampered).is_err());
        }
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(
            codec().verify("not-a-token").unwrap_err(),
            TokenError::Malformed
        );
    }
}

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::config::JwtConfig;

/// Verifies bearer tokens issued by the auth service. This service never signs tokens.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

/// Claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// JWT ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl JwtVerifier {
    /// Build a verifier from configuration: an RS256 public key file when
    /// `public_key_path` is set, otherwise an HS256 shared secret.
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if let Some(path) = &config.public_key_path {
            let public_key_pem = fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("Failed to read public key from {}: {}", path, e))?;
            let verifier = Self::from_rsa_pem(public_key_pem.as_bytes())?;
            tracing::info!("JWT verifier initialized with RS256 public key");
            return Ok(verifier);
        }

        match &config.secret {
            Some(secret) if !secret.is_empty() => {
                tracing::info!("JWT verifier initialized with HS256 shared secret");
                Ok(Self::from_secret(secret))
            }
            _ => Err(anyhow::anyhow!(
                "Either JWT_PUBLIC_KEY_PATH or JWT_SECRET must be set"
            )),
        }
    }

    pub fn from_rsa_pem(public_key_pem: &[u8]) -> Result<Self, anyhow::Error> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem)
            .map_err(|e| anyhow::anyhow!("Failed to parse public key: {}", e))?;
        Ok(Self {
            decoding_key,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    pub fn from_secret(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Validate signature and expiry, returning the token's claims.
    pub fn verify(&self, token: &str) -> Result<AccessTokenClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "unit-test-secret";

    fn token(secret: &str, expires_in: Duration) -> String {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: "65a1f0c2e4b0a1b2c3d4e5f6".to_string(),
            exp: (now + expires_in).timestamp(),
            iat: now.timestamp(),
            email: Some("user@example.com".to_string()),
            jti: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_token_signed_with_shared_secret() {
        let verifier = JwtVerifier::from_secret(SECRET);
        let claims = verifier.verify(&token(SECRET, Duration::minutes(15))).unwrap();
        assert_eq!(claims.sub, "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(claims.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn rejects_expired_token() {
        let verifier = JwtVerifier::from_secret(SECRET);
        assert!(verifier.verify(&token(SECRET, Duration::hours(-2))).is_err());
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let verifier = JwtVerifier::from_secret(SECRET);
        assert!(verifier
            .verify(&token("someone-else", Duration::minutes(15)))
            .is_err());
    }

    #[test]
    fn config_without_key_material_is_rejected() {
        let config = JwtConfig {
            public_key_path: None,
            secret: None,
        };
        assert!(JwtVerifier::new(&config).is_err());
    }
}

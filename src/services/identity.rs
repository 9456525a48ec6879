use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Verifies a bearer session token and yields the stable user id
#[async_trait::async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> AppResult<String>;
}

#[derive(Debug, Deserialize)]
struct SessionClaims {
    sub: String,
}

/// Verifies RS256 session JWTs against the identity provider's PEM public key
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn from_rsa_pem(pem: &str) -> AppResult<Self> {
        let key = DecodingKey::from_rsa_pem(pem.as_bytes())
            .map_err(|e| AppError::Internal(format!("Invalid session public key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        Ok(Self { key, validation })
    }
}

#[async_trait::async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> AppResult<String> {
        let data = decode::<SessionClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AppError::Unauthorized("Invalid session".to_string())
        })?;

        if data.claims.sub.is_empty() {
            return Err(AppError::Unauthorized("Invalid session".to_string()));
        }

        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pem_rejected() {
        assert!(matches!(
            JwtVerifier::from_rsa_pem("not a key"),
            Err(AppError::Internal(_))
        ));
    }
}

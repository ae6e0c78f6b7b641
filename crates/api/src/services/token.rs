//! Bearer token verification and issuance (HS256 JWT).
//!
//! Tokens are normally minted by the auth service; this API only verifies
//! them. [`TokenService::issue`] exists for the CLI and for tests.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use myngo_core::UserId;

use crate::models::CurrentUser;

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the user id as a string).
    pub sub: String,
    /// Numeric user id.
    #[serde(alias = "userId")]
    pub user_id: i32,
    /// Email of the user, if the issuer included it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Expiration time (seconds since the epoch).
    pub exp: usize,
}

/// Token errors.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    #[error("token lifetime out of range")]
    InvalidLifetime,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid(err),
        }
    }
}

/// Signs and verifies access tokens with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Create a token service from the shared HS256 secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a token and resolve the caller it identifies.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Expired` for expired tokens and
    /// `TokenError::Invalid` for bad signatures or malformed claims.
    pub fn verify(&self, token: &str) -> Result<CurrentUser, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        Ok(CurrentUser {
            id: UserId::new(data.claims.user_id),
            email: data.claims.email,
        })
    }

    /// Issue a token for `user_id` valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns an error if the expiry is before the epoch or out of range, or
    /// encoding fails.
    pub fn issue(
        &self,
        user_id: UserId,
        email: Option<&str>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let exp = Utc::now()
            .checked_add_signed(ttl)
            .ok_or(TokenError::InvalidLifetime)?
            .timestamp();
        let exp = usize::try_from(exp).map_err(|_| TokenError::InvalidLifetime)?;

        let claims = Claims {
            sub: user_id.to_string(),
            user_id: user_id.as_i32(),
            email: email.map(String::from),
            exp,
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"))
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = service();
        let token = tokens
            .issue(UserId::new(7), Some("user@myngo.test"), Duration::hours(1))
            .unwrap();

        let user = tokens.verify(&token).unwrap();
        assert_eq!(user.id, UserId::new(7));
        assert_eq!(user.email.as_deref(), Some("user@myngo.test"));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service();
        let token = tokens
            .issue(UserId::new(7), None, Duration::hours(-2))
            .unwrap();

        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service()
            .issue(UserId::new(7), None, Duration::hours(1))
            .unwrap();
        let other = TokenService::new(&SecretString::from("Zq8#Lm4$Tr2!Vx6@Kp0&Hs9*Ny3^Wd5%"));

        assert!(matches!(other.verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn test_lifetime_out_of_range() {
        let result = service().issue(UserId::new(7), None, Duration::weeks(1_000_000_000));
        assert!(matches!(result, Err(TokenError::InvalidLifetime)));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            service().verify("not.a.jwt"),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_camel_case_user_id_claim_accepted() {
        let claims: Claims =
            serde_json::from_str(r#"{"sub":"9","userId":9,"exp":4102444800}"#).unwrap();
        assert_eq!(claims.user_id, 9);
    }
}

//! JWT service for identity token issuance and verification
//!
//! Tokens are signed with HS256 using a server-side secret and carry the
//! subject id, subject email, issuance time and expiry time. Verification
//! is stateless: nothing about an issued token is stored server-side.

use anyhow::Result;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

/// Default token validity window in seconds (1 hour)
pub const DEFAULT_TOKEN_EXPIRY: u64 = 3600;

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared secret used to sign and verify tokens
    pub secret: String,
    /// Token validity window in seconds (default: 1 hour)
    pub token_expiry: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("token_expiry", &self.token_expiry)
            .finish()
    }
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Signing secret
    /// - `JWT_SECRET_FILE`: Path to a file holding the signing secret, used when `JWT_SECRET` is unset
    /// - `JWT_TOKEN_EXPIRY`: Token validity in seconds (default: 3600)
    pub fn from_env() -> Result<Self> {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                let path = std::env::var("JWT_SECRET_FILE").map_err(|_| {
                    anyhow::anyhow!("JWT_SECRET or JWT_SECRET_FILE environment variable not set")
                })?;
                std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("Failed to read JWT secret file: {}", e))?
                    .trim()
                    .to_string()
            }
        };

        if secret.is_empty() {
            anyhow::bail!("JWT secret must not be empty");
        }

        let token_expiry = std::env::var("JWT_TOKEN_EXPIRY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_EXPIRY);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// User email at issuance
    pub email: String,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Token verification failures
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Malformed token")]
    Malformed,

    #[error("Failed to sign token")]
    Signing,
}

/// The subject a verified token speaks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
        }
    }
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked against an explicit clock in `verify_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            token_expiry: config.token_expiry,
        }
    }

    /// Issue a token for a user, valid from now
    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, email, now_secs())
    }

    /// Issue a token as if the current time were `now` (seconds since epoch)
    pub fn issue_at(&self, user_id: Uuid, email: &str, now: u64) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now,
            exp: now.saturating_add(self.token_expiry),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify a token against the current time
    pub fn verify(&self, token: &str) -> Result<AuthUser, TokenError> {
        self.verify_at(token, now_secs())
    }

    /// Verify a token as if the current time were `now` (seconds since epoch)
    pub fn verify_at(&self, token: &str, now: u64) -> Result<AuthUser, TokenError> {
        let claims = self.decode_claims(token)?;

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims.into())
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })
    }

    /// Get the token validity window in seconds
    pub fn token_expiry(&self) -> u64 {
        self.token_expiry
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig {
            secret: secret.to_string(),
            token_expiry: DEFAULT_TOKEN_EXPIRY,
        })
    }

    fn flip_char(c: char) -> char {
        if c == 'A' { 'B' } else { 'A' }
    }

    #[test]
    fn test_issue_then_verify_returns_subject() {
        let jwt = service("test-secret");
        let id = Uuid::new_v4();

        let token = jwt.issue(id, "ada@example.com").unwrap();
        let user = jwt.verify(&token).unwrap();

        assert_eq!(user.id, id);
        assert_eq!(user.email, "ada@example.com");
    }

    #[test]
    fn test_token_valid_until_expiry_boundary() {
        let jwt = service("test-secret");
        let id = Uuid::new_v4();
        let issued = 1_700_000_000;

        let token = jwt.issue_at(id, "ada@example.com", issued).unwrap();

        assert!(jwt.verify_at(&token, issued + DEFAULT_TOKEN_EXPIRY - 1).is_ok());
        assert_eq!(
            jwt.verify_at(&token, issued + DEFAULT_TOKEN_EXPIRY),
            Err(TokenError::Expired)
        );
        assert_eq!(
            jwt.verify_at(&token, issued + DEFAULT_TOKEN_EXPIRY * 24),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_token_issued_long_ago_is_expired() {
        let jwt = service("test-secret");
        let token = jwt
            .issue_at(Uuid::new_v4(), "ada@example.com", 1_000)
            .unwrap();

        assert_eq!(jwt.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_flipped_signature_byte_is_rejected() {
        let jwt = service("test-secret");
        let token = jwt.issue(Uuid::new_v4(), "ada@example.com").unwrap();

        let split = token.rfind('.').unwrap() + 1;
        let (head, signature) = token.split_at(split);
        let mut chars: Vec<char> = signature.chars().collect();
        chars[0] = flip_char(chars[0]);
        let tampered = format!("{}{}", head, chars.into_iter().collect::<String>());

        assert_eq!(jwt.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let jwt = service("test-secret");
        let token = jwt.issue(Uuid::new_v4(), "ada@example.com").unwrap();

        let parts: Vec<&str> = token.split('.').collect();
        let mut payload: Vec<char> = parts[1].chars().collect();
        payload[4] = flip_char(payload[4]);
        let tampered = format!(
            "{}.{}.{}",
            parts[0],
            payload.into_iter().collect::<String>(),
            parts[2]
        );

        assert_eq!(jwt.verify(&tampered), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let token = service("secret-one")
            .issue(Uuid::new_v4(), "ada@example.com")
            .unwrap();

        assert_eq!(
            service("secret-two").verify(&token),
            Err(TokenError::InvalidSignature)
        );
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let jwt = service("test-secret");
        assert_eq!(jwt.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(jwt.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = JwtConfig {
            secret: "super-secret".to_string(),
            token_expiry: 60,
        };
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_huge_expiry_saturates() {
        let jwt = JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry: u64::MAX,
        });
        let id = Uuid::new_v4();

        let token = jwt.issue(id, "ada@example.com").unwrap();
        assert_eq!(jwt.verify(&token).unwrap().id, id);
    }

    fn clear_env() {
        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::remove_var("JWT_SECRET_FILE");
            std::env::remove_var("JWT_TOKEN_EXPIRY");
        }
    }

    #[test]
    #[serial]
    fn test_jwt_config_from_env() {
        clear_env();
        unsafe {
            std::env::set_var("JWT_SECRET", "env-secret");
            std::env::set_var("JWT_TOKEN_EXPIRY", "120");
        }

        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "env-secret");
        assert_eq!(config.token_expiry, 120);

        unsafe {
            std::env::set_var("JWT_TOKEN_EXPIRY", "soon");
        }
        assert_eq!(
            JwtConfig::from_env().unwrap().token_expiry,
            DEFAULT_TOKEN_EXPIRY
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_jwt_config_reads_secret_file() {
        clear_env();
        let path = std::env::temp_dir().join(format!("jwt-secret-{}", Uuid::new_v4()));
        std::fs::write(&path, "file-secret\n").unwrap();
        unsafe {
            std::env::set_var("JWT_SECRET_FILE", &path);
        }

        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "file-secret");
        assert_eq!(config.token_expiry, DEFAULT_TOKEN_EXPIRY);

        std::fs::remove_file(&path).unwrap();
        clear_env();
    }

    #[test]
    #[serial]
    fn test_jwt_config_rejects_missing_or_empty_secret() {
        clear_env();
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::set_var("JWT_SECRET", "");
        }
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("JWT_SECRET");
            std::env::set_var("JWT_SECRET_FILE", "/nonexistent/jwt-secret");
        }
        assert!(JwtConfig::from_env().is_err());

        clear_env();
    }
}

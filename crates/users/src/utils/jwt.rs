//! JWT (JSON Web Token) utilities for authentication.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reviewdeck_database::User;

use crate::types::AuthError;

/// JWT claims structure. The role is deliberately absent: authorization
/// re-reads the user row on every request, so a role change takes effect
/// without reissuing tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,      // Subject (user ID)
    pub username: String, // Username at issue time
    pub exp: usize,       // Expiration time
    pub iat: usize,       // Issued at
}

/// JWT token manager
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_duration: Duration,
}

impl TokenManager {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            token_duration: Duration::from_secs(ttl_seconds),
        }
    }

    /// Generate a new access token for the user
    pub fn issue(&self, user: &User) -> Result<String, AuthError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| AuthError::TokenCreationFailed("system time error".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            exp: (now + self.token_duration).as_secs() as usize,
            iat: now.as_secs() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreationFailed(e.to_string()))
    }

    /// Validate and decode an access token
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reviewdeck_database::UserRole;

    fn test_user() -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            bio: None,
            role: UserRole::User,
            is_staff: false,
            confirmation_seed: "seed".to_string(),
            created_at: "2024-01-01T00:00:00+00:00".to_string(),
            updated_at: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn token_round_trips() {
        let manager = TokenManager::new("test_secret_key_that_is_long_enough", 3600);
        let token = manager.issue(&test_user()).unwrap();

        let claims = manager.decode(&token).unwrap();
        assert_eq!(claims.sub, "7");
        assert_eq!(claims.username, "alice");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_token_is_rejected() {
        let manager = TokenManager::new("test_secret_key_that_is_long_enough", 3600);
        assert!(manager.decode("invalid.jwt.token").is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let manager = TokenManager::new("test_secret_key_that_is_long_enough", 3600);
        let other = TokenManager::new("a_completely_different_secret_key", 3600);

        let token = manager.issue(&test_user()).unwrap();
        assert!(other.decode(&token).is_err());
    }
}

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::JwtConfig;

/// JWT service for token generation and validation.
///
/// Symmetric signing only; the secret and algorithm come from deployment
/// configuration. There is no revocation list - a token stays valid until
/// its expiry or until the signing secret is rotated.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_token_expiry_minutes: i64,
}

/// Claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Primary role name
    pub role: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Token response returned to the client after login.
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
}

impl TokenResponse {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        let algorithm: Algorithm = config
            .algorithm
            .parse()
            .map_err(|_| anyhow::anyhow!("Unsupported JWT algorithm: {}", config.algorithm))?;

        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            anyhow::bail!(
                "JWT algorithm {} requires key material this service does not manage; use an HMAC variant",
                config.algorithm
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm,
            access_token_expiry_minutes: config.access_token_expiry_minutes,
        })
    }

    /// Generate an access token with the configured expiry.
    pub fn generate_access_token(
        &self,
        username: &str,
        role: &str,
    ) -> Result<String, anyhow::Error> {
        self.generate_access_token_with_ttl(
            username,
            role,
            Duration::minutes(self.access_token_expiry_minutes),
        )
    }

    /// Generate an access token expiring `ttl` from now.
    pub fn generate_access_token_with_ttl(
        &self,
        username: &str,
        role: &str,
        ttl: Duration,
    ) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            sub: username.to_string(),
            role: role.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))?;

        Ok(token)
    }

    /// Validate and decode an access token.
    ///
    /// Every failure mode - bad signature, malformed token, expired, missing
    /// subject - uniformly yields `None` so callers cannot distinguish them.
    pub fn decode_token(&self, token: &str) -> Option<AccessTokenClaims> {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.validate_exp = true;

        match decode::<AccessTokenClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => {
                let claims = data.claims;
                if claims.sub.is_empty() {
                    return None;
                }
                // The library check is strict-less-than; a token expiring at
                // this exact second is already dead.
                if claims.exp <= Utc::now().timestamp() {
                    return None;
                }
                Some(claims)
            }
            Err(e) => {
                tracing::debug!(error = %e, "Access token rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret-key".to_string(),
            algorithm: "HS256".to_string(),
            access_token_expiry_minutes: 30,
        }
    }

    fn test_service() -> JwtService {
        JwtService::new(&test_config()).expect("Failed to create JWT service")
    }

    #[test]
    fn test_rejects_non_hmac_algorithm() {
        let config = JwtConfig {
            algorithm: "RS256".to_string(),
            ..test_config()
        };
        assert!(JwtService::new(&config).is_err());

        let config = JwtConfig {
            algorithm: "bogus".to_string(),
            ..test_config()
        };
        assert!(JwtService::new(&config).is_err());
    }

    #[test]
    fn test_token_roundtrip() {
        let service = test_service();

        let token = service
            .generate_access_token("alice", "user")
            .expect("Failed to generate token");
        assert!(!token.is_empty());

        let claims = service.decode_token(&token).expect("Token should decode");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.role, "user");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_zero_ttl_token_fails_decode() {
        let service = test_service();

        let token = service
            .generate_access_token_with_ttl("alice", "user", Duration::zero())
            .expect("Failed to generate token");

        assert!(service.decode_token(&token).is_none());
    }

    #[test]
    fn test_expired_token_fails_decode() {
        let service = test_service();

        let token = service
            .generate_access_token_with_ttl("alice", "user", Duration::minutes(-5))
            .expect("Failed to generate token");

        assert!(service.decode_token(&token).is_none());
    }

    #[test]
    fn test_tampered_token_fails_decode() {
        let service = test_service();

        let token = service
            .generate_access_token("alice", "user")
            .expect("Failed to generate token");
        let mut tampered = token.clone();
        tampered.pop();

        assert!(service.decode_token(&tampered).is_none());
        assert!(service.decode_token("not-a-jwt").is_none());
    }

    #[test]
    fn test_wrong_secret_fails_decode() {
        let service = test_service();
        let other = JwtService::new(&JwtConfig {
            secret: "a-different-secret".to_string(),
            ..test_config()
        })
        .unwrap();

        let token = service
            .generate_access_token("alice", "user")
            .expect("Failed to generate token");

        assert!(other.decode_token(&token).is_none());
    }

    #[test]
    fn test_missing_subject_is_invalid() {
        let service = test_service();

        // A structurally valid token without a subject claim
        #[derive(Serialize)]
        struct NoSubClaims {
            role: String,
            exp: i64,
            iat: i64,
        }
        let now = Utc::now();
        let claims = NoSubClaims {
            role: "user".to_string(),
            exp: (now + Duration::minutes(5)).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("unit-test-secret-key".as_bytes()),
        )
        .unwrap();

        assert!(service.decode_token(&token).is_none());

        let empty_sub = service
            .generate_access_token_with_ttl("", "user", Duration::minutes(5))
            .unwrap();
        assert!(service.decode_token(&empty_sub).is_none());
    }
}

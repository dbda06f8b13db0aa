use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Global cached JwtService instance
static JWT_SERVICE: OnceLock<JwtService> = OnceLock::new();

/// Get the cached JwtService instance
///
/// Uses OnceLock for thread-safe lazy initialization.
/// The service is initialized once on first use and reused for all subsequent requests.
pub fn get_jwt_service() -> &'static JwtService {
    JWT_SERVICE.get_or_init(JwtService::from_config)
}

/// Access Token Claims
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// JWT Service for generating and validating admin tokens
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_hours: u64,
}

impl JwtService {
    pub fn new(secret: &str, access_token_hours: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_hours,
        }
    }

    /// Create JwtService from config
    pub fn from_config() -> Self {
        let config = crate::config::get_config();

        // 获取 JWT secret，如果为空则生成一个安全的随机值
        // （重启后已签发的 token 全部失效，生产环境应显式配置）
        let jwt_secret = if config.api.jwt_secret.is_empty() {
            use tracing::warn;
            warn!("JWT secret not configured or empty, generating secure random token");
            crate::utils::generate_secure_token(32)
        } else {
            config.api.jwt_secret.clone()
        };

        Self::new(&jwt_secret, config.api.access_token_hours)
    }

    /// Generate Access Token (signed, time-limited)
    pub fn generate_access_token(&self) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AccessClaims {
            sub: "admin".to_string(),
            role: "admin".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.access_token_hours as i64)).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate Access Token
    pub fn validate_access_token(
        &self,
        token: &str,
    ) -> Result<AccessClaims, jsonwebtoken::errors::Error> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &Validation::default())?;

        // Verify role claim
        if token_data.claims.role != "admin" {
            return Err(jsonwebtoken::errors::Error::from(
                jsonwebtoken::errors::ErrorKind::InvalidToken,
            ));
        }

        Ok(token_data.claims)
    }
}

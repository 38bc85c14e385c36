//! Application configuration loaded from environment variables.
//!
//! Configuration is read once at startup into an explicit struct that is
//! carried in `AppState`; handlers never read the process environment.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Concept2 OAuth client ID (public)
    pub concept2_client_id: String,
    /// Concept2 OAuth client secret
    pub concept2_client_secret: String,
    /// Supabase project URL (REST base)
    pub supabase_url: String,
    /// Supabase service role key (privileged, server-side only)
    pub supabase_service_key: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            concept2_client_id: env::var("CONCEPT2_CLIENT_ID")
                .map_err(|_| ConfigError::Missing("CONCEPT2_CLIENT_ID"))?,
            concept2_client_secret: env::var("CONCEPT2_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("CONCEPT2_CLIENT_SECRET"))?,
            supabase_url: env::var("SUPABASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_URL"))?,
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("SUPABASE_SERVICE_KEY"))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            concept2_client_id: "test_client_id".to_string(),
            concept2_client_secret: "test_secret".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test_service_key".to_string(),
            port: 8080,
        }
    }

    /// Verify the OAuth client credentials are present.
    ///
    /// Guards provider-facing handlers in deployments where the credential
    /// variables were bound but empty (a common misconfiguration); fails
    /// before any provider call is attempted.
    pub fn require_client_credentials(&self) -> Result<(), crate::error::AppError> {
        if self.concept2_client_id.is_empty() {
            return Err(crate::error::AppError::Config("CONCEPT2_CLIENT_ID"));
        }
        if self.concept2_client_secret.is_empty() {
            return Err(crate::error::AppError::Config("CONCEPT2_CLIENT_SECRET"));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_test_default() {
        let config = Config::test_default();
        assert_eq!(config.concept2_client_id, "test_client_id");
        assert_eq!(config.port, 8080);
        assert!(config.require_client_credentials().is_ok());
    }

    #[test]
    fn test_require_client_credentials_rejects_blank() {
        let mut config = Config::test_default();
        config.concept2_client_secret = String::new();
        let err = config.require_client_credentials().unwrap_err();
        assert!(matches!(err, crate::error::AppError::Config(_)));
    }
}

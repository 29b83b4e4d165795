use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub mongodb: MongoConfig,
    pub jwt: JwtConfig,
    pub security: SecurityConfig,
    pub rsvp: RsvpConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Verification material for bearer tokens issued by the auth service.
/// `public_key_path` (RS256) takes precedence over `secret` (HS256).
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub public_key_path: Option<String>,
    pub secret: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RsvpConfig {
    /// When true the rsvp routes require the same bearer token as the role routes.
    pub require_auth: bool,
}

impl RosterConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let environment: Environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "dev".to_string())
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;
        let is_prod = environment == Environment::Prod;

        Ok(RosterConfig {
            common: common_config,
            environment,
            service_name: get_env("SERVICE_NAME", Some("roster-service"), is_prod)?,
            log_level: get_env("LOG_LEVEL", Some("info"), is_prod)?,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|v| !v.is_empty()),
            mongodb: MongoConfig {
                uri: get_env("MONGODB_URI", None, is_prod)?,
                database: get_env("MONGODB_DATABASE", Some("roster_db"), is_prod)?,
            },
            jwt: JwtConfig {
                public_key_path: env::var("JWT_PUBLIC_KEY_PATH").ok(),
                secret: env::var("JWT_SECRET").ok(),
            },
            security: SecurityConfig {
                allowed_origins: parse_origins(&get_env(
                    "ALLOWED_ORIGINS",
                    Some("http://localhost:3000"),
                    is_prod,
                )?),
            },
            rsvp: RsvpConfig {
                require_auth: parse_flag(
                    "RSVP_REQUIRE_AUTH",
                    &env::var("RSVP_REQUIRE_AUTH").unwrap_or_else(|_| "false".to_string()),
                )?,
            },
        })
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Dev),
            "prod" | "production" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}

/// Strict boolean: only `true` or `false` are accepted.
fn parse_flag(key: &str, raw: &str) -> Result<bool, AppError> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be `true` or `false`, got `{}`",
            key,
            other
        ))),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_accepts_short_and_long_names() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Prod);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    fn access_flag_rejects_anything_but_true_or_false() {
        assert!(parse_flag("RSVP_REQUIRE_AUTH", "true").unwrap());
        assert!(!parse_flag("RSVP_REQUIRE_AUTH", "false").unwrap());
        for raw in ["TRUE", "1", "yes", "", " true"] {
            let err = parse_flag("RSVP_REQUIRE_AUTH", raw).unwrap_err();
            assert_eq!(err.code(), "ConfigError", "{:?}", raw);
        }
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}

use std::env;

use http::HeaderValue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },
}

/// Process configuration, read once at startup from the environment
/// (with `.env` support via `dotenv`).
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP listen port.
    pub port: u16,
    pub smtp: SmtpConfig,
    /// Sender mailbox; also the SMTP username.
    pub sender: String,
    /// Every submission is relayed to this single mailbox.
    pub recipient: String,
    pub allowed_origin: AllowedOrigin,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

/// CORS origin policy, resolved from `ALLOWED_ORIGIN`.
#[derive(Debug, Clone)]
pub enum AllowedOrigin {
    Any,
    Origin(HeaderValue),
}

impl AllowedOrigin {
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        if value == "*" {
            return Ok(Self::Any);
        }
        HeaderValue::from_str(value)
            .map(Self::Origin)
            .map_err(|err| ConfigError::InvalidVar {
                var: "ALLOWED_ORIGIN",
                reason: err.to_string(),
            })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let user = require("EMAIL_USER")?;
        let password = require("EMAIL_PASS")?;
        let recipient = require("RECIPIENT_EMAIL")?;

        let smtp = SmtpConfig {
            host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            port: parse_port("SMTP_PORT", 587)?,
            user: user.clone(),
            password,
        };

        Ok(Self {
            port: parse_port("PORT", 4500)?,
            smtp,
            sender: user,
            recipient,
            allowed_origin: AllowedOrigin::parse(
                &env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            )?,
        })
    }
}

fn require(var: &'static str) -> Result<String, ConfigError> {
    env::var(var).map_err(|_| ConfigError::MissingVar(var))
}

fn parse_port(var: &'static str, default: u16) -> Result<u16, ConfigError> {
    match env::var(var) {
        Ok(value) => value.parse().map_err(|_| ConfigError::InvalidVar {
            var,
            reason: format!("{value:?} is not a valid port"),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_origin_allows_any() {
        assert!(matches!(AllowedOrigin::parse("*"), Ok(AllowedOrigin::Any)));
    }

    #[test]
    fn explicit_origin_is_kept_verbatim() {
        let origin = AllowedOrigin::parse("https://forms.example.com").unwrap();
        match origin {
            AllowedOrigin::Origin(value) => {
                assert_eq!(value, HeaderValue::from_static("https://forms.example.com"));
            }
            AllowedOrigin::Any => panic!("expected explicit origin"),
        }
    }

    #[test]
    fn origin_with_control_characters_is_rejected() {
        assert!(AllowedOrigin::parse("https://bad\norigin").is_err());
    }
}

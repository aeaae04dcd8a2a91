use std::{env, fs, io, path::Path};

use serde::Deserialize;
use tracing::{info, warn};

/// Path of the optional configuration file.
pub const PATH: &str = "./data/config.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("malformed config file: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value of {key}: {value:?}")]
    InvalidVar { key: &'static str, value: String },
    #[error("invalid sender address: {0}")]
    EmailAddress(#[from] lettre::address::AddressError),
    #[error("jwt secret is not configured")]
    MissingJwtSecret,
}

/// Describing the server configuration.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub port: u16,
    /// Origin allowed by CORS.
    pub frontend_url: String,
    pub jwt_secret: String,
    pub mongodb_uri: String,
    pub db_name: String,
    /// Passcodes are logged instead of mailed when absent.
    pub smtp: Option<Smtp>,
    /// Uploads fail when absent.
    pub cloudinary: Option<Cloudinary>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:3000".to_owned(),
            jwt_secret: String::new(),
            mongodb_uri: "mongodb://localhost:27017".to_owned(),
            db_name: "department_portal".to_owned(),
            smtp: None,
            cloudinary: None,
        }
    }
}

/// Describing mailing configuration.
#[derive(Deserialize, Debug, Clone)]
pub struct Smtp {
    pub host: String,
    #[serde(default = "Smtp::default_port")]
    pub port: u16,
    /// Sender address, also the login username.
    pub email: lettre::Address,
    pub password: String,
}

impl Smtp {
    #[inline]
    fn default_port() -> u16 {
        587
    }
}

/// Describing object storage credentials.
#[derive(Deserialize, Debug, Clone)]
pub struct Cloudinary {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl Config {
    /// Loads the config file if there is one, then applies environment overrides.
    pub fn read() -> Result<Self, ConfigError> {
        let mut config = Self::from_file(PATH)?;
        config.override_from_env()?;
        Ok(config)
    }

    /// Reads the config of the server, which can't run without a jwt secret.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::read()?;
        if config.jwt_secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        Ok(config)
    }

    fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match fs::read_to_string(path.as_ref()) {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                info!("{} not found, using defaults", path.as_ref().display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    fn override_from_env(&mut self) -> Result<(), ConfigError> {
        if let Some(port) = var("PORT") {
            self.port = port.parse().map_err(|_| ConfigError::InvalidVar {
                key: "PORT",
                value: port,
            })?;
        }
        for (key, field) in [
            ("FRONTEND_URL", &mut self.frontend_url),
            ("JWT_SECRET", &mut self.jwt_secret),
            ("MONGODB_URI", &mut self.mongodb_uri),
            ("DB_NAME", &mut self.db_name),
        ] {
            if let Some(value) = var(key) {
                *field = value;
            }
        }

        if let (Some(host), Some(email), Some(password)) =
            (var("SMTP_HOST"), var("SMTP_EMAIL"), var("SMTP_PASSWORD"))
        {
            self.smtp = Some(Smtp {
                host,
                port: Smtp::default_port(),
                email: email.parse()?,
                password,
            });
        }
        if let Some(port) = var("SMTP_PORT") {
            match &mut self.smtp {
                Some(smtp) => {
                    smtp.port = port.parse().map_err(|_| ConfigError::InvalidVar {
                        key: "SMTP_PORT",
                        value: port,
                    })?
                }
                None => warn!("SMTP_PORT set without a complete smtp configuration, ignored"),
            }
        }

        if let (Some(cloud_name), Some(api_key), Some(api_secret)) = (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        ) {
            self.cloudinary = Some(Cloudinary {
                cloud_name,
                api_key,
                api_secret,
            });
        }
        Ok(())
    }
}

/// Reads a non-empty environment variable.
fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

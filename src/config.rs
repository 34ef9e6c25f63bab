use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, ConfigError, File};
use serde_derive::Deserialize;

use crate::utils::default_socket_path;


pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3333;


#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    pub socket_path: PathBuf,
    /// Read/write timeout on the backend socket, 0 disables it
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogSettings {
    pub level: String,
}

/// Values given on the command line; they win over every other source.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub socket_path: Option<PathBuf>,
    pub timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}


impl Settings {
    /// Builds settings from defaults, the optional config file and command
    /// line overrides, in that order.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", DEFAULT_HOST)?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("backend.socket_path", default_socket_path().to_string_lossy().into_owned())?
            .set_default("backend.timeout_ms", 0_i64)?
            .set_default("log.level", "info")?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .set_override_option("server.host", overrides.host.clone())?
            .set_override_option("server.port", overrides.port.map(i64::from))?
            .set_override_option(
                "backend.socket_path",
                overrides.socket_path.as_ref().map(|p| p.to_string_lossy().into_owned())
            )?
            .set_override_option("backend.timeout_ms", overrides.timeout_ms.map(|t| t as i64))?
            .set_override_option("log.level", overrides.log_level.clone())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.socket_path.as_os_str().is_empty() {
            return Err(ConfigError::Message("backend.socket_path must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl BackendSettings {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::script::ServeMode;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_SCRIPT_PATH: &str = "install.sh";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("INSTALL_BIND_ADDR is not a socket address: {0}")]
    BindAddr(String),
    #[error("INSTALL_SCRIPT_MODE must be `substitute` or `verbatim`, got `{0}`")]
    Mode(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub script_path: PathBuf,
    pub mode: ServeMode,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup, falling back to defaults for
    /// unset or empty values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let bind_addr = get("INSTALL_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .trim()
            .parse()
            .map_err(|_| ConfigError::BindAddr(bind_addr.clone()))?;

        let script_path = get("INSTALL_SCRIPT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRIPT_PATH));

        let mode = match get("INSTALL_SCRIPT_MODE") {
            Some(mode) => match mode.trim().to_ascii_lowercase().as_str() {
                "substitute" => ServeMode::Substitute,
                "verbatim" => ServeMode::Verbatim,
                _ => return Err(ConfigError::Mode(mode)),
            },
            None => ServeMode::Substitute,
        };

        Ok(Self {
            bind_addr,
            script_path,
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.script_path, PathBuf::from("install.sh"));
        assert_eq!(config.mode, ServeMode::Substitute);
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            ("INSTALL_BIND_ADDR", "127.0.0.1:8080"),
            ("INSTALL_SCRIPT_PATH", "/srv/get.sh"),
            ("INSTALL_SCRIPT_MODE", "Verbatim"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.script_path, PathBuf::from("/srv/get.sh"));
        assert_eq!(config.mode, ServeMode::Verbatim);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup(&[("INSTALL_SCRIPT_MODE", "  ")])).unwrap();
        assert_eq!(config.mode, ServeMode::Substitute);
    }

    #[test]
    fn rejects_bad_bind_addr() {
        let err = Config::from_lookup(lookup(&[("INSTALL_BIND_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::BindAddr(addr) if addr == "localhost"));
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = Config::from_lookup(lookup(&[("INSTALL_SCRIPT_MODE", "template")])).unwrap_err();
        assert!(matches!(err, ConfigError::Mode(mode) if mode == "template"));
    }
}

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "gqlbatch.json";
pub const DEFAULT_PROFILE_NAME: &str = "default";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonConfig {
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct Profile {
    pub url: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("invalid config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_path_to_error::Error<serde_json::Error>,
    },
    #[error("no profile named \"{0}\"")]
    MissingProfile(String),
    #[error("no endpoint url was given and the profile does not define one")]
    MissingUrl,
    #[error("invalid header \"{0}\", expected key:value")]
    InvalidHeader(String),
}

/// Values given on the command line; each one wins over the profile.
#[derive(Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub url: Option<String>,
    pub headers: Vec<(String, String)>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, PartialEq)]
pub struct Settings {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub timeout: Option<Duration>,
}

pub fn parse_config(content: &str) -> Result<JsonConfig, serde_path_to_error::Error<serde_json::Error>> {
    let deserializer = &mut serde_json::Deserializer::from_str(content);
    serde_path_to_error::deserialize(deserializer)
}

/// Reads the config at `path`. A missing file is `None` unless `required`.
pub fn read_config(path: &Path, required: bool) -> Result<Option<JsonConfig>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == io::ErrorKind::NotFound && !required => return Ok(None),
        Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
    };
    parse_config(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

pub fn resolve(config: Option<&JsonConfig>, overrides: Overrides) -> Result<Settings, ConfigError> {
    let profile = match (config, &overrides.profile) {
        (Some(config), Some(name)) => config.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::MissingProfile(name.clone()))?,
        (None, Some(name)) => return Err(ConfigError::MissingProfile(name.clone())),
        (Some(config), None) => config.profiles
            .get(DEFAULT_PROFILE_NAME)
            .cloned()
            .unwrap_or_default(),
        (None, None) => Profile::default(),
    };

    let url = overrides.url
        .or(profile.url)
        .ok_or(ConfigError::MissingUrl)?;
    let mut headers = profile.headers;
    headers.extend(overrides.headers);
    let timeout = overrides.timeout_secs
        .or(profile.timeout_secs)
        .map(Duration::from_secs);

    Ok(Settings { url, headers, timeout })
}

pub fn parse_header(raw: &str) -> Result<(String, String), ConfigError> {
    match raw.split_once(':') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ConfigError::InvalidHeader(raw.to_string()))
    }
}

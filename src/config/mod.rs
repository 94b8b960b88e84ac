use std::env;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct ConfigFile {
    pub input_file: Option<String>,
    pub concurrency: Option<usize>,
    pub timeout: Option<u64>,
    pub workers: Option<usize>,
    pub ports: Option<String>,
    pub insecure: Option<bool>,
    pub follow_redirects: Option<bool>,
    pub user_agent: Option<String>,
    #[serde(alias = "header")]
    pub headers: Option<Vec<String>>,
    pub output: Option<String>,
}

fn home_dir() -> Option<PathBuf> {
    ["HOME", "USERPROFILE"]
        .iter()
        .find_map(|key| env::var_os(key).filter(|v| !v.is_empty()))
        .map(PathBuf::from)
}

pub fn default_config_path() -> Option<PathBuf> {
    home_dir().map(|home| home.join(".pokehttp").join("config.yml"))
}

/// Resolves a leading `~` or `~/` against the home directory. `~user` forms
/// and paths without a tilde are returned untouched.
pub fn expand_tilde(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with(&['/', '\\'][..]) => &rest[1..],
        _ => return PathBuf::from(path),
    };
    match home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

pub fn expand_tilde_string(path: &str) -> String {
    expand_tilde(path).display().to_string()
}

pub fn parse_config(contents: &str) -> Result<ConfigFile, String> {
    if contents.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    serde_yaml::from_str::<ConfigFile>(contents).map_err(|e| e.to_string())
}

pub fn load_config(path: &PathBuf, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => parse_config(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

//! Server configuration.
//!
//! Settings are read from a YAML file named by the `STEWARD_CONFIG`
//! environment variable (default `steward.yaml`). A missing file falls back
//! to the built-in defaults so the server can start bare.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Advertised in the `Server` response header and `SERVER_SOFTWARE`.
    pub server_name: String,
    pub listen_addr: String,
    /// Document root used when no virtual host matches.
    pub web_root: PathBuf,
    /// Candidate index files, tried in order for directory requests.
    pub index_files: Vec<String>,
    /// Whether directories without an index file may be listed.
    pub allow_index: bool,
    /// Directory holding custom `<status>.html` error pages.
    pub error_pages_dir: Option<PathBuf>,
    /// Idle deadline for a whole connection, in seconds.
    pub timeout_secs: u64,
    /// Extension to interpreter map for CGI scripts, e.g. `php: /usr/bin/php-cgi`.
    pub cgi: HashMap<String, PathBuf>,
    /// Extra or overriding MIME type entries, keyed by extension.
    pub mime_types: HashMap<String, String>,
    /// Extra extensions served as binary.
    pub binary_extensions: Vec<String>,
    pub virtual_hosts: Vec<VirtualHostConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VirtualHostConfig {
    /// Display name, only used in logs.
    pub name: Option<String>,
    /// Host header value this entry answers for.
    pub host: String,
    pub root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_name: "Steward".to_string(),
            listen_addr: "127.0.0.1:8080".to_string(),
            web_root: PathBuf::from("webroot"),
            index_files: vec!["index.htm".to_string(), "index.html".to_string()],
            allow_index: true,
            error_pages_dir: None,
            timeout_secs: 20,
            cgi: HashMap::new(),
            mime_types: HashMap::new(),
            binary_extensions: Vec::new(),
            virtual_hosts: Vec::new(),
        }
    }
}

impl Config {
    /// Loads the configuration from the path in `STEWARD_CONFIG`, or from
    /// `steward.yaml` in the working directory.
    ///
    /// A missing file yields the defaults; a file that exists but cannot be
    /// parsed is an error, so typos do not silently start a misconfigured
    /// server.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("STEWARD_CONFIG").unwrap_or_else(|_| "steward.yaml".to_string());

        match std::fs::read_to_string(&path) {
            Ok(text) => Self::from_yaml(&text).with_context(|| format!("invalid config file {path}")),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path, "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e).with_context(|| format!("cannot read config file {path}")),
        }
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        let cfg = serde_yaml::from_str(text)?;
        Ok(cfg)
    }
}

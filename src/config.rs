//! Run configuration
//!
//! Loaded from YAML; every field has a default, so an absent or partial
//! file is valid.

use crate::extract::{OrdinalGrammar, OrdinalSpec};
use crate::model::House;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid ordinal pattern: {0}")]
    Pattern(#[from] regex_lite::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// HTTP client and retry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_backoff_secs: f64,
    pub page_size: usize,
    pub max_pages: usize,
    pub user_agent: String,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            retry_attempts: 3,
            retry_backoff_secs: 0.8,
            page_size: 20,
            max_pages: 200,
            user_agent: concat!("reportwatch/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the three tables
    pub data_dir: PathBuf,
    pub reports_file: String,
    pub scans_file: String,
    pub order_papers_file: String,

    /// Publications feed
    pub publications_url: String,
    /// Business-document listing; `{skip}` is replaced with the page offset
    pub documents_url: String,
    /// Business-document HTML; `{id}` is replaced with the document id
    pub document_html_url: String,
    /// `Notes` value identifying the daily Order Paper
    pub business_note: String,
    pub section_heading: String,

    pub accepted_houses: Vec<House>,
    pub http: HttpSettings,
    pub ordinal_grammar: Vec<OrdinalSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("docs"),
            reports_file: "Reports.csv".into(),
            scans_file: "Scans.csv".into(),
            order_papers_file: "Order Papers.csv".into(),
            publications_url: "https://committees-api.parliament.uk/api/Publications?PublicationTypeIds=1&PublicationTypeIds=12&SortOrder=PublicationDateDescending".into(),
            documents_url: "https://housepapers-api.parliament.uk/api/document/?DocumentTypeId=1&skip={skip}".into(),
            document_html_url: "https://housepapers-api.parliament.uk/api/document/{id}/html".into(),
            business_note: "Today's business in the Chamber and Westminster Hall.".into(),
            section_heading: "Committee Reports Published Today".into(),
            accepted_houses: vec![House::Commons, House::Joint],
            http: HttpSettings::default(),
            ordinal_grammar: OrdinalSpec::defaults(),
        }
    }
}

impl Config {
    /// Default config location (`<config dir>/reportwatch/config.yaml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reportwatch").join("config.yaml"))
    }

    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Load from `explicit`, else the default location if it exists, else
    /// defaults.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Compile the configured ordinal rules.
    pub fn grammar(&self) -> ConfigResult<OrdinalGrammar> {
        Ok(OrdinalGrammar::from_specs(&self.ordinal_grammar)?)
    }

    pub fn reports_path(&self) -> PathBuf {
        self.data_dir.join(&self.reports_file)
    }

    pub fn scans_path(&self) -> PathBuf {
        self.data_dir.join(&self.scans_file)
    }

    pub fn order_papers_path(&self) -> PathBuf {
        self.data_dir.join(&self.order_papers_file)
    }

    pub fn documents_page_url(&self, skip: usize) -> String {
        self.documents_url.replace("{skip}", &skip.to_string())
    }

    pub fn document_url(&self, id: &str) -> String {
        self.document_html_url.replace("{id}", id)
    }
}

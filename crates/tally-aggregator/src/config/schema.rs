use std::net::SocketAddr;

use serde::Deserialize;
use tally_core::counters::DEFAULT_COUNTERS_DOCUMENT;
use tally_core::error::{Result, TallyError};
use tally_core::path::{PathTemplate, DEFAULT_RECORDS_TEMPLATE};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AggregatorConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub counters: CountersSection,

    #[serde(default)]
    pub records: RecordsSection,

    #[serde(default)]
    pub triggers: TriggersSection,

    #[serde(default)]
    pub store: StoreSection,
}

impl AggregatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(TallyError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.counters.validate()?;
        self.records.template()?;
        self.store.validate()?;

        if !self.triggers.users && !self.triggers.records {
            return Err(TallyError::BadRequest(
                "triggers: at least one of users/records must be enabled".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            TallyError::BadRequest(format!("server.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountersSection {
    /// Key of the single shared counters document.
    #[serde(default = "default_document")]
    pub document: String,
}

impl Default for CountersSection {
    fn default() -> Self {
        Self {
            document: default_document(),
        }
    }
}

impl CountersSection {
    pub fn validate(&self) -> Result<()> {
        let segments: Vec<&str> = self.document.split('/').collect();
        if segments.iter().any(|s| s.is_empty()) || segments.len() % 2 != 0 {
            return Err(TallyError::BadRequest(format!(
                "counters.document must be a collection/document path, got `{}`",
                self.document
            )));
        }
        Ok(())
    }
}

fn default_document() -> String {
    DEFAULT_COUNTERS_DOCUMENT.into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordsSection {
    /// Trigger path of the counted child records.
    #[serde(default = "default_records_path")]
    pub path: String,
}

impl Default for RecordsSection {
    fn default() -> Self {
        Self {
            path: default_records_path(),
        }
    }
}

impl RecordsSection {
    pub fn template(&self) -> Result<PathTemplate> {
        PathTemplate::parse(&self.path)
    }
}

fn default_records_path() -> String {
    DEFAULT_RECORDS_TEMPLATE.into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TriggersSection {
    #[serde(default = "default_true")]
    pub users: bool,
    #[serde(default = "default_true")]
    pub records: bool,
}

impl Default for TriggersSection {
    fn default() -> Self {
        Self {
            users: true,
            records: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process; state is lost on restart. Tests and local runs.
    Memory,
    /// Shared Redis hashes; safe across any number of aggregator instances.
    Redis,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreSection {
    #[serde(default = "default_backend")]
    pub backend: StoreBackend,

    #[serde(default = "default_redis_url")]
    pub url: String,

    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl StoreSection {
    pub fn validate(&self) -> Result<()> {
        if self.backend == StoreBackend::Redis
            && !(self.url.starts_with("redis://") || self.url.starts_with("rediss://"))
        {
            return Err(TallyError::BadRequest(
                "store.url must start with redis:// or rediss://".into(),
            ));
        }
        if !(100..=60000).contains(&self.connect_timeout_ms) {
            return Err(TallyError::BadRequest(
                "store.connect_timeout_ms must be between 100 and 60000".into(),
            ));
        }
        Ok(())
    }
}

fn default_backend() -> StoreBackend {
    StoreBackend::Memory
}
fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".into()
}
fn default_key_prefix() -> String {
    "tally:".into()
}
fn default_connect_timeout_ms() -> u64 {
    2000
}

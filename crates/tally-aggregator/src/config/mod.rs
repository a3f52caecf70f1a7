//! Aggregator config loader (strict parsing).

pub mod schema;

use std::fs;

use tally_core::error::{Result, TallyError};

pub use schema::{
    AggregatorConfig, CountersSection, RecordsSection, ServerSection, StoreBackend, StoreSection,
    TriggersSection,
};

pub fn load_from_file(path: &str) -> Result<AggregatorConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TallyError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<AggregatorConfig> {
    let cfg: AggregatorConfig = serde_yaml::from_str(s)
        .map_err(|e| TallyError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

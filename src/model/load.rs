use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use super::data::TopicModelData;
use super::parse::parse_payload;

pub fn load_topic_model(path: &Path) -> Result<TopicModelData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read topic model payload {}", path.display()))?;
    debug!("read {} bytes from {}", raw.len(), path.display());

    let data = parse_payload(&raw)
        .with_context(|| format!("failed to normalize topic model payload {}", path.display()))?;

    info!(
        "loaded {} topics, {} relevance rows, {} token memberships (R = {})",
        data.topic_count(),
        data.relevance_rows.len(),
        data.memberships.len(),
        data.relevant_terms
    );

    Ok(data)
}

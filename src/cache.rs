use anyhow::{Context, Result};
use dialogue_script_converter::dialogue::prompt::INSTRUCTIONS_VERSION;
use dialogue_script_converter::{DialogueEvent, RequestContext};
use std::path::PathBuf;

use crate::ConversionMode;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversionCacheKey {
    pub conversion_hash: String,
}

impl ConversionCacheKey {
    pub fn new(mode: ConversionMode, context: &RequestContext, input_text: &str) -> Self {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        for part in [
            INSTRUCTIONS_VERSION.to_string().as_str(),
            mode.to_string().as_str(),
            context.scene_id.as_str(),
            context.sequence_id.as_deref().unwrap_or_default(),
            input_text,
        ] {
            hasher.update(part.as_bytes());
            hasher.update([0]);
        }
        Self {
            conversion_hash: format!("{:x}", hasher.finalize()),
        }
    }
}

pub struct ConversionCache {
    cache_dir: PathBuf,
}

impl ConversionCache {
    pub async fn new() -> Result<Self> {
        let cache_dir = get_cache_directory()?;

        tokio::fs::create_dir_all(&cache_dir)
            .await
            .context("Failed to create cache directory")?;

        Ok(Self { cache_dir })
    }

    pub async fn get(&self, key: &ConversionCacheKey) -> Option<Vec<DialogueEvent>> {
        match cacache::read(&self.cache_dir, &key.conversion_hash).await {
            Ok(data) => serde_json::from_slice(&data).ok(),
            Err(_) => None,
        }
    }

    pub async fn insert(&self, key: ConversionCacheKey, value: &[DialogueEvent]) {
        if let Ok(serialized) = serde_json::to_vec(value) {
            if let Err(error) =
                cacache::write(&self.cache_dir, &key.conversion_hash, serialized).await
            {
                tracing::warn!(%error, "failed to write conversion cache");
            }
        }
    }
}

fn get_cache_directory() -> Result<PathBuf> {
    let cache_base = dirs::cache_dir().context("Failed to determine cache directory")?;
    Ok(cache_base.join(env!("CARGO_CRATE_NAME")))
}

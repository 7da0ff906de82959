//! CLI wiring for the ApplyPilot agent: configuration, the chromium
//! session factory, posting input files and the JSONL outcome log.

pub mod config;
pub mod factory;
pub mod jobs;
pub mod store;

use std::sync::Arc;

use tracing::info;

use applypilot_mapper::{FieldMapper, OpenAiFieldMapper, OpenAiMapperConfig, RuleBasedMapper};

use crate::config::AppConfig;

/// Pick the mapper: LLM-backed when a key is configured, rules otherwise.
/// The pipeline falls back to rules on any LLM failure either way.
pub fn build_mapper(config: &AppConfig) -> Arc<dyn FieldMapper> {
    if let Some(api_key) = &config.mapper.api_key {
        match OpenAiFieldMapper::new(OpenAiMapperConfig {
            api_key: api_key.clone(),
            model: config.mapper.model.clone(),
            ..OpenAiMapperConfig::default()
        }) {
            Ok(mapper) => {
                info!(model = %config.mapper.model, "using LLM field mapper");
                return Arc::new(mapper);
            }
            Err(err) => {
                info!(error = %err, "LLM mapper unavailable, using rules");
            }
        }
    } else {
        info!("no API key configured, using rule-based field mapper");
    }
    Arc::new(RuleBasedMapper)
}

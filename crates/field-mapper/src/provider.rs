use async_trait::async_trait;

use applypilot_core_types::FieldMapping;

use crate::errors::MapperError;
use crate::model::MappingRequest;

/// Capability seam over mapping strategies. The rule-based implementation
/// is the default; the LLM-backed one is injected when configured. A
/// failing mapper is an error the caller answers with the fallback, never
/// a crash.
#[async_trait]
pub trait FieldMapper: Send + Sync {
    async fn map_fields(&self, request: &MappingRequest) -> Result<Vec<FieldMapping>, MapperError>;

    /// Short identifier for logs.
    fn name(&self) -> &'static str;
}

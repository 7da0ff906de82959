//! Field mapping: assign a value (or "leave untouched") to every extracted
//! form field.
//!
//! The primary strategy is one structured round trip to a text-generation
//! collaborator; the rule-based mapper is the default and the fallback, and
//! must be independently correct since the collaborator is optional
//! configuration.

mod errors;
mod json;
mod model;
mod openai;
mod prompt;
mod provider;
mod rules;

pub use errors::MapperError;
pub use json::extract_json_array;
pub use model::MappingRequest;
pub use openai::{OpenAiFieldMapper, OpenAiMapperConfig};
pub use provider::FieldMapper;
pub use rules::RuleBasedMapper;

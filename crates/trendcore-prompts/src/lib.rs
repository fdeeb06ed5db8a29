//! Named prompt templates for the analysis pipeline. Each built-in template
//! pairs a fixed system message with a user-message pattern; rendering
//! substitutes `{placeholder}` tokens by literal string replacement so item
//! content can never be mistaken for template structure.

mod format;
mod registry;

pub use registry::{PromptRegistry, PromptTemplate};
pub use trendcore_types::NewsItem;

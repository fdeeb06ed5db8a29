//! Article extraction from raw HTML, shared by the plain-HTTP and
//! headless-browser fetchers so both speak the same selector ordering and
//! content-cleaning rules.

pub mod article;
pub mod error;

pub use article::{extract_article, ExtractedArticle};
pub use error::{ExtractionError, Result};

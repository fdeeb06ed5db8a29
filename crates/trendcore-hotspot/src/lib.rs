//! Single-shot, provider-polymorphic hotspot report generation: assembles a
//! compact text view of hot-list/RSS aggregates, substitutes it into a
//! template, dispatches to an OpenAI-compatible or Gemini endpoint, and
//! parses the structured seven-field response.

mod format;
mod hotspot;
mod provider;
mod template;

pub use hotspot::HotspotAnalyzer;

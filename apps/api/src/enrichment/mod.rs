// SOP enrichment: suggestions, quality assessment, checklists, resource links.
// All completion calls go through llm_client; all search calls through search_client.

pub mod enricher;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod prompts;

pub use enricher::{EnrichError, Enricher};

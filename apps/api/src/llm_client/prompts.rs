// Shared prompt constants used across enrichment tasks.
// Task-specific templates live in enrichment/prompts.rs.

/// Marker the quality rubric tells the model to end with, and the parser scans for.
/// Both sides read this constant so the contract cannot drift.
pub const TOTAL_SCORE_MARKER: &str = "Total Score:";

/// Appended to every system prompt: output must be Markdown.
pub const MARKDOWN_MANDATORY: &str = "Format the output in Markdown (mandatory).";

/// Output ceiling for suggestion rewrites and quality assessments.
pub const LONG_FORM_MAX_TOKENS: u32 = 700;

/// Output ceiling for checklist extraction.
pub const CHECKLIST_MAX_TOKENS: u32 = 500;

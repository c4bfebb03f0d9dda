//! Response parser — pulls structured values out of free-text provider output.
//!
//! Every function here is total: a miss yields `None` or an empty collection,
//! never an error. Surrounding prose is ignored; the marker literal is not.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::enrichment::models::{ResourceLink, ResourceSet, MAX_QUALITY_SCORE};
use crate::llm_client::prompts::TOTAL_SCORE_MARKER;
use crate::search_client::OrganicResult;

fn total_score_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        RegexBuilder::new(&format!(r"{}\s*(\d+)", regex::escape(TOTAL_SCORE_MARKER)))
            .case_insensitive(true)
            .build()
            .expect("total score pattern is a valid regex")
    })
}

/// First integer following the total-score marker, clamped to the rubric maximum.
pub fn extract_total_score(text: &str) -> Option<u32> {
    let digits = total_score_pattern().captures(text)?.get(1)?.as_str();
    // A digit run only fails to parse on overflow
    Some(
        digits
            .parse::<u32>()
            .map_or(MAX_QUALITY_SCORE, |n| n.min(MAX_QUALITY_SCORE)),
    )
}

/// One checklist item per non-blank line, trimmed, in original order. Duplicates stay.
pub fn split_to_checklist(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Maps provider records onto links, keeping provider order.
/// Records without a usable title or link are skipped.
pub fn to_resource_set(results: Vec<OrganicResult>) -> ResourceSet {
    let links = results
        .into_iter()
        .filter_map(|result| {
            let title = result.title.filter(|t| !t.trim().is_empty())?;
            let url = result.link.filter(|l| !l.trim().is_empty())?;
            Some(ResourceLink {
                title,
                url,
                snippet: result.snippet.unwrap_or_default(),
            })
        })
        .collect();
    ResourceSet { links }
}

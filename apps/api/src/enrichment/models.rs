//! Enrichment data model. Every value here is built per request and handed back
//! to the caller; nothing is persisted by this service.

use serde::{Deserialize, Serialize};

/// Fixed analysis text of the degraded quality result.
pub const QUALITY_FALLBACK_ANALYSIS: &str = "Error assessing quality";

/// Highest total score the rubric allows.
pub const MAX_QUALITY_SCORE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Suggest,
    AssessQuality,
    Checklist,
    FindResources,
}

/// SOP text plus the task to run over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentRequest {
    pub sop_text: String,
    pub title: Option<String>,
    pub task: TaskKind,
}

impl EnrichmentRequest {
    pub fn new(sop_text: impl Into<String>, title: Option<String>, task: TaskKind) -> Self {
        Self {
            sop_text: sop_text.into(),
            title,
            task,
        }
    }

    /// Title as embedded in prompts; absent titles render as empty.
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionResult {
    pub markdown_content: String,
}

/// Rubric analysis plus the parsed total.
///
/// Three observable outcomes:
/// - `total_score = Some(n)`: the model emitted a parseable total.
/// - `total_score = None`: the call worked but no total marker was found.
/// - the sentinel (`QUALITY_FALLBACK_ANALYSIS`, `Some(0)`): the call itself failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityAssessment {
    pub analysis_markdown: String,
    pub total_score: Option<u32>,
}

impl QualityAssessment {
    pub fn sentinel() -> Self {
        Self {
            analysis_markdown: QUALITY_FALLBACK_ANALYSIS.to_string(),
            total_score: Some(0),
        }
    }

    pub fn is_degraded(&self) -> bool {
        *self == Self::sentinel()
    }

    pub fn band(&self) -> Option<QualityBand> {
        self.total_score.map(QualityBand::from_score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistResult {
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceLink {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl ResourceLink {
    /// `[title](url): snippet` followed by a blank line.
    pub fn to_markdown_line(&self) -> String {
        format!("[{}]({}): {}\n\n", self.title, self.url, self.snippet)
    }
}

/// Links in provider ranking order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceSet {
    pub links: Vec<ResourceLink>,
}

impl ResourceSet {
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn to_markdown_lines(&self) -> Vec<String> {
        self.links.iter().map(ResourceLink::to_markdown_line).collect()
    }
}

/// Output of `Enricher::enrich`, one variant per task kind, named as `TaskKind` names it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enrichment {
    Suggest(SuggestionResult),
    AssessQuality(QualityAssessment),
    Checklist(ChecklistResult),
    FindResources(ResourceSet),
}

/// Dashboard bucket for a quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityBand {
    /// `< 30`
    Low,
    /// `30..60`
    Medium,
    /// `>= 60`
    High,
}

impl QualityBand {
    pub fn from_score(score: u32) -> Self {
        match score {
            s if s < 30 => QualityBand::Low,
            s if s < 60 => QualityBand::Medium,
            _ => QualityBand::High,
        }
    }
}

/// Per-band counts over a set of stored scores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualityDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub unscored: usize,
}

impl QualityDistribution {
    pub fn tally<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = Option<u32>>,
    {
        scores
            .into_iter()
            .fold(Self::default(), |mut dist, score| {
                match score.map(QualityBand::from_score) {
                    Some(QualityBand::Low) => dist.low += 1,
                    Some(QualityBand::Medium) => dist.medium += 1,
                    Some(QualityBand::High) => dist.high += 1,
                    None => dist.unscored += 1,
                }
                dist
            })
    }
}

//! Enricher — the façade behind the four enrichment endpoints.
//!
//! Each operation is one linear pass: build prompt → one outbound call → parse.
//! No retries. Failures propagate on first occurrence, except for quality
//! assessment, which degrades to `QualityAssessment::sentinel()` so dashboards
//! built on stored scores keep rendering.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info};

use crate::enrichment::models::{
    ChecklistResult, Enrichment, EnrichmentRequest, QualityAssessment, ResourceSet,
    SuggestionResult, TaskKind,
};
use crate::enrichment::parser::{extract_total_score, split_to_checklist, to_resource_set};
use crate::enrichment::prompts::{build_prompt, Prompt};
use crate::llm_client::{CompletionFailure, CompletionResult, CompletionService};
use crate::search_client::{SearchFailure, SearchOptions, SearchService};

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("SOP text cannot be empty")]
    EmptySopText,

    #[error("request is for {actual:?}, not {expected:?}")]
    TaskMismatch { expected: TaskKind, actual: TaskKind },

    #[error(transparent)]
    Completion(#[from] CompletionFailure),

    #[error(transparent)]
    Search(#[from] SearchFailure),
}

/// Holds the process-wide provider handles. Built once in `main`, shared via `Arc`.
pub struct Enricher {
    completion: Arc<dyn CompletionService>,
    search: Arc<dyn SearchService>,
    search_options: SearchOptions,
}

impl Enricher {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        search: Arc<dyn SearchService>,
        search_options: SearchOptions,
    ) -> Self {
        Self {
            completion,
            search,
            search_options,
        }
    }

    /// Runs whichever operation `request.task` names.
    pub async fn enrich(&self, request: &EnrichmentRequest) -> Result<Enrichment, EnrichError> {
        Ok(match request.task {
            TaskKind::Suggest => Enrichment::Suggest(self.suggest(request).await?),
            TaskKind::AssessQuality => {
                Enrichment::AssessQuality(self.assess_quality(request).await?)
            }
            TaskKind::Checklist => Enrichment::Checklist(self.extract_checklist(request).await?),
            TaskKind::FindResources => {
                Enrichment::FindResources(self.find_resources(request).await?)
            }
        })
    }

    /// Rewrites the SOP into a fuller procedure. Completion failures propagate.
    pub async fn suggest(
        &self,
        request: &EnrichmentRequest,
    ) -> Result<SuggestionResult, EnrichError> {
        let prompt = prompt_for(request, TaskKind::Suggest)?;
        let result = self.complete(&prompt).await?;

        Ok(SuggestionResult {
            markdown_content: result.raw_text.trim().to_string(),
        })
    }

    /// Scores the SOP against the rubric.
    ///
    /// Completion failures do NOT propagate: they are logged and replaced by
    /// the sentinel. Only caller errors (empty text, wrong task) return `Err`.
    pub async fn assess_quality(
        &self,
        request: &EnrichmentRequest,
    ) -> Result<QualityAssessment, EnrichError> {
        let prompt = prompt_for(request, TaskKind::AssessQuality)?;

        match self.complete(&prompt).await {
            Ok(result) => {
                let analysis_markdown = result.raw_text.trim().to_string();
                let total_score = extract_total_score(&analysis_markdown);
                if total_score.is_none() {
                    info!("Quality analysis carried no total score marker");
                }
                Ok(QualityAssessment {
                    analysis_markdown,
                    total_score,
                })
            }
            Err(failure) => {
                error!(
                    kind = ?failure.kind,
                    timed_out = failure.timed_out,
                    "Quality assessment failed, returning sentinel: {}",
                    failure.message
                );
                Ok(QualityAssessment::sentinel())
            }
        }
    }

    /// Turns the SOP into checklist items. Completion failures propagate.
    pub async fn extract_checklist(
        &self,
        request: &EnrichmentRequest,
    ) -> Result<ChecklistResult, EnrichError> {
        let prompt = prompt_for(request, TaskKind::Checklist)?;
        let result = self.complete(&prompt).await?;

        Ok(ChecklistResult {
            items: split_to_checklist(&result.raw_text),
        })
    }

    /// Searches with the full SOP text as the query. Search failures propagate;
    /// an empty result list is a valid, empty set.
    pub async fn find_resources(
        &self,
        request: &EnrichmentRequest,
    ) -> Result<ResourceSet, EnrichError> {
        check_request(request, TaskKind::FindResources)?;
        let results = self
            .search
            .search(&request.sop_text, &self.search_options)
            .await?;

        let set = to_resource_set(results);
        if set.is_empty() {
            info!("Search returned no usable resource links");
        } else {
            info!("Found {} resource links", set.len());
        }
        Ok(set)
    }

    async fn complete(&self, prompt: &Prompt) -> Result<CompletionResult, CompletionFailure> {
        let result = self
            .completion
            .complete(&prompt.system, &prompt.user, prompt.max_tokens)
            .await?;
        debug!(
            "Completion returned {} chars (ceiling {} tokens)",
            result.raw_text.len(),
            result.token_limit_applied
        );
        Ok(result)
    }
}

fn check_request(request: &EnrichmentRequest, expected: TaskKind) -> Result<(), EnrichError> {
    if request.task != expected {
        return Err(EnrichError::TaskMismatch {
            expected,
            actual: request.task,
        });
    }
    if request.sop_text.trim().is_empty() {
        return Err(EnrichError::EmptySopText);
    }
    Ok(())
}

fn prompt_for(request: &EnrichmentRequest, expected: TaskKind) -> Result<Prompt, EnrichError> {
    check_request(request, expected)?;
    build_prompt(request).ok_or(EnrichError::TaskMismatch {
        expected,
        actual: request.task,
    })
}

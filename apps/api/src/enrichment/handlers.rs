//! Axum route handlers for the Enrichment API.
//!
//! The document layer resolves an SOP id to its text and posts it here.
//! Persisting the results (suggested content, quality score) is the caller's job.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::enrichment::models::{
    ChecklistResult, Enrichment, EnrichmentRequest, QualityAssessment, QualityBand,
    QualityDistribution, ResourceLink, ResourceSet, SuggestionResult, TaskKind,
};
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SopPayload {
    pub sop_text: String,
    pub title: Option<String>,
}

impl SopPayload {
    fn into_request(self, task: TaskKind) -> EnrichmentRequest {
        EnrichmentRequest::new(self.sop_text, self.title, task)
    }
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: String,
}

impl From<SuggestionResult> for SuggestionsResponse {
    fn from(result: SuggestionResult) -> Self {
        Self {
            suggestions: result.markdown_content,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityResponse {
    pub analysis: String,
    pub quality_score: Option<u32>,
    pub band: Option<QualityBand>,
    /// True when the assessment call failed and the sentinel was returned.
    pub degraded: bool,
    pub assessed_at: DateTime<Utc>,
}

impl From<QualityAssessment> for QualityResponse {
    fn from(assessment: QualityAssessment) -> Self {
        Self {
            band: assessment.band(),
            degraded: assessment.is_degraded(),
            quality_score: assessment.total_score,
            analysis: assessment.analysis_markdown,
            assessed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChecklistResponse {
    pub checklist: Vec<String>,
}

impl From<ChecklistResult> for ChecklistResponse {
    fn from(result: ChecklistResult) -> Self {
        Self {
            checklist: result.items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResourcesResponse {
    /// Markdown lines, one per link.
    pub resources: Vec<String>,
    pub links: Vec<ResourceLink>,
}

impl From<ResourceSet> for ResourcesResponse {
    fn from(set: ResourceSet) -> Self {
        Self {
            resources: set.to_markdown_lines(),
            links: set.links,
        }
    }
}

/// Body of `POST /api/v1/enrich`. The tag uses the same names as the request's
/// `task` field and each result has the shape of its dedicated endpoint.
#[derive(Debug, Serialize)]
#[serde(tag = "task", content = "result", rename_all = "snake_case")]
pub enum EnrichResponse {
    Suggest(SuggestionsResponse),
    AssessQuality(QualityResponse),
    Checklist(ChecklistResponse),
    FindResources(ResourcesResponse),
}

impl From<Enrichment> for EnrichResponse {
    fn from(enrichment: Enrichment) -> Self {
        match enrichment {
            Enrichment::Suggest(result) => EnrichResponse::Suggest(result.into()),
            Enrichment::AssessQuality(assessment) => {
                EnrichResponse::AssessQuality(assessment.into())
            }
            Enrichment::Checklist(result) => EnrichResponse::Checklist(result.into()),
            Enrichment::FindResources(set) => EnrichResponse::FindResources(set.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TaskPayload {
    pub sop_text: String,
    pub title: Option<String>,
    pub task: TaskKind,
}

#[derive(Debug, Deserialize)]
pub struct DistributionRequest {
    pub scores: Vec<Option<u32>>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/enrich
///
/// Generic entry point: runs whichever task the body names and returns
/// `{"task": ..., "result": ...}`.
pub async fn handle_enrich(
    State(state): State<AppState>,
    Json(payload): Json<TaskPayload>,
) -> Result<Json<EnrichResponse>, AppError> {
    let request = EnrichmentRequest::new(payload.sop_text, payload.title, payload.task);
    let enrichment = state
        .enricher
        .enrich(&request)
        .instrument(task_span(payload.task))
        .await?;

    Ok(Json(enrichment.into()))
}

/// POST /api/v1/enrich/suggestions
pub async fn handle_suggestions(
    State(state): State<AppState>,
    Json(payload): Json<SopPayload>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let request = payload.into_request(TaskKind::Suggest);
    let result = state
        .enricher
        .suggest(&request)
        .instrument(task_span(TaskKind::Suggest))
        .await?;

    Ok(Json(result.into()))
}

/// POST /api/v1/enrich/quality
///
/// Always 200 once the text is valid: a failed assessment comes back with
/// `degraded: true` rather than an error status.
pub async fn handle_quality(
    State(state): State<AppState>,
    Json(payload): Json<SopPayload>,
) -> Result<Json<QualityResponse>, AppError> {
    let request = payload.into_request(TaskKind::AssessQuality);
    let assessment = state
        .enricher
        .assess_quality(&request)
        .instrument(task_span(TaskKind::AssessQuality))
        .await?;

    Ok(Json(assessment.into()))
}

/// POST /api/v1/enrich/checklist
pub async fn handle_checklist(
    State(state): State<AppState>,
    Json(payload): Json<SopPayload>,
) -> Result<Json<ChecklistResponse>, AppError> {
    let request = payload.into_request(TaskKind::Checklist);
    let result = state
        .enricher
        .extract_checklist(&request)
        .instrument(task_span(TaskKind::Checklist))
        .await?;

    Ok(Json(result.into()))
}

/// POST /api/v1/enrich/resources
pub async fn handle_resources(
    State(state): State<AppState>,
    Json(payload): Json<SopPayload>,
) -> Result<Json<ResourcesResponse>, AppError> {
    let request = payload.into_request(TaskKind::FindResources);
    let set = state
        .enricher
        .find_resources(&request)
        .instrument(task_span(TaskKind::FindResources))
        .await?;

    Ok(Json(set.into()))
}

/// POST /api/v1/enrich/quality/distribution
///
/// Buckets stored scores for the quality dashboard. No outbound calls.
pub async fn handle_quality_distribution(
    Json(request): Json<DistributionRequest>,
) -> Json<QualityDistribution> {
    Json(QualityDistribution::tally(request.scores))
}

fn task_span(task: TaskKind) -> tracing::Span {
    tracing::info_span!("enrich", request_id = %Uuid::new_v4(), task = ?task)
}

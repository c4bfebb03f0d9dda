// All prompt templates for the enrichment tasks, plus the builder that fills them.
// Prompts are pure functions of the request; the SOP text is embedded verbatim.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::enrichment::models::{EnrichmentRequest, TaskKind};
use crate::llm_client::prompts::{
    CHECKLIST_MAX_TOKENS, LONG_FORM_MAX_TOKENS, MARKDOWN_MANDATORY, TOTAL_SCORE_MARKER,
};

pub const SUGGEST_SYSTEM: &str = "You are an AI assistant that provides clear and direct \
    answers based on the input provided.";

/// Replace: {title}, {sop_text}
pub const SUGGEST_PROMPT_TEMPLATE: &str = "Given the following SOP content, generate the most \
appropriate Standard Operating Procedure that could form out of the given input, make it more \
detailed/descriptive. Don't mention the title: \n Title: {title} \n{sop_text}";

pub const QUALITY_SYSTEM: &str = "You are an AI that assesses the quality of SOPs out of 100. \
    Provide the score breakdown in Markdown format (mandatory).";

/// Replace: {sop_text}, {marker}
pub const QUALITY_PROMPT_TEMPLATE: &str = r#"Analyze the following SOP content based on Banking and Investment parameters on each of the following criteria:
- **Length of Content** [Real SOP content is ranging from 500 words onwards].
- **Punctuation Usage**
- **Relevance**
- **Language Understanding**
- **Lucidity & Clarity**
- **Context Maintenance**
- **Functional Correctness** [Check if the SOP correctly addresses all necessary procedures and steps]
- **Completeness** [Identify if there are any crucial steps or information missing in the SOP]

Provide a score and a brief explanation for each criterion (Mandatory explanation for all criteria). Judge very strictly.
Give the complete breakdown of the score. Try to give marks corresponding to a normal distribution.

SOP Content:
"{sop_text}"

The LAST line of your response MUST be the total score out of 100, written exactly like this:
{marker} <integer>"#;

pub const CHECKLIST_SYSTEM: &str = "You are an AI assistant that creates concise checklist \
    items based on the input SOP content.";

/// Replace: {sop_text}
pub const CHECKLIST_PROMPT_TEMPLATE: &str =
    "Based on the following SOP content, create a list of concise checklist items:\n{sop_text}";

/// A ready-to-send completion payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

/// Builds the completion prompt for a request.
/// `FindResources` has no completion step and yields `None`.
pub fn build_prompt(request: &EnrichmentRequest) -> Option<Prompt> {
    let prompt = match request.task {
        TaskKind::Suggest => Prompt {
            system: with_markdown(SUGGEST_SYSTEM),
            user: fill(
                SUGGEST_PROMPT_TEMPLATE,
                &[
                    ("title", request.title_or_empty()),
                    ("sop_text", request.sop_text.as_str()),
                ],
            ),
            max_tokens: LONG_FORM_MAX_TOKENS,
        },
        TaskKind::AssessQuality => Prompt {
            system: QUALITY_SYSTEM.to_string(),
            user: fill(
                QUALITY_PROMPT_TEMPLATE,
                &[
                    ("marker", TOTAL_SCORE_MARKER),
                    ("sop_text", request.sop_text.as_str()),
                ],
            ),
            max_tokens: LONG_FORM_MAX_TOKENS,
        },
        TaskKind::Checklist => Prompt {
            system: with_markdown(CHECKLIST_SYSTEM),
            user: fill(CHECKLIST_PROMPT_TEMPLATE, &[("sop_text", request.sop_text.as_str())]),
            max_tokens: CHECKLIST_MAX_TOKENS,
        },
        TaskKind::FindResources => return None,
    };
    Some(prompt)
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("placeholder pattern is a valid regex"))
}

/// Substitutes `{name}` placeholders in one pass over the template.
/// Substituted values are never rescanned; unknown names are kept as written.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}

fn with_markdown(system: &str) -> String {
    format!("{system} {MARKDOWN_MANDATORY}")
}

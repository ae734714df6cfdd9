//! Prompt templates for the two generation flows.

use crate::request::GenerationRequest;
use crate::types::GenerationKind;

const COLORING_PREFIX: &str = "Create a line art coloring page in black and white of: ";
const COLORING_SUFFIX: &str =
    ". Make it suitable for coloring with clear, well-defined lines. Style: line art, black and white";

const MANDALA_PREFIX: &str = "Create a symmetrical mandala coloring page in black and white";
const MANDALA_SUFFIX: &str = ". Intricate, balanced patterns with clear, well-defined lines. Style: line art, black and white";

/// Build the provider prompt for `kind` from the caller's parameters.
pub fn build_prompt(kind: GenerationKind, request: &GenerationRequest) -> String {
    match kind {
        GenerationKind::ColoringPlate => coloring_plate_prompt(request),
        GenerationKind::Mandala => mandala_prompt(request),
    }
}

/// The free-text prompt wins; otherwise the questionnaire answers describe
/// the subject. A request whose values are all blank still yields a
/// prompt; judging it is left to the provider.
pub fn coloring_plate_prompt(request: &GenerationRequest) -> String {
    let subject = match request.prompt() {
        Some(prompt) => prompt,
        None => render_answers(request),
    };
    format!("{COLORING_PREFIX}{subject}{COLORING_SUFFIX}")
}

/// Every non-blank parameter, the free-text prompt included, shapes the
/// mandala. With no usable answers a generic mandala is requested.
pub fn mandala_prompt(request: &GenerationRequest) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(prompt) = request.prompt() {
        parts.push(prompt);
    }
    let answers = render_answers(request);
    if !answers.is_empty() {
        parts.push(answers);
    }

    if parts.is_empty() {
        format!("{MANDALA_PREFIX}{MANDALA_SUFFIX}")
    } else {
        format!("{MANDALA_PREFIX}, inspired by {}{MANDALA_SUFFIX}", parts.join("; "))
    }
}

fn render_answers(request: &GenerationRequest) -> String {
    request
        .answers()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

//! Prompt construction for the plan and image-prompt generations.

use crate::types::{FormInput, GenerationRequest};

pub const PLAN_SYSTEM_PROMPT: &str = "You are a marketing expert and creative AI assistant.";

pub const IMAGE_SYSTEM_PROMPT: &str =
    "You are a creative director who writes prompts for image generation models.";

/// Sections the plan must contain, in order.
pub const PLAN_SECTIONS: [&str; 10] = [
    "Executive Summary",
    "Target Audience",
    "UVP",
    "Objectives",
    "Strategy",
    "Budget",
    "KPIs",
    "Timeline",
    "Risk Management",
    "Success Factors",
];

/// The marketing-plan request. The advice payload is embedded verbatim.
pub fn plan_request(input: &FormInput, advice: &serde_json::Value) -> GenerationRequest {
    let prompt = format!(
        "\
Create a marketing plan for the product \"{title}\".
Audience: {audience}.
Product description: {description}.
Selling advice: {advice}.

**Instructions:**
- Generate the output in **pure Markdown**, not HTML.
- Include sections: {sections}.
- Use Markdown headings, bullet points, tables, and separators (---).
- Emphasize key points with **bold** or *italic*.
",
        title = input.title,
        audience = input.audience,
        description = input.description,
        advice = advice,
        sections = PLAN_SECTIONS.join(", "),
    );

    GenerationRequest::builder()
        .prompt(prompt)
        .system_prompt(PLAN_SYSTEM_PROMPT)
        .maybe_image(input.image())
        .build()
}

/// The request for a descriptive ad style, later passed to the image
/// endpoint as `ad_style`.
pub fn image_prompt_request(input: &FormInput, advice: &serde_json::Value) -> GenerationRequest {
    let prompt = format!(
        "\
Write one detailed prompt for an image generation model that will create
advertising images for the product \"{title}\".
Audience: {audience}.
Product description: {description}.
Selling advice: {advice}.

**Instructions:**
- Describe the visual style, composition, lighting, color palette and mood.
- Keep the product as the clear focal point and suit the audience above.
- Do not include any text, logos or watermarks in the image.
- Reply with the prompt only, as a single paragraph of plain text.
",
        title = input.title,
        audience = input.audience,
        description = input.description,
        advice = advice,
    );

    GenerationRequest::builder()
        .prompt(prompt)
        .system_prompt(IMAGE_SYSTEM_PROMPT)
        .maybe_image(input.image())
        .build()
}

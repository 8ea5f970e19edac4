//! Prompt construction for OKR generation.

use super::GenerationRequest;

const INSTRUCTIONS: &str = r#"You are an expert in OKR (Objectives and Key Results) planning.
Draft 3 to 5 objectives for the business described below. Each objective needs
2 to 4 measurable key results.

Respond with a JSON array only: no prose, no explanations. Use exactly this shape:
[
  {
    "title": "Objective title",
    "description": "Why this objective matters",
    "owner": "Role or team accountable",
    "key_results": [
      {
        "title": "Key result title",
        "description": "How it is measured",
        "type": "metric",
        "start_value": 0,
        "target_value": 100,
        "current_value": 0,
        "unit": "%"
      }
    ]
  }
]

"type" is either "metric" (a number moving from start_value to target_value)
or "binary" (done when current_value reaches target_value, use 0 and 1).
All numeric fields are plain JSON numbers."#;

const UNSPECIFIED: &str = "not specified";

fn or_unspecified(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        UNSPECIFIED
    } else {
        value
    }
}

/// Fixed instructions followed by the caller's business context.
pub fn build_prompt(request: &GenerationRequest) -> String {
    let mut prompt = String::with_capacity(INSTRUCTIONS.len() + request.context.len() + 256);
    prompt.push_str(INSTRUCTIONS);
    prompt.push_str("\n\nBusiness context:\n");
    prompt.push_str(request.context.trim());
    prompt.push_str("\n\n");
    prompt.push_str(&format!(
        "Company size: {}\nIndustry: {}\nTime period: {}\n",
        or_unspecified(&request.company_size),
        or_unspecified(&request.industry),
        or_unspecified(&request.time_period),
    ));
    prompt
}

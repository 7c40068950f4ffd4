use fact_pipeline::PhaseOneInput;
use serde::Deserialize;

/// Body of `POST /api/analyse`.
///
/// `content` is accepted as an alias for `text`; `text` wins when both are set.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyseRequest {
    pub text: String,
    pub content: String,
    pub url: String,
    pub language: String,
    pub category: String,
    pub with_headlines: bool,
}

impl From<AnalyseRequest> for PhaseOneInput {
    fn from(req: AnalyseRequest) -> Self {
        let text = if req.text.trim().is_empty() {
            req.content
        } else {
            req.text
        };
        PhaseOneInput {
            text,
            url: req.url,
            language: req.language,
            category: req.category,
            with_headlines: req.with_headlines,
        }
    }
}

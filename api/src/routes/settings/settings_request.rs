use ai_llm_service::LlmProvider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of `PUT /api/settings`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateSettingsRequest {
    pub provider: String,
    pub model: String,
}

/// One selectable provider on the settings screen.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderOption {
    pub key: &'static str,
    pub name: &'static str,
    pub default_model: &'static str,
}

impl ProviderOption {
    pub fn all() -> Vec<Self> {
        LlmProvider::ALL
            .into_iter()
            .map(|p| ProviderOption {
                key: p.as_key(),
                name: p.display_name(),
                default_model: p.default_model(),
            })
            .collect()
    }
}

/// Active provider/model; `updatedAt` is absent until settings were saved.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub providers: Vec<ProviderOption>,
}

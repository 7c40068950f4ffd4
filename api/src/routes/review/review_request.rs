use fact_pipeline::{AnalysisUpdate, FactUpdate, GapUpdate};
use serde::Deserialize;

/// Body of `PATCH /api/analyses/{id}`; absent fields stay unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateAnalysisRequest {
    pub status: Option<String>,
    pub category: Option<String>,
}

impl From<UpdateAnalysisRequest> for AnalysisUpdate {
    fn from(req: UpdateAnalysisRequest) -> Self {
        AnalysisUpdate {
            status: req.status,
            category: req.category,
        }
    }
}

/// Body of `POST /api/analyses/{id}/facts`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddFactRequest {
    pub text: String,
}

/// Body of `PATCH /api/facts/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateFactRequest {
    pub text: Option<String>,
    pub included: Option<bool>,
    pub confirmed: Option<bool>,
}

impl From<UpdateFactRequest> for FactUpdate {
    fn from(req: UpdateFactRequest) -> Self {
        FactUpdate {
            text: req.text,
            included: req.included,
            confirmed: req.confirmed,
        }
    }
}

/// Body of `PATCH /api/gaps/{id}`; `text` replaces the question.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateGapRequest {
    pub text: Option<String>,
    pub selected: Option<bool>,
    pub resolved: Option<bool>,
}

impl From<UpdateGapRequest> for GapUpdate {
    fn from(req: UpdateGapRequest) -> Self {
        GapUpdate {
            text: req.text,
            selected: req.selected,
            resolved: req.resolved,
        }
    }
}

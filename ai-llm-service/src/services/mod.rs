pub mod json_completion;
pub mod open_ai_service;

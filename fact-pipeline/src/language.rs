//! Output-language rules.
//!
//! Only English and Telugu are produced. Models are prompted in English and
//! Telugu output is obtained by a translation pass afterwards.

use serde::{Serialize, Serializer};

/// Telugu Unicode block.
const TELUGU_BLOCK: std::ops::RangeInclusive<char> = '\u{0C00}'..='\u{0C7F}';

/// Language of the text returned to the caller. Serializes as [`Self::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputLanguage {
    English,
    Telugu,
}

impl OutputLanguage {
    /// Resolves the requested language, falling back to script detection on
    /// `input` when the request is blank or unknown.
    pub fn normalize(requested: &str, input: &str) -> Self {
        match requested.trim().to_lowercase().as_str() {
            "te" | "telugu" | "తెలుగు" => OutputLanguage::Telugu,
            "en" | "english" => OutputLanguage::English,
            _ if contains_telugu(input) => OutputLanguage::Telugu,
            _ => OutputLanguage::English,
        }
    }

    /// Language the model is asked to write in.
    pub fn generation_language(self) -> Self {
        OutputLanguage::English
    }

    /// Whether a translation pass is needed after generation.
    pub fn needs_translation(self) -> bool {
        self != self.generation_language()
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputLanguage::English => "English",
            OutputLanguage::Telugu => "Telugu",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            OutputLanguage::English => "en",
            OutputLanguage::Telugu => "te",
        }
    }
}

impl Serialize for OutputLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

fn contains_telugu(text: &str) -> bool {
    text.chars().any(|c| TELUGU_BLOCK.contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_display_name() {
        let both = [OutputLanguage::English, OutputLanguage::Telugu];
        let json = serde_json::to_string(&both).unwrap();
        assert_eq!(json, r#"["English","Telugu"]"#);
    }

    #[test]
    fn explicit_requests_win() {
        assert_eq!(OutputLanguage::normalize(" TE ", "plain"), OutputLanguage::Telugu);
        assert_eq!(OutputLanguage::normalize("Telugu", ""), OutputLanguage::Telugu);
        assert_eq!(OutputLanguage::normalize("తెలుగు", ""), OutputLanguage::Telugu);
        assert_eq!(
            OutputLanguage::normalize("english", "హైదరాబాద్"),
            OutputLanguage::English
        );
        assert_eq!(OutputLanguage::normalize("EN", ""), OutputLanguage::English);
    }

    #[test]
    fn falls_back_to_script_detection() {
        assert_eq!(
            OutputLanguage::normalize("", "వర్షం Hyderabad"),
            OutputLanguage::Telugu
        );
        assert_eq!(OutputLanguage::normalize("fr", "Bonjour"), OutputLanguage::English);
    }

    #[test]
    fn telugu_is_generated_in_english() {
        assert_eq!(
            OutputLanguage::Telugu.generation_language(),
            OutputLanguage::English
        );
        assert!(OutputLanguage::Telugu.needs_translation());
        assert!(!OutputLanguage::English.needs_translation());
        assert_eq!(OutputLanguage::Telugu.name(), "Telugu");
        assert_eq!(OutputLanguage::English.code(), "en");
    }
}

use std::path::PathBuf;

use crate::ConfigView;

fn parse_codes(raw: &str) -> Vec<String> {
    let mut codes: Vec<String> = Vec::new();
    for code in raw.split(',').map(|s| s.trim().to_ascii_lowercase()) {
        if !code.is_empty() && !codes.contains(&code) {
            codes.push(code);
        }
    }
    codes
}

/// Supported languages and the configured default.
///
/// `default_language` is what the environment asks for; whether it is
/// actually offered is decided against the live language list at request
/// time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageConfig {
    pub default_language: String,
    pub available_languages: Vec<String>,
}

impl LanguageConfig {
    pub fn from_view(view: &ConfigView) -> Self {
        Self {
            default_language: view.get_or("DEFAULT_LANGUAGE", "en").trim().to_ascii_lowercase(),
            available_languages: parse_codes(&view.get_or("AVAILABLE_LANGUAGES", "en,fr")),
        }
    }
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            default_language: "en".to_string(),
            available_languages: vec!["en".to_string(), "fr".to_string()],
        }
    }
}

/// Where translation catalogues (`{dir}/{lang}.json`) live.
#[derive(Clone, Debug, Default)]
pub struct TranslationConfig {
    pub dir: Option<PathBuf>,
    pub default_language: String,
}

impl TranslationConfig {
    pub fn from_view(view: &ConfigView) -> Self {
        Self {
            dir: view
                .get("TRANSLATIONS_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            default_language: view.get_or("DEFAULT_LANGUAGE", "en").trim().to_ascii_lowercase(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_normalised_and_deduplicated() {
        let view = ConfigView::from_pairs([
            ("AVAILABLE_LANGUAGES", " EN, fr ,,en,de"),
            ("DEFAULT_LANGUAGE", "FR"),
        ]);
        let config = LanguageConfig::from_view(&view);
        assert_eq!(config.available_languages, vec!["en", "fr", "de"]);
        assert_eq!(config.default_language, "fr");
    }

    #[test]
    fn test_defaults() {
        let config = LanguageConfig::from_view(&ConfigView::default());
        assert_eq!(config, LanguageConfig::default());
    }

    #[test]
    fn test_translation_dir_is_optional() {
        let config = TranslationConfig::from_view(&ConfigView::default());
        assert!(config.dir.is_none());
        assert_eq!(config.default_language, "en");
    }
}

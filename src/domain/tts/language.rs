use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// ISO 639-1 language codes accepted by the multilingual voice model
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageId {
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "da")]
    Danish,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "el")]
    Greek,
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fi")]
    Finnish,
    #[serde(rename = "fr")]
    French,
    #[default]
    #[serde(rename = "he")]
    Hebrew,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ko")]
    Korean,
    #[serde(rename = "ms")]
    Malay,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "no")]
    Norwegian,
    #[serde(rename = "pl")]
    Polish,
    #[serde(rename = "pt")]
    Portuguese,
    #[serde(rename = "ru")]
    Russian,
    #[serde(rename = "sv")]
    Swedish,
    #[serde(rename = "sw")]
    Swahili,
    #[serde(rename = "tr")]
    Turkish,
    #[serde(rename = "zh")]
    Chinese,
}

impl LanguageId {
    pub const ALL: [LanguageId; 23] = [
        LanguageId::Arabic,
        LanguageId::Danish,
        LanguageId::German,
        LanguageId::Greek,
        LanguageId::English,
        LanguageId::Spanish,
        LanguageId::Finnish,
        LanguageId::French,
        LanguageId::Hebrew,
        LanguageId::Hindi,
        LanguageId::Italian,
        LanguageId::Japanese,
        LanguageId::Korean,
        LanguageId::Malay,
        LanguageId::Dutch,
        LanguageId::Norwegian,
        LanguageId::Polish,
        LanguageId::Portuguese,
        LanguageId::Russian,
        LanguageId::Swedish,
        LanguageId::Swahili,
        LanguageId::Turkish,
        LanguageId::Chinese,
    ];

    /// Get the ISO 639-1 code as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageId::Arabic => "ar",
            LanguageId::Danish => "da",
            LanguageId::German => "de",
            LanguageId::Greek => "el",
            LanguageId::English => "en",
            LanguageId::Spanish => "es",
            LanguageId::Finnish => "fi",
            LanguageId::French => "fr",
            LanguageId::Hebrew => "he",
            LanguageId::Hindi => "hi",
            LanguageId::Italian => "it",
            LanguageId::Japanese => "ja",
            LanguageId::Korean => "ko",
            LanguageId::Malay => "ms",
            LanguageId::Dutch => "nl",
            LanguageId::Norwegian => "no",
            LanguageId::Polish => "pl",
            LanguageId::Portuguese => "pt",
            LanguageId::Russian => "ru",
            LanguageId::Swedish => "sv",
            LanguageId::Swahili => "sw",
            LanguageId::Turkish => "tr",
            LanguageId::Chinese => "zh",
        }
    }

    /// Language tag prepended to the text before tokenization, e.g. `[he]`
    pub fn prompt_tag(&self) -> String {
        format!("[{}]", self.as_str())
    }
}

impl std::fmt::Display for LanguageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LanguageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_lowercase();
        LanguageId::ALL
            .iter()
            .copied()
            .find(|language| language.as_str() == code)
            .ok_or_else(|| {
                format!(
                    "Unsupported language_id '{}'. Supported: {}",
                    s,
                    LanguageId::ALL
                        .iter()
                        .map(|l| l.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

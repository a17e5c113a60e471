use serde::{ Deserialize, Serialize };

/// Terms that mark a question as market research. Matching is a plain
/// lower-cased substring test, so "statement" hits "stat".
pub const MARKET_KEYWORDS: &[&str] = &[
    "market",
    "analysis",
    "research",
    "trend",
    "competitor",
    "competition",
    "consumer",
    "customer",
    "demographic",
    "segment",
    "industry",
    "swot",
    "pestle",
    "pestel",
    "porter",
    "business",
    "strategy",
    "growth",
    "opportunity",
    "threat",
    "forecast",
    "projection",
    "sales",
    "revenue",
    "profit",
    "pricing",
    "product",
    "service",
    "brand",
    "marketing",
    "advertising",
    "promotion",
    "target",
    "audience",
    "buyer",
    "behavior",
    "demand",
    "supply",
    "economy",
    "economic",
    "stat",
    "statistics",
    "data",
    "survey",
    "focus group",
    "interview",
    "questionnaire",
    "sentiment",
    "share",
    "position",
    "landscape",
];

pub const OFF_TOPIC_REASON: &str =
    "Please ask a question related to market research or analysis. I'm specialized in helping with market insights, trends, competition analysis, and consumer behavior.";

pub const SUGGESTIONS: &[&str] = &[
    "What are the current trends in the smartphone market?",
    "Analyze the competition in the electric vehicle industry",
    "What is the target demographic for luxury fashion brands?",
    "How has consumer behavior changed in online grocery shopping?",
    "What marketing strategies work best for SaaS products?",
    "Conduct a SWOT analysis for a coffee shop startup",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub reason: Option<String>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self { is_valid: true, reason: None }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self { is_valid: false, reason: Some(reason.into()) }
    }
}

pub fn matched_keywords(text: &str) -> Vec<&'static str> {
    let lowered = text.to_lowercase();
    MARKET_KEYWORDS.iter()
        .copied()
        .filter(|keyword| lowered.contains(keyword))
        .collect()
}

pub fn validate(text: &str) -> ValidationResult {
    let lowered = text.to_lowercase();
    if MARKET_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
        ValidationResult::valid()
    } else {
        ValidationResult::invalid(OFF_TOPIC_REASON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_topic_is_rejected() {
        let result = validate("What's for dinner?");
        assert!(!result.is_valid);
        assert_eq!(result.reason.as_deref(), Some(OFF_TOPIC_REASON));
    }

    #[test]
    fn test_market_question_is_accepted() {
        let result = validate("Analyze the market trend for EVs");
        assert!(result.is_valid);
        assert!(result.reason.is_none());

        let hits = matched_keywords("Analyze the market trend for EVs");
        assert!(hits.contains(&"market"));
        assert!(hits.contains(&"trend"));
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert!(!validate("").is_valid);
        assert!(!validate("   ").is_valid);
    }

    #[test]
    fn test_case_insensitive() {
        assert!(validate("SWOT for a bakery").is_valid);
        assert!(validate("Who are the COMPETITORS?").is_valid);
    }

    #[test]
    fn test_substring_inside_unrelated_word_counts() {
        // "statement" contains "stat"; "datacenter" contains "data".
        assert!(validate("print my bank statement").is_valid);
        assert!(validate("datacenter").is_valid);
    }

    #[test]
    fn test_no_keyword_means_invalid_for_samples() {
        for text in ["hello there", "tell me a joke", "how tall is everest", "12345"] {
            assert!(!validate(text).is_valid, "expected '{}' to be rejected", text);
            assert!(matched_keywords(text).is_empty());
        }
    }

    #[test]
    fn test_every_keyword_validates_alone() {
        for keyword in MARKET_KEYWORDS {
            assert!(validate(keyword).is_valid, "keyword '{}' should validate", keyword);
        }
    }

    #[test]
    fn test_suggestions_are_on_topic() {
        for suggestion in SUGGESTIONS {
            assert!(validate(suggestion).is_valid, "suggestion '{}' rejected", suggestion);
        }
    }
}

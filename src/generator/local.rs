use async_trait::async_trait;
use log::debug;
use std::time::Duration;
use super::{ GenerationError, ResponseGenerator };
use crate::credential::Credential;

const TREND_TEMPLATE: &str = "# Market Trend Analysis\n\nBased on recent data, the following trends are emerging:\n\n1. Increased consumer preference for sustainable products\n2. Growing adoption of subscription-based models\n3. Rise in mobile-first shopping experiences\n\nThese trends indicate a shift towards more conscious consumption patterns and convenience-oriented services.";

const COMPETITION_TEMPLATE: &str = "# Competitive Landscape\n\nThe market currently shows the following competitive dynamics:\n\n- Market Leaders: Companies A, B, and C control 65% of market share\n- Emerging Players: Several startups focusing on niche segments\n- Competitive Factors: Price, quality, and customer service remain key differentiators\n\nA direct competitor analysis would require more specific industry information.";

const CONSUMER_TEMPLATE: &str = "# Consumer Behavior Insights\n\nRecent consumer research indicates:\n\n- Purchase decisions are increasingly influenced by social media\n- Consumers expect seamless omnichannel experiences\n- 68% of customers research products online before making purchases\n- Brand loyalty is declining, with 43% of consumers willing to switch brands for better experiences";

const SWOT_TEMPLATE: &str = "# SWOT Analysis Framework\n\n## Strengths\n- Unique selling proposition\n- Strong brand recognition\n- Efficient supply chain\n\n## Weaknesses\n- Limited market reach\n- Higher production costs\n- Talent acquisition challenges\n\n## Opportunities\n- Emerging market segments\n- Technological innovations\n- Strategic partnerships\n\n## Threats\n- Intense competition\n- Changing regulations\n- Economic uncertainty";

const GENERAL_TEMPLATE: &str = "Based on my market analysis, there are several key insights to consider:\n\n1. The market is showing a compound annual growth rate (CAGR) of approximately 7.2%\n\n2. Consumer preferences are shifting toward more sustainable and ethically sourced products\n\n3. Digital transformation continues to disrupt traditional business models in this sector\n\nTo gain competitive advantage, companies should focus on innovation, customer experience enhancement, and operational efficiency. Would you like me to elaborate on any specific aspect of this market analysis?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisCategory {
    Trend,
    Competition,
    Consumer,
    Swot,
    General,
}

impl AnalysisCategory {
    /// Checked top to bottom; first hit wins.
    const PRIORITY: [(AnalysisCategory, &'static [&'static str]); 4] = [
        (AnalysisCategory::Trend, &["trend"]),
        (AnalysisCategory::Competition, &["competition", "competitor"]),
        (AnalysisCategory::Consumer, &["consumer", "customer"]),
        (AnalysisCategory::Swot, &["swot"]),
    ];

    pub fn classify(query: &str) -> Self {
        let lowered = query.to_lowercase();
        Self::PRIORITY.iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(category, _)| *category)
            .unwrap_or(AnalysisCategory::General)
    }

    pub fn template(self) -> &'static str {
        match self {
            AnalysisCategory::Trend => TREND_TEMPLATE,
            AnalysisCategory::Competition => COMPETITION_TEMPLATE,
            AnalysisCategory::Consumer => CONSUMER_TEMPLATE,
            AnalysisCategory::Swot => SWOT_TEMPLATE,
            AnalysisCategory::General => GENERAL_TEMPLATE,
        }
    }
}

/// Offline generator: canned markdown chosen by keyword, after a fixed delay.
pub struct LocalGenerator {
    delay: Duration,
}

impl LocalGenerator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl ResponseGenerator for LocalGenerator {
    async fn generate(&self, query: &str, _credential: &Credential) -> Result<String, GenerationError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let category = AnalysisCategory::classify(query);
        debug!("Local generator picked {:?} template", category);
        Ok(category.template().to_string())
    }

    fn requires_credential(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_classify_priority_order() {
        assert_eq!(AnalysisCategory::classify("smartphone market trends"), AnalysisCategory::Trend);
        // trend outranks competition, competition outranks consumer
        assert_eq!(
            AnalysisCategory::classify("competitor trend for consumer goods"),
            AnalysisCategory::Trend
        );
        assert_eq!(
            AnalysisCategory::classify("Competition for customer attention"),
            AnalysisCategory::Competition
        );
        assert_eq!(AnalysisCategory::classify("customer SWOT"), AnalysisCategory::Consumer);
        assert_eq!(AnalysisCategory::classify("SWOT for a coffee shop"), AnalysisCategory::Swot);
        assert_eq!(AnalysisCategory::classify("pricing strategy"), AnalysisCategory::General);
    }

    #[test]
    fn test_swot_template_has_all_quadrants() {
        let text = AnalysisCategory::Swot.template();
        for heading in ["## Strengths", "## Weaknesses", "## Opportunities", "## Threats"] {
            assert!(text.contains(heading), "missing {}", heading);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_waits_for_delay() {
        let generator = LocalGenerator::new(Duration::from_millis(1500));
        let started = Instant::now();
        let text = generator.generate("market trend", &Credential::unset()).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1500));
        assert!(text.starts_with("# Market Trend Analysis"));
    }

    #[tokio::test]
    async fn test_generate_ignores_credential() {
        let generator = LocalGenerator::new(Duration::ZERO);
        let text = generator.generate("anything", &Credential::unset()).await.unwrap();
        assert!(text.starts_with("Based on my market analysis"));
        assert!(!generator.requires_credential());
    }
}

//! Risk tier and confidence classification.
//!
//! Every display and filter path classifies through these functions so a
//! record shows the same tier everywhere.

use std::fmt;
use std::str::FromStr;

use crate::types::FinalPrediction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    /// Case-insensitive keyword match on free-text summary. High wins over Medium.
    pub fn classify(summary: &str) -> Self {
        let summary = summary.to_lowercase();
        if summary.contains("high") || summary.contains("severe") {
            RiskTier::High
        } else if summary.contains("medium") || summary.contains("moderate") {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfidenceBucket {
    Good,
    Fair,
    Poor,
}

impl ConfidenceBucket {
    pub fn classify(confidence: f64) -> Self {
        if confidence >= 0.8 {
            ConfidenceBucket::Good
        } else if confidence >= 0.6 {
            ConfidenceBucket::Fair
        } else {
            ConfidenceBucket::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConfidenceBucket::Good => "good",
            ConfidenceBucket::Fair => "fair",
            ConfidenceBucket::Poor => "poor",
        }
    }
}

impl fmt::Display for ConfidenceBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Confidence as a whole percentage.
pub fn confidence_percent(confidence: f64) -> i64 {
    (confidence * 100.0).round() as i64
}

pub fn rainfall_text(prediction: FinalPrediction) -> &'static str {
    match prediction {
        FinalPrediction::Yes => "Rainfall Expected",
        FinalPrediction::No => "Rainfall Unexpected",
    }
}

/// History filter on risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RiskFilter {
    #[default]
    All,
    Tier(RiskTier),
}

impl RiskFilter {
    pub fn matches(self, summary: &str) -> bool {
        match self {
            RiskFilter::All => true,
            RiskFilter::Tier(tier) => RiskTier::classify(summary) == tier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown risk level '{0}' (expected all, high, medium or low)")]
pub struct UnknownRiskLevel(pub String);

impl FromStr for RiskFilter {
    type Err = UnknownRiskLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(RiskFilter::All),
            "high" => Ok(RiskFilter::Tier(RiskTier::High)),
            "medium" => Ok(RiskFilter::Tier(RiskTier::Medium)),
            "low" => Ok(RiskFilter::Tier(RiskTier::Low)),
            _ => Err(UnknownRiskLevel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_keywords() {
        assert_eq!(RiskTier::classify("HIGH humidity, heavy rain"), RiskTier::High);
        assert_eq!(RiskTier::classify("Severe storm warning"), RiskTier::High);
        assert_eq!(RiskTier::classify("Moderate winds"), RiskTier::Medium);
        assert_eq!(RiskTier::classify("medium chance"), RiskTier::Medium);
        assert_eq!(RiskTier::classify("Clear skies"), RiskTier::Low);
        assert_eq!(RiskTier::classify(""), RiskTier::Low);
    }

    #[test]
    fn test_high_checked_before_medium() {
        assert_eq!(
            RiskTier::classify("Moderate rain with high winds"),
            RiskTier::High
        );
    }

    #[test]
    fn test_substring_match() {
        // Plain substring, no word boundaries
        assert_eq!(RiskTier::classify("Highlands are dry"), RiskTier::High);
    }

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(ConfidenceBucket::classify(0.95), ConfidenceBucket::Good);
        assert_eq!(ConfidenceBucket::classify(0.8), ConfidenceBucket::Good);
        assert_eq!(ConfidenceBucket::classify(0.79), ConfidenceBucket::Fair);
        assert_eq!(ConfidenceBucket::classify(0.6), ConfidenceBucket::Fair);
        assert_eq!(ConfidenceBucket::classify(0.59), ConfidenceBucket::Poor);
        assert_eq!(ConfidenceBucket::classify(0.0), ConfidenceBucket::Poor);
        assert_eq!(ConfidenceBucket::Good.to_string(), "good");
    }

    #[test]
    fn test_confidence_percent() {
        assert_eq!(confidence_percent(0.876), 88);
        assert_eq!(confidence_percent(0.0), 0);
        assert_eq!(confidence_percent(1.0), 100);
    }

    #[test]
    fn test_rainfall_text() {
        assert_eq!(rainfall_text(FinalPrediction::Yes), "Rainfall Expected");
        assert_eq!(rainfall_text(FinalPrediction::No), "Rainfall Unexpected");
    }

    #[test]
    fn test_parse_filter() {
        assert_eq!("all".parse::<RiskFilter>(), Ok(RiskFilter::All));
        assert_eq!(
            "High".parse::<RiskFilter>(),
            Ok(RiskFilter::Tier(RiskTier::High))
        );
        assert_eq!(
            "low".parse::<RiskFilter>(),
            Ok(RiskFilter::Tier(RiskTier::Low))
        );
        assert!("extreme".parse::<RiskFilter>().is_err());
    }

    #[test]
    fn test_filter_matches() {
        let high = RiskFilter::Tier(RiskTier::High);
        assert!(high.matches("Severe flooding"));
        assert!(!high.matches("Moderate rain"));
        assert!(RiskFilter::All.matches("anything"));
    }
}

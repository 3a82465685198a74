//! Physical-range checks on a feature vector, including user edits.

use std::collections::BTreeMap;

use crate::features::{Feature, FeatureVector};

const NOT_A_NUMBER: &str = "Must be a number";

/// Inclusive bounds for a range-governed field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
    pub unit: &'static str,
}

impl ValidRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn message(&self) -> String {
        format!(
            "Must be between {}{} and {}{}",
            self.min, self.unit, self.max, self.unit
        )
    }
}

impl Feature {
    /// Range for the fields checked at input time. Other fields are not range-checked.
    pub fn valid_range(self) -> Option<ValidRange> {
        let (min, max) = match self {
            Feature::Temperature => (-89.2, 56.7),
            Feature::Humidity => (0.0, 100.0),
            Feature::Pressure => (870.0, 1084.0),
            Feature::WindSpeed => (0.0, 408.0),
            Feature::CloudCover => (0.0, 100.0),
            _ => return None,
        };
        Some(ValidRange {
            min,
            max,
            unit: self.unit(),
        })
    }

    /// The user-editable fields, which are exactly the range-governed ones.
    pub fn editable() -> impl Iterator<Item = Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| f.valid_range().is_some())
    }
}

/// Field → message for every invalid field. Empty means submittable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: BTreeMap<Feature, String>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, feature: Feature) -> Option<&str> {
        self.errors.get(&feature).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    /// Errors keyed by wire name, for surfaces that don't know `Feature`.
    pub fn into_named(self) -> BTreeMap<String, String> {
        self.errors
            .into_iter()
            .map(|(f, m)| (f.wire_name().to_string(), m))
            .collect()
    }

    fn apply(&mut self, feature: Feature, outcome: Option<String>) {
        match outcome {
            Some(message) => {
                self.errors.insert(feature, message);
            }
            None => {
                self.errors.remove(&feature);
            }
        }
    }
}

pub struct FeatureValidator;

impl FeatureValidator {
    /// Check one field. `None` when the field passes or is not range-governed.
    pub fn validate_field(vector: &FeatureVector, feature: Feature) -> Option<String> {
        let range = feature.valid_range()?;
        match vector.number(feature) {
            None => Some(NOT_A_NUMBER.to_string()),
            Some(v) if !range.contains(v) => Some(range.message()),
            Some(_) => None,
        }
    }

    pub fn validate(vector: &FeatureVector) -> ValidationResult {
        let mut result = ValidationResult::default();
        for feature in Feature::editable() {
            result.apply(feature, Self::validate_field(vector, feature));
        }
        result
    }
}

/// A vector under edit together with its live validation result.
#[derive(Debug, Clone)]
pub struct FeatureEditor {
    vector: FeatureVector,
    errors: ValidationResult,
}

impl FeatureEditor {
    pub fn new(vector: FeatureVector) -> Self {
        let errors = FeatureValidator::validate(&vector);
        Self { vector, errors }
    }

    /// Apply raw input to one field and re-check only that field. Fields
    /// outside the range table are not editable and stay unchanged.
    pub fn edit(&mut self, feature: Feature, raw: impl Into<String>) {
        if feature.valid_range().is_none() {
            tracing::warn!("Ignoring edit to non-editable field {}", feature);
            return;
        }
        self.vector.edit(feature, raw);
        let outcome = FeatureValidator::validate_field(&self.vector, feature);
        self.errors.apply(feature, outcome);
    }

    pub fn errors(&self) -> &ValidationResult {
        &self.errors
    }

    pub fn vector(&self) -> &FeatureVector {
        &self.vector
    }

    pub fn is_submittable(&self) -> bool {
        self.errors.is_valid()
    }

    /// The vector, only when nothing is invalid.
    pub fn submittable(&self) -> Option<&FeatureVector> {
        self.is_submittable().then_some(&self.vector)
    }

    pub fn into_submittable(self) -> Result<FeatureVector, ValidationResult> {
        if self.errors.is_valid() {
            Ok(self.vector)
        } else {
            Err(self.errors)
        }
    }
}

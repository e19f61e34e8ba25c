use serde::{Deserialize, Serialize};

/// Case attributes supplied by the caller for a single forecast.
///
/// Field aliases accept the Spanish payload keys used by the first web client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseInput {
    #[serde(alias = "tipo_caso")]
    pub category: String,
    #[serde(default, alias = "descripcion")]
    pub description: String,
    #[serde(default, alias = "monto_disputa")]
    pub disputed_amount: f64,
    #[serde(default = "default_complexity", alias = "complejidad")]
    pub complexity: String,
    #[serde(default, alias = "evidencias")]
    pub evidence_items: Vec<String>,
    #[serde(default, alias = "antecedentes")]
    pub background: String,
    #[serde(default, alias = "jurisdiccion")]
    pub jurisdiction: String,
}

fn default_complexity() -> String {
    ComplexityTier::Medium.label().to_string()
}

impl CaseInput {
    /// Reject structurally invalid amounts before any scoring happens.
    pub fn validate(&self) -> Result<(), InputError> {
        if !self.disputed_amount.is_finite() {
            return Err(InputError::NonFiniteAmount);
        }
        if self.disputed_amount < 0.0 {
            return Err(InputError::NegativeAmount(self.disputed_amount));
        }
        Ok(())
    }

    pub fn complexity_tier(&self) -> ComplexityTier {
        ComplexityTier::from_label(&self.complexity)
    }

    pub fn evidence_count(&self) -> usize {
        self.evidence_items.len()
    }
}

/// Complexity tiers recognised by the scoring rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplexityTier {
    Low,
    Medium,
    High,
}

impl ComplexityTier {
    /// Unrecognised labels behave as `Medium`.
    pub fn from_label(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "low" | "baja" => Self::Low,
            "high" | "alta" => Self::High,
            _ => Self::Medium,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ComplexityTier::Low => "low",
            ComplexityTier::Medium => "medium",
            ComplexityTier::High => "high",
        }
    }

    /// Probability delta in basis points.
    pub fn adjustment_basis_points(&self) -> i32 {
        match self {
            ComplexityTier::Low => 1_000,
            ComplexityTier::Medium => 0,
            ComplexityTier::High => -1_500,
        }
    }
}

/// Three-tier outcome classification derived from the final probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeLabel {
    #[serde(rename = "Favorable")]
    Favorable,
    #[serde(rename = "Partially Favorable")]
    PartiallyFavorable,
    #[serde(rename = "Unfavorable")]
    Unfavorable,
}

impl OutcomeLabel {
    /// Boundary values route to the lower bracket: 0.70 is partial, 0.40 unfavorable.
    pub fn classify(probability: f64) -> Self {
        if probability > 0.70 {
            Self::Favorable
        } else if probability > 0.40 {
            Self::PartiallyFavorable
        } else {
            Self::Unfavorable
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OutcomeLabel::Favorable => "Favorable",
            OutcomeLabel::PartiallyFavorable => "Partially Favorable",
            OutcomeLabel::Unfavorable => "Unfavorable",
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "Favorable" => Some(Self::Favorable),
            "Partially Favorable" => Some(Self::PartiallyFavorable),
            "Unfavorable" => Some(Self::Unfavorable),
            _ => None,
        }
    }
}

/// Case attribute an adjustment term was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentFactor {
    Evidence,
    Complexity,
    DisputedAmount,
}

/// Discrete contribution to the base probability, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentTerm {
    pub factor: AdjustmentFactor,
    pub delta: f64,
    pub notes: String,
}

/// Forecast produced by the scoring engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub success_probability: f64,
    pub outcome_label: OutcomeLabel,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub estimated_months: u32,
    pub confidence: f64,
    #[serde(default)]
    pub adjustments: Vec<AdjustmentTerm>,
}

/// Input rejected before scoring.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    #[error("disputed amount must not be negative (got {0})")]
    NegativeAmount(f64),
    #[error("disputed amount must be a finite number")]
    NonFiniteAmount,
    #[error("history limit must be a positive integer")]
    InvalidLimit,
    #[error("malformed case: {0}")]
    MalformedCase(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_route_boundaries_to_lower_bracket() {
        assert_eq!(OutcomeLabel::classify(0.70), OutcomeLabel::PartiallyFavorable);
        assert_eq!(OutcomeLabel::classify(0.40), OutcomeLabel::Unfavorable);
        assert_eq!(OutcomeLabel::classify(0.71), OutcomeLabel::Favorable);
        assert_eq!(OutcomeLabel::classify(0.39), OutcomeLabel::Unfavorable);
        assert_eq!(OutcomeLabel::classify(0.41), OutcomeLabel::PartiallyFavorable);
    }

    #[test]
    fn complexity_accepts_spanish_and_english_labels() {
        assert_eq!(ComplexityTier::from_label("alta"), ComplexityTier::High);
        assert_eq!(ComplexityTier::from_label(" HIGH "), ComplexityTier::High);
        assert_eq!(ComplexityTier::from_label("baja"), ComplexityTier::Low);
        assert_eq!(ComplexityTier::from_label("media"), ComplexityTier::Medium);
        assert_eq!(ComplexityTier::from_label("extrema"), ComplexityTier::Medium);
    }

    #[test]
    fn validate_rejects_negative_and_non_finite_amounts() {
        let mut case = CaseInput {
            category: "civil".to_string(),
            description: String::new(),
            disputed_amount: -1.0,
            complexity: "media".to_string(),
            evidence_items: Vec::new(),
            background: String::new(),
            jurisdiction: String::new(),
        };
        assert_eq!(case.validate(), Err(InputError::NegativeAmount(-1.0)));

        case.disputed_amount = f64::NAN;
        assert_eq!(case.validate(), Err(InputError::NonFiniteAmount));

        case.disputed_amount = 0.0;
        assert!(case.validate().is_ok());
    }

    #[test]
    fn deserializes_spanish_payload_with_defaults() {
        let case: CaseInput = serde_json::from_str(
            r#"{"tipo_caso":"laboral","descripcion":"Despido","evidencias":["contrato"]}"#,
        )
        .expect("payload parses");

        assert_eq!(case.category, "laboral");
        assert_eq!(case.disputed_amount, 0.0);
        assert_eq!(case.complexity_tier(), ComplexityTier::Medium);
        assert_eq!(case.evidence_count(), 1);
    }

    #[test]
    fn outcome_label_serializes_as_display_label() {
        let value = serde_json::to_value(OutcomeLabel::PartiallyFavorable).expect("serializes");
        assert_eq!(value, serde_json::json!("Partially Favorable"));
        assert_eq!(
            OutcomeLabel::from_label("Unfavorable"),
            Some(OutcomeLabel::Unfavorable)
        );
    }
}

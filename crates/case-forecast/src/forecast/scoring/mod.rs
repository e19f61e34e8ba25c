mod policy;
mod rules;

use std::sync::Arc;

use tracing::{debug, warn};

use super::catalog::CategoryTable;
use super::domain::{CaseInput, OutcomeLabel, Prediction};

/// Stateless engine applying the adjustment rules to a case.
///
/// Rates are carried as integer basis points so bracket boundaries compare
/// exactly. Classification uses the unrounded clamped rate; the returned
/// [`Prediction`] carries probabilities rounded to two decimals.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    table: Arc<CategoryTable>,
}

impl ScoringEngine {
    pub fn new(table: Arc<CategoryTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Score a case. Amount validation happens upstream; this never fails.
    pub fn score(&self, case: &CaseInput) -> Prediction {
        let profile = match self.table.resolve(&case.category) {
            Some(profile) => profile,
            None => {
                warn!(category = %case.category, "unknown category, using civil base rates");
                self.table.lookup(&case.category)
            }
        };

        let findings = rules::apply_rules(case);
        let raw_basis_points = profile.favorable_basis_points() + findings.adjustment_basis_points;
        let clamped = policy::clamp_probability(raw_basis_points);
        let success_probability = basis_points_to_probability(clamped);
        let outcome_label = OutcomeLabel::classify(f64::from(clamped) / 10_000.0);
        let estimated_months = policy::estimate_months(profile, &findings);
        let confidence =
            basis_points_to_probability(policy::confidence_basis_points(case.evidence_count()));

        debug!(
            category = %profile.name,
            raw_basis_points,
            clamped,
            terms = ?findings.terms,
            "scored case"
        );

        Prediction {
            success_probability,
            outcome_label,
            risk_factors: findings.risk_factors,
            recommendations: policy::finalize_recommendations(findings.recommendations),
            estimated_months,
            confidence,
            adjustments: findings.terms,
        }
    }
}

/// Converts basis points to a probability rounded to two decimals.
pub(crate) fn basis_points_to_probability(basis_points: i32) -> f64 {
    (f64::from(basis_points) / 100.0).round() / 100.0
}

use super::super::domain::{AdjustmentFactor, AdjustmentTerm, CaseInput, ComplexityTier};
use super::basis_points_to_probability;

pub(crate) const EVIDENCE_STEP_BASIS_POINTS: i32 = 500;
pub(crate) const EVIDENCE_CAP_BASIS_POINTS: i32 = 2_000;
pub(crate) const MIN_EVIDENCE_ITEMS: usize = 2;
pub(crate) const HIGH_AMOUNT_THRESHOLD: f64 = 100_000.0;
pub(crate) const HIGH_AMOUNT_PENALTY_BASIS_POINTS: i32 = 500;

pub(crate) const RISK_INSUFFICIENT_EVIDENCE: &str = "Evidencias insuficientes";
pub(crate) const RISK_HIGH_COMPLEXITY: &str = "Caso de alta complejidad";
pub(crate) const RISK_HIGH_AMOUNT: &str = "Alto monto en disputa aumenta escrutinio";

pub(crate) const ADVICE_GATHER_EVIDENCE: &str = "Recopilar más evidencias documentales";
pub(crate) const ADVICE_SPECIALIZATION: &str = "Considerar especialización adicional";
pub(crate) const ADVICE_FINANCIAL_DOCUMENTATION: &str =
    "Preparar documentación financiera detallada";

/// Everything the adjustment rules derive from one case.
pub(crate) struct RuleFindings {
    pub adjustment_basis_points: i32,
    pub terms: Vec<AdjustmentTerm>,
    pub risk_factors: Vec<String>,
    pub recommendations: Vec<String>,
    pub high_complexity: bool,
    pub high_amount: bool,
}

pub(crate) fn apply_rules(case: &CaseInput) -> RuleFindings {
    let mut terms = Vec::with_capacity(3);
    let mut risk_factors = Vec::new();
    let mut recommendations = Vec::new();
    let mut adjustment_basis_points = 0;

    let evidence_count = case.evidence_count();
    let evidence_basis_points = i32::try_from(evidence_count)
        .unwrap_or(i32::MAX)
        .saturating_mul(EVIDENCE_STEP_BASIS_POINTS)
        .min(EVIDENCE_CAP_BASIS_POINTS);
    adjustment_basis_points += evidence_basis_points;
    terms.push(AdjustmentTerm {
        factor: AdjustmentFactor::Evidence,
        delta: basis_points_to_probability(evidence_basis_points),
        notes: format!("{evidence_count} evidence item(s) on file"),
    });

    if evidence_count < MIN_EVIDENCE_ITEMS {
        risk_factors.push(RISK_INSUFFICIENT_EVIDENCE.to_string());
        recommendations.push(ADVICE_GATHER_EVIDENCE.to_string());
    }

    let tier = case.complexity_tier();
    let complexity_basis_points = tier.adjustment_basis_points();
    adjustment_basis_points += complexity_basis_points;
    terms.push(AdjustmentTerm {
        factor: AdjustmentFactor::Complexity,
        delta: basis_points_to_probability(complexity_basis_points),
        notes: format!("{} complexity", tier.label()),
    });

    let high_complexity = tier == ComplexityTier::High;
    if high_complexity {
        risk_factors.push(RISK_HIGH_COMPLEXITY.to_string());
        recommendations.push(ADVICE_SPECIALIZATION.to_string());
    }

    let high_amount = case.disputed_amount > HIGH_AMOUNT_THRESHOLD;
    let amount_basis_points = if high_amount {
        risk_factors.push(RISK_HIGH_AMOUNT.to_string());
        recommendations.push(ADVICE_FINANCIAL_DOCUMENTATION.to_string());
        -HIGH_AMOUNT_PENALTY_BASIS_POINTS
    } else {
        0
    };
    adjustment_basis_points += amount_basis_points;
    terms.push(AdjustmentTerm {
        factor: AdjustmentFactor::DisputedAmount,
        delta: basis_points_to_probability(amount_basis_points),
        notes: if high_amount {
            format!(
                "amount {:.2} exceeds {:.0}",
                case.disputed_amount, HIGH_AMOUNT_THRESHOLD
            )
        } else {
            format!("amount {:.2} within threshold", case.disputed_amount)
        },
    });

    RuleFindings {
        adjustment_basis_points,
        terms,
        risk_factors,
        recommendations,
        high_complexity,
        high_amount,
    }
}

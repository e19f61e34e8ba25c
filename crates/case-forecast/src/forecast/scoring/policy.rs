use super::super::catalog::CategoryProfile;
use super::rules::{RuleFindings, EVIDENCE_STEP_BASIS_POINTS};

pub(crate) const PROBABILITY_FLOOR_BASIS_POINTS: i32 = 1_000;
pub(crate) const PROBABILITY_CEILING_BASIS_POINTS: i32 = 9_500;
pub(crate) const CONFIDENCE_BASE_BASIS_POINTS: i32 = 7_000;
pub(crate) const CONFIDENCE_CAP_BASIS_POINTS: i32 = 9_500;
pub(crate) const HIGH_COMPLEXITY_EXTRA_MONTHS: u32 = 2;
pub(crate) const HIGH_AMOUNT_EXTRA_MONTHS: u32 = 1;

pub(crate) const GENERIC_RECOMMENDATIONS: [&str; 3] = [
    "Revisar jurisprudencia similar",
    "Fortalecer argumentación legal",
    "Considerar mediación si es apropiado",
];

/// Applied once, after every term has been summed.
pub(crate) fn clamp_probability(raw_basis_points: i32) -> i32 {
    raw_basis_points.clamp(
        PROBABILITY_FLOOR_BASIS_POINTS,
        PROBABILITY_CEILING_BASIS_POINTS,
    )
}

pub(crate) fn estimate_months(profile: &CategoryProfile, findings: &RuleFindings) -> u32 {
    let mut months = profile.average_months;
    if findings.high_complexity {
        months += HIGH_COMPLEXITY_EXTRA_MONTHS;
    }
    if findings.high_amount {
        months += HIGH_AMOUNT_EXTRA_MONTHS;
    }
    months
}

pub(crate) fn confidence_basis_points(evidence_count: usize) -> i32 {
    i32::try_from(evidence_count)
        .unwrap_or(i32::MAX)
        .saturating_mul(EVIDENCE_STEP_BASIS_POINTS)
        .saturating_add(CONFIDENCE_BASE_BASIS_POINTS)
        .min(CONFIDENCE_CAP_BASIS_POINTS)
}

/// Targeted advice replaces the generic list entirely.
pub(crate) fn finalize_recommendations(targeted: Vec<String>) -> Vec<String> {
    if targeted.is_empty() {
        GENERIC_RECOMMENDATIONS
            .iter()
            .map(|advice| advice.to_string())
            .collect()
    } else {
        targeted
    }
}

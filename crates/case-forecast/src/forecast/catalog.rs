//! Static per-category reference data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category whose profile answers lookups for unknown categories.
pub const FALLBACK_CATEGORY: &str = "civil";

const PROBABILITY_SUM_TOLERANCE: f64 = 1e-9;

/// Base rates and resolution baseline for one legal category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryProfile {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    pub base_probabilities: BTreeMap<String, f64>,
    /// Key in `base_probabilities` treated as the favorable outcome when scoring.
    pub favorable_outcome: String,
    pub average_months: u32,
    pub success_factors: Vec<String>,
}

impl CategoryProfile {
    fn new(
        name: &str,
        aliases: &[&str],
        base_probabilities: &[(&str, f64)],
        favorable_outcome: &str,
        average_months: u32,
        success_factors: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
            base_probabilities: base_probabilities
                .iter()
                .map(|(label, probability)| (label.to_string(), *probability))
                .collect(),
            favorable_outcome: favorable_outcome.to_string(),
            average_months,
            success_factors: success_factors
                .iter()
                .map(|factor| factor.to_string())
                .collect(),
        }
    }

    /// Favorable base rate, already checked to exist by [`CategoryTable::from_profiles`].
    pub fn favorable_probability(&self) -> f64 {
        self.base_probabilities
            .get(&self.favorable_outcome)
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn favorable_basis_points(&self) -> i32 {
        (self.favorable_probability() * 10_000.0).round() as i32
    }

    fn matches(&self, key: &str) -> bool {
        self.name == key || self.aliases.iter().any(|alias| alias == key)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.average_months == 0 {
            return Err(CatalogError::ZeroResolutionTime {
                category: self.name.clone(),
            });
        }

        if let Some((label, probability)) = self
            .base_probabilities
            .iter()
            .find(|(_, probability)| !(0.0..=1.0).contains(*probability))
        {
            return Err(CatalogError::ProbabilityOutOfRange {
                category: self.name.clone(),
                label: label.clone(),
                probability: *probability,
            });
        }

        let sum: f64 = self.base_probabilities.values().sum();
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            return Err(CatalogError::ProbabilitiesDoNotSumToOne {
                category: self.name.clone(),
                sum,
            });
        }

        if !self.base_probabilities.contains_key(&self.favorable_outcome) {
            return Err(CatalogError::MissingFavorableOutcome {
                category: self.name.clone(),
                label: self.favorable_outcome.clone(),
            });
        }

        Ok(())
    }
}

/// Validated, read-only table of category profiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTable {
    profiles: Vec<CategoryProfile>,
    #[serde(skip)]
    fallback_index: usize,
}

impl CategoryTable {
    /// The five practice areas the service ships with.
    pub fn standard() -> Result<Self, CatalogError> {
        Self::from_profiles(vec![
            CategoryProfile::new(
                "civil",
                &[],
                &[("favorable", 0.65), ("parcial", 0.25), ("desfavorable", 0.10)],
                "favorable",
                8,
                &["evidencia_documental", "testigos", "jurisprudencia_favorable"],
            ),
            CategoryProfile::new(
                "penal",
                &[],
                &[("absolutoria", 0.30), ("condenatoria", 0.60), ("atenuante", 0.10)],
                "condenatoria",
                12,
                &["coartada", "evidencia_exculpatoria", "testigos_favorables"],
            ),
            CategoryProfile::new(
                "labor",
                &["laboral"],
                &[("favorable", 0.70), ("parcial", 0.20), ("desfavorable", 0.10)],
                "favorable",
                6,
                &["documentacion_laboral", "testigos", "historial_empresa"],
            ),
            CategoryProfile::new(
                "family",
                &["familia"],
                &[("favorable", 0.55), ("acuerdo", 0.35), ("desfavorable", 0.10)],
                "favorable",
                10,
                &["bienestar_menor", "estabilidad_economica", "entorno_familiar"],
            ),
            CategoryProfile::new(
                "commercial",
                &["comercial"],
                &[("favorable", 0.60), ("transaccion", 0.30), ("desfavorable", 0.10)],
                "favorable",
                14,
                &["contratos", "correspondencia", "historial_comercial"],
            ),
        ])
    }

    /// Validate every profile and require the fallback category to be present.
    pub fn from_profiles(profiles: Vec<CategoryProfile>) -> Result<Self, CatalogError> {
        for profile in &profiles {
            profile.validate()?;
        }

        let fallback_index = profiles
            .iter()
            .position(|profile| profile.name == FALLBACK_CATEGORY)
            .ok_or(CatalogError::MissingFallback)?;

        Ok(Self {
            profiles,
            fallback_index,
        })
    }

    /// Exact (case-insensitive, alias-aware) match without falling back.
    pub fn resolve(&self, category: &str) -> Option<&CategoryProfile> {
        let key = normalize(category);
        self.profiles.iter().find(|profile| profile.matches(&key))
    }

    /// Profile used for scoring; unknown categories get the civil profile.
    pub fn lookup(&self, category: &str) -> &CategoryProfile {
        self.resolve(category)
            .unwrap_or(&self.profiles[self.fallback_index])
    }

    /// Name stored with a record: the canonical name when known, else the normalized input.
    pub fn canonical_name(&self, category: &str) -> String {
        match self.resolve(category) {
            Some(profile) => profile.name.clone(),
            None => normalize(category),
        }
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.profiles
            .iter()
            .map(|profile| profile.name.as_str())
            .collect()
    }

    pub fn profiles(&self) -> &[CategoryProfile] {
        &self.profiles
    }
}

fn normalize(category: &str) -> String {
    category.trim().to_lowercase()
}

/// Category table rejected at load time.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("base probabilities for '{category}' sum to {sum}, expected 1.0")]
    ProbabilitiesDoNotSumToOne { category: String, sum: f64 },
    #[error("base probability '{label}' for '{category}' is outside [0, 1]: {probability}")]
    ProbabilityOutOfRange {
        category: String,
        label: String,
        probability: f64,
    },
    #[error("favorable outcome '{label}' missing from '{category}' base probabilities")]
    MissingFavorableOutcome { category: String, label: String },
    #[error("average resolution time for '{category}' must be positive")]
    ZeroResolutionTime { category: String },
    #[error("category table must contain the 'civil' fallback profile")]
    MissingFallback,
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::CategoryTable;
use super::repository::CategoryTotals;

/// Aggregate view of the forecasts recorded for one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStatistics {
    pub category: String,
    pub count: u64,
    pub average_success_probability: f64,
    pub average_estimated_months: f64,
}

impl CategoryStatistics {
    fn empty(category: &str) -> Self {
        Self {
            category: category.to_string(),
            count: 0,
            average_success_probability: 0.0,
            average_estimated_months: 0.0,
        }
    }

    fn from_totals(totals: &CategoryTotals) -> Self {
        if totals.count == 0 {
            return Self::empty(&totals.category);
        }

        let count = totals.count as f64;
        Self {
            category: totals.category.clone(),
            count: totals.count,
            average_success_probability: round_to(totals.probability_sum / count, 2),
            average_estimated_months: round_to(totals.months_sum as f64 / count, 1),
        }
    }
}

/// Per-category statistics plus the grand total, derived from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionStatistics {
    pub total_predictions: u64,
    pub categories: Vec<CategoryStatistics>,
}

impl PredictionStatistics {
    /// Every catalog category is reported, zeroed when nothing was recorded.
    /// Categories outside the catalog follow in alphabetical order. Stored
    /// aliases such as `laboral` are counted under their canonical name.
    pub fn aggregate(table: &CategoryTable, totals: Vec<CategoryTotals>) -> Self {
        let total_predictions = totals.iter().map(|entry| entry.count).sum();

        let mut folded: BTreeMap<String, CategoryTotals> = BTreeMap::new();
        for entry in totals {
            let name = table.canonical_name(&entry.category);
            let slot = folded.entry(name.clone()).or_insert_with(|| CategoryTotals {
                category: name,
                count: 0,
                probability_sum: 0.0,
                months_sum: 0,
            });
            slot.count += entry.count;
            slot.probability_sum += entry.probability_sum;
            slot.months_sum += entry.months_sum;
        }

        let mut categories: Vec<CategoryStatistics> = table
            .category_names()
            .into_iter()
            .map(|name| match folded.remove(name) {
                Some(entry) => CategoryStatistics::from_totals(&entry),
                None => CategoryStatistics::empty(name),
            })
            .collect();
        categories.extend(folded.values().map(CategoryStatistics::from_totals));

        Self {
            total_predictions,
            categories,
        }
    }

    pub fn total_predictions(&self) -> u64 {
        self.total_predictions
    }

    pub fn category(&self, name: &str) -> Option<&CategoryStatistics> {
        self.categories.iter().find(|entry| entry.category == name)
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

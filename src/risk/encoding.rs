//! One-hot encoding and frozen-schema alignment.
//!
//! Training fits a [`FeatureSchema`]: the exact ordered list of numeric and
//! dummy columns the model was trained on. Serving re-encodes a single
//! record the same way and reindexes it against that frozen list. Unseen
//! categories are dropped, absent ones zero-filled, so the output vector
//! always has exactly the schema's width — the invariant that guards
//! against train/serve schema drift.

use crate::risk::features::EngineeredFeatureRecord;
use crate::risk::supplier::SupplierRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Numeric and boolean feature columns, in training-frame order.
pub const NUMERIC_COLUMNS: [&str; 12] = [
    "water_usage_m3",
    "turnover_rate_percent",
    "workplace_accidents_last_year",
    "has_anti_corruption_policy",
    "publishes_esg_report",
    "total_emissions_kg_co2e",
    "is_iso14001_certified",
    "is_sa8000_certified",
    "geopolitical_risk",
    "industry_risk",
    "worker_count_avg",
    "emission_intensity",
];

/// Raw fields expanded into `<field>_<value>` indicator columns.
pub const CATEGORICAL_FIELDS: [&str; 5] = [
    "country",
    "industryVertical",
    "processing_type",
    "sector",
    "industry_description",
];

/// Named numeric columns for a single encoded record.
#[derive(Debug, Clone, Default)]
pub struct EncodedFeatures {
    columns: BTreeMap<String, f64>,
}

impl EncodedFeatures {
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns.get(column).copied()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }
}

/// Encodes one supplier into named columns: the fixed numeric features plus
/// a hot indicator per present categorical field.
///
/// The indicator for a training-time "dropped first" category is emitted
/// here and discarded during alignment; emitting it is harmless precisely
/// because alignment only keeps columns the schema declares.
pub fn encode_features(
    record: &SupplierRecord,
    features: &EngineeredFeatureRecord,
) -> EncodedFeatures {
    let mut columns = BTreeMap::new();

    columns.insert(
        "water_usage_m3".to_string(),
        record.water_usage_m3.unwrap_or(0.0),
    );
    columns.insert(
        "turnover_rate_percent".to_string(),
        record.turnover_rate_percent.unwrap_or(0.0),
    );
    columns.insert(
        "workplace_accidents_last_year".to_string(),
        record.workplace_accidents_last_year.unwrap_or(0.0),
    );
    columns.insert(
        "total_emissions_kg_co2e".to_string(),
        record.total_emissions_kg_co2e.unwrap_or(0.0),
    );
    columns.insert(
        "has_anti_corruption_policy".to_string(),
        bool_to_f64(features.has_anti_corruption_policy),
    );
    columns.insert(
        "publishes_esg_report".to_string(),
        bool_to_f64(features.publishes_esg_report),
    );
    columns.insert(
        "is_iso14001_certified".to_string(),
        bool_to_f64(features.is_iso14001_certified),
    );
    columns.insert(
        "is_sa8000_certified".to_string(),
        bool_to_f64(features.is_sa8000_certified),
    );
    columns.insert(
        "geopolitical_risk".to_string(),
        features.geopolitical_risk as f64,
    );
    columns.insert("industry_risk".to_string(), features.industry_risk as f64);
    columns.insert("worker_count_avg".to_string(), features.worker_count_avg);
    columns.insert(
        "emission_intensity".to_string(),
        features.emission_intensity,
    );

    for (field, value) in categorical_values(record, features) {
        if let Some(value) = value {
            columns.insert(dummy_column(field, value), 1.0);
        }
    }

    EncodedFeatures { columns }
}

/// The frozen, ordered training-time column list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Fits the schema over the training rows.
    ///
    /// Numeric columns come first in declared order; each categorical field
    /// then contributes one dummy column per distinct observed value, sorted,
    /// with the first value dropped (drop-first dummy convention).
    pub fn fit<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (&'a SupplierRecord, &'a EngineeredFeatureRecord)> + Clone,
    {
        let mut columns: Vec<String> = NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect();

        for field in CATEGORICAL_FIELDS {
            let mut observed = BTreeSet::new();
            for (record, features) in rows.clone() {
                let value = categorical_values(record, features)
                    .into_iter()
                    .find(|(name, _)| *name == field)
                    .and_then(|(_, value)| value.map(str::to_string));
                if let Some(value) = value {
                    observed.insert(value);
                }
            }

            // Drop the first sorted category to avoid the dummy-variable
            // trap; the remaining values become indicator columns.
            for value in observed.iter().skip(1) {
                columns.push(dummy_column(field, value));
            }
        }

        Self { columns }
    }

    /// Restores a schema from a persisted column list.
    pub fn from_columns(columns: Vec<String>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Produces the fixed-width vector the model consumes.
    ///
    /// Iterates the schema columns in order, filling from the encoded record
    /// or 0.0. Never fails: the output length always equals the schema
    /// length, unseen serve-time categories simply contribute nothing.
    pub fn align(&self, encoded: &EncodedFeatures) -> Vec<f64> {
        self.columns
            .iter()
            .map(|column| encoded.get(column).unwrap_or(0.0))
            .collect()
    }
}

fn categorical_values<'a>(
    record: &'a SupplierRecord,
    features: &'a EngineeredFeatureRecord,
) -> [(&'static str, Option<&'a str>); 5] {
    [
        ("country", record.country.as_deref()),
        ("industryVertical", record.industry_vertical.as_deref()),
        ("processing_type", record.processing_type.as_deref()),
        ("sector", record.sector.as_deref()),
        (
            "industry_description",
            Some(features.industry_description.as_str()),
        ),
    ]
}

fn dummy_column(field: &str, value: &str) -> String {
    format!("{field}_{value}")
}

fn bool_to_f64(flag: bool) -> f64 {
    if flag {
        1.0
    } else {
        0.0
    }
}

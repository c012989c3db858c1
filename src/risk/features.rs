//! Deterministic feature-engineering transform.
//!
//! This is the part of the system where training and serving must agree
//! byte for byte: the same raw record must always produce the same
//! engineered record, and missing optional fields substitute defaults
//! instead of failing.

use crate::risk::supplier::SupplierRecord;
use crate::risk::tables::RiskTables;

/// Worker count assigned to the unbounded `"5001+"` bucket.
pub const TOP_WORKER_BUCKET_AVG: f64 = 7500.0;

/// Placeholder used when neither `processing_type` nor `industryVertical`
/// carries a meaningful value.
pub const UNSPECIFIED_INDUSTRY: &str = "Unspecified";

/// Engineered features for one supplier.
///
/// Pure function of ([`SupplierRecord`], [`RiskTables`]); see
/// [`engineer_features`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredFeatureRecord {
    pub geopolitical_risk: i64,
    pub industry_description: String,
    pub industry_risk: i64,
    pub worker_count_avg: f64,
    pub emission_intensity: f64,
    pub has_anti_corruption_policy: bool,
    pub publishes_esg_report: bool,
    pub is_iso14001_certified: bool,
    pub is_sa8000_certified: bool,
}

/// Maps a raw supplier record into the engineered feature record.
///
/// Total over all well-typed inputs: unknown countries score the default
/// geopolitical risk, unparseable worker buckets collapse to zero, and a
/// zero worker count yields zero emission intensity rather than a division
/// error.
pub fn engineer_features(record: &SupplierRecord, tables: &RiskTables) -> EngineeredFeatureRecord {
    let geopolitical_risk = record
        .country
        .as_deref()
        .map(|country| tables.geopolitical_risk(country))
        .unwrap_or(RiskTables::DEFAULT_GEOPOLITICAL_RISK);

    let industry_description = choose_industry_description(record);
    let industry_risk = tables.industry_risk(&industry_description);

    let worker_count_avg = record
        .number_of_workers
        .as_deref()
        .map(parse_worker_bucket)
        .unwrap_or(0.0);

    let total_emissions = record.total_emissions_kg_co2e.unwrap_or(0.0);
    let emission_intensity = if worker_count_avg > 0.0 {
        total_emissions / worker_count_avg
    } else {
        0.0
    };

    EngineeredFeatureRecord {
        geopolitical_risk,
        industry_description,
        industry_risk,
        worker_count_avg,
        emission_intensity,
        has_anti_corruption_policy: record.has_anti_corruption_policy.unwrap_or(false),
        publishes_esg_report: record.publishes_esg_report.unwrap_or(false),
        is_iso14001_certified: record.is_iso14001_certified.unwrap_or(false),
        is_sa8000_certified: record.is_sa8000_certified.unwrap_or(false),
    }
}

/// Picks the description used for industry-risk matching and one-hot
/// encoding.
///
/// A `processing_type` that is missing, blank, or the literal
/// `"Unspecified"` sentinel is never preferred; the fallback is
/// `industryVertical`, then the sentinel itself. The same rule runs during
/// dataset generation and serving.
fn choose_industry_description(record: &SupplierRecord) -> String {
    record
        .processing_type
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != UNSPECIFIED_INDUSTRY)
        .or_else(|| record.industry_vertical.as_deref().map(str::trim))
        .filter(|value| !value.is_empty())
        .unwrap_or(UNSPECIFIED_INDUSTRY)
        .to_string()
}

/// Parses a worker-count bucket into its numeric average.
///
/// Recognizes exactly two shapes: the `"5001+"` top-bucket marker and a
/// `low-high` integer range. Anything else returns 0.0 by contract; this
/// function never errors.
pub fn parse_worker_bucket(raw: &str) -> f64 {
    if raw.contains("5001+") {
        return TOP_WORKER_BUCKET_AVG;
    }

    if let Some((low, high)) = raw.split_once('-') {
        if let (Ok(low), Ok(high)) = (low.trim().parse::<i64>(), high.trim().parse::<i64>()) {
            return (low + high) as f64 / 2.0;
        }
    }

    0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SupplierRecord {
        SupplierRecord {
            country: Some("Bangladesh".to_string()),
            industry_vertical: Some("Dyeing & Finishing".to_string()),
            processing_type: Some("Dyeing".to_string()),
            number_of_workers: Some("1001-5000".to_string()),
            total_emissions_kg_co2e: Some(303000.0),
            ..SupplierRecord::default()
        }
    }

    #[test]
    fn engineers_full_record() {
        let features = engineer_features(&record(), &RiskTables::standard());
        assert_eq!(features.geopolitical_risk, 4);
        assert_eq!(features.industry_description, "Dyeing");
        assert_eq!(features.industry_risk, 5);
        assert_eq!(features.worker_count_avg, 3000.5);
        assert!((features.emission_intensity - 303000.0 / 3000.5).abs() < 1e-12);
    }

    #[test]
    fn top_bucket_maps_to_constant() {
        assert_eq!(parse_worker_bucket("5001+"), 7500.0);
    }

    #[test]
    fn range_bucket_maps_to_unrounded_mean() {
        assert_eq!(parse_worker_bucket("501-1000"), 750.5);
        assert_eq!(parse_worker_bucket("51-200"), 125.5);
    }

    #[test]
    fn malformed_buckets_map_to_zero() {
        assert_eq!(parse_worker_bucket(""), 0.0);
        assert_eq!(parse_worker_bucket("0"), 0.0);
        assert_eq!(parse_worker_bucket("lots"), 0.0);
        assert_eq!(parse_worker_bucket("10-"), 0.0);
        assert_eq!(parse_worker_bucket("-10"), 0.0);
        assert_eq!(parse_worker_bucket("1-2-3"), 0.0);
    }

    #[test]
    fn missing_workers_zero_intensity() {
        let mut record = record();
        record.number_of_workers = None;
        let features = engineer_features(&record, &RiskTables::standard());
        assert_eq!(features.worker_count_avg, 0.0);
        assert_eq!(features.emission_intensity, 0.0);
    }

    #[test]
    fn unknown_country_defaults() {
        let mut record = record();
        record.country = Some("Germany".to_string());
        let features = engineer_features(&record, &RiskTables::standard());
        assert_eq!(features.geopolitical_risk, 3);

        record.country = None;
        let features = engineer_features(&record, &RiskTables::standard());
        assert_eq!(features.geopolitical_risk, 3);
    }

    #[test]
    fn unspecified_processing_type_is_never_preferred() {
        let mut record = record();
        record.processing_type = Some(UNSPECIFIED_INDUSTRY.to_string());
        let features = engineer_features(&record, &RiskTables::standard());
        assert_eq!(features.industry_description, "Dyeing & Finishing");

        record.industry_vertical = None;
        let features = engineer_features(&record, &RiskTables::standard());
        assert_eq!(features.industry_description, UNSPECIFIED_INDUSTRY);
        assert_eq!(features.industry_risk, 2);
    }

    #[test]
    fn flags_default_to_false() {
        let features = engineer_features(&SupplierRecord::default(), &RiskTables::standard());
        assert!(!features.has_anti_corruption_policy);
        assert!(!features.publishes_esg_report);
        assert!(!features.is_iso14001_certified);
        assert!(!features.is_sa8000_certified);
    }

    #[test]
    fn transform_is_deterministic() {
        let tables = RiskTables::standard();
        let first = engineer_features(&record(), &tables);
        let second = engineer_features(&record(), &tables);
        assert_eq!(first, second);
    }
}

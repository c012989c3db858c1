//! Ground-truth risk-tier labeler.
//!
//! Deterministic scoring rule used only to construct training labels for the
//! synthetic dataset. It is not part of the inference path; the served model
//! learns an approximation of it from the engineered features.

use crate::risk::features::EngineeredFeatureRecord;
use crate::risk::labels::RiskTier;
use crate::risk::supplier::SupplierRecord;

/// Additive ESG score over engineered and raw fields.
///
/// Environmental: geopolitical and industry risk, emissions over 80 t,
/// water usage over 100,000 m³, ISO 14001 credit. Social: turnover over
/// 20%, more than five accidents, SA8000 credit. Governance: missing
/// anti-corruption policy, missing ESG report.
pub fn risk_score(record: &SupplierRecord, features: &EngineeredFeatureRecord) -> i64 {
    let mut score = features.geopolitical_risk + features.industry_risk;

    if record.total_emissions_kg_co2e.unwrap_or(0.0) > 80_000.0 {
        score += 2;
    }
    if record.water_usage_m3.unwrap_or(0.0) > 100_000.0 {
        score += 1;
    }
    if features.is_iso14001_certified {
        score -= 2;
    }

    if record.turnover_rate_percent.unwrap_or(0.0) > 20.0 {
        score += 1;
    }
    if record.workplace_accidents_last_year.unwrap_or(0.0) > 5.0 {
        score += 2;
    }
    if features.is_sa8000_certified {
        score -= 3;
    }

    if !features.has_anti_corruption_policy {
        score += 2;
    }
    if !features.publishes_esg_report {
        score += 1;
    }

    score
}

/// Maps the additive score onto a tier: >= 9 High, >= 5 Medium, else Low.
pub fn assign_tier(record: &SupplierRecord, features: &EngineeredFeatureRecord) -> RiskTier {
    let score = risk_score(record, features);
    if score >= 9 {
        RiskTier::High
    } else if score >= 5 {
        RiskTier::Medium
    } else {
        RiskTier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::features::engineer_features;
    use crate::risk::tables::RiskTables;

    fn high_risk_record() -> SupplierRecord {
        SupplierRecord {
            country: Some("Pakistan".to_string()),
            processing_type: Some("Dyeing|Finishing".to_string()),
            number_of_workers: Some("1001-5000".to_string()),
            total_emissions_kg_co2e: Some(350_000.0),
            water_usage_m3: Some(200_000.0),
            turnover_rate_percent: Some(30.0),
            workplace_accidents_last_year: Some(10.0),
            has_anti_corruption_policy: Some(false),
            publishes_esg_report: Some(false),
            is_iso14001_certified: Some(false),
            is_sa8000_certified: Some(false),
            ..SupplierRecord::default()
        }
    }

    fn low_risk_record() -> SupplierRecord {
        SupplierRecord {
            country: Some("USA".to_string()),
            processing_type: Some("Farming".to_string()),
            total_emissions_kg_co2e: Some(30_000.0),
            water_usage_m3: Some(20_000.0),
            turnover_rate_percent: Some(5.0),
            workplace_accidents_last_year: Some(0.0),
            has_anti_corruption_policy: Some(true),
            publishes_esg_report: Some(true),
            is_iso14001_certified: Some(true),
            is_sa8000_certified: Some(true),
            ..SupplierRecord::default()
        }
    }

    #[test]
    fn high_risk_scenario_scores_high() {
        let record = high_risk_record();
        let features = engineer_features(&record, &RiskTables::standard());
        // Pakistan 5 + Dyeing 5 + emissions 2 + water 1 + turnover 1
        // + accidents 2 + no policy 2 + no report 1 = 19.
        assert_eq!(risk_score(&record, &features), 19);
        assert_eq!(assign_tier(&record, &features), RiskTier::High);
    }

    #[test]
    fn low_risk_scenario_scores_low() {
        let record = low_risk_record();
        let features = engineer_features(&record, &RiskTables::standard());
        // USA 1 + Farming default 2 - ISO 2 - SA8000 3 = -2.
        assert_eq!(risk_score(&record, &features), -2);
        assert_eq!(assign_tier(&record, &features), RiskTier::Low);
    }

    #[test]
    fn medium_band_starts_at_five() {
        let mut record = low_risk_record();
        record.is_iso14001_certified = Some(false);
        record.is_sa8000_certified = Some(false);
        record.publishes_esg_report = Some(false);
        record.has_anti_corruption_policy = Some(false);
        // USA 1 + 2 + no policy 2 + no report 1 = 6 -> Medium.
        let features = engineer_features(&record, &RiskTables::standard());
        assert_eq!(risk_score(&record, &features), 6);
        assert_eq!(assign_tier(&record, &features), RiskTier::Medium);
    }
}

use esg_risk_ai::risk::encoding::{encode_features, FeatureSchema};
use esg_risk_ai::risk::features::engineer_features;
use esg_risk_ai::risk::labeler::{assign_tier, risk_score};
use esg_risk_ai::risk::labels::{LabelCodec, RiskTier};
use esg_risk_ai::risk::supplier::SupplierRecord;
use esg_risk_ai::risk::tables::RiskTables;

fn high_risk_supplier() -> SupplierRecord {
    SupplierRecord {
        name: Some("Dhaka Dye Works".to_string()),
        country: Some("Pakistan".to_string()),
        industry_vertical: Some("Dyeing & Finishing".to_string()),
        processing_type: Some("Dyeing|Finishing".to_string()),
        sector: Some("Apparel".to_string()),
        number_of_workers: Some("1001-5000".to_string()),
        total_emissions_kg_co2e: Some(350_000.0),
        water_usage_m3: Some(200_000.0),
        turnover_rate_percent: Some(30.0),
        workplace_accidents_last_year: Some(10.0),
        has_anti_corruption_policy: Some(false),
        publishes_esg_report: Some(false),
        is_iso14001_certified: Some(false),
        is_sa8000_certified: Some(false),
    }
}

fn low_risk_supplier() -> SupplierRecord {
    SupplierRecord {
        name: Some("Green Threads USA".to_string()),
        country: Some("USA".to_string()),
        industry_vertical: Some("Raw Material Farming".to_string()),
        processing_type: Some("Farming".to_string()),
        sector: Some("Apparel".to_string()),
        number_of_workers: Some("51-200".to_string()),
        total_emissions_kg_co2e: Some(30_000.0),
        water_usage_m3: Some(20_000.0),
        turnover_rate_percent: Some(5.0),
        workplace_accidents_last_year: Some(0.0),
        has_anti_corruption_policy: Some(true),
        publishes_esg_report: Some(true),
        is_iso14001_certified: Some(true),
        is_sa8000_certified: Some(true),
    }
}

#[test]
fn missing_worker_bucket_zeroes_count_and_intensity() {
    let mut record = high_risk_supplier();
    record.number_of_workers = None;

    let features = engineer_features(&record, &RiskTables::standard());
    assert_eq!(features.worker_count_avg, 0.0);
    assert_eq!(features.emission_intensity, 0.0);
}

#[test]
fn top_bucket_is_exactly_7500() {
    let mut record = high_risk_supplier();
    record.number_of_workers = Some("5001+".to_string());

    let features = engineer_features(&record, &RiskTables::standard());
    assert_eq!(features.worker_count_avg, 7500.0);
}

#[test]
fn mid_bucket_mean_is_not_rounded() {
    let mut record = high_risk_supplier();
    record.number_of_workers = Some("501-1000".to_string());

    let features = engineer_features(&record, &RiskTables::standard());
    assert_eq!(features.worker_count_avg, 750.5);
}

#[test]
fn unknown_country_takes_default_geopolitical_risk() {
    let mut record = low_risk_supplier();
    record.country = Some("Germany".to_string());

    let features = engineer_features(&record, &RiskTables::standard());
    assert_eq!(features.geopolitical_risk, 3);
}

#[test]
fn alignment_round_trip_never_fails_for_well_typed_records() {
    let tables = RiskTables::standard();
    let codec = LabelCodec::fixed();

    let records = vec![
        high_risk_supplier(),
        low_risk_supplier(),
        SupplierRecord::default(),
    ];
    let features: Vec<_> = records
        .iter()
        .map(|record| engineer_features(record, &tables))
        .collect();
    let rows: Vec<_> = records.iter().zip(features.iter()).collect();
    let schema = FeatureSchema::fit(rows);

    for (record, features) in records.iter().zip(features.iter()) {
        let vector = schema.align(&encode_features(record, features));
        assert_eq!(vector.len(), schema.len());

        let tier = assign_tier(record, features);
        let decoded = codec.decode(codec.encode(tier)).expect("codec round-trips");
        assert_eq!(decoded, tier);
    }
}

#[test]
fn aligned_width_is_schema_width_even_for_sparse_records() {
    let tables = RiskTables::standard();
    let record = high_risk_supplier();
    let features = engineer_features(&record, &tables);
    let schema = FeatureSchema::fit(vec![(&record, &features)]);

    // A record sharing no categories with the schema at all.
    let stranger = SupplierRecord {
        country: Some("Germany".to_string()),
        industry_vertical: Some("Quarrying".to_string()),
        sector: Some("Minerals".to_string()),
        ..SupplierRecord::default()
    };
    let stranger_features = engineer_features(&stranger, &tables);
    let vector = schema.align(&encode_features(&stranger, &stranger_features));
    assert_eq!(vector.len(), schema.len());
}

#[test]
fn high_risk_scenario_labels_high() {
    let record = high_risk_supplier();
    let features = engineer_features(&record, &RiskTables::standard());
    assert!(risk_score(&record, &features) >= 9);
    assert_eq!(assign_tier(&record, &features), RiskTier::High);
}

#[test]
fn low_risk_scenario_labels_low() {
    let record = low_risk_supplier();
    let features = engineer_features(&record, &RiskTables::standard());
    assert!(risk_score(&record, &features) < 5);
    assert_eq!(assign_tier(&record, &features), RiskTier::Low);
}

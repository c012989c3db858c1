//! Synthetic training dataset, built in-process from embedded CSV text.
//!
//! Thirty curated suppliers with a deliberately balanced risk spread, their
//! activity-based emissions, and a facility-enrichment fixture (worker
//! buckets, sector, processing type). Certification flags are produced by a
//! pluggable, explicitly seeded synthesizer so the randomized step stays
//! isolated from the deterministic pipeline.

use crate::risk::features::{engineer_features, EngineeredFeatureRecord};
use crate::risk::labeler::assign_tier;
use crate::risk::labels::RiskTier;
use crate::risk::supplier::SupplierRecord;
use crate::risk::tables::RiskTables;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Seed for the standard certification synthesis run.
pub const CERTIFICATION_SEED: u64 = 42;

const SUPPLIERS_CSV: &str = "\
supplierId,name,country,industryVertical,water_usage_m3,turnover_rate_percent,workplace_accidents_last_year,has_anti_corruption_policy,publishes_esg_report
sup_001,Apex Garments,Bangladesh,Garment Manufacturing,50000,15,2,True,True
sup_002,Rainbow Dyers,India,Dyeing & Finishing,120000,22,5,False,False
sup_003,Tiruppur Spinning Mills,India,Spinning Mill,75000,10,1,True,False
sup_004,Organic Cotton Collective,USA,Raw Material Farming,30000,5,0,True,True
sup_005,Vietnam Weavers,Vietnam,Weaving & Knitting,60000,18,3,False,True
sup_006,Global Weaving Co.,Turkey,Weaving & Knitting,80000,12,2,True,True
sup_007,Eco-Friendly Packaging,India,Packaging,10000,8,0,True,True
sup_008,Risky Dyers Pakistan,Pakistan,Dyeing & Finishing,250000,35,12,False,False
sup_009,China Silk Manufacturing,China,Weaving & Knitting,110000,25,6,False,False
sup_010,USA Apparel Co,USA,Garment Manufacturing,20000,7,1,True,True
sup_011,Turkish Denim Mill,Turkey,Spinning Mill,90000,14,3,True,False
sup_012,Dhaka Finishing Plant,Bangladesh,Dyeing & Finishing,180000,28,8,False,False
sup_013,Saigon Logistics,Vietnam,Logistics,5000,10,1,True,False
sup_014,Mumbai Prints,India,Printing,45000,16,4,False,True
sup_015,Karachi Cotton Exporters,Pakistan,Raw Material Farming,60000,30,7,False,False
sup_016,4 Star Textiles,India,Garment Manufacturing,60000,18,3,True,False
sup_017,Aadhavan Textiles Printing,India,Printing,90000,15,4,False,True
sup_018,Santana Textiles,Brazil,Weaving & Knitting,85000,11,2,True,True
sup_019,Zouping Taizi Hongfu Home Textiles Factory,China,Weaving & Knitting,95000,28,6,False,False
sup_020,4G TEXTILES SARL,Morocco,Garment Manufacturing,40000,21,5,False,False
sup_021,Clean Earth Mills,USA,Spinning Mill,40000,6,0,True,True
sup_022,Vietnam Finishing Touch,Vietnam,Dyeing & Finishing,95000,20,4,False,False
sup_023,Brazil Cotton Hub,Brazil,Raw Material Farming,70000,15,2,True,False
sup_024,Morocco Leather Goods,Morocco,Manufacturing,30000,19,6,False,False
sup_025,Istanbul Garments,Turkey,Garment Manufacturing,45000,13,1,True,True
sup_026,United Tex,Bangladesh,Garment Manufacturing,150000,33,9,False,False
sup_027,Premium Packaging Solutions,USA,Packaging,5000,4,0,True,True
sup_028,Surat Weaving Mills,India,Weaving & Knitting,88000,17,3,True,False
sup_029,Nantong High-Tech Textiles,China,Spinning Mill,130000,26,7,False,False
sup_030,Lahore Tannery,Pakistan,Manufacturing,220000,38,15,False,False
";

const ACTIVITY_CSV: &str = "\
supplierId,dataType,value,unit
sup_001,Electricity,150000,kWh
sup_002,Natural Gas,40000,m³
sup_003,Diesel Fuel,10000,Liters
sup_004,Electricity,50000,kWh
sup_005,Electricity,90000,kWh
sup_006,Electricity,110000,kWh
sup_007,Electricity,25000,kWh
sup_008,Natural Gas,180000,m³
sup_009,Electricity,200000,kWh
sup_010,Electricity,60000,kWh
sup_011,Diesel Fuel,25000,Liters
sup_012,Natural Gas,150000,m³
sup_013,Diesel Fuel,30000,Liters
sup_014,Electricity,130000,kWh
sup_015,Diesel Fuel,15000,Liters
sup_016,Electricity,160000,kWh
sup_017,Electricity,140000,kWh
sup_018,Electricity,190000,kWh
sup_019,Natural Gas,60000,m³
sup_020,Diesel Fuel,18000,Liters
sup_021,Electricity,75000,kWh
sup_022,Natural Gas,70000,m³
sup_023,Diesel Fuel,20000,Liters
sup_024,Diesel Fuel,15000,Liters
sup_025,Electricity,85000,kWh
sup_026,Natural Gas,120000,m³
sup_027,Electricity,10000,kWh
sup_028,Electricity,125000,kWh
sup_029,Electricity,220000,kWh
sup_030,Natural Gas,160000,m³
";

const EMISSION_FACTORS_CSV: &str = "\
source,unit,factor
Grid,kg CO2e/kWh,0.82
Natural Gas,kg CO2e/m³,2.02
Diesel Fuel,kg CO2e/Liter,2.68
";

/// Facility enrichment fixture standing in for the original external
/// real-world dataset. Joined on (name, country); suppliers without a row
/// simply keep those fields empty.
const FACILITIES_CSV: &str = "\
name,country,number_of_workers,sector,processing_type
Apex Garments,Bangladesh,1001-5000,Apparel,Cut & Sew
Rainbow Dyers,India,201-500,Apparel,Dyeing|Finishing
Tiruppur Spinning Mills,India,501-1000,Apparel,Spinning
Organic Cotton Collective,USA,51-200,Apparel,Farming
Vietnam Weavers,Vietnam,501-1000,Apparel,Weaving
Global Weaving Co.,Turkey,201-500,Apparel,Weaving|Knitting
Eco-Friendly Packaging,India,51-200,Apparel,Packaging
Risky Dyers Pakistan,Pakistan,1001-5000,Apparel,Dyeing|Finishing
China Silk Manufacturing,China,5001+,Apparel,Weaving
USA Apparel Co,USA,201-500,Apparel,Cut & Sew
Turkish Denim Mill,Turkey,501-1000,Apparel,Spinning
Dhaka Finishing Plant,Bangladesh,1001-5000,Apparel,Finishing
Saigon Logistics,Vietnam,51-200,Apparel,Logistics
Mumbai Prints,India,201-500,Apparel,Printing
Karachi Cotton Exporters,Pakistan,201-500,Apparel,Farming
4 Star Textiles,India,1001-5000,Apparel,Cut & Sew
Aadhavan Textiles Printing,India,501-1000,Apparel,Printing
Santana Textiles,Brazil,1001-5000,Home Textiles,Weaving
Zouping Taizi Hongfu Home Textiles Factory,China,5001+,Home Textiles,Weaving|Knitting
4G TEXTILES SARL,Morocco,51-200,Apparel,Cut & Sew
Clean Earth Mills,USA,201-500,Apparel,Spinning
Vietnam Finishing Touch,Vietnam,501-1000,Apparel,Finishing
Brazil Cotton Hub,Brazil,201-500,Apparel,Farming
Istanbul Garments,Turkey,501-1000,Apparel,Cut & Sew
United Tex,Bangladesh,1001-5000,Apparel,Cut & Sew
Premium Packaging Solutions,USA,51-200,Apparel,Packaging
Surat Weaving Mills,India,1001-5000,Apparel,Weaving
Nantong High-Tech Textiles,China,5001+,Apparel,Spinning
";

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("embedded CSV fixture failed to parse: {0}")]
    Csv(#[from] csv::Error),
}

/// One training row: the raw record, its engineered features and the
/// ground-truth tier.
#[derive(Debug, Clone)]
pub struct LabeledSupplier {
    pub supplier_id: String,
    pub record: SupplierRecord,
    pub features: EngineeredFeatureRecord,
    pub tier: RiskTier,
}

/// Supplies certification flags for dataset rows.
///
/// The curated dataset carries no certification data, so training-set
/// construction synthesizes the two flags. Production input never goes
/// through this trait; serve-time records carry the flags as regular
/// attributes.
pub trait CertificationSynthesizer {
    fn certifications(&mut self) -> (bool, bool);
}

/// Seeded coin-flip synthesis, reproducible across runs.
#[derive(Debug)]
pub struct SeededCertifications {
    rng: StdRng,
}

impl SeededCertifications {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl CertificationSynthesizer for SeededCertifications {
    fn certifications(&mut self) -> (bool, bool) {
        (self.rng.gen_bool(0.5), self.rng.gen_bool(0.5))
    }
}

#[derive(Debug, Deserialize)]
struct SupplierRow {
    #[serde(rename = "supplierId")]
    supplier_id: String,
    name: String,
    country: String,
    #[serde(rename = "industryVertical")]
    industry_vertical: String,
    water_usage_m3: f64,
    turnover_rate_percent: f64,
    workplace_accidents_last_year: f64,
    #[serde(deserialize_with = "python_bool")]
    has_anti_corruption_policy: bool,
    #[serde(deserialize_with = "python_bool")]
    publishes_esg_report: bool,
}

#[derive(Debug, Deserialize)]
struct ActivityRow {
    #[serde(rename = "supplierId")]
    supplier_id: String,
    #[serde(rename = "dataType")]
    data_type: String,
    value: f64,
}

#[derive(Debug, Deserialize)]
struct FactorRow {
    source: String,
    factor: f64,
}

#[derive(Debug, Deserialize)]
struct FacilityRow {
    name: String,
    country: String,
    number_of_workers: String,
    sector: String,
    processing_type: String,
}

/// The capitalised True/False the fixtures carry.
fn python_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "'{other}' is not a True/False flag"
        ))),
    }
}

fn parse_rows<T: for<'de> Deserialize<'de>>(text: &str) -> Result<Vec<T>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut rows = Vec::new();
    for row in reader.deserialize::<T>() {
        rows.push(row?);
    }
    Ok(rows)
}

/// Total emissions per supplier: activity value times the factor for its
/// source, where any data type containing "Electric" draws from the grid
/// factor. Suppliers without activity rows total zero.
fn emissions_by_supplier(
    activities: &[ActivityRow],
    factors: &[FactorRow],
) -> HashMap<String, f64> {
    let factor_for = |source: &str| -> f64 {
        factors
            .iter()
            .find(|row| row.source == source)
            .map(|row| row.factor)
            .unwrap_or(0.0)
    };

    let mut totals: HashMap<String, f64> = HashMap::new();
    for activity in activities {
        let source = if activity.data_type.contains("Electric") {
            "Grid"
        } else {
            activity.data_type.as_str()
        };
        *totals.entry(activity.supplier_id.clone()).or_insert(0.0) +=
            activity.value * factor_for(source);
    }
    totals
}

/// Builds the labeled training set with the given synthesizer.
pub fn build_training_set(
    tables: &RiskTables,
    synthesizer: &mut dyn CertificationSynthesizer,
) -> Result<Vec<LabeledSupplier>, DatasetError> {
    let suppliers: Vec<SupplierRow> = parse_rows(SUPPLIERS_CSV)?;
    let activities: Vec<ActivityRow> = parse_rows(ACTIVITY_CSV)?;
    let factors: Vec<FactorRow> = parse_rows(EMISSION_FACTORS_CSV)?;
    let facilities: Vec<FacilityRow> = parse_rows(FACILITIES_CSV)?;

    let emissions = emissions_by_supplier(&activities, &factors);

    let mut labeled = Vec::with_capacity(suppliers.len());
    for row in suppliers {
        let facility = facilities
            .iter()
            .find(|facility| facility.name == row.name && facility.country == row.country);

        let (iso14001, sa8000) = synthesizer.certifications();

        let record = SupplierRecord {
            name: Some(row.name),
            country: Some(row.country),
            industry_vertical: Some(row.industry_vertical),
            processing_type: facility.map(|f| f.processing_type.clone()),
            sector: facility.map(|f| f.sector.clone()),
            number_of_workers: facility.map(|f| f.number_of_workers.clone()),
            total_emissions_kg_co2e: Some(emissions.get(&row.supplier_id).copied().unwrap_or(0.0)),
            water_usage_m3: Some(row.water_usage_m3),
            turnover_rate_percent: Some(row.turnover_rate_percent),
            workplace_accidents_last_year: Some(row.workplace_accidents_last_year),
            has_anti_corruption_policy: Some(row.has_anti_corruption_policy),
            publishes_esg_report: Some(row.publishes_esg_report),
            is_iso14001_certified: Some(iso14001),
            is_sa8000_certified: Some(sa8000),
        };

        let features = engineer_features(&record, tables);
        let tier = assign_tier(&record, &features);

        labeled.push(LabeledSupplier {
            supplier_id: row.supplier_id,
            record,
            features,
            tier,
        });
    }

    Ok(labeled)
}

/// The standard training set: seeded synthesis, standard tables.
pub fn standard_training_set(tables: &RiskTables) -> Result<Vec<LabeledSupplier>, DatasetError> {
    let mut synthesizer = SeededCertifications::new(CERTIFICATION_SEED);
    build_training_set(tables, &mut synthesizer)
}

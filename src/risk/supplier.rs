//! Raw supplier input record.
//!
//! Every field is optional at the type level; the feature transform is
//! responsible for substituting defaults. Scalars arrive from JSON clients
//! and CSV fixtures in loose shapes (booleans as strings, numbers as text),
//! so the flag and numeric fields are normalized during deserialization.

use serde::{Deserialize, Deserializer, Serialize};

/// One supplier as submitted to the service or read from the dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SupplierRecord {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "blank_string_as_none")]
    pub country: Option<String>,
    #[serde(
        rename = "industryVertical",
        default,
        deserialize_with = "blank_string_as_none"
    )]
    pub industry_vertical: Option<String>,
    #[serde(default, deserialize_with = "blank_string_as_none")]
    pub processing_type: Option<String>,
    #[serde(default, deserialize_with = "blank_string_as_none")]
    pub sector: Option<String>,
    /// Worker-count bucket, e.g. `"501-1000"` or `"5001+"`.
    #[serde(default, deserialize_with = "lenient_string")]
    pub number_of_workers: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub total_emissions_kg_co2e: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub water_usage_m3: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub turnover_rate_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub workplace_accidents_last_year: Option<f64>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub has_anti_corruption_policy: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub publishes_esg_report: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_iso14001_certified: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_sa8000_certified: Option<bool>,
}

fn blank_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarInput {
    Bool(bool),
    Number(f64),
    Text(String),
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<ScalarInput>::deserialize(deserializer)?;
    Ok(opt.and_then(|value| match value {
        ScalarInput::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        ScalarInput::Number(number) => Some(format_number(number)),
        ScalarInput::Bool(flag) => Some(flag.to_string()),
    }))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<ScalarInput>::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(ScalarInput::Number(number)) => Ok(Some(number)),
        Some(ScalarInput::Bool(flag)) => Ok(Some(if flag { 1.0 } else { 0.0 })),
        Some(ScalarInput::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed.parse::<f64>().map(Some).map_err(|_| {
                serde::de::Error::custom(format!("'{trimmed}' is not a number"))
            })
        }
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<ScalarInput>::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(ScalarInput::Bool(flag)) => Ok(Some(flag)),
        Some(ScalarInput::Number(number)) => Ok(Some(number != 0.0)),
        Some(ScalarInput::Text(text)) => match text.trim().to_ascii_lowercase().as_str() {
            "" => Ok(None),
            "true" | "yes" | "1" => Ok(Some(true)),
            "false" | "no" | "0" => Ok(Some(false)),
            other => Err(serde::de::Error::custom(format!(
                "'{other}' is not a boolean"
            ))),
        },
    }
}

fn format_number(number: f64) -> String {
    if number.fract() == 0.0 && number.abs() < i64::MAX as f64 {
        format!("{}", number as i64)
    } else {
        format!("{number}")
    }
}

//! Risk tier labels and their integer encoding.
//!
//! The label universe is fixed at {Low, Medium, High} with indices 0, 1 and
//! 2, independent of which tiers any particular dataset split happens to
//! contain. The codec is persisted alongside the model so the serving
//! process reuses the training-time encoding verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three-tier classification output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LabelError {
    #[error("label index {0} is outside the fixed three-class universe")]
    UnknownIndex(usize),
}

/// Bidirectional mapping between tiers and their encoded indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCodec {
    classes: Vec<RiskTier>,
}

impl LabelCodec {
    /// Builds the codec over the fixed {Low, Medium, High} universe.
    pub fn fixed() -> Self {
        Self {
            classes: vec![RiskTier::Low, RiskTier::Medium, RiskTier::High],
        }
    }

    pub fn encode(&self, tier: RiskTier) -> usize {
        self.classes
            .iter()
            .position(|class| *class == tier)
            .unwrap_or_else(|| unreachable!("codec covers the full tier universe"))
    }

    pub fn decode(&self, index: usize) -> Result<RiskTier, LabelError> {
        self.classes
            .get(index)
            .copied()
            .ok_or(LabelError::UnknownIndex(index))
    }

    /// Classes in their declared (encoded) order.
    pub fn classes(&self) -> &[RiskTier] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for LabelCodec {
    fn default() -> Self {
        Self::fixed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_round_trips_every_tier() {
        let codec = LabelCodec::fixed();
        for tier in [RiskTier::Low, RiskTier::Medium, RiskTier::High] {
            let index = codec.encode(tier);
            assert_eq!(codec.decode(index).expect("index decodes"), tier);
        }
    }

    #[test]
    fn class_order_is_fixed() {
        let codec = LabelCodec::fixed();
        assert_eq!(
            codec.classes(),
            &[RiskTier::Low, RiskTier::Medium, RiskTier::High]
        );
        assert_eq!(codec.encode(RiskTier::Low), 0);
        assert_eq!(codec.encode(RiskTier::High), 2);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let codec = LabelCodec::fixed();
        assert_eq!(codec.decode(3), Err(LabelError::UnknownIndex(3)));
    }

    #[test]
    fn codec_survives_serialization() {
        let codec = LabelCodec::fixed();
        let json = serde_json::to_string(&codec).expect("codec serializes");
        let restored: LabelCodec = serde_json::from_str(&json).expect("codec deserializes");
        assert_eq!(restored, codec);
    }
}

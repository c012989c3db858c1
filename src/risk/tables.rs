//! Static risk-factor lookup tables.
//!
//! Pure data. The tables are constructed once at startup and injected into
//! the feature transform rather than referenced as ambient globals, so the
//! transform stays a pure function of its inputs.

/// Country and industry risk lookups used by the feature transform.
#[derive(Debug, Clone)]
pub struct RiskTables {
    geopolitical: Vec<(&'static str, i64)>,
    /// Keyword order matters: the first keyword whose lowercase form is a
    /// substring of the industry description wins.
    industry: Vec<(&'static str, i64)>,
}

impl RiskTables {
    /// Score assigned to countries absent from the geopolitical table.
    pub const DEFAULT_GEOPOLITICAL_RISK: i64 = 3;
    /// Score assigned when no industry keyword matches the description.
    pub const DEFAULT_INDUSTRY_RISK: i64 = 2;

    /// The standard textile supply-chain risk tables.
    pub fn standard() -> Self {
        Self {
            geopolitical: vec![
                ("India", 3),
                ("China", 4),
                ("Vietnam", 2),
                ("Bangladesh", 4),
                ("USA", 1),
                ("Turkey", 3),
                ("Pakistan", 5),
                ("Brazil", 3),
                ("Morocco", 3),
            ],
            industry: vec![
                ("Dyeing", 5),
                ("Printing", 4),
                ("Finishing", 5),
                ("Spinning", 4),
                ("Weaving", 3),
                ("Manufacturing", 3),
                ("Logistics", 1),
                ("Packaging", 1),
                ("Unspecified", 2),
            ],
        }
    }

    /// Exact, case-sensitive country lookup.
    pub fn geopolitical_risk(&self, country: &str) -> i64 {
        self.geopolitical
            .iter()
            .find(|(name, _)| *name == country)
            .map(|(_, score)| *score)
            .unwrap_or(Self::DEFAULT_GEOPOLITICAL_RISK)
    }

    /// Case-insensitive substring scan over the industry keywords, in
    /// declared order.
    pub fn industry_risk(&self, description: &str) -> i64 {
        let haystack = description.to_lowercase();
        self.industry
            .iter()
            .find(|(keyword, _)| haystack.contains(&keyword.to_lowercase()))
            .map(|(_, score)| *score)
            .unwrap_or(Self::DEFAULT_INDUSTRY_RISK)
    }
}

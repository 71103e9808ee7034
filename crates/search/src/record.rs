//! Recall records as returned by the hosted search index.
//!
//! Records are owned by the index; this crate only reads them. Deserialization
//! is lenient: a missing text field becomes an empty string and unreadable
//! ranking metadata becomes `None`, so one odd hit never fails a whole result
//! page.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Risk level assigned by the issuing authority.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLevel {
    /// Serious risk
    Serious,
    /// Medium risk
    Medium,
    /// Any other level, kept verbatim
    Other(String),
    /// No level given
    #[default]
    Unspecified,
}

impl RiskLevel {
    /// Whether this is the highest risk level.
    pub fn is_serious(&self) -> bool {
        matches!(self, Self::Serious)
    }

    /// Text as published by the index.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Serious => "Serious",
            Self::Medium => "Medium",
            Self::Other(level) => level,
            Self::Unspecified => "",
        }
    }
}

impl From<String> for RiskLevel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Serious" => Self::Serious,
            "Medium" => Self::Medium,
            "" => Self::Unspecified,
            _ => Self::Other(value),
        }
    }
}

impl From<RiskLevel> for String {
    fn from(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Other(level) => level,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranking metadata attached to a hit when ranking info is requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RankingInfo {
    /// Character edits between the query and the matched text
    #[serde(
        rename = "nbTypos",
        default,
        deserialize_with = "lenient_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub nb_typos: Option<u32>,

    /// Attribute the query matched first
    #[serde(
        rename = "firstMatchedAttribute",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub first_matched_attribute: Option<String>,

    /// Remaining ranking fields, kept opaque
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A product recall record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallRecord {
    #[serde(rename = "objectID", default)]
    pub object_id: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub risk_level: RiskLevel,
    /// Issuing authority, e.g. "RAPEX"
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_number: Option<String>,
    #[serde(
        rename = "_rankingInfo",
        default,
        deserialize_with = "lenient_ranking_info",
        skip_serializing_if = "Option::is_none"
    )]
    pub ranking_info: Option<RankingInfo>,
}

impl RecallRecord {
    /// Create a record with an id and product name.
    pub fn new(object_id: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            product_name: product_name.into(),
            ..Self::default()
        }
    }

    /// Set brand and model.
    #[must_use]
    pub fn with_brand_model(mut self, brand: impl Into<String>, model: impl Into<String>) -> Self {
        self.brand = brand.into();
        self.model = model.into();
        self
    }

    /// Set the risk level.
    #[must_use]
    pub fn with_risk_level(mut self, level: impl Into<String>) -> Self {
        self.risk_level = RiskLevel::from(level.into());
        self
    }

    /// Set the issuing authority.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the batch number.
    #[must_use]
    pub fn with_batch_number(mut self, batch: impl Into<String>) -> Self {
        self.batch_number = Some(batch.into());
        self
    }

    /// Attach ranking info with the given typo count.
    #[must_use]
    pub fn with_typos(mut self, nb_typos: u32) -> Self {
        self.ranking_info
            .get_or_insert_with(RankingInfo::default)
            .nb_typos = Some(nb_typos);
        self
    }

    /// Typo count from the ranking info, if the index provided a usable one.
    pub fn typo_count(&self) -> Option<u32> {
        self.ranking_info.as_ref().and_then(|info| info.nb_typos)
    }

    /// An exact match has ranking info with zero typos.
    pub fn is_exact_match(&self) -> bool {
        self.typo_count() == Some(0)
    }

    /// "Brand Model", skipping empty parts.
    pub fn brand_model(&self) -> String {
        [self.brand.as_str(), self.model.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_u64)
        .and_then(|n| u32::try_from(n).ok()))
}

fn lenient_ranking_info<'de, D>(deserializer: D) -> Result<Option<RankingInfo>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

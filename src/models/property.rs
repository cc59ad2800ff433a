// src/models/property.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Criticality of a title document. Critical documents gate a purchase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DocumentTier {
    Critical,
    Standard,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub name: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_verified: Option<String>,
    #[serde(rename = "type")]
    pub tier: DocumentTier,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub district: String,
    /// (latitude, longitude)
    pub coordinates: (f64, f64),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub inr: u64,
    pub usd: u64,
    pub price_per_sq_ft: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Specs {
    /// Plot area in square feet
    pub area: u32,
    pub dimensions: String,
    pub facing: String,
    pub zoning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Partner {
    pub name: String,
    pub role: String,
    pub verified: bool,
    pub rating: f32,
}

/// One point of the per-square-foot price series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub year: String,
    pub price: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VerificationLevel {
    Basic,
    Gold,
    Platinum,
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VerificationLevel::Basic => "Basic",
            VerificationLevel::Gold => "Gold",
            VerificationLevel::Platinum => "Platinum",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ListingStatus {
    Available,
    #[serde(rename = "Under Offer")]
    UnderOffer,
    Sold,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: String,
    pub title: String,
    pub location: Location,
    pub price: Price,
    pub specs: Specs,
    pub images: Vec<String>,
    pub description: String,
    pub documents: Vec<DocumentStatus>,
    pub partner: Partner,
    pub price_history: Vec<PricePoint>,
    pub verification_level: VerificationLevel,
    pub status: ListingStatus,
}

impl PropertyRecord {
    pub fn verified_documents(&self) -> impl Iterator<Item = &DocumentStatus> {
        self.documents.iter().filter(|d| d.verified)
    }

    pub fn pending_documents(&self) -> impl Iterator<Item = &DocumentStatus> {
        self.documents.iter().filter(|d| !d.verified)
    }

    /// First document still awaiting verification, in listing order.
    pub fn first_unverified_document(&self) -> Option<&DocumentStatus> {
        self.pending_documents().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&ListingStatus::UnderOffer).unwrap();
        assert_eq!(json, "\"Under Offer\"");

        let tier: DocumentTier = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(tier, DocumentTier::Critical);
    }
}

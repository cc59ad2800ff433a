//! Property catalog - the fixed set of listings, the state picker and the
//! verification service packages. A real listing service would replace this;
//! anything that does must keep the `Catalog` accessors and the filter contract.

use crate::models::property::*;
use serde::Serialize;

/// States offered in the region picker, including ones without listings yet.
pub const STATES: [&str; 6] = [
    "Karnataka",
    "Telangana",
    "Tamil Nadu",
    "Maharashtra",
    "Kerala",
    "Gujarat",
];

#[derive(Debug, Clone, Serialize)]
pub struct StateSummary {
    pub name: String,
    pub listings: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ServicePackage {
    pub name: &'static str,
    pub price_usd: u32,
    pub features: Vec<&'static str>,
    pub recommended: bool,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    properties: Vec<PropertyRecord>,
}

impl Catalog {
    pub fn new(properties: Vec<PropertyRecord>) -> Self {
        Self { properties }
    }

    pub fn seeded() -> Self {
        Self::new(mock_properties())
    }

    pub fn all(&self) -> &[PropertyRecord] {
        &self.properties
    }

    pub fn get(&self, id: &str) -> Option<&PropertyRecord> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn states_with_counts(&self) -> Vec<StateSummary> {
        STATES
            .iter()
            .map(|state| StateSummary {
                name: state.to_string(),
                listings: self
                    .properties
                    .iter()
                    .filter(|p| p.location.state == *state)
                    .count(),
            })
            .collect()
    }

    pub fn service_packages(&self) -> Vec<ServicePackage> {
        vec![
            ServicePackage {
                name: "Basic Verification",
                price_usd: 99,
                features: vec![
                    "Digital Record Pull",
                    "Encumbrance Check (15 Years)",
                    "Govt. Value Estimation",
                ],
                recommended: false,
            },
            ServicePackage {
                name: "Legal Opinion",
                price_usd: 350,
                features: vec![
                    "30-Year Title Search",
                    "Lawyer Verified Report",
                    "Litigation Check",
                    "Physical Document verification",
                ],
                recommended: true,
            },
            ServicePackage {
                name: "Site Visit & Report",
                price_usd: 200,
                features: vec![
                    "Physical Boundary Check",
                    "Drone Footage",
                    "Encroachment Check",
                    "Neighborhood Report",
                ],
                recommended: false,
            },
        ]
    }
}

fn doc(name: &str, verified_on: Option<&str>, tier: DocumentTier) -> DocumentStatus {
    DocumentStatus {
        name: name.to_string(),
        verified: verified_on.is_some(),
        date_verified: verified_on.map(str::to_string),
        tier,
    }
}

fn history(points: &[(&str, u32)]) -> Vec<PricePoint> {
    points
        .iter()
        .map(|(year, price)| PricePoint {
            year: year.to_string(),
            price: *price,
        })
        .collect()
}

fn images(seeds: &[u32]) -> Vec<String> {
    seeds
        .iter()
        .map(|n| format!("https://picsum.photos/800/600?random={}", n))
        .collect()
}

pub fn mock_properties() -> Vec<PropertyRecord> {
    vec![
        PropertyRecord {
            id: "prop-101".to_string(),
            title: "Serene Lakefront Plot - Whitefield".to_string(),
            location: Location {
                city: "Bangalore".to_string(),
                state: "Karnataka".to_string(),
                district: "Whitefield".to_string(),
                coordinates: (12.9698, 77.7500),
            },
            price: Price { inr: 12_500_000, usd: 150_000, price_per_sq_ft: 5200 },
            specs: Specs {
                area: 2400,
                dimensions: "40x60".to_string(),
                facing: "North-East".to_string(),
                zoning: "Residential (Yellow Zone)".to_string(),
            },
            images: images(&[1, 2, 3]),
            description: "A premium verified plot located in the heart of Whitefield IT corridor. Perfect for building a luxury villa. Clear titles with 30-year link documents available.".to_string(),
            documents: vec![
                doc("Sale Deed (Mother Deed)", Some("2023-11-15"), DocumentTier::Critical),
                doc("Encumbrance Certificate (15 Years)", Some("2023-12-01"), DocumentTier::Critical),
                doc("Khata Certificate", Some("2023-11-20"), DocumentTier::Standard),
                doc("Property Tax Receipts", None, DocumentTier::Standard),
            ],
            partner: Partner {
                name: "Ramesh & Associates Legal".to_string(),
                role: "Verified Legal Partner".to_string(),
                verified: true,
                rating: 4.9,
            },
            price_history: history(&[("2019", 3800), ("2020", 4100), ("2021", 4400), ("2022", 4800), ("2023", 5200)]),
            verification_level: VerificationLevel::Platinum,
            status: ListingStatus::Available,
        },
        PropertyRecord {
            id: "prop-102".to_string(),
            title: "Gated Community Plot - Gachibowli".to_string(),
            location: Location {
                city: "Hyderabad".to_string(),
                state: "Telangana".to_string(),
                district: "Ranga Reddy".to_string(),
                coordinates: (17.4401, 78.3489),
            },
            price: Price { inr: 25_000_000, usd: 300_000, price_per_sq_ft: 8333 },
            specs: Specs {
                area: 3000,
                dimensions: "50x60".to_string(),
                facing: "West".to_string(),
                zoning: "Residential".to_string(),
            },
            images: images(&[4, 5, 6]),
            description: "Exclusive plot in a high-security gated community. Close to Financial District. Valid HMDA approval.".to_string(),
            documents: vec![
                doc("HMDA Approval", Some("2024-01-10"), DocumentTier::Critical),
                doc("Link Documents", Some("2024-01-12"), DocumentTier::Critical),
                doc("Encumbrance Certificate", Some("2024-01-15"), DocumentTier::Standard),
            ],
            partner: Partner {
                name: "SafeLand Consultants".to_string(),
                role: "Verified Agent".to_string(),
                verified: true,
                rating: 4.7,
            },
            price_history: history(&[("2019", 5000), ("2020", 5500), ("2021", 6200), ("2022", 7100), ("2023", 8333)]),
            verification_level: VerificationLevel::Gold,
            status: ListingStatus::UnderOffer,
        },
        PropertyRecord {
            id: "prop-103".to_string(),
            title: "Sea View Estate - ECR".to_string(),
            location: Location {
                city: "Chennai".to_string(),
                state: "Tamil Nadu".to_string(),
                district: "Kanchipuram".to_string(),
                coordinates: (12.8996, 80.2209),
            },
            price: Price { inr: 8_500_000, usd: 102_000, price_per_sq_ft: 3500 },
            specs: Specs {
                area: 2428, // ~5.5 cents
                dimensions: "Irregular".to_string(),
                facing: "East".to_string(),
                zoning: "Farm Land/Res".to_string(),
            },
            images: images(&[7, 8]),
            description: "Scenic plot near the beach on East Coast Road. Ideal for a holiday home or investment. Patta is available.".to_string(),
            documents: vec![
                doc("Patta/Chitta", Some("2023-09-01"), DocumentTier::Critical),
                doc("Title Deed", Some("2023-09-01"), DocumentTier::Critical),
                doc("NOC from Coastal Authority", None, DocumentTier::Critical),
            ],
            partner: Partner {
                name: "Chennai Legal Experts".to_string(),
                role: "Legal Partner".to_string(),
                verified: true,
                rating: 4.5,
            },
            price_history: history(&[("2019", 2100), ("2020", 2300), ("2021", 2700), ("2022", 3100), ("2023", 3500)]),
            verification_level: VerificationLevel::Basic,
            status: ListingStatus::Available,
        },
    ]
}

// src/filter.rs
use crate::models::property::PropertyRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("{field} must be a whole number, got '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

/// Conjunctive listing filter. An absent constraint does not filter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Inclusive upper bound on the INR price
    pub max_price: Option<u64>,
    /// Inclusive lower bound on the plot area, sq ft
    pub min_area: Option<u32>,
    pub state: Option<String>,
}

impl PropertyFilter {
    pub fn is_empty(&self) -> bool {
        self.max_price.is_none() && self.min_area.is_none() && self.state.is_none()
    }

    pub fn matches(&self, property: &PropertyRecord) -> bool {
        if let Some(ref state) = self.state {
            if property.location.state != *state {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if property.price.inr > max_price {
                return false;
            }
        }
        if let Some(min_area) = self.min_area {
            if property.specs.area < min_area {
                return false;
            }
        }
        true
    }

    /// Matching records in catalog order.
    pub fn apply<'a>(&self, properties: &'a [PropertyRecord]) -> Vec<&'a PropertyRecord> {
        properties.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Raw query string form. Blank values count as absent, the way the search
/// panel sends an empty input box.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub state: Option<String>,
    pub max_price: Option<String>,
    pub min_area: Option<String>,
}

impl TryFrom<FilterQuery> for PropertyFilter {
    type Error = FilterError;

    fn try_from(query: FilterQuery) -> Result<Self, Self::Error> {
        Ok(PropertyFilter {
            max_price: parse_bound("max_price", query.max_price)?,
            min_area: parse_bound("min_area", query.min_area)?,
            state: non_blank(query.state),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_bound<T: std::str::FromStr>(
    field: &'static str,
    value: Option<String>,
) -> Result<Option<T>, FilterError> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|_| FilterError::InvalidNumber { field, value: raw }),
    }
}

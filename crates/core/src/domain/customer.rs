use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CustomerId(pub String);

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RepresentativeId(pub String);

impl fmt::Display for RepresentativeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sales channel classification. Labels outside the recognized set collapse
/// to `Other` and carry no weighting boost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    ModernTrade,
    Horeca,
    GeneralTrade,
    Other,
}

impl Channel {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "modern_trade" | "modern trade" => Channel::ModernTrade,
            "horeca" => Channel::Horeca,
            "general_trade" | "general trade" => Channel::GeneralTrade,
            _ => Channel::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::ModernTrade => "modern_trade",
            Channel::Horeca => "horeca",
            Channel::GeneralTrade => "general_trade",
            Channel::Other => "other",
        }
    }
}

/// Dealer tier within a channel. Unrecognized labels collapse to `Other`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealerType {
    KeyDistributor,
    Wholesaler,
    Retailer,
    Other,
}

impl DealerType {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "key_distributor" | "key distributor" => DealerType::KeyDistributor,
            "wholesaler" => DealerType::Wholesaler,
            "retailer" => DealerType::Retailer,
            _ => DealerType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DealerType::KeyDistributor => "key_distributor",
            DealerType::Wholesaler => "wholesaler",
            DealerType::Retailer => "retailer",
            DealerType::Other => "other",
        }
    }
}

/// One roster row. The roster is loaded once per planning session and treated
/// as immutable by the grid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub code: String,
    pub channel: Channel,
    pub dealer_type: DealerType,
    pub representative: RepresentativeId,
}

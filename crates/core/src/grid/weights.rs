//! Customer weighting used by the distribution engine.
//!
//! A customer's weight is the product of a channel multiplier and a dealer
//! type multiplier. The multiplier tables are fixed business policy, not
//! configuration.

use rust_decimal::Decimal;

use crate::domain::customer::{Channel, Customer, DealerType};

pub fn channel_multiplier(channel: Channel) -> Decimal {
    match channel {
        Channel::ModernTrade => Decimal::new(25, 1),
        Channel::Horeca => Decimal::new(20, 1),
        Channel::GeneralTrade => Decimal::new(15, 1),
        Channel::Other => Decimal::ONE,
    }
}

pub fn dealer_type_multiplier(dealer_type: DealerType) -> Decimal {
    match dealer_type {
        DealerType::KeyDistributor => Decimal::from(3),
        DealerType::Wholesaler => Decimal::from(2),
        DealerType::Retailer => Decimal::ONE,
        DealerType::Other => Decimal::ONE,
    }
}

pub fn customer_weight(customer: &Customer) -> Decimal {
    channel_multiplier(customer.channel) * dealer_type_multiplier(customer.dealer_type)
}

//! Weighted distribution of a product target across the roster.

use std::collections::BTreeMap;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::customer::{Customer, CustomerId};

use super::weights::customer_weight;

/// Half-up rounding to a whole quantity. Quantities are never negative, so
/// midpoint-away-from-zero is half-up here.
pub(crate) fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Splits `target` across `customers` proportionally to their weights.
///
/// Each allocation rounds independently. Rounded shares are the published
/// quantities, so their sum may drift from `target` by a few units; no
/// largest-remainder correction is applied. An empty roster yields an empty
/// allocation.
pub fn distribute(target: Decimal, customers: &[Customer]) -> BTreeMap<CustomerId, Decimal> {
    let total_weight: Decimal = customers.iter().map(customer_weight).sum();
    if total_weight.is_zero() {
        return BTreeMap::new();
    }

    customers
        .iter()
        .map(|customer| {
            let share = target * customer_weight(customer) / total_weight;
            (customer.id.clone(), round_half_up(share))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::{Channel, DealerType, RepresentativeId};

    fn customer(id: &str, channel: Channel, dealer_type: DealerType) -> Customer {
        Customer {
            id: CustomerId(id.into()),
            name: format!("Customer {id}"),
            code: format!("C-{id}"),
            channel,
            dealer_type,
            representative: RepresentativeId("rep-1".into()),
        }
    }

    #[test]
    fn splits_proportionally_to_weight() {
        let roster = vec![
            customer("a", Channel::ModernTrade, DealerType::KeyDistributor),
            customer("b", Channel::GeneralTrade, DealerType::Wholesaler),
            customer("c", Channel::Horeca, DealerType::Retailer),
        ];

        let allocations = distribute(Decimal::from(125), &roster);

        assert_eq!(allocations[&CustomerId("a".into())], Decimal::from(75));
        assert_eq!(allocations[&CustomerId("b".into())], Decimal::from(30));
        assert_eq!(allocations[&CustomerId("c".into())], Decimal::from(20));
    }

    #[test]
    fn midpoints_round_up() {
        let roster = vec![
            customer("a", Channel::Other, DealerType::Other),
            customer("b", Channel::Other, DealerType::Other),
        ];

        // 5 split evenly is 2.5 each; both shares round up.
        let allocations = distribute(Decimal::from(5), &roster);
        assert_eq!(allocations[&CustomerId("a".into())], Decimal::from(3));
        assert_eq!(allocations[&CustomerId("b".into())], Decimal::from(3));
    }

    #[test]
    fn rounded_shares_may_not_sum_to_target() {
        let roster = vec![
            customer("a", Channel::Other, DealerType::Other),
            customer("b", Channel::Other, DealerType::Other),
            customer("c", Channel::Other, DealerType::Other),
        ];

        let allocations = distribute(Decimal::from(100), &roster);
        let total: Decimal = allocations.values().copied().sum();

        // 33.33.. rounds to 33 per customer; the shortfall is accepted.
        assert_eq!(total, Decimal::from(99));
        assert!((total - Decimal::from(100)).abs() <= Decimal::from(roster.len() as i64));
    }

    #[test]
    fn empty_roster_yields_no_allocations() {
        assert!(distribute(Decimal::from(500), &[]).is_empty());
    }

    #[test]
    fn zero_target_allocates_zero() {
        let roster = vec![customer("a", Channel::Horeca, DealerType::Wholesaler)];
        let allocations = distribute(Decimal::ZERO, &roster);
        assert_eq!(allocations[&CustomerId("a".into())], Decimal::ZERO);
    }
}

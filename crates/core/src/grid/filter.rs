use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::customer::{Channel, Customer, DealerType, RepresentativeId};

/// Conjunction of per-dimension allow-lists over the roster. `None` leaves a
/// dimension unrestricted; an empty set hides every customer.
///
/// Filtering is a view concern: it narrows totals and assembled payloads but
/// never restricts distribution, which always covers the full roster.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterFilter {
    pub names: Option<BTreeSet<String>>,
    pub codes: Option<BTreeSet<String>>,
    pub representatives: Option<BTreeSet<RepresentativeId>>,
    pub dealer_types: Option<BTreeSet<DealerType>>,
    pub channels: Option<BTreeSet<Channel>>,
}

impl RosterFilter {
    pub fn matches(&self, customer: &Customer) -> bool {
        dimension_allows(&self.names, &customer.name)
            && dimension_allows(&self.codes, &customer.code)
            && dimension_allows(&self.representatives, &customer.representative)
            && dimension_allows(&self.dealer_types, &customer.dealer_type)
            && dimension_allows(&self.channels, &customer.channel)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.names.is_none()
            && self.codes.is_none()
            && self.representatives.is_none()
            && self.dealer_types.is_none()
            && self.channels.is_none()
    }
}

fn dimension_allows<T: Ord>(allowed: &Option<BTreeSet<T>>, value: &T) -> bool {
    allowed.as_ref().map_or(true, |set| set.contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::CustomerId;

    fn customer(code: &str, channel: Channel, rep: &str) -> Customer {
        Customer {
            id: CustomerId(code.to_ascii_lowercase()),
            name: format!("Shop {code}"),
            code: code.into(),
            channel,
            dealer_type: DealerType::Retailer,
            representative: RepresentativeId(rep.into()),
        }
    }

    #[test]
    fn default_filter_matches_everyone() {
        let filter = RosterFilter::default();
        assert!(filter.is_unrestricted());
        assert!(filter.matches(&customer("C-1", Channel::Horeca, "rep-1")));
    }

    #[test]
    fn dimensions_combine_with_and() {
        let filter = RosterFilter {
            channels: Some(BTreeSet::from([Channel::Horeca])),
            representatives: Some(BTreeSet::from([RepresentativeId("rep-1".into())])),
            ..RosterFilter::default()
        };

        assert!(filter.matches(&customer("C-1", Channel::Horeca, "rep-1")));
        assert!(!filter.matches(&customer("C-2", Channel::Horeca, "rep-2")));
        assert!(!filter.matches(&customer("C-3", Channel::ModernTrade, "rep-1")));
    }

    #[test]
    fn empty_allow_list_hides_everyone() {
        let filter = RosterFilter { codes: Some(BTreeSet::new()), ..RosterFilter::default() };
        assert!(!filter.matches(&customer("C-1", Channel::GeneralTrade, "rep-1")));
        assert!(!filter.is_unrestricted());
    }
}

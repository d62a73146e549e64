use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub code: String,
    pub name: String,
    pub unit_price: Decimal,
}

/// Read-only product lookup used when pricing assembled payloads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// Products missing from the catalog price at zero.
    pub fn unit_price(&self, id: &ProductId) -> Decimal {
        self.find(id).map(|product| product.unit_price).unwrap_or(Decimal::ZERO)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price: Decimal) -> Product {
        Product {
            id: ProductId(id.to_string()),
            code: format!("SKU-{id}"),
            name: format!("Product {id}"),
            unit_price: price,
        }
    }

    #[test]
    fn find_returns_matching_product() {
        let catalog = Catalog::new(vec![product("p1", Decimal::new(1250, 2))]);
        assert_eq!(catalog.find(&ProductId("p1".into())).map(|p| p.code.as_str()), Some("SKU-p1"));
        assert!(catalog.find(&ProductId("p2".into())).is_none());
    }

    #[test]
    fn unknown_product_prices_at_zero() {
        let catalog = Catalog::new(vec![product("p1", Decimal::new(1250, 2))]);
        assert_eq!(catalog.unit_price(&ProductId("p1".into())), Decimal::new(1250, 2));
        assert_eq!(catalog.unit_price(&ProductId("missing".into())), Decimal::ZERO);
    }
}

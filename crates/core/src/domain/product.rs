use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Retailer page where the product can be bought.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLink {
    pub retailer: String,
    pub url: String,
}

/// Catalog entry as stored by the persistence layer.
///
/// `quality_score` and `site_reliability` are conventionally in `0..=100` and
/// `price` is non-negative. Nothing here enforces it; ingestion validates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub discount_percentage: u32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub quality_score: u32,
    #[serde(default)]
    pub site: String,
    #[serde(default)]
    pub site_reliability: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub purchase_links: Vec<PurchaseLink>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn default_in_stock() -> bool {
    true
}

impl Product {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        brand: impl Into<String>,
        category: impl Into<String>,
        price: f64,
    ) -> Self {
        Self {
            id: ProductId(id),
            name: name.into(),
            brand: brand.into(),
            category: category.into(),
            price,
            original_price: None,
            discount_percentage: 0,
            rating: 0.0,
            review_count: 0,
            quality_score: 0,
            site: String::new(),
            site_reliability: 0,
            description: None,
            image_url: None,
            purchase_links: Vec::new(),
            featured: false,
            in_stock: true,
            created_at: Utc::now(),
        }
    }

    pub fn with_quality_score(mut self, quality_score: u32) -> Self {
        self.quality_score = quality_score;
        self
    }

    pub fn with_site(mut self, site: impl Into<String>, reliability: u32) -> Self {
        self.site = site.into();
        self.site_reliability = reliability;
        self
    }

    pub fn with_rating(mut self, rating: f64, review_count: u32) -> Self {
        self.rating = rating;
        self.review_count = review_count;
        self
    }

    pub fn with_discount(mut self, original_price: f64, discount_percentage: u32) -> Self {
        self.original_price = Some(original_price);
        self.discount_percentage = discount_percentage;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_link(mut self, retailer: impl Into<String>, url: impl Into<String>) -> Self {
        self.purchase_links.push(PurchaseLink { retailer: retailer.into(), url: url.into() });
        self
    }

    /// Link for `retailer`, matched case-insensitively.
    pub fn purchase_link(&self, retailer: &str) -> Option<&PurchaseLink> {
        self.purchase_links.iter().find(|link| link.retailer.eq_ignore_ascii_case(retailer))
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn out_of_stock(mut self) -> Self {
        self.in_stock = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{Product, ProductId};

    #[test]
    fn product_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&ProductId(7)).expect("serialize id");
        assert_eq!(json, "7");
    }

    #[test]
    fn missing_optional_fields_take_catalog_defaults() {
        let product: Product = serde_json::from_str(
            r#"{"id": 3, "name": "Yoga Mat Pro", "brand": "Decathlon", "category": "sports", "price": 29.0}"#,
        )
        .expect("deserialize product");

        assert!(product.in_stock);
        assert!(!product.featured);
        assert_eq!(product.quality_score, 0);
        assert!(product.purchase_links.is_empty());
    }

    #[test]
    fn purchase_link_lookup_ignores_retailer_case() {
        let product = Product::new(13, "iPhone 15 Pro Max", "Apple", "electronics", 1289.99)
            .with_link("Amazon", "https://www.amazon.fr/dp/B0CHX2Q1FQ")
            .with_link("LDLC", "https://www.ldlc.com/fiche/PB00374449.html");

        let link = product.purchase_link("ldlc").expect("ldlc link");
        assert_eq!(link.url, "https://www.ldlc.com/fiche/PB00374449.html");
        assert!(product.purchase_link("darty").is_none());
    }
}

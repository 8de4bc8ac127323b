use chrono::{DateTime, Utc};

use smartchoice_core::domain::product::{Product, ProductId};

use crate::connection::DbPool;
use crate::repositories::{ProductRepository, RepositoryError, SqlProductRepository};

/// Seed timestamps start here and advance one day per product id so that the
/// `newest` ordering is deterministic.
const SEED_EPOCH_SECS: i64 = 1_704_067_200;

/// Deterministic demo catalog: general sample products across four
/// categories followed by the electronics range with retailer links.
const SEED_PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        id: 1,
        name: "iPhone 15 Pro",
        brand: "Apple",
        category: "electronics",
        price: 1199.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.8,
        review_count: 0,
        quality_score: 95,
        site: "Amazon",
        site_reliability: 90,
        description: "Dernier modèle iPhone avec processeur A17 Pro",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 2,
        name: "Galaxy S24 Ultra",
        brand: "Samsung",
        category: "electronics",
        price: 1299.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.7,
        review_count: 0,
        quality_score: 92,
        site: "Fnac",
        site_reliability: 95,
        description: "Smartphone Android haut de gamme avec S Pen",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 3,
        name: "Pixel 8 Pro",
        brand: "Google",
        category: "electronics",
        price: 999.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.6,
        review_count: 0,
        quality_score: 88,
        site: "Boulanger",
        site_reliability: 85,
        description: "Smartphone Google avec IA avancée",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 4,
        name: "MacBook Air M2",
        brand: "Apple",
        category: "electronics",
        price: 1299.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.9,
        review_count: 0,
        quality_score: 96,
        site: "Apple Store",
        site_reliability: 100,
        description: "Ordinateur portable ultra-fin avec puce M2",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 5,
        name: "ThinkPad X1 Carbon",
        brand: "Lenovo",
        category: "electronics",
        price: 1499.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.5,
        review_count: 0,
        quality_score: 90,
        site: "LDLC",
        site_reliability: 80,
        description: "Ordinateur portable professionnel robuste",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 6,
        name: "Jean 501 Original",
        brand: "Levi's",
        category: "clothing",
        price: 89.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.4,
        review_count: 0,
        quality_score: 82,
        site: "Galeries Lafayette",
        site_reliability: 88,
        description: "Jean classique indémodable",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 7,
        name: "Vans Old Skool",
        brand: "Vans",
        category: "clothing",
        price: 65.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.3,
        review_count: 0,
        quality_score: 75,
        site: "Foot Locker",
        site_reliability: 82,
        description: "Baskets skateboard classiques",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 8,
        name: "Hoodie Essential",
        brand: "Nike",
        category: "clothing",
        price: 45.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.2,
        review_count: 0,
        quality_score: 78,
        site: "Zalando",
        site_reliability: 85,
        description: "Sweat à capuche confortable",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 9,
        name: "Aspirateur Robot Roomba",
        brand: "iRobot",
        category: "home",
        price: 299.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.1,
        review_count: 0,
        quality_score: 85,
        site: "Darty",
        site_reliability: 90,
        description: "Aspirateur robot intelligent",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 10,
        name: "Machine à café Nespresso",
        brand: "Nespresso",
        category: "home",
        price: 149.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.3,
        review_count: 0,
        quality_score: 80,
        site: "Amazon",
        site_reliability: 90,
        description: "Machine à café à capsules",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 11,
        name: "Yoga Mat Pro",
        brand: "Decathlon",
        category: "sports",
        price: 29.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.0,
        review_count: 0,
        quality_score: 70,
        site: "Decathlon",
        site_reliability: 92,
        description: "Tapis de yoga professionnel",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 12,
        name: "Running Shoes Ultraboost",
        brand: "Adidas",
        category: "sports",
        price: 140.0,
        original_price: None,
        discount_percentage: 0,
        rating: 4.5,
        review_count: 0,
        quality_score: 85,
        site: "Go Sport",
        site_reliability: 78,
        description: "Chaussures de running haute performance",
        links: &[],
        featured: false,
    },
    SeedProduct {
        id: 13,
        name: "iPhone 15 Pro Max 256GB Titane Naturel",
        brand: "Apple",
        category: "electronics",
        price: 1289.99,
        original_price: Some(1399.99),
        discount_percentage: 8,
        rating: 4.8,
        review_count: 2847,
        quality_score: 95,
        site: "Amazon",
        site_reliability: 90,
        description: "iPhone 15 Pro Max avec chip A17 Pro, système photo avancé et design en titane.",
        links: &[
            ("Amazon", "https://www.amazon.fr/dp/B0CHX2Q1FQ"),
            ("Fnac", "https://www.fnac.com/iPhone-15-Pro-Max-256-GB-Titane-Naturel/a17061444"),
            ("LDLC", "https://www.ldlc.com/fiche/PB00374449.html"),
        ],
        featured: true,
    },
    SeedProduct {
        id: 14,
        name: "Apple Watch Series 10 GPS 45mm",
        brand: "Apple",
        category: "electronics",
        price: 549.99,
        original_price: Some(629.99),
        discount_percentage: 13,
        rating: 4.7,
        review_count: 1923,
        quality_score: 92,
        site: "Fnac",
        site_reliability: 95,
        description: "Apple Watch Series 10 avec capteurs de santé avancés et design moderne.",
        links: &[("Fnac", "https://www.fnac.com/Apple-Watch-Series-10-GPS-45mm/a17061444")],
        featured: false,
    },
    SeedProduct {
        id: 15,
        name: "Samsung Galaxy S24 Ultra 256GB Titanium Black",
        brand: "Samsung",
        category: "electronics",
        price: 1199.99,
        original_price: Some(1399.99),
        discount_percentage: 14,
        rating: 4.6,
        review_count: 2156,
        quality_score: 90,
        site: "Fnac",
        site_reliability: 95,
        description: "Samsung Galaxy S24 Ultra avec S Pen intégré et appareil photo professionnel.",
        links: &[("Fnac", "https://www.fnac.com/Samsung-Galaxy-S24-Ultra-256GB/a17061444")],
        featured: true,
    },
    SeedProduct {
        id: 16,
        name: "Samsung Odyssey G9 49\" 240Hz Curved Gaming Monitor",
        brand: "Samsung",
        category: "electronics",
        price: 1299.99,
        original_price: Some(1599.99),
        discount_percentage: 19,
        rating: 4.9,
        review_count: 892,
        quality_score: 94,
        site: "Amazon",
        site_reliability: 90,
        description: "Moniteur gaming curved 49\" avec 240Hz et HDR1000.",
        links: &[("Amazon", "https://www.amazon.fr/dp/B0CHX2Q1FQ")],
        featured: false,
    },
    SeedProduct {
        id: 17,
        name: "PlayStation 5 Slim Console Edition Standard",
        brand: "Sony",
        category: "electronics",
        price: 449.99,
        original_price: Some(549.99),
        discount_percentage: 18,
        rating: 4.8,
        review_count: 3421,
        quality_score: 93,
        site: "Darty",
        site_reliability: 90,
        description: "Console PlayStation 5 Slim avec lecteur Blu-ray et manette DualSense.",
        links: &[
            ("Amazon", "https://www.amazon.fr/dp/B0CHL2XQ5H"),
            (
                "Fnac",
                "https://www.fnac.com/PlayStation-5-Slim-Console-Edition-Standard/a17061447",
            ),
        ],
        featured: true,
    },
    SeedProduct {
        id: 18,
        name: "NVIDIA GeForce RTX 4090 24GB GDDR6X",
        brand: "NVIDIA",
        category: "electronics",
        price: 1899.99,
        original_price: Some(2199.99),
        discount_percentage: 14,
        rating: 4.9,
        review_count: 3421,
        quality_score: 96,
        site: "LDLC",
        site_reliability: 80,
        description: "Carte graphique haut de gamme pour le jeu en 4K et la création.",
        links: &[("Amazon", "https://www.amazon.fr/dp/B0BGZJVLJQ")],
        featured: true,
    },
    SeedProduct {
        id: 19,
        name: "NVIDIA GeForce RTX 4070 Ti 12GB",
        brand: "NVIDIA",
        category: "electronics",
        price: 999.99,
        original_price: Some(1199.99),
        discount_percentage: 17,
        rating: 4.7,
        review_count: 2156,
        quality_score: 91,
        site: "Cdiscount",
        site_reliability: 55,
        description: "Carte graphique performante pour le jeu en 1440p.",
        links: &[("Cdiscount", "https://www.cdiscount.com/nvidia-geforce-rtx-4070-ti-12gb")],
        featured: false,
    },
    SeedProduct {
        id: 20,
        name: "AMD Ryzen 9 7950X 16 Cores 32 Threads",
        brand: "AMD",
        category: "electronics",
        price: 549.99,
        original_price: Some(699.99),
        discount_percentage: 21,
        rating: 4.8,
        review_count: 1923,
        quality_score: 94,
        site: "LDLC",
        site_reliability: 80,
        description: "Processeur 16 cœurs pour stations de travail et jeu.",
        links: &[("LDLC", "https://www.ldlc.com/fiche/PB00374450.html")],
        featured: true,
    },
    SeedProduct {
        id: 21,
        name: "AMD Ryzen 7 7700X 8 Cores 16 Threads",
        brand: "AMD",
        category: "electronics",
        price: 399.99,
        original_price: Some(449.99),
        discount_percentage: 11,
        rating: 4.6,
        review_count: 1567,
        quality_score: 89,
        site: "Amazon",
        site_reliability: 90,
        description: "Processeur 8 cœurs polyvalent.",
        links: &[("Amazon", "https://www.amazon.fr/dp/B0BGZJVLJQ")],
        featured: false,
    },
    SeedProduct {
        id: 22,
        name: "Logitech G Pro X Superlight 2",
        brand: "Logitech",
        category: "electronics",
        price: 149.99,
        original_price: Some(179.99),
        discount_percentage: 17,
        rating: 4.6,
        review_count: 5432,
        quality_score: 88,
        site: "Fnac",
        site_reliability: 95,
        description: "Souris gaming ultra-légère 60g, HERO 2 32K DPI.",
        links: &[
            ("Amazon", "https://www.amazon.fr/dp/B0BGZJVLKR"),
            ("Fnac", "https://www.fnac.com/Logitech-G-Pro-X-Superlight-2/a17061448"),
            ("LDLC", "https://www.ldlc.com/fiche/PB00374451.html"),
        ],
        featured: true,
    },
];

/// Demo product catalog loader.
pub struct SeedCatalog;

impl SeedCatalog {
    /// Seed rows as domain products.
    pub fn products() -> Vec<Product> {
        SEED_PRODUCTS.iter().map(SeedProduct::to_product).collect()
    }

    /// Upserts every seed product by its fixed id; running it twice leaves
    /// the same rows.
    pub async fn load(pool: &DbPool) -> Result<SeedResult, RepositoryError> {
        let repository = SqlProductRepository::new(pool.clone());
        for product in Self::products() {
            repository.save(product).await?;
        }

        let mut categories: Vec<&'static str> =
            SEED_PRODUCTS.iter().map(|seed| seed.category).collect();
        categories.sort_unstable();
        categories.dedup();

        Ok(SeedResult { products_seeded: SEED_PRODUCTS.len(), categories })
    }

    /// Checks that every seed product exists with its seeded name.
    pub async fn verify(pool: &DbPool) -> Result<VerificationResult, RepositoryError> {
        let repository = SqlProductRepository::new(pool.clone());
        let mut checks = Vec::with_capacity(SEED_PRODUCTS.len());

        for seed in SEED_PRODUCTS {
            let present = repository
                .find_by_id(&ProductId(seed.id))
                .await?
                .is_some_and(|product| product.name == seed.name);
            checks.push((seed.name, present));
        }

        let all_present = checks.iter().all(|(_, present)| *present);
        Ok(VerificationResult { all_present, checks })
    }

    /// Removes seeded rows.
    pub async fn clean(pool: &DbPool) -> Result<(), RepositoryError> {
        let mut tx = pool.begin().await?;
        for seed in SEED_PRODUCTS {
            sqlx::query("DELETE FROM product WHERE id = ?").bind(seed.id).execute(&mut *tx).await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct SeedProduct {
    id: i64,
    name: &'static str,
    brand: &'static str,
    category: &'static str,
    price: f64,
    original_price: Option<f64>,
    discount_percentage: u32,
    rating: f64,
    review_count: u32,
    quality_score: u32,
    site: &'static str,
    site_reliability: u32,
    description: &'static str,
    links: &'static [(&'static str, &'static str)],
    featured: bool,
}

impl SeedProduct {
    fn to_product(&self) -> Product {
        let created_at =
            DateTime::from_timestamp(SEED_EPOCH_SECS + self.id * 86_400, 0).unwrap_or_else(Utc::now);

        let mut product = Product::new(self.id, self.name, self.brand, self.category, self.price)
            .with_quality_score(self.quality_score)
            .with_site(self.site, self.site_reliability)
            .with_rating(self.rating, self.review_count)
            .with_created_at(created_at);
        if let Some(original_price) = self.original_price {
            product = product.with_discount(original_price, self.discount_percentage);
        }
        for (retailer, url) in self.links {
            product = product.with_link(*retailer, *url);
        }
        if self.featured {
            product = product.featured();
        }
        product.description = Some(self.description.to_string());
        product
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub products_seeded: usize,
    pub categories: Vec<&'static str>,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(&'static str, bool)>,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::repositories::ProductQuery;
    use crate::{connect_with_settings, migrations};

    #[test]
    fn seed_ids_are_unique_and_positive() {
        let ids: HashSet<i64> = SEED_PRODUCTS.iter().map(|seed| seed.id).collect();
        assert_eq!(ids.len(), SEED_PRODUCTS.len());
        assert!(SEED_PRODUCTS.iter().all(|seed| seed.id > 0));
    }

    #[test]
    fn seed_scores_stay_in_range() {
        for seed in SEED_PRODUCTS {
            assert!(seed.price >= 0.0, "{} has a negative price", seed.name);
            assert!(seed.quality_score <= 100, "{} quality out of range", seed.name);
            assert!(seed.site_reliability <= 100, "{} reliability out of range", seed.name);
        }
    }

    #[tokio::test]
    async fn verify_seed_contract_and_idempotency() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect to test database");

        migrations::run_pending(&pool).await.expect("run migrations");

        let first = SeedCatalog::load(&pool).await.expect("load seed catalog");
        let first_verification = SeedCatalog::verify(&pool).await.expect("verify seed catalog");
        assert!(first_verification.all_present);
        assert_eq!(first.products_seeded, SEED_PRODUCTS.len());
        assert_eq!(first.categories, vec!["clothing", "electronics", "home", "sports"]);

        let second = SeedCatalog::load(&pool).await.expect("reload seed catalog");
        let second_verification = SeedCatalog::verify(&pool).await.expect("re-verify");
        assert!(second_verification.all_present);
        assert_eq!(second.products_seeded, first.products_seeded);
        assert_eq!(first_verification.checks, second_verification.checks);

        let repository = SqlProductRepository::new(pool.clone());
        let stored = repository.list(&ProductQuery::all()).await.expect("list");
        assert_eq!(stored.len(), SEED_PRODUCTS.len());
    }

    #[tokio::test]
    async fn clean_removes_seeded_rows() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30)
            .await
            .expect("connect to test database");
        migrations::run_pending(&pool).await.expect("run migrations");

        SeedCatalog::load(&pool).await.expect("load");
        SeedCatalog::clean(&pool).await.expect("clean");

        let verification = SeedCatalog::verify(&pool).await.expect("verify");
        assert!(!verification.all_present);
        assert!(verification.checks.iter().all(|(_, present)| !present));
    }
}

use std::collections::{BTreeMap, BTreeSet};

use tokio::sync::RwLock;

use smartchoice_core::domain::product::{Product, ProductId};

use super::{
    ProductQuery, ProductRepository, RepositoryError, SearchHistoryEntry, SearchHistoryRepository,
};

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<BTreeMap<i64, Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products.into_iter().map(|product| (product.id.0, product)).collect();
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.get(&id.0).cloned())
    }

    async fn save(&self, mut product: Product) -> Result<ProductId, RepositoryError> {
        let mut products = self.products.write().await;
        if product.id.0 <= 0 {
            let next = products.keys().next_back().map_or(1, |last| last + 1);
            product.id = ProductId(next);
        }
        let id = product.id;
        products.insert(id.0, product);
        Ok(id)
    }

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products.read().await;
        let matching = products.values().filter(|product| query.matches(product)).cloned();
        Ok(match query.limit {
            Some(limit) => matching.take(limit as usize).collect(),
            None => matching.collect(),
        })
    }

    async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let products = self.products.read().await;
        let categories: BTreeSet<String> =
            products.values().map(|product| product.category.clone()).collect();
        Ok(categories.into_iter().collect())
    }

    async fn brands(&self, category: Option<&str>) -> Result<Vec<String>, RepositoryError> {
        let products = self.products.read().await;
        let brands: BTreeSet<String> = products
            .values()
            .filter(|product| category.map_or(true, |category| product.category == category))
            .map(|product| product.brand.clone())
            .collect();
        Ok(brands.into_iter().collect())
    }
}

#[derive(Default)]
pub struct InMemorySearchHistoryRepository {
    entries: RwLock<Vec<SearchHistoryEntry>>,
}

#[async_trait::async_trait]
impl SearchHistoryRepository for InMemorySearchHistoryRepository {
    async fn record(&self, mut entry: SearchHistoryEntry) -> Result<i64, RepositoryError> {
        let mut entries = self.entries.write().await;
        let id = entries.len() as i64 + 1;
        entry.id = Some(id);
        entries.push(entry);
        Ok(id)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<SearchHistoryEntry>, RepositoryError> {
        let entries = self.entries.read().await;
        let mut recent: Vec<SearchHistoryEntry> = entries.clone();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        recent.truncate(limit as usize);
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use smartchoice_core::domain::product::{Product, ProductId};
    use smartchoice_core::recommend::Profile;

    use crate::repositories::{
        InMemoryProductRepository, InMemorySearchHistoryRepository, ProductQuery,
        ProductRepository, SearchHistoryEntry, SearchHistoryRepository,
    };

    #[tokio::test]
    async fn in_memory_product_repo_round_trip() {
        let repo = InMemoryProductRepository::default();
        let product = Product::new(3, "Pixel 8 Pro", "Google", "electronics", 999.0)
            .with_quality_score(88)
            .with_site("Boulanger", 85);

        repo.save(product.clone()).await.expect("save product");
        let found = repo.find_by_id(&product.id).await.expect("find product");

        assert_eq!(found, Some(product));
    }

    #[tokio::test]
    async fn in_memory_product_repo_allocates_ids() {
        let repo = InMemoryProductRepository::with_products([Product::new(
            5, "Hoodie", "Nike", "clothing", 45.0,
        )]);

        let id = repo.save(Product::new(0, "Yoga Mat", "Decathlon", "sports", 29.0)).await;
        assert_eq!(id.expect("save"), ProductId(6));
    }

    #[tokio::test]
    async fn in_memory_list_matches_sql_semantics() {
        let repo = InMemoryProductRepository::with_products([
            Product::new(2, "Galaxy S24", "Samsung", "electronics", 1199.0),
            Product::new(1, "iPhone 15 Pro", "Apple", "electronics", 1199.0),
            Product::new(3, "Jean 501", "Levi's", "clothing", 89.0),
        ]);

        let electronics = repo.list(&ProductQuery::in_category("electronics")).await.expect("list");
        assert_eq!(electronics.iter().map(|p| p.id.0).collect::<Vec<_>>(), vec![1, 2]);

        assert_eq!(repo.categories().await.expect("categories"), vec!["clothing", "electronics"]);
        assert_eq!(
            repo.brands(Some("electronics")).await.expect("brands"),
            vec!["Apple", "Samsung"]
        );
    }

    #[tokio::test]
    async fn in_memory_history_is_newest_first() {
        let repo = InMemorySearchHistoryRepository::default();
        repo.record(SearchHistoryEntry::new("a", None, 10.0, Profile::Low, 1)).await.expect("a");
        repo.record(SearchHistoryEntry::new("b", None, 10.0, Profile::Low, 1)).await.expect("b");

        let recent = repo.recent(1).await.expect("recent");
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].query, "b");
    }
}

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use smartchoice_core::domain::product::{Product, ProductId, PurchaseLink};

use super::{ProductQuery, ProductRepository, RepositoryError};
use crate::DbPool;

const PRODUCT_COLUMNS: &str = "id, name, brand, category, price, original_price, \
     discount_percentage, rating, review_count, quality_score, site, site_reliability, \
     description, image_url, purchase_links_json, featured, in_stock, created_at";

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn decode_err(error: impl ToString) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

fn get_u32(row: &SqliteRow, column: &str) -> Result<u32, RepositoryError> {
    let value: i64 = row.try_get(column).map_err(decode_err)?;
    u32::try_from(value).map_err(|_| decode_err(format!("{column} out of range: {value}")))
}

fn row_to_product(row: &SqliteRow) -> Result<Product, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(decode_err)?;
    let links_json: String = row.try_get("purchase_links_json").map_err(decode_err)?;
    let purchase_links: Vec<PurchaseLink> =
        serde_json::from_str(&links_json).map_err(decode_err)?;
    let created_at_str: String = row.try_get("created_at").map_err(decode_err)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(decode_err)?;

    Ok(Product {
        id: ProductId(id),
        name: row.try_get("name").map_err(decode_err)?,
        brand: row.try_get("brand").map_err(decode_err)?,
        category: row.try_get("category").map_err(decode_err)?,
        price: row.try_get("price").map_err(decode_err)?,
        original_price: row.try_get("original_price").map_err(decode_err)?,
        discount_percentage: get_u32(row, "discount_percentage")?,
        rating: row.try_get("rating").map_err(decode_err)?,
        review_count: get_u32(row, "review_count")?,
        quality_score: get_u32(row, "quality_score")?,
        site: row.try_get("site").map_err(decode_err)?,
        site_reliability: get_u32(row, "site_reliability")?,
        description: row.try_get("description").map_err(decode_err)?,
        image_url: row.try_get("image_url").map_err(decode_err)?,
        purchase_links,
        featured: row.try_get("featured").map_err(decode_err)?,
        in_stock: row.try_get("in_stock").map_err(decode_err)?,
        created_at,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn save(&self, product: Product) -> Result<ProductId, RepositoryError> {
        let links_json = serde_json::to_string(&product.purchase_links).map_err(decode_err)?;
        let requested_id = (product.id.0 > 0).then_some(product.id.0);
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO product
                (id, name, brand, category, price, original_price, discount_percentage,
                 rating, review_count, quality_score, site, site_reliability,
                 description, image_url, purchase_links_json, featured, in_stock,
                 created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                brand = excluded.brand,
                category = excluded.category,
                price = excluded.price,
                original_price = excluded.original_price,
                discount_percentage = excluded.discount_percentage,
                rating = excluded.rating,
                review_count = excluded.review_count,
                quality_score = excluded.quality_score,
                site = excluded.site,
                site_reliability = excluded.site_reliability,
                description = excluded.description,
                image_url = excluded.image_url,
                purchase_links_json = excluded.purchase_links_json,
                featured = excluded.featured,
                in_stock = excluded.in_stock,
                updated_at = excluded.updated_at",
        )
        .bind(requested_id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.original_price)
        .bind(i64::from(product.discount_percentage))
        .bind(product.rating)
        .bind(i64::from(product.review_count))
        .bind(i64::from(product.quality_score))
        .bind(&product.site)
        .bind(i64::from(product.site_reliability))
        .bind(&product.description)
        .bind(&product.image_url)
        .bind(&links_json)
        .bind(product.featured)
        .bind(product.in_stock)
        .bind(product.created_at.to_rfc3339())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(ProductId(requested_id.unwrap_or_else(|| result.last_insert_rowid())))
    }

    async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE 1=1"));

        if let Some(category) = &query.category {
            builder.push(" AND category = ");
            builder.push_bind(category.clone());
        }
        if let Some(brand) = &query.brand {
            builder.push(" AND brand = ");
            builder.push_bind(brand.clone());
        }
        if let Some(min_price) = query.min_price {
            builder.push(" AND price >= ");
            builder.push_bind(min_price);
        }
        if let Some(max_price) = query.max_price {
            builder.push(" AND price <= ");
            builder.push_bind(max_price);
        }
        if query.in_stock_only {
            builder.push(" AND in_stock = 1");
        }
        if query.featured_only {
            builder.push(" AND featured = 1");
        }

        builder.push(" ORDER BY id ASC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(i64::from(limit));
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()
    }

    async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let categories: Vec<String> =
            sqlx::query_scalar("SELECT DISTINCT category FROM product ORDER BY category ASC")
                .fetch_all(&self.pool)
                .await?;
        Ok(categories)
    }

    async fn brands(&self, category: Option<&str>) -> Result<Vec<String>, RepositoryError> {
        let brands: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT brand FROM product
             WHERE (?1 IS NULL OR category = ?1)
             ORDER BY brand ASC",
        )
        .bind(category)
        .fetch_all(&self.pool)
        .await?;
        Ok(brands)
    }
}

//! Product Repository
//!
//! Catalog store plus the review aggregation: appending a review
//! recomputes `num_reviews` and the mean `rating` before persisting.

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Product, ProductPage, ProductUpdate, Review};
use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const PRODUCT_TABLE: &str = "product";

/// Fixed catalog page size
pub const PAGE_SIZE: u64 = 4;

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Paginated catalog search
    ///
    /// 关键字为大小写不敏感的子串匹配；skip 公式为 `PAGE_SIZE * (page - 1)`。
    pub async fn find_page(&self, keyword: Option<&str>, page: u64) -> RepoResult<ProductPage> {
        let page = page.max(1);
        let keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_lowercase);

        let where_clause = if keyword.is_some() {
            " WHERE string::lowercase(name) CONTAINS $kw"
        } else {
            ""
        };

        #[derive(serde::Deserialize)]
        struct CountRow {
            count: u64,
        }

        let count_query = format!("SELECT count() AS count FROM product{} GROUP ALL", where_clause);
        let mut result = self
            .base
            .db()
            .query(&count_query)
            .bind(("kw", keyword.clone()))
            .await?;
        let count = result
            .take::<Vec<CountRow>>(0)?
            .into_iter()
            .next()
            .map(|r| r.count)
            .unwrap_or(0);

        let start = PAGE_SIZE * (page - 1);
        let page_query = format!(
            "SELECT * FROM product{} ORDER BY created_at DESC LIMIT {} START {}",
            where_clause, PAGE_SIZE, start
        );
        let products: Vec<Product> = self
            .base
            .db()
            .query(&page_query)
            .bind(("kw", keyword))
            .await?
            .take(0)?;

        Ok(ProductPage {
            products,
            page,
            pages: count.div_ceil(PAGE_SIZE),
        })
    }

    /// Top rated products
    pub async fn find_top(&self, limit: usize) -> RepoResult<Vec<Product>> {
        let query = format!("SELECT * FROM product ORDER BY rating DESC LIMIT {}", limit);
        let products: Vec<Product> = self.base.db().query(&query).await?.take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let record_id = parse_record_id(PRODUCT_TABLE, id);
        let product: Option<Product> = self.base.db().select(record_id).await?;
        Ok(product)
    }

    /// Create a placeholder product owned by the given admin user
    ///
    /// Field values are edited afterwards through `update`.
    pub async fn create(&self, user: &RecordId) -> RepoResult<Product> {
        let product = Product {
            id: None,
            name: "Sample name".to_string(),
            user: Some(user.clone()),
            image: "/images/sample.jpg".to_string(),
            brand: "Sample brand".to_string(),
            category: "Sample category".to_string(),
            description: "Sample description".to_string(),
            price: 0.0,
            count_in_stock: 0,
            reviews: Vec::new(),
            rating: 0.0,
            num_reviews: 0,
            created_at: Utc::now(),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let record_id = parse_record_id(PRODUCT_TABLE, id);

        // 数值字段用 IF $has_x 判断：0 在 SurrealQL 中为 falsy，不能用 OR
        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    name = $name OR name,
                    description = $description OR description,
                    image = $image OR image,
                    brand = $brand OR brand,
                    category = $category OR category,
                    price = IF $has_price THEN $price ELSE price END,
                    count_in_stock = IF $has_stock THEN $stock ELSE count_in_stock END
                RETURN AFTER"#,
            )
            .bind(("thing", record_id))
            .bind(("name", data.name))
            .bind(("description", data.description))
            .bind(("image", data.image))
            .bind(("brand", data.brand))
            .bind(("category", data.category))
            .bind(("has_price", data.price.is_some()))
            .bind(("price", data.price))
            .bind(("has_stock", data.count_in_stock.is_some()))
            .bind(("stock", data.count_in_stock))
            .await?;

        result
            .take::<Option<Product>>(0)?
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let record_id = parse_record_id(PRODUCT_TABLE, id);
        let result: Option<Product> = self.base.db().delete(record_id).await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }

    /// Append a review and recompute the rating summary
    ///
    /// 每个 (product, reviewer) 只允许一条评论；重复提交被拒绝，
    /// 评分与计数保持不变。
    pub async fn add_review(
        &self,
        product_id: &str,
        reviewer: &RecordId,
        reviewer_name: &str,
        rating: i32,
        comment: String,
    ) -> RepoResult<Product> {
        let record_id = parse_record_id(PRODUCT_TABLE, product_id);

        let mut product = self
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| RepoError::NotFound("Product not found".to_string()))?;

        if product.reviews.iter().any(|r| r.user == *reviewer) {
            return Err(RepoError::Duplicate("Product already reviewed".to_string()));
        }

        product.reviews.push(Review {
            user: reviewer.clone(),
            name: reviewer_name.to_string(),
            rating,
            comment,
            created_at: Utc::now(),
        });

        let num_reviews = product.reviews.len() as i32;
        let total: i32 = product.reviews.iter().map(|r| r.rating).sum();
        let rating = f64::from(total) / f64::from(num_reviews);

        let mut result = self
            .base
            .db()
            .query(
                r#"UPDATE $thing SET
                    reviews = $reviews,
                    num_reviews = $num_reviews,
                    rating = $rating
                RETURN AFTER"#,
            )
            .bind(("thing", record_id))
            .bind((
                "reviews",
                serde_json::to_value(&product.reviews).unwrap_or_default(),
            ))
            .bind(("num_reviews", num_reviews))
            .bind(("rating", rating))
            .await?;

        result
            .take::<Option<Product>>(0)?
            .ok_or_else(|| RepoError::NotFound("Product not found".to_string()))
    }
}

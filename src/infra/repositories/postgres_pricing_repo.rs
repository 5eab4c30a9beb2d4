use crate::domain::{models::pricing::PricingItem, ports::PricingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresPricingRepo {
    pool: PgPool,
}

impl PostgresPricingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PricingRepository for PostgresPricingRepo {
    async fn create(&self, item: &PricingItem) -> Result<PricingItem, AppError> {
        sqlx::query_as::<_, PricingItem>(
            r#"INSERT INTO pricing_items (id, name, kind, credits, price_cents, is_active, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)
               RETURNING *"#
        )
            .bind(&item.id).bind(&item.name).bind(item.kind).bind(item.credits)
            .bind(item.price_cents).bind(item.is_active).bind(item.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<PricingItem>, AppError> {
        sqlx::query_as::<_, PricingItem>("SELECT * FROM pricing_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self) -> Result<Vec<PricingItem>, AppError> {
        sqlx::query_as::<_, PricingItem>("SELECT * FROM pricing_items ORDER BY kind ASC, credits ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}

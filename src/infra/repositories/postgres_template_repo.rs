use crate::domain::{models::template::{SlotTemplate, TemplateEntry}, ports::TemplateRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;

pub struct PostgresTemplateRepo {
    pool: PgPool,
}

impl PostgresTemplateRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_entries(&self, template: &mut SlotTemplate) -> Result<(), AppError> {
        template.entries = sqlx::query_as::<_, TemplateEntry>(
            "SELECT * FROM template_entries WHERE template_id = $1 ORDER BY position ASC"
        )
            .bind(&template.id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(())
    }
}

#[async_trait]
impl TemplateRepository for PostgresTemplateRepo {
    async fn create(&self, template: &SlotTemplate) -> Result<SlotTemplate, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        let mut created = sqlx::query_as::<_, SlotTemplate>(
            "INSERT INTO slot_templates (id, name, description, created_at) VALUES ($1, $2, $3, $4) RETURNING *"
        )
            .bind(&template.id).bind(&template.name).bind(&template.description).bind(template.created_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for entry in &template.entries {
            let saved = sqlx::query_as::<_, TemplateEntry>(
                r#"INSERT INTO template_entries (id, template_id, position, day_offset, start_time, duration_minutes)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   RETURNING *"#
            )
                .bind(&entry.id).bind(&created.id).bind(entry.position)
                .bind(entry.day_offset).bind(entry.start_time).bind(entry.duration_minutes)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::Database)?;
            created.entries.push(saved);
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<SlotTemplate>, AppError> {
        let template = sqlx::query_as::<_, SlotTemplate>("SELECT * FROM slot_templates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        match template {
            Some(mut template) => {
                self.load_entries(&mut template).await?;
                Ok(Some(template))
            }
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<SlotTemplate>, AppError> {
        let mut templates = sqlx::query_as::<_, SlotTemplate>("SELECT * FROM slot_templates ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        for template in &mut templates {
            self.load_entries(template).await?;
        }
        Ok(templates)
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        sqlx::query("DELETE FROM template_entries WHERE template_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        let result = sqlx::query("DELETE FROM slot_templates WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Template not found".into()));
        }
        tx.commit().await.map_err(AppError::Database)?;
        Ok(())
    }
}

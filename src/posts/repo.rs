use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::StoreError;
use crate::posts::repo_types::Post;

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn insert(&self, content: &str) -> Result<Post, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, StoreError>;
    /// Newest first.
    async fn list(&self) -> Result<Vec<Post>, StoreError>;
    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgPostStore {
    db: PgPool,
}

impl PgPostStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostStore for PgPostStore {
    async fn insert(&self, content: &str) -> Result<Post, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO posts (content)
            VALUES ($1)
            RETURNING id, content, created_at
            "#,
        )
        .bind(content)
        .fetch_one(&self.db)
        .await
        .context("insert post")?;
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            r#"SELECT id, content, created_at FROM posts WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("select post by id")?;
        Ok(post)
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let rows = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, content, created_at
              FROM posts
             ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list posts")?;
        Ok(rows)
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        let res = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete post")?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

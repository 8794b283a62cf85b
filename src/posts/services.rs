use std::sync::Arc;

use tracing::info;

use crate::errors::{AppError, StoreError};
use crate::posts::repo::PostStore;
use crate::posts::repo_types::Post;
use crate::users::services::require;

pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, content: &str) -> Result<Post, AppError> {
        let content = require(content, "content")?;
        let post = self.store.insert(&content).await?;
        info!(post_id = post.id, "post created");
        Ok(post)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Post, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post with id {id} not found")))
    }

    pub async fn list(&self) -> Result<Vec<Post>, AppError> {
        Ok(self.store.list().await?)
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        self.store.delete_by_id(id).await.map_err(|e| match e {
            StoreError::NotFound => AppError::NotFound(format!("post with id {id} not found")),
            other => other.into(),
        })?;
        info!(post_id = id, "post deleted");
        Ok(())
    }
}

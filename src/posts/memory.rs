use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::errors::StoreError;
use crate::posts::repo::PostStore;
use crate::posts::repo_types::Post;

/// In-process `PostStore` for tests.
#[derive(Default)]
pub struct MemoryPostStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, Post>,
}

#[async_trait]
impl PostStore for MemoryPostStore {
    async fn insert(&self, content: &str) -> Result<Post, StoreError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let post = Post {
            id: inner.next_id,
            content: content.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, StoreError> {
        Ok(self.inner.lock().await.rows.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.inner.lock().await.rows.values().rev().cloned().collect())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), StoreError> {
        self.inner
            .lock()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

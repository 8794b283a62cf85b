use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Post record in the database.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq, Eq)]
pub struct Post {
    pub id: i64,
    pub content: String,
    #[serde(rename = "createdAt", with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime, // set by the database, never updated
}

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeletePostQuery {
    pub id: i64,
}

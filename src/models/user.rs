#[derive(Debug, Clone)]
pub struct User {
    pub id: Option<i64>,
    pub username: String,
    /// Argon2id hash in PHC string format, never the raw password.
    pub password_hash: String,
    pub created_at: String,
}

impl User {
    pub fn new(username: String, password_hash: String) -> Self {
        Self {
            id: None,
            username,
            password_hash,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row of the `users` table. Never serialized; handlers only hand out tokens.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewUser<'a> {
    pub name: Option<&'a str>,
    pub email: &'a str,
    pub password_hash: &'a str,
}

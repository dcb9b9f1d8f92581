use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Author {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    /// JSON object mapping platform name to profile URL.
    pub social_links: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct AuthorForm {
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub social_links: String,
}

impl Author {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Author {
            id: row.get("id")?,
            name: row.get("name")?,
            email: row.get("email")?,
            bio: row.get("bio")?,
            avatar_url: row.get("avatar_url")?,
            social_links: row.get("social_links")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM authors WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn find_by_email(pool: &DbPool, email: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM authors WHERE email = ?1",
            params![email],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(pool: &DbPool) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare("SELECT * FROM authors ORDER BY name") {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map([], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        conn.query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))
            .unwrap_or(0)
    }

    pub fn create(pool: &DbPool, form: &AuthorForm) -> Result<String, String> {
        let id = uuid::Uuid::new_v4().to_string();
        Self::upsert(pool, &id, form)?;
        Ok(id)
    }

    pub fn upsert(pool: &DbPool, id: &str, form: &AuthorForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO authors (id, name, email, bio, avatar_url, social_links)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                email = excluded.email,
                bio = excluded.bio,
                avatar_url = excluded.avatar_url,
                social_links = excluded.social_links,
                updated_at = CURRENT_TIMESTAMP",
            params![
                id,
                form.name,
                form.email,
                form.bio,
                form.avatar_url,
                form.social_links,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn update(pool: &DbPool, id: &str, form: &AuthorForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE authors SET name = ?1, email = ?2, bio = ?3, avatar_url = ?4,
             social_links = ?5, updated_at = CURRENT_TIMESTAMP WHERE id = ?6",
            params![
                form.name,
                form.email,
                form.bio,
                form.avatar_url,
                form.social_links,
                id,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM authors WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

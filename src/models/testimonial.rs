use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Testimonial {
    pub id: String,
    pub client_name: String,
    pub client_title: Option<String>,
    pub client_company: Option<String>,
    pub client_avatar_url: Option<String>,
    pub content: String,
    /// 1..=5, enforced by a CHECK constraint at the storage boundary.
    pub rating: i64,
    pub featured: bool,
    pub published: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct TestimonialForm {
    pub client_name: String,
    pub client_title: Option<String>,
    pub client_company: Option<String>,
    pub client_avatar_url: Option<String>,
    pub content: String,
    pub rating: i64,
    pub featured: bool,
    pub published: bool,
}

impl Testimonial {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Testimonial {
            id: row.get("id")?,
            client_name: row.get("client_name")?,
            client_title: row.get("client_title")?,
            client_company: row.get("client_company")?,
            client_avatar_url: row.get("client_avatar_url")?,
            content: row.get("content")?,
            rating: row.get("rating")?,
            featured: row.get("featured")?,
            published: row.get("published")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM testimonials WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(pool: &DbPool, published_only: bool, limit: i64, offset: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let sql = if published_only {
            "SELECT * FROM testimonials WHERE published = 1
             ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
        } else {
            "SELECT * FROM testimonials ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
        };
        let mut stmt = match conn.prepare(sql) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![limit, offset], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn published(pool: &DbPool, limit: i64, offset: i64) -> Vec<Self> {
        Self::list(pool, true, limit, offset)
    }

    pub fn count(pool: &DbPool, published_only: bool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        let sql = if published_only {
            "SELECT COUNT(*) FROM testimonials WHERE published = 1"
        } else {
            "SELECT COUNT(*) FROM testimonials"
        };
        conn.query_row(sql, [], |row| row.get(0)).unwrap_or(0)
    }

    pub fn create(pool: &DbPool, form: &TestimonialForm) -> Result<String, String> {
        let id = uuid::Uuid::new_v4().to_string();
        Self::upsert(pool, &id, form)?;
        Ok(id)
    }

    pub fn upsert(pool: &DbPool, id: &str, form: &TestimonialForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO testimonials (id, client_name, client_title, client_company,
                client_avatar_url, content, rating, featured, published)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             ON CONFLICT(id) DO UPDATE SET
                client_name = excluded.client_name,
                client_title = excluded.client_title,
                client_company = excluded.client_company,
                client_avatar_url = excluded.client_avatar_url,
                content = excluded.content,
                rating = excluded.rating,
                featured = excluded.featured,
                published = excluded.published,
                updated_at = CURRENT_TIMESTAMP",
            params![
                id,
                form.client_name,
                form.client_title,
                form.client_company,
                form.client_avatar_url,
                form.content,
                form.rating,
                form.featured,
                form.published,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn update(pool: &DbPool, id: &str, form: &TestimonialForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE testimonials SET client_name = ?1, client_title = ?2, client_company = ?3,
             client_avatar_url = ?4, content = ?5, rating = ?6, featured = ?7, published = ?8,
             updated_at = CURRENT_TIMESTAMP WHERE id = ?9",
            params![
                form.client_name,
                form.client_title,
                form.client_company,
                form.client_avatar_url,
                form.content,
                form.rating,
                form.featured,
                form.published,
                id,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM testimonials WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

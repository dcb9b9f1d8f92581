use chrono::NaiveDateTime;
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub order_index: i64,
    pub active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ServiceForm {
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub order_index: i64,
    pub active: bool,
}

impl Service {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Service {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            icon: row.get("icon")?,
            order_index: row.get("order_index")?,
            active: row.get("active")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM services WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn list(pool: &DbPool) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare("SELECT * FROM services ORDER BY order_index, title") {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map([], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn active(pool: &DbPool) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn
            .prepare("SELECT * FROM services WHERE active = 1 ORDER BY order_index, title")
        {
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
        conn.query_row("SELECT COUNT(*) FROM services", [], |row| row.get(0))
            .unwrap_or(0)
    }

    pub fn create(pool: &DbPool, form: &ServiceForm) -> Result<String, String> {
        let id = uuid::Uuid::new_v4().to_string();
        Self::upsert(pool, &id, form)?;
        Ok(id)
    }

    pub fn upsert(pool: &DbPool, id: &str, form: &ServiceForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO services (id, title, description, icon, order_index, active)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                icon = excluded.icon,
                order_index = excluded.order_index,
                active = excluded.active,
                updated_at = CURRENT_TIMESTAMP",
            params![
                id,
                form.title,
                form.description,
                form.icon,
                form.order_index,
                form.active,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn update(pool: &DbPool, id: &str, form: &ServiceForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE services SET title = ?1, description = ?2, icon = ?3, order_index = ?4,
             active = ?5, updated_at = CURRENT_TIMESTAMP WHERE id = ?6",
            params![
                form.title,
                form.description,
                form.icon,
                form.order_index,
                form.active,
                id,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM services WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

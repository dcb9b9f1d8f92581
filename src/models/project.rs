use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

/// Project status values allowed by the schema CHECK constraint.
pub const PROJECT_STATUSES: [&str; 3] = ["completed", "in_progress", "planned"];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Project {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub featured_image_url: Option<String>,
    /// JSON array of image URLs.
    pub gallery_images: String,
    pub client_name: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    /// JSON array of technology names.
    pub technologies: String,
    pub status: String,
    pub featured: bool,
    pub published: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct ProjectForm {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub featured_image_url: Option<String>,
    pub gallery_images: String,
    pub client_name: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: String,
    pub status: String,
    pub featured: bool,
    pub published: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl Project {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Project {
            id: row.get("id")?,
            title: row.get("title")?,
            slug: row.get("slug")?,
            description: row.get("description")?,
            content: row.get("content")?,
            featured_image_url: row.get("featured_image_url")?,
            gallery_images: row.get("gallery_images")?,
            client_name: row.get("client_name")?,
            project_url: row.get("project_url")?,
            github_url: row.get("github_url")?,
            technologies: row.get("technologies")?,
            status: row.get("status")?,
            featured: row.get("featured")?,
            published: row.get("published")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn find_by_id(pool: &DbPool, id: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM projects WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn find_by_slug(pool: &DbPool, slug: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM projects WHERE slug = ?1",
            params![slug],
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
            "SELECT * FROM projects WHERE published = 1
             ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
        } else {
            "SELECT * FROM projects ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
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
            "SELECT COUNT(*) FROM projects WHERE published = 1"
        } else {
            "SELECT COUNT(*) FROM projects"
        };
        conn.query_row(sql, [], |row| row.get(0)).unwrap_or(0)
    }

    pub fn create(pool: &DbPool, form: &ProjectForm) -> Result<String, String> {
        let id = uuid::Uuid::new_v4().to_string();
        Self::upsert(pool, &id, form)?;
        Ok(id)
    }

    pub fn upsert(pool: &DbPool, id: &str, form: &ProjectForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "INSERT INTO projects (id, title, slug, description, content, featured_image_url,
                gallery_images, client_name, project_url, github_url, technologies, status,
                featured, published, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                slug = excluded.slug,
                description = excluded.description,
                content = excluded.content,
                featured_image_url = excluded.featured_image_url,
                gallery_images = excluded.gallery_images,
                client_name = excluded.client_name,
                project_url = excluded.project_url,
                github_url = excluded.github_url,
                technologies = excluded.technologies,
                status = excluded.status,
                featured = excluded.featured,
                published = excluded.published,
                start_date = excluded.start_date,
                end_date = excluded.end_date,
                updated_at = CURRENT_TIMESTAMP",
            params![
                id,
                form.title,
                form.slug,
                form.description,
                form.content,
                form.featured_image_url,
                form.gallery_images,
                form.client_name,
                form.project_url,
                form.github_url,
                form.technologies,
                form.status,
                form.featured,
                form.published,
                form.start_date,
                form.end_date,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn update(pool: &DbPool, id: &str, form: &ProjectForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute(
            "UPDATE projects SET title=?1, slug=?2, description=?3, content=?4,
             featured_image_url=?5, gallery_images=?6, client_name=?7, project_url=?8,
             github_url=?9, technologies=?10, status=?11, featured=?12, published=?13,
             start_date=?14, end_date=?15, updated_at=CURRENT_TIMESTAMP WHERE id=?16",
            params![
                form.title,
                form.slug,
                form.description,
                form.content,
                form.featured_image_url,
                form.gallery_images,
                form.client_name,
                form.project_url,
                form.github_url,
                form.technologies,
                form.status,
                form.featured,
                form.published,
                form.start_date,
                form.end_date,
                id,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM projects WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

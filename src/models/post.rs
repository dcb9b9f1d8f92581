use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbPool;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub featured_image_url: Option<String>,
    pub category_id: Option<String>,
    pub author_id: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub published_at: Option<NaiveDateTime>,
    pub read_time: i64,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    /// JSON array of tag strings.
    pub tags: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Deserialize)]
pub struct BlogPostForm {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub featured_image_url: Option<String>,
    pub category_id: Option<String>,
    pub author_id: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub published_at: Option<NaiveDateTime>,
    pub read_time: i64,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: String,
}

impl BlogPost {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(BlogPost {
            id: row.get("id")?,
            title: row.get("title")?,
            slug: row.get("slug")?,
            excerpt: row.get("excerpt")?,
            content: row.get("content")?,
            featured_image_url: row.get("featured_image_url")?,
            category_id: row.get("category_id")?,
            author_id: row.get("author_id")?,
            featured: row.get("featured")?,
            published: row.get("published")?,
            published_at: row.get("published_at")?,
            read_time: row.get("read_time")?,
            meta_title: row.get("meta_title")?,
            meta_description: row.get("meta_description")?,
            tags: row.get("tags")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// A published post with no timestamp gets one at write time.
    fn effective_published_at(form: &BlogPostForm) -> Option<NaiveDateTime> {
        if form.published && form.published_at.is_none() {
            Some(Utc::now().naive_utc())
        } else {
            form.published_at
        }
    }

    pub fn find_by_id(pool: &DbPool, id: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM blog_posts WHERE id = ?1",
            params![id],
            Self::from_row,
        )
        .ok()
    }

    pub fn find_by_slug(pool: &DbPool, slug: &str) -> Option<Self> {
        let conn = pool.get().ok()?;
        conn.query_row(
            "SELECT * FROM blog_posts WHERE slug = ?1",
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
            "SELECT * FROM blog_posts WHERE published = 1
             ORDER BY published_at DESC, created_at DESC LIMIT ?1 OFFSET ?2"
        } else {
            "SELECT * FROM blog_posts
             ORDER BY published_at DESC, created_at DESC LIMIT ?1 OFFSET ?2"
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

    pub fn featured(pool: &DbPool, limit: i64) -> Vec<Self> {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return vec![],
        };
        let mut stmt = match conn.prepare(
            "SELECT * FROM blog_posts WHERE featured = 1 AND published = 1
             ORDER BY published_at DESC, created_at DESC LIMIT ?1",
        ) {
            Ok(s) => s,
            Err(_) => return vec![],
        };
        stmt.query_map(params![limit], Self::from_row)
            .map(|rows| rows.filter_map(|r| r.ok()).collect())
            .unwrap_or_default()
    }

    pub fn count(pool: &DbPool, published_only: bool) -> i64 {
        let conn = match pool.get() {
            Ok(c) => c,
            Err(_) => return 0,
        };
        let sql = if published_only {
            "SELECT COUNT(*) FROM blog_posts WHERE published = 1"
        } else {
            "SELECT COUNT(*) FROM blog_posts"
        };
        conn.query_row(sql, [], |row| row.get(0)).unwrap_or(0)
    }

    pub fn create(pool: &DbPool, form: &BlogPostForm) -> Result<String, String> {
        let id = uuid::Uuid::new_v4().to_string();
        Self::upsert(pool, &id, form)?;
        Ok(id)
    }

    pub fn upsert(pool: &DbPool, id: &str, form: &BlogPostForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        let published_at = Self::effective_published_at(form);

        conn.execute(
            "INSERT INTO blog_posts (id, title, slug, excerpt, content, featured_image_url,
                category_id, author_id, featured, published, published_at, read_time,
                meta_title, meta_description, tags)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                slug = excluded.slug,
                excerpt = excluded.excerpt,
                content = excluded.content,
                featured_image_url = excluded.featured_image_url,
                category_id = excluded.category_id,
                author_id = excluded.author_id,
                featured = excluded.featured,
                published = excluded.published,
                published_at = excluded.published_at,
                read_time = excluded.read_time,
                meta_title = excluded.meta_title,
                meta_description = excluded.meta_description,
                tags = excluded.tags,
                updated_at = CURRENT_TIMESTAMP",
            params![
                id,
                form.title,
                form.slug,
                form.excerpt,
                form.content,
                form.featured_image_url,
                form.category_id,
                form.author_id,
                form.featured,
                form.published,
                published_at,
                form.read_time,
                form.meta_title,
                form.meta_description,
                form.tags,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn update(pool: &DbPool, id: &str, form: &BlogPostForm) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        let published_at = Self::effective_published_at(form);

        conn.execute(
            "UPDATE blog_posts SET title=?1, slug=?2, excerpt=?3, content=?4,
             featured_image_url=?5, category_id=?6, author_id=?7, featured=?8,
             published=?9, published_at=?10, read_time=?11, meta_title=?12,
             meta_description=?13, tags=?14, updated_at=CURRENT_TIMESTAMP
             WHERE id=?15",
            params![
                form.title,
                form.slug,
                form.excerpt,
                form.content,
                form.featured_image_url,
                form.category_id,
                form.author_id,
                form.featured,
                form.published,
                published_at,
                form.read_time,
                form.meta_title,
                form.meta_description,
                form.tags,
                id,
            ],
        )
        .map_err(|e| e.to_string())?;
        Ok(())
    }

    pub fn delete(pool: &DbPool, id: &str) -> Result<(), String> {
        let conn = pool.get().map_err(|e| e.to_string())?;
        conn.execute("DELETE FROM blog_posts WHERE id = ?1", params![id])
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

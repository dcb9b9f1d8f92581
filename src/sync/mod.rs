//! One-way reconciliation: mirror entity tables from the external feed
//! into the local store.
//!
//! One best-effort pass, table by table. A fetch failure costs only that
//! table; a bad record costs only that record. Upserts are keyed by the
//! upstream id, so re-running with unchanged data is a no-op on every
//! synced field.

use std::fmt;

use log::{info, warn};
use serde_json::Value;

use crate::db::DbPool;
use crate::models::author::{Author, AuthorForm};
use crate::models::category::{Category, CategoryForm};
use crate::models::post::{BlogPost, BlogPostForm};
use crate::models::project::{Project, ProjectForm};
use crate::models::service::{Service, ServiceForm};
use crate::models::testimonial::{Testimonial, TestimonialForm};

pub mod records;
pub mod supabase;

use records::{
    json_array_text, json_object_text, parse_date, parse_timestamp, AuthorRecord, BlogPostRecord,
    CategoryRecord, ProjectRecord, ServiceRecord, TestimonialRecord,
};

pub const DEFAULT_CATEGORY_COLOR: &str = "#f59e0b";
pub const DEFAULT_READ_TIME: i64 = 5;

// ── Tables ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Categories,
    Authors,
    BlogPosts,
    Projects,
    Services,
    Testimonials,
}

impl Table {
    /// Sync order matters: categories and authors land before blog posts
    /// so post references can resolve in a single pass.
    pub const ALL: [Table; 6] = [
        Table::Categories,
        Table::Authors,
        Table::BlogPosts,
        Table::Projects,
        Table::Services,
        Table::Testimonials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Categories => "categories",
            Table::Authors => "authors",
            Table::BlogPosts => "blog_posts",
            Table::Projects => "projects",
            Table::Services => "services",
            Table::Testimonials => "testimonials",
        }
    }

    pub fn parse(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Feed seam ────────────────────────────────────────

/// Source of external records. The production implementation is
/// `supabase::SupabaseFeed`; tests drive the reconciler with fakes.
pub trait Feed {
    fn fetch(&self, table: Table) -> Result<Vec<Value>, String>;
}

// ── Report ───────────────────────────────────────────

#[derive(Debug, Default)]
pub struct TableStats {
    pub synced: i64,
    pub skipped: i64,
    pub log: Vec<String>,
}

impl TableStats {
    fn skip(&mut self, line: String) {
        warn!("{}", line);
        self.skipped += 1;
        self.log.push(line);
    }
}

#[derive(Debug)]
pub struct TableOutcome {
    pub table: Table,
    pub result: Result<TableStats, String>,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub tables: Vec<TableOutcome>,
}

impl SyncReport {
    pub fn outcome(&self, table: Table) -> Option<&TableOutcome> {
        self.tables.iter().find(|o| o.table == table)
    }

    pub fn all_ok(&self) -> bool {
        self.tables.iter().all(|o| o.result.is_ok())
    }
}

// ── Orchestrator ─────────────────────────────────────

pub fn run(pool: &DbPool, feed: &dyn Feed, tables: &[Table]) -> SyncReport {
    let mut report = SyncReport::default();

    for &table in tables {
        info!("Syncing {}...", table);
        let result = feed
            .fetch(table)
            .map(|data| sync_table(pool, table, &data));
        report.tables.push(TableOutcome { table, result });
    }

    report
}

fn sync_table(pool: &DbPool, table: Table, data: &[Value]) -> TableStats {
    match table {
        Table::Categories => sync_categories(pool, data),
        Table::Authors => sync_authors(pool, data),
        Table::BlogPosts => sync_blog_posts(pool, data),
        Table::Projects => sync_projects(pool, data),
        Table::Services => sync_services(pool, data),
        Table::Testimonials => sync_testimonials(pool, data),
    }
}

// ── Per-entity upsert loops ──────────────────────────

fn sync_categories(pool: &DbPool, data: &[Value]) -> TableStats {
    let mut stats = TableStats::default();
    for item in data {
        let record: CategoryRecord = match serde_json::from_value(item.clone()) {
            Ok(r) => r,
            Err(e) => {
                stats.skip(format!("Skipped category record: {}", e));
                continue;
            }
        };
        let form = CategoryForm {
            name: record.name,
            slug: record.slug,
            description: record.description,
            color: record
                .color
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
        };
        match Category::upsert(pool, &record.id, &form) {
            Ok(()) => stats.synced += 1,
            Err(e) => stats.skip(format!("Skipped category {}: {}", record.id, e)),
        }
    }
    stats
}

fn sync_authors(pool: &DbPool, data: &[Value]) -> TableStats {
    let mut stats = TableStats::default();
    for item in data {
        let record: AuthorRecord = match serde_json::from_value(item.clone()) {
            Ok(r) => r,
            Err(e) => {
                stats.skip(format!("Skipped author record: {}", e));
                continue;
            }
        };
        let form = AuthorForm {
            name: record.name,
            email: record.email,
            bio: record.bio,
            avatar_url: record.avatar_url,
            social_links: json_object_text(record.social_links),
        };
        match Author::upsert(pool, &record.id, &form) {
            Ok(()) => stats.synced += 1,
            Err(e) => stats.skip(format!("Skipped author {}: {}", record.id, e)),
        }
    }
    stats
}

fn sync_blog_posts(pool: &DbPool, data: &[Value]) -> TableStats {
    let mut stats = TableStats::default();
    for item in data {
        let record: BlogPostRecord = match serde_json::from_value(item.clone()) {
            Ok(r) => r,
            Err(e) => {
                stats.skip(format!("Skipped blog post record: {}", e));
                continue;
            }
        };

        // A reference to a row we never received resolves to null, not a
        // failed record.
        let category_id = record
            .category_id
            .filter(|id| Category::find_by_id(pool, id).is_some());
        let author_id = record
            .author_id
            .filter(|id| Author::find_by_id(pool, id).is_some());

        let form = BlogPostForm {
            title: record.title,
            slug: record.slug,
            excerpt: record.excerpt,
            content: record.content,
            featured_image_url: record.featured_image_url,
            category_id,
            author_id,
            featured: record.featured.unwrap_or(false),
            published: record.published.unwrap_or(false),
            published_at: record.published_at.as_deref().and_then(parse_timestamp),
            read_time: record.read_time.unwrap_or(DEFAULT_READ_TIME),
            meta_title: record.meta_title,
            meta_description: record.meta_description,
            tags: json_array_text(record.tags),
        };
        match BlogPost::upsert(pool, &record.id, &form) {
            Ok(()) => stats.synced += 1,
            Err(e) => stats.skip(format!("Skipped blog post {}: {}", record.id, e)),
        }
    }
    stats
}

fn sync_projects(pool: &DbPool, data: &[Value]) -> TableStats {
    let mut stats = TableStats::default();
    for item in data {
        let record: ProjectRecord = match serde_json::from_value(item.clone()) {
            Ok(r) => r,
            Err(e) => {
                stats.skip(format!("Skipped project record: {}", e));
                continue;
            }
        };
        let form = ProjectForm {
            title: record.title,
            slug: record.slug,
            description: record.description,
            content: record.content,
            featured_image_url: record.featured_image_url,
            gallery_images: json_array_text(record.gallery_images),
            client_name: record.client_name,
            project_url: record.project_url,
            github_url: record.github_url,
            technologies: json_array_text(record.technologies),
            status: record.status.unwrap_or_else(|| "completed".to_string()),
            featured: record.featured.unwrap_or(false),
            published: record.published.unwrap_or(false),
            start_date: record.start_date.as_deref().and_then(parse_date),
            end_date: record.end_date.as_deref().and_then(parse_date),
        };
        match Project::upsert(pool, &record.id, &form) {
            Ok(()) => stats.synced += 1,
            Err(e) => stats.skip(format!("Skipped project {}: {}", record.id, e)),
        }
    }
    stats
}

fn sync_services(pool: &DbPool, data: &[Value]) -> TableStats {
    let mut stats = TableStats::default();
    for item in data {
        let record: ServiceRecord = match serde_json::from_value(item.clone()) {
            Ok(r) => r,
            Err(e) => {
                stats.skip(format!("Skipped service record: {}", e));
                continue;
            }
        };
        let form = ServiceForm {
            title: record.title,
            description: record.description,
            icon: record.icon,
            order_index: record.order_index.unwrap_or(0),
            active: record.active.unwrap_or(true),
        };
        match Service::upsert(pool, &record.id, &form) {
            Ok(()) => stats.synced += 1,
            Err(e) => stats.skip(format!("Skipped service {}: {}", record.id, e)),
        }
    }
    stats
}

fn sync_testimonials(pool: &DbPool, data: &[Value]) -> TableStats {
    let mut stats = TableStats::default();
    for item in data {
        let record: TestimonialRecord = match serde_json::from_value(item.clone()) {
            Ok(r) => r,
            Err(e) => {
                stats.skip(format!("Skipped testimonial record: {}", e));
                continue;
            }
        };
        let form = TestimonialForm {
            client_name: record.client_name,
            client_title: record.client_title,
            client_company: record.client_company,
            client_avatar_url: record.client_avatar_url,
            content: record.content,
            rating: record.rating.unwrap_or(5),
            featured: record.featured.unwrap_or(false),
            published: record.published.unwrap_or(false),
        };
        match Testimonial::upsert(pool, &record.id, &form) {
            Ok(()) => stats.synced += 1,
            Err(e) => stats.skip(format!("Skipped testimonial {}: {}", record.id, e)),
        }
    }
    stats
}

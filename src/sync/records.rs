//! Typed views of the loosely-shaped records the feed returns.
//!
//! Required fields are plain; everything the upstream may omit is an
//! `Option`. A record that fails to deserialize is skipped by the caller,
//! not written partially.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorRecord {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub social_links: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct BlogPostRecord {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub featured_image_url: Option<String>,
    pub category_id: Option<String>,
    pub author_id: Option<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub published_at: Option<String>,
    pub read_time: Option<i64>,
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub tags: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub featured_image_url: Option<String>,
    pub gallery_images: Option<Value>,
    pub client_name: Option<String>,
    pub project_url: Option<String>,
    pub github_url: Option<String>,
    pub technologies: Option<Value>,
    pub status: Option<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: Option<String>,
    pub order_index: Option<i64>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TestimonialRecord {
    pub id: String,
    pub client_name: String,
    pub client_title: Option<String>,
    pub client_company: Option<String>,
    pub client_avatar_url: Option<String>,
    pub content: String,
    pub rating: Option<i64>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

/// JSON-valued column text, defaulting to an empty array.
pub fn json_array_text(value: Option<Value>) -> String {
    match value {
        Some(v) => serde_json::to_string(&v).unwrap_or_else(|_| "[]".to_string()),
        None => "[]".to_string(),
    }
}

/// JSON-valued column text, defaulting to an empty object.
pub fn json_object_text(value: Option<Value>) -> String {
    match value {
        Some(v) => serde_json::to_string(&v).unwrap_or_else(|_| "{}".to_string()),
        None => "{}".to_string(),
    }
}

/// Parse an upstream timestamp. Supabase emits RFC 3339; a bare naive
/// timestamp is accepted too. Unparseable values come back as None.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#![cfg(test)]

use std::collections::HashMap;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use serde_json::{json, Value};

use crate::db::{run_migrations, DbPool};
use crate::models::author::{Author, AuthorForm};
use crate::models::category::{Category, CategoryForm};
use crate::models::post::{BlogPost, BlogPostForm};
use crate::models::project::{Project, ProjectForm};
use crate::models::service::{Service, ServiceForm};
use crate::models::testimonial::{Testimonial, TestimonialForm};
use crate::sync::records::{json_array_text, json_object_text, parse_date, parse_timestamp};
use crate::sync::supabase::SupabaseConfig;
use crate::sync::{self, Feed, Table, DEFAULT_CATEGORY_COLOR, DEFAULT_READ_TIME};

/// Atomic counter for unique shared-cache DB names so parallel tests don't collide.
static TEST_DB_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Fresh in-memory SQLite pool with migrations applied. Named shared-cache
/// DB so every pooled connection sees the same data.
fn test_pool() -> DbPool {
    let id = TEST_DB_COUNTER.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    let uri = format!("file:testdb_{}?mode=memory&cache=shared", id);
    let manager = SqliteConnectionManager::file(uri)
        .with_init(|c| c.execute_batch("PRAGMA foreign_keys=ON;"));
    let pool = Pool::builder()
        .max_size(2)
        .build(manager)
        .expect("Failed to create test pool");
    run_migrations(&pool).expect("Failed to run migrations");
    pool
}

/// In-memory `Feed`: per-table canned responses. Tables without an entry
/// return an empty batch.
struct FakeFeed {
    responses: HashMap<&'static str, Result<Vec<Value>, String>>,
}

impl FakeFeed {
    fn new() -> Self {
        FakeFeed {
            responses: HashMap::new(),
        }
    }

    fn ok(mut self, table: Table, records: Vec<Value>) -> Self {
        self.responses.insert(table.as_str(), Ok(records));
        self
    }

    fn err(mut self, table: Table, msg: &str) -> Self {
        self.responses.insert(table.as_str(), Err(msg.to_string()));
        self
    }
}

impl Feed for FakeFeed {
    fn fetch(&self, table: Table) -> Result<Vec<Value>, String> {
        self.responses
            .get(table.as_str())
            .cloned()
            .unwrap_or_else(|| Ok(vec![]))
    }
}

fn make_category_form(name: &str, slug: &str) -> CategoryForm {
    CategoryForm {
        name: name.to_string(),
        slug: slug.to_string(),
        description: None,
        color: "#112233".to_string(),
    }
}

fn make_post_form(title: &str, slug: &str) -> BlogPostForm {
    BlogPostForm {
        title: title.to_string(),
        slug: slug.to_string(),
        excerpt: None,
        content: "<p>test</p>".to_string(),
        featured_image_url: None,
        category_id: None,
        author_id: None,
        featured: false,
        published: false,
        published_at: None,
        read_time: 5,
        meta_title: None,
        meta_description: None,
        tags: "[]".to_string(),
    }
}

// ═══════════════════════════════════════════════════════════
// Categories
// ═══════════════════════════════════════════════════════════

#[test]
fn category_crud() {
    let pool = test_pool();

    let id = Category::create(&pool, &make_category_form("Design", "design")).unwrap();

    let cat = Category::find_by_id(&pool, &id).unwrap();
    assert_eq!(cat.name, "Design");
    assert_eq!(cat.color, "#112233");
    assert_eq!(Category::find_by_slug(&pool, "design").unwrap().id, id);

    let mut form = make_category_form("Design & Brand", "design");
    form.description = Some("Brand work".to_string());
    Category::update(&pool, &id, &form).unwrap();
    let updated = Category::find_by_id(&pool, &id).unwrap();
    assert_eq!(updated.name, "Design & Brand");
    assert_eq!(updated.description.as_deref(), Some("Brand work"));

    assert_eq!(Category::count(&pool), 1);
    Category::delete(&pool, &id).unwrap();
    assert!(Category::find_by_id(&pool, &id).is_none());
    assert_eq!(Category::count(&pool), 0);
}

#[test]
fn category_unique_name_and_slug() {
    let pool = test_pool();
    Category::create(&pool, &make_category_form("Design", "design")).unwrap();

    assert!(Category::create(&pool, &make_category_form("Design", "design-2")).is_err());
    assert!(Category::create(&pool, &make_category_form("Branding", "design")).is_err());
    assert_eq!(Category::count(&pool), 1);
}

#[test]
fn category_list_ordered_by_name() {
    let pool = test_pool();
    Category::create(&pool, &make_category_form("Web", "web")).unwrap();
    Category::create(&pool, &make_category_form("Branding", "branding")).unwrap();
    Category::create(&pool, &make_category_form("Motion", "motion")).unwrap();

    let names: Vec<String> = Category::list(&pool).into_iter().map(|c| c.name).collect();
    assert_eq!(names, vec!["Branding", "Motion", "Web"]);
}

// ═══════════════════════════════════════════════════════════
// Authors
// ═══════════════════════════════════════════════════════════

fn make_author_form(name: &str, email: &str) -> AuthorForm {
    AuthorForm {
        name: name.to_string(),
        email: email.to_string(),
        bio: None,
        avatar_url: None,
        social_links: "{}".to_string(),
    }
}

#[test]
fn author_crud() {
    let pool = test_pool();

    let id = Author::create(&pool, &make_author_form("Ada", "ada@example.com")).unwrap();
    let author = Author::find_by_id(&pool, &id).unwrap();
    assert_eq!(author.name, "Ada");
    assert_eq!(author.social_links, "{}");
    assert_eq!(Author::find_by_email(&pool, "ada@example.com").unwrap().id, id);

    let mut form = make_author_form("Ada L.", "ada@example.com");
    form.bio = Some("Writes about design systems".to_string());
    Author::update(&pool, &id, &form).unwrap();
    assert_eq!(Author::find_by_id(&pool, &id).unwrap().name, "Ada L.");

    Author::delete(&pool, &id).unwrap();
    assert_eq!(Author::count(&pool), 0);
}

#[test]
fn author_unique_email() {
    let pool = test_pool();
    Author::create(&pool, &make_author_form("Ada", "ada@example.com")).unwrap();
    assert!(Author::create(&pool, &make_author_form("Grace", "ada@example.com")).is_err());
    assert_eq!(Author::count(&pool), 1);
}

// ═══════════════════════════════════════════════════════════
// Blog posts
// ═══════════════════════════════════════════════════════════

#[test]
fn post_crud() {
    let pool = test_pool();

    let id = BlogPost::create(&pool, &make_post_form("Hello", "hello")).unwrap();
    let post = BlogPost::find_by_id(&pool, &id).unwrap();
    assert_eq!(post.title, "Hello");
    assert!(!post.published);
    assert!(post.published_at.is_none());
    assert_eq!(BlogPost::find_by_slug(&pool, "hello").unwrap().id, id);

    let mut form = make_post_form("Hello again", "hello");
    form.read_time = 8;
    BlogPost::update(&pool, &id, &form).unwrap();
    let updated = BlogPost::find_by_id(&pool, &id).unwrap();
    assert_eq!(updated.title, "Hello again");
    assert_eq!(updated.read_time, 8);

    BlogPost::delete(&pool, &id).unwrap();
    assert_eq!(BlogPost::count(&pool, false), 0);
}

#[test]
fn post_published_at_defaults_at_write() {
    let pool = test_pool();

    // Published with no timestamp gets one.
    let mut form = make_post_form("Launch", "launch");
    form.published = true;
    let id = BlogPost::create(&pool, &form).unwrap();
    assert!(BlogPost::find_by_id(&pool, &id).unwrap().published_at.is_some());

    // Draft with no timestamp stays empty.
    let draft_id = BlogPost::create(&pool, &make_post_form("Draft", "draft")).unwrap();
    assert!(BlogPost::find_by_id(&pool, &draft_id).unwrap().published_at.is_none());

    // An explicit timestamp is kept as given.
    let ts = parse_timestamp("2024-03-01T10:00:00+00:00").unwrap();
    let mut form = make_post_form("Dated", "dated");
    form.published = true;
    form.published_at = Some(ts);
    let dated_id = BlogPost::create(&pool, &form).unwrap();
    assert_eq!(
        BlogPost::find_by_id(&pool, &dated_id).unwrap().published_at,
        Some(ts)
    );
}

#[test]
fn post_published_and_featured_subsets() {
    let pool = test_pool();

    for i in 0..3 {
        let mut form = make_post_form(&format!("Post {}", i), &format!("post-{}", i));
        form.published = true;
        form.published_at = parse_timestamp(&format!("2024-01-0{}T00:00:00+00:00", i + 1));
        form.featured = i == 0;
        BlogPost::create(&pool, &form).unwrap();
    }
    BlogPost::create(&pool, &make_post_form("Draft", "a-draft")).unwrap();

    assert_eq!(BlogPost::count(&pool, false), 4);
    assert_eq!(BlogPost::count(&pool, true), 3);

    // Newest first.
    let published = BlogPost::published(&pool, 10, 0);
    assert_eq!(published.len(), 3);
    assert_eq!(published[0].slug, "post-2");

    let featured = BlogPost::featured(&pool, 10);
    assert_eq!(featured.len(), 1);
    assert_eq!(featured[0].slug, "post-0");
}

#[test]
fn post_references_null_on_delete() {
    let pool = test_pool();

    let cat_id = Category::create(&pool, &make_category_form("Design", "design")).unwrap();
    let author_id = Author::create(&pool, &make_author_form("Ada", "ada@example.com")).unwrap();

    let mut form = make_post_form("Hello", "hello");
    form.category_id = Some(cat_id.clone());
    form.author_id = Some(author_id.clone());
    let post_id = BlogPost::create(&pool, &form).unwrap();

    Category::delete(&pool, &cat_id).unwrap();
    Author::delete(&pool, &author_id).unwrap();

    // The post survives with both references cleared, no cascade.
    let post = BlogPost::find_by_id(&pool, &post_id).unwrap();
    assert!(post.category_id.is_none());
    assert!(post.author_id.is_none());
}

#[test]
fn post_unique_slug() {
    let pool = test_pool();
    BlogPost::create(&pool, &make_post_form("One", "same")).unwrap();
    assert!(BlogPost::create(&pool, &make_post_form("Two", "same")).is_err());
}

// ═══════════════════════════════════════════════════════════
// Projects
// ═══════════════════════════════════════════════════════════

fn make_project_form(title: &str, slug: &str) -> ProjectForm {
    ProjectForm {
        title: title.to_string(),
        slug: slug.to_string(),
        description: None,
        content: None,
        featured_image_url: None,
        gallery_images: "[]".to_string(),
        client_name: None,
        project_url: None,
        github_url: None,
        technologies: "[]".to_string(),
        status: "completed".to_string(),
        featured: false,
        published: false,
        start_date: None,
        end_date: None,
    }
}

#[test]
fn project_crud() {
    let pool = test_pool();

    let mut form = make_project_form("Site relaunch", "site-relaunch");
    form.status = "in_progress".to_string();
    form.start_date = parse_date("2024-02-01");
    let id = Project::create(&pool, &form).unwrap();

    let project = Project::find_by_id(&pool, &id).unwrap();
    assert_eq!(project.status, "in_progress");
    assert_eq!(project.start_date, parse_date("2024-02-01"));
    assert_eq!(Project::find_by_slug(&pool, "site-relaunch").unwrap().id, id);

    form.status = "completed".to_string();
    form.end_date = parse_date("2024-06-30");
    Project::update(&pool, &id, &form).unwrap();
    assert_eq!(Project::find_by_id(&pool, &id).unwrap().status, "completed");

    Project::delete(&pool, &id).unwrap();
    assert_eq!(Project::count(&pool, false), 0);
}

#[test]
fn project_status_constrained_to_enum() {
    let pool = test_pool();

    for (i, status) in crate::models::project::PROJECT_STATUSES.iter().enumerate() {
        let mut form = make_project_form(&format!("P{}", i), &format!("p-{}", i));
        form.status = status.to_string();
        assert!(Project::create(&pool, &form).is_ok());
    }

    let mut form = make_project_form("Bad", "bad");
    form.status = "cancelled".to_string();
    assert!(Project::create(&pool, &form).is_err());
    assert!(Project::find_by_slug(&pool, "bad").is_none());
}

#[test]
fn project_published_subset() {
    let pool = test_pool();
    let mut form = make_project_form("Public", "public");
    form.published = true;
    Project::create(&pool, &form).unwrap();
    Project::create(&pool, &make_project_form("Hidden", "hidden")).unwrap();

    assert_eq!(Project::published(&pool, 10, 0).len(), 1);
    assert_eq!(Project::count(&pool, true), 1);
}

// ═══════════════════════════════════════════════════════════
// Services
// ═══════════════════════════════════════════════════════════

fn make_service_form(title: &str, order_index: i64, active: bool) -> ServiceForm {
    ServiceForm {
        title: title.to_string(),
        description: "A service".to_string(),
        icon: None,
        order_index,
        active,
    }
}

#[test]
fn service_ordering_by_index_then_title() {
    let pool = test_pool();
    Service::create(&pool, &make_service_form("Strategy", 2, true)).unwrap();
    Service::create(&pool, &make_service_form("Design", 1, true)).unwrap();
    Service::create(&pool, &make_service_form("Branding", 1, true)).unwrap();

    let titles: Vec<String> = Service::list(&pool).into_iter().map(|s| s.title).collect();
    assert_eq!(titles, vec!["Branding", "Design", "Strategy"]);
}

#[test]
fn service_active_subset() {
    let pool = test_pool();
    Service::create(&pool, &make_service_form("Live", 0, true)).unwrap();
    Service::create(&pool, &make_service_form("Retired", 1, false)).unwrap();

    let active = Service::active(&pool);
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].title, "Live");
    assert_eq!(Service::count(&pool), 2);
}

// ═══════════════════════════════════════════════════════════
// Testimonials
// ═══════════════════════════════════════════════════════════

fn make_testimonial_form(client: &str, rating: i64) -> TestimonialForm {
    TestimonialForm {
        client_name: client.to_string(),
        client_title: None,
        client_company: None,
        client_avatar_url: None,
        content: "Great work".to_string(),
        rating,
        featured: false,
        published: false,
    }
}

#[test]
fn testimonial_crud() {
    let pool = test_pool();
    let id = Testimonial::create(&pool, &make_testimonial_form("Acme", 4)).unwrap();
    assert_eq!(Testimonial::find_by_id(&pool, &id).unwrap().rating, 4);

    let mut form = make_testimonial_form("Acme Inc", 5);
    form.published = true;
    Testimonial::update(&pool, &id, &form).unwrap();
    let updated = Testimonial::find_by_id(&pool, &id).unwrap();
    assert_eq!(updated.client_name, "Acme Inc");
    assert_eq!(Testimonial::published(&pool, 10, 0).len(), 1);

    Testimonial::delete(&pool, &id).unwrap();
    assert_eq!(Testimonial::count(&pool, false), 0);
}

#[test]
fn testimonial_rating_rejected_outside_range() {
    let pool = test_pool();

    // Rejected at the storage boundary, never clamped.
    assert!(Testimonial::create(&pool, &make_testimonial_form("Zero", 0)).is_err());
    assert!(Testimonial::create(&pool, &make_testimonial_form("Six", 6)).is_err());
    assert_eq!(Testimonial::count(&pool, false), 0);

    assert!(Testimonial::create(&pool, &make_testimonial_form("One", 1)).is_ok());
    assert!(Testimonial::create(&pool, &make_testimonial_form("Five", 5)).is_ok());
    assert_eq!(Testimonial::count(&pool, false), 2);
}

// ═══════════════════════════════════════════════════════════
// Sync: upserts and defaults
// ═══════════════════════════════════════════════════════════

#[test]
fn sync_inserts_with_defaults() {
    let pool = test_pool();
    let feed = FakeFeed::new()
        .ok(
            Table::Categories,
            vec![json!({"id": "c1", "name": "Design", "slug": "design"})],
        )
        .ok(
            Table::Services,
            vec![json!({"id": "s1", "title": "Branding", "description": "Brand design"})],
        )
        .ok(
            Table::Testimonials,
            vec![json!({"id": "t1", "client_name": "Acme", "content": "Great"})],
        );

    let report = sync::run(
        &pool,
        &feed,
        &[Table::Categories, Table::Services, Table::Testimonials],
    );
    assert!(report.all_ok());

    let cat = Category::find_by_id(&pool, "c1").unwrap();
    assert_eq!(cat.color, DEFAULT_CATEGORY_COLOR);

    let service = Service::find_by_id(&pool, "s1").unwrap();
    assert!(service.active);
    assert_eq!(service.order_index, 0);

    let testimonial = Testimonial::find_by_id(&pool, "t1").unwrap();
    assert_eq!(testimonial.rating, 5);
    assert!(!testimonial.featured);
}

#[test]
fn sync_overwrites_existing_row() {
    let pool = test_pool();

    let first = FakeFeed::new().ok(
        Table::Categories,
        vec![json!({"id": "c1", "name": "Design", "slug": "design", "color": "#000000"})],
    );
    sync::run(&pool, &first, &[Table::Categories]);

    let second = FakeFeed::new().ok(
        Table::Categories,
        vec![json!({"id": "c1", "name": "Design Studio", "slug": "design-studio"})],
    );
    sync::run(&pool, &second, &[Table::Categories]);

    assert_eq!(Category::count(&pool), 1);
    let cat = Category::find_by_id(&pool, "c1").unwrap();
    assert_eq!(cat.name, "Design Studio");
    assert_eq!(cat.slug, "design-studio");
    // Omitted color falls back to the default, replacing the old value.
    assert_eq!(cat.color, DEFAULT_CATEGORY_COLOR);
}

#[test]
fn sync_idempotent_on_unchanged_payload() {
    let pool = test_pool();

    let payload = || {
        FakeFeed::new()
            .ok(
                Table::Categories,
                vec![json!({"id": "c1", "name": "Design", "slug": "design"})],
            )
            .ok(
                Table::BlogPosts,
                vec![json!({
                    "id": "p1",
                    "title": "Hello",
                    "slug": "hello",
                    "content": "...",
                    "category_id": "c1",
                    "published": true,
                    "published_at": "2024-03-01T10:00:00+00:00",
                    "tags": ["design", "intro"]
                })],
            )
    };

    let tables = [Table::Categories, Table::BlogPosts];
    assert!(sync::run(&pool, &payload(), &tables).all_ok());
    let post_before = BlogPost::find_by_id(&pool, "p1").unwrap();

    assert!(sync::run(&pool, &payload(), &tables).all_ok());
    let post_after = BlogPost::find_by_id(&pool, "p1").unwrap();

    assert_eq!(Category::count(&pool), 1);
    assert_eq!(BlogPost::count(&pool, false), 1);
    assert_eq!(post_after.title, post_before.title);
    assert_eq!(post_after.slug, post_before.slug);
    assert_eq!(post_after.category_id, post_before.category_id);
    assert_eq!(post_after.published_at, post_before.published_at);
    assert_eq!(post_after.read_time, post_before.read_time);
    assert_eq!(post_after.tags, post_before.tags);
    assert_eq!(post_after.created_at, post_before.created_at);
}

#[test]
fn sync_resolves_references_with_null_fallback() {
    let pool = test_pool();

    let feed = FakeFeed::new()
        .ok(
            Table::Categories,
            vec![json!({"id": "c1", "name": "Design", "slug": "design"})],
        )
        .ok(
            Table::BlogPosts,
            vec![
                json!({"id": "p1", "title": "Linked", "slug": "linked",
                       "content": "...", "category_id": "c1"}),
                json!({"id": "p2", "title": "Orphan", "slug": "orphan",
                       "content": "...", "category_id": "missing", "author_id": "missing"}),
            ],
        );

    let report = sync::run(&pool, &feed, &[Table::Categories, Table::BlogPosts]);
    let stats = report
        .outcome(Table::BlogPosts)
        .unwrap()
        .result
        .as_ref()
        .unwrap();
    assert_eq!(stats.synced, 2);
    assert_eq!(stats.skipped, 0);

    assert_eq!(
        BlogPost::find_by_id(&pool, "p1").unwrap().category_id.as_deref(),
        Some("c1")
    );
    let orphan = BlogPost::find_by_id(&pool, "p2").unwrap();
    assert!(orphan.category_id.is_none());
    assert!(orphan.author_id.is_none());
}

#[test]
fn sync_partial_failure_isolation() {
    let pool = test_pool();

    let feed = FakeFeed::new()
        .ok(
            Table::Categories,
            vec![json!({"id": "c1", "name": "Design", "slug": "design"})],
        )
        .err(Table::Authors, "Supabase API error (500)")
        .ok(
            Table::Services,
            vec![json!({"id": "s1", "title": "Branding", "description": "Brand design"})],
        );

    let report = sync::run(
        &pool,
        &feed,
        &[Table::Categories, Table::Authors, Table::Services],
    );

    assert!(!report.all_ok());
    assert!(report.outcome(Table::Categories).unwrap().result.is_ok());
    assert!(report.outcome(Table::Services).unwrap().result.is_ok());
    let err = report
        .outcome(Table::Authors)
        .unwrap()
        .result
        .as_ref()
        .unwrap_err();
    assert!(err.contains("500"));

    // The failed table cost nothing else.
    assert_eq!(Category::count(&pool), 1);
    assert_eq!(Service::count(&pool), 1);
    assert_eq!(Author::count(&pool), 0);
}

#[test]
fn sync_skips_malformed_record_and_continues() {
    let pool = test_pool();

    let feed = FakeFeed::new().ok(
        Table::Categories,
        vec![
            json!({"id": "c1", "slug": "no-name"}),
            json!({"id": "c2", "name": "Good", "slug": "good"}),
        ],
    );

    let report = sync::run(&pool, &feed, &[Table::Categories]);
    let stats = report
        .outcome(Table::Categories)
        .unwrap()
        .result
        .as_ref()
        .unwrap();
    assert_eq!(stats.synced, 1);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.log.len(), 1);

    assert!(Category::find_by_id(&pool, "c1").is_none());
    assert!(Category::find_by_id(&pool, "c2").is_some());
}

#[test]
fn sync_skips_record_rejected_by_storage() {
    let pool = test_pool();

    // Second record collides on the unique slug under a different id;
    // third has a rating the CHECK constraint refuses.
    let feed = FakeFeed::new()
        .ok(
            Table::Categories,
            vec![
                json!({"id": "c1", "name": "Design", "slug": "design"}),
                json!({"id": "c2", "name": "Other", "slug": "design"}),
            ],
        )
        .ok(
            Table::Testimonials,
            vec![json!({"id": "t1", "client_name": "Acme", "content": "ok", "rating": 9})],
        );

    let report = sync::run(&pool, &feed, &[Table::Categories, Table::Testimonials]);

    let cat_stats = report
        .outcome(Table::Categories)
        .unwrap()
        .result
        .as_ref()
        .unwrap();
    assert_eq!(cat_stats.synced, 1);
    assert_eq!(cat_stats.skipped, 1);
    assert_eq!(Category::count(&pool), 1);

    let t_stats = report
        .outcome(Table::Testimonials)
        .unwrap()
        .result
        .as_ref()
        .unwrap();
    assert_eq!(t_stats.synced, 0);
    assert_eq!(t_stats.skipped, 1);
    assert!(Testimonial::find_by_id(&pool, "t1").is_none());
}

#[test]
fn sync_projects_and_authors_full_fields() {
    let pool = test_pool();

    let feed = FakeFeed::new()
        .ok(
            Table::Authors,
            vec![json!({
                "id": "a1",
                "name": "Ada",
                "email": "ada@example.com",
                "social_links": {"twitter": "https://twitter.com/ada"}
            })],
        )
        .ok(
            Table::Projects,
            vec![json!({
                "id": "pr1",
                "title": "Relaunch",
                "slug": "relaunch",
                "technologies": ["rust", "sqlite"],
                "status": "planned",
                "start_date": "2024-02-01"
            })],
        );

    assert!(sync::run(&pool, &feed, &[Table::Authors, Table::Projects]).all_ok());

    let author = Author::find_by_id(&pool, "a1").unwrap();
    let links: Value = serde_json::from_str(&author.social_links).unwrap();
    assert_eq!(links["twitter"], "https://twitter.com/ada");

    let project = Project::find_by_id(&pool, "pr1").unwrap();
    assert_eq!(project.status, "planned");
    assert_eq!(project.gallery_images, "[]");
    assert_eq!(project.start_date, parse_date("2024-02-01"));
    let techs: Vec<String> = serde_json::from_str(&project.technologies).unwrap();
    assert_eq!(techs, vec!["rust", "sqlite"]);
}

#[test]
fn sync_end_to_end_scenario() {
    let pool = test_pool();

    let feed = FakeFeed::new()
        .ok(
            Table::Categories,
            vec![json!({"id": "c1", "name": "Design", "slug": "design"})],
        )
        .ok(
            Table::BlogPosts,
            vec![json!({"id": "p1", "title": "Hello", "slug": "hello",
                        "content": "...", "category_id": "c1"})],
        );

    let report = sync::run(&pool, &feed, &Table::ALL);
    assert!(report.all_ok());

    let cat = Category::find_by_id(&pool, "c1").unwrap();
    assert_eq!(cat.color, "#f59e0b");

    let post = BlogPost::find_by_id(&pool, "p1").unwrap();
    assert_eq!(post.category_id.as_deref(), Some("c1"));
    assert!(post.author_id.is_none());
    assert_eq!(post.tags, "[]");
    assert_eq!(post.read_time, DEFAULT_READ_TIME);
    assert!(!post.published);
    assert!(post.published_at.is_none());
}

// ═══════════════════════════════════════════════════════════
// Sync: plumbing
// ═══════════════════════════════════════════════════════════

#[test]
fn table_names_round_trip() {
    for table in Table::ALL {
        assert_eq!(Table::parse(table.as_str()), Some(table));
    }
    assert_eq!(Table::parse("invoices"), None);

    // Referenced tables come before blog_posts so links resolve in one pass.
    let order: Vec<&str> = Table::ALL.iter().map(|t| t.as_str()).collect();
    assert!(
        order.iter().position(|t| *t == "categories").unwrap()
            < order.iter().position(|t| *t == "blog_posts").unwrap()
    );
    assert!(
        order.iter().position(|t| *t == "authors").unwrap()
            < order.iter().position(|t| *t == "blog_posts").unwrap()
    );
}

#[test]
fn record_helpers() {
    assert_eq!(json_array_text(None), "[]");
    assert_eq!(json_array_text(Some(json!(["a", "b"]))), r#"["a","b"]"#);
    assert_eq!(json_object_text(None), "{}");
    assert_eq!(json_object_text(Some(json!({"k": "v"}))), r#"{"k":"v"}"#);

    let ts = parse_timestamp("2024-03-01T10:00:00+00:00").unwrap();
    assert_eq!(ts.to_string(), "2024-03-01 10:00:00");
    assert!(parse_timestamp("2024-03-01T10:00:00Z").is_some());
    assert!(parse_timestamp("2024-03-01 10:00:00").is_some());
    assert!(parse_timestamp("not a date").is_none());

    assert_eq!(parse_date("2024-02-01").unwrap().to_string(), "2024-02-01");
    assert!(parse_date("02/01/2024").is_none());
}

#[test]
fn supabase_config_requires_url_and_key() {
    std::env::set_var("SUPABASE_URL", "https://example.supabase.co");
    std::env::set_var("SUPABASE_ANON_KEY", "anon-key");
    let config = SupabaseConfig::from_env().unwrap();
    assert_eq!(config.url, "https://example.supabase.co");
    assert_eq!(config.key, "anon-key");

    std::env::remove_var("SUPABASE_ANON_KEY");
    assert!(SupabaseConfig::from_env().is_err());
    std::env::remove_var("SUPABASE_URL");
    assert!(SupabaseConfig::from_env().is_err());
}

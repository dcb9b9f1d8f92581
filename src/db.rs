use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

pub type DbPool = Pool<SqliteConnectionManager>;

pub fn init_pool(db_path: &str) -> Result<DbPool, Box<dyn std::error::Error>> {
    if let Some(dir) = Path::new(db_path).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    // WAL for better concurrent read performance; foreign_keys is
    // per-connection, so it goes in the init hook rather than a one-off.
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|c| c.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;"));
    let pool = Pool::builder().max_size(10).build(manager)?;

    Ok(pool)
}

pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error>> {
    let conn = pool.get()?;

    conn.execute_batch(
        "
        -- Categories
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            slug TEXT NOT NULL UNIQUE,
            description TEXT,
            color TEXT NOT NULL DEFAULT '#f59e0b',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Authors
        CREATE TABLE IF NOT EXISTS authors (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            bio TEXT,
            avatar_url TEXT,
            social_links TEXT NOT NULL DEFAULT '{}',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Blog posts
        CREATE TABLE IF NOT EXISTS blog_posts (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            excerpt TEXT,
            content TEXT NOT NULL,
            featured_image_url TEXT,
            category_id TEXT REFERENCES categories(id) ON DELETE SET NULL,
            author_id TEXT REFERENCES authors(id) ON DELETE SET NULL,
            featured INTEGER NOT NULL DEFAULT 0,
            published INTEGER NOT NULL DEFAULT 0,
            published_at DATETIME,
            read_time INTEGER NOT NULL DEFAULT 5,
            meta_title TEXT,
            meta_description TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_posts_published ON blog_posts(published, published_at);
        CREATE INDEX IF NOT EXISTS idx_posts_featured ON blog_posts(featured);
        CREATE INDEX IF NOT EXISTS idx_posts_category ON blog_posts(category_id);
        CREATE INDEX IF NOT EXISTS idx_posts_author ON blog_posts(author_id);

        -- Projects
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE,
            description TEXT,
            content TEXT,
            featured_image_url TEXT,
            gallery_images TEXT NOT NULL DEFAULT '[]',
            client_name TEXT,
            project_url TEXT,
            github_url TEXT,
            technologies TEXT NOT NULL DEFAULT '[]',
            status TEXT NOT NULL DEFAULT 'completed'
                CHECK (status IN ('completed', 'in_progress', 'planned')),
            featured INTEGER NOT NULL DEFAULT 0,
            published INTEGER NOT NULL DEFAULT 0,
            start_date DATE,
            end_date DATE,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_projects_published ON projects(published);
        CREATE INDEX IF NOT EXISTS idx_projects_featured ON projects(featured);
        CREATE INDEX IF NOT EXISTS idx_projects_status ON projects(status);

        -- Services
        CREATE TABLE IF NOT EXISTS services (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            icon TEXT,
            order_index INTEGER NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        -- Testimonials
        CREATE TABLE IF NOT EXISTS testimonials (
            id TEXT PRIMARY KEY,
            client_name TEXT NOT NULL,
            client_title TEXT,
            client_company TEXT,
            client_avatar_url TEXT,
            content TEXT NOT NULL,
            rating INTEGER NOT NULL DEFAULT 5 CHECK (rating BETWEEN 1 AND 5),
            featured INTEGER NOT NULL DEFAULT 0,
            published INTEGER NOT NULL DEFAULT 0,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
            updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );

        CREATE INDEX IF NOT EXISTS idx_testimonials_published ON testimonials(published);
        CREATE INDEX IF NOT EXISTS idx_testimonials_featured ON testimonials(featured);
        ",
    )?;

    Ok(())
}

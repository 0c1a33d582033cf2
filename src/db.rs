use crate::config::Config;
use crate::error::StoreError;
use crate::id::new_id;
use crate::model::*;
use crate::store::{BookFilter, BookStore, FindOptions};
use anyhow::Result;
use async_trait::async_trait;
use libsql::{Builder, Connection, Database as LibsqlDatabase};
use std::path::Path;
use std::time::Duration;
use tokio::sync::Mutex;

const SYSTEM_MIGRATIONS: &[(&str, &str)] =
    &[("system/000_migrations_table.sql", include_str!("migrations/system/000_migrations_table.sql"))];

const MIGRATIONS: &[(&str, &str)] = &[
    ("001_books.sql", include_str!("migrations/001_books.sql")),
    ("002_title_folded.sql", include_str!("migrations/002_title_folded.sql")),
];

const BOOK_COLUMNS: &str = "id, title, author, description, price, category, created_at, updated_at";

pub struct Database {
    db: LibsqlDatabase,
    conn: Connection,
    /// Held by every write so none lands inside another's transaction.
    tx_lock: Mutex<()>,
    replica: bool,
}

impl Database {
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn is_replica(turso_url: &Option<String>, turso_auth_token: &Option<String>) -> bool {
        let set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        set(turso_url) && set(turso_auth_token)
    }

    pub async fn sync(&self) -> Result<()> {
        if self.replica {
            self.db
                .sync()
                .await
                .map_err(|e| anyhow::anyhow!("sync failed: {}", e))?;
        }
        Ok(())
    }

    async fn is_migration_applied(conn: &Connection, name: &str) -> Result<bool> {
        let query = "SELECT 1 FROM _migrations WHERE name = ?";
        match conn.query(query, libsql::params![name]).await {
            Ok(mut rows) => Ok(rows.next().await?.is_some()),
            Err(e) if e.to_string().contains("no such table") => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
        if Self::is_migration_applied(conn, name).await? {
            tracing::debug!("migration {} already applied, skipping", name);
            return Ok(());
        }

        tracing::info!("applying migration: {}", name);
        conn.execute_batch(sql)
            .await
            .map_err(|e| anyhow::anyhow!("failed to execute migration {name}: {e}"))?;

        conn.execute(
            "INSERT INTO _migrations (name, applied_at) VALUES (?, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
            libsql::params![name],
        )
        .await?;
        Ok(())
    }

    pub async fn new(cfg: &Config, data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(cfg.app.get_db());
        let turso_url = cfg.app.turso_url.clone();
        let turso_auth_token = cfg.app.turso_auth_token.clone();
        let replica = Self::is_replica(&turso_url, &turso_auth_token);

        let db = match (turso_url, turso_auth_token) {
            (Some(url), Some(token)) if replica => {
                tracing::info!("[db] running in synced database mode (offline writes)");
                let sync_interval = Duration::from_secs(cfg.app.sync_interval_seconds);
                Builder::new_synced_database(&path, url, token)
                    .sync_interval(sync_interval)
                    .build()
                    .await?
            }
            _ => {
                tracing::info!(path = ?path, "[db] running in local mode");
                Builder::new_local(&path).build().await?
            }
        };

        Self::open(db, replica).await
    }

    /// A private, empty database that lives as long as the returned handle.
    pub async fn in_memory() -> Result<Self> {
        let db = Builder::new_local(":memory:").build().await?;
        Self::open(db, false).await
    }

    async fn open(db: LibsqlDatabase, replica: bool) -> Result<Self> {
        let conn = db.connect()?;
        conn.query("SELECT 1", ()).await?;

        for (filename, sql) in SYSTEM_MIGRATIONS.iter().chain(MIGRATIONS) {
            Self::run_migration(&conn, filename, sql).await?;
        }

        Ok(Database {
            db,
            conn,
            tx_lock: Mutex::new(()),
            replica,
        })
    }

    async fn update_book_internal(
        &self,
        id: &str,
        changes: UpdateBook,
    ) -> Result<Option<Book>, StoreError> {
        let Some(existing) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let merged = existing.merged(changes);
        merged.validate()?;

        let query = format!(
            r#"
            UPDATE books
            SET title = ?, title_folded = ?, author = ?, description = ?, price = ?, category = ?,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
            RETURNING {BOOK_COLUMNS}
        "#
        );

        let mut rows = self
            .conn
            .query(
                &query,
                libsql::params![
                    merged.title.clone(),
                    merged.title.to_lowercase(),
                    merged.author,
                    merged.description,
                    merged.price,
                    merged.category.as_str(),
                    id
                ],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_book(&row)?)),
            None => Ok(None),
        }
    }
}

fn row_to_book(row: &libsql::Row) -> Result<Book, StoreError> {
    let category_str: String = row.get(5)?;
    let category = Category::from_str(&category_str)
        .ok_or_else(|| StoreError::Corrupt(format!("invalid category: {}", category_str)))?;

    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        description: row.get(3)?,
        price: row.get(4)?,
        category,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// LIKE pattern matching `keyword` anywhere, with wildcards escaped.
fn contains_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');
    for c in keyword.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn as_sql_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl BookStore for Database {
    async fn find(&self, filter: &BookFilter, opts: FindOptions) -> Result<Vec<Book>, StoreError> {
        let mut params: Vec<libsql::Value> = Vec::new();
        let mut clause = "";

        // lower() and LIKE only fold ASCII, so titles are folded on write
        if let Some(keyword) = &filter.title_contains {
            clause = r"WHERE title_folded LIKE ? ESCAPE '\'";
            params.push(contains_pattern(&keyword.to_lowercase()).into());
        }
        params.push(as_sql_int(opts.limit).into());
        params.push(as_sql_int(opts.skip).into());

        let query = format!("SELECT {BOOK_COLUMNS} FROM books {clause} ORDER BY rowid LIMIT ? OFFSET ?");

        let mut rows = self.conn.query(&query, params).await?;
        let mut books = Vec::new();

        while let Some(row) = rows.next().await? {
            books.push(row_to_book(&row)?);
        }

        Ok(books)
    }

    async fn create(&self, book: NewBook) -> Result<Book, StoreError> {
        book.validate()?;

        let query = format!(
            r#"
            INSERT INTO books (id, title, title_folded, author, description, price, category)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING {BOOK_COLUMNS}
        "#
        );

        let title_folded = book.title.to_lowercase();

        let _guard = self.tx_lock.lock().await;
        let mut rows = self
            .conn
            .query(
                &query,
                libsql::params![
                    new_id(),
                    book.title,
                    title_folded,
                    book.author,
                    book.description,
                    book.price,
                    book.category.as_str()
                ],
            )
            .await?;

        match rows.next().await? {
            Some(row) => row_to_book(&row),
            None => Err(StoreError::Corrupt("insert returned no row".to_string())),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let query = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?");
        let mut rows = self.conn.query(&query, libsql::params![id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_book(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        changes: UpdateBook,
    ) -> Result<Option<Book>, StoreError> {
        let _guard = self.tx_lock.lock().await;

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        match self.update_book_internal(id, changes).await {
            Ok(book) => {
                self.conn.execute("COMMIT", ()).await?;
                Ok(book)
            }
            Err(e) => {
                let _ = self.conn.execute("ROLLBACK", ()).await;
                Err(e)
            }
        }
    }

    async fn find_by_id_and_delete(&self, id: &str) -> Result<Option<Book>, StoreError> {
        let query = format!("DELETE FROM books WHERE id = ? RETURNING {BOOK_COLUMNS}");
        let _guard = self.tx_lock.lock().await;
        let mut rows = self.conn.query(&query, libsql::params![id]).await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row_to_book(&row)?)),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: &str) -> Result<bool, StoreError> {
        let mut rows = self
            .conn
            .query("SELECT 1 FROM books WHERE id = ? LIMIT 1", libsql::params![id])
            .await?;
        Ok(rows.next().await?.is_some())
    }
}

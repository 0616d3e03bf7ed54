mod customer;
mod staff;

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub use customer::{Customer, CustomerStore};
pub use staff::{Staff, StaffStore};

use crate::auth::{CredentialStore, PrincipalClass, PrincipalRecord, StoreError};

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open or create a database at the given path.
    /// Use ":memory:" for an in-memory database.
    pub async fn open(path: &str) -> Result<Self, sqlx::Error> {
        let url = if path == ":memory:" {
            "sqlite::memory:".to_string()
        } else {
            format!("sqlite:{}?mode=rwc", path)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Get the current schema version.
    async fn get_version(&self) -> Result<i32, sqlx::Error> {
        let result: Option<(i32,)> = sqlx::query_as("SELECT version FROM schema_version LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(result.map(|r| r.0).unwrap_or(0))
    }

    /// Set the schema version within a transaction.
    async fn set_version(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        version: i32,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM schema_version")
            .execute(&mut **tx)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (?)")
            .bind(version)
            .execute(&mut **tx)
            .await?;
        Ok(())
    }

    /// Run database migrations.
    async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")
            .execute(&self.pool)
            .await?;

        let version = self.get_version().await?;

        if version < 1 {
            self.migrate_v1().await?;
        }

        Ok(())
    }

    /// Execute a list of queries in a transaction, then set the version.
    async fn run_migration(
        &self,
        version: i32,
        queries: &[&'static str],
    ) -> Result<(), sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        for query in queries {
            sqlx::query(*query).execute(&mut *tx).await?;
        }
        Self::set_version(&mut tx, version).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn migrate_v1(&self) -> Result<(), sqlx::Error> {
        self.run_migration(
            1,
            &[
                // Staff table: email login, role-tiered
                "CREATE TABLE staff (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT UNIQUE NOT NULL,
                    email TEXT UNIQUE NOT NULL COLLATE NOCASE,
                    password_hash TEXT NOT NULL,
                    role TEXT NOT NULL DEFAULT 'admin',
                    status TEXT NOT NULL DEFAULT 'active',
                    last_login_at TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_staff_uuid ON staff(uuid)",
                "CREATE INDEX idx_staff_email ON staff(email)",
                // Customers table: phone login, no role
                "CREATE TABLE customers (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT UNIQUE NOT NULL,
                    phone TEXT UNIQUE NOT NULL,
                    password_hash TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'active',
                    last_login_at TEXT,
                    created_at TEXT NOT NULL DEFAULT (datetime('now'))
                )",
                "CREATE INDEX idx_customers_uuid ON customers(uuid)",
                "CREATE INDEX idx_customers_phone ON customers(phone)",
            ],
        )
        .await
    }

    /// Get the staff store.
    pub fn staff(&self) -> StaffStore {
        StaffStore::new(self.pool.clone())
    }

    /// Get the customer store.
    pub fn customers(&self) -> CustomerStore {
        CustomerStore::new(self.pool.clone())
    }

    /// Get the underlying connection pool (for tests that need raw SQL access).
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// The production credential store: staff by email, customers by phone.
impl CredentialStore for Database {
    async fn find_by_identifier(
        &self,
        identifier: &str,
        class: PrincipalClass,
    ) -> Result<Option<PrincipalRecord>, StoreError> {
        let record = match class {
            PrincipalClass::Staff => self.staff().find_credentials_by_email(identifier).await?,
            PrincipalClass::Customer => {
                self.customers().find_credentials_by_phone(identifier).await?
            }
        };
        Ok(record)
    }

    async fn find_by_id(
        &self,
        id: &str,
        class: PrincipalClass,
    ) -> Result<Option<PrincipalRecord>, StoreError> {
        let record = match class {
            PrincipalClass::Staff => self.staff().find_credentials_by_uuid(id).await?,
            PrincipalClass::Customer => self.customers().find_credentials_by_uuid(id).await?,
        };
        Ok(record)
    }

    async fn record_authentication(
        &self,
        id: &str,
        class: PrincipalClass,
    ) -> Result<(), StoreError> {
        match class {
            PrincipalClass::Staff => self.staff().record_login(id).await?,
            PrincipalClass::Customer => self.customers().record_login(id).await?,
        }
        Ok(())
    }
}

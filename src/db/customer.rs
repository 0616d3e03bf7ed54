use sqlx::sqlite::SqlitePool;

use crate::auth::{AccountStatus, Principal, PrincipalRecord};

/// Store for customer credential records.
#[derive(Clone)]
pub struct CustomerStore {
    pool: SqlitePool,
}

/// Customer summary for the admin dashboard. Never carries the password hash.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Customer {
    pub uuid: String,
    pub phone: String,
    pub status: AccountStatus,
    pub last_login_at: Option<String>,
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct CustomerRow {
    uuid: String,
    phone: String,
    password_hash: String,
    status: String,
    last_login_at: Option<String>,
    created_at: String,
}

const CUSTOMER_COLUMNS: &str = "uuid, phone, password_hash, status, last_login_at, created_at";

impl CustomerRow {
    fn principal(&self) -> Principal {
        Principal::customer(self.uuid.clone(), AccountStatus::from_str(&self.status))
    }

    fn into_record(self) -> PrincipalRecord {
        let principal = self.principal();
        PrincipalRecord::new(principal, self.password_hash)
    }
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Self {
            uuid: row.uuid,
            phone: row.phone,
            status: AccountStatus::from_str(&row.status),
            last_login_at: row.last_login_at,
            created_at: row.created_at,
        }
    }
}

impl CustomerStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new active customer. Returns the row id.
    pub async fn create(
        &self,
        uuid: &str,
        phone: &str,
        password_hash: &str,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO customers (uuid, phone, password_hash) VALUES (?, ?, ?)")
                .bind(uuid)
                .bind(phone)
                .bind(password_hash)
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// Look up login credentials by phone number.
    pub async fn find_credentials_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<PrincipalRecord>, sqlx::Error> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE phone = ?"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CustomerRow::into_record))
    }

    /// Look up login credentials by principal id.
    pub async fn find_credentials_by_uuid(
        &self,
        uuid: &str,
    ) -> Result<Option<PrincipalRecord>, sqlx::Error> {
        let row: Option<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE uuid = ?"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(CustomerRow::into_record))
    }

    /// Update the last-login timestamp.
    pub async fn record_login(&self, uuid: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE customers SET last_login_at = datetime('now') WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Set the account status for a customer.
    pub async fn set_status(&self, uuid: &str, status: AccountStatus) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE customers SET status = ? WHERE uuid = ?")
            .bind(status.as_str())
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all customers for the admin dashboard.
    pub async fn list(&self) -> Result<Vec<Customer>, sqlx::Error> {
        let rows: Vec<CustomerRow> = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }
}

use sqlx::sqlite::SqlitePool;

use crate::auth::{AccountStatus, Principal, PrincipalRecord, StaffRole};

/// Store for staff credential records.
#[derive(Clone)]
pub struct StaffStore {
    pool: SqlitePool,
}

/// Staff summary for the admin dashboard. Never carries the password hash.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Staff {
    pub uuid: String,
    pub email: String,
    pub role: StaffRole,
    pub status: AccountStatus,
    pub last_login_at: Option<String>,
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct StaffRow {
    uuid: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    last_login_at: Option<String>,
    created_at: String,
}

const STAFF_COLUMNS: &str =
    "uuid, email, password_hash, role, status, last_login_at, created_at";

impl StaffRow {
    fn principal(&self) -> Principal {
        Principal::staff(
            self.uuid.clone(),
            StaffRole::from_str(&self.role),
            AccountStatus::from_str(&self.status),
        )
    }

    fn into_record(self) -> PrincipalRecord {
        let principal = self.principal();
        PrincipalRecord::new(principal, self.password_hash)
    }
}

impl From<StaffRow> for Staff {
    fn from(row: StaffRow) -> Self {
        Self {
            role: StaffRole::from_str(&row.role),
            status: AccountStatus::from_str(&row.status),
            uuid: row.uuid,
            email: row.email,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
        }
    }
}

impl StaffStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new active staff member. Returns the row id.
    pub async fn create(
        &self,
        uuid: &str,
        email: &str,
        password_hash: &str,
        role: StaffRole,
    ) -> Result<i64, sqlx::Error> {
        let result =
            sqlx::query("INSERT INTO staff (uuid, email, password_hash, role) VALUES (?, ?, ?, ?)")
                .bind(uuid)
                .bind(email)
                .bind(password_hash)
                .bind(role.as_str())
                .execute(&self.pool)
                .await?;
        Ok(result.last_insert_rowid())
    }

    /// Look up login credentials by email.
    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<PrincipalRecord>, sqlx::Error> {
        let row: Option<StaffRow> = sqlx::query_as(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StaffRow::into_record))
    }

    /// Look up login credentials by principal id.
    pub async fn find_credentials_by_uuid(
        &self,
        uuid: &str,
    ) -> Result<Option<PrincipalRecord>, sqlx::Error> {
        let row: Option<StaffRow> = sqlx::query_as(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE uuid = ?"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StaffRow::into_record))
    }

    /// Get a staff summary by principal id.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<Staff>, sqlx::Error> {
        let row: Option<StaffRow> = sqlx::query_as(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE uuid = ?"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Staff::from))
    }

    /// Update the last-login timestamp.
    pub async fn record_login(&self, uuid: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE staff SET last_login_at = datetime('now') WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Set the role for a staff member.
    pub async fn set_role(&self, uuid: &str, role: StaffRole) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE staff SET role = ? WHERE uuid = ?")
            .bind(role.as_str())
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Set the account status for a staff member.
    pub async fn set_status(&self, uuid: &str, status: AccountStatus) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE staff SET status = ? WHERE uuid = ?")
            .bind(status.as_str())
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a staff member.
    pub async fn delete(&self, uuid: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM staff WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List all staff for the admin dashboard.
    pub async fn list(&self) -> Result<Vec<Staff>, sqlx::Error> {
        let rows: Vec<StaffRow> = sqlx::query_as(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Staff::from).collect())
    }
}

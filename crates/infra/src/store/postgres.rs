//! Postgres-backed stores (feature `postgres`).
//!
//! Runtime-bound sqlx queries; every record is read/written as a single
//! row, matching the single-document store contract. Enable with
//! `USE_PERSISTENT_STORES=true` and a `DATABASE_URL`.

use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use backoffice_auth::{
    Account, CredentialStore, HashedPassword, PermissionDefinition, RoleDefinition, StoreError,
};
use backoffice_catalog::CatalogEntry;
use backoffice_core::{AccountId, EntryId, PermissionId, RoleId};

use super::{AccountStore, EntryStore, PermissionStore, RoleStore};

/// Create the required tables when they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    const DDL: &[&str] = &[
        "CREATE TABLE IF NOT EXISTS accounts (
            id UUID PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            roles UUID[] NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS roles (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            permissions UUID[] NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS permissions (
            id UUID PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
        "CREATE TABLE IF NOT EXISTS catalog_entries (
            id UUID PRIMARY KEY,
            collection TEXT NOT NULL,
            description TEXT NOT NULL,
            starts_at TIMESTAMPTZ NOT NULL,
            ends_at TIMESTAMPTZ NOT NULL,
            published_at TIMESTAMPTZ NOT NULL,
            year TEXT NOT NULL,
            link TEXT NOT NULL,
            published BOOLEAN NOT NULL,
            publisher TEXT NOT NULL,
            editable BOOLEAN NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )",
    ];

    for statement in DDL {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(db_error)?;
    }
    Ok(())
}

fn db_error(err: sqlx::Error) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    let roles: Vec<Uuid> = row.try_get("roles")?;
    Ok(Account {
        id: AccountId::from_uuid(row.try_get("id")?),
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        password_hash: HashedPassword::from_phc(row.try_get("password_hash")?),
        roles: roles.into_iter().map(RoleId::from_uuid).collect(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn role_from_row(row: &PgRow) -> Result<RoleDefinition, sqlx::Error> {
    let permissions: Vec<Uuid> = row.try_get("permissions")?;
    Ok(RoleDefinition {
        id: RoleId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        permissions: permissions.into_iter().map(PermissionId::from_uuid).collect(),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn permission_from_row(row: &PgRow) -> Result<PermissionDefinition, sqlx::Error> {
    Ok(PermissionDefinition {
        id: PermissionId::from_uuid(row.try_get("id")?),
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn entry_from_row(row: &PgRow) -> Result<CatalogEntry, sqlx::Error> {
    Ok(CatalogEntry {
        id: EntryId::from_uuid(row.try_get("id")?),
        description: row.try_get("description")?,
        starts_at: row.try_get("starts_at")?,
        ends_at: row.try_get("ends_at")?,
        published_at: row.try_get("published_at")?,
        year: row.try_get("year")?,
        link: row.try_get("link")?,
        published: row.try_get("published")?,
        publisher: row.try_get("publisher")?,
        editable: row.try_get("editable")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Accounts
// ─────────────────────────────────────────────────────────────────────────────

pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_by(
        &self,
        column: &str,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        let query = format!("SELECT * FROM accounts WHERE {column} = $1");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(account_from_row).transpose().map_err(db_error)
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let rows = sqlx::query("SELECT * FROM accounts ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.iter().map(account_from_row).collect::<Result<_, _>>().map_err(db_error)
    }

    async fn get(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(account_from_row).transpose().map_err(db_error)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.fetch_one_by("username", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.fetch_one_by("email", &email.to_lowercase()).await
    }

    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        let roles: Vec<Uuid> = account.roles.iter().map(|r| *r.as_uuid()).collect();
        sqlx::query(
            "INSERT INTO accounts (id, username, email, password_hash, roles, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(account.id.as_uuid())
        .bind(&account.username)
        .bind(&account.email)
        .bind(account.password_hash.as_str())
        .bind(&roles)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn update(&self, account: Account) -> Result<bool, StoreError> {
        let roles: Vec<Uuid> = account.roles.iter().map(|r| *r.as_uuid()).collect();
        let result = sqlx::query(
            "UPDATE accounts
             SET email = $2, password_hash = $3, roles = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(account.id.as_uuid())
        .bind(&account.email)
        .bind(account.password_hash.as_str())
        .bind(&roles)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: AccountId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CredentialStore for PgAccountStore {
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query("SELECT * FROM accounts WHERE username = $1 OR email = $2")
            .bind(identifier)
            .bind(identifier.to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(account_from_row).transpose().map_err(db_error)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        AccountStore::find_by_username(self, username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        AccountStore::find_by_email(self, email).await
    }

    async fn insert(&self, account: Account) -> Result<(), StoreError> {
        AccountStore::insert(self, account).await
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Roles
// ─────────────────────────────────────────────────────────────────────────────

pub struct PgRoleStore {
    pool: PgPool,
}

impl PgRoleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for PgRoleStore {
    async fn list(&self) -> Result<Vec<RoleDefinition>, StoreError> {
        let rows = sqlx::query("SELECT * FROM roles ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.iter().map(role_from_row).collect::<Result<_, _>>().map_err(db_error)
    }

    async fn get(&self, id: RoleId) -> Result<Option<RoleDefinition>, StoreError> {
        let row = sqlx::query("SELECT * FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(role_from_row).transpose().map_err(db_error)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<RoleDefinition>, StoreError> {
        let row = sqlx::query("SELECT * FROM roles WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(role_from_row).transpose().map_err(db_error)
    }

    async fn insert(&self, role: RoleDefinition) -> Result<(), StoreError> {
        let permissions: Vec<Uuid> = role.permissions.iter().map(|p| *p.as_uuid()).collect();
        sqlx::query(
            "INSERT INTO roles (id, name, permissions, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(role.id.as_uuid())
        .bind(&role.name)
        .bind(&permissions)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn update(&self, role: RoleDefinition) -> Result<bool, StoreError> {
        let permissions: Vec<Uuid> = role.permissions.iter().map(|p| *p.as_uuid()).collect();
        let result = sqlx::query(
            "UPDATE roles SET name = $2, permissions = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(role.id.as_uuid())
        .bind(&role.name)
        .bind(&permissions)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: RoleId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Permissions
// ─────────────────────────────────────────────────────────────────────────────

pub struct PgPermissionStore {
    pool: PgPool,
}

impl PgPermissionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionStore for PgPermissionStore {
    async fn list(&self) -> Result<Vec<PermissionDefinition>, StoreError> {
        let rows = sqlx::query("SELECT * FROM permissions ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        rows.iter().map(permission_from_row).collect::<Result<_, _>>().map_err(db_error)
    }

    async fn get(&self, id: PermissionId) -> Result<Option<PermissionDefinition>, StoreError> {
        let row = sqlx::query("SELECT * FROM permissions WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(permission_from_row).transpose().map_err(db_error)
    }

    async fn find_by_name(
        &self,
        name: &str,
    ) -> Result<Option<PermissionDefinition>, StoreError> {
        let row = sqlx::query("SELECT * FROM permissions WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(permission_from_row).transpose().map_err(db_error)
    }

    async fn insert(&self, permission: PermissionDefinition) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO permissions (id, name, description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(permission.id.as_uuid())
        .bind(&permission.name)
        .bind(&permission.description)
        .bind(permission.created_at)
        .bind(permission.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn update(&self, permission: PermissionDefinition) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE permissions SET name = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(permission.id.as_uuid())
        .bind(&permission.name)
        .bind(&permission.description)
        .bind(permission.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: PermissionId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Catalog entries
// ─────────────────────────────────────────────────────────────────────────────

/// One `catalog_entries` table shared by both collections, discriminated by
/// the `collection` column.
pub struct PgEntryStore {
    pool: PgPool,
    collection: &'static str,
}

impl PgEntryStore {
    pub fn new(pool: PgPool, collection: &'static str) -> Self {
        Self { pool, collection }
    }
}

#[async_trait]
impl EntryStore for PgEntryStore {
    async fn list(&self) -> Result<Vec<CatalogEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM catalog_entries WHERE collection = $1 ORDER BY created_at",
        )
        .bind(self.collection)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.iter().map(entry_from_row).collect::<Result<_, _>>().map_err(db_error)
    }

    async fn get(&self, id: EntryId) -> Result<Option<CatalogEntry>, StoreError> {
        let row = sqlx::query("SELECT * FROM catalog_entries WHERE collection = $1 AND id = $2")
            .bind(self.collection)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        row.as_ref().map(entry_from_row).transpose().map_err(db_error)
    }

    async fn insert(&self, entry: CatalogEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO catalog_entries
             (id, collection, description, starts_at, ends_at, published_at, year, link,
              published, publisher, editable, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(entry.id.as_uuid())
        .bind(self.collection)
        .bind(&entry.description)
        .bind(entry.starts_at)
        .bind(entry.ends_at)
        .bind(entry.published_at)
        .bind(&entry.year)
        .bind(&entry.link)
        .bind(entry.published)
        .bind(&entry.publisher)
        .bind(entry.editable)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(())
    }

    async fn update(&self, entry: CatalogEntry) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE catalog_entries
             SET description = $3, starts_at = $4, ends_at = $5, published_at = $6,
                 year = $7, link = $8, published = $9, publisher = $10, editable = $11,
                 updated_at = $12
             WHERE collection = $1 AND id = $2",
        )
        .bind(self.collection)
        .bind(entry.id.as_uuid())
        .bind(&entry.description)
        .bind(entry.starts_at)
        .bind(entry.ends_at)
        .bind(entry.published_at)
        .bind(&entry.year)
        .bind(&entry.link)
        .bind(entry.published)
        .bind(&entry.publisher)
        .bind(entry.editable)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: EntryId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM catalog_entries WHERE collection = $1 AND id = $2")
            .bind(self.collection)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_year(&self, year: &str) -> Result<Vec<CatalogEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM catalog_entries
             WHERE collection = $1 AND year = $2
             ORDER BY published_at DESC",
        )
        .bind(self.collection)
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.iter().map(entry_from_row).collect::<Result<_, _>>().map_err(db_error)
    }

    async fn list_by_publisher(
        &self,
        publisher: &str,
    ) -> Result<Vec<CatalogEntry>, StoreError> {
        let rows = sqlx::query(
            "SELECT * FROM catalog_entries
             WHERE collection = $1 AND publisher = $2
             ORDER BY created_at",
        )
        .bind(self.collection)
        .bind(publisher)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;
        rows.iter().map(entry_from_row).collect::<Result<_, _>>().map_err(db_error)
    }

    async fn years(&self) -> Result<Vec<i32>, StoreError> {
        let rows = sqlx::query(
            "SELECT DISTINCT year FROM catalog_entries WHERE collection = $1",
        )
        .bind(self.collection)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let mut years: Vec<i32> = rows
            .iter()
            .filter_map(|row| row.try_get::<String, _>("year").ok())
            .filter_map(|year| year.parse().ok())
            .collect();
        years.sort_unstable_by(|a, b| b.cmp(a));
        Ok(years)
    }
}

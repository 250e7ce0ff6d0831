use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::auth::password::{hash_password, verify_password};
use crate::database::manager::DatabaseError;
use crate::database::query_builder::fetch_optional_as;
use crate::filter::{sql_for_partial_update, AliasMap, SqlResult, UpdatePayload, ValidationError};

pub const USER_ALIASES: AliasMap = &[
    ("firstName", "first_name"),
    ("lastName", "last_name"),
];

const USER_COLUMNS: &str = "username, first_name, last_name, email, is_admin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
}

/// A user with the ids of the jobs they applied to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserDetail {
    #[serde(flatten)]
    pub user: User,
    pub jobs: Vec<i32>,
}

#[derive(FromRow)]
struct UserCredentials {
    #[sqlx(flatten)]
    user: User,
    password: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty() || self.username.len() > 25 {
            return Err("username must be 1-25 characters".into());
        }
        if self.password.len() < 5 {
            return Err("password must be at least 5 characters".into());
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("firstName and lastName are required".into());
        }
        check_email(&self.email)
    }
}

fn check_email(email: &str) -> Result<(), String> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
        _ => Err(format!("email is not valid: {}", email)),
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Fields a user may change on their own account. Setting a password re-hashes it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(email) = &self.email {
            check_email(email)?;
        }
        if matches!(&self.password, Some(p) if p.len() < 5) {
            return Err("password must be at least 5 characters".into());
        }
        Ok(())
    }
}

impl TryFrom<UserUpdate> for UpdatePayload {
    type Error = DatabaseError;

    fn try_from(update: UserUpdate) -> Result<Self, Self::Error> {
        let mut payload = UpdatePayload::new();
        if let Some(first_name) = update.first_name {
            payload.set("firstName", first_name);
        }
        if let Some(last_name) = update.last_name {
            payload.set("lastName", last_name);
        }
        if let Some(email) = update.email {
            payload.set("email", email);
        }
        if let Some(password) = update.password {
            payload.set("password", hash_password(&password)?);
        }
        Ok(payload)
    }
}

impl User {
    /// Check a username/password pair; `None` when either is wrong.
    pub async fn authenticate(pool: &PgPool, username: &str, password: &str) -> Result<Option<User>, DatabaseError> {
        let sql = SqlResult {
            query: format!("SELECT {}, password FROM users WHERE username = $1", USER_COLUMNS),
            params: vec![Value::from(username)],
        };
        let found = fetch_optional_as::<UserCredentials>(pool, &sql).await?;
        Ok(found
            .filter(|row| verify_password(password, &row.password))
            .map(|row| row.user))
    }

    pub async fn register(pool: &PgPool, data: &NewUser) -> Result<User, DatabaseError> {
        let duplicate = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username = $1")
            .bind(&data.username)
            .fetch_optional(pool)
            .await?;
        if duplicate.is_some() {
            return Err(ValidationError::duplicate(format!("username: {}", data.username)).into());
        }

        let sql = format!(
            "INSERT INTO users (username, password, first_name, last_name, email, is_admin)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {}",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(&data.username)
            .bind(hash_password(&data.password)?)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.email)
            .bind(data.is_admin)
            .fetch_one(pool)
            .await?;

        tracing::info!("Registered user {} (admin: {})", user.username, user.is_admin);
        Ok(user)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY username", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(pool).await?)
    }

    pub async fn get(pool: &PgPool, username: &str) -> Result<UserDetail, DatabaseError> {
        let sql = SqlResult {
            query: format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS),
            params: vec![Value::from(username)],
        };
        let user = fetch_optional_as::<User>(pool, &sql)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))?;

        let jobs = sqlx::query_scalar::<_, i32>(
            "SELECT job_id FROM applications WHERE username = $1 ORDER BY job_id",
        )
        .bind(username)
        .fetch_all(pool)
        .await?;

        Ok(UserDetail { user, jobs })
    }

    pub fn update_sql(username: &str, data: &UpdatePayload) -> Result<SqlResult, ValidationError> {
        let mut sql = sql_for_partial_update(data, USER_ALIASES)?;
        let username_idx = sql.next_placeholder();
        sql.query = format!(
            "UPDATE users SET {} WHERE username = {} RETURNING {}",
            sql.query, username_idx, USER_COLUMNS
        );
        sql.params.push(Value::from(username));
        Ok(sql)
    }

    pub async fn update(pool: &PgPool, username: &str, data: &UpdatePayload) -> Result<User, DatabaseError> {
        let sql = Self::update_sql(username, data)?;
        fetch_optional_as::<User>(pool, &sql)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
    }

    pub async fn remove(pool: &PgPool, username: &str) -> Result<(), DatabaseError> {
        let removed = sqlx::query_scalar::<_, String>("DELETE FROM users WHERE username = $1 RETURNING username")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        removed
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("No user: {}", username)))
    }

    /// Record an application. Both the user and the job must exist.
    pub async fn apply_to_job(pool: &PgPool, username: &str, job_id: i32) -> Result<(), DatabaseError> {
        let job = sqlx::query_scalar::<_, i32>("SELECT id FROM jobs WHERE id = $1")
            .bind(job_id)
            .fetch_optional(pool)
            .await?;
        if job.is_none() {
            return Err(DatabaseError::NotFound(format!("No job: {}", job_id)));
        }

        let user = sqlx::query_scalar::<_, String>("SELECT username FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await?;
        if user.is_none() {
            return Err(DatabaseError::NotFound(format!("No user: {}", username)));
        }

        let inserted = sqlx::query(
            "INSERT INTO applications (username, job_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(username)
        .bind(job_id)
        .execute(pool)
        .await?;
        if inserted.rows_affected() == 0 {
            return Err(ValidationError::duplicate(format!("application: {} -> {}", username, job_id)).into());
        }
        Ok(())
    }
}

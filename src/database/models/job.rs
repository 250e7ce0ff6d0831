use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::deserialize_some;
use crate::database::query_builder::{fetch_all_as, fetch_optional_as};
use crate::filter::{
    sql_for_partial_update, AliasMap, FilterField, FilterWhere, PredicateKind, SearchCriteria,
    SqlResult, UpdatePayload, ValidationError,
};

pub const JOB_ALIASES: AliasMap = &[("companyHandle", "company_handle")];

// equity is NUMERIC in storage; read it as float8 so it serializes as a JSON number
const JOB_COLUMNS: &str = r#"id,
       title,
       salary,
       equity::float8 AS equity,
       company_handle"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<f64>,
    pub company_handle: String,
}

fn check_salary(salary: Option<i32>) -> Result<(), String> {
    match salary {
        Some(s) if s < 0 => Err("salary must be non-negative".into()),
        _ => Ok(()),
    }
}

fn check_equity(equity: Option<f64>) -> Result<(), String> {
    match equity {
        Some(e) if !(0.0..=1.0).contains(&e) => Err("equity must be between 0 and 1".into()),
        _ => Ok(()),
    }
}

impl NewJob {
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".into());
        }
        if self.company_handle.trim().is_empty() {
            return Err("companyHandle is required".into());
        }
        check_salary(self.salary)?;
        check_equity(self.equity)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub salary: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub equity: Option<Option<f64>>,
    #[serde(default)]
    pub company_handle: Option<String>,
}

impl JobUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.title, Some(t) if t.trim().is_empty()) {
            return Err("title must not be empty".into());
        }
        check_salary(self.salary.flatten())?;
        check_equity(self.equity.flatten())
    }
}

impl From<JobUpdate> for UpdatePayload {
    fn from(update: JobUpdate) -> Self {
        let mut payload = UpdatePayload::new();
        if let Some(title) = update.title {
            payload.set("title", title);
        }
        if let Some(salary) = update.salary {
            payload.set("salary", salary);
        }
        if let Some(equity) = update.equity {
            payload.set("equity", equity);
        }
        if let Some(company_handle) = update.company_handle {
            payload.set("companyHandle", company_handle);
        }
        payload
    }
}

/// Search criteria accepted by `GET /jobs`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i64>,
    pub has_equity: Option<bool>,
    pub company_handle: Option<String>,
}

impl SearchCriteria for JobFilter {
    const FIELDS: &'static [FilterField] = &[
        FilterField::new("title", "title", PredicateKind::Contains),
        FilterField::new("minSalary", "salary", PredicateKind::AtLeast),
        FilterField::new("hasEquity", "equity", PredicateKind::Positive),
        FilterField::new("companyHandle", "company_handle", PredicateKind::Equals),
    ];

    fn value(&self, key: &str) -> Option<Value> {
        match key {
            "title" => self.title.clone().map(Value::from),
            "minSalary" => self.min_salary.map(Value::from),
            "hasEquity" => self.has_equity.map(Value::from),
            "companyHandle" => self.company_handle.clone().map(Value::from),
            _ => None,
        }
    }
}

/// Search criteria accepted by `GET /companies/:handle/jobs`. The company
/// comes from the path, so there is no `companyHandle` here.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyJobFilter {
    pub title: Option<String>,
    pub min_salary: Option<i64>,
    pub has_equity: Option<bool>,
}

impl SearchCriteria for CompanyJobFilter {
    const FIELDS: &'static [FilterField] = &[
        FilterField::new("title", "title", PredicateKind::Contains),
        FilterField::new("minSalary", "salary", PredicateKind::AtLeast),
        FilterField::new("hasEquity", "equity", PredicateKind::Positive),
    ];

    fn value(&self, key: &str) -> Option<Value> {
        match key {
            "title" => self.title.clone().map(Value::from),
            "minSalary" => self.min_salary.map(Value::from),
            "hasEquity" => self.has_equity.map(Value::from),
            _ => None,
        }
    }
}

impl Job {
    pub async fn create(pool: &PgPool, data: &NewJob) -> Result<Job, DatabaseError> {
        let duplicate = sqlx::query_scalar::<_, String>("SELECT title FROM jobs WHERE title = $1")
            .bind(&data.title)
            .fetch_optional(pool)
            .await?;
        if duplicate.is_some() {
            return Err(ValidationError::duplicate(format!("job: {}", data.title)).into());
        }

        let sql = format!(
            "INSERT INTO jobs (title, salary, equity, company_handle)
             VALUES ($1, $2, $3, $4)
             RETURNING {}",
            JOB_COLUMNS
        );
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(&data.title)
            .bind(data.salary)
            .bind(data.equity)
            .bind(&data.company_handle)
            .fetch_one(pool)
            .await?;

        tracing::info!("Created job {} ({}) for {}", job.title, job.id, job.company_handle);
        Ok(job)
    }

    pub fn find_all_sql(filter: &JobFilter) -> Result<SqlResult, ValidationError> {
        let mut sql = FilterWhere::generate(filter)?;
        sql.query = format!("SELECT {} FROM jobs{} ORDER BY title", JOB_COLUMNS, sql.where_sql());
        Ok(sql)
    }

    pub async fn find_all(pool: &PgPool, filter: &JobFilter) -> Result<Vec<Job>, DatabaseError> {
        let sql = Self::find_all_sql(filter)?;
        fetch_all_as(pool, &sql).await
    }

    /// Jobs of one company, narrowed further by `filter`. The company predicate
    /// takes `$1`; the filter's placeholders continue from `$2`.
    pub fn find_for_company_sql(handle: &str, filter: &CompanyJobFilter) -> Result<SqlResult, ValidationError> {
        let mut sql = FilterWhere::with_params(vec![Value::from(handle)]).build(filter)?;
        let extra = if sql.query.is_empty() {
            String::new()
        } else {
            format!(" AND {}", sql.query)
        };
        sql.query = format!(
            "SELECT {} FROM jobs WHERE company_handle = $1{} ORDER BY title",
            JOB_COLUMNS, extra
        );
        Ok(sql)
    }

    pub async fn find_for_company(
        pool: &PgPool,
        handle: &str,
        filter: &CompanyJobFilter,
    ) -> Result<Vec<Job>, DatabaseError> {
        let sql = Self::find_for_company_sql(handle, filter)?;
        fetch_all_as(pool, &sql).await
    }

    pub async fn get(pool: &PgPool, title: &str) -> Result<Job, DatabaseError> {
        let sql = SqlResult {
            query: format!("SELECT {} FROM jobs WHERE title = $1", JOB_COLUMNS),
            params: vec![Value::from(title)],
        };
        fetch_optional_as::<Job>(pool, &sql)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No job with title: {}", title)))
    }

    pub fn update_sql(title: &str, data: &UpdatePayload) -> Result<SqlResult, ValidationError> {
        let mut sql = sql_for_partial_update(data, JOB_ALIASES)?;
        let title_idx = sql.next_placeholder();
        sql.query = format!(
            "UPDATE jobs SET {} WHERE title = {} RETURNING {}",
            sql.query, title_idx, JOB_COLUMNS
        );
        sql.params.push(Value::from(title));
        Ok(sql)
    }

    pub async fn update(pool: &PgPool, title: &str, data: &UpdatePayload) -> Result<Job, DatabaseError> {
        let sql = Self::update_sql(title, data)?;
        fetch_optional_as::<Job>(pool, &sql)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No job with title: {}", title)))
    }

    pub async fn remove(pool: &PgPool, title: &str) -> Result<(), DatabaseError> {
        let removed = sqlx::query_scalar::<_, String>("DELETE FROM jobs WHERE title = $1 RETURNING title")
            .bind(title)
            .fetch_optional(pool)
            .await?;
        removed
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("No job with title: {}", title)))
    }
}

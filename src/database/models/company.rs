use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::{FromRow, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::deserialize_some;
use crate::database::models::job::{CompanyJobFilter, Job};
use crate::database::query_builder::{fetch_all_as, fetch_optional_as};
use crate::filter::{
    sql_for_partial_update, AliasMap, FilterField, FilterWhere, PredicateKind, SearchCriteria,
    SqlResult, UpdatePayload, ValidationError,
};

pub const COMPANY_ALIASES: AliasMap = &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

const COMPANY_COLUMNS: &str = r#"handle,
       name,
       description,
       num_employees,
       logo_url"#;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// A company together with every job it posts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn validate(&self) -> Result<(), String> {
        if self.handle.trim().is_empty() || self.handle.len() > 25 {
            return Err("handle must be 1-25 characters".into());
        }
        if self.name.trim().is_empty() {
            return Err("name is required".into());
        }
        if matches!(self.num_employees, Some(n) if n < 0) {
            return Err("numEmployees must be non-negative".into());
        }
        if let Some(logo) = &self.logo_url {
            url::Url::parse(logo).map_err(|_| format!("logoUrl is not a valid URL: {}", logo))?;
        }
        Ok(())
    }
}

/// Sparse company update; `Some(None)` is an explicit null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub num_employees: Option<Option<i32>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub logo_url: Option<Option<String>>,
}

impl CompanyUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if matches!(&self.name, Some(n) if n.trim().is_empty()) {
            return Err("name must not be empty".into());
        }
        if matches!(self.num_employees, Some(Some(n)) if n < 0) {
            return Err("numEmployees must be non-negative".into());
        }
        if let Some(Some(logo)) = &self.logo_url {
            url::Url::parse(logo).map_err(|_| format!("logoUrl is not a valid URL: {}", logo))?;
        }
        Ok(())
    }
}

impl From<CompanyUpdate> for UpdatePayload {
    fn from(update: CompanyUpdate) -> Self {
        let mut payload = UpdatePayload::new();
        if let Some(name) = update.name {
            payload.set("name", name);
        }
        if let Some(description) = update.description {
            payload.set("description", description);
        }
        if let Some(num_employees) = update.num_employees {
            payload.set("numEmployees", num_employees);
        }
        if let Some(logo_url) = update.logo_url {
            payload.set("logoUrl", logo_url);
        }
        payload
    }
}

/// Search criteria accepted by `GET /companies`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub name: Option<String>,
    pub min_employees: Option<i64>,
    pub max_employees: Option<i64>,
}

impl SearchCriteria for CompanyFilter {
    const FIELDS: &'static [FilterField] = &[
        FilterField::new("minEmployees", "num_employees", PredicateKind::AtLeast),
        FilterField::new("maxEmployees", "num_employees", PredicateKind::AtMost),
        FilterField::new("name", "name", PredicateKind::Contains),
    ];

    fn value(&self, key: &str) -> Option<Value> {
        match key {
            "minEmployees" => self.min_employees.map(Value::from),
            "maxEmployees" => self.max_employees.map(Value::from),
            "name" => self.name.clone().map(Value::from),
            _ => None,
        }
    }
}

impl Company {
    /// Insert a company. A taken handle is a duplicate, not a server fault.
    pub async fn create(pool: &PgPool, data: &NewCompany) -> Result<Company, DatabaseError> {
        let duplicate = sqlx::query_scalar::<_, String>("SELECT handle FROM companies WHERE handle = $1")
            .bind(&data.handle)
            .fetch_optional(pool)
            .await?;
        if duplicate.is_some() {
            return Err(ValidationError::duplicate(format!("company: {}", data.handle)).into());
        }

        let sql = format!(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {}",
            COMPANY_COLUMNS
        );
        let company = sqlx::query_as::<_, Company>(&sql)
            .bind(&data.handle)
            .bind(&data.name)
            .bind(&data.description)
            .bind(data.num_employees)
            .bind(&data.logo_url)
            .fetch_one(pool)
            .await?;

        tracing::info!("Created company {}", company.handle);
        Ok(company)
    }

    /// Build the search statement without running it.
    pub fn find_all_sql(filter: &CompanyFilter) -> Result<SqlResult, ValidationError> {
        let mut sql = FilterWhere::generate(filter)?;
        sql.query = format!(
            "SELECT {} FROM companies{} ORDER BY name",
            COMPANY_COLUMNS,
            sql.where_sql()
        );
        Ok(sql)
    }

    pub async fn find_all(pool: &PgPool, filter: &CompanyFilter) -> Result<Vec<Company>, DatabaseError> {
        let sql = Self::find_all_sql(filter)?;
        fetch_all_as(pool, &sql).await
    }

    /// Company plus all of its jobs; a company without jobs gets an empty list.
    pub async fn get(pool: &PgPool, handle: &str) -> Result<CompanyDetail, DatabaseError> {
        let sql = SqlResult {
            query: format!("SELECT {} FROM companies WHERE handle = $1", COMPANY_COLUMNS),
            params: vec![Value::from(handle)],
        };
        let company = fetch_optional_as::<Company>(pool, &sql)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))?;

        let jobs = Job::find_for_company(pool, handle, &CompanyJobFilter::default()).await?;
        Ok(CompanyDetail { company, jobs })
    }

    /// Build the partial update statement without running it.
    pub fn update_sql(handle: &str, data: &UpdatePayload) -> Result<SqlResult, ValidationError> {
        let mut sql = sql_for_partial_update(data, COMPANY_ALIASES)?;
        let handle_idx = sql.next_placeholder();
        sql.query = format!(
            "UPDATE companies SET {} WHERE handle = {} RETURNING {}",
            sql.query, handle_idx, COMPANY_COLUMNS
        );
        sql.params.push(Value::from(handle));
        Ok(sql)
    }

    pub async fn update(pool: &PgPool, handle: &str, data: &UpdatePayload) -> Result<Company, DatabaseError> {
        let sql = Self::update_sql(handle, data)?;
        fetch_optional_as::<Company>(pool, &sql)
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("No company: {}", handle)))
    }

    pub async fn remove(pool: &PgPool, handle: &str) -> Result<(), DatabaseError> {
        let removed = sqlx::query_scalar::<_, String>("DELETE FROM companies WHERE handle = $1 RETURNING handle")
            .bind(handle)
            .fetch_optional(pool)
            .await?;
        match removed {
            Some(_) => Ok(()),
            None => Err(DatabaseError::NotFound(format!("No company: {}", handle))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_filter_is_case_insensitive_substring() {
        let filter = CompanyFilter { name: Some("1".into()), ..Default::default() };
        let sql = Company::find_all_sql(&filter).unwrap();
        assert!(sql.query.contains(" WHERE name ILIKE $1 ORDER BY name"), "{}", sql.query);
        assert_eq!(sql.params, vec![json!("%1%")]);
    }

    #[test]
    fn inverted_employee_range_is_rejected() {
        let filter = CompanyFilter { min_employees: Some(4), max_employees: Some(2), ..Default::default() };
        assert!(matches!(
            Company::find_all_sql(&filter),
            Err(ValidationError::InvertedRange { .. })
        ));
    }

    #[test]
    fn no_filter_selects_everything() {
        let sql = Company::find_all_sql(&CompanyFilter::default()).unwrap();
        assert!(!sql.query.contains("WHERE"));
        assert!(sql.query.ends_with("FROM companies ORDER BY name"));
        assert!(sql.params.is_empty());
    }

    #[test]
    fn all_filters_in_fixed_order() {
        let filter = CompanyFilter {
            name: Some("c".into()),
            min_employees: Some(0),
            max_employees: Some(2),
        };
        let sql = Company::find_all_sql(&filter).unwrap();
        assert!(sql
            .query
            .contains("WHERE num_employees >= $1 AND num_employees <= $2 AND name ILIKE $3"));
        assert_eq!(sql.params, vec![json!(0), json!(2), json!("%c%")]);
    }

    #[test]
    fn update_appends_handle_placeholder() {
        let update: CompanyUpdate = serde_json::from_value(json!({
            "name": "New",
            "numEmployees": 10,
            "logoUrl": null
        }))
        .unwrap();
        let payload = UpdatePayload::from(update);
        let sql = Company::update_sql("c1", &payload).unwrap();
        assert!(sql
            .query
            .starts_with("UPDATE companies SET \"name\"=$1, \"num_employees\"=$2, \"logo_url\"=$3 WHERE handle = $4"));
        assert_eq!(sql.params, vec![json!("New"), json!(10), Value::Null, json!("c1")]);
    }

    #[test]
    fn empty_update_is_rejected() {
        let update: CompanyUpdate = serde_json::from_value(json!({})).unwrap();
        assert_eq!(
            Company::update_sql("c1", &update.into()).unwrap_err(),
            ValidationError::NoData
        );
    }

    #[test]
    fn handle_cannot_be_updated() {
        assert!(serde_json::from_value::<CompanyUpdate>(json!({"handle": "x"})).is_err());
    }

    #[test]
    fn new_company_validation() {
        let mut company = NewCompany {
            handle: "new".into(),
            name: "New".into(),
            description: Some("New Description".into()),
            num_employees: Some(1),
            logo_url: Some("http://new.img".into()),
        };
        assert!(company.validate().is_ok());
        company.logo_url = Some("not-a-url".into());
        assert!(company.validate().is_err());
        company.logo_url = None;
        company.num_employees = Some(-1);
        assert!(company.validate().is_err());
    }

    #[test]
    fn detail_serializes_jobs_list() {
        let detail = CompanyDetail {
            company: Company {
                handle: "c3".into(),
                name: "C3".into(),
                description: None,
                num_employees: Some(3),
                logo_url: None,
            },
            jobs: vec![],
        };
        let v = serde_json::to_value(&detail).unwrap();
        assert_eq!(v["handle"], "c3");
        assert_eq!(v["numEmployees"], 3);
        assert_eq!(v["jobs"], json!([]));
    }
}

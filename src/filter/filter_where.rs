use serde_json::Value;

use super::error::ValidationError;
use super::types::{FilterField, PredicateKind, SearchCriteria, SqlResult};

pub struct FilterWhere {
    param_values: Vec<Value>,
    param_index: usize,
    conditions: Vec<String>,
}

impl FilterWhere {
    /// Start numbering placeholders after `starting_param_index`.
    pub fn new(starting_param_index: usize) -> Self {
        Self {
            param_values: vec![],
            param_index: starting_param_index,
            conditions: vec![],
        }
    }

    /// Continue after parameters the caller already placed in the statement.
    /// The seed values are returned ahead of the generated ones.
    pub fn with_params(seed: Vec<Value>) -> Self {
        Self {
            param_index: seed.len(),
            param_values: seed,
            conditions: vec![],
        }
    }

    pub fn generate<C: SearchCriteria>(criteria: &C) -> Result<SqlResult, ValidationError> {
        Self::new(0).build(criteria)
    }

    pub fn build<C: SearchCriteria>(mut self, criteria: &C) -> Result<SqlResult, ValidationError> {
        Self::validate(criteria)?;

        for field in C::FIELDS {
            if let Some(value) = criteria.value(field.key) {
                if let Some(sql) = self.build_sql_condition(field, value) {
                    self.conditions.push(sql);
                }
            }
        }

        Ok(SqlResult {
            query: self.conditions.join(" AND "),
            params: self.param_values,
        })
    }

    /// Reject inverted ranges: any `AtLeast`/`AtMost` pair on the same column
    /// where both bounds are present and lower > upper.
    pub fn validate<C: SearchCriteria>(criteria: &C) -> Result<(), ValidationError> {
        let lowers = C::FIELDS.iter().filter(|f| f.kind == PredicateKind::AtLeast);
        for lower in lowers {
            let upper = C::FIELDS
                .iter()
                .find(|f| f.kind == PredicateKind::AtMost && f.column == lower.column);
            let Some(upper) = upper else { continue };

            if let (Some(lo), Some(hi)) = (criteria.value(lower.key), criteria.value(upper.key)) {
                if let (Some(l), Some(h)) = (lo.as_f64(), hi.as_f64()) {
                    if l > h {
                        return Err(ValidationError::InvertedRange {
                            column: lower.column.to_string(),
                            lower: lo.to_string(),
                            upper: hi.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn build_sql_condition(&mut self, field: &FilterField, data: Value) -> Option<String> {
        let column = field.column;
        match field.kind {
            PredicateKind::Contains => {
                let needle = match data {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                Some(format!("{} ILIKE {}", column, self.param(Value::String(format!("%{}%", needle)))))
            }
            PredicateKind::AtLeast => Some(format!("{} >= {}", column, self.param(data))),
            PredicateKind::AtMost => Some(format!("{} <= {}", column, self.param(data))),
            PredicateKind::Positive => match data {
                Value::Bool(true) => Some(format!("{} > 0", column)),
                _ => None,
            },
            PredicateKind::Equals => Some(format!("{} = {}", column, self.param(data))),
        }
    }

    fn param(&mut self, value: Value) -> String {
        self.param_values.push(value);
        self.param_index += 1;
        format!("${}", self.param_index)
    }
}

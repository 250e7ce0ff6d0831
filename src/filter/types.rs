use serde_json::Value;

/// Static translation table from external (camelCase) field names to column names.
/// Names missing from the table are used as the column name unchanged.
pub type AliasMap = &'static [(&'static str, &'static str)];

pub fn resolve_column<'a>(aliases: AliasMap, key: &'a str) -> &'a str {
    aliases
        .iter()
        .find(|(external, _)| *external == key)
        .map(|(_, column)| *column)
        .unwrap_or(key)
}

/// Predicate shapes a search criterion can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredicateKind {
    /// `column ILIKE $n` with the value wrapped in `%…%`
    Contains,
    /// `column >= $n`
    AtLeast,
    /// `column <= $n`
    AtMost,
    /// `column > 0`, no placeholder; only emitted when the flag is `true`
    Positive,
    /// `column = $n`
    Equals,
}

/// One row of an entity's recognized-criteria table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub key: &'static str,
    pub column: &'static str,
    pub kind: PredicateKind,
}

impl FilterField {
    pub const fn new(key: &'static str, column: &'static str, kind: PredicateKind) -> Self {
        Self { key, column, kind }
    }
}

/// Typed search criteria for one entity.
///
/// `FIELDS` fixes both the recognized keys and the order predicates are emitted in,
/// so identical criteria always produce identical SQL. `value` returns `None` only
/// when the caller did not supply the key; zero and the empty string are values.
pub trait SearchCriteria {
    const FIELDS: &'static [FilterField];

    fn value(&self, key: &str) -> Option<Value>;
}

/// Ordered, key-unique set of field updates.
///
/// Insertion order decides placeholder numbering. Setting a key twice replaces
/// the value but keeps the original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    fields: Vec<(String, Value)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for UpdatePayload {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut payload = Self::new();
        for (k, v) in iter {
            payload.set(k, v);
        }
        payload
    }
}

/// A clause fragment plus its positional parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlResult {
    pub query: String,
    pub params: Vec<Value>,
}

impl SqlResult {
    /// Placeholder for the next parameter a caller appends after these.
    pub fn next_placeholder(&self) -> String {
        format!("${}", self.params.len() + 1)
    }

    /// ` WHERE <clause>`, or nothing when no predicate was produced.
    pub fn where_sql(&self) -> String {
        if self.query.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.query)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resolve_column_uses_alias_or_passes_through() {
        const ALIASES: AliasMap = &[("numEmployees", "num_employees")];
        assert_eq!(resolve_column(ALIASES, "numEmployees"), "num_employees");
        assert_eq!(resolve_column(ALIASES, "name"), "name");
        assert_eq!(resolve_column(&[], "logoUrl"), "logoUrl");
    }

    #[test]
    fn payload_set_replaces_in_place() {
        let payload = UpdatePayload::new()
            .with("a", 1)
            .with("b", 2)
            .with("a", 3);
        let entries: Vec<_> = payload.iter().map(|(k, v)| (k.to_string(), v.clone())).collect();
        assert_eq!(entries, vec![("a".to_string(), json!(3)), ("b".to_string(), json!(2))]);
    }

    #[test]
    fn where_sql_is_empty_without_predicates() {
        assert_eq!(SqlResult::default().where_sql(), "");
        let r = SqlResult { query: "name ILIKE $1".into(), params: vec![json!("%a%")] };
        assert_eq!(r.where_sql(), " WHERE name ILIKE $1");
        assert_eq!(r.next_placeholder(), "$2");
    }
}

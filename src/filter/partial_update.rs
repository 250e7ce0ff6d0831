use super::error::ValidationError;
use super::types::{resolve_column, AliasMap, SqlResult, UpdatePayload};

/// Build the `SET` portion of a partial `UPDATE`.
///
/// `{firstName: "Aliya", age: 32}` with `{firstName: "first_name"}` becomes
/// `"first_name"=$1, "age"=$2` with params `["Aliya", 32]`. Values only ever
/// travel as parameters.
pub fn sql_for_partial_update(
    payload: &UpdatePayload,
    aliases: AliasMap,
) -> Result<SqlResult, ValidationError> {
    if payload.is_empty() {
        return Err(ValidationError::NoData);
    }

    let (cols, params): (Vec<String>, Vec<_>) = payload
        .iter()
        .enumerate()
        .map(|(idx, (key, value))| {
            let column = quote_identifier(resolve_column(aliases, key));
            (format!("{}=${}", column, idx + 1), value.clone())
        })
        .unzip();

    Ok(SqlResult { query: cols.join(", "), params })
}

pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

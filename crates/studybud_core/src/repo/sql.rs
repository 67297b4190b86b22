//! Small SQL building helpers shared by repositories.

use rusqlite::types::Value;

/// Current time as Unix epoch milliseconds, evaluated by SQLite.
pub(crate) const NOW_MS_SQL: &str = "(strftime('%s', 'now') * 1000)";

/// Accumulates `column = ?` assignments for a partial `UPDATE`.
#[derive(Debug, Default)]
pub(crate) struct SetClause {
    assignments: Vec<String>,
    values: Vec<Value>,
}

impl SetClause {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set(&mut self, column: &'static str, value: Value) {
        self.assignments.push(format!("{column} = ?"));
        self.values.push(value);
    }

    /// Assigns a SQL expression with no bound parameter.
    pub(crate) fn set_expr(&mut self, column: &'static str, expr: &'static str) {
        self.assignments.push(format!("{column} = {expr}"));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Renders `UPDATE table SET ... WHERE id = ?` with the id bound last.
    pub(crate) fn into_update(self, table: &'static str, id: i64) -> (String, Vec<Value>) {
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?;",
            self.assignments.join(", ")
        );
        let mut values = self.values;
        values.push(Value::Integer(id));
        (sql, values)
    }
}

pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

pub(crate) fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, text)
}

pub(crate) fn optional_integer(value: Option<i64>) -> Value {
    value.map_or(Value::Null, Value::Integer)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

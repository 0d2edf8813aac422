use crate::config::Dialect;
use crate::patch::column_addition::{ColumnAddition, DefaultValue, Nullability};

/// Names are always quoted and therefore case-sensitive on PostgreSQL.
pub fn quote_identifier(dialect: Dialect, name: &str) -> String {
    match dialect {
        Dialect::Postgres => format!("\"{}\"", name.replace('"', "\"\"")),
        Dialect::MySql => format!("`{}`", name.replace('`', "``")),
    }
}

fn render_default(default_value: &DefaultValue) -> String {
    match default_value {
        DefaultValue::Null => "NULL".to_string(),
        DefaultValue::Boolean(true) => "TRUE".to_string(),
        DefaultValue::Boolean(false) => "FALSE".to_string(),
        DefaultValue::Integer(value) => value.to_string(),
        DefaultValue::Text(value) => format!("'{}'", value.replace('\'', "''")),
    }
}

/// Builds the `ALTER TABLE ... ADD COLUMN` statement for one addition.
///
/// When `guarded` is set the statement carries `IF NOT EXISTS`, which only
/// engines reporting [`Dialect::supports_if_not_exists`] accept.
pub fn build_add_column_query(
    dialect: Dialect,
    addition: &ColumnAddition,
    guarded: bool,
) -> String {
    let mut query = format!(
        "ALTER TABLE {} ADD COLUMN ",
        quote_identifier(dialect, &addition.table_name)
    );

    if guarded {
        query.push_str("IF NOT EXISTS ");
    }

    query.push_str(&quote_identifier(dialect, &addition.column_name));
    query.push(' ');
    query.push_str(&addition.column_type.to_string());

    let nullable_property = match addition.nullability {
        Nullability::Null => "NULL",
        Nullability::NotNull => "NOT NULL",
    };
    query.push(' ');
    query.push_str(nullable_property);

    query.push_str(" DEFAULT ");
    query.push_str(&render_default(&addition.default_value));

    query
}

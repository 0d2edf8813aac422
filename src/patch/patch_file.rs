use std::fs;
use std::path::Path;

use toml::Value;

use crate::error::PatchError;
use crate::patch::column_addition::{ColumnAddition, ColumnType, DefaultValue, Nullability};

/// Reads a `[[columns]]` TOML patch file.
///
/// Names are used exactly as written and always quoted, so on PostgreSQL a
/// `table = "Vehicles"` targets `"Vehicles"`, not the folded `vehicles`.
pub fn load_patch_file(path: &Path) -> Result<Vec<ColumnAddition>, PatchError> {
    let content = fs::read_to_string(path).map_err(|err| {
        PatchError::Configuration(format!("Cannot read patch file {}: {}", path.display(), err))
    })?;

    let value = content.parse::<Value>().map_err(|err| {
        PatchError::Configuration(format!("Invalid patch file {}: {}", path.display(), err))
    })?;

    parse_patches(value)
}

pub(crate) fn parse_patches(value: Value) -> Result<Vec<ColumnAddition>, PatchError> {
    let columns = value
        .get("columns")
        .and_then(|value| value.as_array())
        .ok_or_else(|| invalid("Missing or invalid columns table"))?;

    columns.iter().map(parse_column).collect()
}

fn parse_column(value: &Value) -> Result<ColumnAddition, PatchError> {
    let column_table = value
        .as_table()
        .ok_or_else(|| invalid("Invalid column format"))?;

    let table_name = column_table
        .get("table")
        .and_then(|value| value.as_str())
        .ok_or_else(|| invalid("Missing or invalid 'table' field"))?;

    let column_name = column_table
        .get("column")
        .and_then(|value| value.as_str())
        .ok_or_else(|| invalid("Missing or invalid 'column' field"))?;

    let column_type = column_table
        .get("type")
        .and_then(|value| value.as_str())
        .and_then(ColumnType::from_str)
        .ok_or_else(|| invalid(&format!("Missing or invalid 'type' field for {}", column_name)))?;

    let default_value = match column_table.get("default") {
        None => DefaultValue::Null,
        Some(Value::Boolean(value)) => DefaultValue::Boolean(*value),
        Some(Value::Integer(value)) => DefaultValue::Integer(*value),
        Some(Value::String(value)) => DefaultValue::Text(value.clone()),
        Some(_) => {
            return Err(invalid(&format!(
                "Unsupported 'default' value for {}",
                column_name
            )))
        }
    };

    let nullable = match column_table.get("nullable") {
        None => false,
        Some(Value::Boolean(value)) => *value,
        Some(_) => {
            return Err(invalid(&format!(
                "'nullable' must be true or false for {}",
                column_name
            )))
        }
    };

    let nullability = if nullable {
        Nullability::Null
    } else {
        Nullability::NotNull
    };

    ColumnAddition::new(
        table_name,
        column_name,
        column_type,
        default_value,
        nullability,
    )
}

fn invalid(message: &str) -> PatchError {
    PatchError::Configuration(format!("Patch file: {}", message))
}

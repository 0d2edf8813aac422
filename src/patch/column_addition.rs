use std::fmt;

use crate::error::PatchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Integer,
    BigInt,
    Text,
}

impl ColumnType {
    pub(crate) fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "boolean" | "bool" => Some(ColumnType::Boolean),
            "integer" | "int" => Some(ColumnType::Integer),
            "bigint" => Some(ColumnType::BigInt),
            "text" => Some(ColumnType::Text),
            _ => None,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColumnType::Boolean => write!(f, "BOOLEAN"),
            ColumnType::Integer => write!(f, "INTEGER"),
            ColumnType::BigInt => write!(f, "BIGINT"),
            ColumnType::Text => write!(f, "TEXT"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Text(String),
}

impl DefaultValue {
    fn fits(&self, column_type: ColumnType) -> bool {
        matches!(
            (self, column_type),
            (DefaultValue::Null, _)
                | (DefaultValue::Boolean(_), ColumnType::Boolean)
                | (DefaultValue::Integer(_), ColumnType::Integer)
                | (DefaultValue::Integer(_), ColumnType::BigInt)
                | (DefaultValue::Text(_), ColumnType::Text)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nullability {
    Null,
    NotNull,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnAddition {
    pub table_name: String,
    pub column_name: String,
    pub column_type: ColumnType,
    pub default_value: DefaultValue,
    pub nullability: Nullability,
}

impl ColumnAddition {
    pub fn new(
        table_name: &str,
        column_name: &str,
        column_type: ColumnType,
        default_value: DefaultValue,
        nullability: Nullability,
    ) -> Result<Self, PatchError> {
        let addition = ColumnAddition {
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            column_type,
            default_value,
            nullability,
        };

        addition.validate()?;
        Ok(addition)
    }

    fn validate(&self) -> Result<(), PatchError> {
        if self.table_name.trim().is_empty() || self.column_name.trim().is_empty() {
            return Err(PatchError::Configuration(
                "Table and column names must not be empty".to_string(),
            ));
        }

        if !self.default_value.fits(self.column_type) {
            return Err(PatchError::Configuration(format!(
                "Default {:?} does not match type {} of {}.{}",
                self.default_value, self.column_type, self.table_name, self.column_name
            )));
        }

        if self.default_value == DefaultValue::Null && self.nullability == Nullability::NotNull {
            return Err(PatchError::Configuration(format!(
                "Column {}.{} is NOT NULL and needs a non-null default",
                self.table_name, self.column_name
            )));
        }

        Ok(())
    }
}

/// Column additions shipped with the tool, in the order they are applied.
pub fn builtin_patches() -> Vec<ColumnAddition> {
    vec![
        ColumnAddition {
            table_name: "vehicle_images".to_string(),
            column_name: "vehicle_document_image".to_string(),
            column_type: ColumnType::Boolean,
            default_value: DefaultValue::Boolean(false),
            nullability: Nullability::NotNull,
        },
        ColumnAddition {
            table_name: "vehicles".to_string(),
            column_name: "is_verified".to_string(),
            column_type: ColumnType::Boolean,
            default_value: DefaultValue::Boolean(false),
            nullability: Nullability::NotNull,
        },
    ]
}

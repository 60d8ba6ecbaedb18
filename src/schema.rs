//! Record schema model and YAML persistence.
//!
//! A [`Schema`] is the explicit, statically declared description of one record
//! type: which named columns bind to which typed fields ([`ColumnMeta`]), which
//! fields are derived from others ([`DerivedField`]), the single-character field
//! separator, and the file extension the header validator expects.
//!
//! Schemas are immutable once built. [`Schema::new`] and [`Schema::load`] both
//! enforce the invariants:
//!
//! - at least one stored column
//! - column and derived names unique case-insensitively
//! - derived rules reference existing numeric columns
//! - the separator is a single ASCII character other than a quote or newline

use std::{
    collections::HashSet,
    fmt,
    fs::File,
    io::BufReader,
    path::Path,
    str::FromStr,
};

use anyhow::{Context, Result, anyhow};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{
    data::{Value, normalize_column_name},
    error::{MapperError, MapperResult},
};

pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_EXTENSION: &str = "csv";

/// Field kind. Schema files may spell it with the aliases [`FromStr`] accepts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum ColumnType {
    Integer,
    Float,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Text => "text",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "integer" | "int" => Ok(ColumnType::Integer),
            "float" | "double" => Ok(ColumnType::Float),
            "text" | "string" => Ok(ColumnType::Text),
            _ => Err(anyhow!(
                "Unknown column type '{value}'. Supported types: integer, float, text"
            )),
        }
    }
}

impl TryFrom<String> for ColumnType {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "kind")]
    pub datatype: ColumnType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, datatype: ColumnType) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }

    pub fn matches_header(&self, header: &str) -> bool {
        normalize_column_name(&self.name) == normalize_column_name(header)
    }
}

/// How a derived field is computed from two stored columns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DerivedRule {
    /// `high - low`. Undefined when `high < low`.
    Spread { high: String, low: String },
    /// `numerator / denominator`. Undefined when the denominator is zero.
    Ratio {
        numerator: String,
        denominator: String,
    },
}

impl DerivedRule {
    pub fn inputs(&self) -> [&str; 2] {
        match self {
            DerivedRule::Spread { high, low } => [high, low],
            DerivedRule::Ratio {
                numerator,
                denominator,
            } => [numerator, denominator],
        }
    }

    /// Computes the derived value, or the sentinel of `kind` when either input
    /// is a sentinel or the computation is undefined.
    pub fn evaluate(&self, left: &Value, right: &Value, kind: ColumnType) -> Value {
        if left.is_sentinel() || right.is_sentinel() {
            return Value::sentinel(kind);
        }
        let computed = match (self, left, right) {
            (DerivedRule::Spread { .. }, Value::Integer(high), Value::Integer(low)) => {
                (high >= low)
                    .then(|| high.checked_sub(*low))
                    .flatten()
                    .map(Value::Integer)
            }
            (DerivedRule::Ratio { .. }, Value::Integer(num), Value::Integer(den)) => {
                num.checked_div(*den).map(Value::Integer)
            }
            (rule, left, right) => match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => match rule {
                    DerivedRule::Spread { .. } => (a >= b).then(|| Value::Float(a - b)),
                    DerivedRule::Ratio { .. } => (b != 0.0).then(|| Value::Float(a / b)),
                },
                _ => None,
            },
        };
        match computed {
            Some(value) if value.kind() == kind => value,
            Some(Value::Integer(i)) if kind == ColumnType::Float => Value::Float(i as f64),
            _ => Value::sentinel(kind),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DerivedField {
    pub name: String,
    pub rule: DerivedRule,
}

impl DerivedField {
    pub fn new(name: impl Into<String>, rule: DerivedRule) -> Self {
        Self {
            name: name.into(),
            rule,
        }
    }
}

/// Serialized shape of a schema. Converted into [`Schema`] through validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SchemaDef {
    #[serde(default = "default_delimiter")]
    delimiter: char,
    #[serde(default = "default_extension")]
    extension: String,
    columns: Vec<ColumnMeta>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    derived: Vec<DerivedField>,
}

fn default_delimiter() -> char {
    DEFAULT_DELIMITER
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "SchemaDef", into = "SchemaDef")]
pub struct Schema {
    columns: Vec<ColumnMeta>,
    derived: Vec<DerivedField>,
    delimiter: char,
    extension: String,
}

impl TryFrom<SchemaDef> for Schema {
    type Error = MapperError;

    fn try_from(def: SchemaDef) -> MapperResult<Self> {
        let schema = Schema {
            columns: def.columns,
            derived: def.derived,
            delimiter: def.delimiter,
            extension: clean_extension(&def.extension),
        };
        schema.validate()?;
        Ok(schema)
    }
}

impl From<Schema> for SchemaDef {
    fn from(schema: Schema) -> Self {
        SchemaDef {
            delimiter: schema.delimiter,
            extension: schema.extension,
            columns: schema.columns,
            derived: schema.derived,
        }
    }
}

impl Schema {
    pub fn new(columns: Vec<ColumnMeta>, derived: Vec<DerivedField>) -> MapperResult<Self> {
        let schema = Schema {
            columns,
            derived,
            delimiter: DEFAULT_DELIMITER,
            extension: DEFAULT_EXTENSION.to_string(),
        };
        schema.validate()?;
        Ok(schema)
    }

    pub fn with_delimiter(mut self, delimiter: char) -> MapperResult<Self> {
        self.delimiter = delimiter;
        self.validate()?;
        Ok(self)
    }

    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = clean_extension(extension);
        self
    }

    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    pub fn derived(&self) -> &[DerivedField] {
        &self.derived
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Separator as the byte the tokenizer expects. Validation guarantees ASCII.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.matches_header(name))
    }

    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.column_index(name).map(|idx| &self.columns[idx])
    }

    /// Kind of a derived field: integer when every input is integer.
    pub fn derived_kind(&self, field: &DerivedField) -> ColumnType {
        let all_integer = field.rule.inputs().iter().all(|input| {
            self.column(input)
                .is_some_and(|c| c.datatype == ColumnType::Integer)
        });
        if all_integer {
            ColumnType::Integer
        } else {
            ColumnType::Float
        }
    }

    /// Stored column names followed by derived names, in record field order.
    pub fn field_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.name.clone())
            .chain(self.derived.iter().map(|d| d.name.clone()))
            .collect()
    }

    pub fn field_kind(&self, name: &str) -> Option<ColumnType> {
        if let Some(column) = self.column(name) {
            return Some(column.datatype);
        }
        self.derived
            .iter()
            .find(|d| normalize_column_name(&d.name) == normalize_column_name(name))
            .map(|d| self.derived_kind(d))
    }

    pub fn expected_columns(&self) -> String {
        self.columns.iter().map(|c| c.name.as_str()).join(", ")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening schema file {path:?}"))?;
        let reader = BufReader::new(file);
        let schema: Schema = serde_yaml::from_reader(reader).context("Parsing schema YAML")?;
        Ok(schema)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Creating schema file {path:?}"))?;
        serde_yaml::to_writer(file, self).context("Writing schema YAML")
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing schema to YAML string")
    }

    fn validate(&self) -> MapperResult<()> {
        if self.columns.is_empty() {
            return Err(MapperError::InvalidSchema(
                "A schema needs at least one column".to_string(),
            ));
        }
        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\r' | '\n') {
            return Err(MapperError::InvalidSchema(format!(
                "Separator {:?} must be a single ASCII character other than a quote or newline",
                self.delimiter
            )));
        }

        let mut seen = HashSet::new();
        let names = self
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.derived.iter().map(|d| d.name.as_str()));
        for name in names {
            let key = normalize_column_name(name);
            if key.is_empty() {
                return Err(MapperError::InvalidSchema(
                    "Field names cannot be blank".to_string(),
                ));
            }
            if !seen.insert(key) {
                return Err(MapperError::InvalidSchema(format!(
                    "Field name '{name}' is declared more than once (names are case-insensitive)"
                )));
            }
        }

        for field in &self.derived {
            for input in field.rule.inputs() {
                match self.column(input) {
                    Some(column) if column.datatype.is_numeric() => {}
                    Some(column) => {
                        return Err(MapperError::InvalidSchema(format!(
                            "Derived field '{}' needs numeric input but '{}' is {}",
                            field.name, column.name, column.datatype
                        )));
                    }
                    None => {
                        return Err(MapperError::InvalidSchema(format!(
                            "Derived field '{}' references unknown column '{input}'",
                            field.name
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn clean_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_string()
}

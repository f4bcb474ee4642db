//! Data handed to templates.

use chrono::{DateTime, Utc};
use futil_core::TypeBindings;
use indexmap::IndexMap;
use serde::Serialize;

use crate::exec::Value;

/// Everything a template can see at `.`: `PackageName`, `Timestamp`,
/// `Types` and `Imports`.
///
/// Imports keep insertion order and duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GenerationContext {
    pub(crate) package_name: String,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) types: TypeBindings,
    pub(crate) imports: Vec<String>,
}

impl GenerationContext {
    /// New context stamped with the current UTC time.
    pub fn new(package_name: impl Into<String>, types: TypeBindings) -> Self {
        Self {
            package_name: package_name.into(),
            timestamp: Utc::now(),
            types,
            imports: Vec::new(),
        }
    }

    pub fn imports<I, S>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
        self
    }

    pub fn import(mut self, path: impl Into<String>) -> Self {
        self.imports.push(path.into());
        self
    }

    /// Pin the timestamp, for reproducible output.
    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn captured_at(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn types(&self) -> &TypeBindings {
        &self.types
    }

    pub fn import_paths(&self) -> &[String] {
        &self.imports
    }

    pub fn to_value(&self) -> Value {
        let types = self
            .types
            .iter()
            .map(|(label, concrete)| (label.to_string(), Value::from(concrete)))
            .collect();
        let imports = self.imports.iter().map(|i| Value::from(i.as_str())).collect();

        let mut fields = IndexMap::with_capacity(4);
        fields.insert("PackageName".to_string(), Value::from(self.package_name.as_str()));
        fields.insert("Timestamp".to_string(), Value::Time(self.timestamp));
        fields.insert("Types".to_string(), Value::Map(types));
        fields.insert("Imports".to_string(), Value::List(imports));
        Value::Record(fields)
    }
}

//! KDL configuration file reader
//!
//! A configuration file is a flat list of `name value` nodes. Every node
//! becomes a [`Setting`]; applying the settings writes them through a
//! [`UserDefsTable`], so unknown names are ignored there.
//!
//! # Example
//!
//! ```kdl
//! winTitle "Demo"
//! winx 1280
//! winy 720
//! grabInput #true
//! colourShadowR 0.5
//! ```

use std::path::Path;

use tracing::debug;

use crate::user_defs::UserDefsTable;
use crate::{Result, Value};

/// One `name value` pair read from a configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    pub name: String,
    pub value: Value,
}

/// KDL configuration reader
pub struct KdlReader;

impl KdlReader {
    /// Parse a KDL configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Setting>> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_string(&content)
    }

    /// Parse KDL configuration text
    ///
    /// A node with one argument maps to that value, several arguments to an
    /// array and no arguments to null.
    pub fn from_string(content: &str) -> Result<Vec<Setting>> {
        let doc: kdl::KdlDocument = content.parse()?;
        Ok(doc
            .nodes()
            .iter()
            .map(|node| {
                let mut args: Vec<Value> = node
                    .entries()
                    .iter()
                    .filter(|e| e.name().is_none())
                    .map(|e| kdl_value_to_value(e.value()))
                    .collect();
                let value = match args.len() {
                    0 => Value::Null,
                    1 => args.remove(0),
                    _ => Value::Array(args),
                };
                Setting {
                    name: node.name().value().to_string(),
                    value,
                }
            })
            .collect())
    }

    /// Write settings through the configuration table
    ///
    /// Returns how many settings named a known field.
    pub fn apply(table: &mut UserDefsTable, settings: &[Setting]) -> usize {
        let mut applied = 0;
        for setting in settings {
            if table.has(&setting.name) && !setting.value.is_null() {
                table.set(&setting.name, &setting.value);
                applied += 1;
            } else {
                debug!("Ignoring setting {}", setting.name);
            }
        }
        applied
    }
}

/// Convert a KDL value to our Value type
pub(crate) fn kdl_value_to_value(kdl_val: &kdl::KdlValue) -> Value {
    match kdl_val {
        kdl::KdlValue::String(s) => Value::String(s.clone()),
        // i128 to i64 - may truncate for very large values
        kdl::KdlValue::Integer(i) => Value::Int(*i as i64),
        kdl::KdlValue::Float(f) => Value::Float(*f),
        kdl::KdlValue::Bool(b) => Value::Bool(*b),
        kdl::KdlValue::Null => Value::Null,
    }
}

//! Configuration validation against the resource catalog.
//!
//! This module checks a `serde_json::Value` against a [`ResourceDef`] before
//! any request is sent: required fields are present, types match, and the
//! declarative rules attached to each field hold (ports in range, enumerated
//! values, URLs that parse, JSON strings that parse).
//!
//! # Example
//!
//! ```
//! use rmon_provider::catalog;
//! use rmon_provider::validation::validate;
//! use serde_json::json;
//!
//! let def = catalog::lookup("rmon_check_tcp").unwrap();
//!
//! let diagnostics = validate(def, &json!({
//!     "name": "db-check",
//!     "place": "agent",
//!     "entities": [12],
//!     "ip": "10.0.0.5",
//!     "port": 5432
//! }));
//! assert!(diagnostics.is_empty());
//!
//! let diagnostics = validate(def, &json!({
//!     "name": "db-check",
//!     "place": "everywhere",
//!     "entities": [],
//!     "ip": "10.0.0.5",
//!     "port": 543210
//! }));
//! assert_eq!(diagnostics.len(), 2);
//! ```

use crate::catalog::{FieldDef, FieldKind, ResourceDef, Rule};
use crate::schema::{Diagnostic, DiagnosticSeverity};
use crate::types::type_name;
use serde_json::Value;

/// Validate a configuration value against a resource definition.
///
/// Returns a list of diagnostics for any validation errors found.
/// An empty list means the value is valid.
///
/// # Validation Rules
///
/// - Required fields must be present and non-null
/// - Optional fields may be absent or null
/// - Field types must match the catalog
/// - Declarative rules (port range, enumerations, URL and JSON syntax) must
///   hold for present values
pub fn validate(def: &ResourceDef, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return diagnostics,
        other => {
            diagnostics.push(
                Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", type_name(other))),
            );
            return diagnostics;
        },
    };

    for field in def.fields() {
        validate_field(field, obj.get(field.name), &mut diagnostics);
    }

    diagnostics
}

/// Validate a configuration value, returning Ok if valid or Err with
/// diagnostics.
///
/// This is a convenience wrapper around [`validate`] that returns a Result.
pub fn validate_result(def: &ResourceDef, value: &Value) -> Result<(), Vec<Diagnostic>> {
    let diagnostics = validate(def, value);
    if diagnostics.is_empty() {
        Ok(())
    } else {
        Err(diagnostics)
    }
}

/// Check if a configuration value is valid against a resource definition.
///
/// Returns `true` if valid, `false` otherwise.
/// Use [`validate`] to get detailed error information.
pub fn is_valid(def: &ResourceDef, value: &Value) -> bool {
    validate(def, value).is_empty()
}

fn validate_field(field: &FieldDef, value: Option<&Value>, diagnostics: &mut Vec<Diagnostic>) {
    match value {
        None | Some(Value::Null) => {
            if field.required {
                diagnostics.push(
                    Diagnostic::error(format!("Missing required attribute '{}'", field.name))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(field.name),
                );
            }
        },
        Some(v) => {
            let before = diagnostics.len();
            validate_kind(field, v, diagnostics);
            // Rules only apply to well-typed values.
            if diagnostics.len() == before {
                validate_rule(field, v, diagnostics);
            }
        },
    }
}

fn validate_kind(field: &FieldDef, value: &Value, diagnostics: &mut Vec<Diagnostic>) {
    match field.kind {
        FieldKind::Str => {
            if !value.is_string() {
                diagnostics.push(type_error(field.name, "string", value));
            }
        },
        FieldKind::Int => {
            if !is_int64(value) {
                diagnostics.push(type_error(field.name, "int64", value));
            }
        },
        FieldKind::Bool => {
            if !value.is_boolean() {
                diagnostics.push(type_error(field.name, "bool", value));
            }
        },
        FieldKind::IntList => {
            if let Some(arr) = value.as_array() {
                for (i, elem) in arr.iter().enumerate() {
                    if !is_int64(elem) {
                        diagnostics.push(type_error(
                            &format!("{}.{}", field.name, i),
                            "int64",
                            elem,
                        ));
                    }
                }
            } else {
                diagnostics.push(type_error(field.name, "list", value));
            }
        },
    }
}

fn validate_rule(field: &FieldDef, value: &Value, diagnostics: &mut Vec<Diagnostic>) {
    match field.rule {
        Rule::Any => {},
        Rule::OneOf(allowed) => {
            if let Some(s) = value.as_str() {
                if !allowed.contains(&s) {
                    diagnostics.push(
                        Diagnostic::error(format!("Invalid value for attribute '{}'", field.name))
                            .with_detail(format!(
                                "Expected one of [{}], got '{}'",
                                allowed.join(", "),
                                s
                            ))
                            .with_attribute(field.name),
                    );
                }
            }
        },
        Rule::PortNumber => {
            if let Some(n) = value.as_i64() {
                if !(1..=65535).contains(&n) {
                    diagnostics.push(
                        Diagnostic::error(format!("Invalid value for attribute '{}'", field.name))
                            .with_detail(format!("Port must be between 1 and 65535, got {}", n))
                            .with_attribute(field.name),
                    );
                }
            }
        },
        Rule::IntAtLeast(min) => {
            if let Some(n) = value.as_i64() {
                if n < min {
                    diagnostics.push(
                        Diagnostic::error(format!("Invalid value for attribute '{}'", field.name))
                            .with_detail(format!("Value must be at least {}, got {}", min, n))
                            .with_attribute(field.name),
                    );
                }
            }
        },
        Rule::IntBetween(min, max) => {
            if let Some(n) = value.as_i64() {
                if !(min..=max).contains(&n) {
                    diagnostics.push(
                        Diagnostic::error(format!("Invalid value for attribute '{}'", field.name))
                            .with_detail(format!(
                                "Value must be between {} and {}, got {}",
                                min, max, n
                            ))
                            .with_attribute(field.name),
                    );
                }
            }
        },
        Rule::HttpUrl => {
            if let Some(s) = value.as_str() {
                let ok = url::Url::parse(s)
                    .map(|u| matches!(u.scheme(), "http" | "https"))
                    .unwrap_or(false);
                if !ok {
                    diagnostics.push(
                        Diagnostic::error(format!("Invalid value for attribute '{}'", field.name))
                            .with_detail(format!("Expected an http or https URL, got '{}'", s))
                            .with_attribute(field.name),
                    );
                }
            }
        },
        Rule::JsonString => {
            if let Some(s) = value.as_str() {
                if !s.is_empty() && serde_json::from_str::<Value>(s).is_err() {
                    diagnostics.push(
                        Diagnostic::error(format!("Invalid value for attribute '{}'", field.name))
                            .with_detail("Expected a valid JSON document")
                            .with_attribute(field.name),
                    );
                }
            }
        },
    }
}

fn is_int64(value: &Value) -> bool {
    match value {
        Value::Number(n) => {
            if n.as_i64().is_some() {
                true
            } else if let Some(f) = n.as_f64() {
                f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
            } else {
                false
            }
        },
        _ => false,
    }
}

fn type_error(path: &str, expected: &str, got: &Value) -> Diagnostic {
    Diagnostic {
        severity: DiagnosticSeverity::Error,
        summary: format!("Invalid type for attribute '{}'", path),
        detail: Some(format!("Expected {}, got {}", expected, type_name(got))),
        attribute: Some(path.to_string()),
    }
}

//! # Validation Engine
//!
//! Recursively checks an untyped [`Value`] tree against a
//! [`TypeDescriptor`], collecting path-qualified messages. Validation never
//! coerces: a numeric string is not an integer here, even though the
//! translator will later accept one. The single exception is the schema
//! convention that a whole number is a valid float.
//!
//! Errors accumulate — every element of a collection and every field of a
//! struct is checked even after the first failure, so a caller can repair a
//! request in one round trip. Only a container-kind mismatch stops recursion
//! into that subtree.

use crate::descriptor::{PrimitiveKind, StructTable, TypeDescriptor};
use crate::value::{Value, ValueKind};

/// Validate one value against one descriptor.
///
/// Returns an empty vector iff the value is acceptable. Messages are
/// path-qualified by the collection/struct rules as recursion unwinds;
/// the caller seeds the top-level path by wrapping with the argument name.
pub fn validate_value(value: &Value, ty: &TypeDescriptor, structs: &StructTable) -> Vec<String> {
    match ty {
        TypeDescriptor::Primitive(kind) => validate_primitive(value, *kind),
        TypeDescriptor::Enum(e) => {
            let valid = match value {
                Value::String(s) => e.names_to_values.contains_key(s),
                Value::Int(i) => i32::try_from(*i)
                    .map(|code| e.values_to_names.contains_key(&code))
                    .unwrap_or(false),
                _ => false,
            };
            if valid {
                Vec::new()
            } else {
                vec![format!("Value is not in enum '{}'", e.name)]
            }
        }
        TypeDescriptor::List(element) => match value {
            Value::List(items) => items
                .iter()
                .enumerate()
                .flat_map(|(index, item)| {
                    validate_value(item, element, structs)
                        .into_iter()
                        .map(move |msg| format!("Index {index}: {msg}"))
                })
                .collect(),
            other => vec![mismatch("list", other.kind())],
        },
        TypeDescriptor::Set(element) => match value {
            Value::Set(items) => items
                .iter()
                .flat_map(|item| validate_value(item, element, structs))
                .map(|msg| format!("Invalid value in set: {msg}"))
                .collect(),
            other => vec![mismatch("set", other.kind())],
        },
        TypeDescriptor::Map(key_ty, value_ty) => match value {
            Value::Map(entries) => {
                let mut errors = Vec::new();
                for (key, entry_value) in entries {
                    let shown = key.key_display();
                    for msg in validate_value(key, key_ty, structs) {
                        errors.push(format!("Key '{shown}' in map invalid: '{msg}'"));
                    }
                    for msg in validate_value(entry_value, value_ty, structs) {
                        errors.push(format!("Value for key '{shown}' in map invalid: '{msg}'"));
                    }
                }
                errors
            }
            other => vec![mismatch("map", other.kind())],
        },
        TypeDescriptor::Struct(name) => {
            let Some(descriptor) = structs.get(name) else {
                return vec![format!("Struct '{name}' has no definition in this schema")];
            };
            match value {
                Value::Map(_) => {
                    let mut errors = Vec::new();
                    for field in &descriptor.fields {
                        match value.get(&field.name) {
                            Some(field_value) => {
                                for msg in validate_value(field_value, &field.ty, structs) {
                                    errors.push(format!(
                                        "Error with field '{}': {msg}",
                                        field.name
                                    ));
                                }
                            }
                            None if field.required => {
                                errors
                                    .push(format!("Required Field '{}' not found", field.name));
                            }
                            None => {}
                        }
                    }
                    errors
                }
                other => vec![mismatch("map", other.kind())],
            }
        }
    }
}

fn validate_primitive(value: &Value, kind: PrimitiveKind) -> Vec<String> {
    match kind {
        PrimitiveKind::Bool => match value {
            Value::Bool(_) => Vec::new(),
            other => vec![mismatch("boolean", other.kind())],
        },
        PrimitiveKind::Byte | PrimitiveKind::I16 | PrimitiveKind::I32 | PrimitiveKind::I64 => {
            match value {
                Value::Int(i) => {
                    // integer_bounds is total over the four widths matched here
                    let (min, max) = kind.integer_bounds().unwrap_or((i128::MIN, i128::MAX));
                    if *i > max {
                        vec![format!(
                            "Value is too large to be a {}",
                            kind.display_name()
                        )]
                    } else if *i < min {
                        vec![format!(
                            "Value is too small to be a {}",
                            kind.display_name()
                        )]
                    } else {
                        Vec::new()
                    }
                }
                other => vec![mismatch(kind.display_name(), other.kind())],
            }
        }
        PrimitiveKind::Double => match value {
            Value::Float(_) | Value::Int(_) => Vec::new(),
            other => vec![mismatch("float", other.kind())],
        },
        PrimitiveKind::String => match value {
            Value::String(_) => Vec::new(),
            other => vec![mismatch("string", other.kind())],
        },
        PrimitiveKind::Binary => match value {
            Value::Bytes(_) => Vec::new(),
            other => vec![mismatch("binary", other.kind())],
        },
    }
}

fn mismatch(expected: &str, got: ValueKind) -> String {
    format!("Expected {expected} but got {got}")
}

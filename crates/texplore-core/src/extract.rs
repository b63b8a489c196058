//! # Schema Extractor
//!
//! Rebuilds the recursive [`TypeDescriptor`] model from the raw metadata the
//! IDL loader produces for one schema file. Extraction is pure and
//! deterministic: identical raw metadata always yields a structurally-equal
//! descriptor tree, which the tests rely on for equality-based assertions.
//!
//! Struct references resolve to name-indirection, so a struct that mentions
//! its own type (directly or through an ancestor) extracts without cycle
//! detection: recursion here walks *definitions*, which are finite, and the
//! indirection is resolved again lazily when values are validated or
//! translated.

use std::collections::{BTreeMap, BTreeSet};

use crate::descriptor::{
    EnumDescriptor, FieldDescriptor, OperationDescriptor, SchemaDescriptor, ServiceDescriptor,
    StructDescriptor, TypeDescriptor,
};
use crate::error::ExtractError;
use crate::raw::{RawField, RawSchema, RawType};

/// Extract one schema file's descriptors from raw loader metadata.
pub fn extract_schema(schema_file: &str, raw: &RawSchema) -> Result<SchemaDescriptor, ExtractError> {
    let mut structs = BTreeMap::new();
    for (name, fields) in &raw.structs {
        structs.insert(
            name.clone(),
            StructDescriptor {
                name: name.clone(),
                fields: extract_fields(schema_file, name, fields, raw)?,
            },
        );
    }

    let mut services = BTreeMap::new();
    for (service_name, service) in &raw.services {
        let mut operations = BTreeMap::new();
        for op in &service.operations {
            let owner = format!("{}.{}", service_name, op.name);
            let args = extract_fields(schema_file, &owner, &op.args, raw)?;
            let mut results = Vec::with_capacity(op.results.len());
            for result in &op.results {
                results.push(extract_field(schema_file, &result.field, raw)?);
            }
            operations.insert(
                op.name.clone(),
                OperationDescriptor {
                    name: op.name.clone(),
                    args,
                    results,
                },
            );
        }
        services.insert(
            service_name.clone(),
            ServiceDescriptor {
                schema_file: schema_file.to_string(),
                name: service_name.clone(),
                operations,
            },
        );
    }

    Ok(SchemaDescriptor {
        schema_file: schema_file.to_string(),
        structs,
        services,
    })
}

fn extract_fields(
    schema_file: &str,
    owner: &str,
    fields: &[RawField],
    raw: &RawSchema,
) -> Result<Vec<FieldDescriptor>, ExtractError> {
    let mut seen_ids = BTreeSet::new();
    let mut out = Vec::with_capacity(fields.len());
    for field in fields {
        if !seen_ids.insert(field.id) {
            return Err(ExtractError::DuplicateFieldId {
                owner: owner.to_string(),
                field_id: field.id,
            });
        }
        out.push(extract_field(schema_file, field, raw)?);
    }
    Ok(out)
}

fn extract_field(
    schema_file: &str,
    field: &RawField,
    raw: &RawSchema,
) -> Result<FieldDescriptor, ExtractError> {
    Ok(FieldDescriptor {
        field_id: field.id,
        name: field.name.clone(),
        ty: extract_type(schema_file, &field.ty, raw)?,
        required: field.required,
    })
}

fn extract_type(
    schema_file: &str,
    ty: &RawType,
    raw: &RawSchema,
) -> Result<TypeDescriptor, ExtractError> {
    match ty {
        RawType::Primitive(kind) => Ok(TypeDescriptor::Primitive(*kind)),
        RawType::List(inner) => Ok(TypeDescriptor::List(Box::new(extract_type(
            schema_file,
            inner,
            raw,
        )?))),
        RawType::Set(inner) => Ok(TypeDescriptor::Set(Box::new(extract_type(
            schema_file,
            inner,
            raw,
        )?))),
        RawType::Map(key, value) => Ok(TypeDescriptor::Map(
            Box::new(extract_type(schema_file, key, raw)?),
            Box::new(extract_type(schema_file, value, raw)?),
        )),
        RawType::Named(name) => {
            if let Some(symbols) = raw.enums.get(name) {
                Ok(TypeDescriptor::Enum(extract_enum(name, symbols)?))
            } else if raw.structs.contains_key(name) {
                Ok(TypeDescriptor::Struct(name.clone()))
            } else {
                Err(ExtractError::UnknownType {
                    schema_file: schema_file.to_string(),
                    name: name.clone(),
                })
            }
        }
    }
}

fn extract_enum(name: &str, symbols: &[(String, i32)]) -> Result<EnumDescriptor, ExtractError> {
    let mut names_to_values = BTreeMap::new();
    let mut values_to_names = BTreeMap::new();
    for (symbol, code) in symbols {
        if names_to_values.insert(symbol.clone(), *code).is_some() {
            return Err(ExtractError::EnumNotInvertible {
                name: name.to_string(),
                kind: "name",
                symbol: symbol.clone(),
            });
        }
        if values_to_names.insert(*code, symbol.clone()).is_some() {
            return Err(ExtractError::EnumNotInvertible {
                name: name.to_string(),
                kind: "value",
                symbol: code.to_string(),
            });
        }
    }
    Ok(EnumDescriptor {
        name: name.to_string(),
        names_to_values,
        values_to_names,
    })
}

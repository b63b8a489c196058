//! # Value Translator
//!
//! Two independent, mirrored recursive routines sharing the validation
//! engine's dispatch shape.
//!
//! [`to_native`] converts an already-validated [`Value`] tree into the
//! [`NativeValue`] the wire codec requires. This direction is descriptor-
//! driven and lenient where the schema convention allows: integers narrow to
//! their exact width, numeric strings parse for numeric fields, enums accept
//! a symbolic name or a code and always emit the code.
//!
//! [`from_native`] converts whatever the wire produced back into a value
//! tree. This direction dispatches on the native value's own shape, not on
//! declared types — return values self-describe their field layout, so no
//! descriptor is consulted.

use crate::descriptor::{FieldDescriptor, OperationDescriptor, PrimitiveKind, StructTable,
    TypeDescriptor};
use crate::error::TranslateError;
use crate::native::{NativeField, NativeValue};
use crate::value::Value;

/// Tag key marking a translated struct in a response value tree.
pub const TYPE_TAG: &str = "__type_tag__";

/// Convert a validated value tree into the native representation for a call.
pub fn to_native(
    value: &Value,
    ty: &TypeDescriptor,
    structs: &StructTable,
) -> Result<NativeValue, TranslateError> {
    match ty {
        TypeDescriptor::Primitive(kind) => primitive_to_native(value, *kind),
        TypeDescriptor::Enum(e) => {
            let code = match value {
                Value::String(s) => e.names_to_values.get(s).copied(),
                Value::Int(i) => i32::try_from(*i)
                    .ok()
                    .filter(|code| e.values_to_names.contains_key(code)),
                _ => None,
            };
            code.map(NativeValue::I32)
                .ok_or_else(|| TranslateError::UnknownEnumValue {
                    enum_name: e.name.clone(),
                })
        }
        TypeDescriptor::List(element) => match value {
            Value::List(items) => Ok(NativeValue::List(
                items
                    .iter()
                    .map(|item| to_native(item, element, structs))
                    .collect::<Result<_, _>>()?,
            )),
            other => Err(mismatch("list", other)),
        },
        TypeDescriptor::Set(element) => match value {
            Value::Set(items) => {
                let mut out: Vec<NativeValue> = Vec::with_capacity(items.len());
                for item in items {
                    let native = to_native(item, element, structs)?;
                    if !out.contains(&native) {
                        out.push(native);
                    }
                }
                Ok(NativeValue::Set(out))
            }
            other => Err(mismatch("set", other)),
        },
        TypeDescriptor::Map(key_ty, value_ty) => match value {
            Value::Map(entries) => Ok(NativeValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| {
                        Ok((
                            to_native(k, key_ty, structs)?,
                            to_native(v, value_ty, structs)?,
                        ))
                    })
                    .collect::<Result<_, TranslateError>>()?,
            )),
            other => Err(mismatch("map", other)),
        },
        TypeDescriptor::Struct(name) => {
            let descriptor = structs
                .get(name)
                .ok_or_else(|| TranslateError::UnknownStruct(name.clone()))?;
            match value {
                Value::Map(_) => {
                    let mut fields = Vec::new();
                    for field in &descriptor.fields {
                        // Absent fields are omitted, never defaulted; prior
                        // validation already rejected missing required ones.
                        if let Some(field_value) = value.get(&field.name) {
                            fields.push(NativeField {
                                id: field.field_id,
                                name: field.name.clone(),
                                value: Some(to_native(field_value, &field.ty, structs)?),
                            });
                        }
                    }
                    Ok(NativeValue::Struct {
                        name: descriptor.name.clone(),
                        fields,
                    })
                }
                other => Err(mismatch("struct", other)),
            }
        }
    }
}

fn primitive_to_native(value: &Value, kind: PrimitiveKind) -> Result<NativeValue, TranslateError> {
    match kind {
        PrimitiveKind::Bool => match value {
            Value::Bool(b) => Ok(NativeValue::Bool(*b)),
            other => Err(mismatch("boolean", other)),
        },
        PrimitiveKind::Byte => narrow_integer(value, kind).map(|i| NativeValue::Byte(i as i8)),
        PrimitiveKind::I16 => narrow_integer(value, kind).map(|i| NativeValue::I16(i as i16)),
        PrimitiveKind::I32 => narrow_integer(value, kind).map(|i| NativeValue::I32(i as i32)),
        PrimitiveKind::I64 => narrow_integer(value, kind).map(|i| NativeValue::I64(i as i64)),
        PrimitiveKind::Double => match value {
            Value::Float(f) => Ok(NativeValue::Double(*f)),
            Value::Int(i) => Ok(NativeValue::Double(*i as f64)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(NativeValue::Double)
                .map_err(|_| TranslateError::NotNumeric { input: s.clone() }),
            other => Err(mismatch("float", other)),
        },
        PrimitiveKind::String => match value {
            Value::String(s) => Ok(NativeValue::String(s.clone())),
            other => Err(mismatch("string", other)),
        },
        PrimitiveKind::Binary => match value {
            Value::Bytes(b) => Ok(NativeValue::Binary(b.clone())),
            // JSON cannot carry bytes; accept text and encode it.
            Value::String(s) => Ok(NativeValue::Binary(s.clone().into_bytes())),
            other => Err(mismatch("binary", other)),
        },
    }
}

fn narrow_integer(value: &Value, kind: PrimitiveKind) -> Result<i128, TranslateError> {
    let raw = match value {
        Value::Int(i) => *i,
        Value::String(s) => s
            .trim()
            .parse::<i128>()
            .map_err(|_| TranslateError::NotNumeric { input: s.clone() })?,
        other => return Err(mismatch(kind.display_name(), other)),
    };
    // integer_bounds is total over the widths this function is called for
    let (min, max) = kind.integer_bounds().unwrap_or((i128::MIN, i128::MAX));
    if raw < min || raw > max {
        return Err(TranslateError::IntegerOutOfRange {
            width: kind.display_name(),
            value: raw,
        });
    }
    Ok(raw)
}

fn mismatch(expected: &'static str, got: &Value) -> TranslateError {
    TranslateError::TypeMismatch {
        expected,
        got: got.kind(),
    }
}

/// Convert a native value returned by the wire into a value tree.
///
/// Dispatch is by native shape. Structs become maps tagged
/// `"__type_tag__": <name>` with one entry per declared field; fields the
/// remote end left unset map to [`Value::Null`]. A null short-circuits to
/// null without recursing.
pub fn from_native(native: &NativeValue) -> Value {
    match native {
        NativeValue::Null => Value::Null,
        NativeValue::Bool(b) => Value::Bool(*b),
        NativeValue::Byte(b) => Value::Int(*b as i128),
        NativeValue::I16(i) => Value::Int(*i as i128),
        NativeValue::I32(i) => Value::Int(*i as i128),
        NativeValue::I64(i) => Value::Int(*i as i128),
        NativeValue::Double(f) => Value::Float(*f),
        NativeValue::String(s) => Value::String(s.clone()),
        NativeValue::Binary(b) => Value::Bytes(b.clone()),
        NativeValue::List(items) => Value::List(items.iter().map(from_native).collect()),
        NativeValue::Set(items) => {
            let mut out: Vec<Value> = Vec::with_capacity(items.len());
            for item in items.iter().map(from_native) {
                if !out.contains(&item) {
                    out.push(item);
                }
            }
            Value::Set(out)
        }
        NativeValue::Map(entries) => Value::Map(
            entries
                .iter()
                .map(|(k, v)| (from_native(k), from_native(v)))
                .collect(),
        ),
        NativeValue::Struct { name, fields } => {
            let mut entries = Vec::with_capacity(fields.len() + 1);
            entries.push((
                Value::String(TYPE_TAG.to_string()),
                Value::String(name.clone()),
            ));
            for field in fields {
                let value = field
                    .value
                    .as_ref()
                    .map(from_native)
                    .unwrap_or(Value::Null);
                entries.push((Value::String(field.name.clone()), value));
            }
            Value::Map(entries)
        }
    }
}

/// Translate a request body into the native argument list for one call.
///
/// Assumes the body already passed operation validation. Arguments absent
/// from the body are skipped (validation has rejected missing required
/// ones), mirroring the omit-never-default rule for struct fields.
pub fn translate_args(
    op: &OperationDescriptor,
    body: &Value,
    structs: &StructTable,
) -> Result<Vec<(FieldDescriptor, NativeValue)>, TranslateError> {
    let mut out = Vec::with_capacity(op.args.len());
    for arg in &op.args {
        if let Some(value) = body.get(&arg.name) {
            out.push((arg.clone(), to_native(value, &arg.ty, structs)?));
        }
    }
    Ok(out)
}

//! Descriptor-driven wire codec.
//!
//! The explorer has no generated client types, so argument structs are
//! written and result structs read dynamically: the encoder walks a
//! [`TypeDescriptor`] and a [`NativeValue`] in lockstep, the decoder walks
//! the descriptor alone and reconstructs native values (struct field names
//! come from the descriptors, since the wire carries only ids).
//!
//! Enum values travel as `i32`, and `binary` shares the string wire type,
//! exactly as the Thrift protocols define.

use texplore_core::{NativeField, NativeValue, StructTable, TypeDescriptor};
use thrift::protocol::{
    TFieldIdentifier, TInputProtocol, TListIdentifier, TMapIdentifier, TOutputProtocol,
    TSetIdentifier, TStructIdentifier, TType,
};
use thrift::{ProtocolError, ProtocolErrorKind};

/// The wire type a descriptor encodes as.
pub fn wire_type(ty: &TypeDescriptor) -> TType {
    match ty {
        TypeDescriptor::Primitive(kind) => {
            use texplore_core::PrimitiveKind::*;
            match kind {
                Bool => TType::Bool,
                Byte => TType::I08,
                I16 => TType::I16,
                I32 => TType::I32,
                I64 => TType::I64,
                Double => TType::Double,
                String | Binary => TType::String,
            }
        }
        TypeDescriptor::Enum(_) => TType::I32,
        TypeDescriptor::List(_) => TType::List,
        TypeDescriptor::Set(_) => TType::Set,
        TypeDescriptor::Map(_, _) => TType::Map,
        TypeDescriptor::Struct(_) => TType::Struct,
    }
}

fn invalid_data(message: String) -> thrift::Error {
    thrift::Error::Protocol(ProtocolError::new(ProtocolErrorKind::InvalidData, message))
}

/// Write one value under the given descriptor.
pub fn write_value(
    o_prot: &mut dyn TOutputProtocol,
    ty: &TypeDescriptor,
    structs: &StructTable,
    value: &NativeValue,
) -> thrift::Result<()> {
    match (ty, value) {
        (TypeDescriptor::Primitive(_) | TypeDescriptor::Enum(_), scalar) => {
            write_scalar(o_prot, scalar)
        }
        (TypeDescriptor::List(element), NativeValue::List(items)) => {
            o_prot.write_list_begin(&TListIdentifier::new(
                wire_type(element),
                items.len() as i32,
            ))?;
            for item in items {
                write_value(o_prot, element, structs, item)?;
            }
            o_prot.write_list_end()
        }
        (TypeDescriptor::Set(element), NativeValue::Set(items)) => {
            o_prot.write_set_begin(&TSetIdentifier::new(wire_type(element), items.len() as i32))?;
            for item in items {
                write_value(o_prot, element, structs, item)?;
            }
            o_prot.write_set_end()
        }
        (TypeDescriptor::Map(key_ty, value_ty), NativeValue::Map(entries)) => {
            o_prot.write_map_begin(&TMapIdentifier::new(
                wire_type(key_ty),
                wire_type(value_ty),
                entries.len() as i32,
            ))?;
            for (key, entry_value) in entries {
                write_value(o_prot, key_ty, structs, key)?;
                write_value(o_prot, value_ty, structs, entry_value)?;
            }
            o_prot.write_map_end()
        }
        (TypeDescriptor::Struct(name), NativeValue::Struct { fields, .. }) => {
            let descriptor = structs
                .get(name)
                .ok_or_else(|| invalid_data(format!("struct '{name}' has no definition")))?;
            o_prot.write_struct_begin(&TStructIdentifier::new(descriptor.name.clone()))?;
            for field in fields {
                let Some(value) = &field.value else { continue };
                let field_ty = descriptor
                    .fields
                    .iter()
                    .find(|f| f.field_id == field.id)
                    .map(|f| &f.ty)
                    .ok_or_else(|| {
                        invalid_data(format!(
                            "struct '{name}' has no field with id {}",
                            field.id
                        ))
                    })?;
                o_prot.write_field_begin(&TFieldIdentifier::new(
                    field.name.clone(),
                    wire_type(field_ty),
                    field.id,
                ))?;
                write_value(o_prot, field_ty, structs, value)?;
                o_prot.write_field_end()?;
            }
            o_prot.write_field_stop()?;
            o_prot.write_struct_end()
        }
        (ty, value) => Err(invalid_data(format!(
            "value {value:?} does not fit descriptor {ty:?}"
        ))),
    }
}

fn write_scalar(o_prot: &mut dyn TOutputProtocol, value: &NativeValue) -> thrift::Result<()> {
    match value {
        NativeValue::Bool(b) => o_prot.write_bool(*b),
        NativeValue::Byte(b) => o_prot.write_i8(*b),
        NativeValue::I16(i) => o_prot.write_i16(*i),
        NativeValue::I32(i) => o_prot.write_i32(*i),
        NativeValue::I64(i) => o_prot.write_i64(*i),
        NativeValue::Double(f) => o_prot.write_double(*f),
        NativeValue::String(s) => o_prot.write_string(s),
        NativeValue::Binary(b) => o_prot.write_bytes(b),
        other => Err(invalid_data(format!("{other:?} is not a scalar"))),
    }
}

/// Read one value under the given descriptor.
pub fn read_value(
    i_prot: &mut dyn TInputProtocol,
    ty: &TypeDescriptor,
    structs: &StructTable,
) -> thrift::Result<NativeValue> {
    match ty {
        TypeDescriptor::Primitive(kind) => {
            use texplore_core::PrimitiveKind::*;
            Ok(match kind {
                Bool => NativeValue::Bool(i_prot.read_bool()?),
                Byte => NativeValue::Byte(i_prot.read_i8()?),
                I16 => NativeValue::I16(i_prot.read_i16()?),
                I32 => NativeValue::I32(i_prot.read_i32()?),
                I64 => NativeValue::I64(i_prot.read_i64()?),
                Double => NativeValue::Double(i_prot.read_double()?),
                String => NativeValue::String(i_prot.read_string()?),
                Binary => NativeValue::Binary(i_prot.read_bytes()?),
            })
        }
        TypeDescriptor::Enum(_) => Ok(NativeValue::I32(i_prot.read_i32()?)),
        TypeDescriptor::List(element) => {
            let header = i_prot.read_list_begin()?;
            let mut items = Vec::with_capacity(header.size.max(0) as usize);
            for _ in 0..header.size {
                items.push(read_value(i_prot, element, structs)?);
            }
            i_prot.read_list_end()?;
            Ok(NativeValue::List(items))
        }
        TypeDescriptor::Set(element) => {
            let header = i_prot.read_set_begin()?;
            let mut items: Vec<NativeValue> = Vec::with_capacity(header.size.max(0) as usize);
            for _ in 0..header.size {
                let item = read_value(i_prot, element, structs)?;
                if !items.contains(&item) {
                    items.push(item);
                }
            }
            i_prot.read_set_end()?;
            Ok(NativeValue::Set(items))
        }
        TypeDescriptor::Map(key_ty, value_ty) => {
            let header = i_prot.read_map_begin()?;
            let mut entries = Vec::with_capacity(header.size.max(0) as usize);
            for _ in 0..header.size {
                let key = read_value(i_prot, key_ty, structs)?;
                let value = read_value(i_prot, value_ty, structs)?;
                entries.push((key, value));
            }
            i_prot.read_map_end()?;
            Ok(NativeValue::Map(entries))
        }
        TypeDescriptor::Struct(name) => {
            let descriptor = structs
                .get(name)
                .ok_or_else(|| invalid_data(format!("struct '{name}' has no definition")))?;
            i_prot.read_struct_begin()?;
            let mut fields: Vec<NativeField> = descriptor
                .fields
                .iter()
                .map(|f| NativeField {
                    id: f.field_id,
                    name: f.name.clone(),
                    value: None,
                })
                .collect();
            loop {
                let field_ident = i_prot.read_field_begin()?;
                if field_ident.field_type == TType::Stop {
                    break;
                }
                let declared = field_ident.id.and_then(|id| {
                    descriptor
                        .fields
                        .iter()
                        .position(|f| f.field_id == id)
                        .map(|index| (index, id))
                });
                match declared {
                    Some((index, _)) => {
                        let value =
                            read_value(i_prot, &descriptor.fields[index].ty, structs)?;
                        fields[index].value = Some(value);
                    }
                    // unknown field from a newer remote schema
                    None => i_prot.skip(field_ident.field_type)?,
                }
                i_prot.read_field_end()?;
            }
            i_prot.read_struct_end()?;
            Ok(NativeValue::Struct {
                name: descriptor.name.clone(),
                fields,
            })
        }
    }
}

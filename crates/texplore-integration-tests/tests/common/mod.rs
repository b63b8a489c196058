//! Shared fixtures: the demo registry and an in-process todo service.
//!
//! The todo server speaks real Thrift over a real socket, driven by the
//! same descriptors and wire codec the explorer uses, so the end-to-end
//! tests exercise the full validate → translate → call → translate loop.

#![allow(dead_code)]

use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;

use texplore_core::{
    NativeField, NativeValue, OperationDescriptor, SchemaRegistry, StructTable,
};
use texplore_wire::codec::{read_value, wire_type, write_value};
use texplore_wire::{Protocol, Transport};
use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TCompactInputProtocol, TCompactOutputProtocol,
    TFieldIdentifier, TInputProtocol, TMessageIdentifier, TMessageType, TOutputProtocol,
    TStructIdentifier, TType,
};
use thrift::transport::{
    ReadHalf, TBufferedReadTransport, TBufferedWriteTransport, TFramedReadTransport,
    TFramedWriteTransport, TIoChannel, TTcpChannel, WriteHalf,
};
use thrift::{ApplicationError, ApplicationErrorKind};

/// The repository's demo schema directory.
pub fn demo_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demo-thrifts")
}

/// A registry over the demo schemas, built the same way `main` builds it.
pub fn demo_registry() -> SchemaRegistry {
    SchemaRegistry::build(texplore_idl::load_schema_dir(&demo_dir()).unwrap()).unwrap()
}

#[derive(Debug, Clone)]
struct TaskRow {
    task_id: String,
    description: Option<String>,
    due_date: Option<String>,
}

impl TaskRow {
    fn to_native(&self) -> NativeValue {
        NativeValue::Struct {
            name: "Task".to_string(),
            fields: vec![
                NativeField {
                    id: 1,
                    name: "taskId".to_string(),
                    value: Some(NativeValue::String(self.task_id.clone())),
                },
                NativeField {
                    id: 2,
                    name: "description".to_string(),
                    value: self.description.clone().map(NativeValue::String),
                },
                NativeField {
                    id: 3,
                    name: "dueDate".to_string(),
                    value: self.due_date.clone().map(NativeValue::String),
                },
            ],
        }
    }
}

/// An in-process `TodoService` bound to an ephemeral port.
pub struct TodoServer {
    /// The port the server listens on.
    pub port: u16,
}

enum Reply {
    Void,
    Success(NativeValue),
    Declared(NativeValue),
    UnknownMethod,
}

impl TodoServer {
    /// Start a server speaking the given protocol and transport. The accept
    /// loop runs on a detached thread for the remainder of the test binary.
    pub fn spawn(protocol: Protocol, transport: Transport) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let registry = Arc::new(demo_registry());
        let tasks: Arc<Mutex<Vec<TaskRow>>> = Arc::new(Mutex::new(Vec::new()));

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                let registry = Arc::clone(&registry);
                let tasks = Arc::clone(&tasks);
                thread::spawn(move || {
                    let _ = serve_connection(stream, protocol, transport, &registry, &tasks);
                });
            }
        });

        Self { port }
    }
}

type BoxedProtocols = (Box<dyn TInputProtocol>, Box<dyn TOutputProtocol>);

fn make_protocols(
    protocol: Protocol,
    transport: Transport,
    read_half: ReadHalf<TTcpChannel>,
    write_half: WriteHalf<TTcpChannel>,
) -> BoxedProtocols {
    match (protocol, transport) {
        (Protocol::Binary, Transport::Buffered) => (
            Box::new(TBinaryInputProtocol::new(
                TBufferedReadTransport::new(read_half),
                true,
            )),
            Box::new(TBinaryOutputProtocol::new(
                TBufferedWriteTransport::new(write_half),
                true,
            )),
        ),
        (Protocol::Binary, Transport::Framed) => (
            Box::new(TBinaryInputProtocol::new(
                TFramedReadTransport::new(read_half),
                true,
            )),
            Box::new(TBinaryOutputProtocol::new(
                TFramedWriteTransport::new(write_half),
                true,
            )),
        ),
        (Protocol::Compact, Transport::Buffered) => (
            Box::new(TCompactInputProtocol::new(TBufferedReadTransport::new(
                read_half,
            ))),
            Box::new(TCompactOutputProtocol::new(TBufferedWriteTransport::new(
                write_half,
            ))),
        ),
        (Protocol::Compact, Transport::Framed) => (
            Box::new(TCompactInputProtocol::new(TFramedReadTransport::new(
                read_half,
            ))),
            Box::new(TCompactOutputProtocol::new(TFramedWriteTransport::new(
                write_half,
            ))),
        ),
    }
}

fn serve_connection(
    stream: TcpStream,
    protocol: Protocol,
    transport: Transport,
    registry: &SchemaRegistry,
    tasks: &Mutex<Vec<TaskRow>>,
) -> thrift::Result<()> {
    let channel = TTcpChannel::with_stream(stream);
    let (read_half, write_half) = channel.split()?;
    let (mut i_prot, mut o_prot) = make_protocols(protocol, transport, read_half, write_half);

    let schema = registry.schema("todo.thrift").expect("demo schema loaded");
    let service = &schema.services["TodoService"];

    loop {
        // a read failure here is the client hanging up
        let Ok(message) = i_prot.read_message_begin() else {
            return Ok(());
        };
        match service.operations.get(&message.name) {
            Some(op) => {
                let args = read_args(&mut *i_prot, op, &schema.structs)?;
                i_prot.read_message_end()?;
                let reply = dispatch(&message.name, &args, tasks);
                write_reply(
                    &mut *o_prot,
                    op,
                    &schema.structs,
                    &message.name,
                    message.sequence_number,
                    reply,
                )?;
            }
            None => {
                i_prot.skip(TType::Struct)?;
                i_prot.read_message_end()?;
                write_unknown_method(&mut *o_prot, &message.name, message.sequence_number)?;
            }
        }
    }
}

fn read_args(
    i_prot: &mut dyn TInputProtocol,
    op: &OperationDescriptor,
    structs: &StructTable,
) -> thrift::Result<Vec<(String, NativeValue)>> {
    i_prot.read_struct_begin()?;
    let mut args = Vec::new();
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        match field_ident
            .id
            .and_then(|id| op.args.iter().find(|a| a.field_id == id))
        {
            Some(arg) => {
                args.push((arg.name.clone(), read_value(i_prot, &arg.ty, structs)?));
            }
            None => i_prot.skip(field_ident.field_type)?,
        }
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()?;
    Ok(args)
}

fn string_arg(args: &[(String, NativeValue)], name: &str) -> Option<String> {
    args.iter().find_map(|(arg_name, value)| match value {
        NativeValue::String(s) if arg_name == name => Some(s.clone()),
        _ => None,
    })
}

fn dispatch(
    method: &str,
    args: &[(String, NativeValue)],
    tasks: &Mutex<Vec<TaskRow>>,
) -> Reply {
    match method {
        "ping" | "completeTask" => {
            if method == "completeTask" {
                if let Some(task_id) = string_arg(args, "taskId") {
                    tasks.lock().unwrap().retain(|t| t.task_id != task_id);
                }
            }
            Reply::Void
        }
        "listTasks" => {
            let rows = tasks.lock().unwrap();
            Reply::Success(NativeValue::List(
                rows.iter().map(TaskRow::to_native).collect(),
            ))
        }
        "numTasks" => {
            let count = tasks.lock().unwrap().len();
            Reply::Success(NativeValue::I32(count as i32))
        }
        "getTask" => {
            let task_id = string_arg(args, "taskId").unwrap_or_default();
            let rows = tasks.lock().unwrap();
            match rows.iter().find(|t| t.task_id == task_id) {
                Some(task) => Reply::Success(task.to_native()),
                None => Reply::Declared(NativeValue::Struct {
                    name: "NotFound".to_string(),
                    fields: vec![],
                }),
            }
        }
        "createTask" => {
            let row = create_task(
                string_arg(args, "description"),
                string_arg(args, "dueDate"),
                tasks,
            );
            Reply::Success(row.to_native())
        }
        "createTaskWithObject" => {
            let (description, due_date) = match args.iter().find(|(n, _)| n == "task") {
                Some((_, NativeValue::Struct { fields, .. })) => {
                    let get = |name: &str| {
                        fields.iter().find_map(|f| match &f.value {
                            Some(NativeValue::String(s)) if f.name == name => Some(s.clone()),
                            _ => None,
                        })
                    };
                    (get("description"), get("dueDate"))
                }
                _ => (None, None),
            };
            let row = create_task(description, due_date, tasks);
            Reply::Success(row.to_native())
        }
        // present in the schema, deliberately missing from this server
        "fancyNewMethod" => Reply::UnknownMethod,
        _ => Reply::UnknownMethod,
    }
}

fn create_task(
    description: Option<String>,
    due_date: Option<String>,
    tasks: &Mutex<Vec<TaskRow>>,
) -> TaskRow {
    let mut rows = tasks.lock().unwrap();
    let row = TaskRow {
        task_id: (rows.len() + 1).to_string(),
        description,
        due_date,
    };
    rows.push(row.clone());
    row
}

fn write_reply(
    o_prot: &mut dyn TOutputProtocol,
    op: &OperationDescriptor,
    structs: &StructTable,
    method: &str,
    sequence_number: i32,
    reply: Reply,
) -> thrift::Result<()> {
    if let Reply::UnknownMethod = reply {
        return write_unknown_method(o_prot, method, sequence_number);
    }

    o_prot.write_message_begin(&TMessageIdentifier::new(
        method.to_string(),
        TMessageType::Reply,
        sequence_number,
    ))?;
    o_prot.write_struct_begin(&TStructIdentifier::new(format!("{method}_result")))?;
    match reply {
        Reply::Void | Reply::UnknownMethod => {}
        Reply::Success(value) => {
            let success = op.success().expect("operation returns a value");
            o_prot.write_field_begin(&TFieldIdentifier::new(
                "success",
                wire_type(&success.ty),
                0,
            ))?;
            write_value(o_prot, &success.ty, structs, &value)?;
            o_prot.write_field_end()?;
        }
        Reply::Declared(value) => {
            let variant = op
                .declared_errors()
                .next()
                .expect("operation declares an error variant");
            o_prot.write_field_begin(&TFieldIdentifier::new(
                variant.name.clone(),
                wire_type(&variant.ty),
                variant.field_id,
            ))?;
            write_value(o_prot, &variant.ty, structs, &value)?;
            o_prot.write_field_end()?;
        }
    }
    o_prot.write_field_stop()?;
    o_prot.write_struct_end()?;
    o_prot.write_message_end()?;
    o_prot.flush()
}

fn write_unknown_method(
    o_prot: &mut dyn TOutputProtocol,
    method: &str,
    sequence_number: i32,
) -> thrift::Result<()> {
    o_prot.write_message_begin(&TMessageIdentifier::new(
        method.to_string(),
        TMessageType::Exception,
        sequence_number,
    ))?;
    let error = ApplicationError::new(
        ApplicationErrorKind::UnknownMethod,
        format!("unknown method {method}"),
    );
    thrift::Error::write_application_error_to_out_protocol(&error, o_prot)?;
    o_prot.write_message_end()?;
    o_prot.flush()
}

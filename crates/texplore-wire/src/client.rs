//! The synchronous RPC client.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use texplore_core::{FieldDescriptor, NativeValue, OperationDescriptor, StructTable,
    TypeDescriptor};
use thrift::protocol::{
    TBinaryInputProtocol, TBinaryOutputProtocol, TCompactInputProtocol, TCompactOutputProtocol,
    TFieldIdentifier, TInputProtocol, TMessageIdentifier, TMessageType, TOutputProtocol,
    TStructIdentifier, TType,
};
use thrift::transport::{
    ReadHalf, TBufferedReadTransport, TBufferedWriteTransport, TFramedReadTransport,
    TFramedWriteTransport, TIoChannel, TTcpChannel, WriteHalf,
};

use crate::codec::{read_value, wire_type, write_value};
use crate::error::{CallOutcome, WireError, WireResponse};
use crate::options::{Endpoint, Protocol, Transport};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const IO_TIMEOUT: Duration = Duration::from_secs(30);
const SEQUENCE_NUMBER: i32 = 0;

/// Perform one call against a remote service.
///
/// Blocks for the duration of the call; async callers wrap this in
/// `spawn_blocking`. Returns the decoded outcome with connect and request
/// timing, or a [`WireError`] for transport-level failures — a
/// [`WireError::Connect`] carries no timing because the failure happened
/// before any call existed.
pub fn call(
    endpoint: &Endpoint,
    op: &OperationDescriptor,
    structs: &StructTable,
    args: &[(FieldDescriptor, NativeValue)],
) -> Result<WireResponse, WireError> {
    let address = format!("{}:{}", endpoint.host, endpoint.port);
    let connect_start = Instant::now();
    let stream = connect(&address)?;
    let time_to_connect = connect_start.elapsed();

    stream
        .set_read_timeout(Some(IO_TIMEOUT))
        .and_then(|_| stream.set_write_timeout(Some(IO_TIMEOUT)))
        .map_err(|e| WireError::Connect(format!("could not configure {address}: {e}")))?;

    let channel = TTcpChannel::with_stream(stream);
    let (read_half, write_half) = channel
        .split()
        .map_err(|e| WireError::Call(e.to_string()))?;
    let (mut i_prot, mut o_prot) =
        make_protocols(endpoint.protocol, endpoint.transport, read_half, write_half);

    tracing::debug!(operation = %op.name, %address, "sending call");
    let request_start = Instant::now();
    write_call(&mut *o_prot, op, structs, args)?;
    let outcome = read_reply(&mut *i_prot, op, structs)?;
    let time_to_make_request = request_start.elapsed();

    Ok(WireResponse {
        outcome,
        time_to_connect,
        time_to_make_request,
    })
}

fn connect(address: &str) -> Result<TcpStream, WireError> {
    let addrs: Vec<_> = address
        .to_socket_addrs()
        .map_err(|e| WireError::Connect(format!("could not resolve {address}: {e}")))?
        .collect();
    let mut last_error = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT) {
            Ok(stream) => return Ok(stream),
            Err(e) => last_error = Some(e),
        }
    }
    Err(WireError::Connect(match last_error {
        Some(e) => format!("could not connect to {address}: {e}"),
        None => format!("could not resolve {address}"),
    }))
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

fn write_call(
    o_prot: &mut dyn TOutputProtocol,
    op: &OperationDescriptor,
    structs: &StructTable,
    args: &[(FieldDescriptor, NativeValue)],
) -> Result<(), WireError> {
    o_prot.write_message_begin(&TMessageIdentifier::new(
        op.name.clone(),
        TMessageType::Call,
        SEQUENCE_NUMBER,
    ))?;
    o_prot.write_struct_begin(&TStructIdentifier::new(format!("{}_args", op.name)))?;
    for (field, value) in args {
        o_prot.write_field_begin(&TFieldIdentifier::new(
            field.name.clone(),
            wire_type(&field.ty),
            field.field_id,
        ))?;
        write_value(o_prot, &field.ty, structs, value)?;
        o_prot.write_field_end()?;
    }
    o_prot.write_field_stop()?;
    o_prot.write_struct_end()?;
    o_prot.write_message_end()?;
    o_prot.flush()?;
    Ok(())
}

fn read_reply(
    i_prot: &mut dyn TInputProtocol,
    op: &OperationDescriptor,
    structs: &StructTable,
) -> Result<CallOutcome, WireError> {
    let message = i_prot.read_message_begin()?;
    if message.message_type == TMessageType::Exception {
        let remote = thrift::Error::read_application_error_from_in_protocol(i_prot)?;
        i_prot.read_message_end()?;
        return Err(WireError::Call(remote.message));
    }

    i_prot.read_struct_begin()?;
    // void operations have no populated result field at all
    let mut outcome = CallOutcome::Success(NativeValue::Null);
    loop {
        let field_ident = i_prot.read_field_begin()?;
        if field_ident.field_type == TType::Stop {
            break;
        }
        let declared = field_ident
            .id
            .and_then(|id| op.results.iter().find(|r| r.field_id == id));
        match declared {
            Some(result) => {
                let value = read_value(i_prot, &result.ty, structs)?;
                outcome = if result.field_id == 0 {
                    CallOutcome::Success(value)
                } else {
                    CallOutcome::DeclaredError {
                        name: variant_name(result),
                        value,
                    }
                };
            }
            None => i_prot.skip(field_ident.field_type)?,
        }
        i_prot.read_field_end()?;
    }
    i_prot.read_struct_end()?;
    i_prot.read_message_end()?;
    Ok(outcome)
}

/// A declared error variant is named by its struct type, matching how the
/// remote end names the exception; the field name is only a fallback for
/// non-struct variants.
fn variant_name(result: &FieldDescriptor) -> String {
    match &result.ty {
        TypeDescriptor::Struct(name) => name.clone(),
        _ => result.name.clone(),
    }
}

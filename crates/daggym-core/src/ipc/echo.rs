//! JSON echo probe for checking that loopback sockets work at all.
//!
//! Each connection carries one JSON object from the client and one reply
//! from the server, after which the server closes it.

use std::io::Write;
use std::net::TcpListener;
use std::net::TcpStream;
use std::net::ToSocketAddrs;

use serde_json::Value;
use serde_json::json;

use crate::EmulatorError;

/// Address the probe server listens on by default.
pub const DEFAULT_ECHO_ADDR: &str = "127.0.0.1:8000";

/// Text of the server's reply.
pub const ECHO_REPLY_MESSAGE: &str = "Hello, client!";

/// Payload the client sends when none is given.
#[must_use]
pub fn default_client_payload() -> Value {
    json!({ "name": "daggym", "message": "Hello, server!" })
}

/// Reads one JSON value from `stream`; `None` if the peer sent nothing.
fn read_value(stream: &TcpStream) -> Result<Option<Value>, EmulatorError> {
    let mut values = serde_json::Deserializer::from_reader(stream).into_iter::<Value>();
    match values.next() {
        None => Ok(None),
        Some(Ok(value)) => Ok(Some(value)),
        Some(Err(e)) if e.is_eof() => Ok(None),
        Some(Err(e)) => Err(e.into()),
    }
}

/// Serves the echo probe on `listener`.
///
/// Stops after `max_connections` connections, or when a client connects and
/// closes without sending anything. A client sending malformed JSON is
/// logged and dropped without a reply. Returns the number of replies sent.
///
/// # Errors
///
/// Returns an error if `accept` fails or a reply cannot be written.
pub fn serve_echo(
    listener: &TcpListener,
    max_connections: Option<usize>,
) -> Result<usize, EmulatorError> {
    let mut handled = 0usize;
    let mut replied = 0usize;

    while max_connections.is_none_or(|max| handled < max) {
        let (mut stream, peer) = listener.accept()?;
        handled += 1;
        tracing::info!(%peer, "connection from client");

        let value = match read_value(&stream) {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::info!(%peer, "client sent no data, shutting down");
                break;
            }
            Err(e) => {
                tracing::warn!(%peer, "discarding malformed request: {e}");
                continue;
            }
        };
        tracing::info!(%peer, received = %value, "received");

        serde_json::to_writer(&stream, &json!({ "message": ECHO_REPLY_MESSAGE }))?;
        stream.write_all(b"\n")?;
        stream.flush()?;
        replied += 1;
    }

    Ok(replied)
}

/// Sends `payload` to the probe server at `addr` and returns its reply.
///
/// # Errors
///
/// Returns an error if the connection fails, or if the server closes the
/// connection without a well-formed reply.
pub fn echo_client(addr: impl ToSocketAddrs, payload: &Value) -> Result<Value, EmulatorError> {
    let mut stream = TcpStream::connect(addr)?;
    serde_json::to_writer(&stream, payload)?;
    stream.flush()?;

    read_value(&stream)?.ok_or_else(|| {
        EmulatorError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "server closed the connection without replying",
        ))
    })
}

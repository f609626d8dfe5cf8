//! IPC probe command implementation.

use crate::cli::IpcArgs;
use crate::cli::IpcRole;
use crate::error::convert_emulator_error;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use daggym_core::ipc::default_client_payload;
use daggym_core::ipc::echo_client;
use daggym_core::ipc::serve_echo;
use serde_json::Value;
use serde_json::json;
use std::net::TcpListener;

pub fn execute(args: &IpcArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    match &args.role {
        IpcRole::Server {
            addr,
            max_connections,
        } => {
            let listener = TcpListener::bind(addr.as_str())
                .with_context(|| format!("failed to listen on {addr}"))?;
            tracing::info!(%addr, "echo server listening");

            let replies = serve_echo(&listener, *max_connections).map_err(convert_emulator_error)?;
            formatter.format_echo("server", &json!({ "replies": replies }))
        }
        IpcRole::Client { addr, payload } => {
            let payload = match payload {
                Some(text) => serde_json::from_str::<Value>(text)
                    .with_context(|| format!("--payload is not valid JSON: {text}"))?,
                None => default_client_payload(),
            };

            let reply = echo_client(addr.as_str(), &payload)
                .map_err(convert_emulator_error)
                .with_context(|| format!("echo request to {addr} failed"))?;
            formatter.format_echo("client", &reply)
        }
    }
}

//! Line-oriented TCP side channel between the Lua autoboot script and the
//! supervisor.

use std::io::BufRead;
use std::io::BufReader;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpListener;
use std::net::TcpStream;
use std::net::ToSocketAddrs;

use crate::EmulatorError;

/// Address the autoboot script connects to.
pub const DEFAULT_SIDE_CHANNEL_ADDR: &str = "127.0.0.1:15000";

/// Where the side channel listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideChannelConfig {
    /// Listen address; must be a loopback address.
    pub addr: String,
}

impl Default for SideChannelConfig {
    /// Default values:
    /// - `addr`: `127.0.0.1:15000`
    fn default() -> Self {
        Self {
            addr: DEFAULT_SIDE_CHANNEL_ADDR.to_string(),
        }
    }
}

impl SideChannelConfig {
    /// Sets the listen address.
    #[must_use]
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }
}

/// A bound loopback listener waiting for the emulator to connect.
#[derive(Debug)]
pub struct SideChannel {
    listener: TcpListener,
}

impl SideChannel {
    /// Binds a listener on `addr`.
    ///
    /// # Errors
    ///
    /// Fails if the address does not resolve, resolves to a non-loopback
    /// address, or cannot be bound.
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, EmulatorError> {
        let addrs: Vec<SocketAddr> = addr.to_socket_addrs()?.collect();
        if addrs.is_empty() || addrs.iter().any(|a| !a.ip().is_loopback()) {
            return Err(EmulatorError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("side channel must listen on a loopback address, got {addrs:?}"),
            )));
        }

        let listener = TcpListener::bind(addrs.as_slice())?;
        tracing::info!(addr = %listener.local_addr()?, "side channel listening");
        Ok(Self { listener })
    }

    /// Binds using `config.addr`.
    ///
    /// # Errors
    ///
    /// Same as [`SideChannel::bind`].
    pub fn from_config(config: &SideChannelConfig) -> Result<Self, EmulatorError> {
        Self::bind(config.addr.as_str())
    }

    /// The address actually bound, useful when binding port 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be queried.
    pub fn local_addr(&self) -> Result<SocketAddr, EmulatorError> {
        Ok(self.listener.local_addr()?)
    }

    /// Blocks until one client connects.
    ///
    /// # Errors
    ///
    /// Returns an error if `accept` fails.
    pub fn accept(&self) -> Result<SideChannelConnection, EmulatorError> {
        let (stream, peer) = self.listener.accept()?;
        tracing::info!(%peer, "side channel connected");
        SideChannelConnection::new(stream, peer)
    }
}

/// One accepted side-channel connection.
#[derive(Debug)]
pub struct SideChannelConnection {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    peer: SocketAddr,
}

impl SideChannelConnection {
    fn new(stream: TcpStream, peer: SocketAddr) -> Result<Self, EmulatorError> {
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            peer,
        })
    }

    /// Connects to a listening side channel as a client.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection is refused.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, EmulatorError> {
        let stream = TcpStream::connect(addr)?;
        let peer = stream.peer_addr()?;
        Self::new(stream, peer)
    }

    /// Remote address.
    #[must_use]
    pub const fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Next newline-delimited message without its line terminator, or
    /// `None` once the peer closes the connection.
    ///
    /// # Errors
    ///
    /// Returns an error on a read failure or non-UTF-8 data.
    pub fn recv(&mut self) -> Result<Option<String>, EmulatorError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    /// Sends `message` followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn send(&mut self, message: &str) -> Result<(), EmulatorError> {
        self.writer.write_all(message.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}

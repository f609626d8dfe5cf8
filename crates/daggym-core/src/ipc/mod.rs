//! Loopback sockets: the emulator side channel and a JSON echo probe.

mod echo;
mod side_channel;

pub use echo::DEFAULT_ECHO_ADDR;
pub use echo::ECHO_REPLY_MESSAGE;
pub use echo::default_client_payload;
pub use echo::echo_client;
pub use echo::serve_echo;
pub use side_channel::DEFAULT_SIDE_CHANNEL_ADDR;
pub use side_channel::SideChannel;
pub use side_channel::SideChannelConfig;
pub use side_channel::SideChannelConnection;

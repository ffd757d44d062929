//! sheetrelay core library: chat bridge transport, session manager, message routing,
//! remote sheet logging, and the HTTP gateway used by the CLI.

pub mod channels;
pub mod config;
pub mod gateway;
pub mod init;
pub mod remote;
pub mod responder;
pub mod routing;
pub mod session;

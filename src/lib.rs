pub mod cli;
pub mod config;
pub mod connection;
pub mod protocol;

pub use cli::{Command, prompt};
pub use config::Config;
pub use connection::Connection;
pub use protocol::{ClientError, Param, Query, Response, Row, SInt, UInt, Value};

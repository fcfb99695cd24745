//! Connection settings.
//!
//! # Example
//! ```rust,no_run
//! use skyhash::{Config, Query};
//!
//! let mut con = Config::new("root", "password12345678")
//!     .with_host("10.0.0.5")
//!     .connect()
//!     .unwrap();
//! let resp = con.query(&Query::new("sysctl report status")).unwrap();
//! assert!(resp.is_empty());
//! ```
use std::{fmt, net::TcpStream};

use log::info;

use crate::{connection::Connection, protocol::ClientError};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 2003;

#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    username: String,
    password: String,
    host: String,
    port: u16,
}

impl Config {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Opens a TCP connection and performs the handshake.
    ///
    /// # Errors
    /// Fails if the server cannot be reached, rejects the credentials, or
    /// answers with an unknown handshake (usually a protocol version mismatch).
    pub fn connect(&self) -> Result<Connection<TcpStream>, ClientError> {
        info!("connecting to {}:{}", self.host, self.port);
        let stream = TcpStream::connect((self.host.as_str(), self.port))?;
        stream.set_nodelay(true)?;
        Connection::handshake(stream, &self.username, &self.password)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::new("root", "mypassword123456789");
        assert_eq!(c.username(), "root");
        assert_eq!(c.password(), "mypassword123456789");
        assert_eq!(c.host(), "127.0.0.1");
        assert_eq!(c.port(), 2003);
    }

    #[test]
    fn overrides() {
        let c = Config::new("root", "pass").with_host("db.local").with_port(2004);
        assert_eq!(c.host(), "db.local");
        assert_eq!(c.port(), 2004);
    }

    #[test]
    fn debug_hides_password() {
        let out = format!("{:?}", Config::new("root", "hunter2"));
        assert!(out.contains("root"));
        assert!(!out.contains("hunter2"));
    }
}

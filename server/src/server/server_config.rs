use std::default::Default;

/// Contains Config properties which will be used by the Server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// When true, a connection has to be accepted through
    /// `Server::accept_auth` before it receives authenticated broadcasts or
    /// observes any object. When false, every connection is authenticated
    /// as soon as it connects.
    pub require_auth: bool,
    /// Ticks between re-evaluations of timed observer conditions. 0 is
    /// treated as 1.
    pub timed_check_interval: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            timed_check_interval: 1,
        }
    }
}

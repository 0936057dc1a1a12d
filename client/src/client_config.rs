use std::default::Default;

/// Contains Config properties which will be used by a Client
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// When true, broadcasts sent before the transport reports the
    /// connection are queued until the next flush. When false they are
    /// rejected with `ClientError::NotConnected`.
    pub queue_before_connected: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            queue_before_connected: true,
        }
    }
}

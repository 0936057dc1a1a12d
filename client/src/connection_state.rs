#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    /// No transport, nothing can be sent
    #[default]
    Stopped,
    /// A transport has been handed over. The connection itself may still be
    /// pending.
    Started,
}

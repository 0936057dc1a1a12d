use thiserror::Error;

/// Errors that can occur while reading a value out of a byte stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The stream ended before the value was complete
    #[error("Unexpected end of stream: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A byte sequence did not encode a valid value of the expected type
    #[error("Invalid encoding for {type_name}")]
    InvalidValue { type_name: &'static str },

    /// A variable-length integer ran past its maximum width
    #[error("Variable-length integer exceeds 64 bits")]
    VariableIntegerOverflow,

    /// A string payload was not valid UTF-8
    #[error("String payload is not valid UTF-8")]
    InvalidUtf8,
}

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid base64 in message data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("Message data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Message data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Decoded payload is not a JSON object")]
    PayloadNotAnObject,

    #[error("Missing required payload field: {0}")]
    MissingField(&'static str),

    #[error("Payload field is not a string: {0}")]
    InvalidFieldType(&'static str),

    #[error("Missing ackId or subscription path")]
    MissingAckInfo,

    #[error("Log store error: {0}")]
    Store(#[source] anyhow::Error),

    #[error("Transport error: {0}")]
    Transport(#[source] anyhow::Error),
}

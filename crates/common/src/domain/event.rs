use serde::{Deserialize, Serialize};

/// Delivery envelope handed over by the message transport.
///
/// All fields are optional on the wire: an envelope may carry payload data,
/// acknowledgment metadata, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InboundEvent {
    /// Base64-encoded JSON payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,

    /// Transport acknowledgment handle for this delivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack_id: Option<String>,

    /// Fully qualified subscription path the message was delivered on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
}

use crate::model::device::DeviceId;
use crate::model::error_code::ErrorCode;
use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `from` value on every server-originated envelope.
pub const SERVER_ORIGIN: &str = "server";

/// Payload of a `role` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAssignment {
    pub peer_device_id: DeviceId,
    pub role: Role,
}

/// Payload of an `error` notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub error_code: ErrorCode,
    pub error_message: String,
}

/// Message kinds, keyed on the envelope `type` tag.
///
/// `offer`, `answer` and `ice` carry opaque negotiation data that is relayed
/// verbatim; the relay never looks inside it.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalMessage {
    Join,
    Leave,
    Offer(Value),
    Answer(Value),
    Ice(Value),
    Role(RoleAssignment),
    Error(ErrorReport),
}

impl SignalMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            SignalMessage::Join => "join",
            SignalMessage::Leave => "leave",
            SignalMessage::Offer(_) => "offer",
            SignalMessage::Answer(_) => "answer",
            SignalMessage::Ice(_) => "ice",
            SignalMessage::Role(_) => "role",
            SignalMessage::Error(_) => "error",
        }
    }

    /// Offer, answer and ICE messages are relayed to the paired peer.
    pub fn is_forwardable(&self) -> bool {
        matches!(
            self,
            SignalMessage::Offer(_) | SignalMessage::Answer(_) | SignalMessage::Ice(_)
        )
    }

    fn data(&self) -> DataRef<'_> {
        match self {
            SignalMessage::Join | SignalMessage::Leave => DataRef::None,
            SignalMessage::Offer(v) | SignalMessage::Answer(v) | SignalMessage::Ice(v) => {
                if v.is_null() {
                    DataRef::None
                } else {
                    DataRef::Opaque(v)
                }
            }
            SignalMessage::Role(r) => DataRef::Role(r),
            SignalMessage::Error(e) => DataRef::Error(e),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("message format error: missing `{0}`")]
    MissingField(&'static str),

    /// The envelope is well formed but its `type` is not one we know. The
    /// sender's device id is kept so the connection can still be identified.
    #[error("unknown message type: {kind}")]
    UnknownType { kind: String, device_id: DeviceId },
}

/// A complete signaling message as it travels over the wire.
///
/// ```json
/// {"type":"offer","device_id":"cam-12","from":"cam-12","to":"hub-12","data":{"sdp":"..."},"time":1700000000000000}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub message: SignalMessage,
    pub device_id: DeviceId,
    pub from: String,
    pub to: String,
    /// Server-assigned microsecond stamp; overwritten on every relay.
    pub time: Option<u64>,
    /// Top-level fields the relay does not interpret, forwarded as received.
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct WireIn {
    #[serde(rename = "type", default)]
    kind: Option<Value>,
    #[serde(default)]
    device_id: Option<String>,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    to: Option<String>,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    time: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Serialize)]
struct WireOut<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    device_id: &'a DeviceId,
    from: &'a str,
    to: &'a str,
    #[serde(skip_serializing_if = "DataRef::is_none")]
    data: DataRef<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time: Option<u64>,
    #[serde(flatten)]
    extra: &'a Map<String, Value>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum DataRef<'a> {
    Opaque(&'a Value),
    Role(&'a RoleAssignment),
    Error(&'a ErrorReport),
    None,
}

impl DataRef<'_> {
    fn is_none(&self) -> bool {
        matches!(self, DataRef::None)
    }
}

fn required(field: Option<String>, name: &'static str) -> Result<String, DecodeError> {
    field
        .filter(|v| !v.is_empty())
        .ok_or(DecodeError::MissingField(name))
}

/// `type` as text. A non-string tag is kept in its JSON form so it can be
/// reported back as an unknown type.
fn type_name(kind: Option<Value>) -> Result<String, DecodeError> {
    match kind {
        Some(Value::String(s)) => required(Some(s), "type"),
        None | Some(Value::Null) => Err(DecodeError::MissingField("type")),
        Some(other) => Ok(other.to_string()),
    }
}

impl Envelope {
    /// Envelope sent by a client on its own behalf (`from` and `to` both set
    /// to its device id).
    pub fn new(message: SignalMessage, device_id: impl Into<DeviceId>) -> Self {
        let device_id = device_id.into();
        Self {
            message,
            from: device_id.to_string(),
            to: device_id.to_string(),
            device_id,
            time: None,
            extra: Map::new(),
        }
    }

    /// Envelope originated by the relay itself.
    pub fn from_server(message: SignalMessage, device_id: DeviceId, to: &DeviceId) -> Self {
        Self {
            message,
            device_id,
            from: SERVER_ORIGIN.to_owned(),
            to: to.to_string(),
            time: None,
            extra: Map::new(),
        }
    }

    pub fn role(peer_device_id: &DeviceId, role: Role, to: &DeviceId) -> Self {
        Self::from_server(
            SignalMessage::Role(RoleAssignment {
                peer_device_id: peer_device_id.clone(),
                role,
            }),
            peer_device_id.clone(),
            to,
        )
    }

    pub fn error(code: ErrorCode, message: impl Into<String>, to: &DeviceId) -> Self {
        Self::from_server(
            SignalMessage::Error(ErrorReport {
                error_code: code,
                error_message: message.into(),
            }),
            to.clone(),
            to,
        )
    }

    pub fn with_time(mut self, time: u64) -> Self {
        self.time = Some(time);
        self
    }

    /// Validate and decode a raw frame.
    ///
    /// `type`, `device_id`, `from` and `to` must be present and non-empty.
    pub fn decode(raw: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with(raw, true)
    }

    /// Decode a frame received from a client.
    ///
    /// `role` and `error` only ever travel from the relay to a client, so
    /// here they are unknown types and their `data` is never parsed.
    pub fn decode_inbound(raw: &[u8]) -> Result<Self, DecodeError> {
        Self::decode_with(raw, false)
    }

    fn decode_with(raw: &[u8], server_kinds: bool) -> Result<Self, DecodeError> {
        let wire: WireIn = serde_json::from_slice(raw)?;

        let kind = type_name(wire.kind)?;
        let device_id = DeviceId::from(required(wire.device_id, "device_id")?);
        let from = required(wire.from, "from")?;
        let to = required(wire.to, "to")?;
        let time = wire.time.as_ref().and_then(Value::as_u64);

        let message = match kind.as_str() {
            "join" => SignalMessage::Join,
            "leave" => SignalMessage::Leave,
            "offer" => SignalMessage::Offer(wire.data),
            "answer" => SignalMessage::Answer(wire.data),
            "ice" => SignalMessage::Ice(wire.data),
            "role" if server_kinds => SignalMessage::Role(serde_json::from_value(wire.data)?),
            "error" if server_kinds => SignalMessage::Error(serde_json::from_value(wire.data)?),
            _ => {
                return Err(DecodeError::UnknownType {
                    kind: kind.clone(),
                    device_id,
                });
            }
        };

        Ok(Self {
            message,
            device_id,
            from,
            to,
            time,
            extra: wire.extra,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, DecodeError> {
        Self::decode(json.as_bytes())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for Envelope {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        WireOut {
            kind: self.message.kind(),
            device_id: &self.device_id,
            from: &self.from,
            to: &self.to,
            data: self.message.data(),
            time: self.time,
            extra: &self.extra,
        }
        .serialize(serializer)
    }
}

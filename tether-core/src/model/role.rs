use serde::{Deserialize, Serialize};
use std::fmt;

/// Negotiation side assigned to a paired connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// First member of the room; starts the session negotiation.
    Offerer,
    /// Second member of the room; responds to the offer.
    Answerer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Offerer => "offerer",
            Role::Answerer => "answerer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Integer identifiers for rooms, messages and replies.
//!
//! All three are assigned by the store (`INTEGER PRIMARY KEY AUTOINCREMENT`),
//! so they are monotonic in insertion order. That property is what makes
//! identifier order a safe tie-break wherever timestamps collide.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! store_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

store_id!(
    /// Identifier of a conversation room.
    RoomId
);

store_id!(
    /// Identifier of an inbound message.
    MessageId
);

store_id!(
    /// Identifier of a reply to a message.
    ReplyId
);

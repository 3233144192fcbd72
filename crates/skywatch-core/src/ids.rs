//! Branded ID newtypes for type safety.
//!
//! Every entity on the wire has a distinct ID type implemented as a newtype
//! wrapper around `String`. This prevents accidentally passing a channel ID
//! where a user ID is expected.
//!
//! The backend issues UUID v4 identifiers; [`Uuid::new_v4`] is used when a
//! fresh ID is needed locally (mostly in tests).

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Generate a new UUID v4 string.
fn new_v4() -> String {
    Uuid::new_v4().to_string()
}

macro_rules! branded_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new random ID (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(new_v4())
            }

            /// Create from an existing string value.
            #[must_use]
            pub fn from_string(s: String) -> Self {
                Self(s)
            }

            /// Return the inner string as a slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume self and return the inner `String`.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;
            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

branded_id! {
    /// Unique identifier for a user (spotter, coordinator, admin).
    UserId
}

branded_id! {
    /// Unique identifier for a chat channel.
    ChannelId
}

branded_id! {
    /// Unique identifier for a chat message.
    MessageId
}

branded_id! {
    /// Unique identifier for an incident report attached to a message.
    ReportId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_ids_are_unique() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn from_str_roundtrip() {
        let id = ChannelId::from("chan_1");
        assert_eq!(id.as_str(), "chan_1");
        let s: String = id.into();
        assert_eq!(s, "chan_1");
    }

    #[test]
    fn serde_is_transparent() {
        let id = UserId::from("u1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"u1\"");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_matches_inner() {
        let id = MessageId::from("msg_42");
        assert_eq!(id.to_string(), "msg_42");
    }

    #[test]
    fn deref_to_str() {
        let id = ReportId::from("rep_1");
        assert!(id.starts_with("rep"));
    }
}

//! Opaque unique tokens.
//!
//! A token has no structural content; it is only ever compared for identity.
//! Each freshly minted token is a random v4 UUID, so two calls to `new()`
//! never produce equal values. Distinct newtypes keep a [`Sign`] from being
//! passed where an [`EventToken`] is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype token wrapper around `Uuid`.
macro_rules! define_token {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a new unique token.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create a token from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return a reference to the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

define_token!(
    /// Handle identifying one registration, used for targeted removal
    /// without holding a reference to the callback itself.
    Sign
);

define_token!(
    /// Symbolic event identifier that never collides with a string name.
    EventToken
);

//! Event identifiers.

use std::fmt;

use eventbus_core::types::EventToken;

/// Names a dispatch channel: either a text name or an opaque token.
///
/// Two names are equal only if they are the same string or the same token;
/// a token never equals a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    /// A text event name.
    Name(String),
    /// A symbolic event name.
    Token(EventToken),
}

impl EventName {
    /// Returns the text name, if this is not a token.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Token(_) => None,
        }
    }

    /// Returns `true` if this name is a token.
    pub fn is_token(&self) -> bool {
        matches!(self, Self::Token(_))
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Token(token) => write!(f, "{token}"),
        }
    }
}

impl From<&str> for EventName {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for EventName {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for EventName {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<EventToken> for EventName {
    fn from(token: EventToken) -> Self {
        Self::Token(token)
    }
}

impl From<&EventName> for EventName {
    fn from(name: &EventName) -> Self {
        name.clone()
    }
}

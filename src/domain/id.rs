//! Domain identifier types
//!
//! Opaque signer identifiers (tokens, keys, CSRs) are string newtypes so they
//! cannot be mixed up at compile time. Global configuration identifiers are
//! structured and round-trip through their colon-separated textual form,
//! e.g. `FI:GOV:M1:SS1`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Macro to generate NewType wrappers for identifiers assigned by the signing backend
macro_rules! signer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an ID from any string-like value
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

signer_id!(
    /// Identifier of a hardware or software token
    TokenId
);
signer_id!(
    /// Identifier of a key held on a token
    KeyId
);
signer_id!(
    /// Identifier of a pending certificate signing request
    CsrId
);

/// Errors raised when parsing a global configuration identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("{kind} identifier '{value}' must have {expected} colon-separated parts")]
    WrongArity { kind: &'static str, value: String, expected: &'static str },

    #[error("{kind} identifier '{value}' has an empty component")]
    EmptyComponent { kind: &'static str, value: String },
}

fn split_components<'a>(
    kind: &'static str,
    value: &'a str,
    expected: &'static str,
    allowed: &[usize],
) -> Result<Vec<&'a str>, IdentifierError> {
    let parts: Vec<&str> = value.split(':').collect();
    if !allowed.contains(&parts.len()) {
        return Err(IdentifierError::WrongArity { kind, value: value.to_string(), expected });
    }
    if parts.iter().any(|part| part.trim().is_empty()) {
        return Err(IdentifierError::EmptyComponent { kind, value: value.to_string() });
    }
    Ok(parts)
}

/// A member or subsystem registered in the global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId {
    pub instance: String,
    pub member_class: String,
    pub member_code: String,
    pub subsystem_code: Option<String>,
}

impl ClientId {
    pub fn member(
        instance: impl Into<String>,
        member_class: impl Into<String>,
        member_code: impl Into<String>,
    ) -> Self {
        Self {
            instance: instance.into(),
            member_class: member_class.into(),
            member_code: member_code.into(),
            subsystem_code: None,
        }
    }

    pub fn subsystem(
        instance: impl Into<String>,
        member_class: impl Into<String>,
        member_code: impl Into<String>,
        subsystem_code: impl Into<String>,
    ) -> Self {
        Self {
            subsystem_code: Some(subsystem_code.into()),
            ..Self::member(instance, member_class, member_code)
        }
    }

    /// The member this client belongs to; a member is its own member id.
    pub fn member_id(&self) -> ClientId {
        Self::member(&self.instance, &self.member_class, &self.member_code)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.instance, self.member_class, self.member_code)?;
        if let Some(subsystem) = &self.subsystem_code {
            write!(f, ":{}", subsystem)?;
        }
        Ok(())
    }
}

impl FromStr for ClientId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_components("client", s, "3 or 4", &[3, 4])?;
        Ok(Self {
            instance: parts[0].to_string(),
            member_class: parts[1].to_string(),
            member_code: parts[2].to_string(),
            subsystem_code: parts.get(3).map(|s| s.to_string()),
        })
    }
}

impl TryFrom<String> for ClientId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.to_string()
    }
}

/// A security server registered in the global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityServerId {
    pub instance: String,
    pub member_class: String,
    pub member_code: String,
    pub server_code: String,
}

impl SecurityServerId {
    pub fn new(
        instance: impl Into<String>,
        member_class: impl Into<String>,
        member_code: impl Into<String>,
        server_code: impl Into<String>,
    ) -> Self {
        Self {
            instance: instance.into(),
            member_class: member_class.into(),
            member_code: member_code.into(),
            server_code: server_code.into(),
        }
    }

    /// The member that owns this security server
    pub fn owner(&self) -> ClientId {
        ClientId::member(&self.instance, &self.member_class, &self.member_code)
    }
}

impl fmt::Display for SecurityServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.instance, self.member_class, self.member_code, self.server_code
        )
    }
}

impl FromStr for SecurityServerId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_components("security server", s, "4", &[4])?;
        Ok(Self::new(parts[0], parts[1], parts[2], parts[3]))
    }
}

impl TryFrom<String> for SecurityServerId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SecurityServerId> for String {
    fn from(id: SecurityServerId) -> Self {
        id.to_string()
    }
}

/// A global group defined in the global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GlobalGroupId {
    pub instance: String,
    pub group_code: String,
}

impl GlobalGroupId {
    pub fn new(instance: impl Into<String>, group_code: impl Into<String>) -> Self {
        Self { instance: instance.into(), group_code: group_code.into() }
    }
}

impl fmt::Display for GlobalGroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.instance, self.group_code)
    }
}

impl FromStr for GlobalGroupId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = split_components("global group", s, "2", &[2])?;
        Ok(Self::new(parts[0], parts[1]))
    }
}

impl TryFrom<String> for GlobalGroupId {
    type Error = IdentifierError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GlobalGroupId> for String {
    fn from(id: GlobalGroupId) -> Self {
        id.to_string()
    }
}

//! Resources and the operations each one supports.

use crate::error::{NylasError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level Nylas object family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Email,
    Calendar,
    Contact,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Calendar => "calendar",
            Self::Contact => "contact",
        }
    }

    /// Operations that belong to this resource.
    pub fn operations(&self) -> &'static [Operation] {
        match self {
            Self::Email => &[Operation::SendMessage, Operation::ListMessages],
            Self::Calendar => &[
                Operation::ListCalendars,
                Operation::CreateEvent,
                Operation::ListEvents,
                Operation::UpdateEvent,
                Operation::DeleteEvent,
            ],
            Self::Contact => &[
                Operation::ListContacts,
                Operation::CreateContact,
                Operation::UpdateContact,
                Operation::DeleteContact,
            ],
        }
    }

    /// Resolve an operation name within this resource.
    ///
    /// A name that is unknown, or that belongs to another resource, is a
    /// configuration error rather than a user error.
    pub fn operation(&self, name: &str) -> Result<Operation> {
        self.operations()
            .iter()
            .copied()
            .find(|op| op.as_str() == name)
            .ok_or_else(|| NylasError::UnknownOperation {
                resource: self.as_str().to_string(),
                operation: name.to_string(),
            })
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = NylasError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "email" => Ok(Self::Email),
            "calendar" => Ok(Self::Calendar),
            "contact" => Ok(Self::Contact),
            other => Err(NylasError::UnknownOperation {
                resource: other.to_string(),
                operation: String::new(),
            }),
        }
    }
}

/// A single action against a resource. Fixes the HTTP method and path shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    SendMessage,
    ListMessages,
    ListCalendars,
    CreateEvent,
    ListEvents,
    UpdateEvent,
    DeleteEvent,
    ListContacts,
    CreateContact,
    UpdateContact,
    DeleteContact,
}

impl Operation {
    /// Wire name as used in node parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendMessage => "sendMessage",
            Self::ListMessages => "listMessages",
            Self::ListCalendars => "listCalendars",
            Self::CreateEvent => "createEvent",
            Self::ListEvents => "listEvents",
            Self::UpdateEvent => "updateEvent",
            Self::DeleteEvent => "deleteEvent",
            Self::ListContacts => "listContacts",
            Self::CreateContact => "createContact",
            Self::UpdateContact => "updateContact",
            Self::DeleteContact => "deleteContact",
        }
    }

    pub fn resource(&self) -> Resource {
        match self {
            Self::SendMessage | Self::ListMessages => Resource::Email,
            Self::ListCalendars
            | Self::CreateEvent
            | Self::ListEvents
            | Self::UpdateEvent
            | Self::DeleteEvent => Resource::Calendar,
            Self::ListContacts
            | Self::CreateContact
            | Self::UpdateContact
            | Self::DeleteContact => Resource::Contact,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a `(resource, operation)` pair given as raw names.
pub fn resolve(resource: &str, operation: &str) -> Result<Operation> {
    let parsed: Resource = resource.parse().map_err(|_| NylasError::UnknownOperation {
        resource: resource.to_string(),
        operation: operation.to_string(),
    })?;
    parsed.operation(operation)
}

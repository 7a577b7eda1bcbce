//! Nylas v3 payload shapes and the typed parameters of each operation.

use serde::{Deserialize, Serialize};

/// Message recipient as sent in `to[]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Recipient {
    pub fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            name: None,
        }
    }

    pub fn named(email: &str, name: &str) -> Self {
        Self {
            email: email.to_string(),
            name: Some(name.to_string()),
        }
    }
}

/// Event participant. Passed through to the API as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Timespan of an event, in Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct When {
    pub start_time: i64,
    pub end_time: i64,
    pub object: String,
}

impl When {
    pub fn timespan(start_time: i64, end_time: i64) -> Self {
        Self {
            start_time,
            end_time,
            object: "time".to_string(),
        }
    }

    /// A timespan only exists when both ends are set (0 means unset).
    pub fn if_set(start_time: i64, end_time: i64) -> Option<Self> {
        (start_time > 0 && end_time > 0).then(|| Self::timespan(start_time, end_time))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactEmail {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPhoneNumber {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub number: String,
}

/// Recipient as entered by the user, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecipientInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendMessageParams {
    pub recipients: Vec<RecipientInput>,
    pub subject: String,
    pub body: String,
    pub send_at: i64,
    pub use_draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListMessagesParams {
    pub limit: u32,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListCalendarsParams {
    pub limit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateEventParams {
    pub calendar_id: String,
    pub title: String,
    pub start_time: i64,
    pub end_time: i64,
    pub participants: Vec<Participant>,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEventsParams {
    pub calendar_id: String,
    pub limit: u32,
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEventParams {
    pub event_id: String,
    pub calendar_id: String,
    pub title: String,
    pub start_time: i64,
    pub end_time: i64,
    pub participants: Vec<Participant>,
    pub location: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContactsParams {
    pub limit: u32,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactParams {
    pub given_name: String,
    pub surname: String,
    pub emails: Vec<ContactEmail>,
    pub phone_numbers: Vec<ContactPhoneNumber>,
}

/// Parameters of one item, shaped for the operation they were read for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationParams {
    SendMessage(SendMessageParams),
    ListMessages(ListMessagesParams),
    ListCalendars(ListCalendarsParams),
    CreateEvent(CreateEventParams),
    ListEvents(ListEventsParams),
    UpdateEvent(UpdateEventParams),
    DeleteEvent { event_id: String },
    ListContacts(ListContactsParams),
    CreateContact(ContactParams),
    UpdateContact {
        contact_id: String,
        contact: ContactParams,
    },
    DeleteContact { contact_id: String },
}

//! Request descriptors and the per-operation request builder.

use crate::error::{NylasError, Result};
use crate::models::{
    ContactParams, CreateEventParams, OperationParams, Recipient, SendMessageParams,
    UpdateEventParams, When,
};
use crate::validate::ValidatedParams;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// HTTP methods used by the Nylas operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One fully specified outbound call. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    query: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    body: Option<Value>,
}

impl RequestDescriptor {
    pub fn method(&self) -> Method {
        self.method
    }

    /// Path below the API base, always under `/v3/grants/{grantId}`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &BTreeMap<String, Value> {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Absolute URL against a base such as `https://api.us.nylas.com`.
    pub fn url(&self, base_uri: &str) -> String {
        format!("{}{}", base_uri.trim_end_matches('/'), self.path)
    }
}

/// Accumulates the parts of a request before it is frozen.
struct RequestParts {
    method: Method,
    path: String,
    query: BTreeMap<String, Value>,
    body: Option<Value>,
}

impl RequestParts {
    fn new(method: Method, grant_id: &str, tail: &str) -> Self {
        Self {
            method,
            path: format!("/v3/grants/{}/{tail}", urlencoding::encode(grant_id)),
            query: BTreeMap::new(),
            body: None,
        }
    }

    fn query<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.query.insert(key.to_string(), value.into());
        self
    }

    fn query_if<V: Into<Value>>(self, include: bool, key: &str, value: V) -> Self {
        if include {
            self.query(key, value)
        } else {
            self
        }
    }

    fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    fn freeze(self) -> RequestDescriptor {
        RequestDescriptor {
            method: self.method,
            path: self.path,
            query: self.query,
            body: self.body,
        }
    }
}

#[derive(Serialize)]
struct SendMessageBody<'a> {
    to: Vec<Recipient>,
    subject: &'a str,
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    send_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_draft: Option<bool>,
}

/// Build the request for one validated item.
///
/// Deterministic: the same grant and parameters always give an equal descriptor.
pub fn build(grant_id: &str, validated: &ValidatedParams) -> Result<RequestDescriptor> {
    let parts = match validated.params() {
        OperationParams::SendMessage(message) => {
            RequestParts::new(Method::Post, grant_id, "messages/send")
                .body(send_message_body(message)?)
        }
        OperationParams::ListMessages(list) => {
            RequestParts::new(Method::Get, grant_id, "messages")
                .query("limit", list.limit)
                .query_if(!list.subject.is_empty(), "subject", list.subject.as_str())
        }
        OperationParams::ListCalendars(list) => {
            RequestParts::new(Method::Get, grant_id, "calendars").query("limit", list.limit)
        }
        OperationParams::CreateEvent(event) => {
            RequestParts::new(Method::Post, grant_id, "events").body(create_event_body(event)?)
        }
        OperationParams::ListEvents(list) => RequestParts::new(Method::Get, grant_id, "events")
            .query("calendar_id", list.calendar_id.as_str())
            .query("limit", list.limit)
            .query_if(list.start > 0, "start", list.start)
            .query_if(list.end > 0, "end", list.end),
        OperationParams::UpdateEvent(event) => RequestParts::new(
            Method::Put,
            grant_id,
            &format!("events/{}", urlencoding::encode(&event.event_id)),
        )
        .body(update_event_body(event)?),
        OperationParams::DeleteEvent { event_id } => {
            let tail = format!("events/{}", urlencoding::encode(event_id));
            RequestParts::new(Method::Delete, grant_id, &tail)
        }
        OperationParams::ListContacts(list) => {
            RequestParts::new(Method::Get, grant_id, "contacts")
                .query("limit", list.limit)
                .query_if(!list.email.is_empty(), "email", list.email.as_str())
                .query_if(
                    !list.phone_number.is_empty(),
                    "phone_number",
                    list.phone_number.as_str(),
                )
        }
        OperationParams::CreateContact(contact) => {
            let mut body = Map::new();
            body.insert("given_name".into(), Value::from(contact.given_name.as_str()));
            body.insert("surname".into(), Value::from(contact.surname.as_str()));
            insert_contact_lists(&mut body, contact)?;
            RequestParts::new(Method::Post, grant_id, "contacts").body(Value::Object(body))
        }
        OperationParams::UpdateContact {
            contact_id,
            contact,
        } => {
            let mut body = Map::new();
            insert_text(&mut body, "given_name", &contact.given_name);
            insert_text(&mut body, "surname", &contact.surname);
            insert_contact_lists(&mut body, contact)?;
            let tail = format!("contacts/{}", urlencoding::encode(contact_id));
            RequestParts::new(Method::Put, grant_id, &tail).body(Value::Object(body))
        }
        OperationParams::DeleteContact { contact_id } => {
            let tail = format!("contacts/{}", urlencoding::encode(contact_id));
            RequestParts::new(Method::Delete, grant_id, &tail)
        }
    };

    Ok(parts.freeze())
}

fn send_message_body(message: &SendMessageParams) -> Result<Value> {
    let to = message
        .recipients
        .iter()
        .map(|r| Recipient {
            email: r.email.clone(),
            name: r.name.clone(),
        })
        .collect();

    encode(&SendMessageBody {
        to,
        subject: &message.subject,
        body: &message.body,
        send_at: (message.send_at > 0).then_some(message.send_at),
        use_draft: message.use_draft.then_some(true),
    })
}

fn create_event_body(event: &CreateEventParams) -> Result<Value> {
    let mut body = Map::new();
    body.insert("calendar_id".into(), Value::from(event.calendar_id.as_str()));
    body.insert("title".into(), Value::from(event.title.as_str()));
    body.insert(
        "when".into(),
        encode(&When::timespan(event.start_time, event.end_time))?,
    );
    if !event.participants.is_empty() {
        body.insert("participants".into(), encode(&event.participants)?);
    }
    insert_text(&mut body, "location", &event.location);
    insert_text(&mut body, "description", &event.description);
    Ok(Value::Object(body))
}

fn update_event_body(event: &UpdateEventParams) -> Result<Value> {
    let mut body = Map::new();
    body.insert("calendar_id".into(), Value::from(event.calendar_id.as_str()));
    insert_text(&mut body, "title", &event.title);
    if let Some(when) = When::if_set(event.start_time, event.end_time) {
        body.insert("when".into(), encode(&when)?);
    }
    if !event.participants.is_empty() {
        body.insert("participants".into(), encode(&event.participants)?);
    }
    insert_text(&mut body, "location", &event.location);
    insert_text(&mut body, "description", &event.description);
    Ok(Value::Object(body))
}

fn insert_contact_lists(body: &mut Map<String, Value>, contact: &ContactParams) -> Result<()> {
    if !contact.emails.is_empty() {
        body.insert("emails".into(), encode(&contact.emails)?);
    }
    if !contact.phone_numbers.is_empty() {
        body.insert("phone_numbers".into(), encode(&contact.phone_numbers)?);
    }
    Ok(())
}

/// Optional text fields are omitted, never sent as empty or null.
fn insert_text(body: &mut Map<String, Value>, key: &str, value: &str) {
    if !value.is_empty() {
        body.insert(key.to_string(), Value::from(value));
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| NylasError::operation(format!("Failed to encode request body: {e}")))
}

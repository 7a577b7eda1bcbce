//! Parameter reading and validation.
//!
//! [`read_params`] is the parameter layer: it enforces presence, types, and
//! ranges declared for each operation. [`validate`] applies the content rules
//! that must hold before a request may be built.

use crate::error::{NylasError, Result};
use crate::models::{
    ContactParams, CreateEventParams, ListCalendarsParams, ListContactsParams, ListEventsParams,
    ListMessagesParams, OperationParams, RecipientInput, SendMessageParams, UpdateEventParams,
};
use crate::params::{ParamReader, ParamSource};
use crate::resource::Operation;
use once_cell::sync::Lazy;
use regex::Regex;

pub const DEFAULT_LIMIT: i64 = 50;
pub const DEFAULT_CALENDAR_ID: &str = "primary";

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

/// Parameters that passed validation. Only [`validate`] creates these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedParams(OperationParams);

impl ValidatedParams {
    pub fn params(&self) -> &OperationParams {
        &self.0
    }

    pub fn operation(&self) -> Operation {
        operation_of(&self.0)
    }
}

pub fn operation_of(params: &OperationParams) -> Operation {
    match params {
        OperationParams::SendMessage(_) => Operation::SendMessage,
        OperationParams::ListMessages(_) => Operation::ListMessages,
        OperationParams::ListCalendars(_) => Operation::ListCalendars,
        OperationParams::CreateEvent(_) => Operation::CreateEvent,
        OperationParams::ListEvents(_) => Operation::ListEvents,
        OperationParams::UpdateEvent(_) => Operation::UpdateEvent,
        OperationParams::DeleteEvent { .. } => Operation::DeleteEvent,
        OperationParams::ListContacts(_) => Operation::ListContacts,
        OperationParams::CreateContact(_) => Operation::CreateContact,
        OperationParams::UpdateContact { .. } => Operation::UpdateContact,
        OperationParams::DeleteContact { .. } => Operation::DeleteContact,
    }
}

/// Read the grant every request is scoped to.
pub fn read_grant_id<S: ParamSource + ?Sized>(reader: &ParamReader<'_, S>) -> Result<String> {
    required_id(reader, "grantId")
}

/// Read the parameters declared for `operation`.
pub fn read_params<S: ParamSource + ?Sized>(
    operation: Operation,
    reader: &ParamReader<'_, S>,
) -> Result<OperationParams> {
    let params = match operation {
        Operation::SendMessage => OperationParams::SendMessage(SendMessageParams {
            recipients: reader.collection("recipients", "recipient")?,
            subject: reader.string("subject")?,
            body: reader.string("body")?,
            send_at: reader.i64_or("sendAt", 0)?,
            use_draft: reader.bool_or("useDraft", false)?,
        }),
        Operation::ListMessages => OperationParams::ListMessages(ListMessagesParams {
            limit: read_limit(reader)?,
            subject: reader.string_or("subjectFilter", "")?,
        }),
        Operation::ListCalendars => OperationParams::ListCalendars(ListCalendarsParams {
            limit: read_limit(reader)?,
        }),
        Operation::CreateEvent => OperationParams::CreateEvent(CreateEventParams {
            calendar_id: reader.string_or("calendarId", DEFAULT_CALENDAR_ID)?,
            title: reader.string("title")?,
            start_time: reader.i64("startTime")?,
            end_time: reader.i64("endTime")?,
            participants: reader.json_array("participants")?,
            location: reader.string_or("location", "")?,
            description: reader.string_or("description", "")?,
        }),
        Operation::ListEvents => OperationParams::ListEvents(ListEventsParams {
            calendar_id: reader.string_or("calendarId", DEFAULT_CALENDAR_ID)?,
            limit: read_limit(reader)?,
            start: reader.i64_or("start", 0)?,
            end: reader.i64_or("end", 0)?,
        }),
        Operation::UpdateEvent => OperationParams::UpdateEvent(UpdateEventParams {
            event_id: required_id(reader, "eventId")?,
            calendar_id: reader.string_or("calendarId", DEFAULT_CALENDAR_ID)?,
            title: reader.string_or("title", "")?,
            start_time: reader.i64_or("startTime", 0)?,
            end_time: reader.i64_or("endTime", 0)?,
            participants: reader.json_array("participants")?,
            location: reader.string_or("location", "")?,
            description: reader.string_or("description", "")?,
        }),
        Operation::DeleteEvent => OperationParams::DeleteEvent {
            event_id: required_id(reader, "eventId")?,
        },
        Operation::ListContacts => OperationParams::ListContacts(ListContactsParams {
            limit: read_limit(reader)?,
            email: reader.string_or("emailFilter", "")?,
            phone_number: reader.string_or("phoneNumberFilter", "")?,
        }),
        Operation::CreateContact => OperationParams::CreateContact(ContactParams {
            given_name: reader.string("givenName")?,
            surname: reader.string("surname")?,
            emails: reader.json_array("emails")?,
            phone_numbers: reader.json_array("phoneNumbers")?,
        }),
        Operation::UpdateContact => OperationParams::UpdateContact {
            contact_id: required_id(reader, "contactId")?,
            contact: ContactParams {
                given_name: reader.string_or("givenName", "")?,
                surname: reader.string_or("surname", "")?,
                emails: reader.json_array("emails")?,
                phone_numbers: reader.json_array("phoneNumbers")?,
            },
        },
        Operation::DeleteContact => OperationParams::DeleteContact {
            contact_id: required_id(reader, "contactId")?,
        },
    };

    Ok(params)
}

/// Check content rules. Never coerces silently: a failing item is rejected.
pub fn validate(params: OperationParams) -> Result<ValidatedParams> {
    match params {
        OperationParams::SendMessage(message) => {
            Ok(ValidatedParams(OperationParams::SendMessage(validate_message(message)?)))
        }
        other => Ok(ValidatedParams(other)),
    }
}

fn validate_message(message: SendMessageParams) -> Result<SendMessageParams> {
    if message.recipients.is_empty() {
        return Err(NylasError::operation("At least one recipient is required"));
    }

    let mut recipients = Vec::with_capacity(message.recipients.len());
    for (i, recipient) in message.recipients.iter().enumerate() {
        let position = i + 1;
        let email = recipient.email.trim();

        if email.is_empty() {
            return Err(NylasError::operation(format!(
                "Recipient {position}: Email address is required"
            )));
        }

        if !EMAIL_PATTERN.is_match(email) {
            return Err(NylasError::operation(format!(
                "Recipient {position}: Invalid email format - {}",
                recipient.email
            )));
        }

        let name = recipient
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        recipients.push(RecipientInput {
            email: email.to_string(),
            name,
        });
    }

    let subject = message.subject.trim();
    if subject.is_empty() {
        return Err(NylasError::operation("Subject cannot be empty"));
    }
    if message.body.trim().is_empty() {
        return Err(NylasError::operation("Body cannot be empty"));
    }

    Ok(SendMessageParams {
        recipients,
        subject: subject.to_string(),
        ..message
    })
}

fn read_limit<S: ParamSource + ?Sized>(reader: &ParamReader<'_, S>) -> Result<u32> {
    let limit = reader.i64_or("limit", DEFAULT_LIMIT)?;
    if limit < 1 {
        return Err(NylasError::operation("Limit must be at least 1"));
    }
    u32::try_from(limit).map_err(|_| NylasError::operation("Limit is too large"))
}

fn required_id<S: ParamSource + ?Sized>(reader: &ParamReader<'_, S>, name: &str) -> Result<String> {
    let value = reader.string(name)?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(NylasError::operation(format!(
            "missing required parameter '{name}'"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ContactEmail, Participant};
    use crate::params::NodeParameters;
    use crate::request::build;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    fn source(pairs: Value) -> NodeParameters {
        let map: HashMap<String, Value> = serde_json::from_value(pairs).unwrap();
        NodeParameters::new(map, vec![json!({})])
    }

    fn message(recipients: Vec<RecipientInput>) -> OperationParams {
        OperationParams::SendMessage(SendMessageParams {
            recipients,
            subject: "Hi".into(),
            body: "Body".into(),
            send_at: 0,
            use_draft: false,
        })
    }

    fn recipient(email: &str) -> RecipientInput {
        RecipientInput {
            email: email.into(),
            name: None,
        }
    }

    #[test]
    fn test_empty_recipients_rejected() {
        let err = validate(message(vec![])).unwrap_err();
        assert_eq!(err.to_string(), "At least one recipient is required");
    }

    #[test]
    fn test_blank_recipient_email_rejected() {
        let err = validate(message(vec![recipient("a@b.com"), recipient("   ")])).unwrap_err();
        assert_eq!(err.to_string(), "Recipient 2: Email address is required");
    }

    #[test]
    fn test_invalid_email_reports_index_and_value() {
        let err = validate(message(vec![recipient("bad")])).unwrap_err();
        assert_eq!(err.to_string(), "Recipient 1: Invalid email format - bad");
    }

    #[test]
    fn test_subject_and_body_must_not_be_blank() {
        let OperationParams::SendMessage(mut params) = message(vec![recipient("a@b.com")]) else {
            unreachable!()
        };
        params.subject = "  ".into();
        let err = validate(OperationParams::SendMessage(params.clone())).unwrap_err();
        assert_eq!(err.to_string(), "Subject cannot be empty");

        params.subject = "Hi".into();
        params.body = "\n".into();
        let err = validate(OperationParams::SendMessage(params)).unwrap_err();
        assert_eq!(err.to_string(), "Body cannot be empty");
    }

    #[test]
    fn test_valid_message_is_trimmed() {
        let validated = validate(OperationParams::SendMessage(SendMessageParams {
            recipients: vec![RecipientInput {
                email: " a@b.com ".into(),
                name: Some("  ".into()),
            }],
            subject: "  Hello ".into(),
            body: " keep as is ".into(),
            send_at: 0,
            use_draft: false,
        }))
        .unwrap();

        let OperationParams::SendMessage(params) = validated.params() else {
            panic!("expected a message");
        };
        assert_eq!(params.recipients, vec![recipient("a@b.com")]);
        assert_eq!(params.subject, "Hello");
        assert_eq!(params.body, " keep as is ");
        assert_eq!(validated.operation(), Operation::SendMessage);
    }

    #[test]
    fn test_read_params_applies_defaults() {
        let src = source(json!({}));
        let reader = ParamReader::new(&src, 0);

        let params = read_params(Operation::ListEvents, &reader).unwrap();
        assert_eq!(
            params,
            OperationParams::ListEvents(ListEventsParams {
                calendar_id: "primary".into(),
                limit: 50,
                start: 0,
                end: 0,
            })
        );
    }

    #[test]
    fn test_read_params_limit_range() {
        let src = source(json!({"limit": 0}));
        let reader = ParamReader::new(&src, 0);

        let err = read_params(Operation::ListContacts, &reader).unwrap_err();
        assert_eq!(err.to_string(), "Limit must be at least 1");
    }

    #[test]
    fn test_read_params_requires_ids() {
        let src = source(json!({"eventId": "  "}));
        let reader = ParamReader::new(&src, 0);

        let err = read_params(Operation::DeleteEvent, &reader).unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter 'eventId'");

        let err = read_params(Operation::DeleteContact, &reader).unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter 'contactId'");
    }

    #[test]
    fn test_read_grant_id() {
        let src = source(json!({"grantId": " g-123 "}));
        assert_eq!(read_grant_id(&ParamReader::new(&src, 0)).unwrap(), "g-123");

        let src = source(json!({}));
        assert!(read_grant_id(&ParamReader::new(&src, 0)).is_err());
    }

    #[test]
    fn test_create_event_requires_title_and_times() {
        let complete = json!({"title": "Standup", "startTime": 100, "endTime": 200});

        for name in ["title", "startTime", "endTime"] {
            let mut pairs = complete.clone();
            pairs.as_object_mut().unwrap().remove(name);
            let src = source(pairs);

            let err = read_params(Operation::CreateEvent, &ParamReader::new(&src, 0)).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("missing required parameter '{name}'")
            );
        }

        let src = source(complete);
        let params = read_params(Operation::CreateEvent, &ParamReader::new(&src, 0)).unwrap();
        let OperationParams::CreateEvent(event) = params else {
            panic!("expected an event");
        };
        assert_eq!(event.calendar_id, "primary");
        assert_eq!((event.start_time, event.end_time), (100, 200));
    }

    #[test]
    fn test_create_contact_requires_names() {
        let src = source(json!({"surname": "Lovelace"}));
        let err = read_params(Operation::CreateContact, &ParamReader::new(&src, 0)).unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter 'givenName'");

        let src = source(json!({"givenName": "Ada"}));
        let err = read_params(Operation::CreateContact, &ParamReader::new(&src, 0)).unwrap_err();
        assert_eq!(err.to_string(), "missing required parameter 'surname'");
    }

    #[test]
    fn test_json_text_lists_are_parsed() {
        let src = source(json!({
            "title": "Review",
            "startTime": "100",
            "endTime": "200",
            "participants": "[{\"email\": \"a@b.com\", \"name\": \"A\"}]",
        }));
        let params = read_params(Operation::CreateEvent, &ParamReader::new(&src, 0)).unwrap();
        let OperationParams::CreateEvent(event) = params else {
            panic!("expected an event");
        };
        assert_eq!(
            event.participants,
            vec![Participant {
                email: "a@b.com".into(),
                name: Some("A".into()),
            }]
        );

        let src = source(json!({
            "givenName": "Ada",
            "surname": "Lovelace",
            "emails": "[{\"type\": \"work\", \"email\": \"ada@x.io\"}]",
        }));
        let params = read_params(Operation::CreateContact, &ParamReader::new(&src, 0)).unwrap();
        let OperationParams::CreateContact(contact) = params else {
            panic!("expected a contact");
        };
        assert_eq!(
            contact.emails,
            vec![ContactEmail {
                kind: Some("work".into()),
                email: "ada@x.io".into(),
            }]
        );
        assert!(contact.phone_numbers.is_empty());
    }

    #[test]
    fn test_update_contact_with_only_id_sends_empty_body() {
        let src = source(json!({"contactId": "c-1"}));
        let params = read_params(Operation::UpdateContact, &ParamReader::new(&src, 0)).unwrap();
        let request = build("grant-1", &validate(params).unwrap()).unwrap();

        assert_eq!(request.path(), "/v3/grants/grant-1/contacts/c-1");
        assert_eq!(request.body(), Some(&json!({})));
    }
}

//! # nylas-workflow
//!
//! Nylas v3 email, calendar and contact operations for workflow items.
//!
//! A node names one `(resource, operation)` pair and a set of parameters.
//! Each input item is read, validated, turned into one HTTP request against
//! `/v3/grants/{grantId}/...`, executed, and mapped back to one output record.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nylas_workflow::{Credentials, NylasClient, NylasNode, Operation};
//! use serde_json::json;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let node = NylasNode::new(Operation::SendMessage)
//!     .grant("{{ json.grant }}")
//!     .with_param("recipients", json!([{ "email": "{{ json.email }}" }]))
//!     .with_param("subject", "Weekly digest")
//!     .with_param("body", "Hi {{ json.name }}, here is your digest.")
//!     .continue_on_fail(true)
//!     .build();
//!
//! let client = NylasClient::new(Credentials::from_env()?);
//! let items = vec![json!({ "grant": "g-1", "email": "ada@example.com", "name": "Ada" })];
//! let result = node.run(items, &client).await?;
//! println!("{}", serde_json::to_string_pretty(&result.records)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## YAML Definition
//!
//! ```yaml
//! resource: calendar
//! operation: createEvent
//! continue_on_fail: true
//! parameters:
//!   grantId: "{{ json.grant }}"
//!   calendarId: primary
//!   title: "{{ json.title }}"
//!   startTime: "{{ json.start }}"
//!   endTime: "{{ json.end }}"
//! ```

mod client;
mod credentials;
mod error;
mod executor;
mod models;
mod node;
mod output;
mod params;
mod request;
mod resource;
mod validate;
pub mod yaml;

pub use client::{CallError, HttpCaller, NylasClient};
pub use credentials::{Credentials, DEFAULT_API_URI};
pub use error::{NylasError, Result};
pub use executor::{execute, ExecutionResult, FailPolicy, ItemResult, Stage};
pub use models::{
    ContactEmail, ContactParams, ContactPhoneNumber, CreateEventParams, ListCalendarsParams,
    ListContactsParams, ListEventsParams, ListMessagesParams, OperationParams, Participant,
    Recipient, RecipientInput, SendMessageParams, UpdateEventParams, When,
};
pub use node::{NodeBuilder, NylasNode};
pub use output::{api_error, normalize, OutputRecord};
pub use params::{NodeParameters, ParamReader, ParamSource};
pub use request::{build, Method, RequestDescriptor};
pub use resource::{resolve, Operation, Resource};
pub use validate::{read_grant_id, read_params, validate, ValidatedParams};
pub use yaml::parse_yaml;

/// Re-export common types
pub use serde_json::Value;

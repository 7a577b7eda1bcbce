//! End-to-end batches against a mock Nylas API

use mockito::Matcher;
use nylas_workflow::{
    build, validate, Credentials, NylasClient, NylasError, NylasNode, Operation, OperationParams,
    Stage,
};
use serde_json::json;

fn contact_lookup_node(continue_on_fail: bool) -> NylasNode {
    NylasNode::new(Operation::ListContacts)
        .grant("grant-1")
        .with_param("emailFilter", "{{ json.email }}")
        .with_param("limit", 1)
        .continue_on_fail(continue_on_fail)
        .build()
}

#[tokio::test]
async fn it_runs_a_batch_and_captures_api_failures() {
    let mut server = mockito::Server::new_async().await;

    let found = server
        .mock("GET", "/v3/grants/grant-1/contacts")
        .match_header("authorization", "Bearer test_token")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), "1".into()),
            Matcher::UrlEncoded("email".into(), "ada@example.com".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data": [{"id": "c-1", "given_name": "Ada"}]}"#)
        .expect(2)
        .create_async()
        .await;

    let _throttled = server
        .mock("GET", "/v3/grants/grant-1/contacts")
        .match_query(Matcher::UrlEncoded("email".into(), "bob@example.com".into()))
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"type": "rate_limit", "message": "Too many requests"}}"#)
        .create_async()
        .await;

    let client = NylasClient::new(Credentials::new("test_token").with_api_uri(&server.url()));
    let items = vec![
        json!({"email": "ada@example.com"}),
        json!({"email": "bob@example.com"}),
        json!({"email": "ada@example.com"}),
    ];

    let result = contact_lookup_node(true).run(items, &client).await.unwrap();

    assert_eq!(result.records.len(), 3);
    assert_eq!(result.records[0].json["data"][0]["id"], json!("c-1"));
    assert_eq!(
        result.records[1].json,
        json!({"error": "Nylas API Error: Too many requests"})
    );
    assert_eq!(result.records[2].json, result.records[0].json);
    assert_eq!(result.item_results[1].failed_stage, Some(Stage::Execute));
    found.assert_async().await;
}

#[tokio::test]
async fn it_aborts_on_first_failure() {
    let mut server = mockito::Server::new_async().await;

    let _missing = server
        .mock("DELETE", "/v3/grants/grant-1/events/evt-404")
        .with_status(404)
        .with_body(r#"{"message": "event not found"}"#)
        .create_async()
        .await;

    let never_called = server
        .mock("DELETE", "/v3/grants/grant-1/events/evt-2")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let node = NylasNode::new(Operation::DeleteEvent)
        .grant("grant-1")
        .with_param("eventId", "{{ json.id }}")
        .build();
    let client = NylasClient::new(Credentials::new("t").with_api_uri(&server.url()));

    let err = node
        .run(vec![json!({"id": "evt-404"}), json!({"id": "evt-2"})], &client)
        .await
        .unwrap_err();

    assert_eq!(err, NylasError::api("event not found", Some(404)));
    never_called.assert_async().await;
}

#[tokio::test]
async fn it_never_calls_the_api_for_invalid_items() {
    let mut server = mockito::Server::new_async().await;
    let send = server
        .mock("POST", "/v3/grants/grant-1/messages/send")
        .with_status(200)
        .expect(0)
        .create_async()
        .await;

    let node = NylasNode::new(Operation::SendMessage)
        .grant("grant-1")
        .with_param("recipients", json!({"recipient": []}))
        .with_param("subject", "Hi")
        .with_param("body", "There")
        .continue_on_fail(true)
        .build();
    let client = NylasClient::new(Credentials::new("t").with_api_uri(&server.url()));

    let result = node.run(vec![json!({})], &client).await.unwrap();

    assert_eq!(
        result.records[0].error(),
        Some("At least one recipient is required")
    );
    send.assert_async().await;
}

#[test]
fn it_defaults_to_the_us_region() {
    let credentials = Credentials::new("t");
    let validated = validate(OperationParams::DeleteContact {
        contact_id: "c-1".into(),
    })
    .unwrap();
    let request = build("grant-1", &validated).unwrap();

    assert_eq!(
        request.url(credentials.base_uri()),
        "https://api.us.nylas.com/v3/grants/grant-1/contacts/c-1"
    );
}

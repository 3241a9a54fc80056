use std::time::Duration;

use serde_json::json;
use sf_inspector::{AbortHandle, ApiClient, ErrorKind, QueryOptions, RequestSpec};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::MockOrg;

#[tokio::test]
async fn query_with_valid_session_returns_records() {
    let org = MockOrg::start().await;
    org.persist_token("valid");

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/query/"))
        .and(query_param("q", "SELECT Id FROM Account"))
        .and(header("Authorization", "Bearer valid"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 2,
            "done": true,
            "records": [
                {"attributes": {"type": "Account"}, "Id": "001A"},
                {"attributes": {"type": "Account"}, "Id": "001B"}
            ]
        })))
        .mount(&org.server)
        .await;

    let result = org
        .client()
        .query("SELECT Id FROM Account", &QueryOptions::default())
        .await
        .unwrap();

    let records = result["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["Id"], "001B");
}

#[tokio::test]
async fn query_with_expired_token_is_unauthorized() {
    let org = MockOrg::start().await;
    org.persist_token("expired");

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/query/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!([
            {"message": "Session expired or invalid", "errorCode": "INVALID_SESSION_ID"}
        ])))
        .mount(&org.server)
        .await;

    let err = org
        .client()
        .query("SELECT Id FROM Account", &QueryOptions::default())
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::Unauthorized("Session expired or invalid".to_string())
    );
}

#[tokio::test]
async fn protocol_errors_keep_field_diagnostics() {
    let org = MockOrg::start().await;
    org.persist_token("valid");

    Mock::given(method("POST"))
        .and(path("/services/data/v62.0/sobjects/Account"))
        .and(body_json(json!({"Website": "acme.example"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([
            {"errorCode": "REQUIRED_FIELD_MISSING", "message": "Required fields are missing: [Name]", "fields": ["Name"]}
        ])))
        .mount(&org.server)
        .await;

    let spec = RequestSpec::post("/services/data/v62.0/sobjects/Account")
        .json(json!({"Website": "acme.example"}));
    let err = org.client().rest(&spec).await.unwrap_err();

    match err.kind {
        ErrorKind::Protocol {
            status,
            message,
            errors,
            ..
        } => {
            assert_eq!(status, 400);
            assert_eq!(
                message,
                "REQUIRED_FIELD_MISSING: Required fields are missing: [Name] [Name]"
            );
            assert_eq!(errors[0].fields, vec!["Name".to_string()]);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn aborted_query_settles_as_aborted() {
    let org = MockOrg::start().await;
    org.persist_token("valid");

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"done": true, "records": []}))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&org.server)
        .await;

    let client = org.client();
    let handle = AbortHandle::new();
    let aborter = handle.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        aborter.abort();
    });

    let err = client
        .query_abortable("SELECT Id FROM Account", &QueryOptions::default(), Some(&handle))
        .await
        .unwrap_err();
    assert!(err.is_aborted());
    // An abort says nothing about the session.
    assert!(client.current_session().is_some());
}

#[tokio::test]
async fn unreachable_org_is_network_error() {
    let host = {
        let org = MockOrg::start().await;
        org.host()
    };

    let client = ApiClient::builder(host.as_str())
        .with_config(MockOrg::config())
        .with_authority(std::sync::Arc::new(
            sf_inspector::EnvAuthority::new(&host, "valid").unwrap(),
        ))
        .build()
        .unwrap();

    let err = client.list_objects().await.unwrap_err();
    assert!(matches!(err.kind, ErrorKind::Network(_)), "{err:?}");
    assert!(err.is_retryable());
}

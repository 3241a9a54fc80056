use serde_json::json;
use sf_inspector::{ErrorKind, QueryOptions, SessionEvent};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common::MockOrg;

async fn mount_organization(org: &MockOrg) {
    Mock::given(path("/services/data/v62.0/query/"))
        .and(query_param(
            "q",
            "SELECT IsSandbox, InstanceName, TrialExpirationDate FROM Organization",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 1,
            "done": true,
            "records": [{
                "IsSandbox": false,
                "InstanceName": "NA135",
                "TrialExpirationDate": "2026-12-01T00:00:00.000+0000"
            }]
        })))
        .mount(&org.server)
        .await;
}

#[tokio::test]
async fn redirect_fragment_wins_over_persisted_token() {
    let org = MockOrg::start().await;
    org.persist_token("old");
    mount_organization(&org).await;

    Mock::given(method("GET"))
        .and(path("/services/data/v62.0/sobjects"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sobjects": []})))
        .expect(1)
        .mount(&org.server)
        .await;

    let client = org.client();
    let credential = client
        .connect(Some("#access_token=fresh&token_type=Bearer"))
        .await
        .unwrap();
    assert_eq!(credential.token(), "fresh");
    assert_eq!(org.persisted_token().as_deref(), Some("fresh"));

    client.list_objects().await.unwrap();
}

#[tokio::test]
async fn persisted_token_survives_a_new_client() {
    let org = MockOrg::start().await;
    mount_organization(&org).await;

    let first = org.client();
    first
        .connect(Some("access_token=kept"))
        .await
        .unwrap();

    let second = org.client();
    let credential = second.connect(None).await.unwrap();
    assert_eq!(credential.token(), "kept");
}

#[tokio::test]
async fn org_metadata_is_cached_after_connect() {
    let org = MockOrg::start().await;
    org.persist_token("valid");
    mount_organization(&org).await;

    let client = org.client();
    assert_eq!(client.org_metadata().unwrap(), None);
    client.connect(None).await.unwrap();

    let mut cached = None;
    for _ in 0..50 {
        cached = client.org_metadata().unwrap();
        if cached.is_some() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    let cached = cached.expect("org metadata was not cached");
    assert!(!cached.is_sandbox);
    assert_eq!(cached.instance_name.as_deref(), Some("NA135"));
    assert!(cached.trial_expires_at().is_some());

    // Refreshing asks the org again and yields the same facts.
    let refreshed = client.refresh_org_metadata().await.unwrap();
    assert_eq!(refreshed, cached);
}

#[tokio::test]
async fn rejected_token_notifies_subscribers() {
    let org = MockOrg::start().await;
    org.persist_token("revoked");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&org.server)
        .await;

    let client = org.client();
    let mut events = client.subscribe();

    let err = client
        .query("SELECT Id FROM Account", &QueryOptions::default())
        .await
        .unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::Unauthorized("New access token needed".to_string())
    );

    match events.recv().await.unwrap() {
        SessionEvent::TokenRejected { host, message } => {
            assert_eq!(host, org.host());
            assert_eq!(message, "New access token needed");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(client.current_session().is_none());
}

#[tokio::test]
async fn logout_deletes_persisted_token() {
    let org = MockOrg::start().await;
    org.persist_token("valid");

    let client = org.client();
    client.logout().unwrap();

    assert_eq!(org.persisted_token(), None);
    let err = client.connect(None).await.unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::Unauthorized("Session not found".to_string())
    );
}

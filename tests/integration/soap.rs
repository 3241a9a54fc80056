use sf_inspector::{ErrorKind, SoapApi, XmlField, XmlMap, XmlValue};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common::MockOrg;

const PARTNER_QUERY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com" xmlns:sf="urn:sobject.partner.soap.sforce.com" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><soapenv:Body><queryResponse><result xsi:type="QueryResult"><done>true</done><queryLocator xsi:nil="true"/><records xsi:type="sf:sObject"><sf:type>Account</sf:type><sf:Id>001A</sf:Id><sf:Name>Acme</sf:Name></records><records xsi:type="sf:sObject"><sf:type>Account</sf:type><sf:Id>001B</sf:Id><sf:Name>Globex</sf:Name></records><size>2</size></result></queryResponse></soapenv:Body></soapenv:Envelope>"#;

#[tokio::test]
async fn partner_query_decodes_typed_records() {
    let org = MockOrg::start().await;
    org.persist_token("valid");

    Mock::given(method("POST"))
        .and(path("/services/Soap/u/62.0"))
        .and(body_string_contains("<sessionId>valid</sessionId>"))
        .and(body_string_contains("<QueryOptions><batchSize>200</batchSize></QueryOptions>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PARTNER_QUERY))
        .expect(1)
        .mount(&org.server)
        .await;

    let headers = XmlMap::new().with("QueryOptions", XmlMap::new().with("batchSize", "200"));
    let result = org
        .client()
        .invoke_with_headers(
            SoapApi::Partner,
            "query",
            XmlMap::new().with("queryString", "SELECT Id, Name FROM Account"),
            headers,
        )
        .await
        .unwrap();

    let result = result.as_value().unwrap();
    assert_eq!(result.type_tag(), Some("QueryResult"));
    assert_eq!(
        result.get("queryLocator"),
        Some(&XmlField::One(XmlValue::Null))
    );

    let records = result.get("records").unwrap().values();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].type_tag(), Some("sf:sObject"));

    let json = records[1].to_json();
    assert_eq!(json["Name"], "Globex");
    assert_eq!(json["$xsi:type"], "sf:sObject");
}

#[tokio::test]
async fn metadata_api_uses_met_prefix() {
    let org = MockOrg::start().await;
    org.persist_token("valid");

    let response = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="http://soap.sforce.com/2006/04/metadata"><soapenv:Body><listMetadataResponse><result><fullName>Account</fullName><type>CustomObject</type></result><result><fullName>Contact</fullName><type>CustomObject</type></result></listMetadataResponse></soapenv:Body></soapenv:Envelope>"#;

    Mock::given(method("POST"))
        .and(path("/services/Soap/m/62.0"))
        .and(body_string_contains("<met:SessionHeader><met:sessionId>valid</met:sessionId></met:SessionHeader>"))
        .and(body_string_contains("<met:listMetadata>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(response))
        .mount(&org.server)
        .await;

    let args = XmlMap::new()
        .with("queries", XmlMap::new().with("type", "CustomObject"))
        .with("asOfVersion", "62.0");
    let result = org
        .client()
        .invoke(SoapApi::Metadata, "listMetadata", args)
        .await
        .unwrap();

    let names: Vec<&str> = result
        .values()
        .iter()
        .filter_map(|item| item.get("fullName")?.as_value()?.as_str())
        .collect();
    assert_eq!(names, vec!["Account", "Contact"]);
}

#[tokio::test]
async fn soap_fault_is_protocol_error() {
    let org = MockOrg::start().await;
    org.persist_token("valid");

    let fault = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"><soapenv:Body><soapenv:Fault><faultcode>sf:MALFORMED_QUERY</faultcode><faultstring>MALFORMED_QUERY: unexpected token: FORM</faultstring></soapenv:Fault></soapenv:Body></soapenv:Envelope>"#;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string(fault))
        .mount(&org.server)
        .await;

    let client = org.client();
    let err = client
        .invoke(
            SoapApi::Partner,
            "query",
            XmlMap::new().with("queryString", "SELECT Id FORM Account"),
        )
        .await
        .unwrap_err();

    match err.kind {
        ErrorKind::Protocol {
            status,
            message,
            errors,
            ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "MALFORMED_QUERY: unexpected token: FORM");
            assert_eq!(errors[0].code, "sf:MALFORMED_QUERY");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(client.current_session().is_some());
}

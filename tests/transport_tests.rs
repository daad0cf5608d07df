mod test_helpers;

use godesk_cli::context::{Language, RequestContext};
use godesk_cli::error::Error;
use godesk_cli::request::{
    ApiType, Blob, Body, ContentKind, FieldValue, Method, Payload, RequestDescriptor,
    RequestOptions,
};
use godesk_cli::transform::ErrorReason;
use indexmap::IndexMap;
use serde_json::json;
use test_helpers::{transport_for, transport_with_context};
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn french_session() -> RequestContext {
    RequestContext::new(Some("abc123".to_string()), "fr".parse::<Language>().unwrap())
}

#[tokio::test]
async fn test_query_carries_token_and_ui_language() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .and(header("authorization", "Token abc123"))
        .and(header("accept-language", "fr"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_with_context(&server.uri(), french_session());
    let payload = transport
        .execute(&RequestDescriptor::get("/api/v2/appeal/"))
        .await
        .unwrap();
    assert_eq!(payload, Payload::Json(json!({"count": 0, "results": []})));
}

#[tokio::test]
async fn test_enforce_english_for_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("accept-language", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_with_context(&server.uri(), french_session());
    let descriptor = RequestDescriptor::get("/api/v2/event/").with_options(RequestOptions {
        enforce_english_for_query: true,
        ..RequestOptions::default()
    });
    transport.execute(&descriptor).await.unwrap();
}

#[tokio::test]
async fn test_mutations_default_to_english() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/field-report/"))
        .and(header("accept-language", "en"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"summary": "Flood in Dhaka", "countries": [50]})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 99})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_with_context(&server.uri(), french_session());
    let descriptor = RequestDescriptor::post("/api/v2/field-report/")
        .with_body(json!({"summary": "Flood in Dhaka", "countries": [50]}));
    let payload = transport.execute(&descriptor).await.unwrap();
    assert_eq!(payload, Payload::Json(json!({"id": 99})));
}

#[tokio::test]
async fn test_mutation_can_use_current_language() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/v2/dref/7/"))
        .and(header("accept-language", "fr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let transport = transport_with_context(&server.uri(), french_session());
    let descriptor = RequestDescriptor::new(Method::Patch, "/api/v2/dref/{id}/")
        .with_path_variable("id", 7)
        .with_body(json!({"title": "Titre"}))
        .with_options(RequestOptions {
            use_current_language_for_mutation: true,
            ..RequestOptions::default()
        });
    transport.execute(&descriptor).await.unwrap();
}

#[tokio::test]
async fn test_anonymous_session_sends_no_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(|request: &Request| !request.headers.contains_key("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    transport_for(&server.uri())
        .execute(&RequestDescriptor::get("/api/v2/appeal/"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_query_values_are_omitted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/appeal/"))
        .and(query_param("region", "1,2"))
        .and(|request: &Request| {
            let keys: Vec<String> = request.url.query_pairs().map(|(k, _)| k.into_owned()).collect();
            !keys.iter().any(|k| k == "search" || k == "country")
        })
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 0, "results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let descriptor = RequestDescriptor::get("/api/v2/appeal/")
        .with_query("region", json!([1, 2]))
        .with_query("search", "  ")
        .with_query("country", json!(null));
    transport_for(&server.uri()).execute(&descriptor).await.unwrap();
}

#[tokio::test]
async fn test_multipart_body_with_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/dref-files/"))
        .and(|request: &Request| {
            request
                .headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.starts_with("multipart/form-data; boundary="))
        })
        .and(body_string_contains("name=\"client_id\""))
        .and(body_string_contains("name=\"file\"; filename=\"map.png\""))
        .and(body_string_contains("PNGDATA"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 3})))
        .expect(1)
        .mount(&server)
        .await;

    let mut fields = IndexMap::new();
    fields.insert("client_id".to_string(), FieldValue::from(json!("c-1")));
    fields.insert(
        "file".to_string(),
        FieldValue::from(Blob::new(&b"PNGDATA"[..]).with_file_name("map.png")),
    );
    let descriptor = RequestDescriptor::post("/api/v2/dref-files/")
        .with_body(Body::Fields(fields))
        .with_options(RequestOptions {
            form_data: true,
            ..RequestOptions::default()
        });
    transport_for(&server.uri()).execute(&descriptor).await.unwrap();
}

#[tokio::test]
async fn test_attachment_without_form_data_is_rejected() {
    let mut fields = IndexMap::new();
    fields.insert(
        "file".to_string(),
        FieldValue::from(Blob::new(&b"x"[..])),
    );
    let descriptor =
        RequestDescriptor::post("/api/v2/dref-files/").with_body(Body::Fields(fields));
    let err = transport_for("http://127.0.0.1:1")
        .execute(&descriptor)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidBody(_)));
}

#[tokio::test]
async fn test_spreadsheet_response_is_a_blob() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header(
            "accept",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(
                b"PK\x03\x04".to_vec(),
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
        )
        .mount(&server)
        .await;

    let descriptor = RequestDescriptor::get("/api/v2/export/").with_options(RequestOptions {
        content: ContentKind::Spreadsheet,
        ..RequestOptions::default()
    });
    let payload = transport_for(&server.uri()).execute(&descriptor).await.unwrap();
    let Payload::Blob(bytes) = payload else {
        panic!("expected blob, got {payload:?}");
    };
    assert_eq!(&bytes[..], b"PK\x03\x04");
}

#[tokio::test]
async fn test_non_json_response_is_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("id,name\n1,Flood\n", "text/csv"),
        )
        .mount(&server)
        .await;

    let descriptor = RequestDescriptor::get("/api/v2/export/").with_options(RequestOptions {
        content: ContentKind::Csv,
        ..RequestOptions::default()
    });
    let payload = transport_for(&server.uri()).execute(&descriptor).await.unwrap();
    assert_eq!(payload, Payload::Text("id,name\n1,Flood\n".to_string()));
}

#[tokio::test]
async fn test_empty_json_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204).insert_header("Content-Type", "application/json"))
        .mount(&server)
        .await;

    let descriptor = RequestDescriptor::new(Method::Delete, "/api/v2/dref/1/");
    let payload = transport_for(&server.uri()).execute(&descriptor).await.unwrap();
    assert_eq!(payload, Payload::Json(serde_json::Value::Null));
}

#[tokio::test]
async fn test_malformed_json_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{not json", "application/json"))
        .mount(&server)
        .await;

    let err = transport_for(&server.uri())
        .execute(&RequestDescriptor::get("/api/v2/appeal/"))
        .await
        .unwrap_err();
    let Error::Request(transformed) = err else {
        panic!("expected a request error, got {err:?}");
    };
    assert_eq!(transformed.reason, ErrorReason::Parse);
}

#[tokio::test]
async fn test_risk_api_uses_its_own_base() {
    let go = MockServer::start().await;
    let risk = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/seasonal/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&risk)
        .await;

    let transport = godesk_cli::request::Transport::new(
        reqwest::Client::new(),
        godesk_cli::request::ApiBases::new(go.uri(), risk.uri()),
        RequestContext::default(),
    );
    let descriptor = RequestDescriptor::get("/api/v1/seasonal/").with_api(ApiType::Risk);
    transport.execute(&descriptor).await.unwrap();
}

#[tokio::test]
async fn test_legacy_error_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "statusCode": 400,
            "error_message": "Country is required"
        })))
        .mount(&server)
        .await;

    let err = transport_for(&server.uri())
        .execute(&RequestDescriptor::post("/api/v2/field-report/").with_body(json!({})))
        .await
        .unwrap_err();
    let Error::Request(transformed) = err else {
        panic!("expected a request error, got {err:?}");
    };
    assert_eq!(transformed.value.message_for_notification, "Country is required");
    assert_eq!(transformed.field_errors("$internal"), ["Country is required".to_string()]);
}

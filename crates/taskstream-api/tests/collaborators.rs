// Collaborator client against a mock backend.

use serde_json::json;
use wiremock::matchers::{
    body_json, body_string_contains, header, header_regex, method, path, query_param,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

use taskstream_api::{
    clarifications, ApiClient, ApiError, CopyOptions, NewShareLink, ShareLinkUpdate, UploadFile,
};
use taskstream_core::config::ApiConfig;
use taskstream_core::{Credential, SessionId, VisitorId};

fn client(server: &MockServer, credential: Option<Credential>) -> ApiClient {
    let api = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    ApiClient::new(api, credential).unwrap()
}

#[tokio::test]
async fn list_sessions_sends_paging_and_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/user/sessions"))
        .and(query_param("page", "2"))
        .and(query_param("items_per_page", "20"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "session_id": "a", "name": "Sales" },
                { "session_id": "b", "name": null }
            ],
            "total": 22
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server, Some(Credential::Bearer("tok".into())))
        .list_sessions(2, 20)
        .await
        .unwrap();
    assert_eq!(page.total, 22);
    assert_eq!(page.data.len(), 2);
    assert_eq!(page.data[0].name.as_deref(), Some("Sales"));
    assert_eq!(page.data[1].name, None);
}

#[tokio::test]
async fn error_detail_is_surfaced() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/session/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Session not found" })))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .delete_session(&SessionId::from("gone"))
        .await
        .unwrap_err();
    match err {
        ApiError::Api { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Session not found");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}

#[tokio::test]
async fn error_without_body_uses_status_reason() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server, None)
        .list_sessions(1, 10)
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(err.to_string().contains("Unauthorized"));
}

#[tokio::test]
async fn copy_session_posts_options_and_returns_new_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/s1/copy"))
        .and(body_json(json!({
            "new_name": "Copy of s1",
            "copy_options": {
                "include_memory": false,
                "include_files": false,
                "include_form": true,
                "include_clarifications": true,
                "include_metadata": true
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "new_session_id": "s9" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client(&server, None)
        .copy_session(&SessionId::from("s1"), "Copy of s1", CopyOptions::default())
        .await
        .unwrap();
    assert_eq!(id, SessionId::from("s9"));
}

#[tokio::test]
async fn checkpoints_round_trip_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/checkpoint/s1/checkpoints"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "checkpoint_id": "cp1", "label": "before import", "created_at": "2025-01-01T00:00:00Z" }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/s1/checkpoint"))
        .and(query_param("label", "v2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/checkpoint/s1/checkpoint/activate/cp1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/checkpoint/s1/checkpoint/deactivate"))
        .and(query_param("store_changes", "true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/session/checkpoint/checkpoint/cp1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, None);
    let session = SessionId::from("s1");
    let cps = api.list_checkpoints(&session).await.unwrap();
    assert_eq!(cps[0].checkpoint_id, "cp1");
    assert_eq!(cps[0].name, None);

    api.create_checkpoint(&session, "v2").await.unwrap();
    api.activate_checkpoint(&session, "cp1").await.unwrap();
    api.deactivate_checkpoint(&session, true).await.unwrap();
    api.delete_checkpoint("cp1").await.unwrap();
}

#[tokio::test]
async fn output_files_list_and_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/s1/outputs"))
        .and(query_param("since", "1700000000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{ "name": "sales report.csv", "size": 12, "modified": 1700000100 }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/s1/outputs/sales%20report.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"a,b\n1,2\n".to_vec()))
        .mount(&server)
        .await;

    let api = client(&server, None);
    let session = SessionId::from("s1");
    let files = api.list_outputs(&session, Some(1_700_000_000)).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].modified, 1_700_000_100);

    let bytes = api.download_output(&session, &files[0].name).await.unwrap();
    assert_eq!(bytes, b"a,b\n1,2\n");
}

#[tokio::test]
async fn share_links_create_update_delete() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/files/session/s1/outputs/out.html/share"))
        .and(body_json(json!({ "description": "Q3", "expires_in_days": 10, "strategy": "reuse" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "share_token": "tok-1" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/files/share_links/7"))
        .and(body_json(json!({ "description": "Q3 final", "expires_in_days": 3, "is_active": false })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/files/share_links/7"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, None);
    let token = api
        .create_share_link(&SessionId::from("s1"), "out.html", &NewShareLink::new("Q3", 10))
        .await
        .unwrap();
    assert_eq!(token, "tok-1");

    let update = ShareLinkUpdate {
        description: "Q3 final".into(),
        expires_in_days: 3,
        is_active: false,
    };
    api.update_share_link(7, &update).await.unwrap();
    api.delete_share_link(7).await.unwrap();
}

#[tokio::test]
async fn visitor_bootstrap_carries_visitor_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/public/share-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "share_token": "share-abc",
            "label": "Demo",
            "kind": "session",
            "expires_at": "2099-01-01T00:00:00Z"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/public/share-abc/bootstrap"))
        .and(header("x-visitor-id", "v-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "visitor_id": "v-1",
            "first_visit": true,
            "kind": "session",
            "label": "Demo",
            "expires_at": "2099-01-01T00:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, None);
    let info = api.public_session("share-abc").await.unwrap();
    assert_eq!(info.label, "Demo");

    let boot = api
        .bootstrap_visitor("share-abc", &VisitorId::from("v-1"))
        .await
        .unwrap();
    assert!(boot.first_visit);
}

#[tokio::test]
async fn public_share_link_for_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/public/share/session/s1"))
        .and(query_param("ttl_days", "7"))
        .and(query_param("label", "for client"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "share_token": "pub-9" })))
        .expect(1)
        .mount(&server)
        .await;

    let token = client(&server, None)
        .create_public_share(&SessionId::from("s1"), 7, Some("  for client "))
        .await
        .unwrap();
    assert_eq!(token, "pub-9");
}

#[tokio::test]
async fn session_setup_upload_then_clarify() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/files/s1"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("filename=\"sales.csv\""))
        .and(body_string_contains("name=\"data_sources\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "form": {
                "questions": [{
                    "field": "region",
                    "source": "sales.csv",
                    "questions": ["Which region?", "Which year?"]
                }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/session/clarify/s1"))
        .and(body_json(json!({
            "clarifications": { "Which region?": "EMEA", "Which year?": "" }
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, None);
    let session = SessionId::from("s1");
    let mut questions = api
        .upload_session_data(&session, vec![UploadFile::new("sales.csv", b"a,b\n1,2\n".to_vec())])
        .await
        .unwrap();
    assert_eq!(questions.len(), 1);
    assert!(questions[0].answers.is_empty());

    questions[0].answers = vec!["EMEA".into()];
    api.clarify_session(&session, &clarifications(&questions))
        .await
        .unwrap();
}

#[tokio::test]
async fn upload_without_questions_yields_empty_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/files/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;

    let questions = client(&server, None)
        .upload_session_data(&SessionId::from("s1"), vec![UploadFile::new("a.csv", b"x".to_vec())])
        .await
        .unwrap();
    assert!(questions.is_empty());
}

#[tokio::test]
async fn pending_clarification_form_is_fetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/s1/clarification_status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "submitted": false })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/session/s1/form"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "form": { "questions": [{ "field": "unit", "source": "x.csv", "questions": ["Currency?"] }] }
        })))
        .mount(&server)
        .await;

    let api = client(&server, None);
    let session = SessionId::from("s1");
    assert!(!api.clarification_submitted(&session).await.unwrap());
    let form = api.clarification_form(&session).await.unwrap();
    assert_eq!(form[0].questions, vec!["Currency?".to_string()]);
}

#[tokio::test]
async fn generate_goals_returns_kpis() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/session/generate_goals/s1"))
        .and(body_json(json!({ "goal": "grow revenue" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tasks": {
                "complex_kpis": [
                    { "kpi_name": "Revenue growth", "description": "QoQ revenue delta" },
                    { "kpi_name": "Churn" }
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let kpis = client(&server, None)
        .generate_goals(&SessionId::from("s1"), "grow revenue")
        .await
        .unwrap();
    assert_eq!(kpis.len(), 2);
    assert_eq!(kpis[0].kpi_name, "Revenue growth");
    assert_eq!(kpis[1].description, "");
}

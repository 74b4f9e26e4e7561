//! REST endpoint tests against a wiremock server.

use anyhow::Result;
use mix_client::{
    Callback, CallbackType, CreateSessionRequest, DownloadOptions, Error, ForkSessionRequest,
    HistoryQuery, MixClient, Preferences, SessionType,
};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_json(id: &str, title: &str) -> serde_json::Value {
    json!({
        "id": id,
        "title": title,
        "created_at": "2025-01-15T10:30:00Z",
        "session_type": "main",
        "user_message_count": 0,
        "assistant_message_count": 0
    })
}

fn client_for(server: &MockServer) -> MixClient {
    MixClient::builder()
        .base_url(server.uri())
        .auth_token("test-token")
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_health_is_at_root() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "version": "1.2.0"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let health = client.system().health().await?;
    assert_eq!(health.status_str(), "ok");
    assert_eq!(health.version.as_deref(), Some("1.2.0"));
    assert!(client.system().is_healthy().await);
    Ok(())
}

#[tokio::test]
async fn test_session_lifecycle() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sessions"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_json(json!({"title": "Demo", "session_type": "main"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("s1", "Demo")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([session_json("s1", "Demo")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("s1", "Demo")))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/sessions/s1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client
        .sessions()
        .create(CreateSessionRequest::new("Demo").with_type(SessionType::Main))
        .await?;
    assert_eq!(created.id, "s1");
    assert_eq!(created.session_type, Some(SessionType::Main));

    assert_eq!(client.sessions().list().await?.len(), 1);
    assert_eq!(client.sessions().get("s1").await?.title, "Demo");
    client.sessions().delete("s1").await?;
    Ok(())
}

#[tokio::test]
async fn test_session_fork_rewind_callbacks_cancel() -> Result<()> {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/fork"))
        .and(body_json(json!({"message_index": 1, "title": "Fork"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("s2", "Fork")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/rewind"))
        .and(body_json(json!({"message_id": "m3"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/sessions/s1/callbacks"))
        .and(body_json(json!({"callbacks": [
            {"type": "bash_script", "event_type": "tool_execution_complete", "bash_script": "echo done"}
        ]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/cancel"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let fork = client
        .sessions()
        .fork(
            "s1",
            ForkSessionRequest {
                message_index: 1,
                title: Some("Fork".into()),
            },
        )
        .await?;
    assert_eq!(fork.id, "s2");

    client.sessions().rewind("s1", "m3").await?;

    let mut callback = Callback::new(CallbackType::BashScript);
    callback.event_type = Some("tool_execution_complete".into());
    callback.bash_script = Some("echo done".into());
    client.sessions().update_callbacks("s1", vec![callback]).await?;

    client.sessions().cancel("s1").await?;
    Ok(())
}

#[tokio::test]
async fn test_export_session() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s1/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s1",
            "title": "Demo",
            "messages": [
                {"id": "m1", "role": "user", "user_input": "hi"},
                {"id": "m2", "role": "assistant", "user_input": "hi", "assistant_response": "hello"}
            ],
            "total_tokens": 42
        })))
        .mount(&server)
        .await;

    let export = client_for(&server).sessions().export("s1").await?;
    assert_eq!(export.messages.len(), 2);
    assert_eq!(export.messages[1].display_content(), "hello");
    assert_eq!(export.total_tokens, Some(42));
    Ok(())
}

#[tokio::test]
async fn test_messages() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/messages"))
        .and(body_json(json!({"text": "Hello"})))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"status": "processing"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/messages/history"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "m1", "role": "user", "user_input": "Hello"}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.messages().send("s1", "Hello").await?;

    let history = client
        .messages()
        .history(HistoryQuery {
            limit: Some(5),
            offset: None,
        })
        .await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].display_content(), "Hello");
    Ok(())
}

#[tokio::test]
async fn test_files() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/sessions/s1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "sample.txt",
            "url": "/api/sessions/s1/files/sample.txt",
            "size": 5,
            "modified": 1736937000
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/s1/files/sample.jpg"))
        .and(query_param("thumb", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/sessions/s1/files/sample.txt"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let info = client
        .files()
        .upload("s1", "sample.txt", b"hello".to_vec())
        .await?;
    assert_eq!(info.name, "sample.txt");
    assert_eq!(info.size, 5);

    let thumb = client
        .files()
        .download("s1", "sample.jpg", DownloadOptions::thumbnail(100))
        .await?;
    assert_eq!(&thumb[..], &[0xFF, 0xD8, 0xFF]);

    client.files().delete("s1", "sample.txt").await?;
    Ok(())
}

#[tokio::test]
async fn test_authentication() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "providers": {
                "anthropic": {"authenticated": true, "auth_method": "api_key"},
                "openai": {"authenticated": false}
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/api-key"))
        .and(body_json(json!({"provider": "openai", "api_key": "sk-test"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/oauth/anthropic/start"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "auth_url": "https://auth.example.com/authorize",
            "state": "xyz"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/internal/oauth/refresh"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let status = client.authentication().status().await?;
    assert!(status.providers["anthropic"].is_authenticated());
    assert!(!status.providers["openai"].is_authenticated());

    client.authentication().store_api_key("openai", "sk-test").await?;

    let oauth = client.authentication().start_oauth("anthropic").await?;
    assert_eq!(oauth.state.as_deref(), Some("xyz"));

    client.authentication().refresh_oauth_tokens().await?;
    Ok(())
}

#[tokio::test]
async fn test_preferences_partial_update() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/api/preferences"))
        .and(body_json(json!({"main_agent_max_tokens": 4096})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "preferred_provider": "anthropic",
            "main_agent_max_tokens": 4096
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/preferences"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "preferences": {"preferred_provider": "anthropic", "main_agent_max_tokens": 4096},
            "available_providers": {"anthropic": {"name": "Anthropic", "models": ["claude"]}}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let update = Preferences {
        main_agent_max_tokens: Some(4096),
        ..Default::default()
    };
    let stored = client.preferences().update(&update).await?;
    assert_eq!(stored.main_agent_max_tokens, Some(4096));
    assert_eq!(stored.preferred_provider.as_deref(), Some("anthropic"));

    let response = client.preferences().get().await?;
    assert_eq!(response.preferences.unwrap_or_default(), stored);
    assert_eq!(response.available_providers["anthropic"].models, vec!["claude"]);
    Ok(())
}

#[tokio::test]
async fn test_permissions() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/permissions/p1/grant"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/permissions/p2/deny"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.permissions().grant("p1").await?;
    client.permissions().deny("p2").await?;
    Ok(())
}

#[tokio::test]
async fn test_tools() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tools": [{"name": "web_search", "description": "Search the web", "required": ["query"]}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tools/credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "categories": {
                "search": {
                    "display_name": "Search",
                    "tools": [{"name": "web_search", "authenticated": true}]
                }
            }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let tools = client.tools().list().await?;
    assert_eq!(tools[0].name.as_deref(), Some("web_search"));
    assert_eq!(tools[0].required, vec!["query"]);

    let creds = client.tools().credentials().await?;
    assert_eq!(creds.categories["search"].tools[0].authenticated, Some(true));
    Ok(())
}

#[tokio::test]
async fn test_error_mapping() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"error": "session not found"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/preferences"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/commands"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"code": "internal", "message": "database locked"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tools"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "warming up"})))
        .mount(&server)
        .await;

    let client = client_for(&server);

    let err = client.sessions().get("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("session not found"));

    let err = client.preferences().get().await.unwrap_err();
    assert!(err.is_auth_error());

    match client.system().commands().await.unwrap_err() {
        Error::Api {
            status,
            code,
            message,
        } => {
            assert_eq!(status, 500);
            assert_eq!(code.as_deref(), Some("internal"));
            assert_eq!(message, "database locked");
        }
        other => panic!("expected Api error, got {:?}", other),
    }

    match client.tools().list().await.unwrap_err() {
        Error::Api { status, code, .. } => {
            assert_eq!(status, 503);
            assert_eq!(code, None);
        }
        other => panic!("expected Api error, got {:?}", other),
    }
    Ok(())
}

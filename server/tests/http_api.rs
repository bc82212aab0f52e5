use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use mentoria_core::{GeminiClient, GeminiConfig, GeminiError, ModelGatewayRef};
use mentoria_server::http_server::{router, AppState};
use mentoria_tutor::testing::ScriptedGateway;
use mentoria_tutor::{InMemoryChatSessionStore, TutorService};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app(gateway: ModelGatewayRef) -> Router {
    router(AppState::new(
        TutorService::new(gateway),
        Arc::new(InMemoryChatSessionStore::new()),
        chrono::Duration::hours(1),
    ))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

#[tokio::test]
async fn health_check_responds() {
    let app = app(ScriptedGateway::new());
    let (status, body) = call(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("MentorIA is running"));
}

#[tokio::test]
async fn generate_echoes_type_and_topic() {
    let gateway = ScriptedGateway::replying(&["La fotosíntesis convierte luz en energía."]);
    let app = app(gateway.clone());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/generate",
        Some(json!({"type": "summary", "topic": "fotosíntesis", "additionalContext": "secundaria"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "success": true,
            "data": "La fotosíntesis convierte luz en energía.",
            "type": "summary",
            "topic": "fotosíntesis"
        })
    );
    assert_eq!(gateway.calls(), 1);
}

#[tokio::test]
async fn generate_rejects_quiz_type() {
    let gateway = ScriptedGateway::new();
    let app = app(gateway.clone());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/generate",
        Some(json!({"type": "quiz", "topic": "fotosíntesis"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("quiz"));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() {
    let app = app(ScriptedGateway::new());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/ai/chat")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn quiz_round_trip() {
    let raw = json!({
        "title": "Planetas",
        "topic": "sistema solar",
        "totalQuestions": 9,
        "questions": [
            {
                "id": 1, "question": "¿Cuál es el planeta más grande?", "type": "multiple_choice",
                "options": ["Marte", "Júpiter", "Venus"], "correctAnswer": 1,
                "explanation": "Júpiter es el más grande.", "difficulty": "easy"
            },
            {
                "id": 2, "question": "Plutón es un planeta.", "type": "true_false",
                "correctAnswer": "falso",
                "explanation": "Es un planeta enano.", "difficulty": "medium"
            }
        ]
    });
    let reply = format!("Aquí tienes:\n```json\n{}\n```", raw);
    let app = app(ScriptedGateway::replying(&[&reply]));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/quiz",
        Some(json!({"topic": "sistema solar", "numQuestions": 2})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["totalQuestions"], json!(2));
    assert_eq!(body["data"]["questions"][1]["correctAnswer"], json!("false"));
}

#[tokio::test]
async fn quiz_without_json_is_a_server_error() {
    let app = app(ScriptedGateway::replying(&["No puedo generar eso."]));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/quiz",
        Some(json!({"topic": "sistema solar"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("expected format"));
}

#[tokio::test]
async fn chat_message_too_long_is_rejected() {
    let gateway = ScriptedGateway::new();
    let app = app(gateway.clone());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/chat",
        Some(json!({"message": "a".repeat(10_001)})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn chat_replies_with_timestamp() {
    let app = app(ScriptedGateway::replying(&["¡Hola!"]));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/chat",
        Some(json!({"message": "hola", "history": [{"role": "user", "content": 3}, "basura"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], json!("¡Hola!"));
    assert!(body["data"]["timestamp"].is_string());
}

#[tokio::test]
async fn analyze_reports_text_length() {
    let app = app(ScriptedGateway::replying(&["1. Idea principal"]));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/analyze",
        Some(json!({"text": "Texto breve", "analysisType": "key_points"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({"analysis": "1. Idea principal", "analysisType": "key_points", "textLength": 11})
    );
}

#[tokio::test]
async fn analyze_rejects_unknown_type_without_calling_model() {
    let gateway = ScriptedGateway::new();
    let app = app(gateway.clone());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/analyze",
        Some(json!({"text": "Texto", "analysisType": "bogus"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], json!(false));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn model_failure_is_surfaced_verbatim() {
    let gateway = ScriptedGateway::new();
    gateway.push_error(GeminiError::HttpError {
        status_code: 503,
        message: "The model is overloaded".into(),
    });
    let app = app(gateway);

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/generate",
        Some(json!({"type": "explanation", "topic": "gravedad"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].as_str().unwrap().contains("The model is overloaded"));
}

#[tokio::test]
async fn chat_session_lifecycle() {
    let app = app(ScriptedGateway::replying(&["Un átomo es..."]));

    let (status, body) = call(&app, Method::POST, "/api/ai/chat/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let session_uri = format!("/api/ai/chat/sessions/{}", id);
    let messages_uri = format!("{}/messages", session_uri);

    let (status, body) = call(
        &app,
        Method::POST,
        &messages_uri,
        Some(json!({"message": "¿Qué es un átomo?", "context": "química"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], json!("model"));
    assert_eq!(body["data"]["content"], json!("Un átomo es..."));

    let (status, body) = call(&app, Method::GET, &session_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["messages"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["messages"][0]["role"], json!("user"));

    let (status, _) = call(&app, Method::POST, &messages_uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, Method::DELETE, &messages_uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (_, body) = call(&app, Method::GET, &session_uri, None).await;
    assert!(body["data"]["messages"].as_array().unwrap().is_empty());

    let (status, _) = call(&app, Method::DELETE, &session_uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, &session_uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let gateway = ScriptedGateway::new();
    let app = app(gateway.clone());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/chat/sessions/no-such-session/messages",
        Some(json!({"message": "hola"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("no-such-session"));
    assert_eq!(gateway.calls(), 0);
}

#[tokio::test]
async fn transport_failure_does_not_reveal_api_key() {
    let client = GeminiClient::new(GeminiConfig {
        api_key: Some("SECRET-KEY-123".to_string()),
        api_base_url: Some("http://127.0.0.1:9".to_string()),
        ..GeminiConfig::default()
    })
    .unwrap();
    let app = app(Arc::new(client));

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/ai/generate",
        Some(json!({"type": "summary", "topic": "la luna"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], json!(false));
    assert!(!body.to_string().contains("SECRET-KEY-123"));
}

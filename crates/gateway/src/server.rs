use std::net::SocketAddr;

use {
    axum::{
        Router,
        body::Bytes,
        extract::State,
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Json, Response},
        routing::{get, post},
    },
    secrecy::ExposeSecret,
    tower_http::trace::TraceLayer,
    tracing::{debug, info, warn},
};

use {
    relaybot_common::unix_now,
    relaybot_config::RelaybotConfig,
    relaybot_slack::{
        InboundPayload, parse_payload,
        signature::{self, SIGNATURE_HEADER, TIMESTAMP_HEADER},
    },
};

use crate::state::AppState;

/// Header carrying the diagnostic endpoint's shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Fixed prompt sent by the `/gemini` smoke test.
const DIAGNOSTIC_PROMPT: &str = "Hi";

// ── Router ───────────────────────────────────────────────────────────────────

/// Build the HTTP router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/slack/events", post(slack_events_handler))
        .route("/gemini", get(gemini_handler))
        .route("/health", get(health_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind `bind:port` and serve until the process exits.
pub async fn start_server(config: &RelaybotConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        addr = %listener.local_addr()?,
        model = %config.gemini.model,
        "relaybot listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

// ── Handlers ─────────────────────────────────────────────────────────────────

async fn slack_events_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Some(secret) = state.signing_secret.as_deref() {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
        if let Err(e) = signature::verify(
            secret.expose_secret(),
            header(TIMESTAMP_HEADER),
            header(SIGNATURE_HEADER),
            &body,
            unix_now(),
        ) {
            warn!(error = %e, "rejecting unsigned slack request");
            return unauthorized();
        }
    }

    let payload = match parse_payload(&body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(error = %e, "malformed slack events payload");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        },
    };

    match payload {
        InboundPayload::Challenge(challenge) => {
            info!("answering slack url verification");
            Json(serde_json::json!({ "challenge": challenge })).into_response()
        },
        InboundPayload::Event(event) => {
            // The reply task runs detached; Slack only needs the 200.
            if state.dispatcher.dispatch(event).is_some() {
                debug!("slack event accepted");
            }
            StatusCode::OK.into_response()
        },
        InboundPayload::Other => StatusCode::OK.into_response(),
    }
}

async fn gemini_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let presented = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let authorized = match (state.api_key.as_deref(), presented) {
        (Some(expected), Some(presented)) => {
            constant_time_eq(expected.expose_secret(), presented)
        },
        _ => false,
    };
    if !authorized {
        return unauthorized();
    }

    match state.provider.generate(DIAGNOSTIC_PROMPT).await {
        Ok(text) => text.into_response(),
        Err(e) => {
            warn!(provider = state.provider.name(), error = %e, "diagnostic generation failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        },
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": state.version,
        "dedup_entries": state.dispatcher.dedup().len(),
    }))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

/// Constant-time string comparison.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        async_trait::async_trait,
        axum::body::Body,
        relaybot_agents::LlmProvider,
        relaybot_channels::{ChannelOutbound, ThreadHistory, ThreadMessage},
        secrecy::Secret,
        std::sync::Arc,
        tower::ServiceExt,
    };

    const SIGNING_SECRET: &str = "test-signing-secret";

    struct SilentSlack;

    #[async_trait]
    impl ThreadHistory for SilentSlack {
        async fn fetch_thread_replies(
            &self,
            _channel: &str,
            _thread_ts: &str,
        ) -> relaybot_channels::Result<Vec<ThreadMessage>> {
            Ok(Vec::new())
        }
    }

    #[async_trait]
    impl ChannelOutbound for SilentSlack {
        async fn post_message(
            &self,
            _channel: &str,
            _text: &str,
            _thread_ts: &str,
        ) -> relaybot_channels::Result<()> {
            Ok(())
        }
    }

    struct EchoProvider;

    #[async_trait]
    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn id(&self) -> &str {
            "echo"
        }

        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            Ok(prompt.to_string())
        }
    }

    fn signed_app() -> Router {
        let slack = Arc::new(SilentSlack);
        build_app(AppState::new(
            Arc::clone(&slack) as Arc<dyn ThreadHistory>,
            slack,
            Arc::new(EchoProvider),
            "U123",
            None,
            Some(Secret::new(SIGNING_SECRET.into())),
        ))
    }

    fn events_request(
        body: &'static str,
        timestamp: &str,
        sig: Option<String>,
    ) -> axum::http::Request<Body> {
        let mut builder = axum::http::Request::builder()
            .method("POST")
            .uri("/slack/events")
            .header("content-type", "application/json")
            .header(TIMESTAMP_HEADER, timestamp);
        if let Some(sig) = sig {
            builder = builder.header(SIGNATURE_HEADER, sig);
        }
        builder.body(Body::from(body)).unwrap()
    }

    #[tokio::test]
    async fn signed_challenge_is_answered() {
        let body = r#"{"challenge":"xyz"}"#;
        let ts = unix_now().to_string();
        let sig = signature::sign(SIGNING_SECRET, &ts, body.as_bytes());

        let resp = signed_app()
            .oneshot(events_request(body, &ts, Some(sig)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({ "challenge": "xyz" }));
    }

    #[tokio::test]
    async fn missing_signature_is_rejected() {
        let ts = unix_now().to_string();
        let resp = signed_app()
            .oneshot(events_request(r#"{"challenge":"xyz"}"#, &ts, None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Unauthorized" }));
    }

    #[tokio::test]
    async fn forged_signature_is_rejected() {
        let body = r#"{"challenge":"xyz"}"#;
        let ts = unix_now().to_string();
        let sig = signature::sign("wrong-secret", &ts, body.as_bytes());

        let resp = signed_app()
            .oneshot(events_request(body, &ts, Some(sig)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn replayed_request_is_rejected() {
        let body = r#"{"challenge":"xyz"}"#;
        let ts = (unix_now() - 3600).to_string();
        let sig = signature::sign(SIGNING_SECRET, &ts, body.as_bytes());

        let resp = signed_app()
            .oneshot(events_request(body, &ts, Some(sig)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn constant_time_eq_matches_only_identical_strings() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(!constant_time_eq("", "a"));
    }
}

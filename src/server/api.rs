//! HTTP API server implementation

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::core::config::TranslatorConfig;
use crate::core::errors::TranslateError;
use crate::core::models::{Language, ProviderId, Request};
use crate::core::provider::Client;
use crate::core::translator::Translator;

/// Application state
#[derive(Clone)]
pub struct AppState {
    client: Arc<dyn Client>,
    translator: Translator,
    providers: Vec<ProviderId>,
    shutdown: CancellationToken,
}

impl AppState {
    pub fn new(client: Arc<dyn Client>, translator: Translator, providers: Vec<ProviderId>) -> Self {
        Self {
            client,
            translator,
            providers,
            shutdown: CancellationToken::new(),
        }
    }
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Providers list response
#[derive(Serialize)]
struct ProvidersResponse {
    object: String,
    data: Vec<ProviderInfo>,
}

#[derive(Serialize)]
struct ProviderInfo {
    id: String,
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capabilities: Option<Vec<String>>,
}

/// Text translation request
#[derive(Deserialize)]
pub struct TranslateRequest {
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub text_list: Vec<String>,
}

/// Text translation response
#[derive(Serialize)]
pub struct TranslateResponse {
    pub translations: Vec<TranslationItem>,
}

#[derive(Serialize)]
pub struct TranslationItem {
    pub text: String,
}

/// Batch of independent translation requests
#[derive(Deserialize)]
pub struct BatchRequest {
    pub requests: Vec<TranslateRequest>,
}

/// One entry per request, in request order
#[derive(Serialize)]
pub struct BatchResponse {
    pub results: Vec<BatchItem>,
}

#[derive(Serialize)]
pub struct BatchItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translations: Option<Vec<TranslationItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

type ApiError = (StatusCode, axum::Json<ErrorResponse>);

impl From<&TranslateError> for ErrorDetail {
    fn from(err: &TranslateError) -> Self {
        let r#type = if err.is_validation() {
            "invalid_request_error"
        } else {
            "provider_error"
        };

        ErrorDetail {
            message: err.to_string(),
            code: Some(err.kind().code().to_string()),
            r#type: Some(r#type.to_string()),
        }
    }
}

fn api_error(err: &TranslateError) -> ApiError {
    let status = if err.is_validation() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::BAD_GATEWAY
    };

    (status, axum::Json(ErrorResponse { error: err.into() }))
}

fn invalid_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(ErrorResponse {
            error: ErrorDetail {
                message: message.into(),
                code: Some("invalid_request".to_string()),
                r#type: Some("invalid_request_error".to_string()),
            },
        }),
    )
}

/// Map common client-side codes onto provider codes
fn parse_language(code: &str) -> Result<Language, String> {
    let code = match code {
        "zh-CN" => "ZH-HANS",
        "zh-TW" => "ZH-HANT",
        "no" => "NB",
        other => other,
    };
    code.parse()
}

fn build_request(payload: TranslateRequest) -> Result<Request, ApiError> {
    if payload.text_list.is_empty() {
        return Err(invalid_request("text_list cannot be empty"));
    }

    let to = parse_language(&payload.target_lang).map_err(invalid_request)?;
    let mut request = Request::text(payload.text_list, to);
    if let Some(source) = payload.source_lang.as_deref() {
        request = request.with_from(parse_language(source).map_err(invalid_request)?);
    }
    Ok(request)
}

fn items(text: Vec<String>) -> Vec<TranslationItem> {
    text.into_iter().map(|text| TranslationItem { text }).collect()
}

/// Health check handler
async fn health_check() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "ok".to_string(),
        service: crate::NAME.to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// List registered providers
async fn get_providers(State(state): State<Arc<AppState>>) -> axum::Json<ProvidersResponse> {
    let active = state.client.name();
    let data = state
        .providers
        .iter()
        .map(|id| {
            let is_active = *id == active;
            let capabilities = is_active.then(|| {
                let mut caps = Vec::new();
                if state.client.as_sync().is_some() {
                    caps.push("sync".to_string());
                }
                if state.client.as_async().is_some() {
                    caps.push("async".to_string());
                }
                caps
            });

            ProviderInfo {
                id: id.to_string(),
                active: is_active,
                version: is_active.then(|| state.client.version().to_string()),
                capabilities,
            }
        })
        .collect();

    axum::Json(ProvidersResponse {
        object: "list".to_string(),
        data,
    })
}

/// Text translation handler
async fn translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<axum::Json<TranslateResponse>, ApiError> {
    let request = build_request(payload)?;

    match state
        .translator
        .translate(&state.shutdown, &request, state.client.as_ref())
        .await
    {
        Ok(response) => Ok(axum::Json(TranslateResponse {
            translations: items(response.text),
        })),
        Err(e) => {
            warn!("Translation failed: {}", e);
            Err(api_error(&e))
        }
    }
}

/// Batch translation handler
async fn translate_batch(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<BatchRequest>,
) -> Result<axum::Json<BatchResponse>, ApiError> {
    if payload.requests.is_empty() {
        return Err(invalid_request("requests cannot be empty"));
    }

    let requests = payload
        .requests
        .into_iter()
        .map(build_request)
        .collect::<Result<Vec<_>, _>>()?;

    let results = state
        .translator
        .batch_translate(&state.shutdown, &requests, state.client.as_ref())
        .await
        .into_iter()
        .map(|result| match result {
            Ok(response) => BatchItem {
                translations: Some(items(response.text)),
                error: None,
            },
            Err(e) => BatchItem {
                translations: None,
                error: Some((&e).into()),
            },
        })
        .collect();

    Ok(axum::Json(BatchResponse { results }))
}

/// Build the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_check))
        .route("/v1/providers", get(get_providers))
        .route("/translate", post(translate))
        .route("/translate/batch", post(translate_batch))
        .with_state(Arc::new(state))
}

/// Run the HTTP server
pub async fn run_server(config: TranslatorConfig, host: String, port: u16) -> anyhow::Result<()> {
    config.validate()?;

    let registry = crate::providers::builtin_registry()?;
    let client = registry.get_client(&config.provider, &config.credentials())?;
    let state = AppState::new(client, Translator::from_config(&config), registry.providers());
    let shutdown = state.shutdown.clone();

    let app = router(state);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down, cancelling in-flight jobs");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{ErrorKind, Result};
    use crate::core::models::Response;
    use crate::core::provider::SyncClient;
    use assert_json_diff::assert_json_eq;
    use async_trait::async_trait;

    struct EchoClient;

    impl Client for EchoClient {
        fn name(&self) -> ProviderId {
            ProviderId::new("echo")
        }

        fn version(&self) -> &str {
            "1"
        }

        fn get_cost(&self, _request: &Request) -> f64 {
            0.0
        }

        fn get_char_count(&self, _request: &Request) -> usize {
            0
        }

        fn as_sync(&self) -> Option<&dyn SyncClient> {
            Some(self)
        }
    }

    #[async_trait]
    impl SyncClient for EchoClient {
        async fn translate(&self, _ctx: &CancellationToken, request: &Request) -> Result<Response> {
            if request.to == Language::Thai {
                return Err(TranslateError::new(
                    ErrorKind::InvalidLanguage,
                    "validate_request",
                    "echo",
                    "invalid target language TH",
                ));
            }
            Ok(Response::from_text(
                request.text.iter().map(|t| format!("{}@{}", t, request.to)),
            ))
        }
    }

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(
            Arc::new(EchoClient),
            Translator::new(),
            vec![ProviderId::DEEPL, ProviderId::new("echo")],
        ))
    }

    #[tokio::test]
    async fn test_translate_handler() {
        let payload = TranslateRequest {
            source_lang: Some("en".to_string()),
            target_lang: "zh-CN".to_string(),
            text_list: vec!["hello".to_string(), "bye".to_string()],
        };

        let axum::Json(response) = translate(State(state()), Json(payload)).await.ok().unwrap();

        assert_json_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "translations": [{"text": "hello@ZH-HANS"}, {"text": "bye@ZH-HANS"}]
            })
        );
    }

    #[tokio::test]
    async fn test_translate_handler_rejects_empty_list() {
        let payload = TranslateRequest {
            source_lang: None,
            target_lang: "de".to_string(),
            text_list: vec![],
        };

        let (status, _) = translate(State(state()), Json(payload)).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_translate_handler_maps_provider_error() {
        let payload = TranslateRequest {
            source_lang: None,
            target_lang: "th".to_string(),
            text_list: vec!["hello".to_string()],
        };

        let (status, axum::Json(body)) = translate(State(state()), Json(payload)).await.err().unwrap();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_json_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "error": {
                    "message": "[echo] validate_request: invalid target language TH",
                    "code": "invalid_language",
                    "type": "invalid_request_error"
                }
            })
        );
    }

    #[tokio::test]
    async fn test_batch_handler_keeps_order() {
        let payload = BatchRequest {
            requests: vec![
                TranslateRequest {
                    source_lang: None,
                    target_lang: "de".to_string(),
                    text_list: vec!["a".to_string()],
                },
                TranslateRequest {
                    source_lang: None,
                    target_lang: "th".to_string(),
                    text_list: vec!["b".to_string()],
                },
                TranslateRequest {
                    source_lang: None,
                    target_lang: "fr".to_string(),
                    text_list: vec!["c".to_string()],
                },
            ],
        };

        let axum::Json(response) = translate_batch(State(state()), Json(payload)).await.ok().unwrap();
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["results"][0]["translations"][0]["text"], "a@DE");
        assert_eq!(value["results"][1]["error"]["code"], "invalid_language");
        assert_eq!(value["results"][2]["translations"][0]["text"], "c@FR");
    }

    #[tokio::test]
    async fn test_providers_handler() {
        let axum::Json(response) = get_providers(State(state())).await;

        assert_json_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "object": "list",
                "data": [
                    {"id": "deepl", "active": false},
                    {"id": "echo", "active": true, "version": "1", "capabilities": ["sync"]}
                ]
            })
        );
    }
}

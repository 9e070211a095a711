//! DeepL provider: text translation (sync) and document translation (async)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::errors::{Cancelled, ErrorKind, Result, TranslateError};
use crate::core::models::{
    AsyncResponse, Credentials, Format, JobStatus, Language, ProviderId, Request, Response,
};
use crate::core::provider::{AsyncClient, Client, SyncClient};

pub const PRO_API_HOST: &str = "https://api.deepl.com";
pub const FREE_API_HOST: &str = "https://api-free.deepl.com";
pub const API_VERSION: &str = "v2";

/// Free-plan keys end with this suffix
const FREE_KEY_SUFFIX: &str = ":fx";
const PRICE_PER_MILLION_CHARS: f64 = 25.0;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const PROVIDER: &str = "deepl";

pub const SUPPORTED_FROM: &[Language] = &[
    Language::AutoDetect,
    Language::Arabic,
    Language::Bulgarian,
    Language::Czech,
    Language::Danish,
    Language::German,
    Language::Greek,
    Language::English,
    Language::Spanish,
    Language::Estonian,
    Language::Finnish,
    Language::French,
    Language::Hungarian,
    Language::Indonesian,
    Language::Italian,
    Language::Japanese,
    Language::Korean,
    Language::Lithuanian,
    Language::Latvian,
    Language::NorwegianBokmal,
    Language::Dutch,
    Language::Polish,
    Language::Portuguese,
    Language::Romanian,
    Language::Russian,
    Language::Slovak,
    Language::Slovenian,
    Language::Swedish,
    Language::Turkish,
    Language::Ukrainian,
    Language::Chinese,
];

pub const SUPPORTED_TO: &[Language] = &[
    Language::Arabic,
    Language::Bulgarian,
    Language::Czech,
    Language::Danish,
    Language::German,
    Language::Greek,
    Language::EnglishUs,
    Language::EnglishUk,
    Language::Spanish,
    Language::Estonian,
    Language::Finnish,
    Language::French,
    Language::Hungarian,
    Language::Indonesian,
    Language::Italian,
    Language::Japanese,
    Language::Korean,
    Language::Lithuanian,
    Language::Latvian,
    Language::NorwegianBokmal,
    Language::Dutch,
    Language::Polish,
    Language::PortugueseBrazil,
    Language::PortuguesePortugal,
    Language::Romanian,
    Language::Russian,
    Language::Slovak,
    Language::Slovenian,
    Language::Swedish,
    Language::Turkish,
    Language::Ukrainian,
    Language::ChineseSimplified,
    Language::ChineseTraditional,
];

pub const SUPPORTED_FORMATS: &[Format] = &[Format::File, Format::Text];

#[derive(Serialize)]
struct TranslateBody<'a> {
    text: &'a [String],
    target_lang: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<&'a str>,
}

#[derive(Deserialize)]
struct Translations {
    translations: Vec<Translation>,
}

#[derive(Deserialize)]
struct Translation {
    #[serde(default)]
    detected_source_language: Option<String>,
    text: String,
}

#[derive(Deserialize)]
struct Document {
    document_id: String,
    document_key: String,
}

#[derive(Deserialize)]
struct DocumentStatus {
    #[serde(default)]
    document_id: String,
    status: String,
    #[serde(default)]
    seconds_remaining: Option<u32>,
    #[serde(default)]
    message: Option<String>,
}

/// DeepL API client
#[derive(Debug, Clone)]
pub struct DeepLClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    is_free: bool,
}

/// Registry factory
pub fn factory(credentials: &Credentials) -> Result<Arc<dyn Client>> {
    let timeout = credentials.timeout.unwrap_or(DEFAULT_TIMEOUT);
    Ok(Arc::new(DeepLClient::new(credentials, timeout)?))
}

fn is_free_account(api_key: &str) -> bool {
    api_key.ends_with(FREE_KEY_SUFFIX)
}

fn api_host(api_key: &str) -> &'static str {
    if is_free_account(api_key) {
        FREE_API_HOST
    } else {
        PRO_API_HOST
    }
}

fn error(kind: ErrorKind, operation: &str, cause: impl Into<crate::core::errors::BoxError>) -> TranslateError {
    TranslateError::new(kind, operation, PROVIDER, cause)
}

/// Check a request against what DeepL supports
///
/// Returns the effective source language (`AutoDetect` when unset).
pub fn validate_request(request: &Request) -> Result<Language> {
    let from = request.from.unwrap_or(Language::AutoDetect);

    if !SUPPORTED_FROM.contains(&from) {
        return Err(error(
            ErrorKind::InvalidLanguage,
            "validate_request",
            format!("invalid source language {}", from),
        ));
    }
    if !SUPPORTED_TO.contains(&request.to) {
        return Err(error(
            ErrorKind::InvalidLanguage,
            "validate_request",
            format!("invalid target language {}", request.to),
        ));
    }
    if !SUPPORTED_FORMATS.contains(&request.req_type) {
        return Err(error(
            ErrorKind::InvalidRequest,
            "validate_request",
            format!("invalid request type {}", request.req_type),
        ));
    }

    let has_file = request.file_name.as_deref().map(|n| !n.is_empty()).unwrap_or(false);
    if request.text.is_empty() && !has_file {
        return Err(error(
            ErrorKind::InvalidRequest,
            "validate_request",
            "no text or filename",
        ));
    }

    Ok(from)
}

impl DeepLClient {
    /// Create a client; the host is picked from the key unless overridden
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self> {
        let host = credentials
            .base_url
            .clone()
            .unwrap_or_else(|| api_host(&credentials.api_key).to_string());

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Some(Duration::from_secs(30)))
            .build()
            .map_err(|e| error(ErrorKind::Http, "new", e))?;

        Ok(Self {
            http,
            base_url: format!("{}/{}", host.trim_end_matches('/'), API_VERSION),
            api_key: credentials.api_key.clone(),
            is_free: is_free_account(&credentials.api_key),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.api_key)
    }

    /// Send a request, racing it against cancellation
    async fn send(
        &self,
        ctx: &CancellationToken,
        operation: &str,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response> {
        let builder = builder.header("Authorization", self.auth_header());

        tokio::select! {
            _ = ctx.cancelled() => Err(error(ErrorKind::Network, operation, Cancelled)),
            res = builder.send() => res.map_err(|e| error(ErrorKind::Network, operation, e)),
        }
    }

    fn status_error(operation: &str, response: &reqwest::Response) -> TranslateError {
        let trace_id = response
            .headers()
            .get("X-Trace-ID")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        error(
            ErrorKind::Http,
            operation,
            format!("response code {}, trace id: {}", response.status().as_u16(), trace_id),
        )
    }

    fn check_handle(operation: &str, job: &AsyncResponse) -> Result<()> {
        if job.document_id.is_empty() {
            return Err(error(ErrorKind::InvalidRequest, operation, "document id not set"));
        }
        if job.document_key.is_empty() {
            return Err(error(ErrorKind::InvalidRequest, operation, "document key not set"));
        }
        Ok(())
    }

    async fn translate_text(
        &self,
        ctx: &CancellationToken,
        text: &[String],
        from: Language,
        to: Language,
    ) -> Result<Response> {
        let op = "translate_text";
        let body = TranslateBody {
            text,
            target_lang: to.code(),
            source_lang: (from != Language::AutoDetect).then(|| from.code()),
        };

        let response = self
            .send(ctx, op, self.http.post(self.url("translate")).json(&body))
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(op, &response));
        }

        let translations: Translations = response
            .json()
            .await
            .map_err(|e| error(ErrorKind::InvalidResponse, op, e))?;

        if translations.translations.is_empty() {
            return Err(error(ErrorKind::EmptyResponse, op, "empty translation array"));
        }

        if let Some(detected) = translations
            .translations
            .first()
            .and_then(|t| t.detected_source_language.as_deref())
        {
            debug!("DeepL detected source language {}", detected);
        }

        Ok(Response::from_text(
            translations.translations.into_iter().map(|t| t.text),
        ))
    }

    async fn translate_document(
        &self,
        ctx: &CancellationToken,
        binary: &[u8],
        file_name: &str,
        from: Language,
        to: Language,
    ) -> Result<AsyncResponse> {
        let op = "translate_document";

        let part = reqwest::multipart::Part::bytes(binary.to_vec()).file_name(file_name.to_string());
        let mut form = reqwest::multipart::Form::new().part("file", part);
        if from != Language::AutoDetect {
            form = form.text("source_lang", from.code());
        }
        form = form.text("target_lang", to.code());

        let response = self
            .send(ctx, op, self.http.post(self.url("document")).multipart(form))
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(op, &response));
        }

        let document: Document = response
            .json()
            .await
            .map_err(|e| error(ErrorKind::InvalidResponse, op, e))?;

        Ok(AsyncResponse {
            document_id: document.document_id,
            document_key: document.document_key,
        })
    }
}

impl Client for DeepLClient {
    fn name(&self) -> ProviderId {
        ProviderId::DEEPL
    }

    fn version(&self) -> &str {
        API_VERSION
    }

    // TODO: estimate document requests from the uploaded file size
    fn get_cost(&self, request: &Request) -> f64 {
        if self.is_free {
            return 0.0;
        }
        PRICE_PER_MILLION_CHARS * self.get_char_count(request) as f64 / 1_000_000.0
    }

    fn get_char_count(&self, request: &Request) -> usize {
        match request.req_type {
            Format::Text => request.text.iter().map(|s| s.chars().count()).sum(),
            _ => 0,
        }
    }

    fn as_sync(&self) -> Option<&dyn SyncClient> {
        Some(self)
    }

    fn as_async(&self) -> Option<&dyn AsyncClient> {
        Some(self)
    }
}

#[async_trait]
impl SyncClient for DeepLClient {
    async fn translate(&self, ctx: &CancellationToken, request: &Request) -> Result<Response> {
        let from = validate_request(request)?;

        if request.req_type != Format::Text {
            return Err(error(
                ErrorKind::InvalidRequest,
                "translate",
                format!("invalid request type {}", request.req_type),
            ));
        }

        self.translate_text(ctx, &request.text, from, request.to).await
    }
}

#[async_trait]
impl AsyncClient for DeepLClient {
    async fn async_translate(
        &self,
        ctx: &CancellationToken,
        request: &Request,
    ) -> Result<AsyncResponse> {
        let from = validate_request(request)?;

        if request.req_type != Format::File {
            return Err(error(
                ErrorKind::InvalidRequest,
                "async_translate",
                format!("invalid request type {}", request.req_type),
            ));
        }

        let (Some(binary), Some(file_name)) = (request.binary.as_deref(), request.file_name.as_deref())
        else {
            return Err(error(
                ErrorKind::InvalidRequest,
                "async_translate",
                "file requests need both content and a file name",
            ));
        };

        self.translate_document(ctx, binary, file_name, from, request.to)
            .await
    }

    async fn check_status(&self, ctx: &CancellationToken, job: &AsyncResponse) -> Result<JobStatus> {
        let op = "check_status";
        Self::check_handle(op, job)?;

        let builder = self
            .http
            .post(self.url(&format!("document/{}", job.document_id)))
            .form(&[("document_key", job.document_key.as_str())]);
        let response = self.send(ctx, op, builder).await?;

        if !response.status().is_success() {
            return Err(Self::status_error(op, &response));
        }

        let status: DocumentStatus = response
            .json()
            .await
            .map_err(|e| error(ErrorKind::InvalidResponse, op, e))?;

        let job_status = match status.status.as_str() {
            "queued" => JobStatus::queued(),
            "translating" => JobStatus::translating(status.seconds_remaining.unwrap_or(0)),
            "done" => JobStatus::done(),
            "error" => JobStatus::failed(status.message.unwrap_or_default()),
            other => {
                warn!("Unknown status {:?} for document {}", other, status.document_id);
                JobStatus::default()
            }
        };

        Ok(job_status)
    }

    async fn get_result(&self, ctx: &CancellationToken, job: &AsyncResponse) -> Result<Response> {
        let op = "get_result";
        Self::check_handle(op, job)?;

        let builder = self
            .http
            .post(self.url(&format!("document/{}/result", job.document_id)))
            .form(&[("document_key", job.document_key.as_str())]);
        let response = self.send(ctx, op, builder).await?;

        match response.status().as_u16() {
            200..=299 => {}
            404 => return Err(error(ErrorKind::ProviderApi, op, "document not found")),
            503 => return Err(error(ErrorKind::ProviderApi, op, "document already downloaded")),
            _ => return Err(Self::status_error(op, &response)),
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| error(ErrorKind::Io, op, e))?;

        Ok(Response::from_binary(body.to_vec()))
    }
}

//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Payload format of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Plain text segments
    Text,
    /// A document uploaded as multipart form data
    File,
    /// JSON payload
    Json,
}

impl Format {
    /// MIME type of the payload
    pub fn mime(&self) -> &'static str {
        match self {
            Format::Text => "text/plain",
            Format::File => "multipart/form-data",
            Format::Json => "application/json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime())
    }
}

macro_rules! languages {
    ($($variant:ident => $code:literal),+ $(,)?) => {
        /// Language codes understood by providers
        ///
        /// `AutoDetect` is only meaningful as a source language.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Language {
            /// Let the provider detect the source language
            AutoDetect,
            $(
                #[serde(rename = $code)]
                $variant,
            )+
        }

        impl Language {
            /// Upper-case code as sent to providers (`AutoDetect` has none)
            pub fn code(&self) -> &'static str {
                match self {
                    Language::AutoDetect => "",
                    $(Language::$variant => $code,)+
                }
            }
        }

        impl FromStr for Language {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let upper = s.trim().to_ascii_uppercase();
                match upper.as_str() {
                    "" | "AUTO" | "AUTODETECT" => Ok(Language::AutoDetect),
                    $($code => Ok(Language::$variant),)+
                    _ => Err(format!("unknown language code: {}", s)),
                }
            }
        }
    };
}

languages! {
    English => "EN",
    EnglishUs => "EN-US",
    EnglishUk => "EN-GB",
    Arabic => "AR",
    Bulgarian => "BG",
    Czech => "CS",
    Danish => "DA",
    German => "DE",
    Greek => "EL",
    Spanish => "ES",
    Estonian => "ET",
    Finnish => "FI",
    French => "FR",
    Hungarian => "HU",
    Indonesian => "ID",
    Italian => "IT",
    Japanese => "JA",
    Korean => "KO",
    Lithuanian => "LT",
    Latvian => "LV",
    NorwegianBokmal => "NB",
    Dutch => "NL",
    Polish => "PL",
    Portuguese => "PT",
    PortugueseBrazil => "PT-BR",
    PortuguesePortugal => "PT-PT",
    Romanian => "RO",
    Russian => "RU",
    Slovak => "SK",
    Slovenian => "SL",
    Swedish => "SV",
    Thai => "TH",
    Turkish => "TR",
    Ukrainian => "UK",
    Vietnamese => "VI",
    Chinese => "ZH",
    ChineseSimplified => "ZH-HANS",
    ChineseTraditional => "ZH-HANT",
}

impl Language {
    pub fn lower(&self) -> String {
        self.code().to_ascii_lowercase()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::AutoDetect => write!(f, "auto"),
            other => write!(f, "{}", other.code()),
        }
    }
}

/// Provider identifier used as registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderId(Cow<'static, str>);

impl ProviderId {
    pub const DEEPL: ProviderId = ProviderId(Cow::Borrowed("deepl"));

    pub fn new(id: impl Into<Cow<'static, str>>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProviderId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Cow::Owned(s.trim().to_ascii_lowercase())))
    }
}

/// What a provider factory needs to build a client
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub api_key: String,
    /// Overrides the provider's default host
    pub base_url: Option<String>,
    /// Per HTTP request timeout; the provider default when unset
    pub timeout: Option<Duration>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

/// Translation request
///
/// Text requests carry `text`; file requests carry `binary` and `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub req_type: Format,
    pub text: Vec<String>,
    pub binary: Option<Vec<u8>>,
    pub file_name: Option<String>,
    pub from: Option<Language>,
    pub to: Language,
}

impl Request {
    pub fn text<I, S>(text: I, to: Language) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            req_type: Format::Text,
            text: text.into_iter().map(Into::into).collect(),
            binary: None,
            file_name: None,
            from: None,
            to,
        }
    }

    pub fn file(binary: Vec<u8>, file_name: impl Into<String>, to: Language) -> Self {
        Self {
            req_type: Format::File,
            text: Vec::new(),
            binary: Some(binary),
            file_name: Some(file_name.into()),
            from: None,
            to,
        }
    }

    pub fn with_from(mut self, from: Language) -> Self {
        self.from = Some(from);
        self
    }

    pub fn with_format(mut self, req_type: Format) -> Self {
        self.req_type = req_type;
        self
    }
}

/// Completed translation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Translated segments, in request order
    pub text: Vec<String>,
    /// Translated document bytes
    pub binary: Option<Vec<u8>>,
}

impl Response {
    pub fn from_text<I, S>(text: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            text: text.into_iter().map(Into::into).collect(),
            binary: None,
        }
    }

    pub fn from_binary(binary: Vec<u8>) -> Self {
        Self {
            text: Vec::new(),
            binary: Some(binary),
        }
    }
}

/// Opaque handle of a submitted asynchronous job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncResponse {
    pub document_id: String,
    pub document_key: String,
}

/// Snapshot of an asynchronous job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStatus {
    pub done: bool,
    pub failed: bool,
    pub seconds_remaining: u32,
    pub message: String,
}

impl JobStatus {
    pub fn queued() -> Self {
        Self {
            message: "Queued".to_string(),
            ..Default::default()
        }
    }

    pub fn translating(seconds_remaining: u32) -> Self {
        Self {
            seconds_remaining,
            ..Default::default()
        }
    }

    pub fn done() -> Self {
        Self {
            done: true,
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            failed: true,
            message: message.into(),
            ..Default::default()
        }
    }

    /// No further polling can change this status
    pub fn is_terminal(&self) -> bool {
        self.done || self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("de".parse::<Language>().unwrap(), Language::German);
        assert_eq!("zh-hans".parse::<Language>().unwrap(), Language::ChineseSimplified);
        assert_eq!("auto".parse::<Language>().unwrap(), Language::AutoDetect);
        assert!("xx".parse::<Language>().is_err());
    }

    #[test]
    fn test_language_display() {
        assert_eq!(Language::EnglishUs.to_string(), "EN-US");
        assert_eq!(Language::AutoDetect.to_string(), "auto");
        assert_eq!(Language::PortugueseBrazil.lower(), "pt-br");
    }

    #[test]
    fn test_provider_id_parse_is_case_insensitive() {
        let id: ProviderId = "DeepL".parse().unwrap();
        assert_eq!(id, ProviderId::DEEPL);
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::queued().is_terminal());
        assert!(!JobStatus::translating(3).is_terminal());
        assert!(JobStatus::done().is_terminal());

        let failed = JobStatus::failed("boom");
        assert!(failed.is_terminal());
        assert!(!failed.done);
    }

    #[test]
    fn test_request_builders() {
        let req = Request::text(["hello"], Language::German).with_from(Language::English);
        assert_eq!(req.req_type, Format::Text);
        assert_eq!(req.text, vec!["hello".to_string()]);
        assert_eq!(req.from, Some(Language::English));

        let req = Request::file(vec![1, 2], "a.txt", Language::French);
        assert_eq!(req.req_type, Format::File);
        assert_eq!(req.file_name.as_deref(), Some("a.txt"));
    }
}

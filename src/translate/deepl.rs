//! DeepL translation API client

use anyhow::Context;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_TARGET_LANG: &str = "EN-US";
pub const DEFAULT_SOURCE_LANG: &str = "JA";
/// Hard cap on texts per request imposed by the API.
pub const MAX_TEXTS_PER_REQUEST: usize = 50;

const FREE_API_BASE: &str = "https://api-free.deepl.com/v2";
const PRO_API_BASE: &str = "https://api.deepl.com/v2";

#[derive(Debug, Error)]
pub enum DeepLError {
    #[error("DeepL API key required (use --api-key, config deepl.api_key or DEEPL_API_KEY)")]
    MissingApiKey,

    #[error("DeepL request failed ({status}): {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("DeepL returned {actual} translations for {expected} texts")]
    CountMismatch { expected: usize, actual: usize },

    #[error("DeepL request error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    #[default]
    Default,
    More,
    Less,
    PreferMore,
    PreferLess,
}

impl Formality {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::More => "more",
            Self::Less => "less",
            Self::PreferMore => "prefer_more",
            Self::PreferLess => "prefer_less",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSentences {
    Off,
    #[default]
    On,
    Nonewlines,
}

impl SplitSentences {
    pub fn as_param(self) -> &'static str {
        match self {
            Self::Off => "0",
            Self::On => "1",
            Self::Nonewlines => "nonewlines",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub source_lang: Option<String>,
    pub target_lang: String,
    pub split_sentences: SplitSentences,
    pub preserve_formatting: bool,
    pub formality: Formality,
}

impl Default for TranslateOptions {
    fn default() -> Self {
        Self {
            source_lang: None,
            target_lang: DEFAULT_TARGET_LANG.to_string(),
            split_sentences: SplitSentences::default(),
            preserve_formatting: false,
            formality: Formality::default(),
        }
    }
}

impl TranslateOptions {
    fn query_params<'a>(&'a self, auth_key: &'a str, texts: &'a [String]) -> Vec<(&'a str, &'a str)> {
        let mut params: Vec<(&str, &str)> = vec![("auth_key", auth_key)];
        for text in texts {
            params.push(("text", text.as_str()));
        }
        params.push(("target_lang", &self.target_lang));
        params.push(("split_sentences", self.split_sentences.as_param()));
        params.push((
            "preserve_formatting",
            if self.preserve_formatting { "1" } else { "0" },
        ));
        params.push(("formality", self.formality.as_param()));
        if let Some(ref source) = self.source_lang {
            params.push(("source_lang", source));
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Translation {
    pub text: String,
    pub detected_source_language: String,
}

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<Translation>,
}

/// Anything that turns a group of texts into translations, one per text, in order.
pub trait Translate {
    fn translate(
        &self,
        texts: &[String],
        options: &TranslateOptions,
    ) -> Result<Vec<Translation>, DeepLError>;
}

pub struct DeepLClient {
    api_key: String,
    base_url: String,
    client: reqwest::blocking::Client,
}

impl DeepLClient {
    pub fn new(api_key: String, base_url: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self::with_client(api_key, base_url, client))
    }

    pub fn with_client(
        api_key: String,
        base_url: Option<String>,
        client: reqwest::blocking::Client,
    ) -> Self {
        let base_url = base_url
            .unwrap_or_else(|| default_base_url(&api_key).to_string())
            .trim_end_matches('/')
            .to_string();
        Self {
            api_key,
            base_url,
            client,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}/translate", self.base_url)
    }
}

/// Free-tier keys end with `:fx` and are served from a separate host.
pub fn default_base_url(api_key: &str) -> &'static str {
    if api_key.ends_with(":fx") {
        FREE_API_BASE
    } else {
        PRO_API_BASE
    }
}

impl Translate for DeepLClient {
    fn translate(
        &self,
        texts: &[String],
        options: &TranslateOptions,
    ) -> Result<Vec<Translation>, DeepLError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint();
        tracing::debug!("GET {} with {} text(s)", url, texts.len());

        // No retries: every request is billed.
        let response = self
            .client
            .get(&url)
            .query(&options.query_params(&self.api_key, texts))
            .send()?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(DeepLError::Status { status, body });
        }

        let result: DeepLResponse = response.json()?;
        if result.translations.len() != texts.len() {
            return Err(DeepLError::CountMismatch {
                expected: texts.len(),
                actual: result.translations.len(),
            });
        }

        Ok(result.translations)
    }
}

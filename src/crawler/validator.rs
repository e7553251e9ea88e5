//! Link validator
//!
//! Checks one URL and produces a [`ValidationOutcome`]. Each attempt is a
//! small state machine:
//!
//! ```text
//! Probing ──405 / HEAD-specific error──▶ FallbackGet
//!    │                                      │
//!    └──520..=524──▶ GatewayRetry ◀──520..=524┘
//!                         │
//! any other response ─────┴──▶ Success      transport error ──▶ Failed
//! ```
//!
//! `GatewayRetry` repeats the last request once over the HTTP/1.1-only client
//! (fresh connection, no HTTP/2). A `Failed` attempt is retried after a
//! fixed backoff until the retry budget is spent.

use crate::crawler::fetcher::{Fetcher, SendError};
use crate::crawler::status::classify;
use crate::state::{LinkStatus, ValidationOutcome};
use crate::url::is_binary_path;
use reqwest::header::HeaderMap;
use reqwest::Method;
use tokio_util::sync::CancellationToken;

/// Gateway errors (Cloudflare 52x family) that warrant one HTTP/1.1 retry
pub const GATEWAY_RETRY_CODES: &[u16] = &[520, 521, 522, 523, 524];

/// Note recorded for validations aborted by cancellation
pub const CANCELLED_TAG: &str = "Cancelled";

/// HTTP method of a probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    Head,
    Get,
}

impl From<ProbeMethod> for Method {
    fn from(method: ProbeMethod) -> Self {
        match method {
            ProbeMethod::Head => Method::HEAD,
            ProbeMethod::Get => Method::GET,
        }
    }
}

/// Non-terminal states of one validation attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    /// HEAD request, redirects followed
    Probing,
    /// Full GET after the HEAD probe was refused
    FallbackGet,
    /// Repeat of `method` over HTTP/1.1 after a gateway error
    GatewayRetry { method: ProbeMethod },
}

impl ProbeState {
    /// The request this state issues: method and whether HTTP/1.1 is forced
    pub fn request(&self) -> (ProbeMethod, bool) {
        match self {
            Self::Probing => (ProbeMethod::Head, false),
            Self::FallbackGet => (ProbeMethod::Get, false),
            Self::GatewayRetry { method } => (*method, true),
        }
    }
}

/// A response observed by a probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub chain: Vec<String>,
}

/// What a single probe produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    Response(ProbeResponse),
    Failure {
        tag: String,
        /// The server was reached but refused this method
        method_specific: bool,
    },
}

/// Terminal state of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Terminal {
    Success(ProbeResponse),
    Failed(String),
}

/// Result of a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Next(ProbeState),
    Done(Terminal),
}

/// Computes the next state from the current one and the probe result
///
/// Binary links never fall back to GET so their body is never downloaded.
pub fn transition(state: ProbeState, result: ProbeResult, binary: bool) -> Transition {
    match (state, result) {
        (ProbeState::Probing, ProbeResult::Response(r)) if r.status == 405 && !binary => {
            Transition::Next(ProbeState::FallbackGet)
        }
        (
            ProbeState::Probing,
            ProbeResult::Failure {
                method_specific: true,
                ..
            },
        ) if !binary => Transition::Next(ProbeState::FallbackGet),
        (ProbeState::Probing, ProbeResult::Response(r)) if is_gateway_error(r.status) => {
            Transition::Next(ProbeState::GatewayRetry {
                method: ProbeMethod::Head,
            })
        }
        (ProbeState::FallbackGet, ProbeResult::Response(r)) if is_gateway_error(r.status) => {
            Transition::Next(ProbeState::GatewayRetry {
                method: ProbeMethod::Get,
            })
        }
        (_, ProbeResult::Response(r)) => Transition::Done(Terminal::Success(r)),
        (_, ProbeResult::Failure { tag, .. }) => Transition::Done(Terminal::Failed(tag)),
    }
}

pub fn is_gateway_error(status: u16) -> bool {
    GATEWAY_RETRY_CODES.contains(&status)
}

/// Short tag describing a transport error
///
/// One of `ConnectTimeout`, `ReadTimeout`, `RequestError:<kind>` or
/// `UnhandledError:<message>`.
pub fn error_tag(error: &SendError) -> String {
    match error {
        SendError::Http(e) if e.is_timeout() && e.is_connect() => "ConnectTimeout".to_string(),
        SendError::Http(e) if e.is_timeout() => "ReadTimeout".to_string(),
        SendError::Http(e) if e.is_connect() => "RequestError:Connect".to_string(),
        SendError::Http(e) if e.is_redirect() => "RequestError:Redirect".to_string(),
        SendError::Http(e) if e.is_body() => "RequestError:Body".to_string(),
        SendError::Http(e) if e.is_decode() => "RequestError:Decode".to_string(),
        SendError::Http(e) if e.is_builder() => "RequestError:Builder".to_string(),
        SendError::Http(e) if e.is_request() => "RequestError:Request".to_string(),
        SendError::Http(e) => format!("UnhandledError:{}", e),
        SendError::RedirectLoop { .. } => "RequestError:RedirectLoop".to_string(),
        SendError::TooManyRedirects { .. } => "RequestError:TooManyRedirects".to_string(),
        SendError::InvalidUrl { .. } => "RequestError:InvalidUrl".to_string(),
    }
}

/// Returns true if the error came from the exchange itself rather than from
/// reaching the server
fn is_method_specific(error: &SendError) -> bool {
    match error {
        SendError::Http(e) => !e.is_timeout() && !e.is_connect() && !e.is_builder(),
        _ => false,
    }
}

async fn probe(fetcher: &Fetcher, url: &str, method: ProbeMethod, http1_only: bool) -> ProbeResult {
    match fetcher
        .send(method.into(), url, HeaderMap::new(), None, http1_only)
        .await
    {
        Ok(sent) => ProbeResult::Response(ProbeResponse {
            status: sent.response.status().as_u16(),
            chain: sent.chain,
        }),
        Err(e) => ProbeResult::Failure {
            tag: error_tag(&e),
            method_specific: is_method_specific(&e),
        },
    }
}

/// Runs one attempt through the state machine until it is terminal
async fn run_attempt(
    fetcher: &Fetcher,
    url: &str,
    binary: bool,
    cancel: &CancellationToken,
) -> Terminal {
    let mut state = ProbeState::Probing;

    loop {
        let (method, http1_only) = state.request();
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Terminal::Failed(CANCELLED_TAG.to_string()),
            result = probe(fetcher, url, method, http1_only) => result,
        };

        match transition(state, result, binary) {
            Transition::Next(next) => {
                tracing::debug!("{}: {:?} -> {:?}", url, state, next);
                state = next;
            }
            Transition::Done(terminal) => return terminal,
        }
    }
}

/// Builds the outcome for a link that produced an HTTP response
fn success_outcome(url: &str, response: ProbeResponse, binary: bool) -> ValidationOutcome {
    let status = LinkStatus::Http(response.status);
    let redirect_count = response.chain.len().saturating_sub(1);
    let final_url = response
        .chain
        .last()
        .cloned()
        .unwrap_or_else(|| url.to_string());

    let mut note = classify(status).to_string();
    if binary {
        note.push_str(" (binary file)");
    }
    if redirect_count > 0 {
        note.push_str(&format!(" (Redirected {}× → {})", redirect_count, final_url));
    }

    ValidationOutcome {
        url: url.to_string(),
        status,
        note,
        final_url,
        redirect_count,
        redirect_chain: response.chain,
    }
}

/// Validates one URL
///
/// Never fails: transport errors are retried `retries` more times with a
/// fixed backoff and then recorded as an `Error` outcome carrying the last
/// error tag as its note.
pub async fn validate(fetcher: &Fetcher, url: &str, cancel: &CancellationToken) -> ValidationOutcome {
    let binary = is_binary_path(url);
    let settings = fetcher.settings();
    let retries = settings.retries;
    let mut last_tag = String::new();

    for attempt in 0..=retries {
        match run_attempt(fetcher, url, binary, cancel).await {
            Terminal::Success(response) => return success_outcome(url, response, binary),
            Terminal::Failed(tag) if tag == CANCELLED_TAG => {
                return ValidationOutcome::failed(url, tag);
            }
            Terminal::Failed(tag) => {
                tracing::warn!("Attempt {} failed for {}: {}", attempt + 1, url, tag);
                last_tag = tag;
            }
        }

        if attempt < retries {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return ValidationOutcome::failed(url, CANCELLED_TAG),
                _ = tokio::time::sleep(settings.retry_backoff) => {}
            }
        }
    }

    ValidationOutcome::failed(url, last_tag)
}

//! Resilient single-URL fetch with bounded retry.
//!
//! A [`FetchSession`] is one logical GET. It runs physical attempts against
//! the network, classifies each outcome, retries server-side failures
//! (500/503/504) a bounded number of times with a fixed delay, and hands
//! back whatever the final attempt produced. Per-attempt failures are
//! reported to the console and absorbed; nothing is raised at the session
//! boundary. Callers inspect the returned response, or its absence,
//! themselves.

use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Response, StatusCode};

use super::useragent::random_user_agent;
use crate::report::report;

/// Per-attempt network timeout.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of retries after the initial attempt.
pub const RETRY_MAX: u32 = 3;

/// Fixed delay between a retryable failure and the next attempt.
pub const RETRY_DELAY: Duration = Duration::from_millis(2500);

/// Statuses worth retrying; any other outcome ends the session.
pub const RETRY_STATUS: [StatusCode; 3] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

/// Builds the client used for fetch sessions: TLS verification on, 10 s
/// connect and read timeouts. Streaming sessions rely on these client-level
/// timeouts so a large body can take longer than 10 s overall as long as
/// data keeps arriving.
pub fn client() -> Result<Client> {
    Client::builder()
        .connect_timeout(FETCH_TIMEOUT)
        .read_timeout(FETCH_TIMEOUT)
        .build()
        .context("failed to build HTTP client")
}

/// How a failed attempt went wrong, in classification priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Connect or read timeout.
    Timeout,
    /// Redirect chain exceeded the client's limit.
    TooManyRedirects,
    /// The server certificate could not be verified.
    TlsVerification,
    /// Connection-level failure, or an HTTP error status.
    ConnectionOrHttp,
    /// Anything else the transport can produce.
    Other,
}

impl FailureKind {
    fn classify(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            FailureKind::Timeout
        } else if error.is_redirect() {
            FailureKind::TooManyRedirects
        } else if is_tls_error(error) {
            FailureKind::TlsVerification
        } else if error.is_connect() || error.is_status() {
            FailureKind::ConnectionOrHttp
        } else {
            FailureKind::Other
        }
    }
}

/// Walks the error source chain looking for a certificate problem.
fn is_tls_error(error: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        let text = cause.to_string().to_ascii_lowercase();
        if text.contains("certificate") || text.contains("tls") || text.contains("ssl") {
            return true;
        }
        source = cause.source();
    }
    false
}

/// What one physical attempt produced.
#[derive(Debug)]
pub struct AttemptOutcome {
    /// HTTP status, absent when the attempt failed below the HTTP layer.
    pub status: Option<StatusCode>,
    /// Live response handle, present whenever the server answered at all,
    /// including with a 4xx/5xx status.
    pub response: Option<Response>,
}

/// One logical fetch-with-retry for a single URL.
///
/// Constructed and driven to completion in one call; there is no suspended
/// state to observe. The retry delay sleeps the session's task outright, with
/// no cancellation hook, and attempts within a session are strictly
/// sequential.
pub struct FetchSession {
    client: Client,
    url: String,
    streaming: bool,
    attempt: u32,
    user_agent: &'static str,
}

impl FetchSession {
    /// Runs a session to completion and returns the final attempt's response.
    ///
    /// The only success exit is a literal 200: any other status, 404 but also
    /// 201 or 204, ends the session at once and is returned as-is for the
    /// caller to inspect. Statuses 500/503/504 are retried up to [`RETRY_MAX`]
    /// times with a [`RETRY_DELAY`] pause before each retry. Transport
    /// failures with no HTTP status are terminal and yield `None`.
    ///
    /// With `streaming` set, the body of the returned response is left for
    /// the caller to consume, and ownership of its connection moves to the
    /// caller. Otherwise each attempt's response is bounded by the full
    /// [`FETCH_TIMEOUT`] and intermediate responses are dropped per attempt
    /// so their connections are released.
    pub async fn run(client: &Client, url: &str, streaming: bool) -> Option<Response> {
        let mut session = FetchSession {
            client: client.clone(),
            url: url.to_string(),
            streaming,
            attempt: 1,
            user_agent: random_user_agent(),
        };
        session.drive().await
    }

    async fn drive(&mut self) -> Option<Response> {
        loop {
            let outcome = self.attempt_once().await;
            let retryable = matches!(outcome.status, Some(s) if RETRY_STATUS.contains(&s));
            if !retryable {
                // Covers the 200 success exit and every non-retry end:
                // other 2xx/3xx, 4xx, and status-less transport failures.
                return outcome.response;
            }
            if self.attempt > RETRY_MAX {
                return outcome.response;
            }
            self.attempt += 1;
            debug!(
                "retrying {} (attempt {} of {})",
                self.url,
                self.attempt,
                RETRY_MAX + 1
            );
            tokio::time::sleep(RETRY_DELAY).await;
        }
    }

    /// One physical attempt. Failures are reported and folded into the
    /// outcome; they never escape.
    async fn attempt_once(&self) -> AttemptOutcome {
        let mut request = self
            .client
            .get(&self.url)
            .header(USER_AGENT, self.user_agent);
        if !self.streaming {
            request = request.timeout(FETCH_TIMEOUT);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_client_error() || status.is_server_error() {
                    if status == StatusCode::FORBIDDEN {
                        report("Forbidden: the request was not allowed");
                    } else {
                        report("Error: the requested resource could not be reached");
                    }
                }
                AttemptOutcome {
                    status: Some(status),
                    response: Some(response),
                }
            }
            Err(error) => {
                self.report_failure(&error);
                // A pure connection error carries no response to read a
                // status from; the outcome simply has none.
                AttemptOutcome {
                    status: error.status(),
                    response: None,
                }
            }
        }
    }

    fn report_failure(&self, error: &reqwest::Error) {
        match FailureKind::classify(error) {
            FailureKind::Timeout => report(&format!(
                "Timeout: the request timed out while waiting for the server to respond\n{error}"
            )),
            FailureKind::ConnectionOrHttp => match error.status() {
                Some(StatusCode::FORBIDDEN) => report("Forbidden: the request was not allowed"),
                _ => report(&format!(
                    "Error: the requested resource could not be reached\n{error}"
                )),
            },
            FailureKind::TooManyRedirects => report(&format!(
                "Error: the request exceeded the number of maximum redirections\n{error}"
            )),
            FailureKind::TlsVerification => report(&format!(
                "Error: the SSL certificate could not be verified\n{error}"
            )),
            FailureKind::Other => report(&format!(
                "Encountered an ambiguous error, you're on your own now\n{error}"
            )),
        }
    }
}

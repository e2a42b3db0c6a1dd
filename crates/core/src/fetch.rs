//! Content fetching from URLs, files, and stdin.
//!
//! [`execute`] carries out a [`FetchPlan`]: plain HTTP through `reqwest`,
//! local file and stdin reads, and a hand-off to the browser renderer when the
//! plan asks for JavaScript rendering.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE};
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use url::Url;

use crate::plan::{FetchMechanism, FetchPlan};
use crate::{PluckerError, Result};

/// Raw text produced by a fetch, with the declared Content-Type if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBody {
    pub text: String,
    pub content_type: Option<String>,
}

impl FetchedBody {
    fn untyped(text: String) -> Self {
        Self { text, content_type: None }
    }
}

/// Carries out a fetch plan.
///
/// Failures are returned as-is; nothing is retried.
pub async fn execute(plan: &FetchPlan) -> Result<FetchedBody> {
    info!(mechanism = ?plan.mechanism, input = %plan.target, "fetching");

    match plan.mechanism {
        FetchMechanism::JsRender => render_url(plan).await.map(FetchedBody::untyped),
        FetchMechanism::StaticHttp => fetch_url(plan).await,
        FetchMechanism::LocalFileRaw => fetch_file(&plan.target).await.map(FetchedBody::untyped),
        FetchMechanism::LocalFileRender => {
            let html = fetch_file(&plan.target).await?;
            render_if_requested(html, plan).await
        }
        FetchMechanism::StdinRaw => {
            let html = fetch_stdin().await?;
            render_if_requested(html, plan).await
        }
    }
}

async fn render_if_requested(html: String, plan: &FetchPlan) -> Result<FetchedBody> {
    if plan.render_js {
        render_html(&html, plan).await.map(FetchedBody::untyped)
    } else {
        Ok(FetchedBody::untyped(html))
    }
}

/// Fetches a URL with a plain HTTP GET.
///
/// Follows redirects, applies the plan's timeout, User-Agent and proxy, and
/// treats non-success status codes as errors.
pub async fn fetch_url(plan: &FetchPlan) -> Result<FetchedBody> {
    let parsed_url = Url::parse(&plan.target).map_err(|e| PluckerError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(PluckerError::InvalidUrl(
            "URL must include a scheme (http:// or https://)".to_string(),
        ));
    }

    let mut builder = Client::builder()
        .timeout(Duration::from_millis(plan.timeout_ms))
        .user_agent(plan.effective_user_agent());

    if let Some(proxy_url) = &plan.proxy_url {
        builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    let client = builder.build().map_err(PluckerError::HttpError)?;

    let response = client
        .get(parsed_url)
        .header(
            ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,text/markdown;q=0.9,*/*;q=0.8",
        )
        .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
        .send()
        .await
        .map_err(|e| timeout_or_http(e, plan.timeout_ms))?
        .error_for_status()?;

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(String::from);

    let text = response.text().await.map_err(|e| timeout_or_http(e, plan.timeout_ms))?;
    debug!(bytes = text.len(), content_type = ?content_type, "received response");

    Ok(FetchedBody { text, content_type })
}

fn timeout_or_http(e: reqwest::Error, timeout_ms: u64) -> PluckerError {
    if e.is_timeout() { PluckerError::Timeout { timeout_ms } } else { PluckerError::HttpError(e) }
}

/// Reads content from a local file.
pub async fn fetch_file(path: &str) -> Result<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(PluckerError::FileNotFound(PathBuf::from(path))),
        Err(e) => Err(PluckerError::from(e)),
    }
}

/// Reads all of standard input until EOF.
pub async fn fetch_stdin() -> Result<String> {
    let mut buffer = String::new();
    tokio::io::stdin()
        .read_to_string(&mut buffer)
        .await
        .map_err(PluckerError::from)?;

    Ok(buffer)
}

#[cfg(feature = "render")]
async fn render_url(plan: &FetchPlan) -> Result<String> {
    crate::render::render_url(plan).await
}

#[cfg(feature = "render")]
async fn render_html(html: &str, plan: &FetchPlan) -> Result<String> {
    crate::render::render_html(html, plan).await
}

#[cfg(not(feature = "render"))]
async fn render_url(_plan: &FetchPlan) -> Result<String> {
    Err(PluckerError::RenderUnavailable)
}

#[cfg(not(feature = "render"))]
async fn render_html(_html: &str, _plan: &FetchPlan) -> Result<String> {
    Err(PluckerError::RenderUnavailable)
}

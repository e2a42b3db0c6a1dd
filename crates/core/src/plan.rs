//! Fetch strategy resolution.
//!
//! [`resolve`] turns a classified input and the user's flags into a
//! declarative [`FetchPlan`]. Nothing here performs I/O; the plan is executed
//! by [`crate::fetch::execute`].
//!
//! # Example
//!
//! ```rust
//! use plucker_core::{FetchFlags, FetchMechanism, classify, resolve};
//!
//! let plan = resolve(&classify("https://example.com"), &FetchFlags::default());
//! assert_eq!(plan.mechanism, FetchMechanism::JsRender);
//! assert_eq!(plan.timeout_ms, 30_000);
//!
//! let flags = FetchFlags { no_js: true, ..Default::default() };
//! let plan = resolve(&classify("https://example.com"), &flags);
//! assert_eq!(plan.mechanism, FetchMechanism::StaticHttp);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::detect::{is_markdown_path, is_markdown_url};
use crate::input::{InputKind, InputSpec};

/// Default page load timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Browser-like User-Agent used when none is supplied.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// The external mechanism a plan asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMechanism {
    /// Load the URL in a headless browser and serialize the rendered DOM.
    JsRender,
    /// Plain HTTP GET.
    StaticHttp,
    /// Read a local markup file, optionally rendering it in the browser.
    LocalFileRender,
    /// Read a local Markdown file and pass it through.
    LocalFileRaw,
    /// Read standard input.
    StdinRaw,
}

/// When navigation is considered finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Commit,
    DomContentLoaded,
    Load,
    #[default]
    NetworkIdle,
}

impl FromStr for WaitUntil {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "commit" => Ok(Self::Commit),
            "domcontentloaded" => Ok(Self::DomContentLoaded),
            "load" => Ok(Self::Load),
            "networkidle" => Ok(Self::NetworkIdle),
            _ => Err(format!(
                "Invalid wait condition: {}. Valid options: commit, domcontentloaded, load, networkidle",
                s
            )),
        }
    }
}

impl fmt::Display for WaitUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WaitUntil::Commit => "commit",
            WaitUntil::DomContentLoaded => "domcontentloaded",
            WaitUntil::Load => "load",
            WaitUntil::NetworkIdle => "networkidle",
        };
        f.write_str(name)
    }
}

/// User-supplied flags that feed the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFlags {
    /// Skip the browser and fetch/read markup as-is.
    pub no_js: bool,
    /// Page load timeout in milliseconds.
    pub timeout_ms: u64,
    /// Navigation completion condition.
    pub wait_until: WaitUntil,
    /// CSS selector that must appear before the page is captured.
    pub wait_for_selector: Option<String>,
    /// Custom User-Agent.
    pub user_agent: Option<String>,
    /// Proxy server URL.
    pub proxy_url: Option<String>,
    /// Run the browser without a window.
    pub headless: bool,
}

impl Default for FetchFlags {
    fn default() -> Self {
        Self {
            no_js: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            wait_until: WaitUntil::default(),
            wait_for_selector: None,
            user_agent: None,
            proxy_url: None,
            headless: true,
        }
    }
}

/// A declarative description of how to retrieve content for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchPlan {
    /// Normalized URL, absolute path, or `-` for stdin.
    pub target: String,
    pub mechanism: FetchMechanism,
    pub timeout_ms: u64,
    pub wait_until: WaitUntil,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    pub headless: bool,
    /// Whether the fetched markup goes through the browser before extraction.
    pub render_js: bool,
}

impl FetchPlan {
    /// The User-Agent to send: the user's, or [`DEFAULT_USER_AGENT`].
    pub fn effective_user_agent(&self) -> &str {
        self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }
}

/// Resolves the fetch plan for a classified input.
///
/// | kind | condition | mechanism |
/// |---|---|---|
/// | Url | Markdown extension on the path | StaticHttp |
/// | Url | JavaScript enabled | JsRender |
/// | Url | `no_js` | StaticHttp |
/// | FilePath | Markdown extension | LocalFileRaw |
/// | FilePath | anything else | LocalFileRender |
/// | Stdin | any | StdinRaw |
pub fn resolve(spec: &InputSpec, flags: &FetchFlags) -> FetchPlan {
    let (mechanism, render_js) = match spec.kind {
        InputKind::Url if spec.url().is_some_and(|url| is_markdown_url(&url)) => (FetchMechanism::StaticHttp, false),
        InputKind::Url if flags.no_js => (FetchMechanism::StaticHttp, false),
        InputKind::Url => (FetchMechanism::JsRender, true),
        InputKind::FilePath if is_markdown_path(&spec.normalized) => (FetchMechanism::LocalFileRaw, false),
        InputKind::FilePath => (FetchMechanism::LocalFileRender, !flags.no_js),
        InputKind::Stdin => (FetchMechanism::StdinRaw, !flags.no_js),
    };

    debug!(input = %spec.normalized, ?mechanism, render_js, "resolved fetch plan");

    FetchPlan {
        target: spec.normalized.clone(),
        mechanism,
        timeout_ms: flags.timeout_ms,
        wait_until: flags.wait_until,
        wait_for_selector: flags.wait_for_selector.clone(),
        user_agent: flags.user_agent.clone(),
        proxy_url: flags.proxy_url.clone(),
        headless: flags.headless,
        render_js,
    }
}

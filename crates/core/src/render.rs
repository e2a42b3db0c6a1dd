//! Headless browser rendering.
//!
//! Drives Chromium through `chromiumoxide` to load a URL, or to load markup
//! read from a file or stdin, and returns the DOM serialized after scripts have
//! run. Every render is bounded by the plan's timeout.

use std::future::Future;
use std::time::{Duration, Instant};

use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::plan::{FetchPlan, WaitUntil};
use crate::{PluckerError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long the resource count must stay unchanged to count as network idle.
const NETWORK_IDLE_WINDOW: Duration = Duration::from_millis(500);

/// Cap on the best-effort idle wait that follows the faster load conditions.
const FOLLOW_UP_IDLE_LIMIT: Duration = Duration::from_secs(5);

const RESOURCE_COUNT_SCRIPT: &str = "performance.getEntriesByType('resource').length";

const HIDE_WEBDRIVER_SCRIPT: &str = "Object.defineProperty(navigator, 'webdriver', { get: () => undefined })";

/// Loads `plan.target` in the browser and returns the rendered HTML.
pub async fn render_url(plan: &FetchPlan) -> Result<String> {
    let session = Session::launch(plan).await?;

    let rendered = bounded(plan, async {
        let page = session.page(plan).await?;
        page.goto(plan.target.as_str()).await.map_err(render_error)?;
        settle(&page, plan).await?;
        page.content().await.map_err(render_error)
    })
    .await;

    session.close().await;
    rendered
}

/// Loads `html` into a blank page, lets its scripts run, and returns the
/// rendered HTML.
pub async fn render_html(html: &str, plan: &FetchPlan) -> Result<String> {
    let session = Session::launch(plan).await?;

    let rendered = bounded(plan, async {
        let page = session.page(plan).await?;
        page.set_content(html).await.map_err(render_error)?;
        settle(&page, plan).await?;
        page.content().await.map_err(render_error)
    })
    .await;

    session.close().await;
    rendered
}

struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Session {
    async fn launch(plan: &FetchPlan) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .request_timeout(Duration::from_millis(plan.timeout_ms))
            .window_size(1920, 1080)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--lang=en-US");

        if !plan.headless {
            builder = builder.with_head();
        }
        if let Some(proxy_url) = &plan.proxy_url {
            builder = builder.arg(format!("--proxy-server={}", proxy_url));
        }

        let config = builder.build().map_err(PluckerError::Render)?;
        let (browser, mut events) = Browser::launch(config).await.map_err(render_error)?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        info!(headless = plan.headless, "launched browser");
        Ok(Self { browser, handler })
    }

    async fn page(&self, plan: &FetchPlan) -> Result<Page> {
        let page = self.browser.new_page("about:blank").await.map_err(render_error)?;
        page.evaluate_on_new_document(HIDE_WEBDRIVER_SCRIPT)
            .await
            .map_err(render_error)?;
        page.set_user_agent(plan.effective_user_agent())
            .await
            .map_err(render_error)?;
        Ok(page)
    }

    async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!(error = %e, "failed to close browser");
        }
        if let Err(e) = self.browser.wait().await {
            debug!(error = %e, "browser process did not exit cleanly");
        }
        self.handler.abort();
    }
}

async fn bounded<T>(plan: &FetchPlan, work: impl Future<Output = Result<T>>) -> Result<T> {
    timeout(Duration::from_millis(plan.timeout_ms), work)
        .await
        .map_err(|_| PluckerError::Timeout { timeout_ms: plan.timeout_ms })?
}

/// Waits for the plan's navigation condition, then for its wait selector.
async fn settle(page: &Page, plan: &FetchPlan) -> Result<()> {
    match plan.wait_until {
        WaitUntil::Commit => {}
        WaitUntil::DomContentLoaded | WaitUntil::Load => {
            page.wait_for_navigation().await.map_err(render_error)?;
        }
        WaitUntil::NetworkIdle => {
            page.wait_for_navigation().await.map_err(render_error)?;
            wait_for_network_idle(page).await?;
        }
    }

    if let Some(limit) = follow_up_idle(plan) {
        match timeout(limit, wait_for_network_idle(page)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(error = %e, "follow-up idle wait failed"),
            Err(_) => debug!(limit_ms = limit.as_millis() as u64, "network still busy, capturing anyway"),
        }
    }

    if let Some(selector) = &plan.wait_for_selector {
        wait_for_selector(page, selector).await;
    }

    Ok(())
}

/// Window for the best-effort idle wait after a faster load condition. Never
/// longer than half the plan's timeout, so the capture itself stays in budget.
fn follow_up_idle(plan: &FetchPlan) -> Option<Duration> {
    match plan.wait_until {
        WaitUntil::NetworkIdle => None,
        WaitUntil::Commit | WaitUntil::DomContentLoaded | WaitUntil::Load => {
            Some(FOLLOW_UP_IDLE_LIMIT.min(Duration::from_millis(plan.timeout_ms / 2)))
        }
    }
}

async fn wait_for_network_idle(page: &Page) -> Result<()> {
    let mut last = resource_count(page).await?;
    let mut stable_since = Instant::now();

    loop {
        sleep(POLL_INTERVAL).await;
        let count = resource_count(page).await?;

        if count != last {
            last = count;
            stable_since = Instant::now();
        } else if stable_since.elapsed() >= NETWORK_IDLE_WINDOW {
            debug!(resources = count, "network idle");
            return Ok(());
        }
    }
}

async fn resource_count(page: &Page) -> Result<u64> {
    page.evaluate(RESOURCE_COUNT_SCRIPT)
        .await
        .map_err(render_error)?
        .into_value()
        .map_err(render_error)
}

/// Polls until the selector matches. The caller's timeout bounds the wait.
async fn wait_for_selector(page: &Page, selector: &str) {
    while page.find_element(selector).await.is_err() {
        sleep(POLL_INTERVAL).await;
    }
    debug!(selector, "wait selector appeared");
}

fn render_error(e: impl std::fmt::Display) -> PluckerError {
    PluckerError::Render(e.to_string())
}

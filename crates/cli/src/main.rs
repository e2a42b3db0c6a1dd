use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use plucker_core::{
    ConvertConfig, Converter, FetchFlags, FetchMechanism, FetchedContent, HeadingStyle, InputSpec, WaitUntil,
    classify_opt, execute, resolve,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod echo;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert a web page, HTML file, or stdin to clean Markdown
#[derive(Parser, Debug)]
#[command(name = "plucker")]
#[command(author = "Plucker Contributors")]
#[command(version)]
#[command(about = "Convert a web page, HTML file, or stdin to clean Markdown", long_about = None)]
struct Args {
    /// URL, local file, or "-" for stdin (default: stdin)
    #[arg(value_name = "INPUT")]
    input: Option<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// CSS selector for the main content
    #[arg(short, long, value_name = "CSS")]
    selector: Option<String>,

    /// Wait for this CSS selector to appear before capturing the page
    #[arg(long, value_name = "SELECTOR")]
    wait_for: Option<String>,

    /// Page load timeout in milliseconds
    #[arg(long, default_value_t = plucker_core::DEFAULT_TIMEOUT_MS, value_name = "MS")]
    timeout: u64,

    /// Skip the browser and use the raw HTML
    #[arg(long)]
    no_js: bool,

    /// Custom User-Agent
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Proxy server URL
    #[arg(long, value_name = "URL")]
    proxy_url: Option<String>,

    /// Run the browser without a window (default)
    #[arg(long, overrides_with = "no_headless")]
    headless: bool,

    /// Show the browser window
    #[arg(long, overrides_with = "headless")]
    no_headless: bool,

    /// When navigation counts as finished (commit, domcontentloaded, load, networkidle)
    #[arg(long, default_value = "networkidle", value_name = "EVENT")]
    wait_until: WaitUntil,

    /// Truncate link URLs longer than this many characters (0 disables)
    #[arg(long, default_value_t = plucker_core::DEFAULT_LINK_MAX_LENGTH, value_name = "N")]
    link_max_length: usize,

    /// Heading syntax in the Markdown output (atx, setext)
    #[arg(long, default_value = "atx", value_name = "STYLE")]
    heading_style: HeadingStyle,

    /// Output the fetched content unchanged
    #[arg(long)]
    raw: bool,

    /// Print the fetch plan as JSON and exit
    #[arg(long)]
    print_plan: bool,

    /// Accepted for compatibility; robots.txt is never consulted
    #[arg(long)]
    ignore_robots_txt: bool,

    /// Show progress and enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn fetch_flags(&self) -> FetchFlags {
        FetchFlags {
            no_js: self.no_js,
            timeout_ms: self.timeout,
            wait_until: self.wait_until,
            wait_for_selector: self.wait_for.clone(),
            user_agent: self.user_agent.clone(),
            proxy_url: self.proxy_url.clone(),
            headless: self.headless || !self.no_headless,
        }
    }

    fn convert_config(&self, spec: &InputSpec) -> ConvertConfig {
        let mut config = ConvertConfig::builder().link_max_length(self.link_max_length).build();
        config.selector = self.selector.clone();
        config.serialization.heading_style = self.heading_style;
        config.serialization.base_url = spec.url();
        config
    }
}

fn init_tracing(verbose: bool) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) if verbose => EnvFilter::new("plucker_core=debug,plucker=debug"),
        Err(_) => EnvFilter::new("warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn describe(mechanism: FetchMechanism) -> &'static str {
    match mechanism {
        FetchMechanism::JsRender => "Rendering",
        FetchMechanism::StaticHttp => "Fetching",
        FetchMechanism::LocalFileRender | FetchMechanism::LocalFileRaw => "Reading file",
        FetchMechanism::StdinRaw => "Reading stdin",
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.ignore_robots_txt {
        debug!("--ignore-robots-txt has no effect");
    }

    let spec = classify_opt(args.input.as_deref());
    let plan = resolve(&spec, &args.fetch_flags());

    if args.print_plan {
        println!("{}", serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?);
        return Ok(());
    }

    if args.verbose {
        echo::print_banner();
        echo::print_step(
            1,
            3,
            &format!("{} {}", describe(plan.mechanism), spec.normalized.bright_white().underline()),
        );
    }

    let body = execute(&plan)
        .await
        .with_context(|| format!("Failed to fetch {}", spec.normalized))?;

    if args.verbose {
        eprintln!("  {} {}", "Size:".dimmed(), echo::format_size(body.text.len()).bright_white());
        if let Some(content_type) = &body.content_type {
            eprintln!("  {} {}", "Content-Type:".dimmed(), content_type.bright_white());
        }
        eprintln!();
    }

    let output = if args.raw {
        if args.verbose {
            echo::print_step(2, 3, "Forwarding raw content");
        }
        body.text
    } else {
        let content = FetchedContent::detect(&spec, body.text, body.content_type.as_deref());

        if args.verbose {
            let message = if content.is_markdown { "Passing Markdown through" } else { "Extracting main content" };
            echo::print_step(2, 3, message);
        }

        Converter::with_config(args.convert_config(&spec))
            .convert(&content)
            .context("Failed to convert content")?
            .text
    };

    if args.verbose {
        echo::print_step(3, 3, "Writing output");
        eprintln!();
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            echo::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

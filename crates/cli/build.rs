use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let completions_dir = out_dir.join("completions");

    fs::create_dir_all(&completions_dir).unwrap();

    let mut cmd = clap::Command::new("plucker")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Plucker Contributors")
        .about("Convert a web page, HTML file, or stdin to clean Markdown")
        .arg(clap::arg!([INPUT] "URL, local file, or '-' for stdin (default: stdin)"))
        .arg(
            clap::arg!(-o --output <FILE> "Output file (default: stdout)")
                .value_parser(clap::value_parser!(std::path::PathBuf)),
        )
        .arg(clap::arg!(-s --selector <CSS> "CSS selector for the main content"))
        .arg(clap::arg!(--"wait-for" <SELECTOR> "Wait for this CSS selector to appear before capturing the page"))
        .arg(clap::arg!(--timeout <MS> "Page load timeout in milliseconds").default_value("30000"))
        .arg(clap::arg!(--"no-js" "Skip the browser and use the raw HTML"))
        .arg(clap::arg!(--"user-agent" <UA> "Custom User-Agent"))
        .arg(clap::arg!(--"proxy-url" <URL> "Proxy server URL"))
        .arg(clap::arg!(--headless "Run the browser without a window (default)"))
        .arg(clap::arg!(--"no-headless" "Show the browser window"))
        .arg(
            clap::arg!(--"wait-until" <EVENT> "When navigation counts as finished")
                .default_value("networkidle")
                .value_parser(["commit", "domcontentloaded", "load", "networkidle"]),
        )
        .arg(
            clap::arg!(--"link-max-length" <N> "Truncate link URLs longer than this many characters (0 disables)")
                .default_value("200"),
        )
        .arg(
            clap::arg!(--"heading-style" <STYLE> "Heading syntax in the Markdown output")
                .default_value("atx")
                .value_parser(["atx", "setext"]),
        )
        .arg(clap::arg!(--raw "Output the fetched content unchanged"))
        .arg(clap::arg!(--"print-plan" "Print the fetch plan as JSON and exit"))
        .arg(clap::arg!(--"ignore-robots-txt" "Accepted for compatibility; robots.txt is never consulted"))
        .arg(clap::arg!(-v --verbose "Show progress and enable debug logging"));

    clap_complete::generate_to(clap_complete::shells::Bash, &mut cmd, "plucker", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Zsh, &mut cmd, "plucker", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::Fish, &mut cmd, "plucker", &completions_dir).unwrap();
    clap_complete::generate_to(clap_complete::shells::PowerShell, &mut cmd, "plucker", &completions_dir).unwrap();

    println!(
        "cargo:warning=Shell completions generated in: {}",
        completions_dir.display()
    );
}

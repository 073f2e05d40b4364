//! vid2gif - video upload to animated GIF conversion service
//!
//! CLI entry point

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vid2gif::{convert, exit_codes, Cli, Commands, Config, ServeArgs, WebServer};

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command.unwrap_or_default() {
        Commands::Serve(args) => run_serve(&args),
        Commands::Info => run_info(),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            exit_codes::GENERAL_ERROR
        }
    });
}

// ============ Serve Command ============

fn run_serve(args: &ServeArgs) -> anyhow::Result<()> {
    // An explicitly named config file must load; the default locations
    // are best-effort.
    let file_config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("ignoring unreadable config file: {e:#}");
            Config::default()
        }),
    };

    let config = file_config.merge_with_cli(args);

    if which::which(&config.tool).is_err() {
        tracing::warn!(
            tool = %config.tool.display(),
            "conversion tool not found; uploads will fail until it is installed"
        );
    }

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async {
        let server = WebServer::with_config(config)?;
        server.run().await
    })
}

// ============ Info Command ============

fn run_info() -> anyhow::Result<()> {
    println!("vid2gif v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("Conversion tool:");
    check_tool_with_version(convert::DEFAULT_TOOL, "ffmpeg", &["-version"]);

    println!();
    println!("Config file locations:");
    for path in Config::search_paths() {
        let marker = if path.exists() { " (present)" } else { "" };
        println!("  {}{}", path.display(), marker);
    }

    Ok(())
}

fn check_tool_with_version(cmd: &str, name: &str, version_args: &[&str]) {
    match which::which(cmd) {
        Ok(path) => {
            if let Ok(output) = std::process::Command::new(&path).args(version_args).output() {
                let version_str = String::from_utf8_lossy(&output.stdout);
                let first_line = version_str.lines().next().unwrap_or("");
                if !first_line.is_empty() && first_line.len() < 80 {
                    println!("  {}: {} ({})", name, first_line.trim(), path.display());
                    return;
                }
            }
            println!("  {}: {} (found)", name, path.display());
        }
        Err(_) => println!("  {}: Not found", name),
    }
}

use clap::{Parser, ValueEnum};
use fuzz_monkey::{init_logging, LoggingConfig, RunSettings};
use monkey_common::{load_config, DEFAULT_CONFIG_PATH};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

/// fuzz-monkey - throws concurrent and malformed HTTP traffic at endpoints
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON config file
    #[arg(long, short, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<String>,

    /// Give up on a single request after this many seconds
    #[arg(long)]
    deadline_secs: Option<u64>,

    /// Seed for random HTTP method selection
    #[arg(long)]
    seed: Option<u64>,

    /// How to print the results
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fuzz-monkey: {:#}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let logging = LoggingConfig {
        level: args.log_level.clone(),
        json_format: args.json_logs,
        log_file: args.log_file.clone(),
        ..Default::default()
    };
    init_logging(&logging)?;

    let config = load_config(Some(&args.config)).map_err(|e| {
        let what = if e.is_invalid_config() {
            "invalid config in"
        } else {
            "could not read config"
        };
        anyhow::Error::new(e).context(format!("{} {}", what, args.config.display()))
    })?;

    let settings = RunSettings {
        deadline: args.deadline_secs.map(Duration::from_secs),
        seed: args.seed,
    };

    let summary = fuzz_monkey::run(&config, &settings).await?;

    match args.format {
        OutputFormat::Text => print!("{}", summary.render_text()),
        OutputFormat::Json => println!("{}", summary.render_json()?),
    }

    Ok(ExitCode::from(summary.exit_code()))
}

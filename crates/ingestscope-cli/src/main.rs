use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use ingestscope_core::{CanonicalRecord, ErrorClass, ExitCode, IngestConfig, IngestError};
use ingestscope_parsers::{DialectChoice, Engine};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "ingestscope",
    about = "Normalize publisher metadata XML into canonical records",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON envelope format (for scripts).
    /// Also enabled by setting INGESTSCOPE_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a document into canonical records.
    Parse {
        file: PathBuf,
        /// auto, arxiv or wiley.
        #[arg(long, default_value = "auto")]
        dialect: DialectChoice,
        /// Treat the file as a multi-record document and split it first.
        #[arg(long)]
        split: bool,
        /// Keep the shared header/footer around every fragment.
        #[arg(long)]
        keep_header: bool,
    },

    /// Split a multi-record document and print the fragments.
    Split {
        file: PathBuf,
        #[arg(long)]
        keep_header: bool,
    },

    /// Configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Print the config file path.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let json_output = cli.json || std::env::var("INGESTSCOPE_JSON").as_deref() == Ok("1");
    let config = IngestConfig::load().context("failed to load configuration")?;
    config.validate()?;
    let out = Output {
        json: json_output,
        pretty: config.output.pretty,
        start,
    };

    match cli.command {
        Commands::Parse {
            file,
            dialect,
            split,
            keep_header,
        } => {
            let text = read_input(&file, &out);
            let keep_header = keep_header || config.chunking.keep_header;
            let engine = Engine::new(config).with_keep_header(keep_header);

            if split {
                parse_batch(&engine, &text, dialect, &out)?;
            } else {
                match engine.parse(&text, dialect) {
                    Ok(record) => out.records(&[record], &[])?,
                    Err(err) => out.fail_with(&err),
                }
            }
        }

        Commands::Split { file, keep_header } => {
            let text = read_input(&file, &out);
            let keep_header = keep_header || config.chunking.keep_header;
            let engine = Engine::new(config).with_keep_header(keep_header);
            let fragments = engine.split(&text);
            debug!(count = fragments.len(), "split finished");

            if out.json {
                out.print(&serde_json::json!({
                    "status": "ok",
                    "data": { "fragments": fragments, "total": fragments.len() },
                    "meta": out.meta(),
                }))?;
            } else if fragments.is_empty() {
                println!("No records found.");
            } else {
                for fragment in &fragments {
                    println!("{fragment}\n");
                }
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if out.json {
                    out.print(&serde_json::json!({
                        "status": "ok",
                        "data": config,
                        "meta": out.meta(),
                    }))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                let path = IngestConfig::config_path();
                if out.json {
                    out.print(&serde_json::json!({
                        "status": "ok",
                        "data": { "path": path, "exists": path.exists() },
                        "meta": out.meta(),
                    }))?;
                } else {
                    println!("{}", path.display());
                }
            }
        },
    }

    Ok(())
}

/// Every fragment is attempted; failures are reported and the rest go on.
fn parse_batch(engine: &Engine, text: &str, dialect: DialectChoice, out: &Output) -> Result<()> {
    let results = engine.parse_batch(text, dialect);
    if results.is_empty() {
        warn!(
            tag = engine.config().chunking.record_tag.as_str(),
            "no record boundaries found"
        );
    }

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                if !err.is_record_level() {
                    out.fail_with(&err);
                }
                failures.push((index, err));
            }
        }
    }

    out.records(&records, &failures)?;

    match (records.is_empty(), failures.first()) {
        (_, None) => Ok(()),
        (true, Some((_, err))) => std::process::exit(ExitCode::from(err.class()) as i32),
        (false, Some(_)) => std::process::exit(ExitCode::PartialFailure as i32),
    }
}

fn read_input(path: &Path, out: &Output) -> String {
    match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => out.fail(
            "not_found",
            &format!("File {} not found", path.display()),
            ExitCode::NotFound,
        ),
        Err(err) => out.fail_with(&IngestError::Io(err)),
    }
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_env("INGESTSCOPE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn class_name(class: ErrorClass) -> &'static str {
    match class {
        ErrorClass::Load => "load",
        ErrorClass::Schema => "schema",
        ErrorClass::RequiredField => "missing_field",
        ErrorClass::Environment => "environment",
    }
}

// ─── Output ──────────────────────────────────────────────────────────────────

struct Output {
    json: bool,
    pretty: bool,
    start: Instant,
}

impl Output {
    fn meta(&self) -> serde_json::Value {
        serde_json::json!({ "duration_ms": self.start.elapsed().as_millis() })
    }

    fn print(&self, val: &serde_json::Value) -> Result<()> {
        self.write_json(&mut std::io::stdout().lock(), val)
    }

    fn write_json(&self, out: &mut impl Write, val: &serde_json::Value) -> Result<()> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(val)?
        } else {
            serde_json::to_string(val)?
        };
        writeln!(out, "{rendered}")?;
        Ok(())
    }

    fn records(&self, records: &[CanonicalRecord], failures: &[(usize, IngestError)]) -> Result<()> {
        let errors: Vec<serde_json::Value> = failures
            .iter()
            .map(|(index, err)| {
                serde_json::json!({
                    "fragment": index,
                    "error": class_name(err.class()),
                    "message": err.to_string(),
                })
            })
            .collect();

        if self.json {
            let status = if failures.is_empty() { "ok" } else { "partial" };
            return self.print(&serde_json::json!({
                "status": status,
                "data": { "records": records, "total": records.len(), "errors": errors },
                "meta": self.meta(),
            }));
        }

        for record in records {
            let rendered = if self.pretty {
                serde_json::to_string_pretty(record)?
            } else {
                serde_json::to_string(record)?
            };
            println!("{rendered}");
        }
        for (index, err) in failures {
            eprintln!("fragment {index}: {err}");
        }
        Ok(())
    }

    fn fail_with(&self, err: &IngestError) -> ! {
        let class = err.class();
        self.fail(class_name(class), &err.to_string(), ExitCode::from(class))
    }

    fn fail(&self, kind: &str, message: &str, code: ExitCode) -> ! {
        let reported = self.json && self.report_error(&mut std::io::stdout().lock(), kind, message);
        if !reported {
            eprintln!("Error: {message}");
        }
        std::process::exit(code as i32);
    }

    /// Error envelope for JSON mode; `false` when it could not be written.
    fn report_error(&self, out: &mut impl Write, kind: &str, message: &str) -> bool {
        let envelope = serde_json::json!({
            "status": "error",
            "error": kind,
            "message": message,
            "meta": self.meta(),
        });
        self.write_json(out, &envelope).is_ok()
    }
}

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use replytext_core::config;
use replytext_core::json_extract::extract_first_json_value;
use replytext_core::{evaluate_url, EvaluateRequest, Extractor, ReplytextConfig};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "replytext", about = "Normalize LLM provider responses to plain text")]
struct Cli {
    /// Precedence config (defaults to ./replytext.toml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the plain text of one response.
    Text(TextArgs),
    /// Print the evaluate request body for a `{provider: response}` object.
    Payload(PayloadArgs),
    /// POST the evaluate request body and print the reply.
    Submit(SubmitArgs),
}

#[derive(Args, Debug)]
struct TextArgs {
    /// Input file (stdin when omitted).
    file: Option<PathBuf>,
    /// Treat the input as a string even if it is valid JSON.
    #[arg(long, conflicts_with = "lenient")]
    raw: bool,
    /// Recover JSON wrapped in prose or code fences.
    #[arg(long)]
    lenient: bool,
    /// Print source and fallback details as JSON.
    #[arg(long)]
    explain: bool,
}

#[derive(Args, Debug)]
struct PayloadArgs {
    #[arg(long)]
    question: String,
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    #[arg(long)]
    question: String,
    /// Server root, e.g. `http://localhost:5000`.
    #[arg(long)]
    base_url: String,
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Json,
    Raw,
    Lenient,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let extractor = Extractor::from_config(&resolve_config(cli.config.as_deref())?);

    match cli.command {
        Command::Text(args) => {
            let mode = if args.raw {
                InputMode::Raw
            } else if args.lenient {
                InputMode::Lenient
            } else {
                InputMode::Json
            };
            let input = read_input(args.file.as_deref())?;
            let value = parse_input(&input, mode);
            let out = extractor.extract(Some(&value));
            if args.explain {
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", out.text);
            }
        }
        Command::Payload(args) => {
            let req = build_request(&args.question, args.file.as_deref(), &extractor)?;
            println!("{}", serde_json::to_string_pretty(&req)?);
        }
        Command::Submit(args) => {
            let req = build_request(&args.question, args.file.as_deref(), &extractor)?;
            let url = evaluate_url(&args.base_url);
            let reply = post_evaluation(&url, &req).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }
    }
    Ok(())
}

fn resolve_config(explicit: Option<&Path>) -> Result<ReplytextConfig> {
    if let Some(p) = explicit {
        return config::load_from_path(p).map_err(|e| anyhow!(e));
    }
    let cwd = std::env::current_dir().context("current dir")?;
    Ok(config::load_from_dir(&cwd)
        .map_err(|e| anyhow!(e))?
        .unwrap_or_default())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    let mut s = match file {
        Some(p) => std::fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read stdin")?;
            buf
        }
    };
    // Shell pipelines append a newline that would hide a trailing `}`.
    let keep = s.trim_end_matches(['\r', '\n']).len();
    s.truncate(keep);
    Ok(s)
}

fn parse_input(input: &str, mode: InputMode) -> Value {
    let parsed = match mode {
        InputMode::Raw => None,
        InputMode::Json => serde_json::from_str::<Value>(input).ok(),
        InputMode::Lenient => extract_first_json_value(input),
    };
    parsed.unwrap_or_else(|| Value::String(input.to_string()))
}

fn build_request(question: &str, file: Option<&Path>, extractor: &Extractor) -> Result<EvaluateRequest> {
    let input = read_input(file)?;
    let value: Value = serde_json::from_str(&input).context("parse provider responses")?;
    let Value::Object(raws) = value else {
        return Err(anyhow!("provider responses must be a JSON object"));
    };
    Ok(EvaluateRequest::from_raw(question, &raws, extractor))
}

async fn post_evaluation(url: &str, req: &EvaluateRequest) -> Result<Value> {
    let resp = reqwest::Client::new()
        .post(url)
        .json(req)
        .send()
        .await
        .with_context(|| format!("POST {url}"))?
        .error_for_status()
        .with_context(|| format!("POST {url}"))?;
    resp.json::<Value>().await.context("decode evaluate reply")
}

mod cache;
mod config;
mod engine;
mod history;
mod llm;
mod logging;
mod protocol;

use std::io::IsTerminal;
use std::io::Read as _;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::engine::Engine;
use crate::history::{ChatMessage, ConversationHistory};
use crate::llm::client::HttpTransport;
use crate::llm::extract::CORRECTION_LABELS;
use crate::llm::prompt::Preset;
use crate::logging::RequestLog;
use crate::protocol::Model;

#[derive(Parser)]
#[command(name = "redraft", about = "LLM writing tools: rephrase, grammar-check, chat")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite text with a preset or custom instruction
    Rephrase {
        /// Text to rewrite (reads stdin when omitted)
        text: Option<String>,

        /// Canned instruction to apply
        #[arg(long, value_enum, default_value = "readability")]
        preset: Preset,

        /// Custom instruction (overrides --preset)
        #[arg(long)]
        instruction: Option<String>,

        /// Model override
        #[arg(long, value_enum)]
        model: Option<Model>,

        /// Number of variants to generate
        #[arg(short = 'n', long)]
        variants: Option<usize>,
    },
    /// Check grammar and extract the corrected sentence
    Grammar {
        /// Text to check (reads stdin when omitted)
        text: Option<String>,

        /// Model override
        #[arg(long, value_enum)]
        model: Option<Model>,
    },
    /// Interactive chat session (history lives for the session only)
    Chat {
        /// Instruction applied to every turn (defaults to a generic framing)
        #[arg(long)]
        instruction: Option<String>,

        /// Model override
        #[arg(long, value_enum)]
        model: Option<Model>,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Positional text argument, or stdin when absent.
fn read_text(arg: Option<String>) -> anyhow::Result<String> {
    match arg {
        Some(text) => Ok(text),
        None => {
            if std::io::stdin().is_terminal() {
                anyhow::bail!("no text given: pass it as an argument or pipe it on stdin");
            }
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading text from stdin")?;
            Ok(buf.trim_end_matches('\n').to_string())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load();
    let request_log = config
        .log
        .path
        .clone()
        .map(|path| RequestLog::new(path, crate::config::REQUEST_LOG_MAX_SIZE_MB));

    // Credential resolution is fatal before any request is attempted.
    let transport = HttpTransport::from_config(&config.llm).context("startup failed")?;
    let engine = Engine::new(&config, Arc::new(transport), request_log);

    match cli.command {
        Commands::Rephrase {
            text,
            preset,
            instruction,
            model,
            variants,
        } => {
            let text = read_text(text)?;
            let instruction = instruction.as_deref().unwrap_or_else(|| preset.instruction());
            let model = model.unwrap_or(config.llm.rephrase_model);
            let variants = variants.unwrap_or(config.llm.variants);

            let started = Instant::now();
            let choices = engine.rephrase(instruction, &text, model, variants).await?;
            if choices.is_empty() {
                println!("(no output)");
            } else {
                for (i, choice) in choices.iter().enumerate() {
                    println!("{}. {choice}", i + 1);
                }
            }
            println!("Response time: {:.2}s", started.elapsed().as_secs_f64());
        }

        Commands::Grammar { text, model } => {
            let text = read_text(text)?;
            let model = model.unwrap_or(config.llm.rephrase_model);

            let started = Instant::now();
            let results = engine
                .rephrase_structured(
                    Preset::Grammar.instruction(),
                    &text,
                    model,
                    1,
                    &CORRECTION_LABELS,
                )
                .await?;
            match results.first() {
                Some(result) => match &result.answer {
                    Some(answer) => {
                        println!("Corrected: {answer}");
                        println!();
                        println!("{}", result.full_text);
                    }
                    None => println!("{}", result.full_text),
                },
                None => println!("(no output)"),
            }
            println!("Response time: {:.2}s", started.elapsed().as_secs_f64());
        }

        Commands::Chat { instruction, model } => {
            let model = model.unwrap_or(config.llm.chat_model);
            run_chat(&engine, instruction.as_deref(), model).await?;
        }
    }

    Ok(())
}

/// Line-oriented chat loop. One history per invocation; nothing persists.
async fn run_chat(engine: &Engine, instruction: Option<&str>, model: Model) -> anyhow::Result<()> {
    let mut history = ConversationHistory::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "exit" || message == "quit" {
            break;
        }

        match engine.chat(instruction, message, model, &mut history).await {
            Ok(reply) => println!("{reply}"),
            Err(e) => {
                // The user turn stays in history; mark the gap so the
                // transcript stays aligned with what the provider will see.
                eprintln!("warning: {e}");
                history.append(ChatMessage::assistant(format!("(no response: {e})")));
                if !e.is_retryable() {
                    anyhow::bail!("chat session ended: {e}");
                }
                eprintln!("(you can retry the same message)");
            }
        }
    }

    Ok(())
}

//! stepview command-line front end.
//!
//! Provides the `stepview` binary: synthesize a trace for a source file and
//! print or play it, or ask the code assistant about the file. Uses the same
//! `STEPVIEW_*` environment configuration and chat transport as the HTTP
//! server.
//!
//! Exit codes: 0 = success, 1 = usage or I/O error, 2 = answer unavailable.

mod render;

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use stepview_core::ExecutionTrace;
use stepview_server::config::AssistantConfig;
use stepview_server::llm_provider::HttpChatTransport;
use stepview_synth::{AnswerOutcome, CodeAssistant, Origin};

/// Step-by-step execution visualizer.
#[derive(Parser)]
#[command(name = "stepview", about = "Synthesize and play back execution traces")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Source file options shared by every subcommand.
#[derive(Args)]
struct Input {
    /// Source file to trace.
    file: PathBuf,

    /// Language of the source (default: from the file extension).
    #[arg(short, long)]
    language: Option<String>,

    /// Never contact the remote assistant.
    #[arg(long)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full synthesized trace.
    Trace {
        #[command(flatten)]
        input: Input,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Play the trace back on a timer, one step per tick.
    Play {
        #[command(flatten)]
        input: Input,

        /// Speed multiplier (1 = one step per second).
        #[arg(short, long, default_value_t = 1.0)]
        speed: f64,
    },
    /// Complexity analysis and suggestions.
    Analyze {
        #[command(flatten)]
        input: Input,

        #[arg(long)]
        json: bool,
    },
    /// Summary and line-by-line explanation.
    Explain {
        #[command(flatten)]
        input: Input,

        #[arg(long)]
        json: bool,
    },
    /// Ask a free-form question about the file.
    Ask {
        #[command(flatten)]
        input: Input,

        /// The question.
        question: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    let exit_code = match cli.command {
        Commands::Trace { input, json } => run_trace(&input, json).await,
        Commands::Play { input, speed } => run_play(&input, speed).await,
        Commands::Analyze { input, json } => run_analyze(&input, json).await,
        Commands::Explain { input, json } => run_explain(&input, json).await,
        Commands::Ask { input, question } => run_ask(&input, &question).await,
    };
    process::exit(exit_code);
}

/// Source text, language and assistant for a subcommand.
struct Loaded {
    source: String,
    language: String,
    assistant: CodeAssistant,
}

fn load(input: &Input) -> Result<Loaded, String> {
    let source = std::fs::read_to_string(&input.file)
        .map_err(|e| format!("failed to read '{}': {}", input.file.display(), e))?;
    let language = input
        .language
        .clone()
        .unwrap_or_else(|| language_for(&input.file).to_string());

    let config = AssistantConfig::from_env();
    let assistant = if input.offline || !config.is_configured() {
        CodeAssistant::offline()
    } else {
        let transport = HttpChatTransport::new(config).map_err(|e| e.to_string())?;
        CodeAssistant::new(Arc::new(transport))
    };

    Ok(Loaded {
        source,
        language,
        assistant,
    })
}

/// Language name guessed from the file extension; `python` when unknown.
fn language_for(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("js" | "mjs" | "cjs") => "javascript",
        Some("ts") => "typescript",
        Some("rs") => "rust",
        Some("java") => "java",
        Some("c" | "h") => "c",
        Some("cpp" | "cc" | "hpp") => "cpp",
        Some("go") => "go",
        Some("rb") => "ruby",
        _ => "python",
    }
}

fn describe(origin: &Origin) -> String {
    match origin {
        Origin::Deterministic => "deterministic builder".to_string(),
        Origin::Remote { stage } => format!("remote assistant ({} parse)", stage),
        Origin::Fallback { reason } => format!("offline default ({})", reason),
        Origin::EmptySource => "empty source".to_string(),
    }
}

fn print_json(value: &impl serde::Serialize) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {}", e);
            1
        }
    }
}

fn print_trace(trace: &ExecutionTrace) {
    let mut previous_output = "";
    for (index, step) in trace.iter().enumerate() {
        print!("{}", render::step(index, trace.len(), step, previous_output));
        previous_output = &step.output;
    }
}

async fn run_trace(input: &Input, json: bool) -> i32 {
    let loaded = match load(input) {
        Ok(loaded) => loaded,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    let resolved = loaded
        .assistant
        .generate_trace(&loaded.source, &loaded.language)
        .await;
    if json {
        return print_json(&resolved);
    }

    println!(
        "{} steps, pattern {}, from {}\n",
        resolved.value.len(),
        resolved.pattern,
        describe(&resolved.origin)
    );
    print_trace(&resolved.value);
    0
}

async fn run_play(input: &Input, speed: f64) -> i32 {
    let loaded = match load(input) {
        Ok(loaded) => loaded,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    let resolved = loaded
        .assistant
        .generate_trace(&loaded.source, &loaded.language)
        .await;
    let trace = resolved.value;
    if trace.is_empty() {
        println!("Nothing to play: the source is empty.");
        return 0;
    }

    let playback = stepview_playback::spawn();
    let mut updates = playback.subscribe();
    let started = async {
        playback.load(trace.clone()).await?;
        playback.set_speed(speed).await?;
        playback.play().await
    };
    let mut snapshot = match started.await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let mut shown = snapshot.current_step_index;
    print!("{}", render::step(shown, trace.len(), &trace.steps()[shown], ""));

    while snapshot.is_playing {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                snapshot = updates.borrow_and_update().clone();
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = playback.pause().await;
                println!("\nPaused at step {}.", shown + 1);
                return 0;
            }
        }

        while shown < snapshot.current_step_index {
            let previous = &trace.steps()[shown].output;
            shown += 1;
            print!("{}", render::step(shown, trace.len(), &trace.steps()[shown], previous));
        }
    }
    0
}

async fn run_analyze(input: &Input, json: bool) -> i32 {
    let loaded = match load(input) {
        Ok(loaded) => loaded,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    let resolved = loaded.assistant.analyze(&loaded.source, &loaded.language).await;
    if json {
        return print_json(&resolved);
    }
    println!("From {}\n", describe(&resolved.origin));
    print!("{}", render::analysis(&resolved.value));
    0
}

async fn run_explain(input: &Input, json: bool) -> i32 {
    let loaded = match load(input) {
        Ok(loaded) => loaded,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    let resolved = loaded.assistant.explain(&loaded.source, &loaded.language).await;
    if json {
        return print_json(&resolved);
    }
    println!("From {}\n", describe(&resolved.origin));
    print!("{}", render::explanation(&resolved.value));
    0
}

async fn run_ask(input: &Input, question: &str) -> i32 {
    if question.trim().is_empty() {
        eprintln!("Error: question must not be empty");
        return 1;
    }
    let loaded = match load(input) {
        Ok(loaded) => loaded,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    match loaded
        .assistant
        .answer(&loaded.source, &loaded.language, question)
        .await
    {
        AnswerOutcome::Remote { answer } | AnswerOutcome::Canned { answer } => {
            println!("{}", answer);
            0
        }
        AnswerOutcome::Unavailable { message } => {
            eprintln!("{}", message);
            2
        }
    }
}

//! Slash Prompt - a tiny chat REPL on top of slashline
//!
//! Type a line and press Return to "send" it. Type `/` to search the
//! commands:
//! - `save` pretends to save the conversation
//! - `example` and `intuition` drop canned text into the buffer
//! - `exit` quits (so does Ctrl-C)
//!
//! Logs go to a file, never to the terminal the prompt is drawn on:
//! `SLASHLINE_LOG=debug cargo run --example slash_prompt -- --log-file prompt.log`
//!
//! Run with: cargo run --example slash_prompt -- --limit 3

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use slashline::{CommandAction, Item, Prompt, PromptConfig, PromptHandler, PromptSession};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slash_prompt", about = "Chat prompt with slash-command quick search")]
struct Cli {
    /// TOML file with prompt settings and commands
    #[arg(short, long, default_value = "slashline.toml")]
    config: PathBuf,

    /// Show at most this many commands at once (0 shows all)
    #[arg(short, long)]
    limit: Option<usize>,

    /// Where to write logs
    #[arg(long, env = "SLASHLINE_LOG_FILE")]
    log_file: Option<PathBuf>,
}

struct Chat {
    pending: Vec<String>,
    turns: usize,
}

impl PromptHandler for Chat {
    fn on_submit(&mut self, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        self.turns += 1;
        self.pending.push(format!("you> {value}"));
        self.pending.push(format!("bot> heard you ({} so far)", self.turns));
    }

    fn on_command(&mut self, item: &Item) -> CommandAction {
        match item.label.as_str() {
            "save" => {
                self.pending
                    .push(format!("saved {} turns of conversation", self.turns));
                CommandAction::Clear
            }
            "exit" => CommandAction::Exit,
            _ => CommandAction::Insert,
        }
    }

    fn drain_messages(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending)
    }
}

fn default_commands() -> Vec<Item> {
    vec![
        Item::labeled("save"),
        Item::new("example", "Hi there! How are you doing?"),
        Item::new("intuition", "Help me build my intuition about "),
        Item::labeled("exit"),
    ]
}

fn init_logging(path: Option<&PathBuf>) -> std::io::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SLASHLINE_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let mut config = PromptConfig::load(&cli.config)?;
    if let Some(limit) = cli.limit {
        config.quick_search.limit = limit;
    }
    if config.commands.is_empty() {
        config.commands = default_commands();
    }
    tracing::info!(commands = config.commands.len(), "starting prompt");

    let mut prompt = Prompt::new(config);
    let mut chat = Chat {
        pending: Vec::new(),
        turns: 0,
    };
    PromptSession::new().run(&mut prompt, &mut chat)?;

    println!("bye after {} turns", chat.turns);
    Ok(())
}

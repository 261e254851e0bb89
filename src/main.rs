use anyhow::Context;
use catalog_chat::catalog::PREVIEW_ROWS;
use catalog_chat::config::{self, ApiKey, DEFAULT_MODEL, Settings};
use catalog_chat::providers::{DEFAULT_BASE_URL, GeminiProvider};
use catalog_chat::{Catalog, ChatMessage, ChatModel, DEFAULT_ROW_LIMIT, ModelProvider, Role, SalesSession};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Spreadsheet catalog (.xlsx, .xls, .ods) to load at start-up
    #[arg(long, env = "CATALOG_PATH")]
    catalog: Option<PathBuf>,

    /// Gemini model id
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Custom base URL for the Gemini API (e.g., for proxy)
    #[arg(long, env = "GEMINI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    gemini_url: String,

    /// Maximum catalog rows included in the model context
    #[arg(long, env = "CATALOG_ROW_LIMIT", default_value_t = DEFAULT_ROW_LIMIT)]
    row_limit: usize,

    /// File with persona instructions replacing the built-in sales persona
    #[arg(long, env = "PERSONA_PATH")]
    persona: Option<PathBuf>,

    #[arg(long, short)]
    tracing: bool,
}

fn setup_tracing(enable: bool) {
    let filter = if enable {
        EnvFilter::new("catalog_chat=trace,traffic=trace,warn")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Setting default subscriber failed");
}

fn render_turn(turn: &ChatMessage) {
    match turn.role {
        Role::User => println!("[user] {}", turn.content),
        Role::Assistant => {
            println!();
            println!("[assistant]");
            println!("{}", turn.content);
        }
        // never stored as a turn, never shown
        Role::System => {}
    }
}

fn read_masked_chars() -> anyhow::Result<String> {
    let mut buf = String::new();
    loop {
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Enter => break,
            KeyCode::Esc => {
                buf.clear();
                break;
            }
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                buf.clear();
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    print!("\u{8} \u{8}");
                }
            }
            KeyCode::Char(c) => {
                buf.push(c);
                print!("*");
            }
            _ => {}
        }
        io::stdout().flush()?;
    }
    Ok(buf)
}

/// Prompt for the API key, echoing `*` when attached to a terminal.
fn prompt_api_key() -> anyhow::Result<Option<ApiKey>> {
    print!("Masukkan Google API Key: ");
    io::stdout().flush()?;

    let raw = if io::stdin().is_terminal() {
        terminal::enable_raw_mode()?;
        let result = read_masked_chars();
        terminal::disable_raw_mode()?;
        println!();
        result?
    } else {
        let mut line = String::new();
        io::stdin().read_line(&mut line)?;
        line
    };
    Ok(ApiKey::new(raw))
}

fn connect(settings: &Settings, key: &ApiKey) -> anyhow::Result<Arc<dyn ChatModel + Send + Sync>> {
    let provider = GeminiProvider::new(&settings.base_url, key)?;
    provider
        .create_chat_model(&settings.model)
        .with_context(|| format!("Invalid model name '{}'", settings.model))
}

fn submit_key(session: &mut SalesSession, settings: &Settings, key: Option<ApiKey>) {
    let Some(key) = key else {
        println!("API key kosong. Gunakan /key untuk memasukkan API key sebelum bertanya.");
        return;
    };
    match connect(settings, &key) {
        Ok(model) => {
            session.attach_model(model);
            println!("Model siap: {}", session.model_name().unwrap_or(&settings.model));
        }
        Err(e) => {
            error!("Failed to create model: {:#}", e);
            eprintln!("Gagal menyiapkan model: {:#}", e);
        }
    }
}

/// Load a catalog and install its context. On failure the previous catalog
/// stays in place.
fn upload(session: &mut SalesSession, path: &Path, limit: usize) -> Option<Catalog> {
    let catalog = match Catalog::open(path) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(path = %path.display(), "Failed to load catalog: {:#}", e);
            eprintln!("Gagal memuat katalog: {:#}", e);
            return None;
        }
    };

    let context = session.load_catalog(&catalog, limit);
    if context.is_ready() {
        println!(
            "Katalog dimuat dari sheet: {} ({} baris, {} masuk konteks)",
            catalog.sheet_name().unwrap_or("?"),
            catalog.len(),
            context.bullet_count()
        );
    } else {
        warn!(path = %path.display(), "Catalog loaded without name/price columns");
        println!("{}", context);
    }
    Some(catalog)
}

fn print_catalog_hint() {
    println!(
        "Unggah file Excel katalog frozen food dulu ya (minimal punya kolom Name/Nama dan Price/Harga). Gunakan /upload <file>."
    );
}

// Slash command parsing and handling
mod commands {
    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    pub enum Command {
        Quit,
        Help,
        Key,
        Upload(PathBuf),
        Preview,
        Context,
    }

    #[derive(Debug, PartialEq, Eq)]
    pub enum CommandResult {
        Continue,
        Exit,
    }

    pub struct ShellState {
        pub session: SalesSession,
        pub settings: Settings,
        pub catalog: Option<Catalog>,
    }

    impl Command {
        pub fn parse(input: &str) -> Result<Self, String> {
            let Some(rest) = input.strip_prefix('/') else {
                return Err("Not a command".to_string());
            };

            let (name, arg) = match rest.split_once(char::is_whitespace) {
                Some((name, arg)) => (name, arg.trim()),
                None => (rest, ""),
            };

            match name {
                "quit" | "exit" => Ok(Command::Quit),
                "help" => Ok(Command::Help),
                "key" => Ok(Command::Key),
                "preview" => Ok(Command::Preview),
                "context" => Ok(Command::Context),
                "upload" => {
                    if arg.is_empty() {
                        return Err("Usage: /upload <file.xlsx>".to_string());
                    }
                    Ok(Command::Upload(PathBuf::from(arg)))
                }
                "" => Err("Empty command".to_string()),
                _ => Err(format!(
                    "Unknown command: /{}. Type /help for available commands.",
                    name
                )),
            }
        }

        pub fn execute(self, state: &mut ShellState) -> anyhow::Result<CommandResult> {
            match self {
                Command::Quit => {
                    println!("Sampai jumpa!");
                    return Ok(CommandResult::Exit);
                }
                Command::Help => print_help(),
                Command::Key => {
                    let key = prompt_api_key()?;
                    submit_key(&mut state.session, &state.settings, key);
                }
                Command::Upload(path) => {
                    if let Some(catalog) = upload(&mut state.session, &path, state.settings.row_limit) {
                        state.catalog = Some(catalog);
                    }
                }
                Command::Preview => match &state.catalog {
                    Some(catalog) => println!("{}", catalog.preview(PREVIEW_ROWS)),
                    None => print_catalog_hint(),
                },
                Command::Context => match state.session.catalog_context() {
                    Some(context) => println!("{}", context),
                    None => print_catalog_hint(),
                },
            }
            println!();
            Ok(CommandResult::Continue)
        }
    }

    /// A failed command is reported and the shell keeps running.
    pub fn report_failure(result: anyhow::Result<CommandResult>) -> CommandResult {
        result.unwrap_or_else(|e| {
            error!("Command failed: {:#}", e);
            eprintln!("Error: {:#}", e);
            println!();
            CommandResult::Continue
        })
    }

    fn print_help() {
        println!("Available commands:");
        println!("  /upload <file>         - Load a catalog spreadsheet (first sheet)");
        println!("  /preview               - Show the first {} catalog rows", PREVIEW_ROWS);
        println!("  /context               - Show the catalog context sent to the model");
        println!("  /key                   - Enter or replace the API key");
        println!("  /quit, /exit           - Exit the chat");
        println!("  /help                  - Show this help message");
        println!("  Ctrl+D                 - Exit the chat");
    }

}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_env_file();
    let args = Args::parse();

    setup_tracing(args.tracing);

    let settings = Settings {
        model: args.model,
        base_url: args.gemini_url,
        row_limit: args.row_limit,
        catalog_path: args.catalog,
        ..Settings::default()
    }
    .with_persona_file(args.persona)?;

    let mut state = commands::ShellState {
        session: SalesSession::new(settings.persona.clone()),
        catalog: None,
        settings,
    };

    let key = match ApiKey::from_env() {
        Some(key) => Some(key),
        None => prompt_api_key()?,
    };
    submit_key(&mut state.session, &state.settings, key);

    if let Some(path) = state.settings.catalog_path.clone() {
        state.catalog = upload(&mut state.session, &path, state.settings.row_limit);
    }
    if state.catalog.is_none() {
        print_catalog_hint();
    }

    println!();
    println!("Type /help for commands, Ctrl+D or /quit to exit.");
    println!();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(0) => {
                println!();
                println!("Sampai jumpa!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        let input = line.trim();

        if input.is_empty() {
            continue;
        }

        if input.starts_with('/') {
            match commands::Command::parse(input) {
                Ok(cmd) => match commands::report_failure(cmd.execute(&mut state)) {
                    commands::CommandResult::Exit => break,
                    commands::CommandResult::Continue => continue,
                },
                Err(err) => {
                    println!("{}", err);
                    println!();
                    continue;
                }
            }
        }

        if let Err(e) = state.session.send_with(input, render_turn).await {
            error!("Turn failed: {:#}", e);
            eprintln!("Error: {}", e);
        }

        println!();
    }

    println!("Conversation had {} turns", state.session.len());
    Ok(())
}

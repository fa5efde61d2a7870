//! `regchat chat`: terminal front end for the chat controller.

use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::{Result, anyhow};
use colored::Colorize;
use regchat_application::{ChatController, ConversationPanel, Flow, PickerPanel, UiState};
use regchat_core::auth::IdentityProvider;
use regchat_core::config::ClientConfig;
use regchat_core::conversation::EntryKind;
use regchat_core::regulation::PickerRowKind;
use regchat_infrastructure::JsonClientStateRepository;
use regchat_interaction::HttpSummarizationApi;
use regchat_interaction::render::terminal;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

const COMMANDS: &[&str] = &[
    "/login",
    "/logout",
    "/new",
    "/history",
    "/load",
    "/regulations",
    "/pick",
    "/close",
    "/help",
    "/quit",
];

const HELP: &str = "\
/login [callback-url]  sign in, or finish signing in with the URL you were redirected to
/logout                sign out
/new                   start a new chat
/history               list previous conversations
/load <n>              open conversation n from the history
/regulations           open the regulation picker
/pick <n>              expand a section or choose a regulation in the picker
/close                 close the picker
/quit                  exit
Anything else is sent as a message.";

/// Completion and hints for slash commands.
struct ChatHelper;

impl Helper for ChatHelper {}

impl Completer for ChatHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if !line.starts_with('/') || line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = COMMANDS
            .iter()
            .filter(|cmd| cmd.starts_with(line))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ChatHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ChatHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.starts_with('/') && !line.contains(' ') {
            COMMANDS
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for ChatHelper {}

#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Login(Option<&'a str>),
    Logout,
    New,
    History,
    Load(usize),
    Regulations,
    Pick(usize),
    Close,
    Help,
    Quit,
    Send(&'a str),
    Invalid(String),
}

fn parse_number(arg: Option<&str>, usage: &str) -> std::result::Result<usize, String> {
    match arg.and_then(|value| value.parse::<usize>().ok()) {
        Some(number) if number > 0 => Ok(number),
        _ => Err(format!("usage: {usage}")),
    }
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    if line == "quit" || line == "exit" {
        return Command::Quit;
    }
    if !line.starts_with('/') {
        return Command::Send(line);
    }

    let mut parts = line.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

    match name {
        "/login" => Command::Login(arg),
        "/logout" => Command::Logout,
        "/new" => Command::New,
        "/history" => Command::History,
        "/load" => match parse_number(arg, "/load <n>") {
            Ok(number) => Command::Load(number),
            Err(usage) => Command::Invalid(usage),
        },
        "/regulations" => Command::Regulations,
        "/pick" => match parse_number(arg, "/pick <n>") {
            Ok(number) => Command::Pick(number),
            Err(usage) => Command::Invalid(usage),
        },
        "/close" => Command::Close,
        "/help" => Command::Help,
        "/quit" | "/exit" => Command::Quit,
        other => Command::Invalid(format!("Unknown command: {other}")),
    }
}

fn print_error(message: &str) {
    println!("{}", message.red());
}

fn print_login(login_url: &str) {
    println!("{}", "Sign-in required. Open this URL in a browser:".yellow());
    println!("  {login_url}");
    println!(
        "{}",
        "Then paste the address you were redirected to: /login <url>".bright_black()
    );
}

fn handle_flow(flow: Flow) -> bool {
    match flow {
        Flow::Continue => true,
        Flow::Reauthenticate { login_url } => {
            print_login(&login_url);
            false
        }
    }
}

fn print_transcript(ui: &UiState) {
    for entry in ui.transcript.entries() {
        println!("{}", terminal::render_entry(entry));
    }
}

fn print_history(ui: &UiState) {
    match &ui.conversations {
        ConversationPanel::Items(items) => {
            for (index, item) in items.iter().enumerate() {
                println!("{}", terminal::render_conversation_item(index, item));
            }
        }
        panel => {
            if let Some(message) = panel.message() {
                println!("{}", message.bright_black());
            }
        }
    }
}

fn print_picker(ui: &UiState) {
    match &ui.picker {
        PickerPanel::Ready(picker) => {
            println!("{}", "Choose a regulation (/pick <n>):".bright_magenta());
            for (index, row) in picker.rows().iter().enumerate() {
                println!("{}", terminal::render_picker_row(index + 1, row));
            }
        }
        PickerPanel::Error => print_error(ui.picker.message().unwrap_or_default()),
        PickerPanel::Loading | PickerPanel::Hidden => {}
    }
}

fn print_startup(ui: &UiState) {
    if let Some(welcome) = ui.welcome_text() {
        println!("{}", welcome.bright_green());
    }
    if let Some(selected) = ui.selected_regulation_text() {
        println!("{}", selected.bright_black());
    }
    print_history(ui);
    print_picker(ui);
}

async fn start(controller: &mut ChatController) -> Result<()> {
    if handle_flow(controller.init().await?) {
        print_startup(controller.ui());
    }
    Ok(())
}

async fn execute(controller: &mut ChatController, command: Command<'_>) -> Result<()> {
    match command {
        Command::Login(None) => print_login(&controller.login_url()),
        Command::Login(Some(url)) => {
            controller.complete_login(url).await?;
            start(controller).await?;
        }
        Command::Logout => {
            let url = controller.logout_url().await?;
            controller.complete_signout().await?;
            println!("{}", "Signed out.".bright_green());
            if url.starts_with("http") {
                println!("To end the identity provider session, open:\n  {url}");
            }
        }
        Command::New => {
            controller.new_chat();
            println!("{}", "Started a new chat.".bright_black());
        }
        Command::History => {
            if handle_flow(controller.fetch_conversation_history().await) {
                print_history(controller.ui());
            }
        }
        Command::Load(number) => {
            let id = controller
                .ui()
                .conversations
                .items()
                .get(number - 1)
                .map(|item| item.id.clone())
                .ok_or_else(|| anyhow!("No conversation {number}; run /history first"))?;
            if handle_flow(controller.load_conversation(&id).await) {
                let ui = controller.ui();
                if let Some(selected) = ui.selected_regulation_text() {
                    println!("{}", selected.bright_black());
                }
                print_transcript(ui);
            }
        }
        Command::Regulations => {
            if handle_flow(controller.open_regulation_picker().await) {
                print_picker(controller.ui());
            }
        }
        Command::Pick(number) => {
            let row = controller
                .ui()
                .picker
                .picker()
                .and_then(|picker| picker.rows().into_iter().nth(number - 1))
                .ok_or_else(|| anyhow!("No picker row {number}"))?;
            match row.kind {
                PickerRowKind::Section { .. } => {
                    controller.toggle_picker_section(&row.path)?;
                    print_picker(controller.ui());
                }
                PickerRowKind::Entry { .. } => {
                    let regulation = controller.select_regulation(&row.path).await?;
                    println!("{}", format!("Selected: {}", regulation.title).bright_green());
                }
            }
        }
        Command::Close => {
            if !controller.close_regulation_picker() {
                print_error("Choose a regulation first.");
            }
        }
        Command::Help => println!("{HELP}"),
        Command::Send(message) => {
            if controller.ui().login_required {
                print_error("Sign in first (/login).");
                return Ok(());
            }
            if controller.ui().picker.is_visible() || !controller.ui().controls.send_enabled {
                print_error("Choose a regulation first (/regulations).");
                return Ok(());
            }
            println!("{}", "Summarizing...".bright_black());
            let flow = controller.send_message(message).await;
            if handle_flow(flow) {
                if let Some(entry) = controller.ui().transcript.entries().last() {
                    if entry.kind != EntryKind::Prompt {
                        println!("{}", terminal::render_entry(entry));
                    }
                }
            }
        }
        Command::Invalid(message) => print_error(&message),
        Command::Quit => {}
    }
    Ok(())
}

pub async fn run(config: ClientConfig) -> Result<()> {
    let api = Arc::new(HttpSummarizationApi::new(config.api_base_url.clone()));
    let state_repository = Arc::new(JsonClientStateRepository::new().await?);
    let identity = IdentityProvider::new(&config.identity, &config.sso_redirect_base_url);
    let mut controller = ChatController::new(
        api,
        state_repository,
        identity,
        config.context_window_pairs,
    );

    let mut rl: Editor<ChatHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ChatHelper));

    println!("{}", "=== regchat ===".bright_magenta().bold());
    println!("{}", "Type /help for commands, or 'quit' to exit.".bright_black());
    println!();

    if let Err(e) = start(&mut controller).await {
        print_error(&format!("Error: {e}"));
    }

    loop {
        match rl.readline("regchat> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                let command = parse_command(trimmed);
                if command == Command::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }
                if let Err(e) = execute(&mut controller, command).await {
                    print_error(&format!("Error: {e}"));
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                print_error(&format!("Error: {err:?}"));
                break;
            }
        }
    }

    Ok(())
}

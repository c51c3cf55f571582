pub mod commands;
pub mod render;

use std::io::{self, Write};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use uuid::Uuid;

use crate::auth::{AuthContext, AuthError, FirebaseAuth, IdentityProvider};
use crate::backend::{DocumentBackend, HttpBackend};
use crate::chat::{ChatController, ChatError};
use crate::cli::commands::{Commands, ThreadAction};
use crate::config::AppConfig;
use crate::db::get_connection;
use crate::store::{SessionStore, StoreError};
use crate::upload::{UploadError, UploadFile};

type InputLines = Lines<BufReader<Stdin>>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Failed to open local storage: {0}")]
    Database(#[from] duckdb::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("Thread {0} not found")]
    ThreadNotFound(Uuid),
    #[error("Sign-in required")]
    SignInRequired,
}

pub async fn run_cli(command: Commands, config_path: String) -> Result<(), CliError> {
    let config = AppConfig::load(&config_path)?;

    match command {
        Commands::Signup { email } => {
            let provider = FirebaseAuth::from_config(&config.auth);
            let mut lines = stdin_lines();
            let password = prompt(&mut lines, "Password: ").await?.unwrap_or_default();
            let user = provider.sign_up(&email, &password).await?;
            println!("Account created: {}", user.uid);
            return Ok(());
        }
        Commands::Login { email } => {
            let provider = FirebaseAuth::from_config(&config.auth);
            let mut lines = stdin_lines();
            let password = prompt(&mut lines, "Password: ").await?.unwrap_or_default();
            let user = provider.sign_in_with_password(&email, &password).await?;
            println!("Signed in as {}", user.email.as_deref().unwrap_or(&user.uid));
            return Ok(());
        }
        _ => {}
    }

    let pool = get_connection(&config.storage)?;
    let store = Arc::new(SessionStore::load(pool)?);
    let backend: Arc<dyn DocumentBackend> = Arc::new(HttpBackend::new(config.backend.base_url.clone()));

    match command {
        Commands::Chat { thread } => {
            let controller = ChatController::new(store, backend, config.backend.default_tag.clone());
            run_repl(controller, thread, &config).await?;
        }
        Commands::Ask { utterance, new, tag } => {
            let tag = tag.unwrap_or_else(|| config.backend.default_tag.clone());
            if new {
                store.create_thread(backend.as_ref()).await?;
            }
            let controller = ChatController::new(store, backend, tag);
            let outcome = controller.send_message(&utterance).await?;
            println!("{}", render::render_message(&outcome.reply));
        }
        Commands::Upload { paths, tag, youtube } => {
            let tag = tag.unwrap_or_else(|| config.backend.default_tag.clone());
            let mut files = Vec::with_capacity(paths.len());
            for path in &paths {
                files.push(UploadFile::from_path(path).await?);
            }
            let controller = ChatController::new(store, backend, tag);
            let outcome = controller.upload_files(files, &youtube).await?;
            println!(
                "Uploaded {} file(s) to session {} (thread {})",
                outcome.filenames.len(),
                outcome.session_id,
                outcome.thread_id
            );
        }
        Commands::Threads { action } => run_thread_action(&store, action)?,
        Commands::Signup { .. } | Commands::Login { .. } => {}
    }

    Ok(())
}

fn run_thread_action(store: &SessionStore, action: ThreadAction) -> Result<(), CliError> {
    match action {
        ThreadAction::List => {
            let snapshot = store.snapshot();
            if snapshot.threads.is_empty() {
                println!("No threads found.");
            } else {
                for (i, thread) in snapshot.threads.iter().enumerate() {
                    let selected = snapshot.selected == Some(thread.id);
                    println!("{}", render::render_thread_line(i, thread, selected));
                }
            }
        }
        ThreadAction::Remove { id } => {
            if store.snapshot().thread(id).is_none() {
                return Err(CliError::ThreadNotFound(id));
            }
            store.remove(id)?;
            println!("Deleted thread {}", id);
        }
        ThreadAction::Clear => {
            store.clear_all()?;
            println!("All threads deleted.");
        }
        ThreadAction::Export { id, path } => {
            let snapshot = store.snapshot();
            let thread = snapshot.thread(id).ok_or(CliError::ThreadNotFound(id))?;
            let export_path = path.unwrap_or_else(|| format!("thread_{}.txt", id));
            std::fs::write(&export_path, render::export_transcript(thread))?;
            println!("Thread exported successfully to: {}", export_path);
        }
    }
    Ok(())
}

fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

async fn prompt(lines: &mut InputLines, label: &str) -> io::Result<Option<String>> {
    print!("{}", label);
    io::stdout().flush()?;
    Ok(lines.next_line().await?.map(|l| l.trim().to_string()))
}

/// Blocks until someone is signed in. Provider errors are shown inline and
/// the prompt repeats; an empty email gives up.
async fn sign_in(
    provider: &dyn IdentityProvider,
    auth: &AuthContext,
    lines: &mut InputLines,
) -> Result<(), CliError> {
    if let Some(user) = auth.wait_resolved().await {
        println!("Signed in as {}", user.email.as_deref().unwrap_or(&user.uid));
        return Ok(());
    }

    loop {
        let email = match prompt(lines, "Email: ").await? {
            Some(email) if !email.is_empty() => email,
            _ => return Err(CliError::SignInRequired),
        };
        let password = prompt(lines, "Password: ").await?.unwrap_or_default();

        match provider.sign_in_with_password(&email, &password).await {
            Ok(user) => {
                println!("Signed in as {}", user.email.as_deref().unwrap_or(&user.uid));
                return Ok(());
            }
            Err(e) => println!("{}", e),
        }
    }
}

async fn run_repl(controller: ChatController, thread: Option<Uuid>, config: &AppConfig) -> Result<(), CliError> {
    let mut lines = stdin_lines();

    let provider: Option<Arc<FirebaseAuth>> = config
        .auth
        .required
        .then(|| Arc::new(FirebaseAuth::from_config(&config.auth)));
    let auth = provider.as_ref().map(|p| AuthContext::start(&**p));
    if let (Some(provider), Some(auth)) = (&provider, &auth) {
        sign_in(&**provider, auth, &mut lines).await?;
    }

    let store = controller.store().clone();
    if let Some(id) = thread {
        if store.snapshot().thread(id).is_none() {
            return Err(CliError::ThreadNotFound(id));
        }
        store.select(id)?;
    }

    println!("--- docchat ---");
    match store.snapshot().selected_thread() {
        Some(t) => {
            println!("Thread: {} ({})", t.label, t.id);
            for m in &t.messages {
                println!("{}", render::render_message(m));
            }
        }
        None => println!("No thread selected, your first message starts one."),
    }
    println!("Type /help for commands, /exit to quit.");
    println!("---------------");

    loop {
        let Some(line) = prompt(&mut lines, "\nYou> ").await? else {
            break;
        };
        if line.is_empty() {
            continue;
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line.as_str(), ""),
        };

        match command {
            "/exit" | "/quit" => break,
            "/help" => print_help(),
            "/new" => {
                let id = store.create_thread(controller.backend().as_ref()).await;
                match id {
                    Ok(id) => println!("Started thread {}", id),
                    Err(e) => eprintln!("Could not start a thread: {}", e),
                }
            }
            "/threads" => run_thread_action(&store, ThreadAction::List)?,
            "/select" => select_thread(&store, rest)?,
            "/history" => match store.snapshot().selected_thread() {
                Some(t) => {
                    for m in &t.messages {
                        println!("{}", render::render_message(m));
                    }
                }
                None => println!("No thread selected."),
            },
            "/upload" => {
                let mut files = Vec::new();
                let mut unreadable = false;
                for path in rest.split_whitespace() {
                    match UploadFile::from_path(path).await {
                        Ok(file) => files.push(file),
                        Err(e) => {
                            eprintln!("{}", e);
                            unreadable = true;
                        }
                    }
                }
                if unreadable {
                    continue;
                }
                match controller.upload_files(files, &[]).await {
                    Ok(outcome) => println!("Upload successful: {}", outcome.filenames.join(", ")),
                    Err(e) => eprintln!("Upload failed: {}", e),
                }
            }
            "/remove" => {
                if let Some(id) = store.snapshot().selected {
                    store.remove(id)?;
                    println!("Deleted thread {}", id);
                }
            }
            "/clear" => {
                store.clear_all()?;
                println!("All threads deleted.");
            }
            "/logout" => {
                if let Some(provider) = &provider {
                    provider.sign_out().await?;
                    println!("Signed out.");
                    break;
                }
                println!("Not signed in.");
            }
            _ if command.starts_with('/') => println!("Unknown command {}, try /help", command),
            _ => match controller.send_message(&line).await {
                Ok(outcome) => println!("{}", render::render_message(&outcome.reply)),
                Err(e) => eprintln!("Error: {}", e),
            },
        }
    }

    if let Some(auth) = auth {
        auth.shutdown();
    }
    Ok(())
}

fn select_thread(store: &SessionStore, arg: &str) -> Result<(), CliError> {
    let snapshot = store.snapshot();
    let target = match arg.parse::<usize>() {
        Ok(n) if n >= 1 => snapshot.threads.get(n - 1).map(|t| t.id),
        _ => arg.parse::<Uuid>().ok().filter(|id| snapshot.thread(*id).is_some()),
    };

    match target {
        Some(id) => {
            let next = store.select(id)?;
            if let Some(t) = next.selected_thread() {
                println!("Switched to {} ({})", t.label, t.id);
            }
        }
        None => println!("No thread matches {:?}", arg),
    }
    Ok(())
}

fn print_help() {
    println!("/new                start a new thread");
    println!("/threads            list threads");
    println!("/select <n|uuid>    switch thread");
    println!("/history            show the current thread");
    println!("/upload <paths...>  upload documents into this thread");
    println!("/remove             delete the current thread");
    println!("/clear              delete every thread");
    println!("/logout             sign out");
    println!("/exit               quit");
}

//! folio admin console — manages the portfolio's comics and videos from a
//! terminal instead of the browser page.

use clap::Parser;
use folio_core::app::AppController;
use folio_core::auth::SupabaseAuth;
use folio_core::config::{default_hint_dir, SupabaseConfig};
use folio_core::model::{MediaKind, RecordField, RecordId};
use folio_core::notify::{Notification, NotificationLevel, Notifier};
use folio_core::session::{ConfirmPrompt, EditingSession};
use folio_core::storage::SupabaseObjectStorage;
use folio_core::store::SupabaseRecordStore;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::error;

/// folio admin console — list, edit, and upload portfolio content.
#[derive(Parser)]
#[command(name = "folio-cli")]
struct Args {
    /// Supabase project URL.
    #[arg(long, env = "FOLIO_SUPABASE_URL")]
    supabase_url: String,

    /// Supabase anonymous API key.
    #[arg(long, env = "FOLIO_SUPABASE_ANON_KEY")]
    anon_key: String,

    /// Storage bucket holding uploaded images.
    #[arg(long, default_value = "images", env = "FOLIO_STORAGE_BUCKET")]
    bucket: String,
}

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .without_time();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

/// Interactive y/N prompt on stdin.
struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        print!("{message} (y/N) ");
        let _ = std::io::stdout().flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

fn parse_kind(word: &str) -> Option<MediaKind> {
    match word {
        "comic" | "comics" => Some(MediaKind::Comic),
        "video" | "videos" => Some(MediaKind::Video),
        _ => None,
    }
}

fn parse_field(word: &str) -> Option<RecordField> {
    match word {
        "title" => Some(RecordField::Title),
        "date" => Some(RecordField::Date),
        "media" | "image" | "youtube" => Some(RecordField::Media),
        _ => None,
    }
}

/// Resolve a 1-based list position to a record id.
fn resolve(session: &EditingSession, kind: MediaKind, pos: &str) -> Option<RecordId> {
    let index: usize = pos.parse().ok()?;
    session
        .records(kind)
        .get(index.checked_sub(1)?)
        .map(|r| r.id.clone())
}

fn print_records(session: &EditingSession, kind: MediaKind) {
    let records = session.records(kind);
    if records.is_empty() {
        println!("  (no {kind})");
        return;
    }
    for (i, record) in records.iter().enumerate() {
        let marker = if session.editing(kind) == Some(&record.id) {
            "*"
        } else {
            " "
        };
        let media = if record.media_ref.is_empty() {
            "-"
        } else {
            &record.media_ref
        };
        println!(
            "{marker} {:>2}. [{}] {} ({}) {}",
            i + 1,
            record.id,
            record.title,
            record.date,
            media
        );
    }
}

fn print_notifications(rx: &mut broadcast::Receiver<Notification>) {
    while let Ok(n) = rx.try_recv() {
        match n.level {
            NotificationLevel::Success => println!("[ok] {}", n.message),
            NotificationLevel::Error => println!("[error] {}", n.message),
        }
    }
}

fn print_help() {
    println!("commands:");
    println!("  list <kind>                    show records (kind: comics|videos)");
    println!("  add <kind>                     create a draft and open it for editing");
    println!("  edit <kind> <n>                open record n for editing");
    println!("  set <kind> <n> <field> <v..>   set title|date|media on record n");
    println!("  save <kind> <n>                persist record n");
    println!("  cancel <kind> <n>              abandon the edit of record n");
    println!("  delete <kind> <n>              delete record n (asks first)");
    println!("  upload <kind> <n> <file>       upload an image and attach it");
    println!("  login <email> <password>       sign in as the site owner");
    println!("  logout                         sign out");
    println!("  quit");
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    configure_logging();
    let args = Args::parse();

    let config = SupabaseConfig {
        url: args.supabase_url,
        anon_key: args.anon_key,
        bucket: args.bucket,
    };
    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    let auth = Arc::new(SupabaseAuth::new(&config));
    let store = Arc::new(SupabaseRecordStore::new(&config, Some(auth.clone())));
    let storage = Arc::new(SupabaseObjectStorage::new(&config, Some(auth.clone())));

    let notifier = Notifier::new();
    let mut notifications = notifier.subscribe();
    let mut session = EditingSession::new(store, storage, Arc::new(StdinConfirm), notifier.clone());
    let mut app = AppController::new(auth, notifier, default_hint_dir());

    app.preseed_from_hint();
    app.check_admin_status().await;
    session.load(MediaKind::Comic).await;
    session.load(MediaKind::Video).await;
    app.set_loading(false);

    println!(
        "folio admin console — signed in: {}. Type 'help' for commands.",
        app.state().admin
    );

    let stdin = std::io::stdin();
    loop {
        print!("> ");
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.as_slice() {
            [] => {}
            ["help"] => print_help(),
            ["quit"] | ["exit"] => break,
            ["login", email, password] => {
                app.login(email, password).await;
                // Reload under the authenticated role.
                session.load(MediaKind::Comic).await;
                session.load(MediaKind::Video).await;
            }
            ["logout"] => app.logout().await,
            ["list", kind] => match parse_kind(kind) {
                Some(kind) => print_records(&session, kind),
                None => println!("unknown kind: {kind}"),
            },
            ["add", kind] => match parse_kind(kind) {
                Some(kind) => {
                    let id = session.begin_create(kind);
                    println!("created {id}, now editing");
                }
                None => println!("unknown kind: {kind}"),
            },
            ["edit", kind, pos] => match parse_kind(kind) {
                Some(kind) => match resolve(&session, kind, pos) {
                    Some(id) => session.begin_edit(kind, &id),
                    None => println!("no such record"),
                },
                None => println!("unknown kind: {kind}"),
            },
            ["set", kind, pos, field, rest @ ..] if !rest.is_empty() => {
                match (parse_kind(kind), parse_field(field)) {
                    (Some(kind), Some(field)) => match resolve(&session, kind, pos) {
                        Some(id) => session.update_field(kind, &id, field, &rest.join(" ")),
                        None => println!("no such record"),
                    },
                    _ => println!("usage: set <kind> <n> <title|date|media> <value>"),
                }
            }
            ["save", kind, pos] => match parse_kind(kind) {
                Some(kind) => match resolve(&session, kind, pos) {
                    Some(id) => session.commit(kind, &id).await,
                    None => println!("no such record"),
                },
                None => println!("unknown kind: {kind}"),
            },
            ["cancel", kind, pos] => match parse_kind(kind) {
                Some(kind) => match resolve(&session, kind, pos) {
                    Some(id) => session.cancel(kind, &id),
                    None => println!("no such record"),
                },
                None => println!("unknown kind: {kind}"),
            },
            ["delete", kind, pos] => match parse_kind(kind) {
                Some(kind) => match resolve(&session, kind, pos) {
                    Some(id) => session.remove(kind, &id).await,
                    None => println!("no such record"),
                },
                None => println!("unknown kind: {kind}"),
            },
            ["upload", kind, pos, path] => match parse_kind(kind) {
                Some(kind) => match resolve(&session, kind, pos) {
                    Some(id) => match std::fs::read(path) {
                        Ok(bytes) => {
                            if let Some(url) =
                                session.attach_media(kind, &id, &bytes, path).await
                            {
                                println!("uploaded: {url}");
                            }
                        }
                        Err(e) => println!("cannot read {path}: {e}"),
                    },
                    None => println!("no such record"),
                },
                None => println!("unknown kind: {kind}"),
            },
            _ => println!("unrecognized command; type 'help'"),
        }

        print_notifications(&mut notifications);
    }
}

//! plexwatch CLI — watch a Plex server's playback events from the terminal.
//!
//! Usage:
//! ```bash
//! # Stream session events from a server
//! plexwatch watch --url http://10.0.0.5:32400 --token YOUR_TOKEN
//!
//! # Token can also come from the environment
//! PLEX_TOKEN=YOUR_TOKEN plexwatch watch --url http://10.0.0.5:32400
//! ```

use std::env;
use std::process;
use std::sync::Arc;

use plexwatch_client::{ClientConfig, EventStreamClient};
use plexwatch_core::{ClientEvent, ConnectionState, ServerDescriptor, SessionEvent};
use plexwatch_sse::SseEventSource;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "watch" => cmd_watch(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("plexwatch {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn print_usage() {
    println!("plexwatch {}", env!("CARGO_PKG_VERSION"));
    println!("Watch a Plex server's playback events from the terminal\n");
    println!("USAGE:");
    println!("    plexwatch <COMMAND>\n");
    println!("COMMANDS:");
    println!("    watch      Stream session events from a server");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("WATCH FLAGS:");
    println!("    --url <URL>       Server base URL, e.g. http://10.0.0.5:32400  [required]");
    println!("    --token <TOKEN>   Access token (or set PLEX_TOKEN)");
    println!("    --name <NAME>     Display name used in output  [default: plex]");
}

async fn cmd_watch(args: &[String]) -> Result<(), String> {
    let url = parse_flag(args, "--url").ok_or("--url is required")?;
    let token = parse_flag(args, "--token")
        .or_else(|| env::var("PLEX_TOKEN").ok())
        .ok_or("--token or PLEX_TOKEN is required")?;
    let name = parse_flag(args, "--name").unwrap_or_else(|| "plex".to_string());

    let descriptor = ServerDescriptor::new(name.clone(), name, url, token);
    let client = EventStreamClient::new(
        descriptor,
        Arc::new(SseEventSource::default()),
        ClientConfig::default(),
    );
    let mut events = client.subscribe();

    client.connect();

    while let Some(event) = events.recv().await {
        match event {
            ClientEvent::Session(session) => {
                let n = session.notification();
                let key = n.session_key.as_deref().unwrap_or("-");
                let extra = serde_json::to_string(&n.extra).unwrap_or_default();
                println!("{:<8} session={key} {extra}", session_label(&session));
            }
            ClientEvent::StateChanged { previous, current } => {
                println!("state    {previous} -> {current}");
                if current == ConnectionState::Fallback {
                    eprintln!("live updates unavailable, falling back; re-run to retry");
                    break;
                }
            }
            ClientEvent::Error { message } => {
                eprintln!("error    {message}");
            }
        }
    }

    Ok(())
}

fn session_label(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::Playing(_) => "playing",
        SessionEvent::Paused(_) => "paused",
        SessionEvent::Stopped(_) => "stopped",
        SessionEvent::Progress(_) => "progress",
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}

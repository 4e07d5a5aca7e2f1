//! Standalone headless client binary.
//!
//! Usage:
//!   cargo run -p arena_client -- [--host 127.0.0.1:8080] [--url ws://...] [--config client.json]
//!
//! The client connects to the authority on the page host's next port,
//! predicts local movement, ships intents on the send cadence and reconciles
//! snapshots as they arrive. Stdin stands in for the keyboard and mouse.
//!
//! Console commands:
//!   +<key> / -<key>  - Press / release a key (w, a, s, d by default)
//!   fire / cease     - Hold / release the primary button
//!   aim <x> <y>      - Move the pointer
//!   status           - Show client status
//!   quit             - Exit client

use std::env;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::Context;
use arena_client::{
    console::{self, Command},
    render::TraceSurface,
    GameClient,
};
use arena_shared::config::ClientConfig;
use tokio::{sync::mpsc, time::MissedTickBehavior};
use tracing::info;

fn parse_args() -> anyhow::Result<ClientConfig> {
    let args: Vec<String> = env::args().collect();

    // Config file first so explicit flags override it.
    let mut cfg = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = &args[i + 1];
            let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
            ClientConfig::from_json_str(&text).with_context(|| format!("parse {path}"))?
        }
        _ => ClientConfig::default(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--host" if i + 1 < args.len() => {
                cfg.page_host = args[i + 1].clone();
                i += 2;
            }
            "--url" if i + 1 < args.len() => {
                cfg.authority_url = Some(args[i + 1].clone());
                i += 2;
            }
            _ => i += 1,
        }
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args()?;
    info!(page_host = %cfg.page_host, "Starting client");

    let mut client = GameClient::connect(&cfg).context("connect")?;

    // Set up console input channel.
    let (console_tx, mut console_rx) = mpsc::channel::<String>(32);

    // Spawn stdin reader thread.
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        loop {
            print!("] ");
            let _ = stdout.flush();
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let line = line.trim().to_string();
            if !line.is_empty() && console_tx.blocking_send(line).is_err() {
                break;
            }
        }
    });

    println!("Type 'status' for info, 'quit' to exit.");
    println!();

    let frame_period = Duration::from_secs_f64(1.0 / f64::from(cfg.frame_hz.max(1)));
    let mut frame_timer = tokio::time::interval(frame_period);
    frame_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut send_timer = tokio::time::interval(Duration::from_millis(cfg.send_tick_ms.max(1)));
    send_timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut surface = TraceSurface::new(u64::from(cfg.frame_hz.max(1)) * 5);
    let mut connected = true;
    let mut console_open = true;

    loop {
        tokio::select! {
            _ = frame_timer.tick() => {
                client.frame(Instant::now());
                client.draw(&mut surface);
            }
            _ = send_timer.tick() => {
                client.send_tick(Instant::now());
            }
            frame = client.recv_frame(), if connected => match frame {
                Some(text) => {
                    client.apply_frame(&text);
                }
                None => {
                    // Terminal: the world freezes at the last snapshot.
                    connected = false;
                    println!("Disconnected from authority.");
                }
            },
            line = console_rx.recv(), if console_open => {
                let Some(line) = line else {
                    console_open = false;
                    continue;
                };
                match console::parse(&line) {
                    Ok(Some(Command::Input(event))) => {
                        client.handle_input(event);
                    }
                    Ok(Some(Command::Status)) => {
                        for line in client.status() {
                            println!("{}", line);
                        }
                    }
                    Ok(Some(Command::Quit)) => break,
                    Ok(None) => {}
                    Err(e) => println!("Error: {}", e),
                }
            }
        }
    }

    Ok(())
}

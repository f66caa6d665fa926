use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::{CalcClient, Command, OpId, SessionEvent, WsRelay};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let relay = Arc::new(WsRelay::connect(&args.server_url).await?);
    let client = CalcClient::new(relay);

    let mut events = client.subscribe_events();
    let echo_view = Arc::clone(&client);
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SessionEvent::HistoryLogged { display } => {
                    println!("= {display}");
                    for (i, entry) in echo_view.history_snapshot().await.iter().enumerate() {
                        println!("  [{i}] {} = {}", entry.expression_text, entry.result);
                    }
                }
                SessionEvent::Error(message) => eprintln!("error: {message}"),
            }
        }
    });

    println!("keys: 0-9 . + - x / n(egate) = d(elete) c(lear) rN(ecall) q(uit)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "q" {
            break;
        }
        for command in parse_line(line) {
            if let Err(err) = client.handle_input(command).await {
                eprintln!("error: {err}");
            }
        }
        println!("{}", client.display().await);
    }

    Ok(())
}

/// Maps one input line onto calculator commands. `rN` recalls history entry
/// N; every other character is a key press.
fn parse_line(line: &str) -> Vec<Command> {
    if let Some(index) = line.strip_prefix('r').and_then(|n| n.parse().ok()) {
        return vec![Command::Recall(index)];
    }

    line.chars()
        .filter_map(|key| match key {
            '0'..='9' => Some(Command::Digit(key)),
            '.' => Some(Command::Period),
            '+' => Some(Command::Op(OpId::Add)),
            '-' => Some(Command::Op(OpId::Subtract)),
            'x' | '*' => Some(Command::Op(OpId::Multiply)),
            '/' => Some(Command::Op(OpId::Divide)),
            'n' => Some(Command::Op(OpId::Negate)),
            '=' => Some(Command::Equals),
            'd' => Some(Command::Delete),
            'c' => Some(Command::Clear),
            _ => None,
        })
        .collect()
}

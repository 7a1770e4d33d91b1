use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::{load_settings_from, ClientSettings, DEFAULT_CONFIG_FILE},
    error::ReportError,
    ControllerEvent, SessionController, ViewMode,
};
use shared::{
    domain::{Role, Sender},
    protocol::Report,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Practice an interview against the exchange/report services.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Service root; overrides both configured endpoints.
    #[arg(long)]
    server_url: Option<String>,
    /// Role id, e.g. `software_engineer`. Prompted for when omitted.
    #[arg(long)]
    role: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings_from(&args.config)?;
    if let Some(server_url) = &args.server_url {
        let overridden = ClientSettings::for_server(server_url)?;
        settings.exchange_endpoint = overridden.exchange_endpoint;
        settings.report_endpoint = overridden.report_endpoint;
    }

    let controller = SessionController::new(&settings)?;
    let printer = tokio::spawn(print_events(controller.subscribe_events()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    if let Some(role) = &args.role {
        controller.select_role_id(role).await?;
    }
    while controller.mode().await == ViewMode::AwaitingRole {
        println!("Choose interview role:");
        for (idx, role) in SessionController::roles().iter().enumerate() {
            println!("  {}. {} ({})", idx + 1, role.label(), role);
        }
        let Some(line) = lines.next_line().await? else {
            return Ok(());
        };
        let role = match line.trim().parse::<usize>() {
            Ok(n) if (1..=Role::ALL.len()).contains(&n) => Role::ALL[n - 1],
            _ => match line.parse::<Role>() {
                Ok(role) => role,
                Err(err) => {
                    println!("{err}");
                    continue;
                }
            },
        };
        controller.select_role(role).await?;
    }

    println!("Type your answer. Commands: :report, :back, :quit");
    while let Some(mut line) = lines.next_line().await? {
        match line.trim() {
            ":quit" => break,
            ":back" => {
                if let Err(err) = controller.back().await {
                    println!("{err}");
                }
            }
            ":report" => match controller.request_report().await {
                Ok(report) => print_report(&report),
                Err(ReportError::NotStarted) | Err(ReportError::Service(_)) => {}
                Err(err) => warn!(error = %err, "report not shown"),
            },
            _ => match controller.send_message(&mut line).await {
                Ok(settle) => settle.await.context("exchange task panicked")?,
                Err(rejection) => println!("({rejection})"),
            },
        }
    }

    drop(controller);
    let _ = printer.await;
    Ok(())
}

async fn print_events(mut events: tokio::sync::broadcast::Receiver<ControllerEvent>) {
    use tokio::sync::broadcast::error::RecvError;

    loop {
        match events.recv().await {
            Ok(ControllerEvent::MessageAppended(message)) if message.sender == Sender::Assistant => {
                println!("interviewer> {}", message.text);
            }
            Ok(ControllerEvent::PendingChanged(true)) => println!("interviewer is typing..."),
            Ok(ControllerEvent::InterviewWrapUp) => {
                println!("(type :report to see your evaluation)")
            }
            Ok(ControllerEvent::Notice(notice)) => println!("! {}", notice.text()),
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer lagged"),
            Err(RecvError::Closed) => return,
        }
    }
}

fn print_report(report: &Report) {
    let summary = &report.final_summary;
    println!("== Final Interview Report ==");
    println!("Overall score: {}", summary.overall_display());
    for (category, score) in &summary.averages {
        println!("  {category}: {score:.1}");
    }
    for (title, items) in [
        ("Top strengths", &summary.top_strengths),
        ("Weaknesses", &summary.top_weaknesses),
        ("Suggestions", &summary.top_suggestions),
    ] {
        println!("{title}:");
        for item in items {
            println!("  - {item}");
        }
    }
    println!("(type :back to return to the chat)");
}

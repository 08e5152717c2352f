//! `coven ask` - one session in-process

use anyhow::Result;
use coven_core::{OrchestratorInput, SessionEvent};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::server::{build_orchestrator, load_config, wait_for_shutdown_signal};

/// Run a single request and print each event as it arrives
pub async fn run(
    request: String,
    persona: Option<String>,
    review: bool,
    ephemeral: bool,
) -> Result<()> {
    let config = load_config()?;
    let orchestrator = build_orchestrator(&config, ephemeral)?;

    let mut input = OrchestratorInput::new(request);
    if let Some(persona) = persona {
        input = input.with_persona(persona);
    }
    if review {
        input = input.with_review(true);
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        interrupt.cancel();
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            print_event(&event);
        }
    });

    let result = orchestrator.run(input, &tx, cancel).await;
    drop(tx);
    let _ = printer.await;

    result.map(|_| ()).map_err(|e| anyhow::anyhow!(coven_core::format_error_for_cli(&e)))
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Thinking { message, .. } => println!("⏳ {}\n", message),
        SessionEvent::Stream {
            persona,
            content,
            phase,
            iteration,
            verdict,
            ..
        } => {
            let verdict = verdict.map(|v| format!(" [{}]", v)).unwrap_or_default();
            println!("── {} ({:?}, iteration {}){}", persona, phase, iteration, verdict);
            println!("{}\n", content);
        }
        SessionEvent::Complete {
            persona,
            iteration,
            verdict,
            ..
        } => {
            let verdict = verdict.map(|v| v.to_string()).unwrap_or_else(|| "no review".to_string());
            println!("✅ {} finished after {} review cycle(s): {}", persona, iteration, verdict);
        }
        SessionEvent::Error { message, .. } => eprintln!("❌ {}", message),
    }
}

//! `coven personas` and `coven metrics`

use anyhow::Result;
use coven_core::PersonaRole;

use crate::server::{build_orchestrator, load_config};

/// Print the persona catalog
pub fn list() -> Result<()> {
    let config = load_config()?;
    let orchestrator = build_orchestrator(&config, true)?;
    let registry = orchestrator.registry();
    let default_id = registry.default_persona().id();

    println!("\n🕯️  The Coven\n");
    for role in [PersonaRole::Worker, PersonaRole::Advisor, PersonaRole::Reviewer] {
        let members: Vec<_> = registry.iter().filter(|p| p.role() == role).collect();
        if members.is_empty() {
            continue;
        }
        println!("  {}:", format!("{:?}", role).to_uppercase());
        for persona in members {
            let marker = if persona.id() == default_id { " (default)" } else { "" };
            println!(
                "    {} {:10} {}{}",
                persona.info.icon,
                persona.id(),
                persona.info.specialty,
                marker
            );
        }
        println!();
    }
    Ok(())
}

/// Print learning metrics for every persona
pub fn metrics() -> Result<()> {
    let config = load_config()?;
    let orchestrator = build_orchestrator(&config, false)?;

    println!("\n📊 Learning metrics\n");
    println!(
        "  {:10} {:>6} {:>9} {:>7} {:>9} {:>10}",
        "persona", "total", "approval", "rating", "patterns", "learnings"
    );
    for m in orchestrator.metrics() {
        println!(
            "  {:10} {:>6} {:>8.0}% {:>7.2} {:>9} {:>10}",
            m.persona,
            m.total_interactions,
            m.approval_rate * 100.0,
            m.average_rating,
            m.successful_patterns,
            m.learnings
        );
    }
    println!();
    Ok(())
}

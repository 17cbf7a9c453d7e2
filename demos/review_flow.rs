//! A small review flow on an in-memory page.
//!
//! Demonstrates:
//! - Building a reactor with a config loaded from JSON
//! - Querying textareas into named, referenced proxies
//! - Keyboard reactions (`onKeydown_CtrlEnter`) and global reactions
//! - Duplicate detection and counters
//!
//! Usage:
//!   cargo run --example review_flow
//!   cargo run --example review_flow -- --debug

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use dom_reactor::util::{camel_case, duplicate_values};
use dom_reactor::{
    Config, Document, LogLevel, NativeEvent, Query, ReactionContext, Reactions, Reactor,
};

// ============================================================================
// Constants
// ============================================================================

const CONFIG: &str = r#"{
    "debounceMs": 30,
    "settings": [{ "name": "autoCapitalize", "value": true }]
}"#;

const HEADLINES: &[&str] = &["fresh offers", "", "fresh offers"];

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run().await {
        eprintln!("\n[ERROR] {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    println!("=== Review flow ===\n");

    // ========================================================================
    // Page
    // ========================================================================

    let document = Document::new();
    for text in HEADLINES {
        document
            .body()
            .append_child(&document.create_element("textarea").with_value(*text))?;
    }

    let reactor = Reactor::new(document.clone(), Config::from_json_str(CONFIG)?)?;
    let worker = reactor.scheduler().spawn();

    // ========================================================================
    // Reactions
    // ========================================================================

    let headlines = reactor.query(
        Query::select("textarea")
            .name("headline")
            .reference("headlines")
            .on("onKeydown_CtrlEnter", |ctx: &ReactionContext| {
                if let Some(proxy) = ctx.proxy() {
                    let value = proxy.value().unwrap_or_default();
                    proxy.set_value(camel_case(&value))?;
                }
                Ok(())
            }),
    )?;

    let handle = reactor.clone();
    reactor.set_global(Reactions::new().on("onKeydown_AltArrowRight", move |_: &ReactionContext| {
        handle.counters().add("review", "task", "skipped");
        Ok(())
    }))?;

    println!("[Query] {} headlines", headlines.len());
    for proxy in &headlines {
        println!("        {proxy}");
    }

    // ========================================================================
    // Events
    // ========================================================================

    headlines[0]
        .node()
        .context("first headline dropped")?
        .dispatch_event(NativeEvent::keydown("Enter").with_ctrl());
    headlines[2]
        .node()
        .context("last headline dropped")?
        .dispatch_event(NativeEvent::keydown("ArrowRight").with_alt());
    reactor.scheduler().wait_idle(Duration::from_secs(5)).await?;

    println!("\n[Events]");
    for proxy in &headlines {
        println!("        {proxy}");
    }

    let dupes = duplicate_values(&headlines);
    println!("\n[Duplicates] {}", dupes.len());
    println!("[Counters] {:?}", reactor.counters().list());

    if let Some(logbook) = reactor.logbook() {
        for entry in logbook.entries_at(LogLevel::ChangeValue) {
            println!("[Log] {}", entry.message);
        }
    }

    reactor.reset();
    reactor.scheduler().shutdown();
    worker.await?;
    Ok(())
}

/// Initialize tracing/logging.
fn init_logging(debug: bool) {
    let filter = if debug {
        "dom_reactor=debug"
    } else {
        "dom_reactor=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

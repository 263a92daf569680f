use std::env;
use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use leadmap_cli::{ConsoleMap, FixtureSearchProvider, StubConverter};
use leadmap_core::config::{expand_path, EngineConfig};
use leadmap_core::lodging::load_fixtures;
use leadmap_core::types::{ResultId, SearchCriteria};
use leadmap_driver::Controller;
use leadmap_sync::{SearchSession, SessionEvent};

const USAGE: &str = "<search|convert> <fixtures.json|dir> <region-code> [business-type|result-id]";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() { eprintln!("Usage: {} {}", prog, USAGE); std::process::exit(1); }
    let cmd = args.remove(0);
    (cmd, args)
}

fn print_list(session: &SearchSession<ConsoleMap>) {
    println!("{} of {} results shown ({} markers)", session.displayed_results().len(), session.total_count(), session.map().live_overlays());
    for (i, r) in session.displayed_results().iter().enumerate() {
        let rooms = r.badge.as_deref().unwrap_or("-");
        println!("{:>3}. [{}] {} ({}, rooms {})", i + 1, r.id, r.title, r.category_label, rooms);
    }
}

fn print_event(event: &SessionEvent) {
    match event {
        SessionEvent::Notify(n) => println!("[{:?}] {}: {}", n.severity, n.title, n.message),
        SessionEvent::Navigate(intent) => println!("→ open lead record {}", intent.record_ref),
        SessionEvent::OpenExternal { url } => println!("→ open {}", url),
        SessionEvent::EmptyResults => println!("(no results)"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let config = EngineConfig::load().map_err(|e| { eprintln!("Error loading config: {}", e); e })?;
    let (cmd, args) = parse_args();
    let fixtures = args.first().map(expand_path).with_context(|| format!("Usage: {}", USAGE))?;
    let region = args.get(1).cloned().with_context(|| format!("Usage: {}", USAGE))?;

    let records = load_fixtures(&fixtures)?;
    println!("Loaded {} lodging records from {}", records.len(), fixtures.display());
    let session = SearchSession::new(config, ConsoleMap::default());
    let controller = Controller::new(session, Arc::new(FixtureSearchProvider::new(records)), Arc::new(StubConverter::default()));

    match cmd.as_str() {
        "search" => {
            let criteria = SearchCriteria::new(region, args.get(2).cloned());
            controller.search(&criteria).await?;
            controller
                .with_session(|s| {
                    if let Some(t) = s.map_mut().take_transition() { s.on_viewport_settled(t); }
                    while s.reveal_more().is_some() {}
                    print_list(s);
                })
                .await;
        }
        "convert" => {
            let id = args.get(2).map(|s| ResultId::parse(s)).with_context(|| format!("Usage: {}", USAGE))?;
            controller.search(&SearchCriteria::new(region, None)).await?;
            controller
                .with_session(|s| -> anyhow::Result<()> {
                    while !s.markers().contains(&id) && s.reveal_more().is_some() {}
                    let transition = s.select_from_list(&id)?;
                    s.on_viewport_settled(transition);
                    Ok(())
                })
                .await?;
            let status = controller.convert(&id).await?;
            println!("Conversion of {} finished: {:?}", id, status);
        }
        _ => { eprintln!("Unknown command: {}", cmd); std::process::exit(1); }
    }

    for event in controller.with_session(|s| s.drain_events()).await { print_event(&event); }
    Ok(())
}

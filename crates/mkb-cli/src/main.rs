//! `mkb` — knowledge base command line
//!
//! Store queries run directly against the filesystem; `research` and
//! `gaps` call the generation API and need `ANTHROPIC_API_KEY`; `serve`
//! runs the HTTP dashboard API together with the background worker.

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use mkb_agents::orchestrator::{DEFAULT_AUDIENCE, DEFAULT_DOC_TYPE};
use mkb_agents::{Maintainer, Orchestrator, Worker, WorkerConfig};
use mkb_generate::{AnthropicConfig, AnthropicGenerator, Generator};
use mkb_server::AppState;
use mkb_store::{Category, IndexBuilder, KnowledgeBase};
use mkb_tasks::{InMemoryTaskRepository, TaskRepository};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

fn cli() -> Command {
    Command::new("mkb")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Midnight/Cardano research knowledge base")
        .arg_required_else_help(true)
        .arg(
            Arg::new("kb-dir")
                .long("kb-dir")
                .global(true)
                .default_value("./knowledge_base")
                .help("Knowledge base root directory"),
        )
        .subcommand(
            Command::new("research")
                .about("Run the research pipeline for a topic")
                .arg(Arg::new("topic").required(true).help("Topic to research"))
                .arg(
                    Arg::new("context")
                        .long("context")
                        .default_value("")
                        .help("Additional context"),
                )
                .arg(
                    Arg::new("source-url")
                        .long("source-url")
                        .default_value("")
                        .help("Source link, if any"),
                ),
        )
        .subcommand(
            Command::new("search")
                .about("Search documents by substring")
                .arg(Arg::new("query").required(true).help("Search text"))
                .arg(
                    Arg::new("category")
                        .long("category")
                        .help("Restrict to one category"),
                ),
        )
        .subcommand(Command::new("index").about("Regenerate INDEX.md"))
        .subcommand(
            Command::new("recent")
                .about("List newest documents")
                .arg(
                    Arg::new("category")
                        .long("category")
                        .help("Restrict to one category"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .default_value("10")
                        .value_parser(value_parser!(usize))
                        .help("Maximum entries"),
                ),
        )
        .subcommand(Command::new("stats").about("Per-category document counts and sizes"))
        .subcommand(
            Command::new("view")
                .about("Print a document")
                .arg(Arg::new("path").required(true).help("Path relative to the store root")),
        )
        .subcommand(Command::new("categories").about("List the category folders"))
        .subcommand(
            Command::new("outdated")
                .about("List documents not modified recently")
                .arg(
                    Arg::new("days")
                        .long("days")
                        .default_value("90")
                        .value_parser(value_parser!(u64))
                        .help("Age threshold in days"),
                ),
        )
        .subcommand(Command::new("gaps").about("Generate a knowledge gap analysis"))
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP API and the background worker")
                .arg(
                    Arg::new("addr")
                        .long("addr")
                        .default_value("127.0.0.1:8080")
                        .help("Listen address"),
                )
                .arg(
                    Arg::new("no-worker")
                        .long("no-worker")
                        .action(ArgAction::SetTrue)
                        .help("Serve the API without the background worker"),
                ),
        )
        .subcommand(Command::new("worker").about("Run only the background worker"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = cli().get_matches();
    let kb_dir = matches
        .get_one::<String>("kb-dir")
        .expect("has a default")
        .clone();
    let kb = KnowledgeBase::open(&kb_dir)
        .with_context(|| format!("cannot open knowledge base at {kb_dir}"))?;

    match matches.subcommand() {
        Some(("research", args)) => research(&kb, args).await,
        Some(("search", args)) => search(&kb, args),
        Some(("index", _)) => {
            let path = IndexBuilder::new(kb).rebuild()?;
            println!("Regenerated {}", path.display());
            Ok(())
        }
        Some(("recent", args)) => recent(&kb, args),
        Some(("stats", _)) => stats(&kb),
        Some(("view", args)) => {
            let path = args.get_one::<String>("path").expect("required");
            println!("{}", kb.get_document(Path::new(path))?);
            Ok(())
        }
        Some(("categories", _)) => {
            for category in Category::ALL {
                println!("{:<16} {}", category.folder(), category.description());
            }
            Ok(())
        }
        Some(("outdated", args)) => {
            let days = *args.get_one::<u64>("days").expect("has a default");
            let paths = kb.outdated(days)?;
            if paths.is_empty() {
                println!("No documents older than {days} days");
            }
            for path in paths {
                println!("{}", path.display());
            }
            Ok(())
        }
        Some(("gaps", _)) => {
            let maintainer = Maintainer::new(kb, generator_from_env()?);
            let path = maintainer.analyze_gaps().await?;
            println!("Gap analysis written to {}", path.display());
            Ok(())
        }
        Some(("serve", args)) => serve(kb, args).await,
        Some(("worker", _)) => worker_only(kb).await,
        _ => Ok(()),
    }
}

fn generator_from_env() -> anyhow::Result<Arc<dyn Generator>> {
    let config = AnthropicConfig::from_env().context("generation API is not configured")?;
    Ok(Arc::new(AnthropicGenerator::new(config)))
}

fn parse_category(args: &ArgMatches) -> anyhow::Result<Option<Category>> {
    args.get_one::<String>("category")
        .map(|c| c.parse::<Category>().map_err(Into::into))
        .transpose()
}

async fn research(kb: &KnowledgeBase, args: &ArgMatches) -> anyhow::Result<()> {
    let topic = args.get_one::<String>("topic").expect("required");
    let context = args.get_one::<String>("context").expect("has a default");
    let source_url = args.get_one::<String>("source-url").expect("has a default");

    let orchestrator = Orchestrator::new(kb.clone(), generator_from_env()?);
    let outcome = orchestrator
        .research_and_document(topic, context, source_url, DEFAULT_DOC_TYPE, DEFAULT_AUDIENCE)
        .await?;

    println!("Research:      {}", outcome.research_path.display());
    println!("Documentation: {}", outcome.documentation_path.display());
    println!("Category:      {}", outcome.category);
    println!("Index:         {}", outcome.index_path.display());
    Ok(())
}

fn search(kb: &KnowledgeBase, args: &ArgMatches) -> anyhow::Result<()> {
    let query = args.get_one::<String>("query").expect("required");
    let category = parse_category(args)?;
    let hits = kb.search_hits(query, category)?;
    if hits.is_empty() {
        println!("No matches for '{query}'");
        return Ok(());
    }
    for hit in hits {
        println!("{}", hit.path.display());
        for line in hit.preview.lines() {
            println!("    {line}");
        }
    }
    Ok(())
}

fn recent(kb: &KnowledgeBase, args: &ArgMatches) -> anyhow::Result<()> {
    let category = parse_category(args)?;
    let limit = *args.get_one::<usize>("limit").expect("has a default");
    for entry in kb.recent(category, limit)? {
        println!(
            "{}  {:>8}  {}",
            entry.modified.format("%Y-%m-%d %H:%M"),
            entry.size,
            entry.path.display()
        );
    }
    Ok(())
}

fn stats(kb: &KnowledgeBase) -> anyhow::Result<()> {
    let stats = kb.stats()?;
    println!("Knowledge Base Statistics");
    println!("=========================");
    for (folder, category) in &stats.categories {
        println!(
            "{:<16} {:>5} documents  {:>10} bytes",
            folder, category.count, category.size_bytes
        );
    }
    println!();
    println!(
        "Total: {} documents, {} bytes",
        stats.total_documents, stats.total_size_bytes
    );
    Ok(())
}

async fn serve(kb: KnowledgeBase, args: &ArgMatches) -> anyhow::Result<()> {
    let addr: SocketAddr = args
        .get_one::<String>("addr")
        .expect("has a default")
        .parse()
        .context("invalid listen address")?;
    let with_worker = !args.get_flag("no-worker");

    let repo: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskRepository::new());
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker_handle = if with_worker {
        let generator = generator_from_env()?;
        let worker = Worker::new(
            kb.clone(),
            Arc::clone(&repo),
            Orchestrator::new(kb.clone(), generator),
            WorkerConfig::default(),
        );
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move { worker.run(rx).await }))
    } else {
        None
    };

    let ctrl_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("shutdown requested");
            let _ = ctrl_tx.send(true);
        }
    });

    mkb_server::serve(AppState::new(kb, repo), addr, shutdown_rx).await?;
    let _ = shutdown_tx.send(true);
    if let Some(handle) = worker_handle {
        handle.await.context("worker task panicked")?;
    }
    Ok(())
}

async fn worker_only(kb: KnowledgeBase) -> anyhow::Result<()> {
    let generator = generator_from_env()?;
    let repo: Arc<dyn TaskRepository> = Arc::new(InMemoryTaskRepository::new());
    let worker = Worker::new(
        kb.clone(),
        Arc::clone(&repo),
        Orchestrator::new(kb, generator),
        WorkerConfig::default(),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });
    worker.run(shutdown_rx).await;
    Ok(())
}

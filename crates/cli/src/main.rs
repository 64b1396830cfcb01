//! `specmark` binary.
//!
//! Drives the catalog and the annotation engine from JSON files: filtering a
//! specification by the saved bookmarks, printing the sidebar trees, running a
//! headless annotation pass and inspecting the persisted state.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use specmark_catalog::{ApiGroup, FilterStats, GroupNode, build_category_tree_with, build_group_tree, filter_by_used_paths};
use specmark_engine::annotate::{BOOKMARK_CLASS, BOOKMARKED_CLASS};
use specmark_engine::{DirectorySource, Engine, EngineConfig, HeadlessView, Slot, ViewTree, load_config, load_documents};
use specmark_primitives::SpecDocument;
use specmark_state::{BookmarkStore, JsonFileStore, KeyValueStore, MemoryStore, ScopedStore, SeenLedger, SidebarLayout};
use tracing::{debug, info};

mod cli;

use cli::{Cli, Command, StateAction, StoreArgs};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_tracing(cli.verbose);

	let config = match &cli.config {
		Some(path) => load_config(path).with_context(|| format!("loading {}", path.display()))?,
		None => EngineConfig::default(),
	};
	debug!(?config, "configuration loaded");

	match cli.command {
		Command::Filter { spec, store, stats } => {
			let spec = read_spec(&spec)?;
			let bookmarks = BookmarkStore::new(open_store(&store, &config)?);
			let filtered = filter_by_used_paths(&spec, bookmarks.saved().as_deref());
			if stats {
				print_json(&FilterStats::between(&spec, &filtered))?;
			} else {
				print_json(&filtered)?;
			}
		}
		Command::Tree {
			spec,
			store,
			filtered,
			json,
		} => {
			let spec = read_spec(&spec)?;
			let backing = open_store(&store, &config)?;
			let saved = BookmarkStore::new(backing.clone()).get_all();
			let spec = if filtered { filter_by_used_paths(&spec, Some(saved.as_slice())) } else { spec };
			let mut tree = build_category_tree_with(&spec, &saved);
			tree.apply_order(&SidebarLayout::new(backing).order());
			if json {
				print_json(&tree)?;
			} else {
				for node in &tree.children {
					println!("{} ({})", node.name, node.children.len());
					for leaf in &node.children {
						let mark = if leaf.bookmarked { "*" } else { " " };
						println!("  {mark} {:<7} {} {}", leaf.method.to_uppercase(), leaf.path, leaf.summary);
					}
				}
			}
		}
		Command::Groups { list, json } => {
			let raw = std::fs::read_to_string(&list).with_context(|| format!("reading {}", list.display()))?;
			let list: Vec<ApiGroup> = serde_json::from_str(&raw).with_context(|| format!("parsing {}", list.display()))?;
			let tree = build_group_tree(&list);
			if json {
				print_json(&tree)?;
			} else {
				print_groups(&tree, 0);
			}
		}
		Command::Annotate { dir, store, now } => annotate(&dir, &store, config, now.unwrap_or_else(Utc::now)).await?,
		Command::Seen { action, store } => {
			let ledger = SeenLedger::new(open_store(&store, &config)?)
				.with_threshold_days(config.seen.threshold_days)
				.with_policy(config.seen.policy);
			match action {
				StateAction::List => {
					for (key, record) in ledger.records() {
						println!("{key}\t{}\t{}", record.category, record.timestamp.to_rfc3339());
					}
				}
				StateAction::Clear => {
					ledger.clear();
					info!("seen ledger cleared");
				}
			}
		}
		Command::Bookmarks { action, store } => {
			let bookmarks = BookmarkStore::new(open_store(&store, &config)?);
			match action {
				StateAction::List => print_json(&bookmarks.get_all())?,
				StateAction::Clear => {
					bookmarks.clear();
					info!("bookmark list cleared");
				}
			}
		}
	}

	Ok(())
}

async fn annotate(dir: &Path, store: &StoreArgs, config: EngineConfig, now: chrono::DateTime<Utc>) -> Result<()> {
	let loaded = load_documents(&DirectorySource::new(dir))
		.await
		.with_context(|| format!("loading documents from {}", dir.display()))?;
	let store = open_store(store, &config)?;
	let mut view = HeadlessView::render(&loaded.spec);
	let mut engine = Engine::with_default_annotators(loaded.spec, loaded.documents, store, config);

	let report = engine.apply_all_at(&mut view, now);
	for failure in &report.failures {
		eprintln!("{} failed on {}: {}", failure.annotator, failure.key, failure.error);
	}

	for block in view.operation_blocks() {
		let label = |slot| view.slot(block, slot).and_then(|node| view.text(node)).unwrap_or_default();
		let (method, path) = (label(Slot::Method), label(Slot::Path));
		let mut marks: Vec<String> = view
			.slot(block, Slot::DescriptionWrapper)
			.map(|wrapper| view.descendants(wrapper))
			.unwrap_or_default()
			.into_iter()
			.filter_map(|badge| view.text(badge))
			.collect();
		if let Some(control) = view.find_by_class(block, BOOKMARK_CLASS)
			&& view.has_class(control, BOOKMARKED_CLASS)
		{
			marks.push("bookmarked".to_string());
		}
		println!("{method:<7} {path}\t[{}]", marks.join(", "));
		let description = label(Slot::DescriptionBody);
		if !description.is_empty() {
			println!("        {description}");
		}
	}
	println!(
		"NEW API: {} ({} correlated, {} skipped)",
		engine.new_api_count(&view),
		report.correlated,
		report.skipped
	);
	Ok(())
}

fn open_store(args: &StoreArgs, config: &EngineConfig) -> Result<Arc<dyn KeyValueStore>> {
	let scope = config.storage.scope.clone();
	let store: Arc<dyn KeyValueStore> = match &args.store {
		Some(path) => {
			let file = JsonFileStore::open(path).with_context(|| format!("opening store {}", path.display()))?;
			Arc::new(ScopedStore::new(file, scope))
		}
		None => Arc::new(ScopedStore::new(MemoryStore::new(), scope)),
	};
	Ok(store)
}

fn read_spec(path: &Path) -> Result<SpecDocument> {
	let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
	serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

fn print_groups(nodes: &[GroupNode], depth: usize) {
	for node in nodes {
		println!("{:indent$}{} ({})", "", node.display_name, node.group, indent = depth * 2);
		print_groups(&node.children, depth + 1);
	}
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;

	let filter = EnvFilter::try_from_env("SPECMARK_LOG")
		.or_else(|_| EnvFilter::try_from_default_env())
		.unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("specmark=debug,info")
			} else {
				EnvFilter::new("specmark=info,warn")
			}
		});

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

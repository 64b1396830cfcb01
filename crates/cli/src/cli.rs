use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "specmark")]
#[command(about = "Annotate, filter and browse API specifications")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Engine configuration (TOML); defaults apply when absent
	#[arg(long, short = 'c', global = true, value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Verbose logging
	#[arg(long, short = 'v', global = true)]
	pub verbose: bool,

	#[command(subcommand)]
	pub command: Command,
}

/// Persisted state shared by the subcommands.
#[derive(Args, Debug, Clone)]
pub struct StoreArgs {
	/// JSON file holding the persisted state; in-memory when omitted
	#[arg(long, short = 's', value_name = "PATH")]
	pub store: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Print the specification reduced to the bookmarked operations
	Filter {
		#[arg(long, value_name = "PATH")]
		spec: PathBuf,
		#[command(flatten)]
		store: StoreArgs,
		/// Print size statistics instead of the document
		#[arg(long)]
		stats: bool,
	},
	/// Print the category tree
	Tree {
		#[arg(long, value_name = "PATH")]
		spec: PathBuf,
		#[command(flatten)]
		store: StoreArgs,
		/// Build the tree from the bookmarked operations only
		#[arg(long)]
		filtered: bool,
		#[arg(long)]
		json: bool,
	},
	/// Print the grouped-document hierarchy
	Groups {
		/// Grouped-document list (`[{group, displayName}]`)
		#[arg(long, value_name = "PATH")]
		list: PathBuf,
		#[arg(long)]
		json: bool,
	},
	/// Render a document directory headlessly and run one annotation pass
	Annotate {
		/// Directory with spec.json, status.json and created.json
		#[arg(long, value_name = "DIR")]
		dir: PathBuf,
		#[command(flatten)]
		store: StoreArgs,
		/// Evaluate dates at this instant instead of now (RFC 3339)
		#[arg(long, value_name = "TIME")]
		now: Option<DateTime<Utc>>,
	},
	/// Inspect or clear dismissal records
	Seen {
		#[command(subcommand)]
		action: StateAction,
		#[command(flatten)]
		store: StoreArgs,
	},
	/// Inspect or clear the bookmark list
	Bookmarks {
		#[command(subcommand)]
		action: StateAction,
		#[command(flatten)]
		store: StoreArgs,
	},
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
	List,
	Clear,
}

#[cfg(test)]
mod tests {
	use clap::CommandFactory;

	use super::*;

	#[test]
	fn command_definition_is_consistent() {
		Cli::command().debug_assert();
	}

	#[test]
	fn state_subcommands_take_a_store() {
		let cli = Cli::try_parse_from(["specmark", "seen", "--store", "state.json", "clear"]).unwrap();
		let Command::Seen { action, store } = cli.command else {
			panic!("expected seen");
		};
		assert_eq!(action, StateAction::Clear);
		assert_eq!(store.store, Some(PathBuf::from("state.json")));
	}

	#[test]
	fn annotate_accepts_a_fixed_instant() {
		let cli = Cli::try_parse_from(["specmark", "-v", "annotate", "--dir", "docs", "--now", "2025-04-10T09:30:00Z"]).unwrap();
		assert!(cli.verbose);
		let Command::Annotate { now, .. } = cli.command else {
			panic!("expected annotate");
		};
		assert_eq!(now.map(|t| t.to_rfc3339()).as_deref(), Some("2025-04-10T09:30:00+00:00"));
	}
}

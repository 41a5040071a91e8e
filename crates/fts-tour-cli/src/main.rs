//! fts-tour - runs the full-text search walkthroughs from a terminal.
//!
//! Narration goes to stdout, logs go to stderr.

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use fts_tour_core::config::AppConfig;
use fts_tour_core::{
    parse_user_query, FtsConfig, FtsModule, Narrator, SqliteWalkthrough, TourOptions,
};
use std::path::PathBuf;
use tracing::{debug, info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "fts-tour")]
#[command(about = "Walkthroughs of SQLite FTS4 and MongoDB text search")]
struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// SQLite database location (":memory:" keeps it in memory)
    #[arg(long, global = true, default_value = ":memory:")]
    database: PathBuf,

    /// Full-text extension for the virtual table (fts3 or fts4)
    #[arg(long, global = true, default_value = "fts4")]
    fts_module: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the SQLite walkthrough (default)
    Sqlite,

    /// Search the sample data; prefix a word with '-' to exclude it
    Search {
        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// Words to search for
        #[arg(required = true, allow_hyphen_values = true)]
        terms: Vec<String>,
    },

    /// Run the MongoDB text index walkthrough
    #[cfg(feature = "mongo")]
    Mongo {
        /// Connection string (defaults to $FTS_TOUR_MONGO_URI, then localhost)
        #[arg(long)]
        mongo_uri: Option<String>,

        /// Word to search for (defaults to "stuff")
        #[arg(long)]
        search: Option<String>,
    },
}

fn init_logging(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();
}

fn tour_options(args: &Args) -> Result<TourOptions> {
    let module: FtsModule = args.fts_module.parse()?;
    Ok(TourOptions {
        database: args.database.clone(),
        fts: FtsConfig {
            module,
            ..FtsConfig::default()
        },
    })
}

fn run_search(options: TourOptions, terms: &[String], json: bool) -> Result<()> {
    print!("{}", render_search(options, terms, json)?);
    Ok(())
}

fn render_search(options: TourOptions, terms: &[String], json: bool) -> Result<String> {
    let input = terms.join(" ");
    let Some(query) = parse_user_query(&input) else {
        bail!("nothing to search for in '{}'", input);
    };
    debug!("Search input '{}' became [{}]", input, query);

    let store = SqliteWalkthrough::new(options).prepare()?;
    let result = store.search(&query)?;

    if json {
        Ok(format!("{}\n", serde_json::to_string_pretty(&result)?))
    } else {
        let mut narrator = Narrator::new(Vec::new());
        narrator.rows(&result)?;
        Ok(String::from_utf8(narrator.into_inner())?)
    }
}

#[cfg(feature = "mongo")]
async fn run_mongo(uri: Option<String>, search: Option<String>) -> Result<()> {
    use fts_tour_core::config::MongoConfig;
    use fts_tour_core::{MongoOptions, MongoWalkthrough};

    let uri = uri
        .or_else(|| std::env::var(MongoConfig::URI_ENV).ok())
        .unwrap_or_else(|| MongoConfig::DEFAULT_URI.to_string());
    let defaults = MongoOptions::default();
    let options = MongoOptions {
        uri,
        search: search.unwrap_or_else(|| defaults.search.clone()),
        ..defaults
    };

    MongoWalkthrough::new(options).run(std::io::stdout()).await?;
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);

    info!("Starting {}", AppConfig::APP_NAME);
    let options = tour_options(&args)?;

    match args.command {
        None | Some(Command::Sqlite) => {
            let report = SqliteWalkthrough::new(options).run(std::io::stdout().lock())?;
            debug!(
                "Walkthrough report: {} imported, {} index rows",
                report.imported, report.stats.row_count
            );
        }
        Some(Command::Search { json, terms }) => run_search(options, &terms, json)?,
        #[cfg(feature = "mongo")]
        Some(Command::Mongo { mongo_uri, search }) => run_mongo(mongo_uri, search).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_in_memory_fts4() {
        let args = Args::parse_from(["fts-tour"]);
        assert!(args.command.is_none());

        let options = tour_options(&args).unwrap();
        assert_eq!(options.database, PathBuf::from(":memory:"));
        assert_eq!(options.fts.module, FtsModule::Fts4);
    }

    #[test]
    fn test_search_accepts_exclusions() {
        let args = Args::parse_from(["fts-tour", "search", "king", "-neva"]);
        match args.command {
            Some(Command::Search { terms, json }) => {
                assert_eq!(terms, vec!["king", "-neva"]);
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_module() {
        let args = Args::parse_from(["fts-tour", "--fts-module", "fts5"]);
        assert!(tour_options(&args).is_err());
    }

    #[test]
    fn test_search_with_only_exclusions_fails() {
        let err = run_search(TourOptions::default(), &["-neva".to_string()], true).unwrap_err();
        assert!(err.to_string().contains("nothing to search for"));
    }

    #[test]
    fn test_search_json_output() {
        let terms = vec!["king".to_string(), "-neva".to_string()];
        let output = render_search(TourOptions::default(), &terms, true).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["query"], "king* NOT neva*");
        assert!(value["totalCount"].as_u64().unwrap() > 0);

        let names: Vec<&str> = value["rows"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|row| row["fullName"].as_str())
            .collect();
        assert!(names.contains(&"Dillan King"));
        assert!(!names.contains(&"Neva King"));
    }

    #[test]
    fn test_search_text_output() {
        let terms = vec!["arden".to_string()];
        let output = render_search(TourOptions::default(), &terms, false).unwrap();
        assert!(output.contains("  - Arden Wolf (Schambergerside)"));
        assert!(output.contains("2 row(s) for [arden*]"));
    }

    #[cfg(feature = "mongo")]
    #[test]
    fn test_mongo_search_is_optional() {
        let args = Args::parse_from(["fts-tour", "mongo"]);
        match args.command {
            Some(Command::Mongo { search, mongo_uri }) => {
                assert!(search.is_none());
                assert!(mongo_uri.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}

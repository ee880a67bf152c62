//! rowdb CLI
//!
//! Inspect and edit a collection from the command line. The schema is not
//! stored with the data, so it must be passed on every invocation.

use clap::{Parser, Subcommand};
use rowdb::{id, Collection, CollectionConfig, Patch, Query, RowDbError, RowId, Schema, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// rowdb CLI
#[derive(Parser, Debug)]
#[command(name = "rowdb")]
#[command(about = "Embedded fixed-width record store")]
#[command(version)]
struct Args {
    /// Collection directory
    #[arg(short, long, default_value = "./rowdb_data")]
    dir: String,

    /// Schema, e.g. "created:datetime,username:inline(255)"
    #[arg(short, long)]
    schema: Option<String>,

    /// Use surrogate string ids instead of row indexes
    #[arg(long)]
    string_ids: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every row as JSON
    Dump,

    /// Print one row by id
    Get {
        /// Row index, or surrogate id with --string-ids
        id: String,
    },

    /// Print rows matching all COL=VALUE filters
    Find {
        filters: Vec<String>,
    },

    /// Insert a row from COL=VALUE pairs
    Insert {
        values: Vec<String>,
    },

    /// Rewrite rows matching the filters
    Update {
        filters: Vec<String>,

        /// COL=VALUE assignments
        #[arg(long = "set", required = true)]
        set: Vec<String>,

        /// Only rewrite the first match
        #[arg(long)]
        one: bool,
    },

    /// Encode a row index as a surrogate id
    IdEncode {
        index: u64,
    },

    /// Decode a surrogate id into a row index
    IdDecode {
        id: String,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rowdb=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> rowdb::Result<()> {
    let Args {
        dir,
        schema,
        string_ids,
        command,
    } = args;
    let open = || open_collection(&dir, schema.as_deref(), string_ids);

    match command {
        Commands::IdEncode { index } => println!("{}", id::encode(index)),
        Commands::IdDecode { id: text } => println!("{}", id::decode(&text)?),
        Commands::Dump => {
            let collection = open()?;
            for record in collection.all(&Query::all())? {
                println!("{}", record?.to_json());
            }
        }
        Commands::Get { id } => {
            let collection = open()?;
            let id = if string_ids {
                RowId::Surrogate(id)
            } else {
                RowId::Index(id.parse().map_err(|_| RowDbError::InvalidId(id.clone()))?)
            };
            println!("{}", collection.by_id(id)?.to_json());
        }
        Commands::Find { filters } => {
            let collection = open()?;
            let query: Query = parse_pairs(&collection, &filters)?.into_iter().collect();
            for record in collection.all(&query)? {
                println!("{}", record?.to_json());
            }
        }
        Commands::Insert { values } => {
            let collection = open()?;
            let id = collection.insert(parse_pairs(&collection, &values)?)?;
            collection.sync()?;
            println!("{}", id);
        }
        Commands::Update { filters, set, one } => {
            let collection = open()?;
            let query: Query = parse_pairs(&collection, &filters)?.into_iter().collect();
            let patch: Patch = parse_pairs(&collection, &set)?.into_iter().collect();

            let updated = if one {
                collection.update_one(&query, &patch)?.into_iter().collect()
            } else {
                collection.update(&query, &patch)?
            };
            collection.sync()?;

            tracing::info!("updated {} rows", updated.len());
            for id in updated {
                println!("{}", id);
            }
        }
    }

    Ok(())
}

fn open_collection(dir: &str, schema: Option<&str>, string_ids: bool) -> rowdb::Result<Collection> {
    let schema: Schema = schema
        .ok_or_else(|| RowDbError::Config("--schema is required".to_string()))?
        .parse()?;

    let config = CollectionConfig::builder()
        .dir(dir)
        .string_ids(string_ids)
        .build();
    Collection::open(config, schema)
}

/// Parse `COL=VALUE` arguments using each column's field type
fn parse_pairs(collection: &Collection, pairs: &[String]) -> rowdb::Result<Vec<(String, Value)>> {
    pairs
        .iter()
        .map(|pair| {
            let (column, raw) = pair
                .split_once('=')
                .ok_or_else(|| RowDbError::Config(format!("expected COL=VALUE, got {:?}", pair)))?;
            let field = collection
                .schema()
                .field(column)
                .ok_or_else(|| RowDbError::UnknownColumn(column.to_string()))?;
            Ok((column.to_string(), field.parse_value(raw)?))
        })
        .collect()
}

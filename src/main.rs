//! Graph Template CLI
//!
//! Usage:
//!   graph-template --library <FILE> expand <GRAPH> [-a KEY=VALUE ...]
//!   graph-template --library <FILE> list [FILTER]
//!   graph-template --library <FILE> check
//!
//! Filters accept `glob:` and `regexp:` prefixes; anything else matches
//! names and aliases literally.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use graph_template::{template, AttributeMap, Error, Filter, Graph, Library};

#[derive(Parser)]
#[command(name = "graph-template")]
#[command(about = "Resolve and expand metrics graph templates")]
struct Cli {
    /// Library file declaring graphs (TOML, or JSON with a .json extension)
    #[arg(short, long)]
    library: PathBuf,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Expand a graph and print it as JSON
    Expand {
        /// Graph identifier or alias
        graph: String,

        /// Extra attribute overriding the graph's own (repeatable)
        #[arg(short, long = "attr", value_name = "KEY=VALUE", value_parser = parse_attribute)]
        attrs: Vec<(String, String)>,
    },

    /// List graphs, optionally filtered by name or alias
    List {
        /// Literal, glob:PATTERN or regexp:PATTERN
        filter: Option<String>,
    },

    /// Validate series and template links of every graph
    Check,
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let library = match Library::from_file(&cli.library) {
        Ok(library) => library,
        Err(e) => {
            eprintln!("Error loading library '{}': {}", cli.library.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Command::Expand { graph, attrs } => {
            let attrs: AttributeMap = attrs.into_iter().collect();
            expand(&library, &graph, &attrs).map_err(|e| (format!("graph {}", graph), e))
        }
        Command::List { filter } => list(&library, filter.as_deref()).map_err(|e| (String::new(), e)),
        Command::Check => check(&library).map_err(|e| (String::new(), e)),
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err((context, e)) => {
            eprintln!("{}", e.format(&context));
            ExitCode::FAILURE
        }
    }
}

fn expand(library: &Library, key: &str, attrs: &AttributeMap) -> Result<bool, Error> {
    let graph = library.expand(key, attrs)?;
    match serde_json::to_string_pretty(&graph) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing graph: {}", e);
            return Ok(false);
        }
    }
    Ok(true)
}

fn list(library: &Library, filter: Option<&str>) -> Result<bool, Error> {
    let graphs = match filter {
        Some(raw) => library.list(&Filter::parse(raw))?,
        None => library.all()?,
    };

    for graph in graphs {
        let kind = if graph.template { "  [template]" } else { "" };
        println!("{}\t{}{}", graph.id, graph.name, kind);
    }
    Ok(true)
}

/// Report graph problems; returns false when any were found
fn check(library: &Library) -> Result<bool, Error> {
    let mut ok = true;

    for graph in library.all()? {
        for series in graph.invalid_series() {
            println!("{}: invalid series {}", graph.id, series);
            ok = false;
        }

        if let Err(e) = library.link_target(&graph) {
            println!("{}: broken template link: {}", graph.id, e);
            ok = false;
        }

        for (field, text) in templated_fields(&graph) {
            if let Err(e) = template::referenced_attributes(&text) {
                println!("{}", e.format(&format!("{} {}", graph.id, field)));
                ok = false;
            }
        }
    }

    if ok {
        println!("library OK");
    }
    Ok(ok)
}

/// Every string field expansion touches, labelled for diagnostics
fn templated_fields(graph: &Graph) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    if let Some(title) = graph.options.get_str("title") {
        fields.push(("options.title".to_string(), title.to_string()));
    }
    for (g, group) in graph.groups.iter().enumerate() {
        for (s, series) in group.series.iter().enumerate() {
            for (name, value) in [
                ("name", &series.name),
                ("origin", &series.origin),
                ("source", &series.source),
                ("metric", &series.metric),
            ] {
                fields.push((format!("groups[{}].series[{}].{}", g, s, name), value.clone()));
            }
        }
    }
    fields
}

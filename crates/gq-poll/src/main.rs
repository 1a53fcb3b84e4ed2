use anyhow::{bail, Context as _};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use gq_core::{
    ClientConfig, Contracts, Correlations, DatasetKind, Entities, Exposures, Query, Threats,
};
use gq_export::{render, write_export, ExportFormat, Tabular};
use gq_poll::{
    DatasetViewState, Fetcher, HttpFetcher, PollController, SessionRegistry,
    SharedGenerator, TickOutcome,
};
use gq_store::{FileBackend, InvestigationKind, InvestigationRepository, SavedInvestigation};
use gq_synth::{FixtureGenerator, SynthParams, Synthesize};
use gq_validate::Validate;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Shared clients for one invocation
struct Context {
    config: ClientConfig,
    fetcher: Arc<dyn Fetcher>,
    generator: SharedGenerator,
}

/// Run `$run::<D>(args..)` for the dataset named by `$kind`
macro_rules! for_dataset {
    ($kind:expr, $run:ident ( $($arg:expr),* $(,)? )) => {
        match $kind {
            DatasetKind::Entities => $run::<Entities>($($arg),*).await,
            DatasetKind::Correlation => $run::<Correlations>($($arg),*).await,
            DatasetKind::Threats => $run::<Threats>($($arg),*).await,
            DatasetKind::Exposures => $run::<Exposures>($($arg),*).await,
            DatasetKind::Contracts => $run::<Contracts>($($arg),*).await,
        }
    };
}

fn cli() -> Command {
    Command::new("gq-dash")
        .version(gq_poll::VERSION)
        .about("GhostQuant dashboard data client")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file (defaults to environment variables)"),
        )
        .arg(
            Arg::new("api-base")
                .long("api-base")
                .global(true)
                .help("Override the API base URL"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .global(true)
                .value_parser(value_parser!(u64))
                .help("Seed for synthetic fallback data"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(Command::new("datasets").about("List dashboard datasets and their endpoints"))
        .subcommand(
            Command::new("watch")
                .about("Poll a dataset and print each committed snapshot")
                .arg(dataset_arg())
                .arg(
                    Arg::new("ticks")
                        .long("ticks")
                        .value_parser(value_parser!(usize))
                        .help("Stop after this many commits (default: until Ctrl-C)"),
                )
                .args(query_args()),
        )
        .subcommand(
            Command::new("fetch")
                .about("Fetch a dataset once and export it")
                .arg(dataset_arg())
                .arg(
                    Arg::new("format")
                        .long("format")
                        .default_value("json")
                        .value_parser(value_parser!(ExportFormat))
                        .help("json, csv, markdown or html"),
                )
                .arg(
                    Arg::new("out")
                        .long("out")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write a timestamped file into this directory instead of stdout"),
                )
                .args(query_args()),
        )
        .subcommand(
            Command::new("investigations")
                .about("Manage saved investigations")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List saved investigations"))
                .subcommand(
                    Command::new("add")
                        .about("Save a new investigation")
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("target").long("target").required(true))
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .default_value("entity")
                                .value_parser(value_parser!(InvestigationKind)),
                        )
                        .arg(Arg::new("notes").long("notes"))
                        .arg(Arg::new("tag").long("tag").action(ArgAction::Append)),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete an investigation by id")
                        .arg(Arg::new("id").required(true)),
                )
                .subcommand(Command::new("clear").about("Delete every saved investigation")),
        )
}

fn dataset_arg() -> Arg {
    Arg::new("dataset")
        .required(true)
        .value_parser(value_parser!(DatasetKind))
        .help("entities, correlation, threats, exposures or contracts")
}

fn query_args() -> [Arg; 7] {
    [
        Arg::new("strength").long("strength"),
        Arg::new("timeframe").long("timeframe"),
        Arg::new("chain").long("chain"),
        Arg::new("status").long("status"),
        Arg::new("severity").long("severity"),
        Arg::new("limit").long("limit").value_parser(value_parser!(u32)),
        Arg::new("offset").long("offset").value_parser(value_parser!(u32)),
    ]
}

fn query_from(args: &ArgMatches) -> Query {
    let mut query = Query::new();
    if let Some(v) = args.get_one::<String>("strength") {
        query = query.with_strength(v);
    }
    if let Some(v) = args.get_one::<String>("timeframe") {
        query = query.with_timeframe(v);
    }
    if let Some(v) = args.get_one::<String>("chain") {
        query = query.with_chain(v);
    }
    if let Some(v) = args.get_one::<String>("status") {
        query = query.with_status(v);
    }
    if let Some(v) = args.get_one::<String>("severity") {
        query = query.with_severity(v);
    }
    if let Some(&v) = args.get_one::<u32>("limit") {
        query = query.with_limit(v);
    }
    if let Some(&v) = args.get_one::<u32>("offset") {
        query = query.with_offset(v);
    }
    query
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<ClientConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ClientConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ClientConfig::from_env().context("reading configuration from environment")?,
    };
    if let Some(base) = matches.get_one::<String>("api-base") {
        config = config.with_api_base(base);
    }
    config.validate()?;
    Ok(config)
}

fn build_context(matches: &ArgMatches, config: ClientConfig) -> anyhow::Result<Context> {
    let fetcher: Arc<dyn Fetcher> = Arc::new(HttpFetcher::new(&config)?);
    let generator = match matches.get_one::<u64>("seed") {
        Some(seed) => FixtureGenerator::seeded(*seed),
        None => FixtureGenerator::new(),
    }
    .with_params(SynthParams::new(config.synthetic_count));

    Ok(Context {
        config,
        fetcher,
        generator: Arc::new(Mutex::new(generator)),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("json-logs"));

    let config = load_config(&matches)?;

    match matches.subcommand() {
        Some(("datasets", _)) => {
            print_datasets(&config);
            Ok(())
        }
        Some(("watch", args)) => {
            let ctx = build_context(&matches, config)?;
            let kind = *args.get_one::<DatasetKind>("dataset").unwrap();
            let ticks = args.get_one::<usize>("ticks").copied();
            for_dataset!(kind, watch(&ctx, query_from(args), ticks))
        }
        Some(("fetch", args)) => {
            let ctx = build_context(&matches, config)?;
            let kind = *args.get_one::<DatasetKind>("dataset").unwrap();
            let format = *args.get_one::<ExportFormat>("format").unwrap();
            let out = args.get_one::<PathBuf>("out").cloned();
            for_dataset!(kind, fetch_once(&ctx, query_from(args), format, out))
        }
        Some(("investigations", args)) => investigations(&config, args),
        _ => unreachable!("subcommand_required"),
    }
}

fn print_datasets(config: &ClientConfig) {
    println!("{:<12} {:<32} {:<10} {:>8}", "DATASET", "ENDPOINT", "KEY", "INTERVAL");
    for kind in DatasetKind::ALL {
        println!(
            "{:<12} {:<32} {:<10} {:>7}s",
            kind.as_str(),
            kind.endpoint(),
            kind.array_key(),
            config.poll_interval_for(kind).as_secs()
        );
    }
    println!();
    println!("API base: {}", config.api_base);
}

fn print_state<D: Validate + Synthesize>(state: &DatasetViewState<D>) -> anyhow::Result<()> {
    let status = state.status.map_or("pending", |s| s.as_str());
    let Some(snapshot) = state.snapshot.as_ref() else {
        println!("[{status}] no data: {}", state.last_error.as_deref().unwrap_or("-"));
        return Ok(());
    };

    println!(
        "[{status}] {} {} records at {} metrics={}",
        D::KIND,
        snapshot.len(),
        snapshot.timestamp.format("%H:%M:%S"),
        serde_json::to_string(&snapshot.metrics)?
    );
    if let Some(error) = state.last_error.as_deref() {
        println!("  last error: {error}");
    }
    Ok(())
}

async fn watch<D>(ctx: &Context, query: Query, ticks: Option<usize>) -> anyhow::Result<()>
where
    D: Validate + Synthesize,
{
    let controller = Arc::new(
        PollController::<D>::new(&ctx.config, Arc::clone(&ctx.fetcher), Arc::clone(&ctx.generator))
            .with_query(query),
    );
    let mut rx = controller.subscribe();

    let registry = SessionRegistry::new();
    registry.mount(Arc::clone(&controller).spawn());

    let mut last_generation = 0;
    let mut commits = 0usize;
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = rx.borrow_and_update().clone();
                if state.generation == last_generation {
                    continue;
                }
                last_generation = state.generation;
                print_state::<D>(&state)?;

                commits += 1;
                if ticks.is_some_and(|n| commits >= n) {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }

    registry.unmount_all();
    Ok(())
}

async fn fetch_once<D>(
    ctx: &Context,
    query: Query,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> anyhow::Result<()>
where
    D: Validate + Synthesize,
    D::Record: Tabular,
{
    let controller =
        PollController::<D>::new(&ctx.config, Arc::clone(&ctx.fetcher), Arc::clone(&ctx.generator))
            .with_query(query);

    let outcome = controller.tick().await;
    let state = controller.current();
    if outcome != TickOutcome::Live {
        warn!(
            dataset = %D::KIND,
            status = state.status.map_or("pending", |s| s.as_str()),
            error = state.last_error.as_deref().unwrap_or("-"),
            "backend unavailable"
        );
    }

    let snapshot = state
        .snapshot
        .with_context(|| format!("no {} data available", D::KIND))?;

    match out {
        Some(dir) => {
            let path = write_export(&dir, D::KIND, snapshot.as_ref(), format)?;
            println!("{}", path.display());
        }
        None => print!("{}", render(D::KIND, snapshot.as_ref(), format)?),
    }
    Ok(())
}

fn investigations(config: &ClientConfig, args: &ArgMatches) -> anyhow::Result<()> {
    let repo = InvestigationRepository::new(FileBackend::new(&config.storage_dir));

    match args.subcommand() {
        Some(("list", _)) => {
            let items = repo.list()?;
            if items.is_empty() {
                println!("No saved investigations.");
            }
            for inv in items {
                println!(
                    "{}  {:<8} {:<32} {}  (updated {})",
                    inv.id,
                    inv.kind,
                    inv.title,
                    inv.target,
                    inv.updated_at.format("%Y-%m-%d %H:%M")
                );
                if !inv.tags.is_empty() {
                    println!("    tags: {}", inv.tags.join(", "));
                }
            }
        }
        Some(("add", sub)) => {
            let title = sub.get_one::<String>("title").unwrap();
            let target = sub.get_one::<String>("target").unwrap();
            let kind = sub.get_one::<InvestigationKind>("kind").cloned().unwrap();
            let mut investigation = SavedInvestigation::new(title, target, kind);
            if let Some(notes) = sub.get_one::<String>("notes") {
                investigation = investigation.with_notes(notes);
            }
            if let Some(tags) = sub.get_many::<String>("tag") {
                investigation = investigation.with_tags(tags.cloned());
            }
            let saved = repo.save(investigation)?;
            println!("{}", saved.id);
        }
        Some(("delete", sub)) => {
            let id = sub.get_one::<String>("id").unwrap();
            if !repo.delete(id)? {
                bail!("no saved investigation with id {id}");
            }
            println!("Deleted {id}.");
        }
        Some(("clear", _)) => {
            repo.clear()?;
            println!("Cleared saved investigations.");
        }
        _ => unreachable!("subcommand_required"),
    }
    Ok(())
}

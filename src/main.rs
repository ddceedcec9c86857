//! ban-watch - Game account roster and ban tracker
//!
//! CLI over the roster document: list, edit and delete accounts, and run
//! reconciliation passes against the remote ban-status and rank services.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::{mpsc::UnboundedReceiver, watch};
use tracing_subscriber::EnvFilter;

use ban_watch::adapters::{
    ChannelNotifier, HttpRankService, HttpStatusService, JsonFileStore, RankServiceConfig,
    StatusServiceConfig, SystemClock,
};
use ban_watch::application::{
    DeleteAccountCommand, DeleteAccountHandler, EngineConfig, ReconciliationEngine, Roster,
    SaveAccountCommand, SaveAccountHandler, Scheduler, SchedulerConfig, SetSeasonCommand,
    SetSeasonHandler, TriggerOutcome,
};
use ban_watch::config::AppConfig;
use ban_watch::domain::account::{
    reconcile, sorted_view, AccountRecord, BanForm, Credential, DurationPreset, FormEvent,
    ModeRank, RankSlot, RankTier, SortKey,
};
use ban_watch::domain::reconciliation::ReconcileEvent;
use ban_watch::ports::{AccountDocumentStore, Clock};

/// ban-watch - Game account roster and ban tracker
#[derive(Parser, Debug)]
#[command(name = "ban-watch")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Roster document (overrides BAN_WATCH__STORAGE__DATA_FILE)
    #[arg(short, long)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List accounts with roster counts
    #[command(alias = "ls")]
    List {
        /// Column to order by (tpp, fpp, status, unban)
        #[arg(short, long)]
        sort: Option<SortKey>,

        /// Reverse the order
        #[arg(short, long)]
        reverse: bool,
    },

    /// Create an account, or update the one at --index
    Save(SaveArgs),

    /// Delete the account at INDEX
    Delete {
        index: usize,
    },

    /// Show the ranked season, or set it
    Season {
        season: Option<u32>,
    },

    /// Run one reconciliation pass now
    Sync,

    /// Run a startup pass, then periodic passes until Ctrl-C
    Watch,
}

#[derive(clap::Args, Debug)]
struct SaveArgs {
    /// Index of the account to update; omit to create
    #[arg(short, long)]
    index: Option<usize>,

    #[arg(short, long)]
    name: String,

    #[arg(long)]
    password: Option<String>,

    #[arg(long)]
    phone: Option<String>,

    /// Remote player id used for ban-status lookups ("" clears it)
    #[arg(long)]
    player_id: Option<String>,

    /// TPP rank label, e.g. 黄金2
    #[arg(long)]
    tpp_rank: Option<RankTier>,

    #[arg(long)]
    tpp_points: Option<u32>,

    /// FPP rank label, e.g. 铂金5
    #[arg(long)]
    fpp_rank: Option<RankTier>,

    #[arg(long)]
    fpp_points: Option<u32>,

    /// Mark banned
    #[arg(long, conflicts_with = "unban")]
    ban: bool,

    /// Clear the ban
    #[arg(long)]
    unban: bool,

    /// Ban duration (none, 24h, 72h, 7d, 15d, 30d, chase3d, custom)
    #[arg(long)]
    preset: Option<DurationPreset>,

    /// Unban time, "YYYY-MM-DD HH:MM:SS"
    #[arg(long)]
    unban_time: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(path) = cli.data_file {
        config.storage.data_file = path;
    }
    config.validate().context("Invalid configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store: Arc<dyn AccountDocumentStore> =
        Arc::new(JsonFileStore::new(&config.storage.data_file));
    let roster = Arc::new(Roster::load(store.as_ref()).await?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    match cli.command {
        Commands::List { sort, reverse } => list(&roster, sort, reverse).await,
        Commands::Save(args) => save(args, roster, store, clock).await,
        Commands::Delete { index } => {
            let removed = DeleteAccountHandler::new(roster.clone(), store)
                .handle(DeleteAccountCommand { index })
                .await?;
            println!("Deleted {}", removed.name());
            Ok(())
        }
        Commands::Season { season: None } => {
            println!("Season {}", roster.season().await);
            Ok(())
        }
        Commands::Season {
            season: Some(season),
        } => {
            SetSeasonHandler::new(roster, store)
                .handle(SetSeasonCommand { season })
                .await?;
            println!("Season set to {}", season);
            Ok(())
        }
        Commands::Sync => sync(&config, roster, store, clock).await,
        Commands::Watch => watch_loop(&config, roster, store, clock).await,
    }
}

async fn list(roster: &Roster, sort: Option<SortKey>, reverse: bool) -> Result<()> {
    let records = roster.snapshot_all().await;
    println!("{}", roster.stats().await);
    for (index, record) in sorted_view(&records, sort, reverse) {
        println!("{}", format_row(index, record));
    }
    Ok(())
}

fn format_row(index: usize, record: &AccountRecord) -> String {
    let status = if record.is_banned() { "❌" } else { "✅" };
    format!(
        "{:>3}  {:<16} FPP {:<12} TPP {:<12} {} {:<19} lv {:<5} {}",
        index,
        record.name(),
        record.rank(RankSlot::Fpp),
        record.rank(RankSlot::Tpp),
        status,
        record.unban_at(),
        record.level(),
        record.phone()
    )
}

async fn save(
    args: SaveArgs,
    roster: Arc<Roster>,
    store: Arc<dyn AccountDocumentStore>,
    clock: Arc<dyn Clock>,
) -> Result<()> {
    let now = clock.now();
    let existing = match args.index {
        Some(index) => match roster.get(index).await {
            Some(record) => Some(record),
            None => bail!("No account at index {}", index),
        },
        None => None,
    };

    // Edits go through the form in field order.
    let mut form = match &existing {
        Some(record) => reconcile(BanForm::default(), FormEvent::Loaded(record), now),
        None => BanForm::default(),
    };
    if args.ban && !form.banned {
        form = reconcile(form, FormEvent::StatusToggled(true), now);
    }
    if args.unban {
        form = reconcile(form, FormEvent::StatusToggled(false), now);
    }
    if let Some(preset) = args.preset {
        form = reconcile(form, FormEvent::PresetSelected(preset), now);
    }
    if let Some(text) = args.unban_time {
        form = reconcile(form, FormEvent::UnbanTimeEdited(text), now);
    }

    let keep = |slot: RankSlot| existing.as_ref().map(|r| r.rank(slot));
    let rank = |slot: RankSlot, tier: Option<RankTier>, points: Option<u32>| {
        if tier.is_none() && points.is_none() {
            return None;
        }
        let current = keep(slot).unwrap_or_default();
        Some(ModeRank::new(
            tier.unwrap_or(current.tier()),
            points.unwrap_or(current.points()),
        ))
    };

    let command = SaveAccountCommand {
        index: args.index,
        name: args.name,
        password: args
            .password
            .map(Credential::new)
            .or_else(|| existing.as_ref().map(|r| r.password().clone()))
            .unwrap_or_default(),
        phone: args
            .phone
            .or_else(|| existing.as_ref().map(|r| r.phone().to_string()))
            .unwrap_or_default(),
        player_id: args
            .player_id
            .or_else(|| existing.as_ref().and_then(|r| r.player_id().map(str::to_string))),
        tpp_rank: rank(RankSlot::Tpp, args.tpp_rank, args.tpp_points),
        fpp_rank: rank(RankSlot::Fpp, args.fpp_rank, args.fpp_points),
        ban: form,
    };

    let result = SaveAccountHandler::new(roster, store, clock)
        .handle(command)
        .await?;
    let verb = if result.created { "Created" } else { "Updated" };
    println!("{} {}", verb, format_row(result.index, &result.record));
    Ok(())
}

fn build_scheduler(
    config: &AppConfig,
    roster: Arc<Roster>,
    store: Arc<dyn AccountDocumentStore>,
    clock: Arc<dyn Clock>,
) -> Result<(Scheduler, UnboundedReceiver<ReconcileEvent>)> {
    let status_url = config.remote.require_status_url()?;
    let status = HttpStatusService::new(
        StatusServiceConfig::new(status_url).with_timeout(config.remote.status_timeout()),
    )?;

    let (notifier, events) = ChannelNotifier::new();
    let notifier = Arc::new(notifier);

    let mut engine = ReconciliationEngine::new(
        roster,
        store,
        Arc::new(status),
        notifier.clone(),
        clock,
    )
    .with_config(
        EngineConfig::default()
            .with_status_delay(config.scheduler.status_delay())
            .with_rank_delay(config.scheduler.rank_delay()),
    );

    match config.remote.rank_base_url.as_deref() {
        Some(rank_url) => {
            let rank = HttpRankService::new(
                RankServiceConfig::new(rank_url, config.remote.season_prefix.as_str())
                    .with_timeout(config.remote.rank_timeout()),
            )?;
            engine = engine.with_rank_service(Arc::new(rank));
        }
        None => tracing::info!("remote.rank_base_url not set, rank sync disabled"),
    }

    let scheduler = Scheduler::new(Arc::new(engine), notifier).with_config(
        SchedulerConfig::default()
            .with_startup_delay(config.scheduler.startup_delay())
            .with_poll_interval(config.scheduler.poll_interval()),
    );
    Ok((scheduler, events))
}

fn print_event(event: &ReconcileEvent) {
    match event {
        ReconcileEvent::PassStarted { records, .. } => {
            println!("Checking {} account(s)...", records)
        }
        ReconcileEvent::Progress(message) => println!("{}", message),
        ReconcileEvent::RecordUpdated { index, record } => {
            println!("  updated {}", format_row(*index, record))
        }
        ReconcileEvent::PassCompleted(summary) => println!("{}", summary),
        ReconcileEvent::PassFailed { message, .. } => eprintln!("Pass failed: {}", message),
    }
}

async fn sync(
    config: &AppConfig,
    roster: Arc<Roster>,
    store: Arc<dyn AccountDocumentStore>,
    clock: Arc<dyn Clock>,
) -> Result<()> {
    let (scheduler, mut events) = build_scheduler(config, roster, store, clock)?;

    let TriggerOutcome::Started(pass) = scheduler.trigger() else {
        bail!("A pass is already running");
    };
    // The scheduler holds the sender, so drain until the pass has reported.
    while let Some(event) = events.recv().await {
        print_event(&event);
        if matches!(
            event,
            ReconcileEvent::PassCompleted(_) | ReconcileEvent::PassFailed { .. }
        ) {
            break;
        }
    }

    pass.await.context("Pass task panicked")??;
    Ok(())
}

async fn watch_loop(
    config: &AppConfig,
    roster: Arc<Roster>,
    store: Arc<dyn AccountDocumentStore>,
    clock: Arc<dyn Clock>,
) -> Result<()> {
    let (scheduler, mut events) = build_scheduler(config, roster, store, clock)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let _startup = scheduler.trigger_on_startup();
    let runner = tokio::spawn({
        let scheduler = scheduler.clone();
        async move { scheduler.run(shutdown_rx).await }
    });

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => print_event(&event),
                None => break,
            },
            signal = &mut ctrl_c => {
                signal.context("Failed to listen for Ctrl-C")?;
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    shutdown_tx.send(true).ok();
    runner.await.context("Scheduler task panicked")?;
    Ok(())
}

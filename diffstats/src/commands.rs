use crate::cli::{Args, Command};
use crate::config::Config;
use anyhow::{bail, Context};
use consensus_core::{BlockCreateRecord, LoggedStatistics, StatisticsStore};
use database::StatisticsDb;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct DifficultyRow {
    pub height: u64,
    pub time_span: u64,
    pub total_work: u64,
    pub difficulty: u64,
    pub logged_at: u64,
}

impl From<LoggedStatistics> for DifficultyRow {
    fn from(entry: LoggedStatistics) -> Self {
        let record = entry.record;
        Self {
            height: record.height,
            time_span: record.time_span,
            total_work: record.total_work,
            difficulty: record.difficulty,
            logged_at: entry.logged_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BlockRow {
    pub height: u64,
    pub difficulty: u64,
    pub block_hash: Option<String>,
    pub block_nonce: Option<u64>,
    pub create_template_time: u64,
    pub notify_block_time: Option<u64>,
    pub creation_latency: Option<u64>,
}

impl From<BlockCreateRecord> for BlockRow {
    fn from(record: BlockCreateRecord) -> Self {
        Self {
            height: record.height,
            difficulty: record.difficulty,
            block_hash: record.block_hash.map(|hash| hash.to_string()),
            block_nonce: record.block_nonce,
            create_template_time: record.create_template_time,
            notify_block_time: record.notify_block_time,
            creation_latency: record.creation_latency(),
        }
    }
}

/// Loads configuration, opens the store and renders the requested query as JSON.
pub fn run(args: &Args) -> anyhow::Result<String> {
    let mut config = match &args.config_path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.apply_cli_overrides(args);

    let data_dir = &config.storage.data_dir;
    if !data_dir.exists() {
        bail!("statistics directory {} does not exist", data_dir.display());
    }
    let db = StatisticsDb::open(data_dir).with_context(|| format!("Failed to open {}", data_dir.display()))?;
    execute(&db, &args.command)
}

pub fn execute(db: &StatisticsDb, command: &Command) -> anyhow::Result<String> {
    match command {
        Command::Difficulty { height, from, to } => {
            let (from, to) = match (height, from, to) {
                (Some(height), _, _) => (*height, *height),
                (None, Some(from), Some(to)) => (*from, *to),
                _ => bail!("either --height or --from and --to is required"),
            };
            let rows: Vec<DifficultyRow> =
                db.query_next_difficulty_entries(from, to)?.into_iter().map(DifficultyRow::from).collect();
            info!(from, to, rows = rows.len(), "queried next difficulty statistics");
            Ok(serde_json::to_string_pretty(&rows)?)
        }
        Command::Blocks { from, to } => {
            let rows: Vec<BlockRow> = db.query_block_statistics(*from, *to)?.into_iter().map(BlockRow::from).collect();
            info!(from, to, rows = rows.len(), "queried block statistics");
            Ok(serde_json::to_string_pretty(&rows)?)
        }
    }
}

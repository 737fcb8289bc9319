use std::path::PathBuf;

use clap::{ArgAction, Parser as ClapParser, Subcommand as ClapSubcommand};
use ethereum_types::H256;
use eyre::WrapErr;
use tracing::{Level, info, warn};
use txhook::{HookConfig, Recorder};
use txhook_storage::{EngineType, MEMORY_DATADIR, open_backend};

use crate::replay::{Trace, replay};

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");

#[allow(clippy::upper_case_acronyms)]
#[derive(ClapParser)]
#[command(name = "txhook", author, version = VERSION_STRING, about, long_about = None)]
pub struct CLI {
    #[clap(flatten)]
    pub opts: Options,
    #[command(subcommand)]
    pub command: Subcommand,
}

#[derive(ClapParser)]
pub struct Options {
    #[arg(
        long = "hook",
        action = ArgAction::SetTrue,
        help = "Record internal calls and transaction errors while replaying blocks"
    )]
    pub hook: bool,
    #[arg(
        long = "datadir",
        value_name = "DATABASE_DIRECTORY",
        default_value = MEMORY_DATADIR,
        help = "If the datadir is the word `memory`, txhook will use the InMemory Engine",
        env = "TXHOOK_DATADIR"
    )]
    pub datadir: String,
    #[arg(long = "log.level", default_value_t = Level::INFO, value_name = "LOG_LEVEL")]
    pub log_level: Level,
}

impl Options {
    pub fn hook_config(&self) -> HookConfig {
        HookConfig {
            enabled: self.hook,
        }
    }
}

#[derive(ClapSubcommand)]
pub enum Subcommand {
    #[clap(name = "replay", about = "Replay an execution trace through the hook")]
    Replay {
        #[clap(
            required = true,
            value_name = "TRACE_FILE",
            help = "Path to a JSON file with the blocks, transactions and internal calls to replay"
        )]
        path: PathBuf,
    },
    #[clap(name = "tx-error", about = "Print the error recorded for a transaction")]
    TxError {
        #[clap(value_name = "TX_HASH")]
        tx_hash: H256,
    },
    #[clap(name = "block-calls", about = "Print the internal calls recorded for a block")]
    BlockCalls {
        #[clap(value_name = "BLOCK_HASH")]
        block_hash: H256,
    },
}

impl Subcommand {
    pub fn run(self, opts: &Options) -> eyre::Result<()> {
        let engine_type = EngineType::from_datadir(&opts.datadir)?;
        let backend = open_backend(&opts.datadir, engine_type)?;

        match self {
            Subcommand::Replay { path } => {
                let Some(mut recorder) = Recorder::from_config(&opts.hook_config(), backend)
                else {
                    warn!("Hook is disabled, nothing will be recorded. Pass --hook to enable it");
                    return Ok(());
                };

                let file = std::fs::File::open(&path)
                    .wrap_err_with(|| format!("Failed to open trace file {}", path.display()))?;
                let trace: Trace = serde_json::from_reader(std::io::BufReader::new(file))
                    .wrap_err("Failed to parse trace file")?;

                info!(path = %path.display(), blocks = trace.blocks.len(), "Replaying trace");
                let summary = replay(&mut recorder, &trace)?;
                info!(
                    blocks = summary.blocks,
                    calls = summary.calls,
                    failed_transactions = summary.failed_transactions,
                    "Replay finished"
                );
            }
            Subcommand::TxError { tx_hash } => {
                let recorder = Recorder::new(backend);
                match recorder.get_transaction_error(tx_hash)? {
                    Some(error) => println!("{}", serde_json::to_string_pretty(&error)?),
                    None => info!(%tx_hash, "No error recorded for transaction"),
                }
            }
            Subcommand::BlockCalls { block_hash } => {
                let recorder = Recorder::new(backend);
                let Some(count) = recorder.get_block_call_count(block_hash)? else {
                    info!(%block_hash, "Block was not recorded");
                    return Ok(());
                };
                let calls = recorder.get_block_calls(block_hash)?.unwrap_or_default();
                if calls.len() as u64 != count {
                    warn!(
                        %block_hash,
                        count,
                        stored = calls.len(),
                        "Call count does not match stored call log"
                    );
                }
                println!("{}", serde_json::to_string_pretty(&calls)?);
            }
        }
        Ok(())
    }
}

//! Command implementations

use std::path::Path;
use std::sync::Arc;

use super::args::Command;
use super::errors::{CliError, CliResult};
use crate::api::{ApiServer, AppState, ServerConfig};
use crate::audit::{PromotionLedger, TransitionLog};
use crate::catalog::TestStore;
use crate::roster::RosterStore;

/// Dispatch a parsed command.
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Serve { port, audit_dir } => serve(port, audit_dir.as_deref()),
    }
}

/// Boot the engines and run the HTTP server
///
/// 1. Open audit sinks (when an audit directory is given)
/// 2. Wire stores and engines into shared state
/// 3. Start the async runtime and serve until terminated
fn serve(port: u16, audit_dir: Option<&Path>) -> CliResult<()> {
    let (ledger, transitions) = match audit_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| CliError::BootFailed(format!("cannot create audit dir: {}", e)))?;
            let ledger = PromotionLedger::with_sink(dir.join("promotions.jsonl"))
                .map_err(|e| CliError::BootFailed(format!("cannot open promotion ledger: {}", e)))?;
            let transitions = TransitionLog::with_sink(dir.join("transitions.jsonl"))
                .map_err(|e| CliError::BootFailed(format!("cannot open transition log: {}", e)))?;
            (ledger, transitions)
        }
        None => (PromotionLedger::new(), TransitionLog::new()),
    };

    let state = Arc::new(AppState::with_stores(
        Arc::new(TestStore::new()),
        Arc::new(RosterStore::new()),
        Arc::new(ledger),
        Arc::new(transitions),
    ));
    let server = ApiServer::with_config(state, ServerConfig::with_port(port));

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::BootFailed(format!("cannot start runtime: {}", e)))?;
    rt.block_on(server.start())?;

    Ok(())
}

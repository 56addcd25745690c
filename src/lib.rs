//! TUI Bear (workspace facade crate).
//!
//! Re-exports the workspace crates under one roof so binaries, integration
//! tests and benches can use `tui_bear::{core, input, models, term, types}`.

pub use tui_bear_core as core;
pub use tui_bear_input as input;
pub use tui_bear_models as models;
pub use tui_bear_term as term;
pub use tui_bear_types as types;

use std::fs::OpenOptions;

/// Send `log` output to the file named by `BEAR_LOG_PATH` (appending).
///
/// The game owns the terminal, so without that variable logging stays off.
/// `RUST_LOG` sets the filter; the default is `info`.
pub fn init_file_logging() -> anyhow::Result<()> {
    let Some(path) = std::env::var_os("BEAR_LOG_PATH").filter(|p| !p.is_empty()) else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Game seed from `BEAR_SEED`, else from the clock.
pub fn seed_from_env() -> u32 {
    std::env::var("BEAR_SEED")
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_else(|| {
            use std::time::{SystemTime, UNIX_EPOCH};
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.subsec_nanos() ^ d.as_secs() as u32)
                .unwrap_or(1)
        })
}

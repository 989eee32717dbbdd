// Entry point for the Minesweeper TUI application
// Initializes configuration and file logging, then launches the main UI

use std::error::Error;

// Module declarations
mod xtm_color;   // Cross-platform color matching utilities
mod xtm_config;  // User configuration (TOML)
mod xtm_error;   // Error types for boards and persistence
mod xtm_game;    // Board model, mine placement and flood-fill reveal
mod xtm_lang;    // Multi-language string resources
mod xtm_log;     // File logging
mod xtm_rank;    // Rankings file and top-N queries
mod xtm_session; // Game session state machine
mod xtm_store;   // Saved game persistence
mod xtm_ui;      // Terminal UI rendering and event handling

use tracing::info;
use xtm_config::load_or_create_config;
use xtm_ui::run as run_ui;

fn main() -> Result<(), Box<dyn Error>> {
    // Load or create user configuration (nickname, difficulty, preferences)
    let cfg = load_or_create_config();

    if xtm_log::init(&cfg.data_dir()) {
        info!(version = env!("CARGO_PKG_VERSION"), data_dir = %cfg.data_dir().display(), "Starting");
    }

    // Launch the main UI loop
    let result = run_ui(cfg);
    info!("Exiting");
    result
}

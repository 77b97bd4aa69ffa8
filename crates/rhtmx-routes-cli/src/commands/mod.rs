pub mod list;
pub mod match_path;
pub mod resolve;

use std::path::Path;

use anyhow::{Context, Result};
use rhtmx_direct_routes::{RouteTable, RoutesConfig};
use tracing::info;

/// Loads a routes file and builds its table
pub fn load_table(config: &Path) -> Result<RouteTable> {
    let routes = RoutesConfig::from_file(config)
        .with_context(|| format!("Failed to load routes from {}", config.display()))?;
    let table = routes
        .build_table()
        .with_context(|| format!("Invalid route in {}", config.display()))?;
    info!(routes = table.len(), config = %config.display(), "loaded route table");
    Ok(table)
}

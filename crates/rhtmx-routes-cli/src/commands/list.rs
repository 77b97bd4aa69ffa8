use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use super::load_table;

pub fn execute(config: &Path) -> Result<()> {
    let table = load_table(config)?;

    println!("{}", format!("Routes in {}", config.display()).green().bold());
    println!();

    if table.is_empty() {
        println!("{}", "No routes configured".yellow());
        return Ok(());
    }

    println!("{:>6}  {:<12}  {:<24}  template", "order", "precedence", "name");
    for entry in table.entries() {
        println!(
            "{:>6}  {:<12}  {:<24}  {}",
            entry.order(),
            entry.precedence().to_string(),
            entry.name().unwrap_or("-"),
            entry.template().text().cyan()
        );
    }

    println!();
    println!("{} route(s)", table.len());
    Ok(())
}

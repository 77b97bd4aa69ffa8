use std::path::Path;

use anyhow::Result;
use colored::Colorize;
use rhtmx_direct_routes::RouteMatch;

use super::load_table;

pub fn execute(config: &Path, paths: &[String], all: bool) -> Result<()> {
    let table = load_table(config)?;

    for path in paths {
        let matches = if all {
            table.match_all(path)
        } else {
            table.match_path(path).into_iter().collect()
        };

        if matches.is_empty() {
            println!("{} {}", path.bold(), "no route".red());
            continue;
        }
        for found in &matches {
            print_match(path, found);
        }
    }

    Ok(())
}

fn print_match(path: &str, found: &RouteMatch<'_>) {
    let name = found.entry.name().unwrap_or("-");
    println!(
        "{} → {} ({})",
        path.bold(),
        found.entry.template().text().cyan(),
        name
    );

    let mut values: Vec<_> = found.values.iter().collect();
    values.sort();
    for (key, value) in values {
        println!("    {key} = {}", value.green());
    }
}

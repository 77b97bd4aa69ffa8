use anyhow::Result;
use colored::Colorize;
use rhtmx_direct_routes::resolve_constraint;

pub fn execute(text: &str, values: &[String]) -> Result<()> {
    let constraint = resolve_constraint(text)?;
    println!("Resolved: {}", constraint.to_string().cyan());

    for value in values {
        if constraint.matches(value) {
            println!("  {} {value}", "✓".green());
        } else {
            println!("  {} {value}", "✗".red());
        }
    }

    Ok(())
}

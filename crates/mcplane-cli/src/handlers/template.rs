//! Template inspection handlers.

use anyhow::Result;

use mcplane_core::templates::{self, InputKind};

use super::parse_kind;

/// List all available templates.
pub fn list(json: bool) -> Result<()> {
    let all = templates::list();

    if json {
        println!("{}", serde_json::to_string_pretty(&all)?);
        return Ok(());
    }

    println!("{:<12} {:<12} Description", "Kind", "Name");
    crate::presentation::print_separator(70);
    for template in all {
        println!(
            "{:<12} {:<12} {}",
            template.kind.as_str(),
            template.display_name,
            template.description
        );
    }
    Ok(())
}

/// Show the setup steps for one template kind.
pub fn steps(kind_tag: &str, json: bool) -> Result<()> {
    let kind = parse_kind(kind_tag)?;
    let steps = templates::setup_steps(kind);

    if json {
        println!("{}", serde_json::to_string_pretty(steps)?);
        return Ok(());
    }

    let info = templates::info(kind);
    println!("Setup steps for {} ({}):\n", info.display_name, kind.as_str());
    for step in steps {
        let secret = match step.input {
            InputKind::Secret => " [secret]",
            InputKind::Text => "",
        };
        let required = if step.required { "" } else { " (optional)" };
        println!("  {}{}{}", step.key, secret, required);
        println!("      {}", step.help);
        println!("      e.g. --set {}={}", step.key, step.placeholder);
    }
    Ok(())
}

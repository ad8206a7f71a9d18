use anyhow::Result;
use engine::PluginManager;

use crate::args::PluginCmd;
use crate::output::{dim, name, print_json, print_tag};

pub fn handle_plugin(cmd: PluginCmd, manager: &PluginManager) -> Result<()> {
    match cmd {
        PluginCmd::List { json } => list_plugins(manager, json),
        PluginCmd::Show => show_plugins(manager),
    }
}

fn list_plugins(manager: &PluginManager, json: bool) -> Result<()> {
    let listing = manager.list();
    if json {
        return print_json(&listing);
    }
    if listing.is_empty() {
        print_tag("PLUGINS", "no plugins registered");
        return Ok(());
    }
    let width = listing.iter().map(|l| l.key.len()).max().unwrap_or(0);
    for l in &listing {
        let pad = " ".repeat(width - l.key.len());
        println!("{}{pad}  v{:<3} {}", name(&l.key), l.version, dim(&l.source));
    }
    print_tag("PLUGINS", &format!("{} registered", listing.len()));
    Ok(())
}

fn show_plugins(manager: &PluginManager) -> Result<()> {
    for (key, help) in manager.show() {
        println!("{}", name(&key));
        if !help.is_empty() {
            println!("    {}", dim(help));
        }
    }
    Ok(())
}

//! Command line front end for Vigil.

use anyhow::{Context, Result};
use engine::PluginManager;
use loader::{Discover, DylibLoader, StaticLoader};
use std::collections::HashSet;
use tracing::{debug, info};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

pub mod args;
pub mod config;
pub mod decode;
pub mod output;
pub mod plugins;

use config::Config;

/// Installs the stderr subscriber. `RUST_LOG` refines the level unless
/// `quiet` is set.
pub fn init_logging(debug: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else {
        let level = if debug {
            LevelFilter::DEBUG
        } else {
            LevelFilter::INFO
        };
        EnvFilter::builder()
            .with_default_directive(level.into())
            .from_env_lossy()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    if debug && !quiet {
        debug!("Debug mode enabled");
    }
}

/// Registers the built-in codecs and every library found on the configured
/// and extra search paths.
pub fn bootstrap(cfg: &Config, extra_paths: &[String]) -> Result<PluginManager> {
    let mut roots = cfg.plugins.paths.clone();
    for path in extra_paths {
        roots.extend(DylibLoader::from_search_path(path).roots().iter().cloned());
    }
    let disabled: HashSet<String> = cfg.plugins.disabled.iter().cloned().collect();

    let mut builtins = StaticLoader::new(vec![codecs::BUILTIN_CODECS]);
    let mut dylibs = DylibLoader::new(roots);
    let mut manager = PluginManager::new(codecs::DEFAULT_CODEC);
    let report = manager
        .load(&mut [&mut builtins as &mut dyn Discover, &mut dylibs], &disabled)
        .context("failed to load plugins")?;
    info!(
        plugins = report.accepted,
        disabled = report.disabled,
        "Plugins registered"
    );
    Ok(manager)
}

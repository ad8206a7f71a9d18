//! Entry point for the command-line interface.

use anyhow::Context;
use vigil::args::{parse_cli, Commands};
use vigil::config::load_config;
use vigil::decode::{run_decode, show_codecs};
use vigil::plugins::handle_plugin;
use vigil::{bootstrap, init_logging};

fn main() -> anyhow::Result<()> {
    let cli = parse_cli();
    init_logging(cli.debug, cli.quiet);
    let cfg = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    let mut manager = bootstrap(&cfg, &cli.plugin_paths)?;

    match cli.command {
        Commands::Plugins(cmd) => handle_plugin(cmd, &manager),
        Commands::Codecs(args) => {
            manager
                .instantiate()
                .context("failed to instantiate plugins")?;
            show_codecs(&manager, &args, &cfg)
        }
        Commands::Decode(args) => {
            manager
                .instantiate()
                .context("failed to instantiate plugins")?;
            run_decode(&manager, &args, &cfg)
        }
    }
}

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::builder::TreeBuilder;
use crate::cli::args::{Cli, Commands, ConfigCommands, DirArgs};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::render::Renderer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Dir(args)) => cmd_dir(cli, args),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => cmd_completion(*shell),
        None => cmd_dir(cli, &DirArgs::default()),
    }
}

/// Command line flags win over loaded settings.
fn apply_dir_args(mut settings: Settings, args: &DirArgs) -> CliResult<Settings> {
    if args.max_depth == Some(0) {
        return Err(CliError::InvalidArgs("max depth must be at least 1".into()));
    }
    settings.max_depth = args.max_depth.or(settings.max_depth);
    settings.show_hidden |= args.all;
    settings.sizes |= args.sizes;
    if let Some(indent) = args.indent {
        settings.render.indent_size = indent;
    }
    Ok(settings)
}

#[instrument(skip(cli))]
fn cmd_dir(cli: &Cli, args: &DirArgs) -> CliResult<()> {
    let settings = Settings::load(cli.config.as_deref())?;
    let settings = apply_dir_args(settings, args)?;
    debug!(?settings, "effective settings");

    let dir = args.dir.clone().unwrap_or_else(|| ".".into());
    let tree = TreeBuilder::from_settings(&settings).build_from_directory(&dir)?;

    let renderer = Renderer::new(settings.render);
    let mut stdout = io::stdout().lock();
    renderer.render_to_writer(tree.root(), &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(cli.config.as_deref())?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => match global_config_path() {
            Some(path) => output::info(&path.display()),
            None => output::warning("no config directory available on this platform"),
        },
    }
    Ok(())
}

fn cmd_completion(shell: Shell) -> CliResult<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}

use anyhow::{Context, Result};
use pluribus_cfg::cli::{
    ApplyConfig, Args, ConfigDiscovery, DeviceOverrides, ExecutionMode, Settings, ShellCommand,
    ShellConfig, show_shell_help,
};
use pluribus_cfg::device::{DeviceSession, SshSession};
use pluribus_cfg::env;
use pluribus_cfg::lifecycle::{CandidateSource, ConfigManager};
use std::io::{self, Write};
use std::path::Path;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_filter = if args.verbose() {
        env::VERBOSE_LOG_FILTER
    } else {
        env::DEFAULT_LOG_FILTER
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let mode = match args.mode() {
        Ok(mode) => mode,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    match mode {
        ExecutionMode::Apply(config) => run_apply_mode(config).await,
        ExecutionMode::Shell(config) => run_shell_mode(config).await,
        ExecutionMode::ShowConfig => {
            ConfigDiscovery::show_discovery_info();
            Ok(())
        }
    }
}

fn load_settings(config_override: Option<&Path>, device: &DeviceOverrides) -> Result<Settings> {
    let settings = ConfigDiscovery::load(config_override)?.with_overrides(device);
    if settings.device.host.is_empty() {
        anyhow::bail!("No device host configured: pass --host or set [device] host in the settings file");
    }
    Ok(settings)
}

async fn connect(settings: &Settings) -> Result<ConfigManager<SshSession>> {
    info!(
        "Connecting to {}@{}:{}",
        settings.device.username, settings.device.host, settings.device.port
    );
    let session = SshSession::new(settings.device.clone())?;
    session
        .health_check()
        .await
        .with_context(|| format!("Device {} is not reachable", settings.device.host))?;

    Ok(ConfigManager::new(session).await?)
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes"))
}

async fn run_apply_mode(config: ApplyConfig) -> Result<()> {
    let settings = load_settings(config.config_override.as_deref(), &config.device)?;
    let mut manager = connect(&settings).await?;

    info!("Loading candidate configuration from {:?}", config.candidate);
    manager
        .load_candidate(CandidateSource::file(&config.candidate))
        .await?;

    if !manager.changed().await? {
        println!("No changes: running configuration already matches the candidate");
        manager.discard().await?;
        return Ok(());
    }

    if settings.apply.show_diff || config.dry_run {
        print!("{}", manager.compare().await?);
    }

    if config.dry_run {
        manager.discard().await?;
        println!("🔍 Dry run: candidate discarded");
        return Ok(());
    }

    let approved = config.assume_yes
        || !settings.apply.confirm
        || confirm("Commit these changes?")?;

    if approved {
        manager.commit().await?;
        println!("✅ Configuration committed");
    } else {
        manager.discard().await?;
        println!("Candidate discarded");
    }

    if config.verbose {
        println!("{}", serde_json::to_string_pretty(&manager.status())?);
    }

    manager.into_session().close().await?;
    Ok(())
}

async fn run_shell_mode(config: ShellConfig) -> Result<()> {
    let settings = load_settings(config.config_override.as_deref(), &config.device)?;
    let mut manager = connect(&settings).await?;

    if config.verbose {
        println!("🔧 Connected to {}. Type 'help' for commands.", settings.device.host);
    }

    loop {
        print!("\n{}", settings.device.cli_banner());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }

        let command = match ShellCommand::parse(&input) {
            Ok(command) => command,
            Err(e) => {
                println!("❌ {}", e);
                continue;
            }
        };

        if command == ShellCommand::Quit {
            break;
        }

        if let Err(e) = execute_shell_command(&mut manager, command).await {
            error!("Command failed: {:#}", e);
            println!("❌ {:#}", e);
        }
    }

    if manager.state().changed {
        warn!("Leaving with uncommitted changes, discarding them");
        manager.discard().await?;
    }

    info!("Closing device session...");
    manager.into_session().close().await?;

    println!("Goodbye!");
    Ok(())
}

async fn execute_shell_command(
    manager: &mut ConfigManager<SshSession>,
    command: ShellCommand,
) -> Result<()> {
    match command {
        ShellCommand::Load(path) => {
            manager.load_candidate(CandidateSource::File(path)).await?;
            println!("✅ Candidate loaded");
        }
        ShellCommand::Commit => {
            if manager.commit().await? {
                println!("✅ Committed");
            } else {
                println!("Nothing to commit");
            }
        }
        ShellCommand::Discard => {
            manager.discard().await?;
            println!("✅ Discarded");
        }
        ShellCommand::Rollback(number) => {
            manager.rollback(number).await?;
            println!("✅ Rolled back {} commit(s)", number);
        }
        ShellCommand::Compare => {
            let diff = manager.compare().await?;
            if diff.is_empty() {
                println!("No differences");
            } else {
                print!("{}", diff);
            }
        }
        ShellCommand::Status => {
            println!("{}", serde_json::to_string_pretty(&manager.status())?);
        }
        ShellCommand::History => {
            for (index, snapshot) in manager.history().iter().enumerate() {
                println!(
                    "  {}: {} ({} lines)",
                    index,
                    snapshot.captured_at().format("%Y-%m-%d %H:%M:%S UTC"),
                    snapshot.content().lines().count()
                );
            }
        }
        ShellCommand::Run(raw) => {
            print!("{}", manager.session().run(&raw).await?);
        }
        ShellCommand::Show(what) => {
            print!("{}", manager.session().show(&what, ";").await?);
        }
        ShellCommand::Help => show_shell_help(),
        ShellCommand::Quit | ShellCommand::Empty => {}
    }
    Ok(())
}

use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use deskshell::common::config::{Config, config_file};
use deskshell::common::log;
use deskshell::desktop::script::Script;

#[derive(Parser)]
#[command(version, about = "Workspace and layout engine of a desktop shell")]
struct Cli {
    /// Path to configuration file to use (overrides default).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Check the configuration file and exit.
    #[arg(long)]
    validate: bool,

    /// Replay a RON session script against a headless host and print where
    /// every view ended up.
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,
}

fn load_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        Config::read(path)
    } else {
        Ok(Config::default())
    }
}

fn main() {
    let opt = Cli::parse();
    log::init_logging();

    let config_path = opt.config.clone().unwrap_or_else(config_file);
    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {e:#}", config_path.display());
            process::exit(1);
        }
    };

    let issues = config.validate();
    if !issues.is_empty() {
        for issue in issues {
            eprintln!("{}", issue);
        }
        process::exit(1);
    }
    if opt.validate {
        println!("Config validation passed");
        return;
    }

    let Some(script_path) = opt.script else {
        eprintln!("nothing to do: pass --validate or --script PATH");
        process::exit(2);
    };
    let session = match Script::load(&script_path).and_then(|script| script.run(config)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{e:#}");
            process::exit(1);
        }
    };
    for report in session.reports() {
        println!("{report}");
    }
    let desktop = session.desktop();
    println!(
        "active workspace {}, top view {:?}",
        desktop.active_workspace(),
        desktop.top_view()
    );
}

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use log::info;

use prebuild::{
    config::{self, PrebuildConfig},
    ctx::{BuildContext, SetupInfo},
    widget::classify::WidgetPurpose,
};

/// Prepare a widget-based web app for the AMD bundler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the profile, merged manifests, app config and resource modules
    Prepare(SetupArgs),
    /// Print the widget URIs matching a purpose, in walk order
    Widgets {
        #[command(flatten)]
        setup: SetupArgs,
        #[arg(long, value_enum, default_value = "widget")]
        purpose: WidgetPurpose,
    },
    /// Write the JSON schema of the config file
    Schema {
        #[arg(long, default_value = ".")]
        app_root: PathBuf,
    },
}

#[derive(Args, Debug)]
struct SetupArgs {
    /// App root directory (contains `build-src/`)
    #[arg(long, default_value = ".")]
    app_root: PathBuf,
    /// Config file, default `<app-root>/.prebuild.toml`
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// App config file, default `<app-root>/config.json`
    #[arg(long, value_name = "FILE")]
    app_config: Option<PathBuf>,
    /// Profile template, default is the built-in template
    #[arg(long, value_name = "FILE")]
    template: Option<PathBuf>,
    /// Do not write `_build-generate_module.js` files
    #[arg(long)]
    no_resource_modules: bool,
}

impl SetupArgs {
    fn context(self) -> Result<BuildContext> {
        let config_path = self
            .config
            .unwrap_or_else(|| PrebuildConfig::default_path(&self.app_root));
        let file = PrebuildConfig::load(&config_path)?;

        let defaults = file.resolve(&self.app_root);
        let info = SetupInfo {
            app_config_file: self.app_config.or(defaults.app_config_file),
            profile_template: self.template.or(defaults.profile_template),
            resource_modules: defaults.resource_modules && !self.no_resource_modules,
        };
        BuildContext::new(self.app_root, info)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Prepare(args) => {
            let mut ctx = args.context()?;
            let report = ctx.prepare()?;
            info!("preload: {}", report.preload.join(", "));
            info!("postload: {}", report.postload.join(", "));
            println!(
                "{}",
                format!("Prepared {} file(s)", report.written.len())
                    .bold()
                    .green()
            );
        }
        Command::Widgets { setup, purpose } => {
            let mut ctx = setup.context()?;
            for uri in ctx.widget_uris(purpose)? {
                println!("{uri}");
            }
        }
        Command::Schema { app_root } => {
            let path = config::write_schema(&PrebuildConfig::default_path(&app_root))?;
            println!("{}", format!("schema: {}", path.display()).bold().purple());
        }
    }
    Ok(())
}

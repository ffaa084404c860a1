use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use console::{Style, Term};
use tracing_subscriber::EnvFilter;

use zorn::{
    project::{self, ProjectOptions, SETTINGS_FILE},
    Website,
};

#[derive(Parser, Debug)]
#[command(name = "zorn", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// Log every step.
    #[arg(short, long, global = true, conflicts_with = "silent")]
    verbose: bool,
    /// Only log errors.
    #[arg(short, long, global = true)]
    silent: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new project in the current directory.
    Create(CreateArgs),
    /// Generate the site described by a settings file.
    Generate(SettingsArgs),
    /// Copy the bundled templates into the project.
    ImportTemplates {
        #[command(flatten)]
        settings: SettingsArgs,
        /// Point the settings file at the imported templates.
        #[arg(long)]
        update: bool,
    },
}

#[derive(Args, Debug)]
struct CreateArgs {
    project_name: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long, default_value = "basic")]
    style: String,
    /// Generate the site right after creating it.
    #[arg(long)]
    generate: bool,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    #[arg(long, default_value = SETTINGS_FILE)]
    settings: PathBuf,
}

fn generate(settings_path: &Path) -> anyhow::Result<()> {
    let settings = project::load_settings(settings_path)
        .with_context(|| format!("could not load {}", settings_path.display()))?;
    let mut website = Website::new(&settings)?;
    let written = website.generate_pages()?;

    tracing::info!(pages = written.len(), site = %website.settings().site_dir.display(), "site generated");

    Ok(())
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Create(args) => {
            let options = ProjectOptions {
                style: args.style.parse()?,
                author: args.author.or_else(|| std::env::var("USER").ok()),
                site_title: args.title,
                project_name: args.project_name,
            };
            let root = project::create_project(Path::new("."), &options)
                .with_context(|| format!("could not create project '{}'", options.project_name))?;

            if args.generate {
                generate(&root.join(SETTINGS_FILE))?;
            }
        }
        Command::Generate(args) => generate(&args.settings)?,
        Command::ImportTemplates { settings, update } => {
            project::import_templates(&settings.settings, update)
                .context("could not import templates")?;
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else if cli.silent {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let red = Style::new().red();
            let _ = Term::stderr().write_line(&red.apply_to(format!("Error: {error:#}")).to_string());
            ExitCode::FAILURE
        }
    }
}

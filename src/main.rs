use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tracing::{error, info};

use instance_installer::core::error::{LauncherError, LauncherResult};
use instance_installer::core::fsutil;
use instance_installer::core::install::{DownloadOrchestrator, InstallRequest};
use instance_installer::core::instance::{ContentSource, LoaderSpec, LoaderType};
use instance_installer::core::manifest::{ContentManifest, PACK_ARCHIVE};
use instance_installer::core::state::{validate_path_segment, AppState};

#[derive(Parser)]
#[command(name = "instance-installer")]
#[command(author, version, about = "Installs a mod loader and pack content into an instance")]
struct Cli {
    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Install an instance and print the resulting download job as JSON
    Install {
        /// Instance name
        #[arg(long)]
        name: String,
        /// Pack manifest.json
        #[arg(long)]
        manifest: PathBuf,
        /// Pack archive holding the override files
        #[arg(long)]
        archive: Option<PathBuf>,
        #[arg(long, value_enum)]
        loader: LoaderArg,
        /// Minecraft version
        #[arg(long)]
        mc: String,
        #[arg(long)]
        loader_version: String,
        #[arg(long, value_enum, default_value = "curseforge")]
        source: SourceArg,
        #[arg(long)]
        background: Option<String>,
        /// Play time to record when the instance has none yet (seconds)
        #[arg(long)]
        time_played: Option<u64>,
        /// Extract only the pack's overrides directory
        #[arg(long)]
        overrides_only: bool,
        /// Install even if another install left its lock behind
        #[arg(long, short = 'f')]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum LoaderArg {
    Forge,
    Fabric,
}

#[derive(Clone, Copy, ValueEnum)]
enum SourceArg {
    Curseforge,
    Ftb,
}

#[tokio::main]
async fn main() -> ExitCode {
    instance_installer::init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Install {
            name,
            manifest,
            archive,
            loader,
            mc,
            loader_version,
            source,
            background,
            time_played,
            overrides_only,
            force,
        } => {
            let loader = LoaderSpec {
                loader_type: match loader {
                    LoaderArg::Forge => LoaderType::Forge,
                    LoaderArg::Fabric => LoaderType::Fabric,
                },
                mc_version: mc,
                loader_version,
                source: match source {
                    SourceArg::Curseforge => ContentSource::Curseforge,
                    SourceArg::Ftb => ContentSource::Ftb,
                },
            };
            let options = InstallOptions {
                manifest,
                archive,
                background,
                time_played,
                overrides_only,
                force,
            };
            install(cli.data_dir, name, loader, options).await
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

struct InstallOptions {
    manifest: PathBuf,
    archive: Option<PathBuf>,
    background: Option<String>,
    time_played: Option<u64>,
    overrides_only: bool,
    force: bool,
}

async fn install(
    data_dir: Option<PathBuf>,
    name: String,
    loader: LoaderSpec,
    options: InstallOptions,
) -> LauncherResult<()> {
    let InstallOptions {
        manifest: manifest_path,
        archive,
        background,
        time_played,
        overrides_only,
        force,
    } = options;

    validate_path_segment(&name)?;
    validate_path_segment(&loader.mc_version)?;
    validate_path_segment(&loader.loader_version)?;

    let state = Arc::new(AppState::load(data_dir)?);

    if state.lock.is_locked(&name).await && !force {
        return Err(LauncherError::Other(format!(
            "instance {name} is already being installed (use --force to override)"
        )));
    }

    let raw = tokio::fs::read(&manifest_path)
        .await
        .map_err(|e| LauncherError::io(&manifest_path, e))?;
    let manifest: ContentManifest = serde_json::from_slice(&raw)?;

    if let Some(archive) = &archive {
        let staged = state.paths.instance_temp_dir(&name).join(PACK_ARCHIVE);
        fsutil::copy_file(archive, &staged).await?;
    }

    fsutil::create_dir_all(&state.paths.instance_dir(&name)).await?;
    state.lock.acquire(&name).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let orchestrator = DownloadOrchestrator::new(state.clone(), tx);
    let request = InstallRequest {
        instance_name: name.clone(),
        loader,
        manifest,
        background,
        time_played,
        overrides_only,
    };
    let report = orchestrator.install(request).await?;
    drop(orchestrator);

    // Printing the job is this binary's hand-off; nothing downloads after it.
    while let Some(job) = rx.recv().await {
        println!("{}", serde_json::to_string_pretty(&job)?);
    }
    for dropped in &report.dropped {
        error!(
            "Mod {}/{} could not be resolved",
            dropped.project_id, dropped.file_id
        );
    }
    state.lock.release(&name).await;
    info!("Instance {} installed", name);
    Ok(())
}

//! Phase deployer CLI entrypoint.
//!
//! This is the main entrypoint for the phase-deployer command-line tool.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use phase_deployer::cli::{Cli, Commands, OutputFormatter};
use phase_deployer::config::{
    find_config_file, ConfigParser, ConfigValidator, DeployerSettings, StoreBackend,
};
use phase_deployer::deployer::{Phase, PhaseDispatcher};
use phase_deployer::error::Result;
use phase_deployer::patch::{Patch, PositivePatchGenerator};
use phase_deployer::reconciler::{Entity, Reconciler};
use phase_deployer::resource::{ManifestLoader, ObjectKey};
use phase_deployer::store::{LocalResourceStore, MemoryResourceStore, ResourceStore};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Main entrypoint.
fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.json_logs);

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Initializes the logging system.
///
/// `RUST_LOG` wins over the verbosity flag when set.
fn init_logging(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let formatter = OutputFormatter::new(cli.output);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Reconcile {
            entity,
            namespace,
            phase,
            manifests,
        } => {
            let entity = Entity::new(&entity, namespace.as_deref(), Phase::from(phase.as_str()));
            cmd_reconcile(config_path, &entity, &manifests, &formatter).await
        }
        Commands::Diff {
            live,
            desired,
            naive,
        } => cmd_diff(&live, &desired, naive, &formatter),
        Commands::Validate {
            manifests,
            warnings,
        } => cmd_validate(config_path, &manifests, warnings, &formatter),
        Commands::Get {
            kind,
            name,
            namespace,
        } => {
            let key = ObjectKey::new(&kind, namespace.as_deref(), &name);
            cmd_get(config_path, &key, &formatter).await
        }
    }
}

/// Run one reconciliation pass.
async fn cmd_reconcile(
    config_path: Option<&Path>,
    entity: &Entity,
    manifests: &Path,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (settings, base_dir) = load_settings(config_path)?;
    ConfigValidator::new().validate(&settings)?;

    let resources = ManifestLoader::new().load_file(manifests)?;
    ConfigValidator::new().validate_resources(&resources)?;

    let store = create_store(&settings, &base_dir);
    info!("Using {} store", store.backend_type());

    let dispatcher = PhaseDispatcher::new(settings.deployer);
    let reconciler = Reconciler::new(&store, &dispatcher);
    let report = reconciler.run_pass(entity, resources).await?;

    emit(&formatter.format_report(&report))
}

/// Print the patch between a live and a desired resource.
fn cmd_diff(live: &Path, desired: &Path, naive: bool, formatter: &OutputFormatter) -> Result<()> {
    let loader = ManifestLoader::new();
    let live = loader.load_one(live)?;
    let desired = loader.load_one(desired)?;

    let generator = PositivePatchGenerator::new();
    let patch = if naive {
        Patch::merge(generator.naive_delta(&live.to_value()?, &desired.to_value()?)?)
    } else {
        generator.compute_patch(&live, &desired)?
    };

    emit(&formatter.format_patch(&patch))
}

/// Validate settings and a manifest set.
fn cmd_validate(
    config_path: Option<&Path>,
    manifests: &Path,
    show_warnings: bool,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (settings, _) = load_settings(config_path)?;
    let validator = ConfigValidator::new();
    let settings_result = validator.validate(&settings)?;

    info!("Validating manifests: {}", manifests.display());
    let resources = ManifestLoader::new().load_file(manifests)?;
    let resources_result = validator.validate_resources(&resources)?;

    emit(&formatter.format_validation(
        &settings_result,
        &resources_result,
        resources.len(),
        show_warnings,
    ))
}

/// Print a resource from the configured store.
async fn cmd_get(
    config_path: Option<&Path>,
    key: &ObjectKey,
    formatter: &OutputFormatter,
) -> Result<()> {
    let (settings, base_dir) = load_settings(config_path)?;
    let store = create_store(&settings, &base_dir);

    let resource = store.get(key).await?;
    if resource.is_none() {
        debug!("No stored resource for {key}");
    }

    emit(&formatter.format_resource(resource.as_ref()))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Loads settings and returns them with the directory relative store paths
/// resolve against.
fn load_settings(config_path: Option<&Path>) -> Result<(DeployerSettings, PathBuf)> {
    let config_file = config_path
        .map(Path::to_path_buf)
        .or_else(|| find_config_file("."));
    let base_dir = config_file
        .as_deref()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let parser = ConfigParser::new().with_base_path(&base_dir);
    parser.load_dotenv()?;

    if let Some(file) = &config_file {
        debug!("Loading configuration from: {}", file.display());
    }
    let settings = parser.resolve(config_file.as_deref())?;

    Ok((settings, base_dir))
}

/// Creates the store selected by the settings.
fn create_store(settings: &DeployerSettings, base_dir: &Path) -> Box<dyn ResourceStore> {
    match settings.store.backend {
        StoreBackend::Local => {
            Box::new(LocalResourceStore::with_base_dir(base_dir.join(settings.store.path_or_default())))
        }
        StoreBackend::Memory => Box::new(MemoryResourceStore::new()),
    }
}

/// Writes command output to stdout.
fn emit(output: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{output}")?;
    if !output.ends_with('\n') {
        writeln!(stdout)?;
    }
    Ok(())
}

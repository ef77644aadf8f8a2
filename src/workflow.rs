use crate::agents::{ServerBinaryAgent, UpdateReport, UpdateStore};
use crate::catalog::{Resolution, ResolutionPolicy, UpdateChain, Version, resolve};
use crate::error::{Result, UpdaterError};
use crate::repository::{Credentials, RepositoryFactory, UpdateSource};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Settings shared by every command
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub binary: Option<PathBuf>,
    pub credentials: Credentials,
    pub package: String,
    pub from_version: Option<String>,
    pub policy: ResolutionPolicy,
    pub updater_url: String,
}

/// Where the starting version came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionOrigin {
    CommandLine,
    Detected,
}

/// List the packages known to the update service
pub fn execute_packages(config: &SessionConfig) -> Result<()> {
    let source =
        RepositoryFactory::create_updater(&config.updater_url, config.credentials.clone())?;
    let packages = list_packages(source.as_ref())?;

    println!("{}", "Available packages:".cyan().bold());
    for package in packages {
        println!("  • {}", package);
    }

    Ok(())
}

/// Show the latest version and the update chain without downloading anything
pub fn execute_check(config: &SessionConfig) -> Result<()> {
    let binary = config.binary.as_ref().map(ServerBinaryAgent::new);
    let (version, _) = starting_version(config.from_version.as_deref(), binary.as_ref())?;

    let source =
        RepositoryFactory::create_updater(&config.updater_url, config.credentials.clone())?;
    let resolution = check_updates(source.as_ref(), &config.package, &version, config.policy)?;

    if resolution.is_up_to_date() {
        println!("\n{}", "✨ Server is up to date!".green().bold());
        return Ok(());
    }

    for step in &resolution.chain {
        println!(
            "  • Update available: {} → {}",
            step.from.to_string().dimmed(),
            step.to.to_string().green().bold()
        );
    }

    println!("\n{}", "To download these updates, run:".dimmed());
    let experimental = match config.policy {
        ResolutionPolicy::Stable => "",
        ResolutionPolicy::Experimental => " --experimental",
    };
    println!("  {}", format!("factorio-updater{experimental} update").cyan());

    Ok(())
}

/// Download every step of the chain, optionally applying and deleting each one
pub fn execute_update(
    config: &SessionConfig,
    output: PathBuf,
    apply: bool,
    delete: bool,
) -> Result<()> {
    let binary = config.binary.as_ref().map(ServerBinaryAgent::new);
    let (version, origin) = starting_version(config.from_version.as_deref(), binary.as_ref())?;
    let store = UpdateStore::new(&output)?;
    debug!("Storing updates in {}", store.output_dir().display());

    let apply_with = match (apply, origin) {
        (true, VersionOrigin::Detected) => binary.as_ref(),
        (true, VersionOrigin::CommandLine) => {
            println!(
                "{}",
                "⚠ Version given on the command line, updates will be downloaded but not applied"
                    .yellow()
            );
            None
        }
        (false, _) => None,
    };
    if delete && apply_with.is_none() {
        debug!("--delete has no effect when updates are not applied");
    }

    let source =
        RepositoryFactory::create_updater(&config.updater_url, config.credentials.clone())?;
    let resolution = check_updates(source.as_ref(), &config.package, &version, config.policy)?;

    if resolution.is_up_to_date() {
        println!("\n{}", "✨ Server is up to date!".green().bold());
        return Ok(());
    }

    let report = run_updates(
        source.as_ref(),
        &store,
        &config.package,
        &resolution.chain,
        apply_with,
        delete,
    )?;

    print_update_report(&report);
    Ok(())
}

/// Pick the version to start from: the command line wins over detection
pub fn starting_version(
    from_version: Option<&str>,
    binary: Option<&ServerBinaryAgent>,
) -> Result<(Version, VersionOrigin)> {
    if let Some(raw) = from_version {
        let version = Version::parse(raw)?;
        println!("Version from command line {}.", version.to_string().bright_cyan());
        return Ok((version, VersionOrigin::CommandLine));
    }

    let Some(binary) = binary else {
        return Err(UpdaterError::Validation(
            "Either --binary or --from-version is required to determine the installed version"
                .to_string(),
        ));
    };

    let version = binary.detect_version()?;
    println!("Version {} auto-detected.", version.to_string().bright_cyan());
    Ok((version, VersionOrigin::Detected))
}

pub fn list_packages(source: &dyn UpdateSource) -> Result<Vec<String>> {
    let catalog = source.fetch_catalog()?;
    Ok(catalog.packages().map(str::to_string).collect())
}

/// Fetch the catalog and resolve the update chain for `package`
pub fn check_updates(
    source: &dyn UpdateSource,
    package: &str,
    version: &Version,
    policy: ResolutionPolicy,
) -> Result<Resolution> {
    let catalog = source.fetch_catalog()?;
    if !catalog.has_package(package) {
        return Err(UpdaterError::UnknownPackage(package.to_string()));
    }

    println!(
        "Get updates for package: {} ({} channel)",
        package.bright_cyan(),
        policy
    );

    let resolution = resolve(&catalog, package, version, policy)?;
    match &resolution.latest {
        Some(latest) => println!("Latest version: {}", latest.to_string().green().bold()),
        None => println!("Latest version: {}", "none".yellow()),
    }

    Ok(resolution)
}

/// Process the chain strictly in order; each delta only applies on top of its `from`.
pub fn run_updates(
    source: &dyn UpdateSource,
    store: &UpdateStore,
    package: &str,
    chain: &UpdateChain,
    apply_with: Option<&ServerBinaryAgent>,
    delete: bool,
) -> Result<UpdateReport> {
    let mut report = UpdateReport::new();

    for step in chain {
        println!("\n{}", format!("Get update: {step}.").yellow());
        let url = source.fetch_download_link(package, step)?;
        let path = store.path_for(package, step)?;
        let bytes = source.download(&url, &path)?;
        println!("  Stored to {} ({} bytes)", path.display(), bytes);
        report.add_download(step.clone(), path.clone());

        let Some(binary) = apply_with else {
            continue;
        };

        println!("  Apply update {step}.");
        if let Err(e) = binary.apply_update(&path) {
            warn!("applying {} failed, stopping before later steps", step);
            return Err(e);
        }
        report.add_applied(step.clone());

        if delete {
            println!("  Delete update {step}.");
            store.delete(&path)?;
            report.add_deleted(step.clone());
        }
    }

    Ok(report)
}

fn print_update_report(report: &UpdateReport) {
    println!("\n{}", "📦 Update summary:".cyan().bold());
    println!("  Downloaded: {}", report.downloaded.len());
    for (step, path) in &report.downloaded {
        println!("  • {} {}", step, path.display().to_string().dimmed());
    }

    if report.applied.is_empty() {
        println!("  {}", "No updates were applied".yellow());
    } else {
        println!("  Applied: {}", report.applied.len());
        if let Some(version) = report.installed_version() {
            println!("  Installed version: {}", version.green().bold());
        }
    }

    if !report.deleted.is_empty() {
        println!("  Deleted: {}", report.deleted.len());
    }

    println!("\n{}", "✨ Update process completed successfully!".green().bold());
}

#![deny(missing_docs)]
//! Shipwright command-line interface.
//!
//! Classifies release versions, renders changelogs and publishes build
//! artifacts to the plugin host and the source host.

mod clean;
mod git;

use clap::{Args, Parser, Subcommand, ValueEnum};
use git::GitMetadata;
use serde::Serialize;
use shipwright_core::{
    LevelReport, ReleaseNotesInput, StdFileSystem, VersionDescriptor, render_json,
    render_level_text, render_release_notes, write_release_notes,
};
use shipwright_publish::{
    DEFAULT_GITHUB_API_URL, DEFAULT_ORE_URL, OreRequest, OreTarget, PublishOutcome,
    ReleaseRequest, ReleaseTarget, publish_release, publish_to_ore,
};
use std::fmt::Write;
use std::path::PathBuf;

pub(crate) type CliResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

const DEFAULT_MINECRAFT_VERSION: &str = "1.12.2";

#[derive(Parser)]
#[command(name = "shipwright", version, about = "Shipwright release CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug)]
struct VersionArgs {
    /// Base version being built, e.g. 1.14.0.
    #[arg(long, env = "SHIPWRIGHT_VERSION")]
    release_version: String,
    /// Pre-release suffix, e.g. SNAPSHOT, ALPHA1, BETA2, RC1.
    #[arg(long, env = "SHIPWRIGHT_VERSION_SUFFIX")]
    suffix: Option<String>,
    /// Platform API version the build targets.
    #[arg(long, env = "SHIPWRIGHT_PLATFORM_VERSION")]
    platform_version: String,
}

impl VersionArgs {
    fn descriptor(&self) -> VersionDescriptor {
        VersionDescriptor::new(&self.release_version, self.suffix.clone(), &self.platform_version)
    }
}

#[derive(Args, Clone, Debug)]
struct ProjectArgs {
    /// Project root containing the changelogs directory.
    #[arg(long, env = "SHIPWRIGHT_ROOT", default_value = ".")]
    root: PathBuf,
    /// Git hash to use instead of asking git.
    #[arg(long, env = "SHIPWRIGHT_GIT_HASH")]
    git_hash: Option<String>,
    /// Commit message to use instead of asking git.
    #[arg(long, env = "SHIPWRIGHT_COMMIT_MESSAGE")]
    commit_message: Option<String>,
}

#[derive(Args, Clone, Debug)]
struct ArtifactArgs {
    /// Plugin jar to publish.
    #[arg(long, env = "SHIPWRIGHT_PLUGIN_FILE")]
    plugin_file: Option<PathBuf>,
    /// API jar to attach to the release.
    #[arg(long, env = "SHIPWRIGHT_API_FILE")]
    api_file: Option<PathBuf>,
    /// Javadoc jar to attach to the release.
    #[arg(long, env = "SHIPWRIGHT_JAVADOC_FILE")]
    javadoc_file: Option<PathBuf>,
}

impl ArtifactArgs {
    /// Release assets in upload order; absent files are left out.
    fn release_assets(&self) -> Vec<PathBuf> {
        [&self.api_file, &self.javadoc_file, &self.plugin_file]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

#[derive(Args, Clone, Debug)]
struct OreArgs {
    /// Ore API base URL.
    #[arg(long, env = "SHIPWRIGHT_ORE_URL", default_value = DEFAULT_ORE_URL)]
    ore_url: String,
    /// Ore API key.
    #[arg(long, env = "SHIPWRIGHT_ORE_API_KEY", hide_env_values = true)]
    ore_api_key: Option<String>,
    /// Ore project id.
    #[arg(long, env = "SHIPWRIGHT_ORE_PROJECT")]
    ore_project: Option<String>,
}

impl OreArgs {
    fn target(&self) -> OreTarget {
        OreTarget {
            endpoint: self.ore_url.clone(),
            api_key: non_blank(&self.ore_api_key),
            project_id: non_blank(&self.ore_project),
        }
    }
}

#[derive(Args, Clone, Debug)]
struct GitHubArgs {
    /// GitHub API base URL.
    #[arg(long, env = "SHIPWRIGHT_GITHUB_API_URL", default_value = DEFAULT_GITHUB_API_URL)]
    github_api_url: String,
    /// Token allowed to create releases.
    #[arg(long, env = "SHIPWRIGHT_GITHUB_TOKEN", hide_env_values = true)]
    github_token: Option<String>,
    /// Repository owner.
    #[arg(long, env = "SHIPWRIGHT_GITHUB_OWNER")]
    github_owner: Option<String>,
    /// Repository name.
    #[arg(long, env = "SHIPWRIGHT_GITHUB_REPO")]
    github_repo: Option<String>,
    /// Tag to create the release for.
    #[arg(long, env = "SHIPWRIGHT_RELEASE_TAG")]
    tag: Option<String>,
    /// Minecraft version named in the release title.
    #[arg(long, env = "SHIPWRIGHT_MINECRAFT_VERSION", default_value = DEFAULT_MINECRAFT_VERSION)]
    minecraft_version: String,
}

impl GitHubArgs {
    fn target(&self) -> ReleaseTarget {
        ReleaseTarget {
            api_url: self.github_api_url.clone(),
            token: non_blank(&self.github_token),
            owner: non_blank(&self.github_owner),
            repo: non_blank(&self.github_repo),
            tag: non_blank(&self.tag),
        }
    }
}

#[derive(Args, Clone, Debug)]
struct OutputArgs {
    /// Output format for results.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(ValueEnum, Copy, Clone, Debug, Eq, PartialEq)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the release level for a version.
    Classify {
        #[command(flatten)]
        version: VersionArgs,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Render release notes for a version.
    Notes {
        #[command(flatten)]
        version: VersionArgs,
        #[command(flatten)]
        project: ProjectArgs,
        /// Write notes to changelogs/ and output/ instead of printing them.
        #[arg(long)]
        write: bool,
    },
    /// Upload the plugin file to Ore.
    PublishOre {
        #[command(flatten)]
        version: VersionArgs,
        #[command(flatten)]
        project: ProjectArgs,
        #[command(flatten)]
        artifacts: ArtifactArgs,
        #[command(flatten)]
        ore: OreArgs,
        /// Publish snapshot builds too.
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Create a GitHub release and attach the build artifacts.
    PublishRelease {
        #[command(flatten)]
        version: VersionArgs,
        #[command(flatten)]
        project: ProjectArgs,
        #[command(flatten)]
        artifacts: ArtifactArgs,
        #[command(flatten)]
        github: GitHubArgs,
        /// Publish snapshot builds too.
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Write release notes, then publish to Ore and GitHub.
    Release {
        #[command(flatten)]
        version: VersionArgs,
        #[command(flatten)]
        project: ProjectArgs,
        #[command(flatten)]
        artifacts: ArtifactArgs,
        #[command(flatten)]
        ore: OreArgs,
        #[command(flatten)]
        github: GitHubArgs,
        /// Publish snapshot builds too.
        #[arg(long)]
        force: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Remove jar, md, json and yml files from the output directory.
    Clean {
        /// Output directory to clean.
        #[arg(long, env = "SHIPWRIGHT_OUTPUT_DIR", default_value = "output")]
        output_dir: PathBuf,
    },
}

#[cfg(not(test))]
fn main() -> CliResult<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { version, output } => run_classify(&version, &output)?,
        Commands::Notes {
            version,
            project,
            write,
        } => run_notes(&version, &project, write)?,
        Commands::PublishOre {
            version,
            project,
            artifacts,
            ore,
            force,
            output,
        } => {
            let notes = render_notes(&version, &project)?;
            let outcome = publish_ore_step(&version, &artifacts, &ore, force, notes)?;
            emit_outcomes(&[("ore", outcome)], &output)?;
        }
        Commands::PublishRelease {
            version,
            project,
            artifacts,
            github,
            force,
            output,
        } => {
            let notes = render_notes(&version, &project)?;
            let outcome = publish_release_step(&version, &artifacts, &github, force, notes)?;
            emit_outcomes(&[("github", outcome)], &output)?;
        }
        Commands::Release {
            version,
            project,
            artifacts,
            ore,
            github,
            force,
            output,
        } => {
            let outcomes = run_release(&version, &project, &artifacts, &ore, &github, force)?;
            emit_outcomes(&outcomes, &output)?;
        }
        Commands::Clean { output_dir } => {
            let removed = clean::clean_output_dir(&output_dir)?;
            println!(
                "Removed {} file(s) from {}.",
                removed.len(),
                output_dir.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
fn main() {}

fn run_classify(version: &VersionArgs, output: &OutputArgs) -> CliResult<()> {
    let report = LevelReport::from_descriptor(&version.descriptor());
    let contents = match output.format {
        OutputFormat::Text => render_level_text(&report),
        OutputFormat::Json => format!("{}\n", render_json(&report)?),
    };
    print!("{contents}");
    Ok(())
}

fn run_notes(version: &VersionArgs, project: &ProjectArgs, write: bool) -> CliResult<()> {
    let notes = render_notes(version, project)?;
    if !write {
        println!("{notes}");
        return Ok(());
    }
    let written = write_release_notes(
        &StdFileSystem::new(),
        &project.root,
        &version.release_version,
        &notes,
    )?;
    for path in written {
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Render release notes for the version using git metadata from the project root.
fn render_notes(version: &VersionArgs, project: &ProjectArgs) -> CliResult<String> {
    let input = notes_input(version, project);
    log::info!(
        "rendering {} release notes for {}",
        input.level,
        input.version_string
    );
    Ok(render_release_notes(
        &StdFileSystem::new(),
        &project.root,
        &input,
    )?)
}

fn notes_input(version: &VersionArgs, project: &ProjectArgs) -> ReleaseNotesInput {
    let git = GitMetadata::resolve(
        &project.root,
        project.git_hash.clone(),
        project.commit_message.clone(),
    );
    ReleaseNotesInput::from_descriptor(&version.descriptor(), git.hash, git.message)
}

fn publish_ore_step(
    version: &VersionArgs,
    artifacts: &ArtifactArgs,
    ore: &OreArgs,
    force: bool,
    notes: String,
) -> CliResult<PublishOutcome> {
    let request = OreRequest {
        level: version.descriptor().level(),
        force,
        artifact: artifacts.plugin_file.clone(),
        description: notes,
    };
    Ok(publish_to_ore(&ore.target(), &request)?)
}

fn publish_release_step(
    version: &VersionArgs,
    artifacts: &ArtifactArgs,
    github: &GitHubArgs,
    force: bool,
    notes: String,
) -> CliResult<PublishOutcome> {
    let descriptor = version.descriptor();
    let request = ReleaseRequest {
        level: descriptor.level(),
        force,
        version_string: descriptor.version_string(),
        minecraft_version: github.minecraft_version.clone(),
        notes,
        assets: artifacts.release_assets(),
    };
    Ok(publish_release(&github.target(), &request)?)
}

/// Write notes, then publish to Ore and GitHub in that order.
///
/// A failure in either publisher stops the run.
fn run_release(
    version: &VersionArgs,
    project: &ProjectArgs,
    artifacts: &ArtifactArgs,
    ore: &OreArgs,
    github: &GitHubArgs,
    force: bool,
) -> CliResult<Vec<(&'static str, PublishOutcome)>> {
    let notes = render_notes(version, project)?;
    write_release_notes(
        &StdFileSystem::new(),
        &project.root,
        &version.release_version,
        &notes,
    )?;
    let ore_outcome = publish_ore_step(version, artifacts, ore, force, notes.clone())?;
    let github_outcome = publish_release_step(version, artifacts, github, force, notes)?;
    Ok(vec![("ore", ore_outcome), ("github", github_outcome)])
}

#[derive(Serialize)]
struct OutcomeEntry<'a> {
    target: &'a str,
    outcome: &'a PublishOutcome,
}

fn emit_outcomes(outcomes: &[(&str, PublishOutcome)], output: &OutputArgs) -> CliResult<()> {
    let contents = match output.format {
        OutputFormat::Text => render_outcomes_text(outcomes),
        OutputFormat::Json => {
            let entries: Vec<OutcomeEntry<'_>> = outcomes
                .iter()
                .map(|(target, outcome)| OutcomeEntry {
                    target: *target,
                    outcome,
                })
                .collect();
            format!("{}\n", render_json(&entries)?)
        }
    };
    print!("{contents}");
    Ok(())
}

fn render_outcomes_text(outcomes: &[(&str, PublishOutcome)]) -> String {
    let mut output = String::new();
    for (target, outcome) in outcomes {
        let _ = writeln!(output, "{target}: {outcome}");
    }
    output
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

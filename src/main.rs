use anyhow::Result;
use clap::{Parser, Subcommand};

use git_semver::changes::ChangeDetector;
use git_semver::config::{self, Config};
use git_semver::decorate::{ContextDecorator, DecorateOptions};
use git_semver::domain::BumpLevel;
use git_semver::git::{Credentials, Git2Repository};
use git_semver::policy::next_version;
use git_semver::resolver::CurrentVersionResolver;
use git_semver::tagger::TagWriter;
use git_semver::ui;

#[derive(Parser)]
#[command(
    name = "git-semver",
    about = "Resolve, decorate and tag semantic versions from git history"
)]
struct Cli {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(long, default_value = ".", help = "Path to the git repository")]
    repo: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve and print the version for the current build context
    Current {
        #[arg(
            short,
            long,
            help = "Branch to resolve; defaults to the configured base branch"
        )]
        branch: Option<String>,

        #[arg(short, long, help = "Configured module to scope the resolution to")]
        module: Option<String>,

        #[arg(long, help = "Commit for the already-tagged check instead of HEAD")]
        head: Option<String>,

        #[arg(long, help = "Print the undecorated version")]
        plain: bool,
    },

    /// Compute the next version, tag HEAD with it and push the tag
    Bump {
        #[arg(help = "Bump level: major, minor, patch or rc")]
        level: String,

        #[arg(long, help = "Produce a final release instead of a release candidate")]
        finalize: bool,

        #[arg(
            short,
            long,
            help = "Branch to resolve; defaults to the configured base branch"
        )]
        branch: Option<String>,

        #[arg(short, long, help = "Configured module to bump")]
        module: Option<String>,

        #[arg(long, help = "Prefix the tag with a branch name (unscoped tags only)")]
        branch_prefix: Option<String>,

        #[arg(long, help = "Username for remote operations")]
        username: Option<String>,

        #[arg(long, help = "Token for remote operations")]
        token: Option<String>,

        #[arg(long, help = "Preview what would happen without making changes")]
        dry_run: bool,
    },

    /// Check whether a module changed since its last release tag
    Changed {
        #[arg(short, long, help = "Configured module to check")]
        module: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match config::load_config(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    let repo = match Git2Repository::open(&cli.repo) {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&format!("Git repository error: {}", e));
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Current {
            branch,
            module,
            head,
            plain,
        } => run_current(&repo, &config, branch, module, head, plain),
        Command::Bump {
            level,
            finalize,
            branch,
            module,
            branch_prefix,
            username,
            token,
            dry_run,
        } => run_bump(
            &repo,
            &config,
            &level,
            finalize,
            branch,
            module,
            branch_prefix,
            username,
            token,
            dry_run,
        ),
        Command::Changed { module } => run_changed(&repo, &config, &module),
    }
}

fn lookup_module(
    config: &Config,
    name: Option<&str>,
) -> Option<git_semver::domain::ModuleScope> {
    let name = name?;
    match config.module_scope(name) {
        Some(scope) => Some(scope),
        None => {
            ui::display_error(&format!(
                "Module '{}' is not configured in gitsemver.toml",
                name
            ));
            std::process::exit(1);
        }
    }
}

fn run_current(
    repo: &Git2Repository,
    config: &Config,
    branch: Option<String>,
    module: Option<String>,
    head: Option<String>,
    plain: bool,
) -> Result<()> {
    let branch = branch.unwrap_or_else(|| config.base_branch.clone());
    let scope = lookup_module(config, module.as_deref());

    let resolver = CurrentVersionResolver::new(repo);
    let current = resolver.resolve(&branch, scope.as_ref());

    let rendered = if plain {
        current.to_string()
    } else {
        let options = DecorateOptions {
            base_branch: config.base_branch.clone(),
            beta_prefixes: config.beta_prefixes.clone(),
            beta_strategy: config.beta_strategy,
        };
        let decorator = ContextDecorator::new(repo, options);
        decorator.decorate(&current, &branch, scope.as_ref(), head.as_deref())
    };

    println!("{}", rendered);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_bump(
    repo: &Git2Repository,
    config: &Config,
    level: &str,
    finalize: bool,
    branch: Option<String>,
    module: Option<String>,
    branch_prefix: Option<String>,
    username: Option<String>,
    token: Option<String>,
    dry_run: bool,
) -> Result<()> {
    let level: BumpLevel = match level.parse() {
        Ok(level) => level,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let branch = branch.unwrap_or_else(|| config.base_branch.clone());
    let scope = lookup_module(config, module.as_deref());

    let credentials = match (username, token) {
        (Some(username), Some(token)) => Some(Credentials::new(username, token)),
        (None, None) => None,
        _ => {
            ui::display_error("--username and --token must be supplied together");
            std::process::exit(1);
        }
    };

    // A module release only makes sense when the module actually changed
    if let Some(scope) = &scope {
        let detector = ChangeDetector::new(repo);
        if !detector.has_changed(Some(&scope.tag_suffix), &scope.paths) {
            ui::display_warning(&format!(
                "Module '{}' is unchanged since its last release; nothing to bump",
                scope.tag_suffix
            ));
            return Ok(());
        }
    }

    let resolver = CurrentVersionResolver::with_credentials(repo, credentials.clone());
    let current = resolver.resolve(&branch, scope.as_ref());
    ui::display_resolved_version(&branch, &current.to_string());

    let next = next_version(current, level, finalize);
    ui::display_status(&format!("Bumping {} to {}", level, next));

    if dry_run {
        let name =
            TagWriter::<Git2Repository>::tag_name(&next, scope.as_ref(), branch_prefix.as_deref());
        ui::display_success(&format!(
            "Dry run: would create tag {} and push it to {}",
            name, config.remote
        ));
        return Ok(());
    }

    let writer = TagWriter::new(repo);
    match writer.publish(
        &next,
        scope.as_ref(),
        branch_prefix.as_deref(),
        &config.remote,
        credentials.as_ref(),
    ) {
        Ok(tag) => {
            ui::display_published(&tag, &config.remote);
            Ok(())
        }
        Err(e) => {
            ui::display_error(&format!("Failed to publish version: {}", e));
            std::process::exit(1);
        }
    }
}

fn run_changed(repo: &Git2Repository, config: &Config, module: &str) -> Result<()> {
    let scope = match config.module_scope(module) {
        Some(scope) => scope,
        None => {
            ui::display_error(&format!(
                "Module '{}' is not configured in gitsemver.toml",
                module
            ));
            std::process::exit(1);
        }
    };

    let detector = ChangeDetector::new(repo);
    if detector.has_changed(Some(&scope.tag_suffix), &scope.paths) {
        ui::display_success(&format!("Module '{}' has changed", module));
        Ok(())
    } else {
        ui::display_status(&format!("Module '{}' is unchanged", module));
        std::process::exit(1);
    }
}

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::env;
use std::path::{Path, PathBuf};
use std::process::exit;
use std::sync::Arc;

use crate::application::services::{DependencyResolver, ResolveError};
use crate::application::use_cases::{
    CloneLibrariesUseCase, CommitAllUseCase, DiffAllUseCase, StatusCheckConfig,
    StatusCheckUseCase, UpdateMode, UpdateRepositoriesUseCase,
};
use crate::domain::entities::OperationResult;
use crate::infrastructure::filesystem::{ConfigStore, WorkspaceConfig};
use crate::infrastructure::git::{GitOperationRunner, GitRunnerConfig, RepositoryOperations};
use crate::infrastructure::registry::{RegistryClient, RegistryClientConfig, RegistrySource};
use crate::presentation::ui::display::{helpers, tally, DisplayHelper};

/// Version string shown by `--version`
pub const VERSION_INFO: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LIBWS_GIT_HASH"),
    " ",
    env!("LIBWS_BUILD_DATE"),
    ")"
);

/// Output format options for list and status
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// libws - manage a workspace of registry libraries
#[derive(Parser)]
#[command(name = "libws")]
#[command(about = "Clone registry libraries with their dependencies and run git across all of them")]
#[command(version = VERSION_INFO)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<String>,

    /// Registry URL or local catalog file
    #[arg(long, global = true, env = "LIBWS_REGISTRY")]
    pub registry: Option<String>,

    /// Maximum number of parallel git processes
    #[arg(short, long, global = true)]
    pub jobs: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the libraries available in the registry
    List {
        /// Output format (text, json, yaml)
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Clone libraries and all of their dependencies
    Clone {
        /// Library machine names
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Clone the dependencies listed in a library's library.json
    Setup {
        /// Library directory (defaults to current directory)
        dir: Option<String>,
    },

    /// Pull every repository in the workspace
    Pull,

    /// Push every repository in the workspace
    Push,

    /// Show repository status
    Status {
        /// Also list repositories without changes
        #[arg(short, long)]
        all: bool,

        /// Output format (text, json, yaml)
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Stage and commit all changes in every repository
    Commit {
        /// Commit message
        message: String,
    },

    /// Print one combined diff for the whole workspace
    Diff {
        /// Write the patch to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
    display: DisplayHelper,
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

impl CliApp {
    pub fn new() -> Self {
        Self::from_cli(Cli::parse())
    }

    pub fn from_cli(cli: Cli) -> Self {
        let display = helpers::auto_display(cli.no_color);
        Self { cli, display }
    }

    pub fn verbose(&self) -> bool {
        self.cli.verbose
    }

    pub async fn run(self) -> anyhow::Result<()> {
        colored::control::set_override(self.display.use_color);

        // Change directory if specified
        if let Some(ref dir) = self.cli.directory {
            env::set_current_dir(dir)
                .with_context(|| format!("Cannot change directory to {}", dir))?;
        }

        match self.handle_command().await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {:#}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self) -> Result<()> {
        let root = env::current_dir()?;
        let config = self.load_config(&root)?;

        match &self.cli.command {
            Commands::List { output } => self.handle_list_command(&config, *output).await,
            Commands::Clone { names } => self.handle_clone_command(&root, &config, names).await,
            Commands::Setup { dir } => {
                let dir = dir.as_deref().map(PathBuf::from).unwrap_or_else(|| root.clone());
                self.handle_setup_command(&root, &config, &dir).await
            }
            Commands::Pull => self.handle_update_command(&root, &config, UpdateMode::Pull).await,
            Commands::Push => self.handle_update_command(&root, &config, UpdateMode::Push).await,
            Commands::Status { all, output } => {
                self.handle_status_command(&root, &config, *all, *output).await
            }
            Commands::Commit { message } => {
                self.handle_commit_command(&root, &config, message).await
            }
            Commands::Diff { output } => {
                self.handle_diff_command(&root, &config, output.as_deref()).await
            }
        }
    }

    /// Read `libws.yaml` and apply command-line overrides
    fn load_config(&self, root: &Path) -> Result<WorkspaceConfig> {
        let mut config = ConfigStore::new().load(root)?;
        if let Some(registry) = &self.cli.registry {
            config.registry_url = registry.clone();
        }
        if let Some(jobs) = self.cli.jobs {
            if jobs == 0 {
                return Err(anyhow!("--jobs must be at least 1"));
            }
            config.max_parallel = jobs;
        }
        Ok(config)
    }

    fn registry_client(&self, config: &WorkspaceConfig) -> Result<Arc<RegistryClient>> {
        let mut client_config = RegistryClientConfig::new(&config.registry_url);
        if let Some(timeout) = config.timeout_seconds {
            client_config = client_config.with_timeout(timeout);
        }
        Ok(Arc::new(RegistryClient::new(client_config)?))
    }

    fn runner(&self, config: &WorkspaceConfig) -> Arc<dyn RepositoryOperations> {
        Arc::new(GitOperationRunner::with_config(GitRunnerConfig {
            git_executable: config.git_executable.clone(),
            ssh_command: config.ssh_command.clone(),
            timeout_seconds: config.timeout_seconds,
        }))
    }

    async fn handle_list_command(&self, config: &WorkspaceConfig, output: OutputFormat) -> Result<()> {
        let client = self.registry_client(config)?;
        let registry = client.fetch().await?;
        let libraries = registry.sorted();

        match output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&libraries)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&libraries)?),
            OutputFormat::Text => {
                if libraries.is_empty() {
                    self.display.info("The registry lists no libraries");
                    return Ok(());
                }
                let rows: Vec<Vec<String>> = libraries
                    .iter()
                    .map(|library| {
                        vec![
                            library.machine_name.clone(),
                            library.version(),
                            library.dependencies.join(", "),
                        ]
                    })
                    .collect();
                self.display
                    .print_table(&["Library", "Version", "Dependencies"], &rows);
            }
        }
        Ok(())
    }

    async fn handle_clone_command(
        &self,
        root: &Path,
        config: &WorkspaceConfig,
        names: &[String],
    ) -> Result<()> {
        let mut use_case = self.clone_use_case(root, config)?;

        self.display
            .info(&format!("Resolving dependencies of {}", names.join(", ")));
        let errors = use_case.prepare(names).await?;

        self.drive_clone_queue(&mut use_case, errors).await
    }

    async fn handle_setup_command(&self, root: &Path, config: &WorkspaceConfig, dir: &Path) -> Result<()> {
        let mut use_case = self.clone_use_case(root, config)?;

        self.display.info(&format!(
            "Resolving dependencies listed in {}",
            self.display.format_path(&dir.display().to_string())
        ));
        let errors = use_case.prepare_from_version_file(dir).await?;

        self.drive_clone_queue(&mut use_case, errors).await
    }

    fn clone_use_case(&self, root: &Path, config: &WorkspaceConfig) -> Result<CloneLibrariesUseCase> {
        let client: Arc<dyn RegistrySource> = self.registry_client(config)?;
        Ok(CloneLibrariesUseCase::new(
            DependencyResolver::new(client),
            self.runner(config),
            root,
        ))
    }

    async fn drive_clone_queue(
        &self,
        use_case: &mut CloneLibrariesUseCase,
        resolve_errors: Vec<ResolveError>,
    ) -> Result<()> {
        for error in &resolve_errors {
            self.display.error(&error.to_string());
        }

        let total = use_case.total();
        let mut results = Vec::with_capacity(total);
        while let Some(target) = use_case.upcoming() {
            let spinner = self.display.create_spinner(&format!("Cloning {}", target.name));
            spinner.set_prefix(format!("[{}/{}]", results.len() + 1, total));

            let Some((_, result)) = use_case.step().await else {
                spinner.finish_and_clear();
                break;
            };
            spinner.finish_and_clear();
            self.display.print_result(&result);
            results.push(result);
        }

        self.finish(&results, resolve_errors.len(), "Clone")
    }

    async fn handle_update_command(&self, root: &Path, config: &WorkspaceConfig, mode: UpdateMode) -> Result<()> {
        let mut use_case = UpdateRepositoriesUseCase::new(self.runner(config), mode);
        let total = use_case.prepare(root).await?;
        if total == 0 {
            self.display.warning("No repositories found in this workspace");
            return Ok(());
        }

        let verb = match mode {
            UpdateMode::Pull => "Pulling",
            UpdateMode::Push => "Pushing",
        };

        let mut results = Vec::with_capacity(total);
        while let Some(record) = use_case.upcoming() {
            let spinner = self.display.create_spinner(&format!("{} {}", verb, record.name));
            spinner.set_prefix(format!("[{}/{}]", results.len() + 1, total));

            let Some(result) = use_case.step().await else {
                spinner.finish_and_clear();
                break;
            };
            spinner.finish_and_clear();
            self.display.print_result(&result);
            results.push(result);
        }

        let title = match mode {
            UpdateMode::Pull => "Pull",
            UpdateMode::Push => "Push",
        };
        self.finish(&results, 0, title)
    }

    async fn handle_status_command(
        &self,
        root: &Path,
        config: &WorkspaceConfig,
        all: bool,
        output: OutputFormat,
    ) -> Result<()> {
        let use_case = StatusCheckUseCase::new(
            self.runner(config),
            StatusCheckConfig::default()
                .with_show_all(all)
                .with_max_parallel(config.max_parallel),
        );
        let report = use_case.execute(root).await?;

        match output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report.results)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&report.results)?),
            OutputFormat::Text => {
                for result in &report.results {
                    self.display.print_repository_status(result);
                }
                if report.dirty_count() == 0 && report.failed_count() == 0 {
                    self.display.success(&format!(
                        "All {} repositories are clean",
                        report.scanned
                    ));
                }
            }
        }

        if report.failed_count() > 0 {
            return Err(anyhow!(
                "Status failed for {} repositories",
                report.failed_count()
            ));
        }
        Ok(())
    }

    async fn handle_commit_command(&self, root: &Path, config: &WorkspaceConfig, message: &str) -> Result<()> {
        let results = CommitAllUseCase::new(self.runner(config), config.max_parallel)
            .execute(root, message)
            .await?;

        for result in &results {
            self.display.print_result(result);
        }
        self.finish(&results, 0, "Commit")
    }

    async fn handle_diff_command(&self, root: &Path, config: &WorkspaceConfig, output: Option<&Path>) -> Result<()> {
        let diff = DiffAllUseCase::new(self.runner(config), config.max_parallel)
            .execute(root)
            .await?;

        for failure in &diff.failures {
            if let Some(error) = failure.error() {
                self.display
                    .error(&format!("{}: {}", failure.repository, error));
            }
        }

        match output {
            Some(path) => {
                std::fs::write(path, &diff.patch)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                // Keep stdout free for piping; the notice goes to stderr
                eprintln!(
                    "Wrote diff of {} repositories to {}",
                    diff.changed.len(),
                    path.display()
                );
            }
            None => print!("{}", diff.patch),
        }

        if !diff.failures.is_empty() {
            return Err(anyhow!("Diff failed for {} repositories", diff.failures.len()));
        }
        Ok(())
    }

    /// Print the summary and turn failures into the exit status
    fn finish(&self, results: &[OperationResult], resolve_errors: usize, title: &str) -> Result<()> {
        let (ok, unchanged, failed) = tally(results);

        if self.cli.verbose || failed > 0 || resolve_errors > 0 {
            let mut items = vec![
                ("Succeeded".to_string(), ok.to_string()),
                ("Unchanged".to_string(), unchanged.to_string()),
                ("Failed".to_string(), failed.to_string()),
            ];
            if resolve_errors > 0 {
                items.push(("Unresolved".to_string(), resolve_errors.to_string()));
            }
            self.display.print_summary(title, &items);
        }

        if failed > 0 || resolve_errors > 0 {
            return Err(anyhow!(
                "{} finished with {} failed repositories and {} unresolved libraries",
                title,
                failed,
                resolve_errors
            ));
        }
        Ok(())
    }
}

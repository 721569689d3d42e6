use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use buildview::{classify_step_urls, BuildAction, BuildbotClient, Config};

use crate::output::{self, Spinner, StepRow};

#[derive(Parser)]
#[command(name = "buildview")]
#[command(author, version, about = "Buildbot pipeline viewer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./buildview.toml and friends)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Buildbot base URL, overriding the configuration file
    #[arg(short, long, global = true, env = "BUILDVIEW_BACKEND")]
    backend: Option<String>,

    /// Log lines fetched per page, overriding the configuration file
    #[arg(long, global = true)]
    log_limit: Option<u64>,

    /// Print JSON instead of tables
    #[arg(short, long, global = true, default_value_t = false)]
    json: bool,

    #[arg(short, long, global = true, default_value_t = false)]
    pretty: bool,

    /// Write output to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all builders
    Builders,
    /// List all workers
    Workers,
    /// Recent builds of one or more builders
    Builds {
        #[arg(required = true)]
        builder: Vec<u64>,
    },
    /// Show a build by builder id and build number
    Build { builderid: u64, number: u64 },
    /// Steps of a build, with their links resolved
    Steps { buildid: u64 },
    /// Print a page of log content
    Log {
        logid: u64,
        #[arg(long)]
        offset: Option<u64>,
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Stop a running build
    Stop { buildid: u64 },
    /// Rebuild a finished build
    Rebuild { buildid: u64 },
    /// Resolve builder ids to names
    Names {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(backend) = &self.backend {
            config.server.backend = backend.clone();
        }
        if let Some(limit) = self.log_limit {
            config.server.log_limit = limit;
        }
        config.output.json |= self.json;
        config.output.pretty |= self.pretty;
        Ok(config)
    }

    fn emit(
        &self,
        config: &Config,
        value: &impl Serialize,
        rendered: impl FnOnce() -> String,
    ) -> Result<()> {
        let text = if config.output.json {
            if config.output.pretty {
                serde_json::to_string_pretty(value)?
            } else {
                serde_json::to_string(value)?
            }
        } else {
            rendered()
        };

        if let Some(output_path) = &self.output {
            std::fs::write(output_path, text)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            info!("Output written to: {}", output_path.display());
        } else {
            println!("{text}");
        }

        Ok(())
    }

    async fn execute_steps(
        &self,
        config: &Config,
        client: &BuildbotClient,
        buildid: u64,
    ) -> Result<()> {
        let spinner = Spinner::start("Fetching steps");
        let steps = client.build_steps(buildid).await?;

        let rows: Vec<StepRow> = steps
            .into_iter()
            .map(|mut step| {
                let links = classify_step_urls(std::mem::take(&mut step.urls));
                StepRow { step, links }
            })
            .collect();

        let reqids: Vec<u64> = rows
            .iter()
            .flat_map(|row| row.links.requests.iter().map(|req| req.reqid))
            .collect();
        let bnums: Vec<String> = rows
            .iter()
            .flat_map(|row| row.links.builds.iter().map(|link| link.bnum.clone()))
            .collect();

        let (mut children, by_number) = tokio::try_join!(
            client.builds_by_request(&reqids, &["owners"]),
            client.builds_by_number(&bnums),
        )?;
        children.extend(by_number);

        let mut builder_ids: Vec<u64> = children.iter().map(|build| build.builderid).collect();
        builder_ids.extend(
            rows.iter()
                .flat_map(|row| row.links.builds.iter().map(|link| link.builderid)),
        );
        let names = client.resolve_names(&builder_ids).await?;
        spinner.finish("Fetched steps");

        self.emit(config, &rows, || {
            output::render_steps(&rows, &children, &names, output::now())
        })
    }

    pub async fn execute(&self) -> Result<()> {
        let config = self.load_config()?;
        info!("Using Buildbot at {}", config.server.backend);
        let client = BuildbotClient::new(&config.server)?;

        match &self.command {
            Commands::Builders => {
                let spinner = Spinner::start("Fetching builders");
                let builders = client.all_builders().await?;
                spinner.finish("Fetched builders");
                self.emit(&config, &builders, || output::render_builders(&builders))
            }
            Commands::Workers => {
                let spinner = Spinner::start("Fetching workers");
                let workers = client.workers().await?;
                spinner.finish("Fetched workers");
                self.emit(&config, &workers, || output::render_workers(&workers))
            }
            Commands::Builds { builder } => {
                let spinner = Spinner::start("Fetching builds");
                let builds = client.builder_builds(builder, &["owners"]).await?;
                let names = client.resolve_names(builder).await?;
                spinner.finish("Fetched builds");
                self.emit(&config, &builds, || {
                    output::render_builds(&builds, &names, output::now())
                })
            }
            Commands::Build { builderid, number } => {
                let spinner = Spinner::start("Fetching build");
                let Some(build) = client.build_by_number(*builderid, *number).await? else {
                    anyhow::bail!("Build {builderid}-{number} not found");
                };
                let name = client.resolve_name(build.builderid).await?;
                spinner.finish("Fetched build");
                self.emit(&config, &build, || {
                    output::render_build(&build, &name, output::now())
                })
            }
            Commands::Steps { buildid } => self.execute_steps(&config, &client, *buildid).await,
            Commands::Log { logid, offset, limit } => {
                let limit = limit.unwrap_or(config.server.log_limit);
                let chunks = client.log_content(*logid, *offset, Some(limit)).await?;
                self.emit(&config, &chunks, || output::render_log(&chunks))
            }
            Commands::Stop { buildid } => {
                self.execute_action(&config, &client, *buildid, BuildAction::Stop)
                    .await
            }
            Commands::Rebuild { buildid } => {
                self.execute_action(&config, &client, *buildid, BuildAction::Rebuild).await
            }
            Commands::Names { ids } => {
                let names = client.resolve_names(ids).await?;
                self.emit(&config, &names, || output::render_names(&names))
            }
        }
    }

    async fn execute_action(
        &self,
        config: &Config,
        client: &BuildbotClient,
        buildid: u64,
        action: BuildAction,
    ) -> Result<()> {
        info!("Sending '{action}' to build {buildid}");
        let response = client.build_action(buildid, action).await?;
        let pretty = serde_json::to_string_pretty(&response)?;
        self.emit(config, &response, || pretty)
    }
}

use anyhow::{bail, Context, Result};
use azcanvas_core::{CanvasConfig, DesignSession, GenerateOptions, Services};
use azcanvas_model::{GlobalConfig, LandingZoneCatalog, ResourceRecord};
use azcanvas_naming::{NameSuggester, NameValidator, NamingContext};
use azcanvas_pipeline::{drive, PipelineEvent, PipelineStatus, TokioClock};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

/// Accepted shapes of a `generate --input` file
#[derive(Deserialize)]
#[serde(untagged)]
enum InputDocument {
    Records(Vec<ResourceRecord>),
    Canvas {
        #[serde(default)]
        global: Option<GlobalConfig>,
        resources: Vec<ResourceRecord>,
    },
}

fn cli() -> Command {
    let config_arg = Arg::new("config")
        .long("config")
        .value_parser(value_parser!(PathBuf))
        .help("TOML configuration file");

    Command::new("azcanvas")
        .version(azcanvas_core::VERSION)
        .about("Azure infrastructure canvas: naming, Terraform generation and simulated pipelines")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("validate")
                .about("Validate a resource name")
                .arg(Arg::new("type").required(true).help("Resource type key, e.g. storage_account"))
                .arg(Arg::new("name").required(true).help("Candidate name")),
        )
        .subcommand(
            Command::new("suggest")
                .about("Suggest a resource name")
                .arg(Arg::new("type").required(true).help("Resource type key"))
                .arg(
                    Arg::new("ordinal")
                        .long("ordinal")
                        .default_value("1")
                        .value_parser(value_parser!(u32))
                        .help("Instance number"),
                )
                .arg(Arg::new("project").long("project").default_value("proj"))
                .arg(Arg::new("env").long("env").default_value("dev"))
                .arg(Arg::new("region").long("region").default_value("eastus")),
        )
        .subcommand(
            Command::new("generate")
                .about("Generate Terraform for a saved canvas")
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON file with resource records"),
                )
                .arg(config_arg.clone())
                .arg(
                    Arg::new("token")
                        .long("token")
                        .help("Access token for private module output"),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the document here instead of stdout"),
                ),
        )
        .subcommand(Command::new("landing-zones").about("List built-in landing zones"))
        .subcommand(
            Command::new("simulate")
                .about("Run a simulated pipeline")
                .arg(
                    Arg::new("deployment")
                        .long("deployment")
                        .action(ArgAction::SetTrue)
                        .help("Simulate a deployment instead of a build"),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_parser(value_parser!(u64))
                        .help("Randomize step timing and failures with this seed"),
                )
                .arg(config_arg),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,azcanvas_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("validate", args)) => validate(args),
        Some(("suggest", args)) => {
            suggest(args);
            Ok(())
        }
        Some(("generate", args)) => generate(args).await,
        Some(("landing-zones", _)) => landing_zones(),
        Some(("simulate", args)) => simulate(args).await,
        _ => bail!("no subcommand given"),
    }
}

fn string_arg<'a>(args: &'a ArgMatches, id: &str) -> &'a str {
    args.get_one::<String>(id).map_or("", String::as_str)
}

fn load_config(args: &ArgMatches) -> Result<CanvasConfig> {
    match args.get_one::<PathBuf>("config") {
        Some(path) => CanvasConfig::load(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(CanvasConfig::default()),
    }
}

fn validate(args: &ArgMatches) -> Result<()> {
    let result = NameValidator::azure().validate(string_arg(args, "type"), string_arg(args, "name"));
    for warning in result.warning_messages() {
        println!("warning: {warning}");
    }
    if result.is_valid() {
        println!("valid");
        return Ok(());
    }
    for error in result.error_messages() {
        println!("error: {error}");
    }
    bail!("name is invalid")
}

fn suggest(args: &ArgMatches) {
    let ctx = NamingContext::new(
        string_arg(args, "project"),
        string_arg(args, "env"),
        string_arg(args, "region"),
    );
    let ordinal = args.get_one::<u32>("ordinal").copied().unwrap_or(1);
    println!("{}", NameSuggester::azure().suggest(string_arg(args, "type"), ordinal, &ctx));
}

async fn generate(args: &ArgMatches) -> Result<()> {
    let config = load_config(args)?;
    let input = args
        .get_one::<PathBuf>("input")
        .context("--input is required")?;
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("reading {}", input.display()))?;
    let document: InputDocument =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", input.display()))?;

    let services = Arc::new(Services::from_config(&config)?);
    services.initialize()?;
    let mut session = DesignSession::new(Arc::clone(&services), config);
    let records = match document {
        InputDocument::Records(records) => records,
        InputDocument::Canvas { global, resources } => {
            if let Some(global) = global {
                session.set_global(global);
            }
            resources
        }
    };
    session.import_records(records)?;

    let options = match args.get_one::<String>("token") {
        Some(token) => GenerateOptions::private_module(token),
        None => GenerateOptions::inline(),
    };
    let generated = session.generate(&options).await?;
    for warning in &generated.warnings {
        tracing::warn!("{warning}");
    }

    match args.get_one::<PathBuf>("output") {
        Some(path) => std::fs::write(path, generated.code.as_bytes())
            .with_context(|| format!("writing {}", path.display()))?,
        None => print!("{}", generated.code),
    }
    services.teardown();
    Ok(())
}

fn landing_zones() -> Result<()> {
    let catalog = LandingZoneCatalog::builtin()?;
    for zone in catalog.iter() {
        println!("{:<16} {} ({} resources)", zone.id, zone.name, zone.members.len());
        if !zone.description.is_empty() {
            println!("{:<16} {}", "", zone.description);
        }
    }
    Ok(())
}

async fn simulate(args: &ArgMatches) -> Result<()> {
    let mut config = load_config(args)?;
    if let Some(seed) = args.get_one::<u64>("seed") {
        config.pipeline.seed = Some(*seed);
    }
    let tick = config.pipeline.tick();

    let services = Arc::new(Services::from_config(&config)?);
    services.initialize()?;
    let session = DesignSession::new(Arc::clone(&services), config);
    let mut run = if args.get_flag("deployment") {
        session.deployment_pipeline()?
    } else {
        session.build_pipeline()?
    };

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = stop_tx.send(true);
        }
    });

    let status = drive(&mut run, &TokioClock::new(), tick, stop_rx).await?;
    for event in run.events() {
        println!("{:>8.2}s  {}", event.at().as_secs_f64(), describe(event));
    }
    services.teardown();

    if status == PipelineStatus::Completed {
        Ok(())
    } else {
        bail!("pipeline {status}")
    }
}

fn describe(event: &PipelineEvent) -> String {
    match event {
        PipelineEvent::PipelineStarted { .. } => "pipeline started".to_string(),
        PipelineEvent::StepStarted { name, .. } => format!("  {name} ..."),
        PipelineEvent::StepCompleted { name, .. } => format!("  {name} done"),
        PipelineEvent::StepFailed { name, .. } => format!("  {name} FAILED"),
        PipelineEvent::PipelineCompleted { .. } => "pipeline completed".to_string(),
        PipelineEvent::PipelineFailed { reason, .. } => format!("pipeline failed: {reason:?}"),
    }
}

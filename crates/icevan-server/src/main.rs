use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use icevan_server::{build_router, logging, LogFormat, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

fn config_arg() -> Arg {
    Arg::new("config")
        .long("config")
        .short('c')
        .value_parser(value_parser!(PathBuf))
        .help("Path to a TOML config file (defaults to $ICEVAN_CONFIG)")
}

fn cli() -> Command {
    Command::new("icevan-server")
        .version(icevan_server::VERSION)
        .about("Ice Van asset store admin server")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Run the HTTP server")
                .arg(config_arg())
                .arg(
                    Arg::new("bind")
                        .long("bind")
                        .value_parser(value_parser!(SocketAddr))
                        .help("Address to listen on"),
                )
                .arg(
                    Arg::new("public-dir")
                        .long("public-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Public root holding the asset folders"),
                )
                .arg(
                    Arg::new("log-format")
                        .long("log-format")
                        .value_parser(["text", "json"])
                        .help("Log output format"),
                ),
        )
        .subcommand(
            Command::new("folders")
                .about("Print the effective folder allow-list")
                .arg(config_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn load_config(args: &ArgMatches) -> anyhow::Result<ServerConfig> {
    let path = args.get_one::<PathBuf>("config");
    ServerConfig::resolve(path.map(PathBuf::as_path)).context("loading configuration")
}

async fn serve(args: &ArgMatches) -> anyhow::Result<()> {
    let mut config = load_config(args)?;
    if let Some(bind) = args.get_one::<SocketAddr>("bind") {
        config.bind = *bind;
    }
    if let Some(dir) = args.get_one::<PathBuf>("public-dir") {
        config.public_dir.clone_from(dir);
    }
    if let Some(format) = args.get_one::<String>("log-format") {
        config.logging.format = format.parse::<LogFormat>().map_err(anyhow::Error::msg)?;
    }

    logging::init(&config.logging).context("installing tracing subscriber")?;

    let app = build_router(&config)?;
    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;

    tracing::info!(
        bind = %config.bind,
        public_dir = %config.public_dir.display(),
        next_position = ?config.next_position,
        serialize_folder_writes = config.serialize_folder_writes,
        "Ice Van server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}

fn folders(args: &ArgMatches) -> anyhow::Result<()> {
    let config = load_config(args)?;
    let registry = config.registry()?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(registry.folders())?);
    } else {
        for folder in registry.folders() {
            println!("{folder}");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("serve", args)) => serve(args).await,
        Some(("folders", args)) => folders(args),
        _ => unreachable!("subcommand_required"),
    }
}

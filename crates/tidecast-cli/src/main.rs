use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::path::PathBuf;

use tidecast_cli::config::ServerConfig;
use tidecast_cli::server::{self, AppState};
use tidecast_cli::startup;

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .help("Path to a JSON server configuration file")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn data_arg() -> Arg {
    Arg::new("data")
        .short('d')
        .long("data")
        .help(
            "Path to the historical sea-level table (CSV/TSV with Year and GMSL_GIA columns). \
             Overrides data_path from the configuration file.",
        )
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::FilePath)
}

fn models_dir_arg() -> Arg {
    Arg::new("models_dir")
        .short('m')
        .long("models-dir")
        .help("Directory holding the serialized model artifacts")
        .value_parser(clap::value_parser!(PathBuf))
        .value_hint(ValueHint::DirPath)
}

fn mode_arg() -> Arg {
    Arg::new("mode")
        .long("mode")
        .help("Train models at startup or load pretrained artifacts")
        .value_parser(["train", "pretrained"])
}

fn shape_arg() -> Arg {
    Arg::new("shape")
        .long("shape")
        .help("Response layout: full window series or target-year point")
        .value_parser(["series", "point"])
}

fn present_year_arg() -> Arg {
    Arg::new("present_year")
        .long("present-year")
        .help("Year treated as the present; acceleration applies after it")
        .value_parser(clap::value_parser!(i32))
}

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("TIDECAST_LOG", "error,tidecast=info"))
        .init();

    let matches = Command::new("tidecast")
        .version(clap::crate_version!())
        .about("\u{1F30A} tidecast - Regional sea-level rise projections from a regression ensemble")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Serve projections over HTTP")
                .arg(config_arg())
                .arg(mode_arg())
                .arg(shape_arg())
                .arg(data_arg())
                .arg(models_dir_arg())
                .arg(present_year_arg())
                .arg(
                    Arg::new("host")
                        .long("host")
                        .help("Interface to listen on")
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .help("Port to listen on")
                        .value_parser(clap::value_parser!(u16)),
                ),
        )
        .subcommand(
            Command::new("train")
                .about("Fit the ensemble from the historical table and save the model artifacts")
                .arg(config_arg())
                .arg(data_arg())
                .arg(models_dir_arg()),
        )
        .subcommand(
            Command::new("predict")
                .about("Run a single projection and print the JSON response")
                .arg(
                    Arg::new("sea")
                        .help("Sea name, e.g. \"Arabian Sea\"")
                        .required(true)
                        .value_parser(clap::builder::NonEmptyStringValueParser::new()),
                )
                .arg(
                    Arg::new("year")
                        .help("Target year of the projection")
                        .required(true)
                        .value_parser(clap::value_parser!(i32)),
                )
                .arg(config_arg())
                .arg(mode_arg())
                .arg(shape_arg())
                .arg(data_arg())
                .arg(models_dir_arg())
                .arg(present_year_arg()),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    match matches.subcommand() {
        Some(("serve", sub_m)) => handle_serve(sub_m),
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    }
}

fn handle_serve(matches: &ArgMatches) -> Result<()> {
    let config = ServerConfig::from_arguments(matches)?;
    log::info!(
        "[tidecast::serve] Starting in {:?} mode (present year {})",
        config.mode,
        config.pipeline.present_year
    );

    // Fail fast: nothing is bound until the ensemble is ready.
    let pipeline = match startup::build_pipeline(&config) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            log::error!("Startup failed: {:#}", e);
            std::process::exit(1)
        }
    };
    let state = AppState::new(pipeline, config.response_shape());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    runtime.block_on(server::serve(&config, state))
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let config = ServerConfig::from_arguments(matches)?;
    log::info!(
        "[tidecast::train] Training from {} into {}",
        config.data_path.display(),
        config.models_dir.display()
    );

    match startup::run_training(&config) {
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Training failed: {:#}", e);
            std::process::exit(1)
        }
    }
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let config = ServerConfig::from_arguments(matches)?;
    let sea = matches.get_one::<String>("sea").context("sea is required")?;
    let year = *matches.get_one::<i32>("year").context("year is required")?;

    let pipeline = startup::build_pipeline(&config)?;
    let result = pipeline.predict(sea, year)?;
    println!("{}", startup::render(&result, config.response_shape())?);
    Ok(())
}

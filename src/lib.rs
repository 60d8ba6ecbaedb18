pub mod cli;
pub mod data;
pub mod decode;
pub mod diagnostics;
pub mod error;
pub mod header;
pub mod io_utils;
pub mod mapper;
pub mod models;
pub mod query;
pub mod record;
pub mod schema;
pub mod store;
pub mod table;

pub use error::{FormatError, MapperError, MapperResult};
pub use mapper::FileMapper;
pub use query::{Direction, ExtremalQuery};
pub use record::{FromRecord, MappedRecord, Record};
pub use schema::Schema;
pub use store::RecordStore;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::{
    cli::{Cli, Commands, ExtremeArgs, InputArgs, TemplateArgs, TemplateKind},
    models::{Country, DailyWeather},
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_extremes", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Weather(args) => handle_weather(&args),
        Commands::Countries(args) => handle_countries(&args),
        Commands::Extreme(args) => handle_extreme(&args),
        Commands::SchemaTemplate(args) => handle_schema_template(&args),
    }
}

fn load_store<T: FromRecord>(args: &InputArgs, mapper: FileMapper) -> Result<RecordStore<T>> {
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let mut mapper = mapper.with_encoding(encoding);
    if let Some(delimiter) = args.delimiter {
        mapper = mapper.with_delimiter(delimiter)?;
    }
    let mut store = RecordStore::new();
    for input in &args.inputs {
        info!(
            "Mapping '{}' with delimiter '{}'",
            input.display(),
            printable_delimiter(mapper.schema().delimiter())
        );
        let records = mapper
            .map_file_as::<T>(input)
            .with_context(|| format!("Mapping records from {input:?}"))?;
        store.append(records);
    }
    Ok(store)
}

fn handle_weather(args: &InputArgs) -> Result<()> {
    let store = load_store::<DailyWeather>(args, FileMapper::for_record::<DailyWeather>())?;
    match models::day_with_smallest_temperature_spread(&store)? {
        Some(day) => println!("Day with smallest temperature spread: {day}"),
        None => println!("No day with a valid temperature spread found"),
    }
    Ok(())
}

fn handle_countries(args: &InputArgs) -> Result<()> {
    let store = load_store::<Country>(args, FileMapper::for_record::<Country>())?;
    match models::country_with_highest_population_density(&store)? {
        Some(name) => println!("Country with highest population density: {name}"),
        None => println!("No country with a valid population density found"),
    }
    Ok(())
}

fn handle_extreme(args: &ExtremeArgs) -> Result<()> {
    let schema = Schema::load(&args.schema)
        .with_context(|| format!("Loading schema from {:?}", args.schema))?;
    if schema.field_kind(&args.field).is_none() {
        anyhow::bail!(
            "Field '{}' is not declared by schema {:?}",
            args.field,
            args.schema
        );
    }
    let store = load_store::<Record>(&args.input, FileMapper::new(schema))?;

    let direction = if args.highest {
        Direction::Highest
    } else {
        Direction::Lowest
    };
    let mut selection = ExtremalQuery::new().compare(query::by_field(&args.field));
    if !args.include_sentinels {
        selection = selection.filter(query::field_not_sentinel(&args.field));
    }
    match selection.select(&store, direction)? {
        Some(record) => print!("{}", table::render_record(record)),
        None => println!(
            "No record with a valid '{}' among {} record(s)",
            args.field,
            store.len()
        ),
    }
    info!(
        "Selected {direction} '{}' from {} record(s)",
        args.field,
        store.len()
    );
    Ok(())
}

fn handle_schema_template(args: &TemplateArgs) -> Result<()> {
    let schema = match args.kind {
        TemplateKind::Weather => DailyWeather::schema(),
        TemplateKind::Countries => Country::schema(),
    };
    match &args.output {
        Some(path) => {
            schema
                .save(path)
                .with_context(|| format!("Writing schema to {path:?}"))?;
            info!("Schema with {} column(s) written to {:?}", schema.columns().len(), path);
        }
        None => print!("{}", schema.to_yaml_string()?),
    }
    Ok(())
}

pub(crate) fn printable_delimiter(delimiter: char) -> String {
    match delimiter {
        '\t' => "\\t".to_string(),
        other => other.to_string(),
    }
}

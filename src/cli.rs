use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Map CSV files to typed records and query their extremes",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report the day with the smallest temperature spread
    Weather(InputArgs),
    /// Report the country with the highest population density
    Countries(InputArgs),
    /// Select the record with the lowest or highest value of one field
    Extreme(ExtremeArgs),
    /// Write a built-in schema as YAML so it can be adapted
    SchemaTemplate(TemplateArgs),
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Input CSV file(s); rows from all files are combined
    #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    /// Field separator overriding the schema's (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<char>,
    /// Character encoding of the input files (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ExtremeArgs {
    /// YAML schema describing the columns to map
    #[arg(short, long)]
    pub schema: PathBuf,
    #[command(flatten)]
    pub input: InputArgs,
    /// Field (stored or derived) to rank records by
    #[arg(short, long)]
    pub field: String,
    /// Select the highest value instead of the lowest
    #[arg(long)]
    pub highest: bool,
    /// Let records whose field holds the sentinel take part
    #[arg(long)]
    pub include_sentinels: bool,
}

#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Built-in record type whose schema is written
    #[arg(long, value_enum)]
    pub kind: TemplateKind,
    /// Destination YAML file (stdout when omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum TemplateKind {
    Weather,
    Countries,
}

pub fn parse_delimiter(value: &str) -> Result<char, String> {
    match value {
        "tab" | "\t" => Ok('\t'),
        "comma" | "," => Ok(','),
        "|" | "pipe" => Ok('|'),
        ";" | "semicolon" => Ok(';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_delimiter_accepts_names_and_single_characters() {
        assert_eq!(parse_delimiter("tab"), Ok('\t'));
        assert_eq!(parse_delimiter("semicolon"), Ok(';'));
        assert_eq!(parse_delimiter(":"), Ok(':'));
        assert!(parse_delimiter("").is_err());
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("§").is_err());
    }

    #[test]
    fn cli_parses_extreme_arguments() {
        let cli = Cli::parse_from([
            "csv-extremes",
            "extreme",
            "-s",
            "schema.yaml",
            "-i",
            "a.csv",
            "b.csv",
            "--field",
            "Spread",
            "--highest",
        ]);
        match cli.command {
            Commands::Extreme(args) => {
                assert_eq!(args.input.inputs.len(), 2);
                assert_eq!(args.field, "Spread");
                assert!(args.highest);
                assert!(!args.include_sentinels);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}

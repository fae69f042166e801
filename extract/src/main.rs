mod collector;
mod config;
mod error;
mod output;
mod pbf;
mod scanner;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use common::{xml::format_coord, Border};
use config::{ExtractConfig, TargetTag};
use log::error;
use output::OutputFormat;
use std::path::PathBuf;

/// Pull the outer boundary ways of one relation out of an osm.pbf extract
#[derive(Parser, Debug)]
#[command(name = "border-extract")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the boundary ways and their node coordinates to a file
    Extract(ExtractArgs),
    /// Summarize a previously written boundary file
    Inspect {
        path: PathBuf,
        /// Defaults to json for .json files and xml otherwise
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[derive(Args, Debug)]
struct ExtractArgs {
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    /// Tag key the relation must carry, e.g. name:tr
    #[arg(long)]
    tag_key: String,
    /// Value the tag must have, compared exactly
    #[arg(long)]
    tag_value: String,
    /// Member role of the ways to keep
    #[arg(long, default_value = "outer")]
    role: String,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Xml)]
    format: OutputFormat,
    /// Fail if no relation or more than one relation matches
    #[arg(long)]
    require_unique_match: bool,
}

impl From<ExtractArgs> for ExtractConfig {
    fn from(args: ExtractArgs) -> Self {
        ExtractConfig {
            input: args.input,
            output: args.output,
            target: TargetTag {
                key: args.tag_key,
                value: args.tag_value,
                role: args.role,
            },
            format: args.format,
            require_unique_match: args.require_unique_match,
        }
    }
}

fn extract(config: ExtractConfig) -> Result<()> {
    let border = pbf::extract_border(&config)
        .with_context(|| format!("Failed to extract border from {}", config.input.display()))?;

    output::write_border(&border, &config.output, config.format)
        .context("Failed to save border")?;

    println!(
        "{} has been saved to {}",
        config.format.name(),
        config.output.display()
    );
    Ok(())
}

fn inspect(path: PathBuf, format: Option<OutputFormat>) -> Result<()> {
    let format = format.unwrap_or_else(|| OutputFormat::from_path(&path));
    let border = output::read_border(&path, format)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    print!("{}", summary(&border));
    Ok(())
}

fn summary(border: &Border) -> String {
    let bounds = match border.bounds() {
        Some(b) => format!(
            "lat {}..{}, lon {}..{}",
            format_coord(b.min_lat),
            format_coord(b.max_lat),
            format_coord(b.min_lon),
            format_coord(b.max_lon)
        ),
        None => "empty".to_string(),
    };

    format!(
        "ways: {}\nnodes: {}\nsegments: {}\nbounds: {bounds}\n",
        border.ways.len(),
        border.node_count(),
        border.segment_count()
    )
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Extract(args) => extract(args.into()),
        Command::Inspect { path, format } => inspect(path, format),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    if let Err(e) = run() {
        error!("{e:?}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extract_args_become_config() {
        let cli = Cli::try_parse_from([
            "border-extract",
            "extract",
            "--input",
            "russia-latest.osm.pbf",
            "--output",
            "russia_border.xml",
            "--tag-key",
            "name:tr",
            "--tag-value",
            "Rusya Federasyonu",
        ])
        .unwrap();

        let Command::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        let config = ExtractConfig::from(args);

        assert_eq!(config.input, PathBuf::from("russia-latest.osm.pbf"));
        assert_eq!(config.output, PathBuf::from("russia_border.xml"));
        assert_eq!(config.target.key, "name:tr");
        assert_eq!(config.target.value, "Rusya Federasyonu");
        assert_eq!(config.target.role, "outer");
        assert_eq!(config.format, OutputFormat::Xml);
        assert!(!config.require_unique_match);
    }

    #[test]
    fn extract_requires_tag() {
        let res = Cli::try_parse_from([
            "border-extract",
            "extract",
            "--input",
            "a.osm.pbf",
            "--output",
            "b.xml",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn summary_uses_document_coordinates() {
        use common::{BorderNode, BorderWay};

        let border = Border {
            ways: vec![BorderWay {
                id: 101,
                nodes: vec![
                    BorderNode {
                        id: 1,
                        lat: 55.0,
                        lon: 37.0,
                    },
                    BorderNode {
                        id: 2,
                        lat: 56.0000004,
                        lon: 38.0,
                    },
                ],
            }],
        };

        assert_eq!(
            summary(&border),
            "ways: 1\nnodes: 2\nsegments: 1\nbounds: lat 55.0..56.0000004, lon 37.0..38.0\n"
        );
        assert!(summary(&Border::default()).ends_with("bounds: empty\n"));
    }

    #[test]
    fn inspect_format_is_optional() {
        let cli = Cli::try_parse_from(["border-extract", "inspect", "b.json", "-f", "json"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Inspect {
                format: Some(OutputFormat::Json),
                ..
            }
        ));
    }
}

//! Command-line interface for mmcif
//! This binary converts a single CIF/mmCIF or PDBML file into CIF text or
//! mmJSON, optionally applying dictionary-driven scalar typing. Batch
//! mirror synchronization lives outside this tool; callers invoke it once
//! per file.
//!
//! Usage:
//!   mmcif <path>                          - Emit mmJSON on stdout
//!   mmcif <path> --to cif -o out.cif      - Re-serialize as CIF text
//!   mmcif <path> --dict summary.json      - Type values via a dictionary

use clap::{Arg, ArgAction, Command};
use mmcif_babel::formats::{cif, mmjson, pdbml};
use mmcif_parser::cif::{dictionary, normalize, Document, TypingTable};
use tokio::io::{AsyncWrite, AsyncWriteExt};

#[tokio::main]
async fn main() {
    let matches = Command::new("mmcif")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert CIF/mmCIF and PDBML files to CIF text or mmJSON")
        .arg_required_else_help(true)
        .arg(
            Arg::new("path")
                .help("Path to the input file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("from")
                .long("from")
                .short('f')
                .help("Input format: cif or pdbml (default: inferred from the extension)")
                .default_value("auto"),
        )
        .arg(
            Arg::new("to")
                .long("to")
                .short('t')
                .help("Output format: cif or mmjson")
                .default_value("mmjson"),
        )
        .arg(
            Arg::new("dict")
                .long("dict")
                .help("JSON dictionary source enabling scalar typing"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output path (default: stdout)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("TOML configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("omit-hash")
                .long("omit-hash")
                .help("Suppress structural # separator lines in CIF output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("force-loop")
                .long("force-loop")
                .help("Render single-row categories in loop style")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    if let Err(e) = run(&matches).await {
        eprintln!("mmcif: {}", e);
        std::process::exit(1);
    }
}

async fn run(matches: &clap::ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");

    let mut loader = mmcif_config::Loader::new();
    if let Some(config_path) = matches.get_one::<String>("config") {
        loader = loader.with_file(config_path);
    }
    let mut config = loader.build()?;
    if matches.get_flag("omit-hash") {
        config.write.omit_hash = true;
    }
    if matches.get_flag("force-loop") {
        config.write.force_loop = true;
    }

    let source = std::fs::read_to_string(path)?;
    let from = matches.get_one::<String>("from").expect("has default");
    let mut doc = parse_input(&source, from, path)?;

    // the CLI flag wins over the configured dictionary location
    let dict_path = matches
        .get_one::<String>("dict")
        .cloned()
        .or_else(|| config.dictionary.path.clone());
    if let Some(dict_path) = dict_path {
        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&dict_path)?)?;
        let table = dictionary::install(TypingTable::from_json(&json)?);
        normalize(&mut doc, &table)?;
    }

    let settings: cif::WriteSettings = config.write.into();
    let to = matches.get_one::<String>("to").expect("has default");
    match matches.get_one::<String>("output") {
        Some(out_path) => {
            let mut file = tokio::fs::File::create(out_path).await?;
            write_output(&doc, to, &settings, &mut file).await
        }
        None => {
            let mut stdout = tokio::io::stdout();
            write_output(&doc, to, &settings, &mut stdout).await
        }
    }
}

fn parse_input(source: &str, from: &str, path: &str) -> Result<Document, Box<dyn std::error::Error>> {
    let from = match from {
        "auto" => {
            if path.ends_with(".xml") || path.ends_with(".pdbml") {
                "pdbml"
            } else {
                "cif"
            }
        }
        other => other,
    };
    match from {
        "cif" => Ok(mmcif_parser::cif::parse(source)?),
        "pdbml" => Ok(pdbml::parse(source)?),
        other => Err(format!("unknown input format '{}'; expected cif or pdbml", other).into()),
    }
}

async fn write_output<W>(
    doc: &Document,
    to: &str,
    settings: &cif::WriteSettings,
    sink: &mut W,
) -> Result<(), Box<dyn std::error::Error>>
where
    W: AsyncWrite + Unpin + Send,
{
    match to {
        "cif" => cif::stream(doc, settings, sink).await?,
        "mmjson" => {
            mmjson::stream(doc, sink).await?;
            sink.write_all(b"\n").await?;
            sink.flush().await?;
        }
        other => {
            return Err(format!("unknown output format '{}'; expected cif or mmjson", other).into())
        }
    }
    Ok(())
}

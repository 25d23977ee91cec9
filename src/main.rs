use std::path::PathBuf;

use clap::{command, value_parser, Arg, ArgAction, ArgMatches, Command};
use color_eyre::eyre::{eyre, Result};
use log::debug;

use imd_explorer::config::ConfigPaths;
use imd_explorer::datasets::Dataset;
use imd_explorer::logger::setup_logger;
use imd_explorer::theme::loader::list_available_themes;
use imd_explorer::theme::{set_colors, CssVariables};
use imd_explorer::{ordinal, AppConfig, Fetcher};

/// Features listed by `topo` before eliding the rest.
const TOPO_PREVIEW: usize = 10;

fn cli() -> Command {
    command!()
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf))
                .global(true)
                .help("Config file to use instead of ~/.config/imd-explorer/config.yml"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Log debug messages"),
        )
        .subcommand(Command::new("themes").about("List the available themes (* marks theme files)"))
        .subcommand(
            Command::new("css")
                .about("Print a theme as CSS custom properties")
                .arg(Arg::new("theme").required(true))
                .arg(
                    Arg::new("selector")
                        .long("selector")
                        .default_value(":root")
                        .help("Selector of the generated rule"),
                ),
        )
        .subcommand(
            Command::new("data")
                .about("Fetch a CSV dataset")
                .arg(
                    Arg::new("source")
                        .required(true)
                        .help("lad, lsoa, or a path or URL"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("topo")
                .about("Fetch a TopoJSON topology and convert one layer to GeoJSON")
                .arg(Arg::new("source").help("Path or URL [default: the LAD boundaries]"))
                .arg(Arg::new("layer").long("layer").help("Object to convert"))
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("tile")
                .about("Print the URL of a building footprints tile")
                .arg(Arg::new("z").required(true).value_parser(value_parser!(u8)))
                .arg(Arg::new("x").required(true).value_parser(value_parser!(u32)))
                .arg(Arg::new("y").required(true).value_parser(value_parser!(u32))),
        )
        .subcommand(Command::new("distributions").about("List the reference decile profiles"))
        .subcommand(
            Command::new("ordinal")
                .about("Print a number with its ordinal suffix")
                .arg(
                    Arg::new("n")
                        .required(true)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(i64)),
                ),
        )
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print the result as JSON")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let matches = cli().get_matches();
    setup_logger(matches.get_flag("verbose"));

    let config = match matches.get_one::<PathBuf>("config") {
        Some(path) => AppConfig::load(Some(path.as_path()))?,
        None => AppConfig::load_or_default(None),
    };

    match matches.subcommand() {
        Some(("themes", _)) => list_themes(&config),
        Some(("css", sub)) => print_css(&config, sub),
        Some(("data", sub)) => fetch_data(&config, sub).await,
        Some(("topo", sub)) => fetch_topo(&config, sub).await,
        Some(("tile", sub)) => {
            let z = sub.get_one::<u8>("z").copied().unwrap_or_default();
            let x = sub.get_one::<u32>("x").copied().unwrap_or_default();
            let y = sub.get_one::<u32>("y").copied().unwrap_or_default();
            println!("{}", config.lsoa_bldg.tile_url(z, x, y));
            Ok(())
        }
        Some(("distributions", _)) => {
            for (key, preset) in config.distributions.iter() {
                let deciles: Vec<String> = preset.deciles.iter().map(|d| d.to_string()).collect();
                println!(
                    "{key:<8} {:<15} total {:>5.1}  [{}]",
                    preset.short,
                    preset.total(),
                    deciles.join(", ")
                );
            }
            Ok(())
        }
        Some(("ordinal", sub)) => {
            let n = sub
                .get_one::<i64>("n")
                .copied()
                .ok_or_else(|| eyre!("missing number"))?;
            println!("{}", ordinal(n));
            Ok(())
        }
        _ => unreachable!("subcommand_required"),
    }
}

fn list_themes(config: &AppConfig) -> Result<()> {
    let from_files = ConfigPaths::new()
        .and_then(|paths| list_available_themes(&paths.themes_dir))
        .unwrap_or_default();
    for (name, theme) in config.themes.iter() {
        let colors: Vec<String> = theme
            .entries()
            .iter()
            .map(|(role, color)| format!("{role}={color}"))
            .collect();
        let marker = if from_files.iter().any(|f| f == name) { "*" } else { " " };
        println!("{marker}{name:<12} {}", colors.join("  "));
    }
    Ok(())
}

fn print_css(config: &AppConfig, sub: &ArgMatches) -> Result<()> {
    let name = sub
        .get_one::<String>("theme")
        .ok_or_else(|| eyre!("missing theme name"))?;
    if !config.themes.contains(name) {
        let known: Vec<&str> = config.themes.names().collect();
        return Err(eyre!(
            "unknown theme '{name}' (available: {})",
            known.join(", ")
        ));
    }

    let selector = sub
        .get_one::<String>("selector")
        .map(String::as_str)
        .unwrap_or(":root");
    let mut vars = CssVariables::new();
    set_colors(&config.themes, name, &mut vars);
    println!("{}", vars.to_css(selector));
    Ok(())
}

async fn fetch_data(config: &AppConfig, sub: &ArgMatches) -> Result<()> {
    let source = sub
        .get_one::<String>("source")
        .ok_or_else(|| eyre!("missing source"))?;
    let locator = match source.parse::<Dataset>() {
        Ok(dataset) => config.dataurl.get(dataset),
        Err(_) => source.as_str(),
    };
    debug!("Fetching table from {locator}");

    let fetcher = Fetcher::new(&config.fetch)?;
    let table = fetcher.get_data(locator).await?;

    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&table)?);
    } else {
        println!("{} rows", table.len());
        println!("columns: {}", table.columns.join(", "));
    }
    Ok(())
}

async fn fetch_topo(config: &AppConfig, sub: &ArgMatches) -> Result<()> {
    let bounds = &config.lad_bounds;
    let locator = sub
        .get_one::<String>("source")
        .map(String::as_str)
        .unwrap_or(&bounds.url);
    let layer = sub
        .get_one::<String>("layer")
        .map(String::as_str)
        .unwrap_or(&bounds.layer);

    let fetcher = Fetcher::new(&config.fetch)?;
    let collection = fetcher.get_topo(locator, layer).await?;

    if sub.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&collection)?);
        return Ok(());
    }

    println!("{} features in layer '{layer}'", collection.features.len());
    for feature in collection.features.iter().take(TOPO_PREVIEW) {
        let property = |key: &str| {
            feature
                .properties
                .as_ref()
                .and_then(|p| p.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("-")
                .to_string()
        };
        println!("  {:<10} {}", property(&bounds.code), property(&bounds.name));
    }
    if collection.features.len() > TOPO_PREVIEW {
        println!("  ...");
    }
    Ok(())
}

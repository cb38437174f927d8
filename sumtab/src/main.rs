//! # sumtab
//!
//! A CLI tool for building publication-style summary tables from CSV files.
//!
//! ## Overview
//!
//! sumtab is built on top of sumtablib. It loads a CSV file, infers a
//! summary for every column (numeric columns get minimum, median (IQR),
//! mean (sd) and maximum; categorical and boolean columns get n (%) per
//! level), optionally groups the rows, and prints the table.
//!
//! ## Usage
//!
//! ```bash
//! # Summarise every column
//! sumtab cars.csv
//!
//! # One column per transmission type, as markdown
//! sumtab cars.csv --by am --markup markdown
//!
//! # Overall column beside the groups, LaTeX with a caption
//! sumtab cars.csv --by am --overall --markup latex --caption "Cars"
//!
//! # Only some columns, one decimal, JSON grid
//! sumtab cars.csv --columns mpg,hp --digits 1 --output json
//! ```

mod load;
mod logging;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use console::Style;
use serde::Deserialize;
use sumtablib::{
    build_table, infer_summary, qsummary, render, DegeneratePolicy, FormatOptions, Grouping,
    Markup, RenderOptions, RowGroupLayout, SdStyle, SummarySpec,
};
use tracing::info;

use crate::load::load_csv;
use crate::logging::{init_logging, LogConfig};

/// Contents of a `--config` file.
///
/// Formatting options sit at the top level; rendering options under `render`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    #[serde(flatten)]
    format: FormatOptions,
    render: RenderOptions,
}

impl Config {
    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config '{}'", path.display()))
    }
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("sumtab")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Arthur Debert")
        .about("Summary tables from CSV files: mean (sd), median (IQR), n (%) by group")
        .arg(
            Arg::new("file")
                .required(true)
                .help("CSV file with a header row"),
        )
        .arg(
            Arg::new("by")
                .short('b')
                .long("by")
                .action(ArgAction::Append)
                .help("Group by column (can be specified multiple times)"),
        )
        .arg(
            Arg::new("columns")
                .short('c')
                .long("columns")
                .value_delimiter(',')
                .help("Columns to summarise (comma-separated, default: all but --by)"),
        )
        .arg(
            Arg::new("markup")
                .short('m')
                .long("markup")
                .value_parser(["plain", "markdown", "latex"])
                .help("Output markup"),
        )
        .arg(
            Arg::new("digits")
                .short('d')
                .long("digits")
                .value_parser(value_parser!(usize))
                .help("Decimal digits for every statistic"),
        )
        .arg(
            Arg::new("sd-style")
                .long("sd-style")
                .value_parser(["plus_minus", "paren"])
                .help("Show mean and sd as `mean ± sd` or `mean (sd)`"),
        )
        .arg(
            Arg::new("degenerate")
                .long("degenerate")
                .value_parser(["fail", "placeholder"])
                .help("On sd of a single value: fail, or print the NA placeholder"),
        )
        .arg(
            Arg::new("caption")
                .long("caption")
                .help("Table caption"),
        )
        .arg(
            Arg::new("column-names")
                .long("column-names")
                .value_delimiter(',')
                .help("Replacement column headers (comma-separated, one per column)"),
        )
        .arg(
            Arg::new("layout")
                .long("layout")
                .value_parser(["separator", "column"])
                .help("Row-group labels as separator rows or a leading column"),
        )
        .arg(
            Arg::new("show-n")
                .long("show-n")
                .action(ArgAction::SetTrue)
                .help("Append (N = n) to column headers"),
        )
        .arg(
            Arg::new("overall")
                .long("overall")
                .action(ArgAction::SetTrue)
                .help("Prepend an Overall column when grouping"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .help("JSON file with formatting and rendering options"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Print the rendered table or the table grid as JSON"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log more (-v debug, -vv trace)"),
        )
}

/// Extract a repeatable or comma-separated list from matches
fn extract_list(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|v| v.cloned().collect())
        .unwrap_or_default()
}

/// Apply command-line overrides on top of the config file.
fn resolve_config(matches: &ArgMatches) -> Result<Config> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load(Path::new(path))?,
        None => Config::default(),
    };

    if let Some(markup) = matches.get_one::<String>("markup") {
        config.format.markup = markup.parse::<Markup>().map_err(anyhow::Error::msg)?;
    }
    if let Some(digits) = matches.get_one::<usize>("digits") {
        config.format.digits = *digits;
    }
    if let Some(style) = matches.get_one::<String>("sd-style") {
        config.format.sd_style = style.parse::<SdStyle>().map_err(anyhow::Error::msg)?;
    }
    if let Some(policy) = matches.get_one::<String>("degenerate") {
        config.format.degenerate = policy
            .parse::<DegeneratePolicy>()
            .map_err(anyhow::Error::msg)?;
    }
    if let Some(caption) = matches.get_one::<String>("caption") {
        config.render.caption = Some(caption.clone());
    }
    let names = extract_list(matches, "column-names");
    if !names.is_empty() {
        config.render.column_names = Some(names);
    }
    if let Some(layout) = matches.get_one::<String>("layout") {
        config.render.layout = layout.parse::<RowGroupLayout>().map_err(anyhow::Error::msg)?;
    }
    if matches.get_flag("show-n") {
        config.render.show_n = true;
    }
    Ok(config)
}

fn run(matches: &ArgMatches) -> Result<String> {
    let config = resolve_config(matches)?;
    let path = matches
        .get_one::<String>("file")
        .context("missing CSV file argument")?;
    let dataset = load_csv(Path::new(path))?;

    let by = extract_list(matches, "by");
    let columns = extract_list(matches, "columns");

    let spec = if columns.is_empty() {
        qsummary(&dataset, &by)
    } else {
        let mut spec = SummarySpec::new();
        for name in &columns {
            spec.push(infer_summary(name, dataset.column(name)?))?;
        }
        spec
    };
    if spec.is_empty() {
        bail!("nothing to summarise: no columns left after excluding grouping columns");
    }

    let grouping = if by.is_empty() {
        None
    } else {
        Some(Grouping::by(&dataset, &by)?)
    };
    info!(
        rows = dataset.n_rows(),
        groups = grouping.as_ref().map_or(1, Grouping::len),
        summary_rows = spec.n_rows(),
        "building table"
    );

    let mut grid = build_table(&dataset, grouping.as_ref(), &spec, &config.format)?;
    if matches.get_flag("overall") && grouping.is_some() {
        let overall = build_table(&dataset, None, &spec, &config.format)?;
        grid = overall.cbind(grid)?;
    }

    match matches.get_one::<String>("output").map(String::as_str) {
        Some("json") => {
            let mut out = serde_json::to_string_pretty(&grid)?;
            out.push('\n');
            Ok(out)
        }
        _ => Ok(render(&grid, config.format.markup, &config.render)?),
    }
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();
    init_logging(&LogConfig::from_verbosity(matches.get_count("verbose")));

    match run(&matches) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            let label = Style::new().red().bold().for_stderr().apply_to("Error:");
            eprintln!("{} {:#}", label, e);
            ExitCode::FAILURE
        }
    }
}

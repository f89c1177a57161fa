use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use getopts::Options;

use csv_chart::data::nearest::format_readout;
use csv_chart::state::is_supported_file;
use csv_chart::{ChartConfig, ChartEvent, ChartState};

struct Cli {
    path: PathBuf,
    columns: Option<Vec<String>>,
    max_points: Option<usize>,
    config: Option<PathBuf>,
    at: Option<f64>,
}

fn print_help_and_exit(opts: &Options, program: &str, code: i32) -> ! {
    let brief = format!(
        "Usage: {program} [options] <file.csv>\n\n\
         Load selected columns of a CSV file, downsampled, and report what a cursor would show."
    );
    eprintln!("{}", opts.usage(&brief));
    std::process::exit(code)
}

fn parse_cli() -> Result<Cli> {
    let args: Vec<String> = std::env::args().collect();
    let program = args.first().cloned().unwrap_or_else(|| "csv-chart".into());

    let mut opts = Options::new();
    opts.optflag("h", "help", "Show help");
    opts.optopt("c", "columns", "Comma-separated column names (default: all)", "list");
    opts.optopt("n", "max-points", "Point budget per series (default 5000)", "n");
    opts.optopt("", "config", "JSON config file", "path");
    opts.optopt("", "at", "Print the values nearest to this row number", "x");

    let matches = opts.parse(&args[1..]).context("parsing arguments")?;
    if matches.opt_present("help") {
        print_help_and_exit(&opts, &program, 0);
    }
    let Some(path) = matches.free.first() else {
        print_help_and_exit(&opts, &program, 2);
    };

    let columns = matches.opt_str("columns").map(|s| {
        s.split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    });
    let max_points = matches
        .opt_str("max-points")
        .map(|s| s.parse::<usize>().with_context(|| format!("invalid --max-points '{s}'")))
        .transpose()?;
    let at = matches
        .opt_str("at")
        .map(|s| s.parse::<f64>().with_context(|| format!("invalid --at '{s}'")))
        .transpose()?;

    Ok(Cli {
        path: PathBuf::from(path),
        columns,
        max_points,
        config: matches.opt_str("config").map(PathBuf::from),
        at,
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = parse_cli()?;

    let mut config = match &cli.config {
        Some(path) => ChartConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ChartConfig::default(),
    };
    if let Some(n) = cli.max_points {
        config.max_points = n;
    }
    config.validate()?;

    if !is_supported_file(&cli.path) {
        log::warn!("{} does not look like a .csv or .logfile file", cli.path.display());
    }

    let mut state = ChartState::new(config);
    state
        .open(&cli.path)
        .with_context(|| format!("reading header of {}", cli.path.display()))?;

    println!("Columns:");
    for col in &state.columns {
        println!("  [{}] {}", col.index, col.name);
    }

    match &cli.columns {
        Some(names) => {
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let columns = state.columns.clone();
            let unknown = state.selection.select_names(&columns, &names);
            if !unknown.is_empty() {
                bail!("unknown column(s): {}", unknown.join(", "));
            }
        }
        None => {
            let columns = state.columns.clone();
            state.selection.select_all(&columns);
        }
    }

    state.start_load().context("starting load")?;

    let store = loop {
        let mut finished = None;
        for event in state.poll() {
            match event {
                ChartEvent::LoadProgress(pct) => eprint!("\rLoading… {pct:>3}%"),
                ChartEvent::LoadCompleted(store) => finished = Some(Ok(store)),
                ChartEvent::LoadCancelled => finished = Some(Err(anyhow::anyhow!("load cancelled"))),
                ChartEvent::LoadFailed(msg) => finished = Some(Err(anyhow::anyhow!(msg))),
                ChartEvent::HeaderLoaded(_) | ChartEvent::NearestPointResult(_) => {}
            }
        }
        if let Some(result) = finished {
            eprintln!();
            break result.context("loading data")?;
        }
        std::thread::sleep(Duration::from_millis(20));
    };

    println!(
        "{} data rows, stride {}, {} points",
        store.total_rows(),
        store.stride(),
        store.point_count()
    );
    for series in store.iter() {
        let y = series
            .y_range()
            .map(|(lo, hi)| format!("{lo:.3} .. {hi:.3}"))
            .unwrap_or_else(|| "no values".to_string());
        println!("  {:<24} {:>6} points  [{}]  {}", series.name(), series.len(), series.axis, y);
    }

    if let Some(x0) = cli.at {
        match state.nearest_at(x0) {
            Some(hits) => {
                let readout = format_readout(&hits);
                if readout.is_empty() {
                    println!("Nothing near x = {x0}");
                } else {
                    println!("At x = {x0}:\n{readout}");
                }
            }
            None => println!("No data to query"),
        }
    }

    Ok(())
}

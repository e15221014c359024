//! Subcommand implementations

use std::error::Error;
use std::path::Path;

use serde::Serialize;
use tetplot_core::{
    ConditioningSet, ContinuousRule, PlotError, PlotEvent, PlotResult, PlotSettings, QqPlot,
    ScatterController, ScatterPlot,
};
use tetplot_data::{CsvOptions, CsvReader, DataSet, TabularData};
use tetplot_stats::{PlotRange, RegressionLine, SummaryStats};
use tracing::debug;

use crate::cli::{Cli, Command, DataOpts, OutputFormat};

type CommandResult = Result<(), Box<dyn Error>>;

pub fn run(cli: Cli) -> CommandResult {
    let settings = match &cli.global.settings {
        Some(path) => PlotSettings::load(path)?,
        None => PlotSettings::load_or_default()?,
    };
    let format = cli.global.format;

    match cli.command {
        Command::Range { data, columns } => range(&data, &columns, format),
        Command::Regress { data, x, y } => regress(&data, &x, &y, format),
        Command::Qq {
            data,
            variable,
            layout,
        } => qq(&data, &variable, layout, &settings, format),
        Command::Scatter {
            data,
            x,
            y,
            line,
            jitter,
            seed,
        } => {
            let mut settings = settings;
            settings.show_regression_line |= line;
            if let Some(mode) = jitter {
                settings.jitter.mode = mode;
            }
            if seed.is_some() {
                settings.jitter.seed = seed;
            }
            scatter(&data, x.as_deref(), y.as_deref(), settings, format)
        }
    }
}

fn load(opts: &DataOpts) -> Result<DataSet, Box<dyn Error>> {
    let path = opts
        .file
        .to_str()
        .ok_or_else(|| format!("path is not valid UTF-8: {}", opts.file.display()))?;
    let mut options = CsvOptions::default();
    if is_tsv(&opts.file) {
        options = options.with_delimiter(b'\t');
    }
    for name in &opts.discrete {
        options = options.with_discrete(name.clone());
    }
    let data = CsvReader::open_with_options(path, &options)?;
    debug!(
        path,
        rows = data.num_rows(),
        columns = data.num_columns(),
        "loaded dataset"
    );
    Ok(data)
}

fn is_tsv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("tsv"))
}

/// Interpret a condition value for a continuous variable
///
/// `above` and `below` compare against the mean, `K/N` selects n-tile bucket
/// K of N, and `LOW:HIGH` is an explicit interval.
pub fn parse_rule(variable: &str, value: &str) -> PlotResult<ContinuousRule> {
    let invalid = |message: String| PlotError::InvalidCondition {
        variable: variable.to_string(),
        message,
    };

    match value.to_ascii_lowercase().as_str() {
        "above" => return Ok(ContinuousRule::AboveAverage),
        "below" => return Ok(ContinuousRule::BelowAverage),
        _ => {}
    }

    if let Some((index, ntile)) = value.split_once('/') {
        let index = index
            .trim()
            .parse()
            .map_err(|_| invalid(format!("bad n-tile index '{}'", index)))?;
        let ntile = ntile
            .trim()
            .parse()
            .map_err(|_| invalid(format!("bad n-tile count '{}'", ntile)))?;
        return Ok(ContinuousRule::Ntile { ntile, index });
    }

    if let Some((low, high)) = value.split_once(':') {
        let low = low
            .trim()
            .parse()
            .map_err(|_| invalid(format!("bad lower bound '{}'", low)))?;
        let high = high
            .trim()
            .parse()
            .map_err(|_| invalid(format!("bad upper bound '{}'", high)))?;
        return Ok(ContinuousRule::Range { low, high });
    }

    Err(invalid(format!(
        "expected LOW:HIGH, K/N, above or below; got '{}'",
        value
    )))
}

fn conditioning(data: &DataSet, conditions: &[(String, String)]) -> PlotResult<ConditioningSet> {
    let mut set = ConditioningSet::new();
    for (variable, value) in conditions {
        let var = data
            .variable_named(variable)
            .ok_or_else(|| PlotError::VariableNotFound(variable.clone()))?;
        if var.is_discrete() {
            set.add_category_label(data, variable, value)?;
        } else {
            set.add_continuous(data, variable, parse_rule(variable, value)?)?;
        }
    }
    Ok(set)
}

fn print_json<T: Serialize>(value: &T) -> CommandResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[derive(Serialize)]
struct RangeReport {
    variable: String,
    count: usize,
    missing: usize,
    range: Option<PlotRange>,
    mean: f64,
    std_dev: f64,
}

fn range(opts: &DataOpts, columns: &[String], format: OutputFormat) -> CommandResult {
    let data = load(opts)?;
    let rows = conditioning(&data, &opts.condition)?.matching_rows(&data)?;

    let names: Vec<String> = if columns.is_empty() {
        data.variables()
            .into_iter()
            .filter(|v| v.is_continuous())
            .map(|v| v.name.clone())
            .collect()
    } else {
        columns.to_vec()
    };

    let mut reports = Vec::with_capacity(names.len());
    for name in names {
        let column = data.continuous_column(&name)?;
        let sample: Vec<f64> = rows.iter().map(|&r| column[r]).collect();
        let stats = SummaryStats::from_data(&sample);
        reports.push(RangeReport {
            variable: name,
            count: stats.count,
            missing: stats.missing,
            range: stats.plot_range(),
            mean: stats.mean,
            std_dev: stats.std_dev,
        });
    }

    match format {
        OutputFormat::Json => print_json(&reports),
        OutputFormat::Text => {
            for report in &reports {
                match report.range {
                    Some(range) => println!(
                        "{}: [{}, {}]  n = {}, missing = {}, mean = {:.4}, sd = {:.4}",
                        report.variable,
                        range.min,
                        range.max,
                        report.count,
                        report.missing,
                        report.mean,
                        report.std_dev
                    ),
                    None => println!("{}: no values ({} missing)", report.variable, report.missing),
                }
            }
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct RegressionReport<'a> {
    x: &'a str,
    y: &'a str,
    #[serde(flatten)]
    line: RegressionLine,
}

fn regress(opts: &DataOpts, x: &str, y: &str, format: OutputFormat) -> CommandResult {
    let data = load(opts)?;
    let set = conditioning(&data, &opts.condition)?;
    let plot = ScatterPlot::new(&data, x, y, set, true)?;
    let line = plot.regression()?;

    match format {
        OutputFormat::Json => print_json(&RegressionReport { x, y, line }),
        OutputFormat::Text => {
            println!(
                "{} = {:.6} + {:.6} * {}  (n = {}, R^2 = {:.4})",
                y, line.intercept, line.slope, x, line.n, line.r_squared
            );
            println!("{}", correlation_summary(&line));
            Ok(())
        }
    }
}

/// Pearson r and its p-value, three decimals each
fn correlation_summary(line: &RegressionLine) -> String {
    format!(
        "correlation coef = {:.3}  (p={:.3})",
        line.correlation, line.p_value
    )
}

#[derive(Serialize)]
struct QqReport<'a> {
    variable: &'a str,
    mean: f64,
    std_dev: f64,
    n: usize,
    unconverged: usize,
    /// (theoretical, observed)
    points: Vec<(f64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    layout: Option<tetplot_core::QqLayout>,
}

fn qq(
    opts: &DataOpts,
    variable: &str,
    with_layout: bool,
    settings: &PlotSettings,
    format: OutputFormat,
) -> CommandResult {
    let data = load(opts)?;
    let set = conditioning(&data, &opts.condition)?;
    let plot = QqPlot::new(&data, variable, set, &settings.quantile)?;
    let layout = if with_layout {
        Some(plot.render(&settings.frame)?)
    } else {
        None
    };

    let report = QqReport {
        variable,
        mean: plot.distribution().mean(),
        std_dev: plot.distribution().std_dev(),
        n: plot.table().len(),
        unconverged: plot.table().unconverged(),
        points: plot.points(),
        layout,
    };

    match format {
        OutputFormat::Json => print_json(&report),
        OutputFormat::Text => {
            println!(
                "{}: fitted normal mean = {:.4}, sd = {:.4}, n = {}",
                variable, report.mean, report.std_dev, report.n
            );
            if report.unconverged > 0 {
                println!("{} quantiles hit the iteration cap", report.unconverged);
            }
            println!("theoretical\tobserved");
            for (t, o) in &report.points {
                println!("{:.6}\t{}", t, o);
            }
            Ok(())
        }
    }
}

fn scatter(
    opts: &DataOpts,
    x: Option<&str>,
    y: Option<&str>,
    settings: PlotSettings,
    format: OutputFormat,
) -> CommandResult {
    let data = load(opts)?;
    let mut controller = ScatterController::new(&data, settings)?;
    if format == OutputFormat::Text {
        controller.events_mut().on(PlotEvent::OVERLAY_SKIPPED, |event| {
            if let PlotEvent::OverlaySkipped { reason } = event {
                eprintln!("note: {}", reason);
            }
        });
    }

    if let Some(x) = x {
        controller.set_x(x)?;
    }
    if let Some(y) = y {
        controller.set_y(y)?;
    }
    for (variable, value) in &opts.condition {
        let var = data
            .variable_named(variable)
            .ok_or_else(|| PlotError::VariableNotFound(variable.clone()))?;
        if var.is_discrete() {
            controller.add_category_condition(variable, value)?;
        } else {
            controller.add_continuous_condition(variable, parse_rule(variable, value)?)?;
        }
    }

    let layout = controller.layout()?;
    match format {
        OutputFormat::Json => print_json(&layout),
        OutputFormat::Text => {
            let plot = controller.plot();
            println!(
                "{} [{}, {}] vs {} [{}, {}], {} points",
                plot.y_variable(),
                layout.y_range.min,
                layout.y_range.max,
                plot.x_variable(),
                layout.x_range.min,
                layout.x_range.max,
                layout.points.len()
            );
            for condition in plot.conditioning().iter() {
                println!("  where {}", condition);
            }
            if let Some(line) = &layout.regression {
                println!(
                    "  fit: {} = {:.6} + {:.6} * {}",
                    plot.y_variable(),
                    line.intercept,
                    line.slope,
                    plot.x_variable()
                );
                println!("  {}", correlation_summary(line));
            }
            for (px, py) in &layout.points {
                println!("{:.2}\t{:.2}", px, py);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rule() {
        assert_eq!(parse_rule("x", "above").unwrap(), ContinuousRule::AboveAverage);
        assert_eq!(parse_rule("x", "Below").unwrap(), ContinuousRule::BelowAverage);
        assert_eq!(
            parse_rule("x", "2/4").unwrap(),
            ContinuousRule::Ntile { ntile: 4, index: 2 }
        );
        assert_eq!(
            parse_rule("x", "-1.5:3").unwrap(),
            ContinuousRule::Range { low: -1.5, high: 3.0 }
        );
        assert!(matches!(
            parse_rule("x", "lots"),
            Err(PlotError::InvalidCondition { .. })
        ));
        assert!(parse_rule("x", "a:3").is_err());
    }

    #[test]
    fn test_conditioning_by_kind() {
        let text = "x,g\n1,a\n2,b\n3,a\n4,b\n";
        let data = CsvReader::from_reader(text.as_bytes(), &CsvOptions::default()).unwrap();
        let set = conditioning(
            &data,
            &[
                ("g".to_string(), "a".to_string()),
                ("x".to_string(), "2:4".to_string()),
            ],
        )
        .unwrap();
        assert_eq!(set.matching_rows(&data).unwrap(), vec![2]);

        let missing = conditioning(&data, &[("nope".to_string(), "1:2".to_string())]);
        assert!(matches!(missing, Err(PlotError::VariableNotFound(_))));
    }

    #[test]
    fn test_correlation_summary() {
        let line = tetplot_stats::fit_line(&[0.0, 1.0, 2.0, 3.0], &[1.0, 2.0, 2.0, 4.0]).unwrap();
        assert_eq!(correlation_summary(&line), "correlation coef = 0.923  (p=0.077)");

        let report = serde_json::to_value(RegressionReport { x: "a", y: "b", line }).unwrap();
        assert!(report["correlation"].as_f64().is_some());
        assert!(report["p_value"].as_f64().is_some());
    }

    #[test]
    fn test_tsv_detection() {
        assert!(is_tsv(Path::new("data.TSV")));
        assert!(!is_tsv(Path::new("data.csv")));
    }
}

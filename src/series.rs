//! Plain-text series input and CSV output.

use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use sadj_seats::{DecompositionResult, SeriesName};

/// Reads one value per line from `path`.
pub fn read_series(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_series(BufReader::new(file)).with_context(|| format!("failed to read {}", path.display()))
}

/// Parses one value per line; blank lines and `#` comments are skipped.
pub fn parse_series<R: BufRead>(reader: R) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let text = match line.split_once('#') {
            Some((before, _)) => before,
            None => &line,
        }
        .trim();
        if text.is_empty() {
            continue;
        }
        let v: f64 = text
            .parse()
            .with_context(|| format!("line {}: not a number: {text:?}", i + 1))?;
        values.push(v);
    }
    if values.is_empty() {
        bail!("no values found");
    }
    Ok(values)
}

/// Writes the in-sample rows followed by the forecast rows.
///
/// Columns are `t`, then each series and its `_stdev`. Components the
/// decomposition does not have are left empty.
pub fn write_csv<W: Write>(out: &mut W, result: &DecompositionResult) -> Result<()> {
    let mut header = vec!["t".to_string()];
    for name in SeriesName::ALL {
        header.push(name.as_str().to_string());
        header.push(format!("{name}_stdev"));
    }
    writeln!(out, "{}", header.join(","))?;

    let n = result.len();
    for t in 0..n + result.horizon() {
        let mut row = vec![t.to_string()];
        for name in SeriesName::ALL {
            let (value, sd) = match result.series(name) {
                Some(s) if t < n => (Some(s.values[t]), Some(s.stdev[t])),
                Some(s) => (
                    s.forecasts.get(t - n).copied(),
                    s.forecast_stdev.get(t - n).copied(),
                ),
                None => (None, None),
            };
            row.push(cell(value));
            row.push(cell(sd));
        }
        writeln!(out, "{}", row.join(","))?;
    }
    out.flush()?;
    Ok(())
}

fn cell(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.10}")).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sadj_arima::SeasonalArimaModel;
    use sadj_seats::{Horizon, SeatsConfig};

    #[test]
    fn comments_and_blanks_are_skipped() {
        let text = "# monthly\n1.5\n\n2.0  # second\n  -3e-1\n";
        assert_eq!(parse_series(text.as_bytes()).unwrap(), vec![1.5, 2.0, -0.3]);
    }

    #[test]
    fn bad_lines_name_their_number() {
        let err = parse_series("1.0\nabc\n".as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(parse_series("# nothing\n".as_bytes()).is_err());
    }

    #[test]
    fn csv_has_forecast_rows() {
        let series: Vec<f64> = (0..48)
            .map(|t| 10.0 + 0.1 * t as f64 + (t % 4) as f64 + 0.3 * ((t * 7) % 5) as f64)
            .collect();
        let model = SeasonalArimaModel::airline(4, -0.4, -0.5, 1.0).unwrap();
        let config = SeatsConfig::new().with_horizon(Horizon::Count(8));
        let result = sadj_seats::decompose(&series, &model, &config).unwrap();

        let mut buf = Vec::new();
        write_csv(&mut buf, &result).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 48 + 8);
        assert!(lines[0].starts_with("t,series,series_stdev,trend,trend_stdev"));
        let width = lines[0].split(',').count();
        assert!(lines.iter().all(|l| l.split(',').count() == width));
        assert!(lines[49].starts_with("48,"));
    }
}

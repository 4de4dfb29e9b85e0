use std::error::Error;
use std::path::Path;

use chrono::NaiveDate;
use enum_map::EnumMap;
use serde::Deserialize;

use crate::constants::MIN_DATA_ROWS;
use crate::data::indicators;
use crate::data::scale::StandardScaler;
use crate::types::{Feature, FeatureRow};

#[derive(Debug, Deserialize)]
struct OhlcvRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    #[allow(dead_code)]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Adj Close")]
    #[allow(dead_code)]
    adj_close: f64,
    #[serde(rename = "Volume")]
    volume: f64,
}

/// Read an OHLCV CSV, compute the feature set, and produce the time-ordered
/// row table the simulator consumes.
///
/// Pass an existing scaler to transform a test table with training-set
/// statistics; with `None` a new scaler is fitted on this table.
pub fn load_feature_table(
    path: impl AsRef<Path>,
    scaler: Option<&StandardScaler>,
) -> Result<(Vec<FeatureRow>, StandardScaler), Box<dyn Error>> {
    let mut reader = csv::Reader::from_path(path.as_ref())?;

    let mut dates = Vec::new();
    let mut high = Vec::new();
    let mut low = Vec::new();
    let mut close = Vec::new();
    let mut volume = Vec::new();

    let mut records: Vec<(NaiveDate, OhlcvRecord)> = Vec::new();
    for result in reader.deserialize() {
        let record: OhlcvRecord = result?;
        let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d")?;
        records.push((date, record));
    }
    records.sort_by_key(|(date, _)| *date);

    for (date, record) in records {
        dates.push(date);
        high.push(record.high);
        low.push(record.low);
        close.push(record.close);
        volume.push(record.volume);
    }

    if close.len() < MIN_DATA_ROWS {
        return Err(format!(
            "not enough data points: {} rows, need at least {MIN_DATA_ROWS}",
            close.len()
        )
        .into());
    }

    let columns = compute_feature_columns(&high, &low, &close, &volume);

    // Warm-up gaps: forward-fill, then zero-fill whatever leads the series.
    let mut unscaled: Vec<EnumMap<Feature, f64>> = vec![EnumMap::default(); close.len()];
    for (feature, values) in columns.iter() {
        let mut last = f64::NAN;
        for (i, &value) in values.iter().enumerate() {
            let filled = if value.is_finite() {
                last = value;
                value
            } else if last.is_finite() {
                last
            } else {
                0.0
            };
            unscaled[i][feature] = filled;
        }
    }

    let scaler = match scaler {
        Some(existing) => existing.clone(),
        None => StandardScaler::fit(&unscaled),
    };

    let rows = dates
        .iter()
        .zip(unscaled.iter())
        .zip(close.iter())
        .map(|((&date, raw), &close)| FeatureRow {
            date,
            close,
            scaled: scaler.transform(raw),
            unscaled: *raw,
        })
        .collect();

    Ok((rows, scaler))
}

fn compute_feature_columns(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    volume: &[f64],
) -> EnumMap<Feature, Vec<f64>> {
    let bands = indicators::bollinger(close, 20, 2.0);

    let mut columns: EnumMap<Feature, Vec<f64>> = EnumMap::default();
    columns[Feature::Close] = close.to_vec();
    columns[Feature::Sma10] = indicators::sma(close, 10);
    columns[Feature::Sma50] = indicators::sma(close, 50);
    columns[Feature::Rsi] = indicators::rsi(close, 14);
    columns[Feature::Macd] = indicators::macd_line(close);
    columns[Feature::Adx] = indicators::adx(high, low, close, 14);
    columns[Feature::BbUpper] = bands.upper;
    columns[Feature::BbLower] = bands.lower;
    columns[Feature::BollingerWidth] = bands.width;
    columns[Feature::Ema20] = indicators::ema(close, 20);
    columns[Feature::Vwap] = indicators::vwap(high, low, close, volume, 14);
    columns[Feature::LaggedReturn] = indicators::lagged_return(close);
    columns[Feature::Volatility] = indicators::atr(high, low, close, 14);
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(rows: usize) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Date,Open,High,Low,Close,Adj Close,Volume").unwrap();
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        for i in 0..rows {
            let date = start + chrono::Days::new(i as u64);
            let price = 100.0 + (i as f64 * 0.2).sin() * 10.0 + i as f64 * 0.05;
            writeln!(
                file,
                "{},{:.2},{:.2},{:.2},{:.2},{:.2},{}",
                date.format("%Y-%m-%d"),
                price - 0.5,
                price + 1.0,
                price - 1.0,
                price,
                price,
                1_000_000 + i * 1000
            )
            .unwrap();
        }
        file
    }

    #[test]
    fn loads_and_scales_a_full_table() {
        let file = write_csv(260);
        let (rows, _scaler) = load_feature_table(file.path(), None).unwrap();
        assert_eq!(rows.len(), 260);
        assert!(rows.windows(2).all(|w| w[0].date < w[1].date));
        for row in &rows {
            assert!(row.close > 0.0);
            for (_, value) in row.unscaled.iter() {
                assert!(value.is_finite());
            }
            for (_, value) in row.scaled.iter() {
                assert!(value.is_finite());
            }
        }
    }

    #[test]
    fn rejects_short_tables() {
        let file = write_csv(50);
        assert!(load_feature_table(file.path(), None).is_err());
    }

    #[test]
    fn reuses_a_fitted_scaler() {
        let file = write_csv(260);
        let (_, scaler) = load_feature_table(file.path(), None).unwrap();
        let (rows, reused) = load_feature_table(file.path(), Some(&scaler)).unwrap();
        assert_eq!(scaler.mean[Feature::Close], reused.mean[Feature::Close]);
        assert!(rows[100].scaled[Feature::Close].is_finite());
    }
}

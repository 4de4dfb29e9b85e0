//! Technical indicators computed over OHLCV columns.
//!
//! Warm-up entries (before an indicator has enough history) are NaN; the
//! loader forward-fills and zero-fills them the same way for every column.

/// Simple moving average over a fixed window.
pub fn sma(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut out = vec![f64::NAN; n];
    if window == 0 || n < window {
        return out;
    }

    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = sum / window as f64;
    for i in window..n {
        sum += values[i] - values[i - window];
        out[i] = sum / window as f64;
    }
    out
}

/// Exponential moving average with alpha = 2/(window+1), seeded on the first value.
pub fn ema(values: &[f64], window: usize) -> Vec<f64> {
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev = f64::NAN;

    for (i, &value) in values.iter().enumerate() {
        let avg = if i == 0 {
            value
        } else {
            alpha * value + (1.0 - alpha) * prev
        };
        out.push(avg);
        prev = avg;
    }
    out
}

/// Wilder RSI. The first average gain/loss is a plain mean; afterwards the
/// running averages decay with 1/window.
pub fn rsi(close: &[f64], window: usize) -> Vec<f64> {
    let n = close.len();
    let mut out = vec![f64::NAN; n];
    if n <= window {
        return out;
    }

    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for i in 1..=window {
        let change = close[i] - close[i - 1];
        if change > 0.0 {
            avg_gain += change;
        } else {
            avg_loss -= change;
        }
    }
    avg_gain /= window as f64;
    avg_loss /= window as f64;
    out[window] = rsi_from_averages(avg_gain, avg_loss);

    for i in (window + 1)..n {
        let change = close[i] - close[i - 1];
        let (gain, loss) = if change > 0.0 {
            (change, 0.0)
        } else {
            (0.0, -change)
        };
        avg_gain = (avg_gain * (window as f64 - 1.0) + gain) / window as f64;
        avg_loss = (avg_loss * (window as f64 - 1.0) + loss) / window as f64;
        out[i] = rsi_from_averages(avg_gain, avg_loss);
    }
    out
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss <= 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

/// MACD line: EMA(12) - EMA(26).
pub fn macd_line(close: &[f64]) -> Vec<f64> {
    let fast = ema(close, 12);
    let slow = ema(close, 26);
    fast.iter().zip(slow.iter()).map(|(f, s)| f - s).collect()
}

pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    /// Band width as a percentage of the middle band.
    pub width: Vec<f64>,
}

/// Bollinger bands around an SMA, `k` population standard deviations wide.
pub fn bollinger(close: &[f64], window: usize, k: f64) -> BollingerBands {
    let n = close.len();
    let mid = sma(close, window);
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    let mut width = vec![f64::NAN; n];

    for i in (window - 1).min(n)..n {
        let slice = &close[i + 1 - window..=i];
        let mean = mid[i];
        let variance = slice.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / window as f64;
        let std = variance.sqrt();
        upper[i] = mean + k * std;
        lower[i] = mean - k * std;
        width[i] = if mean != 0.0 {
            (upper[i] - lower[i]) / mean * 100.0
        } else {
            0.0
        };
    }

    BollingerBands { upper, lower, width }
}

/// Volume-weighted average price over a rolling window of typical prices.
pub fn vwap(high: &[f64], low: &[f64], close: &[f64], volume: &[f64], window: usize) -> Vec<f64> {
    let n = close.len();
    let mut out = vec![f64::NAN; n];
    if n < window {
        return out;
    }

    let weighted: Vec<f64> = (0..n)
        .map(|i| (high[i] + low[i] + close[i]) / 3.0 * volume[i])
        .collect();

    for i in (window - 1)..n {
        let pv: f64 = weighted[i + 1 - window..=i].iter().sum();
        let v: f64 = volume[i + 1 - window..=i].iter().sum();
        out[i] = if v > 0.0 { pv / v } else { f64::NAN };
    }
    out
}

/// Single-period percentage change, zero at the first row.
pub fn lagged_return(close: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(close.len());
    for (i, &value) in close.iter().enumerate() {
        if i == 0 {
            out.push(0.0);
            continue;
        }
        let prev = close[i - 1];
        out.push(if prev != 0.0 { value / prev - 1.0 } else { 0.0 });
    }
    out
}

/// Average true range with Wilder smoothing.
pub fn atr(high: &[f64], low: &[f64], close: &[f64], window: usize) -> Vec<f64> {
    let n = close.len();
    let mut out = vec![f64::NAN; n];
    if n <= window {
        return out;
    }

    let mut tr = vec![0.0; n];
    tr[0] = high[0] - low[0];
    for i in 1..n {
        let prev_close = close[i - 1];
        tr[i] = (high[i] - low[i])
            .max((high[i] - prev_close).abs())
            .max((low[i] - prev_close).abs());
    }

    let mut smoothed: f64 = tr[1..=window].iter().sum::<f64>() / window as f64;
    out[window] = smoothed;
    for i in (window + 1)..n {
        smoothed = (smoothed * (window as f64 - 1.0) + tr[i]) / window as f64;
        out[i] = smoothed;
    }
    out
}

/// Average directional index with Wilder smoothing of TR and the directional
/// movements.
pub fn adx(high: &[f64], low: &[f64], close: &[f64], window: usize) -> Vec<f64> {
    let n = close.len();
    let mut out = vec![f64::NAN; n];
    if n < 2 * window {
        return out;
    }

    let mut tr = vec![0.0; n];
    let mut plus_dm = vec![0.0; n];
    let mut minus_dm = vec![0.0; n];
    for i in 1..n {
        let prev_close = close[i - 1];
        tr[i] = (high[i] - low[i])
            .max((high[i] - prev_close).abs())
            .max((low[i] - prev_close).abs());

        let up = high[i] - high[i - 1];
        let down = low[i - 1] - low[i];
        if up > down && up > 0.0 {
            plus_dm[i] = up;
        }
        if down > up && down > 0.0 {
            minus_dm[i] = down;
        }
    }

    let mut smooth_tr: f64 = tr[1..=window].iter().sum();
    let mut smooth_plus: f64 = plus_dm[1..=window].iter().sum();
    let mut smooth_minus: f64 = minus_dm[1..=window].iter().sum();

    let mut dx = vec![f64::NAN; n];
    dx[window] = dx_value(smooth_plus, smooth_minus, smooth_tr);

    for i in (window + 1)..n {
        smooth_tr = smooth_tr - smooth_tr / window as f64 + tr[i];
        smooth_plus = smooth_plus - smooth_plus / window as f64 + plus_dm[i];
        smooth_minus = smooth_minus - smooth_minus / window as f64 + minus_dm[i];
        dx[i] = dx_value(smooth_plus, smooth_minus, smooth_tr);
    }

    let first = 2 * window - 1;
    let mut adx_value: f64 = dx[window..=first].iter().sum::<f64>() / window as f64;
    out[first] = adx_value;
    for i in (first + 1)..n {
        adx_value = (adx_value * (window as f64 - 1.0) + dx[i]) / window as f64;
        out[i] = adx_value;
    }
    out
}

fn dx_value(smooth_plus: f64, smooth_minus: f64, smooth_tr: f64) -> f64 {
    if smooth_tr <= 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * smooth_plus / smooth_tr;
    let minus_di = 100.0 * smooth_minus / smooth_tr;
    let sum = plus_di + minus_di;
    if sum <= 0.0 {
        return 0.0;
    }
    100.0 * (plus_di - minus_di).abs() / sum
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_matches_hand_computed_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let out = sma(&values, 3);
        assert!(out[0].is_nan());
        assert!(out[1].is_nan());
        assert!((out[2] - 2.0).abs() < 1e-12);
        assert!((out[3] - 3.0).abs() < 1e-12);
        assert!((out[4] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn ema_follows_recurrence() {
        let values = [10.0, 20.0, 30.0];
        let out = ema(&values, 9);
        let alpha = 2.0 / 10.0;
        assert_eq!(out[0], 10.0);
        assert!((out[1] - (alpha * 20.0 + (1.0 - alpha) * 10.0)).abs() < 1e-12);
    }

    #[test]
    fn rsi_saturates_on_monotonic_gains() {
        let close: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&close, 14);
        assert!(out[13].is_nan());
        assert!((out[39] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn rsi_is_balanced_on_alternating_moves() {
        let close: Vec<f64> = (0..60)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let out = rsi(&close, 14);
        // Equal gains and losses keep RSI near the midline.
        assert!((out[59] - 50.0).abs() < 5.0);
    }

    #[test]
    fn bollinger_brackets_the_mean() {
        let close: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin()).collect();
        let bands = bollinger(&close, 20, 2.0);
        for i in 19..30 {
            assert!(bands.upper[i] >= bands.lower[i]);
            assert!(bands.width[i] >= 0.0);
        }
    }

    #[test]
    fn adx_stays_in_range() {
        let n = 100;
        let high: Vec<f64> = (0..n).map(|i| 101.0 + (i as f64 * 0.3).sin() * 5.0).collect();
        let low: Vec<f64> = high.iter().map(|h| h - 2.0).collect();
        let close: Vec<f64> = high.iter().map(|h| h - 1.0).collect();
        let out = adx(&high, &low, &close, 14);
        for value in out.iter().filter(|v| !v.is_nan()) {
            assert!((0.0..=100.0).contains(value));
        }
    }

    #[test]
    fn atr_positive_once_warm() {
        let n = 40;
        let high: Vec<f64> = (0..n).map(|i| 102.0 + i as f64 * 0.1).collect();
        let low: Vec<f64> = (0..n).map(|i| 98.0 + i as f64 * 0.1).collect();
        let close: Vec<f64> = (0..n).map(|i| 100.0 + i as f64 * 0.1).collect();
        let out = atr(&high, &low, &close, 14);
        assert!(out[13].is_nan());
        assert!(out[14] > 0.0);
    }

    #[test]
    fn lagged_return_starts_at_zero() {
        let out = lagged_return(&[100.0, 110.0, 99.0]);
        assert_eq!(out[0], 0.0);
        assert!((out[1] - 0.1).abs() < 1e-12);
        assert!((out[2] - (99.0 / 110.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn vwap_weights_by_volume() {
        let high = [10.0, 20.0];
        let low = [10.0, 20.0];
        let close = [10.0, 20.0];
        let volume = [1.0, 3.0];
        let out = vwap(&high, &low, &close, &volume, 2);
        // (10*1 + 20*3) / 4
        assert!((out[1] - 17.5).abs() < 1e-12);
    }
}

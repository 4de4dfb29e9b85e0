use ordered_float::OrderedFloat;

/// Largest peak-to-trough decline of a net-worth series, as a positive fraction.
pub fn max_drawdown(net_worths: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0f64;
    for &value in net_worths {
        peak = peak.max(value);
        if peak > 0.0 {
            worst = worst.max((peak - value) / peak);
        }
    }
    worst
}

/// Compound annual growth rate of a net-worth series.
pub fn annualized_return(net_worths: &[f64], periods_per_year: u32) -> f64 {
    if net_worths.len() < 2 {
        return 0.0;
    }
    let start = net_worths[0];
    let end = net_worths[net_worths.len() - 1];
    if start <= 0.0 {
        return 0.0;
    }
    (end / start).powf(periods_per_year as f64 / net_worths.len() as f64) - 1.0
}

/// Mean over standard deviation of a return series, the same epsilon-guarded
/// ratio the reward bonus uses.
pub fn sharpe_ratio(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    mean / (variance.sqrt() + 1e-9)
}

/// Highest value of a series, NaN-tolerant.
pub fn peak(values: &[f64]) -> Option<f64> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .map(OrderedFloat)
        .max()
        .map(|v| v.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_drawdown_of_known_series() {
        let series = [100.0, 120.0, 90.0, 110.0, 80.0];
        // worst decline: 120 -> 80
        assert!((max_drawdown(&series) - (120.0 - 80.0) / 120.0).abs() < 1e-12);
    }

    #[test]
    fn max_drawdown_of_monotonic_series_is_zero() {
        let series = [100.0, 101.0, 102.0];
        assert_eq!(max_drawdown(&series), 0.0);
    }

    #[test]
    fn annualized_return_compounds() {
        // doubling over exactly one year of periods
        let series: Vec<f64> = (0..252).map(|i| 100.0 + i as f64 * (100.0 / 251.0)).collect();
        let cagr = annualized_return(&series, 252);
        assert!((cagr - 1.0).abs() < 0.01);
    }

    #[test]
    fn sharpe_of_constant_positive_returns_is_large() {
        let returns = [0.01; 30];
        assert!(sharpe_ratio(&returns) > 1_000.0);
    }

    #[test]
    fn peak_ignores_nan() {
        let series = [1.0, f64::NAN, 3.0, 2.0];
        assert_eq!(peak(&series), Some(3.0));
    }
}

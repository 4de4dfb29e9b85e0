use enum_map::EnumMap;

use crate::types::Feature;

/// Per-feature standard scaler: (x - mean) / std, population std, fitted once
/// on the training table and reused for any later table.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    pub mean: EnumMap<Feature, f64>,
    pub std: EnumMap<Feature, f64>,
}

impl StandardScaler {
    pub fn fit(rows: &[EnumMap<Feature, f64>]) -> Self {
        let count = rows.len().max(1) as f64;

        let mut mean: EnumMap<Feature, f64> = EnumMap::default();
        for row in rows {
            for (feature, &value) in row.iter() {
                mean[feature] += value;
            }
        }
        for (_, value) in mean.iter_mut() {
            *value /= count;
        }

        let mut std: EnumMap<Feature, f64> = EnumMap::default();
        for row in rows {
            for (feature, &value) in row.iter() {
                std[feature] += (value - mean[feature]).powi(2);
            }
        }
        for (_, value) in std.iter_mut() {
            *value = (*value / count).sqrt();
            // A constant column scales by 1 so it maps to zero, not NaN.
            if *value == 0.0 {
                *value = 1.0;
            }
        }

        StandardScaler { mean, std }
    }

    pub fn transform(&self, row: &EnumMap<Feature, f64>) -> EnumMap<Feature, f64> {
        EnumMap::from_fn(|feature| (row[feature] - self.mean[feature]) / self.std[feature])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use enum_map::enum_map;

    #[test]
    fn fit_transform_centers_and_scales() {
        let rows: Vec<EnumMap<Feature, f64>> = (0..10)
            .map(|i| enum_map! { Feature::Close => i as f64, _ => 5.0 })
            .collect();
        let scaler = StandardScaler::fit(&rows);

        let transformed: Vec<f64> = rows
            .iter()
            .map(|r| scaler.transform(r)[Feature::Close])
            .collect();
        let mean: f64 = transformed.iter().sum::<f64>() / transformed.len() as f64;
        let var: f64 =
            transformed.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / transformed.len() as f64;

        assert!(mean.abs() < 1e-12);
        assert!((var - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_column_maps_to_zero() {
        let rows: Vec<EnumMap<Feature, f64>> =
            (0..5).map(|_| enum_map! { _ => 42.0 }).collect();
        let scaler = StandardScaler::fit(&rows);
        let out = scaler.transform(&rows[0]);
        assert_eq!(out[Feature::Rsi], 0.0);
    }
}

//! Least-squares linear trend model and its INI model files.
//!
//! The model is fit on (index, close) pairs with index 0 at the first close
//! and stored per symbol as `{SYMBOL}.model.ini`:
//!
//! ```ini
//! [model]
//! kind = linear_trend
//! symbol = AAPL
//! slope = 0.42
//! intercept = 101.3
//! trained_points = 2000
//! ```

use configparser::ini::Ini;
use std::path::{Path, PathBuf};

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::StockcastError;
use crate::domain::forecast::TrendModel;
use crate::domain::price::PriceSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::model_port::ModelPort;

const MODEL_KIND: &str = "linear_trend";

#[derive(Debug, Clone, PartialEq)]
pub struct LinearTrendModel {
    pub slope: f64,
    pub intercept: f64,
    pub trained_points: usize,
}

impl LinearTrendModel {
    /// Ordinary least squares of close on index.
    ///
    /// A single point yields a flat line through it.
    pub fn fit(series: &PriceSeries) -> Result<Self, StockcastError> {
        let closes = series.closes();
        let n = closes.len();
        if n == 0 {
            return Err(StockcastError::DataNotFound {
                symbol: series.symbol().to_string(),
            });
        }

        let n_f = n as f64;
        let mean_x = (n_f - 1.0) / 2.0;
        let mean_y = closes.iter().sum::<f64>() / n_f;

        let mut sxy = 0.0_f64;
        let mut sxx = 0.0_f64;
        for (i, &y) in closes.iter().enumerate() {
            let dx = i as f64 - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        let intercept = mean_y - slope * mean_x;

        Ok(LinearTrendModel {
            slope,
            intercept,
            trained_points: n,
        })
    }
}

impl TrendModel for LinearTrendModel {
    fn predict(&self, indices: &[usize]) -> Vec<f64> {
        indices
            .iter()
            .map(|&i| self.intercept + self.slope * i as f64)
            .collect()
    }

    fn name(&self) -> &str {
        MODEL_KIND
    }
}

/// Model files in a directory, one per symbol.
pub struct FileModelStore {
    directory: PathBuf,
}

impl FileModelStore {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    pub fn from_config(config: &dyn ConfigPort) -> Self {
        let directory = config
            .get_string("model", "directory")
            .unwrap_or_else(|| "models".to_string());
        Self::new(PathBuf::from(directory))
    }

    pub fn model_path(&self, symbol: &str) -> PathBuf {
        self.directory.join(format!("{}.model.ini", symbol))
    }

    pub fn save(&self, symbol: &str, model: &LinearTrendModel) -> Result<PathBuf, StockcastError> {
        std::fs::create_dir_all(&self.directory)?;

        let mut ini = Ini::new();
        ini.set("model", "kind", Some(MODEL_KIND.to_string()));
        ini.set("model", "symbol", Some(symbol.to_string()));
        ini.set("model", "slope", Some(model.slope.to_string()));
        ini.set("model", "intercept", Some(model.intercept.to_string()));
        ini.set(
            "model",
            "trained_points",
            Some(model.trained_points.to_string()),
        );

        let path = self.model_path(symbol);
        ini.write(&path)?;
        Ok(path)
    }

    fn read(&self, symbol: &str, path: &Path) -> Result<LinearTrendModel, StockcastError> {
        let unavailable = |reason: String| StockcastError::ModelUnavailable {
            symbol: symbol.to_string(),
            reason,
        };

        if !path.exists() {
            return Err(unavailable(format!("no model file at {}", path.display())));
        }
        let config = FileConfigAdapter::from_file(path)
            .map_err(|e| unavailable(format!("failed to read {}: {}", path.display(), e)))?;

        let kind = config.get_string("model", "kind").unwrap_or_default();
        if kind != MODEL_KIND {
            return Err(unavailable(format!("unsupported model kind '{}'", kind)));
        }

        let number = |key: &str| -> Result<f64, StockcastError> {
            config
                .get_string("model", key)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .filter(|v| v.is_finite())
                .ok_or_else(|| unavailable(format!("missing or invalid {}", key)))
        };

        Ok(LinearTrendModel {
            slope: number("slope")?,
            intercept: number("intercept")?,
            trained_points: config.get_int("model", "trained_points", 0).max(0) as usize,
        })
    }
}

impl ModelPort for FileModelStore {
    fn load_model(&self, symbol: &str) -> Result<Box<dyn TrendModel>, StockcastError> {
        let path = self.model_path(symbol);
        let model = self.read(symbol, &path)?;
        log::debug!(
            "loaded {} model for {} from {}",
            MODEL_KIND,
            symbol,
            path.display()
        );
        Ok(Box::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::price::{PricePoint, build_series};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn series(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let rows = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                symbol: "AAPL".into(),
                date: start + chrono::Days::new(i as u64),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000,
            })
            .collect();
        build_series("AAPL", rows).unwrap()
    }

    #[test]
    fn fit_exact_line() {
        let model = LinearTrendModel::fit(&series(&[10.0, 12.0, 14.0, 16.0])).unwrap();
        assert_relative_eq!(model.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(model.intercept, 10.0, epsilon = 1e-12);
        assert_eq!(model.trained_points, 4);
        assert_eq!(model.predict(&[4, 5]), vec![18.0, 20.0]);
    }

    #[test]
    fn fit_noisy_series() {
        // closes 105, 108, 103, 107: mean 105.75, sxy = 0.5, sxx = 5
        let model = LinearTrendModel::fit(&series(&[105.0, 108.0, 103.0, 107.0])).unwrap();
        assert_relative_eq!(model.slope, 0.1, epsilon = 1e-12);
        assert_relative_eq!(model.intercept, 105.6, epsilon = 1e-12);
    }

    #[test]
    fn fit_single_point_is_flat() {
        let model = LinearTrendModel::fit(&series(&[42.0])).unwrap();
        assert_eq!(model.slope, 0.0);
        assert_eq!(model.predict(&[1, 100]), vec![42.0, 42.0]);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().join("models"));
        let model = LinearTrendModel {
            slope: 0.3,
            intercept: 105.3,
            trained_points: 4,
        };

        let path = store.save("AAPL", &model).unwrap();
        assert!(path.ends_with("AAPL.model.ini"));

        let loaded = store.load_model("AAPL").unwrap();
        assert_eq!(loaded.name(), "linear_trend");
        assert_relative_eq!(loaded.predict(&[4])[0], 106.5, epsilon = 1e-9);
    }

    #[test]
    fn missing_model_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = FileModelStore::new(dir.path().to_path_buf());
        match store.load_model("AAPL") {
            Err(StockcastError::ModelUnavailable { symbol, reason }) => {
                assert_eq!(symbol, "AAPL");
                assert!(reason.contains("no model file"));
            }
            Err(other) => panic!("expected ModelUnavailable, got: {other}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn corrupt_model_is_unavailable() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("AAPL.model.ini"),
            "[model]\nkind = linear_trend\nslope = steep\nintercept = 1\n",
        )
        .unwrap();
        let store = FileModelStore::new(dir.path().to_path_buf());
        let err = store.load_model("AAPL").err().unwrap();
        assert!(err.to_string().contains("slope"));
    }

    #[test]
    fn wrong_kind_is_unavailable() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("AAPL.model.ini"),
            "[model]\nkind = random_forest\nslope = 1\nintercept = 1\n",
        )
        .unwrap();
        let store = FileModelStore::new(dir.path().to_path_buf());
        assert!(matches!(
            store.load_model("AAPL"),
            Err(StockcastError::ModelUnavailable { .. })
        ));
    }

    #[test]
    fn directory_from_config() {
        let config = FileConfigAdapter::from_string("[model]\ndirectory = /srv/models\n").unwrap();
        let store = FileModelStore::from_config(&config);
        assert_eq!(
            store.model_path("AAPL"),
            PathBuf::from("/srv/models/AAPL.model.ini")
        );
    }
}

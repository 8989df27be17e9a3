//! Access to fitted trend models produced out of band.

use crate::domain::error::StockcastError;
use crate::domain::forecast::TrendModel;

pub trait ModelPort {
    /// The fitted model for `symbol`, or `ModelUnavailable`.
    fn load_model(&self, symbol: &str) -> Result<Box<dyn TrendModel>, StockcastError>;
}

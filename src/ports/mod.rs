//! Port traits at the collaborator seams: storage, models, config, reports.

pub mod config_port;
pub mod data_port;
pub mod model_port;
pub mod prediction_port;
pub mod report_port;

//! Reasoning-path analysis for multi-hop question answering.
//!
//! Prediction records for a multi-hop question and its single-hop
//! sub-questions are grouped, labeled with a correctness path such as
//! `C/W/W`, and aggregated into distributions that can be compared across
//! experimental conditions (document masking, question framing).

pub mod analysis;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod model;
pub mod predictor;
pub mod util;

pub use error::RecordError;
pub use model::{Group, GroupedDataset, PredictionRecord, Role};

pub mod metrics;
pub mod path_distribution;
pub mod path_labeler;
pub mod scorer;

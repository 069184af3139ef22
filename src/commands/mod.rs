pub mod filter;
pub mod framing;
pub mod mask_effect;
pub mod paths;
pub mod replay;
mod report;
pub mod score;

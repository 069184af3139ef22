pub mod framing_robustness;
pub mod mask_effect;

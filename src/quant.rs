//! # Quant
//!
//! $$
//! S = \sqrt{P}\,\frac{\mathbb E[r]}{\sigma_r}
//! $$
//!
pub mod portfolio;

//! Small statistics kernels used by the analysis passes.
//!
//! - paired t-test (`ttest`)
//! - linearly interpolated quantiles (`quantile`)
//! - percentage shares and running sums (`share`)

pub mod quantile;
pub mod share;
pub mod ttest;

pub use quantile::*;
pub use share::*;
pub use ttest::*;

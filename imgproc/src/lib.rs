pub mod binning;
pub mod gradient;
pub mod magnitude;

pub use binning::*;
pub use gradient::*;
pub use magnitude::*;

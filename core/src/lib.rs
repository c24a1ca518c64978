pub mod bounds;
pub mod error;
pub mod image;
pub mod runtime;
pub mod scalar;
pub mod tensor;

pub use bounds::*;
pub use error::*;
pub use scalar::*;
pub use tensor::*;

//! Histogram-of-oriented-gradients feature extraction over integral
//! histograms.
//!
//! ```no_run
//! use hog_rs::{HogConfig, IntegralHogDescriptor};
//! use hog_rs::core::Tensor3;
//!
//! # fn main() -> hog_rs::core::Result<()> {
//! let mut descriptor: IntegralHogDescriptor<f32> =
//!     IntegralHogDescriptor::new(HogConfig::default())?;
//!
//! let image: Tensor3<u8> = Tensor3::zeros(128, 64, 1);
//! descriptor.compute(&image, None)?;
//! let features = descriptor.features()?;
//! # Ok(())
//! # }
//! ```

pub use hog_core as core;
pub use hog_descriptor as descriptor;
pub use hog_imgproc as imgproc;

pub use hog_core::{Bounds, Error, Result, Size2};
pub use hog_descriptor::{
    BlockNormKind, BlockNormalizer, DescriptorState, HogConfig, IntegralHistogram,
    IntegralHogDescriptor, Mask,
};
pub use hog_imgproc::{Binning, Gradient, Magnitude, Stencil};

/// Pins the process-wide worker pool used for batched region extraction.
/// Effective once; later calls and the `HOGRS_CPU_THREADS` variable are
/// ignored after the pool exists.
pub fn init_thread_pool(threads: Option<usize>) -> std::result::Result<(), String> {
    hog_core::runtime::init_global_thread_pool(threads)
}

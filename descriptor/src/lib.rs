//! HOG descriptor extraction backed by an integral histogram.
//!
//! The expensive work (gradients, binning, the integral scan) happens once
//! in [`IntegralHogDescriptor::compute`]; any number of rectangular regions
//! can then be turned into normalized feature tensors in time proportional
//! to the descriptor size, independent of region area.

pub mod descriptor;
pub mod integral_histogram;
pub mod normalize;

pub use descriptor::{DescriptorState, HogConfig, IntegralHogDescriptor, Mask};
pub use integral_histogram::IntegralHistogram;
pub use normalize::{BlockNormKind, BlockNormalizer};

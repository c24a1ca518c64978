use std::fmt;
use std::str::FromStr;

use hog_core::{Error, Real};
use serde::{Deserialize, Serialize};

/// Block normalization scheme applied to each descriptor block in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockNormKind {
    /// v / (Σ|v| + ε)
    L1,
    /// L1, clip, then L1 again.
    L1Hys,
    /// sqrt of the L1-normalized block.
    L1Sqrt,
    /// v / sqrt(Σv² + ε²)
    L2,
    /// L2, clip, then L2 again.
    #[default]
    L2Hys,
}

impl FromStr for BlockNormKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "l1" => Ok(BlockNormKind::L1),
            "l1-hys" => Ok(BlockNormKind::L1Hys),
            "l1-sqrt" => Ok(BlockNormKind::L1Sqrt),
            "l2" => Ok(BlockNormKind::L2),
            "l2-hys" => Ok(BlockNormKind::L2Hys),
            other => Err(Error::InvalidParameter(format!(
                "unknown block normalizer '{other}', expected one of: l1, l1-hys, l1-sqrt, l2, l2-hys"
            ))),
        }
    }
}

impl fmt::Display for BlockNormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BlockNormKind::L1 => "l1",
            BlockNormKind::L1Hys => "l1-hys",
            BlockNormKind::L1Sqrt => "l1-sqrt",
            BlockNormKind::L2 => "l2",
            BlockNormKind::L2Hys => "l2-hys",
        };
        f.write_str(name)
    }
}

/// Applies a [`BlockNormKind`] with a fixed clip threshold and regularizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockNormalizer<T> {
    kind: BlockNormKind,
    clip: T,
    epsilon: T,
}

impl<T: Real> Default for BlockNormalizer<T> {
    fn default() -> Self {
        Self::new(BlockNormKind::default(), None, None)
    }
}

impl<T: Real> BlockNormalizer<T> {
    /// Missing overrides fall back to clip 0.2 and machine epsilon.
    pub fn new(kind: BlockNormKind, clip: Option<T>, epsilon: Option<T>) -> Self {
        Self {
            kind,
            clip: clip.unwrap_or_else(|| T::from_f64(0.2).unwrap_or_else(T::epsilon)),
            epsilon: epsilon.unwrap_or_else(T::epsilon),
        }
    }

    pub fn kind(&self) -> BlockNormKind {
        self.kind
    }

    /// The clip threshold, for the hysteresis variants only.
    pub fn clip(&self) -> Option<T> {
        match self.kind {
            BlockNormKind::L1Hys | BlockNormKind::L2Hys => Some(self.clip),
            _ => None,
        }
    }

    pub fn epsilon(&self) -> T {
        self.epsilon
    }

    pub fn normalize(&self, block: &mut [T]) {
        match self.kind {
            BlockNormKind::L1 => self.l1(block),
            BlockNormKind::L1Hys => {
                self.l1(block);
                clip_to(block, self.clip);
                self.l1(block);
            }
            BlockNormKind::L1Sqrt => {
                self.l1(block);
                // Negative votes cannot occur, but rounding can produce a
                // tiny negative residue; sqrt of that would poison the block.
                for v in block.iter_mut() {
                    *v = v.max(T::zero()).sqrt();
                }
            }
            BlockNormKind::L2 => self.l2(block),
            BlockNormKind::L2Hys => {
                self.l2(block);
                clip_to(block, self.clip);
                self.l2(block);
            }
        }
    }

    fn l1(&self, block: &mut [T]) {
        let den = block.iter().map(|v| v.abs()).sum::<T>() + self.epsilon;
        scale_by(block, den);
    }

    fn l2(&self, block: &mut [T]) {
        let den = (block.iter().map(|&v| v * v).sum::<T>() + self.epsilon * self.epsilon).sqrt();
        scale_by(block, den);
    }
}

/// Exact IEEE zero is the only divisor that leaves the block untouched.
fn scale_by<T: Real>(block: &mut [T], den: T) {
    if den != T::zero() {
        for v in block.iter_mut() {
            *v = *v / den;
        }
    }
}

fn clip_to<T: Real>(block: &mut [T], clip: T) {
    for v in block.iter_mut() {
        *v = v.min(clip);
    }
}

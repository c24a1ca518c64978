use std::fmt;
use std::str::FromStr;

use hog_core::{Error, Real};
use serde::{Deserialize, Serialize};

/// Maps a gradient vector to a normalized orientation weight in [0, 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binning {
    /// Half-circle orientation: opposite gradients share a bin.
    #[default]
    Unsigned,
    /// Full-circle orientation over [0, 2π).
    Signed,
}

impl Binning {
    pub fn weight<T: Real>(&self, dx: T, dy: T) -> T {
        match self {
            Binning::Unsigned => {
                let eps = T::epsilon();

                let angle = if dx.abs() < eps && dy.abs() < eps {
                    T::zero()
                } else if dx.abs() > eps {
                    (dy / dx).atan()
                } else {
                    // Vertical gradient: ±π/2 signed by dy.
                    T::FRAC_PI_2().copysign(dy)
                };

                // Map [-π/2, +π/2) to [0, π).
                let angle = if angle < T::zero() {
                    angle + T::PI()
                } else {
                    angle
                };

                angle / T::PI()
            }
            Binning::Signed => {
                let angle = dy.atan2(dx);

                // Map [-π, +π) to [0, 2π).
                let angle = if angle < T::zero() {
                    angle + T::TAU()
                } else {
                    angle
                };

                angle / T::TAU()
            }
        }
    }
}

impl FromStr for Binning {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "unsigned" => Ok(Binning::Unsigned),
            "signed" => Ok(Binning::Signed),
            other => Err(Error::InvalidParameter(format!(
                "unknown binning '{other}', expected one of: unsigned, signed"
            ))),
        }
    }
}

impl fmt::Display for Binning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Binning::Unsigned => "unsigned",
            Binning::Signed => "signed",
        };
        f.write_str(name)
    }
}

//! Mother wavelet definitions
//!
//! Each mother wavelet is described by its Fourier transform on angular
//! frequency, the Fourier factor relating scale to equivalent period, and the
//! e-folding factor used for the cone of influence.
//!
//! # References
//! - Torrence & Compo (1998), "A Practical Guide to Wavelet Analysis", Table 1

use num_complex::Complex64;
use std::f64::consts::{PI, SQRT_2};

use crate::error::{AnalysisError, Result};

/// Highest Paul order whose normalization and spectrum stay finite in f64
pub const MAX_PAUL_ORDER: u32 = 20;
/// Highest DOG order whose normalization and spectrum stay finite in f64
pub const MAX_DOG_ORDER: u32 = 40;

/// Continuous mother wavelet
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mother {
    /// Morlet wavelet with nondimensional center frequency `omega0`
    Morlet { omega0: f64 },
    /// Paul wavelet of order `order`
    Paul { order: u32 },
    /// Derivative of Gaussian of order `order` (order 2 is the Mexican hat)
    Dog { order: u32 },
}

impl Default for Mother {
    fn default() -> Self {
        Mother::Morlet { omega0: 6.0 }
    }
}

impl Mother {
    pub fn morlet(omega0: f64) -> Self {
        Mother::Morlet { omega0 }
    }

    /// Parse from wavelet name string (e.g., "morlet6", "paul4", "dog2")
    ///
    /// A bare family name uses the conventional default parameter
    /// (Morlet ω0 = 6, Paul m = 4, DOG m = 2). "mexicanhat" is DOG order 2.
    pub fn from_name(name: &str) -> Result<Self> {
        let lower = name.trim().to_ascii_lowercase();
        let invalid = || AnalysisError::invalid_parameter("mother", name);

        if lower == "mexicanhat" {
            return Ok(Mother::Dog { order: 2 });
        }

        let (family, param) = match lower.find(|c: char| c.is_ascii_digit()) {
            Some(idx) => (&lower[..idx], Some(&lower[idx..])),
            None => (lower.as_str(), None),
        };

        let mother = match family {
            "morlet" => {
                let omega0 = match param {
                    Some(p) => p.parse::<f64>().map_err(|_| invalid())?,
                    None => 6.0,
                };
                Mother::Morlet { omega0 }
            }
            "paul" => {
                let order = match param {
                    Some(p) => p.parse::<u32>().map_err(|_| invalid())?,
                    None => 4,
                };
                Mother::Paul { order }
            }
            "dog" => {
                let order = match param {
                    Some(p) => p.parse::<u32>().map_err(|_| invalid())?,
                    None => 2,
                };
                Mother::Dog { order }
            }
            _ => return Err(invalid()),
        };

        mother.validate()?;
        Ok(mother)
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Mother::Morlet { omega0 } if !(omega0.is_finite() && omega0 > 0.0) => {
                Err(AnalysisError::invalid_parameter("omega0", omega0))
            }
            Mother::Paul { order } if order == 0 || order > MAX_PAUL_ORDER => {
                Err(AnalysisError::invalid_parameter("order", order))
            }
            Mother::Dog { order } if order == 0 || order > MAX_DOG_ORDER => {
                Err(AnalysisError::invalid_parameter("order", order))
            }
            _ => Ok(()),
        }
    }

    /// Canonical name, inverse of [`Mother::from_name`]
    pub fn name(&self) -> String {
        match *self {
            Mother::Morlet { omega0 } => format!("morlet{}", omega0),
            Mother::Paul { order } => format!("paul{}", order),
            Mother::Dog { order } => format!("dog{}", order),
        }
    }

    /// Whether the wavelet is complex-valued (carries phase information)
    pub fn is_complex(&self) -> bool {
        !matches!(self, Mother::Dog { order } if order % 2 == 0)
    }

    /// Fourier transform of the mother wavelet at angular frequency `w`
    /// (already multiplied by the scale).
    ///
    /// Orders rejected by [`Mother::validate`] yield zero.
    ///
    /// # Formula
    /// ```text
    /// Morlet: pi^(-1/4) * H(w) * exp(-(w - w0)^2 / 2)
    /// Paul:   2^m / sqrt(m * (2m-1)!) * H(w) * w^m * exp(-w)
    /// DOG:    -i^m / sqrt(gamma(m + 1/2)) * w^m * exp(-w^2 / 2)
    /// ```
    pub fn psi_ft(&self, w: f64) -> Complex64 {
        match *self {
            Mother::Morlet { omega0 } => {
                if w <= 0.0 {
                    return Complex64::new(0.0, 0.0);
                }
                let d = w - omega0;
                Complex64::new(PI.powf(-0.25) * (-0.5 * d * d).exp(), 0.0)
            }
            Mother::Paul { order } => {
                if w <= 0.0 || order == 0 || order > MAX_PAUL_ORDER {
                    return Complex64::new(0.0, 0.0);
                }
                let m = order as f64;
                let norm = 2f64.powi(order as i32) / (m * factorial(2 * order - 1)).sqrt();
                Complex64::new(norm * w.powi(order as i32) * (-w).exp(), 0.0)
            }
            Mother::Dog { order } => {
                if order == 0 || order > MAX_DOG_ORDER {
                    return Complex64::new(0.0, 0.0);
                }
                let norm = -1.0 / gamma_half_integer(order).sqrt();
                let amp = norm * w.powi(order as i32) * (-0.5 * w * w).exp();
                i_pow(order) * amp
            }
        }
    }

    /// Ratio between equivalent Fourier period and wavelet scale.
    pub fn fourier_factor(&self) -> f64 {
        match *self {
            Mother::Morlet { omega0 } => 4.0 * PI / (omega0 + (2.0 + omega0 * omega0).sqrt()),
            Mother::Paul { order } => 4.0 * PI / (2.0 * order as f64 + 1.0),
            Mother::Dog { order } => 2.0 * PI / (order as f64 + 0.5).sqrt(),
        }
    }

    /// e-folding time factor for the cone of influence
    pub fn e_folding(&self) -> f64 {
        match self {
            Mother::Morlet { .. } | Mother::Dog { .. } => SQRT_2,
            Mother::Paul { .. } => 1.0 / SQRT_2,
        }
    }

    /// Frequency (in 1/time-unit) associated with `scale`
    pub fn scale_to_frequency(&self, scale: f64) -> f64 {
        1.0 / (self.fourier_factor() * scale)
    }
}

fn factorial(n: u32) -> f64 {
    (1..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// gamma(m + 1/2) via the recurrence gamma(k + 1/2) = (k - 1/2) * gamma(k - 1/2)
fn gamma_half_integer(m: u32) -> f64 {
    (1..=m).fold(PI.sqrt(), |acc, k| acc * (k as f64 - 0.5))
}

fn i_pow(m: u32) -> Complex64 {
    match m % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_names() {
        assert_eq!(Mother::from_name("morlet6").unwrap(), Mother::Morlet { omega0: 6.0 });
        assert_eq!(Mother::from_name("Morlet").unwrap(), Mother::Morlet { omega0: 6.0 });
        assert_eq!(Mother::from_name("paul4").unwrap(), Mother::Paul { order: 4 });
        assert_eq!(Mother::from_name("dog6").unwrap(), Mother::Dog { order: 6 });
        assert_eq!(Mother::from_name("mexicanhat").unwrap(), Mother::Dog { order: 2 });
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Mother::from_name("haar").is_err());
        assert!(Mother::from_name("paul0").is_err());
        assert!(Mother::from_name("morlet-x").is_err());
        assert!(Mother::from_name("dog0").is_err());
    }

    #[test]
    fn test_order_limits() {
        assert!(Mother::from_name("paul20").is_ok());
        assert!(Mother::from_name("dog40").is_ok());
        for name in ["paul21", "paul90", "dog41", "dog200"] {
            assert!(
                matches!(Mother::from_name(name), Err(AnalysisError::InvalidParameter { .. })),
                "accepted {}",
                name
            );
        }
        assert!(Mother::Paul { order: 90 }.validate().is_err());
    }

    #[test]
    fn test_invalid_orders_have_zero_spectrum() {
        assert_eq!(Mother::Paul { order: 0 }.psi_ft(1.0).norm(), 0.0);
        assert_eq!(Mother::Paul { order: 90 }.psi_ft(1.0).norm(), 0.0);
        assert_eq!(Mother::Dog { order: 200 }.psi_ft(1.0).norm(), 0.0);
    }

    #[test]
    fn test_name_round_trip() {
        for mother in [Mother::default(), Mother::Paul { order: 4 }, Mother::Dog { order: 2 }] {
            assert_eq!(Mother::from_name(&mother.name()).unwrap(), mother);
        }
    }

    #[test]
    fn test_morlet_frequency_mapping() {
        let mother = Mother::default();
        let scale = 2.5;
        let expected = (6.0 + (2.0f64 + 36.0).sqrt()) / (4.0 * PI * scale);
        assert_relative_eq!(mother.scale_to_frequency(scale), expected, epsilon = 1e-12);
        assert_relative_eq!(mother.fourier_factor(), 1.0330, epsilon = 1e-4);
    }

    #[test]
    fn test_morlet_peak_at_omega0() {
        let mother = Mother::default();
        let peak = mother.psi_ft(6.0).re;
        assert_relative_eq!(peak, PI.powf(-0.25), epsilon = 1e-12);
        assert!(mother.psi_ft(5.0).re < peak);
        assert_eq!(mother.psi_ft(-6.0).norm(), 0.0);
    }

    #[test]
    fn test_gamma_half_integer() {
        // gamma(2.5) = 3/4 * sqrt(pi)
        assert_relative_eq!(gamma_half_integer(2), 0.75 * PI.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(gamma_half_integer(0), PI.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_mexican_hat_is_real() {
        let mother = Mother::Dog { order: 2 };
        assert!(!mother.is_complex());
        let v = mother.psi_ft(1.0);
        assert_eq!(v.im, 0.0);
        assert!(v.re > 0.0);
    }
}

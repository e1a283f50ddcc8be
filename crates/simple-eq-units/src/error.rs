// SPDX-License-Identifier: LGPL-3.0-or-later

//! Error types for coefficient design.

use thiserror::Error;

/// Reason a coefficient set could not be designed.
///
/// A rejected design is never applied to a live stage: the caller keeps
/// the previous coefficients.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum DesignError {
    /// A parameter is out of its valid range (or not a finite number).
    #[error("invalid {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The requested frequency is at or above half the sample rate.
    #[error("frequency {frequency} Hz is not below the Nyquist frequency {nyquist} Hz")]
    NyquistViolation { frequency: f64, nyquist: f64 },
}

impl DesignError {
    /// Return true for the Nyquist specialization of an invalid parameter.
    pub fn is_nyquist_violation(&self) -> bool {
        matches!(self, Self::NyquistViolation { .. })
    }
}

/// Check a design frequency against `(0, sample_rate / 2)`.
pub(crate) fn check_frequency(freq: f64, sample_rate: f64) -> Result<(), DesignError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(DesignError::InvalidParameter {
            name: "sample rate",
            value: sample_rate,
        });
    }
    if !(freq.is_finite() && freq > 0.0) {
        return Err(DesignError::InvalidParameter {
            name: "frequency",
            value: freq,
        });
    }
    let nyquist = sample_rate * 0.5;
    if freq >= nyquist {
        return Err(DesignError::NyquistViolation {
            frequency: freq,
            nyquist,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_audible_range() {
        assert!(check_frequency(20.0, 48000.0).is_ok());
        assert!(check_frequency(20000.0, 48000.0).is_ok());
    }

    #[test]
    fn rejects_nyquist_and_above() {
        let err = check_frequency(24000.0, 48000.0).unwrap_err();
        assert!(err.is_nyquist_violation());
        let err = check_frequency(20000.0, 22050.0).unwrap_err();
        assert_eq!(
            err,
            DesignError::NyquistViolation {
                frequency: 20000.0,
                nyquist: 11025.0
            }
        );
    }

    #[test]
    fn rejects_non_positive_and_non_finite() {
        for f in [0.0, -10.0, f64::NAN, f64::INFINITY] {
            let err = check_frequency(f, 48000.0).unwrap_err();
            assert!(!err.is_nyquist_violation(), "{f} should be InvalidParameter");
        }
        assert!(matches!(
            check_frequency(1000.0, 0.0),
            Err(DesignError::InvalidParameter {
                name: "sample rate",
                ..
            })
        ));
    }

    #[test]
    fn messages_are_readable() {
        let err = DesignError::InvalidParameter {
            name: "Q",
            value: 0.0,
        };
        assert_eq!(err.to_string(), "invalid Q: 0");
    }
}

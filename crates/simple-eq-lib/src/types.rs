// SPDX-License-Identifier: LGPL-3.0-or-later

//! Core data types for the biquad primitives.

/// Number of delay (memory) elements in a single biquad section.
pub const BIQUAD_D_ITEMS: usize = 2;

/// Coefficients for a single biquad filter section.
///
/// The denominator is normalized (`a0 = 1`) and `a1`/`a2` are stored
/// **pre-negated** relative to the Audio EQ Cookbook, so the recurrence
/// only adds:
/// ```text
///   y[n] = b0*x[n] + d0
///   d0   = b1*x[n] + a1*y[n] + d1
///   d1   = b2*x[n] + a2*y[n]
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadX1 {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl BiquadX1 {
    /// Identity section: passes the signal unchanged.
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Return true if every coefficient is a finite number.
    pub fn is_finite(&self) -> bool {
        self.b0.is_finite()
            && self.b1.is_finite()
            && self.b2.is_finite()
            && self.a1.is_finite()
            && self.a2.is_finite()
    }

    /// Return true if both poles lie strictly inside the unit circle.
    ///
    /// Stability triangle on the stored (rounded) values:
    /// `|a2| < 1` and `|a1| < 1 - a2`.
    pub fn is_stable(&self) -> bool {
        let a1 = f64::from(self.a1);
        let a2 = f64::from(self.a2);
        self.is_finite() && a2.abs() < 1.0 && a1.abs() < 1.0 - a2
    }
}

impl Default for BiquadX1 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Single biquad section: coefficients plus delay memory.
#[derive(Debug, Clone, Default)]
pub struct Biquad {
    /// Delay memory elements.
    pub d: [f32; BIQUAD_D_ITEMS],
    /// Filter coefficients.
    pub coeffs: BiquadX1,
}

impl Biquad {
    /// Create a section with the given coefficients and cleared memory.
    pub fn with_coeffs(coeffs: BiquadX1) -> Self {
        Self {
            d: [0.0; BIQUAD_D_ITEMS],
            coeffs,
        }
    }

    /// Reset the delay memory to zero (clear filter state).
    pub fn reset(&mut self) {
        self.d = [0.0; BIQUAD_D_ITEMS];
    }
}

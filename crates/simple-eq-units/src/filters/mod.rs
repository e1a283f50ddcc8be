// SPDX-License-Identifier: LGPL-3.0-or-later

//! Filter design and processing units.

pub mod bank;
pub mod butterworth;
pub mod chain;
pub mod coeffs;
pub mod stage;

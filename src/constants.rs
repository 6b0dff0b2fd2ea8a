//! # Constants and type definitions for gravitas
//!
//! This module centralizes the **physical constants**, **conversion factors**, and
//! **common type aliases** used throughout the crate.
//!
//! ## Overview
//!
//! - Unit conversions (degrees ↔ radians, days ↔ seconds)
//! - Core scalar aliases documenting the SI unit carried by an `f64`
//!
//! Every quantity in the crate is expressed in SI units: metres, seconds, radians,
//! and m³/s² for gravitational parameters.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Newtonian constant of gravitation (CODATA 2018), m³/(kg·s²)
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11;

/// Gravitational parameter of the Sun (IAU 2015 nominal), m³/s²
pub const SUN_GRAVITATIONAL_PARAMETER: f64 = 1.327_124_4e20;

/// Gravitational parameter of the Earth (IAU 2015 nominal), m³/s²
pub const EARTH_GRAVITATIONAL_PARAMETER: f64 = 3.986_004e14;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in radians
pub type Radian = f64;
/// Distance in metres
pub type Meter = f64;
/// Speed in metres per second
pub type MeterPerSecond = f64;
/// Time interval in seconds
pub type Second = f64;
/// Angular frequency in radians per second
pub type RadianPerSecond = f64;
/// Gravitational parameter μ = G·M in m³/s²
pub type GravitationalParameter = f64;


//! Physical constants in SI units.

/// Universal gravitational constant, m^3 / (kg s^2).
pub const UNIVERSAL_GRAVITATIONAL_CONSTANT_G: f64 = 6.67408e-11;

/// kg
pub const MASS_OF_EARTH: f64 = 5.9722e24;

/// Equatorial radius, m.
pub const RADIUS_OF_EARTH: f64 = 6378137.0;

/// Surface gravitational acceleration `G M / R^2`, m/s^2.
pub const GRAVITATIONAL_ACCELERATION_ON_EARTH: f64 =
    UNIVERSAL_GRAVITATIONAL_CONSTANT_G * MASS_OF_EARTH / (RADIUS_OF_EARTH * RADIUS_OF_EARTH);

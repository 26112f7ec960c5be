use crate::constants::{MASS_OF_EARTH, UNIVERSAL_GRAVITATIONAL_CONSTANT_G};
use crate::vector_expr::VectorExpr3D;

/// Newton's second law solved for acceleration: the resultant of `forces` over `mass`.
pub fn solve_for_acceleration(forces: &[VectorExpr3D], mass: f64) -> VectorExpr3D {
    let resultant = forces
        .iter()
        .fold(VectorExpr3D::zero(), |sum, force| sum + force.clone());
    resultant / mass
}

pub fn solve_for_sum_of_forces(acceleration: &VectorExpr3D, mass: f64) -> VectorExpr3D {
    acceleration * mass
}

/// Attraction between the Earth and a body of `mass` whose center lies `r` from the
/// Earth's center.
pub fn gravitational_force_magnitude(r: f64, mass: f64) -> f64 {
    UNIVERSAL_GRAVITATIONAL_CONSTANT_G * MASS_OF_EARTH * mass / (r * r)
}

/// `G m1 m2 / r^2` between any two point masses.
pub fn newtonian_gravitational_force(m1: f64, m2: f64, r: f64) -> f64 {
    UNIVERSAL_GRAVITATIONAL_CONSTANT_G * m1 * m2 / (r * r)
}

/// Surface gravity `G M / R^2` of a planet of mass `M` and radius `R`.
pub fn gravitational_acceleration_magnitude(mass_of_planet: f64, radius_of_planet: f64) -> f64 {
    UNIVERSAL_GRAVITATIONAL_CONSTANT_G * mass_of_planet / (radius_of_planet * radius_of_planet)
}

//! Unit conventions and relativistic kinematics helpers.
//!
//! Energies are in MeV, lengths in mm and times in ns throughout the crate.

/// Speed of light in mm/ns
pub const C_LIGHT: f64 = 299.792458;

/// Total energy (kinetic + rest) of a particle
pub fn total_energy(kinetic_energy: f64, mass: f64) -> f64 {
    kinetic_energy + mass
}

/// Momentum magnitude in MeV/c
pub fn momentum(kinetic_energy: f64, mass: f64) -> f64 {
    (kinetic_energy * (kinetic_energy + 2.0 * mass)).max(0.0).sqrt()
}

/// Velocity in mm/ns.
///
/// Massless particles always travel at `C_LIGHT`; a massive particle with no
/// kinetic energy is at rest.
pub fn velocity(kinetic_energy: f64, mass: f64) -> f64 {
    if mass <= 0.0 {
        return C_LIGHT;
    }
    if kinetic_energy <= 0.0 {
        return 0.0;
    }
    let gamma = total_energy(kinetic_energy, mass) / mass;
    C_LIGHT * (1.0 - 1.0 / (gamma * gamma)).max(0.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_massless_travels_at_c() {
        assert_eq!(velocity(1.0, 0.0), C_LIGHT);
        assert_eq!(velocity(0.0, 0.0), C_LIGHT);
    }

    #[test]
    fn test_massive_at_rest() {
        assert_eq!(velocity(0.0, 938.272), 0.0);
        assert_eq!(momentum(0.0, 938.272), 0.0);
    }

    #[test]
    fn test_electron_momentum() {
        // KE = m gives p = sqrt(3) m
        let m = 0.510_998_95;
        assert!((momentum(m, m) - 3.0_f64.sqrt() * m).abs() < 1e-12);
        // gamma = 2 gives beta = sqrt(3)/2
        assert!((velocity(m, m) - C_LIGHT * 3.0_f64.sqrt() / 2.0).abs() < 1e-9);
    }
}

/// Bohr radii per Angstrom.
pub const ANGSTROM_TO_BOHR: f64 = 1.88972687777;

/// Electronvolts per Rydberg.
pub const RYDBERG_TO_EV: f64 = 13.605693122994;

/// GPa per eV/Å³.
pub const EV_PER_CUBIC_ANGSTROM_TO_GPA: f64 = 160.21766208;

#[inline]
pub fn angstrom_to_bohr(angstrom: f64) -> f64 {
    angstrom * ANGSTROM_TO_BOHR
}

#[inline]
pub fn bohr_to_angstrom(bohr: f64) -> f64 {
    bohr / ANGSTROM_TO_BOHR
}

#[inline]
pub fn rydberg_to_ev(rydberg: f64) -> f64 {
    rydberg * RYDBERG_TO_EV
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOLERANCE: f64 = 1e-9;

    #[test]
    fn angstrom_and_bohr_conversions_are_inverse() {
        let a = 2.2;
        let bohr = angstrom_to_bohr(a);
        assert!((bohr - 4.157399131094).abs() < TOLERANCE);
        assert!((bohr_to_angstrom(bohr) - a).abs() < TOLERANCE);
    }

    #[test]
    fn rydberg_to_ev_uses_codata_factor() {
        assert!((rydberg_to_ev(-2.0) + 27.211386245988).abs() < TOLERANCE);
    }
}

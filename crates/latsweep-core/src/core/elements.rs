use phf::{Map, phf_map};

/// Standard atomic weights (amu) for elements commonly swept as elemental solids.
#[rustfmt::skip]
static ATOMIC_MASSES: Map<&'static str, f64> = phf_map! {
    // --- Alkali and alkaline-earth metals ---
    "Li" => 6.94,    "Na" => 22.990,  "K"  => 39.098,  "Rb" => 85.468,  "Cs" => 132.91,
    "Be" => 9.0122,  "Mg" => 24.305,  "Ca" => 40.078,  "Sr" => 87.62,   "Ba" => 137.33,

    // --- 3d transition metals ---
    "Sc" => 44.956,  "Ti" => 47.867,  "V"  => 50.942,  "Cr" => 51.996,  "Mn" => 54.938,
    "Fe" => 55.845,  "Co" => 58.933,  "Ni" => 58.693,  "Cu" => 63.546,  "Zn" => 65.38,

    // --- 4d transition metals ---
    "Y"  => 88.906,  "Zr" => 91.224,  "Nb" => 92.906,  "Mo" => 95.95,   "Ru" => 101.07,
    "Rh" => 102.91,  "Pd" => 106.42,  "Ag" => 107.87,  "Cd" => 112.41,

    // --- 5d transition metals ---
    "Hf" => 178.49,  "Ta" => 180.95,  "W"  => 183.84,  "Re" => 186.21,  "Os" => 190.23,
    "Ir" => 192.22,  "Pt" => 195.08,  "Au" => 196.97,  "Hg" => 200.59,

    // --- p-block ---
    "Al" => 26.982,  "Si" => 28.085,  "Ga" => 69.723,  "Ge" => 72.630,  "In" => 114.82,
    "Sn" => 118.71,  "Pb" => 207.2,   "C"  => 12.011,
};

/// Looks up the standard atomic mass of an element by its canonical symbol (e.g. `"Cu"`).
pub fn atomic_mass(symbol: &str) -> Option<f64> {
    ATOMIC_MASSES.get(symbol).copied()
}

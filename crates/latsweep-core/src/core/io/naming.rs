use crate::core::lattice::BravaisLattice;
use regex::Regex;

pub const INPUT_EXTENSION: &str = "in";
pub const OUTPUT_EXTENSION: &str = "out";

/// Formats a lattice parameter the way it appears in file names and prefixes.
fn lattice_label(a_angstrom: f64) -> String {
    format!("a{:.3}", a_angstrom)
}

pub fn input_file_name(stem: &str, a_angstrom: f64) -> String {
    format!("{}_{}.{}", stem, lattice_label(a_angstrom), INPUT_EXTENSION)
}

pub fn output_file_name(stem: &str, a_angstrom: f64) -> String {
    format!("{}_{}.{}", stem, lattice_label(a_angstrom), OUTPUT_EXTENSION)
}

/// The `prefix` passed to `pw.x`, which names its scratch files under `outdir`.
pub fn calculation_prefix(stem: &str, lattice: BravaisLattice, a_angstrom: f64) -> String {
    format!("{}_{}_{}", stem, lattice.tag(), lattice_label(a_angstrom))
}

/// Matches output file names produced for a given stem and extracts the lattice parameter.
#[derive(Debug, Clone)]
pub struct OutputNamePattern {
    regex: Regex,
}

impl OutputNamePattern {
    pub fn new(stem: &str) -> Result<Self, regex::Error> {
        let pattern = format!(
            r"^{}_a([\d.]+)\.{}$",
            regex::escape(stem),
            OUTPUT_EXTENSION
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub fn lattice_parameter(&self, file_name: &str) -> Option<f64> {
        self.regex
            .captures(file_name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_use_three_decimals() {
        assert_eq!(input_file_name("cu", 2.2), "cu_a2.200.in");
        assert_eq!(output_file_name("cu", 2.2636363636), "cu_a2.264.out");
    }

    #[test]
    fn prefix_includes_lattice_tag() {
        assert_eq!(
            calculation_prefix("cu", BravaisLattice::SimpleCubic, 2.9),
            "cu_sc_a2.900"
        );
        assert_eq!(
            calculation_prefix("al", BravaisLattice::FaceCenteredCubic, 4.05),
            "al_fcc_a4.050"
        );
    }

    #[test]
    fn pattern_extracts_lattice_parameter_from_output_name() {
        let pattern = OutputNamePattern::new("cu").unwrap();
        assert_eq!(pattern.lattice_parameter("cu_a2.264.out"), Some(2.264));
        assert_eq!(pattern.lattice_parameter("cu_a2.264.in"), None);
        assert_eq!(pattern.lattice_parameter("ag_a2.264.out"), None);
        assert_eq!(pattern.lattice_parameter("cu_a2.2.6.out"), None);
    }

    #[test]
    fn pattern_escapes_regex_metacharacters_in_stem() {
        let pattern = OutputNamePattern::new("cu.v2").unwrap();
        assert_eq!(pattern.lattice_parameter("cu.v2_a3.000.out"), Some(3.0));
        assert_eq!(pattern.lattice_parameter("cuxv2_a3.000.out"), None);
    }
}

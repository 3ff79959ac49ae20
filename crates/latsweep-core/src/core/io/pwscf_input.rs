use super::namelist::{Namelist, NamelistValue, fortran_real};
use crate::core::lattice::BravaisLattice;
use crate::core::units::angstrom_to_bohr;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const CELLDM_DECIMALS: usize = 8;

/// The single atomic species placed at the origin of the cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub symbol: String,
    pub mass: f64,
    pub pseudopotential: String,
}

/// A Monkhorst–Pack grid as written on the `K_POINTS automatic` card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KPointGrid {
    pub mesh: [u32; 3],
    pub shift: [u32; 3],
}

impl Default for KPointGrid {
    fn default() -> Self {
        Self {
            mesh: [12, 12, 12],
            shift: [0, 0, 0],
        }
    }
}

/// Calculation settings shared by every point of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct PwParameters {
    pub lattice: BravaisLattice,
    pub species: Species,
    pub outdir: String,
    pub pseudo_dir: String,
    pub verbosity: String,
    pub ecutwfc: f64,
    pub occupations: String,
    pub smearing: String,
    pub degauss: f64,
    pub input_dft: String,
    pub conv_thr: f64,
    pub mixing_beta: f64,
    pub kpoints: KPointGrid,
}

impl Default for PwParameters {
    fn default() -> Self {
        Self {
            lattice: BravaisLattice::SimpleCubic,
            species: Species {
                symbol: "Cu".to_string(),
                mass: 63.546,
                pseudopotential: "Cu.pw91-n-van_ak.UPF".to_string(),
            },
            outdir: "./tmp".to_string(),
            pseudo_dir: "./pseudo".to_string(),
            verbosity: "high".to_string(),
            ecutwfc: 21.46,
            occupations: "smearing".to_string(),
            smearing: "mv".to_string(),
            degauss: 0.02,
            input_dft: "PW91".to_string(),
            conv_thr: 1e-8,
            mixing_beta: 0.7,
            kpoints: KPointGrid::default(),
        }
    }
}

/// A complete single-point SCF input for `pw.x`.
#[derive(Debug, Clone, PartialEq)]
pub struct PwInput {
    control: Namelist,
    system: Namelist,
    electrons: Namelist,
    species: Species,
    kpoints: KPointGrid,
}

impl PwInput {
    /// Builds the input for one lattice parameter given in Angstrom.
    pub fn new(params: &PwParameters, prefix: &str, a_angstrom: f64) -> Self {
        let control = Namelist::new("CONTROL")
            .set("calculation", "scf")
            .set("prefix", prefix)
            .set("outdir", params.outdir.as_str())
            .set("pseudo_dir", params.pseudo_dir.as_str())
            .set("verbosity", params.verbosity.as_str());

        let mut system = Namelist::new("SYSTEM")
            .set("ibrav", i64::from(params.lattice.ibrav()))
            .set(
                "celldm(1)",
                NamelistValue::Fixed {
                    value: angstrom_to_bohr(a_angstrom),
                    decimals: CELLDM_DECIMALS,
                },
            )
            .set("nat", params.lattice.atoms_per_cell() as i64)
            .set("ntyp", 1i64)
            .set("ecutwfc", params.ecutwfc)
            .set("occupations", params.occupations.as_str());
        if params.occupations == "smearing" {
            system = system
                .set("smearing", params.smearing.as_str())
                .set("degauss", params.degauss);
        }
        system = system.set("input_dft", params.input_dft.as_str());

        let electrons = Namelist::new("ELECTRONS")
            .set("conv_thr", NamelistValue::Double(params.conv_thr))
            .set("mixing_beta", params.mixing_beta);

        Self {
            control,
            system,
            electrons,
            species: params.species.clone(),
            kpoints: params.kpoints,
        }
    }

    pub fn system(&self) -> &Namelist {
        &self.system
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        self.control.write_to(writer)?;
        writeln!(writer)?;
        self.system.write_to(writer)?;
        writeln!(writer)?;
        self.electrons.write_to(writer)?;
        writeln!(writer)?;

        writeln!(writer, "ATOMIC_SPECIES")?;
        writeln!(
            writer,
            "  {}  {}  {}",
            self.species.symbol,
            fortran_real(self.species.mass),
            self.species.pseudopotential
        )?;
        writeln!(writer)?;

        writeln!(writer, "ATOMIC_POSITIONS crystal")?;
        writeln!(writer, "  {}  0.0  0.0  0.0", self.species.symbol)?;
        writeln!(writer)?;

        let [k1, k2, k3] = self.kpoints.mesh;
        let [s1, s2, s3] = self.kpoints.shift;
        writeln!(writer, "K_POINTS automatic")?;
        writeln!(writer, "  {} {} {}  {} {} {}", k1, k2, k3, s1, s2, s3)
    }

    pub fn write_to_path<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush()
    }

    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPECTED_COPPER_INPUT: &str = "\
&CONTROL
  calculation = 'scf'
  prefix = 'cu_sc_a2.200'
  outdir = './tmp'
  pseudo_dir = './pseudo'
  verbosity = 'high'
/

&SYSTEM
  ibrav = 1
  celldm(1) = 4.15739913
  nat = 1
  ntyp = 1
  ecutwfc = 21.46
  occupations = 'smearing'
  smearing = 'mv'
  degauss = 0.02
  input_dft = 'PW91'
/

&ELECTRONS
  conv_thr = 1.0d-8
  mixing_beta = 0.7
/

ATOMIC_SPECIES
  Cu  63.546  Cu.pw91-n-van_ak.UPF

ATOMIC_POSITIONS crystal
  Cu  0.0  0.0  0.0

K_POINTS automatic
  12 12 12  0 0 0
";

    #[test]
    fn default_parameters_render_reference_copper_input() {
        let input = PwInput::new(&PwParameters::default(), "cu_sc_a2.200", 2.2);
        assert_eq!(input.render(), EXPECTED_COPPER_INPUT);
    }

    #[test]
    fn fixed_occupations_omit_smearing_entries() {
        let params = PwParameters {
            occupations: "fixed".to_string(),
            ..PwParameters::default()
        };
        let input = PwInput::new(&params, "si", 5.43);
        assert!(input.system().get("smearing").is_none());
        assert!(input.system().get("degauss").is_none());
        assert_eq!(
            input.system().get("input_dft"),
            Some(&NamelistValue::Str("PW91".to_string()))
        );
    }

    #[test]
    fn lattice_choice_sets_ibrav() {
        let params = PwParameters {
            lattice: BravaisLattice::FaceCenteredCubic,
            ..PwParameters::default()
        };
        let input = PwInput::new(&params, "cu_fcc_a3.610", 3.61);
        assert_eq!(input.system().get("ibrav"), Some(&NamelistValue::Int(2)));
    }

    #[test]
    fn write_to_path_creates_file_with_rendered_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cu_a2.200.in");
        let input = PwInput::new(&PwParameters::default(), "cu_sc_a2.200", 2.2);

        input.write_to_path(&path).unwrap();

        assert_eq!(std::fs::read_to_string(path).unwrap(), EXPECTED_COPPER_INPUT);
    }
}

use latsweep::core::lattice::BravaisLattice;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown lattice '{0}'. Expected 'sc', 'fcc' or 'bcc'.")]
    UnknownLattice(String),

    #[error("Invalid k-point mesh '{0}'. Expected 'N1xN2xN3' with positive integers (e.g. '12x12x12').")]
    InvalidKPointMesh(String),

    #[error("Invalid k-point shift '{0}'. Expected 'S1xS2xS3' with each shift 0 or 1 (e.g. '1x1x1').")]
    InvalidKPointShift(String),

    #[error("Command line for '{0}' is empty.")]
    EmptyCommand(&'static str),
}

/// Accepts short tags (`sc`), kebab-case names (`face-centered-cubic`) and `ibrav` numbers.
pub fn parse_lattice(name: &str) -> Result<BravaisLattice, ParseError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "sc" | "simple-cubic" | "cubic" | "1" => Ok(BravaisLattice::SimpleCubic),
        "fcc" | "face-centered-cubic" | "2" => Ok(BravaisLattice::FaceCenteredCubic),
        "bcc" | "body-centered-cubic" | "3" => Ok(BravaisLattice::BodyCenteredCubic),
        _ => Err(ParseError::UnknownLattice(name.to_string())),
    }
}

pub fn parse_kpoint_mesh(text: &str) -> Result<[u32; 3], ParseError> {
    let invalid = || ParseError::InvalidKPointMesh(text.to_string());
    let parts: Vec<u32> = text
        .split(['x', 'X'])
        .map(|part| part.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [k1, k2, k3] if parts.iter().all(|&k| k > 0) => Ok([*k1, *k2, *k3]),
        _ => Err(invalid()),
    }
}

pub fn parse_kpoint_shift(text: &str) -> Result<[u32; 3], ParseError> {
    let invalid = || ParseError::InvalidKPointShift(text.to_string());
    let parts: Vec<u32> = text
        .split(['x', 'X'])
        .map(|part| part.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        [s1, s2, s3] if parts.iter().all(|&s| s <= 1) => Ok([*s1, *s2, *s3]),
        _ => Err(invalid()),
    }
}

/// Splits a command line such as `mpirun -np 4 pw.x` on whitespace.
pub fn parse_command(text: &str, kind: &'static str) -> Result<Vec<String>, ParseError> {
    let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
    if words.is_empty() {
        return Err(ParseError::EmptyCommand(kind));
    }
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_names_and_aliases_are_recognized() {
        assert_eq!(parse_lattice("sc"), Ok(BravaisLattice::SimpleCubic));
        assert_eq!(parse_lattice("FCC"), Ok(BravaisLattice::FaceCenteredCubic));
        assert_eq!(
            parse_lattice("body-centered-cubic"),
            Ok(BravaisLattice::BodyCenteredCubic)
        );
        assert_eq!(parse_lattice("2"), Ok(BravaisLattice::FaceCenteredCubic));
        assert_eq!(
            parse_lattice("hcp"),
            Err(ParseError::UnknownLattice("hcp".to_string()))
        );
    }

    #[test]
    fn kpoint_mesh_requires_three_positive_integers() {
        assert_eq!(parse_kpoint_mesh("12x12x12"), Ok([12, 12, 12]));
        assert_eq!(parse_kpoint_mesh("8X8x4"), Ok([8, 8, 4]));
        assert!(parse_kpoint_mesh("12x12").is_err());
        assert!(parse_kpoint_mesh("12x0x12").is_err());
        assert!(parse_kpoint_mesh("axbxc").is_err());
    }

    #[test]
    fn kpoint_shift_accepts_only_zero_or_one() {
        assert_eq!(parse_kpoint_shift("0x0x0"), Ok([0, 0, 0]));
        assert_eq!(parse_kpoint_shift("1x0X1"), Ok([1, 0, 1]));
        assert!(parse_kpoint_shift("1x2x1").is_err());
        assert!(parse_kpoint_shift("1x1").is_err());
    }

    #[test]
    fn command_is_split_on_whitespace() {
        assert_eq!(
            parse_command("mpirun -np 4  pw.x", "run command"),
            Ok(vec![
                "mpirun".to_string(),
                "-np".to_string(),
                "4".to_string(),
                "pw.x".to_string()
            ])
        );
        assert_eq!(
            parse_command("   ", "run command"),
            Err(ParseError::EmptyCommand("run command"))
        );
    }
}

use std::fmt;
use std::io::{self, Write};

#[derive(Debug, Clone, PartialEq)]
pub enum NamelistValue {
    Str(String),
    Int(i64),
    Real(f64),
    /// A real written with a fixed number of decimals.
    Fixed { value: f64, decimals: usize },
    /// A real written with a Fortran `d` exponent, e.g. `1.0d-8`.
    Double(f64),
}

impl fmt::Display for NamelistValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamelistValue::Str(s) => write!(f, "'{}'", s),
            NamelistValue::Int(i) => write!(f, "{}", i),
            NamelistValue::Real(r) => f.write_str(&fortran_real(*r)),
            NamelistValue::Fixed { value, decimals } => write!(f, "{:.*}", decimals, value),
            NamelistValue::Double(d) => f.write_str(&fortran_double(*d)),
        }
    }
}

impl From<&str> for NamelistValue {
    fn from(s: &str) -> Self {
        NamelistValue::Str(s.to_string())
    }
}

impl From<String> for NamelistValue {
    fn from(s: String) -> Self {
        NamelistValue::Str(s)
    }
}

impl From<i64> for NamelistValue {
    fn from(i: i64) -> Self {
        NamelistValue::Int(i)
    }
}

impl From<f64> for NamelistValue {
    fn from(r: f64) -> Self {
        NamelistValue::Real(r)
    }
}

/// Shortest decimal representation that still reads as a real (always has a `.`).
pub fn fortran_real(value: f64) -> String {
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}

pub fn fortran_double(value: f64) -> String {
    let text = format!("{:e}", value);
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let mantissa = if mantissa.contains('.') {
                mantissa.to_string()
            } else {
                format!("{}.0", mantissa)
            };
            format!("{}d{}", mantissa, exponent)
        }
        None => text,
    }
}

/// A Fortran namelist group such as `&CONTROL ... /`, preserving key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Namelist {
    name: String,
    entries: Vec<(String, NamelistValue)>,
}

impl Namelist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<NamelistValue>) -> Self {
        self.entries.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&NamelistValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, value)| value)
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        writeln!(writer, "&{}", self.name)?;
        for (key, value) in &self.entries {
            writeln!(writer, "  {} = {}", key, value)?;
        }
        writeln!(writer, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reals_always_carry_a_decimal_point() {
        assert_eq!(fortran_real(21.46), "21.46");
        assert_eq!(fortran_real(0.02), "0.02");
        assert_eq!(fortran_real(1.0), "1.0");
        assert_eq!(fortran_real(-3.0), "-3.0");
    }

    #[test]
    fn doubles_use_d_exponent() {
        assert_eq!(fortran_double(1e-8), "1.0d-8");
        assert_eq!(fortran_double(2.5e-10), "2.5d-10");
        assert_eq!(fortran_double(100.0), "1.0d2");
    }

    #[test]
    fn namelist_renders_entries_in_insertion_order() {
        let namelist = Namelist::new("ELECTRONS")
            .set("conv_thr", NamelistValue::Double(1e-8))
            .set("mixing_beta", 0.7)
            .set("startingwfc", "atomic");

        let mut buffer = Vec::new();
        namelist.write_to(&mut buffer).unwrap();

        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "&ELECTRONS\n  conv_thr = 1.0d-8\n  mixing_beta = 0.7\n  startingwfc = 'atomic'\n/\n"
        );
        assert_eq!(namelist.get("mixing_beta"), Some(&NamelistValue::Real(0.7)));
        assert_eq!(namelist.get("ecutrho"), None);
    }
}

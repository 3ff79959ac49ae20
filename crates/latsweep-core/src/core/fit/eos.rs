use super::polynomial::{FitError, Polynomial};
use crate::core::units::EV_PER_CUBIC_ANGSTROM_TO_GPA;

/// Parameters of the third-order Birch–Murnaghan equation of state.
///
/// Energies are in eV, volumes in Å³ and the bulk modulus in eV/Å³.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirchMurnaghanParams {
    pub e0: f64,
    pub v0: f64,
    pub b0: f64,
    pub b0_prime: f64,
}

impl BirchMurnaghanParams {
    pub fn bulk_modulus_gpa(&self) -> f64 {
        self.b0 * EV_PER_CUBIC_ANGSTROM_TO_GPA
    }
}

pub fn birch_murnaghan_energy(volume: f64, params: &BirchMurnaghanParams) -> f64 {
    let eta = (params.v0 / volume).powf(2.0 / 3.0);
    params.e0
        + (9.0 * params.v0 * params.b0 / 16.0)
            * ((eta - 1.0).powi(2) * (6.0 - 4.0 * eta + params.b0_prime * (eta - 1.0)))
}

/// Fits the third-order Birch–Murnaghan equation of state to energy–volume data.
///
/// With `x = V^(-2/3)` the model is exactly a cubic in `x`, so the fit reduces to a
/// linear least-squares problem. The equilibrium is the stationary point of that cubic
/// with positive curvature; the bulk modulus and its pressure derivative follow from
/// the cubic's derivatives by the chain rule.
///
/// # Errors
///
/// Returns [`FitError::InsufficientPoints`] for fewer than four points and
/// [`FitError::NoMinimum`] when the fitted cubic has no physical minimum.
pub fn fit_birch_murnaghan(
    volumes: &[f64],
    energies: &[f64],
) -> Result<BirchMurnaghanParams, FitError> {
    if let Some(i) = volumes.iter().position(|&v| v <= 0.0 || !v.is_finite()) {
        return Err(FitError::NonFinite(i));
    }
    let xs: Vec<f64> = volumes.iter().map(|v| v.powf(-2.0 / 3.0)).collect();
    let cubic = Polynomial::fit(&xs, energies, 3)?;

    let mean_x = xs.iter().sum::<f64>() / xs.len() as f64;
    let x0 = minimum_of_cubic(&cubic, mean_x)?;

    let c = cubic.coefficients();
    let e_xx = 2.0 * c[2] + 6.0 * c[3] * x0;
    let e_xxx = 6.0 * c[3];

    let v0 = x0.powf(-1.5);
    let x_v = -2.0 / 3.0 * v0.powf(-5.0 / 3.0);
    let x_vv = 10.0 / 9.0 * v0.powf(-8.0 / 3.0);
    let e_vv = e_xx * x_v * x_v;
    let e_vvv = e_xxx * x_v.powi(3) + 3.0 * e_xx * x_v * x_vv;

    Ok(BirchMurnaghanParams {
        e0: cubic.eval(x0),
        v0,
        b0: v0 * e_vv,
        b0_prime: -(1.0 + v0 * e_vvv / e_vv),
    })
}

/// Positive stationary point with positive curvature, nearest to `near` if there are two.
fn minimum_of_cubic(cubic: &Polynomial, near: f64) -> Result<f64, FitError> {
    let c = cubic.coefficients();
    let (a, b, d) = (3.0 * c[3], 2.0 * c[2], c[1]);

    let roots: Vec<f64> = if a.abs() <= f64::EPSILON * (b.abs() + d.abs()) {
        if b == 0.0 {
            Vec::new()
        } else {
            vec![-d / b]
        }
    } else {
        let discriminant = b * b - 4.0 * a * d;
        if discriminant < 0.0 {
            Vec::new()
        } else {
            let sqrt = discriminant.sqrt();
            vec![(-b + sqrt) / (2.0 * a), (-b - sqrt) / (2.0 * a)]
        }
    };

    roots
        .into_iter()
        .filter(|&x| x > 0.0 && 2.0 * c[2] + 6.0 * c[3] * x > 0.0)
        .min_by(|x1, x2| (x1 - near).abs().total_cmp(&(x2 - near).abs()))
        .ok_or_else(|| {
            FitError::NoMinimum("fitted energy-volume curve has no stationary minimum".into())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fit::polynomial::linspace;

    fn copper_like() -> BirchMurnaghanParams {
        BirchMurnaghanParams {
            e0: -1300.0,
            v0: 12.0,
            b0: 0.9,
            b0_prime: 4.8,
        }
    }

    #[test]
    fn energy_at_equilibrium_volume_is_e0() {
        let params = copper_like();
        assert!((birch_murnaghan_energy(params.v0, &params) - params.e0).abs() < 1e-12);
        assert!(birch_murnaghan_energy(10.0, &params) > params.e0);
        assert!(birch_murnaghan_energy(14.0, &params) > params.e0);
    }

    #[test]
    fn fit_recovers_parameters_of_synthetic_curve() {
        let truth = copper_like();
        let volumes = linspace(10.0, 14.0, 9);
        let energies: Vec<f64> = volumes
            .iter()
            .map(|&v| birch_murnaghan_energy(v, &truth))
            .collect();

        let fitted = fit_birch_murnaghan(&volumes, &energies).unwrap();

        assert!((fitted.e0 - truth.e0).abs() < 1e-6);
        assert!((fitted.v0 - truth.v0).abs() < 1e-6);
        assert!((fitted.b0 - truth.b0).abs() < 1e-5);
        assert!((fitted.b0_prime - truth.b0_prime).abs() < 1e-3);
    }

    #[test]
    fn bulk_modulus_converts_to_gpa() {
        let params = copper_like();
        assert!((params.bulk_modulus_gpa() - 0.9 * 160.21766208).abs() < 1e-9);
    }

    #[test]
    fn fit_requires_four_points() {
        let result = fit_birch_murnaghan(&[10.0, 11.0, 12.0], &[-1.0, -2.0, -1.5]);
        assert!(matches!(result, Err(FitError::InsufficientPoints { .. })));
    }

    #[test]
    fn monotonic_data_has_no_minimum() {
        let volumes = linspace(10.0, 14.0, 6);
        let energies: Vec<f64> = volumes.iter().map(|v| -v).collect();
        let result = fit_birch_murnaghan(&volumes, &energies);
        assert!(matches!(result, Err(FitError::NoMinimum(_))));
    }
}

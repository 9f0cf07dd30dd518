use crate::error::{Result, check_positive};

//=====================================================================
// Two-body kinematics for a neutron hitting a target at rest.
// `atomic_weight_ratio` is the target mass in neutron masses.
//=====================================================================

// Lab energy and cosine of an emission tabulated in the centre-of-mass frame
pub fn center_of_mass_to_lab(
    incoming_energy: f64,
    outgoing_energy_cm: f64,
    cosine_cm: f64,
    atomic_weight_ratio: f64,
) -> Result<(f64, f64)> {
    check_positive("atomic weight ratio", atomic_weight_ratio)?;
    let a_plus_one = atomic_weight_ratio + 1.0;
    let energy = outgoing_energy_cm
        + (incoming_energy + 2.0 * cosine_cm * a_plus_one * (incoming_energy * outgoing_energy_cm).sqrt())
            / (a_plus_one * a_plus_one);
    if energy <= 0.0 {
        return Ok((0.0, cosine_cm));
    }
    let cosine = cosine_cm * (outgoing_energy_cm / energy).sqrt() + (incoming_energy / energy).sqrt() / a_plus_one;
    Ok((energy, cosine.clamp(-1.0, 1.0)))
}

// Outgoing lab energy and cosine of an elastic collision
pub fn elastic_lab_kinematics(incoming_energy: f64, cosine_cm: f64, atomic_weight_ratio: f64) -> Result<(f64, f64)> {
    check_positive("atomic weight ratio", atomic_weight_ratio)?;
    let a = atomic_weight_ratio;
    let factor = a * a + 2.0 * a * cosine_cm + 1.0;
    let energy = incoming_energy * factor / ((a + 1.0) * (a + 1.0));
    if factor <= 0.0 {
        // Head-on collision with a neutron-mass target
        return Ok((0.0, 0.0));
    }
    let cosine = (1.0 + a * cosine_cm) / factor.sqrt();
    Ok((energy, cosine.clamp(-1.0, 1.0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn test_elastic_limits() {
        let (energy, cosine) = elastic_lab_kinematics(2.0, 1.0, 11.9).unwrap();
        assert_relative_eq!(energy, 2.0, max_relative = 1e-12);
        assert_relative_eq!(cosine, 1.0, max_relative = 1e-12);

        let alpha = (10.9_f64 / 12.9).powi(2);
        let (energy, cosine) = elastic_lab_kinematics(2.0, -1.0, 11.9).unwrap();
        assert_relative_eq!(energy, 2.0 * alpha, max_relative = 1e-12);
        assert_relative_eq!(cosine, -1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_center_of_mass_conversion_matches_elastic() {
        // Elastic scattering leaves the CM energy at A^2 E / (A + 1)^2
        let a = 11.9;
        let incoming = 3.0;
        let outgoing_cm = incoming * a * a / ((a + 1.0) * (a + 1.0));
        for &cosine_cm in &[-0.8, 0.0, 0.4, 0.95] {
            let converted = center_of_mass_to_lab(incoming, outgoing_cm, cosine_cm, a).unwrap();
            let elastic = elastic_lab_kinematics(incoming, cosine_cm, a).unwrap();
            assert_relative_eq!(converted.0, elastic.0, max_relative = 1e-12);
            assert_relative_eq!(converted.1, elastic.1, max_relative = 1e-10);
        }
    }
}

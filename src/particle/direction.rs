use std::f64::consts::PI;

use crate::utils::RandomNumberStream;

//=====================================================================
// Rotate a unit direction by a polar cosine mu and azimuth phi.
//=====================================================================
pub fn rotate_direction_with_azimuth(direction: [f64; 3], mu: f64, phi: f64) -> [f64; 3] {
    let [ux, uy, uz] = direction;
    let mu = mu.clamp(-1.0, 1.0);
    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();
    let (sin_phi, cos_phi) = phi.sin_cos();

    let rotated = if uz.abs() < 0.999 {
        // General case
        let factor = sin_theta / (1.0 - uz * uz).sqrt();
        [
            mu * ux + factor * (ux * uz * cos_phi - uy * sin_phi),
            mu * uy + factor * (uy * uz * cos_phi + ux * sin_phi),
            mu * uz - factor * (1.0 - uz * uz) * cos_phi,
        ]
    } else {
        // Nearly parallel to z, rotate about x instead
        let factor = sin_theta / (1.0 - ux * ux).sqrt();
        [
            mu * ux - factor * (1.0 - ux * ux) * cos_phi,
            mu * uy + factor * (ux * uy * cos_phi + uz * sin_phi),
            mu * uz + factor * (ux * uz * cos_phi - uy * sin_phi),
        ]
    };

    // Renormalize against accumulated rounding
    let norm = (rotated[0] * rotated[0] + rotated[1] * rotated[1] + rotated[2] * rotated[2]).sqrt();
    [rotated[0] / norm, rotated[1] / norm, rotated[2] / norm]
}

// Rotate by mu with a uniformly sampled azimuth
pub fn rotate_direction<R: RandomNumberStream + ?Sized>(direction: [f64; 3], mu: f64, rng: &mut R) -> [f64; 3] {
    let phi = 2.0 * PI * rng.next_uniform();
    rotate_direction_with_azimuth(direction, mu, phi)
}

pub fn sample_isotropic_direction<R: RandomNumberStream + ?Sized>(rng: &mut R) -> [f64; 3] {
    let mu = 2.0 * rng.next_uniform() - 1.0;
    let phi = 2.0 * PI * rng.next_uniform();
    let sin_theta = (1.0 - mu * mu).max(0.0).sqrt();
    [sin_theta * phi.cos(), sin_theta * phi.sin(), mu]
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::utils::RngStream;

    fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_rotation_preserves_scattering_cosine() {
        let mut rng = RngStream::new(StdRng::seed_from_u64(5));
        let directions = [[0.0, 0.0, 1.0], [0.0, 0.0, -1.0], [0.6, 0.0, 0.8], [0.0, 1.0, 0.0]];
        for direction in directions {
            for &mu in &[-1.0, -0.3, 0.0, 0.5, 0.99, 1.0] {
                let rotated = rotate_direction(direction, mu, &mut rng);
                assert_abs_diff_eq!(dot(rotated, rotated), 1.0, epsilon = 1e-12);
                assert_abs_diff_eq!(dot(rotated, direction), mu, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_isotropic_direction_is_normalized() {
        let mut rng = RngStream::new(StdRng::seed_from_u64(8));
        for _ in 0..100 {
            let direction = sample_isotropic_direction(&mut rng);
            assert_abs_diff_eq!(dot(direction, direction), 1.0, epsilon = 1e-12);
        }
    }
}

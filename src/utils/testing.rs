#![allow(unused)]

//=====================================================================
// Synthetic tables shared by all tests. They are small enough to keep
// inline and are built once, on first use.
//=====================================================================

use lazy_static::lazy_static;

use crate::arrays::{Arrays, JXS_LENGTH, NXS_LENGTH};
use crate::blocks::{ElectronPhotonTableExtractor, NeutronTableExtractor};

// Atomic weight ratio of the synthetic neutron table
pub const TEST_ATOMIC_WEIGHT_RATIO: f64 = 11.9;

lazy_static! {
    pub static ref NEUTRON_TEST_TABLE: NeutronTableExtractor =
        NeutronTableExtractor::new(neutron_test_arrays()).unwrap();
    pub static ref ELECTRON_PHOTON_TEST_TABLE: ElectronPhotonTableExtractor =
        ElectronPhotonTableExtractor::new(electron_photon_test_arrays()).unwrap();
}

fn arrays(name: &str, nxs_values: &[(usize, i64)], jxs_values: &[(usize, i64)], xss: Vec<f64>) -> Arrays {
    let mut nxs = [0i64; NXS_LENGTH];
    nxs[0] = xss.len() as i64;
    for &(index, value) in nxs_values {
        nxs[index] = value;
    }
    let mut jxs = [0i64; JXS_LENGTH];
    for &(index, value) in jxs_values {
        jxs[index] = value;
    }
    Arrays::new(name, &nxs, &jxs, xss).unwrap()
}

//=====================================================================
// Carbon-like neutron table, three energies and three reactions:
// MT 51 (level inelastic, Law 3), MT 18 (fission, Law 9) and MT 102.
// One delayed precursor group with a decay constant of 0.1 1/s.
//=====================================================================
pub fn neutron_test_arrays() -> Arrays {
    let awr = TEST_ATOMIC_WEIGHT_RATIO;
    let mut xss: Vec<f64> = Vec::new();

    // ESZ (1): energies, total, absorption, elastic, heating
    xss.extend([1e-11, 1.0, 20.0]);
    xss.extend([10.0, 6.0, 4.0]);
    xss.extend([2.0, 1.0, 0.5]);
    xss.extend([8.0, 4.2, 2.7]);
    xss.extend([0.1, 0.5, 2.0]);
    // MTR (16), LQR (19), TYR (22), LSIG (25)
    xss.extend([51.0, 18.0, 102.0]);
    xss.extend([-4.5, 180.0, 6.0]);
    xss.extend([-1.0, 19.0, 0.0]);
    xss.extend([1.0, 5.0, 10.0]);
    // SIG (28)
    xss.extend([2.0, 2.0, 0.0, 0.8]);
    xss.extend([1.0, 3.0, 1.5, 0.8, 1.2]);
    xss.extend([1.0, 3.0, 0.5, 0.2, 0.1]);
    // LAND (42): elastic tabulated, MT 51 and MT 18 isotropic
    xss.extend([1.0, 0.0, 0.0]);
    // AND (45): two energies, 32 equiprobable bins then a tabulated distribution
    xss.extend([2.0, 1e-11, 20.0, 6.0, -39.0]);
    xss.extend((0..33).map(|i| -1.0 + 2.0 * i as f64 / 32.0));
    xss.extend([2.0, 2.0, -1.0, 1.0, 0.5, 0.5, 0.0, 1.0]);
    // LDLW (91) and DLW (93)
    xss.extend([1.0, 12.0]);
    xss.extend([0.0, 3.0, 10.0, 0.0, 2.0, 1e-11, 20.0, 1.0, 1.0]);
    xss.extend([(awr + 1.0) / awr * 4.5, (awr / (awr + 1.0)).powi(2)]);
    xss.extend([0.0, 9.0, 21.0, 0.0, 2.0, 1e-11, 20.0, 1.0, 1.0]);
    xss.extend([0.0, 2.0, 1e-11, 20.0, 1.0, 1.4, 0.0]);
    // FIS (120)
    xss.extend([1.0, 3.0, 1.5, 0.8, 1.2]);
    // NU (125): tabulated prompt nu
    xss.extend([2.0, 0.0, 2.0, 1e-11, 20.0, 2.5, 3.5]);
    // DNU (132): constant delayed nu
    xss.extend([1.0, 1.0, 0.015]);
    // BDD (135): decay constant in 1/shake, then the group probability
    xss.extend([1e-9, 0.0, 2.0, 1e-11, 20.0, 1.0, 1.0]);
    // DNEDL (142) and DNED (143)
    xss.extend([1.0]);
    xss.extend([0.0, 9.0, 10.0, 0.0, 2.0, 1e-11, 20.0, 1.0, 1.0]);
    xss.extend([0.0, 2.0, 1e-11, 20.0, 0.4, 0.5, 0.0]);
    assert_eq!(xss.len(), 158);

    arrays(
        "6012.test",
        &[(1, 6012), (2, 3), (3, 3), (4, 2), (7, 1), (9, 6), (10, 12)],
        &[
            (0, 1),    // ESZ
            (1, 125),  // NU
            (2, 16),   // MTR
            (3, 19),   // LQR
            (4, 22),   // TYR
            (5, 25),   // LSIG
            (6, 28),   // SIG
            (7, 42),   // LAND
            (8, 45),   // AND
            (9, 91),   // LDLW
            (10, 93),  // DLW
            (20, 120), // FIS
            (21, 158), // END
            (23, 132), // DNU
            (24, 135), // BDD
            (25, 142), // DNEDL
            (26, 143), // DNED
        ],
        xss,
    )
}

//=====================================================================
// Carbon-like electron-photon table: three photon and three electron
// energies, two Compton shells and two electron subshells (K, L1).
//=====================================================================
pub fn electron_photon_test_arrays() -> Arrays {
    let ln = |values: [f64; 3]| values.map(|value: f64| if value == 0.0 { 0.0 } else { value.ln() });
    let mut xss: Vec<f64> = Vec::new();

    // ESZG (1): ln E, then ln sigma for incoherent, coherent, photoelectric, pair
    xss.extend([1e-3f64.ln(), 0.0, 20.0f64.ln()]);
    xss.extend(ln([0.5, 1.5, 0.4]));
    xss.extend(ln([2.0, 0.1, 0.001]));
    xss.extend(ln([1000.0, 0.01, 0.0001]));
    xss.extend(ln([0.0, 0.0, 0.5]));
    // JINC (16): momentum transfer, scattering function
    xss.extend([0.0, 1.0, 10.0, 0.0, 4.0, 6.0]);
    // JCOH (22): momentum transfer, integrated form factor, form factor
    xss.extend([0.0, 1.0, 10.0, 0.0, 18.0, 20.0, 6.0, 3.0, 0.1]);
    // LHNM (31)
    xss.extend([1e-3, 0.5, 15.0]);
    // LNEPS (34), LBEPS (36), LPIPS (38), LSWD (40)
    xss.extend([2.0, 4.0]);
    xss.extend([2.9e-4, 1.1e-5]);
    xss.extend([1.0 / 3.0, 1.0]);
    xss.extend([0.0, 8.0]);
    // SWD (42): two lin-lin half profiles
    xss.extend([2.0, 2.0, 0.0, 5.0, 0.19, 0.01, 0.5, 1.0]);
    xss.extend([2.0, 2.0, 0.0, 10.0, 0.09, 0.01, 0.5, 1.0]);
    // SUBSH (58), SUBSHEN (60), OCCUP (62)
    xss.extend([1.0, 3.0]);
    xss.extend([2.9e-4, 1.1e-5]);
    xss.extend([2.0, 4.0]);
    // ESZE (64): energy, transport, cutoff elastic, bremsstrahlung,
    // excitation, electroionization, K and L1 electroionization
    xss.extend([1e-5, 1.0, 100.0]);
    xss.extend([1e5, 1e3, 10.0]);
    xss.extend([2e5, 2e4, 1e3]);
    xss.extend([10.0, 5.0, 8.0]);
    xss.extend([1e6, 1e4, 3e3]);
    xss.extend([5e5, 1e4, 2e3]);
    xss.extend([1e3, 1e2, 50.0]);
    xss.extend([4.99e5, 9.9e3, 1.95e3]);
    // EXCIT (88)
    xss.extend([1e-5, 100.0, 5e-6, 2e-5]);
    // ELASI (92) and ELAS (98)
    xss.extend([1e-5, 100.0, 3.0, 3.0, 1.0, 7.0]);
    xss.extend([-1.0, 0.0, 0.999999, 0.0, 0.5, 1.0]);
    xss.extend([-1.0, 0.9, 0.999999, 0.0, 0.1, 1.0]);
    // BREMI (110) and BREME (116)
    xss.extend([1e-5, 100.0, 2.0, 3.0, 1.0, 5.0]);
    xss.extend([1e-7, 1e-5, 0.0, 1.0]);
    xss.extend([1e-7, 1.0, 100.0, 0.0, 0.9, 1.0]);
    // EIONI (126) and EION (140)
    xss.extend([2.0, 1e-3, 100.0, 2.0, 2.0, 1.0, 5.0]);
    xss.extend([2.0, 1e-4, 100.0, 2.0, 2.0, 9.0, 13.0]);
    xss.extend([1e-7, 5e-4, 0.0, 1.0, 1e-7, 50.0, 0.0, 1.0]);
    xss.extend([1e-7, 5e-5, 0.0, 1.0, 1e-7, 50.0, 0.0, 1.0]);
    assert_eq!(xss.len(), 155);

    arrays(
        "6000.test",
        &[(1, 6), (2, 3), (4, 2), (5, 3), (6, 2), (7, 3), (8, 2), (9, 2), (10, 2)],
        &[
            (0, 1),    // ESZG
            (1, 16),   // JINC
            (2, 22),   // JCOH
            (4, 31),   // LHNM
            (5, 34),   // LNEPS
            (6, 36),   // LBEPS
            (7, 38),   // LPIPS
            (8, 40),   // LSWD
            (9, 42),   // SWD
            (10, 58),  // SUBSH
            (11, 60),  // SUBSHEN
            (12, 62),  // OCCUP
            (13, 64),  // ESZE
            (14, 88),  // EXCIT
            (15, 92),  // ELASI
            (16, 98),  // ELAS
            (17, 110), // BREMI
            (18, 116), // BREME
            (19, 126), // EIONI
            (20, 140), // EION
            (31, 155), // END
        ],
        xss,
    )
}

// Native electron data of a one-subshell carbon-like element
pub const NATIVE_TEST_DATA: &str = r#"
name = "6000.native"
atomic_number = 6
energy_grid = [1e-3, 10.0]
cutoff_elastic_cross_section = [1e5, 1e3]
bremsstrahlung_cross_section = [8.0, 6.0]
excitation_cross_section = [1e5, 4e3]
excitation_energies = [1e-3, 10.0]
excitation_energy_loss = [1e-5, 2e-5]

[elastic_angles]
energies = [1e-3, 10.0]
values = [[-1.0, 0.0, 0.999999], [-1.0, 0.9, 0.999999]]
cdfs = [[0.0, 0.5, 1.0], [0.0, 0.1, 1.0]]

[bremsstrahlung_photon_energies]
energies = [1e-3, 10.0]
values = [[1e-7, 1e-3], [1e-7, 10.0]]
cdfs = [[0.0, 1.0], [0.0, 1.0]]

[[subshells]]
designator = 1
binding_energy = 2.9e-4
occupancy = 2.0
cross_section = [1e3, 60.0]

[subshells.knock_on_energies]
energies = [1e-3, 10.0]
values = [[1e-7, 5e-4], [1e-7, 5.0]]
cdfs = [[0.0, 1.0], [0.0, 1.0]]
"#;

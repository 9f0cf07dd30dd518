//=====================================================================
// Physical constants. Energies are in MeV, lengths in cm, cross
// sections in barns, and times in seconds unless noted otherwise.
//=====================================================================

// Electron rest mass energy (MeV)
pub const ELECTRON_REST_MASS_ENERGY: f64 = 0.51099895000;

// Fine structure constant
pub const FINE_STRUCTURE_CONSTANT: f64 = 7.2973525693e-3;

// Classical electron radius (cm)
pub const CLASSICAL_ELECTRON_RADIUS: f64 = 2.8179403262e-13;

// Barns per square centimetre
pub const BARNS_PER_CM2: f64 = 1.0e24;

// Planck constant times the speed of light (MeV cm)
pub const PLANCK_CONSTANT_TIMES_SPEED_OF_LIGHT: f64 = 1.23984198e-10;

// Shakes per second, delayed neutron decay constants in ACE are per shake
pub const SHAKES_PER_SECOND: f64 = 1.0e8;

// Energy above which Koblinger's direct Klein-Nishina sampling is
// valid, (1 + sqrt(3)) m_e c^2 (MeV)
pub const KAHN_SAMPLING_CUTOFF_ENERGY: f64 = 1.3960750940143483;

// Largest cosine covered by tabulated elastic electron distributions
pub const ELASTIC_ANGLE_COSINE_PEAK: f64 = 0.999999;

// Upper bound on retry loops inside a single sample
pub const MAX_SAMPLING_TRIALS: u64 = 1000;

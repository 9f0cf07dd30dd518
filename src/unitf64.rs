// Random numbers handed to the sampling routines must lie in [0.0, 1.0]. The check only runs in
// debug builds, the callers own their random number protocol.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
pub struct UnitF64(pub f64);

impl UnitF64 {
    #[inline(always)]
    pub fn new_unchecked(val: f64) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&val),
            "UnitF64 must be in [0.0, 1.0], got {}",
            val
        );
        UnitF64(val)
    }

    #[inline(always)]
    pub fn value(self) -> f64 {
        self.0
    }
}

use num_enum::{FromPrimitive, IntoPrimitive};

//=====================================================================
// Electron subshells keyed by their ENDF designator.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum Subshell {
    K = 1,
    L1 = 3,
    L2 = 5,
    L3 = 6,
    M1 = 8,
    M2 = 10,
    M3 = 11,
    M4 = 13,
    M5 = 14,
    N1 = 16,
    N2 = 18,
    N3 = 19,
    N4 = 21,
    N5 = 22,
    N6 = 24,
    N7 = 25,
    O1 = 27,
    O2 = 29,
    O3 = 30,
    O4 = 32,
    O5 = 33,
    O6 = 35,
    O7 = 36,
    P1 = 41,
    P2 = 43,
    P3 = 44,
    #[num_enum(catch_all)]
    Unknown(u32),
}

impl Subshell {
    pub fn designator(self) -> u32 {
        self.into()
    }
}

impl std::fmt::Display for Subshell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Subshell::Unknown(designator) => write!(f, "subshell {}", designator),
            known => write!(f, "{:?}", known),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_designators() {
        assert_eq!(Subshell::from(1), Subshell::K);
        assert_eq!(Subshell::from(6), Subshell::L3);
        assert_eq!(Subshell::from(2), Subshell::Unknown(2));
        assert_eq!(Subshell::M1.designator(), 8);
        assert_eq!(Subshell::Unknown(99).designator(), 99);
        assert_eq!(Subshell::L1.to_string(), "L1");
    }
}

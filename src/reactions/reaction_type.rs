use num_enum::{FromPrimitive, IntoPrimitive};
use strum_macros::{Display, EnumIter};

use crate::scattering::Subshell;

//=====================================================================
// Neutron reaction channels keyed by their ENDF MT number.
//
// Discrete inelastic levels (MT 51-90) and any MT without a named
// variant decode to `Other`.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum NuclearReactionType {
    Total = 1,
    Elastic = 2,
    Nonelastic = 3,
    Inelastic = 4,
    Anything = 5,
    N2ND = 11,
    N2N = 16,
    N3N = 17,
    Fission = 18,
    FirstChanceFission = 19,
    SecondChanceFission = 20,
    ThirdChanceFission = 21,
    NNA = 22,
    NNP = 28,
    N2NA = 24,
    N3NA = 25,
    FourthChanceFission = 38,
    N4N = 37,
    InelasticContinuum = 91,
    Disappearance = 101,
    Capture = 102,
    NP = 103,
    ND = 104,
    NT = 105,
    NHe3 = 106,
    NA = 107,
    N2A = 108,
    N2P = 111,
    #[num_enum(catch_all)]
    Other(u32),
}

impl NuclearReactionType {
    pub fn mt(self) -> u32 {
        self.into()
    }

    pub fn is_inelastic_level(self) -> bool {
        matches!(self.mt(), 51..=90)
    }

    // Reactions that can release more than one neutron through fission
    pub fn is_fission(self) -> bool {
        matches!(
            self,
            Self::Fission
                | Self::FirstChanceFission
                | Self::SecondChanceFission
                | Self::ThirdChanceFission
                | Self::FourthChanceFission
        )
    }

    // Redundant sums of other reactions, never sampled directly
    pub fn is_summation(self) -> bool {
        matches!(self, Self::Total | Self::Nonelastic | Self::Inelastic | Self::Disappearance)
    }
}

// Ordered by MT number
impl PartialOrd for NuclearReactionType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NuclearReactionType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.mt().cmp(&other.mt())
    }
}

impl std::fmt::Display for NuclearReactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MT {}", self.mt())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum PhotoatomicReactionType {
    Total,
    Coherent,
    Incoherent,
    Photoelectric,
    PairProduction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElectroatomicReactionType {
    Total,
    CutoffElastic,
    ScreenedRutherfordElastic,
    AnalogElastic,
    HybridElastic,
    MomentPreservingElastic,
    Bremsstrahlung,
    AtomicExcitation,
    // Sum over subshells
    Electroionization,
    SubshellElectroionization(Subshell),
}

impl std::fmt::Display for ElectroatomicReactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubshellElectroionization(subshell) => write!(f, "{} Electroionization", subshell),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
pub enum AdjointElectroatomicReactionType {
    Elastic,
    Bremsstrahlung,
    AtomicExcitation,
}

// Any reaction the collision layer can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReactionType {
    Nuclear(NuclearReactionType),
    Photoatomic(PhotoatomicReactionType),
    Electroatomic(ElectroatomicReactionType),
    AdjointElectroatomic(AdjointElectroatomicReactionType),
}

impl std::fmt::Display for ReactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nuclear(reaction) => write!(f, "neutron {}", reaction),
            Self::Photoatomic(reaction) => write!(f, "photoatomic {}", reaction),
            Self::Electroatomic(reaction) => write!(f, "electroatomic {}", reaction),
            Self::AdjointElectroatomic(reaction) => write!(f, "adjoint electroatomic {}", reaction),
        }
    }
}

impl From<NuclearReactionType> for ReactionType {
    fn from(reaction: NuclearReactionType) -> Self {
        Self::Nuclear(reaction)
    }
}

impl From<PhotoatomicReactionType> for ReactionType {
    fn from(reaction: PhotoatomicReactionType) -> Self {
        Self::Photoatomic(reaction)
    }
}

impl From<ElectroatomicReactionType> for ReactionType {
    fn from(reaction: ElectroatomicReactionType) -> Self {
        Self::Electroatomic(reaction)
    }
}

impl From<AdjointElectroatomicReactionType> for ReactionType {
    fn from(reaction: AdjointElectroatomicReactionType) -> Self {
        Self::AdjointElectroatomic(reaction)
    }
}

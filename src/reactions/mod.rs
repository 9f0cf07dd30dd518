mod cross_section;
mod multiplicity;
mod reaction;
mod reaction_type;

pub use cross_section::CrossSection;
pub use multiplicity::Multiplicity;
pub use reaction::{EmittedParticles, Reaction};
pub use reaction_type::{
    AdjointElectroatomicReactionType, ElectroatomicReactionType, NuclearReactionType, PhotoatomicReactionType,
    ReactionType,
};

//! Chemical vocabulary: reaction strings and template identity.

pub mod smiles;
pub mod template;

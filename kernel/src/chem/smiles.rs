//! Reaction string construction.
//!
//! The planner never parses SMILES. Identifiers arrive canonical from the
//! template store, and the reaction identity is the textual join
//! `"<reactant>.<reactant>>><product>"`.

/// Separator between molecules on one side of a reaction.
pub const MOLECULE_SEPARATOR: char = '.';

/// Separator between the reactant and product sides of a reaction.
pub const REACTION_ARROW: &str = ">>";

/// Join a precursor set into the reactant side of a reaction string.
///
/// Order is preserved: the template store emits precursors in its own
/// canonical order and two sets that differ only by order are distinct
/// reactions as far as the planner is concerned.
#[must_use]
pub fn reactant_smiles<S: AsRef<str>>(reactants: &[S]) -> String {
    let mut out = String::new();
    for (i, r) in reactants.iter().enumerate() {
        if i > 0 {
            out.push(MOLECULE_SEPARATOR);
        }
        out.push_str(r.as_ref());
    }
    out
}

/// Build the canonical reaction string for `reactants >> product`.
#[must_use]
pub fn reaction_smiles<S: AsRef<str>>(reactants: &[S], product: &str) -> String {
    let mut out = reactant_smiles(reactants);
    out.push_str(REACTION_ARROW);
    out.push_str(product);
    out
}

/// Split a reaction string into its reactant and product sides.
///
/// Returns `None` when the string has no `>>` arrow.
#[must_use]
pub fn split_reaction(reaction: &str) -> Option<(&str, &str)> {
    reaction.split_once(REACTION_ARROW)
}

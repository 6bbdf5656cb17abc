//! `MctsTree`: selection, expansion, and backpropagation over the DAG.
//!
//! The tree owns the [`RetroGraph`] for the whole build and borrows its
//! collaborators. One rollout is `select → expand → update`; nothing in a
//! rollout suspends, so the graph needs no locking.
//!
//! Chemical `done` is cached and refreshed whenever a rollout passes through
//! the chemical. Reaction `done` is always computed from the cached flags of
//! its children, because a chemical with several parent reactions is only
//! refreshed along the path that visited it.

use std::collections::HashSet;

use tracing::{debug, trace};

use retro_kernel::chem::smiles;
use retro_kernel::chem::template::TemplateId;
use retro_kernel::contract::{
    AvailabilityOracle, ContractError, PlausibilityFilter, StructureScorer, TemplateStore,
};

use crate::error::SearchError;
use crate::export;
use crate::graph::{NodeLinkGraphV1, RetroGraph};
use crate::node::{ChemicalData, NodeId, NodeKind, ReactionData, TemplateProvenance};
use crate::paths::{self, PathOptions, RouteTree};
use crate::policy::SearchPolicy;
use crate::scorer::{rank_options, reaction_ucb, template_ucb, ScoredOption, SelectionOption};
use crate::terminal::{TerminalCriteria, TerminalEvaluator};

/// External services the tree consults while growing.
#[derive(Clone, Copy)]
pub struct Collaborators<'c> {
    pub templates: &'c dyn TemplateStore,
    pub filter: &'c dyn PlausibilityFilter,
    pub oracle: &'c dyn AvailabilityOracle,
    pub structure: Option<&'c dyn StructureScorer>,
}

impl<'c> Collaborators<'c> {
    /// Collaborators without a structure scorer.
    #[must_use]
    pub fn new(
        templates: &'c dyn TemplateStore,
        filter: &'c dyn PlausibilityFilter,
        oracle: &'c dyn AvailabilityOracle,
    ) -> Self {
        Self {
            templates,
            filter,
            oracle,
            structure: None,
        }
    }

    /// All four roles served by one provider.
    #[must_use]
    pub fn from_provider<P>(provider: &'c P) -> Self
    where
        P: TemplateStore + PlausibilityFilter + AvailabilityOracle + StructureScorer,
    {
        Self {
            templates: provider,
            filter: provider,
            oracle: provider,
            structure: Some(provider),
        }
    }

    #[must_use]
    pub fn with_structure(mut self, structure: &'c dyn StructureScorer) -> Self {
        self.structure = Some(structure);
        self
    }
}

/// Result of one selection walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// Chemicals from the root to the leaf to expand.
    pub chemical_path: Vec<NodeId>,
    /// `reaction_path[i]` links `chemical_path[i]` to `chemical_path[i + 1]`.
    pub reaction_path: Vec<NodeId>,
    /// Template to apply at the leaf.
    pub template: TemplateId,
}

impl Selection {
    /// The chemical to expand.
    #[must_use]
    pub fn leaf(&self) -> Option<NodeId> {
        self.chemical_path.last().copied()
    }
}

/// What happened to one precursor set during expansion.
#[derive(Debug, Clone, PartialEq)]
pub enum CandidateOutcome {
    /// A new reaction node was created.
    Added { reaction: NodeId },
    /// The template joined an existing reaction node.
    Merged { reaction: NodeId },
    /// The plausibility filter scored the reaction below threshold.
    BelowPlausibility { score: f64 },
    /// The reaction string is banned.
    BannedReaction,
    /// A precursor is banned.
    BannedChemical { smiles: String },
    /// Accepting the set would close a cycle through `precursor`.
    Cycle { precursor: String },
    /// The template store returned a set with no precursors.
    EmptyPrecursorSet,
}

impl CandidateOutcome {
    /// Whether the candidate contributed a reaction to the graph.
    #[must_use]
    pub fn accepted(&self) -> bool {
        matches!(self, Self::Added { .. } | Self::Merged { .. })
    }
}

/// Summary of one expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionRecord {
    pub leaf: NodeId,
    pub template: TemplateId,
    /// One entry per precursor set returned by the template store.
    pub outcomes: Vec<CandidateOutcome>,
    /// The template had been applied before; nothing was done.
    pub already_explored: bool,
}

/// Monte Carlo tree over chemicals and reactions.
pub struct MctsTree<'c> {
    collaborators: Collaborators<'c>,
    policy: SearchPolicy,
    evaluator: TerminalEvaluator<'c>,
    graph: RetroGraph,
    target: Option<NodeId>,
    target_meets_criteria: bool,
}

impl std::fmt::Debug for MctsTree<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MctsTree")
            .field("policy", &self.policy)
            .field("evaluator", &self.evaluator)
            .field("nodes", &self.graph.len())
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<'c> MctsTree<'c> {
    /// Build an empty tree.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArgument`] for an invalid policy and
    /// [`SearchError::PreconditionViolation`] if the criteria need a
    /// structure scorer the collaborators do not provide.
    pub fn new(
        collaborators: Collaborators<'c>,
        policy: SearchPolicy,
        criteria: TerminalCriteria,
    ) -> Result<Self, SearchError> {
        policy.validate()?;
        let evaluator = TerminalEvaluator::new(criteria, collaborators.structure)?;
        Ok(Self {
            collaborators,
            policy,
            evaluator,
            graph: RetroGraph::new(),
            target: None,
            target_meets_criteria: false,
        })
    }

    #[must_use]
    pub fn policy(&self) -> &SearchPolicy {
        &self.policy
    }

    #[must_use]
    pub fn graph(&self) -> &RetroGraph {
        &self.graph
    }

    /// Drop every node and forget the target.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.target = None;
        self.target_meets_criteria = false;
    }

    /// Reset the graph and create the root chemical for `target`.
    ///
    /// The root is never terminal, done, or solved after initialization.
    /// Whether the target itself met the terminal criteria is kept for
    /// [`MctsTree::target_meets_criteria`].
    pub fn initialize(&mut self, target: &str) -> NodeId {
        self.clear();
        let root = self.create_chemical_node(target);
        let node = self.graph.node_mut(root);
        node.solved = false;
        node.estimated_value = 0.0;
        if let NodeKind::Chemical(data) = &mut node.kind {
            self.target_meets_criteria = data.terminal;
            data.terminal = false;
            data.done = false;
        }
        self.target = Some(root);
        root
    }

    /// The root chemical.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PreconditionViolation`] before initialization.
    pub fn root(&self) -> Result<NodeId, SearchError> {
        self.target
            .ok_or_else(|| SearchError::precondition("tree has not been initialized with a target"))
    }

    /// SMILES of the target, if initialized.
    #[must_use]
    pub fn target_smiles(&self) -> Option<&str> {
        self.target.map(|t| self.graph.node(t).smiles.as_str())
    }

    /// The target satisfied the terminal criteria when it was created.
    #[must_use]
    pub fn target_meets_criteria(&self) -> bool {
        self.target_meets_criteria
    }

    /// Close the search at the root: terminal, done, and solved.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PreconditionViolation`] before initialization.
    pub fn mark_target_terminal(&mut self) -> Result<(), SearchError> {
        let root = self.root()?;
        let node = self.graph.node_mut(root);
        node.solved = true;
        node.estimated_value = 1.0;
        if let NodeKind::Chemical(data) = &mut node.kind {
            data.terminal = true;
            data.done = true;
        }
        Ok(())
    }

    /// Whether the root is solved. `false` before initialization.
    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.target.is_some_and(|t| self.graph.node(t).solved)
    }

    /// Whether the root is done. `false` before initialization.
    #[must_use]
    pub fn is_root_done(&self) -> bool {
        self.target.is_some_and(|t| self.is_chemical_done(t))
    }

    /// One select → expand → update cycle.
    ///
    /// # Errors
    ///
    /// Propagates [`MctsTree::select`] failures.
    pub fn rollout(&mut self) -> Result<ExpansionRecord, SearchError> {
        let selection = self.select()?;
        let record = self.expand(&selection)?;
        self.update(&selection.chemical_path, &selection.reaction_path);
        Ok(record)
    }

    /// Walk from the root to the next template application.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PreconditionViolation`] before initialization
    /// and [`SearchError::SelectionExhausted`] if backtracking empties the
    /// path.
    pub fn select(&self) -> Result<Selection, SearchError> {
        let root = self.root()?;
        let mut chemical_path = vec![root];
        let mut reaction_path = Vec::new();
        let mut invalid: HashSet<NodeId> = HashSet::new();

        loop {
            let Some(&leaf) = chemical_path.last() else {
                return Err(SearchError::SelectionExhausted);
            };
            let options = self.ucb(leaf, &chemical_path, &invalid);

            let Some(best) = options.first() else {
                trace!(chemical = %self.graph.node(leaf).smiles, "no options, backtracking");
                invalid.insert(leaf);
                chemical_path.pop();
                reaction_path.pop();
                continue;
            };

            match best.option {
                SelectionOption::Template(template) => {
                    trace!(
                        chemical = %self.graph.node(leaf).smiles,
                        %template,
                        score = best.score,
                        depth = reaction_path.len(),
                        "selected template"
                    );
                    return Ok(Selection {
                        chemical_path,
                        reaction_path,
                        template,
                    });
                }
                SelectionOption::Reaction(reaction) => {
                    let precursor = self
                        .graph
                        .successors(reaction)
                        .iter()
                        .copied()
                        .filter(|c| !self.is_chemical_done(*c) && !invalid.contains(c))
                        .min_by_key(|c| self.graph.node(*c).visit_count);
                    match precursor {
                        Some(chemical) => {
                            chemical_path.push(chemical);
                            reaction_path.push(reaction);
                        }
                        None => {
                            invalid.insert(reaction);
                        }
                    }
                }
            }
        }
    }

    /// Scored options at `chemical`, best first.
    ///
    /// Explored reactions are skipped when done, invalid, or when a precursor
    /// already lies on `path`. The most relevant unexplored template is
    /// offered while the branching cap has room; at the root it is also
    /// offered past the cap when nothing else is left.
    #[must_use]
    pub fn ucb(
        &self,
        chemical: NodeId,
        path: &[NodeId],
        invalid: &HashSet<NodeId>,
    ) -> Vec<ScoredOption> {
        let node = self.graph.node(chemical);
        let Some(data) = node.as_chemical() else {
            return Vec::new();
        };
        let product_visits = node.visit_count;
        let weight = self.policy.exploration_weight;
        let mut options = Vec::new();

        for &reaction in self.graph.successors(chemical) {
            if invalid.contains(&reaction)
                || self.is_reaction_done(reaction)
                || self
                    .graph
                    .successors(reaction)
                    .iter()
                    .any(|c| path.contains(c))
            {
                continue;
            }
            let rxn = self.graph.node(reaction);
            let Some(rxn_data) = rxn.as_reaction() else {
                continue;
            };
            let template_probability: f64 = rxn_data
                .templates
                .iter()
                .filter_map(|t| data.relevance(*t))
                .sum();
            options.push(ScoredOption {
                score: reaction_ucb(
                    template_probability,
                    rxn.estimated_value,
                    product_visits,
                    rxn.visit_count,
                    weight,
                ),
                option: SelectionOption::Reaction(reaction),
            });
        }

        let under_cap = self.graph.out_degree(chemical) < self.policy.max_branching;
        let root_fallback = self.target == Some(chemical) && options.is_empty();
        if under_cap || root_fallback {
            if let Some((template, relevance)) = data.next_unexplored() {
                options.push(ScoredOption {
                    score: template_ucb(relevance, product_visits, weight),
                    option: SelectionOption::Template(template),
                });
            }
        }

        rank_options(&mut options);
        options
    }

    /// Apply the selected template at the selection leaf.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PreconditionViolation`] if the selection has no
    /// leaf or the leaf is not a chemical.
    pub fn expand(&mut self, selection: &Selection) -> Result<ExpansionRecord, SearchError> {
        let leaf = selection
            .leaf()
            .ok_or_else(|| SearchError::precondition("selection has an empty chemical path"))?;
        let template = selection.template;
        let Some(data) = self.graph.chemical_mut(leaf) else {
            return Err(SearchError::precondition("expansion leaf is not a chemical"));
        };

        if data.is_explored(template) {
            debug!(%template, "template already explored, skipping expansion");
            return Ok(ExpansionRecord {
                leaf,
                template,
                outcomes: Vec::new(),
                already_explored: true,
            });
        }
        data.explored.push(template);

        let product = self.graph.node(leaf).smiles.clone();
        let precursor_sets = self.collaborators.templates.apply(&product, template);
        let outcomes =
            self.process_precursors(leaf, template, &precursor_sets, &selection.chemical_path);

        debug!(
            chemical = %product,
            %template,
            candidates = precursor_sets.len(),
            accepted = outcomes.iter().filter(|o| o.accepted()).count(),
            "expanded"
        );
        Ok(ExpansionRecord {
            leaf,
            template,
            outcomes,
            already_explored: false,
        })
    }

    /// Filter each precursor set and attach the survivors under `leaf`.
    pub fn process_precursors(
        &mut self,
        leaf: NodeId,
        template: TemplateId,
        precursor_sets: &[Vec<String>],
        path: &[NodeId],
    ) -> Vec<CandidateOutcome> {
        let product = self.graph.node(leaf).smiles.clone();
        let template_score = self
            .graph
            .chemical(leaf)
            .and_then(|c| c.relevance(template))
            .unwrap_or(0.0);

        precursor_sets
            .iter()
            .map(|reactants| {
                let outcome =
                    self.process_candidate(leaf, &product, template, template_score, reactants, path);
                if !outcome.accepted() {
                    debug!(product = %product, ?reactants, ?outcome, "candidate discarded");
                }
                outcome
            })
            .collect()
    }

    fn process_candidate(
        &mut self,
        leaf: NodeId,
        product: &str,
        template: TemplateId,
        template_score: f64,
        reactants: &[String],
        path: &[NodeId],
    ) -> CandidateOutcome {
        if reactants.is_empty() {
            return CandidateOutcome::EmptyPrecursorSet;
        }
        let reactant_smiles = smiles::reactant_smiles(reactants);
        let reaction = smiles::reaction_smiles(reactants, product);

        let ff_score = self.collaborators.filter.score(&reactant_smiles, product);
        if ff_score.is_nan() || ff_score < self.policy.fast_filter_threshold {
            return CandidateOutcome::BelowPlausibility { score: ff_score };
        }
        if self.policy.banned_reactions.contains(&reaction) {
            return CandidateOutcome::BannedReaction;
        }
        if let Some(banned) = reactants
            .iter()
            .find(|r| self.policy.banned_chemicals.contains(*r))
        {
            return CandidateOutcome::BannedChemical {
                smiles: banned.clone(),
            };
        }

        // Checked for every existing precursor before any node is created,
        // so an abandoned set leaves nothing behind.
        for reactant in reactants {
            if let Some(existing) = self.graph.get(reactant) {
                if path.contains(&existing) || self.graph.has_path(existing, leaf) {
                    return CandidateOutcome::Cycle {
                        precursor: reactant.clone(),
                    };
                }
            }
        }

        let children: Vec<NodeId> = reactants
            .iter()
            .map(|r| match self.graph.get(r) {
                Some(id) => id,
                None => self.create_chemical_node(r),
            })
            .collect();

        let (reaction_id, merged) = match self.graph.get(&reaction) {
            Some(existing) => {
                if let Some(data) = self.graph.reaction_mut(existing) {
                    if !data.templates.contains(&template) {
                        data.templates.push(template);
                    }
                    data.template_score = data.template_score.max(template_score);
                }
                (existing, true)
            }
            None => (
                self.create_reaction_node(reaction, template, template_score, ff_score),
                false,
            ),
        };

        self.graph.add_edge(leaf, reaction_id);
        for child in children {
            self.graph.add_edge(reaction_id, child);
        }
        self.update_value(reaction_id);

        if merged {
            CandidateOutcome::Merged {
                reaction: reaction_id,
            }
        } else {
            CandidateOutcome::Added {
                reaction: reaction_id,
            }
        }
    }

    /// Create a chemical node, consulting every collaborator once.
    pub fn create_chemical_node(&mut self, smiles: &str) -> NodeId {
        let templates = self.collaborators.templates.predict(
            smiles,
            self.policy.template_max_count,
            self.policy.template_max_cum_prob,
        );
        let purchase_price = self
            .collaborators
            .oracle
            .price(smiles, &self.policy.buyables_source);
        let history = self
            .collaborators
            .oracle
            .history(smiles, &self.policy.template_set);
        let terminal = self.evaluator.is_terminal(smiles, purchase_price, &history);

        let data = ChemicalData {
            templates,
            explored: Vec::new(),
            purchase_price,
            history,
            terminal,
            done: false,
            min_depth: None,
        };
        let estimated_value = if terminal { 1.0 } else { 0.0 };
        let id = self.graph.insert(
            smiles.to_string(),
            NodeKind::Chemical(data),
            estimated_value,
            terminal,
        );
        self.refresh_chemical_done(id);
        trace!(chemical = smiles, terminal, ?purchase_price, "created chemical");
        id
    }

    /// Create a reaction node with a single contributing template.
    pub fn create_reaction_node(
        &mut self,
        smiles: String,
        template: TemplateId,
        template_score: f64,
        ff_score: f64,
    ) -> NodeId {
        let data = ReactionData {
            templates: vec![template],
            ff_score,
            template_score,
            provenance: None,
        };
        self.graph
            .insert(smiles, NodeKind::Reaction(data), 0.0, false)
    }

    /// Backpropagate a rollout along its path, leaf to root.
    pub fn update(&mut self, chemical_path: &[NodeId], reaction_path: &[NodeId]) {
        for (depth, &chemical) in chemical_path.iter().enumerate().rev() {
            self.graph.node_mut(chemical).visit_count += 1;
            if let Some(data) = self.graph.chemical_mut(chemical) {
                data.min_depth = Some(data.min_depth.map_or(depth, |d| d.min(depth)));
            }
            let was_done = self.is_chemical_done(chemical);
            if self.refresh_chemical_done(chemical) && !was_done {
                self.propagate_done(chemical);
            }

            let parent_reaction = depth
                .checked_sub(1)
                .and_then(|i| reaction_path.get(i))
                .copied();
            if let Some(reaction) = parent_reaction {
                self.graph.node_mut(reaction).visit_count += 1;
                self.update_value(reaction);
            }
        }
    }

    /// Fold the children's values into `reaction` and its parent chemical.
    ///
    /// Values accumulate. A reaction whose children are all solved becomes
    /// solved and the change is pushed up the DAG.
    pub fn update_value(&mut self, reaction: NodeId) {
        let children = self.graph.successors(reaction);
        let delta: f64 = children
            .iter()
            .map(|c| self.graph.node(*c).estimated_value)
            .sum();
        let children_solved =
            !children.is_empty() && children.iter().all(|c| self.graph.node(*c).solved);
        let Some(&parent) = self.graph.predecessors(reaction).first() else {
            return;
        };

        let node = self.graph.node_mut(reaction);
        node.estimated_value += delta;
        node.solved |= children_solved;
        let solved = node.solved;
        self.graph.node_mut(parent).estimated_value += delta;

        if solved {
            self.propagate_solved(parent);
        }
    }

    /// Mark `chemical` solved and close every ancestor reaction whose
    /// children are now all solved.
    pub fn propagate_solved(&mut self, chemical: NodeId) {
        let mut stack = vec![chemical];
        while let Some(current) = stack.pop() {
            let node = self.graph.node_mut(current);
            if node.solved {
                continue;
            }
            node.solved = true;
            if Some(current) == self.target {
                debug!("target solved");
            }
            let parents = self.graph.predecessors(current).to_vec();
            for reaction in parents {
                let closes = !self.graph.node(reaction).solved
                    && self
                        .graph
                        .successors(reaction)
                        .iter()
                        .all(|c| self.graph.node(*c).solved);
                if closes {
                    self.graph.node_mut(reaction).solved = true;
                    stack.extend(self.graph.predecessors(reaction).iter().copied());
                }
            }
        }
    }

    /// Refresh the parents of a chemical that just became done.
    ///
    /// A chemical shared by several reactions is otherwise only refreshed
    /// along the path that visits it, which can leave an ancestor open with
    /// nothing left to select.
    pub fn propagate_done(&mut self, chemical: NodeId) {
        let mut stack = vec![chemical];
        while let Some(current) = stack.pop() {
            let parents: Vec<NodeId> = self
                .graph
                .predecessors(current)
                .iter()
                .filter_map(|r| self.graph.predecessors(*r).first().copied())
                .collect();
            for parent in parents {
                if !self.is_chemical_done(parent) && self.refresh_chemical_done(parent) {
                    stack.push(parent);
                }
            }
        }
    }

    /// Recompute and cache the done flag of `chemical`.
    pub fn refresh_chemical_done(&mut self, chemical: NodeId) -> bool {
        let done = self.evaluate_chemical_done(chemical);
        if let Some(data) = self.graph.chemical_mut(chemical) {
            data.done = done;
        }
        done
    }

    fn evaluate_chemical_done(&self, chemical: NodeId) -> bool {
        let Some(data) = self.graph.chemical(chemical) else {
            return false;
        };
        if data.terminal || data.templates.is_empty() {
            return true;
        }
        if data.min_depth.is_some_and(|d| d >= self.policy.max_depth) {
            return true;
        }
        if self.graph.out_degree(chemical) >= self.policy.max_branching || data.fully_explored() {
            return self
                .graph
                .successors(chemical)
                .iter()
                .all(|r| self.is_reaction_done(*r));
        }
        false
    }

    /// Cached done flag of a chemical.
    #[must_use]
    pub fn is_chemical_done(&self, chemical: NodeId) -> bool {
        self.graph.chemical(chemical).is_some_and(|c| c.done)
    }

    /// A reaction is done once it has children and all of them are done.
    #[must_use]
    pub fn is_reaction_done(&self, reaction: NodeId) -> bool {
        let children = self.graph.successors(reaction);
        !children.is_empty() && children.iter().all(|c| self.is_chemical_done(*c))
    }

    /// Resolve template provenance for every reaction node.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PreconditionViolation`] if the template store
    /// has not loaded its templates, and [`SearchError::Contract`] for an
    /// unknown template id.
    pub fn retrieve_template_data(&mut self) -> Result<(), SearchError> {
        let reactions: Vec<NodeId> = self
            .graph
            .nodes()
            .filter(|n| !n.is_chemical())
            .map(|n| n.id)
            .collect();

        for reaction in reactions {
            let Some(data) = self.graph.reaction(reaction) else {
                continue;
            };
            let records = data
                .templates
                .iter()
                .map(|t| self.collaborators.templates.lookup(*t))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| match e {
                    ContractError::TemplatesNotLoaded => SearchError::precondition(e.to_string()),
                    other @ ContractError::UnknownTemplate { .. } => SearchError::Contract(other),
                })?;
            let provenance = TemplateProvenance {
                tforms: records.iter().map(|r| r.provenance_id.clone()).collect(),
                num_examples: records.iter().map(|r| r.count).sum(),
                necessary_reagent: records
                    .first()
                    .map(|r| r.necessary_reagent.clone())
                    .unwrap_or_default(),
            };
            if let Some(data) = self.graph.reaction_mut(reaction) {
                data.provenance = Some(provenance);
            }
        }
        Ok(())
    }

    /// The whole DAG as a node-link document.
    #[must_use]
    pub fn dump_tree(&self) -> NodeLinkGraphV1 {
        self.graph.to_node_link(self.target_smiles())
    }

    /// Replace the graph with a previously dumped document.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedTree`] if the document is inconsistent
    /// or names a target that is not among its nodes.
    pub fn load_tree(&mut self, doc: NodeLinkGraphV1) -> Result<(), SearchError> {
        let target = doc.graph.target.clone();
        let graph = RetroGraph::from_node_link(doc)?;
        let root = match target {
            Some(smiles) => Some(graph.get(&smiles).ok_or_else(|| SearchError::MalformedTree {
                detail: format!("target {smiles} is not a node"),
            })?),
            None => None,
        };
        self.target_meets_criteria = root.is_some_and(|r| graph.node(r).is_terminal());
        self.graph = graph;
        self.target = root;
        Ok(())
    }

    /// Enumerate, validate, and rank routes without serializing them.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PreconditionViolation`] before initialization.
    pub fn routes(&self, options: &PathOptions) -> Result<Vec<RouteTree>, SearchError> {
        let root = self.root()?;
        let max_depth = options.max_depth.unwrap_or(self.policy.max_depth);
        let max_trees = options.max_trees.or(self.policy.max_trees);
        Ok(paths::extract_routes(
            &self.graph,
            root,
            max_depth,
            max_trees,
            options.validate_paths,
            options.sorting_metric,
        ))
    }

    /// Resolve template data, then extract and serialize ranked routes.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::PreconditionViolation`] before initialization
    /// or before templates are loaded.
    pub fn enumerate_paths(
        &mut self,
        options: &PathOptions,
    ) -> Result<Vec<serde_json::Value>, SearchError> {
        self.root()?;
        self.retrieve_template_data()?;
        let routes = self.routes(options)?;
        debug!(routes = routes.len(), metric = ?options.sorting_metric, "extracted routes");
        routes
            .iter()
            .map(|route| export::route_to_json(&self.graph, route, options.path_format))
            .collect()
    }
}

//! The prediction tree: hypothetical continuations of the real match.
//!
//! Nodes live in a generational arena owned by [`PredictionTree`]. A
//! [`NodeId`] whose node was dropped goes stale: looking it up fails
//! instead of yielding whatever now occupies the slot.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::evaluate::{Capability, CategoryWeights, Evaluate, Subject};
use crate::{
    AnalyzerConfig, Board, BoundingBox, Categorize, CategorizedMove, CompositeCategorizer, Error,
    Hypothetical, Move, MoveLookup, MoveType, MoveTypes, Player, Position, Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    /// Predicted next moves, in row-major order.
    Interior(Vec<NodeId>),
    /// No predictions below this node.
    Frontier,
}

#[derive(Clone, Debug)]
pub struct Node {
    /// `None` only for a root that doesn't know the last real move.
    mv: Option<Move>,
    categories: MoveTypes,
    height: usize,
    /// The node of the move before this one. `None` for the root.
    previous: Option<NodeId>,
    role: Role,
}

impl Node {
    fn new(mv: Option<Move>, categories: MoveTypes, previous: Option<NodeId>) -> Self {
        Self {
            mv,
            categories,
            height: 0,
            previous,
            role: Role::Frontier,
        }
    }

    fn children(&self) -> &[NodeId] {
        match &self.role {
            Role::Interior(children) => children,
            Role::Frontier => &[],
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

#[derive(Debug, Default)]
struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Arena {
    fn insert(&mut self, node: Node) -> NodeId {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    fn remove(&mut self, id: NodeId) -> Option<Node> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(node)
    }

    fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.len = 0;
    }
}

/// How the tree decides which moves to predict and how far ahead.
pub struct GrowthPolicy {
    /// Plies below the root.
    depth: usize,
    /// Number of predictions kept per node below the root.
    branching: usize,
    ranking: CategoryWeights,
    categorizer: CompositeCategorizer,
}

impl GrowthPolicy {
    pub fn new(board: &Board, config: &AnalyzerConfig) -> Result<Self> {
        if config.depth == 0 {
            return Err(Error::InvalidConfiguration(
                "the prediction depth must be at least 1".to_string(),
            ));
        }
        if config.branching == 0 {
            return Err(Error::InvalidConfiguration(
                "the branching factor must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            depth: config.depth,
            branching: config.branching,
            ranking: CategoryWeights::new(&config.weights),
            categorizer: CompositeCategorizer::standard(board)?,
        })
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn branching(&self) -> usize {
        self.branching
    }

    /// The moves `mover` might play next, in row-major order.
    ///
    /// These are the tactical cells, or the centre on an empty board, or
    /// every free cell if nothing is tactical. With a `limit`, only that
    /// many of the highest-scoring candidates are kept; ties go to the
    /// earlier cell.
    pub fn candidates(
        &self,
        lookup: &dyn MoveLookup,
        mover: Player,
        limit: Option<usize>,
    ) -> Vec<CategorizedMove> {
        let board = lookup.board();
        let categorize =
            |position| self.categorizer.categorize_move(Move::at(position, mover), lookup);
        if lookup.is_empty() {
            let center = categorize(board.center());
            return vec![center];
        }

        // Tactical cells are within K−1 of some move
        let nearby = BoundingBox::from_positions(lookup.moves().map(|mv| mv.position()))
            .and_then(|bbox| {
                let reach = (board.win_length() - 1).min(board.span());
                bbox.expand(reach).intersect(board.area())
            });
        let mut found: Vec<CategorizedMove> = nearby
            .into_iter()
            .flat_map(|bbox| bbox.positions())
            .map(categorize)
            .filter(|candidate| candidate.is(MoveType::Tactical))
            .collect();
        if found.is_empty() {
            found = board
                .positions()
                .map(categorize)
                .filter(|candidate| candidate.is(MoveType::Possible))
                .collect();
        }

        match limit {
            Some(limit) if found.len() > limit => {
                let mut ranked: Vec<(CategorizedMove, f64)> = found
                    .into_iter()
                    .map(|candidate| {
                        let score = self.ranking.evaluate(&candidate);
                        (candidate, score)
                    })
                    .collect();
                ranked.sort_by(|(_, a), (_, b)| b.total_cmp(a));
                let mut kept: Vec<CategorizedMove> = ranked
                    .into_iter()
                    .take(limit)
                    .map(|(candidate, _)| candidate)
                    .collect();
                kept.sort_by_key(|candidate| candidate.mv.position());
                kept
            }
            _ => found,
        }
    }
}

/// Hypothetical continuations of a match, rooted at its current state.
pub struct PredictionTree {
    arena: Arena,
    root: NodeId,
    to_move: Player,
    policy: GrowthPolicy,
}

impl PredictionTree {
    /// Builds the tree for the board in `base`, with `to_move` to play next.
    pub fn new(base: &dyn MoveLookup, to_move: Player, policy: GrowthPolicy) -> Self {
        let mut arena = Arena::default();
        let root = arena.insert(Node::new(None, MoveTypes::new(), None));
        let mut tree = Self {
            arena,
            root,
            to_move,
            policy,
        };
        tree.rebuild(base, to_move, None);
        tree
    }

    pub fn root(&self) -> NodeRef<'_> {
        // The root is never removed without being replaced
        self.get(self.root)
            .unwrap_or_else(|| unreachable!("the root of a prediction tree is always present"))
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.arena.get(id).map(|node| NodeRef {
            tree: self,
            id,
            node,
        })
    }

    /// The player whose move the root's predictions are.
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    pub fn policy(&self) -> &GrowthPolicy {
        &self.policy
    }

    /// Number of nodes, root included.
    pub fn num_nodes(&self) -> usize {
        self.arena.len
    }

    /// Advances the tree by a move that was actually played.
    ///
    /// `base` must be the board after `played`. If `played` was predicted,
    /// its subtree becomes the new tree and is extended to the full depth;
    /// everything else is dropped. Otherwise the tree is rebuilt.
    pub fn grow(&mut self, base: &dyn MoveLookup, played: Move) {
        let next = played.player.opponent();
        let Some(child) = self
            .root()
            .predictions()
            .find(|child| child.mv() == Some(played))
            .map(|child| child.id())
        else {
            debug!(%played, "Move was not predicted, rebuilding");
            self.rebuild(base, next, Some(played));
            return;
        };

        let old_root = self.root;
        let siblings: Vec<NodeId> = self
            .root()
            .node
            .children()
            .iter()
            .copied()
            .filter(|&id| id != child)
            .collect();
        for sibling in siblings {
            self.remove_subtree(sibling);
        }
        self.arena.remove(old_root);
        self.root = child;
        self.to_move = next;
        if let Some(root) = self.arena.get_mut(child) {
            root.previous = None;
            if root.role == Role::Frontier {
                root.role = Role::Interior(Vec::new());
            }
        }

        self.widen_root(base);
        self.extend(base, self.root, &mut Vec::new(), 0);
        self.refresh_height(self.root);
        debug!(%played, nodes = self.num_nodes(), height = self.root().height(), "Grew prediction tree");
    }

    /// Drops the subtree of a node and unlinks it from its parent.
    ///
    /// Returns false if `id` is the root or no longer in the tree.
    pub fn prune(&mut self, id: NodeId) -> bool {
        if id == self.root {
            return false;
        }
        let Some(parent) = self.arena.get(id).and_then(|node| node.previous) else {
            return false;
        };
        self.remove_subtree(id);

        let parent_is_root = parent == self.root;
        if let Some(node) = self.arena.get_mut(parent) {
            let emptied = match &mut node.role {
                Role::Interior(children) => {
                    children.retain(|&child| child != id);
                    children.is_empty()
                }
                Role::Frontier => false,
            };
            if emptied && !parent_is_root {
                node.role = Role::Frontier;
            }
        }

        let mut ancestor = Some(parent);
        while let Some(id) = ancestor {
            let height = self.height_from_children(id);
            let Some(node) = self.arena.get_mut(id) else {
                break;
            };
            node.height = height;
            ancestor = node.previous;
        }
        trace!(?id, nodes = self.num_nodes(), "Pruned");
        true
    }

    /// Rebuilds the tree from scratch for the board in `base`.
    pub fn cuttings(&mut self, base: &dyn MoveLookup, to_move: Player) {
        self.rebuild(base, to_move, None);
    }

    fn rebuild(&mut self, base: &dyn MoveLookup, to_move: Player, last: Option<Move>) {
        self.arena.clear();
        self.root = self.arena.insert(Node::new(last, MoveTypes::new(), None));
        self.to_move = to_move;
        self.populate(base, self.root, &mut Vec::new(), 0);
        self.refresh_height(self.root);
        debug!(nodes = self.num_nodes(), height = self.root().height(), "Built prediction tree");
    }

    /// The player placing the children of `id`.
    fn mover(&self, id: NodeId, node: &Node) -> Player {
        match node.mv {
            Some(mv) if id != self.root => mv.player.opponent(),
            _ => self.to_move,
        }
    }

    fn is_terminal(&self, id: NodeId, node: &Node) -> bool {
        id != self.root && node.categories.contains(MoveType::Winning)
    }

    fn insert_children(&mut self, parent: NodeId, candidates: Vec<CategorizedMove>) -> Vec<NodeId> {
        candidates
            .into_iter()
            .map(|candidate| {
                self.arena.insert(Node::new(
                    Some(candidate.mv),
                    candidate.categories,
                    Some(parent),
                ))
            })
            .collect()
    }

    /// Gives a childless node its predictions, down to the full depth.
    ///
    /// `path` holds the hypothetical moves from below the root down to `id`.
    fn populate(&mut self, base: &dyn MoveLookup, id: NodeId, path: &mut Vec<Move>, depth: usize) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        let is_root = id == self.root;
        if !is_root && (depth >= self.policy.depth || self.is_terminal(id, node)) {
            return;
        }
        let mover = self.mover(id, node);
        let limit = (!is_root).then_some(self.policy.branching);
        let candidates = self
            .policy
            .candidates(&Hypothetical::new(base, path), mover, limit);
        if candidates.is_empty() && !is_root {
            return;
        }

        let children = self.insert_children(id, candidates);
        if let Some(node) = self.arena.get_mut(id) {
            node.role = Role::Interior(children.clone());
        }
        for child in children {
            if let Some(mv) = self.arena.get(child).and_then(|node| node.mv) {
                path.push(mv);
                self.populate(base, child, path, depth + 1);
                path.pop();
            }
        }
    }

    /// Makes every candidate of the root a prediction, keeping the
    /// subtrees of the predictions it already has.
    fn widen_root(&mut self, base: &dyn MoveLookup) {
        let mut existing: HashMap<Position, NodeId> = self
            .root()
            .predictions()
            .filter_map(|child| Some((child.mv()?.position(), child.id())))
            .collect();
        let candidates = self.policy.candidates(base, self.to_move, None);
        let mut children = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let id = match existing.remove(&candidate.mv.position()) {
                Some(id) => id,
                None => self.arena.insert(Node::new(
                    Some(candidate.mv),
                    candidate.categories,
                    Some(self.root),
                )),
            };
            children.push(id);
        }
        for (_, stale) in existing {
            self.remove_subtree(stale);
        }
        let root = self.root;
        if let Some(node) = self.arena.get_mut(root) {
            node.role = Role::Interior(children);
        }
    }

    /// Populates every frontier above the full depth.
    fn extend(&mut self, base: &dyn MoveLookup, id: NodeId, path: &mut Vec<Move>, depth: usize) {
        let Some(node) = self.arena.get(id) else {
            return;
        };
        match &node.role {
            Role::Frontier => self.populate(base, id, path, depth),
            Role::Interior(children) => {
                for child in children.clone() {
                    if let Some(mv) = self.arena.get(child).and_then(|node| node.mv) {
                        path.push(mv);
                        self.extend(base, child, path, depth + 1);
                        path.pop();
                    }
                }
            }
        }
    }

    fn remove_subtree(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.arena.remove(id) {
                stack.extend_from_slice(node.children());
            }
        }
    }

    fn height_from_children(&self, id: NodeId) -> usize {
        let Some(node) = self.arena.get(id) else {
            return 0;
        };
        match &node.role {
            Role::Frontier => 0,
            Role::Interior(children) => children
                .iter()
                .filter_map(|&child| self.arena.get(child))
                .map(|child| child.height + 1)
                .max()
                .unwrap_or(0),
        }
    }

    fn refresh_height(&mut self, id: NodeId) -> usize {
        let children = match self.arena.get(id) {
            Some(node) => node.children().to_vec(),
            None => return 0,
        };
        for child in children {
            self.refresh_height(child);
        }
        let height = self.height_from_children(id);
        if let Some(node) = self.arena.get_mut(id) {
            node.height = height;
        }
        height
    }
}

/// A borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t PredictionTree,
    id: NodeId,
    node: &'t Node,
}

impl<'t> NodeRef<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn mv(&self) -> Option<Move> {
        self.node.mv
    }

    pub fn categories(&self) -> MoveTypes {
        self.node.categories
    }

    pub fn height(&self) -> usize {
        self.node.height
    }

    pub fn role(&self) -> &'t Role {
        &self.node.role
    }

    pub fn is_frontier(&self) -> bool {
        self.node.role == Role::Frontier
    }

    pub fn is_root(&self) -> bool {
        self.node.previous.is_none()
    }

    /// The node of the previous move, if it is still in the tree.
    pub fn previous(&self) -> Option<NodeRef<'t>> {
        self.tree.get(self.node.previous?)
    }

    pub fn predictions(&self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        let node: &'t Node = self.node;
        node.children()
            .iter()
            .filter_map(move |&child| tree.get(child))
    }
}

impl std::fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("node", self.node)
            .finish()
    }
}

impl Subject for NodeRef<'_> {
    fn played(&self) -> Option<Move> {
        self.node.mv
    }

    fn categories(&self) -> Option<MoveTypes> {
        Some(self.node.categories)
    }

    fn predictions(&self) -> Vec<Box<dyn Subject + '_>> {
        NodeRef::predictions(self)
            .map(|child| Box::new(child) as Box<dyn Subject + '_>)
            .collect()
    }

    fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Categorized => true,
            Capability::Predicted => matches!(self.node.role, Role::Interior(_)),
        }
    }
}

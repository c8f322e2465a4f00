//! Stacked pull-request detection
//!
//! Builds a dependency forest for one repository's open PRs: a PR whose base
//! branch is another open PR's head branch is "stacked" on it, and is
//! blocked until that parent merges. Nodes live in an arena and reference
//! each other by index, so the child -> parent back reference stays
//! non-owning while each parent owns its ordered child list.

use crate::types::{PrState, PullRequest};
use std::collections::{HashMap, HashSet};

/// Index of a node within its [`Stack`] arena
pub type NodeId = usize;

/// One pull request in a dependency forest
#[derive(Debug, Clone)]
pub struct StackNode {
    /// The wrapped pull request
    pub pr: PullRequest,
    /// Parent node, when this PR's base branch is another PR's head branch
    pub parent: Option<NodeId>,
    /// Child nodes, ascending by PR number
    pub children: Vec<NodeId>,
    /// Distance from the forest root (roots are 0)
    pub depth: usize,
    /// Whether the declared parent branch is gone (set by categorization,
    /// not by detection)
    pub is_orphan: bool,
}

impl StackNode {
    fn new(pr: PullRequest) -> Self {
        Self {
            pr,
            parent: None,
            children: Vec::new(),
            depth: 0,
            is_orphan: false,
        }
    }

    /// Whether this node participates in a stack (has a parent or children)
    #[must_use]
    pub fn is_stacked(&self) -> bool {
        self.parent.is_some() || !self.children.is_empty()
    }
}

/// The dependency forest for one repository's open PRs
///
/// Built fresh on every scan; never persisted or incrementally updated.
#[derive(Debug, Clone, Default)]
pub struct Stack {
    nodes: Vec<StackNode>,
    roots: Vec<NodeId>,
    all: Vec<NodeId>,
}

impl Stack {
    /// Root node ids, ascending by PR number
    #[must_use]
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Every node id, ascending by PR number
    #[must_use]
    pub fn all(&self) -> &[NodeId] {
        &self.all
    }

    /// The node at `id`
    #[must_use]
    pub fn node(&self, id: NodeId) -> &StackNode {
        &self.nodes[id]
    }

    /// Number of PRs in the forest
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of nodes that participate in a stack, ascending by PR number
    #[must_use]
    pub fn stacked_nodes(&self) -> Vec<NodeId> {
        self.all
            .iter()
            .copied()
            .filter(|&id| self.nodes[id].is_stacked())
            .collect()
    }

    /// Walk the parent chain from the PR with the given number to its root
    ///
    /// Returns `None` when no PR with that number is in the forest.
    #[must_use]
    pub fn root_for(&self, number: u64) -> Option<NodeId> {
        let mut current = self
            .all
            .iter()
            .copied()
            .find(|&id| self.nodes[id].pr.number == number)?;
        while let Some(parent) = self.nodes[current].parent {
            current = parent;
        }
        Some(current)
    }

    /// Whether the node is blocked: it has a parent whose PR is not merged
    #[must_use]
    pub fn is_blocked(&self, id: NodeId) -> bool {
        self.nodes[id]
            .parent
            .is_some_and(|parent| self.nodes[parent].pr.state != PrState::Merged)
    }

    /// Count of blocked nodes in the forest
    #[must_use]
    pub fn count_blocked(&self) -> usize {
        self.all.iter().filter(|&&id| self.is_blocked(id)).count()
    }
}

/// Build the dependency forest for one repository's PR list
///
/// A PR becomes the child of the PR whose head branch matches its base
/// branch; PRs targeting a branch with no matching open PR (main, master)
/// become independent roots. When two open PRs share a head branch name the
/// most recently created one wins the lookup slot. Mutual base/head
/// references would otherwise leave nodes unreachable, so any node not
/// visited from a root has its parent link severed and is promoted to a
/// root itself.
#[must_use]
pub fn detect_stacks(prs: Vec<PullRequest>) -> Stack {
    if prs.is_empty() {
        return Stack::default();
    }

    let mut nodes: Vec<StackNode> = prs.into_iter().map(StackNode::new).collect();

    // head branch -> node, most recently created PR winning duplicates
    let mut by_head: HashMap<String, NodeId> = HashMap::new();
    for (id, node) in nodes.iter().enumerate() {
        match by_head.entry(node.pr.head_ref.clone()) {
            std::collections::hash_map::Entry::Vacant(entry) => {
                entry.insert(id);
            }
            std::collections::hash_map::Entry::Occupied(mut entry) => {
                if node.pr.created_at > nodes[*entry.get()].pr.created_at {
                    entry.insert(id);
                }
            }
        }
    }

    // Link each PR to the PR owning its base branch
    for id in 0..nodes.len() {
        let base = nodes[id].pr.base_ref.clone();
        if let Some(&parent) = by_head.get(&base)
            && parent != id
        {
            nodes[id].parent = Some(parent);
            nodes[parent].children.push(id);
        }
    }

    let mut roots: Vec<NodeId> = (0..nodes.len())
        .filter(|&id| nodes[id].parent.is_none())
        .collect();

    // Depth assignment from the roots; the visited set doubles as cycle
    // detection.
    let mut visited: HashSet<NodeId> = HashSet::new();
    for &root in &roots {
        assign_depths(&mut nodes, root, 0, &mut visited);
    }

    // Any unvisited node sits on a base/head cycle. Sever its parent link
    // (lowest PR number first, for determinism) and treat it as a root.
    while visited.len() < nodes.len() {
        let Some(breaker) = (0..nodes.len())
            .filter(|id| !visited.contains(id))
            .min_by_key(|&id| nodes[id].pr.number)
        else {
            break;
        };
        if let Some(parent) = nodes[breaker].parent.take() {
            nodes[parent].children.retain(|&child| child != breaker);
        }
        roots.push(breaker);
        assign_depths(&mut nodes, breaker, 0, &mut visited);
    }

    let numbers: Vec<u64> = nodes.iter().map(|n| n.pr.number).collect();
    roots.sort_by_key(|&id| numbers[id]);
    for node in &mut nodes {
        node.children.sort_by_key(|&child| numbers[child]);
    }
    let mut all: Vec<NodeId> = (0..nodes.len()).collect();
    all.sort_by_key(|&id| numbers[id]);

    Stack { nodes, roots, all }
}

/// Iteratively assign depths below `root`, recording visited nodes
fn assign_depths(
    nodes: &mut [StackNode],
    root: NodeId,
    root_depth: usize,
    visited: &mut HashSet<NodeId>,
) {
    let mut pending = vec![(root, root_depth)];
    while let Some((id, depth)) = pending.pop() {
        if !visited.insert(id) {
            continue;
        }
        nodes[id].depth = depth;
        for &child in &nodes[id].children {
            pending.push((child, depth + 1));
        }
    }
}

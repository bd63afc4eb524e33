// Copyright (c) 2021 Sony Pictures Imageworks, et al.
// SPDX-License-Identifier: Apache-2.0
// https://github.com/imageworks/spk

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use spk_ident::Request;
use spk_name::{PkgName, PkgNameBuf};
use spk_option_map::OptionMap;
use spk_solver_package_iterator::PackageIterator;
use spk_solver_solution::Solution;
use spk_spec::Spec;
use spk_storage::Repository;

use crate::{Error, Result};

/// An index into a [`Graph`]'s arena of nodes.
///
/// Nodes are never removed once added, so a `NodeId` stays valid for the
/// lifetime of the `Graph` that produced it. Using indices rather than
/// `Rc`/`RefCell` parent pointers keeps the tree free of reference cycles
/// and interior mutability entirely inside the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

struct Node {
    parent: Option<NodeId>,
    /// Requests newly contributed at this node, already merged against
    /// whatever the ancestor chain held for the same name.
    requests: Vec<Request>,
    /// How many distinct calls to `add_request` contributed to a given
    /// name at this node, summed across the ancestor chain to decide
    /// whether a name is already "being considered" by more than one
    /// requester.
    request_counts: HashMap<PkgNameBuf, u32>,
    resolved: Option<(Request, Spec, Option<Arc<dyn Repository>>)>,
    iterators: HashMap<PkgNameBuf, PackageIterator>,
    error: Option<String>,
}

impl Node {
    fn root() -> Self {
        Self {
            parent: None,
            requests: Vec::new(),
            request_counts: HashMap::new(),
            resolved: None,
            iterators: HashMap::new(),
            error: None,
        }
    }

    fn branch(parent: NodeId) -> Self {
        Self {
            parent: Some(parent),
            requests: Vec::new(),
            request_counts: HashMap::new(),
            resolved: None,
            iterators: HashMap::new(),
            error: None,
        }
    }
}

/// The decision tree: a rooted, arena-allocated tree of [`Node`]s
/// recording every branch attempted during a solve.
///
/// The tree is the sole source of truth for solver state. After a solve
/// completes (successfully or not) it remains queryable for diagnostics
/// via [`Graph::get_error_chain`].
pub struct Graph {
    nodes: Vec<Node>,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The node that spawned `id` as a branch, or `None` if `id` is the root.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// The chain of ancestors from the root down to (and including) `id`.
    fn lineage(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(nid) = current {
            chain.push(nid);
            current = self.node(nid).parent;
        }
        chain.reverse();
        chain
    }

    /// Construct a new child [`Node`] of `parent` and return its id.
    pub fn add_branch(&mut self, parent: NodeId) -> NodeId {
        self.nodes.push(Node::branch(parent));
        NodeId(self.nodes.len() - 1)
    }

    /// Append `request` to `id`'s local queue, merging it with whatever
    /// the effective (self ∪ ancestors) state already holds for the same
    /// name. An empty range intersection is recorded as this node's
    /// terminal error and returned as [`Error::ConflictingRequestsError`]-wrapping
    /// [`spk_ident::Error`].
    pub fn add_request(&mut self, id: NodeId, request: Request) -> Result<()> {
        let name = request.name().to_owned();
        let existing = self.effective_request(id, &name);
        let merged = match existing {
            Some(mut current) => {
                if let Err(err) = current.restrict(&request) {
                    let message = err.to_string();
                    self.node_mut(id).error = Some(message);
                    return Err(err.into());
                }
                current
            }
            None => request,
        };
        let node = self.node_mut(id);
        *node.request_counts.entry(name).or_insert(0) += 1;
        node.requests.push(merged);
        Ok(())
    }

    /// The merged request for `name` already in effect at `id`, if any,
    /// considering `id`'s own contributions and those of every ancestor.
    fn effective_request(&self, id: NodeId, name: &PkgName) -> Option<Request> {
        let mut found = None;
        for nid in self.lineage(id) {
            if let Some(req) = self
                .node(nid)
                .requests
                .iter()
                .find(|r| r.name() == name)
            {
                found = Some(req.clone());
            }
        }
        found
    }

    /// The ordered set of distinct names contributed anywhere in `id`'s
    /// lineage, along with the single merged [`Request`] in effect for
    /// each, in first-introduced order.
    fn effective_requests(&self, id: NodeId) -> (Vec<PkgNameBuf>, HashMap<PkgNameBuf, Request>) {
        let mut order = Vec::new();
        let mut requests = HashMap::new();
        for nid in self.lineage(id) {
            for request in &self.node(nid).requests {
                let name = request.name().to_owned();
                if !requests.contains_key(&name) {
                    order.push(name.clone());
                }
                requests.insert(name, request.clone());
            }
        }
        (order, requests)
    }

    /// The names already committed to a resolution somewhere in `id`'s
    /// lineage.
    fn effective_resolved(&self, id: NodeId) -> HashMap<PkgNameBuf, (Request, Spec, Option<Arc<dyn Repository>>)> {
        let mut resolved = HashMap::new();
        for nid in self.lineage(id) {
            if let Some((request, spec, repo)) = &self.node(nid).resolved {
                resolved.insert(request.name().to_owned(), (request.clone(), spec.clone(), repo.clone()));
            }
        }
        resolved
    }

    /// How many distinct `add_request` calls anywhere in `id`'s lineage
    /// contributed to `name`, used to decide whether an `IfAlreadyPresent`
    /// request is activated by another requester already wanting the
    /// same package.
    fn contribution_count(&self, id: NodeId, name: &PkgName) -> u32 {
        self.lineage(id)
            .into_iter()
            .filter_map(|nid| self.node(nid).request_counts.get(name).copied())
            .sum()
    }

    /// The next pending [`Request`] to resolve at `id`: the first name,
    /// in first-introduced order, that is not yet resolved and whose
    /// inclusion policy currently fires.
    pub fn next_request(&self, id: NodeId) -> Option<Request> {
        let (order, requests) = self.effective_requests(id);
        let resolved = self.effective_resolved(id);
        for name in order {
            if resolved.contains_key(&name) {
                continue;
            }
            let request = &requests[&name];
            let name_is_pending = self.contribution_count(id, &name) > 1;
            if request.is_active(name_is_pending) {
                return Some(request.clone());
            }
        }
        None
    }

    /// Record `id`'s chosen artifact. If the build is not SOURCE, the
    /// spec's install requirements are appended to `id`'s own request
    /// queue (a SOURCE build's install requirements describe its
    /// eventual binary, not the source package itself, and are not
    /// pulled in here).
    pub fn set_resolved(
        &mut self,
        id: NodeId,
        request: Request,
        spec: Spec,
        repo: Option<Arc<dyn Repository>>,
    ) -> Result<()> {
        let is_source = spec.is_source();
        let requirements = if is_source {
            Vec::new()
        } else {
            spec.install.requirements.clone()
        };
        self.node_mut(id).resolved = Some((request, spec, repo));
        for requirement in requirements {
            self.add_request(id, requirement)?;
        }
        Ok(())
    }

    /// Mark `id` as a terminal, failed branch.
    pub fn set_error(&mut self, id: NodeId, error: String) {
        self.node_mut(id).error = Some(error);
    }

    /// The nearest node in `id`'s lineage (walking from `id` up to the
    /// root) holding an iterator for `name`, if any.
    fn iterator_owner(&self, id: NodeId, name: &PkgName) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(nid) = current {
            if self.node(nid).iterators.contains_key(name) {
                return Some(nid);
            }
            current = self.node(nid).parent;
        }
        None
    }

    /// Advance the iterator owned by `id` or an ancestor for `name`,
    /// constructing one from `repos`/`options` and attaching it at `id`
    /// if none exists yet.
    pub fn advance_iterator(
        &mut self,
        id: NodeId,
        request: &Request,
        repos: &[Arc<dyn Repository>],
        options: &OptionMap,
    ) -> std::result::Result<Option<(Spec, Arc<dyn Repository>)>, spk_solver_package_iterator::Error>
    {
        let name = request.name();
        let owner = match self.iterator_owner(id, name) {
            Some(owner) => owner,
            None => {
                let iterator = PackageIterator::new(request.clone(), repos.to_vec(), options.clone());
                self.node_mut(id).iterators.insert(name.to_owned(), iterator);
                id
            }
        };
        self.node_mut(owner)
            .iterators
            .get_mut(name)
            .expect("just inserted or already present")
            .next()
    }

    /// The accumulated skip history of the iterator governing `name` at
    /// `id`, for diagnostics once it is exhausted.
    pub fn iterator_history(&self, id: NodeId, name: &PkgName) -> Vec<spk_solver_package_iterator::HistoryEntry> {
        match self.iterator_owner(id, name) {
            Some(owner) => self.node(owner).iterators[name].history().to_vec(),
            None => Vec::new(),
        }
    }

    /// Collapse `id`'s lineage into the [`Solution`] it represents.
    pub fn get_current_solution(&self, id: NodeId) -> Solution {
        let mut solution = Solution::new(OptionMap::default());
        for nid in self.lineage(id) {
            if let Some((request, spec, repo)) = &self.node(nid).resolved {
                solution.add(request.clone(), spec.clone(), repo.clone());
            }
        }
        solution
    }

    /// The lineage, from root down to (and including) the deepest node
    /// anywhere in the whole tree that was marked terminal via
    /// [`Graph::set_error`], with each ancestor's own terminal error (if
    /// any) alongside it, in traversal order (root-first).
    ///
    /// A top-level solve failure always re-enters the root, whose own
    /// lineage is just itself -- the node actually carrying the useful
    /// diagnostic (eg "no candidate for the transitive dependency that
    /// doomed every branch") is an abandoned node elsewhere in the arena,
    /// not an ancestor of wherever the driver gave up. This walks every
    /// node ever created, not just `id`'s ancestors, so that node is
    /// found regardless of where backtracking left off. Ties on depth
    /// prefer the most recently created node, i.e. the last branch
    /// explored at that depth.
    pub fn get_error_chain(&self, _id: NodeId) -> Vec<String> {
        let mut deepest: Option<(usize, NodeId)> = None;
        for i in 0..self.nodes.len() {
            let nid = NodeId(i);
            if self.node(nid).error.is_none() {
                continue;
            }
            let depth = self.lineage(nid).len();
            if deepest.map_or(true, |(best_depth, _)| depth >= best_depth) {
                deepest = Some((depth, nid));
            }
        }
        match deepest {
            Some((_, nid)) => self
                .lineage(nid)
                .into_iter()
                .filter_map(|nid| self.node(nid).error.clone())
                .collect(),
            None => Vec::new(),
        }
    }
}

/// The set of distinct names present anywhere in `id`'s effective
/// request set, used by callers that need to know what is still pending
/// without resolving it.
pub fn pending_names(graph: &Graph, id: NodeId) -> HashSet<PkgNameBuf> {
    let (order, _) = graph.effective_requests(id);
    order.into_iter().collect()
}

#[cfg(test)]
mod graph_test {
    use spk_ident::{parse_ident, InclusionPolicy};

    use super::*;

    fn spec(ident: &str) -> Spec {
        Spec::new(parse_ident(ident).unwrap())
    }

    fn req(name: &str) -> Request {
        Request::new(name.parse().unwrap())
    }

    #[test]
    fn test_add_request_and_next_request() {
        let mut graph = Graph::new();
        let root = graph.root();
        graph.add_request(root, req("a")).unwrap();
        let next = graph.next_request(root).unwrap();
        assert_eq!(next.name().as_str(), "a");
    }

    #[test]
    fn test_set_resolved_removes_from_pending() {
        let mut graph = Graph::new();
        let root = graph.root();
        graph.add_request(root, req("a")).unwrap();
        let child = graph.add_branch(root);
        graph
            .set_resolved(child, req("a"), spec("a/1.0.0"), None)
            .unwrap();
        assert!(graph.next_request(child).is_none());
    }

    #[test]
    fn test_source_build_does_not_pull_in_requirements() {
        let mut graph = Graph::new();
        let root = graph.root();
        let mut source_spec = spec("a/1.0.0/SRC-----");
        source_spec.install.requirements.push(req("b"));
        let child = graph.add_branch(root);
        graph
            .set_resolved(child, req("a"), source_spec, None)
            .unwrap();
        assert!(graph.next_request(child).is_none());
    }

    #[test]
    fn test_binary_build_pulls_in_requirements() {
        let mut graph = Graph::new();
        let root = graph.root();
        let mut binary_spec = spec("a/1.0.0/3TCOOP2W");
        binary_spec.install.requirements.push(req("b"));
        let child = graph.add_branch(root);
        graph
            .set_resolved(child, req("a"), binary_spec, None)
            .unwrap();
        let next = graph.next_request(child).unwrap();
        assert_eq!(next.name().as_str(), "b");
    }

    #[test]
    fn test_conflicting_requests_errors() {
        let mut graph = Graph::new();
        let root = graph.root();
        let mut first = req("b");
        first.pkg = "b/>=2.0.0".parse().unwrap();
        graph.add_request(root, first).unwrap();
        let mut conflicting = req("b");
        conflicting.pkg = "b/<2.0.0".parse().unwrap();
        assert!(graph.add_request(root, conflicting).is_err());
    }

    #[test]
    fn test_if_already_present_does_not_fire_alone() {
        let mut graph = Graph::new();
        let root = graph.root();
        let mut optional = req("a");
        optional.inclusion_policy = InclusionPolicy::IfAlreadyPresent;
        graph.add_request(root, optional).unwrap();
        assert!(graph.next_request(root).is_none());
    }

    #[test]
    fn test_if_already_present_fires_when_also_requested_elsewhere() {
        let mut graph = Graph::new();
        let root = graph.root();
        let mut optional = req("a");
        optional.inclusion_policy = InclusionPolicy::IfAlreadyPresent;
        graph.add_request(root, optional.clone()).unwrap();
        graph.add_request(root, optional).unwrap();
        assert!(graph.next_request(root).is_some());
    }

    #[test]
    fn test_get_current_solution_collapses_lineage() {
        let mut graph = Graph::new();
        let root = graph.root();
        let a = graph.add_branch(root);
        graph
            .set_resolved(a, req("a"), spec("a/1.0.0"), None)
            .unwrap();
        let b = graph.add_branch(a);
        graph
            .set_resolved(b, req("b"), spec("b/1.0.0"), None)
            .unwrap();
        let solution = graph.get_current_solution(b);
        assert_eq!(solution.len(), 2);
    }

    #[test]
    fn test_error_chain_collects_along_lineage() {
        let mut graph = Graph::new();
        let root = graph.root();
        let child = graph.add_branch(root);
        graph.set_error(root, "root failure".into());
        graph.set_error(child, "child failure".into());
        let chain = graph.get_error_chain(child);
        assert_eq!(chain, vec!["root failure".to_string(), "child failure".to_string()]);
    }
}

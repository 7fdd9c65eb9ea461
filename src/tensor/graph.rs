//! Derivation records linking an array to the arrays it was computed from

use super::TensorId;
use std::sync::Arc;

/// How an array was derived from its inputs
///
/// Arrays that track gradients and come out of an operation hold a
/// `GradNode`; leaves (fresh allocations, detached copies) hold none. Nodes
/// chain through `parents`, so the whole history stays reachable from the
/// newest array until something detaches it.
#[derive(Debug)]
pub struct GradNode {
    op: &'static str,
    inputs: Vec<TensorId>,
    parents: Vec<Option<Arc<GradNode>>>,
}

impl GradNode {
    /// Record an operation over `inputs`, each paired with its own node
    pub fn new(op: &'static str, inputs: Vec<(TensorId, Option<Arc<GradNode>>)>) -> Self {
        let (inputs, parents) = inputs.into_iter().unzip();
        Self {
            op,
            inputs,
            parents,
        }
    }

    /// Operation name, for debugging
    #[inline]
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// IDs of the arrays this one was computed from
    #[inline]
    pub fn inputs(&self) -> &[TensorId] {
        &self.inputs
    }

    /// Number of operations between this node and the leaves it descends from
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.parents.iter().flatten().map(|p| (p.as_ref(), depth + 1)));
        }
        deepest
    }

    /// Whether `id` appears anywhere in this node's history
    pub fn depends_on(&self, id: TensorId) -> bool {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if node.inputs.contains(&id) {
                return true;
            }
            stack.extend(node.parents.iter().flatten().map(Arc::as_ref));
        }
        false
    }
}

// Unlink parents one at a time so a long view chain cannot overflow the stack
impl Drop for GradNode {
    fn drop(&mut self) {
        let mut pending: Vec<Arc<GradNode>> = self.parents.drain(..).flatten().collect();
        while let Some(node) = pending.pop() {
            if let Some(mut node) = Arc::into_inner(node) {
                pending.extend(node.parents.drain(..).flatten());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_depth_and_dependencies() {
        let leaf = TensorId::new();
        let mid = TensorId::new();
        let first = Arc::new(GradNode::new("transpose", vec![(leaf, None)]));
        let second = GradNode::new("flip", vec![(mid, Some(first.clone()))]);

        assert_eq!(first.depth(), 1);
        assert_eq!(second.depth(), 2);
        assert_eq!(second.op(), "flip");
        assert!(second.depends_on(leaf));
        assert!(second.depends_on(mid));
        assert!(!first.depends_on(mid));
    }

    #[test]
    fn test_long_chain_walks_and_drops() {
        let root = TensorId::new();
        let mut node = Arc::new(GradNode::new("flip", vec![(root, None)]));
        for _ in 1..200_000 {
            node = Arc::new(GradNode::new("flip", vec![(TensorId::new(), Some(node))]));
        }

        assert_eq!(node.depth(), 200_000);
        assert!(node.depends_on(root));
        drop(node);
    }

    #[test]
    fn test_shared_parent_survives_child_drop() {
        let leaf = TensorId::new();
        let shared = Arc::new(GradNode::new("transpose", vec![(leaf, None)]));
        let child = GradNode::new("flip", vec![(TensorId::new(), Some(shared.clone()))]);

        drop(child);
        assert_eq!(Arc::strong_count(&shared), 1);
        assert!(shared.depends_on(leaf));
    }
}

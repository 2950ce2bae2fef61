use glam::Mat4;
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub children: Vec<usize>,
    pub mesh: Option<usize>,
    /// translation * rotation * scale * matrix
    pub local: Mat4,
}

/// Resolves world transforms of a flat node list without recursion.
///
/// `parent_index` is a `node_count * node_count` table: row `child` holds every parent that lists
/// `child` in its children, `child_count[child]` of them. Both are scratch state, rebuilt on every
/// [`SceneGraph::resolve`] but allocated once.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    parent_index: Vec<usize>,
    child_count: Vec<usize>,
    world: Vec<Mat4>,
}

impl SceneGraph {
    pub fn new(nodes: Vec<SceneNode>) -> Self {
        let count = nodes.len();
        Self {
            nodes,
            parent_index: vec![0; count * count],
            child_count: vec![0; count],
            world: vec![Mat4::IDENTITY; count],
        }
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    /// The transforms computed by the last [`SceneGraph::resolve`].
    pub fn world_transforms(&self) -> &[Mat4] {
        &self.world
    }

    /// Number of parents recorded for `node` by the last [`SceneGraph::resolve`].
    pub fn parent_count(&self, node: usize) -> usize {
        self.child_count.get(node).copied().unwrap_or(0)
    }

    pub fn resolve(&mut self, global: Mat4) -> &[Mat4] {
        profiling::scope!("SceneGraph::resolve");
        let count = self.nodes.len();
        self.child_count.fill(0);

        for (parent, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                if child >= count || self.child_count[child] >= count {
                    continue;
                }
                self.parent_index[child * count + self.child_count[child]] = parent;
                self.child_count[child] += 1;
            }
        }

        for node in 0..count {
            if self.child_count[node] > 1 {
                debug!("Node {} has {} parents, using the first one", node, self.child_count[node]);
            }

            // Walk up along the first recorded parent. A chain longer than the node count means a cycle.
            let mut transform = self.nodes[node].local;
            let mut current = node;
            let mut steps = 0;
            while self.child_count[current] > 0 && steps < count {
                current = self.parent_index[current * count];
                transform = self.nodes[current].local * transform;
                steps += 1;
            }
            self.world[node] = global * transform;
        }

        &self.world
    }
}

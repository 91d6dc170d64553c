/*
Rendering is kept out of the domain layer: the forest only exposes traversal, and this
trait turns a subtree into a termtree::Tree for terminal display.
 */
use termtree::Tree;
use tracing::instrument;

use crate::domain::{ChildSlots, Forest, NodeId};

pub trait TreeNodeConvert {
    fn to_tree_string(&self, root: NodeId) -> Tree<String>;
}

impl<S: ChildSlots> TreeNodeConvert for Forest<S> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self, root: NodeId) -> Tree<String> {
        fn build<S: ChildSlots>(forest: &Forest<S>, node: NodeId) -> Tree<String> {
            let label = forest.name(node).unwrap_or_default().to_string();
            let leaves: Vec<_> = forest
                .children(node)
                .into_iter()
                .map(|child| build(forest, child))
                .collect();
            Tree::new(label).with_leaves(leaves)
        }

        if self.contains(root) {
            build(self, root)
        } else {
            Tree::new("Empty tree".to_string())
        }
    }
}

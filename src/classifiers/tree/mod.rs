mod node;
mod regression_tree;
pub mod split_criteria;

pub use node::TreeNode;
pub use regression_tree::{RegressionTree, TreeConfig};

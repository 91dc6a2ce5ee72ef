//! Regression trees of a boosted ensemble.
//!
//! Nodes are stored in a flat list with node 0 as the root. Children always
//! sit at a higher index than their parent, which makes every valid tree
//! acyclic and lets traversal run without a visited set.

use serde::{Deserialize, Serialize};

/// Relative tolerance when checking that child covers add up to the parent.
const COVER_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Node {
    /// `x[feature] <= threshold` goes to `left`, everything else to `right`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    Leaf {
        value: f64,
        cover: f64,
    },
}

impl Node {
    /// Training samples that reached this node.
    #[must_use]
    pub fn cover(&self) -> f64 {
        match self {
            Self::Split { cover, .. } | Self::Leaf { cover, .. } => *cover,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Check structure against a model with `n_features` columns.
    ///
    /// # Errors
    /// Returns a description of the first problem found.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            let cover = node.cover();
            if !cover.is_finite() || cover <= 0.0 {
                return Err(format!("node {i} has invalid cover {cover}"));
            }

            match *node {
                Node::Leaf { value, .. } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {i} has non-finite value"));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    if feature >= n_features {
                        return Err(format!("node {i} splits on unknown feature {feature}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has non-finite threshold"));
                    }
                    for child in [left, right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child index {child}"));
                        }
                    }
                    let children = self.nodes[left].cover() + self.nodes[right].cover();
                    if (children - cover).abs() > COVER_TOLERANCE * cover {
                        return Err(format!(
                            "node {i} cover {cover} does not match its children ({children})"
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf value reached by `x`.
    #[must_use]
    pub fn predict(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match self.nodes[index] {
                Node::Leaf { value, .. } => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    index = if x[feature] <= threshold { left } else { right };
                }
            }
        }
    }

    /// Cover-weighted mean leaf value, i.e. the tree's output with no
    /// feature known.
    #[must_use]
    pub fn expected_value(&self) -> f64 {
        self.expected_from(0)
    }

    fn expected_from(&self, index: usize) -> f64 {
        match self.nodes[index] {
            Node::Leaf { value, .. } => value,
            Node::Split {
                left, right, cover, ..
            } => {
                let l = self.nodes[left].cover() / cover;
                let r = self.nodes[right].cover() / cover;
                l * self.expected_from(left) + r * self.expected_from(right)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// `x[0] <= 0.0` -> -1.0, otherwise 1.0, equal covers.
    pub(crate) fn stump() -> Tree {
        Tree {
            nodes: vec![
                Node::Split {
                    feature: 0,
                    threshold: 0.0,
                    left: 1,
                    right: 2,
                    cover: 100.0,
                },
                Node::Leaf {
                    value: -1.0,
                    cover: 50.0,
                },
                Node::Leaf {
                    value: 1.0,
                    cover: 50.0,
                },
            ],
        }
    }

    #[test]
    fn test_predict_follows_threshold() {
        let tree = stump();
        assert_eq!(tree.predict(&[-0.5]), -1.0);
        assert_eq!(tree.predict(&[0.0]), -1.0);
        assert_eq!(tree.predict(&[0.01]), 1.0);
    }

    #[test]
    fn test_expected_value_weights_by_cover() {
        let mut tree = stump();
        tree.nodes[1] = Node::Leaf {
            value: -1.0,
            cover: 75.0,
        };
        tree.nodes[2] = Node::Leaf {
            value: 1.0,
            cover: 25.0,
        };
        assert!((tree.expected_value() + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_validate_accepts_stump() {
        stump().validate(1).expect("Stump should be valid");
    }

    #[test]
    fn test_validate_rejects_backward_child() {
        let mut tree = stump();
        if let Node::Split { left, .. } = &mut tree.nodes[0] {
            *left = 0;
        }
        assert!(tree.validate(1).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_feature() {
        assert!(stump().validate(0).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_cover() {
        let mut tree = stump();
        tree.nodes[2] = Node::Leaf {
            value: 1.0,
            cover: 0.0,
        };
        assert!(tree.validate(1).is_err());

        let mut tree = stump();
        tree.nodes[2] = Node::Leaf {
            value: 1.0,
            cover: 60.0,
        };
        assert!(tree.validate(1).is_err(), "children must add up to parent cover");
    }

    #[test]
    fn test_validate_rejects_empty_tree() {
        assert!(Tree { nodes: vec![] }.validate(1).is_err());
    }

    #[test]
    fn test_node_json_layout() {
        let json = r#"{"nodes":[
            {"split":{"feature":0,"threshold":0.0,"left":1,"right":2,"cover":100.0}},
            {"leaf":{"value":-1.0,"cover":50.0}},
            {"leaf":{"value":1.0,"cover":50.0}}
        ]}"#;
        let tree: Tree = serde_json::from_str(json).expect("Should parse");
        assert_eq!(tree, stump());
    }
}

//! Test utilities for loading sample trees from JSON fixtures
use crate::node::{InternalNode, LeafNode, Node, NodeId};
use crate::{Config, Key, Tree};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct Edge {
	key: String,
	child: TreeNode,
}

#[derive(Deserialize, Debug)]
struct Value {
	key: String,
	value: String,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum TreeNode {
	Internal {
		edges: Vec<Edge>,
		upper_edge: Box<TreeNode>,
	},
	Leaf {
		values: Vec<Value>,
	},
}

#[derive(Deserialize, Debug)]
struct SampleTree {
	leaf_capacity: usize,
	internal_capacity: usize,
	root: TreeNode,
}

/// Places `tree_node` and its subtree in the arena, collecting leaves in key
/// order so the chain can be linked afterwards.
fn translate_node(
	tree: &mut Tree<String>,
	tree_node: TreeNode,
	parent: Option<NodeId>,
	leaves: &mut Vec<NodeId>,
) -> NodeId {
	match tree_node {
		TreeNode::Internal {
			edges,
			upper_edge,
		} => {
			let mut internal = InternalNode::new();
			internal.parent = parent;
			let id = tree.arena.alloc(Node::Internal(internal));

			let mut out_keys = Vec::with_capacity(edges.len());
			let mut out_edges = Vec::with_capacity(edges.len());
			for edge in edges {
				out_keys.push(Key::from(edge.key));
				out_edges.push(translate_node(tree, edge.child, Some(id), leaves));
			}
			let out_upper_edge = translate_node(tree, *upper_edge, Some(id), leaves);

			let internal = tree.arena.get_mut(id).as_internal_mut();
			internal.keys = out_keys;
			internal.edges = out_edges;
			internal.upper_edge = Some(out_upper_edge);
			id
		}
		TreeNode::Leaf {
			values,
		} => {
			let mut leaf = LeafNode::new();
			leaf.parent = parent;
			for value in values {
				leaf.keys.push(Key::from(value.key));
				leaf.values.push(value.value);
			}
			let id = tree.arena.alloc(Node::Leaf(leaf));
			leaves.push(id);
			id
		}
	}
}

/// Builds a tree from a fixture file under the crate root.
pub fn sample_tree<P: AsRef<std::path::Path>>(path: P) -> Tree<String> {
	let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
	let file = std::fs::File::open(&path).expect("failed to find file");
	let json_tree: SampleTree = serde_json::from_reader(file).unwrap();

	let mut tree =
		Tree::with_config(Config::new(json_tree.leaf_capacity, json_tree.internal_capacity))
			.unwrap();
	tree.arena.clear();

	let mut leaves = Vec::new();
	let root = translate_node(&mut tree, json_tree.root, None, &mut leaves);
	tree.root = root;
	for pair in leaves.windows(2) {
		tree.arena.get_mut(pair[0]).as_leaf_mut().next = Some(pair[1]);
	}
	tree
}

//! Huffman coding for TLK payloads
//!
//! The tree lives in a flat node table. A child value `>= 0` is an index
//! into the table; a negative child is a leaf whose character is
//! `0xFFFF - child` truncated to 16 bits, so character 0 is stored as -1.
//! Characters are UTF-16 code units.

use super::bitstream::BitReader;
use super::layout::TreeNode;
use crate::error::{Error, Result};
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Character that ends every encoded string.
pub const TERMINATOR: u16 = 0;

/// Resolved child reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Child {
    Node(usize),
    Leaf(u16),
}

impl Child {
    #[must_use]
    pub fn from_raw(value: i32) -> Self {
        if value >= 0 {
            Child::Node(value as usize)
        } else {
            Child::Leaf(leaf_char(value))
        }
    }
}

/// Character stored in a leaf reference.
#[must_use]
pub fn leaf_char(value: i32) -> u16 {
    (0xFFFF_i64 - i64::from(value)) as u16
}

/// Leaf reference for a character (`-1 - code`).
#[must_use]
pub fn leaf_id(ch: u16) -> i32 {
    -1 - i32::from(ch)
}

/// Result of decoding one string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedString {
    /// `None` when the payload ran out before a terminator
    pub text: Option<String>,
    /// First bit after the terminator
    pub next: usize,
}

/// Walks a serialized tree over a payload.
#[derive(Debug, Clone, Copy)]
pub struct HuffmanDecoder<'a> {
    nodes: &'a [TreeNode],
}

impl<'a> HuffmanDecoder<'a> {
    #[must_use]
    pub fn new(nodes: &'a [TreeNode]) -> Self {
        Self { nodes }
    }

    /// Decode the NUL-terminated string whose first bit is `offset`.
    ///
    /// Running out of bits is not an error: the text is `None` and `next`
    /// points one past the end of the payload.
    ///
    /// # Errors
    /// Returns [`Error::InvalidTreeNode`] if the tree references a node that
    /// does not exist.
    pub fn decode_string_at(&self, bits: &BitReader<'_>, offset: usize) -> Result<DecodedString> {
        let len = bits.len();
        if self.nodes.is_empty() {
            return Ok(DecodedString {
                text: None,
                next: offset.max(len) + 1,
            });
        }

        let mut units: Vec<u16> = Vec::new();
        let mut node = 0usize;
        let mut index = offset;

        while index < len {
            let current = self.nodes[node];
            let raw = if bits.read_bit(index)? {
                current.right
            } else {
                current.left
            };

            match Child::from_raw(raw) {
                Child::Node(next) => {
                    if next >= self.nodes.len() {
                        return Err(Error::InvalidTreeNode {
                            node: raw,
                            count: self.nodes.len(),
                        });
                    }
                    node = next;
                }
                Child::Leaf(TERMINATOR) => {
                    return Ok(DecodedString {
                        text: Some(String::from_utf16_lossy(&units)),
                        next: index + 1,
                    });
                }
                Child::Leaf(ch) => {
                    units.push(ch);
                    node = 0;
                }
            }
            index += 1;
        }

        Ok(DecodedString {
            text: None,
            next: index + 1,
        })
    }
}

/// Count UTF-16 units over `texts`, one terminator per text.
pub fn count_frequencies<'a, I>(texts: I) -> BTreeMap<u16, u64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut frequencies = BTreeMap::new();
    for text in texts {
        for unit in text.encode_utf16() {
            *frequencies.entry(unit).or_insert(0) += 1;
        }
        *frequencies.entry(TERMINATOR).or_insert(0) += 1;
    }
    frequencies
}

#[derive(Debug, Clone, Copy)]
enum BuildKind {
    Leaf(u16),
    Internal { left: usize, right: usize },
}

#[derive(Debug, Clone, Copy)]
struct BuildNode {
    weight: u64,
    kind: BuildKind,
}

/// A tree built from character frequencies, with its serialized node table
/// and per-character codes.
#[derive(Debug, Clone, Default)]
pub struct HuffmanEncoder {
    tree: Vec<TreeNode>,
    codes: HashMap<u16, Vec<bool>>,
}

impl HuffmanEncoder {
    /// Build the tree.
    ///
    /// Leaves are seeded in ascending character order. Each round stably
    /// sorts the forest by weight and joins the first two nodes, the first
    /// becoming the left child.
    #[must_use]
    pub fn from_frequencies(frequencies: &BTreeMap<u16, u64>) -> Self {
        let mut arena: Vec<BuildNode> = frequencies
            .iter()
            .map(|(&ch, &weight)| BuildNode {
                weight,
                kind: BuildKind::Leaf(ch),
            })
            .collect();

        if arena.is_empty() {
            return Self::default();
        }

        let mut forest: Vec<usize> = (0..arena.len()).collect();
        if forest.len() == 1 {
            // A lone leaf still needs a root to hang a one-bit code from.
            arena.push(BuildNode {
                weight: arena[0].weight,
                kind: BuildKind::Internal { left: 0, right: 0 },
            });
            forest = vec![1];
        }

        while forest.len() > 1 {
            forest.sort_by_key(|&idx| arena[idx].weight);
            let left = forest.remove(0);
            let right = forest.remove(0);
            arena.push(BuildNode {
                weight: arena[left].weight + arena[right].weight,
                kind: BuildKind::Internal { left, right },
            });
            forest.push(arena.len() - 1);
        }

        let root = forest[0];
        let tree = serialize_tree(&arena, root);
        let codes = derive_codes(&arena, root);

        tracing::debug!(
            "Built Huffman tree: {} leaves, {} internal nodes",
            codes.len(),
            tree.len()
        );

        Self { tree, codes }
    }

    /// Internal nodes ordered by id; index 0 is the root
    #[must_use]
    pub fn tree(&self) -> &[TreeNode] {
        &self.tree
    }

    #[must_use]
    pub fn code(&self, ch: u16) -> Option<&[bool]> {
        self.codes.get(&ch).map(Vec::as_slice)
    }

    #[must_use]
    pub fn codes(&self) -> &HashMap<u16, Vec<bool>> {
        &self.codes
    }
}

/// Assign ids breadth-first (right child queued before left) and flatten
/// internal nodes into `(left, right)` pairs.
fn serialize_tree(arena: &[BuildNode], root: usize) -> Vec<TreeNode> {
    let mut ids = vec![0i32; arena.len()];
    let mut internal = Vec::new();
    let mut queue = VecDeque::from([root]);

    while let Some(idx) = queue.pop_front() {
        match arena[idx].kind {
            BuildKind::Leaf(ch) => ids[idx] = leaf_id(ch),
            BuildKind::Internal { left, right } => {
                ids[idx] = internal.len() as i32;
                internal.push(idx);
                queue.push_back(right);
                queue.push_back(left);
            }
        }
    }

    internal
        .into_iter()
        .filter_map(|idx| match arena[idx].kind {
            BuildKind::Internal { left, right } => Some(TreeNode {
                left: ids[left],
                right: ids[right],
            }),
            BuildKind::Leaf(_) => None,
        })
        .collect()
}

/// Depth-first walk: `false` going left, `true` going right.
fn derive_codes(arena: &[BuildNode], root: usize) -> HashMap<u16, Vec<bool>> {
    let mut codes = HashMap::new();
    let mut stack = vec![(root, Vec::new())];

    while let Some((idx, path)) = stack.pop() {
        match arena[idx].kind {
            BuildKind::Leaf(ch) => {
                codes.entry(ch).or_insert(path);
            }
            BuildKind::Internal { left, right } => {
                let mut right_path = path.clone();
                right_path.push(true);
                stack.push((right, right_path));

                let mut left_path = path;
                left_path.push(false);
                stack.push((left, left_path));
            }
        }
    }
    codes
}

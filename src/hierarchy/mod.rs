//! Hierarchy construction.
//!
//! Rows are grouped recursively by an ordered list of keys: the first key
//! splits the root, the second splits each of those groups, and so on. When
//! the keys run out, the remaining rows of a group are rolled up into a
//! single leaf whose value is the sum of their measure. Internal values are
//! the sums of their children; depth and height are filled in once the
//! whole tree exists.
//!
//! The tree is stored as an arena. [`NodeId`]s index into it, nodes are laid
//! out in pre-order (root at index 0, every child after its parent) and
//! parent links are plain ids, so ancestor walks need no shared ownership.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use crate::config::DEFAULT_MEASURE_FIELD;
use crate::data::{format_number, FieldValue, Row};
use crate::error::{Result, SunburstError};

/// Index of a node inside its [`Hierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Grouping value of a node.
///
/// Rows that lack a grouping field land in the [`GroupKey::Missing`]
/// bucket, which sorts before every present value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupKey {
    Missing,
    Value(FieldValue),
}

impl GroupKey {
    /// Key of `row` for `field`.
    pub fn of(row: &Row, field: &str) -> Self {
        match row.get(field) {
            Some(value) => GroupKey::Value(value.clone()),
            None => GroupKey::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, GroupKey::Missing)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Missing => f.write_str("(unknown)"),
            GroupKey::Value(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Value(FieldValue::from(s))
    }
}

#[derive(Debug, Clone)]
pub struct HierarchyNode {
    pub key: GroupKey,
    /// Sum of the measure over every row in this subtree.
    pub value: f64,
    /// Distance from the root (root = 0).
    pub depth: usize,
    /// Distance to the deepest leaf below (leaf = 0).
    pub height: usize,
    /// Number of source rows rolled into this subtree.
    pub row_count: usize,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl HierarchyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// `"key (value)"`, the form used by breadcrumbs and arc labels.
    pub fn label(&self) -> String {
        format!("{} ({})", self.key, format_number(self.value))
    }
}

/// Immutable grouped tree.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    nodes: Vec<HierarchyNode>,
}

impl Hierarchy {
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &HierarchyNode {
        &self.nodes[id.0]
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Height of the root, i.e. the number of grouping levels that produced children.
    pub fn height(&self) -> usize {
        self.nodes[0].height
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// `id` and its ancestors, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut cur = id;
        while let Some(p) = self.nodes[cur.0].parent {
            out.push(p);
            cur = p;
        }
        out
    }

    /// Root-to-node path.
    pub fn path(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = self.ancestors(id);
        path.reverse();
        path
    }

    /// Whether `id` is `ancestor` or lies below it.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.nodes[c.0].parent;
        }
        false
    }

    /// Every node in breadth-first order, root first.
    pub fn descendants(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut queue = VecDeque::from([self.root()]);
        while let Some(id) = queue.pop_front() {
            order.push(id);
            queue.extend(self.nodes[id.0].children.iter().copied());
        }
        order
    }

    pub fn leaves(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(|id| self.nodes[id.0].is_leaf())
    }

    /// Follow displayed keys down from the root (the root itself is not part of `keys`).
    pub fn find_path(&self, keys: &[&str]) -> Option<NodeId> {
        let mut cur = self.root();
        for key in keys {
            cur = *self.nodes[cur.0]
                .children
                .iter()
                .find(|c| self.nodes[c.0].key.to_string() == *key)?;
        }
        Some(cur)
    }

    /// Top-level branch a node belongs to (the depth-1 ancestor), `None` for the root.
    pub fn branch_of(&self, id: NodeId) -> Option<NodeId> {
        let mut cur = id;
        loop {
            let node = &self.nodes[cur.0];
            match node.parent {
                None => return None,
                Some(_) if node.depth == 1 => return Some(cur),
                Some(p) => cur = p,
            }
        }
    }

    pub fn label(&self, id: NodeId) -> String {
        self.nodes[id.0].label()
    }
}

/// Group `rows` by each accessor in turn and sum `measure` at the leaves.
///
/// `accessors` must hold at least one key function.
pub fn build_hierarchy_by<R, M>(
    rows: &[R],
    accessors: &[&dyn Fn(&R) -> GroupKey],
    measure: M,
    root_label: &str,
) -> Result<Hierarchy>
where
    M: Fn(&R) -> f64,
{
    if accessors.is_empty() {
        return Err(SunburstError::InvalidGroupField(
            "at least one grouping level is required".into(),
        ));
    }

    let mut nodes = vec![HierarchyNode {
        key: GroupKey::from(root_label),
        value: 0.0,
        depth: 0,
        height: 0,
        row_count: rows.len(),
        parent: None,
        children: Vec::new(),
    }];

    let all: Vec<&R> = rows.iter().collect();
    if !all.is_empty() {
        group_level(&mut nodes, NodeId(0), all, accessors, &measure);
    }
    roll_up(&mut nodes);

    let tree = Hierarchy { nodes };
    log::info!(
        "Built hierarchy: {} nodes, height {}, total {}",
        tree.len(),
        tree.height(),
        format_number(tree.node(tree.root()).value)
    );
    Ok(tree)
}

fn group_level<R, M>(
    nodes: &mut Vec<HierarchyNode>,
    parent: NodeId,
    rows: Vec<&R>,
    accessors: &[&dyn Fn(&R) -> GroupKey],
    measure: &M,
) where
    M: Fn(&R) -> f64,
{
    let (accessor, rest) = match accessors.split_first() {
        Some(split) => split,
        None => return,
    };

    let mut groups: BTreeMap<GroupKey, Vec<&R>> = BTreeMap::new();
    for row in rows {
        groups.entry(accessor(row)).or_default().push(row);
    }

    let depth = nodes[parent.0].depth + 1;
    for (key, members) in groups {
        let id = NodeId(nodes.len());
        let value = if rest.is_empty() {
            members.iter().map(|&r| measure(r)).sum::<f64>()
        } else {
            0.0
        };
        nodes.push(HierarchyNode {
            key,
            value,
            depth,
            height: 0,
            row_count: members.len(),
            parent: Some(parent),
            children: Vec::new(),
        });
        nodes[parent.0].children.push(id);

        if !rest.is_empty() {
            group_level(nodes, id, members, rest, measure);
        }
    }
}

/// Fill internal values and heights. Children always follow their parent
/// in the arena, so a reverse sweep sees every child before its parent.
fn roll_up(nodes: &mut [HierarchyNode]) {
    for i in (0..nodes.len()).rev() {
        if nodes[i].children.is_empty() {
            continue;
        }
        let (value, height) = nodes[i]
            .children
            .iter()
            .fold((0.0, 0), |(sum, h), c| {
                (sum + nodes[c.0].value, h.max(nodes[c.0].height))
            });
        nodes[i].value = value;
        nodes[i].height = height + 1;
    }
}

/// Field-name driven front end to [`build_hierarchy_by`].
#[derive(Debug, Clone)]
pub struct HierarchyBuilder {
    group_fields: Vec<String>,
    measure_field: String,
    root_label: String,
}

impl HierarchyBuilder {
    pub fn new<S: AsRef<str>>(group_fields: &[S]) -> Self {
        Self {
            group_fields: group_fields.iter().map(|s| s.as_ref().to_string()).collect(),
            measure_field: DEFAULT_MEASURE_FIELD.to_string(),
            root_label: crate::config::DEFAULT_ROOT_LABEL.to_string(),
        }
    }

    pub fn with_measure_field(mut self, field: impl Into<String>) -> Self {
        self.measure_field = field.into();
        self
    }

    pub fn with_root_label(mut self, label: impl Into<String>) -> Self {
        self.root_label = label.into();
        self
    }

    pub fn group_fields(&self) -> &[String] {
        &self.group_fields
    }

    pub fn build(&self, rows: &[Row]) -> Result<Hierarchy> {
        if self.group_fields.is_empty() {
            return Err(SunburstError::InvalidGroupField(
                "group field list is empty".into(),
            ));
        }
        if let Some(blank) = self.group_fields.iter().find(|f| f.trim().is_empty()) {
            return Err(SunburstError::InvalidGroupField(format!(
                "blank group field name {:?}",
                blank
            )));
        }

        let accessors: Vec<_> = self
            .group_fields
            .iter()
            .map(|field| move |row: &Row| GroupKey::of(row, field))
            .collect();
        let accessor_refs: Vec<&dyn Fn(&Row) -> GroupKey> = accessors
            .iter()
            .map(|a| a as &dyn Fn(&Row) -> GroupKey)
            .collect();

        let measure_field = self.measure_field.as_str();
        build_hierarchy_by(
            rows,
            &accessor_refs,
            |row: &Row| row.measure(measure_field),
            &self.root_label,
        )
    }
}

/// Group `rows` by `group_fields` in order, summing the `"Total"` field.
pub fn build_hierarchy<S: AsRef<str>>(
    rows: &[Row],
    group_fields: &[S],
    root_label: &str,
) -> Result<Hierarchy> {
    HierarchyBuilder::new(group_fields)
        .with_root_label(root_label)
        .build(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Row> {
        vec![
            Row::new().with("Region", "A").with("City", "X").with("Total", 10.0),
            Row::new().with("Region", "A").with("City", "Y").with("Total", 5.0),
            Row::new().with("Region", "B").with("City", "Z").with("Total", 7.0),
        ]
    }

    #[test]
    fn test_worked_example() {
        let tree = build_hierarchy(&sample(), &["Region", "City"], "All").unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.label(), "All (22)");
        assert_eq!(root.height, 2);

        let labels: Vec<String> = root.children.iter().map(|c| tree.label(*c)).collect();
        assert_eq!(labels, vec!["A (15)", "B (7)"]);

        let a = tree.find_path(&["A"]).unwrap();
        let cities: Vec<String> = tree.children(a).iter().map(|c| tree.label(*c)).collect();
        assert_eq!(cities, vec!["X (10)", "Y (5)"]);
        assert_eq!(tree.label(tree.find_path(&["B", "Z"]).unwrap()), "Z (7)");
    }

    #[test]
    fn test_aggregation_and_depth_invariants() {
        let tree = build_hierarchy(&sample(), &["Region", "City"], "All").unwrap();
        for id in tree.ids() {
            let node = tree.node(id);
            if let Some(p) = node.parent {
                assert_eq!(node.depth, tree.node(p).depth + 1);
            } else {
                assert_eq!(node.depth, 0);
            }
            if node.is_leaf() {
                assert_eq!(node.height, 0);
            } else {
                let sum: f64 = node.children.iter().map(|c| tree.node(*c).value).sum();
                assert!((node.value - sum).abs() < 1e-9);
                let max_h = node.children.iter().map(|c| tree.node(*c).height).max().unwrap();
                assert_eq!(node.height, max_h + 1);
            }
        }
    }

    #[test]
    fn test_siblings_sorted() {
        let rows = vec![
            Row::new().with("K", "c").with("Total", 1.0),
            Row::new().with("K", "a").with("Total", 1.0),
            Row::new().with("K", "b").with("Total", 1.0),
        ];
        let tree = build_hierarchy(&rows, &["K"], "R").unwrap();
        let keys: Vec<String> = tree
            .children(tree.root())
            .iter()
            .map(|c| tree.node(*c).key.to_string())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_duplicate_leaf_rows_are_summed() {
        let rows = vec![
            Row::new().with("K", "a").with("Total", 2.0),
            Row::new().with("K", "a").with("Total", 3.0),
        ];
        let tree = build_hierarchy(&rows, &["K"], "R").unwrap();
        let a = tree.find_path(&["a"]).unwrap();
        assert!(tree.node(a).is_leaf());
        assert_eq!(tree.node(a).value, 5.0);
        assert_eq!(tree.node(a).row_count, 2);
    }

    #[test]
    fn test_missing_field_becomes_sentinel_bucket() {
        let rows = vec![
            Row::new().with("Region", "A").with("Total", 1.0),
            Row::new().with("Total", 4.0),
        ];
        let tree = build_hierarchy(&rows, &["Region"], "All").unwrap();
        let first = tree.children(tree.root())[0];
        assert!(tree.node(first).key.is_missing());
        assert_eq!(tree.label(first), "(unknown) (4)");
    }

    #[test]
    fn test_missing_measure_counts_as_zero() {
        let rows = vec![
            Row::new().with("Region", "A"),
            Row::new().with("Region", "A").with("Total", "3"),
        ];
        let tree = build_hierarchy(&rows, &["Region"], "All").unwrap();
        assert_eq!(tree.node(tree.root()).value, 3.0);
    }

    #[test]
    fn test_zero_rows() {
        let tree = build_hierarchy(&[], &["Region"], "All").unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.node(tree.root()).value, 0.0);
        assert!(tree.node(tree.root()).is_leaf());
    }

    #[test]
    fn test_empty_group_fields_rejected() {
        let fields: [&str; 0] = [];
        assert!(matches!(
            build_hierarchy(&sample(), &fields, "All"),
            Err(SunburstError::InvalidGroupField(_))
        ));
        assert!(matches!(
            build_hierarchy(&sample(), &["Region", " "], "All"),
            Err(SunburstError::InvalidGroupField(_))
        ));
    }

    #[test]
    fn test_generic_accessors() {
        type Record = (&'static str, u32, f64);
        let rows: Vec<Record> = vec![("x", 1, 2.0), ("x", 2, 3.0), ("y", 1, 4.0)];
        let first = |r: &Record| GroupKey::from(r.0);
        let second = |r: &Record| GroupKey::Value(FieldValue::from(r.1 as f64));
        let accessors: [&dyn Fn(&Record) -> GroupKey; 2] = [&first, &second];
        let tree = build_hierarchy_by(&rows, &accessors, |r: &Record| r.2, "root").unwrap();
        assert_eq!(tree.node(tree.root()).value, 9.0);
        assert_eq!(tree.label(tree.find_path(&["x", "2"]).unwrap()), "2 (3)");
    }

    #[test]
    fn test_ancestors_and_descendants() {
        let tree = build_hierarchy(&sample(), &["Region", "City"], "All").unwrap();
        let y = tree.find_path(&["A", "Y"]).unwrap();
        let a = tree.find_path(&["A"]).unwrap();
        assert_eq!(tree.ancestors(y), vec![y, a, tree.root()]);
        assert_eq!(tree.path(y), vec![tree.root(), a, y]);
        assert_eq!(tree.branch_of(y), Some(a));
        assert!(tree.is_descendant_of(y, a));

        let bfs = tree.descendants();
        assert_eq!(bfs.len(), tree.len());
        assert_eq!(bfs[0], tree.root());
        assert!(bfs[1..3].iter().all(|id| tree.node(*id).depth == 1));
        assert_eq!(tree.leaves().count(), 3);
    }
}

// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. If a copy of the MPL was not distributed with this file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::error::{Error, Result};

type Index = usize;

struct Node<V> {
    content: V,
    /// A node is a root when it is its own parent.
    parent: Index,
    /// Only meaningful at roots.
    size: usize,
}

/// Union-find over a fixed set of elements, with full path compression and
/// union by size.
///
/// Every element gets a dense index when the set is built; the element set
/// never changes afterwards. Two elements are in the same component iff
/// `find` returns the same representative for both.
pub struct DisjointSet<V> {
    nodes: Vec<Node<V>>,
    indices: HashMap<V, Index>,
}

impl<V> DisjointSet<V> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn component_count(&self) -> usize {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(index, node)| node.parent == *index)
            .count()
    }

    fn element(&self, index: Index) -> Result<&V> {
        self.nodes
            .get(index)
            .map(|node| &node.content)
            .ok_or(Error::IndexOutOfBounds {
                index,
                len: self.nodes.len(),
            })
    }

    fn find_root(&mut self, index: Index) -> Index {
        let mut root = index;
        let mut path = Vec::new();
        while self.nodes[root].parent != root {
            path.push(root);
            root = self.nodes[root].parent;
        }
        for node in path {
            self.nodes[node].parent = root;
        }
        root
    }

    fn union_indices(&mut self, i: Index, j: Index) {
        let i_root = self.find_root(i);
        let j_root = self.find_root(j);
        if i_root == j_root {
            return;
        }
        let i_size = self.nodes[i_root].size;
        let j_size = self.nodes[j_root].size;
        if i_size < j_size {
            self.nodes[i_root].parent = j_root;
            self.nodes[j_root].size += i_size;
        } else {
            // ties keep the first root
            self.nodes[j_root].parent = i_root;
            self.nodes[i_root].size += j_size;
        }
    }
}

impl<V> DisjointSet<V>
where
    V: Eq + Hash + Clone,
{
    /// Builds a set where every distinct element is its own component.
    /// Repeated elements are registered once.
    pub fn new<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = V>,
    {
        let mut set = Self {
            nodes: Vec::new(),
            indices: HashMap::new(),
        };
        for element in elements {
            set.register(element);
        }
        set
    }

    fn register(&mut self, element: V) {
        if self.indices.contains_key(&element) {
            return;
        }
        let index = self.nodes.len();
        self.nodes.push(Node {
            content: element.clone(),
            parent: index,
            size: 1,
        });
        self.indices.insert(element, index);
    }

    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        V: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.indices.contains_key(element)
    }

    fn index_of<Q>(&self, element: &Q) -> Result<Index>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.indices
            .get(element)
            .copied()
            .ok_or_else(|| Error::UnknownElement(format!("{element:?}")))
    }

    /// Returns the representative of `element`'s component, compressing the
    /// path walked on the way.
    pub fn find<Q>(&mut self, element: &Q) -> Result<&V>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let index = self.index_of(element)?;
        let root = self.find_root(index);
        self.element(root)
    }

    /// Merges the components of `element_1` and `element_2`. The root of the
    /// smaller component is attached under the root of the larger one.
    pub fn union<Q>(&mut self, element_1: &Q, element_2: &Q) -> Result<()>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let i = self.index_of(element_1)?;
        let j = self.index_of(element_2)?;
        self.union_indices(i, j);
        Ok(())
    }

    pub fn connected<Q>(&mut self, element_1: &Q, element_2: &Q) -> Result<bool>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let i = self.index_of(element_1)?;
        let j = self.index_of(element_2)?;
        Ok(self.find_root(i) == self.find_root(j))
    }

    pub fn component_size<Q>(&mut self, element: &Q) -> Result<usize>
    where
        V: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        let index = self.index_of(element)?;
        let root = self.find_root(index);
        Ok(self.nodes[root].size)
    }
}

impl<V> FromIterator<V> for DisjointSet<V>
where
    V: Eq + Hash + Clone,
{
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::DisjointSet;
    use crate::error::Error;

    fn assert_forest<V>(set: &DisjointSet<V>) {
        for index in 0..set.nodes.len() {
            let mut current = index;
            let mut steps = 0;
            while set.nodes[current].parent != current {
                current = set.nodes[current].parent;
                steps += 1;
                assert!(steps <= set.nodes.len(), "cycle through node {index}");
            }
        }
        let root_sizes: usize = set
            .nodes
            .iter()
            .enumerate()
            .filter(|(index, node)| node.parent == *index)
            .map(|(_, node)| node.size)
            .sum();
        assert_eq!(root_sizes, set.nodes.len());
    }

    #[test]
    fn union_find_letters() {
        let mut ds = DisjointSet::new(["A", "B", "C", "D"]);
        ds.union("A", "B").unwrap();
        ds.union("B", "C").unwrap();
        let a = *ds.find("A").unwrap();
        let b = *ds.find("B").unwrap();
        let c = *ds.find("C").unwrap();
        let d = *ds.find("D").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a, c);
        assert_ne!(a, d);
        assert_eq!(*ds.find("D").unwrap(), "D");
        assert_eq!(ds.component_count(), 2);
        assert_eq!(ds.component_size("C").unwrap(), 3);
    }

    #[test]
    fn owned_strings_are_looked_up_by_str() {
        let mut ds: DisjointSet<String> = ["a", "b", "c", "d"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        ds.union("a", "b").unwrap();
        ds.union("b", "c").unwrap();
        assert!(ds.connected("a", "c").unwrap());
        assert!(!ds.connected("a", "d").unwrap());
    }

    #[test]
    fn duplicates_collapse() {
        let ds = DisjointSet::new([1, 2, 2, 3, 1]);
        assert_eq!(ds.len(), 3);
        assert!(ds.contains(&2));
        assert!(!ds.contains(&4));
    }

    #[test]
    fn unknown_element_is_reported() {
        let mut ds = DisjointSet::new(["x", "y"]);
        assert_eq!(
            ds.find("z"),
            Err(Error::UnknownElement("\"z\"".to_string()))
        );
        assert!(matches!(ds.union("x", "z"), Err(Error::UnknownElement(_))));
        // a failed union must not merge anything
        assert_eq!(ds.component_count(), 2);
    }

    #[test]
    fn repeated_union_is_a_no_op() {
        let mut ds = DisjointSet::new(0..4);
        ds.union(&0, &1).unwrap();
        let before = *ds.find(&1).unwrap();
        ds.union(&0, &1).unwrap();
        ds.union(&1, &0).unwrap();
        assert_eq!(*ds.find(&1).unwrap(), before);
        assert_eq!(ds.component_size(&0).unwrap(), 2);
    }

    #[test]
    fn smaller_tree_goes_under_larger() {
        let mut ds = DisjointSet::new(0..5);
        ds.union(&1, &2).unwrap();
        ds.union(&1, &3).unwrap();
        // {1, 2, 3} is larger, so its root stays the representative
        ds.union(&0, &1).unwrap();
        assert_eq!(*ds.find(&0).unwrap(), 1);
        // equal sizes: the first argument's root wins
        let mut ds = DisjointSet::new(0..2);
        ds.union(&0, &1).unwrap();
        assert_eq!(*ds.find(&1).unwrap(), 0);
    }

    #[test]
    fn find_compresses_to_root() {
        let mut ds = DisjointSet::new(0..4);
        // build the chain 3 -> 2 -> 1 -> 0 by hand
        for i in 1..4 {
            ds.nodes[i].parent = i - 1;
        }
        ds.nodes[0].size = 4;
        assert_eq!(*ds.find(&3).unwrap(), 0);
        for i in 0..4 {
            assert_eq!(ds.nodes[i].parent, 0);
        }
        assert_forest(&ds);
    }

    #[test]
    fn element_index_out_of_bounds() {
        let ds = DisjointSet::new(["only"]);
        assert_eq!(*ds.element(0).unwrap(), "only");
        assert_eq!(
            ds.element(3),
            Err(Error::IndexOutOfBounds { index: 3, len: 1 })
        );
    }

    proptest! {
        #[test]
        fn matches_reference_partition(
            n in 1usize..40,
            unions in proptest::collection::vec((0usize..40, 0usize..40), 0..60),
        ) {
            let mut ds = DisjointSet::new(0..n);
            let mut labels: Vec<usize> = (0..n).collect();
            for (a, b) in unions {
                let (a, b) = (a % n, b % n);
                ds.union(&a, &b).unwrap();
                let (from, to) = (labels[b], labels[a]);
                for label in labels.iter_mut() {
                    if *label == from {
                        *label = to;
                    }
                }
                assert_forest(&ds);
            }
            for a in 0..n {
                for b in 0..n {
                    let ra = *ds.find(&a).unwrap();
                    let rb = *ds.find(&b).unwrap();
                    prop_assert_eq!(ra == rb, labels[a] == labels[b]);
                }
            }
            for a in 0..n {
                let root = ds.find_root(a);
                prop_assert_eq!(ds.nodes[a].parent, root);
            }
            let mut distinct = labels.clone();
            distinct.sort_unstable();
            distinct.dedup();
            prop_assert_eq!(ds.component_count(), distinct.len());
            assert_forest(&ds);
        }
    }
}

use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// One step of a randomized workload. Key space is kept small (u8) so
/// duplicate insertions, repeated removals and handle reuse all get hit.
#[derive(Clone, Copy, Debug, Arbitrary)]
enum Op {
    Insert(u8),
    Remove(u8),
    RemoveHandle(u8),
    Find(u8),
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=2000)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_with_btreemap(ops in ops_strategy()) {
        let mut t: RbTree<u8> = RbTree::new();
        // Model maps each stored key to the handle insert returned for it.
        let mut m: BTreeMap<u8, NodeRef> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key) => match t.insert(key) {
                    Ok(handle) => {
                        prop_assert!(m.insert(key, handle).is_none());
                    }
                    Err(InsertError::Duplicate { existing, key }) => {
                        prop_assert_eq!(m.get(&key).copied(), Some(existing));
                    }
                    Err(InsertError::AllocationFailed { .. }) => {
                        prop_assert!(false, "allocation failed");
                    }
                },
                Op::Remove(key) => {
                    let removed = t.remove(&key);
                    let modeled = m.remove(&key);
                    prop_assert_eq!(removed.is_some(), modeled.is_some());
                    if let Some(k) = removed {
                        prop_assert_eq!(k, key);
                    }
                }
                Op::RemoveHandle(key) => {
                    if let Some(handle) = m.remove(&key) {
                        prop_assert_eq!(t.remove_node(handle), key);
                        prop_assert_eq!(t.key(handle), None);
                    }
                }
                Op::Find(key) => {
                    prop_assert_eq!(t.find(&key), m.get(&key).copied());
                }
            }

            prop_assert_eq!(t.len(), m.len());
            t.check_invariants();
        }

        let got: Vec<u8> = t.iter().copied().collect();
        let expected: Vec<u8> = m.keys().copied().collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_handles_stay_pinned(ops in ops_strategy()) {
        let mut t: RbTree<u8> = RbTree::new();
        let mut m: BTreeMap<u8, NodeRef> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    if let Ok(handle) = t.insert(key) {
                        m.insert(key, handle);
                    }
                }
                Op::Remove(key) | Op::RemoveHandle(key) => {
                    if let Some(handle) = m.remove(&key) {
                        prop_assert_eq!(t.remove_node(handle), key);
                    }
                }
                Op::Find(_) => {}
            }

            // Every live handle must still dereference to its own key, no
            // matter how much rebalancing the ops above triggered.
            for (key, handle) in &m {
                prop_assert_eq!(t.key(*handle), Some(key));
            }
        }
    }

    #[test]
    fn prop_height_stays_logarithmic(keys in prop::collection::btree_set(any::<u32>(), 0..=512)) {
        let mut t: RbTree<u32> = RbTree::new();
        for &key in &keys {
            prop_assert!(t.insert(key).is_ok());
        }
        t.check_invariants();

        let bound = 2.0 * ((keys.len() + 1) as f64).log2();
        prop_assert!(
            t.height() as f64 <= bound + 1e-9,
            "height {} exceeds {} for n={}",
            t.height(),
            bound,
            keys.len()
        );
    }

    #[test]
    fn prop_walk_orders_agree(keys in prop::collection::btree_set(any::<u16>(), 0..=128)) {
        let mut t: RbTree<u16> = RbTree::new();
        for &key in &keys {
            prop_assert!(t.insert(key).is_ok());
        }

        let mut inorder = Vec::new();
        t.walk(Traversal::InOrder, |&k| inorder.push(k));
        let expected: Vec<u16> = keys.iter().copied().collect();
        prop_assert_eq!(&inorder, &expected);

        // Pre- and post-order visit a different sequence but the same set.
        let mut preorder = Vec::new();
        t.walk(Traversal::PreOrder, |&k| preorder.push(k));
        let mut postorder = Vec::new();
        t.walk(Traversal::PostOrder, |&k| postorder.push(k));
        prop_assert_eq!(preorder.len(), keys.len());
        prop_assert_eq!(postorder.len(), keys.len());
        preorder.sort_unstable();
        postorder.sort_unstable();
        prop_assert_eq!(&preorder, &expected);
        prop_assert_eq!(&postorder, &expected);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys: Vec<u32> = vec![1, 2, 3, 4, 5, 6];

    for_each_permutation(&keys, |perm| {
        let mut t: RbTree<u32> = RbTree::new();
        for key in perm {
            t.insert(key)
                .unwrap_or_else(|_| panic!("insert({key}) failed"));
            t.check_invariants();
        }
        let got: Vec<u32> = t.iter().copied().collect();
        assert_eq!(got, keys);
    });
}

#[test]
fn exhaustive_remove_order_small_set() {
    let keys: Vec<u32> = vec![1, 2, 3, 4, 5, 6];

    // Insert in a fixed order, then remove in all permutations.
    let mut base: RbTree<u32> = RbTree::new();
    for &key in &keys {
        base.insert(key)
            .unwrap_or_else(|_| panic!("insert({key}) failed"));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        for key in perm {
            assert_eq!(t.remove(&key), Some(key));
            t.check_invariants();
        }
        assert_eq!(t.len(), 0);
        assert!(t.root.is_nil());
    });
}

use std::collections::HashMap;

use proptest::prelude::*;

use crate::heap::{Heap, Kind, ObjPtr};

/// A node of the model graph: a kind, and one target node index per pointer
/// slot.
#[derive(Clone, Debug)]
struct Node {
    kind: Kind,
    edges: [Option<usize>; 2],
}

#[derive(Clone, Debug)]
struct Graph {
    nodes: Vec<Node>,
    /// Indices of the nodes the named roots `r0, r1, …` point at. May
    /// repeat, which makes the roots aliases of one another.
    roots: Vec<usize>,
}

fn arb_kind() -> impl Strategy<Value = Kind> {
    prop_oneof![Just(Kind::Fork), Just(Kind::Span), Just(Kind::Knot)]
}

fn arb_graph() -> impl Strategy<Value = Graph> {
    (1usize..=12).prop_flat_map(|n| {
        (
            proptest::collection::vec(
                (
                    arb_kind(),
                    proptest::option::of(0..n),
                    proptest::option::of(0..n),
                ),
                n,
            ),
            proptest::collection::vec(0..n, 0..=4),
        )
            .prop_map(|(nodes, roots)| Graph {
                nodes: nodes
                    .into_iter()
                    .map(|(kind, e0, e1)| Node {
                        kind,
                        edges: [e0, e1],
                    })
                    .collect(),
                roots,
            })
    })
}

/// Indices of every model node reachable from the chosen roots, ascending.
fn reachable(graph: &Graph) -> Vec<usize> {
    let mut seen = vec![false; graph.nodes.len()];
    let mut queue = graph.roots.clone();

    while let Some(i) = queue.pop() {
        if std::mem::replace(&mut seen[i], true) {
            continue;
        }
        queue.extend(graph.nodes[i].edges.into_iter().flatten());
    }

    (0..graph.nodes.len()).filter(|&i| seen[i]).collect()
}

/// Mirrors the model graph into `heap`. Wiring goes through one scratch
/// root per node; afterwards only the real roots `r0, r1, …` remain, so
/// exactly the model-reachable nodes stay live.
fn build(heap: &mut Heap, graph: &Graph) {
    let scratch: Vec<String> = (0..graph.nodes.len()).map(|i| format!("n{i}")).collect();

    let mut ptrs = Vec::new();
    for (name, node) in scratch.iter().zip(&graph.nodes) {
        let ptr = heap.allocate_kind(node.kind).unwrap();
        heap.set(&[name.as_str()], ptr).unwrap();
        ptrs.push(ptr);
    }

    for (name, node) in scratch.iter().zip(&graph.nodes) {
        for (field, edge) in node.kind.fields().iter().zip(node.edges) {
            if let Some(target) = edge {
                heap.set(&[name.as_str(), field.name], ptrs[target]).unwrap();
            }
        }
    }

    for (i, target) in graph.roots.iter().enumerate() {
        let root = format!("r{i}");
        heap.set(&[root.as_str()], ptrs[*target]).unwrap();
    }

    for name in &scratch {
        heap.set(&[name.as_str()], ObjPtr::NIL).unwrap();
    }
}

/// Checks that the heap graph reachable from the `r*` roots is isomorphic
/// to the model graph reachable from `graph.roots`: same identities, same
/// kinds, same edges, and one heap object per model node no matter how many
/// paths lead to it.
fn assert_matches_model(heap: &Heap, graph: &Graph) {
    let mut discovered: HashMap<usize, ObjPtr> = HashMap::new();
    let mut queue: Vec<(usize, Vec<String>)> = Vec::new();

    for (i, target) in graph.roots.iter().enumerate() {
        queue.push((*target, vec![format!("r{i}")]));
    }

    while let Some((index, path)) = queue.pop() {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        let ptr = heap.get(&segments).unwrap();

        if let Some(&seen) = discovered.get(&index) {
            // aliasing: every path to the same model node yields the same
            // pointer
            assert_eq!(ptr, seen);
            continue;
        }
        discovered.insert(index, ptr);

        let node = &graph.nodes[index];
        assert_eq!(heap.object_id(ptr).unwrap() as usize, index);
        assert_eq!(heap.kind_of(ptr).unwrap(), node.kind);

        for (field, edge) in node.kind.fields().iter().zip(node.edges) {
            let mut field_path = path.clone();
            field_path.push(field.name.to_owned());

            match edge {
                Some(target) => queue.push((target, field_path)),
                None => {
                    let segments: Vec<&str> =
                        field_path.iter().map(String::as_str).collect();
                    assert!(heap.get(&segments).unwrap().is_nil());
                }
            }
        }
    }

    assert_eq!(discovered.len(), reachable(graph).len());
}

proptest! {
    #[test]
    fn collection_preserves_the_reachable_graph(graph in arb_graph()) {
        let mut heap = Heap::new(4096);
        build(&mut heap, &graph);

        let expected: Vec<u32> = reachable(&graph).into_iter().map(|i| i as u32).collect();

        let report = heap.collect().unwrap();
        let ids: Vec<u32> = report.iter().map(|s| s.id).collect();
        prop_assert_eq!(&ids, &expected);

        for survivor in &report {
            prop_assert_eq!(survivor.kind, graph.nodes[survivor.id as usize].kind);
        }

        assert_matches_model(&heap, &graph);

        // a second collection moves everything again but changes nothing
        let second = heap.collect().unwrap();
        assert_matches_model(&heap, &graph);
        prop_assert_eq!(report, second);
    }

    #[test]
    fn garbage_only_workloads_never_exhaust(count in 1usize..64) {
        // nothing is ever rooted, so every collection reclaims everything
        // and allocation can continue indefinitely
        let mut heap = Heap::new(4 * Kind::Knot.size());

        for _ in 0..count {
            let ptr = heap.allocate_kind(Kind::Knot).unwrap();
            prop_assert!(ptr.offset() + Kind::Knot.size() <= heap.bump);
            prop_assert!(heap.bump <= heap.active.capacity());
        }
    }
}

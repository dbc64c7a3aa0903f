//! Property-based tests for the edit operations.
//!
//! Random sequences of edits are applied to flat grids, with quads or
//! triangles. Each edit either succeeds and leaves a valid mesh behind, or
//! fails and leaves the mesh exactly as it was. The inverse pairs restore the
//! edges they started with. Removing faces keeps the Euler characteristic in
//! step with the number of components and holes.

use halfmesh::{Error, FH, HH, Mesh, VH};
use proptest::prelude::*;
use std::collections::HashSet;

type GridMesh = Mesh<[f64; 3], u32>;

#[derive(Debug, Clone)]
enum Op {
    SplitEdge(usize),
    RemoveVertex(usize),
    SplitFace(usize, usize, usize),
    MergeFaces(usize),
    FlipEdge(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<usize>().prop_map(Op::SplitEdge),
        any::<usize>().prop_map(Op::RemoveVertex),
        (any::<usize>(), any::<usize>(), any::<usize>())
            .prop_map(|(f, a, b)| Op::SplitFace(f, a, b)),
        any::<usize>().prop_map(Op::MergeFaces),
        any::<usize>().prop_map(Op::FlipEdge),
    ]
}

fn grid(nx: usize, ny: usize, triangulate: bool) -> GridMesh {
    let mut mesh = GridMesh::quad_grid(nx, ny, |p| p).expect("Cannot create grid");
    if triangulate {
        let faces: Vec<FH> = mesh.faces().collect();
        for f in faces {
            let ha = mesh.face_halfedge(f).expect("Face has no halfedge");
            let hb = mesh
                .next(mesh.next(ha).expect("Broken loop"))
                .expect("Broken loop");
            mesh.split_face(f, ha, hb, 1).expect("Cannot triangulate quad");
        }
    }
    mesh
}

fn pick_halfedge(mesh: &GridMesh, i: usize) -> HH {
    mesh.halfedges()
        .nth(i % mesh.num_halfedges())
        .expect("Mesh has no halfedges")
}

fn pick_vertex(mesh: &GridMesh, i: usize) -> VH {
    mesh.vertices()
        .nth(i % mesh.num_vertices())
        .expect("Mesh has no vertices")
}

fn pick_face(mesh: &GridMesh, i: usize) -> FH {
    mesh.faces()
        .nth(i % mesh.num_faces())
        .expect("Mesh has no faces")
}

fn apply(mesh: &mut GridMesh, op: &Op) -> Result<(), Error> {
    match *op {
        Op::SplitEdge(i) => {
            let h = pick_halfedge(mesh, i);
            mesh.split_edge(h, [0.0; 3]).map(|_| ())
        }
        Op::RemoveVertex(i) => {
            let v = pick_vertex(mesh, i);
            mesh.remove_vertex(v).map(|_| ())
        }
        Op::SplitFace(i, a, b) => {
            let f = pick_face(mesh, i);
            let hs: Vec<HH> = mesh.fh_iter(f)?.collect();
            let (ha, hb) = (hs[a % hs.len()], hs[b % hs.len()]);
            mesh.split_face(f, ha, hb, 2).map(|_| ())
        }
        Op::MergeFaces(i) => {
            let h = pick_halfedge(mesh, i);
            mesh.merge_faces(h).map(|_| ())
        }
        Op::FlipEdge(i) => {
            let h = pick_halfedge(mesh, i);
            mesh.flip_edge(h).map(|_| ())
        }
    }
}

fn euler(mesh: &GridMesh) -> isize {
    mesh.num_vertices() as isize - mesh.num_edges() as isize + mesh.num_faces() as isize
}

/// Undirected edges as sorted vertex pairs.
fn edge_set(mesh: &GridMesh) -> Vec<(VH, VH)> {
    let mut edges: Vec<(VH, VH)> = mesh
        .edge_vertex_pairs()
        .into_iter()
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect();
    edges.sort();
    edges
}

/// Number of connected pieces, walking vertex neighborhoods.
fn components(mesh: &GridMesh) -> usize {
    let mut visited: HashSet<VH> = HashSet::new();
    let mut count = 0;
    for start in mesh.vertices() {
        if !visited.insert(start) {
            continue;
        }
        count += 1;
        let mut stack = vec![start];
        while let Some(v) = stack.pop() {
            for n in mesh.vv_iter(v).expect("Invalid vertex") {
                if visited.insert(n) {
                    stack.push(n);
                }
            }
        }
    }
    count
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: every edit leaves a valid mesh, and a failed edit changes nothing.
    #[test]
    fn prop_edits_keep_topology_valid(
        nx in 1usize..5,
        ny in 1usize..5,
        triangulate in any::<bool>(),
        ops in prop::collection::vec(op_strategy(), 1..40),
    ) {
        let mut mesh = grid(nx, ny, triangulate);
        let chi = euler(&mesh);
        for op in &ops {
            let before = mesh.halfedge_table();
            let nverts = mesh.num_vertices();
            if apply(&mut mesh, op).is_err() {
                prop_assert_eq!(&mesh.halfedge_table(), &before, "Failed {:?} changed the mesh", op);
                prop_assert_eq!(mesh.num_vertices(), nverts);
            }
            prop_assert_eq!(mesh.check_topology(), Ok(()), "Invalid topology after {:?}", op);
            prop_assert_eq!(euler(&mesh), chi);
            prop_assert_eq!(mesh.hole_loops().len(), 1);
            prop_assert!(mesh.is_connected());
            for v in mesh.vertices() {
                prop_assert!(mesh.vertex_data(v).is_ok());
            }
            for f in mesh.faces() {
                prop_assert!(mesh.face_data(f).is_ok());
                prop_assert!(mesh.face_degree(f)? >= 3);
            }
        }
    }

    /// Property: removing the vertex inserted by an edge split restores the edges.
    #[test]
    fn prop_split_edge_remove_vertex_inverse(
        nx in 1usize..5,
        ny in 1usize..5,
        triangulate in any::<bool>(),
        i in any::<usize>(),
    ) {
        let mut mesh = grid(nx, ny, triangulate);
        let edges = edge_set(&mesh);
        let nfaces = mesh.num_faces();
        let h = pick_halfedge(&mesh, i);
        let (m, _, _) = mesh.split_edge(h, [0.5, 0.5, 0.5])?;
        prop_assert_eq!(mesh.vertex_degree(m)?, 2);
        let (_, payload) = mesh.remove_vertex(m)?;
        prop_assert_eq!(payload, [0.5, 0.5, 0.5]);
        prop_assert_eq!(edge_set(&mesh), edges);
        prop_assert_eq!(mesh.num_faces(), nfaces);
        prop_assert!(!mesh.is_valid_vertex(m));
        prop_assert_eq!(mesh.check_topology(), Ok(()));
    }

    /// Property: merging across the edge added by a face split restores the edges.
    #[test]
    fn prop_split_face_merge_inverse(
        nx in 1usize..5,
        ny in 1usize..5,
        i in any::<usize>(),
        corner in 0usize..4,
    ) {
        let mut mesh = grid(nx, ny, false);
        let edges = edge_set(&mesh);
        let f = pick_face(&mesh, i);
        let hs: Vec<HH> = mesh.fh_iter(f)?.collect();
        prop_assert_eq!(hs.len(), 4);
        let (g, n) = mesh.split_face(f, hs[corner], hs[(corner + 2) % 4], 7)?;
        prop_assert_eq!(mesh.face_degree(f)?, 3);
        prop_assert_eq!(mesh.face_degree(g)?, 3);
        let (survivor, payload) = mesh.merge_faces(n)?;
        prop_assert_eq!(survivor, f);
        prop_assert_eq!(payload, 7);
        prop_assert!(!mesh.is_valid_face(g));
        prop_assert_eq!(edge_set(&mesh), edges);
        prop_assert_eq!(mesh.check_topology(), Ok(()));
    }

    /// Property: flipping an interior edge twice restores the edges.
    #[test]
    fn prop_flip_twice_restores_edges(
        nx in 1usize..5,
        ny in 1usize..5,
        i in any::<usize>(),
    ) {
        let mut mesh = grid(nx, ny, true);
        let edges = edge_set(&mesh);
        let interior: Vec<HH> = mesh
            .halfedges()
            .filter(|h| matches!(mesh.is_boundary_edge(*h), Ok(false)))
            .collect();
        prop_assume!(!interior.is_empty());
        let h = interior[i % interior.len()];
        let flipped = mesh.flip_edge(h)?;
        prop_assert_ne!(edge_set(&mesh), edges.clone());
        mesh.flip_edge(flipped)?;
        prop_assert_eq!(edge_set(&mesh), edges);
        prop_assert_eq!(mesh.check_topology(), Ok(()));
    }

    /// Property: removing faces leaves planar pieces, each with
    /// V - E + F = 2 - holes.
    #[test]
    fn prop_remove_faces_keep_topology_valid(
        nx in 1usize..5,
        ny in 1usize..5,
        triangulate in any::<bool>(),
        picks in prop::collection::vec(any::<usize>(), 1..16),
    ) {
        let mut mesh = grid(nx, ny, triangulate);
        for i in picks {
            if mesh.num_faces() == 0 {
                break;
            }
            let f = pick_face(&mesh, i);
            let before = mesh.halfedge_table();
            let nfaces = mesh.num_faces();
            match mesh.remove_face(f) {
                Ok(_) => {
                    prop_assert!(!mesh.is_valid_face(f));
                    prop_assert_eq!(mesh.num_faces(), nfaces - 1);
                }
                Err(Error::PinchedVertex { face, .. }) => {
                    prop_assert_eq!(face, f);
                    prop_assert_eq!(&mesh.halfedge_table(), &before);
                }
                Err(e) => prop_assert!(false, "Unexpected error {}", e),
            }
            prop_assert_eq!(mesh.check_topology(), Ok(()));
            prop_assert_eq!(
                euler(&mesh),
                2 * components(&mesh) as isize - mesh.hole_loops().len() as isize
            );
            for v in mesh.vertices() {
                prop_assert!(mesh.vertex_degree(v)? >= 2);
            }
        }
    }
}

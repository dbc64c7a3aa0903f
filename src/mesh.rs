use std::collections::VecDeque;

use crate::{
    element::{Edge, HasTopology, Handle, FH, HH, VH},
    error::Error,
    iterator,
    topol::Topology,
};

/// A polygon mesh with a payload of type `V` on every vertex and `F` on every
/// face.
///
/// Meshes are created with a [`MeshBuilder`](crate::MeshBuilder), or one of
/// the shortcuts [`Mesh::build`] and [`Mesh::from_indexed`]. Navigation is
/// done with handles, either through the methods of the mesh or through the
/// methods of the handles themselves, which accept anything that implements
/// [`HasTopology`].
#[derive(Clone)]
pub struct Mesh<V, F> {
    pub(crate) topol: Topology,
    pub(crate) vdata: Vec<Option<V>>,
    pub(crate) fdata: Vec<Option<F>>,
}

/// Row of the table returned by [`Mesh::halfedge_table`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct HalfedgeRow {
    pub halfedge: HH,
    pub origin: VH,
    pub twin: HH,
    pub next: HH,
    pub prev: HH,
    pub face: Option<FH>,
}

/// Marks a point in the history of a mesh. Handles issued after it can be
/// listed with [`Mesh::vertices_since`] etc.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint {
    vertices: usize,
    halfedges: usize,
    faces: usize,
}

impl<V, F> Default for Mesh<V, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, F> HasTopology for Mesh<V, F> {
    fn topology(&self) -> &Topology {
        &self.topol
    }
}

impl<V, F> Mesh<V, F> {
    /// An empty mesh.
    pub fn new() -> Self {
        Mesh {
            topol: Topology::new(),
            vdata: Vec::new(),
            fdata: Vec::new(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.topol.num_vertices()
    }

    pub fn num_halfedges(&self) -> usize {
        self.topol.num_halfedges()
    }

    pub fn num_edges(&self) -> usize {
        self.topol.num_edges()
    }

    pub fn num_faces(&self) -> usize {
        self.topol.num_faces()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<'_, V, F> {
        self.topol.vertices()
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<'_, V, F> {
        self.topol.halfedges()
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + use<'_, V, F> {
        self.topol.edges()
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<'_, V, F> {
        self.topol.faces()
    }

    pub fn is_valid_vertex(&self, v: VH) -> bool {
        self.topol.is_valid_vertex(v)
    }

    pub fn is_valid_halfedge(&self, h: HH) -> bool {
        self.topol.is_valid_halfedge(h)
    }

    pub fn is_valid_face(&self, f: FH) -> bool {
        self.topol.is_valid_face(f)
    }

    pub fn next(&self, h: HH) -> Result<HH, Error> {
        self.topol.next(h)
    }

    pub fn prev(&self, h: HH) -> Result<HH, Error> {
        self.topol.prev(h)
    }

    pub fn twin(&self, h: HH) -> Result<HH, Error> {
        self.topol.twin(h)
    }

    pub fn origin(&self, h: HH) -> Result<VH, Error> {
        self.topol.origin(h)
    }

    pub fn destination(&self, h: HH) -> Result<VH, Error> {
        self.topol.destination(h)
    }

    /// The face incident on `h`, `None` for boundary halfedges.
    pub fn face(&self, h: HH) -> Result<Option<FH>, Error> {
        self.topol.face(h)
    }

    pub fn is_boundary(&self, h: HH) -> Result<bool, Error> {
        self.topol.is_boundary_halfedge(h)
    }

    pub fn is_boundary_edge(&self, h: HH) -> Result<bool, Error> {
        self.topol.is_boundary_edge(h)
    }

    pub fn is_boundary_vertex(&self, v: VH) -> Result<bool, Error> {
        self.topol.is_boundary_vertex(v)
    }

    pub fn vertex_halfedge(&self, v: VH) -> Result<HH, Error> {
        self.topol.vertex_halfedge(v)
    }

    pub fn face_halfedge(&self, f: FH) -> Result<HH, Error> {
        self.topol.face_halfedge(f)
    }

    pub fn edge(&self, h: HH) -> Result<Edge, Error> {
        h.edge(self)
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Result<Option<HH>, Error> {
        self.topol.find_halfedge(from, to)
    }

    pub fn vertex_degree(&self, v: VH) -> Result<usize, Error> {
        self.topol.vertex_degree(v)
    }

    pub fn face_degree(&self, f: FH) -> Result<usize, Error> {
        self.topol.face_degree(f)
    }

    /// The halfedges bounding `f`, starting at its representative halfedge.
    pub fn half_edges_of_face(&self, f: FH) -> Result<impl Iterator<Item = HH> + use<'_, V, F>, Error> {
        iterator::fh_iter(&self.topol, f)
    }

    /// The halfedges leaving `v`, rotating with `twin -> next` from its
    /// representative halfedge. The faceless halfedge of a boundary vertex
    /// comes first.
    pub fn outgoing_half_edges_of_vertex(
        &self,
        v: VH,
    ) -> Result<impl Iterator<Item = HH> + use<'_, V, F>, Error> {
        iterator::voh_iter(&self.topol, v)
    }

    pub fn voh_iter(&self, v: VH) -> Result<impl Iterator<Item = HH> + use<'_, V, F>, Error> {
        iterator::voh_iter(&self.topol, v)
    }

    pub fn voh_ccw_iter(&self, v: VH) -> Result<impl Iterator<Item = HH> + use<'_, V, F>, Error> {
        iterator::voh_ccw_iter(&self.topol, v)
    }

    pub fn vih_iter(&self, v: VH) -> Result<impl Iterator<Item = HH> + use<'_, V, F>, Error> {
        iterator::vih_iter(&self.topol, v)
    }

    pub fn vv_iter(&self, v: VH) -> Result<impl Iterator<Item = VH> + use<'_, V, F>, Error> {
        iterator::vv_iter(&self.topol, v)
    }

    pub fn vf_iter(&self, v: VH) -> Result<impl Iterator<Item = FH> + use<'_, V, F>, Error> {
        iterator::vf_iter(&self.topol, v)
    }

    pub fn fh_iter(&self, f: FH) -> Result<impl Iterator<Item = HH> + use<'_, V, F>, Error> {
        iterator::fh_iter(&self.topol, f)
    }

    pub fn fv_iter(&self, f: FH) -> Result<impl Iterator<Item = VH> + use<'_, V, F>, Error> {
        iterator::fv_iter(&self.topol, f)
    }

    pub fn ff_iter(&self, f: FH) -> Result<impl Iterator<Item = FH> + use<'_, V, F>, Error> {
        iterator::ff_iter(&self.topol, f)
    }

    /// The loop of halfedges containing `h`. This works for holes as well as
    /// faces.
    pub fn loop_iter(&self, h: HH) -> Result<impl Iterator<Item = HH> + use<'_, V, F>, Error> {
        iterator::loop_iter(&self.topol, h)
    }

    /// Same loop as [`loop_iter`](Self::loop_iter), walked backwards with
    /// `prev`.
    pub fn loop_rev_iter(&self, h: HH) -> Result<impl Iterator<Item = HH> + use<'_, V, F>, Error> {
        iterator::loop_rev_iter(&self.topol, h)
    }

    pub fn vertex_data(&self, v: VH) -> Result<&V, Error> {
        self.vdata
            .get(v.index() as usize)
            .and_then(|p| p.as_ref())
            .ok_or(Error::InvalidVertex(v))
    }

    pub fn vertex_data_mut(&mut self, v: VH) -> Result<&mut V, Error> {
        self.vdata
            .get_mut(v.index() as usize)
            .and_then(|p| p.as_mut())
            .ok_or(Error::InvalidVertex(v))
    }

    pub fn face_data(&self, f: FH) -> Result<&F, Error> {
        self.fdata
            .get(f.index() as usize)
            .and_then(|p| p.as_ref())
            .ok_or(Error::InvalidFace(f))
    }

    pub fn face_data_mut(&mut self, f: FH) -> Result<&mut F, Error> {
        self.fdata
            .get_mut(f.index() as usize)
            .and_then(|p| p.as_mut())
            .ok_or(Error::InvalidFace(f))
    }

    /// Delete a vertex and return its payload. No live halfedge may start at
    /// the vertex.
    ///
    /// Deletions do not cascade, and they scan the whole mesh for references,
    /// so they are meant for low level cleanup rather than editing.
    pub fn delete_vertex(&mut self, v: VH) -> Result<V, Error> {
        self.topol.vertex(v)?;
        if let Some(referrer) = self.topol.vertex_referrer(v) {
            return Err(Error::DanglingReference {
                entity: v.to_string(),
                referrer,
            });
        }
        self.topol.delete_vertex(v)?;
        self.vdata
            .get_mut(v.index() as usize)
            .and_then(|p| p.take())
            .ok_or(Error::InvalidVertex(v))
    }

    /// Delete a halfedge. No other live halfedge, vertex or face may refer to
    /// it.
    pub fn delete_halfedge(&mut self, h: HH) -> Result<(), Error> {
        self.topol.halfedge(h)?;
        if let Some(referrer) = self.topol.halfedge_referrer(h) {
            return Err(Error::DanglingReference {
                entity: h.to_string(),
                referrer,
            });
        }
        self.topol.delete_halfedge(h)
    }

    /// Delete a face and return its payload. No live halfedge may carry it.
    pub fn delete_face(&mut self, f: FH) -> Result<F, Error> {
        self.topol.face_record(f)?;
        if let Some(referrer) = self.topol.face_referrer(f) {
            return Err(Error::DanglingReference {
                entity: f.to_string(),
                referrer,
            });
        }
        self.topol.delete_face(f)?;
        self.fdata
            .get_mut(f.index() as usize)
            .and_then(|p| p.take())
            .ok_or(Error::InvalidFace(f))
    }

    /// The vertices of every face, in winding order, starting at the origin
    /// of the representative halfedge. Passing these to [`Mesh::build`]
    /// produces a mesh with the same topology.
    pub fn face_windings(&self) -> Vec<Vec<VH>> {
        self.faces()
            .filter_map(|f| iterator::fv_iter(&self.topol, f).ok())
            .map(|fv| fv.collect())
            .collect()
    }

    /// The vertices of every hole, in the order of its boundary halfedges.
    pub fn hole_loops(&self) -> Vec<Vec<VH>> {
        let mut visited = vec![false; self.topol.halfedge_capacity()];
        let mut out = Vec::new();
        for h in self.boundary_halfedges() {
            if std::mem::replace(&mut visited[h.index() as usize], true) {
                continue;
            }
            let Ok(hs) = iterator::loop_iter(&self.topol, h) else {
                continue;
            };
            let mut verts = Vec::new();
            for hh in hs {
                visited[hh.index() as usize] = true;
                if let Ok(v) = self.topol.origin(hh) {
                    verts.push(v);
                }
            }
            out.push(verts);
        }
        out
    }

    /// Every edge as a pair of vertices, in the direction of its smaller
    /// halfedge.
    pub fn edge_vertex_pairs(&self) -> Vec<(VH, VH)> {
        self.edges()
            .filter_map(|e| {
                let h = e.first();
                Some((self.topol.origin(h).ok()?, self.topol.destination(h).ok()?))
            })
            .collect()
    }

    /// Every live halfedge with all its links.
    pub fn halfedge_table(&self) -> Vec<HalfedgeRow> {
        self.halfedges()
            .filter_map(|h| {
                let hedge = self.topol.halfedge(h).ok()?;
                Some(HalfedgeRow {
                    halfedge: h,
                    origin: hedge.origin,
                    twin: hedge.twin,
                    next: hedge.next,
                    prev: hedge.prev,
                    face: hedge.face,
                })
            })
            .collect()
    }

    pub fn boundary_halfedges(&self) -> impl Iterator<Item = HH> + use<'_, V, F> {
        self.halfedges()
            .filter(|h| matches!(self.topol.is_boundary_halfedge(*h), Ok(true)))
    }

    pub fn boundary_edges(&self) -> impl Iterator<Item = Edge> + use<'_, V, F> {
        self.edges()
            .filter(|e| matches!(self.topol.is_boundary_edge(e.first()), Ok(true)))
    }

    pub fn interior_edges(&self) -> impl Iterator<Item = Edge> + use<'_, V, F> {
        self.edges()
            .filter(|e| matches!(self.topol.is_boundary_edge(e.first()), Ok(false)))
    }

    pub fn boundary_vertices(&self) -> impl Iterator<Item = VH> + use<'_, V, F> {
        self.vertices()
            .filter(|v| matches!(self.topol.is_boundary_vertex(*v), Ok(true)))
    }

    pub fn interior_vertices(&self) -> impl Iterator<Item = VH> + use<'_, V, F> {
        self.vertices()
            .filter(|v| matches!(self.topol.is_boundary_vertex(*v), Ok(false)))
    }

    /// Check if every vertex can be reached from every other vertex. An empty
    /// mesh is connected.
    pub fn is_connected(&self) -> bool {
        let Some(start) = self.vertices().next() else {
            return true;
        };
        let mut visited = vec![false; self.topol.vertex_capacity()];
        let mut queue = VecDeque::from([start]);
        visited[start.index() as usize] = true;
        let mut count = 0usize;
        while let Some(v) = queue.pop_front() {
            count += 1;
            let Ok(neighbors) = iterator::vv_iter(&self.topol, v) else {
                continue;
            };
            for n in neighbors {
                if !std::mem::replace(&mut visited[n.index() as usize], true) {
                    queue.push_back(n);
                }
            }
        }
        count == self.num_vertices()
    }

    /// Record the current state, to later find what was created after it.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            vertices: self.topol.vertex_capacity(),
            halfedges: self.topol.halfedge_capacity(),
            faces: self.topol.face_capacity(),
        }
    }

    /// Live vertices created after `cp`.
    pub fn vertices_since(&self, cp: &Checkpoint) -> impl Iterator<Item = VH> + use<'_, V, F> {
        let start = cp.vertices;
        self.vertices().filter(move |v| v.index() as usize >= start)
    }

    pub fn halfedges_since(&self, cp: &Checkpoint) -> impl Iterator<Item = HH> + use<'_, V, F> {
        let start = cp.halfedges;
        self.halfedges().filter(move |h| h.index() as usize >= start)
    }

    pub fn faces_since(&self, cp: &Checkpoint) -> impl Iterator<Item = FH> + use<'_, V, F> {
        let start = cp.faces;
        self.faces().filter(move |f| f.index() as usize >= start)
    }
}

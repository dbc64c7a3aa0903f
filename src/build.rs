use std::collections::HashMap;

use crate::{
    element::{Handle, HH, VH},
    error::Error,
    iterator,
    topol::Topology,
    Mesh,
};

/// A vertex of a face passed to the builder. Either a vertex that was already
/// added, or a new vertex created from its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexRef<V> {
    Existing(VH),
    New(V),
}

/// Collects vertices, faces and holes, and builds a validated [`Mesh`] from
/// them.
///
/// Vertices are identified by the handles returned from
/// [`add_vertex`](Self::add_vertex). Faces referring to the same handle share
/// that vertex, no other deduplication takes place. The winding of each face
/// defines its orientation, and the `i`-th face added becomes `FH(i)` in the
/// built mesh. Vertex handles are preserved as well, except that vertices not
/// referenced by any face or hole are dropped.
pub struct MeshBuilder<V, F> {
    vertices: Vec<V>,
    faces: Vec<(Vec<VH>, F)>,
    holes: Vec<Vec<VH>>,
}

impl<V, F> Default for MeshBuilder<V, F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, F> MeshBuilder<V, F> {
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    pub fn with_capacity(nverts: usize, nfaces: usize) -> Self {
        MeshBuilder {
            vertices: Vec::with_capacity(nverts),
            faces: Vec::with_capacity(nfaces),
            holes: Vec::new(),
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn add_vertex(&mut self, payload: V) -> VH {
        let v: VH = (self.vertices.len() as u32).into();
        self.vertices.push(payload);
        v
    }

    /// Add a face with the given winding. Returns the index of the face, which
    /// is also the index of its handle in the built mesh.
    pub fn add_face(&mut self, verts: &[VH], payload: F) -> usize {
        self.faces.push((verts.to_vec(), payload));
        self.faces.len() - 1
    }

    /// Same as [`add_face`](Self::add_face), creating new vertices inline.
    pub fn add_face_with(&mut self, verts: impl IntoIterator<Item = VertexRef<V>>, payload: F) -> usize {
        let verts: Vec<VH> = verts
            .into_iter()
            .map(|vref| match vref {
                VertexRef::Existing(v) => v,
                VertexRef::New(p) => self.add_vertex(p),
            })
            .collect();
        self.faces.push((verts, payload));
        self.faces.len() - 1
    }

    /// Declare a boundary loop explicitly. The loop must run opposite to the
    /// faces around it, i.e. every edge of the hole must be the twin of an
    /// edge of some face. Undeclared holes are inferred.
    pub fn add_hole(&mut self, verts: &[VH]) -> usize {
        self.holes.push(verts.to_vec());
        self.holes.len() - 1
    }

    /// Build the mesh.
    ///
    /// Fails if any face is degenerate, if an edge is shared by more than two
    /// faces, if two faces sharing an edge disagree on its direction, or if
    /// the faces around a vertex do not form a single fan or cycle. Loops of
    /// declared holes are reported as faces, indexed after the last face.
    pub fn build(self) -> Result<Mesh<V, F>, Error> {
        let MeshBuilder {
            vertices,
            faces,
            holes,
        } = self;
        let nverts = vertices.len();
        for (i, (fverts, _)) in faces.iter().enumerate() {
            validate_loop(fverts, nverts, i)?;
        }
        for (i, hverts) in holes.iter().enumerate() {
            validate_loop(hverts, nverts, faces.len() + i)?;
        }
        let mut used = vec![false; nverts];
        for v in faces
            .iter()
            .flat_map(|(fverts, _)| fverts.iter())
            .chain(holes.iter().flatten())
        {
            used[v.index() as usize] = true;
        }
        let ninput = faces
            .iter()
            .map(|(fverts, _)| fverts.len())
            .chain(holes.iter().map(|h| h.len()))
            .sum::<usize>();
        let nfaces = faces.len();
        let nholes = holes.len();
        let mut topol = Topology::with_capacity(nverts, ninput * 2, nfaces);
        for _ in 0..nverts {
            topol.new_vertex();
        }
        // Halfedges of faces and declared holes, in input order.
        let mut dests: Vec<VH> = Vec::with_capacity(ninput);
        let mut fdata = Vec::with_capacity(nfaces);
        for (fverts, payload) in faces {
            let hs = create_loop(&mut topol, &fverts, &mut dests)?;
            let f = topol.new_face(hs[0])?;
            for h in hs {
                topol.set_halfedge_face(h, Some(f))?;
            }
            fdata.push(Some(payload));
        }
        for hverts in &holes {
            create_loop(&mut topol, hverts, &mut dests)?;
        }
        let edges = count_edges(&topol, &dests)?;
        // Pair twins, and pad the boundary with faceless halfedges.
        let mut boundary_out: Vec<Option<HH>> = vec![None; nverts];
        let mut synthesized: Vec<HH> = Vec::new();
        for (i, &b) in dests.iter().enumerate() {
            let h: HH = (i as u32).into();
            let a = topol.origin(h)?;
            let hole = topol.is_boundary_halfedge(h)?;
            match edges.get(&edge_key(a, b)).map(|e| e.as_slice()) {
                Some(&[x, y]) => {
                    if hole && topol.is_boundary_halfedge(if h == x { y } else { x })? {
                        return Err(Error::UnmatchedHoleEdge(a, b));
                    }
                    if h == x {
                        topol.set_twins(x, y)?;
                    }
                }
                _ if hole => return Err(Error::UnmatchedHoleEdge(a, b)),
                _ => {
                    let t = topol.new_halfedge(b)?;
                    topol.set_twins(h, t)?;
                    synthesized.push(t);
                }
            }
            if hole && boundary_out[a.index() as usize].replace(h).is_some() {
                return Err(Error::NonManifoldVertex(a));
            }
        }
        for &t in &synthesized {
            let v = topol.origin(t)?;
            if boundary_out[v.index() as usize].replace(t).is_some() {
                // Two holes meet at this vertex.
                return Err(Error::NonManifoldVertex(v));
            }
        }
        for &t in &synthesized {
            let v = topol.destination(t)?;
            let next = boundary_out[v.index() as usize].ok_or(Error::NonManifoldVertex(v))?;
            if topol.prev(next)? != next {
                return Err(Error::NonManifoldVertex(v));
            }
            topol.link_halfedges(t, next)?;
        }
        // Representatives, preferring the boundary.
        let mut first_out: Vec<Option<HH>> = vec![None; nverts];
        let mut degrees = vec![0usize; nverts];
        for h in topol.halfedges().collect::<Vec<_>>() {
            let vi = topol.origin(h)?.index() as usize;
            degrees[vi] += 1;
            first_out[vi].get_or_insert(h);
        }
        let mut dropped = 0usize;
        for (vi, &used) in used.iter().enumerate() {
            let v: VH = (vi as u32).into();
            if !used {
                topol.delete_vertex(v)?;
                dropped += 1;
                continue;
            }
            topol.set_vertex_halfedge(v, boundary_out[vi].or(first_out[vi]))?;
            if iterator::voh_iter(&topol, v)?.count() != degrees[vi] {
                return Err(Error::NonManifoldVertex(v));
            }
        }
        topol.check()?;
        tracing::debug!(
            vertices = topol.num_vertices(),
            faces = topol.num_faces(),
            edges = topol.num_edges(),
            holes = nholes,
            dropped,
            "Built mesh"
        );
        Ok(Mesh {
            topol,
            vdata: vertices
                .into_iter()
                .zip(used)
                .map(|(payload, used)| used.then_some(payload))
                .collect(),
            fdata,
        })
    }
}

fn validate_loop(verts: &[VH], nverts: usize, index: usize) -> Result<(), Error> {
    if verts.len() < 3 {
        return Err(Error::DegenerateFace(index));
    }
    if let Some(v) = verts.iter().find(|v| v.index() as usize >= nverts) {
        return Err(Error::UnknownVertex(*v));
    }
    let mut sorted = verts.to_vec();
    sorted.sort();
    sorted.dedup();
    if sorted.len() != verts.len() {
        return Err(Error::DegenerateFace(index));
    }
    Ok(())
}

fn edge_key(a: VH, b: VH) -> (VH, VH) {
    if a < b { (a, b) } else { (b, a) }
}

/// Create the halfedges of one loop, linked in order.
fn create_loop(topol: &mut Topology, verts: &[VH], dests: &mut Vec<VH>) -> Result<Vec<HH>, Error> {
    let hs = verts
        .iter()
        .zip(verts.iter().cycle().skip(1))
        .map(|(&a, &b)| {
            dests.push(b);
            topol.new_halfedge(a)
        })
        .collect::<Result<Vec<_>, Error>>()?;
    for (&h, &hn) in hs.iter().zip(hs.iter().cycle().skip(1)) {
        topol.link_halfedges(h, hn)?;
    }
    Ok(hs)
}

/// Group the input halfedges by undirected edge. An edge may have at most two
/// halfedges, running in opposite directions.
fn count_edges(topol: &Topology, dests: &[VH]) -> Result<HashMap<(VH, VH), Vec<HH>>, Error> {
    let mut edges: HashMap<(VH, VH), Vec<HH>> = HashMap::with_capacity(dests.len());
    for (i, &b) in dests.iter().enumerate() {
        let h: HH = (i as u32).into();
        edges.entry(edge_key(topol.origin(h)?, b)).or_default().push(h);
    }
    // Report in input order, so the error does not depend on hashing.
    for (i, &b) in dests.iter().enumerate() {
        let h: HH = (i as u32).into();
        let a = topol.origin(h)?;
        let key = edge_key(a, b);
        match edges.get(&key).map(|e| e.as_slice()) {
            Some(hs) if hs.len() > 2 => return Err(Error::NonManifoldEdge(key.0, key.1)),
            Some(&[x, y]) if topol.origin(x)? == topol.origin(y)? => {
                return Err(Error::InconsistentOrientation(a, b));
            }
            _ => {}
        }
    }
    Ok(edges)
}

impl<V, F> Mesh<V, F> {
    /// Build a mesh from a list of faces, each a list of vertices. Faces get
    /// the default payload.
    pub fn build<I, J>(faces: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = VertexRef<V>>,
        F: Default,
    {
        let mut builder = MeshBuilder::new();
        for face in faces {
            builder.add_face_with(face, F::default());
        }
        builder.build()
    }

    /// Build a mesh from a list of vertex payloads and faces given as indices
    /// into that list.
    pub fn from_indexed<I, J>(vertices: impl IntoIterator<Item = V>, faces: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = J>,
        J: AsRef<[u32]>,
        F: Default,
    {
        let mut builder = MeshBuilder::new();
        for payload in vertices {
            builder.add_vertex(payload);
        }
        let mut fverts: Vec<VH> = Vec::new();
        for face in faces {
            fverts.clear();
            fverts.extend(face.as_ref().iter().map(VH::from));
            builder.add_face(&fverts, F::default());
        }
        builder.build()
    }
}

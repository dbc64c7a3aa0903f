use crate::{
    element::{Handle, FH, HH, VH},
    error::Error,
    iterator,
    topol::{Topology, Touched},
    Mesh,
};

/// Check the links of a single halfedge against its neighbors.
fn check_halfedge(topol: &Topology, h: HH) -> Result<(), Error> {
    let hedge = *topol.halfedge(h)?;
    topol.vertex(hedge.origin)?;
    if let Some(f) = hedge.face {
        topol.face_record(f)?;
    }
    // Twin.
    if hedge.twin == h || topol.twin(hedge.twin)? != h {
        return Err(Error::InvalidTwin(h));
    }
    let dest = topol.origin(hedge.twin)?;
    if dest == hedge.origin {
        return Err(Error::DegenerateHalfedge(h));
    }
    // Connectivity.
    if topol.prev(hedge.next)? != h
        || topol.next(hedge.prev)? != h
        || topol.origin(hedge.next)? != dest
        || topol.destination(hedge.prev)? != hedge.origin
    {
        return Err(Error::InvalidHalfedgeLink(h));
    }
    Ok(())
}

/// Walk the loop containing `h`. The loop must close within the number of
/// halfedges in the mesh and carry the same face all the way around.
fn check_loop(topol: &Topology, h: HH, hvisited: Option<&mut [bool]>) -> Result<usize, Error> {
    let limit = topol.halfedge_capacity();
    let f = topol.face(h)?;
    let mut count = 0usize;
    let mut hvisited = hvisited;
    for hh in iterator::loop_iter(topol, h)?.take(limit + 1) {
        count += 1;
        if count > limit {
            return Err(Error::InvalidLoopTopology(h));
        }
        if topol.face(hh)? != f {
            return Err(Error::InconsistentFaceInLoop(hh));
        }
        if let Some(visited) = hvisited.as_deref_mut() {
            if std::mem::replace(&mut visited[hh.index() as usize], true) {
                return Err(Error::InvalidLoopTopology(hh));
            }
        }
    }
    if f.is_some() && count < 3 {
        return Err(Error::FaceTooSmall(h));
    }
    Ok(count)
}

/// Check the umbrella of outgoing halfedges around a vertex.
fn check_vertex(topol: &Topology, v: VH, hvisited: Option<&mut [bool]>) -> Result<(), Error> {
    let rep = topol.vertex_halfedge(v)?;
    if topol.origin(rep)? != v {
        return Err(Error::InvalidOutgoingHalfedges(v));
    }
    let limit = topol.halfedge_capacity();
    let mut hvisited = hvisited;
    let mut count = 0usize;
    let mut nboundary = 0usize;
    let mut dests: Vec<VH> = Vec::new();
    for h in iterator::voh_iter(topol, v)?.take(limit + 1) {
        count += 1;
        if count > limit || topol.origin(h)? != v {
            return Err(Error::InvalidOutgoingHalfedges(v));
        }
        if topol.is_boundary_halfedge(h)? {
            nboundary += 1;
        }
        dests.push(topol.destination(h)?);
        if let Some(visited) = hvisited.as_deref_mut() {
            if std::mem::replace(&mut visited[h.index() as usize], true) {
                return Err(Error::InvalidOutgoingHalfedges(v));
            }
        }
    }
    if nboundary > 1 {
        return Err(Error::NonManifoldVertex(v));
    }
    if nboundary == 1 && !topol.is_boundary_halfedge(rep)? {
        return Err(Error::OutgoingHalfedgeNotBoundary(v));
    }
    dests.sort();
    if let Some(w) = dests.windows(2).find(|w| w[0] == w[1]) {
        return Err(Error::DuplicateEdge(v, w[0]));
    }
    Ok(())
}

fn check_face(topol: &Topology, f: FH) -> Result<(), Error> {
    let h = topol.face_halfedge(f)?;
    if topol.face(h)? != Some(f) {
        return Err(Error::InvalidFaceHalfedgeLink(f, h));
    }
    check_loop(topol, h, None)?;
    Ok(())
}

impl Topology {
    /// Check the whole topology.
    ///
    /// Every halfedge must be consistently linked to its twin, next and prev,
    /// appear in exactly one loop, and appear in exactly one umbrella around
    /// its origin. Every face must refer to a loop of at least three
    /// halfedges that all carry that face.
    pub fn check(&self) -> Result<(), Error> {
        let mut hvisited = vec![false; self.halfedge_capacity()].into_boxed_slice();
        for h in self.halfedges() {
            check_halfedge(self, h)?;
        }
        for v in self.vertices() {
            check_vertex(self, v, Some(&mut hvisited))?;
        }
        // A halfedge missed by every umbrella means its origin has more than
        // one fan.
        for h in self.halfedges() {
            if !hvisited[h.index() as usize] {
                return Err(Error::NonManifoldVertex(self.origin(h)?));
            }
        }
        hvisited.fill(false);
        for h in self.halfedges() {
            if !hvisited[h.index() as usize] {
                check_loop(self, h, Some(&mut hvisited))?;
            }
        }
        for f in self.faces() {
            check_face(self, f)?;
        }
        Ok(())
    }

    /// Check only the neighborhood touched by an edit.
    pub(crate) fn check_local(&self, touched: &Touched) -> Result<(), Error> {
        let mut verts = touched.vertices.clone();
        for h in &touched.halfedges {
            check_halfedge(self, *h)?;
            check_loop(self, *h, None)?;
            let v = self.origin(*h)?;
            if !iterator::voh_iter(self, v)?
                .take(self.halfedge_capacity())
                .any(|hh| hh == *h)
            {
                return Err(Error::NonManifoldVertex(v));
            }
            verts.push(v);
        }
        verts.sort();
        verts.dedup();
        for v in verts {
            check_vertex(self, v, None)?;
        }
        for f in &touched.faces {
            check_face(self, *f)?;
        }
        Ok(())
    }
}

impl<V, F> Mesh<V, F> {
    /// Check the topology of the mesh.
    ///
    /// This function will return an error if any errors are found in the
    /// topology. A mesh produced by the builder and modified only through the
    /// edit operations always passes.
    pub fn check_topology(&self) -> Result<(), Error> {
        self.topol.check()
    }
}

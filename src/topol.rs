use crate::{
    element::{Edge, Face, Halfedge, Handle, Vertex, FH, HH, VH},
    error::Error,
    iterator,
};

/// Undo log of an edit in progress.
///
/// Every mutation of a record made while the journal is open pushes the
/// previous value of that record. Records allocated after `begin` have no
/// previous value, they are dropped by truncating the arenas on rollback.
#[derive(Default, Clone)]
pub(crate) struct Journal {
    lengths: [usize; 3],
    counts: [usize; 3],
    vertices: Vec<(VH, Option<Vertex>)>,
    halfedges: Vec<(HH, Option<Halfedge>)>,
    faces: Vec<(FH, Option<Face>)>,
}

/// Handles of everything an edit touched, i.e. the neighborhood that needs
/// to be checked before the edit is committed.
#[derive(Default, Debug)]
pub(crate) struct Touched {
    pub(crate) vertices: Vec<VH>,
    pub(crate) halfedges: Vec<HH>,
    pub(crate) faces: Vec<FH>,
}

/// The entity store of a mesh.
///
/// Vertices, halfedges and faces live in arenas indexed by their handles.
/// Deleting an entity leaves a tombstone behind, and handles are never
/// reissued, so a stale handle is always detected instead of silently
/// referring to some other entity.
#[derive(Clone)]
pub struct Topology {
    vertices: Vec<Option<Vertex>>,
    halfedges: Vec<Option<Halfedge>>,
    faces: Vec<Option<Face>>,
    nvertices: usize,
    nhalfedges: usize,
    nfaces: usize,
    journal: Option<Journal>,
}

impl Topology {
    pub fn new() -> Self {
        Self::with_capacity(0, 0, 0)
    }

    pub fn with_capacity(nverts: usize, nhalfedges: usize, nfaces: usize) -> Self {
        Topology {
            vertices: Vec::with_capacity(nverts),
            halfedges: Vec::with_capacity(nhalfedges),
            faces: Vec::with_capacity(nfaces),
            nvertices: 0,
            nhalfedges: 0,
            nfaces: 0,
            journal: None,
        }
    }

    pub(crate) fn vertex(&self, v: VH) -> Result<&Vertex, Error> {
        self.vertices
            .get(v.index() as usize)
            .and_then(|v| v.as_ref())
            .ok_or(Error::InvalidVertex(v))
    }

    pub(crate) fn halfedge(&self, h: HH) -> Result<&Halfedge, Error> {
        self.halfedges
            .get(h.index() as usize)
            .and_then(|h| h.as_ref())
            .ok_or(Error::InvalidHalfedge(h))
    }

    pub(crate) fn face_record(&self, f: FH) -> Result<&Face, Error> {
        self.faces
            .get(f.index() as usize)
            .and_then(|f| f.as_ref())
            .ok_or(Error::InvalidFace(f))
    }

    pub fn is_valid_vertex(&self, v: VH) -> bool {
        self.vertex(v).is_ok()
    }

    pub fn is_valid_halfedge(&self, h: HH) -> bool {
        self.halfedge(h).is_ok()
    }

    pub fn is_valid_face(&self, f: FH) -> bool {
        self.face_record(f).is_ok()
    }

    pub fn vertex_halfedge(&self, v: VH) -> Result<HH, Error> {
        self.vertex(v)?.halfedge.ok_or(Error::IsolatedVertex(v))
    }

    pub fn origin(&self, h: HH) -> Result<VH, Error> {
        Ok(self.halfedge(h)?.origin)
    }

    pub fn destination(&self, h: HH) -> Result<VH, Error> {
        self.origin(self.twin(h)?)
    }

    pub fn twin(&self, h: HH) -> Result<HH, Error> {
        Ok(self.halfedge(h)?.twin)
    }

    pub fn next(&self, h: HH) -> Result<HH, Error> {
        Ok(self.halfedge(h)?.next)
    }

    pub fn prev(&self, h: HH) -> Result<HH, Error> {
        Ok(self.halfedge(h)?.prev)
    }

    pub fn face(&self, h: HH) -> Result<Option<FH>, Error> {
        Ok(self.halfedge(h)?.face)
    }

    pub fn face_halfedge(&self, f: FH) -> Result<HH, Error> {
        Ok(self.face_record(f)?.halfedge)
    }

    pub fn is_boundary_halfedge(&self, h: HH) -> Result<bool, Error> {
        Ok(self.halfedge(h)?.face.is_none())
    }

    pub fn is_boundary_edge(&self, h: HH) -> Result<bool, Error> {
        Ok(self.is_boundary_halfedge(h)? || self.is_boundary_halfedge(self.twin(h)?)?)
    }

    /// A vertex is on the boundary if its outgoing halfedge is. The outgoing
    /// halfedge of a boundary vertex is always kept on the boundary.
    pub fn is_boundary_vertex(&self, v: VH) -> Result<bool, Error> {
        self.is_boundary_halfedge(self.vertex_halfedge(v)?)
    }

    /// The next outgoing halfedge when rotating around the origin of `h`.
    pub fn rotated_halfedge(&self, h: HH) -> Result<HH, Error> {
        self.next(self.twin(h)?)
    }

    /// The previous outgoing halfedge when rotating around the origin of `h`.
    pub fn ccw_rotated_halfedge(&self, h: HH) -> Result<HH, Error> {
        self.twin(self.prev(h)?)
    }

    pub fn num_vertices(&self) -> usize {
        self.nvertices
    }

    pub fn num_halfedges(&self) -> usize {
        self.nhalfedges
    }

    pub fn num_edges(&self) -> usize {
        self.nhalfedges / 2
    }

    pub fn num_faces(&self) -> usize {
        self.nfaces
    }

    /// Number of vertex handles ever issued, including deleted ones.
    pub(crate) fn vertex_capacity(&self) -> usize {
        self.vertices.len()
    }

    pub(crate) fn halfedge_capacity(&self) -> usize {
        self.halfedges.len()
    }

    pub(crate) fn face_capacity(&self) -> usize {
        self.faces.len()
    }

    pub fn vertices(&self) -> impl Iterator<Item = VH> + use<'_> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, v)| v.is_some())
            .map(|(i, _)| (i as u32).into())
    }

    pub fn halfedges(&self) -> impl Iterator<Item = HH> + use<'_> {
        self.halfedges
            .iter()
            .enumerate()
            .filter(|(_, h)| h.is_some())
            .map(|(i, _)| (i as u32).into())
    }

    pub fn faces(&self) -> impl Iterator<Item = FH> + use<'_> {
        self.faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_some())
            .map(|(i, _)| (i as u32).into())
    }

    /// Each edge once, as seen from its smaller halfedge.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + use<'_> {
        self.halfedges
            .iter()
            .enumerate()
            .filter_map(|(i, h)| match h {
                Some(h) if (i as u32) < h.twin.index() => {
                    Some(Edge::new((i as u32).into(), h.twin))
                }
                _ => None,
            })
    }

    pub fn find_halfedge(&self, from: VH, to: VH) -> Result<Option<HH>, Error> {
        for h in iterator::voh_iter(self, from)? {
            if self.destination(h)? == to {
                return Ok(Some(h));
            }
        }
        Ok(None)
    }

    pub fn vertex_degree(&self, v: VH) -> Result<usize, Error> {
        Ok(iterator::voh_iter(self, v)?.count())
    }

    pub fn face_degree(&self, f: FH) -> Result<usize, Error> {
        Ok(iterator::fh_iter(self, f)?.count())
    }

    /// If the vertex has an outgoing boundary halfedge, make it the
    /// representative.
    pub(crate) fn adjust_outgoing_halfedge(&mut self, v: VH) -> Result<(), Error> {
        let mut found = None;
        for h in iterator::voh_iter(self, v)?.take(self.halfedge_capacity()) {
            if self.is_boundary_halfedge(h)? {
                found = Some(h);
                break;
            }
        }
        if let Some(h) = found {
            self.set_vertex_halfedge(v, Some(h))?;
        }
        Ok(())
    }

    // Journal.

    pub(crate) fn begin(&mut self) {
        debug_assert!(self.journal.is_none(), "Nested edits are not supported");
        self.journal = Some(Journal {
            lengths: [self.vertices.len(), self.halfedges.len(), self.faces.len()],
            counts: [self.nvertices, self.nhalfedges, self.nfaces],
            ..Default::default()
        });
    }

    pub(crate) fn commit(&mut self) {
        self.journal = None;
    }

    /// Everything touched since `begin` that is still alive.
    pub(crate) fn touched(&self) -> Touched {
        let mut out = Touched::default();
        if let Some(journal) = &self.journal {
            out.vertices.extend(journal.vertices.iter().map(|(v, _)| *v));
            out.vertices
                .extend((journal.lengths[0]..self.vertices.len()).map(|i| VH::from(i as u32)));
            out.halfedges
                .extend(journal.halfedges.iter().map(|(h, _)| *h));
            out.halfedges
                .extend((journal.lengths[1]..self.halfedges.len()).map(|i| HH::from(i as u32)));
            out.faces.extend(journal.faces.iter().map(|(f, _)| *f));
            out.faces
                .extend((journal.lengths[2]..self.faces.len()).map(|i| FH::from(i as u32)));
        }
        out.vertices.sort();
        out.vertices.dedup();
        out.vertices.retain(|v| self.is_valid_vertex(*v));
        out.halfedges.sort();
        out.halfedges.dedup();
        out.halfedges.retain(|h| self.is_valid_halfedge(*h));
        out.faces.sort();
        out.faces.dedup();
        out.faces.retain(|f| self.is_valid_face(*f));
        out
    }

    pub(crate) fn rollback(&mut self) {
        let Some(journal) = self.journal.take() else {
            return;
        };
        for (v, old) in journal.vertices.into_iter().rev() {
            if let Some(slot) = self.vertices.get_mut(v.index() as usize) {
                *slot = old;
            }
        }
        for (h, old) in journal.halfedges.into_iter().rev() {
            if let Some(slot) = self.halfedges.get_mut(h.index() as usize) {
                *slot = old;
            }
        }
        for (f, old) in journal.faces.into_iter().rev() {
            if let Some(slot) = self.faces.get_mut(f.index() as usize) {
                *slot = old;
            }
        }
        self.vertices.truncate(journal.lengths[0]);
        self.halfedges.truncate(journal.lengths[1]);
        self.faces.truncate(journal.lengths[2]);
        [self.nvertices, self.nhalfedges, self.nfaces] = journal.counts;
    }

    fn record_vertex(&mut self, v: VH) {
        if let Some(journal) = self.journal.as_mut() {
            let i = v.index() as usize;
            if i < journal.lengths[0] {
                journal.vertices.push((v, self.vertices[i]));
            }
        }
    }

    fn record_halfedge(&mut self, h: HH) {
        if let Some(journal) = self.journal.as_mut() {
            let i = h.index() as usize;
            if i < journal.lengths[1] {
                journal.halfedges.push((h, self.halfedges[i]));
            }
        }
    }

    fn record_face(&mut self, f: FH) {
        if let Some(journal) = self.journal.as_mut() {
            let i = f.index() as usize;
            if i < journal.lengths[2] {
                journal.faces.push((f, self.faces[i]));
            }
        }
    }

    fn vertex_mut(&mut self, v: VH) -> Result<&mut Vertex, Error> {
        self.vertex(v)?;
        self.record_vertex(v);
        self.vertices[v.index() as usize]
            .as_mut()
            .ok_or(Error::InvalidVertex(v))
    }

    fn halfedge_mut(&mut self, h: HH) -> Result<&mut Halfedge, Error> {
        self.halfedge(h)?;
        self.record_halfedge(h);
        self.halfedges[h.index() as usize]
            .as_mut()
            .ok_or(Error::InvalidHalfedge(h))
    }

    fn face_mut(&mut self, f: FH) -> Result<&mut Face, Error> {
        self.face_record(f)?;
        self.record_face(f);
        self.faces[f.index() as usize]
            .as_mut()
            .ok_or(Error::InvalidFace(f))
    }

    // Creation.

    pub(crate) fn new_vertex(&mut self) -> VH {
        let vi = self.vertices.len() as u32;
        self.vertices.push(Some(Vertex { halfedge: None }));
        self.nvertices += 1;
        vi.into()
    }

    /// Create a halfedge starting at `origin`. All its links point back to
    /// itself until they are filled in by the caller.
    pub(crate) fn new_halfedge(&mut self, origin: VH) -> Result<HH, Error> {
        self.vertex(origin)?;
        let h: HH = (self.halfedges.len() as u32).into();
        self.halfedges.push(Some(Halfedge {
            face: None,
            origin,
            twin: h,
            next: h,
            prev: h,
        }));
        self.nhalfedges += 1;
        Ok(h)
    }

    /// Create a pair of twin halfedges, `from -> to` and `to -> from`.
    pub(crate) fn new_edge(&mut self, from: VH, to: VH) -> Result<(HH, HH), Error> {
        let h = self.new_halfedge(from)?;
        let oh = self.new_halfedge(to)?;
        self.set_twins(h, oh)?;
        Ok((h, oh))
    }

    pub(crate) fn new_face(&mut self, halfedge: HH) -> Result<FH, Error> {
        self.halfedge(halfedge)?;
        let fi = self.faces.len() as u32;
        self.faces.push(Some(Face { halfedge }));
        self.nfaces += 1;
        Ok(fi.into())
    }

    // Mutation.

    pub(crate) fn set_vertex_halfedge(&mut self, v: VH, h: Option<HH>) -> Result<(), Error> {
        self.vertex_mut(v)?.halfedge = h;
        Ok(())
    }

    pub(crate) fn set_face_halfedge(&mut self, f: FH, h: HH) -> Result<(), Error> {
        self.face_mut(f)?.halfedge = h;
        Ok(())
    }

    pub(crate) fn set_halfedge_face(&mut self, h: HH, f: Option<FH>) -> Result<(), Error> {
        self.halfedge_mut(h)?.face = f;
        Ok(())
    }

    pub(crate) fn set_halfedge_origin(&mut self, h: HH, v: VH) -> Result<(), Error> {
        self.vertex(v)?;
        self.halfedge_mut(h)?.origin = v;
        Ok(())
    }

    pub(crate) fn set_twins(&mut self, a: HH, b: HH) -> Result<(), Error> {
        self.halfedge_mut(a)?.twin = b;
        self.halfedge_mut(b)?.twin = a;
        Ok(())
    }

    pub(crate) fn link_halfedges(&mut self, hprev: HH, hnext: HH) -> Result<(), Error> {
        self.halfedge_mut(hprev)?.next = hnext;
        self.halfedge_mut(hnext)?.prev = hprev;
        Ok(())
    }

    /// Point all the links of `h` back at itself, so it no longer references
    /// any other entity.
    pub(crate) fn detach_halfedge(&mut self, h: HH) -> Result<(), Error> {
        let hedge = self.halfedge_mut(h)?;
        hedge.twin = h;
        hedge.next = h;
        hedge.prev = h;
        hedge.face = None;
        Ok(())
    }

    // Deletion.

    /// Some live entity whose fields refer to `v`, found by scanning the whole
    /// store.
    pub(crate) fn vertex_referrer(&self, v: VH) -> Option<String> {
        self.halfedges()
            .find(|h| matches!(self.halfedge(*h), Ok(hedge) if hedge.origin == v))
            .map(|h| h.to_string())
    }

    /// Some live entity other than `h` whose fields refer to `h`, found by
    /// scanning the whole store.
    pub(crate) fn halfedge_referrer(&self, h: HH) -> Option<String> {
        self.halfedges()
            .filter(|o| *o != h)
            .find(|o| {
                matches!(self.halfedge(*o), Ok(hedge)
                    if hedge.twin == h || hedge.next == h || hedge.prev == h)
            })
            .map(|o| o.to_string())
            .or_else(|| {
                self.vertices()
                    .find(|v| matches!(self.vertex(*v), Ok(vert) if vert.halfedge == Some(h)))
                    .map(|v| v.to_string())
            })
            .or_else(|| {
                self.faces()
                    .find(|f| matches!(self.face_record(*f), Ok(face) if face.halfedge == h))
                    .map(|f| f.to_string())
            })
    }

    /// Some live halfedge that carries `f`, found by scanning the whole store.
    pub(crate) fn face_referrer(&self, f: FH) -> Option<String> {
        self.halfedges()
            .find(|h| matches!(self.halfedge(*h), Ok(hedge) if hedge.face == Some(f)))
            .map(|h| h.to_string())
    }

    pub(crate) fn delete_vertex(&mut self, v: VH) -> Result<(), Error> {
        if let Some(h) = self.vertex(v)?.halfedge {
            if matches!(self.halfedge(h), Ok(hedge) if hedge.origin == v) {
                return Err(Error::DanglingReference {
                    entity: v.to_string(),
                    referrer: h.to_string(),
                });
            }
        }
        self.record_vertex(v);
        self.vertices[v.index() as usize] = None;
        self.nvertices -= 1;
        Ok(())
    }

    pub(crate) fn delete_halfedge(&mut self, h: HH) -> Result<(), Error> {
        let hedge = *self.halfedge(h)?;
        let referrer = if hedge.twin != h
            && matches!(self.halfedge(hedge.twin), Ok(t) if t.twin == h)
        {
            Some(hedge.twin.to_string())
        } else if hedge.next != h && matches!(self.halfedge(hedge.next), Ok(n) if n.prev == h) {
            Some(hedge.next.to_string())
        } else if hedge.prev != h && matches!(self.halfedge(hedge.prev), Ok(p) if p.next == h) {
            Some(hedge.prev.to_string())
        } else if matches!(self.vertex(hedge.origin), Ok(v) if v.halfedge == Some(h)) {
            Some(hedge.origin.to_string())
        } else {
            hedge
                .face
                .filter(|f| matches!(self.face_record(*f), Ok(face) if face.halfedge == h))
                .map(|f| f.to_string())
        };
        if let Some(referrer) = referrer {
            return Err(Error::DanglingReference {
                entity: h.to_string(),
                referrer,
            });
        }
        self.record_halfedge(h);
        self.halfedges[h.index() as usize] = None;
        self.nhalfedges -= 1;
        Ok(())
    }

    pub(crate) fn delete_face(&mut self, f: FH) -> Result<(), Error> {
        let h = self.face_record(f)?.halfedge;
        if matches!(self.halfedge(h), Ok(hedge) if hedge.face == Some(f)) {
            return Err(Error::DanglingReference {
                entity: f.to_string(),
                referrer: h.to_string(),
            });
        }
        self.record_face(f);
        self.faces[f.index() as usize] = None;
        self.nfaces -= 1;
        Ok(())
    }
}

impl Default for Topology {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::Topology;
    use crate::{element::Handle, error::Error, Edge, FH, HH, VH};

    /// A single triangle with its boundary loop, wired by hand.
    pub(crate) fn triangle() -> Topology {
        let mut topol = Topology::default();
        let verts: Vec<VH> = (0..3).map(|_| topol.new_vertex()).collect();
        let inner: Vec<HH> = (0..3)
            .map(|i| {
                let (h, oh) = topol
                    .new_edge(verts[i], verts[(i + 1) % 3])
                    .expect("Cannot create edge");
                topol.set_vertex_halfedge(verts[(i + 1) % 3], Some(oh)).unwrap();
                h
            })
            .collect();
        let face = topol.new_face(inner[0]).expect("Cannot create face");
        for i in 0..3 {
            let h = inner[i];
            let hn = inner[(i + 1) % 3];
            topol.link_halfedges(h, hn).unwrap();
            topol.set_halfedge_face(h, Some(face)).unwrap();
            let oh = topol.twin(h).unwrap();
            let ohn = topol.twin(hn).unwrap();
            topol.link_halfedges(ohn, oh).unwrap();
        }
        topol
    }

    #[test]
    fn t_triangle() {
        let topol = triangle();
        assert_eq!(topol.num_vertices(), 3);
        assert_eq!(topol.num_halfedges(), 6);
        assert_eq!(topol.num_edges(), 3);
        assert_eq!(topol.num_faces(), 1);
        for v in topol.vertices() {
            let h = topol.vertex_halfedge(v).expect("Vertex must have a halfedge");
            assert!(topol.is_boundary_halfedge(h).unwrap());
            assert_eq!(topol.origin(h).unwrap(), v);
            assert!(topol.is_boundary_vertex(v).unwrap());
        }
        assert_eq!(
            topol
                .halfedges()
                .filter(|h| topol.is_boundary_halfedge(*h).unwrap())
                .count(),
            3
        );
        let edges: Vec<Edge> = topol.edges().collect();
        assert_eq!(edges.len(), 3);
        assert!(edges.iter().all(|e| e.first() < e.second()));
        topol.check().expect("Topology is invalid");
    }

    #[test]
    fn t_invalid_handles() {
        let topol = triangle();
        assert_eq!(topol.next(42.into()), Err(Error::InvalidHalfedge(42.into())));
        assert_eq!(
            topol.vertex_halfedge(7.into()),
            Err(Error::InvalidVertex(7.into()))
        );
        assert_eq!(
            topol.face_halfedge(FH::from(1)),
            Err(Error::InvalidFace(1.into()))
        );
    }

    #[test]
    fn t_delete_referenced() {
        let mut topol = triangle();
        // Everything in a valid mesh is referenced by something.
        for v in topol.vertices().collect::<Vec<_>>() {
            assert!(matches!(
                topol.delete_vertex(v),
                Err(Error::DanglingReference { .. })
            ));
        }
        for h in topol.halfedges().collect::<Vec<_>>() {
            assert!(matches!(
                topol.delete_halfedge(h),
                Err(Error::DanglingReference { .. })
            ));
        }
        assert!(matches!(
            topol.delete_face(0.into()),
            Err(Error::DanglingReference { .. })
        ));
        topol.check().expect("Topology must be unchanged");
    }

    #[test]
    fn t_delete_detached() {
        let mut topol = Topology::default();
        let a = topol.new_vertex();
        let b = topol.new_vertex();
        let (h, oh) = topol.new_edge(a, b).unwrap();
        // The twin still refers to h.
        assert!(topol.delete_halfedge(h).is_err());
        topol.detach_halfedge(h).unwrap();
        topol.detach_halfedge(oh).unwrap();
        topol.delete_halfedge(h).expect("Cannot delete halfedge");
        topol.delete_halfedge(oh).expect("Cannot delete halfedge");
        assert_eq!(topol.num_halfedges(), 0);
        assert_eq!(topol.origin(h), Err(Error::InvalidHalfedge(h)));
        assert_eq!(topol.delete_halfedge(h), Err(Error::InvalidHalfedge(h)));
        // Handles are not reissued.
        let c = topol.new_vertex();
        assert_eq!(c.index(), 2);
        topol.delete_vertex(a).expect("Cannot delete vertex");
        assert!(!topol.is_valid_vertex(a));
        assert!(topol.is_valid_vertex(b));
    }

    #[test]
    fn t_rollback() {
        let mut topol = triangle();
        let before: Vec<_> = topol
            .halfedges()
            .map(|h| *topol.halfedge(h).unwrap())
            .collect();
        topol.begin();
        let v = topol.new_vertex();
        let h = topol.vertex_halfedge(0.into()).unwrap();
        let (a, b) = topol.new_edge(0.into(), v).unwrap();
        topol.set_vertex_halfedge(0.into(), Some(a)).unwrap();
        topol.link_halfedges(topol.prev(h).unwrap(), a).unwrap();
        topol.link_halfedges(a, b).unwrap();
        topol.link_halfedges(b, h).unwrap();
        let touched = topol.touched();
        assert!(touched.vertices.contains(&v));
        assert!(touched.halfedges.contains(&a));
        topol.rollback();
        assert_eq!(topol.num_vertices(), 3);
        assert_eq!(topol.num_halfedges(), 6);
        assert!(!topol.is_valid_vertex(v));
        let after: Vec<_> = topol
            .halfedges()
            .map(|h| *topol.halfedge(h).unwrap())
            .collect();
        assert_eq!(before, after);
        topol.check().expect("Topology must be unchanged");
    }
}

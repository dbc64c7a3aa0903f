use crate::{
    element::{Handle, FH, HH, VH},
    error::Error,
    iterator,
    topol::Topology,
    Mesh,
};

impl<V, F> Mesh<V, F> {
    /// Run `op` as a single edit. If `op` fails, or leaves the neighborhood it
    /// touched invalid, every change it made is undone.
    pub(crate) fn edit<T>(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&mut Topology) -> Result<T, Error>,
    ) -> Result<T, Error> {
        self.topol.begin();
        let result = op(&mut self.topol).and_then(|out| {
            self.topol.check_local(&self.topol.touched())?;
            Ok(out)
        });
        match result {
            Ok(out) => {
                self.topol.commit();
                Ok(out)
            }
            Err(e) => {
                self.topol.rollback();
                tracing::warn!(error = %e, "Rolled back {name}");
                Err(e)
            }
        }
    }

    fn sync_payloads(&mut self) {
        self.vdata.resize_with(self.topol.vertex_capacity(), || None);
        self.fdata.resize_with(self.topol.face_capacity(), || None);
    }

    /// Insert a new vertex with `payload` in the middle of the edge of `h`.
    ///
    /// The halfedges of the old edge are deleted and replaced by two new
    /// edges. Returns the new vertex, and the new halfedges from the origin of
    /// `h` to the new vertex, and from the new vertex to the destination of
    /// `h`, in that order.
    ///
    /// ```text
    ///      a ------ h -----> b
    ///
    ///      a -- h1 --> m -- h2 --> b
    /// ```
    pub fn split_edge(&mut self, h: HH, payload: V) -> Result<(VH, HH, HH), Error> {
        let t = self.topol.twin(h)?;
        let (a, b) = (self.topol.origin(h)?, self.topol.origin(t)?);
        let (f1, f2) = (self.topol.face(h)?, self.topol.face(t)?);
        let (hp, hn) = (self.topol.prev(h)?, self.topol.next(h)?);
        let (tp, tn) = (self.topol.prev(t)?, self.topol.next(t)?);
        let (m, h1, h2) = self.edit("split_edge", |topol| {
            let m = topol.new_vertex();
            let (h1, t2) = topol.new_edge(a, m)?;
            let (h2, t1) = topol.new_edge(m, b)?;
            topol.link_halfedges(hp, h1)?;
            topol.link_halfedges(h1, h2)?;
            topol.link_halfedges(h2, hn)?;
            topol.link_halfedges(tp, t1)?;
            topol.link_halfedges(t1, t2)?;
            topol.link_halfedges(t2, tn)?;
            topol.set_halfedge_face(h1, f1)?;
            topol.set_halfedge_face(h2, f1)?;
            topol.set_halfedge_face(t1, f2)?;
            topol.set_halfedge_face(t2, f2)?;
            topol.set_vertex_halfedge(m, Some(if f1.is_none() || f2.is_some() { h2 } else { t2 }))?;
            if topol.vertex_halfedge(a)? == h {
                topol.set_vertex_halfedge(a, Some(h1))?;
            }
            if topol.vertex_halfedge(b)? == t {
                topol.set_vertex_halfedge(b, Some(t1))?;
            }
            if let Some(f) = f1 {
                if topol.face_halfedge(f)? == h {
                    topol.set_face_halfedge(f, h1)?;
                }
            }
            if let Some(f) = f2 {
                if topol.face_halfedge(f)? == t {
                    topol.set_face_halfedge(f, t1)?;
                }
            }
            topol.detach_halfedge(h)?;
            topol.detach_halfedge(t)?;
            topol.delete_halfedge(h)?;
            topol.delete_halfedge(t)?;
            Ok((m, h1, h2))
        })?;
        self.sync_payloads();
        self.vdata[m.index() as usize] = Some(payload);
        tracing::trace!(?h, ?m, "Split edge");
        Ok((m, h1, h2))
    }

    /// Remove a vertex with exactly two edges, joining its neighbors with a
    /// single edge. This is the inverse of [`split_edge`](Self::split_edge).
    ///
    /// Returns the new halfedge and the payload of the removed vertex. The new
    /// halfedge bounds the same face as the halfedge that enters `v` along
    /// with the representative halfedge of `v`.
    pub fn remove_vertex(&mut self, v: VH) -> Result<(HH, V), Error> {
        let degree = self.topol.vertex_degree(v)?;
        if degree != 2 {
            return Err(Error::DegreeMismatch { vertex: v, degree });
        }
        // x1: a -> v, x2: v -> b, on one side.
        // y1: b -> v, y2: v -> a, on the other side.
        let x2 = self.topol.vertex_halfedge(v)?;
        let y1 = self.topol.twin(x2)?;
        let y2 = self.topol.next(y1)?;
        let x1 = self.topol.twin(y2)?;
        let (a, b) = (self.topol.destination(y2)?, self.topol.destination(x2)?);
        if self.topol.find_halfedge(a, b)?.is_some() {
            return Err(Error::DuplicateEdge(a, b));
        }
        let (f1, f2) = (self.topol.face(x1)?, self.topol.face(y1)?);
        for (f, h) in [(f1, x1), (f2, y1)] {
            if let Some(f) = f {
                if self.topol.face_degree(f)? <= 3 {
                    return Err(Error::FaceTooSmall(h));
                }
            }
        }
        let (xp, xn) = (self.topol.prev(x1)?, self.topol.next(x2)?);
        let (yp, yn) = (self.topol.prev(y1)?, self.topol.next(y2)?);
        let n = self.edit("remove_vertex", |topol| {
            let (n, nt) = topol.new_edge(a, b)?;
            topol.link_halfedges(xp, n)?;
            topol.link_halfedges(n, xn)?;
            topol.link_halfedges(yp, nt)?;
            topol.link_halfedges(nt, yn)?;
            topol.set_halfedge_face(n, f1)?;
            topol.set_halfedge_face(nt, f2)?;
            if topol.vertex_halfedge(a)? == x1 {
                topol.set_vertex_halfedge(a, Some(n))?;
            }
            if topol.vertex_halfedge(b)? == y1 {
                topol.set_vertex_halfedge(b, Some(nt))?;
            }
            if let Some(f) = f1 {
                if matches!(topol.face_halfedge(f)?, h if h == x1 || h == x2) {
                    topol.set_face_halfedge(f, n)?;
                }
            }
            if let Some(f) = f2 {
                if matches!(topol.face_halfedge(f)?, h if h == y1 || h == y2) {
                    topol.set_face_halfedge(f, nt)?;
                }
            }
            topol.set_vertex_halfedge(v, None)?;
            for h in [x1, x2, y1, y2] {
                topol.detach_halfedge(h)?;
            }
            for h in [x1, x2, y1, y2] {
                topol.delete_halfedge(h)?;
            }
            topol.delete_vertex(v)?;
            Ok(n)
        })?;
        let payload = self
            .vdata
            .get_mut(v.index() as usize)
            .and_then(Option::take)
            .ok_or(Error::InvalidVertex(v))?;
        tracing::trace!(?v, ?n, "Removed vertex");
        Ok((n, payload))
    }

    /// Split `f` in two with a new edge from the origin of `ha` to the origin
    /// of `hb`. Both halfedges must bound `f` and must not be adjacent.
    ///
    /// `f` keeps the loop containing `hb`, and a new face with `payload` gets
    /// the loop containing `ha`. Returns the new face, and the new halfedge
    /// running from the origin of `ha` to the origin of `hb`, which bounds
    /// `f`.
    pub fn split_face(&mut self, f: FH, ha: HH, hb: HH, payload: F) -> Result<(FH, HH), Error> {
        self.topol.face_halfedge(f)?;
        for h in [ha, hb] {
            if self.topol.face(h)? != Some(f) {
                return Err(Error::NotOnFace { halfedge: h, face: f });
            }
        }
        if ha == hb || self.topol.next(ha)? == hb || self.topol.next(hb)? == ha {
            return Err(Error::DegenerateSplit(ha, hb));
        }
        let (va, vb) = (self.topol.origin(ha)?, self.topol.origin(hb)?);
        if self.topol.find_halfedge(va, vb)?.is_some() {
            return Err(Error::DuplicateEdge(va, vb));
        }
        let (pa, pb) = (self.topol.prev(ha)?, self.topol.prev(hb)?);
        let (g, n) = self.edit("split_face", |topol| {
            let (n, nt) = topol.new_edge(va, vb)?;
            topol.link_halfedges(pa, n)?;
            topol.link_halfedges(n, hb)?;
            topol.link_halfedges(pb, nt)?;
            topol.link_halfedges(nt, ha)?;
            topol.set_halfedge_face(n, Some(f))?;
            topol.set_face_halfedge(f, n)?;
            let g = topol.new_face(nt)?;
            let hs: Vec<HH> = iterator::loop_iter(topol, nt)?
                .take(topol.halfedge_capacity())
                .collect();
            for h in hs {
                topol.set_halfedge_face(h, Some(g))?;
            }
            Ok((g, n))
        })?;
        self.sync_payloads();
        self.fdata[g.index() as usize] = Some(payload);
        tracing::trace!(?f, ?g, ?n, "Split face");
        Ok((g, n))
    }

    /// Same as [`split_face`](Self::split_face), with the new edge given by
    /// its two end points. Both must be corners of `f`.
    pub fn split_face_at_vertices(
        &mut self,
        f: FH,
        va: VH,
        vb: VH,
        payload: F,
    ) -> Result<(FH, HH), Error> {
        let find = |v: VH| -> Result<HH, Error> {
            self.topol.vertex(v)?;
            iterator::fh_iter(&self.topol, f)?
                .find(|h| matches!(self.topol.origin(*h), Ok(o) if o == v))
                .ok_or(Error::VertexNotOnFace { vertex: v, face: f })
        };
        let (ha, hb) = (find(va)?, find(vb)?);
        self.split_face(f, ha, hb, payload)
    }

    /// Remove the edge of `h`, merging the faces on either side of it.
    ///
    /// The face of `h` survives, the face on the other side is deleted and its
    /// payload is returned along with the surviving face. This is the inverse
    /// of [`split_face`](Self::split_face).
    pub fn merge_faces(&mut self, h: HH) -> Result<(FH, F), Error> {
        let t = self.topol.twin(h)?;
        let fa = self.topol.face(h)?.ok_or(Error::BoundaryHalfedge(h))?;
        let fb = self.topol.face(t)?.ok_or(Error::BoundaryHalfedge(t))?;
        if fa == fb {
            return Err(Error::NonSimpleMerge(fa, fb));
        }
        let (a, b) = (self.topol.origin(h)?, self.topol.origin(t)?);
        for v in [a, b] {
            let degree = self.topol.vertex_degree(v)?;
            if degree < 3 {
                return Err(Error::DegreeMismatch { vertex: v, degree });
            }
        }
        let avs: Vec<VH> = iterator::fv_iter(&self.topol, fa)?.collect();
        for v in iterator::fv_iter(&self.topol, fb)? {
            if v != a && v != b && avs.contains(&v) {
                return Err(Error::NonSimpleMerge(fa, fb));
            }
        }
        let bhs: Vec<HH> = iterator::fh_iter(&self.topol, fb)?
            .filter(|bh| *bh != t)
            .collect();
        let (hp, hn) = (self.topol.prev(h)?, self.topol.next(h)?);
        let (tp, tn) = (self.topol.prev(t)?, self.topol.next(t)?);
        self.edit("merge_faces", |topol| {
            topol.link_halfedges(hp, tn)?;
            topol.link_halfedges(tp, hn)?;
            for bh in bhs {
                topol.set_halfedge_face(bh, Some(fa))?;
            }
            if topol.vertex_halfedge(a)? == h {
                topol.set_vertex_halfedge(a, Some(tn))?;
            }
            if topol.vertex_halfedge(b)? == t {
                topol.set_vertex_halfedge(b, Some(hn))?;
            }
            if topol.face_halfedge(fa)? == h {
                topol.set_face_halfedge(fa, hn)?;
            }
            topol.detach_halfedge(h)?;
            topol.detach_halfedge(t)?;
            topol.delete_halfedge(h)?;
            topol.delete_halfedge(t)?;
            topol.delete_face(fb)
        })?;
        let payload = self
            .fdata
            .get_mut(fb.index() as usize)
            .and_then(Option::take)
            .ok_or(Error::InvalidFace(fb))?;
        tracing::trace!(?h, ?fa, ?fb, "Merged faces");
        Ok((fa, payload))
    }

    /// Flip the edge of `h`, shared by two triangles, to connect the two
    /// vertices opposite to it. `h` is reused for the flipped edge and
    /// returned.
    ///
    /// ```text
    ///         c                   c
    ///       /   \               / | \
    ///      a --h-> b    =>     a  h  b
    ///       \   /               \ | /
    ///         d                   d
    /// ```
    pub fn flip_edge(&mut self, h: HH) -> Result<HH, Error> {
        let t = self.topol.twin(h)?;
        let f1 = self.topol.face(h)?.ok_or(Error::BoundaryHalfedge(h))?;
        let f2 = self.topol.face(t)?.ok_or(Error::BoundaryHalfedge(t))?;
        for f in [f1, f2] {
            if self.topol.face_degree(f)? != 3 {
                return Err(Error::NotATriangle(f));
            }
        }
        // h: a -> b, h1: b -> c, h2: c -> a.
        // t: b -> a, t1: a -> d, t2: d -> b.
        let h1 = self.topol.next(h)?;
        let h2 = self.topol.next(h1)?;
        let t1 = self.topol.next(t)?;
        let t2 = self.topol.next(t1)?;
        let (a, b) = (self.topol.origin(h)?, self.topol.origin(t)?);
        let (c, d) = (self.topol.origin(h2)?, self.topol.origin(t2)?);
        if c == d || self.topol.find_halfedge(c, d)?.is_some() {
            return Err(Error::DuplicateEdge(c, d));
        }
        self.edit("flip_edge", |topol| {
            topol.set_halfedge_origin(h, d)?;
            topol.set_halfedge_origin(t, c)?;
            // f1: d -> c -> a -> d.
            topol.link_halfedges(h, h2)?;
            topol.link_halfedges(h2, t1)?;
            topol.link_halfedges(t1, h)?;
            // f2: c -> d -> b -> c.
            topol.link_halfedges(t, t2)?;
            topol.link_halfedges(t2, h1)?;
            topol.link_halfedges(h1, t)?;
            topol.set_halfedge_face(t1, Some(f1))?;
            topol.set_halfedge_face(h1, Some(f2))?;
            topol.set_face_halfedge(f1, h)?;
            topol.set_face_halfedge(f2, t)?;
            if topol.vertex_halfedge(a)? == h {
                topol.set_vertex_halfedge(a, Some(t1))?;
            }
            if topol.vertex_halfedge(b)? == t {
                topol.set_vertex_halfedge(b, Some(h1))?;
            }
            Ok(())
        })?;
        tracing::trace!(?h, ?c, ?d, "Flipped edge");
        Ok(h)
    }

    /// Remove a face, leaving a hole in its place, and return its payload.
    ///
    /// Edges of `f` that already bordered a hole are deleted, so the new hole
    /// joins the holes around it. Corners left without any edge are deleted
    /// along with their payloads. Fails with [`Error::PinchedVertex`] when a
    /// corner of `f` already lies on a hole that does not share an edge with
    /// `f`, since that corner would end up between two holes.
    pub fn remove_face(&mut self, f: FH) -> Result<F, Error> {
        let hs: Vec<HH> = iterator::fh_iter(&self.topol, f)?.collect();
        let mut open = Vec::with_capacity(hs.len());
        for &h in &hs {
            open.push(self.topol.is_boundary_halfedge(self.topol.twin(h)?)?);
        }
        for (i, &h) in hs.iter().enumerate() {
            // The edge entering this corner is the previous one in the loop.
            let before = open[(i + hs.len() - 1) % hs.len()];
            let v = self.topol.origin(h)?;
            if !open[i] && !before && self.topol.is_boundary_vertex(v)? {
                return Err(Error::PinchedVertex { face: f, vertex: v });
            }
        }
        let corners: Vec<VH> = hs
            .iter()
            .map(|h| self.topol.origin(*h))
            .collect::<Result<_, Error>>()?;
        let isolated = self.edit("remove_face", |topol| {
            for &h in &hs {
                topol.set_halfedge_face(h, None)?;
            }
            topol.delete_face(f)?;
            for (&h, _) in hs.iter().zip(&open).filter(|(_, open)| **open) {
                let t = topol.twin(h)?;
                let (a, b) = (topol.origin(h)?, topol.origin(t)?);
                let (hp, hn) = (topol.prev(h)?, topol.next(h)?);
                let (tp, tn) = (topol.prev(t)?, topol.next(t)?);
                let a_out = if tn == h {
                    None
                } else {
                    topol.link_halfedges(hp, tn)?;
                    Some(tn)
                };
                let b_out = if hn == t {
                    None
                } else {
                    topol.link_halfedges(tp, hn)?;
                    Some(hn)
                };
                if topol.vertex_halfedge(a).ok() == Some(h) || a_out.is_none() {
                    topol.set_vertex_halfedge(a, a_out)?;
                }
                if topol.vertex_halfedge(b).ok() == Some(t) || b_out.is_none() {
                    topol.set_vertex_halfedge(b, b_out)?;
                }
                topol.detach_halfedge(h)?;
                topol.detach_halfedge(t)?;
                topol.delete_halfedge(h)?;
                topol.delete_halfedge(t)?;
            }
            // Every surviving corner now has exactly one outgoing boundary
            // halfedge, which becomes its representative.
            let mut isolated = Vec::new();
            for &v in &corners {
                if !topol.is_valid_vertex(v) {
                    continue;
                }
                if topol.vertex(v)?.halfedge.is_none() {
                    topol.delete_vertex(v)?;
                    isolated.push(v);
                    continue;
                }
                topol.adjust_outgoing_halfedge(v)?;
            }
            Ok(isolated)
        })?;
        for v in &isolated {
            if let Some(slot) = self.vdata.get_mut(v.index() as usize) {
                *slot = None;
            }
        }
        let payload = self
            .fdata
            .get_mut(f.index() as usize)
            .and_then(Option::take)
            .ok_or(Error::InvalidFace(f))?;
        tracing::trace!(?f, removed_vertices = isolated.len(), "Removed face");
        Ok(payload)
    }
}

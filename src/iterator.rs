use crate::{
    element::{FH, HH, VH},
    error::Error,
    topol::Topology,
};

/// Rotates around the origin of the starting halfedge. `ROTATE_NEXT` walks
/// `twin -> next`, otherwise `prev -> twin` is used, i.e. the opposite
/// direction.
struct OutgoingHalfedgeIter<'a, const ROTATE_NEXT: bool> {
    topol: &'a Topology,
    hstart: HH,
    hcurrent: Option<HH>,
}

impl Iterator for OutgoingHalfedgeIter<'_, true> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        self.hcurrent = self
            .topol
            .rotated_halfedge(current)
            .ok()
            .filter(|next| *next != self.hstart);
        Some(current)
    }
}

impl Iterator for OutgoingHalfedgeIter<'_, false> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        self.hcurrent = self
            .topol
            .ccw_rotated_halfedge(current)
            .ok()
            .filter(|next| *next != self.hstart);
        Some(current)
    }
}

/// Walks a loop of halfedges. Forward follows `next`, otherwise `prev`.
struct LoopHalfedgeIter<'a, const FORWARD: bool> {
    topol: &'a Topology,
    hstart: HH,
    hcurrent: Option<HH>,
}

impl Iterator for LoopHalfedgeIter<'_, true> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        self.hcurrent = self
            .topol
            .next(current)
            .ok()
            .filter(|next| *next != self.hstart);
        Some(current)
    }
}

impl Iterator for LoopHalfedgeIter<'_, false> {
    type Item = HH;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.hcurrent?;
        self.hcurrent = self
            .topol
            .prev(current)
            .ok()
            .filter(|prev| *prev != self.hstart);
        Some(current)
    }
}

/// Outgoing halfedges of `v`, starting at its representative and rotating
/// with `twin -> next`. For a boundary vertex the first item is its outgoing
/// boundary halfedge.
pub(crate) fn voh_iter(topol: &Topology, v: VH) -> Result<impl Iterator<Item = HH> + use<'_>, Error> {
    let h = topol.vertex_halfedge(v)?;
    Ok(OutgoingHalfedgeIter::<true> {
        topol,
        hstart: h,
        hcurrent: Some(h),
    })
}

/// Same as `voh_iter`, but rotating in the opposite direction.
pub(crate) fn voh_ccw_iter(
    topol: &Topology,
    v: VH,
) -> Result<impl Iterator<Item = HH> + use<'_>, Error> {
    let h = topol.vertex_halfedge(v)?;
    Ok(OutgoingHalfedgeIter::<false> {
        topol,
        hstart: h,
        hcurrent: Some(h),
    })
}

pub(crate) fn vih_iter(topol: &Topology, v: VH) -> Result<impl Iterator<Item = HH> + use<'_>, Error> {
    Ok(voh_iter(topol, v)?.filter_map(|h| topol.twin(h).ok()))
}

pub(crate) fn vv_iter(topol: &Topology, v: VH) -> Result<impl Iterator<Item = VH> + use<'_>, Error> {
    Ok(voh_iter(topol, v)?.filter_map(|h| topol.destination(h).ok()))
}

pub(crate) fn vf_iter(topol: &Topology, v: VH) -> Result<impl Iterator<Item = FH> + use<'_>, Error> {
    Ok(voh_iter(topol, v)?.filter_map(|h| topol.face(h).ok().flatten()))
}

/// The loop containing `h`, following `next`. Works for faces and holes.
pub(crate) fn loop_iter(topol: &Topology, h: HH) -> Result<impl Iterator<Item = HH> + use<'_>, Error> {
    topol.halfedge(h)?;
    Ok(LoopHalfedgeIter::<true> {
        topol,
        hstart: h,
        hcurrent: Some(h),
    })
}

pub(crate) fn loop_rev_iter(
    topol: &Topology,
    h: HH,
) -> Result<impl Iterator<Item = HH> + use<'_>, Error> {
    topol.halfedge(h)?;
    Ok(LoopHalfedgeIter::<false> {
        topol,
        hstart: h,
        hcurrent: Some(h),
    })
}

pub(crate) fn fh_iter(topol: &Topology, f: FH) -> Result<impl Iterator<Item = HH> + use<'_>, Error> {
    loop_iter(topol, topol.face_halfedge(f)?)
}

/// Vertices of `f` in winding order, starting at the origin of its
/// representative halfedge.
pub(crate) fn fv_iter(topol: &Topology, f: FH) -> Result<impl Iterator<Item = VH> + use<'_>, Error> {
    Ok(fh_iter(topol, f)?.filter_map(|h| topol.origin(h).ok()))
}

pub(crate) fn ff_iter(topol: &Topology, f: FH) -> Result<impl Iterator<Item = FH> + use<'_>, Error> {
    Ok(fh_iter(topol, f)?.filter_map(|h| {
        topol
            .twin(h)
            .and_then(|oh| topol.face(oh))
            .ok()
            .flatten()
    }))
}

#[cfg(test)]
mod test {
    use crate::{
        build::test::{loop_mesh, quad_box},
        element::{HasTopology, Handle},
        iterator::{
            ff_iter, fh_iter, fv_iter, loop_iter, loop_rev_iter, vf_iter, vih_iter, voh_ccw_iter,
            voh_iter, vv_iter,
        },
    };

    #[test]
    fn t_box_vv_iter() {
        let qbox = quad_box();
        let topol = qbox.topology();
        for v in topol.vertices() {
            let mut neighbors: Vec<u32> = vv_iter(topol, v)
                .expect("Cannot iterate")
                .map(|v| v.index())
                .collect();
            assert_eq!(neighbors.len(), 3);
            neighbors.sort();
            neighbors.dedup();
            assert_eq!(neighbors.len(), 3, "Neighbors must be unique");
        }
        let mut vis: Vec<u32> = vv_iter(topol, 0.into())
            .unwrap()
            .map(|v| v.index())
            .collect();
        vis.sort();
        assert_eq!(vis, [1, 3, 4]);
    }

    #[test]
    fn t_box_voh_rotation_directions() {
        let qbox = quad_box();
        let topol = qbox.topology();
        for v in topol.vertices() {
            let fwd: Vec<_> = voh_iter(topol, v).unwrap().collect();
            let mut bwd: Vec<_> = voh_ccw_iter(topol, v).unwrap().collect();
            // Same start, opposite directions.
            assert_eq!(fwd[0], bwd[0]);
            bwd[1..].reverse();
            assert_eq!(fwd, bwd);
            assert!(fwd.iter().all(|h| topol.origin(*h).unwrap() == v));
            assert!(vih_iter(topol, v)
                .unwrap()
                .all(|h| topol.destination(h).unwrap() == v && topol.origin(h).unwrap() != v));
        }
    }

    #[test]
    fn t_box_fv_iter() {
        let qbox = quad_box();
        let topol = qbox.topology();
        for (fi, vis) in [
            (0u32, [0, 3, 2, 1]),
            (1u32, [0, 1, 5, 4]),
            (2u32, [1, 2, 6, 5]),
            (3u32, [2, 3, 7, 6]),
            (4u32, [3, 0, 4, 7]),
            (5u32, [4, 5, 6, 7]),
        ] {
            assert_eq!(
                fv_iter(topol, fi.into())
                    .unwrap()
                    .map(|x| x.index())
                    .collect::<Vec<_>>(),
                vis
            );
        }
    }

    #[test]
    fn t_box_ff_iter() {
        let qbox = quad_box();
        let topol = qbox.topology();
        for (fi, fis) in [
            (0u32, [4, 3, 2, 1]),
            (1u32, [0, 2, 5, 4]),
            (2u32, [0, 3, 5, 1]),
            (3u32, [0, 4, 5, 2]),
            (4u32, [0, 1, 5, 3]),
            (5u32, [1, 2, 3, 4]),
        ] {
            assert_eq!(
                ff_iter(topol, fi.into())
                    .unwrap()
                    .map(|f| f.index())
                    .collect::<Vec<_>>(),
                fis
            );
        }
    }

    #[test]
    fn t_face_iteration_is_restartable() {
        let qbox = quad_box();
        let topol = qbox.topology();
        for f in topol.faces() {
            let first: Vec<_> = fh_iter(topol, f).unwrap().collect();
            let second: Vec<_> = fh_iter(topol, f).unwrap().collect();
            assert_eq!(first.len(), 4);
            assert_eq!(first, second);
            assert_eq!(first[0], topol.face_halfedge(f).unwrap());
        }
    }

    #[test]
    fn t_loop_mesh_vf_iter() {
        let mesh = loop_mesh();
        let topol = mesh.topology();
        for (v, count) in [
            (0u32, 1usize),
            (1, 2),
            (3, 1),
            (5, 3),
            (6, 3),
            (9, 3),
            (10, 3),
            (15, 1),
        ] {
            assert_eq!(vf_iter(topol, v.into()).unwrap().count(), count);
            // Boundary vertices have one extra outgoing halfedge without a face.
            assert_eq!(voh_iter(topol, v.into()).unwrap().count(), count + 1);
        }
    }

    #[test]
    fn t_loop_mesh_holes() {
        let mesh = loop_mesh();
        let topol = mesh.topology();
        let mut hole_sizes: Vec<usize> = Vec::new();
        let mut seen = vec![false; topol.halfedge_capacity()];
        for h in topol.halfedges() {
            if seen[h.index() as usize] || !topol.is_boundary_halfedge(h).unwrap() {
                continue;
            }
            let hole: Vec<_> = loop_iter(topol, h).unwrap().collect();
            for hh in &hole {
                seen[hh.index() as usize] = true;
            }
            let mut rev: Vec<_> = loop_rev_iter(topol, h).unwrap().collect();
            rev[1..].reverse();
            assert_eq!(hole, rev);
            hole_sizes.push(hole.len());
        }
        hole_sizes.sort();
        // The missing cell in the middle and the outer boundary.
        assert_eq!(hole_sizes, [4, 12]);
    }
}

use crate::{error::Error, iterator, topol::Topology};
use std::fmt::{Debug, Display};

/**
 * All elements of the mesh implement this trait. They are identified by their
 * index.
 */
pub trait Handle {
    /**
     * The index of the element.
     */
    fn index(&self) -> u32;
}

/**
 * Vertex handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VH {
    idx: u32,
}

/**
 * Halfedge handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HH {
    idx: u32,
}

/**
 * Face handle.
 */
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FH {
    idx: u32,
}

macro_rules! impl_handle {
    ($type:ident, $name:literal) => {
        impl Handle for $type {
            fn index(&self) -> u32 {
                self.idx
            }
        }

        impl From<u32> for $type {
            fn from(idx: u32) -> Self {
                $type { idx }
            }
        }

        impl From<&u32> for $type {
            fn from(idx: &u32) -> Self {
                $type { idx: *idx }
            }
        }

        impl Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", $name, self.idx)
            }
        }

        impl Debug for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}({})", $name, self.idx)
            }
        }
    };
}

impl_handle!(VH, "VH");
impl_handle!(HH, "HH");
impl_handle!(FH, "FH");

/// An undirected edge, i.e. a halfedge and its twin.
///
/// The pair is stored in canonical order, with the smaller halfedge handle
/// first, so two views of the same edge compare equal regardless of which
/// halfedge they were created from.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Edge {
    halfedges: (HH, HH),
}

impl Edge {
    pub(crate) fn new(h: HH, twin: HH) -> Self {
        Edge {
            halfedges: if h < twin { (h, twin) } else { (twin, h) },
        }
    }

    /// The two halfedges of this edge, smaller handle first.
    pub fn halfedges(&self) -> (HH, HH) {
        self.halfedges
    }

    /// The halfedge with the smaller handle.
    pub fn first(&self) -> HH {
        self.halfedges.0
    }

    /// The halfedge with the larger handle.
    pub fn second(&self) -> HH {
        self.halfedges.1
    }

    /// Check if this edge contains the halfedge `h`.
    pub fn contains(&self, h: HH) -> bool {
        self.halfedges.0 == h || self.halfedges.1 == h
    }
}

impl Display for Edge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Edge({}, {})", self.halfedges.0, self.halfedges.1)
    }
}

/// Anything that owns a topology and can be navigated with handles.
pub trait HasTopology {
    fn topology(&self) -> &Topology;
}

impl HasTopology for Topology {
    fn topology(&self) -> &Topology {
        self
    }
}

impl VH {
    /// The representative outgoing halfedge of this vertex.
    pub fn halfedge(self, mesh: &impl HasTopology) -> Result<HH, Error> {
        mesh.topology().vertex_halfedge(self)
    }

    /// Check if this vertex is alive in the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_vertex(self)
    }

    /// Check if this vertex is on the boundary of the `mesh`.
    ///
    /// ```text
    ///    .......|     .......|.......
    ///    .......|     .......|.......
    ///    -------v     -------v-------
    ///    .......|     .......|.......
    ///    .......|     .......|.......
    ///    Boundary     Interior
    /// ```
    pub fn is_boundary(self, mesh: &impl HasTopology) -> Result<bool, Error> {
        mesh.topology().is_boundary_vertex(self)
    }

    /// The number of edges incident on this vertex.
    pub fn degree(self, mesh: &impl HasTopology) -> Result<usize, Error> {
        Ok(iterator::voh_iter(mesh.topology(), self)?.count())
    }
}

impl HH {
    pub fn origin(self, mesh: &impl HasTopology) -> Result<VH, Error> {
        mesh.topology().origin(self)
    }

    pub fn destination(self, mesh: &impl HasTopology) -> Result<VH, Error> {
        mesh.topology().destination(self)
    }

    pub fn twin(self, mesh: &impl HasTopology) -> Result<HH, Error> {
        mesh.topology().twin(self)
    }

    pub fn prev(self, mesh: &impl HasTopology) -> Result<HH, Error> {
        mesh.topology().prev(self)
    }

    pub fn next(self, mesh: &impl HasTopology) -> Result<HH, Error> {
        mesh.topology().next(self)
    }

    pub fn face(self, mesh: &impl HasTopology) -> Result<Option<FH>, Error> {
        mesh.topology().face(self)
    }

    /// The undirected edge this halfedge belongs to.
    pub fn edge(self, mesh: &impl HasTopology) -> Result<Edge, Error> {
        Ok(Edge::new(self, mesh.topology().twin(self)?))
    }

    /// Check if this halfedge is alive in the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_halfedge(self)
    }

    /// Check if this halfedge is on the boundary of `mesh`.
    ///
    /// A halfedge is considered interior if it has a face incident on it.
    pub fn is_boundary(self, mesh: &impl HasTopology) -> Result<bool, Error> {
        mesh.topology().is_boundary_halfedge(self)
    }
}

impl FH {
    pub fn halfedge(self, mesh: &impl HasTopology) -> Result<HH, Error> {
        mesh.topology().face_halfedge(self)
    }

    /// Check if this face is alive in the `mesh`.
    pub fn is_valid(self, mesh: &impl HasTopology) -> bool {
        mesh.topology().is_valid_face(self)
    }

    /// The number of sides of this face.
    pub fn degree(self, mesh: &impl HasTopology) -> Result<usize, Error> {
        Ok(iterator::fh_iter(mesh.topology(), self)?.count())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Vertex {
    pub(crate) halfedge: Option<HH>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Halfedge {
    pub(crate) face: Option<FH>,
    pub(crate) origin: VH,
    pub(crate) twin: HH,
    pub(crate) next: HH,
    pub(crate) prev: HH,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct Face {
    pub(crate) halfedge: HH,
}

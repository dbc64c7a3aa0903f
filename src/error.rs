use crate::element::{FH, HH, VH};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    // Handles.
    #[error("{0} does not refer to a live vertex")]
    InvalidVertex(VH),
    #[error("{0} does not refer to a live halfedge")]
    InvalidHalfedge(HH),
    #[error("{0} does not refer to a live face")]
    InvalidFace(FH),
    /// A live entity still references the one being deleted.
    #[error("cannot delete {entity}, it is still referenced by {referrer}")]
    DanglingReference { entity: String, referrer: String },
    // Construction.
    #[error("{0} was not issued by this builder")]
    UnknownVertex(VH),
    #[error("input face {0} is degenerate")]
    DegenerateFace(usize),
    #[error("edge ({0}, {1}) is shared by more than two faces")]
    NonManifoldEdge(VH, VH),
    #[error("the faces around {0} do not form a single fan or cycle")]
    NonManifoldVertex(VH),
    #[error("faces across edge ({0}, {1}) have opposite winding")]
    InconsistentOrientation(VH, VH),
    #[error("hole edge ({0}, {1}) does not border a face")]
    UnmatchedHoleEdge(VH, VH),
    // Edit preconditions.
    #[error("{vertex} has degree {degree}")]
    DegreeMismatch { vertex: VH, degree: usize },
    #[error("{halfedge} is not on the boundary of {face}")]
    NotOnFace { halfedge: HH, face: FH },
    #[error("{vertex} is not a corner of {face}")]
    VertexNotOnFace { vertex: VH, face: FH },
    #[error("splitting between {0} and {1} would create a degenerate face")]
    DegenerateSplit(HH, HH),
    #[error("{0} is not a triangle")]
    NotATriangle(FH),
    #[error("an edge between {0} and {1} already exists")]
    DuplicateEdge(VH, VH),
    #[error("{0} has no face on one of its sides")]
    BoundaryHalfedge(HH),
    #[error("merging {0} and {1} would not produce a simple face")]
    NonSimpleMerge(FH, FH),
    #[error("a face adjacent to {0} would have fewer than three sides")]
    FaceTooSmall(HH),
    #[error("removing {face} would pinch {vertex} between two holes")]
    PinchedVertex { face: FH, vertex: VH },
    // Topology checks.
    #[error("{0} has no outgoing halfedge")]
    IsolatedVertex(VH),
    #[error("{0} starts and ends at the same vertex")]
    DegenerateHalfedge(HH),
    #[error("{0} is not the twin of its twin")]
    InvalidTwin(HH),
    #[error("next / prev links of {0} are inconsistent")]
    InvalidHalfedgeLink(HH),
    #[error("{0} is linked into more than one loop")]
    InvalidLoopTopology(HH),
    #[error("{0} carries a different face than the rest of its loop")]
    InconsistentFaceInLoop(HH),
    #[error("{0} refers to {1} which does not bound it")]
    InvalidFaceHalfedgeLink(FH, HH),
    #[error("the outgoing halfedges of {0} are inconsistent")]
    InvalidOutgoingHalfedges(VH),
    #[error("{0} must be the outgoing boundary halfedge of its origin")]
    OutgoingHalfedgeNotBoundary(VH),
    // Obj.
    #[error("failed to load obj: {0}")]
    ObjLoadFailed(String),
    #[error("obj position buffer has {0} coordinates, not a multiple of 3")]
    IncorrectNumberOfCoordinates(usize),
    #[error("obj face sizes do not add up to the {0} indices")]
    IncorrectIndexCount(usize),
}

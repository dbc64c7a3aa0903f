use crate::{build::MeshBuilder, element::VH, error::Error, Mesh};

/// Primitive shapes. The position of each vertex is passed to `vertex`,
/// which turns it into the payload of that vertex. Faces get the default
/// payload.
impl<V, F> Mesh<V, F>
where
    F: Default,
{
    fn from_positions<const N: usize>(
        positions: &[[f64; 3]],
        faces: &[[u32; N]],
        mut vertex: impl FnMut([f64; 3]) -> V,
    ) -> Result<Self, Error> {
        let mut builder = MeshBuilder::with_capacity(positions.len(), faces.len());
        for pos in positions {
            builder.add_vertex(vertex(*pos));
        }
        for face in faces {
            builder.add_face(&face.map(VH::from), F::default());
        }
        builder.build()
    }

    /// A single triangle in the XY plane.
    pub fn triangle(vertex: impl FnMut([f64; 3]) -> V) -> Result<Self, Error> {
        Self::from_positions(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            &[[0, 1, 2]],
            vertex,
        )
    }

    /// A single unit square in the XY plane.
    pub fn quad(vertex: impl FnMut([f64; 3]) -> V) -> Result<Self, Error> {
        Self::from_positions(
            &[
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            &[[0, 1, 2, 3]],
            vertex,
        )
    }

    /// Makes a box with the following topology, spanning from the min point to
    /// the max point.
    ///
    ///  ```text
    ///       7-----------6
    ///      /|          /|
    ///     / |         / |
    ///    4-----------5  |
    ///    |  |        |  |
    ///    |  3--------|--2
    ///    | /         | /
    ///    |/          |/
    ///    0-----------1
    ///  ```
    pub fn quad_box(
        min: [f64; 3],
        max: [f64; 3],
        vertex: impl FnMut([f64; 3]) -> V,
    ) -> Result<Self, Error> {
        const BOX_POS: [(bool, bool, bool); 8] = [
            (false, false, false),
            (true, false, false),
            (true, true, false),
            (false, true, false),
            (false, false, true),
            (true, false, true),
            (true, true, true),
            (false, true, true),
        ];
        const BOX_IDX: [[u32; 4]; 6] = [
            [0, 3, 2, 1],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
            [4, 5, 6, 7],
        ];
        let pos = BOX_POS.map(|(xf, yf, zf)| {
            [
                if xf { max[0] } else { min[0] },
                if yf { max[1] } else { min[1] },
                if zf { max[2] } else { min[2] },
            ]
        });
        Self::from_positions(&pos, &BOX_IDX, vertex)
    }

    /// A box of size 1, spanning from the origin to (1, 1, 1).
    pub fn unit_box(vertex: impl FnMut([f64; 3]) -> V) -> Result<Self, Error> {
        Self::quad_box([0.0; 3], [1.0; 3], vertex)
    }

    /// Create a tetrahedron centered at the origin, with its vertices on a
    /// sphere of the given radius.
    pub fn tetrahedron(radius: f64, vertex: impl FnMut([f64; 3]) -> V) -> Result<Self, Error> {
        let a = radius / 3.0;
        let b = radius * (8.0 / 9.0f64).sqrt();
        let c = radius * (2.0 / 9.0f64).sqrt();
        let d = radius * (2.0 / 3.0f64).sqrt();
        Self::from_positions(
            &[[0.0, 0.0, radius], [-c, d, -a], [-c, -d, -a], [b, 0.0, -a]],
            &[[0, 1, 2], [0, 2, 3], [0, 3, 1], [3, 2, 1]],
            vertex,
        )
    }

    /// Create an octahedron centered at the origin, with its vertices on a
    /// sphere of the given radius.
    pub fn octahedron(radius: f64, vertex: impl FnMut([f64; 3]) -> V) -> Result<Self, Error> {
        Self::from_positions(
            &[
                [radius, 0.0, 0.0],
                [0.0, radius, 0.0],
                [-radius, 0.0, 0.0],
                [0.0, -radius, 0.0],
                [0.0, 0.0, radius],
                [0.0, 0.0, -radius],
            ],
            &[
                [0, 4, 3],
                [1, 4, 0],
                [2, 4, 1],
                [3, 4, 2],
                [3, 5, 0],
                [0, 5, 1],
                [1, 5, 2],
                [2, 5, 3],
            ],
            vertex,
        )
    }

    /// Create an icosahedron centered at the origin, with its vertices on a
    /// sphere of the given radius.
    pub fn icosahedron(radius: f64, vertex: impl FnMut([f64; 3]) -> V) -> Result<Self, Error> {
        let a = radius * 0.5257311121191336;
        let b = radius * 0.8506508083520399;
        Self::from_positions(
            &[
                [0.0, a, -b],
                [a, b, 0.0],
                [-a, b, 0.0],
                [0.0, a, b],
                [0.0, -a, b],
                [-b, 0.0, a],
                [0.0, -a, -b],
                [b, 0.0, -a],
                [b, 0.0, a],
                [-b, 0.0, -a],
                [a, -b, 0.0],
                [-a, -b, 0.0],
            ],
            &[
                [2, 1, 0],
                [1, 2, 3],
                [5, 4, 3],
                [4, 8, 3],
                [7, 6, 0],
                [6, 9, 0],
                [11, 10, 4],
                [10, 11, 6],
                [9, 5, 2],
                [5, 9, 11],
                [8, 7, 1],
                [7, 8, 10],
                [2, 5, 3],
                [8, 1, 3],
                [9, 2, 0],
                [1, 7, 0],
                [11, 9, 6],
                [7, 10, 6],
                [5, 11, 4],
                [10, 8, 4],
            ],
            vertex,
        )
    }

    /// A flat grid of `nx` by `ny` unit quads in the XY plane. Vertex `(i, j)`
    /// has index `j * (nx + 1) + i`.
    pub fn quad_grid(
        nx: usize,
        ny: usize,
        mut vertex: impl FnMut([f64; 3]) -> V,
    ) -> Result<Self, Error> {
        let mut builder = MeshBuilder::with_capacity((nx + 1) * (ny + 1), nx * ny);
        for j in 0..=ny {
            for i in 0..=nx {
                builder.add_vertex(vertex([i as f64, j as f64, 0.0]));
            }
        }
        let index = |i: usize, j: usize| VH::from((j * (nx + 1) + i) as u32);
        for j in 0..ny {
            for i in 0..nx {
                builder.add_face(
                    &[
                        index(i, j),
                        index(i + 1, j),
                        index(i + 1, j + 1),
                        index(i, j + 1),
                    ],
                    F::default(),
                );
            }
        }
        builder.build()
    }
}

use std::{io::BufRead, path::Path};

use crate::{build::MeshBuilder, element::VH, error::Error, Mesh};

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Wavefront OBJ files. Positions become vertex payloads and polygons become
/// faces with the default payload. All models in the file are merged into
/// one mesh.
impl<V, F> Mesh<V, F>
where
    V: From<[f64; 3]>,
    F: Default,
{
    pub fn load_obj(path: &Path) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj(path, &load_options())
            .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        let mesh = Self::from_obj_models(models)?;
        tracing::debug!(
            path = %path.display(),
            vertices = mesh.num_vertices(),
            faces = mesh.num_faces(),
            "Loaded obj"
        );
        Ok(mesh)
    }

    /// Same as [`load_obj`](Self::load_obj), reading from a buffer. Material
    /// libraries are not loaded.
    pub fn read_obj(reader: &mut impl BufRead) -> Result<Self, Error> {
        let (models, _) = tobj::load_obj_buf(reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|e| Error::ObjLoadFailed(format!("{}", e)))?;
        Self::from_obj_models(models)
    }

    fn from_obj_models(models: Vec<tobj::Model>) -> Result<Self, Error> {
        let (nverts, nfaces) = models
            .iter()
            .fold((0usize, 0usize), |(nverts, nfaces), model| {
                let msh = &model.mesh;
                (
                    nverts + (msh.positions.len() / 3),
                    nfaces + msh.face_arities.len().max(msh.indices.len() / 3),
                )
            });
        let mut builder = MeshBuilder::with_capacity(nverts, nfaces);
        let mut voffset = 0u32;
        let mut fverts: Vec<VH> = Vec::new();
        for model in models {
            let mesh = model.mesh;
            if mesh.positions.len() % 3 != 0 {
                return Err(Error::IncorrectNumberOfCoordinates(mesh.positions.len()));
            }
            let nverts = (mesh.positions.len() / 3) as u32;
            for triplet in mesh.positions.chunks(3) {
                builder.add_vertex(V::from([triplet[0], triplet[1], triplet[2]]));
            }
            // Empty arities mean every face is a triangle.
            let arities: Vec<usize> = if mesh.face_arities.is_empty() {
                vec![3; mesh.indices.len() / 3]
            } else {
                mesh.face_arities.iter().map(|a| *a as usize).collect()
            };
            if arities.iter().sum::<usize>() != mesh.indices.len() {
                return Err(Error::IncorrectIndexCount(mesh.indices.len()));
            }
            let mut start = 0usize;
            for size in arities {
                fverts.clear();
                fverts.extend(
                    mesh.indices[start..(start + size)]
                        .iter()
                        .map(|i| VH::from(i + voffset)),
                );
                start += size;
                builder.add_face(&fverts, F::default());
            }
            voffset += nverts;
        }
        builder.build()
    }
}

#[cfg(test)]
mod test {
    use crate::{error::Error, Mesh};

    type TopoMesh = Mesh<[f64; 3], ()>;

    const CUBE: &str = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
f 1 4 3 2
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
f 5 6 7 8
";

    #[test]
    fn t_read_cube() {
        let mesh = TopoMesh::read_obj(&mut CUBE.as_bytes()).expect("Cannot read obj");
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_edges(), 12);
        assert_eq!(mesh.num_faces(), 6);
        assert_eq!(mesh.boundary_halfedges().count(), 0);
        assert_eq!(mesh.vertex_data(6.into()), Ok(&[1.0, 1.0, 1.0]));
        mesh.check_topology().expect("Invalid topology");
    }

    #[test]
    fn t_read_triangles() {
        let src = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3
f 1 3 4
";
        let mesh = TopoMesh::read_obj(&mut src.as_bytes()).expect("Cannot read obj");
        assert_eq!(mesh.num_faces(), 2);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.interior_edges().count(), 1);
    }

    #[test]
    fn t_read_non_manifold() {
        let src = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 0 -1 0
v 0 0 1
f 1 2 3
f 2 1 4
f 2 1 5
";
        assert_eq!(
            TopoMesh::read_obj(&mut src.as_bytes()).err(),
            Some(Error::NonManifoldEdge(0.into(), 1.into()))
        );
    }
}

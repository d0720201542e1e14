use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, ensure, Context};
use obj::raw::object::Polygon;
use obj::raw::{parse_obj, RawObj};

use crate::util::Vector3f;

/// Indices of one face corner into the position, texture coordinate and normal arrays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceCorner {
    pub position: usize,
    pub tex_coord: usize,
    pub normal: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Face {
    pub corners: [FaceCorner; 3],
}

/// Triangle mesh, read-only once loaded. All indices are 0-based and checked on construction.
#[derive(Debug, Clone)]
pub struct Mesh {
    positions: Vec<Vector3f>,
    tex_coords: Vec<Vector3f>, // Only x and y are meaningful.
    normals: Vec<Vector3f>,
    faces: Vec<Face>,
}

impl Mesh {
    /// Validates that the mesh has faces and that every face index points into its array.
    pub fn new(
        positions: Vec<Vector3f>,
        tex_coords: Vec<Vector3f>,
        normals: Vec<Vector3f>,
        faces: Vec<Face>,
    ) -> anyhow::Result<Mesh> {
        ensure!(!faces.is_empty(), "mesh has no faces");
        for (i, face) in faces.iter().enumerate() {
            for corner in &face.corners {
                ensure!(
                    corner.position < positions.len()
                        && corner.tex_coord < tex_coords.len()
                        && corner.normal < normals.len(),
                    "face {} references missing data: {:?}",
                    i,
                    corner
                );
            }
        }
        return Ok(Mesh { positions, tex_coords, normals, faces });
    }

    /// Loads a Wavefront OBJ file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Mesh> {
        let path = path.as_ref();
        let file = File::open(path).with_context(|| format!("failed to open mesh {}", path.display()))?;
        return Mesh::from_obj(BufReader::new(file))
            .with_context(|| format!("failed to load mesh {}", path.display()));
    }

    /// Parses OBJ text. Polygons with more than 3 corners are split into a triangle fan, corners
    /// without texture coordinates or normals point to an appended zero entry.
    pub fn from_obj<R: BufRead>(reader: R) -> anyhow::Result<Mesh> {
        let raw: RawObj = parse_obj(reader)?;
        let positions: Vec<Vector3f> = raw.positions.iter().map(|p| Vector3f::new(p.0, p.1, p.2)).collect();
        let mut tex_coords: Vec<Vector3f> = raw.tex_coords.iter().map(|t| Vector3f::new(t.0, t.1, t.2)).collect();
        let mut normals: Vec<Vector3f> = raw.normals.iter().map(|n| Vector3f::new(n.0, n.1, n.2)).collect();

        // Index of the zero entry, pushed on first use.
        let missing_tex_coord = tex_coords.len();
        let missing_normal = normals.len();
        let mut needs_tex_coord = false;
        let mut needs_normal = false;

        let mut faces = Vec::with_capacity(raw.polygons.len());
        for polygon in &raw.polygons {
            let corners: Vec<FaceCorner> = match polygon {
                Polygon::P(vs) => vs
                    .iter()
                    .map(|&v| FaceCorner { position: v, tex_coord: missing_tex_coord, normal: missing_normal })
                    .collect(),
                Polygon::PT(vts) => vts
                    .iter()
                    .map(|&(v, t)| FaceCorner { position: v, tex_coord: t, normal: missing_normal })
                    .collect(),
                Polygon::PN(vns) => vns
                    .iter()
                    .map(|&(v, n)| FaceCorner { position: v, tex_coord: missing_tex_coord, normal: n })
                    .collect(),
                Polygon::PTN(vtns) => vtns
                    .iter()
                    .map(|&(v, t, n)| FaceCorner { position: v, tex_coord: t, normal: n })
                    .collect(),
            };
            if corners.len() < 3 {
                bail!("polygon with {} corners", corners.len());
            }
            needs_tex_coord |= matches!(polygon, Polygon::P(_) | Polygon::PN(_));
            needs_normal |= matches!(polygon, Polygon::P(_) | Polygon::PT(_));
            for i in 1..corners.len() - 1 {
                faces.push(Face { corners: [corners[0], corners[i], corners[i + 1]] });
            }
        }
        if needs_tex_coord {
            tex_coords.push(Vector3f::default());
        }
        if needs_normal {
            normals.push(Vector3f::default());
        }

        return Mesh::new(positions, tex_coords, normals, faces);
    }

    pub fn n_vertices(&self) -> usize {
        return self.positions.len();
    }

    pub fn n_faces(&self) -> usize {
        return self.faces.len();
    }

    pub fn face(&self, face: usize) -> &Face {
        return &self.faces[face];
    }

    pub fn position(&self, face: usize, corner: usize) -> Vector3f {
        return self.positions[self.faces[face].corners[corner].position];
    }

    pub fn tex_coord(&self, face: usize, corner: usize) -> Vector3f {
        return self.tex_coords[self.faces[face].corners[corner].tex_coord];
    }

    pub fn normal(&self, face: usize, corner: usize) -> Vector3f {
        return self.normals[self.faces[face].corners[corner].normal];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const TRIANGLE: &str = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
";

    #[test]
    fn obj_indices_become_zero_based() {
        let mesh = Mesh::from_obj(Cursor::new(TRIANGLE)).unwrap();
        assert_eq!(mesh.n_vertices(), 3);
        assert_eq!(mesh.n_faces(), 1);
        assert_eq!(mesh.face(0).corners[0], FaceCorner { position: 0, tex_coord: 0, normal: 0 });
        assert_eq!(mesh.position(0, 1), Vector3f::new(1.0, 0.0, 0.0));
        assert_eq!(mesh.tex_coord(0, 2).proj::<2>(), crate::util::Vector2f::new(0.0, 1.0));
        assert_eq!(mesh.normal(0, 2), Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn quads_are_split_into_fans() {
        let source = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
";
        let mesh = Mesh::from_obj(Cursor::new(source)).unwrap();
        assert_eq!(mesh.n_faces(), 2);
        assert_eq!(mesh.position(1, 0), Vector3f::new(0.0, 0.0, 0.0));
        assert_eq!(mesh.position(1, 1), Vector3f::new(1.0, 1.0, 0.0));
        assert_eq!(mesh.position(1, 2), Vector3f::new(0.0, 1.0, 0.0));
        // No texture coordinates or normals in the file.
        assert_eq!(mesh.tex_coord(0, 0), Vector3f::default());
        assert_eq!(mesh.normal(1, 2), Vector3f::default());
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let error = Mesh::from_obj(Cursor::new("v 0 0 0\n")).unwrap_err();
        assert!(error.to_string().contains("no faces"));
    }

    #[test]
    fn dangling_index_is_rejected() {
        let source = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 7\n";
        assert!(Mesh::from_obj(Cursor::new(source)).is_err());

        let face = Face {
            corners: [FaceCorner::default(), FaceCorner::default(), FaceCorner { normal: 3, ..Default::default() }],
        };
        let zero = vec![Vector3f::default()];
        assert!(Mesh::new(zero.clone(), zero.clone(), zero, vec![face]).is_err());
    }

    #[test]
    fn load_from_file_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TRIANGLE.as_bytes()).unwrap();
        let mesh = Mesh::load(file.path()).unwrap();
        assert_eq!(mesh.n_faces(), 1);

        let error = Mesh::load("/nonexistent/head.obj").unwrap_err();
        assert!(format!("{:#}", error).contains("failed to open mesh"));
    }

    #[test]
    #[should_panic]
    fn corner_access_is_bounds_checked() {
        let mesh = Mesh::from_obj(Cursor::new(TRIANGLE)).unwrap();
        let _ = mesh.position(0, 3);
    }
}

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Vertex layout uploaded to the GPU.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Axis-aligned bounding box.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

/// Geometry + material data decoded from a binary glTF buffer.
///
/// All mesh primitives reachable from the scene are flattened into a single
/// vertex/index stream with node transforms applied, which is all a
/// single-model viewer needs.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
    /// Base color factor of the first primitive's material.
    pub base_color: [f32; 4],
    pub bounds: Aabb,
}

impl ModelData {
    /// Decodes a GLB buffer into renderable geometry.
    pub fn from_glb(bytes: &[u8]) -> Result<Self> {
        let (document, buffers, _images) =
            gltf::import_slice(bytes).context("failed to parse glTF model")?;

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .context("glTF contains no scene")?;

        let mut data = ModelData {
            vertices: Vec::new(),
            indices: Vec::new(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            bounds: Aabb::empty(),
        };
        let mut base_color_set = false;

        for node in scene.nodes() {
            visit_node(&node, Mat4::IDENTITY, &buffers, &mut data, &mut base_color_set);
        }

        anyhow::ensure!(!data.vertices.is_empty(), "glTF contains no mesh geometry");

        if data.vertices.iter().any(|v| v.normal == [0.0; 3]) {
            compute_missing_normals(&mut data);
        }

        Ok(data)
    }

    /// Transform that fits the model into the unit cube at the origin,
    /// preserving aspect ratio.
    pub fn fit_to_unit_cube(&self) -> Mat4 {
        fit_to_unit_cube(self.bounds)
    }
}

fn visit_node(
    node: &gltf::Node<'_>,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut ModelData,
    base_color_set: &mut bool,
) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            read_primitive(&primitive, world, buffers, out, base_color_set);
        }
    }

    for child in node.children() {
        visit_node(&child, world, buffers, out, base_color_set);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive<'_>,
    world: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut ModelData,
    base_color_set: &mut bool,
) {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|b| b.0.as_slice()));

    let Some(positions) = reader.read_positions() else {
        return;
    };

    let base = out.vertices.len() as u32;

    for position in positions {
        let world_pos = world.transform_point3(Vec3::from(position));
        out.bounds.extend(world_pos);
        out.vertices.push(ModelVertex {
            position: world_pos.to_array(),
            normal: [0.0; 3],
        });
    }

    if let Some(normals) = reader.read_normals() {
        let normal_matrix = glam::Mat3::from_mat4(world).inverse().transpose();
        for (i, normal) in normals.enumerate() {
            let index = base as usize + i;
            if let Some(vertex) = out.vertices.get_mut(index) {
                vertex.normal = (normal_matrix * Vec3::from(normal))
                    .normalize_or_zero()
                    .to_array();
            }
        }
    }

    match reader.read_indices() {
        Some(indices) => out.indices.extend(indices.into_u32().map(|i| base + i)),
        None => out.indices.extend(base..out.vertices.len() as u32),
    }

    if !*base_color_set {
        out.base_color = primitive
            .material()
            .pbr_metallic_roughness()
            .base_color_factor();
        *base_color_set = true;
    }
}

/// Fills zero normals by accumulating face normals over the index stream.
fn compute_missing_normals(data: &mut ModelData) {
    let mut accumulated = vec![Vec3::ZERO; data.vertices.len()];

    for triangle in data.indices.chunks_exact(3) {
        let [a, b, c] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        let pa = Vec3::from(data.vertices[a].position);
        let pb = Vec3::from(data.vertices[b].position);
        let pc = Vec3::from(data.vertices[c].position);
        let face = (pb - pa).cross(pc - pa);
        accumulated[a] += face;
        accumulated[b] += face;
        accumulated[c] += face;
    }

    for (vertex, normal) in data.vertices.iter_mut().zip(accumulated) {
        if vertex.normal == [0.0; 3] {
            vertex.normal = normal.normalize_or(Vec3::Y).to_array();
        }
    }
}

/// Transform that maps `bounds` into the origin-centered unit cube.
pub fn fit_to_unit_cube(bounds: Aabb) -> Mat4 {
    if bounds.is_empty() {
        return Mat4::IDENTITY;
    }

    let longest = bounds.size().max_element().max(1e-6);
    let scale = 1.0 / longest;

    Mat4::from_scale(Vec3::splat(scale)) * Mat4::from_translation(-bounds.center())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_extend_tracks_extents() {
        let mut bounds = Aabb::empty();
        assert!(bounds.is_empty());

        bounds.extend(Vec3::new(-1.0, 2.0, 0.5));
        bounds.extend(Vec3::new(3.0, -4.0, 0.0));

        assert!(!bounds.is_empty());
        assert_eq!(bounds.min, Vec3::new(-1.0, -4.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 2.0, 0.5));
        assert_eq!(bounds.center(), Vec3::new(1.0, -1.0, 0.25));
    }

    #[test]
    fn unit_cube_fit_centers_and_scales() {
        let mut bounds = Aabb::empty();
        bounds.extend(Vec3::new(2.0, 2.0, 2.0));
        bounds.extend(Vec3::new(6.0, 4.0, 2.5));

        let fit = fit_to_unit_cube(bounds);

        // Center maps to the origin.
        let center = fit.transform_point3(bounds.center());
        assert!(center.length() < 1e-5);

        // All corners land inside the unit cube.
        for &x in &[bounds.min.x, bounds.max.x] {
            for &y in &[bounds.min.y, bounds.max.y] {
                for &z in &[bounds.min.z, bounds.max.z] {
                    let p = fit.transform_point3(Vec3::new(x, y, z));
                    assert!(p.abs().max_element() <= 0.5 + 1e-5, "corner escaped: {p}");
                }
            }
        }

        // The longest axis spans exactly the unit interval.
        let a = fit.transform_point3(Vec3::new(bounds.min.x, 2.0, 2.0));
        let b = fit.transform_point3(Vec3::new(bounds.max.x, 2.0, 2.0));
        assert!(((b - a).length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_bounds_fit_is_identity() {
        assert_eq!(fit_to_unit_cube(Aabb::empty()), Mat4::IDENTITY);
    }

    #[test]
    fn decodes_a_minimal_glb() {
        let glb = tiny_glb();
        let data = ModelData::from_glb(&glb).unwrap();

        assert_eq!(data.vertices.len(), 3);
        assert_eq!(data.indices, vec![0, 1, 2]);
        assert_eq!(data.bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(data.bounds.max, Vec3::new(1.0, 1.0, 0.0));

        // No normals in the file, so face normals are computed (+Z here).
        for vertex in &data.vertices {
            let n = Vec3::from(vertex.normal);
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!(n.z.abs() > 0.99);
        }
    }

    #[test]
    fn rejects_garbage_bytes() {
        assert!(ModelData::from_glb(b"not a model").is_err());
    }

    /// Builds a minimal valid GLB: one triangle, no normals, u16 indices.
    fn tiny_glb() -> Vec<u8> {
        let positions: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];
        let mut bin: Vec<u8> = Vec::new();
        for p in positions {
            for c in p {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in [0u16, 1, 2] {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        let bin_len = bin.len(); // 42
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let json = format!(
            concat!(
                r#"{{"asset":{{"version":"2.0"}},"scene":0,"scenes":[{{"nodes":[0]}}],"#,
                r#""nodes":[{{"mesh":0}}],"#,
                r#""meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}},"indices":1}}]}}],"#,
                r#""buffers":[{{"byteLength":{}}}],"#,
                r#""bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":36,"target":34962}},"#,
                r#"{{"buffer":0,"byteOffset":36,"byteLength":6,"target":34963}}],"#,
                r#""accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","#,
                r#""min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]}},"#,
                r#"{{"bufferView":1,"componentType":5123,"count":3,"type":"SCALAR"}}]}}"#
            ),
            bin_len
        );
        let mut json = json.into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(&0x4654_6C67u32.to_le_bytes()); // "glTF"
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(&0x4E4F_534Au32.to_le_bytes()); // JSON
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(&0x004E_4942u32.to_le_bytes()); // BIN
        glb.extend_from_slice(&bin);
        glb
    }
}

use serde::Serialize;

/// Renderable triangle mesh produced by the field evaluators.
///
/// All buffers are flat: `vertices`, `normals` and `colors` hold one `f32`
/// triple per vertex, `indices` holds three vertex indices per triangle.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SurfaceData {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<f32>>,
    pub indices: Vec<u32>,
}

impl SurfaceData {
    /// An empty mesh, the valid result when a field has no surface in range.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Packs `f64` working buffers into the `f32` render layout.
    #[must_use]
    pub fn from_parts(
        positions: &[[f64; 3]],
        normals: &[[f64; 3]],
        colors: Option<&[[f64; 3]]>,
        indices: Vec<u32>,
    ) -> Self {
        Self {
            vertices: pack_f32(positions),
            normals: pack_f32(normals),
            colors: colors.map(pack_f32),
            indices,
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// `true` when the field produced no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Returns the `index`-th vertex position.
    #[must_use]
    pub fn vertex(&self, index: usize) -> Option<[f32; 3]> {
        triple(&self.vertices, index)
    }

    /// Returns the `index`-th vertex normal.
    #[must_use]
    pub fn normal(&self, index: usize) -> Option<[f32; 3]> {
        triple(&self.normals, index)
    }

    /// Returns the `index`-th vertex color.
    #[must_use]
    pub fn color(&self, index: usize) -> Option<[f32; 3]> {
        self.colors.as_deref().and_then(|colors| triple(colors, index))
    }

    /// Iterates vertex positions as triples.
    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.vertices.iter().any(|value| !value.is_finite())
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.vertex_count();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Returns true if all attribute buffers match the vertex buffer.
    #[must_use]
    pub fn has_valid_attribute_lengths(&self) -> bool {
        let n = self.vertices.len();
        self.normals.len() == n && self.colors.as_ref().is_none_or(|colors| colors.len() == n)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.vertices.len() % 3 != 0 {
            return Err("vertex buffer is not a list of xyz triples (len % 3 != 0)".to_string());
        }
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if !self.has_valid_attribute_lengths() {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        if !self.has_valid_indices() {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if self.has_invalid_vertices() {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        Ok(())
    }
}

#[allow(clippy::cast_possible_truncation)]
fn pack_f32(values: &[[f64; 3]]) -> Vec<f32> {
    let mut packed = Vec::with_capacity(values.len() * 3);
    for value in values {
        packed.extend(value.iter().map(|component| *component as f32));
    }
    packed
}

fn triple(buffer: &[f32], index: usize) -> Option<[f32; 3]> {
    let start = index.checked_mul(3)?;
    let chunk = buffer.get(start..start + 3)?;
    Some([chunk[0], chunk[1], chunk[2]])
}

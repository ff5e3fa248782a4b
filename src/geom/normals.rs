use super::core::Vec3;

/// Smooth per-vertex normals from area-weighted face normals.
///
/// Each triangle adds its unnormalized face normal `(b - a) × (c - a)` to its
/// three vertices; the sums are normalized at the end. Vertices that end up
/// with a zero (or non-finite) sum keep the zero vector. Triangles that
/// reference missing vertices are skipped.
#[must_use]
pub fn vertex_normals(positions: &[[f64; 3]], indices: &[u32]) -> Vec<[f64; 3]> {
    let mut sums = vec![Vec3::default(); positions.len()];

    for tri in indices.chunks_exact(3) {
        let corners = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let (Some(&a), Some(&b), Some(&c)) = (
            positions.get(corners[0]),
            positions.get(corners[1]),
            positions.get(corners[2]),
        ) else {
            continue;
        };

        let a = Vec3::from(a);
        let face = (Vec3::from(b) - a).cross(Vec3::from(c) - a);
        for i in corners {
            sums[i] += face;
        }
    }

    sums.into_iter()
        .map(|sum| <[f64; 3]>::from(sum.normalized().unwrap_or_default()))
        .collect()
}

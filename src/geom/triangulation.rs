/// Index buffer for a regular `(resolution + 1) × (resolution + 1)` vertex grid.
///
/// Vertices are expected in row-major order, row `i` outer and column `j`
/// inner. Each cell `(i, j)` yields the triangles
/// `(idx, idx + 1, idx + R + 1)` and `(idx + R + 1, idx + 1, idx + R + 2)`
/// with `idx = i * (R + 1) + j`. A zero resolution gives no triangles.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn quad_grid_indices(resolution: usize) -> Vec<u32> {
    let stride = resolution + 1;
    let mut indices = Vec::with_capacity(resolution * resolution * 6);

    for i in 0..resolution {
        for j in 0..resolution {
            let i0 = (i * stride + j) as u32;
            let i1 = (i * stride + j + 1) as u32;
            let i2 = ((i + 1) * stride + j) as u32;
            let i3 = ((i + 1) * stride + j + 1) as u32;

            indices.extend_from_slice(&[i0, i1, i2]);
            indices.extend_from_slice(&[i2, i1, i3]);
        }
    }

    indices
}

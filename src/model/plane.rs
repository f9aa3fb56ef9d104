use crate::utils::{Mesh, Vertex};

/// Build a flat grid in the XZ plane centred on the origin.
///
/// Vertices are row-major: the outer loop walks Z rows, the inner loop X
/// columns, giving `(divisions + 1)^2` points with `y == 0`. Each grid cell
/// contributes two triangles (six indices), wound counter-clockwise when
/// seen from +Y.
///
/// Callers pass positive `width`/`depth` and `divisions >= 1`.
pub fn generate_flat_plane(width: f32, depth: f32, divisions: u32) -> Mesh {
    let step_x = width / divisions as f32;
    let step_z = depth / divisions as f32;
    let row_len = divisions + 1;

    let mut vertices = Vec::with_capacity((row_len * row_len) as usize);
    for i in 0..=divisions {
        for j in 0..=divisions {
            let x = -width / 2.0 + j as f32 * step_x;
            let z = -depth / 2.0 + i as f32 * step_z;
            vertices.push(Vertex { pos: [x, 0.0, z] });
        }
    }

    let mut indices = Vec::with_capacity((6 * divisions * divisions) as usize);
    for i in 0..divisions {
        for j in 0..divisions {
            let row1 = i * row_len;
            let row2 = (i + 1) * row_len;
            indices.extend_from_slice(&[
                row1 + j,
                row2 + j,
                row1 + j + 1,
                row1 + j + 1,
                row2 + j,
                row2 + j + 1,
            ]);
        }
    }

    Mesh { vertices, indices }
}

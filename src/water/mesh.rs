//! Flat water surface grid. Displacement happens on the GPU, so the mesh never changes.

use bytemuck::{Pod, Zeroable};

/// Vertex data for the water mesh (rest position + UV coordinates)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Largest grid accepted. Keeps the vertex buffer (about 84 MB) under wgpu's
/// default 256 MiB buffer limit and every index inside `u32`.
pub const MAX_GRID_SEGMENTS: u32 = 2048;

/// Square grid in the XZ plane, centered on the origin
pub struct SurfaceGrid {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    segments: u32,
}

impl SurfaceGrid {
    /// Create a grid with `segments` cells per side covering `extent` world units.
    /// `segments` is clamped to `1..=MAX_GRID_SEGMENTS`.
    pub fn new(segments: u32, extent: f32) -> Self {
        let segments = segments.clamp(1, MAX_GRID_SEGMENTS);
        let side = segments as usize + 1;
        let spacing = extent / segments as f32;
        let half_size = extent / 2.0;

        let mut vertices = Vec::with_capacity(side * side);
        let mut indices = Vec::with_capacity(segments as usize * segments as usize * 6);

        // Generate flat XZ plane grid
        for z in 0..side {
            for x in 0..side {
                let x_pos = x as f32 * spacing - half_size;
                let z_pos = z as f32 * spacing - half_size;

                vertices.push(Vertex {
                    position: [x_pos, 0.0, z_pos],
                    uv: [
                        x as f32 / segments as f32,
                        z as f32 / segments as f32,
                    ],
                });
            }
        }

        // Generate triangle indices (counter-clockwise winding seen from +Y)
        let row = side as u32;
        for z in 0..segments {
            for x in 0..segments {
                let top_left = z * row + x;
                let top_right = top_left + 1;
                let bottom_left = (z + 1) * row + x;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        Self {
            vertices,
            indices,
            segments,
        }
    }

    pub fn segments(&self) -> u32 {
        self.segments
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_creation() {
        let grid = SurfaceGrid::new(512, 2.0);

        // Check vertex count: (segments + 1)^2
        assert_eq!(grid.vertices.len(), 513 * 513);

        // Check triangle count: segments^2 * 2 triangles * 3 indices
        assert_eq!(grid.indices.len(), 512 * 512 * 6);
    }

    #[test]
    fn test_grid_spans_extent_at_rest() {
        let grid = SurfaceGrid::new(4, 2.0);
        let first = grid.vertices.first().unwrap().position;
        let last = grid.vertices.last().unwrap().position;

        assert_eq!(first, [-1.0, 0.0, -1.0]);
        assert_eq!(last, [1.0, 0.0, 1.0]);
        assert!(grid.vertices.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn test_indices_in_bounds() {
        let grid = SurfaceGrid::new(7, 2.0);
        let count = grid.vertices.len() as u32;
        assert!(grid.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_triangles_face_up() {
        let grid = SurfaceGrid::new(3, 2.0);
        for tri in grid.indices.chunks(3) {
            let a = glam::Vec3::from_array(grid.vertices[tri[0] as usize].position);
            let b = glam::Vec3::from_array(grid.vertices[tri[1] as usize].position);
            let c = glam::Vec3::from_array(grid.vertices[tri[2] as usize].position);
            let normal = (b - a).cross(c - a);
            assert!(normal.y > 0.0, "triangle {:?} faces down", tri);
        }
    }

    #[test]
    fn test_zero_segments_still_builds_one_cell() {
        let grid = SurfaceGrid::new(0, 2.0);
        assert_eq!(grid.segments(), 1);
        assert_eq!(grid.vertices.len(), 4);
        assert_eq!(grid.index_count(), 6);
    }

    #[test]
    fn test_largest_grid_fits_buffer_limits() {
        let side = MAX_GRID_SEGMENTS as u64 + 1;
        let vertex_bytes = side * side * std::mem::size_of::<Vertex>() as u64;
        let index_bytes = (MAX_GRID_SEGMENTS as u64).pow(2) * 6 * 4;
        let default_max_buffer = wgpu::Limits::default().max_buffer_size;

        assert!(vertex_bytes <= default_max_buffer);
        assert!(index_bytes <= default_max_buffer);
        assert!(side * side <= u32::MAX as u64);
    }
}

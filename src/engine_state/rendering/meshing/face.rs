//! Face records: the compact per-face format handed to the renderer.

/// A single visible block face, packed into 8 bytes.
///
/// The vertex shader expands every record into a quad using the face id to
/// orient it and the AO byte to darken its corners.
///
/// # Memory Layout
/// - Local position: 3x u8 (3 bytes)
/// - Face id: u8
/// - Texture index: u8
/// - Ambient occlusion: u8, two bits per corner, corner 0 in the lowest bits
/// - Padding: 2 bytes, always zero
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FaceRecord {
    /// Chunk-local X coordinate of the block
    pub x: u8,
    /// Chunk-local Y coordinate of the block
    pub y: u8,
    /// Chunk-local Z coordinate of the block
    pub z: u8,
    /// `BlockSide` id of the face
    pub face: u8,
    /// Index of the texture in the texture array
    pub texture: u8,
    /// Packed ambient occlusion levels
    pub ao: u8,
    padding: [u8; 2],
}

impl FaceRecord {
    /// Creates a face record.
    pub fn new(x: u8, y: u8, z: u8, face: u8, texture: u8, ao: u8) -> Self {
        FaceRecord {
            x,
            y,
            z,
            face,
            texture,
            ao,
            padding: [0; 2],
        }
    }

    /// Occlusion level (0..=3) of one corner of the face.
    pub fn ao_level(&self, corner: usize) -> u8 {
        (self.ao >> (corner * 2)) & 0b11
    }
}

/// Views a face list as the flat byte buffer uploaded to the GPU.
pub fn face_bytes(faces: &[FaceRecord]) -> &[u8] {
    bytemuck::cast_slice(faces)
}

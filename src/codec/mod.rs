//! Flat binary layout for vertex streams: no header, three little-endian
//! `f32`s (x, y, z) per vertex, in emission order. A file of `n` vertices is
//! exactly `12 * n` bytes.

use std::io::{Read, Write};

use anyhow::Result;
use nalgebra::Point3;

use crate::errors::LSystemError;

/// Bytes per encoded vertex.
pub const VERTEX_STRIDE: usize = 3 * std::mem::size_of::<f32>();

pub fn encode(vertices: &[Point3<f32>]) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(vertices.len() * VERTEX_STRIDE);
    for vertex in vertices {
        for coord in vertex.coords.iter() {
            buffer.extend_from_slice(&coord.to_le_bytes());
        }
    }
    buffer
}

/// Decodes any whole number of vertices. Does not check segment pairing,
/// see [`decode_segments`] for that.
pub fn decode(buffer: &[u8]) -> Result<Vec<Point3<f32>>, LSystemError> {
    if buffer.len() % VERTEX_STRIDE != 0 {
        return Err(LSystemError::CorruptData { len: buffer.len() });
    }
    Ok(buffer
        .chunks_exact(VERTEX_STRIDE)
        .map(|record| {
            let coord = |i: usize| {
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&record[i * 4..i * 4 + 4]);
                f32::from_le_bytes(bytes)
            };
            Point3::new(coord(0), coord(1), coord(2))
        })
        .collect())
}

/// Like [`decode`], but also rejects a stream that can't be split into
/// (start, end) segment pairs.
pub fn decode_segments(buffer: &[u8]) -> Result<Vec<Point3<f32>>, LSystemError> {
    let vertices = decode(buffer)?;
    if vertices.len() % 2 != 0 {
        return Err(LSystemError::OddVertexCount {
            vertices: vertices.len(),
        });
    }
    Ok(vertices)
}

pub fn write_vertices<W: Write>(writer: &mut W, vertices: &[Point3<f32>]) -> Result<()> {
    writer.write_all(&encode(vertices))?;
    writer.flush()?;
    Ok(())
}

/// Reads the remainder of `reader` as a segment stream.
pub fn read_vertices<R: Read>(reader: &mut R) -> Result<Vec<Point3<f32>>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(decode_segments(&buffer)?)
}

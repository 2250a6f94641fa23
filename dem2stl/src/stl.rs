//! Binary STL serialization.
//!
//! A binary STL stream is an 80-byte free-text header, a little-endian `u32`
//! triangle count, then one 50-byte record per triangle:
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0-11  | normal (3 × `f32`) |
//! | 12-47 | three vertices (9 × `f32`) |
//! | 48-49 | attribute byte count, always zero |
//!
//! All fields are little-endian and written one by one, independent of the
//! in-memory layout of [`Triangle`].

use std::io::{ErrorKind, Read, Write};

use crate::error::{MeshError, Result};
use crate::geometry::{Triangle, Vertex3};

/// Length of the free-text header.
pub const HEADER_LEN: usize = 80;

/// Length of one triangle record.
pub const RECORD_LEN: usize = 50;

/// Header text written by this crate.
pub const DEFAULT_HEADER: &str = "STL by dem2stl";

/// Consumer of generated triangles.
pub trait TriangleSink {
    /// Accept the next triangle, in emission order.
    fn push(&mut self, triangle: &Triangle) -> Result<()>;
}

impl TriangleSink for Vec<Triangle> {
    fn push(&mut self, triangle: &Triangle) -> Result<()> {
        Vec::push(self, *triangle);
        Ok(())
    }
}

/// Total file length of a binary STL holding `count` triangles.
pub fn stl_len(count: u32) -> u64 {
    (HEADER_LEN + 4) as u64 + u64::from(count) * RECORD_LEN as u64
}

/// Streaming binary STL writer.
///
/// The triangle count goes into the stream before any record, so it has to
/// be known up front. [`StlWriter::finish`] checks that exactly that many
/// records were written.
///
/// # Example
///
/// ```ignore
/// use std::{fs::File, io::BufWriter};
/// use dem2stl::StlWriter;
///
/// let file = BufWriter::new(File::create("dem.stl")?);
/// let mut writer = StlWriter::new(file, "terrain", 1)?;
/// writer.write_triangle(&triangle)?;
/// writer.finish()?;
/// ```
pub struct StlWriter<W: Write> {
    inner: W,
    expected: u32,
    written: u32,
}

impl<W: Write> StlWriter<W> {
    /// Write the header and triangle count.
    ///
    /// Header text longer than 80 bytes is truncated; shorter text is padded
    /// with NUL bytes.
    pub fn new(mut inner: W, header: &str, count: u32) -> Result<Self> {
        let mut buf = [0u8; HEADER_LEN];
        let text = header.as_bytes();
        let len = text.len().min(HEADER_LEN);
        buf[..len].copy_from_slice(&text[..len]);

        inner.write_all(&buf)?;
        inner.write_all(&count.to_le_bytes())?;

        Ok(Self {
            inner,
            expected: count,
            written: 0,
        })
    }

    /// Append one triangle record.
    pub fn write_triangle(&mut self, triangle: &Triangle) -> Result<()> {
        let mut record = [0u8; RECORD_LEN];
        let fields = std::iter::once(&triangle.normal).chain(triangle.vertices.iter());
        for (slot, v) in record.chunks_exact_mut(12).zip(fields) {
            slot[0..4].copy_from_slice(&v.x.to_le_bytes());
            slot[4..8].copy_from_slice(&v.y.to_le_bytes());
            slot[8..12].copy_from_slice(&v.z.to_le_bytes());
        }
        // record[48..50] stays zero: unused attribute field

        self.inner.write_all(&record)?;
        self.written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Flush and return the inner writer.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::TriangleCountMismatch`] if the number of records
    /// differs from the count announced in [`StlWriter::new`].
    pub fn finish(mut self) -> Result<W> {
        self.inner.flush()?;
        if self.written != self.expected {
            return Err(MeshError::TriangleCountMismatch {
                expected: self.expected,
                actual: self.written,
            });
        }
        Ok(self.inner)
    }
}

impl<W: Write> TriangleSink for StlWriter<W> {
    fn push(&mut self, triangle: &Triangle) -> Result<()> {
        self.write_triangle(triangle)
    }
}

/// Summary of a binary STL stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StlSummary {
    /// Header text up to the first NUL byte.
    pub header: String,
    /// Triangle count from the header.
    pub triangle_count: u32,
    /// Minimum corner of the vertex bounding box.
    pub min: Vertex3,
    /// Maximum corner of the vertex bounding box.
    pub max: Vertex3,
}

impl StlSummary {
    /// Bounding box size along each axis.
    pub fn size(&self) -> Vertex3 {
        self.max - self.min
    }
}

/// Read a binary STL stream, handing every triangle to `visit`.
///
/// # Errors
///
/// Returns [`MeshError::InvalidStl`] if the stream ends before the announced
/// number of records or carries bytes after the last one.
pub fn read_stl<R: Read, F: FnMut(&Triangle)>(
    mut reader: R,
    mut visit: F,
) -> Result<StlSummary> {
    let mut head = [0u8; HEADER_LEN + 4];
    read_exact_or_truncated(&mut reader, &mut head, "header")?;

    let text_len = head[..HEADER_LEN]
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(HEADER_LEN);
    let header = String::from_utf8_lossy(&head[..text_len]).trim_end().to_string();
    let triangle_count = u32::from_le_bytes([head[80], head[81], head[82], head[83]]);

    let mut min = Vertex3::new(f32::MAX, f32::MAX, f32::MAX);
    let mut max = Vertex3::new(f32::MIN, f32::MIN, f32::MIN);
    let mut record = [0u8; RECORD_LEN];

    for _ in 0..triangle_count {
        read_exact_or_truncated(&mut reader, &mut record, "triangle records")?;
        let triangle = Triangle {
            normal: read_vec3(&record, 0),
            vertices: [
                read_vec3(&record, 12),
                read_vec3(&record, 24),
                read_vec3(&record, 36),
            ],
        };
        for v in &triangle.vertices {
            min = Vertex3::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z));
            max = Vertex3::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z));
        }
        visit(&triangle);
    }

    let mut probe = [0u8; 1];
    if reader.read(&mut probe)? != 0 {
        return Err(MeshError::InvalidStl(format!(
            "trailing data after {} triangles",
            triangle_count
        )));
    }

    if triangle_count == 0 {
        min = Vertex3::default();
        max = Vertex3::default();
    }

    Ok(StlSummary {
        header,
        triangle_count,
        min,
        max,
    })
}

fn read_exact_or_truncated<R: Read>(reader: &mut R, buf: &mut [u8], what: &str) -> Result<()> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => MeshError::InvalidStl(format!("truncated {}", what)),
        _ => MeshError::Io(e),
    })
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_vec3(data: &[u8], offset: usize) -> Vertex3 {
    Vertex3::new(
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    )
}

use std::io::BufRead;
use std::path::Path;

use super::{
    properties::{PlyDataType, PlyPropertyDefinition, PlyType},
    PlyError, PlyPropertyTrait,
};
use crate::pointcloud::PointCloud;

// vertices reserved up front, the rest grows as the body is read
const MAX_PREALLOCATED_VERTICES: usize = 1 << 20;

struct PlyHeader {
    pub vertex_count: usize,
    pub format: PlyType,
}

fn parse_header<R: BufRead>(reader: &mut R) -> Result<PlyHeader, PlyError> {
    let mut line = String::new();
    let mut vertex_count = None;
    let mut format = None;
    let mut is_ply = false;
    let mut in_vertex_element = false;
    let mut properties = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(PlyError::MalformedHeader("missing end_header"));
        }
        let trimmed = line.trim();
        let mut parts = trimmed.split_whitespace();

        match parts.next() {
            Some("ply") => is_ply = true,
            Some("end_header") => break,
            Some("format") => format = parts.next().map(|s| s.to_string()),
            Some("element") => {
                in_vertex_element = parts.next() == Some("vertex");
                if in_vertex_element {
                    vertex_count = parts.next().and_then(|s| s.parse::<usize>().ok());
                }
            }
            Some("property") if in_vertex_element => {
                let data_type = parts
                    .next()
                    .ok_or(PlyError::MalformedHeader("property without type"))?;
                let name = parts
                    .next()
                    .ok_or(PlyError::MalformedHeader("property without name"))?;
                properties.push(PlyPropertyDefinition {
                    name: name.to_string(),
                    data_type: PlyDataType::parse(data_type)?,
                });
            }
            _ => {}
        }
    }

    if !is_ply {
        return Err(PlyError::MalformedHeader("missing ply magic"));
    }

    match format.as_deref() {
        Some("binary_little_endian") => {}
        Some(other) => return Err(PlyError::UnsupportedFormat(other.to_string())),
        None => return Err(PlyError::MalformedHeader("missing format line")),
    }

    let vertex_count = vertex_count.ok_or(PlyError::MalformedHeader("missing vertex element"))?;
    let format = PlyType::detect_format(&properties)?;

    Ok(PlyHeader {
        vertex_count,
        format,
    })
}

/// Read a PLY point cloud from any buffered reader.
///
/// Only the vertex element is decoded; elements that follow it (e.g. faces) are ignored.
pub fn read_ply_from_reader<R: BufRead>(reader: &mut R) -> Result<PointCloud, PlyError> {
    let header = parse_header(reader)?;
    let mut buffer = vec![0u8; header.format.size_of()];

    let capacity = header.vertex_count.min(MAX_PREALLOCATED_VERTICES);
    let mut points = Vec::with_capacity(capacity);
    let mut colors = Vec::with_capacity(capacity);
    let mut normals = Vec::with_capacity(capacity);

    for _ in 0..header.vertex_count {
        reader.read_exact(&mut buffer)?;
        let property_entry = header.format.deserialize(&buffer)?;
        points.push(property_entry.to_point());
        if let Some(c) = property_entry.to_color() {
            colors.push(c);
        }
        if let Some(n) = property_entry.to_normal() {
            normals.push(n);
        }
    }

    let colors = (!colors.is_empty() && colors.len() == points.len()).then_some(colors);
    let normals = (!normals.is_empty() && normals.len() == points.len()).then_some(normals);

    Ok(PointCloud::new(points, colors, normals))
}

/// Read a PLY file in binary little endian format with automatic format detection.
pub fn read_ply_binary(path: impl AsRef<Path>) -> Result<PointCloud, PlyError> {
    let file = std::fs::File::open(path)?;
    let mut reader = std::io::BufReader::new(file);
    read_ply_from_reader(&mut reader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_xyz_rgb_ply(points: &[([f32; 3], [u8; 3])]) -> Vec<u8> {
        let mut data = format!(
            "ply\nformat binary_little_endian 1.0\ncomment fragment\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\nelement face 0\nproperty list uchar int vertex_indices\nend_header\n",
            points.len()
        )
        .into_bytes();
        for (p, c) in points {
            for v in p {
                data.extend_from_slice(&v.to_le_bytes());
            }
            data.extend_from_slice(c);
        }
        data
    }

    #[test]
    fn test_parse_header_basic() -> Result<(), PlyError> {
        let header_text = "ply\nformat binary_little_endian 1.0\nelement vertex 10\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
        let mut reader = std::io::BufReader::new(header_text.as_bytes());
        let header = parse_header(&mut reader)?;
        assert_eq!(header.vertex_count, 10);
        assert_eq!(header.format, PlyType::Xyz);
        Ok(())
    }

    #[test]
    fn test_parse_header_rejects_ascii() {
        let header_text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n";
        let mut reader = std::io::BufReader::new(header_text.as_bytes());
        assert!(matches!(
            parse_header(&mut reader),
            Err(PlyError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_parse_header_truncated() {
        let header_text = "ply\nformat binary_little_endian 1.0\nelement vertex 1\n";
        let mut reader = std::io::BufReader::new(header_text.as_bytes());
        assert!(matches!(
            parse_header(&mut reader),
            Err(PlyError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_read_ply_binary_xyz_rgb() -> Result<(), Box<dyn std::error::Error>> {
        let data = write_xyz_rgb_ply(&[
            ([0.0, 1.0, 2.0], [10, 20, 30]),
            ([3.0, 4.0, 5.0], [40, 50, 60]),
        ]);
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(&data)?;

        let pc = read_ply_binary(file.path())?;
        assert_eq!(pc.len(), 2);
        assert_eq!(pc.points()[1], [3.0, 4.0, 5.0]);
        assert_eq!(pc.colors(), Some(&[[10, 20, 30], [40, 50, 60]][..]));
        assert!(pc.normals().is_none());
        Ok(())
    }

    #[test]
    fn test_read_ply_oversized_vertex_count() {
        let mut data = format!(
            "ply\nformat binary_little_endian 1.0\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nend_header\n",
            u64::MAX
        )
        .into_bytes();
        for v in [1.0f32, 2.0, 3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }
        let mut reader = std::io::BufReader::new(data.as_slice());
        assert!(matches!(
            read_ply_from_reader(&mut reader),
            Err(PlyError::Io(_))
        ));
    }

    #[test]
    fn test_read_ply_truncated_body() {
        let mut data = write_xyz_rgb_ply(&[([0.0, 1.0, 2.0], [1, 2, 3])]);
        data.truncate(data.len() - 4);
        let mut reader = std::io::BufReader::new(data.as_slice());
        assert!(matches!(
            read_ply_from_reader(&mut reader),
            Err(PlyError::Io(_))
        ));
    }
}

use super::PlyError;

/// Vertex layouts understood by the PLY reader.
#[derive(Debug, PartialEq, Clone)]
pub enum PlyType {
    /// `x y z` as float32.
    Xyz,
    /// `x y z` as float32 followed by `red green blue` as uint8.
    XyzRgb,
    /// `x y z`, `red green blue` and `nx ny nz`.
    XyzRgbNormals,
    /// Any other vertex schema, decoded property by property.
    Dynamic(Vec<PlyPropertyDefinition>),
}

/// A single `property <type> <name>` entry of the vertex element.
#[derive(Debug, PartialEq, Clone)]
pub struct PlyPropertyDefinition {
    /// Property name.
    pub name: String,
    /// Scalar type.
    pub data_type: PlyDataType,
}

/// Scalar types of the PLY format.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum PlyDataType {
    /// float / float32
    Float32,
    /// double / float64
    Float64,
    /// char / int8
    Int8,
    /// uchar / uint8
    UInt8,
    /// short / int16
    Int16,
    /// ushort / uint16
    UInt16,
    /// int / int32
    Int32,
    /// uint / uint32
    UInt32,
}

impl PlyDataType {
    /// Size in bytes of one value.
    pub fn size(&self) -> usize {
        match self {
            PlyDataType::Float32 | PlyDataType::Int32 | PlyDataType::UInt32 => 4,
            PlyDataType::Float64 => 8,
            PlyDataType::Int16 | PlyDataType::UInt16 => 2,
            PlyDataType::Int8 | PlyDataType::UInt8 => 1,
        }
    }

    /// Parse the type keyword of a property line.
    pub fn parse(type_str: &str) -> Result<Self, PlyError> {
        match type_str {
            "float" | "float32" => Ok(PlyDataType::Float32),
            "double" | "float64" => Ok(PlyDataType::Float64),
            "char" | "int8" => Ok(PlyDataType::Int8),
            "uchar" | "uint8" => Ok(PlyDataType::UInt8),
            "short" | "int16" => Ok(PlyDataType::Int16),
            "ushort" | "uint16" => Ok(PlyDataType::UInt16),
            "int" | "int32" => Ok(PlyDataType::Int32),
            "uint" | "uint32" => Ok(PlyDataType::UInt32),
            other => Err(PlyError::UnsupportedProperty(other.to_string())),
        }
    }
}

/// Access to the attributes of a decoded vertex.
pub trait PlyPropertyTrait {
    /// The xyz coordinates.
    fn to_point(&self) -> [f64; 3];
    /// The rgb color, if the vertex carries one.
    fn to_color(&self) -> Option<[u8; 3]>;
    /// The normal, if the vertex carries one.
    fn to_normal(&self) -> Option<[f64; 3]>;
}

#[derive(Debug, bincode::Decode)]
struct XyzProperty {
    x: f32,
    y: f32,
    z: f32,
}

#[derive(Debug, bincode::Decode)]
struct XyzRgbProperty {
    x: f32,
    y: f32,
    z: f32,
    red: u8,
    green: u8,
    blue: u8,
}

#[derive(Debug, bincode::Decode)]
struct XyzRgbNormalsProperty {
    x: f32,
    y: f32,
    z: f32,
    red: u8,
    green: u8,
    blue: u8,
    nx: f32,
    ny: f32,
    nz: f32,
}

/// A vertex decoded from an arbitrary schema.
#[derive(Debug)]
pub struct DynamicProperty {
    properties: Vec<(String, f64)>,
}

impl DynamicProperty {
    fn parse_from_buffer(
        buffer: &[u8],
        schema: &[PlyPropertyDefinition],
    ) -> Result<Self, PlyError> {
        let mut properties = Vec::with_capacity(schema.len());
        let mut offset = 0;

        for prop_def in schema {
            let size = prop_def.data_type.size();
            let bytes = buffer
                .get(offset..offset + size)
                .ok_or(PlyError::MalformedHeader("vertex record shorter than schema"))?;

            let value = match prop_def.data_type {
                PlyDataType::Float32 => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
                PlyDataType::Float64 => f64::from_le_bytes([
                    bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
                ]),
                PlyDataType::Int8 => bytes[0] as i8 as f64,
                PlyDataType::UInt8 => bytes[0] as f64,
                PlyDataType::Int16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
                PlyDataType::UInt16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f64,
                PlyDataType::Int32 => i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
                PlyDataType::UInt32 => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64,
            };

            properties.push((prop_def.name.clone(), value));
            offset += size;
        }

        Ok(DynamicProperty { properties })
    }

    fn get(&self, name: &str) -> Option<f64> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

impl PlyPropertyTrait for DynamicProperty {
    fn to_point(&self) -> [f64; 3] {
        [
            self.get("x").unwrap_or(0.0),
            self.get("y").unwrap_or(0.0),
            self.get("z").unwrap_or(0.0),
        ]
    }

    fn to_color(&self) -> Option<[u8; 3]> {
        Some([
            self.get("red")? as u8,
            self.get("green")? as u8,
            self.get("blue")? as u8,
        ])
    }

    fn to_normal(&self) -> Option<[f64; 3]> {
        Some([self.get("nx")?, self.get("ny")?, self.get("nz")?])
    }
}

/// A decoded vertex.
pub enum PlyProperty {
    /// Vertex with xyz only.
    Xyz([f64; 3]),
    /// Vertex with xyz and color.
    XyzRgb([f64; 3], [u8; 3]),
    /// Vertex with xyz, color and normal.
    XyzRgbNormals([f64; 3], [u8; 3], [f64; 3]),
    /// Vertex decoded from a dynamic schema.
    Dynamic(DynamicProperty),
}

impl PlyType {
    /// Decode one vertex record.
    pub fn deserialize(&self, buffer: &[u8]) -> Result<PlyProperty, PlyError> {
        let config = bincode::config::standard()
            .with_little_endian()
            .with_fixed_int_encoding();
        match self {
            PlyType::Xyz => {
                let (p, _): (XyzProperty, usize) = bincode::decode_from_slice(buffer, config)?;
                Ok(PlyProperty::Xyz([p.x as f64, p.y as f64, p.z as f64]))
            }
            PlyType::XyzRgb => {
                let (p, _): (XyzRgbProperty, usize) = bincode::decode_from_slice(buffer, config)?;
                Ok(PlyProperty::XyzRgb(
                    [p.x as f64, p.y as f64, p.z as f64],
                    [p.red, p.green, p.blue],
                ))
            }
            PlyType::XyzRgbNormals => {
                let (p, _): (XyzRgbNormalsProperty, usize) =
                    bincode::decode_from_slice(buffer, config)?;
                Ok(PlyProperty::XyzRgbNormals(
                    [p.x as f64, p.y as f64, p.z as f64],
                    [p.red, p.green, p.blue],
                    [p.nx as f64, p.ny as f64, p.nz as f64],
                ))
            }
            PlyType::Dynamic(ref schema) => Ok(PlyProperty::Dynamic(
                DynamicProperty::parse_from_buffer(buffer, schema)?,
            )),
        }
    }

    /// Size in bytes of one vertex record.
    pub fn size_of(&self) -> usize {
        match self {
            PlyType::Xyz => 12,
            PlyType::XyzRgb => 15,
            PlyType::XyzRgbNormals => 27,
            PlyType::Dynamic(ref props) => props.iter().map(|p| p.data_type.size()).sum(),
        }
    }

    /// Pick the fastest decoder for a vertex schema.
    pub fn detect_format(properties: &[PlyPropertyDefinition]) -> Result<Self, PlyError> {
        let has = |names: &[&str], ty: PlyDataType, offset: usize| {
            names.iter().enumerate().all(|(i, name)| {
                properties
                    .get(offset + i)
                    .is_some_and(|p| p.name == *name && p.data_type == ty)
            })
        };

        if !["x", "y", "z"]
            .iter()
            .all(|n| properties.iter().any(|p| p.name == *n))
        {
            return Err(PlyError::MalformedHeader("vertex element has no x, y, z"));
        }

        let xyz = has(&["x", "y", "z"], PlyDataType::Float32, 0);
        let rgb = has(&["red", "green", "blue"], PlyDataType::UInt8, 3);
        let normals = has(&["nx", "ny", "nz"], PlyDataType::Float32, 6);

        Ok(match (properties.len(), xyz, rgb, normals) {
            (3, true, _, _) => PlyType::Xyz,
            (6, true, true, _) => PlyType::XyzRgb,
            (9, true, true, true) => PlyType::XyzRgbNormals,
            _ => PlyType::Dynamic(properties.to_vec()),
        })
    }
}

impl PlyPropertyTrait for PlyProperty {
    fn to_point(&self) -> [f64; 3] {
        match self {
            PlyProperty::Xyz(p) | PlyProperty::XyzRgb(p, _) | PlyProperty::XyzRgbNormals(p, _, _) => *p,
            PlyProperty::Dynamic(property) => property.to_point(),
        }
    }

    fn to_color(&self) -> Option<[u8; 3]> {
        match self {
            PlyProperty::Xyz(_) => None,
            PlyProperty::XyzRgb(_, c) | PlyProperty::XyzRgbNormals(_, c, _) => Some(*c),
            PlyProperty::Dynamic(property) => property.to_color(),
        }
    }

    fn to_normal(&self) -> Option<[f64; 3]> {
        match self {
            PlyProperty::XyzRgbNormals(_, _, n) => Some(*n),
            PlyProperty::Xyz(_) | PlyProperty::XyzRgb(_, _) => None,
            PlyProperty::Dynamic(property) => property.to_normal(),
        }
    }
}

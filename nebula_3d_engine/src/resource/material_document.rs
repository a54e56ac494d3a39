/// Declarative material document.
///
/// JSON object whose `texture` key may repeat: every occurrence is one
/// texture slot, in order. The codec is hand-written on top of serde so that
/// repeated keys survive parsing and saving.
///
/// Unknown top-level keys and unknown keys inside a uniform object are
/// collected (the material logs them) and otherwise ignored. Unknown keys
/// inside a texture object make the whole document invalid.
///
/// ```text
/// {
///   "shader": "shaders/rock.shd",
///   "texture": { "source": "rock_albedo.png", "srgb": true },
///   "texture": { "source": "" },
///   "defines": ["ALPHA_CUTOUT"],
///   "uniforms": [ { "name": "u_roughness", "float_value": 0.5 } ],
///   "shininess": 4.0,
///   "alpha_ref": 0.3,
///   "color": [1, 1, 1]
/// }
/// ```

use std::fmt;
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::resource::texture::TextureFlags;
use crate::resource::ResourcePath;

// ===== TEXTURE ENTRY =====

/// Texture filter mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFilter {
    Point,
    Anisotropic,
}

impl TextureFilter {
    /// Parse a filter name as written in material documents
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "point" => Some(Self::Point),
            "anisotropic" => Some(Self::Anisotropic),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Anisotropic => "anisotropic",
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// One `texture` object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextureEntry {
    /// Path relative to the material directory, rooted if it starts with `/`;
    /// empty for an unbound slot
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atlas_size: Option<i32>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub srgb: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub u_clamp: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub v_clamp: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub w_clamp: bool,
    /// `point` or `anisotropic`; other names are reported and ignored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mag_filter: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub keep_data: bool,
}

impl TextureEntry {
    /// Texture flags described by this entry
    pub fn flags(&self) -> TextureFlags {
        let mut flags = TextureFlags::empty();
        flags.set(TextureFlags::SRGB, self.srgb);
        flags.set(TextureFlags::U_CLAMP, self.u_clamp);
        flags.set(TextureFlags::V_CLAMP, self.v_clamp);
        flags.set(TextureFlags::W_CLAMP, self.w_clamp);
        match self.min_filter.as_deref().and_then(TextureFilter::parse) {
            Some(TextureFilter::Point) => flags |= TextureFlags::MIN_POINT,
            Some(TextureFilter::Anisotropic) => flags |= TextureFlags::MIN_ANISOTROPIC,
            None => {}
        }
        match self.mag_filter.as_deref().and_then(TextureFilter::parse) {
            Some(TextureFilter::Point) => flags |= TextureFlags::MAG_POINT,
            Some(TextureFilter::Anisotropic) => flags |= TextureFlags::MAG_ANISOTROPIC,
            None => {}
        }
        flags
    }

    /// Filter names that are neither `point` nor `anisotropic`
    pub fn unknown_filters(&self) -> impl Iterator<Item = &str> {
        [self.min_filter.as_deref(), self.mag_filter.as_deref()]
            .into_iter()
            .flatten()
            .filter(|name| TextureFilter::parse(name).is_none())
    }

    /// Entry describing a bound texture
    pub fn bound(source: String, flags: TextureFlags, atlas_size: i32, keep_data: bool) -> Self {
        let filter = |point, anisotropic| {
            let filter = if flags.contains(point) {
                TextureFilter::Point
            } else if flags.contains(anisotropic) {
                TextureFilter::Anisotropic
            } else {
                return None;
            };
            Some(filter.as_str().to_string())
        };
        Self {
            source,
            atlas_size: (atlas_size > 0).then_some(atlas_size),
            srgb: flags.contains(TextureFlags::SRGB),
            u_clamp: flags.contains(TextureFlags::U_CLAMP),
            v_clamp: flags.contains(TextureFlags::V_CLAMP),
            w_clamp: flags.contains(TextureFlags::W_CLAMP),
            min_filter: filter(TextureFlags::MIN_POINT, TextureFlags::MIN_ANISOTROPIC),
            mag_filter: filter(TextureFlags::MAG_POINT, TextureFlags::MAG_ANISOTROPIC),
            keep_data,
        }
    }
}

// ===== UNIFORM ENTRY =====

/// Typed value of a uniform entry, named after its document key
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformEntryValue {
    Float(f32),
    Int(i32),
    Vec3([f32; 3]),
    Color([f32; 3]),
    Time,
    Matrix([f32; 16]),
}

/// One object of the `uniforms` array
#[derive(Debug, Clone, PartialEq)]
pub struct UniformEntry {
    pub name: String,
    pub value: Option<UniformEntryValue>,
    pub unknown_fields: Vec<String>,
}

impl UniformEntry {
    pub fn new(name: impl Into<String>, value: UniformEntryValue) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
            unknown_fields: Vec::new(),
        }
    }
}

struct UniformEntryVisitor;

impl<'de> Visitor<'de> for UniformEntryVisitor {
    type Value = UniformEntry;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a uniform object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<UniformEntry, A::Error> {
        let mut name = None;
        let mut value = None;
        let mut unknown_fields = Vec::new();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "name" => name = Some(map.next_value::<String>()?),
                "float_value" => value = Some(UniformEntryValue::Float(map.next_value()?)),
                "int_value" => value = Some(UniformEntryValue::Int(map.next_value()?)),
                "vec3" => value = Some(UniformEntryValue::Vec3(map.next_value()?)),
                "color" => value = Some(UniformEntryValue::Color(map.next_value()?)),
                "matrix_value" => value = Some(UniformEntryValue::Matrix(map.next_value()?)),
                "time" => {
                    map.next_value::<IgnoredAny>()?;
                    value = Some(UniformEntryValue::Time);
                }
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    unknown_fields.push(key);
                }
            }
        }

        Ok(UniformEntry {
            name: name.ok_or_else(|| de::Error::missing_field("name"))?,
            value,
            unknown_fields,
        })
    }
}

impl<'de> Deserialize<'de> for UniformEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(UniformEntryVisitor)
    }
}

impl Serialize for UniformEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("name", &self.name)?;
        match &self.value {
            Some(UniformEntryValue::Float(v)) => map.serialize_entry("float_value", v)?,
            Some(UniformEntryValue::Int(v)) => map.serialize_entry("int_value", v)?,
            Some(UniformEntryValue::Vec3(v)) => map.serialize_entry("vec3", v)?,
            Some(UniformEntryValue::Color(v)) => map.serialize_entry("color", v)?,
            Some(UniformEntryValue::Time) => map.serialize_entry("time", &0)?,
            Some(UniformEntryValue::Matrix(v)) => map.serialize_entry("matrix_value", v)?,
            None => {}
        }
        map.end()
    }
}

// ===== DOCUMENT =====

/// Parsed material document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialDocument {
    pub shader: Option<String>,
    pub layer_count: Option<u32>,
    /// One entry per `texture` key, in slot order
    pub textures: Vec<TextureEntry>,
    pub defines: Vec<String>,
    pub uniforms: Vec<UniformEntry>,
    pub shininess: Option<f32>,
    pub alpha_ref: Option<f32>,
    pub color: Option<[f32; 3]>,
    /// Ignored top-level keys, in document order
    pub unknown_fields: Vec<String>,
}

impl MaterialDocument {
    /// Parse the document stored at `path`
    pub fn parse(path: &ResourcePath, data: &[u8]) -> Result<Self> {
        serde_json::from_slice(data).map_err(|e| Error::malformed(path.as_str(), e))
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::InvalidResource(format!("Cannot serialize material: {}", e)))
    }
}

struct MaterialDocumentVisitor;

impl<'de> Visitor<'de> for MaterialDocumentVisitor {
    type Value = MaterialDocument;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a material object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<MaterialDocument, A::Error> {
        let mut document = MaterialDocument::default();

        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "shader" => document.shader = Some(map.next_value()?),
                "layer_count" => document.layer_count = Some(map.next_value()?),
                "texture" => document.textures.push(map.next_value()?),
                "defines" => document.defines = map.next_value()?,
                "uniforms" => document.uniforms = map.next_value()?,
                "shininess" => document.shininess = Some(map.next_value()?),
                "alpha_ref" => document.alpha_ref = Some(map.next_value()?),
                "color" => document.color = Some(map.next_value()?),
                _ => {
                    map.next_value::<IgnoredAny>()?;
                    document.unknown_fields.push(key);
                }
            }
        }

        Ok(document)
    }
}

impl<'de> Deserialize<'de> for MaterialDocument {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(MaterialDocumentVisitor)
    }
}

impl Serialize for MaterialDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(shader) = &self.shader {
            map.serialize_entry("shader", shader)?;
        }
        if let Some(layer_count) = &self.layer_count {
            map.serialize_entry("layer_count", layer_count)?;
        }
        for texture in &self.textures {
            map.serialize_entry("texture", texture)?;
        }
        map.serialize_entry("defines", &self.defines)?;
        map.serialize_entry("uniforms", &self.uniforms)?;
        if let Some(shininess) = &self.shininess {
            map.serialize_entry("shininess", shininess)?;
        }
        if let Some(alpha_ref) = &self.alpha_ref {
            map.serialize_entry("alpha_ref", alpha_ref)?;
        }
        if let Some(color) = &self.color {
            map.serialize_entry("color", color)?;
        }
        map.end()
    }
}

#[cfg(test)]
#[path = "material_document_tests.rs"]
mod tests;

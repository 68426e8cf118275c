use serde::{
    de::DeserializeOwned, de::SeqAccess, ser::Error as SerError, Deserialize, Deserializer,
    Serialize, Serializer,
};
use std::fmt;

/// Lottie layer type for a null (transform only) layer.
pub const LAYER_NULL: u8 = 3;
/// Lottie layer type for a shape layer.
pub const LAYER_SHAPE: u8 = 4;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LottieJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    pub ip: f32,
    pub op: f32,
    pub fr: f32,
    pub w: u32,
    pub h: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddd: Option<u8>,
    pub layers: Vec<Layer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<Asset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl LottieJson {
    /// Duration in frames (`op - ip`).
    pub fn duration_frames(&self) -> f32 {
        self.op - self.ip
    }

    pub fn layer_by_id(&self, id: &str) -> Option<&Layer> {
        self.layers
            .iter()
            .find(|layer| layer.layer_id.as_deref() == Some(id))
    }
}

/// Document metadata block (`meta`).
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Meta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub g: Option<String>, // Generator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub a: Option<String>, // Author
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<String>, // Keywords
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub d: Option<String>, // Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tc: Option<String>, // Theme color
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Layer {
    #[serde(default)]
    pub ty: u8, // 3 = null, 4 = shape
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ind: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    #[serde(default, rename = "ln", skip_serializing_if = "Option::is_none")]
    pub layer_id: Option<String>, // Stable id of the source element
    #[serde(default)]
    pub ip: f32,
    #[serde(default)]
    pub op: f32,
    #[serde(default)]
    pub st: f32,
    #[serde(default = "default_one")]
    pub sr: f32,
    #[serde(default)]
    pub ks: Transform,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ao: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ddd: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hd: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bm: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shapes: Option<Vec<Shape>>,
}

fn default_one() -> f32 {
    1.0
}

impl Layer {
    pub fn is_shape(&self) -> bool {
        self.ty == LAYER_SHAPE
    }
}

// Shapes

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "ty")]
pub enum Shape {
    #[serde(rename = "gr")]
    Group(GroupShape),
    #[serde(rename = "rc")]
    Rect(RectShape),
    #[serde(rename = "el")]
    Ellipse(EllipseShape),
    #[serde(rename = "fl")]
    Fill(FillShape),
    #[serde(rename = "st")]
    Stroke(StrokeShape),
    #[serde(rename = "tr")]
    Transform(TransformShape),
    #[serde(rename = "sh")]
    Path(PathShape),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GroupShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub np: Option<u32>, // Number of properties
    pub it: Vec<Shape>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RectShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    pub s: Property<Vec2>,
    pub p: Property<Vec2>,
    pub r: Property<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EllipseShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    pub s: Property<Vec2>,
    pub p: Property<Vec2>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FillShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    pub c: Property<Vec4>,
    pub o: Property<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<u8>, // Fill rule: 1 = non-zero, 2 = even-odd
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StrokeShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    pub c: Property<Vec4>,
    pub w: Property<f32>,
    pub o: Property<f32>,
    #[serde(default)]
    pub lc: u8, // 1 = butt, 2 = round, 3 = square
    #[serde(default)]
    pub lj: u8, // 1 = miter, 2 = round, 3 = bevel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ml: Option<f32>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PathShape {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    pub ks: Property<BezierPath>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TransformShape {
    #[serde(flatten)]
    pub t: Transform,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Transform {
    #[serde(default)]
    pub a: Property<Vec3DefaultZero>, // Anchor
    #[serde(default)]
    pub p: PositionProperty,
    #[serde(default)]
    pub s: Property<Vec3Scale>, // Percent, z defaults to 100
    #[serde(default, alias = "rz")]
    pub r: Property<f32>, // Degrees
    #[serde(default)]
    pub o: Property<f32>, // 0..100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sk: Option<Property<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sa: Option<Property<f32>>,
}

impl Transform {
    /// Static transform with every property set to a concrete value.
    pub fn fixed(anchor: Vec2, position: Vec2, scale: Vec2, rotation: f32, opacity: f32) -> Self {
        Transform {
            a: Property::fixed(Vec3DefaultZero([anchor[0], anchor[1], 0.0])),
            p: PositionProperty::Unified(Property::fixed(Vec3DefaultZero([
                position[0],
                position[1],
                0.0,
            ]))),
            s: Property::fixed(Vec3Scale([scale[0], scale[1], 100.0])),
            r: Property::fixed(rotation),
            o: Property::fixed(opacity),
            sk: None,
            sa: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum PositionProperty {
    Unified(Property<Vec3DefaultZero>),
    Split {
        x: Property<f32>,
        y: Property<f32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        z: Option<Property<f32>>,
    },
}

impl Default for PositionProperty {
    fn default() -> Self {
        PositionProperty::Unified(Property::default())
    }
}

impl PositionProperty {
    pub fn is_animated(&self) -> bool {
        match self {
            PositionProperty::Unified(p) => p.is_animated(),
            PositionProperty::Split { x, y, .. } => x.is_animated() || y.is_animated(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Property<T> {
    #[serde(default)]
    pub a: u8,
    #[serde(default, skip_serializing_if = "Value::is_default")]
    #[serde(bound(deserialize = "T: DeserializeOwned"))]
    pub k: Value<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ix: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
}

impl<T> Default for Property<T> {
    fn default() -> Self {
        Property {
            a: 0,
            k: Value::Default,
            ix: None,
            x: None,
        }
    }
}

impl<T> Property<T> {
    pub fn fixed(value: T) -> Self {
        Property {
            a: 0,
            k: Value::Static(value),
            ix: None,
            x: None,
        }
    }

    pub fn animated(keyframes: Vec<Keyframe<T>>) -> Self {
        Property {
            a: 1,
            k: Value::Animated(keyframes),
            ix: None,
            x: None,
        }
    }

    pub fn is_animated(&self) -> bool {
        matches!(self.k, Value::Animated(_))
    }

    pub fn keyframes(&self) -> &[Keyframe<T>] {
        match &self.k {
            Value::Animated(keys) => keys,
            _ => &[],
        }
    }

    pub fn static_value(&self) -> Option<&T> {
        match &self.k {
            Value::Static(v) => Some(v),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value<T> {
    Default,
    Static(T),
    Animated(Vec<Keyframe<T>>),
}

impl<T> Value<T> {
    pub fn is_default(&self) -> bool {
        matches!(self, Value::Default)
    }
}

// Lottie writes `k` bare: a value when static, a keyframe list when animated.
impl<T: Serialize> Serialize for Value<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Default => serializer.serialize_none(),
            Value::Static(v) => v.serialize(serializer),
            Value::Animated(keys) => keys.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Value<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = serde_json::Value::deserialize(deserializer)?;

        if v.is_null() {
            return Ok(Value::Default);
        }

        if let Ok(keyframes) = serde_json::from_value::<Vec<Keyframe<T>>>(v.clone()) {
            return Ok(Value::Animated(keyframes));
        }

        if let Ok(val) = serde_json::from_value::<T>(v.clone()) {
            return Ok(Value::Static(val));
        }

        if let Ok(vec) = serde_json::from_value::<Vec<T>>(v) {
            if let Some(first) = vec.into_iter().next() {
                return Ok(Value::Static(first));
            }
        }

        Ok(Value::Default)
    }
}

impl<T> Default for Value<T> {
    fn default() -> Self {
        Value::Default
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub struct Keyframe<T> {
    pub t: f32,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_keyframe_value",
        deserialize_with = "deserialize_keyframe_value"
    )]
    pub s: Option<T>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_keyframe_value",
        deserialize_with = "deserialize_keyframe_value"
    )]
    pub e: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub i: Option<BezierTangent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o: Option<BezierTangent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ti: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<u8>,
}

impl<T> Keyframe<T> {
    /// Keyframe carrying only a time and a start value.
    pub fn at(t: f32, value: T) -> Self {
        Keyframe {
            t,
            s: Some(value),
            e: None,
            i: None,
            o: None,
            to: None,
            ti: None,
            h: None,
        }
    }

    pub fn is_hold(&self) -> bool {
        self.h == Some(1)
    }
}

// Keyframe values are always arrays in Lottie, scalars included.
fn serialize_keyframe_value<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    let is_scalar = serde_json::to_value(value)
        .map_err(SerError::custom)?
        .is_number();
    match value {
        Some(inner) if is_scalar => std::slice::from_ref(inner).serialize(serializer),
        _ => value.serialize(serializer),
    }
}

fn deserialize_keyframe_value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    if v.is_null() {
        return Ok(None);
    }

    if let Ok(val) = serde_json::from_value(v.clone()) {
        return Ok(Some(val));
    }

    // Scalars arrive wrapped as `[v]`.
    if let Ok(vec) = serde_json::from_value::<Vec<T>>(v) {
        if let Some(first) = vec.into_iter().next() {
            return Ok(Some(first));
        }
    }

    Ok(None)
}

pub type Vec2 = [f32; 2];
pub type Vec3 = [f32; 3];
pub type Vec4 = [f32; 4];

/// Bezier tangent control points for keyframe easing
/// Matches the JSON format: {"x": [0.48], "y": [1]}
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BezierTangent {
    pub x: Vec<f32>,
    pub y: Vec<f32>,
}

impl BezierTangent {
    pub fn new(x: f32, y: f32) -> Self {
        BezierTangent {
            x: vec![x],
            y: vec![y],
        }
    }
}

// Wrapper for Vec3 with Z defaulting to 0.0
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3DefaultZero(pub Vec3);

impl Default for Vec3DefaultZero {
    fn default() -> Self {
        Vec3DefaultZero([0.0, 0.0, 0.0])
    }
}

impl<'de> Deserialize<'de> for Vec3DefaultZero {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_vec3(deserializer, 0.0).map(Vec3DefaultZero)
    }
}

// Wrapper for Vec3 with Z defaulting to 100.0 (for Scale)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec3Scale(pub Vec3);

impl Default for Vec3Scale {
    fn default() -> Self {
        Vec3Scale([100.0, 100.0, 100.0])
    }
}

impl<'de> Deserialize<'de> for Vec3Scale {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserialize_vec3(deserializer, 100.0).map(Vec3Scale)
    }
}

fn deserialize_vec3<'de, D>(deserializer: D, default_z: f32) -> Result<Vec3, D::Error>
where
    D: Deserializer<'de>,
{
    struct Vec3Visitor(f32);
    impl<'de> serde::de::Visitor<'de> for Vec3Visitor {
        type Value = Vec3;
        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a sequence of 2 or 3 floats")
        }
        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let x = seq.next_element()?.unwrap_or(0.0);
            let y = seq.next_element()?.unwrap_or(0.0);
            let z = seq.next_element()?.unwrap_or(self.0);
            while seq.next_element::<f32>()?.is_some() {}
            Ok([x, y, z])
        }
    }
    deserializer.deserialize_seq(Vec3Visitor(default_z))
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct BezierPath {
    #[serde(default)]
    pub c: bool,
    #[serde(default)]
    pub i: Vec<Vec2>,
    #[serde(default)]
    pub o: Vec<Vec2>,
    #[serde(default)]
    pub v: Vec<Vec2>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Asset {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nm: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layers: Option<Vec<Layer>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub u: Option<String>, // Directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p: Option<String>, // File name or data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<u8>, // 1 when `p` is embedded
}

use crate::model::SolverOpts;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Scene document root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneDef {
    /// Solver name.
    pub name: String,
    /// Free-form metadata, carried through unchanged.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Solver-level constants.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, f64>,
    /// Solver options. Absent means defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solver: Option<SolverOpts>,
    /// Splines in resolution order.
    #[serde(default)]
    pub splines: Vec<SplineDef>,
}

/// One spline record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SplineDef {
    /// Spline name.
    pub name: String,
    /// Channels in resolution order.
    #[serde(default)]
    pub channels: Vec<ChannelDef>,
}

/// One channel record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelDef {
    /// Channel name.
    pub name: String,
    /// Default method in shorthand form (`"cubic"`, `"hermite{deriv=1}"`). Absent means linear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<String>,
    /// Raw-index keyframe positions.
    #[serde(default, skip_serializing_if = "is_false")]
    pub use_indices: bool,
    /// Output clamp `[min, max]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_max: Option<[f64; 2]>,
    /// Keyframes, any order.
    #[serde(default)]
    pub keyframes: Vec<KeyframeDef>,
}

fn is_false(v: &bool) -> bool {
    !*v
}

/// One keyframe record.
///
/// JSON forms: `[at, value]`, `[at, value, method]`, `[at, value, method, {params}]`, or an
/// object with the same field names. `value` is a number or an expression string.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyframeDef {
    /// Position.
    pub at: f64,
    /// Literal or expression.
    pub value: ValueDef,
    /// Method name or shorthand; absent means the channel default.
    pub method: Option<String>,
    /// Method parameters, e.g. `{"deriv": 1.5}` or `{"cp": [0.6, 6, 0.7, 5]}`.
    pub params: BTreeMap<String, ParamDef>,
}

/// Keyframe value in a scene document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueDef {
    /// Number.
    Num(f64),
    /// Expression source.
    Expr(String),
}

/// Method parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamDef {
    /// Single number.
    One(f64),
    /// List of numbers.
    Many(Vec<f64>),
}

impl ParamDef {
    /// Values as a slice.
    pub fn values(&self) -> &[f64] {
        match self {
            Self::One(v) => std::slice::from_ref(v),
            Self::Many(v) => v,
        }
    }
}

impl<'de> Deserialize<'de> for KeyframeDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Pair(f64, ValueDef),
            Triple(f64, ValueDef, Option<String>),
            Quad(f64, ValueDef, Option<String>, BTreeMap<String, ParamDef>),
            Obj {
                at: f64,
                value: ValueDef,
                #[serde(default)]
                method: Option<String>,
                #[serde(default)]
                params: BTreeMap<String, ParamDef>,
            },
        }

        let (at, value, method, params) = match Repr::deserialize(deserializer)? {
            Repr::Pair(at, value) => (at, value, None, BTreeMap::new()),
            Repr::Triple(at, value, method) => (at, value, method, BTreeMap::new()),
            Repr::Quad(at, value, method, params) => (at, value, method, params),
            Repr::Obj {
                at,
                value,
                method,
                params,
            } => (at, value, method, params),
        };
        Ok(Self {
            at,
            value,
            method,
            params,
        })
    }
}

impl Serialize for KeyframeDef {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let len = match (&self.method, self.params.is_empty()) {
            (_, false) => 4,
            (Some(_), true) => 3,
            (None, true) => 2,
        };
        let mut seq = serializer.serialize_seq(Some(len))?;
        seq.serialize_element(&self.at)?;
        seq.serialize_element(&self.value)?;
        if len >= 3 {
            seq.serialize_element(&self.method)?;
        }
        if len == 4 {
            seq.serialize_element(&self.params)?;
        }
        seq.end()
    }
}

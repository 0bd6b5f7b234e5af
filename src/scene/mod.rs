//! Scene documents: the JSON boundary for loading and saving solvers.

mod model;

pub use model::{ChannelDef, KeyframeDef, ParamDef, SceneDef, SplineDef, ValueDef};

use crate::foundation::error::{SplinalError, SplinalResult};
use crate::interp::Method;
use crate::model::{Channel, Keyframe, KeyframeValue, Solver, SolverOpts, Spline};
use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

impl SceneDef {
    /// Parse a scene from JSON text.
    pub fn from_json_str(s: &str) -> SplinalResult<Self> {
        serde_json::from_str(s).map_err(|e| SplinalError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> SplinalResult<Self> {
        serde_json::from_reader(r).map_err(|e| SplinalError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> SplinalResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).with_context(|| format!("open scene '{}'", path.display()))?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty-printed JSON.
    pub fn to_json_string_pretty(&self) -> SplinalResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SplinalError::serde(format!("serialize scene JSON: {e}")))
    }

    /// Write pretty-printed JSON to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> SplinalResult<()> {
        let path = path.as_ref();
        let json = self.to_json_string_pretty()?;
        std::fs::write(path, json).with_context(|| format!("write scene '{}'", path.display()))?;
        Ok(())
    }
}

impl Solver {
    /// Build a solver from a scene document.
    pub fn from_scene(scene: &SceneDef) -> SplinalResult<Self> {
        let opts = scene.solver.clone().unwrap_or_default();
        let mut solver = Solver::with_opts(scene.name.clone(), opts)?;
        *solver.metadata_mut() = scene.metadata.clone();
        for (name, value) in &scene.variables {
            solver.set_variable(name.clone(), *value)?;
        }
        for spline_def in &scene.splines {
            let spline = solver.add_spline(Spline::new(spline_def.name.clone()))?;
            for channel_def in &spline_def.channels {
                let at_channel = |e| located(&spline_def.name, &channel_def.name, e);
                let channel =
                    spline.add_channel(channel_from_def(channel_def).map_err(at_channel)?)?;
                for k in &channel_def.keyframes {
                    channel
                        .add_keyframe(keyframe_from_def(k).map_err(at_channel)?)
                        .map_err(at_channel)?;
                }
            }
        }
        Ok(solver)
    }

    /// Snapshot this solver as a scene document.
    pub fn to_scene(&self) -> SceneDef {
        let solver = (self.opts() != &SolverOpts::default()).then(|| self.opts().clone());
        SceneDef {
            name: self.name().to_owned(),
            metadata: self.metadata().clone(),
            variables: self.variables().clone(),
            solver,
            splines: self
                .splines()
                .map(|s| SplineDef {
                    name: s.name().to_owned(),
                    channels: s.channels().map(channel_to_def).collect(),
                })
                .collect(),
        }
    }
}

/// Prefix value errors with the `spline.channel` they came from; other kinds pass through.
fn located(spline: &str, channel: &str, e: SplinalError) -> SplinalError {
    match e {
        SplinalError::Value(msg) => SplinalError::value(format!("{spline}.{channel}: {msg}")),
        other => other,
    }
}

fn channel_from_def(def: &ChannelDef) -> SplinalResult<Channel> {
    let mut channel = Channel::new(def.name.clone()).with_index_mode(def.use_indices);
    if let Some(m) = &def.interpolation {
        channel.set_default_method(m.parse()?);
    }
    if let Some([lo, hi]) = def.min_max {
        channel.set_bounds(Some((lo, hi)))?;
    }
    Ok(channel)
}

fn keyframe_from_def(def: &KeyframeDef) -> SplinalResult<Keyframe> {
    let value = match &def.value {
        ValueDef::Num(v) => KeyframeValue::Literal(*v),
        ValueDef::Expr(src) => KeyframeValue::parse(src)?,
    };
    let method = match &def.method {
        Some(name) => {
            let mut m: Method = name.parse()?;
            for (key, p) in &def.params {
                m.set_param(key, p.values())?;
            }
            Some(m)
        }
        None if def.params.is_empty() => None,
        None => {
            return Err(SplinalError::value(format!(
                "keyframe at {} has parameters but no method",
                def.at
            )));
        }
    };
    Ok(Keyframe {
        at: def.at,
        value,
        method,
    })
}

fn channel_to_def(channel: &Channel) -> ChannelDef {
    ChannelDef {
        name: channel.name().to_owned(),
        interpolation: Some(channel.default_method().to_string()),
        use_indices: channel.index_mode(),
        min_max: channel.bounds().map(|(lo, hi)| [lo, hi]),
        keyframes: channel.keyframes().iter().map(keyframe_to_def).collect(),
    }
}

fn keyframe_to_def(k: &Keyframe) -> KeyframeDef {
    let value = match &k.value {
        KeyframeValue::Literal(v) => ValueDef::Num(*v),
        KeyframeValue::Expr(e) => ValueDef::Expr(e.source().to_owned()),
    };
    let (method, params) = match &k.method {
        Some(m) => (
            Some(m.kind().name().to_owned()),
            m.params()
                .into_iter()
                .map(|(key, values)| {
                    let p = match values.as_slice() {
                        [v] => ParamDef::One(*v),
                        _ => ParamDef::Many(values),
                    };
                    (key.to_owned(), p)
                })
                .collect(),
        ),
        None => (None, Default::default()),
    };
    KeyframeDef {
        at: k.at,
        value,
        method,
        params,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/mod.rs"]
mod tests;

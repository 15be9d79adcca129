//! Editable layer stack for compositing auxiliary height contributions
//! (hand-painted touch-ups, a secondary biome pass, etc.) on top of the
//! generated base, independent of the pipeline itself.
//!
//! Serialization follows the wrapper-struct idiom from the teacher's
//! `history::persistence::serialize` (a versioned outer struct wrapping the
//! real payload, `#[derive(Serialize, Deserialize)]`), swapped from that
//! module's `bincode` to `serde_json` since project files are meant to be
//! readable/diffable, with the raw layer buffers base64-encoded inline the
//! way `other_examples/` JSON-based asset formats do for binary blobs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendMode {
    Normal,
    Add,
    Multiply,
    Overlay,
    Max,
    Min,
    Replace,
}

impl BlendMode {
    /// Combines a base value with a layer value per this blend mode. Both
    /// values are expected to be raw height offsets, not normalized [0, 1]
    /// colors, so "multiply" and "overlay" are defined in terms of the
    /// layer's opacity-weighted contribution rather than a color product.
    fn apply(self, base: f32, layer: f32, opacity: f32) -> f32 {
        let blended = match self {
            BlendMode::Normal => layer,
            BlendMode::Add => base + layer,
            BlendMode::Multiply => base * layer,
            BlendMode::Overlay => {
                if base >= 0.0 {
                    base + layer * (1.0 - base.abs().min(1.0))
                } else {
                    base - layer * (1.0 - base.abs().min(1.0))
                }
            }
            BlendMode::Max => base.max(layer),
            BlendMode::Min => base.min(layer),
            BlendMode::Replace => layer,
        };
        base * (1.0 - opacity) + blended * opacity
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub blend_mode: BlendMode,
    pub opacity: f32,
    pub visible: bool,
    pub cols: usize,
    pub rows: usize,
    pub values: Vec<f32>,
}

impl Layer {
    pub fn new(name: impl Into<String>, cols: usize, rows: usize) -> Self {
        Self {
            name: name.into(),
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
            visible: true,
            cols,
            rows,
            values: vec![0.0; cols * rows],
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LayerStack {
    pub layers: Vec<Layer>,
}

impl LayerStack {
    pub fn add(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    pub fn remove(&mut self, index: usize) -> Option<Layer> {
        if index < self.layers.len() {
            Some(self.layers.remove(index))
        } else {
            None
        }
    }

    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.layers.len() || to >= self.layers.len() {
            return;
        }
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
    }

    pub fn duplicate(&mut self, index: usize) {
        if let Some(layer) = self.layers.get(index).cloned() {
            self.layers.insert(index + 1, layer);
        }
    }

    /// Composites `index` down into `index - 1` using `index`'s blend mode,
    /// then removes `index`. The merged layer keeps the lower layer's name
    /// and settles at full opacity/normal blend since its contribution is
    /// now baked in.
    pub fn merge_down(&mut self, index: usize) -> Result<(), &'static str> {
        if index == 0 || index >= self.layers.len() {
            return Err("merge_down requires a layer below index");
        }
        let upper = self.layers.remove(index);
        let lower = &mut self.layers[index - 1];
        if lower.cols != upper.cols || lower.rows != upper.rows {
            return Err("layer dimensions do not match");
        }
        for (b, l) in lower.values.iter_mut().zip(upper.values.iter()) {
            *b = upper.blend_mode.apply(*b, *l, upper.opacity);
        }
        lower.blend_mode = BlendMode::Normal;
        lower.opacity = 1.0;
        Ok(())
    }

    /// Composites every visible layer, bottom to top, into one flat buffer
    /// the size of the first layer. Returns an empty vector if the stack is
    /// empty.
    pub fn flatten(&self) -> Vec<f32> {
        let Some(first) = self.layers.first() else {
            return Vec::new();
        };
        let mut result = vec![0.0f32; first.values.len()];

        for layer in &self.layers {
            if !layer.visible {
                continue;
            }
            for (out, v) in result.iter_mut().zip(layer.values.iter()) {
                *out = layer.blend_mode.apply(*out, *v, layer.opacity);
            }
        }

        result
    }
}

const LAYER_STACK_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct LayerStackSaveFile {
    version: u32,
    layers: Vec<EncodedLayer>,
}

#[derive(Serialize, Deserialize)]
struct EncodedLayer {
    name: String,
    blend_mode: BlendMode,
    opacity: f32,
    visible: bool,
    cols: usize,
    rows: usize,
    values_b64: String,
}

impl LayerStack {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let encoded: Vec<EncodedLayer> = self
            .layers
            .iter()
            .map(|l| EncodedLayer {
                name: l.name.clone(),
                blend_mode: l.blend_mode,
                opacity: l.opacity,
                visible: l.visible,
                cols: l.cols,
                rows: l.rows,
                values_b64: BASE64.encode(bytes_of(&l.values)),
            })
            .collect();

        serde_json::to_string_pretty(&LayerStackSaveFile { version: LAYER_STACK_VERSION, layers: encoded })
    }

    pub fn from_json(json: &str) -> Result<Self, crate::error::GenError> {
        let save: LayerStackSaveFile = serde_json::from_str(json)
            .map_err(|e| crate::error::GenError::generation("layers:deserialize", e.to_string()))?;

        let layers = save
            .layers
            .into_iter()
            .map(|e| {
                let bytes = BASE64
                    .decode(e.values_b64)
                    .map_err(|err| crate::error::GenError::generation("layers:base64", err.to_string()))?;
                Ok(Layer {
                    name: e.name,
                    blend_mode: e.blend_mode,
                    opacity: e.opacity,
                    visible: e.visible,
                    cols: e.cols,
                    rows: e.rows,
                    values: floats_from(&bytes),
                })
            })
            .collect::<Result<Vec<_>, crate::error::GenError>>()?;

        Ok(LayerStack { layers })
    }
}

fn bytes_of(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn floats_from(bytes: &[u8]) -> Vec<f32> {
    bytes.chunks_exact(4).map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]])).collect()
}

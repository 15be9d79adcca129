//! MMORPG heightmap generator core.
//!
//! A staged, deterministic pipeline that turns a [`config::Config`] into a
//! quantized cell grid plus its derived masks: fractal noise synthesis,
//! hydraulic/thermal erosion, level quantization, border construction, POI
//! placement, road/ramp planning, navmesh extraction, layer composition, and
//! mask export.
//!
//! [`pipeline::run`] drives every stage in order; everything else in this
//! crate is a single stage (or a stage's supporting data model) that
//! `pipeline` calls into.

pub mod biome;
pub mod border;
pub mod config;
pub mod erosion;
pub mod error;
pub mod export;
pub mod grid;
pub mod layers;
pub mod levels;
pub mod navmesh;
pub mod noise_field;
pub mod pipeline;
pub mod poi;
pub mod prng;
pub mod project;
pub mod roads;

// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Simplex-Lite Topology
//!
//! Incremental 3D simplicial complex with local subdivision.
//!
//! A [`World`] starts as a cuboid cut into five tetrahedra. Points, lines
//! and triangles are then added one at a time. Every addition is made
//! consistent with what is already there: a new point splits the simplex it
//! lands in, and a new line or triangle is cut wherever it crosses existing
//! geometry: where a line passes through a face, both are split at a shared
//! point. Faces may pass through tetrahedron interiors, since tetrahedra
//! are only split by points. Parts of a line or triangle outside the meshed
//! region are dropped.
//!
//! Simplices live in slot maps and are addressed by typed keys. Every
//! simplex knows its boundary, and an upward index answers the reverse
//! question.
//!
//! Styling is opaque to the core: simplices carry [`StyleToken`] sets that
//! a [`RendererTable`] resolves when the complex is drawn.

pub mod builders;
pub mod config;
pub mod construction;
pub mod error;
pub mod geometry;
pub mod integration;
pub mod intersection;
pub mod keys;
pub mod paint;
pub mod query;
pub mod retriangulation;
pub mod style;
pub mod subdivision;
pub mod traversal;
pub mod world;

pub use config::{WorldConfig, DEFAULT_TOLERANCE};
pub use error::{Error, Result};
pub use geometry::{AffineBasis, Coordinates};
pub use integration::Integration;
pub use intersection::Intersection;
pub use keys::{FaceKey, LineKey, PointKey, SimplexKey, SimplexType, TetrahedronKey};
pub use paint::{
    DrawBackend, Entity, Mapped, Normalize, Paint, PaintRenderer, Projection, Renderer,
    RendererTable, Uniform,
};
pub use style::{StyleSet, StyleSets, StyleToken};
pub use subdivision::Subdivision;
pub use world::{FaceData, LineData, PointData, TetrahedronData, World};

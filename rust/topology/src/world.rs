// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for the simplicial complex.
//!
//! The [`World`] is the central owner of all simplices. Points, lines, faces
//! and tetrahedra live inside slot maps with stable, generational keys.
//! Downward references (tetrahedron → faces → lines → points) are stored on
//! each simplex; upward adjacency (point → lines → faces → tetrahedra) lives
//! in hash-set indices owned by the world, so both directions stay in sync
//! through a single owner.
//!
//! Every kind also keeps an insertion-ordered registry. Iteration and
//! rendering walk the registries, so results are deterministic for a given
//! sequence of operations.

use nalgebra::Point3;
use rustc_hash::{FxHashMap, FxHashSet};
use slotmap::SlotMap;

use crate::config::WorldConfig;
use crate::geometry::AffineBasis;
use crate::keys::*;
use crate::style::StyleSets;

/// Data stored for a point.
#[derive(Debug, Clone)]
pub struct PointData {
    pub position: Point3<f64>,
    pub style: StyleSets,
    /// Whether the point lies inside (or on) the meshed region.
    pub visible: bool,
}

/// Data stored for a line segment between two points.
#[derive(Debug, Clone)]
pub struct LineData {
    pub points: [PointKey; 2],
    /// Effective style: derived from the endpoints plus `own_style`.
    pub style: StyleSets,
    pub(crate) own_style: StyleSets,
}

/// Data stored for a triangle bounded by three lines.
#[derive(Debug, Clone)]
pub struct FaceData {
    pub lines: [LineKey; 3],
    pub points: [PointKey; 3],
    /// Effective style: only the face category is populated.
    pub style: StyleSets,
    pub(crate) own_style: StyleSets,
}

/// Data stored for a tetrahedron bounded by four faces.
#[derive(Debug, Clone)]
pub struct TetrahedronData {
    pub faces: [FaceKey; 4],
    pub lines: [LineKey; 6],
    /// `points[0]` is the base of the barycentric frame.
    pub points: [PointKey; 4],
    pub(crate) basis: AffineBasis,
}

/// The simplicial complex and everything it owns.
///
/// # Example
///
/// ```
/// use nalgebra::Point3;
/// use simplex_lite_topology::{StyleSets, World, WorldConfig};
///
/// let mut world = World::with_config(WorldConfig::default()).unwrap();
/// assert_eq!(world.tetrahedron_count(), 5);
///
/// world
///     .create_point(Point3::new(0.5, 0.5, 0.5), StyleSets::default())
///     .unwrap();
/// assert_eq!(world.tetrahedron_count(), 8);
/// ```
#[derive(Debug)]
pub struct World {
    // Entity storage
    pub(crate) points: SlotMap<PointKey, PointData>,
    pub(crate) lines: SlotMap<LineKey, LineData>,
    pub(crate) faces: SlotMap<FaceKey, FaceData>,
    pub(crate) tetrahedra: SlotMap<TetrahedronKey, TetrahedronData>,

    // Insertion-ordered registries
    pub(crate) point_order: Vec<PointKey>,
    pub(crate) line_order: Vec<LineKey>,
    pub(crate) face_order: Vec<FaceKey>,
    pub(crate) tetrahedron_order: Vec<TetrahedronKey>,

    // Upward adjacency: child → parents
    pub(crate) point_to_lines: FxHashMap<PointKey, FxHashSet<LineKey>>,
    pub(crate) line_to_faces: FxHashMap<LineKey, FxHashSet<FaceKey>>,
    pub(crate) face_to_tetrahedra: FxHashMap<FaceKey, FxHashSet<TetrahedronKey>>,

    pub(crate) config: WorldConfig,
}

impl World {
    /// Creates a world with no simplices at all. Used for seeding and for
    /// unit tests that build small complexes by hand.
    pub(crate) fn empty() -> Self {
        Self {
            points: SlotMap::with_key(),
            lines: SlotMap::with_key(),
            faces: SlotMap::with_key(),
            tetrahedra: SlotMap::with_key(),

            point_order: Vec::new(),
            line_order: Vec::new(),
            face_order: Vec::new(),
            tetrahedron_order: Vec::new(),

            point_to_lines: FxHashMap::default(),
            line_to_faces: FxHashMap::default(),
            face_to_tetrahedra: FxHashMap::default(),

            config: WorldConfig::default(),
        }
    }

    /// The configuration this world was seeded with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Tolerance used by [`World::create_point`].
    pub fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    // --- Point operations ---

    /// Returns the point data for the given key, or `None` if not found.
    pub fn point(&self, key: PointKey) -> Option<&PointData> {
        self.points.get(key)
    }

    /// Returns the position of a point.
    pub fn position(&self, key: PointKey) -> Option<Point3<f64>> {
        self.points.get(key).map(|p| p.position)
    }

    /// Returns the number of points in the world.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Points in insertion order.
    pub fn points(&self) -> impl Iterator<Item = (PointKey, &PointData)> + '_ {
        self.point_order
            .iter()
            .filter_map(|&k| self.points.get(k).map(|d| (k, d)))
    }

    // --- Line operations ---

    /// Returns the line data for the given key, or `None` if not found.
    pub fn line(&self, key: LineKey) -> Option<&LineData> {
        self.lines.get(key)
    }

    /// Returns the number of lines in the world.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> impl Iterator<Item = (LineKey, &LineData)> + '_ {
        self.line_order
            .iter()
            .filter_map(|&k| self.lines.get(k).map(|d| (k, d)))
    }

    // --- Face operations ---

    /// Returns the face data for the given key, or `None` if not found.
    pub fn face(&self, key: FaceKey) -> Option<&FaceData> {
        self.faces.get(key)
    }

    /// Returns the number of faces in the world.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Faces in insertion order.
    pub fn faces(&self) -> impl Iterator<Item = (FaceKey, &FaceData)> + '_ {
        self.face_order
            .iter()
            .filter_map(|&k| self.faces.get(k).map(|d| (k, d)))
    }

    // --- Tetrahedron operations ---

    /// Returns the tetrahedron data for the given key, or `None` if not found.
    pub fn tetrahedron(&self, key: TetrahedronKey) -> Option<&TetrahedronData> {
        self.tetrahedra.get(key)
    }

    /// Returns the number of tetrahedra in the world.
    pub fn tetrahedron_count(&self) -> usize {
        self.tetrahedra.len()
    }

    /// Tetrahedra in insertion order.
    pub fn tetrahedra(&self) -> impl Iterator<Item = (TetrahedronKey, &TetrahedronData)> + '_ {
        self.tetrahedron_order
            .iter()
            .filter_map(|&k| self.tetrahedra.get(k).map(|d| (k, d)))
    }

    // --- Entity existence checks ---

    /// Returns `true` if the given key references a live simplex.
    pub fn contains(&self, key: SimplexKey) -> bool {
        match key {
            SimplexKey::Point(k) => self.points.contains_key(k),
            SimplexKey::Line(k) => self.lines.contains_key(k),
            SimplexKey::Face(k) => self.faces.contains_key(k),
            SimplexKey::Tetrahedron(k) => self.tetrahedra.contains_key(k),
        }
    }

    // --- Adjacency index helpers ---

    /// Register that a line uses a point (upward adjacency).
    pub(crate) fn link_point_line(&mut self, point: PointKey, line: LineKey) {
        self.point_to_lines.entry(point).or_default().insert(line);
    }

    /// Register that a face uses a line (upward adjacency).
    pub(crate) fn link_line_face(&mut self, line: LineKey, face: FaceKey) {
        self.line_to_faces.entry(line).or_default().insert(face);
    }

    /// Register that a tetrahedron uses a face (upward adjacency).
    pub(crate) fn link_face_tetrahedron(&mut self, face: FaceKey, tetrahedron: TetrahedronKey) {
        self.face_to_tetrahedra
            .entry(face)
            .or_default()
            .insert(tetrahedron);
    }

    pub(crate) fn unlink_point_line(&mut self, point: PointKey, line: LineKey) {
        if let Some(set) = self.point_to_lines.get_mut(&point) {
            set.remove(&line);
            if set.is_empty() {
                self.point_to_lines.remove(&point);
            }
        }
    }

    pub(crate) fn unlink_line_face(&mut self, line: LineKey, face: FaceKey) {
        if let Some(set) = self.line_to_faces.get_mut(&line) {
            set.remove(&face);
            if set.is_empty() {
                self.line_to_faces.remove(&line);
            }
        }
    }

    pub(crate) fn unlink_face_tetrahedron(&mut self, face: FaceKey, tetrahedron: TetrahedronKey) {
        if let Some(set) = self.face_to_tetrahedra.get_mut(&face) {
            set.remove(&tetrahedron);
            if set.is_empty() {
                self.face_to_tetrahedra.remove(&face);
            }
        }
    }
}

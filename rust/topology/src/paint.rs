// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drawing the complex through pluggable collaborators.
//!
//! The core never interprets a [`StyleToken`]. A [`RendererTable`] maps
//! tokens to [`Renderer`]s, and [`World::render`] hands every styled entity
//! to the renderers its tokens name. Renderers turn an entity into calls on
//! a [`DrawBackend`], usually through a [`Paint`] that picks the backend's
//! style value for the entity.

use nalgebra::{Point3, Vector3};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::keys::*;
use crate::style::{StyleSet, StyleToken};
use crate::world::{FaceData, LineData, PointData, World};

/// A drawable entity together with its resolved corner positions.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Point {
        key: PointKey,
        data: &'a PointData,
    },
    Line {
        key: LineKey,
        data: &'a LineData,
        ends: [Point3<f64>; 2],
    },
    Face {
        key: FaceKey,
        data: &'a FaceData,
        corners: [Point3<f64>; 3],
    },
}

impl Entity<'_> {
    /// Centre of mass of the entity's vertices.
    pub fn centroid(&self) -> Point3<f64> {
        match self {
            Entity::Point { data, .. } => data.position,
            Entity::Line { ends: [a, b], .. } => Point3::from((a.coords + b.coords) / 2.0),
            Entity::Face {
                corners: [a, b, c],
                ..
            } => Point3::from((a.coords + b.coords + c.coords) / 3.0),
        }
    }

    pub fn simplex_key(&self) -> SimplexKey {
        match self {
            Entity::Point { key, .. } => SimplexKey::Point(*key),
            Entity::Line { key, .. } => SimplexKey::Line(*key),
            Entity::Face { key, .. } => SimplexKey::Face(*key),
        }
    }
}

/// Target of drawing side effects.
pub trait DrawBackend {
    /// Backend-specific style value (colour, marker, line width ...).
    type Style;

    fn draw_point(&mut self, position: Point3<f64>, style: &Self::Style);
    fn draw_line(&mut self, ends: [Point3<f64>; 2], style: &Self::Style);
    fn draw_face(&mut self, corners: [Point3<f64>; 3], style: &Self::Style);
}

/// Produces a style value for an entity.
pub trait Paint {
    type Value;

    fn paint(&self, entity: &Entity<'_>) -> Self::Value;
}

/// Maps an entity onto the unit interval.
pub trait Normalize {
    /// Unclamped measure of the entity.
    fn measure(&self, entity: &Entity<'_>) -> f64;

    /// [`Normalize::measure`] clamped to `[0, 1]`. NaN maps to 0.
    fn normalize(&self, entity: &Entity<'_>) -> f64 {
        let value = self.measure(entity);
        if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        }
    }
}

/// Draws entities on a backend.
pub trait Renderer<B: DrawBackend> {
    fn render(&self, entity: &Entity<'_>, backend: &mut B);
}

/// Paints every entity with the same value.
#[derive(Debug, Clone, PartialEq)]
pub struct Uniform<S>(pub S);

impl<S: Clone> Paint for Uniform<S> {
    type Value = S;

    fn paint(&self, _entity: &Entity<'_>) -> S {
        self.0.clone()
    }
}

/// Paints through a normalization followed by a colormap.
pub struct Mapped<N, F> {
    pub norm: N,
    pub map: F,
}

impl<N, F, S> Paint for Mapped<N, F>
where
    N: Normalize,
    F: Fn(f64) -> S,
{
    type Value = S;

    fn paint(&self, entity: &Entity<'_>) -> S {
        (self.map)(self.norm.normalize(entity))
    }
}

/// Normalizes by projecting the entity's centroid onto a direction.
///
/// The planes normal to `direction` through `base0` and `base1` map to
/// `level0` and `level1`; positions in between interpolate linearly. When
/// both planes coincide every entity measures `0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    direction: Vector3<f64>,
    projection0: f64,
    projection1: f64,
    level0: f64,
    level1: f64,
}

impl Projection {
    pub fn new(direction: Vector3<f64>, base0: Point3<f64>, base1: Point3<f64>) -> Self {
        Self::with_levels(direction, base0, base1, 0.0, 1.0)
    }

    pub fn with_levels(
        direction: Vector3<f64>,
        base0: Point3<f64>,
        base1: Point3<f64>,
        level0: f64,
        level1: f64,
    ) -> Self {
        Self {
            direction,
            projection0: direction.dot(&base0.coords),
            projection1: direction.dot(&base1.coords),
            level0,
            level1,
        }
    }
}

impl Normalize for Projection {
    fn measure(&self, entity: &Entity<'_>) -> f64 {
        let delta = self.projection1 - self.projection0;
        if delta == 0.0 {
            return 0.0;
        }
        let projection = self.direction.dot(&entity.centroid().coords);
        self.level0 * (self.projection1 - projection) / delta
            + self.level1 * (projection - self.projection0) / delta
    }
}

/// Renders an entity with the style its [`Paint`] picks.
pub struct PaintRenderer<P>(pub P);

impl<B, P> Renderer<B> for PaintRenderer<P>
where
    B: DrawBackend,
    P: Paint<Value = B::Style>,
{
    fn render(&self, entity: &Entity<'_>, backend: &mut B) {
        let style = self.0.paint(entity);
        match entity {
            Entity::Point { data, .. } => backend.draw_point(data.position, &style),
            Entity::Line { ends, .. } => backend.draw_line(*ends, &style),
            Entity::Face { corners, .. } => backend.draw_face(*corners, &style),
        }
    }
}

/// Token to renderer lookup.
pub struct RendererTable<B: DrawBackend> {
    renderers: FxHashMap<StyleToken, Box<dyn Renderer<B>>>,
}

impl<B: DrawBackend> Default for RendererTable<B> {
    fn default() -> Self {
        Self {
            renderers: FxHashMap::default(),
        }
    }
}

impl<B: DrawBackend> RendererTable<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `token` to `renderer`, returning the renderer it replaces.
    pub fn insert(
        &mut self,
        token: StyleToken,
        renderer: impl Renderer<B> + 'static,
    ) -> Option<Box<dyn Renderer<B>>> {
        self.renderers.insert(token, Box::new(renderer))
    }

    pub fn remove(&mut self, token: StyleToken) -> Option<Box<dyn Renderer<B>>> {
        self.renderers.remove(&token)
    }

    pub fn get(&self, token: StyleToken) -> Option<&dyn Renderer<B>> {
        self.renderers.get(&token).map(|r| r.as_ref())
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    fn dispatch(&self, tokens: &StyleSet, entity: &Entity<'_>, backend: &mut B) {
        for &token in tokens {
            match self.renderers.get(&token) {
                Some(renderer) => renderer.render(entity, backend),
                None => trace!(?token, key = ?entity.simplex_key(), "no renderer bound"),
            }
        }
    }
}

impl World {
    /// Draws points, then lines, then faces, each in insertion order.
    ///
    /// Every entity is handed to the renderer of each token in its style set
    /// for its own kind, in token order. Tokens without a renderer are
    /// skipped.
    pub fn render<B: DrawBackend>(&self, table: &RendererTable<B>, backend: &mut B) {
        for (key, data) in self.points() {
            table.dispatch(&data.style.point, &Entity::Point { key, data }, backend);
        }
        for (key, data) in self.lines() {
            let Some(ends) = self.corner_positions(data.points) else {
                continue;
            };
            table.dispatch(&data.style.line, &Entity::Line { key, data, ends }, backend);
        }
        for (key, data) in self.faces() {
            let Some(corners) = self.corner_positions(data.points) else {
                continue;
            };
            let entity = Entity::Face { key, data, corners };
            table.dispatch(&data.style.face, &entity, backend);
        }
    }

    fn corner_positions<const N: usize>(&self, points: [PointKey; N]) -> Option<[Point3<f64>; N]> {
        let mut positions = [Point3::origin(); N];
        for (slot, p) in positions.iter_mut().zip(points) {
            *slot = self.position(p)?;
        }
        Some(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::style::StyleSets;
    use approx::assert_relative_eq;

    #[derive(Default)]
    struct Recorder {
        points: Vec<(Point3<f64>, u8)>,
        lines: Vec<u8>,
        faces: Vec<u8>,
    }

    impl DrawBackend for Recorder {
        type Style = u8;

        fn draw_point(&mut self, position: Point3<f64>, style: &u8) {
            self.points.push((position, *style));
        }

        fn draw_line(&mut self, _ends: [Point3<f64>; 2], style: &u8) {
            self.lines.push(*style);
        }

        fn draw_face(&mut self, _corners: [Point3<f64>; 3], style: &u8) {
            self.faces.push(*style);
        }
    }

    fn styled_world() -> World {
        let style = StyleSets::new([StyleToken(1)], [StyleToken(2)], [StyleToken(3)]);
        World::new([[0.0, 1.0]; 3], style).unwrap()
    }

    #[test]
    fn renders_every_kind_through_its_token() {
        let world = styled_world();
        let mut table = RendererTable::<Recorder>::new();
        table.insert(StyleToken(1), PaintRenderer(Uniform(10u8)));
        table.insert(StyleToken(2), PaintRenderer(Uniform(20u8)));
        table.insert(StyleToken(3), PaintRenderer(Uniform(30u8)));

        let mut backend = Recorder::default();
        world.render(&table, &mut backend);

        assert_eq!(backend.points.len(), 8);
        assert!(backend.points.iter().all(|(_, s)| *s == 10));
        assert_eq!(backend.lines, vec![20; 18]);
        assert_eq!(backend.faces, vec![30; 16]);
    }

    #[test]
    fn points_are_drawn_in_insertion_order() {
        let world = styled_world();
        let mut table = RendererTable::<Recorder>::new();
        table.insert(StyleToken(1), PaintRenderer(Uniform(0u8)));

        let mut backend = Recorder::default();
        world.render(&table, &mut backend);

        let drawn: Vec<_> = backend.points.iter().map(|(p, _)| *p).collect();
        let stored: Vec<_> = world.points().map(|(_, d)| d.position).collect();
        assert_eq!(drawn, stored);
    }

    #[test]
    fn unbound_tokens_are_skipped() {
        let world = styled_world();
        let table = RendererTable::<Recorder>::new();
        let mut backend = Recorder::default();
        world.render(&table, &mut backend);
        assert!(backend.points.is_empty() && backend.lines.is_empty());
    }

    #[test]
    fn unstyled_world_draws_nothing() {
        let world = World::with_config(WorldConfig::default()).unwrap();
        let mut table = RendererTable::<Recorder>::new();
        table.insert(StyleToken(1), PaintRenderer(Uniform(1u8)));
        let mut backend = Recorder::default();
        world.render(&table, &mut backend);
        assert!(backend.points.is_empty());
        assert!(backend.faces.is_empty());
    }

    #[test]
    fn projection_normalizes_and_clamps() {
        let norm = Projection::new(
            Vector3::z(),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 2.0),
        );
        let data = PointData {
            position: Point3::new(5.0, 5.0, 1.5),
            style: StyleSets::default(),
            visible: true,
        };
        let entity = Entity::Point {
            key: PointKey::default(),
            data: &data,
        };
        assert_relative_eq!(norm.measure(&entity), 0.75);
        assert_relative_eq!(norm.normalize(&entity), 0.75);

        let high = PointData {
            position: Point3::new(0.0, 0.0, 9.0),
            ..data.clone()
        };
        let entity = Entity::Point {
            key: PointKey::default(),
            data: &high,
        };
        assert_relative_eq!(norm.normalize(&entity), 1.0);
    }

    #[test]
    fn flat_projection_measures_zero() {
        let norm = Projection::new(Vector3::x(), Point3::origin(), Point3::new(0.0, 3.0, 0.0));
        let data = PointData {
            position: Point3::new(7.0, 0.0, 0.0),
            style: StyleSets::default(),
            visible: true,
        };
        let entity = Entity::Point {
            key: PointKey::default(),
            data: &data,
        };
        assert_eq!(norm.measure(&entity), 0.0);
    }

    #[test]
    fn mapped_paint_feeds_the_colormap() {
        let world = styled_world();
        let mut table = RendererTable::<Recorder>::new();
        let paint = Mapped {
            norm: Projection::new(Vector3::x(), Point3::origin(), Point3::new(1.0, 0.0, 0.0)),
            map: |v: f64| (v * 100.0).round() as u8,
        };
        table.insert(StyleToken(1), PaintRenderer(paint));

        let mut backend = Recorder::default();
        world.render(&table, &mut backend);
        for (position, style) in backend.points {
            assert_eq!(style, (position.x * 100.0).round() as u8);
        }
    }
}

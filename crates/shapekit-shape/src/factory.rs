//! Shared canonical templates.
//!
//! Shapes made from the same template share one path allocation; a shape
//! that later gets a new path simply stops sharing.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, TAU};

use lyon::math::{point, Box2D};
use lyon::path::builder::BorderRadii;
use lyon::path::{Path, Winding};
use shapekit_core::{shared, Bounds, Point, Shared, ShapeError, ShapeResult};
use shapekit_settings::ShapeSettings;
use tracing::debug;

use crate::canonical::{to_lyon, CanonicalPath};
use crate::shape::DrawableShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum TemplateKey {
    Rect,
    Oval,
    /// Corner radius in thousandths of the unit side.
    RoundRect(u32),
    Polygon(u32),
    /// Point count and inner radius in thousandths of the outer.
    Star(u32, u32),
}

/// Hands out canonical templates and shapes built on them.
#[derive(Debug)]
pub struct ShapeFactory {
    settings: Shared<ShapeSettings>,
    templates: HashMap<TemplateKey, CanonicalPath>,
}

impl ShapeFactory {
    pub fn new() -> Self {
        Self::with_settings(shared(ShapeSettings::default()))
    }

    /// Every shape the factory makes shares `settings`.
    pub fn with_settings(settings: Shared<ShapeSettings>) -> Self {
        Self {
            settings,
            templates: HashMap::new(),
        }
    }

    pub fn settings(&self) -> Shared<ShapeSettings> {
        self.settings.clone()
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    fn template<F>(&mut self, key: TemplateKey, build: F) -> ShapeResult<CanonicalPath>
    where
        F: FnOnce() -> ShapeResult<CanonicalPath>,
    {
        if let Some(path) = self.templates.get(&key) {
            return Ok(path.clone());
        }
        let path = build()?;
        debug!("Built shape template {:?}", key);
        self.templates.insert(key, path.clone());
        Ok(path)
    }

    pub fn rect(&mut self) -> CanonicalPath {
        self.templates
            .entry(TemplateKey::Rect)
            .or_insert_with(CanonicalPath::unit_rect)
            .clone()
    }

    pub fn oval(&mut self) -> CanonicalPath {
        self.templates
            .entry(TemplateKey::Oval)
            .or_insert_with(CanonicalPath::unit_oval)
            .clone()
    }

    /// Unit square with rounded corners; `radius` is a fraction of the side,
    /// clamped to `[0, 0.5]`.
    pub fn round_rect(&mut self, radius: f64) -> CanonicalPath {
        let permille = (radius.clamp(0.0, 0.5) * 1000.0).round() as u32;
        self.templates
            .entry(TemplateKey::RoundRect(permille))
            .or_insert_with(|| {
                let mut builder = Path::builder();
                builder.add_rounded_rectangle(
                    &Box2D::new(point(-0.5, -0.5), point(0.5, 0.5)),
                    &BorderRadii::new(permille as f32 / 1000.0),
                    Winding::Positive,
                );
                CanonicalPath::from_built(builder.build())
            })
            .clone()
    }

    /// Regular polygon with a vertex at the top, stretched to the unit box.
    pub fn regular_polygon(&mut self, sides: u32) -> ShapeResult<CanonicalPath> {
        if sides < 3 {
            return Err(ShapeError::invalid_path(format!(
                "a polygon needs at least 3 sides, got {}",
                sides
            )));
        }
        self.template(TemplateKey::Polygon(sides), || {
            let vertices = (0..sides).map(|i| polar(1.0, i, sides));
            closed_polygon(vertices)
        })
    }

    /// Star with `points` tips; `inner_ratio` is the inner radius relative
    /// to the outer, in `(0, 1)`.
    pub fn star(&mut self, points: u32, inner_ratio: f64) -> ShapeResult<CanonicalPath> {
        if points < 3 {
            return Err(ShapeError::invalid_path(format!(
                "a star needs at least 3 points, got {}",
                points
            )));
        }
        if !(inner_ratio > 0.0 && inner_ratio < 1.0) {
            return Err(ShapeError::invalid_path(format!(
                "star inner ratio must be in (0, 1), got {}",
                inner_ratio
            )));
        }
        let permille = (inner_ratio * 1000.0).round() as u32;
        self.template(TemplateKey::Star(points, permille), || {
            let inner = permille as f64 / 1000.0;
            let vertices = (0..points * 2).map(|i| {
                let r = if i % 2 == 0 { 1.0 } else { inner };
                polar(r, i, points * 2)
            });
            closed_polygon(vertices)
        })
    }

    /// A shape on `template` filling `bounds`, sharing the factory settings.
    pub fn make_shape(&self, template: &CanonicalPath, bounds: Bounds) -> DrawableShape {
        DrawableShape::from_template(template, bounds).with_settings(self.settings.clone())
    }
}

impl Default for ShapeFactory {
    fn default() -> Self {
        Self::new()
    }
}

/// Vertex `i` of `n` evenly spaced around a circle, starting at the top.
fn polar(r: f64, i: u32, n: u32) -> Point {
    let a = FRAC_PI_2 + TAU * i as f64 / n as f64;
    Point::new(r * a.cos(), r * a.sin())
}

fn closed_polygon<I: IntoIterator<Item = Point>>(vertices: I) -> ShapeResult<CanonicalPath> {
    let mut builder = Path::builder();
    let mut iter = vertices.into_iter();
    let first = iter
        .next()
        .ok_or_else(|| ShapeError::invalid_path("polygon has no vertices"))?;
    builder.begin(to_lyon(first));
    for v in iter {
        builder.line_to(to_lyon(v));
    }
    builder.close();
    let (path, _) = CanonicalPath::normalize(&builder.build())?;
    Ok(path)
}

//! Placed ball and marker positions in pixel and table space.
//!
//! SYSTEM CONTEXT
//! ==============
//! Pixel positions are relative to the rendered bounding box of the table
//! image. Real-world positions (millimeters) are always derived from the
//! pixel position, the table's physical size and the current rendered size;
//! they are never written independently.
//!
//! Two disjoint maps are kept: the primary layer holds gameplay balls and is
//! what the backend receives, the auxiliary layer holds helper markers such
//! as the distance start marker.

#[cfg(test)]
#[path = "coords_test.rs"]
mod coords_test;

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::config::TableDimensions;
use crate::net::types::BackendCoordinate;

/// Id prefix of gameplay ball markers (`ball-7`).
pub const BALL_PREFIX: &str = "ball-";
/// Id of the distance start marker. Placing or removing it is not manipulation.
pub const START_MARKER_ID: &str = "marker-start";

/// A 2D point in pixel or millimeter space.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance_to(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Rendered size of the table image in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderedSize {
    pub width: f64,
    pub height: f64,
}

impl RenderedSize {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_usable(self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Which map an entry lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    /// Gameplay balls; sent to the backend.
    Primary,
    /// Helper markers placed on the image.
    Auxiliary,
}

impl Layer {
    /// The layer a manually placed id belongs to.
    #[must_use]
    pub fn for_id(id: &str) -> Self {
        if id == START_MARKER_ID { Self::Auxiliary } else { Self::Primary }
    }
}

/// One placed ball or marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Coordinate {
    pub id: String,
    pub pixel: Point,
    pub real: Point,
}

/// Pixel to millimeter conversion for one rendered size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableScale {
    pub table: TableDimensions,
    pub rendered: RenderedSize,
}

impl TableScale {
    #[must_use]
    pub fn pixel_to_real(&self, pixel: Point) -> Point {
        Point {
            x: pixel.x / self.rendered.width * self.table.long_side_mm,
            y: pixel.y / self.rendered.height * self.table.short_side_mm,
        }
    }

    #[must_use]
    pub fn real_to_pixel(&self, real: Point) -> Point {
        Point {
            x: real.x / self.table.long_side_mm * self.rendered.width,
            y: real.y / self.table.short_side_mm * self.rendered.height,
        }
    }

    /// Convert a horizontal pixel length to millimeters.
    #[must_use]
    pub fn pixel_len_to_real(&self, len: f64) -> f64 {
        len / self.rendered.width * self.table.long_side_mm
    }
}

/// The authoritative in-memory set of placed positions.
#[derive(Clone, Debug)]
pub struct CoordinateStore {
    scale: TableScale,
    primary: BTreeMap<String, Coordinate>,
    auxiliary: BTreeMap<String, Coordinate>,
}

impl CoordinateStore {
    #[must_use]
    pub fn new(table: TableDimensions, rendered: RenderedSize) -> Self {
        Self {
            scale: TableScale { table, rendered },
            primary: BTreeMap::new(),
            auxiliary: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn scale(&self) -> TableScale {
        self.scale
    }

    /// Whether a usable rendered size is known. Conversions are undefined
    /// until then.
    #[must_use]
    pub fn is_measured(&self) -> bool {
        self.scale.rendered.is_usable()
    }

    /// Track a new rendered size of the table image.
    ///
    /// Stored pixels are rescaled proportionally and real values recomputed
    /// from them. A degenerate size (image not laid out yet) is ignored.
    pub fn set_rendered_size(&mut self, rendered: RenderedSize) {
        if !rendered.is_usable() || rendered == self.scale.rendered {
            return;
        }
        let old = self.scale.rendered;
        self.scale.rendered = rendered;
        let scale = self.scale;
        for entry in self.primary.values_mut().chain(self.auxiliary.values_mut()) {
            if old.is_usable() {
                entry.pixel = Point {
                    x: entry.pixel.x / old.width * rendered.width,
                    y: entry.pixel.y / old.height * rendered.height,
                };
            }
            entry.real = scale.pixel_to_real(entry.pixel);
        }
    }

    /// Insert or overwrite `id` at a pixel position.
    pub fn place(&mut self, id: &str, pixel: Point, layer: Layer) -> &Coordinate {
        let entry = Coordinate { id: id.to_owned(), pixel, real: self.scale.pixel_to_real(pixel) };
        let map = match layer {
            Layer::Primary => &mut self.primary,
            Layer::Auxiliary => &mut self.auxiliary,
        };
        map.insert(id.to_owned(), entry);
        &map[id]
    }

    /// Insert or overwrite `id` from a millimeter position.
    pub fn place_from_real(&mut self, id: &str, real: Point, layer: Layer) -> &Coordinate {
        let pixel = self.scale.real_to_pixel(real);
        self.place(id, pixel, layer)
    }

    /// Remove `id` from whichever layer holds it.
    pub fn remove(&mut self, id: &str) -> Option<(Layer, Coordinate)> {
        if let Some(entry) = self.primary.remove(id) {
            return Some((Layer::Primary, entry));
        }
        self.auxiliary.remove(id).map(|entry| (Layer::Auxiliary, entry))
    }

    /// Drop every primary entry, returning the removed ids.
    pub fn clear_primary(&mut self) -> Vec<String> {
        let ids = self.primary.keys().cloned().collect();
        self.primary.clear();
        ids
    }

    pub fn clear(&mut self) {
        self.primary.clear();
        self.auxiliary.clear();
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Coordinate> {
        self.primary.get(id).or_else(|| self.auxiliary.get(id))
    }

    pub fn primary(&self) -> impl Iterator<Item = &Coordinate> {
        self.primary.values()
    }

    pub fn auxiliary(&self) -> impl Iterator<Item = &Coordinate> {
        self.auxiliary.values()
    }

    #[must_use]
    pub fn primary_len(&self) -> usize {
        self.primary.len()
    }

    /// Outbound coordinate payload keyed by the id without its `ball-` prefix.
    #[must_use]
    pub fn to_backend_payload(&self) -> BTreeMap<String, BackendCoordinate> {
        self.primary
            .values()
            .map(|entry| {
                let name = backend_name(&entry.id).to_owned();
                let coordinate = BackendCoordinate { name: name.clone(), x: entry.real.x, y: entry.real.y };
                (name, coordinate)
            })
            .collect()
    }

    /// [`Self::to_backend_payload`] as a JSON value.
    #[must_use]
    pub fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.to_backend_payload()
                .into_iter()
                .map(|(name, c)| (name, serde_json::json!({ "name": c.name, "x": c.x, "y": c.y })))
                .collect(),
        )
    }
}

/// Strip the `ball-` prefix used by marker element ids.
#[must_use]
pub fn backend_name(id: &str) -> &str {
    id.strip_prefix(BALL_PREFIX).unwrap_or(id)
}

/// Marker element id for a detection name.
#[must_use]
pub fn marker_id(name: &str) -> String {
    format!("{BALL_PREFIX}{name}")
}

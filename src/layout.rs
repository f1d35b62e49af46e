// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowdraft-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowdraft and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Page geometry for image/PDF export.
//!
//! Rasterizing is left to the host; this module decides how big the page is, which way it is
//! oriented, and which viewport transform frames every node on it.

use crate::model::Diagram;

pub const PAGE_PADDING: f64 = 20.0;
pub const PDF_FILE_NAME: &str = "diagram.pdf";

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 2.0;

/// UI chrome that must not end up in an exported image.
pub const EXCLUDED_CHROME_CLASSES: [&str; 4] = [
    "react-flow__controls",
    "react-flow__minimap",
    "react-flow__panel",
    "react-flow__attribution",
];

/// Axis-aligned box in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    fn union(self, other: Self) -> Self {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Self {
            x,
            y,
            width: self.right().max(other.right()) - x,
            height: self.bottom().max(other.bottom()) - y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Translate-then-scale transform applied to the canvas while capturing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub bounds: Rect,
    pub width: f64,
    pub height: f64,
    pub orientation: Orientation,
    pub viewport: Viewport,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RasterOptions {
    pub pixel_ratio: f64,
    pub background: &'static str,
    pub excluded_classes: &'static [&'static str],
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self { pixel_ratio: 2.0, background: "#ffffff", excluded_classes: &EXCLUDED_CHROME_CLASSES }
    }
}

impl RasterOptions {
    /// Whether an element carrying `classes` is captured.
    pub fn includes<'a>(&self, mut classes: impl Iterator<Item = &'a str>) -> bool {
        !classes.any(|class| self.excluded_classes.contains(&class))
    }
}

/// Union of every node's box (position plus rendered size), or `None` for an empty diagram.
pub fn diagram_bounds(diagram: &Diagram) -> Option<Rect> {
    diagram
        .nodes()
        .iter()
        .map(|node| {
            let size = node.size();
            Rect { x: node.position.x, y: node.position.y, width: size.width, height: size.height }
        })
        .reduce(Rect::union)
}

/// Transform that centers `bounds` in a `width` x `height` frame, zoomed to fit within
/// `[min_zoom, max_zoom]`. `padding` is a fraction of the bounds reserved around them.
pub fn viewport_for_bounds(
    bounds: Rect,
    width: f64,
    height: f64,
    min_zoom: f64,
    max_zoom: f64,
    padding: f64,
) -> Viewport {
    let x_zoom = width / (bounds.width * (1.0 + padding));
    let y_zoom = height / (bounds.height * (1.0 + padding));
    let fit = x_zoom.min(y_zoom);
    let zoom = if fit.is_finite() { fit.clamp(min_zoom, max_zoom) } else { max_zoom };
    let center_x = bounds.x + bounds.width / 2.0;
    let center_y = bounds.y + bounds.height / 2.0;
    Viewport { x: width / 2.0 - center_x * zoom, y: height / 2.0 - center_y * zoom, zoom }
}

/// Page sized to the node bounds plus [`PAGE_PADDING`] on every side.
///
/// Returns `None` when there is nothing to export.
pub fn page_layout(diagram: &Diagram) -> Option<PageLayout> {
    let bounds = diagram_bounds(diagram)?;
    let width = bounds.width + PAGE_PADDING * 2.0;
    let height = bounds.height + PAGE_PADDING * 2.0;
    let orientation = if width > height { Orientation::Landscape } else { Orientation::Portrait };
    Some(PageLayout {
        bounds,
        width,
        height,
        orientation,
        viewport: viewport_for_bounds(bounds, width, height, MIN_ZOOM, MAX_ZOOM, 0.0),
    })
}

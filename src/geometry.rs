/// A 2D point. Used for both layout-space vertices and display-space output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in display space, always normalized (non-negative size).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn from_corners(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let right = a.x.max(b.x);
        let top = a.y.min(b.y);
        let bottom = a.y.max(b.y);
        Self {
            x0: left,
            y0: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Rectangle of the given size whose center is `center`.
    pub fn centered_on(center: Point, width: f64, height: f64) -> Self {
        Self {
            x0: center.x - width / 2.0,
            y0: center.y - height / 2.0,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.x0 + self.width / 2.0,
            y: self.y0 + self.height / 2.0,
        }
    }

    pub fn x1(&self) -> f64 {
        self.x0 + self.width
    }

    pub fn y1(&self) -> f64 {
        self.y0 + self.height
    }

    /// Grow every edge outward by `amount`.
    pub fn padded(&self, amount: f64) -> Self {
        Self {
            x0: self.x0 - amount,
            y0: self.y0 - amount,
            width: self.width + 2.0 * amount,
            height: self.height + 2.0 * amount,
        }
    }

    /// Shrink every edge inward by `amount`; `None` once the rectangle would vanish.
    pub fn inset(&self, amount: f64) -> Option<Self> {
        let width = self.width - 2.0 * amount;
        let height = self.height - 2.0 * amount;
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Self {
            x0: self.x0 + amount,
            y0: self.y0 + amount,
            width,
            height,
        })
    }

    pub fn union(&self, other: &Rect) -> Self {
        Rect::from_corners(
            Point::new(self.x0.min(other.x0), self.y0.min(other.y0)),
            Point::new(self.x1().max(other.x1()), self.y1().max(other.y1())),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut bounds: Option<Bounds> = None;
        for point in points {
            bounds = Some(match bounds {
                None => Bounds {
                    min_x: point.x,
                    max_x: point.x,
                    min_y: point.y,
                    max_y: point.y,
                },
                Some(b) => Bounds {
                    min_x: b.min_x.min(point.x),
                    max_x: b.max_x.max(point.x),
                    min_y: b.min_y.min(point.y),
                    max_y: b.max_y.max(point.y),
                },
            });
        }
        bounds
    }
}

/// Maps layout-space points into display space.
///
/// Implementors hold the pan/zoom state; this crate only ever queries them.
pub trait CoordinateTransform {
    /// `flip_y` mirrors the vertical axis, for layout engines whose y axis points up.
    fn to_display(&self, point: Point, flip_y: bool) -> Point;
}

#[derive(Clone, Copy, Debug)]
pub struct Transform {
    min_x: f64,
    min_y: f64,
    max_y: f64,
    scale_x: f64,
    scale_y: f64,
    pan: Point,
}

impl Transform {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64, width: f64, height: f64) -> Self {
        let span_x = (max_x - min_x).abs().max(1.0);
        let span_y = (max_y - min_y).abs().max(1.0);
        Self {
            min_x,
            min_y,
            max_y,
            scale_x: width / span_x,
            scale_y: height / span_y,
            pan: Point::new(0.0, 0.0),
        }
    }

    /// Layout units map 1:1 onto display units.
    pub fn identity() -> Self {
        Self {
            min_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            pan: Point::new(0.0, 0.0),
        }
    }

    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.scale_x *= zoom;
        self.scale_y *= zoom;
        self
    }

    pub fn with_pan(mut self, dx: f64, dy: f64) -> Self {
        self.pan.x += dx;
        self.pan.y += dy;
        self
    }

    pub fn map_point(&self, x: f64, y: f64) -> Point {
        Point {
            x: (x - self.min_x) * self.scale_x + self.pan.x,
            y: (y - self.min_y) * self.scale_y + self.pan.y,
        }
    }
}

impl CoordinateTransform for Transform {
    fn to_display(&self, point: Point, flip_y: bool) -> Point {
        let y = if flip_y {
            self.max_y - (point.y - self.min_y)
        } else {
            point.y
        };
        self.map_point(point.x, y)
    }
}

/// Compute a padded transform and canvas size from layout bounds.
pub fn transform_with_padding(bounds: Bounds, padding: f64, zoom: f64) -> (Transform, f64, f64) {
    // Expand the layout bounds so rendered output includes a consistent pixel margin.
    let min_x = bounds.min_x - padding;
    let max_x = bounds.max_x + padding;
    let min_y = bounds.min_y - padding;
    let max_y = bounds.max_y + padding;
    let width = (max_x - min_x).abs().max(1.0);
    let height = (max_y - min_y).abs().max(1.0);
    (
        Transform::new(min_x, min_y, max_x, max_y, width, height).with_zoom(zoom),
        width * zoom,
        height * zoom,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_normalizes_swapped_points() {
        let rect = Rect::from_corners(Point::new(20.0, 10.0), Point::new(0.0, 0.0));
        assert_eq!(rect, Rect { x0: 0.0, y0: 0.0, width: 20.0, height: 10.0 });
        assert_eq!(rect.center(), Point::new(10.0, 5.0));
    }

    #[test]
    fn inset_stops_before_collapsing() {
        let rect = Rect { x0: 0.0, y0: 0.0, width: 10.0, height: 4.0 };
        assert_eq!(
            rect.inset(1.0),
            Some(Rect { x0: 1.0, y0: 1.0, width: 8.0, height: 2.0 })
        );
        assert_eq!(rect.inset(2.0), None);
    }

    #[test]
    fn flip_mirrors_within_bounds() {
        let transform = Transform::new(0.0, 0.0, 100.0, 50.0, 100.0, 50.0);
        assert_eq!(transform.to_display(Point::new(10.0, 0.0), false), Point::new(10.0, 0.0));
        assert_eq!(transform.to_display(Point::new(10.0, 0.0), true), Point::new(10.0, 50.0));
        assert_eq!(transform.to_display(Point::new(10.0, 50.0), true), Point::new(10.0, 0.0));
    }

    #[test]
    fn zoom_and_pan_apply_after_scaling() {
        let transform = Transform::identity().with_zoom(2.0).with_pan(5.0, -5.0);
        assert_eq!(transform.to_display(Point::new(3.0, 4.0), false), Point::new(11.0, 3.0));
    }

    #[test]
    fn padding_grows_canvas_on_both_sides() {
        let bounds = Bounds { min_x: 0.0, max_x: 100.0, min_y: 0.0, max_y: 40.0 };
        let (transform, width, height) = transform_with_padding(bounds, 10.0, 1.0);
        assert_eq!((width, height), (120.0, 60.0));
        assert_eq!(transform.map_point(0.0, 0.0), Point::new(10.0, 10.0));
    }

    #[test]
    fn bounds_of_no_points_is_none() {
        assert_eq!(Bounds::from_points(&[] as &[Point]), None);
        let points = [Point::new(1.0, -2.0), Point::new(-3.0, 4.0)];
        assert_eq!(
            Bounds::from_points(&points),
            Some(Bounds { min_x: -3.0, max_x: 1.0, min_y: -2.0, max_y: 4.0 })
        );
    }
}

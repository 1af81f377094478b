use anyhow::Result;
use cairo::Context as CairoContext;

use crate::diagnostics::{DiagnosticSink, Warning};
use crate::geometry::{CoordinateTransform, Point, Rect};

/// Display-space gap between successive ellipse rings.
pub const RING_MARGIN_PX: f64 = 2.0;
pub const MAX_PERIPHERIES: u8 = 8;

/// Shape names drawn by connecting the layout vertices in order.
pub const POLYGON_SHAPES: &[&str] = &[
    "box",
    "polygon",
    "triangle",
    "invtriangle",
    "diamond",
    "trapezium",
    "invtrapezium",
    "parallelogram",
    "house",
    "invhouse",
    "pentagon",
    "hexagon",
    "septagon",
    "heptagon",
    "octagon",
    "rect",
    "rectangle",
    "square",
    // Drawn without their diagonal markers.
    "Msquare",
    "Mdiamond",
];

/// Shape names drawn as ellipses inscribed in two corner points.
pub const ELLIPSE_SHAPES: &[&str] = &["ellipse", "oval", "circle", "point", "Mcircle"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeFamily {
    Polygon,
    Ellipse,
    None,
    Unsupported,
}

impl ShapeFamily {
    pub fn of(name: &str) -> Self {
        if POLYGON_SHAPES.contains(&name) {
            ShapeFamily::Polygon
        } else if ELLIPSE_SHAPES.contains(&name) {
            ShapeFamily::Ellipse
        } else if name == "none" {
            ShapeFamily::None
        } else {
            ShapeFamily::Unsupported
        }
    }
}

/// Number of concentric outlines, limited to `1..=MAX_PERIPHERIES`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Peripheries(u8);

impl Peripheries {
    pub fn new(count: u8) -> Option<Self> {
        (1..=MAX_PERIPHERIES).contains(&count).then_some(Self(count))
    }

    /// Clamp a layout-supplied count into the accepted range.
    pub fn clamped(requested: i64) -> Self {
        Self(requested.clamp(1, MAX_PERIPHERIES as i64) as u8)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Peripheries {
    fn default() -> Self {
        Self(1)
    }
}

/// How to treat vertex lists that disagree with the shape's declared geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertexPolicy {
    /// Use as much of the data as is consistent, warn about the rest.
    #[default]
    Lenient,
    /// Any mismatch yields an empty path.
    Strict,
}

/// Validated layout-space description of a node outline.
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    Polygon {
        sides: usize,
        vertices: Vec<Point>,
        peripheries: Peripheries,
    },
    Ellipse {
        corners: [Point; 2],
        peripheries: Peripheries,
    },
    None,
    Unsupported {
        name: String,
    },
}

impl ShapeKind {
    /// Resolve a shape name and its raw layout data into a variant.
    ///
    /// Shape and vertex problems are reported to `sink`, at most one warning
    /// per category. Malformed vertex data resolves to [`ShapeKind::None`].
    /// Unsupported periphery counts are reported once the outline is built,
    /// since only then is the number of drawn rings known.
    pub fn from_layout(
        name: &str,
        sides: usize,
        vertices: &[Point],
        peripheries: i64,
        policy: VertexPolicy,
        sink: &dyn DiagnosticSink,
    ) -> Self {
        match ShapeFamily::of(name) {
            ShapeFamily::Polygon => {
                let Some(vertices) = polygon_vertices(name, sides, vertices, policy, sink) else {
                    return ShapeKind::None;
                };
                // Polygons only ever get one outline.
                ShapeKind::Polygon {
                    sides: vertices.len(),
                    vertices,
                    peripheries: Peripheries::default(),
                }
            }
            ShapeFamily::Ellipse => {
                let Some(corners) = ellipse_corners(name, vertices, policy, sink) else {
                    return ShapeKind::None;
                };
                ShapeKind::Ellipse {
                    corners,
                    peripheries: Peripheries::clamped(peripheries),
                }
            }
            ShapeFamily::None => ShapeKind::None,
            ShapeFamily::Unsupported => {
                sink.warn(Warning::UnsupportedShape {
                    name: name.to_string(),
                });
                ShapeKind::Unsupported {
                    name: name.to_string(),
                }
            }
        }
    }
}

fn all_finite(points: &[Point]) -> bool {
    points.iter().all(|p| p.x.is_finite() && p.y.is_finite())
}

fn malformed(sink: &dyn DiagnosticSink, shape: &str, detail: String) {
    sink.warn(Warning::MalformedVertexData {
        shape: shape.to_string(),
        detail,
    });
}

fn polygon_vertices(
    name: &str,
    sides: usize,
    vertices: &[Point],
    policy: VertexPolicy,
    sink: &dyn DiagnosticSink,
) -> Option<Vec<Point>> {
    let usable = sides.min(vertices.len());
    if !all_finite(&vertices[..usable]) {
        malformed(sink, name, "non-finite vertex coordinate".to_string());
        return None;
    }
    if usable < 3 {
        malformed(
            sink,
            name,
            format!("{} vertices for {} sides, need at least 3", vertices.len(), sides),
        );
        return None;
    }
    if sides != vertices.len() {
        let detail = format!("{} vertices for {} sides", vertices.len(), sides);
        malformed(sink, name, detail);
        if policy == VertexPolicy::Strict {
            return None;
        }
    }
    Some(vertices[..usable].to_vec())
}

fn ellipse_corners(
    name: &str,
    vertices: &[Point],
    policy: VertexPolicy,
    sink: &dyn DiagnosticSink,
) -> Option<[Point; 2]> {
    match vertices {
        [a, b, ..] if policy == VertexPolicy::Lenient || vertices.len() == 2 => {
            if !all_finite(&[*a, *b]) {
                malformed(sink, name, "non-finite corner coordinate".to_string());
                return None;
            }
            if vertices.len() > 2 {
                malformed(
                    sink,
                    name,
                    format!("{} corner points, using the first 2", vertices.len()),
                );
            }
            Some([*a, *b])
        }
        _ => {
            malformed(
                sink,
                name,
                format!("{} corner points, expected 2", vertices.len()),
            );
            None
        }
    }
}

/// One closed piece of a [`RenderedPath`], in display coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum SubPath {
    /// Points in layout order; the last point repeats the first.
    Polygon(Vec<Point>),
    Ellipse(Rect),
}

/// Display-space outline of a node. Empty for invisible and unsupported shapes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedPath {
    subpaths: Vec<SubPath>,
}

impl RenderedPath {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn subpaths(&self) -> &[SubPath] {
        &self.subpaths
    }

    pub fn is_empty(&self) -> bool {
        self.subpaths.is_empty()
    }

    pub fn bounding_rect(&self) -> Option<Rect> {
        self.subpaths
            .iter()
            .filter_map(|subpath| match subpath {
                SubPath::Polygon(points) => {
                    let first = points.first()?;
                    Some(points.iter().fold(Rect::from_corners(*first, *first), |rect, p| {
                        rect.union(&Rect::from_corners(*p, *p))
                    }))
                }
                SubPath::Ellipse(rect) => Some(*rect),
            })
            .reduce(|a, b| a.union(&b))
    }

    /// Hit test: inside any polygon (even-odd) or any ellipse.
    pub fn contains(&self, point: Point) -> bool {
        self.subpaths.iter().any(|subpath| match subpath {
            SubPath::Polygon(points) => polygon_contains(points, point),
            SubPath::Ellipse(rect) => ellipse_contains(*rect, point),
        })
    }

    /// Replace the current Cairo path with this outline.
    pub fn append_to(&self, ctx: &CairoContext) -> Result<()> {
        ctx.new_path();
        for subpath in &self.subpaths {
            match subpath {
                SubPath::Polygon(points) => {
                    let Some((first, rest)) = points.split_first() else {
                        continue;
                    };
                    ctx.move_to(first.x, first.y);
                    for p in rest {
                        ctx.line_to(p.x, p.y);
                    }
                    ctx.close_path();
                }
                SubPath::Ellipse(rect) => path_ellipse(ctx, *rect)?,
            }
        }
        Ok(())
    }
}

fn path_ellipse(ctx: &CairoContext, rect: Rect) -> Result<()> {
    let center = rect.center();
    let radius_x = (rect.width / 2.0).max(1.0);
    let radius_y = (rect.height / 2.0).max(1.0);
    ctx.save()?;
    ctx.new_sub_path();
    ctx.translate(center.x, center.y);
    ctx.scale(radius_x, radius_y);
    ctx.arc(0.0, 0.0, 1.0, 0.0, std::f64::consts::TAU);
    ctx.close_path();
    ctx.restore()?;
    Ok(())
}

fn polygon_contains(points: &[Point], point: Point) -> bool {
    let mut inside = false;
    let mut j = points.len().wrapping_sub(1);
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn ellipse_contains(rect: Rect, point: Point) -> bool {
    if rect.is_empty() {
        return false;
    }
    let center = rect.center();
    let dx = (point.x - center.x) / (rect.width / 2.0);
    let dy = (point.y - center.y) / (rect.height / 2.0);
    dx * dx + dy * dy <= 1.0
}

/// Turns layout-space shape descriptions into display-space outlines.
pub struct ShapeBuilder<'a> {
    transform: &'a dyn CoordinateTransform,
    sink: &'a dyn DiagnosticSink,
    policy: VertexPolicy,
    flip_y: bool,
}

impl<'a> ShapeBuilder<'a> {
    pub fn new(transform: &'a dyn CoordinateTransform, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            transform,
            sink,
            policy: VertexPolicy::default(),
            flip_y: false,
        }
    }

    pub fn with_policy(mut self, policy: VertexPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    /// Build an outline whose side count is implied by the vertex list.
    pub fn build(&self, name: &str, vertices: &[Point], peripheries: i64) -> RenderedPath {
        self.build_declared(name, vertices.len(), vertices, peripheries)
    }

    /// Build an outline for a shape that declares `sides` vertices.
    pub fn build_declared(
        &self,
        name: &str,
        sides: usize,
        vertices: &[Point],
        peripheries: i64,
    ) -> RenderedPath {
        let kind = ShapeKind::from_layout(name, sides, vertices, peripheries, self.policy, self.sink);
        let path = self.build_kind(&kind);
        let drawn = match kind {
            ShapeKind::Polygon { .. } | ShapeKind::Ellipse { .. } => path.subpaths().len(),
            ShapeKind::None | ShapeKind::Unsupported { .. } => return path,
        };
        if peripheries != 1 {
            self.sink.warn(Warning::UnsupportedPeripheries {
                shape: name.to_string(),
                requested: peripheries,
                used: drawn as u8,
            });
        }
        path
    }

    pub fn build_kind(&self, kind: &ShapeKind) -> RenderedPath {
        let subpaths = match kind {
            ShapeKind::Polygon { vertices, .. } => {
                let mut points: Vec<Point> = vertices
                    .iter()
                    .map(|v| self.transform.to_display(*v, self.flip_y))
                    .collect();
                if let Some(first) = points.first().copied() {
                    points.push(first);
                }
                vec![SubPath::Polygon(points)]
            }
            ShapeKind::Ellipse {
                corners,
                peripheries,
            } => {
                let bounds = Rect::from_corners(
                    self.transform.to_display(corners[0], self.flip_y),
                    self.transform.to_display(corners[1], self.flip_y),
                );
                let mut rings = vec![SubPath::Ellipse(bounds)];
                rings.extend(
                    (1..peripheries.get())
                        .map_while(|ring| bounds.inset(RING_MARGIN_PX * ring as f64))
                        .map(SubPath::Ellipse),
                );
                rings
            }
            ShapeKind::None | ShapeKind::Unsupported { .. } => Vec::new(),
        };
        RenderedPath { subpaths }
    }
}

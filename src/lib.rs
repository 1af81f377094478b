//! Node outlines and labels for laid-out graphs.
//!
//! A layout engine decides where every node goes; this crate turns each node's
//! shape descriptor into a display-space outline ([`shape`]), pre-renders its
//! label with Pango ([`label`]) and paints both through Cairo ([`node`]).
//! Unsupported shapes, odd periphery counts, bad vertex lists and missing fonts
//! never fail rendering. They are reported through a [`DiagnosticSink`].

pub mod diagnostics;
pub mod geometry;
pub mod label;
pub mod layout;
pub mod node;
pub mod scene;
pub mod shape;
pub mod style;

pub use diagnostics::{CollectingSink, DiagnosticSink, TracingSink, Warning};
pub use geometry::{CoordinateTransform, Point, Rect, Transform};
pub use label::{LabelRenderer, LabelSpec, RenderedLabel};
pub use layout::{parse_layout, LayoutGraph};
pub use node::{NodeData, NodeOptions, NodeView, ShapeSpec};
pub use scene::{draw_layout, GraphView, RenderOptions};
pub use shape::{
    Peripheries, RenderedPath, ShapeBuilder, ShapeFamily, ShapeKind, SubPath, VertexPolicy,
};
pub use style::{Color, NodeStyle};

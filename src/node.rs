use anyhow::{Context, Result};
use cairo::Context as CairoContext;

use crate::diagnostics::DiagnosticSink;
use crate::geometry::{CoordinateTransform, Point, Rect};
use crate::label::{LabelRenderer, LabelSpec, RenderedLabel};
use crate::shape::{RenderedPath, ShapeBuilder, VertexPolicy};
use crate::style::NodeStyle;

/// Outline data of a node as produced by the layout engine.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeSpec {
    pub name: String,
    /// Declared side count; defaults to the vertex count.
    pub sides: Option<usize>,
    pub vertices: Vec<Point>,
    pub peripheries: i64,
}

impl ShapeSpec {
    pub fn new(name: impl Into<String>, vertices: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            sides: None,
            vertices,
            peripheries: 1,
        }
    }
}

/// Everything the layout engine knows about one node.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeData {
    pub name: String,
    pub shape: ShapeSpec,
    pub label: LabelSpec,
}

/// Settings shared by every node of a view.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodeOptions {
    pub flip_y: bool,
    pub policy: VertexPolicy,
    pub style: NodeStyle,
}

/// Drawable for one graph node: a cached outline with a cached label on top.
#[derive(Debug)]
pub struct NodeView {
    name: String,
    path: RenderedPath,
    label: RenderedLabel,
    style: NodeStyle,
}

impl NodeView {
    pub fn new(
        node: &NodeData,
        transform: &dyn CoordinateTransform,
        options: NodeOptions,
        sink: &dyn DiagnosticSink,
    ) -> Result<Self> {
        let path = ShapeBuilder::new(transform, sink)
            .with_policy(options.policy)
            .with_flip_y(options.flip_y)
            .build_declared(
                &node.shape.name,
                node.shape.sides.unwrap_or(node.shape.vertices.len()),
                &node.shape.vertices,
                node.shape.peripheries,
            );
        let label = LabelRenderer::new(transform, sink)?
            .with_flip_y(options.flip_y)
            .render(&node.label);
        tracing::debug!(
            node = %node.name,
            shape = %node.shape.name,
            subpaths = path.subpaths().len(),
            family = %label.family(),
            "built node view"
        );
        Ok(Self {
            name: node.name.clone(),
            path,
            label,
            style: options.style,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outline, also the hit-test and selection boundary.
    pub fn path(&self) -> &RenderedPath {
        &self.path
    }

    pub fn label(&self) -> &RenderedLabel {
        &self.label
    }

    pub fn contains(&self, point: Point) -> bool {
        self.path.contains(point)
    }

    pub fn bounding_rect(&self) -> Rect {
        match self.path.bounding_rect() {
            Some(outline) => outline.union(&self.label.rect()),
            None => self.label.rect(),
        }
    }

    /// Outline first, label over it.
    pub fn paint(&self, ctx: &CairoContext) -> Result<()> {
        ctx.save().context("Failed to save Cairo state")?;
        let outline = self.paint_outline(ctx);
        ctx.restore().context("Failed to restore Cairo state")?;
        outline?;
        self.label.paint(ctx)
    }

    fn paint_outline(&self, ctx: &CairoContext) -> Result<()> {
        if self.path.is_empty() {
            return Ok(());
        }
        self.path.append_to(ctx)?;
        ctx.set_line_width(self.style.line_width.max(0.5));
        if let Some(fill) = self.style.fill {
            fill.set_source(ctx);
            ctx.fill_preserve().context("Failed to fill node outline")?;
        }
        self.style.border.set_source(ctx);
        ctx.stroke().context("Failed to stroke node outline")?;
        Ok(())
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cairo::{Context as CairoContext, Format, ImageSurface, SvgSurface};

use crate::diagnostics::DiagnosticSink;
use crate::geometry::{transform_with_padding, Bounds, Point, Transform};
use crate::layout::{parse_layout, LayoutGraph};
use crate::node::{NodeOptions, NodeView};
use crate::shape::VertexPolicy;
use crate::style::{NodeStyle, BACKGROUND_COLOR};

pub const DEFAULT_PADDING_PX: f64 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    pub padding: f64,
    pub zoom: f64,
    pub policy: VertexPolicy,
    pub style: NodeStyle,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING_PX,
            zoom: 1.0,
            policy: VertexPolicy::default(),
            style: NodeStyle::default(),
        }
    }
}

/// Every node of a laid-out graph, ready to paint onto a canvas.
#[derive(Debug)]
pub struct GraphView {
    nodes: Vec<NodeView>,
    transform: Transform,
    width: f64,
    height: f64,
}

impl GraphView {
    pub fn new(graph: &LayoutGraph, options: RenderOptions, sink: &dyn DiagnosticSink) -> Result<Self> {
        let bounds = graph.bounds().unwrap_or(Bounds {
            min_x: 0.0,
            max_x: 0.0,
            min_y: 0.0,
            max_y: 0.0,
        });
        let (transform, width, height) =
            transform_with_padding(bounds, options.padding, options.zoom.max(f64::EPSILON));
        let node_options = NodeOptions {
            flip_y: graph.y_up,
            policy: options.policy,
            style: options.style,
        };
        let nodes = graph
            .nodes
            .iter()
            .map(|node| NodeView::new(node, &transform, node_options, sink))
            .collect::<Result<Vec<_>>>()?;
        tracing::info!(nodes = nodes.len(), width, height, "built graph view");
        Ok(Self {
            nodes,
            transform,
            width,
            height,
        })
    }

    pub fn nodes(&self) -> &[NodeView] {
        &self.nodes
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Topmost node whose outline contains the display-space point.
    pub fn node_at(&self, point: Point) -> Option<&NodeView> {
        self.nodes.iter().rev().find(|node| node.contains(point))
    }

    pub fn paint(&self, ctx: &CairoContext) -> Result<()> {
        for node in &self.nodes {
            node.paint(ctx)
                .with_context(|| format!("Failed to paint node {:?}", node.name()))?;
        }
        Ok(())
    }

    pub fn write_png(&self, output: &Path) -> Result<()> {
        let (surface, ctx) =
            create_png_surface(self.width.ceil() as i32, self.height.ceil() as i32)?;
        self.paint(&ctx)?;
        drop(ctx);
        let mut file = fs::File::create(output)
            .with_context(|| format!("Failed to create PNG file {:?}", output))?;
        surface
            .write_to_png(&mut file)
            .context("Failed to write PNG")?;
        Ok(())
    }

    pub fn write_svg(&self, output: &Path) -> Result<()> {
        render_svg(output, self.width, self.height, |ctx| self.paint(ctx))
    }
}

fn setup_context(ctx: &CairoContext) -> Result<()> {
    BACKGROUND_COLOR.set_source(ctx);
    ctx.paint()?;
    Ok(())
}

fn create_png_surface(width: i32, height: i32) -> Result<(ImageSurface, CairoContext)> {
    let surface = ImageSurface::create(Format::ARgb32, width.max(1), height.max(1))
        .context("Failed to create image surface")?;
    let ctx = CairoContext::new(&surface).context("Failed to create Cairo context")?;
    setup_context(&ctx)?;
    Ok((surface, ctx))
}

pub fn default_svg_output_path(output: &Path) -> PathBuf {
    let mut svg_path = output.to_path_buf();
    svg_path.set_extension("svg");
    svg_path
}

fn render_svg<F>(svg_path: &Path, width: f64, height: f64, render: F) -> Result<()>
where
    F: FnOnce(&CairoContext) -> Result<()>,
{
    let surface = SvgSurface::new(width, height, Some(svg_path))
        .context("Failed to create SVG surface")?;
    let ctx = CairoContext::new(&surface).context("Failed to create Cairo context")?;
    setup_context(&ctx)?;
    render(&ctx)?;
    surface.finish();
    Ok(())
}

/// Read a layout file and write it as PNG, plus SVG when `svg_output` is set.
pub fn draw_layout(
    input: &Path,
    output: &Path,
    svg_output: Option<&Path>,
    options: RenderOptions,
    sink: &dyn DiagnosticSink,
) -> Result<GraphView> {
    let xml = fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?;
    let graph = parse_layout(&xml).with_context(|| format!("Failed to load {:?}", input))?;
    let view = GraphView::new(&graph, options, sink)?;
    view.write_png(output)?;
    if let Some(svg_output) = svg_output {
        view.write_svg(svg_output)?;
    }
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{CollectingSink, Warning};
    use crate::geometry::CoordinateTransform;

    const GRAPH: &str = r#"
        <graph y-axis="up">
          <node name="a" shape="box">
            <vertex x="0" y="0"/><vertex x="40" y="0"/><vertex x="40" y="20"/><vertex x="0" y="20"/>
            <label text="a" font="sans" x="20" y="10"/>
          </node>
          <node name="b" shape="egg">
            <vertex x="60" y="0"/><vertex x="100" y="20"/>
            <label text="b" font="sans" x="80" y="10"/>
          </node>
        </graph>
    "#;

    #[test]
    fn canvas_is_padded_layout_extent() {
        let graph = parse_layout(GRAPH).unwrap();
        let sink = CollectingSink::new();
        let view = GraphView::new(&graph, RenderOptions::default(), &sink).unwrap();
        assert_eq!(view.size(), (120.0, 40.0));
        assert_eq!(view.nodes().len(), 2);
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn zoom_scales_canvas_and_geometry() {
        let graph = parse_layout(GRAPH).unwrap();
        let sink = CollectingSink::new();
        let options = RenderOptions {
            zoom: 2.0,
            ..RenderOptions::default()
        };
        let view = GraphView::new(&graph, options, &sink).unwrap();
        assert_eq!(view.size(), (240.0, 80.0));
        assert_eq!(
            view.transform().to_display(Point::new(0.0, 0.0), false),
            Point::new(20.0, 20.0)
        );
    }

    #[test]
    fn node_at_finds_outlined_nodes_only() {
        let graph = parse_layout(GRAPH).unwrap();
        let sink = CollectingSink::new();
        let view = GraphView::new(&graph, RenderOptions::default(), &sink).unwrap();
        let hit = view.node_at(Point::new(30.0, 20.0)).map(NodeView::name);
        assert_eq!(hit, Some("a"));
        // "egg" has no outline to hit.
        assert!(view.node_at(Point::new(90.0, 20.0)).is_none());
    }

    #[test]
    fn oversized_label_does_not_abort_the_graph() {
        let graph = parse_layout(
            r#"<graph>
                 <node name="big" shape="box">
                   <vertex x="0" y="0"/><vertex x="40" y="0"/><vertex x="40" y="20"/><vertex x="0" y="20"/>
                   <label text="MMMMMMMMMMMMMMMMMMMM" font="sans" size="3000" x="20" y="10"/>
                 </node>
                 <node name="small" shape="box">
                   <vertex x="60" y="0"/><vertex x="100" y="0"/><vertex x="100" y="20"/><vertex x="60" y="20"/>
                   <label text="ok" font="sans" x="80" y="10"/>
                 </node>
               </graph>"#,
        )
        .unwrap();
        let sink = CollectingSink::new();
        let view = GraphView::new(&graph, RenderOptions::default(), &sink).unwrap();
        assert_eq!(view.nodes().len(), 2);
        assert!(view.nodes()[0].label().image().is_none());
        assert!(view.nodes()[1].label().image().is_some());
        assert!(sink
            .warnings()
            .iter()
            .any(|w| matches!(w, Warning::LabelNotRendered { .. })));

        let (_surface, ctx) = create_png_surface(120, 40).unwrap();
        view.paint(&ctx).unwrap();
    }

    #[test]
    fn svg_path_replaces_extension() {
        assert_eq!(
            default_svg_output_path(Path::new("out/graph.png")),
            PathBuf::from("out/graph.svg")
        );
    }
}

use anyhow::{anyhow, Context, Result};
use roxmltree::Document;

use crate::geometry::{Bounds, Point};
use crate::label::LabelSpec;
use crate::node::{NodeData, ShapeSpec};
use crate::style::{Color, DEFAULT_FONT_COLOR};

pub const DEFAULT_FONT_FAMILY: &str = "Times-Roman";
pub const DEFAULT_FONT_SIZE_PX: f64 = 14.0;

/// Nodes of a laid-out graph, as written by the layout engine.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutGraph {
    pub nodes: Vec<NodeData>,
    /// Layout y axis points up, so display coordinates need flipping.
    pub y_up: bool,
}

impl LayoutGraph {
    /// Layout-space extent of every vertex and label anchor.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.nodes.iter().flat_map(|node| {
            node.shape
                .vertices
                .iter()
                .chain(std::iter::once(&node.label.anchor))
        }))
    }
}

pub fn parse_layout(xml: &str) -> Result<LayoutGraph> {
    let doc = Document::parse(xml).context("Failed to parse layout XML")?;
    let graph = doc
        .descendants()
        .find(|node| node.has_tag_name("graph"))
        .ok_or_else(|| anyhow!("Layout file missing graph element"))?;
    let y_up = match graph.attribute("y-axis").unwrap_or("up") {
        "up" => true,
        "down" => false,
        other => return Err(anyhow!("Bad y-axis {other:?}, expected up or down")),
    };

    let nodes = graph
        .children()
        .filter(|node| node.has_tag_name("node"))
        .map(|node| parse_node(&node))
        .collect::<Result<Vec<_>>>()?;
    Ok(LayoutGraph { nodes, y_up })
}

fn parse_node(node: &roxmltree::Node) -> Result<NodeData> {
    let name = node.attribute("name").unwrap_or_default().to_string();
    let shape_name = node.attribute("shape").unwrap_or("ellipse").to_string();
    let peripheries = match node.attribute("peripheries") {
        Some(value) => value
            .trim()
            .parse::<i64>()
            .with_context(|| format!("Bad peripheries on node {name:?}"))?,
        None => 1,
    };
    let sides = match node.attribute("sides") {
        Some(value) => Some(
            value
                .trim()
                .parse::<usize>()
                .with_context(|| format!("Bad sides on node {name:?}"))?,
        ),
        None => None,
    };

    let vertices = node
        .children()
        .filter(|child| child.has_tag_name("vertex"))
        .map(|vertex| parse_point(&vertex).with_context(|| format!("Bad vertex on node {name:?}")))
        .collect::<Result<Vec<_>>>()?;

    let label_node = node.children().find(|child| child.has_tag_name("label"));
    let label = match label_node {
        Some(label_node) => parse_label(&label_node, &vertices)
            .with_context(|| format!("Bad label on node {name:?}"))?,
        None => LabelSpec {
            text: String::new(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size_px: DEFAULT_FONT_SIZE_PX,
            color: DEFAULT_FONT_COLOR,
            anchor: centroid(&vertices),
        },
    };

    Ok(NodeData {
        name,
        shape: ShapeSpec {
            name: shape_name,
            sides,
            vertices,
            peripheries,
        },
        label,
    })
}

fn parse_label(node: &roxmltree::Node, vertices: &[Point]) -> Result<LabelSpec> {
    let text = node
        .attribute("text")
        .or_else(|| node.text())
        .unwrap_or("")
        .replace('\r', "");
    let font_size_px = match node.attribute("size") {
        Some(value) => parse_f64(Some(value)).ok_or_else(|| anyhow!("Bad font size {value:?}"))?,
        None => DEFAULT_FONT_SIZE_PX,
    };
    let color = match node.attribute("color") {
        Some(value) => Color::from_hex(value)?,
        None => DEFAULT_FONT_COLOR,
    };
    let anchor = match (node.attribute("x"), node.attribute("y")) {
        (None, None) => centroid(vertices),
        _ => parse_point(node)?,
    };
    Ok(LabelSpec {
        text,
        font_family: node
            .attribute("font")
            .unwrap_or(DEFAULT_FONT_FAMILY)
            .to_string(),
        font_size_px,
        color,
        anchor,
    })
}

fn parse_point(node: &roxmltree::Node) -> Result<Point> {
    Ok(Point {
        x: parse_f64(node.attribute("x")).ok_or_else(|| anyhow!("Bad x"))?,
        y: parse_f64(node.attribute("y")).ok_or_else(|| anyhow!("Bad y"))?,
    })
}

fn parse_f64(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}

fn centroid(points: &[Point]) -> Point {
    if points.is_empty() {
        return Point::new(0.0, 0.0);
    }
    let n = points.len() as f64;
    Point {
        x: points.iter().map(|p| p.x).sum::<f64>() / n,
        y: points.iter().map(|p| p.y).sum::<f64>() / n,
    }
}

use anyhow::{anyhow, Context, Result};
use cairo::{Context as CairoContext, Format, ImageSurface};
use pango::prelude::*;
use pango::{Alignment, FontDescription};
use pangocairo::functions as pangocairo;

use crate::diagnostics::{DiagnosticSink, Warning};
use crate::geometry::{CoordinateTransform, Point, Rect};
use crate::style::Color;

/// Extra room around the measured text so glyph overhangs are not clipped.
pub const LABEL_PADDING_PX: f64 = 2.0;
/// Largest image side Cairo will allocate.
pub const MAX_LABEL_SURFACE_PX: f64 = 32767.0;

/// Families fontconfig always maps onto a concrete font; asking for one is never a substitution.
const GENERIC_FAMILIES: &[&str] = &[
    "sans",
    "sans-serif",
    "serif",
    "monospace",
    "cursive",
    "fantasy",
    "system-ui",
];

/// Text label of a node as produced by the layout engine.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelSpec {
    pub text: String,
    pub font_family: String,
    /// Size in layout units; scaled with the transform like the node outline.
    pub font_size_px: f64,
    pub color: Color,
    /// Layout-space point the label is centered on.
    pub anchor: Point,
}

/// Pre-rendered label image and where it goes in display space.
#[derive(Debug)]
pub struct RenderedLabel {
    image: Option<ImageSurface>,
    origin: Point,
    rect: Rect,
    family: String,
}

impl RenderedLabel {
    /// `None` when the label could not be rasterized; painting it is then a no-op.
    pub fn image(&self) -> Option<&ImageSurface> {
        self.image.as_ref()
    }

    /// Padded display-space placement, centered on the transformed anchor.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Whole-pixel display position of the image's top-left corner.
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Family the text was actually drawn with.
    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn into_image(self) -> Option<ImageSurface> {
        self.image
    }

    pub fn paint(&self, ctx: &CairoContext) -> Result<()> {
        let Some(image) = &self.image else {
            return Ok(());
        };
        ctx.set_source_surface(image, self.origin.x, self.origin.y)
            .context("Failed to use label image as source")?;
        ctx.paint().context("Failed to paint label image")?;
        Ok(())
    }
}

/// Outcome of looking up a font family.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    pub description: FontDescription,
    pub family: String,
    pub substituted: bool,
}

pub struct LabelRenderer<'a> {
    transform: &'a dyn CoordinateTransform,
    sink: &'a dyn DiagnosticSink,
    flip_y: bool,
    // Kept alive for `measure_ctx`.
    _measure_surface: ImageSurface,
    measure_ctx: CairoContext,
}

impl<'a> LabelRenderer<'a> {
    pub fn new(transform: &'a dyn CoordinateTransform, sink: &'a dyn DiagnosticSink) -> Result<Self> {
        let surface = ImageSurface::create(Format::ARgb32, 1, 1)
            .context("Failed to create measuring surface")?;
        let measure_ctx = CairoContext::new(&surface).context("Failed to create Cairo context")?;
        Ok(Self {
            transform,
            sink,
            flip_y: false,
            _measure_surface: surface,
            measure_ctx,
        })
    }

    pub fn with_flip_y(mut self, flip_y: bool) -> Self {
        self.flip_y = flip_y;
        self
    }

    /// Look up `family` at `size_px` pixels, warning when another family is used instead.
    pub fn resolve_font(&self, family: &str, size_px: f64) -> ResolvedFont {
        let mut description = FontDescription::new();
        description.set_family(family);
        description.set_absolute_size(size_px.max(1.0) * pango::SCALE as f64);

        let pango_ctx = pangocairo::create_context(&self.measure_ctx);
        let loaded = pango_ctx
            .load_font(&description)
            .and_then(|font| font.describe().family())
            .map(|name| name.to_string());

        let requested = family.split(',').next().unwrap_or("").trim();
        let substituted = match &loaded {
            _ if requested.is_empty() || is_generic(requested) => false,
            Some(actual) => !actual.eq_ignore_ascii_case(requested),
            None => true,
        };
        let actual = loaded.unwrap_or_else(|| "(none)".to_string());
        if substituted {
            self.sink.warn(Warning::FontSubstitution {
                requested: requested.to_string(),
                substituted: actual.clone(),
            });
        }
        ResolvedFont {
            description,
            family: actual,
            substituted,
        }
    }

    /// Display units per layout unit around `anchor`.
    fn display_scale(&self, anchor: Point) -> f64 {
        let a = self.transform.to_display(anchor, self.flip_y);
        let b = self
            .transform
            .to_display(Point::new(anchor.x + 1.0, anchor.y + 1.0), self.flip_y);
        let scale = (b.x - a.x).abs().min((b.y - a.y).abs());
        if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        }
    }

    /// Never fails: a label that cannot be rasterized keeps its placement,
    /// loses its image and is reported to the sink.
    pub fn render(&self, label: &LabelSpec) -> RenderedLabel {
        let scale = self.display_scale(label.anchor);
        let font = self.resolve_font(&label.font_family, label.font_size_px * scale);

        let (text_w, text_h) = if label.text.trim().is_empty() {
            (0.0, 0.0)
        } else {
            let layout = create_layout(&self.measure_ctx, &font.description, &label.text);
            let (w, h) = layout.pixel_size();
            (w as f64, h as f64)
        };

        let center = self.transform.to_display(label.anchor, self.flip_y);
        let rect = Rect::centered_on(center, text_w, text_h).padded(LABEL_PADDING_PX);
        let origin = Point::new(rect.x0.floor(), rect.y0.floor());

        let image = match rasterize(label, &font.description, rect, origin, (text_w, text_h)) {
            Ok(image) => Some(image),
            Err(err) => {
                self.sink.warn(Warning::LabelNotRendered {
                    text: label.text.clone(),
                    detail: format!("{err:#}"),
                });
                None
            }
        };

        RenderedLabel {
            image,
            origin,
            rect,
            family: font.family,
        }
    }
}

/// Draw the text into an image whose top-left corner sits at `origin`.
///
/// The text keeps its sub-pixel position inside the image, so the image itself
/// can be painted on whole pixels without resampling.
fn rasterize(
    label: &LabelSpec,
    font: &FontDescription,
    rect: Rect,
    origin: Point,
    (text_w, text_h): (f64, f64),
) -> Result<ImageSurface> {
    let width = (rect.x1() - origin.x).ceil().max(1.0);
    let height = (rect.y1() - origin.y).ceil().max(1.0);
    if width > MAX_LABEL_SURFACE_PX || height > MAX_LABEL_SURFACE_PX {
        return Err(anyhow!(
            "label image {width}x{height} exceeds {MAX_LABEL_SURFACE_PX} px"
        ));
    }
    let image = ImageSurface::create(Format::ARgb32, width as i32, height as i32)
        .context("Failed to create label surface")?;
    if text_w > 0.0 {
        let ctx = CairoContext::new(&image).context("Failed to create Cairo context")?;
        let layout = create_layout(&ctx, font, &label.text);
        let x = rect.x0 - origin.x + (rect.width - text_w) / 2.0;
        let y = rect.y0 - origin.y + (rect.height - text_h) / 2.0;
        draw_text_at(&ctx, x, y, &layout, label.color)?;
    }
    image.flush();
    Ok(image)
}

fn is_generic(family: &str) -> bool {
    GENERIC_FAMILIES
        .iter()
        .any(|generic| generic.eq_ignore_ascii_case(family))
}

fn create_layout(ctx: &CairoContext, font: &FontDescription, text: &str) -> pango::Layout {
    let layout = pangocairo::create_layout(ctx);
    layout.set_font_description(Some(font));
    layout.set_alignment(Alignment::Center);
    layout.set_text(text);
    layout
}

fn draw_text_at(
    ctx: &CairoContext,
    x: f64,
    y: f64,
    layout: &pango::Layout,
    color: Color,
) -> Result<()> {
    ctx.move_to(x, y);
    pangocairo::layout_path(ctx, layout);
    color.set_source(ctx);
    ctx.fill().context("Failed to fill label text")?;
    Ok(())
}

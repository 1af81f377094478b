use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use render_graph_nodes::scene::{
    default_svg_output_path, draw_layout, RenderOptions, DEFAULT_PADDING_PX,
};
use render_graph_nodes::{TracingSink, VertexPolicy};

#[derive(Parser)]
#[command(author, version, about = "Render laid-out graph nodes to PNG", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(name = "draw_graph")]
    DrawGraph {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "graph.png")]
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_PADDING_PX)]
        padding: f64,
        #[arg(long, default_value_t = 1.0)]
        zoom: f64,
        /// Drop outlines whose vertex data disagrees with the shape instead of repairing them.
        #[arg(long)]
        strict_vertices: bool,
        /// Also write an SVG next to the PNG.
        #[arg(long)]
        svg: bool,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::DrawGraph {
            input,
            output,
            padding,
            zoom,
            strict_vertices,
            svg,
        } => {
            let options = RenderOptions {
                padding,
                zoom,
                policy: if strict_vertices {
                    VertexPolicy::Strict
                } else {
                    VertexPolicy::Lenient
                },
                ..RenderOptions::default()
            };
            let svg_path = svg.then(|| default_svg_output_path(&output));
            draw_layout(&input, &output, svg_path.as_deref(), options, &TracingSink)?;
            Ok(())
        }
    }
}

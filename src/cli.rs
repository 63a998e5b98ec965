use crate::config::{Config, load_config};
use crate::layer::FlowLayer;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::render::{SvgSurface, render_svg, write_output_svg};
use crate::scene::{Scene, parse_scene};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "sankey-flows", version, about = "Lay out and draw sankey flows from a JSON5 scene")]
pub struct Args {
    /// Scene file (.json5/.json) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout for SVG and JSON if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "svg")]
    pub output_format: OutputFormat,

    /// Config JSON file (theme, sankey defaults, render size)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Width
    #[arg(short = 'w', long = "width")]
    pub width: Option<f64>,

    /// Height
    #[arg(short = 'H', long = "height")]
    pub height: Option<f64>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Svg,
    Png,
    Json,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.render.width = width;
    }
    if let Some(height) = args.height {
        config.render.height = height;
    }

    let input = read_input(args.input.as_deref())?;
    let scene = parse_scene(&input)?;
    draw_scene(&scene, &config, args.output_format, args.output.as_deref())
}

fn draw_scene(scene: &Scene, config: &Config, format: OutputFormat, output: Option<&Path>) -> Result<()> {
    let mut surface = SvgSurface::new();
    let mut layer = FlowLayer::new(config.layout.clone());
    let summary = layer.render(&scene.changes, &scene.nodes, &scene.mappings, &mut surface)?;
    for handle in summary.evicted {
        surface.remove(handle)?;
    }

    match format {
        OutputFormat::Json => match output {
            Some(path) => write_layout_dump(path, &summary.layout)?,
            None => println!("{}", LayoutDump::from_layout(&summary.layout).to_json()?),
        },
        OutputFormat::Svg => {
            let svg = render_svg(&surface, Some(&summary.layout), &config.theme, &config.render);
            write_output_svg(&svg, output)?;
        }
        OutputFormat::Png => {
            let output = ensure_output(output, "png")?;
            let svg = render_svg(&surface, Some(&summary.layout), &config.theme, &config.render);
            write_png(&svg, output, config)?;
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
fn write_png(svg: &str, output: &Path, config: &Config) -> Result<()> {
    crate::render::write_output_png(svg, output, &config.render)
}

#[cfg(not(feature = "png"))]
fn write_png(_svg: &str, _output: &Path, _config: &Config) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return Ok(std::fs::read_to_string(path)?);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn ensure_output<'a>(output: Option<&'a Path>, ext: &str) -> Result<&'a Path> {
    output.ok_or_else(|| anyhow::anyhow!("Output path required for {} output", ext))
}

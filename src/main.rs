//! Cortex Surface CLI Application

use clap::Parser;
use cortex_surface::config::SurfaceConfig;
use cortex_surface::diagnostics::LogSink;
use cortex_surface::io::{
    read_surface_with, transform_loader_for, write_surface, write_surface_to_vtu, FormatKind,
    SurfaceReader, SurfaceReport,
};
use cortex_surface::mesh::{
    project_onto_ellipsoid, recenter, talairach_transform, EllipsoidAxes, PoleKind, Surface,
};
use cortex_surface::{Result, SurfaceError};
use std::path::{Path, PathBuf};

mod cli;
use cli::{Cli, Commands, OutputFormat};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = match &cli.config {
        Some(path) => SurfaceConfig::from_file(path)?,
        None => SurfaceConfig::default(),
    };

    match cli.command {
        Commands::Info { input, report } => cmd_info(&input, report, &config),
        Commands::Center {
            input,
            output,
            format,
        } => cmd_center(&input, &output, format, &config),
        Commands::Ellipsoid {
            input,
            output,
            axes,
            format,
        } => cmd_ellipsoid(&input, &output, axes, format, &config),
        Commands::Talairach {
            input,
            output,
            transform,
            format,
        } => cmd_talairach(&input, &output, transform, format, config),
        Commands::Export { input, output } => cmd_export(&input, &output, &config),
    }
}

fn cmd_info(input: &Path, report: Option<PathBuf>, config: &SurfaceConfig) -> Result<()> {
    println!("Reading surface file: {}", input.display());

    let reader = SurfaceReader::open(input)?;
    let loader = transform_loader_for(config);
    let surface = reader.read_surface(config, loader.as_ref(), &mut LogSink)?;
    let summary = SurfaceReport::new(
        input.display().to_string(),
        Some(reader.format()),
        &surface,
    );

    println!("\n{}", "=".repeat(60));
    println!("SURFACE INFORMATION");
    println!("{}", "=".repeat(60));
    println!();
    println!("  Format:       {}", reader.format());
    println!("  Hemisphere:   {:?}", surface.hemisphere);
    println!("  Vertices:     {}", surface.num_vertices());
    println!("  Faces:        {}", surface.num_faces());
    println!(
        "  Bounds:       ({:.2}, {:.2}, {:.2}) --> ({:.2}, {:.2}, {:.2})",
        summary.bounds_lo[0],
        summary.bounds_lo[1],
        summary.bounds_lo[2],
        summary.bounds_hi[0],
        summary.bounds_hi[1],
        summary.bounds_hi[2]
    );
    println!(
        "  Curvature:    [{:.3}, {:.3}]",
        surface.min_curv, surface.max_curv
    );
    println!("  Total area:   {:.1} (side-file)", surface.total_area);
    println!("                {:.1} (computed)", summary.computed_area);
    println!("  Border:       {} vertices", summary.border_vertices);
    println!(
        "  Transform:    {}",
        if surface.transform.is_some() {
            "loaded"
        } else {
            "none"
        }
    );
    println!();

    println!("Poles:");
    for kind in [PoleKind::Frontal, PoleKind::Occipital, PoleKind::Temporal] {
        match (surface.poles.get(kind), surface.pole_position(kind)) {
            (Some(vno), Some(p)) => println!(
                "  - {:?}: vertex {} at ({:.2}, {:.2}, {:.2})",
                kind, vno, p.x, p.y, p.z
            ),
            _ => println!("  - {:?}: NOT FOUND", kind),
        }
    }
    println!();
    println!("{}", "=".repeat(60));

    if let Some(path) = report {
        summary.export(&path)?;
        println!("Report written to {}", path.display());
    }

    Ok(())
}

fn cmd_center(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    config: &SurfaceConfig,
) -> Result<()> {
    let mut surface = read_surface_with(input, config)?;
    let centered = recenter(&mut surface, None)?;
    save(&centered, output, format)
}

fn cmd_ellipsoid(
    input: &Path,
    output: &Path,
    axes: Option<Vec<f32>>,
    format: OutputFormat,
    config: &SurfaceConfig,
) -> Result<()> {
    let axes = match axes.as_deref() {
        Some(&[a, b, c]) => EllipsoidAxes::new(a, b, c),
        Some(other) => {
            return Err(SurfaceError::BadParameter(format!(
                "expected three ellipsoid axes, got {}",
                other.len()
            )))
        }
        None => config.ellipsoid,
    };

    let surface = read_surface_with(input, config)?;
    let projected = project_onto_ellipsoid(&surface, None, &axes, &mut LogSink)?;
    save(&projected, output, format)
}

fn cmd_talairach(
    input: &Path,
    output: &Path,
    transform: Option<PathBuf>,
    format: OutputFormat,
    mut config: SurfaceConfig,
) -> Result<()> {
    if let Some(path) = transform {
        config.transform_file = Some(path.display().to_string());
        config.load_transform = true;
    }

    let surface = read_surface_with(input, &config)?;
    let mapped = talairach_transform(&surface, None)?;
    save(&mapped, output, format)
}

fn cmd_export(input: &Path, output: &Path, config: &SurfaceConfig) -> Result<()> {
    let surface = read_surface_with(input, config)?;
    write_surface_to_vtu(&surface, output, None)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn save(surface: &Surface, output: &Path, format: OutputFormat) -> Result<()> {
    let kind = FormatKind::from(format);
    write_surface(surface, output, kind)?;
    println!(
        "Wrote {} surface with {} vertices to {}",
        kind,
        surface.num_vertices(),
        output.display()
    );
    Ok(())
}

//! Trigon CLI - mesh inspection and processing tool.
//!
//! Usage: trigon <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Run `trigon --help` for available commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use trigon::algo::{self, CurvatureMeasure, SmoothOptions};
use trigon::io;
use trigon::mesh::{to_face_vertex, HalfEdgeMesh, SoupMesh};

#[derive(Parser)]
#[command(name = "trigon")]
#[command(author, version, about = "Triangle-mesh geometry processing CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,

        /// Show curvature statistics
        #[arg(long)]
        curvature: bool,
    },

    /// Laplacian-smooth a mesh
    Smooth {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Number of iterations
        #[arg(short, long, default_value = "1")]
        iterations: usize,

        /// Step factor toward the 1-ring center of gravity (0.0 to 1.0)
        #[arg(short, long, default_value = "0.5")]
        factor: f64,
    },

    /// Color a mesh by curvature and write a vertex-colored OBJ
    Curvature {
        /// Input mesh file
        input: PathBuf,

        /// Output OBJ file
        output: PathBuf,

        /// Curvature measure
        #[arg(short, long, value_enum, default_value = "mean")]
        measure: Measure,
    },

    /// Convert between mesh formats
    Convert {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Measure {
    /// Mean curvature from the cotangent Laplacian
    Mean,
    /// Surface variation from the 1-ring covariance
    Variation,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input, curvature } => cmd_info(&input, curvature)?,
        Commands::Smooth {
            input,
            output,
            iterations,
            factor,
        } => cmd_smooth(&input, &output, iterations, factor)?,
        Commands::Curvature {
            input,
            output,
            measure,
        } => cmd_curvature(&input, &output, measure)?,
        Commands::Convert { input, output } => cmd_convert(&input, &output)?,
    }
    Ok(())
}

fn cmd_info(input: &PathBuf, show_curvature: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load_halfedge(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Faces: {}", mesh.num_faces());
    println!("Half-edges: {}", mesh.num_halfedges());

    let boundary = mesh
        .vertex_ids()
        .filter(|&v| mesh.is_boundary_vertex(v))
        .count();
    println!("Boundary vertices: {}", boundary);

    let bbox = mesh.bounding_box();
    println!(
        "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
        bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y, bbox.max.z
    );
    println!("Scene center: {:.3?}, radius: {:.3}", bbox.center(), bbox.radius());

    if show_curvature {
        print_stats("Mean curvature", &algo::mean_curvature(&mesh));
        print_stats("Surface variation", &algo::surface_variation(&mesh));
    }

    Ok(())
}

fn print_stats(label: &str, values: &[f64]) {
    let min = values.iter().copied().fold(f64::MAX, f64::min);
    let max = values.iter().copied().fold(f64::MIN, f64::max);
    let mean = values.iter().sum::<f64>() / values.len().max(1) as f64;
    println!("{}: min {:.6}, max {:.6}, mean {:.6}", label, min, max, mean);
}

fn cmd_smooth(
    input: &PathBuf,
    output: &PathBuf,
    iterations: usize,
    factor: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load_halfedge(input)?;

    let options = SmoothOptions::default()
        .with_iterations(iterations)
        .with_factor(factor);
    algo::laplacian_smooth(&mut mesh, &options);

    save_halfedge(&mesh, output)?;
    println!("Smoothed {} -> {}", input.display(), output.display());
    Ok(())
}

fn cmd_curvature(
    input: &PathBuf,
    output: &PathBuf,
    measure: Measure,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load_halfedge(input)?;

    let measure = match measure {
        Measure::Mean => CurvatureMeasure::Mean,
        Measure::Variation => CurvatureMeasure::Variation,
    };
    algo::colorize(&mut mesh, measure);

    save_halfedge(&mesh, output)?;
    println!("Colored {} -> {}", input.display(), output.display());
    Ok(())
}

fn cmd_convert(input: &PathBuf, output: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;
    io::save(output, &mesh)?;
    println!(
        "Converted {} -> {} ({} triangles)",
        input.display(),
        output.display(),
        mesh.num_triangles()
    );
    Ok(())
}

/// Write a half-edge mesh through the soup serializers, carrying positions,
/// connectivity, normals, and vertex colors.
fn save_halfedge(mesh: &HalfEdgeMesh, output: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let (positions, faces) = to_face_vertex(mesh);

    let mut soup = SoupMesh {
        positions,
        indices: faces.iter().flatten().map(|&i| i as u32).collect(),
        ..SoupMesh::default()
    };
    if let Some(normals) = mesh.vertex_normals() {
        soup.normals = normals.to_vec();
    }
    if let Some(colors) = mesh.vertex_colors() {
        soup.colors = colors.to_vec();
    }

    io::save(output, &soup)?;
    Ok(())
}

use clap::{Parser, Subcommand, ValueEnum};
use geo_noding::wasm::{extract_lines, simplify_geometry};
use geo_noding::{node_lines, SimplifyMethod};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use std::convert::TryInto;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split all linework so lines only meet at endpoints
    Node {
        /// Input GeoJSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output GeoJSON file (LineStrings)
        #[arg(short, long)]
        output: PathBuf,

        /// Snap-round onto a lattice with spacing 1/scale
        #[arg(long)]
        scale: Option<f64>,
    },
    /// Simplify lines and polygons
    Simplify {
        /// Input GeoJSON file
        #[arg(short, long)]
        input: PathBuf,

        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Distance tolerance
        #[arg(short, long)]
        tolerance: f64,

        #[arg(long, value_enum, default_value_t = Method::TopologyPreserving)]
        method: Method,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Method {
    DouglasPeucker,
    Visvalingam,
    TopologyPreserving,
}

impl From<Method> for SimplifyMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::DouglasPeucker => SimplifyMethod::DouglasPeucker,
            Method::Visvalingam => SimplifyMethod::VisvalingamWhyatt,
            Method::TopologyPreserving => SimplifyMethod::TopologyPreserving,
        }
    }
}

fn read_geometries(
    path: &Path,
) -> Result<Vec<geo_types::Geometry<f64>>, Box<dyn std::error::Error>> {
    println!("Reading input from {:?}", path);
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let geojson: GeoJson = serde_json::from_reader(reader)?;

    let mut geometries: Vec<geo_types::Geometry<f64>> = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in fc.features {
                if let Some(geom) = feature.geometry {
                    geometries.push(geom.try_into()?);
                }
            }
        }
        GeoJson::Feature(feature) => {
            if let Some(geom) = feature.geometry {
                geometries.push(geom.try_into()?);
            }
        }
        GeoJson::Geometry(geom) => geometries.push(geom.try_into()?),
    }
    println!("Loaded {} features.", geometries.len());
    Ok(geometries)
}

fn write_geometries(
    path: &Path,
    geometries: Vec<geo_types::Geometry<f64>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let features: Vec<Feature> = geometries
        .iter()
        .map(|geom| Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::from(geom))),
            id: None,
            properties: None,
            foreign_members: None,
        })
        .collect();

    let output_fc = FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    };

    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &GeoJson::FeatureCollection(output_fc))?;
    println!("Wrote output to {:?}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Command::Node { input, output, scale } => {
            let geometries = read_geometries(&input)?;
            let mut lines = Vec::new();
            for geom in &geometries {
                extract_lines(geom, &mut lines);
            }
            if let Some(scale) = scale {
                println!("Snap rounding with scale {}.", scale);
            }
            let noded = node_lines(&lines, scale)?;
            println!("Noded {} lines into {} lines.", lines.len(), noded.len());
            let geometries = noded.into_iter().map(geo_types::Geometry::LineString).collect();
            write_geometries(&output, geometries)?;
        }
        Command::Simplify {
            input,
            output,
            tolerance,
            method,
        } => {
            let geometries = read_geometries(&input)?;
            let simplified = geometries
                .into_iter()
                .map(|geom| simplify_geometry(geom, tolerance, method.into()))
                .collect::<geo_noding::Result<Vec<_>>>()?;
            println!("Simplified {} geometries with {:?}.", simplified.len(), method);
            write_geometries(&output, simplified)?;
        }
    }

    Ok(())
}

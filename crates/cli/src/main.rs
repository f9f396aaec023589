mod provenance;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use cwc::{ContactFeed, ContactSet, EquilibriumMethod, StaticEquilibriumPolygon};
use nalgebra::Vector3;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

use crate::provenance::Payload;

#[derive(Parser)]
#[command(name = "cwc-cli")]
#[command(about = "Contact wrench cones, equilibrium polygons and wrench distribution")]
struct Cmd {
    /// Optional run tag; propagated to outputs and logs
    #[arg(long)]
    tag: Option<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    Hull,
    Bretl,
}

impl From<Method> for EquilibriumMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::Hull => EquilibriumMethod::Hull,
            Method::Bretl => EquilibriumMethod::Bretl,
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Static-equilibrium polygon of the center of mass
    Sep {
        /// JSON contact records
        #[arg(long)]
        contacts: PathBuf,
        #[arg(long, value_enum, default_value_t = Method::Hull)]
        method: Method,
        /// Write the polygon here (plus a provenance sidecar) instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Face matrix of the contact wrench cone at a reference point
    Cwc {
        #[arg(long)]
        contacts: PathBuf,
        #[arg(long, value_parser = parse_point, default_value = "0,0,0")]
        point: Vector3<f64>,
    },
    /// Contact wrenches holding a mass still with its CoM at `com`
    Support {
        #[arg(long)]
        contacts: PathBuf,
        #[arg(long, value_parser = parse_point)]
        com: Vector3<f64>,
        #[arg(long)]
        mass: f64,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Sep {
            contacts,
            method,
            out,
        } => sep(&contacts, method, out.as_deref(), cmd.tag),
        Action::Cwc { contacts, point } => cwc(&contacts, &point),
        Action::Support {
            contacts,
            com,
            mass,
        } => support(&contacts, &com, mass),
        Action::Report => report(cmd.tag),
    }
}

/// `x,y,z` with optional spaces.
fn parse_point(s: &str) -> Result<Vector3<f64>, String> {
    let coords = s
        .split(',')
        .map(|t| t.trim().parse::<f64>().map_err(|e| format!("{t:?}: {e}")))
        .collect::<Result<Vec<f64>, String>>()?;
    match coords.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got {} values", coords.len())),
    }
}

fn load_contacts(path: &Path) -> Result<ContactSet> {
    let feed = ContactFeed::load(path, false)
        .with_context(|| format!("loading contacts from {}", path.display()))?;
    Ok(feed.to_contact_set())
}

#[derive(Serialize)]
struct SepOutput {
    method: String,
    area: f64,
    vertices: Vec<[f64; 2]>,
}

fn sep(contacts: &Path, method: Method, out: Option<&Path>, tag: Option<String>) -> Result<()> {
    tracing::info!(contacts = %contacts.display(), ?method, tag = ?tag, "sep");
    let set = load_contacts(contacts)?;
    let polygon = StaticEquilibriumPolygon::compute(&set, method.into())
        .context("computing the static-equilibrium polygon")?;
    let output = SepOutput {
        method: format!("{method:?}").to_lowercase(),
        area: polygon.area(),
        vertices: polygon.vertices().iter().map(|v| [v.x, v.y]).collect(),
    };
    let text = serde_json::to_string_pretty(&output)?;
    let Some(out) = out else {
        println!("{text}");
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out, text).with_context(|| format!("writing {}", out.display()))?;
    let payload = Payload::new(json!({
        "contacts": contacts.to_string_lossy(),
        "nb_contacts": set.nb_contacts(),
        "method": output.method,
    }))
    .with_tag(tag);
    let sidecar = provenance::write_sidecar(out, &payload)?;
    tracing::info!(out = %out.display(), sidecar = %sidecar.display(), "sep written");
    Ok(())
}

fn cwc(contacts: &Path, point: &Vector3<f64>) -> Result<()> {
    let set = load_contacts(contacts)?;
    let faces = set.compute_wrench_inequalities(point);
    tracing::info!(rows = faces.nrows(), "contact wrench cone");
    let rows: Vec<Vec<f64>> = faces
        .row_iter()
        .map(|r| r.iter().copied().collect())
        .collect();
    let doc = json!({
        "point": [point.x, point.y, point.z],
        "nb_rows": faces.nrows(),
        "rows": rows,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn support(contacts: &Path, com: &Vector3<f64>, mass: f64) -> Result<()> {
    let set = load_contacts(contacts)?;
    let wrenches = set
        .find_static_supporting_wrenches(com, mass)
        .context("distributing the weight over the contacts")?;
    let doc: Vec<_> = wrenches
        .iter()
        .map(|sw| {
            json!({
                "contact": sw.contact,
                "force": [sw.wrench[0], sw.wrench[1], sw.wrench[2]],
                "moment": [sw.wrench[3], sw.wrench[4], sw.wrench[5]],
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn report(tag: Option<String>) -> Result<()> {
    let payload = Payload::new(json!({})).with_tag(tag);
    let block = provenance::Provenance::new(&payload, Vec::new());
    println!("{}", serde_json::to_string_pretty(&block)?);
    Ok(())
}

//! Configuration orchestrator.
//!
//! This module coordinates the overall generation process: derive the
//! topology, allocate addresses, synthesize and verify routes, draw the
//! traffic matrix, and write the output directory.

use crate::config::Config;
use crate::ip::{AddressPlan, AddressRegistry};
use crate::output::{
    build_manifest, render_routes, route_documents, LinkParameters, ManifestGeneral,
    NetworkManifest,
};
use crate::routing::{synthesize_routes, verify_host_reachability, RouteTable};
use crate::topology::{TopologyCounts, TopologyError};
use crate::traffic::{generate_matrix, TrafficMatrix};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use log::info;
use std::path::{Path, PathBuf};

/// Manifest file name inside the output directory
pub const NETWORK_FILE: &str = "network.yaml";
/// Text route table file name
pub const ROUTES_TEXT_FILE: &str = "routes.txt";
/// JSON route table file name
pub const ROUTES_JSON_FILE: &str = "routes.json";
/// Traffic matrix file name
pub const TRAFFIC_FILE: &str = "traffic.json";

/// Everything generated for one configuration
#[derive(Debug)]
pub struct GeneratedNetwork {
    pub plan: AddressPlan,
    pub registry: AddressRegistry,
    pub routes: RouteTable,
    pub traffic: TrafficMatrix,
    pub manifest: NetworkManifest,
}

impl GeneratedNetwork {
    pub fn counts(&self) -> &TopologyCounts {
        self.plan.counts()
    }

    /// Route table in its `routes.txt` form
    pub fn routes_text(&self) -> Result<String, TopologyError> {
        render_routes(self.counts(), &self.routes)
    }
}

/// Paths of the files written by [`write_outputs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFiles {
    pub network: PathBuf,
    pub routes_text: PathBuf,
    pub routes_json: PathBuf,
    pub traffic: PathBuf,
}

/// Hosts every other host is traced against: the first and the last.
fn reachability_probes(counts: &TopologyCounts) -> Vec<usize> {
    let mut probes = vec![0, counts.hosts - 1];
    probes.dedup();
    probes
}

/// Build the complete network description for a validated configuration.
pub fn generate(config: &Config) -> Result<GeneratedNetwork> {
    config.validate()?;

    let counts = TopologyCounts::derive(config.topology.arity)?;
    info!(
        "Fat-tree k={}: {} core, {} aggregation, {} edge switches, {} hosts",
        counts.arity, counts.core_switches, counts.aggr_switches, counts.edge_switches, counts.hosts
    );

    let plan = AddressPlan::new(counts, config.topology.loopback)?;
    let registry =
        AddressRegistry::from_plan(&plan).wrap_err("Address plan assigns an address twice")?;
    info!("Allocated {} addresses", registry.len());

    let routes = synthesize_routes(&plan)?;
    let traced = verify_host_reachability(&plan, &routes, &registry, &reachability_probes(&counts))
        .wrap_err("Synthesized routes do not connect every host")?;
    info!("Verified {} host-to-host paths", traced);

    let traffic = generate_matrix(&plan, &config.traffic, config.general.seed)?;

    let manifest = build_manifest(
        &plan,
        ManifestGeneral {
            stop_time: config.general.stop_time,
            seed: config.general.seed,
        },
        LinkParameters {
            data_rate: config.topology.link.data_rate.clone(),
            data_rate_bps: config.link_data_rate()?,
            delay: config.topology.link.delay,
        },
    )?;

    Ok(GeneratedNetwork {
        plan,
        registry,
        routes,
        traffic,
        manifest,
    })
}

/// Write the manifest, route tables and traffic matrix into `output_dir`.
pub fn write_outputs(network: &GeneratedNetwork, output_dir: &Path) -> Result<OutputFiles> {
    std::fs::create_dir_all(output_dir)
        .wrap_err_with(|| format!("Failed to create output directory '{}'", output_dir.display()))?;

    let files = OutputFiles {
        network: output_dir.join(NETWORK_FILE),
        routes_text: output_dir.join(ROUTES_TEXT_FILE),
        routes_json: output_dir.join(ROUTES_JSON_FILE),
        traffic: output_dir.join(TRAFFIC_FILE),
    };

    let network_yaml = serde_yaml::to_string(&network.manifest)?;
    std::fs::write(&files.network, network_yaml)
        .wrap_err_with(|| format!("Failed to write '{}'", files.network.display()))?;

    std::fs::write(&files.routes_text, network.routes_text()?)
        .wrap_err_with(|| format!("Failed to write '{}'", files.routes_text.display()))?;

    let documents = route_documents(network.counts(), &network.routes)?;
    let routes_json = serde_json::to_string_pretty(&documents)?;
    std::fs::write(&files.routes_json, routes_json)
        .wrap_err_with(|| format!("Failed to write '{}'", files.routes_json.display()))?;

    let traffic_json = serde_json::to_string_pretty(&network.traffic)?;
    std::fs::write(&files.traffic, traffic_json)
        .wrap_err_with(|| format!("Failed to write '{}'", files.traffic.display()))?;

    info!(
        "Wrote {} nodes, {} routes and {} flows to {:?}",
        network.manifest.nodes.len(),
        network.routes.len(),
        network.traffic.len(),
        output_dir
    );
    Ok(files)
}

/// Generate the network for `config` and write it into `output_dir`.
pub fn generate_network_config(config: &Config, output_dir: &Path) -> Result<GeneratedNetwork> {
    let network = generate(config)?;
    write_outputs(&network, output_dir)?;
    Ok(network)
}

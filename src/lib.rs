//! # FatTree - Configuration generator for k-ary fat-tree network simulations
//!
//! This library computes everything a network simulator needs to stand up a
//! k-ary fat-tree data-center fabric: the switch and host inventory, the
//! address of every link endpoint and loopback, a static forwarding table
//! for every node, and benchmark traffic matrices.
//!
//! ## Overview
//!
//! A k-ary fat-tree has `k` pods. Each pod holds `k/2` aggregation and `k/2`
//! edge switches, every edge switch serves `k/2` hosts, and `(k/2)²` core
//! switches join the pods. The structure is regular enough that every
//! address and every shortest-path route has a closed form, so generation is
//! pure arithmetic with no shared tables.
//!
//! ## Architecture
//!
//! - `topology`: counts, index arithmetic and enumeration of nodes and links
//! - `ip`: deterministic link and loopback addressing, address registry
//! - `routing`: static route synthesis, longest-prefix lookup, path tracing
//! - `traffic`: traffic matrix policies and flow scheduling
//! - `config`: type-safe configuration structures and validation
//! - `config_loader`: configuration file loading and CLI overrides
//! - `output`: network manifest and route table rendering
//! - `orchestrator`: end-to-end generation into an output directory
//! - `utils`: data rate parsing and validation helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fattree::{config_loader, orchestrator};
//! use std::path::Path;
//!
//! let config = config_loader::load_config(Path::new("fattree.yaml"))?;
//! let network = orchestrator::generate_network_config(&config, Path::new("fattree_output"))?;
//!
//! // fattree_output now contains:
//! // - network.yaml: nodes, interfaces and links
//! // - routes.txt / routes.json: static route tables
//! // - traffic.json: the generated flows
//! println!("{} routes", network.routes.len());
//! # Ok::<(), color_eyre::eyre::Report>(())
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! general:
//!   log_level: info
//!   seed: 42
//!   stop_time: "60s"
//!
//! topology:
//!   arity: 4
//!   link:
//!     data_rate: "10Mbps"
//!     delay: "100us"
//!
//! traffic:
//!   policy: random_fanout   # random_fanout/half_duplex/stride/single_pair
//!   flows_per_host: 2
//! ```
//!
//! ## Error Handling
//!
//! Each module reports typed errors (`thiserror`); the orchestrator and the
//! binary wrap them with `color_eyre` for context.

pub mod config;
pub mod config_loader;
pub mod ip;
pub mod orchestrator;
pub mod output;
pub mod routing;
pub mod topology;
pub mod traffic;
pub mod utils;

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ip::LoopbackPrefixes;
use crate::topology::TopologyCounts;
use crate::traffic::{FlowParams, TrafficPolicy};
use crate::utils::{parse_data_rate, validate_log_level, validate_loopback_prefixes};

/// Complete generator configuration. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub general: GeneralConfig,
    pub topology: TopologyConfig,
    pub traffic: TrafficConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(level) = &self.general.log_level {
            validate_log_level(level).map_err(ValidationError::InvalidGeneral)?;
        }
        if self.general.stop_time.is_zero() {
            return Err(ValidationError::InvalidGeneral(
                "stop_time must be greater than zero".to_string(),
            ));
        }

        let counts = TopologyCounts::derive(self.topology.arity)
            .map_err(|e| ValidationError::InvalidTopology(e.to_string()))?;
        parse_data_rate(&self.topology.link.data_rate).map_err(ValidationError::InvalidTopology)?;
        validate_loopback_prefixes(&counts, &self.topology.loopback)
            .map_err(ValidationError::InvalidTopology)?;

        self.validate_traffic(&counts)
    }

    fn validate_traffic(&self, counts: &TopologyCounts) -> Result<(), ValidationError> {
        let traffic = &self.traffic;
        match traffic.policy {
            TrafficPolicy::RandomFanout => {
                if traffic.flows_per_host > counts.hosts {
                    return Err(ValidationError::InvalidTraffic(format!(
                        "flows_per_host {} exceeds the host count {}",
                        traffic.flows_per_host, counts.hosts
                    )));
                }
            }
            TrafficPolicy::HalfDuplex => {
                if counts.hosts % 2 != 0 {
                    return Err(ValidationError::InvalidTraffic(format!(
                        "half_duplex needs an even host count, arity {} gives {}",
                        counts.arity, counts.hosts
                    )));
                }
            }
            TrafficPolicy::Stride => {
                if traffic.stride % counts.hosts == 0 {
                    return Err(ValidationError::InvalidTraffic(format!(
                        "stride {} maps every host onto itself ({} hosts)",
                        traffic.stride, counts.hosts
                    )));
                }
            }
            TrafficPolicy::SinglePair => {
                let endpoints = [("source", traffic.source), ("destination", traffic.destination)];
                for (field, host) in endpoints {
                    if host >= counts.hosts {
                        return Err(ValidationError::InvalidTraffic(format!(
                            "{} host {} does not exist ({} hosts)",
                            field, host, counts.hosts
                        )));
                    }
                }
            }
        }

        if traffic.flow.length == 0 {
            return Err(ValidationError::InvalidTraffic(
                "flow.length must be greater than zero".to_string(),
            ));
        }
        if traffic.start_time >= self.general.stop_time {
            return Err(ValidationError::InvalidTraffic(format!(
                "start_time {:?} is not before stop_time {:?}",
                traffic.start_time, self.general.stop_time
            )));
        }
        Ok(())
    }

    /// Data rate of every link in bits per second
    pub fn link_data_rate(&self) -> Result<u64, ValidationError> {
        parse_data_rate(&self.topology.link.data_rate).map_err(ValidationError::InvalidTopology)
    }
}

/// Shared general configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Seed for the random traffic policies
    pub seed: u64,
    /// Simulated time at which the driver stops the run
    #[serde(with = "humantime_serde")]
    pub stop_time: Duration,
}

/// Fabric shape and link parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopologyConfig {
    /// Switch port count K
    pub arity: usize,
    pub link: LinkConfig,
    pub loopback: LoopbackPrefixes,
}

/// Point-to-point link parameters, identical for every link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    pub data_rate: String,
    #[serde(with = "humantime_serde")]
    pub delay: Duration,
}

/// Traffic matrix selection and flow knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrafficConfig {
    pub policy: TrafficPolicy,
    /// Flows sent (and received) by every host under `random_fanout`
    pub flows_per_host: usize,
    /// Host offset under `stride`
    pub stride: usize,
    /// Sender under `single_pair`
    pub source: usize,
    /// Receiver under `single_pair`
    pub destination: usize,
    #[serde(with = "humantime_serde")]
    pub start_time: Duration,
    pub flow: FlowParams,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid topology configuration: {0}")]
    InvalidTopology(String),
    #[error("Invalid traffic configuration: {0}")]
    InvalidTraffic(String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            seed: 42,
            stop_time: Duration::from_secs(60),
        }
    }
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            arity: 4,
            link: LinkConfig::default(),
            loopback: LoopbackPrefixes::default(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            data_rate: "10Mbps".to_string(),
            delay: Duration::from_micros(100),
        }
    }
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            policy: TrafficPolicy::RandomFanout,
            flows_per_host: 1,
            stride: 1,
            source: 0,
            destination: 1,
            start_time: Duration::from_secs(30),
            flow: FlowParams::default(),
        }
    }
}

//! Traffic matrix generators.
//!
//! Generators work on host ids only. [`schedule_flows`] turns the resulting
//! pairs into [`FlowSpec`]s by resolving host addresses and start times.

use log::{debug, info};
use std::time::Duration;

use super::pool::NodePool;
use super::types::{FlowPair, FlowParams, FlowSpec, TrafficError, TrafficMatrix, TrafficPolicy};
use crate::config::TrafficConfig;
use crate::ip::AddressPlan;

/// How long a receiver runs before its sender starts
pub const RECEIVER_LEAD: Duration = Duration::from_secs(3);

/// Every host sends `flows_per_host` flows. Destinations are drawn from a
/// pool in which every host appears `flows_per_host` times, so no host
/// receives more flows than it sends. A host may draw itself.
///
/// `flows_per_host` may not exceed `hosts`.
pub fn generate_random_fanout(
    hosts: usize,
    flows_per_host: usize,
    seed: u64,
) -> Result<Vec<FlowPair>, TrafficError> {
    if flows_per_host > hosts {
        return Err(TrafficError::TooManyFlows { flows_per_host, hosts });
    }

    let mut pool = NodePool::new(hosts, flows_per_host, seed);
    let mut pairs = Vec::with_capacity(hosts * flows_per_host);

    for source in 0..hosts {
        for _ in 0..flows_per_host {
            let destination = pool
                .pop()
                .ok_or(TrafficError::PoolExhausted { drawn: pairs.len() })?;
            pairs.push(FlowPair::new(source, destination));
        }
    }
    Ok(pairs)
}

/// Pair every host with exactly one other host at random. The first host
/// drawn of each pair sends, the second receives.
pub fn generate_half_duplex_pairs(hosts: usize, seed: u64) -> Result<Vec<FlowPair>, TrafficError> {
    if hosts % 2 != 0 {
        return Err(TrafficError::OddHostCount { hosts });
    }

    let mut pool = NodePool::new(hosts, 1, seed);
    let mut pairs = Vec::with_capacity(hosts / 2);
    for _ in 0..hosts / 2 {
        let drawn = 2 * pairs.len();
        let source = pool.pop().ok_or(TrafficError::PoolExhausted { drawn })?;
        let destination = pool
            .pop()
            .ok_or(TrafficError::PoolExhausted { drawn: drawn + 1 })?;
        pairs.push(FlowPair::new(source, destination));
    }
    Ok(pairs)
}

/// Host `i` sends to host `(i + stride) % hosts`.
pub fn generate_stride(hosts: usize, stride: usize) -> Result<Vec<FlowPair>, TrafficError> {
    if hosts == 0 {
        return Ok(Vec::new());
    }
    if stride % hosts == 0 {
        return Err(TrafficError::InvalidStride { stride, hosts });
    }
    Ok((0..hosts)
        .map(|source| FlowPair::new(source, (source + stride) % hosts))
        .collect())
}

/// A single flow between two fixed hosts.
pub fn generate_single_pair(
    hosts: usize,
    source: usize,
    destination: usize,
) -> Result<Vec<FlowPair>, TrafficError> {
    for host in [source, destination] {
        if host >= hosts {
            return Err(TrafficError::UnknownHost { host, hosts });
        }
    }
    Ok(vec![FlowPair::new(source, destination)])
}

/// Resolve addresses and start times for generated pairs.
///
/// Half-duplex receivers start at `start_time` and their senders
/// [`RECEIVER_LEAD`] later. A single pair sends at `start_time` with its
/// receiver started [`RECEIVER_LEAD`] earlier.
pub fn schedule_flows(
    plan: &AddressPlan,
    policy: TrafficPolicy,
    pairs: &[FlowPair],
    start_time: Duration,
    params: &FlowParams,
) -> Result<Vec<FlowSpec>, TrafficError> {
    let hosts = plan.counts().hosts;

    pairs
        .iter()
        .map(|pair| {
            for host in [pair.source, pair.destination] {
                if host >= hosts {
                    return Err(TrafficError::UnknownHost { host, hosts });
                }
            }
            let (sender_start, receiver_start) = match policy {
                TrafficPolicy::HalfDuplex => (start_time + RECEIVER_LEAD, Some(start_time)),
                TrafficPolicy::SinglePair => {
                    (start_time, Some(start_time.saturating_sub(RECEIVER_LEAD)))
                }
                TrafficPolicy::RandomFanout | TrafficPolicy::Stride => (start_time, None),
            };
            Ok(FlowSpec {
                source: pair.source,
                destination: pair.destination,
                source_address: plan.host_address(pair.source)?,
                destination_address: plan.host_address(pair.destination)?,
                start_time: sender_start,
                receiver_start_time: receiver_start,
                params: params.clone(),
            })
        })
        .collect()
}

/// Generate and schedule the matrix selected by the traffic configuration.
pub fn generate_matrix(
    plan: &AddressPlan,
    traffic: &TrafficConfig,
    seed: u64,
) -> Result<TrafficMatrix, TrafficError> {
    let hosts = plan.counts().hosts;
    let pairs = match traffic.policy {
        TrafficPolicy::RandomFanout => {
            generate_random_fanout(hosts, traffic.flows_per_host, seed)?
        }
        TrafficPolicy::HalfDuplex => generate_half_duplex_pairs(hosts, seed)?,
        TrafficPolicy::Stride => generate_stride(hosts, traffic.stride)?,
        TrafficPolicy::SinglePair => {
            generate_single_pair(hosts, traffic.source, traffic.destination)?
        }
    };

    for pair in &pairs {
        debug!("flow host {} -> host {}", pair.source, pair.destination);
    }

    let flows = schedule_flows(plan, traffic.policy, &pairs, traffic.start_time, &traffic.flow)?;
    info!("Generated {} flows ({:?}, seed {})", flows.len(), traffic.policy, seed);

    Ok(TrafficMatrix {
        policy: traffic.policy,
        seed,
        flows,
    })
}

#[cfg(test)]
mod fat_tree_tests {
    use std::collections::HashSet;
    use std::io::Write;
    use std::net::Ipv4Addr;
    use tempfile::{NamedTempFile, TempDir};

    use fattree::config::Config;
    use fattree::config_loader::load_config;
    use fattree::ip::{AddressPlan, AddressRegistry, LoopbackPrefixes};
    use fattree::orchestrator::{generate, generate_network_config};
    use fattree::routing::{synthesize_routes, trace_route};
    use fattree::topology::{LinkLayer, LinkSide, NodeId, TopologyCounts, MAX_ARITY};
    use fattree::traffic::{generate_half_duplex_pairs, generate_random_fanout, TrafficPolicy};

    fn plan(k: usize) -> AddressPlan {
        AddressPlan::new(TopologyCounts::derive(k).unwrap(), LoopbackPrefixes::default()).unwrap()
    }

    /// The k=4 fabric every example in the documentation refers to
    #[test]
    fn test_k4_worked_example() {
        let c = TopologyCounts::derive(4).unwrap();
        assert_eq!((c.pods, c.aggr_per_pod, c.edge_per_pod, c.hosts_per_edge), (4, 2, 2, 2));
        assert_eq!((c.core_switches, c.aggr_switches, c.edge_switches, c.hosts), (4, 8, 8, 16));

        let p = plan(4);
        let core_a = p.link_address(LinkLayer::CoreAggr, 0, LinkSide::A).unwrap();
        let core_b = p.link_address(LinkLayer::CoreAggr, 0, LinkSide::B).unwrap();
        assert_eq!(core_a.interface().to_string(), "1.1.1.1/24");
        assert_eq!(core_b.interface().to_string(), "1.1.1.2/24");

        let edge_a = p.edge_link_address(0, 0, 0, LinkSide::A).unwrap();
        let edge_b = p.edge_link_address(0, 0, 0, LinkSide::B).unwrap();
        assert_eq!(edge_a.interface().to_string(), "201.1.1.1/24");
        assert_eq!(edge_b.interface().to_string(), "201.1.1.2/24");
        assert_eq!(p.host_address(0).unwrap(), Ipv4Addr::new(201, 1, 1, 2));
    }

    /// No address is handed out twice, for every supported arity
    #[test]
    fn test_addresses_unique_across_arities() {
        for k in (2..=MAX_ARITY).step_by(2) {
            let p = plan(k);
            let mut seen = HashSet::new();
            for assignment in p.interface_assignments().unwrap() {
                let address = assignment.address.address;
                assert!(seen.insert(address), "k={} duplicate {}", k, address);
            }
            for loopback in p.loopback_assignments().unwrap() {
                let address = loopback.address.addr();
                assert!(seen.insert(address), "k={} duplicate {}", k, address);
            }
            assert!(AddressRegistry::from_plan(&p).is_ok(), "k={}", k);
        }
        assert!(TopologyCounts::derive(MAX_ARITY + 2).is_err());
    }

    /// The largest fabric the configuration accepts also generates
    #[test]
    fn test_largest_arity_generates() {
        let mut config = Config::default();
        config.topology.arity = MAX_ARITY;
        assert!(config.validate().is_ok());
        let network = generate(&config).unwrap();
        assert_eq!(network.counts().hosts, MAX_ARITY * MAX_ARITY * MAX_ARITY / 4);
    }

    /// Every host reaches every other host by following the tables
    #[test]
    fn test_k8_route_consistency_walk() {
        let p = plan(8);
        let table = synthesize_routes(&p).unwrap();
        let registry = AddressRegistry::from_plan(&p).unwrap();
        let hosts = p.counts().hosts;

        for src in (0..hosts).step_by(7) {
            for dst in 0..hosts {
                let target = p.host_address(dst).unwrap();
                let path = trace_route(&table, &registry, NodeId::Host(src), target).unwrap();
                assert_eq!(path.first(), Some(&NodeId::Host(src)));
                assert_eq!(path.last(), Some(&NodeId::Host(dst)));
            }
        }
    }

    #[test]
    fn test_route_policy_invariants() {
        let p = plan(6);
        let c = *p.counts();
        let table = synthesize_routes(&p).unwrap();

        for host in c.host_nodes() {
            let routes = table.routes(host);
            assert_eq!(routes.len(), 1);
            assert!(routes[0].is_default());
        }
        for aggr in c.aggr_nodes() {
            let routes = table.routes(aggr);
            let host_routes = routes.iter().filter(|r| r.destination.prefix_len() == 32).count();
            assert_eq!(host_routes, c.core_switches);
            assert_eq!(routes.iter().filter(|r| r.is_default()).count(), 1);
        }
        for core in c.core_nodes() {
            assert_eq!(table.routes(core).len(), c.pods);
        }
    }

    #[test]
    fn test_traffic_properties() {
        let flows = generate_random_fanout(16, 2, 2024).unwrap();
        assert_eq!(flows.len(), 32);
        let mut fan_in = vec![0; 16];
        for flow in &flows {
            fan_in[flow.destination] += 1;
        }
        assert!(fan_in.iter().all(|&n| n <= 2));

        let pairs = generate_half_duplex_pairs(16, 2024).unwrap();
        assert_eq!(pairs.len(), 8);
        let covered: HashSet<usize> =
            pairs.iter().flat_map(|p| [p.source, p.destination]).collect();
        assert_eq!(covered.len(), 16);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut config = Config::default();
        config.topology.arity = 6;
        config.traffic.flows_per_host = 3;

        let first = generate(&config).unwrap();
        let second = generate(&config).unwrap();
        assert_eq!(first.routes, second.routes);
        assert_eq!(first.traffic, second.traffic);
        assert_eq!(first.routes_text().unwrap(), second.routes_text().unwrap());
    }

    #[test]
    fn test_config_file_to_output_directory() {
        let yaml = r#"
general:
  seed: 3
topology:
  arity: 4
  link:
    data_rate: "100Mbps"
    delay: "1ms"
traffic:
  policy: single_pair
  source: 0
  destination: 15
"#;
        let mut config_file = NamedTempFile::new().unwrap();
        write!(config_file, "{}", yaml).unwrap();
        let config = load_config(config_file.path()).unwrap();
        assert_eq!(config.traffic.policy, TrafficPolicy::SinglePair);

        let out = TempDir::new().unwrap();
        let network = generate_network_config(&config, out.path()).unwrap();
        assert_eq!(network.traffic.len(), 1);
        assert_eq!(network.traffic.flows[0].destination_address, Ipv4Addr::new(204, 2, 2, 2));

        let manifest = std::fs::read_to_string(out.path().join("network.yaml")).unwrap();
        assert!(manifest.contains("data_rate_bps: 100000000"));
        assert!(manifest.contains("delay: 1ms"));

        let routes = std::fs::read_to_string(out.path().join("routes.txt")).unwrap();
        assert!(routes.contains("# aggr-0-0\n250.255.255.1/32 via 1.1.1.1\n"));

        let routes_json = std::fs::read_to_string(out.path().join("routes.json")).unwrap();
        let routes_json: serde_json::Value = serde_json::from_str(&routes_json).unwrap();
        assert_eq!(routes_json.as_array().unwrap().len(), network.counts().total_nodes());
    }
}

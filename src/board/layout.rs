use super::*;
use petgraph::graphmap::UnGraphMap;

/// Static description of one zone on a board layout.
#[derive(Debug, Clone, Copy)]
pub struct ZoneSpec {
    pub name: &'static str,
    pub capacity: usize,
    pub volatile: &'static [usize],
    pub adjacent: &'static [usize],
}

/// The standard six-zone board: a central Capitol ringed by five districts.
pub const STANDARD: [ZoneSpec; 6] = [
    ZoneSpec {
        name: "Capitol",
        capacity: 11,
        volatile: &[10],
        adjacent: &[1, 2, 3, 4, 5],
    },
    ZoneSpec {
        name: "Harbor",
        capacity: 7,
        volatile: &[6],
        adjacent: &[0, 2, 5],
    },
    ZoneSpec {
        name: "Market",
        capacity: 5,
        volatile: &[],
        adjacent: &[0, 1, 3],
    },
    ZoneSpec {
        name: "Campus",
        capacity: 7,
        volatile: &[0],
        adjacent: &[0, 2, 4],
    },
    ZoneSpec {
        name: "Suburbs",
        capacity: 9,
        volatile: &[],
        adjacent: &[0, 3, 5],
    },
    ZoneSpec {
        name: "Outskirts",
        capacity: 5,
        volatile: &[4],
        adjacent: &[0, 4, 1],
    },
];

/// Builds zones from a layout, rejecting asymmetric adjacency.
pub fn build(layout: &[ZoneSpec]) -> anyhow::Result<Vec<Zone>> {
    let graph = adjacency(layout);
    for (i, spec) in layout.iter().enumerate() {
        for j in spec.adjacent {
            if *j >= layout.len() || *j == i {
                anyhow::bail!("zone {} has invalid neighbour {}", spec.name, j);
            }
            if !layout[*j].adjacent.contains(&i) {
                anyhow::bail!("adjacency {} -> {} is one-way", i, j);
            }
        }
    }
    if petgraph::algo::connected_components(&graph) > 1 {
        anyhow::bail!("layout is not connected");
    }
    log::trace!("[layout] {} zones, {} borders", graph.node_count(), graph.edge_count());
    layout
        .iter()
        .enumerate()
        .map(|(i, s)| Zone::new(i, s.name, s.capacity, s.volatile, s.adjacent))
        .collect()
}

/// Undirected border graph of a layout.
pub fn adjacency(layout: &[ZoneSpec]) -> UnGraphMap<ZoneId, ()> {
    let mut graph = UnGraphMap::new();
    for (i, spec) in layout.iter().enumerate() {
        graph.add_node(ZoneId(i));
        for j in spec.adjacent {
            graph.add_edge(ZoneId(i), ZoneId(*j), ());
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn standard_board_builds() {
        let zones = build(&STANDARD).unwrap();
        assert_eq!(zones.len(), 6);
        assert_eq!(zones[0].majority_required(), 6);
        assert!(zones[0].is_volatile(10));
    }
    #[test]
    fn standard_board_is_symmetric() {
        let graph = adjacency(&STANDARD);
        assert!(graph.contains_edge(ZoneId(1), ZoneId(5)));
        assert!(graph.contains_edge(ZoneId(5), ZoneId(1)));
        assert!(!graph.contains_edge(ZoneId(2), ZoneId(4)));
    }
    #[test]
    fn one_way_border_rejected() {
        let bad = [
            ZoneSpec {
                name: "a",
                capacity: 3,
                volatile: &[],
                adjacent: &[1],
            },
            ZoneSpec {
                name: "b",
                capacity: 3,
                volatile: &[],
                adjacent: &[],
            },
        ];
        assert!(build(&bad).is_err());
    }
}

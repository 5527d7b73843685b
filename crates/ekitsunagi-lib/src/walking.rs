use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::graph::{Graph, LineTag};

/// Merge walking transfers into a graph, returning the augmented copy.
///
/// Each pair (canonical names) becomes a bidirectional edge tagged
/// [`LineTag::Walking`]. Pairs naming a station that is not in the graph are
/// rejected rather than skipped, and repeated pairs (in either orientation)
/// never produce duplicate edges. The input graph is left untouched.
pub fn augment_walking(graph: &Graph, pairs: &[(String, String)]) -> Result<Graph> {
    let (mut stations, line_names) = graph.to_parts();
    let mut added = 0usize;

    for (from, to) in pairs {
        if from == to {
            return Err(Error::InvalidWalkingPair { name: from.clone() });
        }
        for name in [from, to] {
            if !stations.contains_key(name) {
                return Err(Error::UnknownWalkingEndpoint {
                    from: from.clone(),
                    to: to.clone(),
                    missing: name.clone(),
                });
            }
        }

        for (a, b) in [(from, to), (to, from)] {
            if let Some(station) = stations.get_mut(a) {
                if station.push_edge(b, LineTag::Walking) {
                    added += 1;
                } else {
                    debug!(from = %a, to = %b, "walking edge already present");
                }
            }
        }
    }

    info!(pairs = pairs.len(), edges = added, "merged walking transfers");
    Ok(Graph::from_parts(stations, line_names))
}

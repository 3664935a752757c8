//! Open-port classification.

use crate::models::{OpenPortEntry, OpenPortMap, PortMap, PortRecord};

/// Service name used when the engine could not identify one
pub const UNKNOWN_SERVICE: &str = "unknown";

/// Select the open ports of `ports` and project them to their service
/// identity. Only the exact `open` state counts.
pub fn classify(ports: &PortMap) -> OpenPortMap {
    ports
        .iter()
        .filter(|(_, record)| record.is_open())
        .map(|(port, record)| (*port, entry_for(record)))
        .collect()
}

fn entry_for(record: &PortRecord) -> OpenPortEntry {
    OpenPortEntry {
        service: record
            .service
            .clone()
            .unwrap_or_else(|| UNKNOWN_SERVICE.to_string()),
        product: record.product.clone().unwrap_or_default(),
        version: record.version.clone().unwrap_or_default(),
    }
}

//! Chain summaries.
//!
//! Renders the annotations of a resolved chain as the multi-section text
//! delivered in a notification:
//!
//! ```text
//! Step 1:
//! Notes: call the venue
//! Files: floorplan.pdf, budget.xlsx
//! Links:
//! https://example.com/venue
//!
//! Step 2:
//! ```
//!
//! Every node on the chain gets a header, numbered by its position. A node
//! without a record keeps its header and has no body lines.

use crate::annotation::AnnotationStore;
use crate::node::Node;
use waypost_store::KeyValueStore;

/// Text returned for an empty chain.
pub const NO_CONNECTED_NODES: &str = "No connected nodes found.";

/// Composes the summary of `chain` from the records in `annotations`.
///
/// Reads only; calling it twice on the same snapshot yields the same text.
#[must_use]
pub fn compose_summary<S>(chain: &[&Node], annotations: &S) -> String
where
    S: KeyValueStore + ?Sized,
{
    if chain.is_empty() {
        return NO_CONNECTED_NODES.to_string();
    }

    chain
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let mut lines = vec![format!("Step {}:", index + 1)];

            if let Some(record) = annotations.annotation(&node.id) {
                let notes = record.notes.trim();
                if !notes.is_empty() {
                    lines.push(format!("Notes: {notes}"));
                }
                if !record.files.is_empty() {
                    let names: Vec<&str> = record.files.iter().map(|f| f.name.as_str()).collect();
                    lines.push(format!("Files: {}", names.join(", ")));
                }
                if !record.links.is_empty() {
                    lines.push("Links:".to_string());
                    lines.extend(record.links.iter().cloned());
                }
            }

            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

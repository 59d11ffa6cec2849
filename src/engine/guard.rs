//! Structural move validation.
//!
//! Evaluated twice: once at drag time to render the allow/deny
//! affordance, and again inside the engine before any mutation. The UI
//! check is advisory and never the sole gate.

use super::intent::NodeRef;

/// Whether a proposed move is structurally legal.
///
/// Files, folders and selections may drop onto folders and virtual
/// folders. A folder dropped onto itself is rejected outright rather
/// than silently ignored.
pub fn can_move(source: &NodeRef, target: &NodeRef) -> bool {
    match (source, target) {
        (NodeRef::Folder(s), NodeRef::Folder(t)) if s == t => false,
        (
            NodeRef::File(_) | NodeRef::Folder(_) | NodeRef::Selection(_),
            NodeRef::Folder(_) | NodeRef::Virtual(_),
        ) => true,
        _ => false,
    }
}

// Graph description builder.
// Turns one step of a trace into Graphviz DOT text. Pure and deterministic:
// identical inputs produce byte-identical output.

use crate::session::DisplayMode;
use crate::trace::{NodeStatus, StepState, Tree};

/// Border color for nodes no robot has reached yet. Status is hidden for
/// those nodes until a robot actually arrives.
const NEUTRAL_COLOR: &str = "gray";

fn status_color(status: NodeStatus) -> &'static str {
    match status {
        NodeStatus::Inhabited => "blue",
        NodeStatus::Finished => "green",
        NodeStatus::Unfinished => "red",
    }
}

/// Build the DOT description for one step.
///
/// Nodes are emitted in id order, edges in trace order, and robot ids sorted
/// ascending, so the output is stable across calls. The caller hands in
/// arrays from a validated trace; lengths are trusted here.
pub fn build(tree: &Tree, step: &StepState, mode: DisplayMode) -> String {
    let mut out = String::new();
    out.push_str("graph exploration {\n");
    out.push_str("  node [shape=circle fontname=\"Helvetica\"];\n");

    for v in 0..tree.n {
        let label = node_label(v, step, mode);
        let (color, style) = if step.traversed[v] {
            (status_color(step.status[v]), "solid")
        } else {
            (NEUTRAL_COLOR, "dashed")
        };
        out.push_str(&format!(
            "  {v} [label=\"{label}\" color={color} style={style}];\n"
        ));
    }

    for &(a, b) in &tree.edges {
        out.push_str(&format!("  {a} -- {b};\n"));
    }

    out.push_str("}\n");
    out
}

fn node_label(v: usize, step: &StepState, mode: DisplayMode) -> String {
    match mode {
        DisplayMode::Counts => format!("{}:{}", v, step.robot_count[v]),
        DisplayMode::RobotIds => {
            let mut ids = step.robot_ids[v].clone();
            ids.sort_unstable();
            let ids: Vec<String> = ids.iter().map(u32::to_string).collect();
            format!("{}:{{{}}}", v, ids.join(","))
        }
    }
}

//! Graphviz DOT output

use std::fs;
use std::path::{Path, PathBuf};

use detour_core::{ExportError, GraphExporter, GraphView, NodeId};
use tracing::info;

/// Default output file
pub const DEFAULT_GRAPH_PATH: &str = "graph.dot";

/// Writes the topology as a DOT digraph
///
/// Start and End are filled green, the optimal path yellow, and the
/// surveillance node red. The red line comes last so it wins over yellow.
#[derive(Debug, Clone)]
pub struct DotExporter {
    path: PathBuf,
}

impl DotExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for DotExporter {
    fn default() -> Self {
        Self::new(DEFAULT_GRAPH_PATH)
    }
}

impl GraphExporter for DotExporter {
    fn export(&mut self, view: &GraphView) -> Result<(), ExportError> {
        fs::write(&self.path, render_dot(view)).map_err(|e| ExportError::io(&self.path, e))?;
        info!("Wrote graph to {}", self.path.display());
        Ok(())
    }
}

fn highlight(out: &mut String, node: NodeId, color: &str) {
    out.push_str(&format!(
        "{} [shape=circle, style=filled, fillcolor={}];\n",
        node, color
    ));
}

/// Render a view as DOT source
pub fn render_dot(view: &GraphView) -> String {
    let mut out = String::from("digraph G {\n");

    for (from, to) in &view.edges {
        out.push_str(&format!("{} -> {};\n", from, to));
    }

    highlight(&mut out, view.start, "green");
    highlight(&mut out, view.end, "green");
    for &node in &view.path {
        highlight(&mut out, node, "yellow");
    }
    if let Some(node) = view.surveillance {
        highlight(&mut out, node, "red");
    }

    out.push_str("}\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Network;

    fn view() -> GraphView {
        let network = Network::from_edges(4, &[(0, 1), (1, 2), (2, 3)]).unwrap();
        GraphView::from_topology(&network, &[NodeId(1), NodeId(2)], Some(NodeId(2)))
    }

    #[test]
    fn test_render_lists_both_directions() {
        let dot = render_dot(&view());
        assert!(dot.starts_with("digraph G {\n"));
        assert!(dot.ends_with("}\n"));
        assert!(dot.contains("0 -> 1;\n"));
        assert!(dot.contains("1 -> 0;\n"));
        assert_eq!(dot.matches(" -> ").count(), 6);
    }

    #[test]
    fn test_surveillance_color_comes_last() {
        let dot = render_dot(&view());
        let lines: Vec<&str> = dot.lines().collect();
        assert_eq!(
            lines[lines.len() - 2],
            "2 [shape=circle, style=filled, fillcolor=red];"
        );
        assert!(dot.contains("0 [shape=circle, style=filled, fillcolor=green];"));
        assert!(dot.contains("3 [shape=circle, style=filled, fillcolor=green];"));
        assert!(dot.contains("1 [shape=circle, style=filled, fillcolor=yellow];"));
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.dot");
        let mut exporter = DotExporter::new(&path);

        exporter.export(&view()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), render_dot(&view()));
    }

    #[test]
    fn test_export_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut exporter = DotExporter::new(dir.path().join("missing").join("graph.dot"));
        assert!(matches!(
            exporter.export(&view()),
            Err(ExportError::Io { .. })
        ));
    }
}

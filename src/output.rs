//! Output writers: plain edge lists and Graphviz DOT.

use std::io::{self, Write};

use crate::graph::{Edge, Graph};

/// Writes a complete graph as a plain edge list: a `n m` header followed by
/// one `source target` line per edge (1-indexed, matching the reader in
/// `graph::read_graph_from_file`-style formats used elsewhere in the crate
/// family).
pub fn write_edge_list<W: Write>(graph: &Graph, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "% {} {}", graph.n(), graph.m())?;
    for e in graph.edges() {
        writeln!(writer, "{} {}", e.source + 1, e.target + 1)?;
    }
    Ok(())
}

/// Writes a complete graph as Graphviz DOT, for small instances.
pub fn write_dot<W: Write>(graph: &Graph, writer: &mut W) -> io::Result<()> {
    writeln!(writer, "graph G {{")?;
    for i in 0..graph.n() {
        writeln!(writer, "  {i};")?;
    }
    for Edge { source, target } in graph.edges() {
        writeln!(writer, "  {source} -- {target};")?;
    }
    writeln!(writer, "}}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_list_round_trips_counts() {
        let g = Graph::from_edges(3, vec![Edge::new(0, 1), Edge::new(1, 2)]);
        let mut buf = Vec::new();
        write_edge_list(&g, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("% 3 2\n"));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn dot_contains_every_edge() {
        let g = Graph::from_edges(2, vec![Edge::new(0, 1)]);
        let mut buf = Vec::new();
        write_dot(&g, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("0 -- 1;"));
    }
}

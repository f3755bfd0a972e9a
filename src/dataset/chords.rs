//! Culture chord-transition datasets
//!
//! Each culture has a `<culture-id>.json` graph file (`{nodes: [...], links: [...]}`).
//! Built-in graphs for brazil, jazz and classical stand in when a file is
//! missing or malformed, and brazil answers for any unknown id.

use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::dataset::loader::{load_or_fallback, DataStatus};
use crate::types::{ChordGraph, ChordLink, ChordNode, CULTURES};

/// Culture id served when a requested id is unknown
pub const DEFAULT_CULTURE: &str = "brazil";

/// Loaded chord graphs keyed by culture or genre id
#[derive(Debug, Clone)]
pub struct ChordLibrary {
    graphs: HashMap<String, ChordGraph>,
    statuses: HashMap<String, DataStatus>,
    default_graph: ChordGraph,
}

impl Default for ChordLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ChordLibrary {
    /// Library holding only the built-in graphs
    pub fn builtin() -> Self {
        let mut graphs = HashMap::new();
        let mut statuses = HashMap::new();
        for id in ["brazil", "jazz", "classical"] {
            if let Some(graph) = builtin_graph(id) {
                graphs.insert(id.to_string(), graph);
                statuses.insert(id.to_string(), DataStatus::Loaded);
            }
        }
        Self {
            graphs,
            statuses,
            default_graph: builtin_graph(DEFAULT_CULTURE).unwrap_or_default(),
        }
    }

    /// Load one graph file per catalog culture from `dir`.
    ///
    /// Each file is tried once; failures substitute the matching built-in graph
    /// (or the default one) and are recorded as degraded.
    pub fn load_dir(dir: &Path) -> Self {
        let mut library = Self::builtin();
        for culture in CULTURES.iter() {
            let path = dir.join(format!("{}.json", culture.id));
            let loaded = load_or_fallback(&path, culture.id, || {
                builtin_graph(culture.id).unwrap_or_else(|| library.default_graph.clone())
            });
            library.insert_with_status(culture.id, loaded.data, loaded.status);
        }
        debug!(
            cultures = library.graphs.len(),
            degraded = library.degraded_ids().len(),
            "chord library loaded"
        );
        library
    }

    /// Add or replace a graph
    pub fn insert(&mut self, id: &str, graph: ChordGraph) {
        self.insert_with_status(id, graph, DataStatus::Loaded);
    }

    fn insert_with_status(&mut self, id: &str, graph: ChordGraph, status: DataStatus) {
        self.graphs.insert(id.to_string(), graph);
        self.statuses.insert(id.to_string(), status);
    }

    /// Graph for `id`, falling back to the default culture's graph
    pub fn graph(&self, id: &str) -> &ChordGraph {
        match self.graphs.get(id) {
            Some(graph) => graph,
            None => {
                warn!(culture = id, fallback = DEFAULT_CULTURE, "unknown culture id");
                &self.default_graph
            }
        }
    }

    /// Load status for `id`; unknown ids count as degraded
    pub fn status(&self, id: &str) -> DataStatus {
        self.statuses
            .get(id)
            .cloned()
            .unwrap_or_else(|| DataStatus::Fallback {
                reason: format!("unknown culture '{}'", id),
            })
    }

    /// Ids whose data came from a fallback, sorted
    pub fn degraded_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .statuses
            .iter()
            .filter(|(_, s)| s.is_degraded())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// All ids with a graph, sorted
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.graphs.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

fn node(id: &str, root: &str, quality: &str, count: u32) -> ChordNode {
    ChordNode {
        id: id.to_string(),
        root: root.to_string(),
        quality: quality.to_string(),
        count,
    }
}

fn link(source: &str, target: &str, count: u32, prob: f64) -> ChordLink {
    ChordLink {
        source: source.to_string(),
        target: target.to_string(),
        count,
        prob,
    }
}

/// Built-in demonstration graph for a genre, if one exists
pub fn builtin_graph(id: &str) -> Option<ChordGraph> {
    match id {
        "brazil" => Some(ChordGraph {
            nodes: vec![
                node("Cmaj", "C", "maj", 450),
                node("C7", "C", "7", 320),
                node("Cmaj7", "C", "maj7", 280),
                node("Fmaj", "F", "maj", 380),
                node("F7", "F", "7", 220),
                node("Gmaj", "G", "maj", 340),
                node("G7", "G", "7", 290),
                node("Am", "A", "min", 250),
                node("Am7", "A", "min7", 180),
                node("Dm", "D", "min", 210),
                node("Em", "E", "min", 190),
                node("Bbmaj", "Bb", "maj", 160),
                node("Dbmaj", "Db", "maj", 140),
                node("Fmin7", "F", "min7", 130),
                node("Ebmaj", "Eb", "maj", 120),
            ],
            links: vec![
                link("Cmaj", "Fmaj", 45, 0.12),
                link("Cmaj", "G7", 38, 0.10),
                link("Cmaj", "Am", 32, 0.085),
                link("Fmaj", "Cmaj", 42, 0.11),
                link("Fmaj", "G7", 28, 0.074),
                link("G7", "Cmaj", 55, 0.19),
                link("G7", "Am", 22, 0.076),
                link("Am", "Dm", 25, 0.10),
                link("Am", "F7", 18, 0.072),
                link("C7", "Fmaj", 48, 0.15),
                link("Dm", "G7", 30, 0.14),
                link("Em", "Am", 20, 0.105),
                link("Bbmaj", "Ebmaj", 15, 0.094),
                link("Dbmaj", "Fmin7", 12, 0.086),
            ],
        }),
        "jazz" => Some(ChordGraph {
            nodes: vec![
                node("Cmaj7", "C", "maj7", 520),
                node("C7", "C", "7", 480),
                node("Cm7", "C", "min7", 380),
                node("Fmaj7", "F", "maj7", 450),
                node("F7", "F", "7", 420),
                node("Fm7", "F", "min7", 350),
                node("G7", "G", "7", 580),
                node("Gm7", "G", "min7", 320),
                node("Am7", "A", "min7", 400),
                node("A7", "A", "7", 360),
                node("Dm7", "D", "min7", 380),
                node("D7", "D", "7", 340),
                node("Em7", "E", "min7", 290),
                node("E7", "E", "7", 310),
                node("Bbmaj7", "Bb", "maj7", 260),
            ],
            links: vec![
                link("Cmaj7", "Am7", 65, 0.125),
                link("Am7", "Dm7", 58, 0.145),
                link("Dm7", "G7", 62, 0.163),
                link("G7", "Cmaj7", 78, 0.134),
                link("C7", "Fmaj7", 72, 0.15),
                link("Fmaj7", "Em7", 45, 0.10),
                link("Em7", "A7", 48, 0.165),
                link("A7", "Dm7", 52, 0.144),
                link("Fm7", "Bbmaj7", 38, 0.109),
                link("Gm7", "C7", 42, 0.131),
            ],
        }),
        "classical" => Some(ChordGraph {
            nodes: vec![
                node("Cmaj", "C", "maj", 680),
                node("Fmaj", "F", "maj", 520),
                node("Gmaj", "G", "maj", 580),
                node("Am", "A", "min", 450),
                node("Dm", "D", "min", 420),
                node("Em", "E", "min", 380),
                node("G7", "G", "7", 340),
                node("D7", "D", "7", 290),
                node("A7", "A", "7", 260),
                node("E7", "E", "7", 240),
                node("Bbmaj", "Bb", "maj", 180),
                node("Ebmaj", "Eb", "maj", 160),
            ],
            links: vec![
                link("Cmaj", "Fmaj", 85, 0.125),
                link("Cmaj", "Am", 78, 0.115),
                link("Cmaj", "G7", 72, 0.106),
                link("Fmaj", "Cmaj", 68, 0.131),
                link("Fmaj", "Dm", 55, 0.106),
                link("Gmaj", "Cmaj", 82, 0.141),
                link("G7", "Cmaj", 95, 0.279),
                link("Am", "Dm", 48, 0.107),
                link("Am", "Fmaj", 42, 0.093),
                link("Dm", "G7", 58, 0.138),
                link("D7", "Gmaj", 52, 0.179),
                link("A7", "Dm", 38, 0.146),
                link("E7", "Am", 35, 0.146),
            ],
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_graphs_present() {
        let library = ChordLibrary::builtin();
        assert_eq!(library.ids(), vec!["brazil", "classical", "jazz"]);
        assert_eq!(library.graph("jazz").nodes.len(), 15);
        assert!(library.degraded_ids().is_empty());
    }

    #[test]
    fn test_unknown_id_falls_back_to_brazil() {
        let library = ChordLibrary::builtin();
        let graph = library.graph("atlantis");
        assert_eq!(graph, &builtin_graph("brazil").unwrap());
        assert!(library.status("atlantis").is_degraded());
    }

    #[test]
    fn test_load_dir_mixes_files_and_fallbacks() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("japan.json")).unwrap();
        write!(
            file,
            r#"{{
                "nodes": [{{"id": "Am", "root": "A", "quality": "min", "count": 9}}],
                "links": []
            }}"#
        )
        .unwrap();
        std::fs::write(dir.path().join("france.json"), "{ broken").unwrap();

        let library = ChordLibrary::load_dir(dir.path());

        assert_eq!(library.status("japan"), DataStatus::Loaded);
        assert_eq!(library.graph("japan").nodes[0].count, 9);

        assert!(library.status("france").is_degraded());
        assert_eq!(library.graph("france"), &builtin_graph("brazil").unwrap());

        // The real brazil file is missing, so it is degraded but still built-in
        assert!(library.degraded_ids().contains(&"brazil"));
        assert_eq!(library.graph("brazil").nodes.len(), 15);
    }
}

//! Graphe de flot à capacités entières et solveur de flot maximal
//! (flot bloquant, à la Dinic).
//!
//! Représentation en arène plate : les nœuds sont des indices denses, les
//! arêtes vivent dans un unique vecteur et chaque arête connaît l'indice de
//! son arête inverse. Les arêtes ajoutées sont d'abord mises en attente puis
//! mélangées avant insertion : à éligibilité égale, l'ordre d'insertion
//! détermine quel candidat la recherche augmentante atteint en premier, et le
//! mélange évite de favoriser systématiquement les premiers indices.

use rand::seq::SliceRandom;
use rand::Rng;

/// Arête de l'arène. `flow() = base - cap` ; une valeur négative n'apparaît
/// que sur les arêtes inverses et signifie « flot entrant ».
#[derive(Debug, Clone)]
pub struct FlowEdge {
    pub to: usize,
    /// Indice de l'arête inverse appariée.
    pub rev: usize,
    /// Capacité résiduelle courante.
    pub cap: i64,
    /// Capacité d'origine.
    pub base: i64,
}

impl FlowEdge {
    pub fn flow(&self) -> i64 {
        self.base - self.cap
    }
}

#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    adj: Vec<Vec<usize>>,
    edges: Vec<FlowEdge>,
    queued: Vec<(usize, usize, i64)>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self) -> usize {
        self.adj.push(Vec::new());
        self.adj.len() - 1
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Met une arête `from -> to` en attente. L'insertion réelle (et la
    /// création de l'inverse de capacité nulle) se fait au moment de `solve`.
    pub fn add_edge(&mut self, from: usize, to: usize, cap: i64) {
        debug_assert!(from < self.adj.len() && to < self.adj.len());
        debug_assert!(cap >= 0);
        self.queued.push((from, to, cap));
    }

    pub fn outgoing(&self, node: usize) -> &[usize] {
        &self.adj[node]
    }

    pub fn edge(&self, idx: usize) -> &FlowEdge {
        &self.edges[idx]
    }

    /// Insère les arêtes en attente dans un ordre mélangé puis calcule le
    /// flot maximal de `source` vers `sink`. Un flot inférieur au besoin
    /// théorique n'est pas une erreur du solveur : c'est au planificateur
    /// appelant de l'interpréter comme une infaisabilité.
    pub fn solve<R: Rng>(&mut self, source: usize, sink: usize, rng: &mut R) -> i64 {
        self.insert_queued(rng);

        let mut total = 0i64;
        loop {
            let levels = match self.bfs_levels(source, sink) {
                Some(levels) => levels,
                None => break,
            };
            let mut cursors = vec![0usize; self.adj.len()];
            loop {
                let pushed = self.augment(source, sink, i64::MAX, &levels, &mut cursors);
                if pushed == 0 {
                    break;
                }
                total += pushed;
            }
        }
        total
    }

    fn insert_queued(&mut self, rng: &mut impl Rng) {
        let mut queued = std::mem::take(&mut self.queued);
        queued.shuffle(rng);
        self.edges.reserve(2 * queued.len());
        for (from, to, cap) in queued {
            let fwd = self.edges.len();
            let rev = fwd + 1;
            self.edges.push(FlowEdge {
                to,
                rev,
                cap,
                base: cap,
            });
            self.adj[from].push(fwd);
            self.edges.push(FlowEdge {
                to: from,
                rev: fwd,
                cap: 0,
                base: 0,
            });
            self.adj[to].push(rev);
        }
    }

    /// Niveaux BFS depuis la source à travers les arêtes de capacité
    /// résiduelle positive. `None` dès que le puits n'est plus atteignable.
    fn bfs_levels(&self, source: usize, sink: usize) -> Option<Vec<i32>> {
        let mut levels = vec![-1i32; self.adj.len()];
        let mut queue = std::collections::VecDeque::new();
        levels[source] = 0;
        queue.push_back(source);
        while let Some(node) = queue.pop_front() {
            if node == sink {
                break;
            }
            for &ei in &self.adj[node] {
                let edge = &self.edges[ei];
                if edge.cap > 0 && levels[edge.to] < 0 {
                    levels[edge.to] = levels[node] + 1;
                    queue.push_back(edge.to);
                }
            }
        }
        if levels[sink] < 0 {
            None
        } else {
            Some(levels)
        }
    }

    /// Recherche augmentante en profondeur dans le graphe de niveaux. Le
    /// curseur par nœud évite de re-balayer les arêtes déjà inutilisables.
    fn augment(
        &mut self,
        node: usize,
        sink: usize,
        limit: i64,
        levels: &[i32],
        cursors: &mut [usize],
    ) -> i64 {
        if node == sink {
            return limit;
        }
        while cursors[node] < self.adj[node].len() {
            let ei = self.adj[node][cursors[node]];
            let (to, cap) = {
                let edge = &self.edges[ei];
                (edge.to, edge.cap)
            };
            if cap > 0 && levels[to] == levels[node] + 1 {
                let pushed = self.augment(to, sink, limit.min(cap), levels, cursors);
                if pushed > 0 {
                    self.edges[ei].cap -= pushed;
                    let rev = self.edges[ei].rev;
                    self.edges[rev].cap += pushed;
                    return pushed;
                }
            }
            cursors[node] += 1;
        }
        0
    }
}

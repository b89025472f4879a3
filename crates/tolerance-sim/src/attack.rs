//! Targeted attack: remove the most central vertices first.
//!
//! # Ranking
//!
//! Vertices are ordered by a [`Centrality`], highest first, with ties
//! broken by ascending vertex id. Scores that are NaN rank below every
//! number. Two policies decide when the ranking is computed:
//!
//! - [`RankingPolicy::Static`] ranks once on the intact graph and removes
//!   the top `round(f × n)` vertices in that order.
//! - [`RankingPolicy::Dynamic`] re-ranks the depleted graph before every
//!   single removal, so a hub that lost its neighbours can drop down the
//!   list. Measures are still recorded once per batch.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tolerance_graph::{GraphAdapter, GraphError, MeasureSpec};
use tracing::{info, instrument, trace};

use crate::error::SimError;
use crate::schedule::RemovalSchedule;
use crate::simulator::{RunParams, SimulationOutcome, Simulator};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Score used to rank attack targets.
///
/// Serialized as the plain string `"degree"` or as a measure request
/// (`{ name = "betweenness", params = { directed = false } }`). A bare name
/// other than `degree` is shorthand for a request without parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Centrality {
    /// Total degree via [`GraphAdapter::degree_ranking`].
    #[default]
    Degree,
    /// A centrality registered under a name, with its parameters.
    Measure(MeasureSpec),
}

impl Centrality {
    /// Pick a centrality by registry name; `"degree"` without parameters
    /// maps to [`Centrality::Degree`].
    #[must_use]
    pub fn named(name: &str) -> Self {
        if name == "degree" {
            Self::Degree
        } else {
            Self::Measure(MeasureSpec::new(name))
        }
    }
}

impl fmt::Display for Centrality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Degree => write!(f, "degree"),
            Self::Measure(spec) => write!(f, "{}", spec.column()),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CentralityRepr {
    Name(String),
    Spec(MeasureSpec),
}

impl<'de> Deserialize<'de> for Centrality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match CentralityRepr::deserialize(deserializer)? {
            CentralityRepr::Name(name) => Self::named(&name),
            CentralityRepr::Spec(spec) if spec.name == "degree" && spec.params.is_empty() => {
                Self::Degree
            }
            CentralityRepr::Spec(spec) => Self::Measure(spec),
        })
    }
}

impl Serialize for Centrality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Degree => serializer.serialize_str("degree"),
            Self::Measure(spec) => spec.serialize(serializer),
        }
    }
}

/// When centrality is recomputed during an attack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankingPolicy {
    /// Rank once on the intact graph.
    Static,
    /// Re-rank before every removal.
    #[default]
    Dynamic,
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Self::Static),
            "dynamic" => Ok(Self::Dynamic),
            other => Err(format!("unknown ranking policy {other:?} (expected static or dynamic)")),
        }
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static => write!(f, "static"),
            Self::Dynamic => write!(f, "dynamic"),
        }
    }
}

/// Attack configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AttackOptions {
    /// Score used to pick targets.
    #[serde(default)]
    pub centrality: Centrality,
    /// When the score is recomputed.
    #[serde(default)]
    pub ranking: RankingPolicy,
}

// ---------------------------------------------------------------------------
// Attack
// ---------------------------------------------------------------------------

impl<G: GraphAdapter> Simulator<'_, G> {
    /// Remove the `round(f × n)` most central vertices in `steps` batches,
    /// recording every measure after each batch.
    ///
    /// # Errors
    ///
    /// Validation errors as for [`Simulator::plan`], plus
    /// [`SimError::Graph`] wrapping [`GraphError::UnknownMeasure`] when the
    /// centrality is not registered. A measure or centrality failing mid-run
    /// returns [`SimError::Measure`].
    #[instrument(skip_all, fields(
        fraction = params.fraction,
        steps = params.steps,
        centrality = %options.centrality,
        ranking = %options.ranking,
    ))]
    pub fn target_attack(
        &self,
        graph: &G,
        params: &RunParams,
        options: &AttackOptions,
    ) -> Result<SimulationOutcome<G>, SimError> {
        let plan = self.plan(graph, params)?;
        if let Centrality::Measure(spec) = &options.centrality {
            self.registry().check_centrality(&spec.name, &spec.params)?;
        }
        info!(
            nodes = plan.node_count(),
            target = plan.target(),
            batch_size = plan.batch_size(),
            "targeted attack starting"
        );

        match options.ranking {
            RankingPolicy::Static => {
                let mut pool = self.rank(graph, &options.centrality)?;
                pool.truncate(plan.target());
                if pool.len() < plan.target() {
                    return Err(SimError::invalid(format!(
                        "centrality {} ranked {} vertices, {} needed",
                        options.centrality,
                        pool.len(),
                        plan.target()
                    )));
                }
                let schedule = RemovalSchedule::from_pool(&pool, &plan);
                let mut batches = schedule.batches().iter();
                self.run(graph, params, &plan, |working, _size, _rows| {
                    let batch = batches
                        .next()
                        .ok_or_else(|| SimError::invalid("removal schedule ran out of batches"))?;
                    working.remove_vertices(batch)?;
                    Ok(batch.clone())
                })
            }
            RankingPolicy::Dynamic => {
                self.run(graph, params, &plan, |working, size, rows_completed| {
                    let mut batch = Vec::with_capacity(size);
                    for _ in 0..size {
                        let target = self
                            .rank(working, &options.centrality)
                            .map_err(|source| SimError::Measure {
                                rows_completed,
                                source,
                            })?
                            .into_iter()
                            .next()
                            .ok_or_else(|| SimError::invalid("no vertices left to remove"))?;
                        trace!(vertex = %target, "removing");
                        working.remove_vertex(&target)?;
                        batch.push(target);
                    }
                    Ok(batch)
                })
            }
        }
    }

    /// Vertex ids ordered by `centrality`, highest first, ties by id.
    ///
    /// # Errors
    ///
    /// Whatever the centrality reports, and [`GraphError::Undefined`] when
    /// it scores a different number of vertices than the graph holds.
    pub fn rank(&self, graph: &G, centrality: &Centrality) -> Result<Vec<String>, GraphError> {
        match centrality {
            Centrality::Degree => Ok(graph
                .degree_ranking()
                .into_iter()
                .map(|(id, _)| id)
                .collect()),
            Centrality::Measure(spec) => {
                let scores = graph.compute_centrality(self.registry(), &spec.name, &spec.params)?;
                if scores.len() != graph.vertex_count() {
                    return Err(GraphError::Undefined {
                        measure: spec.name.clone(),
                        reason: format!(
                            "scored {} of {} vertices",
                            scores.len(),
                            graph.vertex_count()
                        ),
                    });
                }
                let mut ranked: Vec<(String, f64)> = scores
                    .into_iter()
                    .map(|(id, score)| (id, if score.is_nan() { f64::NEG_INFINITY } else { score }))
                    .collect();
                // Scores arrive in ascending id order; a stable sort keeps
                // that order among equal scores.
                ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
                Ok(ranked.into_iter().map(|(id, _)| id).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use tolerance_graph::{MeasureParams, MeasureRegistry, Signature, StationGraph};

    use super::*;

    /// Hub with five spokes, a second hub with three, joined at the tips.
    fn two_hubs() -> StationGraph {
        StationGraph::from_edges(
            false,
            &[
                ("h1", "a"),
                ("h1", "b"),
                ("h1", "c"),
                ("h1", "d"),
                ("h1", "e"),
                ("h2", "x"),
                ("h2", "y"),
                ("h2", "z"),
                ("e", "x"),
            ],
        )
    }

    #[test]
    fn first_removed_is_the_max_degree_vertex() {
        let registry = MeasureRegistry::with_builtins();
        let sim = Simulator::new(&registry);
        for ranking in [RankingPolicy::Static, RankingPolicy::Dynamic] {
            let options = AttackOptions {
                ranking,
                ..AttackOptions::default()
            };
            let outcome = sim
                .target_attack(&two_hubs(), &RunParams::new(0.2, 2, ["vertex_count"]), &options)
                .expect("valid attack");
            assert_eq!(outcome.removed[0], "h1", "{ranking}");
            assert_eq!(outcome.removed[1], "h2", "{ranking}");
        }
    }

    #[test]
    fn dynamic_ranking_sees_the_depleted_graph() {
        // h has degree 4; v and w tie at 3 but v hangs off h. Once h is
        // gone v drops to 2, so only a dynamic attack moves on to w.
        let graph = StationGraph::from_edges(
            false,
            &[
                ("h", "a"),
                ("h", "b"),
                ("h", "c"),
                ("h", "v"),
                ("v", "p"),
                ("v", "q"),
                ("w", "x"),
                ("w", "y"),
                ("w", "z"),
            ],
        );
        let registry = MeasureRegistry::with_builtins();
        let sim = Simulator::new(&registry);
        let params = RunParams::new(0.2, 2, ["vertex_count"]);

        let fixed = sim
            .target_attack(
                &graph,
                &params,
                &AttackOptions {
                    ranking: RankingPolicy::Static,
                    ..AttackOptions::default()
                },
            )
            .expect("static attack");
        assert_eq!(fixed.removed, vec!["h", "v"]);

        let adaptive = sim
            .target_attack(&graph, &params, &AttackOptions::default())
            .expect("dynamic attack");
        assert_eq!(adaptive.removed, vec!["h", "w"]);
    }

    #[test]
    fn ties_break_by_ascending_id() {
        let graph = StationGraph::complete(6, true);
        let registry = MeasureRegistry::with_builtins();
        let sim = Simulator::new(&registry);
        let outcome = sim
            .target_attack(&graph, &RunParams::new(0.5, 3, ["vertex_count"]), &AttackOptions::default())
            .expect("valid attack");
        assert_eq!(outcome.removed, vec!["0", "1", "2"]);
    }

    #[test]
    fn registered_centrality_drives_the_order() {
        let mut registry = MeasureRegistry::<StationGraph>::with_builtins();
        registry
            .register_centrality(Signature::new("reverse_id"), |g: &StationGraph, _: &MeasureParams| {
                Ok(g.vertex_ids()
                    .into_iter()
                    .enumerate()
                    .map(|(i, id)| {
                        #[allow(clippy::cast_precision_loss)]
                        let score = i as f64;
                        (id, score)
                    })
                    .collect())
            })
            .expect("registers");
        let sim = Simulator::new(&registry);
        let options = AttackOptions {
            centrality: Centrality::named("reverse_id"),
            ranking: RankingPolicy::Static,
        };
        let outcome = sim
            .target_attack(&StationGraph::complete(10, true), &RunParams::new(0.2, 1, ["vertex_count"]), &options)
            .expect("valid attack");
        assert_eq!(outcome.removed, vec!["9", "8"]);
    }

    #[test]
    fn dynamic_betweenness_reranks_after_each_removal() {
        // h carries 12 shortest paths, v 9 and w 3. With h gone, v only
        // bridges p and q, so a dynamic attack moves on to w.
        let graph = StationGraph::from_edges(
            false,
            &[
                ("h", "a"),
                ("h", "b"),
                ("h", "c"),
                ("h", "v"),
                ("v", "p"),
                ("v", "q"),
                ("w", "x"),
                ("w", "y"),
                ("w", "z"),
            ],
        );
        let registry = MeasureRegistry::with_builtins();
        let sim = Simulator::new(&registry);
        let params = RunParams::new(0.2, 2, ["vertex_count"]);

        let fixed = sim
            .target_attack(
                &graph,
                &params,
                &AttackOptions {
                    centrality: Centrality::named("betweenness"),
                    ranking: RankingPolicy::Static,
                },
            )
            .expect("static attack");
        assert_eq!(fixed.removed, vec!["h", "v"]);

        let adaptive = sim
            .target_attack(
                &graph,
                &params,
                &AttackOptions {
                    centrality: Centrality::named("betweenness"),
                    ranking: RankingPolicy::Dynamic,
                },
            )
            .expect("dynamic attack");
        assert_eq!(adaptive.removed, vec!["h", "w"]);
    }

    #[test]
    fn dynamic_pagerank_removes_the_full_target() {
        let registry = MeasureRegistry::with_builtins();
        let sim = Simulator::new(&registry);
        let options = AttackOptions {
            centrality: Centrality::Measure(MeasureSpec::new("pagerank").with_param("damping", 0.9)),
            ranking: RankingPolicy::Dynamic,
        };
        let outcome = sim
            .target_attack(&two_hubs(), &RunParams::new(0.4, 2, ["vertex_count"]), &options)
            .expect("valid attack");
        let counts: Vec<usize> = outcome.table.rows().iter().map(|r| r.f_count).collect();
        assert_eq!(counts, vec![2, 4]);
        assert_eq!(outcome.graph.vertex_count(), 6);
    }

    #[test]
    fn centrality_failing_mid_run_reports_rows_completed() {
        let mut registry = MeasureRegistry::<StationGraph>::with_builtins();
        registry
            .register_centrality(Signature::new("fussy"), |g: &StationGraph, _: &MeasureParams| {
                if g.vertex_count() < 8 {
                    return Err(GraphError::Undefined {
                        measure: "fussy".to_string(),
                        reason: "too few vertices".to_string(),
                    });
                }
                Ok(g.vertex_ids().into_iter().map(|id| (id, 1.0)).collect())
            })
            .expect("registers");
        let sim = Simulator::new(&registry);
        let options = AttackOptions {
            centrality: Centrality::named("fussy"),
            ranking: RankingPolicy::Dynamic,
        };
        let err = sim
            .target_attack(&StationGraph::complete(10, true), &RunParams::new(0.5, 5, ["vertex_count"]), &options)
            .expect_err("ranking 7 vertices fails");
        // Ranked at 10, 9 and 8 vertices; the fourth batch fails.
        assert!(matches!(
            err,
            SimError::Measure { rows_completed: 3, source: GraphError::Undefined { ref measure, .. } }
                if measure == "fussy"
        ));
    }

    #[test]
    fn centrality_scoring_too_few_vertices_is_an_error() {
        let mut registry = MeasureRegistry::<StationGraph>::with_builtins();
        registry
            .register_centrality(Signature::new("partial"), |g: &StationGraph, _: &MeasureParams| {
                Ok(g.vertex_ids().into_iter().take(1).map(|id| (id, 1.0)).collect())
            })
            .expect("registers");
        let sim = Simulator::new(&registry);
        let graph = StationGraph::complete(10, true);
        let params = RunParams::new(0.5, 5, ["vertex_count"]);

        let err = sim
            .target_attack(
                &graph,
                &params,
                &AttackOptions {
                    centrality: Centrality::named("partial"),
                    ranking: RankingPolicy::Static,
                },
            )
            .expect_err("one score cannot fill five removals");
        assert!(matches!(err, SimError::Graph(GraphError::Undefined { ref measure, .. }) if measure == "partial"));

        let err = sim
            .target_attack(
                &graph,
                &params,
                &AttackOptions {
                    centrality: Centrality::named("partial"),
                    ranking: RankingPolicy::Dynamic,
                },
            )
            .expect_err("partial scores are rejected on every re-rank");
        assert!(matches!(err, SimError::Measure { rows_completed: 0, .. }));
    }

    #[test]
    fn mistyped_centrality_parameter_is_rejected_up_front() {
        let registry = MeasureRegistry::with_builtins();
        let sim = Simulator::new(&registry);
        let options = AttackOptions {
            centrality: Centrality::Measure(MeasureSpec::new("pagerank").with_param("damping", "high")),
            ranking: RankingPolicy::Dynamic,
        };
        let err = sim
            .target_attack(&StationGraph::complete(10, true), &RunParams::new(0.5, 5, ["vertex_count"]), &options)
            .expect_err("damping must be numeric");
        assert!(matches!(
            err,
            SimError::Graph(GraphError::InvalidParameter { ref key, .. }) if key == "damping"
        ));
    }

    #[test]
    fn nan_scores_rank_last() {
        let mut registry = MeasureRegistry::<StationGraph>::with_builtins();
        registry
            .register_centrality(Signature::new("spotty"), |g: &StationGraph, _: &MeasureParams| {
                Ok(g.vertex_ids()
                    .into_iter()
                    .map(|id| {
                        let score = if id == "0" { f64::NAN } else { 1.0 };
                        (id, score)
                    })
                    .collect())
            })
            .expect("registers");
        let sim = Simulator::new(&registry);
        let ranked = sim
            .rank(&StationGraph::complete(3, true), &Centrality::named("spotty"))
            .expect("ranks");
        assert_eq!(ranked, vec!["1", "2", "0"]);
    }

    #[test]
    fn unknown_centrality_is_rejected_up_front() {
        let registry = MeasureRegistry::with_builtins();
        let sim = Simulator::new(&registry);
        let options = AttackOptions {
            centrality: Centrality::named("eigenvector"),
            ranking: RankingPolicy::Dynamic,
        };
        let err = sim
            .target_attack(&StationGraph::complete(10, true), &RunParams::new(0.5, 5, ["vertex_count"]), &options)
            .expect_err("not registered");
        assert!(matches!(err, SimError::Graph(GraphError::UnknownMeasure(_))));
    }

    #[test]
    fn centrality_deserializes_from_keyword_or_spec() {
        let degree: Centrality = serde_json::from_str(r#""degree""#).expect("keyword");
        assert_eq!(degree, Centrality::Degree);
        let named: Centrality = serde_json::from_str(r#""closeness""#).expect("bare name");
        assert_eq!(named, Centrality::Measure(MeasureSpec::new("closeness")));
        let spec: Centrality =
            serde_json::from_str(r#"{"name":"betweenness","params":{"directed":false}}"#).expect("spec");
        assert!(matches!(spec, Centrality::Measure(ref s) if s.name == "betweenness"));
        assert_eq!(serde_json::to_string(&Centrality::Degree).expect("serializes"), r#""degree""#);
    }

    #[test]
    fn ranking_policy_parses() {
        assert_eq!("Static".parse::<RankingPolicy>(), Ok(RankingPolicy::Static));
        assert_eq!(RankingPolicy::default(), RankingPolicy::Dynamic);
        assert!("sometimes".parse::<RankingPolicy>().is_err());
    }
}

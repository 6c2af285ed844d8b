//! Diagnostic outputs: per-property robustness series, violation counts and
//! durations, and event points.
//!
//! Supplemented from `original_source/StateStore.h`, which declares (and its
//! callers invoke) six `write*` methods — `writeSignal`/`writeJSONData`,
//! `writeChasePoints`/`writeCoordinatedPoints`/`writeCoordinatorActivity`.
//! This module keeps their *intent*, not their signatures: one collector
//! accumulated during the tick loop and flushed to newline-delimited JSON
//! files at process termination, using `serde_json` rather than a hand-rolled
//! writer.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use aegis_common::error::SupervisorError;

use crate::enforcer::Enforcer;
use crate::signal::Signal;

/// One property's robustness value at one tick.
#[derive(Debug, Clone, Serialize)]
pub struct RobustnessSample {
    pub tick: i64,
    pub property: String,
    pub robustness: f64,
}

/// A notable event observed during the tick loop.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind")]
pub enum Event {
    /// Adversary came within `CATCH_DISTANCE` of the ego drone.
    Caught { tick: i64 },
    /// The coordinator saw two or more simultaneously active enforcers.
    MultiActive { tick: i64, enforcer_names: Vec<String> },
    /// The boundary property's robustness went negative.
    BoundaryExcursion { tick: i64, max_depth: f64 },
}

/// Per-property violation summary, derived from the robustness series
/// rather than present verbatim in the source — directly computable and
/// invited by the external interface's diagnostic category list.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ViolationSummary {
    pub property: String,
    pub violated_ticks: u64,
    pub longest_run: u64,
    #[serde(skip)]
    current_run: u64,
}

impl ViolationSummary {
    fn observe(&mut self, violated: bool) {
        if violated {
            self.violated_ticks += 1;
            self.current_run += 1;
            self.longest_run = self.longest_run.max(self.current_run);
        } else {
            self.current_run = 0;
        }
    }
}

/// Accumulates diagnostics across the tick loop's lifetime and flushes them
/// to one JSON-lines file per category.
pub struct Diagnostics {
    catch_distance: f64,
    robustness_series: Vec<RobustnessSample>,
    violations: HashMap<String, ViolationSummary>,
    events: Vec<Event>,
}

impl Diagnostics {
    pub fn new(catch_distance: f64) -> Diagnostics {
        Diagnostics {
            catch_distance,
            robustness_series: Vec::new(),
            violations: HashMap::new(),
            events: Vec::new(),
        }
    }

    pub fn robustness_series(&self) -> &[RobustnessSample] {
        &self.robustness_series
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn violation_summary(&self, property: &str) -> Option<&ViolationSummary> {
        self.violations.get(property)
    }

    /// Record one tick's observations: every enforcer's robustness, a
    /// `MultiActive` event when two or more enforcers were active, a
    /// `BoundaryExcursion` event when the boundary property went negative,
    /// and a `Caught` event when the adversary is within `catch_distance`.
    pub fn record_tick(
        &mut self,
        tick: i64,
        sig: &Signal,
        enforcers: &[Box<dyn Enforcer>],
        active_names: &[&'static str],
    ) {
        for e in enforcers {
            let robustness = e.robustness(sig);
            self.robustness_series.push(RobustnessSample {
                tick,
                property: e.name().to_string(),
                robustness,
            });
            self.violations
                .entry(e.name().to_string())
                .or_insert_with(|| ViolationSummary {
                    property: e.name().to_string(),
                    ..Default::default()
                })
                .observe(robustness < 0.0);

            if e.name() == "Boundary" && robustness < 0.0 {
                self.events.push(Event::BoundaryExcursion { tick, max_depth: -robustness });
            }
        }

        if active_names.len() >= 2 {
            self.events.push(Event::MultiActive {
                tick,
                enforcer_names: active_names.iter().map(|s| s.to_string()).collect(),
            });
        }

        let t = sig.length() as i64 - 1;
        let dn = sig.value("pos_north_m", t) - sig.value("enemy_pos_north_m", t);
        let de = sig.value("pos_east_m", t) - sig.value("enemy_pos_east_m", t);
        let dd = sig.value("pos_down_m", t) - sig.value("enemy_pos_down_m", t);
        let distance = (dn * dn + de * de + dd * dd).sqrt();
        if distance < self.catch_distance {
            self.events.push(Event::Caught { tick });
        }
    }

    /// Flush all three categories to `dir` as `robustness.jsonl`,
    /// `violations.jsonl`, and `events.jsonl`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(), SupervisorError> {
        std::fs::create_dir_all(dir)?;
        write_jsonl(&dir.join("robustness.jsonl"), &self.robustness_series)?;
        write_jsonl(&dir.join("events.jsonl"), &self.events)?;
        let summaries: Vec<&ViolationSummary> = self.violations.values().collect();
        write_jsonl(&dir.join("violations.jsonl"), &summaries)
    }
}

fn write_jsonl<T: Serialize>(path: &Path, items: &[T]) -> Result<(), SupervisorError> {
    let mut file = std::fs::File::create(path)?;
    for item in items {
        let line = serde_json::to_string(item)
            .map_err(|e| SupervisorError::Setup(format!("failed to serialize diagnostic record: {e}")))?;
        writeln!(file, "{line}")?;
    }
    Ok(())
}

//! Capture sampling strategies for review collections.
//!
//! A collection stores a method name plus a JSON kwargs blob; this module
//! parses those into a [`SamplingMethod`] and applies it to an in-memory
//! slice of lightweight capture rows. Strategies are pure with respect to
//! their inputs (modulo the supplied RNG) and never see captures outside the
//! owning project -- the caller fetches project-scoped rows.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use rand::prelude::*;
use serde::Deserialize;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// The capture fields sampling strategies operate on.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureSample {
    pub id: DbId,
    pub event_id: Option<DbId>,
    pub timestamp: Option<Timestamp>,
    pub size: Option<i64>,
    pub detections_count: i64,
}

/// Method names accepted in `capture_collections.method`.
pub const SAMPLING_METHOD_NAMES: &[&str] = &[
    "random",
    "manual",
    "interval",
    "positional",
    "nth",
    "random_from_each_event",
    "last_and_random_from_each_event",
    "greatest_file_size_from_each_event",
    "detections_only",
];

/// A parsed sampling strategy with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplingMethod {
    /// Uniform random sample without replacement from the whole project.
    Random { size: usize },
    /// Exact inclusion filter by capture id.
    Manual { image_ids: Vec<DbId> },
    /// Walk captures in timestamp order, emitting one whenever at least
    /// `minute_interval` minutes have elapsed since the last emitted capture.
    Interval {
        minute_interval: i64,
        exclude_events: Vec<DbId>,
    },
    /// The capture at ordinal `position` of each event (negative counts from
    /// the end).
    Positional { position: i64 },
    /// Every `nth` capture of each event in timestamp order.
    Nth { nth: usize },
    /// `num_each` random captures per event.
    RandomFromEachEvent { num_each: usize },
    /// The chronologically last capture of each event plus `num_each` random
    /// others, deduplicated.
    LastAndRandomFromEachEvent { num_each: usize },
    /// The `num_each` largest captures (by byte size) per event.
    GreatestFileSizeFromEachEvent { num_each: usize },
    /// Every capture with at least one detection.
    DetectionsOnly,
}

// Per-method kwargs shapes. Defaults match the original collection admin.

#[derive(Deserialize)]
struct RandomArgs {
    #[serde(default = "default_random_size")]
    size: usize,
}

fn default_random_size() -> usize {
    100
}

#[derive(Deserialize)]
struct ManualArgs {
    #[serde(default)]
    image_ids: Vec<DbId>,
}

#[derive(Deserialize)]
struct IntervalArgs {
    #[serde(default = "default_minute_interval")]
    minute_interval: i64,
    #[serde(default)]
    exclude_events: Vec<DbId>,
}

fn default_minute_interval() -> i64 {
    10
}

#[derive(Deserialize)]
struct PositionalArgs {
    #[serde(default = "default_position")]
    position: i64,
}

fn default_position() -> i64 {
    -1
}

#[derive(Deserialize)]
struct NthArgs {
    nth: usize,
}

#[derive(Deserialize)]
struct NumEachArgs {
    #[serde(default = "default_num_each")]
    num_each: usize,
}

fn default_num_each() -> usize {
    1
}

impl SamplingMethod {
    /// Parse a method name and JSON kwargs blob into a strategy.
    ///
    /// Unknown method names and malformed kwargs are validation errors.
    pub fn from_parts(method: &str, kwargs: &serde_json::Value) -> Result<Self, CoreError> {
        let kwargs = match kwargs {
            serde_json::Value::Null => serde_json::json!({}),
            other => other.clone(),
        };

        fn parse<T: serde::de::DeserializeOwned>(
            method: &str,
            kwargs: serde_json::Value,
        ) -> Result<T, CoreError> {
            serde_json::from_value(kwargs).map_err(|e| {
                CoreError::Validation(format!("Invalid arguments for sampling method '{method}': {e}"))
            })
        }

        match method {
            "random" => {
                let args: RandomArgs = parse(method, kwargs)?;
                Ok(SamplingMethod::Random { size: args.size })
            }
            "manual" => {
                let args: ManualArgs = parse(method, kwargs)?;
                Ok(SamplingMethod::Manual {
                    image_ids: args.image_ids,
                })
            }
            "interval" => {
                let args: IntervalArgs = parse(method, kwargs)?;
                if args.minute_interval <= 0 {
                    return Err(CoreError::Validation(
                        "minute_interval must be positive".to_string(),
                    ));
                }
                Ok(SamplingMethod::Interval {
                    minute_interval: args.minute_interval,
                    exclude_events: args.exclude_events,
                })
            }
            "positional" => {
                let args: PositionalArgs = parse(method, kwargs)?;
                Ok(SamplingMethod::Positional {
                    position: args.position,
                })
            }
            "nth" => {
                let args: NthArgs = parse(method, kwargs)?;
                if args.nth == 0 {
                    return Err(CoreError::Validation("nth must be at least 1".to_string()));
                }
                Ok(SamplingMethod::Nth { nth: args.nth })
            }
            "random_from_each_event" => {
                let args: NumEachArgs = parse(method, kwargs)?;
                Ok(SamplingMethod::RandomFromEachEvent {
                    num_each: args.num_each,
                })
            }
            "last_and_random_from_each_event" => {
                let args: NumEachArgs = parse(method, kwargs)?;
                Ok(SamplingMethod::LastAndRandomFromEachEvent {
                    num_each: args.num_each,
                })
            }
            "greatest_file_size_from_each_event" => {
                let args: NumEachArgs = parse(method, kwargs)?;
                Ok(SamplingMethod::GreatestFileSizeFromEachEvent {
                    num_each: args.num_each,
                })
            }
            "detections_only" => Ok(SamplingMethod::DetectionsOnly),
            other => Err(CoreError::Validation(format!(
                "Invalid sampling method: {other}. Choices are: {}",
                SAMPLING_METHOD_NAMES.join(", ")
            ))),
        }
    }
}

/// Apply a sampling strategy to the project's captures, returning the
/// selected capture ids.
///
/// Walk-based strategies (interval, positional, nth) return ids in walk
/// order; set-based strategies return ids sorted ascending.
pub fn sample(
    method: &SamplingMethod,
    captures: &[CaptureSample],
    rng: &mut impl Rng,
) -> Vec<DbId> {
    match method {
        SamplingMethod::Random { size } => {
            let mut ids: Vec<DbId> = captures
                .iter()
                .map(|c| c.id)
                .choose_multiple(rng, *size);
            ids.sort_unstable();
            ids
        }

        SamplingMethod::Manual { image_ids } => {
            let wanted: HashSet<DbId> = image_ids.iter().copied().collect();
            captures
                .iter()
                .map(|c| c.id)
                .filter(|id| wanted.contains(id))
                .collect()
        }

        SamplingMethod::Interval {
            minute_interval,
            exclude_events,
        } => {
            let excluded: HashSet<DbId> = exclude_events.iter().copied().collect();
            let min_delta = chrono::Duration::minutes(*minute_interval);
            let mut last_emitted: Option<Timestamp> = None;
            let mut out = Vec::new();

            for (ts, capture) in sorted_by_timestamp(captures) {
                if capture
                    .event_id
                    .is_some_and(|event| excluded.contains(&event))
                {
                    continue;
                }
                match last_emitted {
                    None => {
                        out.push(capture.id);
                        last_emitted = Some(ts);
                    }
                    Some(prev) if ts - prev >= min_delta => {
                        out.push(capture.id);
                        last_emitted = Some(ts);
                    }
                    Some(_) => {}
                }
            }
            out
        }

        SamplingMethod::Positional { position } => {
            let mut out = Vec::new();
            for (_, event_captures) in by_event(captures) {
                let picked = if *position >= 0 {
                    // Out-of-range positive positions fall back to the last
                    // capture of the event.
                    event_captures
                        .get(*position as usize)
                        .or_else(|| event_captures.last())
                } else {
                    // Negative positions count from the end; out-of-range
                    // falls back to the first capture.
                    let from_end = position.unsigned_abs() as usize - 1;
                    event_captures
                        .len()
                        .checked_sub(from_end + 1)
                        .map(|i| &event_captures[i])
                        .or_else(|| event_captures.first())
                };
                if let Some(capture) = picked {
                    out.push(capture.id);
                }
            }
            out
        }

        SamplingMethod::Nth { nth } => {
            let mut out = Vec::new();
            for (_, event_captures) in by_event(captures) {
                out.extend(event_captures.iter().step_by(*nth).map(|c| c.id));
            }
            out
        }

        SamplingMethod::RandomFromEachEvent { num_each } => {
            let mut out = BTreeSet::new();
            for (_, event_captures) in by_event(captures) {
                out.extend(
                    event_captures
                        .iter()
                        .map(|c| c.id)
                        .choose_multiple(rng, *num_each),
                );
            }
            out.into_iter().collect()
        }

        SamplingMethod::LastAndRandomFromEachEvent { num_each } => {
            let mut out = BTreeSet::new();
            for (_, event_captures) in by_event(captures) {
                let Some(last) = event_captures.last() else {
                    continue;
                };
                out.insert(last.id);
                out.extend(
                    event_captures
                        .iter()
                        .map(|c| c.id)
                        .filter(|&id| id != last.id)
                        .choose_multiple(rng, *num_each),
                );
            }
            out.into_iter().collect()
        }

        SamplingMethod::GreatestFileSizeFromEachEvent { num_each } => {
            let mut out = BTreeSet::new();
            for (_, mut event_captures) in by_event(captures) {
                event_captures.sort_by_key(|c| std::cmp::Reverse(c.size.unwrap_or(0)));
                out.extend(event_captures.iter().take(*num_each).map(|c| c.id));
            }
            out.into_iter().collect()
        }

        SamplingMethod::DetectionsOnly => captures
            .iter()
            .filter(|c| c.detections_count > 0)
            .map(|c| c.id)
            .collect(),
    }
}

/// Captures paired with their timestamp, sorted ascending by (timestamp, id).
/// Captures without a timestamp are dropped.
fn sorted_by_timestamp<'a>(captures: &'a [CaptureSample]) -> Vec<(Timestamp, &'a CaptureSample)> {
    let mut with_ts: Vec<(Timestamp, &CaptureSample)> = captures
        .iter()
        .filter_map(|c| c.timestamp.map(|ts| (ts, c)))
        .collect();
    with_ts.sort_by_key(|&(ts, c)| (ts, c.id));
    with_ts
}

/// Captures grouped by event (timestamp-sorted within each), skipping
/// ungrouped captures.
fn by_event<'a>(captures: &'a [CaptureSample]) -> BTreeMap<DbId, Vec<&'a CaptureSample>> {
    let mut groups: BTreeMap<DbId, Vec<&CaptureSample>> = BTreeMap::new();
    for capture in captures {
        if let Some(event_id) = capture.event_id {
            groups.entry(event_id).or_default().push(capture);
        }
    }
    for event_captures in groups.values_mut() {
        event_captures.sort_by_key(|c| (c.timestamp, c.id));
    }
    groups
}

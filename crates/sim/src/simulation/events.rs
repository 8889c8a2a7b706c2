//! Scheduled demographic events.
//!
//! Events change the structure of the simulation at a given generation:
//! a population's census size, or the start and end of a migration flow.
//! Generations in event schedules count from 1 for the founding generation,
//! so an event at `num_generation = n` is in force for the transition that
//! produces logged generation `n - 1`.

use crate::base::PopSize;
use crate::errors::ConfigurationError;
use crate::evolution::{migration, Immigration};
use crate::simulation::Population;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A one-time structural change applied at the start of a generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DemographicEvent {
    /// Start a flow of immigrants from `from_pop` into `to_pop`.
    MigrationStart {
        from_pop: String,
        to_pop: String,
        #[serde(rename = "inmigrant_rate")]
        rate: f64,
        #[serde(rename = "num_generation")]
        generation: usize,
    },
    /// Stop the flow started by the `migration_start` event `migration_id`.
    MigrationStop {
        migration_id: String,
        #[serde(rename = "num_generation")]
        generation: usize,
    },
    /// Change the census size of `pop`.
    SizeChange {
        pop: String,
        new_size: PopSize,
        #[serde(rename = "num_generation")]
        generation: usize,
    },
}

impl DemographicEvent {
    /// Generation at which the event fires.
    pub fn generation(&self) -> usize {
        match self {
            Self::MigrationStart { generation, .. }
            | Self::MigrationStop { generation, .. }
            | Self::SizeChange { generation, .. } => *generation,
        }
    }
}

/// An event with its population names resolved to indices.
#[derive(Debug, Clone, PartialEq)]
enum ResolvedEvent {
    MigrationStart { to: usize, immigration: Immigration },
    MigrationStop { to: usize, migration_id: String },
    SizeChange { pop: usize, new_size: PopSize },
}

#[derive(Debug, Clone, PartialEq)]
struct ScheduledEvent {
    id: String,
    generation: usize,
    action: ResolvedEvent,
}

/// Holds every declared event, ordered by generation, and applies the due
/// ones as the simulation advances.
///
/// Events sharing a generation fire in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemographicEventScheduler {
    events: Vec<ScheduledEvent>,
    /// Index of the next event that has not fired yet
    cursor: usize,
}

impl DemographicEventScheduler {
    /// A scheduler without events.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Validate `events` against `pops` and build the schedule.
    ///
    /// # Errors
    /// Fails on a duplicated event id, a reference to an unknown population
    /// or migration, a migration from a population into itself, an
    /// immigration rate outside [0, 1], or a migration stopped before it
    /// starts.
    pub fn new(
        events: Vec<(String, DemographicEvent)>,
        pops: &[Population],
    ) -> Result<Self, ConfigurationError> {
        let pop_index: HashMap<&str, usize> = pops
            .iter()
            .enumerate()
            .map(|(i, pop)| (pop.name(), i))
            .collect();
        let lookup = |event: &str, pop: &str| {
            pop_index
                .get(pop)
                .copied()
                .ok_or_else(|| ConfigurationError::UnknownPopulation {
                    event: event.to_string(),
                    pop: pop.to_string(),
                })
        };

        // declaration position, generation and destination of every migration start
        let mut starts: HashMap<&str, (usize, usize, usize)> = HashMap::new();
        let mut seen = HashSet::new();
        for (position, (id, event)) in events.iter().enumerate() {
            if !seen.insert(id.as_str()) {
                return Err(ConfigurationError::DuplicateEvent(id.clone()));
            }
            if let DemographicEvent::MigrationStart {
                to_pop, generation, ..
            } = event
            {
                let to = lookup(id, to_pop)?;
                starts.insert(id.as_str(), (position, *generation, to));
            }
        }

        let mut scheduled = Vec::with_capacity(events.len());
        for (position, (id, event)) in events.iter().enumerate() {
            let action = match event {
                DemographicEvent::MigrationStart {
                    from_pop,
                    to_pop,
                    rate,
                    ..
                } => {
                    let from = lookup(id, from_pop)?;
                    let to = lookup(id, to_pop)?;
                    if from == to {
                        return Err(ConfigurationError::SelfMigration(id.clone()));
                    }
                    let rate = migration::check_immigration_rate(*rate)?;
                    ResolvedEvent::MigrationStart {
                        to,
                        immigration: Immigration {
                            migration_id: id.clone(),
                            source: from,
                            source_name: from_pop.clone(),
                            rate,
                        },
                    }
                }
                DemographicEvent::MigrationStop {
                    migration_id,
                    generation,
                } => {
                    let &(start_position, start, to) =
                        starts.get(migration_id.as_str()).ok_or_else(|| {
                            ConfigurationError::UnknownMigration {
                                event: id.clone(),
                                migration: migration_id.clone(),
                            }
                        })?;
                    if *generation < start || (*generation == start && position < start_position)
                    {
                        return Err(ConfigurationError::StopBeforeStart {
                            event: id.clone(),
                            migration: migration_id.clone(),
                            start,
                            stop: *generation,
                        });
                    }
                    ResolvedEvent::MigrationStop {
                        to,
                        migration_id: migration_id.clone(),
                    }
                }
                DemographicEvent::SizeChange { pop, new_size, .. } => ResolvedEvent::SizeChange {
                    pop: lookup(id, pop)?,
                    new_size: *new_size,
                },
            };
            scheduled.push(ScheduledEvent {
                id: id.clone(),
                generation: event.generation(),
                action,
            });
        }

        // stable sort keeps declaration order within a generation
        scheduled.sort_by_key(|e| e.generation);

        Ok(Self {
            events: scheduled,
            cursor: 0,
        })
    }

    /// Number of events that have not fired yet.
    pub fn pending(&self) -> usize {
        self.events.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Generation of the next event to fire, if any.
    pub fn next_generation(&self) -> Option<usize> {
        self.events.get(self.cursor).map(|e| e.generation)
    }

    /// Apply every event scheduled at or before `generation`, returning how
    /// many fired.
    ///
    /// # Errors
    /// Fails if a migration would push a population's total immigration rate
    /// above 1, or if a stopped migration is no longer active.
    pub fn apply_due(
        &mut self,
        generation: usize,
        pops: &mut [Population],
    ) -> Result<usize, ConfigurationError> {
        let mut applied = 0;
        while let Some(event) = self.events.get(self.cursor) {
            if event.generation > generation {
                break;
            }
            Self::apply(event, pops)?;
            tracing::debug!(
                event = %event.id,
                scheduled = event.generation,
                generation,
                "applied demographic event"
            );
            self.cursor += 1;
            applied += 1;
        }
        Ok(applied)
    }

    fn apply(event: &ScheduledEvent, pops: &mut [Population]) -> Result<(), ConfigurationError> {
        let missing = |pop: usize| ConfigurationError::UnknownPopulation {
            event: event.id.clone(),
            pop: format!("#{pop}"),
        };
        match &event.action {
            ResolvedEvent::MigrationStart { to, immigration } => pops
                .get_mut(*to)
                .ok_or_else(|| missing(*to))?
                .start_immigration(immigration.clone()),
            ResolvedEvent::MigrationStop { to, migration_id } => {
                let pop = pops.get_mut(*to).ok_or_else(|| missing(*to))?;
                if !pop.stop_immigration(migration_id) {
                    return Err(ConfigurationError::MigrationNotActive {
                        migration: migration_id.clone(),
                    });
                }
                Ok(())
            }
            ResolvedEvent::SizeChange { pop, new_size } => {
                pops.get_mut(*pop)
                    .ok_or_else(|| missing(*pop))?
                    .set_size(*new_size);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::GenotypicFreqs;

    fn pops() -> Vec<Population> {
        vec![
            Population::new("pop1", GenotypicFreqs::new(0.5, 0.0, 0.5).unwrap()),
            Population::new("pop2", GenotypicFreqs::new(0.3, 0.0, 0.7).unwrap()),
        ]
    }

    fn start(from: &str, to: &str, rate: f64, generation: usize) -> DemographicEvent {
        DemographicEvent::MigrationStart {
            from_pop: from.into(),
            to_pop: to.into(),
            rate,
            generation,
        }
    }

    fn stop(id: &str, generation: usize) -> DemographicEvent {
        DemographicEvent::MigrationStop {
            migration_id: id.into(),
            generation,
        }
    }

    #[test]
    fn test_deserialize_tagged_events() {
        let json = r#"{"type": "migration_start", "from_pop": "pop2", "to_pop": "pop1",
                       "inmigrant_rate": 0.1, "num_generation": 2}"#;
        let event: DemographicEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event, start("pop2", "pop1", 0.1, 2));

        let json = r#"{"type": "size_change", "pop": "pop1", "new_size": "inf", "num_generation": 100}"#;
        let event: DemographicEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.generation(), 100);

        let json = r#"{"type": "bottleneck", "pop": "pop1", "num_generation": 3}"#;
        assert!(serde_json::from_str::<DemographicEvent>(json).is_err());
    }

    #[test]
    fn test_events_fire_in_generation_order() {
        let mut pops = pops();
        let mut scheduler = DemographicEventScheduler::new(
            vec![
                ("stop".into(), stop("mig", 20)),
                (
                    "resize".into(),
                    DemographicEvent::SizeChange {
                        pop: "pop1".into(),
                        new_size: PopSize::finite(50).unwrap(),
                        generation: 5,
                    },
                ),
                ("mig".into(), start("pop2", "pop1", 0.1, 2)),
            ],
            &pops,
        )
        .unwrap();
        assert_eq!(scheduler.pending(), 3);
        assert_eq!(scheduler.next_generation(), Some(2));

        assert_eq!(scheduler.apply_due(1, &mut pops).unwrap(), 0);
        assert_eq!(scheduler.apply_due(2, &mut pops).unwrap(), 1);
        assert_eq!(pops[0].immigrations().len(), 1);
        assert_eq!(pops[0].immigrations()[0].source, 1);

        assert_eq!(scheduler.apply_due(10, &mut pops).unwrap(), 1);
        assert_eq!(pops[0].size().get(), Some(50));

        assert_eq!(scheduler.apply_due(20, &mut pops).unwrap(), 1);
        assert!(pops[0].immigrations().is_empty());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(scheduler.apply_due(1000, &mut pops).unwrap(), 0);
    }

    #[test]
    fn test_same_generation_keeps_declaration_order() {
        let mut pops = pops();
        let mut scheduler = DemographicEventScheduler::new(
            vec![
                ("mig".into(), start("pop2", "pop1", 0.2, 3)),
                ("stop".into(), stop("mig", 3)),
            ],
            &pops,
        )
        .unwrap();
        assert_eq!(scheduler.apply_due(3, &mut pops).unwrap(), 2);
        assert!(pops[0].immigrations().is_empty());
    }

    #[test]
    fn test_rejects_invalid_events() {
        let pops = pops();
        let build = |events: Vec<(&str, DemographicEvent)>| {
            DemographicEventScheduler::new(
                events.into_iter().map(|(id, e)| (id.to_string(), e)).collect(),
                &pops,
            )
        };

        assert!(matches!(
            build(vec![("mig", start("pop3", "pop1", 0.1, 2))]),
            Err(ConfigurationError::UnknownPopulation { .. })
        ));
        assert!(matches!(
            build(vec![("mig", start("pop1", "pop1", 0.1, 2))]),
            Err(ConfigurationError::SelfMigration(_))
        ));
        assert!(matches!(
            build(vec![("mig", start("pop2", "pop1", 1.5, 2))]),
            Err(ConfigurationError::InvalidParameter { .. })
        ));
        assert!(matches!(
            build(vec![("stop", stop("nope", 2))]),
            Err(ConfigurationError::UnknownMigration { .. })
        ));
        assert!(matches!(
            build(vec![
                ("mig", start("pop2", "pop1", 0.1, 10)),
                ("stop", stop("mig", 5)),
            ]),
            Err(ConfigurationError::StopBeforeStart { start: 10, stop: 5, .. })
        ));
        assert!(matches!(
            build(vec![
                ("stop", stop("mig", 4)),
                ("mig", start("pop2", "pop1", 0.1, 4)),
            ]),
            Err(ConfigurationError::StopBeforeStart { .. })
        ));
        assert!(matches!(
            build(vec![
                ("mig", start("pop2", "pop1", 0.1, 2)),
                ("mig", start("pop1", "pop2", 0.1, 2)),
            ]),
            Err(ConfigurationError::DuplicateEvent(_))
        ));
    }

    #[test]
    fn test_firing_time_errors() {
        let mut pops = pops();
        let mut scheduler = DemographicEventScheduler::new(
            vec![
                ("m1".into(), start("pop2", "pop1", 0.7, 2)),
                ("m2".into(), start("pop2", "pop1", 0.5, 3)),
            ],
            &pops,
        )
        .unwrap();
        scheduler.apply_due(2, &mut pops).unwrap();
        assert!(matches!(
            scheduler.apply_due(3, &mut pops),
            Err(ConfigurationError::ExcessImmigration { .. })
        ));

        let mut pops = self::pops();
        let mut scheduler = DemographicEventScheduler::new(
            vec![
                ("m1".into(), start("pop2", "pop1", 0.1, 2)),
                ("s1".into(), stop("m1", 3)),
                ("s2".into(), stop("m1", 4)),
            ],
            &pops,
        )
        .unwrap();
        scheduler.apply_due(3, &mut pops).unwrap();
        assert_eq!(
            scheduler.apply_due(4, &mut pops),
            Err(ConfigurationError::MigrationNotActive {
                migration: "m1".into()
            })
        );
    }
}

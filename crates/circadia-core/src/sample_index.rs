//! Per-minute lookup over the loaded dataset.
//!
//! The index is built once from the full, immutable sample set. It
//! derives the time bounds and the subject registry, and answers
//! `lookup(time)` with every sample recorded at exactly that minute.
//! Construction is where a malformed dataset is rejected: an empty set
//! leaves the clock without bounds, so the core refuses to start.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use circadia_types::{EntityId, Minute, Sample, Sex};
use tracing::debug;

/// Errors that can occur when building a [`SampleIndex`].
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// The dataset contains no samples.
    #[error("dataset is empty: no samples to derive time bounds or subjects from")]
    Empty,

    /// A sample carries a value outside its domain.
    #[error("invalid sample for {id} at minute {time}: {reason}")]
    InvalidSample {
        /// Subject of the offending sample.
        id: EntityId,
        /// Minute of the offending sample.
        time: Minute,
        /// What is wrong with it.
        reason: String,
    },

    /// The same subject is recorded twice at the same minute.
    #[error("duplicate sample for {id} at minute {time}")]
    Duplicate {
        /// Subject of the duplicated sample.
        id: EntityId,
        /// Minute of the duplicated sample.
        time: Minute,
    },

    /// A subject appears with different sex attributes.
    #[error("subject {id} is recorded with conflicting sex attributes")]
    ConflictingSex {
        /// The inconsistent subject.
        id: EntityId,
    },
}

/// Immutable per-minute index over all samples.
#[derive(Debug, Clone)]
pub struct SampleIndex {
    by_time: BTreeMap<Minute, Vec<Sample>>,
    entities: BTreeMap<EntityId, Sex>,
    min_time: Minute,
    max_time: Minute,
    len: usize,
}

impl SampleIndex {
    /// Build the index, validating every sample.
    ///
    /// Samples at the same minute are ordered by subject identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Empty`] for an empty dataset and the other
    /// variants for malformed samples.
    pub fn new(samples: Vec<Sample>) -> Result<Self, DatasetError> {
        let len = samples.len();
        let mut by_time: BTreeMap<Minute, Vec<Sample>> = BTreeMap::new();
        let mut entities: BTreeMap<EntityId, Sex> = BTreeMap::new();

        for sample in samples {
            validate(&sample)?;
            match entities.entry(sample.id.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(sample.sex);
                }
                Entry::Occupied(slot) => {
                    if *slot.get() != sample.sex {
                        return Err(DatasetError::ConflictingSex { id: sample.id });
                    }
                }
            }
            by_time.entry(sample.time).or_default().push(sample);
        }

        for (time, bucket) in &mut by_time {
            bucket.sort_by(|a, b| a.id.cmp(&b.id));
            let duplicate = bucket.windows(2).find_map(|pair| match pair {
                [a, b] if a.id == b.id => Some(a.id.clone()),
                _ => None,
            });
            if let Some(id) = duplicate {
                return Err(DatasetError::Duplicate { id, time: *time });
            }
        }

        let (Some(min_time), Some(max_time)) = (
            by_time.keys().next().copied(),
            by_time.keys().next_back().copied(),
        ) else {
            return Err(DatasetError::Empty);
        };

        debug!(
            samples = len,
            subjects = entities.len(),
            min_time,
            max_time,
            "Sample index built"
        );

        Ok(Self {
            by_time,
            entities,
            min_time,
            max_time,
            len,
        })
    }

    /// Every sample recorded at exactly `time`, ordered by subject.
    ///
    /// Returns an empty slice for minutes with no data.
    pub fn lookup(&self, time: Minute) -> &[Sample] {
        self.by_time.get(&time).map_or(&[], Vec::as_slice)
    }

    /// The sample for one subject at exactly `time`, if recorded.
    pub fn sample_of(&self, id: &EntityId, time: Minute) -> Option<&Sample> {
        self.lookup(time).iter().find(|s| &s.id == id)
    }

    /// Earliest recorded minute.
    pub const fn min_time(&self) -> Minute {
        self.min_time
    }

    /// Latest recorded minute.
    pub const fn max_time(&self) -> Minute {
        self.max_time
    }

    /// Whether `time` lies within the recorded bounds.
    pub const fn in_range(&self, time: Minute) -> bool {
        time >= self.min_time && time <= self.max_time
    }

    /// The subject registry with each subject's sex.
    pub const fn entities(&self) -> &BTreeMap<EntityId, Sex> {
        &self.entities
    }

    /// Sex of a subject, if the subject exists.
    pub fn sex_of(&self, id: &EntityId) -> Option<Sex> {
        self.entities.get(id).copied()
    }

    /// Whether the subject exists in the dataset.
    pub fn contains(&self, id: &EntityId) -> bool {
        self.entities.contains_key(id)
    }

    /// Total number of samples.
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always `false`: an index cannot be built from an empty dataset.
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn validate(sample: &Sample) -> Result<(), DatasetError> {
    let reason = if !sample.temperature.is_finite() {
        Some("temperature is not a finite number")
    } else if !sample.activity.is_finite() {
        Some("activity is not a finite number")
    } else if sample.activity < 0.0 {
        Some("activity is negative")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(DatasetError::InvalidSample {
            id: sample.id.clone(),
            time: sample.time,
            reason: reason.to_owned(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample(id: &str, sex: Sex, time: Minute, activity: f64) -> Sample {
        Sample {
            id: EntityId::from(id),
            sex,
            time,
            temperature: 36.9,
            activity,
        }
    }

    #[test]
    fn derives_bounds_and_registry() {
        let index = SampleIndex::new(vec![
            sample("m1", Sex::Male, 10, 1.0),
            sample("f1", Sex::Female, 3, 2.0),
            sample("f1", Sex::Female, 10, 3.0),
        ])
        .unwrap();
        assert_eq!(index.min_time(), 3);
        assert_eq!(index.max_time(), 10);
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
        assert_eq!(index.entities().len(), 2);
        assert_eq!(index.sex_of(&EntityId::from("m1")), Some(Sex::Male));
        assert!(index.in_range(3));
        assert!(!index.in_range(11));
    }

    #[test]
    fn lookup_is_exact_and_ordered() {
        let index = SampleIndex::new(vec![
            sample("m1", Sex::Male, 10, 1.0),
            sample("f1", Sex::Female, 10, 3.0),
            sample("f1", Sex::Female, 11, 4.0),
        ])
        .unwrap();
        let at_ten: Vec<&str> = index.lookup(10).iter().map(|s| s.id.as_str()).collect();
        assert_eq!(at_ten, vec!["f1", "m1"]);
        assert_eq!(index.lookup(11).len(), 1);
        assert!(index.lookup(12).is_empty());
        assert!(index.sample_of(&EntityId::from("m1"), 11).is_none());
        assert!(index.sample_of(&EntityId::from("f1"), 11).is_some());
    }

    #[test]
    fn empty_dataset_fails_fast() {
        assert!(matches!(SampleIndex::new(Vec::new()), Err(DatasetError::Empty)));
    }

    #[test]
    fn rejects_negative_activity() {
        let result = SampleIndex::new(vec![sample("f1", Sex::Female, 0, -1.0)]);
        assert!(matches!(result, Err(DatasetError::InvalidSample { .. })));
    }

    #[test]
    fn rejects_non_finite_temperature() {
        let mut bad = sample("f1", Sex::Female, 0, 1.0);
        bad.temperature = f64::NAN;
        assert!(SampleIndex::new(vec![bad]).is_err());
    }

    #[test]
    fn rejects_duplicate_minute() {
        let result = SampleIndex::new(vec![
            sample("f1", Sex::Female, 4, 1.0),
            sample("f1", Sex::Female, 4, 2.0),
        ]);
        assert!(matches!(result, Err(DatasetError::Duplicate { time: 4, .. })));
    }

    #[test]
    fn rejects_conflicting_sex() {
        let result = SampleIndex::new(vec![
            sample("x", Sex::Female, 0, 1.0),
            sample("x", Sex::Male, 1, 1.0),
        ]);
        assert!(matches!(result, Err(DatasetError::ConflictingSex { .. })));
    }
}

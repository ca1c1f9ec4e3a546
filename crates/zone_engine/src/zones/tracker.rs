//! Multi-volume overlap bookkeeping
//!
//! Physics reports overlaps per collider, but zones reason about logical
//! objects. An object with three colliders entering a trigger produces three
//! enter notifications; the tracker folds them into a single record and only
//! reports the object as gone once its last volume has left.
//!
//! Generic over the identity type so it can be driven by the built-in
//! [`World`](crate::ecs::World) or by any other host.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::hash::Hash;

/// Requirements for object and volume identities
///
/// Identities compare by reference equality (a handle, not a value), which
/// generational keys such as [`Entity`](crate::ecs::Entity) provide.
pub trait TrackedIdentity: Copy + Eq + Hash + Ord + Debug {}

impl<T: Copy + Eq + Hash + Ord + Debug> TrackedIdentity for T {}

/// Maps raw volumes to the logical objects owning them
pub trait VolumeResolver<T, V> {
    /// Object owning a volume, or `None` when the volume is not part of a
    /// trackable object
    fn resolve_owner(&self, volume: V) -> Option<T>;

    /// Whether the object still exists and is enabled
    fn is_object_valid(&self, object: T) -> bool;

    /// Whether the volume still exists and is enabled
    fn is_volume_valid(&self, volume: V) -> bool;
}

/// Result of [`OverlapTracker::try_add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome<T> {
    /// First volume of this object; a record was created
    NewObject(T),
    /// The object was already tracked
    ExistingObjectNewVolume(T),
    /// The volume does not belong to a trackable object
    NotRelevant,
}

/// Result of [`OverlapTracker::try_remove`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome<T> {
    /// The volume was not tracked
    NotFound,
    /// The object still has other volumes inside
    StillPresent(T),
    /// That was the object's last volume; the record is gone
    FullyRemoved(T),
}

/// What a [`OverlapTracker::validate`] sweep cleaned up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary<T> {
    /// Objects whose records were discarded, in identity order
    pub removed_objects: Vec<T>,
    /// Number of dead volumes dropped across all records
    pub removed_volumes: usize,
}

impl<T> ValidationSummary<T> {
    /// Whether the sweep changed anything
    pub fn is_empty(&self) -> bool {
        self.removed_objects.is_empty() && self.removed_volumes == 0
    }
}

impl<T> Default for ValidationSummary<T> {
    fn default() -> Self {
        Self {
            removed_objects: Vec::new(),
            removed_volumes: 0,
        }
    }
}

/// Overlap state of one logical object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapRecord<T, V> {
    /// The tracked object
    pub object: T,
    /// Volumes of the object currently inside, without duplicates
    pub volumes: Vec<V>,
}

impl<T, V> OverlapRecord<T, V> {
    /// Number of the object's volumes currently inside
    pub fn collider_count(&self) -> usize {
        self.volumes.len()
    }
}

/// Folds per-volume enter/exit notifications into per-object records
#[derive(Debug, Clone)]
pub struct OverlapTracker<T: TrackedIdentity, V: TrackedIdentity> {
    records: BTreeMap<T, OverlapRecord<T, V>>,
    owners: HashMap<V, T>,
}

impl<T: TrackedIdentity, V: TrackedIdentity> OverlapTracker<T, V> {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            owners: HashMap::new(),
        }
    }

    /// Register a volume entering
    ///
    /// Adding a volume that is already listed changes nothing and still
    /// reports [`AddOutcome::ExistingObjectNewVolume`].
    pub fn try_add<R>(&mut self, volume: V, resolver: &R) -> AddOutcome<T>
    where
        R: VolumeResolver<T, V> + ?Sized,
    {
        if let Some(&object) = self.owners.get(&volume) {
            return AddOutcome::ExistingObjectNewVolume(object);
        }

        let Some(object) = resolver.resolve_owner(volume) else {
            return AddOutcome::NotRelevant;
        };

        self.owners.insert(volume, object);
        match self.records.get_mut(&object) {
            Some(record) => {
                record.volumes.push(volume);
                AddOutcome::ExistingObjectNewVolume(object)
            }
            None => {
                self.records.insert(
                    object,
                    OverlapRecord {
                        object,
                        volumes: vec![volume],
                    },
                );
                AddOutcome::NewObject(object)
            }
        }
    }

    /// Register a volume leaving
    pub fn try_remove(&mut self, volume: V) -> RemoveOutcome<T> {
        let Some(object) = self.owners.remove(&volume) else {
            return RemoveOutcome::NotFound;
        };

        let Some(record) = self.records.get_mut(&object) else {
            log::error!("Volume {:?} was indexed to untracked object {:?}", volume, object);
            return RemoveOutcome::NotFound;
        };

        record.volumes.retain(|v| *v != volume);
        if record.volumes.is_empty() {
            self.records.remove(&object);
            RemoveOutcome::FullyRemoved(object)
        } else {
            RemoveOutcome::StillPresent(object)
        }
    }

    /// Track an object that has no volume inside yet
    ///
    /// Used when an object is attached programmatically. Returns false when
    /// the object was already tracked.
    pub fn track(&mut self, object: T) -> bool {
        if self.records.contains_key(&object) {
            return false;
        }
        self.records.insert(
            object,
            OverlapRecord {
                object,
                volumes: Vec::new(),
            },
        );
        true
    }

    /// Drop an object's record along with all of its volumes
    pub fn remove_object(&mut self, object: T) -> Option<OverlapRecord<T, V>> {
        let record = self.records.remove(&object)?;
        for volume in &record.volumes {
            self.owners.remove(volume);
        }
        Some(record)
    }

    /// Sweep out stale records and volumes
    ///
    /// Records whose object is no longer valid are always discarded. With
    /// `collider_check` dead volumes are dropped from each record, and a
    /// record left without volumes is discarded too. With
    /// `require_count_change` a record is only discarded for having no
    /// volumes if this sweep is what emptied it; a record that was already
    /// empty is kept.
    pub fn validate<R>(&mut self, resolver: &R, collider_check: bool, require_count_change: bool) -> ValidationSummary<T>
    where
        R: VolumeResolver<T, V> + ?Sized,
    {
        self.validate_with(resolver, collider_check, |_| require_count_change)
    }

    /// [`validate`](Self::validate) with `require_count_change` decided per
    /// object
    pub fn validate_with<R, F>(&mut self, resolver: &R, collider_check: bool, require_count_change: F) -> ValidationSummary<T>
    where
        R: VolumeResolver<T, V> + ?Sized,
        F: Fn(T) -> bool,
    {
        let mut summary = ValidationSummary::default();
        let mut discarded = Vec::new();

        for (object, record) in &mut self.records {
            if !resolver.is_object_valid(*object) {
                discarded.push(*object);
                continue;
            }

            if !collider_check {
                continue;
            }

            let before = record.volumes.len();
            let owners = &mut self.owners;
            record.volumes.retain(|volume| {
                let alive = resolver.is_volume_valid(*volume);
                if !alive {
                    owners.remove(volume);
                }
                alive
            });
            let dropped = before - record.volumes.len();
            summary.removed_volumes += dropped;

            if record.volumes.is_empty() && !(dropped == 0 && require_count_change(*object)) {
                discarded.push(*object);
            }
        }

        for object in discarded {
            if let Some(record) = self.remove_object(object) {
                summary.removed_volumes += record.volumes.len();
                summary.removed_objects.push(object);
            }
        }

        if !summary.is_empty() {
            log::debug!(
                "Overlap validation removed {} objects and {} volumes",
                summary.removed_objects.len(),
                summary.removed_volumes
            );
        }
        summary
    }

    /// All tracked objects in identity order
    pub fn get_all(&self) -> Vec<T> {
        self.records.keys().copied().collect()
    }

    /// Record for an object
    pub fn record(&self, object: T) -> Option<&OverlapRecord<T, V>> {
        self.records.get(&object)
    }

    /// Number of the object's volumes inside (0 when untracked)
    pub fn collider_count(&self, object: T) -> usize {
        self.records.get(&object).map_or(0, OverlapRecord::collider_count)
    }

    /// Whether the object is tracked
    pub fn contains(&self, object: T) -> bool {
        self.records.contains_key(&object)
    }

    /// Object a tracked volume belongs to
    pub fn owner_of(&self, volume: V) -> Option<T> {
        self.owners.get(&volume).copied()
    }

    /// Number of tracked objects
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is tracked
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.records.clear();
        self.owners.clear();
    }
}

impl<T: TrackedIdentity, V: TrackedIdentity> Default for OverlapTracker<T, V> {
    fn default() -> Self {
        Self::new()
    }
}

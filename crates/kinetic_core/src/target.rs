//! Animation targets
//!
//! An [`AnimationTarget`] pairs an opaque element handle with the current value
//! of each property written to it. Writers never mutate targets directly during
//! a frame: they push into a [`WriteBatch`], which collapses repeated writes to
//! the same property (last writer wins) and commits once per frame.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::host::PropertySink;
use crate::property::{Property, PropertyValue};

/// Opaque handle to a renderable element owned by the host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl From<u64> for ElementId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Current property values of one element
#[derive(Clone, Debug)]
pub struct AnimationTarget {
    element: ElementId,
    properties: IndexMap<Property, PropertyValue>,
    /// Value each property had before its first animated write
    originals: IndexMap<Property, PropertyValue>,
}

impl AnimationTarget {
    fn new(element: ElementId) -> Self {
        Self {
            element,
            properties: IndexMap::new(),
            originals: IndexMap::new(),
        }
    }

    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Current value, falling back to the property's default
    pub fn get(&self, property: &Property) -> PropertyValue {
        self.properties
            .get(property)
            .copied()
            .unwrap_or_else(|| property.default_value())
    }

    /// Current value as a scalar, if the property holds one
    pub fn float(&self, property: &Property) -> Option<f32> {
        self.get(property).as_float()
    }

    pub fn properties(&self) -> impl Iterator<Item = (&Property, &PropertyValue)> {
        self.properties.iter()
    }

    pub fn originals(&self) -> impl Iterator<Item = (&Property, &PropertyValue)> {
        self.originals.iter()
    }
}

/// All targets touched within one animation scope
#[derive(Default, Debug)]
pub struct TargetStore {
    targets: FxHashMap<ElementId, AnimationTarget>,
}

impl TargetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self, element: ElementId) -> Option<&AnimationTarget> {
        self.targets.get(&element)
    }

    /// Current value of a property (default if never written)
    pub fn value(&self, element: ElementId, property: &Property) -> PropertyValue {
        self.targets
            .get(&element)
            .map(|t| t.get(property))
            .unwrap_or_else(|| property.default_value())
    }

    /// Declare the value a property has before animation (e.g. from a stylesheet)
    pub fn seed(&mut self, element: ElementId, property: Property, value: PropertyValue) {
        let target = self
            .targets
            .entry(element)
            .or_insert_with(|| AnimationTarget::new(element));
        target.properties.insert(property, value);
    }

    /// Record an animated write, remembering the pre-animation value on first write
    pub fn set(&mut self, element: ElementId, property: Property, value: PropertyValue) {
        let target = self
            .targets
            .entry(element)
            .or_insert_with(|| AnimationTarget::new(element));
        if !target.originals.contains_key(&property) {
            let original = target.get(&property);
            target.originals.insert(property.clone(), original);
        }
        target.properties.insert(property, value);
    }

    /// Every (element, property, pre-animation value) written in this store
    pub fn originals(&self) -> Vec<(ElementId, Property, PropertyValue)> {
        let mut out: Vec<_> = self
            .targets
            .values()
            .flat_map(|t| {
                t.originals
                    .iter()
                    .map(move |(p, v)| (t.element, p.clone(), *v))
            })
            .collect();
        out.sort_by_key(|(element, _, _)| *element);
        out
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }
}

/// Property writes collected during one frame
///
/// Each `(element, property)` slot holds at most one pending value. A later push
/// to the same slot replaces the earlier one, so the committing frame performs at
/// most one write per target property. `W` tags the writer so commit can skip
/// writers that went away after the value was computed.
#[derive(Debug)]
pub struct WriteBatch<W> {
    writes: IndexMap<(ElementId, Property), (PropertyValue, W)>,
}

impl<W> Default for WriteBatch<W> {
    fn default() -> Self {
        Self {
            writes: IndexMap::new(),
        }
    }
}

impl<W> WriteBatch<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: ElementId, property: Property, value: PropertyValue, writer: W) {
        self.writes.insert((element, property), (value, writer));
    }

    /// Move all pending writes of `other` under this batch's newer ones
    pub fn merge_older(&mut self, other: WriteBatch<W>) {
        let newer = std::mem::replace(&mut self.writes, other.writes);
        self.writes.extend(newer);
    }

    pub fn get(&self, element: ElementId, property: &Property) -> Option<&PropertyValue> {
        self.writes
            .get(&(element, property.clone()))
            .map(|(value, _)| value)
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Apply every write whose writer is still live; returns the number applied
    pub fn commit<S, F>(self, store: &mut TargetStore, sink: &S, is_live: F) -> usize
    where
        S: PropertySink + ?Sized,
        F: Fn(&W) -> bool,
    {
        let mut applied = 0;
        for ((element, property), (value, writer)) in self.writes {
            if !is_live(&writer) {
                continue;
            }
            sink.apply(element, &property, &value);
            store.set(element, property, value);
            applied += 1;
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        writes: RefCell<Vec<(ElementId, Property, PropertyValue)>>,
    }

    impl PropertySink for RecordingSink {
        fn apply(&self, element: ElementId, property: &Property, value: &PropertyValue) {
            self.writes
                .borrow_mut()
                .push((element, property.clone(), *value));
        }
    }

    #[test]
    fn test_store_remembers_originals() {
        let el = ElementId::new(1);
        let mut store = TargetStore::new();
        store.seed(el, Property::Opacity, PropertyValue::Float(0.5));
        store.set(el, Property::Opacity, PropertyValue::Float(0.8));
        store.set(el, Property::Opacity, PropertyValue::Float(1.0));

        assert_eq!(store.value(el, &Property::Opacity), PropertyValue::Float(1.0));
        assert_eq!(
            store.originals(),
            vec![(el, Property::Opacity, PropertyValue::Float(0.5))]
        );
    }

    #[test]
    fn test_unwritten_property_uses_default() {
        let store = TargetStore::new();
        let el = ElementId::new(9);
        assert_eq!(store.value(el, &Property::Scale), PropertyValue::Float(1.0));
        assert!(store.target(el).is_none());
    }

    #[test]
    fn test_batch_last_writer_wins() {
        let el = ElementId::new(1);
        let mut batch = WriteBatch::new();
        batch.push(el, Property::TranslateY, 10.0_f32.into(), "a");
        batch.push(el, Property::TranslateY, 20.0_f32.into(), "b");
        assert_eq!(batch.len(), 1);

        let sink = RecordingSink::default();
        let mut store = TargetStore::new();
        assert_eq!(batch.commit(&mut store, &sink, |_| true), 1);
        assert_eq!(
            sink.writes.borrow().as_slice(),
            &[(el, Property::TranslateY, PropertyValue::Float(20.0))]
        );
    }

    #[test]
    fn test_batch_skips_dead_writers() {
        let el = ElementId::new(1);
        let mut batch = WriteBatch::new();
        batch.push(el, Property::Opacity, 0.0_f32.into(), false);
        batch.push(el, Property::Scale, 2.0_f32.into(), true);

        let sink = RecordingSink::default();
        let mut store = TargetStore::new();
        assert_eq!(batch.commit(&mut store, &sink, |live| *live), 1);
        assert_eq!(store.value(el, &Property::Opacity), PropertyValue::Float(1.0));
        assert_eq!(store.value(el, &Property::Scale), PropertyValue::Float(2.0));
    }

    #[test]
    fn test_merge_keeps_newer_writes() {
        let el = ElementId::new(1);
        let mut older = WriteBatch::new();
        older.push(el, Property::Opacity, 0.1_f32.into(), ());
        older.push(el, Property::Scale, 0.5_f32.into(), ());

        let mut newer = WriteBatch::new();
        newer.push(el, Property::Opacity, 0.9_f32.into(), ());
        newer.merge_older(older);

        assert_eq!(newer.len(), 2);
        assert_eq!(newer.get(el, &Property::Opacity), Some(&PropertyValue::Float(0.9)));
        assert_eq!(newer.get(el, &Property::Scale), Some(&PropertyValue::Float(0.5)));
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve storage and selection.

use crate::error::{CommandError, Result};
use animtools_curve::{CurveId, KeyframeCurve, ObjectId};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Source of curves and of the current selection
pub trait CurveProvider {
    /// Curves selected by the user, possibly with duplicates
    fn selection(&self) -> Vec<CurveId>;

    /// Curves of the highlighted attributes only
    fn selected_attributes(&self) -> Vec<CurveId> {
        self.selection()
    }

    /// Get a curve
    fn curve(&self, id: CurveId) -> Option<&KeyframeCurve>;

    /// Get a mutable curve
    fn curve_mut(&mut self, id: CurveId) -> Option<&mut KeyframeCurve>;

    /// Replace a curve with the same id, returning the old one
    fn replace(&mut self, curve: KeyframeCurve) -> Option<KeyframeCurve>;
}

/// De-duplicate `ids` keeping the first occurrence of each
pub fn dedup_curves(ids: impl IntoIterator<Item = CurveId>) -> Vec<CurveId> {
    ids.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}

/// Resolve the selection to distinct, existing curves
pub fn resolve_curves(provider: &dyn CurveProvider) -> Result<Vec<CurveId>> {
    resolve_ids(provider, provider.selection())
}

/// Resolve `ids` to distinct, existing curves
pub fn resolve_ids(provider: &dyn CurveProvider, ids: Vec<CurveId>) -> Result<Vec<CurveId>> {
    let curves = dedup_curves(ids);
    if curves.is_empty() {
        return Err(CommandError::EmptySelection);
    }
    if let Some(missing) = curves.iter().find(|id| provider.curve(**id).is_none()) {
        return Err(CommandError::CurveNotFound(*missing));
    }
    Ok(curves)
}

/// In-memory curve store
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurveSet {
    /// Curves by id, in insertion order
    curves: IndexMap<CurveId, KeyframeCurve>,
    /// Selected curves
    selection: Vec<CurveId>,
    /// Highlighted attribute curves
    attribute_selection: Option<Vec<CurveId>>,
}

impl CurveSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a curve
    pub fn add_curve(&mut self, curve: KeyframeCurve) -> CurveId {
        let id = curve.id;
        self.curves.insert(id, curve);
        id
    }

    /// Remove a curve
    pub fn remove_curve(&mut self, id: CurveId) -> Option<KeyframeCurve> {
        self.selection.retain(|s| *s != id);
        if let Some(attributes) = &mut self.attribute_selection {
            attributes.retain(|s| *s != id);
        }
        self.curves.shift_remove(&id)
    }

    /// Get all curves
    pub fn curves(&self) -> impl Iterator<Item = &KeyframeCurve> {
        self.curves.values()
    }

    /// Get curve count
    pub fn len(&self) -> usize {
        self.curves.len()
    }

    /// Check if there are no curves
    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Curves bound to `object`
    pub fn curves_of(&self, object: ObjectId) -> Vec<CurveId> {
        self.curves
            .values()
            .filter(|c| c.binding.as_ref().is_some_and(|b| b.object == object))
            .map(|c| c.id)
            .collect()
    }

    /// Set the selection
    pub fn select(&mut self, ids: impl IntoIterator<Item = CurveId>) {
        self.selection = ids.into_iter().collect();
    }

    /// Select every curve bound to `object`, after the current selection
    pub fn select_object(&mut self, object: ObjectId) {
        let ids = self.curves_of(object);
        self.selection.extend(ids);
    }

    /// Select every curve
    pub fn select_all(&mut self) {
        self.selection = self.curves.keys().copied().collect();
    }

    /// Highlight attribute curves; `None` clears the highlight
    pub fn select_attributes(&mut self, ids: Option<Vec<CurveId>>) {
        self.attribute_selection = ids;
    }
}

impl CurveProvider for CurveSet {
    fn selection(&self) -> Vec<CurveId> {
        self.selection.clone()
    }

    fn selected_attributes(&self) -> Vec<CurveId> {
        self.attribute_selection
            .clone()
            .unwrap_or_else(|| self.selection.clone())
    }

    fn curve(&self, id: CurveId) -> Option<&KeyframeCurve> {
        self.curves.get(&id)
    }

    fn curve_mut(&mut self, id: CurveId) -> Option<&mut KeyframeCurve> {
        self.curves.get_mut(&id)
    }

    fn replace(&mut self, curve: KeyframeCurve) -> Option<KeyframeCurve> {
        self.curves.insert(curve.id, curve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use animtools_curve::{CurveBinding, CurveKind};

    fn curve(name: &str) -> KeyframeCurve {
        KeyframeCurve::from_points(name, CurveKind::Scalar, &[(0.0, 0.0), (10.0, 1.0)]).unwrap()
    }

    #[test]
    fn test_resolve_dedups_in_order() {
        let mut set = CurveSet::new();
        let a = set.add_curve(curve("a"));
        let b = set.add_curve(curve("b"));
        set.select([b, a, b, a]);

        assert_eq!(resolve_curves(&set).unwrap(), vec![b, a]);
    }

    #[test]
    fn test_resolve_empty_and_missing() {
        let mut set = CurveSet::new();
        assert!(matches!(resolve_curves(&set), Err(CommandError::EmptySelection)));

        let ghost = CurveId::new();
        set.select([ghost]);
        assert!(matches!(resolve_curves(&set), Err(CommandError::CurveNotFound(id)) if id == ghost));
    }

    #[test]
    fn test_select_object() {
        let mut set = CurveSet::new();
        let object = ObjectId::new();
        let tx = set.add_curve(curve("tx").with_binding(CurveBinding::new(object, "translateX")));
        let _other = set.add_curve(curve("other"));
        let ty = set.add_curve(curve("ty").with_binding(CurveBinding::new(object, "translateY")));

        set.select_object(object);
        assert_eq!(set.selection(), vec![tx, ty]);
        assert_eq!(set.selected_attributes(), vec![tx, ty]);

        set.select_attributes(Some(vec![ty]));
        assert_eq!(set.selected_attributes(), vec![ty]);
    }

    #[test]
    fn test_replace_and_remove() {
        let mut set = CurveSet::new();
        let id = set.add_curve(curve("a"));
        set.select([id]);

        let mut edited = set.curve(id).unwrap().clone();
        edited.set_value(0, 5.0).unwrap();
        assert!(set.replace(edited).is_some());
        assert_eq!(set.curve(id).unwrap().value(0).unwrap(), 5.0);

        assert!(set.remove_curve(id).is_some());
        assert!(set.selection().is_empty());
        assert!(set.is_empty());
    }
}

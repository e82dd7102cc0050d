// SPDX-License-Identifier: MIT OR Apache-2.0
//! Handling of curves whose computation fails inside a batch.

use crate::error::{CommandError, Result};
use crate::provider::CurveProvider;
use animtools_curve::{CurveError, CurveId, KeyframeCurve, ObjectId};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// What to do when one curve of a batch cannot be processed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Default)]
pub enum InvalidAttrPolicy {
    /// Abort the whole batch
    #[default]
    FailAll,
    /// Drop every curve of the failing curve's object
    SkipObject,
    /// Drop only the failing curve
    SkipAttribute,
}

impl InvalidAttrPolicy {
    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::FailAll => "Fail All",
            Self::SkipObject => "Skip Object",
            Self::SkipAttribute => "Skip Attribute",
        }
    }
}

/// A curve left out of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct Skipped {
    /// Skipped curve
    pub curve: CurveId,
    /// Owning object of the curve
    pub object: Option<ObjectId>,
    /// Error of this curve, `None` when skipped because of another curve
    pub reason: Option<CurveError>,
}

/// A computed value waiting to be applied
#[derive(Debug, Clone, PartialEq)]
pub struct Planned<T> {
    /// Target curve
    pub curve: CurveId,
    /// Owning object of the curve
    pub object: Option<ObjectId>,
    /// Computed value
    pub value: T,
}

/// Surviving plans and skipped curves of a batch
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyOutcome<T> {
    /// Plans to apply, in curve order
    pub planned: Vec<Planned<T>>,
    /// Curves left out
    pub skipped: Vec<Skipped>,
}

/// Compute `plan` for every curve, applying `policy` to failures.
///
/// Nothing is mutated, so a failed batch leaves every curve untouched.
pub fn plan_with_policy<T>(
    provider: &dyn CurveProvider,
    curves: &[CurveId],
    policy: InvalidAttrPolicy,
    mut plan: impl FnMut(&KeyframeCurve) -> animtools_curve::Result<T>,
) -> Result<PolicyOutcome<T>> {
    let mut outcome = PolicyOutcome {
        planned: Vec::with_capacity(curves.len()),
        skipped: Vec::new(),
    };
    let mut failed_objects: IndexSet<ObjectId> = IndexSet::new();

    for &id in curves {
        let curve = provider.curve(id).ok_or(CommandError::CurveNotFound(id))?;
        let object = curve.binding.as_ref().map(|b| b.object);

        if object.is_some_and(|o| failed_objects.contains(&o)) {
            tracing::info!(curve = %curve.name, "Skipping curve of failed object");
            outcome.skipped.push(Skipped {
                curve: id,
                object,
                reason: None,
            });
            continue;
        }

        let error = match plan(curve) {
            Ok(value) => {
                outcome.planned.push(Planned {
                    curve: id,
                    object,
                    value,
                });
                continue;
            }
            Err(error) => error,
        };

        match policy {
            InvalidAttrPolicy::FailAll => {
                tracing::error!(curve = %curve.name, %error, "Batch aborted");
                return Err(CommandError::curve(id, error));
            }
            InvalidAttrPolicy::SkipAttribute => {
                tracing::warn!(curve = %curve.name, %error, "Skipping curve");
            }
            InvalidAttrPolicy::SkipObject => {
                tracing::warn!(curve = %curve.name, %error, "Skipping object");
                if let Some(object) = object {
                    failed_objects.insert(object);
                    let (dropped, kept) = std::mem::take(&mut outcome.planned)
                        .into_iter()
                        .partition(|p| p.object == Some(object));
                    outcome.planned = kept;
                    outcome.skipped.extend(dropped.into_iter().map(|p: Planned<T>| Skipped {
                        curve: p.curve,
                        object: p.object,
                        reason: None,
                    }));
                }
            }
        }
        outcome.skipped.push(Skipped {
            curve: id,
            object,
            reason: Some(error),
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::CurveSet;
    use animtools_curve::{CurveBinding, CurveKind, ErrorKind};

    struct Fixture {
        set: CurveSet,
        object_a: [CurveId; 3],
        object_b: CurveId,
    }

    /// Object A has a curve without a key after frame 10 in the middle.
    fn fixture() -> Fixture {
        let mut set = CurveSet::new();
        let a = ObjectId::new();
        let b = ObjectId::new();
        let long = [(0.0, 0.0), (20.0, 1.0)];
        let short = [(0.0, 0.0), (5.0, 1.0)];
        let mut add = |name: &str, object: ObjectId, points: &[(f64, f64)]| {
            set.add_curve(
                KeyframeCurve::from_points(name, CurveKind::Scalar, points)
                    .unwrap()
                    .with_binding(CurveBinding::new(object, name)),
            )
        };
        let a0 = add("tx", a, &long);
        let a1 = add("ty", a, &short);
        let a2 = add("tz", a, &long);
        let b0 = add("rx", b, &long);
        Fixture {
            set,
            object_a: [a0, a1, a2],
            object_b: b0,
        }
    }

    fn value_at_10(curve: &KeyframeCurve) -> animtools_curve::Result<f64> {
        let next = curve
            .times()
            .position(|t| t > 10.0)
            .ok_or(CurveError::NoKeyAfterTarget { time: 10.0 })?;
        curve.value(next)
    }

    fn ids(planned: &[Planned<f64>]) -> Vec<CurveId> {
        planned.iter().map(|p| p.curve).collect()
    }

    #[test]
    fn test_fail_all() {
        let f = fixture();
        let curves = [f.object_a[0], f.object_a[1], f.object_b];
        let err = plan_with_policy(&f.set, &curves, InvalidAttrPolicy::FailAll, value_at_10).unwrap_err();

        assert!(matches!(err, CommandError::Curve { curve, .. } if curve == f.object_a[1]));
        assert_eq!(err.curve_error().unwrap().kind(), ErrorKind::NoKeyAfterTarget);
    }

    #[test]
    fn test_skip_attribute() {
        let f = fixture();
        let curves = [f.object_a[0], f.object_a[1], f.object_a[2], f.object_b];
        let outcome = plan_with_policy(&f.set, &curves, InvalidAttrPolicy::SkipAttribute, value_at_10).unwrap();

        assert_eq!(ids(&outcome.planned), vec![f.object_a[0], f.object_a[2], f.object_b]);
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.skipped[0].reason.is_some());
    }

    #[test]
    fn test_skip_object() {
        let f = fixture();
        let curves = [f.object_a[0], f.object_a[1], f.object_a[2], f.object_b];
        let outcome = plan_with_policy(&f.set, &curves, InvalidAttrPolicy::SkipObject, value_at_10).unwrap();

        assert_eq!(ids(&outcome.planned), vec![f.object_b]);
        let skipped: Vec<_> = outcome.skipped.iter().map(|s| s.curve).collect();
        assert_eq!(skipped, vec![f.object_a[0], f.object_a[1], f.object_a[2]]);
        assert!(outcome.skipped[1].reason.is_some());
        assert!(outcome.skipped[2].reason.is_none());
    }
}

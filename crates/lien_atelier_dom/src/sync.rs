//! The synchronizer.
//!
//! A sync runs passes over every registered binding until one pass changes
//! nothing, capped at [`MAX_PASSES`]. Each binding step compares the model
//! value with the last value seen; a model change is pushed to the element,
//! otherwise an element edit is pushed to the model.

use lien_carton::value::{loose_eq, structural_eq};
use lien_carton::Value;
use serde::Serialize;

use crate::binder::Binder;
use crate::binding::{read_element, write_element, Binding, BindingId, BindingKind};
use crate::error::BindError;
use crate::host::Host;

/// Upper bound on passes per sync. Bindings still diverging after it are
/// left for the next sync.
pub const MAX_PASSES: usize = 10;

/// Outcome of one [`Binder::sync`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Passes run, the final quiet pass included
    pub passes: usize,
    /// Binding steps that propagated a value
    pub propagations: usize,
    /// Whether the last pass changed nothing
    pub converged: bool,
}

impl Binder {
    /// Synchronize every binding.
    ///
    /// An evaluation or host error aborts the running pass; values already
    /// propagated stay propagated.
    pub fn sync<H: Host>(&mut self, host: &mut H) -> Result<SyncReport, BindError> {
        let mut report = SyncReport::default();
        while report.passes < MAX_PASSES {
            report.passes += 1;
            let mut changed = 0;
            for id in self.registry.snapshot() {
                if self.sync_binding(host, id)? {
                    changed += 1;
                }
            }
            tracing::trace!(pass = report.passes, changed, "sync pass");
            report.propagations += changed;
            if changed == 0 {
                report.converged = true;
                break;
            }
        }
        if !report.converged {
            tracing::warn!(
                passes = report.passes,
                bindings = self.registry.len(),
                "bindings did not converge"
            );
        }
        Ok(report)
    }

    /// Run one binding step. A binding removed earlier in the pass is
    /// skipped.
    pub(crate) fn sync_binding<H: Host>(
        &mut self,
        host: &mut H,
        id: BindingId,
    ) -> Result<bool, BindError> {
        let Some(mut binding) = self.registry.take(id) else {
            return Ok(false);
        };
        let result = self.step(host, &mut binding);
        self.registry.restore(binding);
        result
    }

    fn step<H: Host>(&mut self, host: &mut H, binding: &mut Binding) -> Result<bool, BindError> {
        let model = binding.getter.get(&self.eval_context(binding.scope))?;
        match &mut binding.kind {
            BindingKind::Element(target) => {
                if !structural_eq(&model, &binding.last_value) {
                    write_element(host, &binding.element, target, &model)?;
                    binding.last_value = model;
                    return Ok(true);
                }
                let Some(setter) = &binding.setter else {
                    return Ok(false);
                };
                let current = read_element(host, &binding.element, target)?;
                if loose_eq(&current, &binding.last_value) {
                    return Ok(false);
                }
                setter.set(&mut self.scopes, binding.scope, current.clone())?;
                binding.last_value = current;
                Ok(true)
            }
            BindingKind::Repeat(state) => {
                // Both directions, so a collection that lost entries counts
                // as changed
                if same_collection(&model, &binding.last_value) {
                    return Ok(false);
                }
                self.reconcile(host, state, binding.scope, &model)?;
                binding.last_value = model;
                Ok(true)
            }
        }
    }
}

#[inline]
fn same_collection(a: &Value, b: &Value) -> bool {
    structural_eq(a, b) && structural_eq(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_same_collection_notices_removed_keys() {
        let before = json!({"a": 1, "b": 2, "c": 3});
        let after = json!({"a": 1, "c": 3});
        assert!(structural_eq(&after, &before));
        assert!(!same_collection(&after, &before));
        assert!(same_collection(&before, &before.clone()));
    }
}

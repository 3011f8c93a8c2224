//! Per-module check state tracking.
//!
//! Each module moves through Idle -> Dirty -> Checking and back. A
//! signal that lands while a module is being checked re-marks it Dirty
//! once the check finishes, so no change is ever dropped. Transitions
//! happen under one lock, so two checks can never claim the same module.

use std::sync::Mutex;

use specdrift_core::errors::ScheduleError;
use specdrift_core::types::collections::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    Idle,
    Dirty,
    Checking,
    /// Checking, with a change signal received during the check.
    CheckingDirty,
}

/// Shared state table keyed by module name. Modules not present are Idle.
#[derive(Debug, Default)]
pub struct StateTable {
    states: Mutex<FxHashMap<String, ModuleState>>,
}

impl StateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change signal. Returns true when the module became
    /// newly dirty (it was Idle or freshly seen).
    pub fn mark_dirty(&self, module: &str) -> bool {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let state = states
            .entry(module.to_string())
            .or_insert(ModuleState::Idle);
        match *state {
            ModuleState::Idle => {
                *state = ModuleState::Dirty;
                true
            }
            ModuleState::Dirty | ModuleState::CheckingDirty => false,
            ModuleState::Checking => {
                *state = ModuleState::CheckingDirty;
                false
            }
        }
    }

    /// Claim every Dirty module for checking and return the claimed set,
    /// sorted. Modules already Checking stay untouched.
    pub fn begin_check(&self) -> Vec<String> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let mut claimed = Vec::new();
        for (module, state) in states.iter_mut() {
            if *state == ModuleState::Dirty {
                *state = ModuleState::Checking;
                claimed.push(module.clone());
            }
        }
        claimed.sort();
        claimed
    }

    /// Release a module after its check. Returns to Idle, or to Dirty
    /// when a signal arrived mid-check.
    pub fn finish_check(&self, module: &str) -> Result<(), ScheduleError> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let Some(state) = states.get_mut(module) else {
            return Err(ScheduleError::AlreadyChecking {
                module: module.to_string(),
            });
        };
        match *state {
            ModuleState::Checking => {
                *state = ModuleState::Idle;
                Ok(())
            }
            ModuleState::CheckingDirty => {
                *state = ModuleState::Dirty;
                Ok(())
            }
            _ => Err(ScheduleError::AlreadyChecking {
                module: module.to_string(),
            }),
        }
    }

    pub fn state_of(&self, module: &str) -> ModuleState {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states.get(module).copied().unwrap_or(ModuleState::Idle)
    }

    /// True when any module still needs a check.
    pub fn has_dirty(&self) -> bool {
        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        states
            .values()
            .any(|s| matches!(s, ModuleState::Dirty | ModuleState::CheckingDirty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_module_becomes_dirty() {
        let table = StateTable::new();
        assert!(table.mark_dirty("Billing"));
        assert_eq!(table.state_of("Billing"), ModuleState::Dirty);
        // Repeat signals coalesce.
        assert!(!table.mark_dirty("Billing"));
    }

    #[test]
    fn begin_check_claims_only_dirty_modules() {
        let table = StateTable::new();
        table.mark_dirty("Billing");
        table.mark_dirty("Accounts");
        let claimed = table.begin_check();
        assert_eq!(claimed, vec!["Accounts".to_string(), "Billing".to_string()]);
        assert_eq!(table.state_of("Billing"), ModuleState::Checking);
        // Nothing left dirty to claim.
        assert!(table.begin_check().is_empty());
    }

    #[test]
    fn signal_during_check_re_marks_dirty() {
        let table = StateTable::new();
        table.mark_dirty("Billing");
        table.begin_check();
        assert!(!table.mark_dirty("Billing"));
        assert_eq!(table.state_of("Billing"), ModuleState::CheckingDirty);
        table.finish_check("Billing").unwrap();
        assert_eq!(table.state_of("Billing"), ModuleState::Dirty);
    }

    #[test]
    fn quiet_finish_returns_to_idle() {
        let table = StateTable::new();
        table.mark_dirty("Billing");
        table.begin_check();
        table.finish_check("Billing").unwrap();
        assert_eq!(table.state_of("Billing"), ModuleState::Idle);
        assert!(!table.has_dirty());
    }

    #[test]
    fn finishing_an_unclaimed_module_is_an_error() {
        let table = StateTable::new();
        assert!(table.finish_check("Billing").is_err());
    }
}

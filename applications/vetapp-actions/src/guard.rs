use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::ActionError;

/// Refuses a second submission from a control while one is running.
///
/// Soft: it only guards callers that share this instance, and nothing is
/// queued. A refused caller gets [`ActionError::InFlight`] immediately.
#[derive(Debug, Clone, Default)]
pub struct InFlightGuard {
    running: Arc<Mutex<HashSet<String>>>,
}

impl InFlightGuard {
    fn running(&self) -> MutexGuard<'_, HashSet<String>> {
        // the set stays consistent even if a holder panicked
        self.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn enter(&self, control: &str) -> Result<InFlightTicket, ActionError> {
        if !self.running().insert(control.to_owned()) {
            return Err(ActionError::InFlight(control.to_owned()));
        }
        Ok(InFlightTicket {
            guard: self.clone(),
            control: control.to_owned(),
        })
    }

    pub fn is_running(&self, control: &str) -> bool {
        self.running().contains(control)
    }
}

/// Releases its control when dropped.
#[derive(Debug)]
pub struct InFlightTicket {
    guard: InFlightGuard,
    control: String,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.guard.running().remove(&self.control);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_ticket_per_control() {
        let guard = InFlightGuard::default();
        let ticket = guard.enter("vote:0x1").unwrap();
        assert!(matches!(
            guard.enter("vote:0x1"),
            Err(ActionError::InFlight(control)) if control == "vote:0x1"
        ));
        let other = guard.enter("vote:0x2").unwrap();

        drop(ticket);
        assert!(!guard.is_running("vote:0x1"));
        assert!(guard.is_running("vote:0x2"));
        assert!(guard.enter("vote:0x1").is_ok());
        drop(other);
    }
}

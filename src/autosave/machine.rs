//! Per-field autosave state, kept free of DOM and timer concerns so the
//! save semantics are testable natively. One `FieldMachine` per caption
//! field; the component in `mod.rs` drives it from input/blur/timer events.

/// Where the field is in its save lifecycle. `Pending` means an edit has
/// been made and the debounce timer is armed (the timer handle itself lives
/// in the driver).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SavePhase {
    Idle,
    Pending,
    Saving,
    SavedOk,
    SaveFailed,
}

/// Per-field save marker. Changes only on a save outcome; typing does not
/// clear it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Indicator {
    Neutral,
    Success,
    Error,
}

/// A save attempt that has passed the guard. Carries the value exactly as
/// typed plus the generation it was issued under; a completion whose
/// generation no longer matches the machine's is a cancelled request and is
/// discarded.
#[derive(Clone, Debug)]
pub(crate) struct SaveTicket {
    pub seq: u64,
    pub text: String,
}

#[derive(Clone, Debug)]
pub(crate) struct FieldMachine {
    /// The value known to be persisted, trimmed. Only a confirmed success
    /// may move this.
    last_confirmed: String,
    /// At most one save request may be in flight per field.
    locked: bool,
    /// Save-request generation; bumped when a request is issued or
    /// cancelled.
    seq: u64,
    phase: SavePhase,
    indicator: Indicator,
}

impl FieldMachine {
    pub fn new(initial: &str) -> Self {
        Self {
            last_confirmed: initial.trim().to_string(),
            locked: false,
            seq: 0,
            phase: SavePhase::Idle,
            indicator: Indicator::Neutral,
        }
    }

    pub fn last_confirmed(&self) -> &str {
        &self.last_confirmed
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn phase(&self) -> SavePhase {
        self.phase
    }

    pub fn indicator(&self) -> Indicator {
        self.indicator
    }

    /// An edit event arrived; the driver re-arms the debounce timer. Entered
    /// even while a request is in flight (the guard below keeps that request
    /// alone on the wire).
    pub fn on_edit(&mut self) {
        self.phase = SavePhase::Pending;
    }

    /// The guard shared by debounce-fire and blur. Issues a ticket only if
    /// the trimmed value actually changed and nothing is in flight; a save
    /// triggered while one is outstanding is dropped, not queued, and the
    /// next edit or blur re-attempts once the lock clears.
    pub fn try_begin_save(&mut self, current: &str) -> Option<SaveTicket> {
        if self.locked {
            return None;
        }

        if current.trim() == self.last_confirmed {
            self.phase = SavePhase::Idle;
            return None;
        }

        self.locked = true;
        self.seq += 1;
        self.phase = SavePhase::Saving;

        Some(SaveTicket {
            seq: self.seq,
            // The request carries the value as typed; trimming happens on
            // confirmation.
            text: current.to_string(),
        })
    }

    /// Cancel whatever is in flight. The abandoned request's completion will
    /// carry a stale generation and be ignored. With the drop policy in
    /// place the driver never reaches this while locked; it exists so the
    /// completion handling stays correct if that policy is ever relaxed to
    /// supersede-and-reissue.
    #[allow(dead_code)]
    pub fn cancel_in_flight(&mut self) {
        if self.locked {
            self.seq += 1;
            self.locked = false;
            self.phase = SavePhase::Idle;
        }
    }

    pub fn complete_success(&mut self, ticket: &SaveTicket) {
        if ticket.seq != self.seq {
            return;
        }
        self.locked = false;
        self.last_confirmed = ticket.text.trim().to_string();
        self.phase = SavePhase::SavedOk;
        self.indicator = Indicator::Success;
    }

    pub fn complete_failure(&mut self, ticket: &SaveTicket) {
        if ticket.seq != self.seq {
            return;
        }
        self.locked = false;
        self.phase = SavePhase::SaveFailed;
        self.indicator = Indicator::Error;
    }
}

/// An exactly-empty caption gets the "needs attention" background. This is a
/// function of the literal current content (no trim), independent of save
/// outcome, so whitespace-only input clears the marker even though it will
/// confirm as "".
pub(crate) fn needs_attention(current: &str) -> bool {
    current.is_empty()
}

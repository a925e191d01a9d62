//! Snapshot diff engine for live state broadcasts.
//!
//! Keeps one snapshot slot per possible shade id, holding the last view
//! broadcast for that id (`None` means no broadcast has described it as
//! existing). Each pass fetches the registry once, emits `update` for
//! every shade whose view differs from its slot (first sight included)
//! and `removed` for every occupied slot whose shade is gone. Passes are
//! rate-limited to one per interval no matter how much changed.

use std::time::{Duration, Instant};

use super::record::Record;
use crate::domain::{SLOT_COUNT, ShadeController, ShadeId, ShadeView};

/// Default minimum spacing between passes.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Fixed-size table of last-broadcast shade views.
#[derive(Debug)]
pub struct DiffEngine {
    snapshots: Vec<Option<ShadeView>>,
    interval: Duration,
    last_pass: Option<Instant>,
}

impl DiffEngine {
    /// Creates an engine with every slot absent.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            snapshots: vec![None; SLOT_COUNT],
            interval,
            last_pass: None,
        }
    }

    /// Returns `true` if a pass may run at `now`.
    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.last_pass
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Runs a pass if one is due, returning the records to broadcast.
    pub fn poll(&mut self, now: Instant, controller: &dyn ShadeController) -> Vec<Record> {
        if !self.is_due(now) {
            return Vec::new();
        }
        self.last_pass = Some(now);
        self.scan(controller)
    }

    /// Compares the registry against every slot and updates the slots.
    pub fn scan(&mut self, controller: &dyn ShadeController) -> Vec<Record> {
        let mut seen = vec![false; SLOT_COUNT];
        let mut records = Vec::new();

        for shade in controller.shades() {
            let slot = shade.id.slot();
            let (Some(snapshot), Some(flag)) = (self.snapshots.get_mut(slot), seen.get_mut(slot))
            else {
                continue;
            };
            *flag = true;
            let view = shade.view();
            if snapshot.as_ref() != Some(&view) {
                records.push(Record::Update(view.clone()));
                *snapshot = Some(view);
            }
        }

        for (snapshot, seen) in self.snapshots.iter_mut().zip(&seen) {
            if !*seen
                && let Some(last) = snapshot.take()
            {
                records.push(Record::Removed {
                    id: last.id,
                    name: last.name,
                });
            }
        }

        records
    }

    /// Last broadcast view for `id`, if it is marked present.
    #[must_use]
    pub fn snapshot(&self, id: ShadeId) -> Option<&ShadeView> {
        self.snapshots.get(id.slot()).and_then(Option::as_ref)
    }

    /// Number of slots currently marked present.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.snapshots.iter().filter(|s| s.is_some()).count()
    }
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

use log::error;

use crate::{
    drivers::registered_driver::{DriverId, DriverSlot},
    reconciler::snapshot::Snapshot,
};

/// Every key stored in a driver table must be present in the snapshot. Returns the number of
/// stale entries found; each one is logged.
///
/// Stale entries are expected after a pass that failed inside `filter` or `exit`, since the
/// failing driver's entry for the exiting key is not erased.
pub(crate) fn check<E>(snapshot: &Snapshot<E>, drivers: &[(DriverId, Box<dyn DriverSlot<E>>)]) -> usize {
    let mut stale = 0;
    for (id, slot) in drivers {
        for key in slot.component_keys() {
            if !snapshot.contains_key(key) {
                error!(
                    "consistency check: driver {} (id={}) still stores a component for key {:?}, which is not in the snapshot",
                    slot.name(),
                    id.to_u32(),
                    key
                );
                stale += 1;
            }
        }
    }
    stale
}

use log::{debug, info, warn};

use crate::{
    config::ReconcilerConfig,
    debug::Debugger,
    drivers::{
        component_table::ComponentTable,
        driver::Driver,
        registered_driver::{
            DriverHandle, DriverId, DriverSlot, RegisteredDriver, RemovedDriver, StepError,
        },
    },
    error::{InvalidDriverError, InvalidInputError, Phase, ReconcileError},
    reconciler::{
        pass_summary::PassSummary,
        snapshot::{Diff, Snapshot},
    },
};

type KeyFn<E> = Box<dyn Fn(&E) -> String>;

/// Keeps the components of every registered driver in step with a repeatedly replaced list of
/// keyed entities.
///
/// Each call to [`reconcile`](Self::reconcile) diffs the new list against the previous one by
/// key and then dispatches, in this order:
/// 1. `exit` for every key that disappeared,
/// 2. `enter` for every key that appeared,
/// 3. `update` for every entity present in the list, in list order.
///
/// Within a phase drivers are visited in registration order. A driver takes part in a key's
/// enter/exit lifecycle only if its `filter` accepted the entity when the key entered; after
/// that, `filter` is re-evaluated each pass but only gates `update`.
pub struct Reconciler<E> {
    config: ReconcilerConfig,
    key_fn: Option<KeyFn<E>>,
    drivers: Vec<(DriverId, Box<dyn DriverSlot<E>>)>,
    next_driver_id: u32,
    snapshot: Snapshot<E>,
    diff: Diff<E>,
    debugger: Debugger,
}

impl<E: 'static> Default for Reconciler<E> {
    fn default() -> Self {
        Self::unkeyed(ReconcilerConfig::default())
    }
}

impl<E: 'static> Reconciler<E> {
    pub fn new(key_fn: impl Fn(&E) -> String + 'static) -> Self {
        Self::with_config(key_fn, ReconcilerConfig::default())
    }

    pub fn with_config(key_fn: impl Fn(&E) -> String + 'static, config: ReconcilerConfig) -> Self {
        let mut reconciler = Self::unkeyed(config);
        reconciler.key_fn = Some(Box::new(key_fn));
        reconciler
    }

    /// A reconciler without a key function. `reconcile` fails until `set_key_fn` is called.
    pub fn unkeyed(config: ReconcilerConfig) -> Self {
        let debugger = Debugger::new(config.debug_namespace.clone());
        Self {
            snapshot: Snapshot::with_capacity(config.snapshot_capacity),
            diff: Diff::new(),
            key_fn: None,
            drivers: Vec::new(),
            next_driver_id: 0,
            debugger,
            config,
        }
    }

    /// Sets how identity is extracted from an entity. The function must be pure and return the
    /// same key for an entity for as long as it lives under that key.
    pub fn set_key_fn(&mut self, key_fn: impl Fn(&E) -> String + 'static) -> &mut Self {
        self.key_fn = Some(Box::new(key_fn));
        self
    }

    pub fn has_key_fn(&self) -> bool {
        self.key_fn.is_some()
    }

    /// Replaces the debugger built from the environment at construction, e.g. with one built
    /// from explicit `DebugSettings` or carrying a message filter.
    pub fn set_debugger(&mut self, debugger: Debugger) -> &mut Self {
        self.debugger = debugger;
        self
    }

    pub fn debugger(&self) -> &Debugger {
        &self.debugger
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &Snapshot<E> {
        &self.snapshot
    }

    pub fn driver_count(&self) -> usize {
        self.drivers.len()
    }

    // Drivers

    /// Appends `driver` to the registry. Keys already present are not entered for it; it starts
    /// receiving `update` for them on the next pass.
    pub fn add_driver<D: Driver<E>>(
        &mut self,
        driver: D,
    ) -> Result<DriverHandle<D>, InvalidDriverError> {
        driver.validate()?;

        let id = DriverId::new(self.next_driver_id);
        self.next_driver_id = self.next_driver_id.wrapping_add(1);

        info!(
            "Reconciler::add_driver(name={}, id={}, position={})",
            driver.name(),
            id.to_u32(),
            self.drivers.len()
        );
        self.drivers
            .push((id, Box::new(RegisteredDriver::<D, E>::new(driver))));

        Ok(DriverHandle::new(id))
    }

    /// Unregisters a driver. No `exit` calls are made; the components it still owned are handed
    /// back so the caller can release them.
    pub fn remove_driver<D: Driver<E>>(
        &mut self,
        handle: &DriverHandle<D>,
    ) -> Option<RemovedDriver<D, E>> {
        let position = self.position_of::<D>(handle)?;
        let (_, slot) = self.drivers.remove(position);
        let registered = slot.into_any().downcast::<RegisteredDriver<D, E>>().ok()?;

        info!(
            "Reconciler::remove_driver(name={}, id={}, components={})",
            registered.driver.name(),
            handle.id().to_u32(),
            registered.components.len()
        );
        Some(registered.into_removed())
    }

    pub fn driver<D: Driver<E>>(&self, handle: &DriverHandle<D>) -> Option<&D> {
        self.registered(handle).map(|registered| &registered.driver)
    }

    pub fn driver_mut<D: Driver<E>>(&mut self, handle: &DriverHandle<D>) -> Option<&mut D> {
        let position = self.position_of::<D>(handle)?;
        let (_, slot) = &mut self.drivers[position];
        slot.as_any_mut()
            .downcast_mut::<RegisteredDriver<D, E>>()
            .map(|registered| &mut registered.driver)
    }

    /// The driver's component table, read-only
    pub fn components<D: Driver<E>>(
        &self,
        handle: &DriverHandle<D>,
    ) -> Option<&ComponentTable<D::Component>> {
        self.registered(handle)
            .map(|registered| &registered.components)
    }

    /// The component a driver currently stores for `key`
    pub fn component_ref<D: Driver<E>>(
        &self,
        handle: &DriverHandle<D>,
        key: &str,
    ) -> Option<&D::Component> {
        self.components(handle)?.get(key)
    }

    fn registered<D: Driver<E>>(&self, handle: &DriverHandle<D>) -> Option<&RegisteredDriver<D, E>> {
        let (_, slot) = self.drivers.iter().find(|(id, _)| *id == handle.id())?;
        slot.as_any().downcast_ref::<RegisteredDriver<D, E>>()
    }

    fn position_of<D: Driver<E>>(&self, handle: &DriverHandle<D>) -> Option<usize> {
        self.drivers.iter().position(|(id, slot)| {
            *id == handle.id() && slot.as_any().is::<RegisteredDriver<D, E>>()
        })
    }

    // Reconcile

    /// Runs one reconciliation pass over `items`; `None` slots are ignored.
    ///
    /// On a callback error the pass stops where it failed and the error is returned. The new
    /// snapshot is already in place at that point and nothing is rolled back.
    pub fn reconcile<I>(&mut self, items: I) -> Result<PassSummary, ReconcileError>
    where
        I: IntoIterator<Item = Option<E>>,
        E: Clone,
    {
        let Some(key_fn) = self.key_fn.as_deref() else {
            return Err(InvalidInputError::MissingKeyFunction.into());
        };

        self.snapshot.diff(items, key_fn, &mut self.diff);

        let summary = PassSummary {
            entered: self.diff.entering.len(),
            persisted: self.diff.persisted(),
            exited: self.diff.exiting.len(),
            skipped: self.diff.skipped,
        };

        if self.config.warn_on_duplicate_keys {
            for key in &self.diff.duplicates {
                warn!(
                    "Reconciler::reconcile: key {:?} appeared more than once in one pass, the later entity replaces the earlier one",
                    key
                );
            }
        }
        if self.debugger.is_enabled() {
            self.debugger.log(format_args!(
                "exiting={:?} entering={:?}",
                self.diff
                    .exiting
                    .iter()
                    .map(|(key, _)| key.as_str())
                    .collect::<Vec<_>>(),
                self.diff
                    .entering
                    .iter()
                    .map(|index| self.diff.updates[*index].0.as_str())
                    .collect::<Vec<_>>(),
            ));
        }

        let trace_calls = self.config.trace_callbacks;

        for (key, entity) in &self.diff.exiting {
            for (_, slot) in self.drivers.iter_mut() {
                slot.exit(key, entity, trace_calls)
                    .map_err(|err| callback_error(&**slot, Phase::Exit, key, err))?;
            }
        }

        for index in &self.diff.entering {
            let (key, entity) = &self.diff.updates[*index];
            for (_, slot) in self.drivers.iter_mut() {
                slot.enter(key, entity, trace_calls)
                    .map_err(|err| callback_error(&**slot, Phase::Enter, key, err))?;
            }
        }

        for (key, entity) in &self.diff.updates {
            for (_, slot) in self.drivers.iter_mut() {
                slot.update(key, entity, trace_calls)
                    .map_err(|err| callback_error(&**slot, Phase::Update, key, err))?;
            }
        }

        self.diff.clear();

        #[cfg(feature = "consistency_checks")]
        super::consistency::check(&self.snapshot, &self.drivers);

        debug!("Reconciler::reconcile({})", summary);
        Ok(summary)
    }
}

fn callback_error<E>(
    slot: &dyn DriverSlot<E>,
    phase: Phase,
    key: &str,
    err: StepError,
) -> ReconcileError {
    ReconcileError::Callback {
        driver: slot.name(),
        phase,
        op: err.op,
        key: key.to_string(),
        source: err.source,
    }
}

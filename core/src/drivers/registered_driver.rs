use std::{any::Any, marker::PhantomData};

use log::trace;

use crate::{
    drivers::{component_table::ComponentTable, driver::Driver},
    error::{DriverError, DriverOp},
};

/// Stable identity of a registered driver, independent of its position in the registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DriverId(u32);

impl DriverId {
    pub(crate) fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn to_u32(&self) -> u32 {
        self.0
    }
}

/// Typed handle returned by `Reconciler::add_driver`
pub struct DriverHandle<D> {
    id: DriverId,
    phantom: PhantomData<fn() -> D>,
}

impl<D> DriverHandle<D> {
    pub(crate) fn new(id: DriverId) -> Self {
        Self {
            id,
            phantom: PhantomData,
        }
    }

    pub fn id(&self) -> DriverId {
        self.id
    }
}

impl<D> Clone for DriverHandle<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for DriverHandle<D> {}

impl<D> std::fmt::Debug for DriverHandle<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("DriverHandle").field(&self.id).finish()
    }
}

/// A driver removed from a reconciler, together with the components it still owned
pub struct RemovedDriver<D: Driver<E>, E> {
    pub driver: D,
    pub components: Vec<(String, D::Component)>,
    phantom: PhantomData<fn(&E)>,
}

/// Failure inside one lifecycle step, before the reconciler attaches phase and key
#[derive(Debug)]
pub(crate) struct StepError {
    pub op: DriverOp,
    pub source: DriverError,
}

fn step<T>(op: DriverOp, result: Result<T, DriverError>) -> Result<T, StepError> {
    result.map_err(|source| StepError { op, source })
}

/// A driver paired with its component table, with the component type erased so that drivers of
/// different types can share one registry.
pub(crate) trait DriverSlot<E> {
    fn name(&self) -> &'static str;

    /// filter → exit → erase. Erasure is skipped only if `filter` or `exit` fails.
    fn exit(&mut self, key: &str, entity: &E, trace_calls: bool) -> Result<(), StepError>;

    /// filter → enter → store
    fn enter(&mut self, key: &str, entity: &E, trace_calls: bool) -> Result<(), StepError>;

    /// filter → update
    fn update(&mut self, key: &str, entity: &E, trace_calls: bool) -> Result<(), StepError>;

    #[cfg(feature = "consistency_checks")]
    fn component_keys(&self) -> Vec<&str>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

pub(crate) struct RegisteredDriver<D: Driver<E>, E> {
    pub driver: D,
    pub components: ComponentTable<D::Component>,
    phantom: PhantomData<fn(&E)>,
}

impl<D: Driver<E>, E> RegisteredDriver<D, E> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            components: ComponentTable::new(),
            phantom: PhantomData,
        }
    }

    pub fn into_removed(mut self) -> RemovedDriver<D, E> {
        let components = self.components.drain();
        RemovedDriver {
            driver: self.driver,
            components,
            phantom: PhantomData,
        }
    }
}

impl<D: Driver<E>, E: 'static> DriverSlot<E> for RegisteredDriver<D, E> {
    fn name(&self) -> &'static str {
        self.driver.name()
    }

    fn exit(&mut self, key: &str, entity: &E, trace_calls: bool) -> Result<(), StepError> {
        if step(DriverOp::Filter, self.driver.filter(entity))? {
            if trace_calls {
                trace!(
                    "{}::exit(key={:?}, stored={})",
                    self.driver.name(),
                    key,
                    self.components.contains_key(key)
                );
            }
            let component = self.components.get_mut(key);
            step(DriverOp::Exit, self.driver.exit(entity, component))?;
        }
        self.components.remove(key);
        Ok(())
    }

    fn enter(&mut self, key: &str, entity: &E, trace_calls: bool) -> Result<(), StepError> {
        if !step(DriverOp::Filter, self.driver.filter(entity))? {
            return Ok(());
        }
        if trace_calls {
            trace!("{}::enter(key={:?})", self.driver.name(), key);
        }
        if let Some(component) = step(DriverOp::Enter, self.driver.enter(entity))? {
            self.components.insert(key.to_string(), component);
        }
        Ok(())
    }

    fn update(&mut self, key: &str, entity: &E, trace_calls: bool) -> Result<(), StepError> {
        if !step(DriverOp::Filter, self.driver.filter(entity))? {
            return Ok(());
        }
        if trace_calls {
            trace!(
                "{}::update(key={:?}, stored={})",
                self.driver.name(),
                key,
                self.components.contains_key(key)
            );
        }
        let component = self.components.get_mut(key);
        step(DriverOp::Update, self.driver.update(entity, component))
    }

    #[cfg(feature = "consistency_checks")]
    fn component_keys(&self) -> Vec<&str> {
        self.components.keys().map(String::as_str).collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

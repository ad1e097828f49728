use crate::{
    drivers::driver::Driver,
    error::{DriverError, DriverOp, DriverResult, InvalidDriverError},
};

type FilterFn<E> = Box<dyn Fn(&E) -> DriverResult<bool>>;
type EnterFn<E, C> = Box<dyn FnMut(&E) -> DriverResult<Option<C>>>;
type ExitFn<E, C> = Box<dyn FnMut(&E, Option<&mut C>) -> DriverResult<()>>;
type UpdateFn<E, C> = Box<dyn FnMut(&E, Option<&mut C>) -> DriverResult<()>>;

/// A driver assembled from closures at runtime.
///
/// Any operation may be left out while building; `Reconciler::add_driver` rejects the driver
/// with an [`InvalidDriverError`] naming every missing operation.
///
/// ```
/// use datasync_core::{FnDriver, Reconciler};
///
/// let mut reconciler = Reconciler::new(|name: &String| name.clone());
/// let driver = FnDriver::<String, usize>::new()
///     .filter(|_| Ok(true))
///     .enter(|name| Ok(Some(name.len())))
///     .exit(|_, _| Ok(()))
///     .update(|_, _| Ok(()));
/// let handle = reconciler.add_driver(driver).unwrap();
///
/// reconciler.reconcile(vec![Some("crate".to_string())]).unwrap();
/// assert_eq!(reconciler.component_ref(&handle, "crate"), Some(&5));
/// ```
pub struct FnDriver<E, C> {
    name: &'static str,
    filter: Option<FilterFn<E>>,
    enter: Option<EnterFn<E, C>>,
    exit: Option<ExitFn<E, C>>,
    update: Option<UpdateFn<E, C>>,
}

impl<E, C> Default for FnDriver<E, C> {
    fn default() -> Self {
        Self {
            name: "FnDriver",
            filter: None,
            enter: None,
            exit: None,
            update: None,
        }
    }
}

impl<E, C> FnDriver<E, C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn filter(mut self, f: impl Fn(&E) -> DriverResult<bool> + 'static) -> Self {
        self.filter = Some(Box::new(f));
        self
    }

    pub fn enter(mut self, f: impl FnMut(&E) -> DriverResult<Option<C>> + 'static) -> Self {
        self.enter = Some(Box::new(f));
        self
    }

    pub fn exit(mut self, f: impl FnMut(&E, Option<&mut C>) -> DriverResult<()> + 'static) -> Self {
        self.exit = Some(Box::new(f));
        self
    }

    pub fn update(
        mut self,
        f: impl FnMut(&E, Option<&mut C>) -> DriverResult<()> + 'static,
    ) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    /// Operations that have not been supplied, in `filter, enter, exit, update` order
    pub fn missing_ops(&self) -> Vec<DriverOp> {
        DriverOp::ALL
            .into_iter()
            .filter(|op| match op {
                DriverOp::Filter => self.filter.is_none(),
                DriverOp::Enter => self.enter.is_none(),
                DriverOp::Exit => self.exit.is_none(),
                DriverOp::Update => self.update.is_none(),
            })
            .collect()
    }

    fn missing(&self, op: DriverOp) -> DriverError {
        DriverError::msg(format!("{} has no {} operation", self.name, op))
    }
}

impl<E: 'static, C: 'static> Driver<E> for FnDriver<E, C> {
    type Component = C;

    fn filter(&self, entity: &E) -> DriverResult<bool> {
        match &self.filter {
            Some(f) => f(entity),
            None => Err(self.missing(DriverOp::Filter)),
        }
    }

    fn enter(&mut self, entity: &E) -> DriverResult<Option<C>> {
        let Some(f) = self.enter.as_mut() else {
            return Err(self.missing(DriverOp::Enter));
        };
        f(entity)
    }

    fn exit(&mut self, entity: &E, component: Option<&mut C>) -> DriverResult<()> {
        let Some(f) = self.exit.as_mut() else {
            return Err(self.missing(DriverOp::Exit));
        };
        f(entity, component)
    }

    fn update(&mut self, entity: &E, component: Option<&mut C>) -> DriverResult<()> {
        let Some(f) = self.update.as_mut() else {
            return Err(self.missing(DriverOp::Update));
        };
        f(entity, component)
    }

    fn validate(&self) -> Result<(), InvalidDriverError> {
        let missing = self.missing_ops();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InvalidDriverError {
                driver: self.name,
                missing,
            })
        }
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

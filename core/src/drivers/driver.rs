use crate::error::{DriverResult, InvalidDriverError};

/// Observes the lifecycle of keyed entities and owns the components it creates for them.
///
/// The reconciler keeps one [`ComponentTable`](crate::ComponentTable) per registered driver and
/// hands the stored component back on `exit` and `update`. Participation in a key's
/// enter/exit lifecycle is decided once, when the key enters: `filter` is asked again every pass
/// but afterwards only gates `update`.
pub trait Driver<E>: 'static {
    /// Handle created by `enter`, e.g. a sprite, a scene node, a physics body
    type Component: 'static;

    /// Whether this driver participates for `entity`.
    fn filter(&self, entity: &E) -> DriverResult<bool>;

    /// Called once when a key first appears and `filter` accepts it. `None` opts out of
    /// storing a component without failing; `update` still runs with `None`.
    fn enter(&mut self, entity: &E) -> DriverResult<Option<Self::Component>>;

    /// Called once when a key disappears and `filter` accepts its last entity. Must release
    /// whatever `component` holds. `component` is `None` when `enter` produced nothing or this
    /// driver was registered after the key entered.
    fn exit(&mut self, entity: &E, component: Option<&mut Self::Component>) -> DriverResult<()>;

    /// Called every pass the key is present and `filter` accepts it. Must tolerate `None`.
    fn update(&mut self, entity: &E, component: Option<&mut Self::Component>) -> DriverResult<()>;

    /// Structural check run by `Reconciler::add_driver`. Trait implementations are complete by
    /// construction; drivers assembled at runtime override this.
    fn validate(&self) -> Result<(), InvalidDriverError> {
        Ok(())
    }

    /// Name used in logs and errors
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

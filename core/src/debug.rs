//! Namespace-gated diagnostics.
//!
//! Each kind of output (`debug`, `trace`, `watch`) is switched on per namespace by a pair of
//! regular expressions read from the environment:
//!
//! | Variable | Meaning |
//! |----------|---------|
//! | `DATASYNC_DEBUG_INCLUDE` / `DATASYNC_DEBUG_EXCLUDE` | namespaced `debug!` lines |
//! | `DATASYNC_TRACE_INCLUDE` / `DATASYNC_TRACE_EXCLUDE` | a backtrace after every debug line |
//! | `DATASYNC_WATCH_INCLUDE` / `DATASYNC_WATCH_EXCLUDE` | value changes of [`Watched`] fields |
//!
//! A kind is on for a namespace when its exclude pattern does not match and its include pattern
//! does. Everything is routed through the `log` facade, so a logger still has to be installed
//! and let `debug`/`trace` through for anything to appear.

use std::{backtrace::Backtrace, env, fmt, ops::Deref, rc::Rc};

use log::{debug, trace, warn};
use regex::Regex;

const LOG_TARGET: &str = "datasync::debug";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DebugKind {
    Debug,
    Trace,
    Watch,
}

impl DebugKind {
    fn env_prefix(&self) -> &'static str {
        match self {
            DebugKind::Debug => "DATASYNC_DEBUG",
            DebugKind::Trace => "DATASYNC_TRACE",
            DebugKind::Watch => "DATASYNC_WATCH",
        }
    }
}

#[derive(Clone, Debug, Default)]
struct Patterns {
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl Patterns {
    fn is_enabled(&self, namespace: &str) -> bool {
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(namespace) {
                return false;
            }
        }
        match &self.include {
            Some(include) => include.is_match(namespace),
            None => false,
        }
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(err) => {
            warn!("ignoring invalid debug pattern {:?}: {}", pattern, err);
            None
        }
    }
}

/// Include/exclude patterns for every [`DebugKind`]
#[derive(Clone, Debug, Default)]
pub struct DebugSettings {
    debug: Patterns,
    trace: Patterns,
    watch: Patterns,
}

impl DebugSettings {
    /// Reads the `DATASYNC_{DEBUG,TRACE,WATCH}_{INCLUDE,EXCLUDE}` variables. Unset, empty or
    /// invalid patterns leave the kind switched off.
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        for kind in [DebugKind::Debug, DebugKind::Trace, DebugKind::Watch] {
            let prefix = kind.env_prefix();
            if let Ok(pattern) = env::var(format!("{}_INCLUDE", prefix)) {
                settings = settings.include(kind, &pattern);
            }
            if let Ok(pattern) = env::var(format!("{}_EXCLUDE", prefix)) {
                settings = settings.exclude(kind, &pattern);
            }
        }
        settings
    }

    pub fn include(mut self, kind: DebugKind, pattern: &str) -> Self {
        self.patterns_mut(kind).include = compile(pattern);
        self
    }

    pub fn exclude(mut self, kind: DebugKind, pattern: &str) -> Self {
        self.patterns_mut(kind).exclude = compile(pattern);
        self
    }

    pub fn is_enabled(&self, kind: DebugKind, namespace: &str) -> bool {
        self.patterns(kind).is_enabled(namespace)
    }

    fn patterns(&self, kind: DebugKind) -> &Patterns {
        match kind {
            DebugKind::Debug => &self.debug,
            DebugKind::Trace => &self.trace,
            DebugKind::Watch => &self.watch,
        }
    }

    fn patterns_mut(&mut self, kind: DebugKind) -> &mut Patterns {
        match kind {
            DebugKind::Debug => &mut self.debug,
            DebugKind::Trace => &mut self.trace,
            DebugKind::Watch => &mut self.watch,
        }
    }
}

type MessageFilter = Rc<dyn Fn(&str) -> bool>;

/// Namespaced debug logger. Disabled instances are a no-op.
#[derive(Clone)]
pub struct Debugger {
    namespace: String,
    enabled: bool,
    trace: bool,
    filter: Option<MessageFilter>,
}

impl fmt::Debug for Debugger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debugger")
            .field("namespace", &self.namespace)
            .field("enabled", &self.enabled)
            .field("trace", &self.trace)
            .field("filtered", &self.filter.is_some())
            .finish()
    }
}

impl Debugger {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self::with_settings(namespace, &DebugSettings::from_env())
    }

    pub fn with_settings(namespace: impl Into<String>, settings: &DebugSettings) -> Self {
        let namespace = namespace.into();
        let enabled = settings.is_enabled(DebugKind::Debug, &namespace);
        let trace = settings.is_enabled(DebugKind::Trace, &namespace);
        Self {
            namespace,
            enabled,
            trace,
            filter: None,
        }
    }

    /// Drops every message for which `filter` returns false, e.g. high-frequency events that
    /// would drown out the rest of the namespace.
    pub fn with_filter(mut self, filter: impl Fn(&str) -> bool + 'static) -> Self {
        self.filter = Some(Rc::new(filter));
        self
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_tracing(&self) -> bool {
        self.enabled && self.trace
    }

    pub fn log(&self, args: fmt::Arguments<'_>) {
        if !self.enabled {
            return;
        }
        if let Some(filter) = &self.filter {
            let message = args.to_string();
            if !filter(&message) {
                return;
            }
            debug!(target: LOG_TARGET, "{} {}", self.namespace, message);
        } else {
            debug!(target: LOG_TARGET, "{} {}", self.namespace, args);
        }
        if self.trace {
            trace!(target: LOG_TARGET, "{}\n{}", self.namespace, Backtrace::force_capture());
        }
    }
}

/// A value whose replacements are logged when `watch` is enabled for its namespace
pub struct Watched<T> {
    namespace: String,
    field: &'static str,
    value: T,
    enabled: bool,
    trace: bool,
}

impl<T: fmt::Debug> Watched<T> {
    pub fn new(namespace: impl Into<String>, field: &'static str, value: T) -> Self {
        Self::with_settings(namespace, field, value, &DebugSettings::from_env())
    }

    pub fn with_settings(
        namespace: impl Into<String>,
        field: &'static str,
        value: T,
        settings: &DebugSettings,
    ) -> Self {
        let namespace = namespace.into();
        let enabled = settings.is_enabled(DebugKind::Watch, &namespace);
        let trace = settings.is_enabled(DebugKind::Trace, &namespace);
        Self {
            namespace,
            field,
            value,
            enabled,
            trace,
        }
    }

    pub fn is_watching(&self) -> bool {
        self.enabled
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    /// Replaces the value and returns the previous one
    pub fn set(&mut self, value: T) -> T {
        if self.enabled {
            debug!(
                target: LOG_TARGET,
                "{} . {} {:?} ↬ {:?}", self.namespace, self.field, self.value, value
            );
            if self.trace {
                trace!(target: LOG_TARGET, "{}\n{}", self.namespace, Backtrace::force_capture());
            }
        }
        std::mem::replace(&mut self.value, value)
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for Watched<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

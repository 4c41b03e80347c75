//! Event sink boundary for parse/bind telemetry.
//!
//! Events are recorded synchronously. By default they are forwarded to
//! `tracing`; tests install a scoped override with [`with_sink`].

use std::cell::RefCell;

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<*const dyn QuerySink>> = const { RefCell::new(None) };
}

///
/// QueryOption
///
/// Which query option (or path) an event concerns.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum QueryOption {
    Path,
    Filter,
    OrderBy,
    Select,
    Expand,
    Top,
    Skip,
    Count,
    InlineCount,
    Format,
    SkipToken,
    Search,
    Custom,
}

impl QueryOption {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Filter => "$filter",
            Self::OrderBy => "$orderby",
            Self::Select => "$select",
            Self::Expand => "$expand",
            Self::Top => "$top",
            Self::Skip => "$skip",
            Self::Count => "$count",
            Self::InlineCount => "$inlinecount",
            Self::Format => "$format",
            Self::SkipToken => "$skiptoken",
            Self::Search => "$search",
            Self::Custom => "custom",
        }
    }
}

///
/// ElementClass
///
/// Kind of model element a name was resolved to.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ElementClass {
    NavigationSource,
    Property,
    SchemaType,
    Operation,
    OperationImport,
    EnumMember,
    Term,
}

///
/// QueryEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum QueryEvent {
    IndexBuilt {
        schema_types: usize,
        operations: usize,
        navigation_sources: usize,
    },
    OptionParsed {
        option: QueryOption,
    },
    CaseInsensitiveFallback {
        element: ElementClass,
    },
    Bound {
        option: QueryOption,
    },
}

///
/// QuerySink
///

pub trait QuerySink {
    fn record(&self, event: QueryEvent);
}

///
/// TracingSink
/// Default sink; forwards every event to `tracing` at debug/trace level.
///

pub struct TracingSink;

impl QuerySink for TracingSink {
    fn record(&self, event: QueryEvent) {
        match event {
            QueryEvent::IndexBuilt {
                schema_types,
                operations,
                navigation_sources,
            } => tracing::debug!(
                schema_types,
                operations,
                navigation_sources,
                "model index ready"
            ),
            QueryEvent::OptionParsed { option } => {
                tracing::trace!(option = option.label(), "option parsed");
            }
            QueryEvent::CaseInsensitiveFallback { element } => {
                tracing::debug!(?element, "resolved name case-insensitively");
            }
            QueryEvent::Bound { option } => {
                tracing::trace!(option = option.label(), "option bound");
            }
        }
    }
}

pub(crate) const TRACING_SINK: TracingSink = TracingSink;

pub(crate) fn record(event: QueryEvent) {
    let override_ptr = SINK_OVERRIDE.with(|cell| *cell.borrow());
    if let Some(ptr) = override_ptr {
        // SAFETY:
        // `ptr` was installed by `with_sink` from a live `&dyn QuerySink`, and
        // `with_sink` restores the previous slot on every exit (including
        // unwind) before that borrow ends. `record` only dereferences it
        // synchronously and never stores it.
        unsafe { (&*ptr).record(event) };
    } else {
        TRACING_SINK.record(event);
    }
}

/// Run a closure with a temporary sink override on this thread.
pub fn with_sink<T>(sink: &dyn QuerySink, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<*const dyn QuerySink>);

    impl Drop for Guard {
        fn drop(&mut self) {
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = self.0;
            });
        }
    }

    // SAFETY:
    // The lifetime is erased only for the dynamic extent of this call;
    // `Guard` restores the previous pointer on all exits and the pointer is
    // only read synchronously by `record`.
    let sink_ptr = unsafe { std::mem::transmute::<&dyn QuerySink, *const dyn QuerySink>(sink) };
    let prev = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink_ptr));
    let _guard = Guard(prev);

    f()
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct CaptureSink {
        events: RefCell<Vec<QueryEvent>>,
    }

    impl QuerySink for CaptureSink {
        fn record(&self, event: QueryEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn override_is_scoped_and_restored() {
        let outer = CaptureSink::default();
        let inner = CaptureSink::default();

        with_sink(&outer, || {
            record(QueryEvent::OptionParsed {
                option: QueryOption::Filter,
            });
            with_sink(&inner, || {
                record(QueryEvent::Bound {
                    option: QueryOption::Filter,
                });
            });
            record(QueryEvent::OptionParsed {
                option: QueryOption::Select,
            });
        });

        assert_eq!(outer.events.borrow().len(), 2);
        assert_eq!(
            inner.events.borrow().as_slice(),
            &[QueryEvent::Bound {
                option: QueryOption::Filter
            }]
        );
        assert!(SINK_OVERRIDE.with(|cell| cell.borrow().is_none()));
    }
}

use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

use tracing::{debug, warn};

use crate::error::{RegistryError, RegistryResult};
use crate::handler::SharedHandler;

/// A registered handler with the filter strings it claimed at registration.
struct Entry {
    handler: SharedHandler,
    name: String,
    load: Vec<String>,
    save: Vec<String>,
}

impl Entry {
    /// Queries the handler. Must run outside the registry lock so a
    /// misbehaving handler cannot poison it.
    fn new(handler: SharedHandler) -> Self {
        Self {
            name: handler.name(),
            load: handler.file_filters(true),
            save: handler.file_filters(false),
            handler,
        }
    }

    fn filters(&self, for_load: bool) -> &[String] {
        if for_load {
            &self.load
        } else {
            &self.save
        }
    }

    /// Union of the load and save filter strings.
    fn claimed(&self) -> BTreeSet<&str> {
        self.load.iter().chain(&self.save).map(String::as_str).collect()
    }
}

/// Ordered, collision-free collection of format handlers.
///
/// Invariants:
/// - No handler instance is registered twice.
/// - No filter string (load or save) is claimed by two handlers.
/// - Iteration order is registration order; it is the priority order for
///   every lookup.
///
/// Filter strings are read once, when a handler is registered. Handler code
/// never runs while the lock is held.
#[derive(Default)]
pub struct FilterRegistry {
    entries: RwLock<Vec<Entry>>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.entries.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no handler is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().expect("lock poisoned").is_empty()
    }

    /// Append a handler at the lowest priority.
    ///
    /// The registry is left untouched (and a warning is logged) when the
    /// same instance is already present or when any of its load or save
    /// filter strings is already claimed.
    pub fn register(&self, handler: SharedHandler) -> RegistryResult<()> {
        let entry = Entry::new(handler);

        let mut entries = self.entries.write().expect("lock poisoned");
        if let Err(err) = Self::check_unique(&entries, &entry) {
            warn!(%err, "I/O filter not registered");
            return Err(err);
        }

        debug!(
            filter = %entry.name,
            priority = entries.len(),
            "I/O filter registered"
        );
        entries.push(entry);
        Ok(())
    }

    fn check_unique(existing: &[Entry], entry: &Entry) -> RegistryResult<()> {
        let claimed = entry.claimed();

        for other in existing {
            if Arc::ptr_eq(&other.handler, &entry.handler) {
                return Err(RegistryError::AlreadyRegistered {
                    name: entry.name.clone(),
                });
            }

            if let Some(filter) = claimed.intersection(&other.claimed()).next() {
                return Err(RegistryError::FilterCollision {
                    filter: filter.to_string(),
                    name: entry.name.clone(),
                    other: other.name.clone(),
                });
            }
        }
        Ok(())
    }

    /// Notify every handler of teardown, then empty the registry.
    ///
    /// Calling this on an empty registry does nothing.
    pub fn unregister_all(&self) {
        let entries = std::mem::take(&mut *self.entries.write().expect("lock poisoned"));
        for entry in &entries {
            entry.handler.on_unregister();
        }
        if !entries.is_empty() {
            debug!(count = entries.len(), "I/O filters unregistered");
        }
    }

    /// First handler (in priority order) offering `filter` for loading
    /// (`for_load == true`) or saving.
    pub fn get_by_filter_string(&self, filter: &str, for_load: bool) -> Option<SharedHandler> {
        if filter.is_empty() {
            return None;
        }
        self.entries
            .read()
            .expect("lock poisoned")
            .iter()
            .find(|e| e.filters(for_load).iter().any(|f| f == filter))
            .map(|e| Arc::clone(&e.handler))
    }

    /// First handler (in priority order) able to load files with `ext`.
    ///
    /// The comparison is case-insensitive and a leading dot is ignored.
    pub fn find_best_for_extension(&self, ext: &str) -> Option<SharedHandler> {
        let upper = ext.trim_start_matches('.').to_ascii_uppercase();
        if upper.is_empty() {
            return None;
        }
        self.handlers()
            .into_iter()
            .find(|h| h.can_load_extension(&upper))
    }

    /// Snapshot of the registered handlers in priority order.
    pub fn handlers(&self) -> Vec<SharedHandler> {
        self.entries
            .read()
            .expect("lock poisoned")
            .iter()
            .map(|e| Arc::clone(&e.handler))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{filter_extensions, FormatHandler};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test double: fixed filters, extension matching from the filter patterns.
    struct StubHandler {
        ext: &'static str,
        load: Vec<String>,
        save: Vec<String>,
        unregistered: Arc<AtomicUsize>,
    }

    impl StubHandler {
        fn new(ext: &'static str, load: &[&str], save: &[&str]) -> Self {
            Self {
                ext,
                load: load.iter().map(|s| s.to_string()).collect(),
                save: save.iter().map(|s| s.to_string()).collect(),
                unregistered: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn shared(ext: &'static str, load: &[&str], save: &[&str]) -> SharedHandler {
            Arc::new(Self::new(ext, load, save))
        }
    }

    impl FormatHandler for StubHandler {
        fn file_filters(&self, for_load: bool) -> Vec<String> {
            if for_load {
                self.load.clone()
            } else {
                self.save.clone()
            }
        }

        fn default_extension(&self) -> &str {
            self.ext
        }

        fn can_load_extension(&self, upper_ext: &str) -> bool {
            self.load
                .iter()
                .flat_map(|f| filter_extensions(f))
                .any(|e| e == upper_ext)
        }

        fn on_unregister(&self) {
            self.unregistered.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn registration_preserves_order() {
        let registry = FilterRegistry::new();
        registry
            .register(StubHandler::shared("a", &["A (*.a)"], &["A (*.a)"]))
            .unwrap();
        registry
            .register(StubHandler::shared("b", &["B (*.b)"], &[]))
            .unwrap();
        let names: Vec<String> = registry.handlers().iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn same_instance_is_refused() {
        let registry = FilterRegistry::new();
        let handler = StubHandler::shared("a", &["A (*.a)"], &[]);
        registry.register(handler.clone()).unwrap();

        let err = registry.register(handler).unwrap_err();
        assert_eq!(err, RegistryError::AlreadyRegistered { name: "A".into() });
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn colliding_load_filter_is_refused() {
        let registry = FilterRegistry::new();
        registry
            .register(StubHandler::shared("a", &["Cloud (*.txt)"], &[]))
            .unwrap();

        let err = registry
            .register(StubHandler::shared("b", &["Cloud (*.txt)", "B (*.b)"], &[]))
            .unwrap_err();
        assert!(matches!(err, RegistryError::FilterCollision { ref filter, .. } if filter == "Cloud (*.txt)"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn save_filter_colliding_with_load_filter_is_refused() {
        let registry = FilterRegistry::new();
        registry
            .register(StubHandler::shared("a", &["Shared (*.s)"], &[]))
            .unwrap();
        let result = registry.register(StubHandler::shared("b", &[], &["Shared (*.s)"]));
        assert!(result.is_err());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registered_filter_sets_are_pairwise_disjoint() {
        let registry = FilterRegistry::new();
        let candidates = [
            StubHandler::shared("a", &["A (*.a)", "Common (*.c)"], &["A (*.a)"]),
            StubHandler::shared("b", &["B (*.b)"], &["A (*.a)"]),
            StubHandler::shared("c", &["Common (*.c)"], &[]),
            StubHandler::shared("d", &["D (*.d)"], &["D (*.d)"]),
        ];
        for handler in candidates {
            let _ = registry.register(handler);
        }

        let handlers = registry.handlers();
        assert_eq!(handlers.len(), 2);
        for for_load in [true, false] {
            let mut seen = BTreeSet::new();
            for handler in &handlers {
                for filter in handler.file_filters(for_load) {
                    assert!(seen.insert(filter), "duplicate filter across handlers");
                }
            }
        }
    }

    #[test]
    fn lookup_by_filter_string_respects_direction() {
        let registry = FilterRegistry::new();
        registry
            .register(StubHandler::shared("a", &["A in (*.a)"], &["A out (*.a)"]))
            .unwrap();

        assert!(registry.get_by_filter_string("A in (*.a)", true).is_some());
        assert!(registry.get_by_filter_string("A in (*.a)", false).is_none());
        assert!(registry.get_by_filter_string("A out (*.a)", false).is_some());
        assert!(registry.get_by_filter_string("", true).is_none());
        assert!(registry.get_by_filter_string("missing", true).is_none());
    }

    #[test]
    fn best_handler_for_extension_is_first_registered() {
        let registry = FilterRegistry::new();
        let native = StubHandler::shared("nat", &["Native (*.pts)"], &[]);
        let generic = StubHandler::shared("gen", &["Generic (*.pts *.txt)"], &[]);
        registry.register(native.clone()).unwrap();
        registry.register(generic.clone()).unwrap();

        let best = registry.find_best_for_extension("pts").unwrap();
        assert!(Arc::ptr_eq(&best, &native));
        let best = registry.find_best_for_extension(".TXT").unwrap();
        assert!(Arc::ptr_eq(&best, &generic));
        assert!(registry.find_best_for_extension("las").is_none());
        assert!(registry.find_best_for_extension("").is_none());
    }

    #[test]
    fn unregister_all_notifies_and_is_idempotent() {
        let registry = FilterRegistry::new();
        let stub = StubHandler::new("a", &["A (*.a)"], &[]);
        let counter = Arc::clone(&stub.unregistered);
        registry.register(Arc::new(stub)).unwrap();

        registry.unregister_all();
        assert!(registry.is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        registry.unregister_all();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    /// Handler whose filter query panics.
    struct BrokenHandler;

    impl FormatHandler for BrokenHandler {
        fn file_filters(&self, _for_load: bool) -> Vec<String> {
            panic!("filter table not initialized")
        }

        fn default_extension(&self) -> &str {
            "brk"
        }

        fn can_load_extension(&self, _upper_ext: &str) -> bool {
            false
        }
    }

    #[test]
    fn panicking_handler_leaves_registry_usable() {
        let registry = FilterRegistry::new();
        registry
            .register(StubHandler::shared("a", &["A (*.a)"], &[]))
            .unwrap();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            registry.register(Arc::new(BrokenHandler))
        }));
        assert!(result.is_err());

        assert_eq!(registry.len(), 1);
        assert!(registry.find_best_for_extension("a").is_some());
        assert!(registry.get_by_filter_string("A (*.a)", true).is_some());
        registry
            .register(StubHandler::shared("g", &["G (*.g)"], &[]))
            .unwrap();
        assert!(registry.find_best_for_extension("g").is_some());
    }

    /// Run `f` with a subscriber that records WARN and above, return the output.
    fn capture_warnings(f: impl FnOnce()) -> String {
        use std::io::Write;
        use std::sync::Mutex;

        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);

        impl Write for Buffer {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn refused_registration_logs_one_warning_each() {
        let registry = FilterRegistry::new();
        let handler = StubHandler::shared("a", &["A (*.a)"], &[]);

        let logs = capture_warnings(|| {
            registry.register(handler.clone()).unwrap();
            registry
                .register(StubHandler::shared("b", &["B (*.b)"], &[]))
                .unwrap();
            let _ = registry.register(handler.clone());
            let _ = registry.register(StubHandler::shared("c", &["A (*.a)"], &[]));
        });

        assert_eq!(logs.matches("I/O filter not registered").count(), 2);
        assert!(logs.contains("already registered"));
        assert!(logs.contains("already handled by another filter"));
        assert_eq!(registry.len(), 2);
    }
}

//! The reactor: one page, its proxies and its reactions.
//!
//! A [`Reactor`] owns everything a flow needs on one document:
//!
//! - the proxy cache and the reference registry
//! - the reaction store and the document dispatcher feeding it
//! - the scheduler reactions run on
//! - the logger, settings and counters collaborators
//!
//! # Example
//!
//! ```ignore
//! use dom_reactor::{Config, Document, Query, Reactor};
//!
//! let reactor = Reactor::new(document, Config::default())?;
//! reactor.scheduler().spawn();
//!
//! let headlines = reactor.query(
//!     Query::select("textarea")
//!         .name("Headline")
//!         .reference("headlines")
//!         .on("onKeydown_CtrlEnter", |ctx| {
//!             ctx.proxy().map(|p| p.set_value("done")).transpose()?;
//!             Ok(())
//!         }),
//! )?;
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::{Config, SettingStore, Settings};
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::events::{
    Declared, DocumentDispatcher, ReactionContext, ReactionProcessor, ReactionStore, Reactions,
    Scheduler,
};
use crate::logging::{GuiSink, Logbook, Logger, PageGui};
use crate::proxy::{self, ElementProxy, ProxyCache, Query, QueryMode, SelectorSpec, UNNAMED};
use crate::util::Counters;

// ============================================================================
// Constants
// ============================================================================

/// Name used in errors about global reactions.
const GLOBAL_NAME: &str = "Global";

// ============================================================================
// Shared
// ============================================================================

/// Page services every proxy holds on to.
pub(crate) struct Shared {
    /// The page.
    pub(crate) document: Document,
    /// Queue reactions and touches run on.
    pub(crate) scheduler: Arc<Scheduler>,
    /// Log sink.
    pub(crate) logger: Arc<dyn Logger>,
    /// Validated configuration.
    pub(crate) config: Config,
    /// Element to proxy cache, owned by the reactor since cached proxies
    /// hold these services.
    pub(crate) cache: Weak<Mutex<ProxyCache>>,
}

impl fmt::Debug for Shared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("document", &self.document)
            .field("cached", &self.cache.upgrade().map(|cache| cache.lock().len()))
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for a reactor.
pub(crate) struct ReactorInner {
    /// Unique identifier for this reactor.
    uuid: Uuid,
    /// Page services.
    shared: Arc<Shared>,
    /// Element to proxy cache.
    cache: Arc<Mutex<ProxyCache>>,
    /// Element reactions and global reactions.
    store: Arc<ReactionStore>,
    /// Keeps the dispatcher alive alongside the store.
    dispatcher: Arc<DocumentDispatcher>,
    /// Named query results.
    refs: RwLock<FxHashMap<String, Vec<ElementProxy>>>,
    /// Settings collaborator.
    settings: Arc<dyn Settings>,
    /// Task counters.
    counters: Counters,
    /// Default logger, when no custom one was given.
    logbook: Option<Arc<Logbook>>,
}

// ============================================================================
// Reactor
// ============================================================================

/// Proxies and reactions of one document.
///
/// Cloning returns another handle to the same reactor.
#[derive(Clone)]
pub struct Reactor {
    /// Shared inner state.
    pub(crate) inner: Arc<ReactorInner>,
}

// ============================================================================
// Reactor - Display
// ============================================================================

impl fmt::Debug for Reactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reactor")
            .field("uuid", &self.inner.uuid)
            .field("targets", &self.inner.store.len())
            .field("refs", &self.inner.refs.read().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Reactor - Constructor
// ============================================================================

impl Reactor {
    /// Creates a reactor for `document` with default collaborators.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::InvalidDescriptor`] if `config`
    /// is invalid.
    pub fn new(document: Document, config: Config) -> Result<Self> {
        Self::builder(document).config(config).build()
    }

    /// Returns a builder for custom collaborators.
    #[inline]
    #[must_use]
    pub fn builder(document: Document) -> ReactorBuilder {
        ReactorBuilder::new(document)
    }
}

// ============================================================================
// Reactor - Accessors
// ============================================================================

impl Reactor {
    /// Returns the unique UUID.
    #[inline]
    #[must_use]
    pub fn uuid(&self) -> &Uuid {
        &self.inner.uuid
    }

    /// Returns the page.
    #[inline]
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.inner.shared.document
    }

    /// Returns the scheduler reactions run on.
    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.inner.shared.scheduler
    }

    /// Returns the logger.
    #[inline]
    #[must_use]
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.inner.shared.logger
    }

    /// Returns the default logbook, `None` with a custom logger.
    #[inline]
    #[must_use]
    pub fn logbook(&self) -> Option<&Arc<Logbook>> {
        self.inner.logbook.as_ref()
    }

    /// Returns the settings collaborator.
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &dyn Settings {
        self.inner.settings.as_ref()
    }

    /// Returns the task counters.
    #[inline]
    #[must_use]
    pub fn counters(&self) -> &Counters {
        &self.inner.counters
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.shared.config
    }

    /// Returns the document dispatcher.
    #[inline]
    #[must_use]
    pub fn dispatcher(&self) -> &Arc<DocumentDispatcher> {
        &self.inner.dispatcher
    }

    /// Returns the number of targets with stored reactions.
    #[inline]
    #[must_use]
    pub fn reaction_targets(&self) -> usize {
        self.inner.store.len()
    }

    /// Returns the number of cached proxies whose element is alive.
    #[inline]
    #[must_use]
    pub fn cached_proxies(&self) -> usize {
        self.inner.cache.lock().len()
    }
}

// ============================================================================
// Reactor - Queries
// ============================================================================

impl Reactor {
    /// Resolves `query` into proxies.
    ///
    /// Unless the query is fresh, also applies its CSS, registers its
    /// reactions for every proxy and stores the result under its reference
    /// name. CSS goes through [`ElementProxy::set_css`], so a static query
    /// with CSS fails.
    ///
    /// # Errors
    ///
    /// - [`Error::UnsupportedEvent`], [`Error::InvalidDescriptor`] or
    ///   [`Error::EmptyReaction`] for bad reaction declarations
    /// - [`Error::InvalidSelector`] if a selector does not parse
    /// - [`Error::NotAnElement`] if a resolved node is not an element
    /// - [`Error::StaticProxy`] if CSS is given for static proxies
    pub fn query(&self, query: Query) -> Result<Vec<ElementProxy>> {
        let base = query.base_name().to_string();
        let declared = query.reactions.validate(&base)?;
        let proxies = proxy::build(&self.inner.shared, &query.spec, &base, query.mode)?;

        if query.mode.is_fresh() {
            debug!(name = %base, found = proxies.len(), "Fresh query resolved");
            return Ok(proxies);
        }

        if let Some(css) = &query.css {
            for proxy in &proxies {
                proxy.set_css(css)?;
            }
        }

        if !declared.is_empty() {
            self.register(&proxies, &declared)?;
        }

        if let Some(reference) = query.reference {
            debug!(reference = %reference, count = proxies.len(), "Reference stored");
            self.inner.refs.write().insert(reference, proxies.clone());
        }

        debug!(name = %base, found = proxies.len(), "Query resolved");
        Ok(proxies)
    }

    /// Resolves `spec` without side effects.
    ///
    /// Known elements come back as their cached proxies, others as new
    /// static proxies.
    ///
    /// # Errors
    ///
    /// Same as [`query`](Self::query), minus reaction errors.
    pub fn lookup(&self, spec: &SelectorSpec) -> Result<Vec<ElementProxy>> {
        proxy::build(&self.inner.shared, spec, UNNAMED, QueryMode::Fresh)
    }

    /// Registers reactions on the document itself.
    ///
    /// Global callbacks get a context without proxy and run after element
    /// reactions of the same event.
    ///
    /// # Errors
    ///
    /// Returns an error for bad reaction declarations.
    pub fn set_global(&self, reactions: Reactions) -> Result<()> {
        let declared = reactions.validate(GLOBAL_NAME)?;
        let shared = &self.inner.shared;
        let processed = ReactionProcessor::new(shared.config.debounce(), &shared.scheduler)
            .process(&declared, &ReactionContext::global());
        for (descriptor, reactions) in processed {
            self.inner
                .store
                .set(shared.document.root(), descriptor, reactions)?;
        }
        Ok(())
    }

    /// Drops every stored reaction, element and global.
    pub fn reset(&self) {
        self.inner.store.clear();
        info!(uuid = %self.inner.uuid, "Reactions reset");
    }

    /// Returns the proxies stored under `name`.
    #[must_use]
    pub fn reference(&self, name: &str) -> Option<Vec<ElementProxy>> {
        self.inner.refs.read().get(name).cloned()
    }

    /// Re-resolves the first proxy stored under `name`.
    ///
    /// Returns `None` if the reference is empty or its element is gone.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReferenceNotFound`] if nothing is stored under
    /// `name`.
    pub fn fresh_reference(&self, name: &str) -> Result<Option<ElementProxy>> {
        let first = self
            .inner
            .refs
            .read()
            .get(name)
            .ok_or_else(|| Error::reference_not_found(name))?
            .first()
            .cloned();
        match first {
            Some(proxy) => Ok(proxy.fresh()?.into_iter().next()),
            None => Ok(None),
        }
    }

    fn register(&self, proxies: &[ElementProxy], declared: &Declared) -> Result<()> {
        let shared = &self.inner.shared;
        let processor = ReactionProcessor::new(shared.config.debounce(), &shared.scheduler);
        let group: Arc<[ElementProxy]> = proxies.into();
        for (idx, proxy) in proxies.iter().enumerate() {
            let context = ReactionContext::element(Arc::clone(&group), idx);
            let Some(node) = proxy.node() else {
                debug!(name = %proxy.name(), "Reactions skipped for dropped element");
                continue;
            };
            for (descriptor, reactions) in processor.process(declared, &context) {
                self.inner.store.set(&node, descriptor, reactions)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// ReactorBuilder
// ============================================================================

/// Builder for a [`Reactor`] with custom collaborators.
///
/// Anything not set falls back to the default: a [`Logbook`] logger, a
/// [`SettingStore`] seeded from the config and a [`PageGui`] sink.
pub struct ReactorBuilder {
    document: Document,
    config: Config,
    logger: Option<Arc<dyn Logger>>,
    settings: Option<Arc<dyn Settings>>,
    gui: Option<Arc<dyn GuiSink>>,
}

impl fmt::Debug for ReactorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReactorBuilder")
            .field("config", &self.config)
            .field("custom_logger", &self.logger.is_some())
            .field("custom_settings", &self.settings.is_some())
            .field("custom_gui", &self.gui.is_some())
            .finish_non_exhaustive()
    }
}

impl ReactorBuilder {
    /// Creates a builder for `document` with the default configuration.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            config: Config::default(),
            logger: None,
            settings: None,
            gui: None,
        }
    }

    /// Sets the configuration.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Sets a custom logger.
    #[inline]
    #[must_use]
    pub fn logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Sets a custom settings collaborator.
    #[inline]
    #[must_use]
    pub fn settings(mut self, settings: Arc<dyn Settings>) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets a custom GUI sink.
    #[inline]
    #[must_use]
    pub fn gui(mut self, gui: Arc<dyn GuiSink>) -> Self {
        self.gui = Some(gui);
        self
    }

    /// Validates the configuration and wires the reactor to its document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] or [`Error::InvalidDescriptor`] if the
    /// configuration is invalid.
    pub fn build(self) -> Result<Reactor> {
        self.config.validate()?;
        let prevent_default = self.config.prevent_default_chords()?;

        let gui: Arc<dyn GuiSink> = self
            .gui
            .unwrap_or_else(|| Arc::new(PageGui::new(&self.document)));

        let (logger, logbook): (Arc<dyn Logger>, _) = match self.logger {
            Some(logger) => (logger, None),
            None => {
                let logbook = Arc::new(
                    Logbook::new(self.config.log_max_entries, self.config.log_entry_max_len)
                        .with_gui(Arc::clone(&gui)),
                );
                (Arc::clone(&logbook) as Arc<dyn Logger>, Some(logbook))
            }
        };

        let settings = self
            .settings
            .unwrap_or_else(|| Arc::new(SettingStore::new(self.config.settings.clone())));

        let scheduler = Scheduler::new(Arc::clone(&logger));
        let store = Arc::new(ReactionStore::new());
        let dispatcher = DocumentDispatcher::install(
            &self.document,
            &store,
            Arc::clone(&scheduler),
            prevent_default,
        );
        let counters = Counters::new(Arc::clone(&logger)).with_gui(gui);

        let cache = Arc::new(Mutex::new(ProxyCache::default()));

        let uuid = Uuid::new_v4();
        info!(uuid = %uuid, "Reactor ready");

        Ok(Reactor {
            inner: Arc::new(ReactorInner {
                uuid,
                shared: Arc::new(Shared {
                    document: self.document,
                    scheduler,
                    logger,
                    config: self.config,
                    cache: Arc::downgrade(&cache),
                }),
                cache,
                store,
                dispatcher,
                refs: RwLock::new(FxHashMap::default()),
                settings,
                counters,
                logbook,
            }),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::dom::NativeEvent;
    use crate::logging::LogLevel;
    use crate::proxy::AccessMode;

    fn page(tag: &str, count: usize) -> (Document, Reactor) {
        let doc = Document::new();
        for i in 0..count {
            doc.body()
                .append_child(&doc.create_element(tag).with_value(format!("v{i}")))
                .unwrap();
        }
        let reactor = Reactor::new(doc.clone(), Config::default()).unwrap();
        (doc, reactor)
    }

    fn counting(count: &Arc<AtomicUsize>) -> impl Fn(&ReactionContext) -> Result<()> + Send + Sync + 'static {
        let count = Arc::clone(count);
        move |_: &ReactionContext| {
            count.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn test_pick_names_first_button() {
        let (doc, reactor) = page("button", 3);
        let proxies = reactor.query(Query::select("button").pick([0])).unwrap();
        assert_eq!(proxies.len(), 1);
        assert_eq!(proxies[0].name(), "Unnamed_1");
        assert_eq!(proxies[0].node().as_ref(), Some(&doc.body().children()[0]));
    }

    #[test]
    fn test_cached_proxy_keeps_name_and_mode() {
        let (_doc, reactor) = page("textarea", 1);
        let first = reactor.query(Query::select("textarea").name("A")).unwrap();
        let second = reactor
            .query(
                Query::select("textarea")
                    .name("B")
                    .mode(AccessMode::UserEditable),
            )
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(second[0].name(), "A_1");
        assert_eq!(second[0].mode(), AccessMode::Programmable);
    }

    #[test]
    fn test_cached_proxy_outlives_dropped_handles() {
        let (_doc, reactor) = page("textarea", 1);
        let first = reactor
            .query(
                Query::select("textarea")
                    .name("A")
                    .mode(AccessMode::UserEditable),
            )
            .unwrap()
            .remove(0);
        let uuid = *first.uuid();
        drop(first);

        let second = reactor
            .query(Query::select("textarea").name("B"))
            .unwrap()
            .remove(0);
        assert_eq!(second.uuid(), &uuid);
        assert_eq!(second.name(), "A_1");
        assert_eq!(second.mode(), AccessMode::UserEditable);
        assert!(matches!(second.set_value("x"), Err(Error::NotProgrammable { .. })));
    }

    #[test]
    fn test_static_proxies_are_not_cached() {
        let (_doc, reactor) = page("textarea", 1);
        let one = reactor
            .query(Query::select("textarea").mode(AccessMode::Static))
            .unwrap();
        let two = reactor
            .query(Query::select("textarea").mode(AccessMode::Static))
            .unwrap();
        assert_ne!(one, two);
    }

    #[tokio::test]
    async fn test_keydown_chord_runs_once_and_prevents_default() {
        let (_doc, reactor) = page("textarea", 1);
        let count = Arc::new(AtomicUsize::new(0));
        let proxies = reactor
            .query(Query::select("textarea").on("onKeydown_CtrlEnter", counting(&count)))
            .unwrap();

        let event = proxies[0]
            .node()
            .unwrap()
            .dispatch_event(NativeEvent::keydown("Enter").with_ctrl());
        assert!(event.default_prevented());

        reactor.scheduler().run_pending().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_context_carries_group_and_index() {
        let (_doc, reactor) = page("textarea", 2);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let proxies = reactor
            .query(Query::select("textarea").on("onClick", move |ctx: &ReactionContext| {
                sink.lock().push((ctx.idx(), ctx.group().len()));
                Ok(())
            }))
            .unwrap();

        proxies[1].click();
        reactor.scheduler().run_pending().await;
        assert_eq!(*seen.lock(), [(1, 2)]);
    }

    #[tokio::test]
    async fn test_equal_value_is_a_no_op() {
        let (_doc, reactor) = page("textarea", 1);
        let proxy = reactor.query(Query::select("textarea")).unwrap().remove(0);

        proxy.set_value("v0").unwrap();
        assert_eq!(reactor.scheduler().pending(), 0);
        let logbook = reactor.logbook().unwrap();
        assert!(logbook.entries_at(LogLevel::ChangeValue).is_empty());

        proxy.set_value("new").unwrap();
        assert_eq!(proxy.value().as_deref(), Some("new"));
        assert_eq!(reactor.scheduler().pending(), 1);
        let changes = logbook.entries_at(LogLevel::ChangeValue);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].message, "Unnamed_1 'v0' => 'new'.");
    }

    #[tokio::test]
    async fn test_touch_dispatches_events() {
        let (doc, reactor) = page("textarea", 1);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        doc.add_event_listener(
            "change",
            Arc::new(move |event: &mut NativeEvent| {
                sink.lock().push(event.detail().cloned());
            }),
        );

        let proxy = reactor.query(Query::select("textarea")).unwrap().remove(0);
        proxy.set_value("typed").unwrap();
        reactor.scheduler().run_pending().await;
        assert_eq!(*seen.lock(), [Some(json!({ "touch": true }))]);
    }

    #[test]
    fn test_write_policies() {
        let (_doc, reactor) = page("textarea", 1);
        let frozen = reactor
            .query(Query::select("textarea").mode(AccessMode::Static))
            .unwrap()
            .remove(0);
        assert!(matches!(frozen.set_value("x"), Err(Error::StaticProxy { .. })));
        assert!(matches!(frozen.set_text_content("x"), Err(Error::StaticProxy { .. })));
        assert!(matches!(frozen.set_tab_index(3), Err(Error::StaticProxy { .. })));
        assert!(matches!(frozen.set_spellcheck(false), Err(Error::StaticProxy { .. })));
        assert!(matches!(frozen.set_checked(true), Err(Error::StaticProxy { .. })));

        let (_doc, reactor) = page("textarea", 1);
        let user = reactor
            .query(Query::select("textarea").mode(AccessMode::UserEditable))
            .unwrap()
            .remove(0);
        assert!(matches!(user.set_value("x"), Err(Error::NotProgrammable { .. })));
        assert!(user.set_tab_index(3).is_ok());
        assert_eq!(user.tab_index(), 3);
    }

    #[test]
    fn test_static_snapshot_is_frozen() {
        let (_doc, reactor) = page("textarea", 1);
        let frozen = reactor
            .query(Query::select("textarea").mode(AccessMode::Static))
            .unwrap()
            .remove(0);
        frozen.node().unwrap().set_value("changed");
        assert_eq!(frozen.value().as_deref(), Some("v0"));
    }

    #[test]
    fn test_unsupported_element_type() {
        let (_doc, reactor) = page("button", 1);
        let button = reactor.query(Query::select("button")).unwrap().remove(0);
        assert!(matches!(
            button.set_value("x"),
            Err(Error::UnsupportedElementType { .. })
        ));
    }

    #[test]
    fn test_element_without_value_rejects_empty_write() {
        let (_doc, reactor) = page("div", 1);
        let div = reactor.query(Query::select("div")).unwrap().remove(0);
        assert_eq!(div.value(), None);
        assert!(matches!(
            div.set_value(""),
            Err(Error::UnsupportedElementType { .. })
        ));
        assert_eq!(reactor.scheduler().pending(), 0);
    }

    #[tokio::test]
    async fn test_on_load_runs_once() {
        let (_doc, reactor) = page("textarea", 1);
        let count = Arc::new(AtomicUsize::new(0));
        let proxies = reactor
            .query(Query::select("textarea").on("onLoad", counting(&count)))
            .unwrap();
        reactor.scheduler().run_pending().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        proxies[0].node().unwrap().dispatch_event(NativeEvent::new("load"));
        reactor.scheduler().run_pending().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interact_is_debounced() {
        let doc = Document::new();
        doc.body()
            .append_child(&doc.create_element("textarea"))
            .unwrap();
        let reactor = Reactor::new(doc, Config::default().with_debounce_ms(60_000)).unwrap();
        let count = Arc::new(AtomicUsize::new(0));
        let proxies = reactor
            .query(Query::select("textarea").on("onInteract", counting(&count)))
            .unwrap();

        proxies[0].click();
        proxies[0]
            .node()
            .unwrap()
            .dispatch_event(NativeEvent::keydown("KeyA"));
        reactor.scheduler().run_pending().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_global_reactions_and_reset() {
        let (_doc, reactor) = page("textarea", 1);
        let count = Arc::new(AtomicUsize::new(0));
        reactor
            .set_global(Reactions::new().on("onKeydown_AltArrowRight", counting(&count)))
            .unwrap();
        let proxy = reactor.query(Query::select("textarea")).unwrap().remove(0);

        let key = || NativeEvent::keydown("ArrowRight").with_alt();
        proxy.node().unwrap().dispatch_event(key());
        reactor.scheduler().run_pending().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        reactor.reset();
        assert_eq!(reactor.reaction_targets(), 0);
        proxy.node().unwrap().dispatch_event(key());
        reactor.scheduler().run_pending().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_removed_element_leaves_store() {
        let doc = Document::new();
        for tag in ["textarea", "button"] {
            doc.body().append_child(&doc.create_element(tag)).unwrap();
        }
        let reactor = Reactor::new(doc, Config::default()).unwrap();
        let count = Arc::new(AtomicUsize::new(0));

        let areas = reactor
            .query(Query::select("textarea").on("onClick", counting(&count)))
            .unwrap();
        assert_eq!(reactor.reaction_targets(), 1);
        areas[0].node().unwrap().remove();
        assert!(areas[0].node().is_none());

        reactor
            .query(Query::select("button").on("onClick", counting(&count)))
            .unwrap();
        assert_eq!(reactor.reaction_targets(), 1);
    }

    #[test]
    fn test_bad_reactions_fail_at_registration() {
        let (_doc, reactor) = page("textarea", 1);
        let unknown = reactor.query(Query::select("textarea").on("onHover", |_: &ReactionContext| Ok(())));
        assert!(matches!(unknown, Err(Error::UnsupportedEvent { .. })));

        let empty = reactor.query(
            Query::select("nothing").reactions(Reactions::new().on_all("onClick", Vec::new())),
        );
        assert!(matches!(empty, Err(Error::EmptyReaction { .. })));
    }

    #[test]
    fn test_css_applied() {
        let (doc, reactor) = page("textarea", 2);
        reactor
            .query(Query::select("textarea").css("outline", "1px solid red"))
            .unwrap();
        for node in doc.body().children() {
            assert_eq!(node.style("outline").as_deref(), Some("1px solid red"));
        }
    }

    #[test]
    fn test_css_on_static_query_fails() {
        let (doc, reactor) = page("textarea", 1);
        let result = reactor.query(
            Query::select("textarea")
                .mode(AccessMode::Static)
                .css("outline", "1px solid red"),
        );
        assert!(matches!(result, Err(Error::StaticProxy { .. })));
        assert_eq!(doc.body().children()[0].style("outline"), None);
    }

    #[test]
    fn test_fresh_query_has_no_side_effects() {
        let (_doc, reactor) = page("textarea", 1);
        let count = Arc::new(AtomicUsize::new(0));
        let proxies = reactor
            .query(
                Query::select("textarea")
                    .fresh()
                    .reference("fresh")
                    .on("onClick", counting(&count)),
            )
            .unwrap();
        assert_eq!(proxies[0].mode(), AccessMode::Static);
        assert!(reactor.reference("fresh").is_none());
        assert_eq!(reactor.reaction_targets(), 0);
    }

    #[test]
    fn test_references() {
        let (doc, reactor) = page("textarea", 2);
        let proxies = reactor
            .query(Query::select("textarea").name("Headline").reference("headlines"))
            .unwrap();
        assert_eq!(reactor.reference("headlines"), Some(proxies.clone()));

        let fresh = reactor.fresh_reference("headlines").unwrap();
        assert_eq!(fresh.as_ref(), Some(&proxies[0]));

        assert!(matches!(
            reactor.fresh_reference("missing"),
            Err(Error::ReferenceNotFound { .. })
        ));

        for node in doc.body().children() {
            node.remove();
        }
        drop(proxies);
        assert_eq!(reactor.fresh_reference("headlines").unwrap(), None);
    }

    #[test]
    fn test_fresh_of_uncached_element_is_static() {
        let (_doc, reactor) = page("textarea", 2);
        let frozen = reactor
            .query(
                Query::select("textarea")
                    .name("Headline")
                    .pick([1])
                    .mode(AccessMode::Static),
            )
            .unwrap()
            .remove(0);
        let again = frozen.fresh().unwrap();
        assert_eq!(again.len(), 1);
        assert_eq!(again[0].name(), "Headline_1");
        assert_eq!(again[0].node(), frozen.node());
        assert_eq!(again[0].mode(), AccessMode::Static);
        assert_ne!(again[0], frozen);
    }

    #[test]
    fn test_settings_seeded_from_config() {
        let doc = Document::new();
        let config = Config::default().with_setting("autoSubmit", true);
        let reactor = Reactor::new(doc, config).unwrap();
        assert_eq!(reactor.settings().get("autoSubmit"), Some(json!(true)));
        assert!(reactor.settings().get("missing").is_none());
    }
}

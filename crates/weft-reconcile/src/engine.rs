//! Engine entry point: passes, reports and the query surface.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashSet;

use indexmap::IndexMap;
use serde::Serialize;

use crate::apply::{Applier, HookCall};
use crate::config::ReconcileConfig;
use crate::diff::{self, PlanInput};
use crate::document::{DocumentTree, Invalidations, Renderer};
use crate::error::{ReconcileError, Result};
use crate::host::HostTree;
use crate::locate::Locator;
use crate::registry::{RecordSnapshot, Registry};
use crate::render::RenderObject;
use crate::types::{DocPosition, HostNodeId, HostPoint, LogicalId};

/// Input of one `update` call.
///
/// Every node given a rendering is invalidated implicitly. A node that is
/// invalidated without a rendering keeps its previous records.
#[derive(Debug, Default)]
pub struct Pass {
    invalidated: Invalidations,
    renderings: IndexMap<LogicalId, RenderObject>,
    force_redraw: HashSet<HostNodeId>,
}

impl Pass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every node in `nodes` for a fresh rendering.
    pub fn render_with<R>(nodes: impl IntoIterator<Item = LogicalId>, renderer: &R) -> Self
    where
        R: Renderer + ?Sized,
    {
        let mut pass = Self::new();
        for node in nodes {
            pass.invalidated.insert(node);
            if let Some(object) = renderer.render(node) {
                pass.renderings.insert(node, object);
            }
        }
        pass
    }

    pub fn invalidate(mut self, node: LogicalId) -> Self {
        self.invalidated.insert(node);
        self
    }

    pub fn render(mut self, node: LogicalId, object: RenderObject) -> Self {
        self.invalidated.insert(node);
        self.renderings.insert(node, object);
        self
    }

    /// Replace the record owning `node` wholesale, even if nothing changed.
    pub fn force_redraw(mut self, node: HostNodeId) -> Self {
        self.force_redraw.insert(node);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.invalidated.is_empty() && self.renderings.is_empty() && self.force_redraw.is_empty()
    }
}

/// What a pass did.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Logical nodes whose rendering was diffed.
    pub rendered: usize,
    pub created: usize,
    /// Matched records that needed host writes.
    pub updated: usize,
    pub unchanged: usize,
    pub released: usize,
    pub recycled: usize,
    /// Host nodes inserted or moved by container layout.
    pub moved: usize,
    pub removed_nodes: usize,
    pub hooks: usize,
}

/// Clears the running flag on exit; poisons the engine unless the pass completed.
struct PassGuard<'a> {
    updating: &'a Cell<bool>,
    poisoned: &'a Cell<bool>,
    completed: bool,
}

impl<'a> PassGuard<'a> {
    fn enter(updating: &'a Cell<bool>, poisoned: &'a Cell<bool>) -> Self {
        updating.set(true);
        Self {
            updating,
            poisoned,
            completed: false,
        }
    }
}

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.updating.set(false);
        if !self.completed {
            self.poisoned.set(true);
        }
    }
}

/// Keeps one host subtree in sync with the rendering of a logical document.
///
/// The root logical node's rendering is placed inside `mount`. Methods take
/// `&self` so lifecycle hooks holding a shared handle can query the engine
/// while a pass delivers them; a nested `update` is rejected.
pub struct Reconciler<H: HostTree> {
    host: RefCell<H>,
    registry: RefCell<Registry>,
    pending: RefCell<Invalidations>,
    config: ReconcileConfig,
    mount: HostNodeId,
    root: LogicalId,
    updating: Cell<bool>,
    poisoned: Cell<bool>,
}

impl<H: HostTree> Reconciler<H> {
    pub fn new(host: H, mount: HostNodeId, root: LogicalId) -> Self {
        Self {
            host: RefCell::new(host),
            registry: RefCell::new(Registry::new()),
            pending: RefCell::new(Invalidations::new()),
            config: ReconcileConfig::default(),
            mount,
            root,
            updating: Cell::new(false),
            poisoned: Cell::new(false),
        }
    }

    pub fn with_config(
        host: H,
        mount: HostNodeId,
        root: LogicalId,
        config: ReconcileConfig,
    ) -> Result<Self> {
        config.validate()?;
        let mut engine = Self::new(host, mount, root);
        engine.config = config;
        Ok(engine)
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn mount(&self) -> HostNodeId {
        self.mount
    }

    pub fn root(&self) -> LogicalId {
        self.root
    }

    /// Shared access to the host tree.
    ///
    /// Panics if called while the host is mutably borrowed.
    pub fn host(&self) -> Ref<'_, H> {
        self.host.borrow()
    }

    /// Exclusive access to the host tree, e.g. to simulate native edits.
    ///
    /// Panics if the host is borrowed elsewhere.
    pub fn host_mut(&self) -> RefMut<'_, H> {
        self.host.borrow_mut()
    }

    pub fn is_updating(&self) -> bool {
        self.updating.get()
    }

    pub fn is_poisoned(&self) -> bool {
        self.poisoned.get()
    }

    pub fn record_count(&self) -> usize {
        self.registry.borrow().len()
    }

    /// Queue a node for the next pass.
    pub fn invalidate(&self, node: LogicalId) {
        self.pending.borrow_mut().insert(node);
    }

    /// Drain the queued invalidations, e.g. to feed `Pass::render_with`.
    pub fn take_invalidations(&self) -> Invalidations {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    /// Run one reconciliation pass.
    ///
    /// Queued invalidations are merged into the pass. Lifecycle hooks run
    /// after every host write, before this returns.
    pub fn update(&self, pass: Pass) -> Result<PassReport> {
        if self.updating.get() {
            tracing::warn!(target: "weft::reconcile", "rejected reentrant update");
            return Err(ReconcileError::Reentrant);
        }
        if self.poisoned.get() {
            return Err(ReconcileError::Poisoned);
        }
        let mut guard = PassGuard::enter(&self.updating, &self.poisoned);

        let Pass {
            mut invalidated,
            renderings,
            force_redraw,
        } = pass;
        let mut nodes = self.take_invalidations();
        nodes.absorb(&mut invalidated);
        nodes.extend(renderings.keys().copied());

        let (mut report, hooks) = {
            let mut reg = self.registry.borrow_mut();
            let mut host = self.host.borrow_mut();
            let plan = diff::plan(
                &mut reg,
                &self.config.weights,
                PlanInput {
                    root: self.root,
                    invalidated: nodes.as_set(),
                    renderings: &renderings,
                    force_redraw: &force_redraw,
                },
            );
            let mut report = PassReport {
                rendered: plan.rendered,
                created: plan.created,
                unchanged: plan.unchanged,
                released: plan.released.len(),
                ..Default::default()
            };
            let applied =
                Applier::new(&mut reg, &mut *host, &self.config, self.mount, self.root).run(plan)?;
            report.updated = applied.updated;
            report.recycled = applied.recycled;
            report.moved = applied.moved;
            report.removed_nodes = applied.removed_nodes;
            if tracing::enabled!(target: "weft::reconcile", tracing::Level::TRACE) {
                for record in reg.snapshot() {
                    tracing::trace!(target: "weft::reconcile", record = ?record, "record after pass");
                }
            }
            (report, applied.hooks)
        };

        report.hooks = hooks.len();
        for call in &hooks {
            call.deliver();
        }
        guard.completed = true;

        tracing::debug!(
            target: "weft::reconcile",
            invalidated = nodes.len(),
            rendered = report.rendered,
            created = report.created,
            updated = report.updated,
            released = report.released,
            removed = report.removed_nodes,
            "pass complete"
        );
        Ok(report)
    }

    /// Logical nodes located at a host node or its nearest located ancestor.
    pub fn from_external(&self, node: HostNodeId) -> Vec<LogicalId> {
        let reg = self.registry.borrow();
        let host = self.host.borrow();
        Locator::new(&reg, &*host).from_external(node)
    }

    /// Host nodes of a logical node's rendering, flattened through fragments.
    pub fn to_external(&self, node: LogicalId) -> Vec<HostNodeId> {
        let reg = self.registry.borrow();
        reg.root_of(node)
            .map(|id| reg.flat_host_nodes(id))
            .unwrap_or_default()
    }

    pub fn locate(&self, node: HostNodeId, offset: usize) -> Option<DocPosition> {
        let reg = self.registry.borrow();
        let host = self.host.borrow();
        Locator::new(&reg, &*host).locate(node, offset)
    }

    pub fn get_locations<D>(&self, document: &D, position: DocPosition) -> Option<HostPoint>
    where
        D: DocumentTree + ?Sized,
    {
        let reg = self.registry.borrow();
        let host = self.host.borrow();
        Locator::new(&reg, &*host).get_locations(document, position)
    }

    /// Compare two positions, treating the end of a node as the start of
    /// whatever follows it.
    pub fn equivalent_positions<D>(&self, document: &D, a: DocPosition, b: DocPosition) -> bool
    where
        D: DocumentTree + ?Sized,
    {
        let reg = self.registry.borrow();
        let host = self.host.borrow();
        Locator::new(&reg, &*host).equivalent(document, a, b)
    }

    /// Register a host-side split of a tracked text node.
    ///
    /// `split` becomes the fragment right after `existing` in the same
    /// record. Returns `false` if `existing` is not a tracked text fragment
    /// or `split` is already tracked or not a text node.
    pub fn adopt_fragment(&self, existing: HostNodeId, split: HostNodeId) -> bool {
        let mut reg = self.registry.borrow_mut();
        let host = self.host.borrow();
        let Some(id) = reg.record_for_host(existing) else {
            return false;
        };
        let Some(record) = reg.get(id) else {
            return false;
        };
        if !record.content.is_text() || reg.is_tracked(split) || !host.is_text(split) {
            return false;
        }
        let mut nodes = record.host_nodes.clone();
        let at = nodes
            .iter()
            .position(|n| *n == existing)
            .map_or(nodes.len(), |i| i + 1);
        nodes.insert(at, split);
        reg.set_host_nodes(id, nodes);
        tracing::trace!(
            target: "weft::reconcile",
            record = %id,
            existing = %existing,
            split = %split,
            "adopted text fragment"
        );
        true
    }

    /// Serializable view of every record, sorted by id.
    pub fn snapshot(&self) -> Vec<RecordSnapshot> {
        self.registry.borrow().snapshot()
    }

    /// Detach everything and empty all tables.
    ///
    /// Tracked nodes directly under the mount are removed, detach hooks fire,
    /// and a poisoned engine becomes usable again.
    pub fn clear(&self) -> Result<()> {
        if self.updating.get() {
            return Err(ReconcileError::Reentrant);
        }
        let mut guard = PassGuard::enter(&self.updating, &self.poisoned);

        let (records, removed) = {
            let mut reg = self.registry.borrow_mut();
            let mut host = self.host.borrow_mut();
            let mut removed = Ok(());
            for child in host.children(self.mount) {
                if reg.is_tracked(child)
                    && let Err(err) = host.remove(child)
                {
                    tracing::warn!(
                        target: "weft::reconcile",
                        node = %child,
                        error = %err,
                        "failed to remove node while clearing"
                    );
                    removed = Err(err);
                }
            }
            (reg.clear(), removed)
        };
        *self.pending.borrow_mut() = Invalidations::new();

        let mut hooks = Vec::new();
        for record in records {
            if let Some(h) = record.hooks {
                hooks.push(HookCall::Detach(h, record.host_nodes));
            }
        }
        for call in &hooks {
            call.deliver();
        }
        guard.completed = true;
        drop(guard);
        self.poisoned.set(false);

        tracing::debug!(target: "weft::reconcile", hooks = hooks.len(), "cleared engine");
        removed.map_err(ReconcileError::from)
    }
}

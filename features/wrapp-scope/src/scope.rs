use std::{cell::RefCell, fmt::Debug, rc::Rc};

use crate::{
    container::{Container, Deps, Key},
    tree::{Node, Slot},
    types::Injectable,
};

/// Creates a matched [Provider] and [Accessor] for containers of shape `S`
///
/// Every call allocates its own [Slot], so pairs never see each other's containers,
/// even when they share a shape.
///
/// ```rust
/// use std::rc::Rc;
/// use wrapp_scope::{container::{Deps, Key}, scope::create_scope, tree::Node};
///
/// struct AppDeps;
/// impl AppDeps {
///     const NAME: Key<AppDeps, String> = Key::new("name");
/// }
///
/// let (provider, accessor) = create_scope::<AppDeps>();
/// let root = Node::root();
/// let scope = provider.activate(&root, Deps::new().with_value(AppDeps::NAME, "app".to_string()));
///
/// let child = scope.node().child();
/// assert_eq!(accessor.get(&child, AppDeps::NAME).as_deref().map(String::as_str), Some("app"));
/// assert!(accessor.get(&root, AppDeps::NAME).is_none());
/// ```
pub fn create_scope<S: 'static>() -> (Provider<S>, Accessor<S>) {
    let slot = Slot::unique();
    tracing::debug!(
        "Created scope {:?} for {}",
        slot,
        std::any::type_name::<S>()
    );

    (
        Provider { slot, _shape: std::marker::PhantomData },
        Accessor {
            slot,
            fallback: Rc::new(Container::new()),
        },
    )
}

/// What a provider places in the tree, emptied when the activation ends
type Publication<S> = RefCell<Option<Rc<Container<S>>>>;

/// Publishes one [Container] to a subtree
pub struct Provider<S> {
    slot: Slot,
    _shape: std::marker::PhantomData<fn() -> S>,
}
impl<S> Debug for Provider<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Provider").field(&self.slot).finish()
    }
}

impl<S: 'static> Provider<S> {
    /// Activates the provider below `parent`
    ///
    /// Builds exactly one container, assigns `deps` to it and publishes it to the returned scope's subtree.
    /// The activation lasts until the returned [ActiveScope] is dropped.
    pub fn activate(&self, parent: &Node, deps: Deps<S>) -> ActiveScope<S> {
        let mut container = Container::new();
        container.set(deps);
        let container = Rc::new(container);

        let publication: Rc<Publication<S>> = Rc::new(RefCell::new(Some(container.clone())));
        let node = parent.provide(self.slot, publication.clone());
        tracing::debug!(
            "Activated scope {:?} at depth {} with {:?}",
            self.slot,
            node.depth(),
            container
        );

        ActiveScope {
            slot: self.slot,
            container,
            publication,
            node,
        }
    }
}

/// A live activation of a [Provider]
///
/// The container is visible to the subtree for as long as the activation lasts.
/// Dropping it withdraws the container, nodes built below it then resolve nothing.
pub struct ActiveScope<S> {
    slot: Slot,
    container: Rc<Container<S>>,
    publication: Rc<Publication<S>>,
    node: Node,
}
impl<S> Debug for ActiveScope<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveScope")
            .field("slot", &self.slot)
            .field("container", &self.container)
            .finish()
    }
}

impl<S> ActiveScope<S> {
    /// Root of the subtree the container is published to
    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn container(&self) -> &Rc<Container<S>> {
        &self.container
    }

    /// Re-enters the scope after an ancestor changed
    ///
    /// The container is constructed once per activation, `deps` is NOT applied to it.
    /// The argument only exists so that a changed input is visible in the logs,
    /// reactivate the provider to publish different dependencies.
    pub fn rerender(&self, deps: Deps<S>) -> &Node {
        if !deps.is_empty() {
            tracing::debug!(
                "Scope {:?} re-rendered with {} entries, keeping the existing container",
                self.slot,
                deps.len()
            );
        }
        &self.node
    }
}
impl<S> Drop for ActiveScope<S> {
    fn drop(&mut self) {
        self.publication.borrow_mut().take();
        tracing::debug!("Deactivated scope {:?}", self.slot);
    }
}

/// Looks up services from the nearest container published by the matching [Provider]
pub struct Accessor<S> {
    slot: Slot,
    /// Resolved when no provider is active, always empty
    fallback: Rc<Container<S>>,
}
impl<S> Debug for Accessor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Accessor").field(&self.slot).finish()
    }
}

impl<S: 'static> Accessor<S> {
    /// Returns the service stored under `key` in the nearest enclosing scope of `at`
    ///
    /// Returns `None` if the key is not set there, or if no active scope encloses `at`.
    pub fn get<T: Injectable>(&self, at: &Node, key: Key<S, T>) -> Option<Rc<T>> {
        let found = self.resolve(at).get(key);
        tracing::trace!(
            "Lookup of '{}' in scope {:?}: {}",
            key.name(),
            self.slot,
            if found.is_some() { "found" } else { "absent" }
        );
        found
    }

    /// Returns the nearest enclosing container of `at`, or the empty default container
    pub fn resolve(&self, at: &Node) -> Rc<Container<S>> {
        self.nearest(at).unwrap_or_else(|| self.fallback.clone())
    }

    /// Returns true if a matching provider is active above `at`
    pub fn is_provided(&self, at: &Node) -> bool {
        self.nearest(at).is_some()
    }

    /// The nearest publication decides, a withdrawn one shadows outer scopes as well
    fn nearest(&self, at: &Node) -> Option<Rc<Container<S>>> {
        let publication = at.nearest(self.slot)?.downcast::<Publication<S>>().ok()?;
        let container = publication.borrow().clone();
        container
    }
}

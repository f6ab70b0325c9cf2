//! Wrapp Scope provides dependency injection for tree structured component hierarchies.
//!
//! Wrapp Scope is split into three parts:
//! 1. [Container](container::Container): A keyed store of service instances
//! 2. [create_scope](scope::create_scope): A Provider publishing one container to a subtree and an
//!    Accessor reading from the nearest published container
//! 3. [Observable](observable::Observable): A state value with listeners, the kind of service meant to be stored
//!
//! # Examples
//!
//! ```rust
//! use std::{cell::Cell, rc::Rc};
//! use wrapp_scope::{
//!     container::{Deps, Key},
//!     counter::CounterService,
//!     scope::create_scope,
//!     tree::Node,
//! };
//!
//! struct AppDeps;
//! impl AppDeps {
//!     const COUNTER: Key<AppDeps, CounterService> = Key::new("counter");
//! }
//!
//! let (provider, accessor) = create_scope::<AppDeps>();
//! let counter = Rc::new(CounterService::new());
//! let scope = provider.activate(&Node::root(), Deps::new().with(AppDeps::COUNTER, counter.clone()));
//!
//! // Somewhere deep in the subtree
//! let consumer = scope.node().child().child();
//! let resolved = accessor.get(&consumer, AppDeps::COUNTER).unwrap();
//!
//! let last = Rc::new(Cell::new(0));
//! let subscription = {
//!     let last = last.clone();
//!     resolved.subscribe(move |count| last.set(count))
//! };
//!
//! counter.increment().unwrap();
//! assert_eq!(last.get(), 1);
//!
//! subscription.dispose();
//! counter.increment().unwrap();
//! assert_eq!(last.get(), 1);
//! ```
//!
//! Everything here is single threaded, services are shared through `Rc`.

pub mod container;
pub mod counter;
pub mod errors;
pub mod observable;
pub mod scope;
pub mod tree;
pub mod types;

pub use container::{Container, Deps, Key};
pub use errors::NotifyError;
pub use observable::{Changes, Observable, Subscription};
pub use scope::{create_scope, Accessor, ActiveScope, Provider};
pub use tree::{Node, Slot};

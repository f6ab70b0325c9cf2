use std::{cell::Cell, rc::Rc};

use wrapp_scope::{
    container::{Deps, Key},
    counter::CounterService,
    observable::Subscription,
    scope::{create_scope, Accessor},
    tree::Node,
};

struct AppDeps;
impl AppDeps {
    const COUNTER: Key<AppDeps, CounterService> = Key::new("counter");
    const LABEL: Key<AppDeps, String> = Key::new("label");
    const MISSING: Key<AppDeps, CounterService> = Key::new("missing");
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A consumer which mirrors the latest count while it is active
struct CounterConsumer {
    shown: Rc<Cell<u64>>,
    _subscription: Option<Subscription>,
}
impl CounterConsumer {
    fn activate(at: &Node, accessor: &Accessor<AppDeps>) -> Self {
        let shown = Rc::new(Cell::new(0));
        let subscription = accessor.get(at, AppDeps::COUNTER).map(|counter| {
            let shown = shown.clone();
            counter.subscribe(move |count| shown.set(count))
        });

        CounterConsumer {
            shown,
            _subscription: subscription,
        }
    }
}

#[test]
fn provided_counter_resolves_and_missing_key_does_not() {
    init_tracing();
    let (provider, accessor) = create_scope::<AppDeps>();
    let svc = Rc::new(CounterService::new());
    let scope = provider.activate(&Node::root(), Deps::new().with(AppDeps::COUNTER, svc.clone()));

    let inside = scope.node().child();
    let resolved = accessor.get(&inside, AppDeps::COUNTER).unwrap();

    assert!(Rc::ptr_eq(&svc, &resolved));
    assert!(accessor.get(&inside, AppDeps::MISSING).is_none());
}

#[test]
fn nested_scope_shadows_only_its_own_subtree() {
    init_tracing();
    let (provider, accessor) = create_scope::<AppDeps>();
    let root = Node::root();
    let outer = provider.activate(&root, Deps::new().with_value(AppDeps::LABEL, "X".to_string()));

    let inner_parent = outer.node().child();
    let sibling = outer.node().child();
    let inner = provider.activate(
        &inner_parent,
        Deps::new().with_value(AppDeps::LABEL, "Y".to_string()),
    );

    let in_inner = inner.node().child().child();
    let in_sibling = sibling.child();

    assert_eq!(accessor.get(&in_inner, AppDeps::LABEL).as_deref().map(String::as_str), Some("Y"));
    assert_eq!(accessor.get(&in_sibling, AppDeps::LABEL).as_deref().map(String::as_str), Some("X"));
    assert!(accessor.get(&root, AppDeps::LABEL).is_none());
}

#[test]
fn consumer_follows_the_counter_while_active() {
    init_tracing();
    let (provider, accessor) = create_scope::<AppDeps>();
    let svc = Rc::new(CounterService::new());
    let scope = provider.activate(&Node::root(), Deps::new().with(AppDeps::COUNTER, svc.clone()));

    let consumer = CounterConsumer::activate(&scope.node().child(), &accessor);
    let shown = consumer.shown.clone();
    assert_eq!(svc.listener_count(), 1);

    svc.increment().unwrap();
    svc.increment().unwrap();
    assert_eq!(shown.get(), 2);

    // Deactivation
    drop(consumer);
    assert_eq!(svc.listener_count(), 0);

    svc.increment().unwrap();
    assert_eq!(shown.get(), 2);
}

#[test]
fn consumer_without_provider_sees_nothing() {
    init_tracing();
    let (_provider, accessor) = create_scope::<AppDeps>();

    let consumer = CounterConsumer::activate(&Node::root().child(), &accessor);

    assert!(consumer._subscription.is_none());
    assert_eq!(consumer.shown.get(), 0);
}

#[test]
fn deactivated_scope_withdraws_its_services() {
    init_tracing();
    let (provider, accessor) = create_scope::<AppDeps>();
    let svc = Rc::new(CounterService::new());
    let scope = provider.activate(&Node::root(), Deps::new().with(AppDeps::COUNTER, svc.clone()));
    let descendant = scope.node().child();

    svc.increment().unwrap();
    assert!(accessor.get(&descendant, AppDeps::COUNTER).is_some());
    drop(scope);

    assert!(accessor.get(&descendant, AppDeps::COUNTER).is_none());
    // The container let go of the service, the caller still owns it
    assert_eq!(Rc::strong_count(&svc), 1);
    assert_eq!(svc.count(), 1);
}

#[test]
fn changes_stream_through_the_scope() {
    use futures::StreamExt;

    init_tracing();
    let (provider, accessor) = create_scope::<AppDeps>();
    let scope = provider.activate(
        &Node::root(),
        Deps::new().with_value(AppDeps::COUNTER, CounterService::starting_at(10)),
    );
    let counter = accessor.get(scope.node(), AppDeps::COUNTER).unwrap();

    let changes = counter.changes();
    for _ in 0..3 {
        counter.increment().unwrap();
    }
    drop(scope);

    let received: Vec<u64> = futures::executor::block_on(changes.take(3).collect());
    assert_eq!(received, vec![11, 12, 13]);
}

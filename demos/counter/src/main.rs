use std::{cell::Cell, process::ExitCode, rc::Rc};

use futures::StreamExt;
use tracing_subscriber::EnvFilter;
use wrapp_scope::{
    container::{Deps, Key},
    counter::CounterService,
    observable::Subscription,
    scope::{create_scope, Accessor},
    tree::Node,
    NotifyError,
};

mod config;

use config::{ConfigError, DemoConfig};

/// Dependencies available to the demo's component tree
struct AppDeps;
impl AppDeps {
    const COUNTER: Key<AppDeps, CounterService> = Key::new("counter");
    const CONFIG: Key<AppDeps, DemoConfig> = Key::new("config");
}

#[derive(thiserror::Error, Debug)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error("No counter was provided to the consumer")]
    CounterMissing,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let result = DemoConfig::from_env()
        .map_err(DemoError::from)
        .and_then(run);
    match &result {
        Ok(count) => println!("Demo ended without error, final count {}", count),
        Err(e) => eprintln!("Demo ended with error: {}", e),
    }
    ExitCode::from(exit_status(&result))
}

/// Process exit status for the outcome of [run]
fn exit_status(result: &Result<u64, DemoError>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(DemoError::Config(_)) => 2,
        Err(_) => 1,
    }
}

/// Runs the demo and returns the final count
fn run(config: DemoConfig) -> Result<u64, DemoError> {
    let (provider, accessor) = create_scope::<AppDeps>();

    let counter = Rc::new(CounterService::starting_at(config.start));
    let root = Node::root();
    let scope = provider.activate(
        &root,
        Deps::new()
            .with(AppDeps::COUNTER, counter.clone())
            .with_value(AppDeps::CONFIG, config),
    );

    let consumer = CounterConsumer::activate(&scope.node().child(), &accessor)?;
    let changes = counter.changes();

    let clicks = accessor
        .get(scope.node(), AppDeps::CONFIG)
        .map(|config| config.clicks)
        .unwrap_or_default();
    for _ in 0..clicks {
        consumer.click()?;
        println!("Count: {}", consumer.shown());
    }

    // Unmount the consumer, further increments are not shown
    let last_shown = consumer.shown();
    drop(consumer);
    counter.increment()?;
    println!(
        "Consumer unmounted at {}, counter is now {}",
        last_shown,
        counter.count()
    );

    drop(scope);
    let seen: Vec<u64> = futures::executor::block_on(changes.take(clicks + 1).collect());
    tracing::info!("Counter went through {:?}", seen);

    Ok(counter.count())
}

/// Shows the current count and increments it on click
struct CounterConsumer {
    counter: Rc<CounterService>,
    shown: Rc<Cell<u64>>,
    _subscription: Subscription,
}
impl CounterConsumer {
    fn activate(at: &Node, accessor: &Accessor<AppDeps>) -> Result<Self, DemoError> {
        let counter = accessor
            .get(at, AppDeps::COUNTER)
            .ok_or(DemoError::CounterMissing)?;

        let shown = Rc::new(Cell::new(counter.count()));
        let subscription = {
            let shown = shown.clone();
            counter.subscribe(move |count| shown.set(count))
        };
        tracing::debug!("Consumer mounted at depth {}", at.depth());

        Ok(CounterConsumer {
            counter,
            shown,
            _subscription: subscription,
        })
    }

    fn click(&self) -> Result<u64, NotifyError> {
        self.counter.increment()
    }

    fn shown(&self) -> u64 {
        self.shown.get()
    }
}

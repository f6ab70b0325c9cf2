use crate::{
    errors::NotifyError,
    observable::{Changes, Observable, Subscription},
    types::DynError,
};

/// A counter which can be incremented and observed
#[derive(Debug)]
pub struct CounterService {
    count: Observable<u64>,
}
impl Default for CounterService {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterService {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(start: u64) -> Self {
        CounterService {
            count: Observable::new(start),
        }
    }

    /// Increments the count and notifies all listeners with the new value
    pub fn increment(&self) -> Result<u64, NotifyError> {
        self.count.update(|count| *count += 1)
    }

    pub fn count(&self) -> u64 {
        self.count.get()
    }

    pub fn subscribe(&self, listener: impl Fn(u64) + 'static) -> Subscription {
        self.count.subscribe(move |count| listener(*count))
    }

    pub fn try_subscribe(
        &self,
        listener: impl Fn(u64) -> Result<(), DynError> + 'static,
    ) -> Subscription {
        self.count.try_subscribe(move |count| listener(*count))
    }

    pub fn changes(&self) -> Changes<u64> {
        self.count.changes()
    }

    pub fn listener_count(&self) -> usize {
        self.count.listener_count()
    }
}

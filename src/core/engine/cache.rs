use std::cell::RefCell;
use std::sync::Mutex;

use thread_local::ThreadLocal;

/// Lazily builds one value per worker thread. The builder runs under a mutex
/// exactly once per thread; afterwards each thread hits only its own slot.
pub struct ThreadCache<Builder, Type>
where
    Builder: Fn() -> Type,
    Type: Send,
{
    builder: Mutex<Builder>,
    slots: ThreadLocal<RefCell<Type>>,
}

impl<Builder, Type> ThreadCache<Builder, Type>
where
    Builder: Fn() -> Type,
    Type: Send,
{
    pub fn new(builder: Builder) -> Self {
        Self { builder: Mutex::new(builder), slots: Default::default() }
    }

    pub fn get(&self) -> &RefCell<Type> {
        self.slots.get_or(|| RefCell::new(self.builder.lock().unwrap()()))
    }
}

//! Reusable instance pool for obstacles and projectiles
//!
//! An unbounded free list: `get` pops a spare instance (or builds a new one
//! when empty) and resets it; `release` pushes it back. Instances move in and
//! out by value, so a live entity can never share storage with a pooled one.

/// Free-list pool parameterized by a factory and a reset routine
pub struct ObjectPool<T> {
    free: Vec<T>,
    create: Box<dyn Fn() -> T>,
    reset: Box<dyn Fn(&mut T)>,
    /// Total instances ever built by the factory
    created: usize,
}

impl<T> ObjectPool<T> {
    /// Create a pool and pre-warm it with `initial` instances
    pub fn new(
        create: impl Fn() -> T + 'static,
        reset: impl Fn(&mut T) + 'static,
        initial: usize,
    ) -> Self {
        let mut pool = Self {
            free: Vec::with_capacity(initial),
            create: Box::new(create),
            reset: Box::new(reset),
            created: 0,
        };
        for _ in 0..initial {
            let item = (pool.create)();
            pool.created += 1;
            pool.free.push(item);
        }
        pool
    }

    /// Take an instance. The caller must fill in position and size.
    pub fn get(&mut self) -> T {
        let mut item = match self.free.pop() {
            Some(item) => item,
            None => {
                self.created += 1;
                (self.create)()
            }
        };
        (self.reset)(&mut item);
        item
    }

    /// Return an instance to the free list
    pub fn release(&mut self, item: T) {
        self.free.push(item);
    }

    /// Instances waiting in the free list
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn created(&self) -> usize {
        self.created
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("available", &self.free.len())
            .field("created", &self.created)
            .finish()
    }
}

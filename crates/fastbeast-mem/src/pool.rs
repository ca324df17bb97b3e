/// Free list of fixed-size blocks, one pool per thread. `acquire` pops an
/// idle block or constructs a fresh one; `release` pushes the block back
/// without suspending and without taking any lock. The block size is fixed
/// by the type parameter, so the free list can only ever hold blocks of the
/// declared size.
pub struct BlockPool<T> {
    make: fn() -> T,
    free: Vec<T>,
    in_use: usize,
}

impl<T> BlockPool<T> {
    pub fn new(make: fn() -> T) -> Self {
        Self {
            make,
            free: Vec::new(),
            in_use: 0,
        }
    }

    pub fn acquire(&mut self) -> T {
        self.in_use += 1;
        self.free.pop().unwrap_or_else(self.make)
    }

    pub fn release(&mut self, block: T) {
        debug_assert!(self.in_use > 0, "release without matching acquire");
        self.in_use = self.in_use.saturating_sub(1);
        self.free.push(block);
    }

    /// Blocks currently owned by callers.
    pub fn in_use(&self) -> usize {
        self.in_use
    }

    /// Blocks sitting on the free list.
    pub fn idle(&self) -> usize {
        self.free.len()
    }
}

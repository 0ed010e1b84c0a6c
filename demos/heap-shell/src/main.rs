//! Demonstrates `heap-alloc` wired up as a process-wide `GlobalAlloc`,
//! backed by a fixed-capacity arena and guarded by `kernel-sync`'s spin
//! mutex the same way a kernel would guard its heap across cores.

use std::alloc::{GlobalAlloc, Layout};

use heap_alloc::{Allocator, FixedCapacityArena};
use kernel_sync::{SpinMutex, SyncOnceCell};

// Kept small deliberately: `FixedCapacityArena`'s backing buffer lives
// inline, so constructing one on the stack before it's moved behind the
// `SyncOnceCell` must not risk overflowing a thread's stack.
const ARENA_BYTES: usize = 256 * 1024;

struct GlobalHeap {
    inner: SyncOnceCell<SpinMutex<Allocator<FixedCapacityArena<ARENA_BYTES>>>>,
}

impl GlobalHeap {
    const fn new() -> Self {
        Self { inner: SyncOnceCell::new() }
    }

    fn allocator(&self) -> &SpinMutex<Allocator<FixedCapacityArena<ARENA_BYTES>>> {
        self.inner.get_or_init(|| {
            let mut allocator = Allocator::new(FixedCapacityArena::new());
            allocator.init().expect("demo arena is large enough for the initial extension");
            SpinMutex::new(allocator)
        })
    }
}

unsafe impl GlobalAlloc for GlobalHeap {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        debug_assert!(layout.align() <= 8, "heap-alloc only guarantees 8-byte alignment");
        self.allocator()
            .lock()
            .allocate(layout.size())
            .map_or(core::ptr::null_mut(), |ptr| ptr.as_ptr())
    }

    unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
        if let Some(ptr) = core::ptr::NonNull::new(ptr) {
            unsafe { self.allocator().lock().free(ptr) };
        }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        debug_assert!(layout.align() <= 8, "heap-alloc only guarantees 8-byte alignment");
        let ptr = core::ptr::NonNull::new(ptr);
        unsafe {
            self.allocator()
                .lock()
                .reallocate(ptr, new_size)
                .map_or(core::ptr::null_mut(), |p| p.as_ptr())
        }
    }
}

#[global_allocator]
static HEAP: GlobalHeap = GlobalHeap::new();

fn main() {
    let _ = env_logger_init();

    let mut numbers = Vec::new();
    for i in 0..16 {
        numbers.push(i * i);
    }
    println!("allocated a Vec<i32> of squares: {numbers:?}");

    let boxed = Box::new(String::from("hello from heap-alloc"));
    println!("allocated a Box<String>: {boxed}");

    numbers.truncate(4);
    numbers.shrink_to_fit();
    println!("shrunk the Vec down to: {numbers:?}");

    drop(boxed);
    drop(numbers);

    HEAP.allocator()
        .lock()
        .check()
        .expect("heap must remain consistent after ordinary std collection use");
    println!("heap check: ok");
}

fn env_logger_init() -> Result<(), log::SetLoggerError> {
    struct StderrLogger;

    impl log::Log for StderrLogger {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            metadata.level() <= log::Level::Debug
        }

        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                eprintln!("[{}] {}", record.level(), record.args());
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: StderrLogger = StderrLogger;
    log::set_logger(&LOGGER)?;
    log::set_max_level(log::LevelFilter::Debug);
    Ok(())
}

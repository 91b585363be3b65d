//! `critical-section` 1.x provider for ESP-IDF builds.
//!
//! The engine lock is an `embassy-sync` `CriticalSectionRawMutex`, which
//! calls into whichever `critical-section` implementation is linked. On
//! the device that is this one: a process-wide, per-thread re-entrant
//! lock built from a std `Mutex` and `Condvar`. FreeRTOS interrupts stay
//! enabled; only tasks are excluded. Host builds link the
//! `critical-section/std` implementation instead.

#[cfg(target_os = "espidf")]
mod section {
    use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
    use std::thread::{self, ThreadId};

    struct Owner {
        thread: Option<ThreadId>,
        depth: u32,
    }

    static OWNER: Mutex<Owner> = Mutex::new(Owner {
        thread: None,
        depth: 0,
    });
    static RELEASED: Condvar = Condvar::new();

    // `Owner` stays consistent across a panic, so poisoning is ignored.
    fn owner() -> MutexGuard<'static, Owner> {
        OWNER.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns 1 when the section was already held by this thread.
    #[unsafe(no_mangle)]
    pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
        let me = thread::current().id();
        let mut o = owner();
        loop {
            match o.thread {
                None => {
                    o.thread = Some(me);
                    o.depth = 1;
                    return 0;
                }
                Some(t) if t == me => {
                    o.depth += 1;
                    return 1;
                }
                Some(_) => {
                    o = RELEASED.wait(o).unwrap_or_else(PoisonError::into_inner);
                }
            }
        }
    }

    #[unsafe(no_mangle)]
    pub extern "C" fn _critical_section_1_0_release(_nested: u8) {
        let mut o = owner();
        if o.thread != Some(thread::current().id()) {
            return;
        }
        o.depth = o.depth.saturating_sub(1);
        if o.depth == 0 {
            o.thread = None;
            RELEASED.notify_one();
        }
    }
}

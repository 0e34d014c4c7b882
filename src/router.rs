//! C2 — Thread-Local Instance Router.
//!
//! libretro's ABI callbacks (`retro_set_video_refresh`, `retro_set_environment`,
//! etc.) are plain `extern "C" fn` pointers with no user-data parameter, so a
//! callback has no way to know which `Core` it belongs to. We work around
//! this the same way the reference frontend does: a thread-local cell holds
//! a pointer to the single `Core` currently "active" on this thread, and an
//! RAII guard installs/restores it around every call into the core.

use std::cell::RefCell;
use std::ffi::c_void;
use std::ptr::NonNull;

thread_local! {
    static ACTIVE: RefCell<Option<NonNull<dyn Router>>> = const { RefCell::new(None) };
}

/// A video_refresh callback's raw arguments, still unconverted: the `Core`
/// on the receiving end knows its own current pixel format and is
/// responsible for interpreting `data`/`pitch` against it. A null `data`
/// means "duplicate the previous frame" per the libretro ABI.
pub(crate) struct RawFrame {
    pub data: *const c_void,
    pub width: u32,
    pub height: u32,
    pub pitch: usize,
}

/// Everything a libretro ABI callback needs to hand off to the owning
/// `Core<G, A>`, expressed as an object-safe trait so the thread-local cell
/// can hold a single type-erased pointer regardless of `Core`'s host-trait
/// parameters. A `Core<G, A>` implements this directly; the trait object's
/// vtable plays the role of the "downcast function pointer" the erasure
/// would otherwise need to store by hand.
pub(crate) trait Router {
    fn video_refresh(&mut self, frame: RawFrame);
    fn audio_sample(&mut self, left: i16, right: i16);
    fn audio_sample_batch(&mut self, samples: &[i16]) -> usize;
    fn input_poll(&mut self);
    fn input_state(&mut self, port: u32, device: u32, index: u32, id: u32) -> i16;
    fn environment(&mut self, command: u32, data: *mut c_void) -> bool;
}

/// Installs `instance` as the active router for the current thread for the
/// lifetime of the guard, restoring whatever was previously active (if
/// anything) when the guard drops — including when the guarded scope
/// unwinds via panic.
pub(crate) struct InstanceGuard {
    previous: Option<NonNull<dyn Router>>,
}

impl InstanceGuard {
    /// # Safety
    /// `instance` must remain valid and must not be moved for the lifetime
    /// of the returned guard.
    pub(crate) unsafe fn new(instance: &mut dyn Router) -> Self {
        let previous = ACTIVE.with_borrow_mut(|active| {
            active.replace(NonNull::new_unchecked(instance as *mut dyn Router))
        });

        Self { previous }
    }
}

impl Drop for InstanceGuard {
    fn drop(&mut self) {
        ACTIVE.with_borrow_mut(|active| *active = self.previous);
    }
}

/// Runs `f` with the currently active router, if any. Returns `None` if no
/// `Core` is active on this thread (a callback firing outside the dynamic
/// extent of any `InstanceGuard`, which should not happen for a
/// spec-conforming core, but must not be treated as memory-unsafe).
fn with_active<R>(f: impl FnOnce(&mut dyn Router) -> R) -> Option<R> {
    ACTIVE.with_borrow(|active| {
        // Safety: the pointer, if present, was installed by a live
        // `InstanceGuard` whose `new` requires it to stay valid and pinned
        // for the guard's lifetime; the guard always restores/clears this
        // cell before that lifetime ends.
        active.map(|mut ptr| f(unsafe { ptr.as_mut() }))
    })
}

pub(crate) mod ffi {
    use super::*;

    pub(crate) unsafe extern "C" fn video_refresh(
        data: *const c_void,
        width: u32,
        height: u32,
        pitch: usize,
    ) {
        with_active(|router| {
            router.video_refresh(RawFrame {
                data,
                width,
                height,
                pitch,
            })
        });
    }

    pub(crate) unsafe extern "C" fn audio_sample(left: i16, right: i16) {
        with_active(|router| router.audio_sample(left, right));
    }

    pub(crate) unsafe extern "C" fn audio_sample_batch(
        data: *const i16,
        frames: usize,
    ) -> usize {
        let samples = std::slice::from_raw_parts(data, frames * 2);
        with_active(|router| router.audio_sample_batch(samples)).unwrap_or(frames)
    }

    pub(crate) unsafe extern "C" fn input_poll() {
        with_active(|router| router.input_poll());
    }

    pub(crate) unsafe extern "C" fn input_state(
        port: u32,
        device: u32,
        index: u32,
        id: u32,
    ) -> i16 {
        with_active(|router| router.input_state(port, device, index, id)).unwrap_or(0)
    }

    pub(crate) unsafe extern "C" fn environment(command: u32, data: *mut c_void) -> bool {
        with_active(|router| router.environment(command, data)).unwrap_or(false)
    }
}

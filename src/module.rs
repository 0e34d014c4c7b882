//! C1 — Dynamic Module Loader.
//!
//! Opens a platform shared library and resolves the ~25 libretro ABI
//! symbols into a typed, C-ABI-safe façade. Holds no state beyond the
//! library handle and the resolved function pointers; closes the handle
//! on drop.

use std::ops::Deref;
use std::path::Path;

use libretro_sys::CoreAPI;

use crate::error::Error;

/// The libretro API version this host was built against. A core compiled
/// against a different version is rejected during construction.
pub const EXPECTED_API_VERSION: u32 = 1;

/// A loaded libretro core: the dynamic library plus its resolved symbol
/// table. Deref's to [`CoreAPI`] so callers invoke ABI functions directly
/// (they are all `unsafe extern "C" fn`, so call sites still read as the
/// unsafe FFI they are).
pub(crate) struct Module {
    // Order matters: `api` borrows function pointers that live inside
    // `_library`'s mapped image, so the library must outlive it on drop.
    api: CoreAPI,
    _library: libloading::Library,
    // Opts the type out of `Send`/`Sync`: a libretro core is free to stash
    // thread-local or otherwise thread-affine state during `retro_init`,
    // so a `Module` must never cross threads.
    _not_send_sync: std::marker::PhantomData<*const ()>,
}

impl Module {
    pub(crate) unsafe fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let library =
            libloading::Library::new(path.as_ref()).map_err(Error::ModuleLoadFailed)?;

        let api = CoreAPI {
            retro_set_environment: symbol(&library, "retro_set_environment")?,
            retro_set_video_refresh: symbol(&library, "retro_set_video_refresh")?,
            retro_set_audio_sample: symbol(&library, "retro_set_audio_sample")?,
            retro_set_audio_sample_batch: symbol(&library, "retro_set_audio_sample_batch")?,
            retro_set_input_poll: symbol(&library, "retro_set_input_poll")?,
            retro_set_input_state: symbol(&library, "retro_set_input_state")?,

            retro_init: symbol(&library, "retro_init")?,
            retro_deinit: symbol(&library, "retro_deinit")?,

            retro_api_version: symbol(&library, "retro_api_version")?,

            retro_get_system_info: symbol(&library, "retro_get_system_info")?,
            retro_get_system_av_info: symbol(&library, "retro_get_system_av_info")?,
            retro_set_controller_port_device: symbol(
                &library,
                "retro_set_controller_port_device",
            )?,

            retro_reset: symbol(&library, "retro_reset")?,
            retro_run: symbol(&library, "retro_run")?,

            retro_serialize_size: symbol(&library, "retro_serialize_size")?,
            retro_serialize: symbol(&library, "retro_serialize")?,
            retro_unserialize: symbol(&library, "retro_unserialize")?,

            retro_cheat_reset: symbol(&library, "retro_cheat_reset")?,
            retro_cheat_set: symbol(&library, "retro_cheat_set")?,

            retro_load_game: symbol(&library, "retro_load_game")?,
            retro_load_game_special: symbol(&library, "retro_load_game_special")?,
            retro_unload_game: symbol(&library, "retro_unload_game")?,

            retro_get_region: symbol(&library, "retro_get_region")?,
            retro_get_memory_data: symbol(&library, "retro_get_memory_data")?,
            retro_get_memory_size: symbol(&library, "retro_get_memory_size")?,
        };

        Ok(Self {
            api,
            _library: library,
            _not_send_sync: std::marker::PhantomData,
        })
    }
}

impl Deref for Module {
    type Target = CoreAPI;

    fn deref(&self) -> &Self::Target {
        &self.api
    }
}

/// Resolves one symbol, attaching its name to the error on failure so
/// construction failures name exactly which of the 25 symbols is missing.
unsafe fn symbol<T: Copy>(
    library: &libloading::Library,
    name: &'static str,
) -> Result<T, Error> {
    library
        .get::<T>(name.as_bytes())
        .map(|sym| *sym)
        .map_err(|source| Error::ModuleSymbolMissing { symbol: name, source })
}

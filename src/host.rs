//! C7 — Core Host orchestrator.
//!
//! Ties every other component to a single loaded module: owns the host's
//! graphics/audio backends, drives construction/destruction in the exact
//! order the original's `Core::Core`/`Core::~Core` use, and answers every
//! ABI callback by implementing [`Router`].

use std::ffi::{c_void, CStr, CString};
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

use libretro_sys::{GameGeometry, GameInfo, SystemAvInfo, SystemTiming};

use crate::audio::AudioPipeline;
use crate::environment::{self, ControllerInfo, EnvironmentState, HostPaths, InputDescriptor};
use crate::environment_command::EnvironmentCommand;
use crate::error::{Error, Result};
use crate::input::{Device, Input, InputStateStore};
use crate::memory_map::MemoryMap;
use crate::module::{self, Module};
use crate::router::{InstanceGuard, RawFrame, Router};
use crate::traits::{HostAudio, HostGraphics};
use crate::video::{Geometry, VideoPipeline};

/// The host's own PCM output rate. Nothing in the libretro ABI lets a core
/// dictate this — it is a property of the host audio backend the resampler
/// adapts every batch towards.
const HOST_SAMPLE_RATE_HZ: f64 = 48000.0;

/// `library_name`/`library_version`/`valid_extensions` plus the two loading
/// hints, copied out of `retro_get_system_info` at construction.
#[derive(Debug, Clone, Default)]
pub struct SystemInfo {
    pub library_name: String,
    pub library_version: String,
    pub valid_extensions: String,
    pub need_fullpath: bool,
    pub block_extract: bool,
}

impl SystemInfo {
    unsafe fn from_raw(raw: &libretro_sys::SystemInfo) -> Self {
        Self {
            library_name: environment::c_string_or_default(raw.library_name),
            library_version: environment::c_string_or_default(raw.library_version),
            valid_extensions: environment::c_string_or_default(raw.valid_extensions),
            need_fullpath: raw.need_fullpath,
            block_extract: raw.block_extract,
        }
    }
}

/// The geometry plus timing half of `retro_get_system_av_info`, cached for
/// the `getSystemAVInfo` accessor.
#[derive(Debug, Clone, Copy)]
pub struct AvInfo {
    pub geometry: Geometry,
    pub fps: f64,
    pub sample_rate: f64,
}

/// A loaded libretro core bound to a concrete host graphics/audio backend.
/// Pinned to the thread that constructed it (§5): every method that may run
/// module code acquires an [`InstanceGuard`] for its whole body.
pub struct Core<G: HostGraphics, A: HostAudio> {
    module: Module,
    graphics: G,
    audio_out: A,
    video: VideoPipeline<G>,
    audio: Option<AudioPipeline<A>>,
    env: EnvironmentState,
    input: InputStateStore,
    memory_map: MemoryMap,
    geometry: Geometry,
    fps: f64,
    sample_rate: f64,
    system_info: SystemInfo,
    // A core instance is thread-affine: it stashes a raw pointer to itself
    // in the instance router for the duration of every guarded call.
    _not_send_sync: PhantomData<*const ()>,
}

impl<G: HostGraphics, A: HostAudio> Core<G, A> {
    /// Loads `core_path`, optionally loads `rom_path` as game data, and
    /// drives the module through `retro_init`/`retro_load_game`. See
    /// spec.md §4.7 for the exact construction ordering this follows.
    pub fn new(
        core_path: impl AsRef<Path>,
        rom_path: Option<impl AsRef<Path>>,
        graphics: G,
        audio_out: A,
        paths: HostPaths,
    ) -> Result<Self> {
        let module = unsafe { Module::load(core_path)? };

        let api_version = unsafe { (module.retro_api_version)() };
        if api_version != module::EXPECTED_API_VERSION {
            return Err(Error::ApiVersionMismatch {
                expected: module::EXPECTED_API_VERSION,
                found: api_version,
            });
        }

        let mut core = Self {
            module,
            graphics,
            audio_out,
            video: VideoPipeline::new(),
            audio: None,
            env: EnvironmentState::new(paths),
            input: InputStateStore::new(),
            memory_map: MemoryMap::empty(),
            geometry: Geometry {
                base_width: 0,
                base_height: 0,
                max_width: 0,
                max_height: 0,
                aspect_ratio: 0.0,
            },
            fps: 0.0,
            sample_rate: 0.0,
            system_info: SystemInfo::default(),
            _not_send_sync: PhantomData,
        };

        // Safety: `core` is a local that is not moved again until the guard
        // below is dropped, and every module entry point called while the
        // guard is live runs on this same thread.
        let guard = unsafe { InstanceGuard::new(&mut core) };

        unsafe {
            let mut raw_system_info = libretro_sys::SystemInfo {
                library_name: std::ptr::null(),
                library_version: std::ptr::null(),
                valid_extensions: std::ptr::null(),
                need_fullpath: false,
                block_extract: false,
            };
            (core.module.retro_get_system_info)(&mut raw_system_info);
            core.system_info = SystemInfo::from_raw(&raw_system_info);

            (core.module.retro_set_environment)(crate::router::ffi::environment);
            (core.module.retro_init)();
        }

        if let Err(err) = unsafe { core.load_game(rom_path.as_ref().map(AsRef::as_ref)) } {
            unsafe { (core.module.retro_deinit)() };
            drop(guard);
            return Err(err);
        }

        unsafe { core.finish_construction() };

        drop(guard);
        Ok(core)
    }

    /// Steps 4–5 of spec.md §4.7: prepares `GameInfo` and calls
    /// `retro_load_game`. Caller is responsible for `retro_deinit` on
    /// failure.
    unsafe fn load_game(&mut self, rom_path: Option<&Path>) -> Result<()> {
        let Some(rom_path) = rom_path else {
            if !self.env.support_no_game {
                return Err(Error::NoGameData);
            }

            let success = (self.module.retro_load_game)(std::ptr::null());
            return if success { Ok(()) } else { Err(Error::LoadGameFailed) };
        };

        if self.system_info.need_fullpath {
            let path = CString::new(rom_path.to_string_lossy().into_owned())
                .map_err(|_| Error::Internal("rom path contains an interior nul byte".into()))?;

            let game_info = GameInfo {
                path: path.as_ptr(),
                data: std::ptr::null(),
                size: 0,
                meta: std::ptr::null(),
            };

            let success = (self.module.retro_load_game)(&game_info);
            return if success { Ok(()) } else { Err(Error::LoadGameFailed) };
        }

        let expected_len = fs::metadata(rom_path)
            .map_err(|source| Error::IoError {
                path: rom_path.to_owned(),
                source,
            })?
            .len();

        let data = fs::read(rom_path).map_err(|source| Error::IoError {
            path: rom_path.to_owned(),
            source,
        })?;

        if data.len() as u64 != expected_len {
            return Err(Error::ShortRead {
                path: rom_path.to_owned(),
                expected: expected_len,
                actual: data.len() as u64,
            });
        }

        let game_info = GameInfo {
            path: std::ptr::null(),
            data: data.as_ptr().cast(),
            size: data.len(),
            meta: std::ptr::null(),
        };

        let success = (self.module.retro_load_game)(&game_info);
        if success {
            Ok(())
        } else {
            Err(Error::LoadGameFailed)
        }
    }

    /// Steps 7–10 of spec.md §4.7, run only after a successful
    /// `retro_load_game`. Hardware-render context negotiation (step 7) is a
    /// no-op here: `HostGraphics` has no GPU-context surface, and hardware
    /// rendering is out of scope (see DESIGN.md).
    unsafe fn finish_construction(&mut self) {
        (self.module.retro_set_video_refresh)(crate::router::ffi::video_refresh);
        (self.module.retro_set_audio_sample)(crate::router::ffi::audio_sample);
        (self.module.retro_set_audio_sample_batch)(crate::router::ffi::audio_sample_batch);
        (self.module.retro_set_input_poll)(crate::router::ffi::input_poll);
        (self.module.retro_set_input_state)(crate::router::ffi::input_state);

        let mut av_info = SystemAvInfo {
            geometry: GameGeometry {
                aspect_ratio: 0.0,
                base_width: 0,
                base_height: 0,
                max_width: 0,
                max_height: 0,
            },
            timing: SystemTiming {
                fps: 0.0,
                sample_rate: 0.0,
            },
        };
        (self.module.retro_get_system_av_info)(&mut av_info);

        self.apply_geometry(av_info.geometry);
        self.fps = av_info.timing.fps;
        self.sample_rate = av_info.timing.sample_rate;

        self.audio = Some(AudioPipeline::new(
            &mut self.audio_out,
            av_info.timing.sample_rate,
            HOST_SAMPLE_RATE_HZ,
        ));

        for port in 0..self.env.controller_info.len() as u32 {
            (self.module.retro_set_controller_port_device)(port, Device::None as u32);
        }
    }

    fn apply_geometry(&mut self, geometry: GameGeometry) {
        self.geometry = Geometry {
            base_width: geometry.base_width,
            base_height: geometry.base_height,
            max_width: geometry.max_width,
            max_height: geometry.max_height,
            aspect_ratio: geometry.aspect_ratio,
        };
        self.video.invalidate();
    }

    /// Runs exactly one module frame.
    pub fn step(&mut self) {
        let guard = unsafe { InstanceGuard::new(self) };
        unsafe { (self.module.retro_run)() };
        drop(guard);

        if let Some(audio) = &mut self.audio {
            audio.drain_to_host(&mut self.audio_out);
        }
    }

    pub fn set_controller_port_device(&mut self, port: u32, device: u32) {
        let guard = unsafe { InstanceGuard::new(self) };
        unsafe { (self.module.retro_set_controller_port_device)(port, device) };
        drop(guard);
    }

    pub fn set_input(&mut self, port: usize, input: Input, value: i16) -> bool {
        self.input.set_input(port, input, value)
    }

    pub fn set_input_indexed(&mut self, port: usize, input: Input, index: u32, value: i16) -> bool {
        self.input.set_input_indexed(port, input, index, value)
    }

    pub fn set_key(&mut self, port: usize, input: Input, key: usize, pressed: bool) -> bool {
        self.input.set_key(port, input, key, pressed)
    }

    pub fn set_variable(&mut self, key: &str, value: &str) -> bool {
        self.env.select_variable(key, value)
    }

    pub fn reset(&mut self) {
        let guard = unsafe { InstanceGuard::new(self) };
        unsafe { (self.module.retro_reset)() };
        drop(guard);
    }

    pub fn cheat_reset(&mut self) {
        let guard = unsafe { InstanceGuard::new(self) };
        unsafe { (self.module.retro_cheat_reset)() };
        drop(guard);
    }

    pub fn cheat_set(&mut self, index: u32, enabled: bool, code: &str) -> Result<()> {
        let code = CString::new(code)
            .map_err(|_| Error::Internal("cheat code contains an interior nul byte".into()))?;

        let guard = unsafe { InstanceGuard::new(self) };
        unsafe { (self.module.retro_cheat_set)(index, enabled, code.as_ptr()) };
        drop(guard);

        Ok(())
    }

    pub fn region(&mut self) -> u32 {
        let guard = unsafe { InstanceGuard::new(self) };
        let region = unsafe { (self.module.retro_get_region)() };
        drop(guard);
        region
    }

    /// Serialize/unserialize pass through to the module verbatim (spec.md
    /// §6): no persistence policy is implemented in this crate.
    pub fn serialize(&mut self) -> Result<Vec<u8>> {
        let guard = unsafe { InstanceGuard::new(self) };

        let result = unsafe {
            let size = (self.module.retro_serialize_size)();
            let mut buffer = vec![0u8; size];
            let success = (self.module.retro_serialize)(buffer.as_mut_ptr().cast(), size);

            if success {
                Ok(buffer)
            } else {
                Err(Error::Internal("retro_serialize failed".into()))
            }
        };

        drop(guard);
        result
    }

    pub fn unserialize(&mut self, data: &[u8]) -> Result<()> {
        let guard = unsafe { InstanceGuard::new(self) };
        let success = unsafe { (self.module.retro_unserialize)(data.as_ptr().cast(), data.len()) };
        drop(guard);

        if success {
            Ok(())
        } else {
            Err(Error::Internal("retro_unserialize failed".into()))
        }
    }

    /// # Safety
    /// Same contract as [`MemoryMap::get_slice`]: the returned bytes
    /// borrow module-owned memory that is only valid for as long as the
    /// module is loaded and not concurrently mutated from another thread.
    pub fn get_memory(&self, address: usize, max_len: usize) -> Vec<u8> {
        unsafe { self.memory_map.get_slice(address, max_len) }
            .unwrap_or_default()
            .to_vec()
    }

    pub fn write_memory(&mut self, address: usize, bytes: &[u8]) -> usize {
        let Some(slice) = (unsafe { self.memory_map.get_slice_mut(address, bytes.len()) }) else {
            return 0;
        };

        let len = slice.len().min(bytes.len());
        slice[..len].copy_from_slice(&bytes[..len]);
        len
    }

    pub fn get_save_ram(&self) -> &[u8] {
        unsafe {
            let ptr = (self.module.retro_get_memory_data)(libretro_sys::MEMORY_SAVE_RAM);
            let len = (self.module.retro_get_memory_size)(libretro_sys::MEMORY_SAVE_RAM);

            if ptr.is_null() || len == 0 {
                &[]
            } else {
                std::slice::from_raw_parts(ptr.cast::<u8>(), len)
            }
        }
    }

    pub fn get_save_ram_mut(&mut self) -> &mut [u8] {
        unsafe {
            let ptr = (self.module.retro_get_memory_data)(libretro_sys::MEMORY_SAVE_RAM);
            let len = (self.module.retro_get_memory_size)(libretro_sys::MEMORY_SAVE_RAM);

            if ptr.is_null() || len == 0 {
                &mut []
            } else {
                std::slice::from_raw_parts_mut(ptr.cast::<u8>(), len)
            }
        }
    }

    pub fn image(&self) -> Option<&G::Image> {
        self.video.image()
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.geometry.normalized_aspect_ratio()
    }

    pub fn system_info(&self) -> &SystemInfo {
        &self.system_info
    }

    pub fn system_av_info(&self) -> AvInfo {
        AvInfo {
            geometry: self.geometry,
            fps: self.fps,
            sample_rate: self.sample_rate,
        }
    }

    pub fn input_descriptors(&self) -> &[InputDescriptor] {
        &self.env.input_descriptors
    }

    pub fn controller_info(&self) -> &[ControllerInfo] {
        &self.env.controller_info
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &CStr)> {
        self.env.variables()
    }

    fn dispatch_environment(&mut self, command: u32, data: *mut c_void) -> bool {
        let Some(command) = EnvironmentCommand::from_repr(command) else {
            return false;
        };

        unsafe {
            match command {
                EnvironmentCommand::GET_OVERSCAN => write_bool_out(data, false),
                EnvironmentCommand::GET_CAN_DUPE => write_bool_out(data, true),

                EnvironmentCommand::SET_PIXEL_FORMAT => match data.cast::<u32>().as_ref() {
                    Some(raw) => self.env.set_pixel_format(*raw),
                    None => false,
                },

                EnvironmentCommand::SET_PERFORMANCE_LEVEL => {
                    if let Some(level) = data.cast::<u32>().as_ref() {
                        self.env.performance_level = *level;
                    }
                    true
                }

                EnvironmentCommand::SET_ROTATION => {
                    if let Some(rotation) = data.cast::<u32>().as_ref() {
                        self.env.rotation = *rotation;
                    }
                    true
                }

                EnvironmentCommand::SET_INPUT_DESCRIPTORS => {
                    self.env.input_descriptors = environment::read_input_descriptors(data.cast_const());
                    true
                }

                EnvironmentCommand::SET_SUBSYSTEM_INFO => {
                    self.env.subsystem_info = environment::read_subsystem_info(data.cast_const());
                    true
                }

                EnvironmentCommand::SET_CONTROLLER_INFO => {
                    self.env.controller_info = environment::read_controller_info(data.cast_const());
                    true
                }

                EnvironmentCommand::SET_VARIABLES => {
                    let entries = environment::read_variables(data.cast_const());
                    self.env
                        .set_variables(entries.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                    true
                }

                EnvironmentCommand::GET_VARIABLE => {
                    let Some(variable) = data.cast::<libretro_sys::Variable>().as_mut() else {
                        return false;
                    };
                    let Some(key_ptr) = (!variable.key.is_null()).then_some(variable.key) else {
                        return false;
                    };
                    let key = CStr::from_ptr(key_ptr).to_string_lossy();

                    match self.env.get_variable(&key) {
                        Some(value) => {
                            variable.value = value.as_ptr();
                            true
                        }
                        None => {
                            variable.value = std::ptr::null();
                            false
                        }
                    }
                }

                EnvironmentCommand::GET_VARIABLE_UPDATE => {
                    let updated = self.env.take_variables_updated();
                    write_bool_out(data, updated)
                }

                EnvironmentCommand::SET_SUPPORT_NO_GAME => {
                    if let Some(flag) = data.cast::<bool>().as_ref() {
                        self.env.support_no_game = *flag;
                    }
                    true
                }

                EnvironmentCommand::SET_SUPPORT_ACHIEVEMENTS => {
                    if let Some(flag) = data.cast::<bool>().as_ref() {
                        self.env.support_achievements = *flag;
                    }
                    true
                }

                // Hardware rendering needs a GPU context `HostGraphics`
                // this crate never names (out of scope, see DESIGN.md); the
                // frontend always declines.
                EnvironmentCommand::SET_HW_RENDER => false,

                EnvironmentCommand::SET_SYSTEM_AV_INFO => match data.cast::<SystemAvInfo>().as_ref() {
                    Some(av_info) => {
                        self.apply_geometry(av_info.geometry);
                        true
                    }
                    None => false,
                },

                EnvironmentCommand::SET_GEOMETRY => match data.cast::<GameGeometry>().as_ref() {
                    Some(geometry) => {
                        self.apply_geometry(*geometry);
                        true
                    }
                    None => false,
                },

                EnvironmentCommand::SET_MEMORY_MAPS => {
                    self.memory_map = MemoryMap::from_raw(data.cast_const().cast());
                    true
                }

                EnvironmentCommand::GET_SYSTEM_DIRECTORY => {
                    write_path_out(data, self.env.paths.system_directory.as_deref())
                }
                EnvironmentCommand::GET_CORE_ASSETS_DIRECTORY => {
                    write_path_out(data, self.env.paths.core_assets_directory.as_deref())
                }
                EnvironmentCommand::GET_SAVE_DIRECTORY => {
                    write_path_out(data, self.env.paths.save_directory.as_deref())
                }
                EnvironmentCommand::GET_LIBRETRO_PATH => {
                    write_path_out(data, self.env.paths.libretro_path.as_deref())
                }

                // Answering this requires handing the module a Rust value
                // of a C-variadic function type; defining (not just
                // calling) a C-variadic function has no stable-Rust path
                // (the `c_variadic` feature is still nightly-only), so this
                // interface is declined like any other unimplemented
                // optional one. The crate still uses `log` internally for
                // its own diagnostics (see DESIGN.md).
                EnvironmentCommand::GET_LOG_INTERFACE => false,

                EnvironmentCommand::GET_LANGUAGE => {
                    if let Some(language) = data.cast::<u32>().as_mut() {
                        *language = 0; // RETRO_LANGUAGE_ENGLISH
                    }
                    true
                }

                EnvironmentCommand::SET_MESSAGE => {
                    if let Some((text, frames)) = environment::read_message(data.cast_const()) {
                        self.graphics.show_message(&text, frames);
                    }
                    true
                }

                EnvironmentCommand::GET_INPUT_DEVICE_CAPABILITIES => {
                    if let Some(caps) = data.cast::<u64>().as_mut() {
                        *caps = (1 << Device::Joypad as u64)
                            | (1 << Device::Analog as u64)
                            | (1 << Device::Mouse as u64);
                    }
                    // The original reports capabilities but still answers
                    // `false` for this command; kept for fidelity.
                    false
                }

                _ => false,
            }
        }
    }
}

unsafe fn write_bool_out(data: *mut c_void, value: bool) -> bool {
    if let Some(out) = data.cast::<bool>().as_mut() {
        *out = value;
    }
    true
}

unsafe fn write_path_out(data: *mut c_void, path: Option<&CStr>) -> bool {
    let Some(out) = data.cast::<*const std::ffi::c_char>().as_mut() else {
        return false;
    };
    *out = path.map(CStr::as_ptr).unwrap_or(std::ptr::null());
    true
}

impl<G: HostGraphics, A: HostAudio> Router for Core<G, A> {
    fn video_refresh(&mut self, frame: RawFrame) {
        let format = self.env.pixel_format;
        unsafe { self.video.refresh(&mut self.graphics, frame, format) };
    }

    fn audio_sample(&mut self, left: i16, right: i16) {
        if let Some(audio) = &mut self.audio {
            audio.mix(&[left, right]);
        }
    }

    fn audio_sample_batch(&mut self, samples: &[i16]) -> usize {
        if let Some(audio) = &mut self.audio {
            audio.mix(samples);
        }
        samples.len() / 2
    }

    fn input_poll(&mut self) {}

    fn input_state(&mut self, port: u32, device: u32, index: u32, id: u32) -> i16 {
        self.input.input_state(port, device, index, id)
    }

    fn environment(&mut self, command: u32, data: *mut c_void) -> bool {
        self.dispatch_environment(command, data)
    }
}

impl<G: HostGraphics, A: HostAudio> Drop for Core<G, A> {
    /// Destruction (spec.md §4.7): `unloadGame` then `deinit`, both
    /// attempted even if the first panics (the module is still foreign
    /// code; a panicking callback inside it must not strand the second
    /// teardown call).
    fn drop(&mut self) {
        let guard = unsafe { InstanceGuard::new(self) };

        let module = &self.module;
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe {
            (module.retro_unload_game)();
        }));
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| unsafe {
            (module.retro_deinit)();
        }));

        drop(guard);
    }
}

//! C6 — Environment Dispatcher.
//!
//! Services every `retro_environment_t` command the module can issue. Each
//! handler reads or writes exactly one piece of [`crate::host::Core`]
//! state and returns a `bool`, mirroring the libretro ABI's own contract:
//! handlers never throw, and an unrecognized or unimplemented command
//! simply returns `false`.
//!
//! `libretro-sys` only exports the handful of ABI structs the loader needs
//! (`CoreAPI`, `GameInfo`, `SystemInfo`, …); the rest of the environment
//! surface — input descriptors, controller/subsystem info, hardware
//! render negotiation — has no crate-level binding. Per the layout-compat
//! note in spec.md §9, this module reproduces those structs verbatim as
//! `#[repr(C)]` mirrors of `libretro.h` and converts them to owned,
//! safe-to-hold types at the point they're copied off the module's array.

use std::ffi::{c_char, c_void, CStr, CString};
use std::fmt;

use indexmap::IndexMap;
use libretro_sys::PixelFormat;

/// `(port, device, index, id, description)` — one entry of a
/// `SET_INPUT_DESCRIPTORS` array, owned.
#[derive(Debug, Clone)]
pub struct InputDescriptor {
    pub port: u32,
    pub device: u32,
    pub index: u32,
    pub id: u32,
    pub description: String,
}

#[repr(C)]
struct RawInputDescriptor {
    port: u32,
    device: u32,
    index: u32,
    id: u32,
    description: *const c_char,
}

#[derive(Debug, Clone)]
pub struct ControllerDescription {
    pub description: String,
    pub id: u32,
}

#[derive(Debug, Clone)]
pub struct ControllerInfo {
    pub types: Vec<ControllerDescription>,
}

#[repr(C)]
struct RawControllerDescription {
    desc: *const c_char,
    id: u32,
}

#[repr(C)]
struct RawControllerInfo {
    types: *const RawControllerDescription,
    num_types: u32,
}

#[derive(Debug, Clone)]
pub struct SubsystemInfo {
    pub description: String,
    pub ident: String,
    pub id: u32,
}

#[repr(C)]
struct RawSubsystemInfo {
    desc: *const c_char,
    ident: *const c_char,
    roms: *const c_void,
    num_roms: u32,
    id: u32,
}

/// One user-tweakable option the module advertised via `SET_VARIABLES`.
/// The selected value is kept as an owned, nul-terminated buffer so
/// `GET_VARIABLE` can hand the module a pointer that stays valid until the
/// whole table is replaced by the next `SET_VARIABLES` (spec.md §9).
struct Variable {
    options: Vec<String>,
    selected: CString,
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("options", &self.options)
            .field("selected", &self.selected)
            .finish()
    }
}

impl Variable {
    /// Parses a `SET_VARIABLES` value string: `"description; A|B|C"`.
    /// After the first `;`, leading whitespace is skipped; the remainder
    /// splits on `|` into the option list, and the first option is the
    /// default selection.
    fn parse(value: &str) -> Option<Self> {
        let (_description, rest) = value.split_once(';')?;
        let options: Vec<String> = rest.trim_start().split('|').map(str::to_owned).collect();
        let default = options.first()?.clone();

        Some(Self {
            selected: CString::new(default).ok()?,
            options,
        })
    }

    /// Succeeds only if `value` is one of the `|`-delimited options
    /// verbatim — a value that is merely a *prefix* of an option is
    /// rejected, per spec.md §8's boundary case.
    fn select(&mut self, value: &str) -> bool {
        if !self.options.iter().any(|option| option == value) {
            return false;
        }

        self.selected = CString::new(value).unwrap_or_default();
        true
    }
}

/// The three configured, process-lifetime path strings plus the module's
/// own reported path, handed back verbatim on request. None are read from
/// or written to disk by this crate.
#[derive(Debug, Clone, Default)]
pub struct HostPaths {
    pub system_directory: Option<CString>,
    pub core_assets_directory: Option<CString>,
    pub save_directory: Option<CString>,
    pub libretro_path: Option<CString>,
}

/// Everything [`crate::host::Core`] hands off to the environment
/// dispatcher: state that is only ever read or written by an environment
/// command handler, never by the frame loop directly.
pub(crate) struct EnvironmentState {
    pub pixel_format: PixelFormat,
    pub performance_level: u32,
    pub rotation: u32,
    pub input_descriptors: Vec<InputDescriptor>,
    pub controller_info: Vec<ControllerInfo>,
    pub subsystem_info: Vec<SubsystemInfo>,
    pub support_no_game: bool,
    pub support_achievements: bool,
    pub paths: HostPaths,
    variables: IndexMap<String, Variable>,
    variables_updated: bool,
}

impl EnvironmentState {
    pub fn new(paths: HostPaths) -> Self {
        Self {
            pixel_format: PixelFormat::ARGB1555,
            performance_level: 0,
            rotation: 0,
            input_descriptors: Vec::new(),
            controller_info: Vec::new(),
            subsystem_info: Vec::new(),
            support_no_game: false,
            support_achievements: false,
            paths,
            variables: IndexMap::new(),
            variables_updated: false,
        }
    }

    /// `SET_PIXEL_FORMAT` handler body. `UNKNOWN` has no direct
    /// `PixelFormat` representation in this crate's vocabulary, so it
    /// defaults to `RGB565` and reports failure, per spec.md §4.6.
    pub fn set_pixel_format(&mut self, raw: u32) -> bool {
        match PixelFormat::from_uint(raw) {
            Some(format) => {
                self.pixel_format = format;
                true
            }
            None => {
                self.pixel_format = PixelFormat::RGB565;
                false
            }
        }
    }

    /// `SET_VARIABLES` handler body: replaces the whole variable table.
    /// Entries whose value string fails to parse are skipped (and logged)
    /// rather than failing the whole call.
    pub fn set_variables<'a>(&mut self, entries: impl Iterator<Item = (&'a str, &'a str)>) {
        self.variables.clear();

        for (key, value) in entries {
            match Variable::parse(value) {
                Some(variable) => {
                    self.variables.insert(key.to_owned(), variable);
                }
                None => log::warn!("failed to parse variable `{key}` = `{value}`"),
            }
        }
    }

    /// `GET_VARIABLE` handler body: the returned pointer is stable until
    /// the next [`Self::set_variables`] call.
    pub fn get_variable(&self, key: &str) -> Option<&CStr> {
        self.variables.get(key).map(|variable| variable.selected.as_c_str())
    }

    /// Public `setVariable(key, value)` surface (spec.md §6), distinct
    /// from the `GET_VARIABLE`/`SET_VARIABLES` environment commands: lets
    /// the host itself pick an option, e.g. in response to user input.
    pub fn select_variable(&mut self, key: &str, value: &str) -> bool {
        let Some(variable) = self.variables.get_mut(key) else {
            return false;
        };

        if variable.select(value) {
            self.variables_updated = true;
            true
        } else {
            false
        }
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &CStr)> {
        self.variables
            .iter()
            .map(|(key, variable)| (key.as_str(), variable.selected.as_c_str()))
    }

    /// `GET_VARIABLE_UPDATE` handler body: returns and clears the latch.
    pub fn take_variables_updated(&mut self) -> bool {
        std::mem::take(&mut self.variables_updated)
    }
}

/// Copies a libretro "array terminated by a zeroed sentinel element"
/// pattern into an owned `Vec`, used by `SET_INPUT_DESCRIPTORS`,
/// `SET_CONTROLLER_INFO`, and `SET_SUBSYSTEM_INFO` alike.
///
/// # Safety
/// `ptr` must either be null or point to a contiguous run of `T` ending in
/// an element for which `is_sentinel` returns `true`.
unsafe fn copy_sentinel_array<T, U>(
    ptr: *const T,
    is_sentinel: impl Fn(&T) -> bool,
    convert: impl Fn(&T) -> U,
) -> Vec<U> {
    if ptr.is_null() {
        return Vec::new();
    }

    let mut out = Vec::new();
    let mut cursor = ptr;

    loop {
        let entry = &*cursor;
        if is_sentinel(entry) {
            break;
        }
        out.push(convert(entry));
        cursor = cursor.add(1);
    }

    out
}

pub(crate) unsafe fn c_string_or_default(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// # Safety
/// `data`, when non-null, must point to a `SET_INPUT_DESCRIPTORS`-shaped
/// array terminated by an entry with a null `description`.
pub(crate) unsafe fn read_input_descriptors(data: *const c_void) -> Vec<InputDescriptor> {
    copy_sentinel_array(
        data.cast::<RawInputDescriptor>(),
        |raw| raw.description.is_null(),
        |raw| InputDescriptor {
            port: raw.port,
            device: raw.device,
            index: raw.index,
            id: raw.id,
            description: c_string_or_default(raw.description),
        },
    )
}

/// # Safety
/// `data`, when non-null, must point to a `SET_CONTROLLER_INFO`-shaped
/// array terminated by an entry with a null `types` pointer.
pub(crate) unsafe fn read_controller_info(data: *const c_void) -> Vec<ControllerInfo> {
    copy_sentinel_array(
        data.cast::<RawControllerInfo>(),
        |raw| raw.types.is_null(),
        |raw| ControllerInfo {
            types: copy_sentinel_array(
                raw.types,
                |desc| desc.desc.is_null(),
                |desc| ControllerDescription {
                    description: c_string_or_default(desc.desc),
                    id: desc.id,
                },
            ),
        },
    )
}

/// # Safety
/// `data`, when non-null, must point to a `SET_SUBSYSTEM_INFO`-shaped
/// array terminated by an entry with a null `desc` pointer.
pub(crate) unsafe fn read_subsystem_info(data: *const c_void) -> Vec<SubsystemInfo> {
    copy_sentinel_array(
        data.cast::<RawSubsystemInfo>(),
        |raw| raw.desc.is_null(),
        |raw| SubsystemInfo {
            description: c_string_or_default(raw.desc),
            ident: c_string_or_default(raw.ident),
            id: raw.id,
        },
    )
}

/// # Safety
/// `data`, when non-null, must point to a `SET_VARIABLES`-shaped array
/// terminated by an entry with a null `key`.
pub(crate) unsafe fn read_variables(data: *const c_void) -> Vec<(String, String)> {
    copy_sentinel_array(
        data.cast::<libretro_sys::Variable>(),
        |raw| raw.key.is_null(),
        |raw| (c_string_or_default(raw.key), c_string_or_default(raw.value)),
    )
}

/// Mirrors `struct retro_message`; not exported by `libretro-sys`.
#[repr(C)]
struct RawMessage {
    msg: *const c_char,
    frames: u32,
}

/// # Safety
/// `data`, when non-null, must point to a valid `struct retro_message`.
pub(crate) unsafe fn read_message(data: *const c_void) -> Option<(String, u32)> {
    let raw = data.cast::<RawMessage>().as_ref()?;
    Some((c_string_or_default(raw.msg), raw.frames))
}

//! C5 — Input State Store.
//!
//! A four-dimensional `state[port][device][index][id]` table plus a
//! per-port keyboard bitmap, addressed through symbolic [`Input`] tokens
//! that pack `(device, index, id)` into a 24-bit word. Capacities and the
//! token vocabulary are carried over from the original's `Core::Input`
//! enum (`src/modules/libretro/core/Core.h`).

pub const MAX_PORTS: usize = 16;
pub const MAX_DEVICES: usize = 7;
pub const MAX_INDICES: usize = 16;
pub const MAX_IDS: usize = 17;

/// The last assigned `RETROK_*` keysym plus one; bounds the keyboard
/// bitmap's width. Matches the original's `RETROK_LAST` sizing.
pub const RETROK_LAST: usize = 323;
const KEY_STATE_BYTES: usize = (RETROK_LAST + 7) / 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::FromRepr)]
#[repr(u32)]
pub enum Device {
    None = 0,
    Joypad = 1,
    Mouse = 2,
    Keyboard = 3,
    Lightgun = 4,
    Analog = 5,
    Pointer = 6,
}

mod analog_index {
    pub const LEFT: u32 = 0;
    pub const RIGHT: u32 = 1;
    pub const BUTTON: u32 = 2;
}

mod joypad_id {
    pub const B: u32 = 0;
    pub const Y: u32 = 1;
    pub const SELECT: u32 = 2;
    pub const START: u32 = 3;
    pub const UP: u32 = 4;
    pub const DOWN: u32 = 5;
    pub const LEFT: u32 = 6;
    pub const RIGHT: u32 = 7;
    pub const A: u32 = 8;
    pub const X: u32 = 9;
    pub const L: u32 = 10;
    pub const R: u32 = 11;
    pub const L2: u32 = 12;
    pub const R2: u32 = 13;
    pub const L3: u32 = 14;
    pub const R3: u32 = 15;
}

mod analog_axis_id {
    pub const X: u32 = 0;
    pub const Y: u32 = 1;
}

mod mouse_id {
    pub const X: u32 = 0;
    pub const Y: u32 = 1;
    pub const LEFT: u32 = 2;
    pub const RIGHT: u32 = 3;
    pub const WHEELUP: u32 = 4;
    pub const WHEELDOWN: u32 = 5;
    pub const MIDDLE: u32 = 6;
    pub const HORIZ_WHEELUP: u32 = 7;
    pub const HORIZ_WHEELDOWN: u32 = 8;
    pub const BUTTON_4: u32 = 9;
    pub const BUTTON_5: u32 = 10;
}

mod lightgun_id {
    pub const TRIGGER: u32 = 2;
    pub const AUX_A: u32 = 3;
    pub const AUX_B: u32 = 4;
    pub const START: u32 = 6;
    pub const SELECT: u32 = 7;
    pub const AUX_C: u32 = 8;
    pub const DPAD_UP: u32 = 9;
    pub const DPAD_DOWN: u32 = 10;
    pub const DPAD_LEFT: u32 = 11;
    pub const DPAD_RIGHT: u32 = 12;
    pub const SCREEN_X: u32 = 13;
    pub const SCREEN_Y: u32 = 14;
    pub const IS_OFFSCREEN: u32 = 15;
    pub const RELOAD: u32 = 16;
}

mod pointer_id {
    pub const X: u32 = 0;
    pub const Y: u32 = 1;
    pub const PRESSED: u32 = 2;
}

/// A symbolic `(device, index, id)` token packed as `device << 16 | index <<
/// 8 | id`. Decoders: `device = (input >> 16) & 0xFF`, `index = (input >>
/// 8) & 0xFF`, `id = input & 0xFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Input(u32);

impl Input {
    const fn new(device: u32, index: u32, id: u32) -> Self {
        Self((device & 0xFF) << 16 | (index & 0xFF) << 8 | (id & 0xFF))
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub fn device(self) -> u32 {
        (self.0 >> 16) & 0xFF
    }

    pub fn index(self) -> u32 {
        (self.0 >> 8) & 0xFF
    }

    pub fn id(self) -> u32 {
        self.0 & 0xFF
    }

    pub const JOYPAD_B: Input = Input::new(Device::Joypad as u32, 0, joypad_id::B);
    pub const JOYPAD_Y: Input = Input::new(Device::Joypad as u32, 0, joypad_id::Y);
    pub const JOYPAD_SELECT: Input = Input::new(Device::Joypad as u32, 0, joypad_id::SELECT);
    pub const JOYPAD_START: Input = Input::new(Device::Joypad as u32, 0, joypad_id::START);
    pub const JOYPAD_UP: Input = Input::new(Device::Joypad as u32, 0, joypad_id::UP);
    pub const JOYPAD_DOWN: Input = Input::new(Device::Joypad as u32, 0, joypad_id::DOWN);
    pub const JOYPAD_LEFT: Input = Input::new(Device::Joypad as u32, 0, joypad_id::LEFT);
    pub const JOYPAD_RIGHT: Input = Input::new(Device::Joypad as u32, 0, joypad_id::RIGHT);
    pub const JOYPAD_A: Input = Input::new(Device::Joypad as u32, 0, joypad_id::A);
    pub const JOYPAD_X: Input = Input::new(Device::Joypad as u32, 0, joypad_id::X);
    pub const JOYPAD_L: Input = Input::new(Device::Joypad as u32, 0, joypad_id::L);
    pub const JOYPAD_R: Input = Input::new(Device::Joypad as u32, 0, joypad_id::R);
    pub const JOYPAD_L2: Input = Input::new(Device::Joypad as u32, 0, joypad_id::L2);
    pub const JOYPAD_R2: Input = Input::new(Device::Joypad as u32, 0, joypad_id::R2);
    pub const JOYPAD_L3: Input = Input::new(Device::Joypad as u32, 0, joypad_id::L3);
    pub const JOYPAD_R3: Input = Input::new(Device::Joypad as u32, 0, joypad_id::R3);

    pub const ANALOG_LEFT_X: Input =
        Input::new(Device::Analog as u32, analog_index::LEFT, analog_axis_id::X);
    pub const ANALOG_LEFT_Y: Input =
        Input::new(Device::Analog as u32, analog_index::LEFT, analog_axis_id::Y);
    pub const ANALOG_RIGHT_X: Input = Input::new(
        Device::Analog as u32,
        analog_index::RIGHT,
        analog_axis_id::X,
    );
    pub const ANALOG_RIGHT_Y: Input = Input::new(
        Device::Analog as u32,
        analog_index::RIGHT,
        analog_axis_id::Y,
    );

    pub const ANALOG_B: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::B);
    pub const ANALOG_Y: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::Y);
    pub const ANALOG_SELECT: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::SELECT);
    pub const ANALOG_START: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::START);
    pub const ANALOG_UP: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::UP);
    pub const ANALOG_DOWN: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::DOWN);
    pub const ANALOG_LEFT: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::LEFT);
    pub const ANALOG_RIGHT: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::RIGHT);
    pub const ANALOG_A: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::A);
    pub const ANALOG_X: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::X);
    pub const ANALOG_L: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::L);
    pub const ANALOG_R: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::R);
    pub const ANALOG_L2: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::L2);
    pub const ANALOG_R2: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::R2);
    pub const ANALOG_L3: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::L3);
    pub const ANALOG_R3: Input =
        Input::new(Device::Analog as u32, analog_index::BUTTON, joypad_id::R3);

    pub const MOUSE_X: Input = Input::new(Device::Mouse as u32, 0, mouse_id::X);
    pub const MOUSE_Y: Input = Input::new(Device::Mouse as u32, 0, mouse_id::Y);
    pub const MOUSE_LEFT: Input = Input::new(Device::Mouse as u32, 0, mouse_id::LEFT);
    pub const MOUSE_RIGHT: Input = Input::new(Device::Mouse as u32, 0, mouse_id::RIGHT);
    pub const MOUSE_WHEELUP: Input = Input::new(Device::Mouse as u32, 0, mouse_id::WHEELUP);
    pub const MOUSE_WHEELDOWN: Input = Input::new(Device::Mouse as u32, 0, mouse_id::WHEELDOWN);
    pub const MOUSE_MIDDLE: Input = Input::new(Device::Mouse as u32, 0, mouse_id::MIDDLE);
    pub const MOUSE_HORIZ_WHEELUP: Input =
        Input::new(Device::Mouse as u32, 0, mouse_id::HORIZ_WHEELUP);
    pub const MOUSE_HORIZ_WHEELDOWN: Input =
        Input::new(Device::Mouse as u32, 0, mouse_id::HORIZ_WHEELDOWN);
    pub const MOUSE_BUTTON_4: Input = Input::new(Device::Mouse as u32, 0, mouse_id::BUTTON_4);
    pub const MOUSE_BUTTON_5: Input = Input::new(Device::Mouse as u32, 0, mouse_id::BUTTON_5);

    pub const KEYBOARD: Input = Input::new(Device::Keyboard as u32, 0, 0);

    pub const LIGHTGUN_SCREEN_X: Input =
        Input::new(Device::Lightgun as u32, 0, lightgun_id::SCREEN_X);
    pub const LIGHTGUN_SCREEN_Y: Input =
        Input::new(Device::Lightgun as u32, 0, lightgun_id::SCREEN_Y);
    pub const LIGHTGUN_IS_OFFSCREEN: Input =
        Input::new(Device::Lightgun as u32, 0, lightgun_id::IS_OFFSCREEN);
    pub const LIGHTGUN_TRIGGER: Input =
        Input::new(Device::Lightgun as u32, 0, lightgun_id::TRIGGER);
    pub const LIGHTGUN_RELOAD: Input = Input::new(Device::Lightgun as u32, 0, lightgun_id::RELOAD);
    pub const LIGHTGUN_AUX_A: Input = Input::new(Device::Lightgun as u32, 0, lightgun_id::AUX_A);
    pub const LIGHTGUN_AUX_B: Input = Input::new(Device::Lightgun as u32, 0, lightgun_id::AUX_B);
    pub const LIGHTGUN_START: Input = Input::new(Device::Lightgun as u32, 0, lightgun_id::START);
    pub const LIGHTGUN_SELECT: Input = Input::new(Device::Lightgun as u32, 0, lightgun_id::SELECT);
    pub const LIGHTGUN_AUX_C: Input = Input::new(Device::Lightgun as u32, 0, lightgun_id::AUX_C);
    pub const LIGHTGUN_DPAD_UP: Input =
        Input::new(Device::Lightgun as u32, 0, lightgun_id::DPAD_UP);
    pub const LIGHTGUN_DPAD_DOWN: Input =
        Input::new(Device::Lightgun as u32, 0, lightgun_id::DPAD_DOWN);
    pub const LIGHTGUN_DPAD_LEFT: Input =
        Input::new(Device::Lightgun as u32, 0, lightgun_id::DPAD_LEFT);
    pub const LIGHTGUN_DPAD_RIGHT: Input =
        Input::new(Device::Lightgun as u32, 0, lightgun_id::DPAD_RIGHT);

    pub const POINTER_X: Input = Input::new(Device::Pointer as u32, 0, pointer_id::X);
    pub const POINTER_Y: Input = Input::new(Device::Pointer as u32, 0, pointer_id::Y);
    pub const POINTER_PRESSED: Input = Input::new(Device::Pointer as u32, 0, pointer_id::PRESSED);
}

/// The four-dimensional `state[port][device][index][id]` table plus the
/// per-port keyboard bitmap.
pub struct InputStateStore {
    state: Vec<[[[i16; MAX_IDS]; MAX_INDICES]; MAX_DEVICES]>,
    key_state: Vec<[u8; KEY_STATE_BYTES]>,
}

impl InputStateStore {
    pub fn new() -> Self {
        Self {
            state: vec![Default::default(); MAX_PORTS],
            key_state: vec![[0u8; KEY_STATE_BYTES]; MAX_PORTS],
        }
    }

    /// Writes `state[port][device(input)][index(input)][id(input)] = value`
    /// for any device but [`Device::Pointer`]. Bounds-checked: returns
    /// `false` without writing if `port` or any decoded component is out of
    /// range, or if `input`'s device is `Pointer` (which requires an
    /// explicit index via [`Self::set_input_indexed`]).
    pub fn set_input(&mut self, port: usize, input: Input, value: i16) -> bool {
        if input.device() == Device::Pointer as u32 {
            return false;
        }

        self.write(port, input.device(), input.index(), input.id(), value)
    }

    /// Writes `state[port][Pointer][index][id(input)] = value`. Only valid
    /// when `input`'s device is [`Device::Pointer`].
    pub fn set_input_indexed(
        &mut self,
        port: usize,
        input: Input,
        index: u32,
        value: i16,
    ) -> bool {
        if input.device() != Device::Pointer as u32 {
            return false;
        }

        self.write(port, input.device(), index, input.id(), value)
    }

    /// Sets or clears bit `key` in `keyState[port]`. Only valid when
    /// `input`'s device is [`Device::Keyboard`] and `key < RETROK_LAST`.
    pub fn set_key(&mut self, port: usize, input: Input, key: usize, pressed: bool) -> bool {
        if input.device() != Device::Keyboard as u32 || key >= RETROK_LAST {
            return false;
        }
        let Some(bits) = self.key_state.get_mut(port) else {
            return false;
        };

        let byte = key / 8;
        let bit = key % 8;
        if pressed {
            bits[byte] |= 1 << bit;
        } else {
            bits[byte] &= !(1 << bit);
        }

        true
    }

    fn write(&mut self, port: usize, device: u32, index: u32, id: u32, value: i16) -> bool {
        if port >= MAX_PORTS
            || device as usize >= MAX_DEVICES
            || index as usize >= MAX_INDICES
            || id as usize >= MAX_IDS
        {
            return false;
        }

        self.state[port][device as usize][index as usize][id as usize] = value;
        true
    }

    /// Answers the module's `retro_set_input_state` callback. `device` is
    /// masked to its low 8 bits first, discarding any analog/button
    /// qualifier flags a frontend-style caller might OR in above that range.
    pub fn input_state(&self, port: u32, device: u32, index: u32, id: u32) -> i16 {
        let device = device & 0xFF;
        let Some(port_state) = self.state.get(port as usize) else {
            return 0;
        };

        if device == Device::Keyboard as u32 {
            let Some(bits) = self.key_state.get(port as usize) else {
                return 0;
            };
            let key = id as usize;
            if key >= RETROK_LAST {
                return 0;
            }
            return if bits[key / 8] & (1 << (key % 8)) != 0 {
                32767
            } else {
                0
            };
        }

        port_state
            .get(device as usize)
            .and_then(|by_device| by_device.get(index as usize))
            .and_then(|by_index| by_index.get(id as usize))
            .copied()
            .unwrap_or(0)
    }
}

impl Default for InputStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn joypad_b_routes_through_port_zero() {
        let mut store = InputStateStore::new();
        assert!(store.set_input(0, Input::JOYPAD_B, 1));
        assert_eq!(
            store.input_state(0, Device::Joypad as u32, 0, joypad_id::B),
            1
        );
    }

    #[test]
    fn set_input_rejects_pointer_device() {
        let mut store = InputStateStore::new();
        assert!(!store.set_input(0, Input::POINTER_X, 5));
    }

    #[test]
    fn pointer_requires_explicit_index() {
        let mut store = InputStateStore::new();
        assert!(store.set_input_indexed(0, Input::POINTER_X, 3, 100));
        assert_eq!(
            store.input_state(0, Device::Pointer as u32, 3, pointer_id::X),
            100
        );
    }

    #[test]
    fn keyboard_read_is_32767_or_zero() {
        let mut store = InputStateStore::new();
        assert!(store.set_key(0, Input::KEYBOARD, 65, true));
        assert_eq!(store.input_state(0, Device::Keyboard as u32, 0, 65), 32767);

        store.set_key(0, Input::KEYBOARD, 65, false);
        assert_eq!(store.input_state(0, Device::Keyboard as u32, 0, 65), 0);
    }

    #[test]
    fn set_key_rejects_non_keyboard_device() {
        let mut store = InputStateStore::new();
        assert!(!store.set_key(0, Input::JOYPAD_B, 1, true));
    }

    proptest! {
        #[test]
        fn round_trips_for_any_in_range_component(
            port in 0usize..MAX_PORTS,
            device in 0u32..MAX_DEVICES as u32,
            index in 0u32..MAX_INDICES as u32,
            id in 0u32..MAX_IDS as u32,
            value in any::<i16>(),
        ) {
            // Pointer device must go through set_input_indexed, not set_input.
            prop_assume!(device != Device::Pointer as u32 && device != Device::Keyboard as u32);

            let input = Input::new(device, index, id);
            let mut store = InputStateStore::new();
            prop_assert!(store.set_input(port, input, value));
            prop_assert_eq!(store.input_state(port as u32, device, index, id), value);
        }

        #[test]
        fn out_of_range_component_is_rejected(
            port in 0usize..MAX_PORTS,
        ) {
            let input = Input::new(Device::Joypad as u32, 0, MAX_IDS as u32);
            let mut store = InputStateStore::new();
            prop_assert!(!store.set_input(port, input, 1));
        }
    }
}

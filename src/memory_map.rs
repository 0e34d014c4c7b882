//! Memory-map normalization and lookup.
//!
//! `preprocess` and its four helpers (`add_bits_down`, `inflate`, `reduce`,
//! `highest_bit`) are ported bit-for-bit from the original's free functions
//! of the same shape in `Core.cpp`, which in turn implement the same
//! descriptor-normalization algorithm RetroArch uses to fill in
//! unspecified `select`/`len`/`disconnect` fields and reconcile them
//! against each other.

use std::ffi::CStr;

fn add_bits_down(mut n: usize) -> usize {
    n |= n >> 1;
    n |= n >> 2;
    n |= n >> 4;
    n |= n >> 8;
    n |= n >> 16;
    if usize::BITS > 32 {
        n |= n >> 32;
    }
    n
}

fn inflate(mut addr: usize, mut mask: usize) -> usize {
    while mask != 0 {
        let tmp = (mask - 1) & !mask;
        addr = ((addr & !tmp) << 1) | (addr & tmp);
        mask &= mask - 1;
    }
    addr
}

fn reduce(mut addr: usize, mut mask: usize) -> usize {
    while mask != 0 {
        let tmp = (mask - 1) & !mask;
        addr = (addr & tmp) | ((addr >> 1) & !tmp);
        mask = (mask & (mask - 1)) >> 1;
    }
    addr
}

fn highest_bit(n: usize) -> usize {
    let n = add_bits_down(n);
    n ^ (n >> 1)
}

/// Normalizes every descriptor's `select`/`len`/`disconnect` fields in
/// place. Returns `false` (without guaranteeing any particular partial
/// state) if a descriptor's `len` is zero or not a power of two, or if its
/// `start` bits fall outside its `select` mask — the same cases the
/// original treats as malformed input.
pub(crate) fn preprocess(descriptors: &mut [Descriptor]) -> bool {
    let mut top_addr: usize = 1;

    for desc in descriptors.iter() {
        if desc.select != 0 {
            top_addr |= desc.select;
        } else {
            top_addr |= desc.start.wrapping_add(desc.len).wrapping_sub(1);
        }
    }
    top_addr = add_bits_down(top_addr);

    for desc in descriptors.iter_mut() {
        if desc.select == 0 {
            if desc.len == 0 {
                return false;
            }
            if desc.len & (desc.len - 1) != 0 {
                return false;
            }
            desc.select = top_addr & !inflate(add_bits_down(desc.len - 1), desc.disconnect);
        }

        if desc.len == 0 {
            desc.len = add_bits_down(reduce(top_addr & !desc.select, desc.disconnect)) + 1;
        }

        if desc.start & !desc.select != 0 {
            return false;
        }

        while reduce(top_addr & !desc.select, desc.disconnect) >> 1 > desc.len - 1 {
            desc.disconnect |= highest_bit(top_addr & !desc.select & !desc.disconnect);
        }

        let mut disconnect_mask = add_bits_down(desc.len - 1);
        desc.disconnect &= disconnect_mask;

        while (!disconnect_mask) >> 1 & desc.disconnect != 0 {
            disconnect_mask >>= 1;
            desc.disconnect &= disconnect_mask;
        }
    }

    true
}

#[derive(Debug)]
pub struct MemoryMap {
    descriptors: Vec<Descriptor>,
}

impl MemoryMap {
    pub fn empty() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// Runs [`preprocess`] over the contained descriptors. A `false`
    /// result is logged and otherwise ignored by callers — per the open
    /// question this crate inherits from the original, `SET_MEMORY_MAPS`
    /// always reports success to the core regardless.
    pub(crate) fn preprocess(&mut self) -> bool {
        preprocess(&mut self.descriptors)
    }

    pub(crate) unsafe fn get_slice(&self, addr: usize, max_len: usize) -> Option<&[u8]> {
        self.find_descriptor(addr)?.get_slice(addr, max_len)
    }

    pub(crate) unsafe fn get_slice_mut(&self, addr: usize, max_len: usize) -> Option<&mut [u8]> {
        self.find_descriptor(addr)?.get_slice_mut(addr, max_len)
    }

    fn find_descriptor(&self, addr: usize) -> Option<&Descriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.contains_address(addr))
    }

    pub unsafe fn from_raw(map: *const libretro_sys::MemoryMap) -> Self {
        if map.is_null() {
            return Self::empty();
        }

        let descriptors =
            std::slice::from_raw_parts((*map).descriptors, (*map).num_descriptors as usize)
                .iter()
                .map(|descriptor| Descriptor::from_raw_ref(descriptor))
                .collect();

        let mut map = Self { descriptors };
        if !map.preprocess() {
            log::warn!("memory map preprocessing failed; descriptors left unnormalized");
        }
        map
    }
}

#[derive(custom_debug::Debug)]
pub struct Descriptor {
    flags: u64,
    ptr: *mut u8,
    #[debug(format = "0x{:X}")]
    offset: usize,
    #[debug(format = "0x{:X}")]
    start: usize,
    #[debug(format = "0x{:X}")]
    select: usize,
    #[debug(format = "0x{:X}")]
    disconnect: usize,
    len: usize,
    address_space: String,
}

impl Descriptor {
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    /// After [`preprocess`] has normalized `select`, containment is: the
    /// address's bits outside `disconnect` (i.e. `reduce(addr, disconnect)`)
    /// equal `start` once masked by `select`.
    pub fn contains_address(&self, addr: usize) -> bool {
        if self.select != 0 {
            return reduce(addr, self.disconnect) & self.select == self.start;
        }

        self.start <= addr && addr < self.end()
    }

    unsafe fn get_raw_slice(&self, addr: usize, max_len: usize) -> Option<(*mut u8, usize)> {
        if !self.contains_address(addr) {
            return None;
        }

        let offset = addr - self.start;
        let len = (self.len - offset).min(max_len);
        let ptr = self.ptr.byte_add(self.offset + offset);

        Some((ptr, len))
    }

    unsafe fn get_slice(&self, addr: usize, max_len: usize) -> Option<&[u8]> {
        let (ptr, len) = self.get_raw_slice(addr, max_len)?;
        Some(std::slice::from_raw_parts(ptr, len))
    }

    unsafe fn get_slice_mut(&self, addr: usize, max_len: usize) -> Option<&mut [u8]> {
        let (ptr, len) = self.get_raw_slice(addr, max_len)?;
        Some(std::slice::from_raw_parts_mut(ptr, len))
    }

    unsafe fn from_raw_ref(descriptor: &libretro_sys::MemoryDescriptor) -> Self {
        let address_space = descriptor
            .addrspace
            .as_ref()
            .map(|address_space| CStr::from_ptr(address_space).to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            flags: descriptor.flags,
            ptr: descriptor.ptr.cast::<u8>(),
            offset: descriptor.offset,
            start: descriptor.start,
            select: descriptor.select,
            disconnect: descriptor.disconnect,
            len: descriptor.len,
            address_space,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn descriptor(start: usize, len: usize) -> Descriptor {
        Descriptor {
            flags: 0,
            ptr: std::ptr::null_mut(),
            offset: 0,
            start,
            select: 0,
            disconnect: 0,
            len,
            address_space: String::new(),
        }
    }

    #[test]
    fn rejects_non_power_of_two_length() {
        let mut descriptors = vec![descriptor(0, 3)];
        assert!(!preprocess(&mut descriptors));
    }

    #[test]
    fn single_descriptor_normalizes_select_to_cover_its_length() {
        let mut descriptors = vec![descriptor(0, 0x2000)];
        assert!(preprocess(&mut descriptors));
        assert!(descriptors[0].contains_address(0));
        assert!(descriptors[0].contains_address(0x1FFF));
        assert!(!descriptors[0].contains_address(0x2000));
    }

    #[test]
    fn preprocessing_is_idempotent() {
        let mut descriptors = vec![descriptor(0, 0x2000), descriptor(0x2000, 0x800)];
        assert!(preprocess(&mut descriptors));
        let first_pass: Vec<_> = descriptors
            .iter()
            .map(|d| (d.select, d.len, d.disconnect))
            .collect();

        assert!(preprocess(&mut descriptors));
        let second_pass: Vec<_> = descriptors
            .iter()
            .map(|d| (d.select, d.len, d.disconnect))
            .collect();

        assert_eq!(first_pass, second_pass);
    }

    proptest! {
        #[test]
        fn power_of_two_lengths_always_normalize(
            len_shift in 1u32..20,
            start_multiplier in 0usize..64,
        ) {
            let len = 1usize << len_shift;
            let start = start_multiplier.wrapping_mul(len);
            let mut descriptors = vec![descriptor(start, len)];
            prop_assert!(preprocess(&mut descriptors));
        }
    }
}

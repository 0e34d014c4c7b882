//! A libretro core host.
//!
//! Loads a libretro shared object, drives its frame loop, and brokers every
//! environment/video/audio/input interaction between it and a presentation
//! layer the caller supplies via [`traits::HostGraphics`]/[`traits::HostAudio`].
//! The outer binding layer, windowing, and CLI are not part of this crate —
//! see `DESIGN.md` for the scope boundary.

mod audio;
mod environment;
mod environment_command;
mod error;
mod host;
mod input;
mod memory_map;
mod module;
mod router;
mod traits;
mod video;

pub use environment::{ControllerDescription, ControllerInfo, HostPaths, InputDescriptor, SubsystemInfo};
pub use error::{Error, Result};
pub use host::{AvInfo, Core, SystemInfo};
pub use input::{Device, Input};
pub use memory_map::Descriptor as MemoryDescriptor;
pub use traits::{HostAudio, HostGraphics, HostPixelFormat};
pub use video::Geometry;

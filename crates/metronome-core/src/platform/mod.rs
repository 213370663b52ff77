// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Interfaces to the platform collaborators daemons depend on but do not own.
//!
//! Windows, display modes, graphics contexts and input devices are supplied by
//! the host application. Daemons only see these narrow traits, so any backend
//! (a real windowing stack, or the headless one used in tests) can be plugged in.

pub mod display;
pub mod graphics;
pub mod input;
pub mod surface;

pub use display::{select_display_mode, DisplayBackend, DisplayMode};
pub use graphics::{
    FrameRenderer, GraphicsBackend, GraphicsContext, GraphicsFeatures, GraphicsSetup, Projection,
};
pub use input::{InputDevice, InputSnapshot};
pub use surface::OutputSurface;

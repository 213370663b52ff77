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

use crate::math::Extent2D;

/// The output destination rendering targets, typically a window.
///
/// The surface is created and destroyed by the host on its own schedule,
/// racing with the render daemon's startup. The daemon therefore only polls
/// [`is_ready`](Self::is_ready) and never creates or destroys the surface.
pub trait OutputSurface: Send + Sync {
    /// Returns `true` once the surface can be attached to a graphics context.
    fn is_ready(&self) -> bool;

    /// Sets the user-visible title of the surface.
    fn set_title(&self, title: &str);

    /// Returns the current inner size of the surface.
    fn extent(&self) -> Extent2D;

    /// Returns `true` if the user asked to close the surface.
    fn close_requested(&self) -> bool {
        false
    }
}

// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Built-in archetypes.

mod force_many_body;
mod near_clip_plane;

pub use force_many_body::ForceManyBody;
pub use near_clip_plane::NearClipPlane;

// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Record a short keyboard performance and loop it.
//!
//! The [`session::Session`] owns the whole record/loop cycle. Everything that
//! makes noise or draws something sits behind the collaborator traits in
//! [`sound`], [`visual`] and [`status`].

pub mod clock;
pub mod config;
pub mod controller;
pub mod instruments;
pub mod looper;
pub mod recorder;
pub mod session;
pub mod sound;
pub mod status;
pub mod visual;
pub mod voices;

#[cfg(test)]
mod testutil;

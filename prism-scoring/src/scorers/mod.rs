// Copyright 2025 Prism Assessments (https://github.com/prism-assess)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Per-domain scale scorers.
//!
//! Each scorer is a pure function from (items, responses) to standardized
//! [`prism_core::ScaleScore`] rows. The [`crate::profile`] finalizer fans a
//! completed assessment out to all of them.

pub mod behavioral;
pub mod cognitive;
pub mod distortion;
pub mod interests;
pub mod learning;

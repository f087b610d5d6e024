// Copyright 2025 the election-forecaster authors.
// This file is part of election-forecaster.

// election-forecaster is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// election-forecaster is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.

// You should have received a copy of the GNU General Public License
// along with election-forecaster.  If not, see <http://www.gnu.org/licenses/>.

//! Constants and aliases assumed constant all over the forecaster.

/// The logging target.
pub const LOG_TARGET: &str = "election-forecaster";

/// Default base URI of the polling API.
pub const DEFAULT_URI: &str = "http://elections.huffingtonpost.com/pollster/api";

/// Default number of Monte Carlo trials per run.
pub const DEFAULT_TRIALS: u64 = 25_000;

/// Default cap on accumulated effective samples per region; older polls are
/// dropped once a region has this much recent signal.
pub const DEFAULT_SAMPLE_CAP: u32 = 2_000;

/// Regions reported with emphasis by default. Reporting only, no effect on the
/// simulation.
pub const DEFAULT_SWING_REGIONS: &str = "CO,FL,IA,NC,NH,NV,OH,PA,VA,WI";

/// Region identifier, a key into the electoral college table.
pub type Region = String;

// Trailhead
// Copyright 2025 The Trailhead Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Heart rate zone calculations for member profiles.

use serde::Serialize;

/// A single heart rate training zone.
#[derive(Clone, Serialize)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct HrZone {
    /// Zone number (1-5).
    pub(crate) zone: u8,

    /// Lower bound in beats per minute.
    pub(crate) min_bpm: i16,

    /// Upper bound in beats per minute.
    pub(crate) max_bpm: i16,

    /// Conventional zone name.
    pub(crate) name: &'static str,
}

/// Intensity boundaries of the five-zone model, as fractions of heart rate reserve.
const ZONES: [(u8, f64, f64, &str); 5] = [
    (1, 0.50, 0.60, "Recovery"),
    (2, 0.60, 0.70, "Aerobic"),
    (3, 0.70, 0.80, "Tempo"),
    (4, 0.80, 0.90, "Threshold"),
    (5, 0.90, 1.00, "VO2max"),
];

/// Calculates heart rate zones using the Karvonen formula.
///
/// Karvonen: target HR = ((max_hr - resting_hr) * intensity) + resting_hr, where the difference
/// is the heart rate reserve.  Callers must have validated that `resting_hr < max_hr`.
pub(crate) fn karvonen(resting_hr: i16, max_hr: i16) -> Vec<HrZone> {
    let hrr = f64::from(max_hr - resting_hr);

    let calc_hr = |intensity: f64| -> i16 {
        let hr = (hrr * intensity) + f64::from(resting_hr);
        hr.round() as i16
    };

    ZONES
        .iter()
        .map(|&(zone, min, max, name)| HrZone {
            zone,
            min_bpm: calc_hr(min),
            max_bpm: calc_hr(max),
            name,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_karvonen_reference_values() {
        let zones = karvonen(60, 190);

        assert_eq!(5, zones.len());
        assert_eq!(HrZone { zone: 1, min_bpm: 125, max_bpm: 138, name: "Recovery" }, zones[0]);
        assert_eq!(HrZone { zone: 3, min_bpm: 151, max_bpm: 164, name: "Tempo" }, zones[2]);
        assert_eq!(HrZone { zone: 5, min_bpm: 177, max_bpm: 190, name: "VO2max" }, zones[4]);
    }

    #[test]
    fn test_karvonen_zones_are_contiguous() {
        let zones = karvonen(48, 185);
        for pair in zones.windows(2) {
            assert_eq!(pair[0].max_bpm, pair[1].min_bpm);
        }
        assert_eq!(185, zones.last().unwrap().max_bpm);
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite label level of detail.
//!
//! A navaid label shows its identifier from any altitude, its frequency below
//! 20 000 ft and its full name below 5 000 ft. Hidden fields close up the gap
//! they leave.
//!
//! Run:
//! - `cargo run -p understory_demos --example lod_levels`

use kurbo::Vec2;
use understory_declutter::LodTable;

fn main() {
    env_logger::init();

    let mut lod = LodTable::new();
    lod.push_level(f64::INFINITY, 6, Vec2::ZERO);
    lod.push_level(20_000.0, 4, Vec2::new(-18.0, 0.0));
    lod.push_level(5_000.0, 12, Vec2::new(-40.0, 0.0));

    for altitude in [1_000.0, 8_000.0, 35_000.0, 12_000.0, 2_000.0] {
        let change = lod.set_altitude(altitude);
        println!(
            "{altitude:>7} ft: {} levels, {} elements, shift {:?}, total offset {:?}",
            change.visible_levels,
            change.visible_elements,
            change.shift,
            lod.offset()
        );
    }
    assert_eq!(lod.visible_levels(), 3);
    assert_eq!(lod.offset(), Vec2::ZERO);
}

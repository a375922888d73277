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

//! Integration tests for the shadow atlas planner across frames.

use proptest::prelude::*;
use vesta_core::renderer::{Allocation, ExistingAllocation, ShadowTileRequest};
use vesta_lanes::shadow_lane::{plan, ShadowAtlasPlan};

fn assert_well_formed(plan: &ShadowAtlasPlan) {
    for (i, a) in plan.allocations.iter().enumerate() {
        assert!(a.fits_within(plan.atlas_size), "{a:?} escapes the atlas");
        assert!(a.tile_size.is_power_of_two());
        assert_eq!(a.x % a.tile_size, 0);
        assert_eq!(a.y % a.tile_size, 0);
        for b in &plan.allocations[i + 1..] {
            assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
        }
    }
    assert!((0.0..=1.0).contains(&plan.utilization));
}

#[test]
fn test_four_spot_lights_fit_in_1024() {
    let requests = vec![
        ShadowTileRequest::new("spotA", 512, 1),
        ShadowTileRequest::new("spotB", 256, 1),
        ShadowTileRequest::new("spotC", 256, 1),
        ShadowTileRequest::new("spotD", 128, 1),
    ];
    let plan = plan(1024, &requests, &[]);
    assert_well_formed(&plan);
    assert_eq!(plan.allocations.len(), 4);
    assert!(plan.utilization > 0.0);
    let ids: Vec<&str> = plan.allocations.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["spotA", "spotB", "spotC", "spotD"]);
}

#[test]
fn test_placements_are_stable_over_frames() {
    let mut existing = vec![
        ExistingAllocation::new("spotA", 0, 0, 512, 1),
        ExistingAllocation::new("spotB", 512, 0, 512, 1),
    ];
    for frame in 2..6 {
        let requests = vec![
            ShadowTileRequest::new("spotA", 512, frame),
            ShadowTileRequest::new("spotB", 512, frame),
        ];
        let plan = plan(1024, &requests, &existing);
        assert_eq!(
            plan.allocations,
            vec![
                Allocation::new("spotA", 0, 0, 512),
                Allocation::new("spotB", 512, 0, 512),
            ]
        );
        existing = plan.carry_forward(&requests, &existing);
        assert!(existing.iter().all(|e| e.last_visible_frame == frame));
    }
}

#[test]
fn test_least_recently_visible_is_evicted_first() {
    let existing = vec![
        ExistingAllocation::new("recent", 0, 0, 512, 90),
        ExistingAllocation::new("stale", 512, 0, 512, 10),
        ExistingAllocation::new("older", 0, 512, 512, 40),
        ExistingAllocation::new("kept", 512, 512, 512, 95),
    ];
    let requests = vec![
        ShadowTileRequest::new("kept", 512, 100),
        ShadowTileRequest::new("new1", 512, 100),
        ShadowTileRequest::new("new2", 512, 100),
    ];
    let plan = plan(1024, &requests, &existing);
    assert_well_formed(&plan);
    assert_eq!(plan.evicted_ids, vec!["stale".to_string(), "older".to_string()]);
    assert!(plan.lookup("recent").is_some());
    assert_eq!(plan.lookup("kept"), Some(&Allocation::new("kept", 512, 512, 512)));
    assert_eq!(plan.lookup("new1"), Some(&Allocation::new("new1", 512, 0, 512)));
    assert_eq!(plan.lookup("new2"), Some(&Allocation::new("new2", 0, 512, 512)));
}

#[test]
fn test_eviction_ties_break_on_id() {
    // Fills the 512 atlas; "a" and "b" share the oldest frame.
    let existing = vec![
        ExistingAllocation::new("b", 0, 0, 256, 5),
        ExistingAllocation::new("a", 256, 0, 256, 5),
        ExistingAllocation::new("c", 0, 256, 256, 9),
        ExistingAllocation::new("d", 256, 256, 256, 9),
    ];

    let single = plan(512, &[ShadowTileRequest::new("n", 256, 10)], &existing);
    assert_well_formed(&single);
    assert_eq!(single.evicted_ids, vec!["a".to_string()]);
    assert_eq!(single.lookup("n"), Some(&Allocation::new("n", 256, 0, 256)));
    assert!(single.lookup("b").is_some());

    // "c" stays requested, so the full atlas never frees up.
    let wide = plan(
        512,
        &[
            ShadowTileRequest::new("n", 512, 10),
            ShadowTileRequest::new("c", 256, 10),
        ],
        &existing,
    );
    assert_well_formed(&wide);
    assert_eq!(
        wide.evicted_ids,
        vec!["a".to_string(), "b".to_string(), "d".to_string()]
    );
    assert_eq!(wide.lookup("n"), None);
    assert_eq!(wide.dropped_ids, vec!["n".to_string()]);
    assert_eq!(wide.lookup("c"), Some(&Allocation::new("c", 0, 256, 256)));
}

#[test]
fn test_atlas_shrink_discards_out_of_bounds_tiles() {
    let existing = vec![
        ExistingAllocation::new("inside", 0, 0, 256, 1),
        ExistingAllocation::new("outside", 512, 0, 256, 1),
    ];
    let medium = plan(300, &[], &existing);
    assert_eq!(medium.atlas_size, 512);
    assert_eq!(medium.allocations.len(), 1);
    assert!(medium.evicted_ids.is_empty());

    let small = plan(0, &[], &existing);
    assert_eq!(small.atlas_size, 256);
    assert_eq!(small.allocations, vec![Allocation::new("inside", 0, 0, 256)]);
}

#[test]
fn test_oversized_request_is_clamped() {
    let plan = plan(512, &[ShadowTileRequest::new("sun", 8192, 1)], &[]);
    assert_eq!(plan.allocations, vec![Allocation::new("sun", 0, 0, 512)]);
    assert_eq!(plan.utilization, 1.0);
}

proptest! {
    #[test]
    fn allocations_never_overlap(
        atlas in 0u32..5000,
        sizes in proptest::collection::vec(0u32..2048, 0..40),
        previous in proptest::collection::vec((0u32..64, 0u32..16, 0u32..16, 0u64..50), 0..20),
    ) {
        let requests: Vec<ShadowTileRequest> = sizes
            .iter()
            .enumerate()
            .map(|(i, size)| ShadowTileRequest::new(format!("l{i}"), *size, 100))
            .collect();
        let existing: Vec<ExistingAllocation> = previous
            .iter()
            .map(|(id, cx, cy, lvf)| {
                ExistingAllocation::new(format!("l{id}"), cx * 128, cy * 128, 128, *lvf)
            })
            .collect();

        let plan = plan(atlas, &requests, &existing);
        assert_well_formed(&plan);

        // Every request is either placed or dropped.
        for request in &requests {
            let placed = plan.lookup(&request.id).is_some();
            let dropped = plan.dropped_ids.contains(&request.id);
            prop_assert!(placed != dropped);
        }
        // Evicted tiles are gone.
        for id in &plan.evicted_ids {
            prop_assert!(plan.lookup(id).is_none());
        }
    }
}

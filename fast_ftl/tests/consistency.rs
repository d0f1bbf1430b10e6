mod util;

use fast_ftl::{FtlTrait, RW_LOG_BLOCK_COUNT};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rapidhash::RapidHashMap;
use util::{assert_consistent, device, page_request};

#[test]
fn write_then_read_resolves_the_latest_copy() {
  let mut ftl = device(4, 4, 16);
  let mut rng = StdRng::seed_from_u64(42);

  for _ in 0..200 {
    let lpn = rng.random_range(0..16);
    let mut tick = 0;
    ftl.write(&page_request(lpn), &mut tick);

    let found = ftl
      .find_valid_page(lpn)
      .expect("a just-written page must resolve");
    let (stored, valid, _) = ftl.block(found.pbn).page_info(found.page_index);
    assert!(valid);
    assert_eq!(stored, lpn);
  }
}

#[test]
fn random_workload_preserves_every_invariant() {
  let mut ftl = device(4, 8, 32);
  let mut rng = StdRng::seed_from_u64(42);
  let mut shadow: RapidHashMap<u64, u64> = RapidHashMap::default();
  let total_lpns = 32u64;

  for op in 0u64..4000 {
    let lpn = rng.random_range(0..total_lpns);

    if rng.random_range(0..4) == 0 {
      let mut tick = 0;
      ftl.read(&page_request(lpn), &mut tick);
    } else {
      let mut tick = 0;
      ftl.write(&page_request(lpn), &mut tick);
      shadow.insert(lpn, op);
    }

    if op % 200 == 0 {
      assert_consistent(&ftl);
    }
  }

  assert_consistent(&ftl);

  // Every LPN ever written still has exactly one findable copy.
  println!("Verifying {} unique LPNs...", shadow.len());
  let mut sorted_lpns: Vec<u64> = shadow.keys().copied().collect();
  sorted_lpns.sort_unstable();

  for lpn in sorted_lpns {
    let found = ftl
      .find_valid_page(lpn)
      .unwrap_or_else(|| panic!("lpn {lpn} lost its valid copy"));
    let (stored, valid, _) = ftl.block(found.pbn).page_info(found.page_index);
    assert!(valid && stored == lpn, "lpn {lpn} resolved to a stale page");
  }
}

#[test]
fn sustained_overwrites_do_not_leak_free_blocks() {
  let mut ftl = device(4, 8, 32);
  let mut rng = StdRng::seed_from_u64(7);

  let baseline = ftl.free_blocks().len();

  // Merged blocks return to the free queue, so thousands of overwrites
  // must not starve the allocator.
  for _ in 0..8000 {
    let lpn = rng.random_range(0..32);
    let mut tick = 0;
    ftl.write(&page_request(lpn), &mut tick);
  }

  let occupied = 8 /* data */ + 1 /* SW */ + RW_LOG_BLOCK_COUNT as usize;
  assert!(ftl.free_blocks().len() >= 32 - occupied - 1);
  assert!(ftl.free_blocks().len() <= baseline);
  assert!(ftl.stats().reclaimed_blocks > 0);

  assert_consistent(&ftl);
}

#[test]
fn merge_counters_track_copies() {
  let mut ftl = device(4, 4, 16);

  for lpn in 0..4 {
    let mut tick = 0;
    ftl.write(&page_request(lpn), &mut tick);
  }
  for lpn in 0..2 {
    let mut tick = 0;
    ftl.write(&page_request(lpn), &mut tick);
  }
  // Conflict merge: three pages are copied, one block reclaimed.
  let mut tick = 0;
  ftl.write(&page_request(1), &mut tick);

  assert_eq!(ftl.stats().reclaimed_blocks, 1);
  assert_eq!(ftl.stats().valid_page_copies, 3);
}

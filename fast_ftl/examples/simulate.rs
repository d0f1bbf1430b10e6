//! Warm up a small device, replay a random host workload and report the
//! simulated time the FAST mapping spent on it.
//! 预热一个小型设备，回放随机主机负载，并报告 FAST 映射消耗的模拟时间。

use fast_ftl::{FastFtl, FillingMode, FtlConfig, FtlTrait, Parameter, Request, TimingPal};
use rand::{Rng, SeedableRng, rngs::StdRng};

const OPS: u64 = 20_000;

fn page_request(lpn: u64) -> Request {
  let mut req = Request::new(1);
  req.io_flag.set_all();
  req.lpn = lpn;
  req
}

fn main() {
  let param = Parameter {
    total_logical_blocks: 128,
    total_physical_blocks: 192,
    pages_in_block: 32,
    io_unit_in_page: 1,
  };
  let conf = FtlConfig {
    fill_ratio: 0.5,
    filling_mode: FillingMode::RandomRandom,
    ..FtlConfig::default()
  };

  let mut ftl =
    FastFtl::new(conf, param, TimingPal::default()).expect("device construction failed");
  ftl.initialize().expect("warmup failed");

  let (valid, dirty) = ftl.total_page_counts();
  println!(
    "warmed up: {valid} valid / {dirty} dirty pages, free block ratio {:.2}",
    ftl.free_block_ratio()
  );

  let total = param.total_logical_pages();
  let mut rng = StdRng::seed_from_u64(42);
  let mut tick = 0u64;
  let mut reads = 0u64;
  let mut writes = 0u64;

  for _ in 0..OPS {
    let lpn = rng.random_range(0..total);
    if rng.random_range(0..2) == 0 {
      ftl.read(&page_request(lpn), &mut tick);
      reads += 1;
    } else {
      ftl.write(&page_request(lpn), &mut tick);
      writes += 1;
    }
  }

  let stats = *ftl.stats();
  println!("replayed {reads} reads + {writes} writes");
  println!(
    "simulated time: {:.3} ms ({} ns/op mean)",
    tick as f64 / 1e6,
    tick / OPS
  );
  println!(
    "merges reclaimed {} log blocks, copied {} valid pages",
    stats.reclaimed_blocks, stats.valid_page_copies
  );
  let (valid, dirty) = ftl.total_page_counts();
  println!(
    "final: {valid} valid / {dirty} dirty pages, free block ratio {:.2}",
    ftl.free_block_ratio()
  );
}

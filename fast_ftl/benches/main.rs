use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use fast_ftl::{FastFtl, FtlConfig, FtlTrait, Parameter, Request, TimingPal};
use rand::{Rng, SeedableRng, rngs::StdRng};

const SEED: u64 = 42;

const PARAM: Parameter = Parameter {
  total_logical_blocks: 64,
  total_physical_blocks: 128,
  pages_in_block: 32,
  io_unit_in_page: 1,
};

fn make_device() -> FastFtl<TimingPal> {
  FastFtl::new(FtlConfig::default(), PARAM, TimingPal::default())
    .expect("bench device construction must succeed")
}

fn page_request(lpn: u64) -> Request {
  let mut req = Request::new(1);
  req.io_flag.set_all();
  req.lpn = lpn;
  req
}

fn bench_sequential_fill(c: &mut Criterion) {
  let total = PARAM.total_logical_pages();

  c.bench_function("write/sequential_fill", |b| {
    b.iter_batched(
      make_device,
      |mut ftl| {
        for lpn in 0..total {
          let mut tick = 0;
          ftl.write(&page_request(lpn), &mut tick);
        }
        ftl
      },
      criterion::BatchSize::LargeInput,
    )
  });
}

fn bench_random_overwrite(c: &mut Criterion) {
  let total = PARAM.total_logical_pages();
  let mut ftl = make_device();
  for lpn in 0..total {
    let mut tick = 0;
    ftl.write(&page_request(lpn), &mut tick);
  }

  let mut rng = StdRng::seed_from_u64(SEED);
  let lpns: Vec<u64> = (0..8192).map(|_| rng.random_range(0..total)).collect();
  let mut i = 0;

  c.bench_function("write/random_overwrite", |b| {
    b.iter(|| {
      let lpn = lpns[i % lpns.len()];
      i += 1;
      let mut tick = 0;
      ftl.write(&page_request(black_box(lpn)), &mut tick);
      black_box(tick)
    })
  });
}

fn bench_random_read(c: &mut Criterion) {
  let total = PARAM.total_logical_pages();
  let mut ftl = make_device();
  for lpn in 0..total {
    let mut tick = 0;
    ftl.write(&page_request(lpn), &mut tick);
  }

  let mut rng = StdRng::seed_from_u64(SEED);
  let lpns: Vec<u64> = (0..8192).map(|_| rng.random_range(0..total)).collect();
  let mut i = 0;

  c.bench_function("read/random", |b| {
    b.iter(|| {
      let lpn = lpns[i % lpns.len()];
      i += 1;
      let mut tick = 0;
      ftl.read(&page_request(black_box(lpn)), &mut tick);
      black_box(tick)
    })
  });
}

criterion_group!(
  benches,
  bench_sequential_fill,
  bench_random_overwrite,
  bench_random_read
);
criterion_main!(benches);

use log::info;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
  error::{Error, Result},
  ftl::{FastFtl, conf::FillingMode},
  ftl_trait::Request,
  pal::Pal,
};

impl<P: Pal> FastFtl<P> {
  /// Pre-populate the device at boot. Each injected write runs with a
  /// fresh tick and without the PAL, so warmup is instantaneous in
  /// simulated time.
  /// 启动时预填充设备。每次注入写都使用新的 tick 且不经过 PAL，因此
  /// 预热在模拟时间上是瞬时的。
  pub(crate) fn warm_up(&mut self) -> Result<()> {
    let total_logical_pages = self.param.total_logical_pages();
    let pages_to_warmup = (total_logical_pages as f64 * self.conf.fill_ratio) as u64;
    let pages_to_invalidate = (total_logical_pages as f64 * self.conf.invalid_page_ratio) as u64;
    let mode = self.conf.filling_mode;

    info!("Initialization started");

    if pages_to_invalidate != 0 {
      return Err(Error::Config(
        "pre-invalidating warmup pages is not supported",
      ));
    }

    info!("Total logical pages: {total_logical_pages}");
    info!(
      "Total logical pages to fill: {} ({:.2} %)",
      pages_to_warmup,
      pages_to_warmup as f64 * 100.0 / total_logical_pages as f64
    );
    info!(
      "Total invalidated pages to create: {} ({:.2} %)",
      pages_to_invalidate,
      pages_to_invalidate as f64 * 100.0 / total_logical_pages as f64
    );

    let mut req = Request::new(self.param.io_unit_in_page);
    req.io_flag.set_all();

    // Step 1. Filling
    match mode {
      FillingMode::SequentialSequential | FillingMode::SequentialRandom => {
        for lpn in 0..pages_to_warmup {
          let mut tick = 0;
          req.lpn = lpn;
          self.write_internal(&req, &mut tick, false);
        }
      }
      FillingMode::RandomRandom => {
        let mut rng = StdRng::from_os_rng();
        for _ in 0..pages_to_warmup {
          let mut tick = 0;
          req.lpn = rng.random_range(0..total_logical_pages);
          self.write_internal(&req, &mut tick, false);
        }
      }
    }

    // Step 2. Invalidating
    match mode {
      FillingMode::SequentialSequential => {
        for lpn in 0..pages_to_invalidate {
          let mut tick = 0;
          req.lpn = lpn;
          self.write_internal(&req, &mut tick, false);
        }
      }
      FillingMode::SequentialRandom => {
        // Step 1 filled sequentially, so restricting the range to the
        // fill size makes the invalid-page target exactly reachable.
        let mut rng = StdRng::from_os_rng();
        for _ in 0..pages_to_invalidate {
          let mut tick = 0;
          req.lpn = rng.random_range(0..pages_to_warmup);
          self.write_internal(&req, &mut tick, false);
        }
      }
      FillingMode::RandomRandom => {
        let mut rng = StdRng::from_os_rng();
        for _ in 0..pages_to_invalidate {
          let mut tick = 0;
          req.lpn = rng.random_range(0..total_logical_pages);
          self.write_internal(&req, &mut tick, false);
        }
      }
    }

    // Report
    let (valid, invalid) = self.total_page_counts();

    info!("Filling finished. Page status:");
    info!(
      "  Total valid physical pages: {} ({:.2} %, target: {}, error: {})",
      valid,
      valid as f64 * 100.0 / total_logical_pages as f64,
      pages_to_warmup,
      valid as i64 - pages_to_warmup as i64
    );
    info!(
      "  Total invalid physical pages: {} ({:.2} %, target: {}, error: {})",
      invalid,
      invalid as f64 * 100.0 / total_logical_pages as f64,
      pages_to_invalidate,
      invalid as i64 - pages_to_invalidate as i64
    );
    info!("Initialization finished");

    Ok(())
  }
}

use log::{debug, warn};

use crate::{
  error::Result,
  ftl::{FastFtl, cpu},
  ftl_trait::{DeviceStatus, FtlTrait, LpnRange, Request, StatInfo},
  pal::Pal,
};

impl<P: Pal> FtlTrait for FastFtl<P> {
  fn initialize(&mut self) -> Result<()> {
    self.warm_up()
  }

  fn read(&mut self, req: &Request, tick: &mut u64) {
    let begin = *tick;

    if req.io_flag.count() > 0 {
      self.read_internal(req, tick);

      debug!(
        "READ  | LPN {} | {} - {} ({})",
        req.lpn,
        begin,
        *tick,
        *tick - begin
      );
    } else {
      warn!("FTL got empty request");
    }

    *tick += cpu::READ;
  }

  fn write(&mut self, req: &Request, tick: &mut u64) {
    let begin = *tick;

    if req.io_flag.count() > 0 {
      self.write_internal(req, tick, true);

      debug!(
        "WRITE | LPN {} | {} - {} ({})",
        req.lpn,
        begin,
        *tick,
        *tick - begin
      );
    } else {
      warn!("FTL got empty request");
    }

    *tick += cpu::WRITE;
  }

  fn trim(&mut self, _req: &Request, _tick: &mut u64) {
    unimplemented!("trim is not implemented");
  }

  fn format(&mut self, _range: &LpnRange, _tick: &mut u64) {
    unimplemented!("format is not implemented");
  }

  fn get_status(&mut self, _lpn_begin: u64, _lpn_end: u64) -> &DeviceStatus {
    unimplemented!("status reporting is not implemented");
  }

  fn get_stat_list(&self, _list: &mut Vec<StatInfo>, _prefix: &str) {}

  fn get_stat_values(&self, _values: &mut Vec<f64>) {}

  fn reset_stat_values(&mut self) {}
}

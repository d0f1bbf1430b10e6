use rapidhash::RapidHashMap;

use crate::{
  ftl::FastFtl,
  pal::{Pal, PalRequest},
};

/// A host page that rides along in an SW conflict merge: it has no read
/// source, it is programmed straight into the rebuilt data block.
/// 随 SW 冲突合并一并写入的主机页：没有读来源，直接编程进重建的数据块。
#[derive(Debug, Clone, Copy)]
pub(crate) struct AdditionalPage {
  pub page_index: u32,
  pub lpn: u64,
}

/// Which log block family is being merged. The engine owns the post-merge
/// disposition: an SW merge ends with a fresh unowned SW block installed,
/// an RW merge pushes a fresh unowned block onto the RW tail.
/// 被合并的日志块类别。合并后的安置由引擎负责：SW 合并以安装一个全新
/// 无主的 SW 块收尾，RW 合并则把新块推入 RW 队尾。
#[derive(Debug, Clone, Copy)]
pub(crate) enum MergeKind {
  Sw { additional: Option<AdditionalPage> },
  Rw,
}

impl<P: Pal> FastFtl<P> {
  /// Garbage-collect one log block back into data blocks, emitting the
  /// read/write/erase sub-operations and rewriting the mapping tables.
  /// Returns the replacement block pushed into the RW pool, if any.
  /// 把一个日志块垃圾回收回数据块：发出读/写/擦除子操作并改写映射表。
  /// 若向 RW 池补充了新块则返回其编号。
  ///
  /// Timing: reads run in parallel from the current tick; writes and
  /// erases start together once every read has finished and run in
  /// parallel with each other.
  /// 时序：读操作从当前 tick 并行开始；全部读完成后，写与擦除一同
  /// 起步并相互并行。
  pub(crate) fn merge_log_block(
    &mut self,
    log_pbn: u32,
    kind: MergeKind,
    tick: &mut u64,
    send_to_pal: bool,
  ) -> Option<u32> {
    let pages = self.param.pages_in_block;

    // (pbn, page)
    let mut reads: Vec<(u32, u32)> = Vec::new();
    // (pbn, page, lpn); the lpn feeds the post-state block metadata.
    let mut writes: Vec<(u32, u32, u64)> = Vec::new();
    let mut erases: Vec<u32> = Vec::new();
    let mut replacement = None;

    match kind {
      MergeKind::Rw => {
        // The victim holds scattered pages of one or more logical
        // blocks. Every owner gets a rebuilt data block.
        let mut lbns: Vec<u32> = Vec::new();

        for i in 0..pages {
          let (lpn, valid, _) = self.blocks[log_pbn as usize].page_info(i);
          if valid {
            lbns.push(self.lbn_of(lpn));
            self.tables.rw_log_map.remove(&lpn);
          }
        }

        lbns.sort_unstable();
        lbns.dedup();

        let mut lbn_to_new: RapidHashMap<u32, u32> = RapidHashMap::default();
        let mut lbn_to_old: RapidHashMap<u32, u32> = RapidHashMap::default();

        for &lbn in &lbns {
          let new_pbn = self.tables.get_free_block();
          let old_pbn = self.tables.l2p[lbn as usize]
            .expect("a page in a log block implies a mapped logical block");

          lbn_to_new.insert(lbn, new_pbn);
          lbn_to_old.insert(lbn, old_pbn);

          self.tables.p2l[new_pbn as usize] = Some(lbn);
          self.tables.l2p[lbn as usize] = Some(new_pbn);
          self.tables.p2l[old_pbn as usize] = None;
        }

        for &lbn in &lbns {
          let old_pbn = lbn_to_old[&lbn];
          let new_pbn = lbn_to_new[&lbn];

          // Surviving pages of the old data block move over.
          for i in 0..pages {
            if self.blocks[old_pbn as usize].is_valid(i) {
              reads.push((old_pbn, i));
              writes.push((new_pbn, i, lbn as u64 * pages as u64 + i as u64));
            }
          }

          erases.push(old_pbn);
        }

        // Valid pages of the victim land at their home offsets.
        for i in 0..pages {
          if self.blocks[log_pbn as usize].is_valid(i) {
            let lpn = self.blocks[log_pbn as usize].lpn(i);
            reads.push((log_pbn, i));
            writes.push((lbn_to_new[&self.lbn_of(lpn)], self.offset_of(lpn), lpn));
          }
        }

        erases.push(log_pbn);

        // Refill the RW pool with a fresh unowned block.
        let fresh = self.tables.get_free_block();
        self.tables.p2l[fresh as usize] = None;
        self.tables.rw_blocks.push_back(fresh);
        replacement = Some(fresh);
      }
      MergeKind::Sw { additional } => {
        // A conflict dirties the SW page at its offset before the merge
        // starts, so a fully valid log block never carries an
        // additional page.
        debug_assert!(
          !(additional.is_some() && self.blocks[log_pbn as usize].valid_page_count() == pages),
          "SW merge with an additional page requires a non-full log block"
        );

        let owner = self.tables.p2l[log_pbn as usize].expect("SW log block must have an owner");
        let old_pbn =
          self.tables.l2p[owner as usize].expect("SW owner must have a mapped data block");

        if additional.is_none() && self.blocks[log_pbn as usize].valid_page_count() == pages {
          // Switching: the log block already holds the whole logical
          // block, promote it to data and drop the stale block.
          self.tables.l2p[owner as usize] = Some(log_pbn);
          erases.push(old_pbn);
        } else {
          // Full merge: rebuild the logical block page by page from
          // whichever of the two blocks holds the live copy.
          let new_pbn = self.tables.get_free_block();
          self.tables.p2l[new_pbn as usize] = Some(owner);
          self.tables.l2p[owner as usize] = Some(new_pbn);

          for i in 0..pages {
            if let Some(extra) = additional
              && extra.page_index == i
            {
              // The conflicting host page: dirtied in both blocks, so
              // it is programmed here without a read source.
              writes.push((new_pbn, i, extra.lpn));
              continue;
            }

            let sw_valid = self.blocks[log_pbn as usize].is_valid(i);
            let data_valid = self.blocks[old_pbn as usize].is_valid(i);

            if sw_valid || data_valid {
              reads.push((if sw_valid { log_pbn } else { old_pbn }, i));
              writes.push((new_pbn, i, owner as u64 * pages as u64 + i as u64));
            }
          }

          erases.push(old_pbn);
          erases.push(log_pbn);
        }

        // Either way the SW slot gets a fresh unowned block; in the
        // switching case the old slot holder is now a data block.
        let fresh = self.tables.get_free_block();
        self.tables.p2l[fresh as usize] = None;
        self.tables.sw_block = Some(fresh);
      }
    }

    self.stats.reclaimed_blocks += 1;
    self.stats.valid_page_copies += reads.len() as u64;

    // Phase 1: all reads start at the incoming tick.
    let io_unit = self.param.io_unit_in_page;
    let mut read_finish = *tick;

    for &(pbn, page_index) in &reads {
      let mut read_tick = *tick;
      self.blocks[pbn as usize].read(page_index, read_tick);

      if send_to_pal {
        let pal_req = PalRequest::for_page(pbn, page_index, io_unit);
        self.pal.read(&pal_req, &mut read_tick);
        read_finish = read_finish.max(read_tick);
      }
    }

    // Phase 2: writes start together once the reads are in.
    let mut write_finish = read_finish;

    for &(pbn, page_index, lpn) in &writes {
      let mut write_tick = read_finish;
      self.blocks[pbn as usize].write(page_index, lpn, write_tick);

      if send_to_pal {
        let pal_req = PalRequest::for_page(pbn, page_index, io_unit);
        self.pal.write(&pal_req, &mut write_tick);
        write_finish = write_finish.max(write_tick);
      }
    }

    // Phase 3: erases run in parallel with the writes.
    let mut erase_finish = read_finish;

    for &pbn in &erases {
      let mut erase_tick = read_finish;
      self.erase_internal(pbn, &mut erase_tick, send_to_pal);
      erase_finish = erase_finish.max(erase_tick);
    }

    *tick = write_finish.max(erase_finish);

    replacement
  }
}

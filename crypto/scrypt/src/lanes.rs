use crate::{romix::ro_mix, Error, Params};
use log::trace;
use std::num::NonZeroUsize;

/// How the `p` ROMix lanes of a derivation are scheduled.
///
/// Lanes share nothing, so the output is the same either way. `Threaded`
/// holds one scratch table per running worker at a time, i.e. up to
/// `min(p, available_parallelism) * Params::memory_cost()` bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Lanes {
    #[default]
    Sequential,
    Threaded,
}

impl Lanes {
    pub(crate) fn mix(self, b: &mut [u8], params: &Params) -> Result<(), Error> {
        let block_len = params.block_len();
        #[allow(clippy::cast_possible_truncation)]
        let n = params.n() as usize;
        match self {
            Self::Sequential => mix_group(b, 0, block_len, n),
            Self::Threaded => {
                let workers = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
                let per_worker = (params.p() as usize).div_ceil(workers);
                std::thread::scope(|s| {
                    let handles = b
                        .chunks_mut(per_worker * block_len)
                        .enumerate()
                        .map(|(w, group)| {
                            s.spawn(move || mix_group(group, w * per_worker, block_len, n))
                        })
                        .collect::<Vec<_>>();
                    for handle in handles {
                        handle
                            .join()
                            .unwrap_or_else(|e| std::panic::resume_unwind(e))?;
                    }
                    Ok(())
                })
            }
        }
    }
}

fn mix_group(group: &mut [u8], first: usize, block_len: usize, n: usize) -> Result<(), Error> {
    for (k, lane) in group.chunks_mut(block_len).enumerate() {
        trace!("mixing lane {}", first + k);
        ro_mix(lane, n)?;
    }
    Ok(())
}

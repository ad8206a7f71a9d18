//! Worker lanes: one thread per packet-processing lane.
//!
//! Each lane calls `PluginManager::thread_init` once, decodes its share of
//! the frames and calls `thread_term` once before the pool shuts down.

use plugin_core::{LinkType, DEFAULT_LAYER_MAX};
use rayon::ThreadPoolBuilder;
use tracing::{debug, info};

use crate::codec::Decoded;
use crate::plugin::PluginManager;
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaneConfig {
    pub lanes: usize,
    pub link_type: LinkType,
    pub num_layers: u8,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            lanes: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            link_type: plugin_core::codec::ids::DLT_EN10MB,
            num_layers: DEFAULT_LAYER_MAX,
        }
    }
}

/// Decodes `frames` across `config.lanes` worker threads. Frame `i` goes to
/// lane `i % lanes`; results come back in input order. Statistics land in
/// the codec manager's totals.
pub fn run_lanes<'m, F>(
    manager: &'m PluginManager,
    config: &LaneConfig,
    frames: &[F],
) -> Result<Vec<Decoded<'m>>, ConfigError>
where
    F: AsRef<[u8]> + Sync,
{
    let lanes = config.lanes.max(1);
    let pool = ThreadPoolBuilder::new()
        .num_threads(lanes)
        .thread_name(|i| format!("vigil-lane-{i}"))
        .build()
        .map_err(|e| ConfigError::WorkerPool(e.to_string()))?;

    let per_lane = pool.broadcast(|ctx| -> Result<Vec<(usize, Decoded<'m>)>, ConfigError> {
        let lane = ctx.index();
        let mut thread = manager.thread_init(config.link_type, config.num_layers)?;
        let out: Vec<(usize, Decoded<'m>)> = frames
            .iter()
            .enumerate()
            .filter(|(i, _)| i % lanes == lane)
            .map(|(i, frame)| (i, thread.decode(frame.as_ref())))
            .collect();
        debug!(stage = "lane", lane, frames = out.len());
        manager.thread_term(thread);
        Ok(out)
    });

    let mut ordered: Vec<Option<Decoded<'m>>> = vec![None; frames.len()];
    for lane in per_lane {
        for (i, decoded) in lane? {
            ordered[i] = Some(decoded);
        }
    }
    info!(stage = "lanes", lanes, frames = frames.len());
    Ok(ordered.into_iter().flatten().collect())
}

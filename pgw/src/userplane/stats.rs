use super::downlink_pipeline::DownlinkCounters;
use super::downlink_pipeline::downlink_counter_indices::*;
use super::uplink_pipeline::UplinkCounters;
use super::uplink_pipeline::uplink_counter_indices::*;
use atomic_counter::AtomicCounter;
use slog::{Logger, info, warn};
use std::sync::Arc;
use std::time::Duration;
use stop_token::StopToken;
use stop_token::prelude::*;

/// Periodically log packet totals, and warn when any drop counter moves.
pub async fn dump_stats(
    logger: Logger,
    dl: Arc<DownlinkCounters>,
    ul: Arc<UplinkCounters>,
    interval: Duration,
    stop_token: StopToken,
) {
    let mut last_dl = [0usize; DL_NUM_COUNTERS];
    let mut last_ul = [0usize; UL_NUM_COUNTERS];
    const FIRST_DL_WARN_IDX: usize = DL_DROP_UNKNOWN_IP;
    const FIRST_UL_WARN_IDX: usize = UL_DROP_UNKNOWN_TEID;

    while async_std::task::sleep(interval)
        .timeout_at(stop_token.clone())
        .await
        .is_ok()
    {
        if dl[DL_RX_PKTS].get() != last_dl[DL_RX_PKTS]
            || ul[UL_RX_PKTS].get() != last_ul[UL_RX_PKTS]
        {
            for idx in 0..FIRST_DL_WARN_IDX {
                last_dl[idx] = dl[idx].get();
            }
            for idx in 0..FIRST_UL_WARN_IDX {
                last_ul[idx] = ul[idx].get();
            }

            info!(
                &logger,
                "DL pkts={} bytes={} fwd={} UL pkts={} bytes={} fwd={}",
                last_dl[DL_RX_PKTS],
                last_dl[DL_RX_BYTES],
                last_dl[DL_TX_PKTS],
                last_ul[UL_RX_PKTS],
                last_ul[UL_RX_BYTES],
                last_ul[UL_TX_PKTS]
            );
        }

        let mut dl_warn_needed = false;
        for idx in FIRST_DL_WARN_IDX..DL_NUM_COUNTERS {
            if last_dl[idx] != dl[idx].get() {
                dl_warn_needed = true;
            }
            last_dl[idx] = dl[idx].get();
        }
        let mut ul_warn_needed = false;
        for idx in FIRST_UL_WARN_IDX..UL_NUM_COUNTERS {
            if last_ul[idx] != ul[idx].get() {
                ul_warn_needed = true;
            }
            last_ul[idx] = ul[idx].get();
        }

        if dl_warn_needed {
            warn!(
                &logger,
                "DL DROPS unknown_ip={} no_default_bearer={} sink_error={}",
                last_dl[DL_DROP_UNKNOWN_IP],
                last_dl[DL_DROP_NO_DEFAULT_BEARER],
                last_dl[DL_DROP_SINK_ERROR]
            );
        }

        if ul_warn_needed {
            warn!(
                &logger,
                "UL DROPS unknown_teid={} sink_error={}",
                last_ul[UL_DROP_UNKNOWN_TEID],
                last_ul[UL_DROP_SINK_ERROR]
            );
        }
    }
}

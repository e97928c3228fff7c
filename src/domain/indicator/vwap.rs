//! Rolling VWAP over the last `period` bars, using the typical price.

use crate::domain::ohlcv::Bar;

pub const DEFAULT_PERIOD: usize = 30;

pub fn vwap(bars: &[Bar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }

    let (pv_sum, vol_sum) = bars[bars.len() - period..]
        .iter()
        .fold((0.0, 0.0), |(pv, vol), bar| {
            (pv + bar.typical_price() * bar.volume, vol + bar.volume)
        });

    if vol_sum == 0.0 {
        return None;
    }
    Some(pv_sum / vol_sum)
}

#![no_main]
use std::io::Cursor;
use std::time::Duration;

use byteorder::{BigEndian, ReadBytesExt};
use libfuzzer_sys::fuzz_target;
use summary_quantiles::{ManualClock, Quantile, Summary, SummaryOpts};

fuzz_target!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);

    // unbounded, invalid targets are rejected at construction
    let quantile = match cursor.read_f64::<BigEndian>() {
        Ok(res) => res,
        Err(_) => return,
    };
    let error = match cursor.read_f64::<BigEndian>() {
        Ok(res) => res,
        Err(_) => return,
    };
    let target = match Quantile::new(quantile, error) {
        Ok(target) => target,
        Err(_) => return,
    };

    let clock = ManualClock::new();
    let opts = SummaryOpts::new(vec![target]);
    let summary = match Summary::with_clock(opts, clock.clone()) {
        Ok(summary) => summary,
        Err(_) => return,
    };

    // each record: one byte of clock advance in seconds, then a value
    let mut observed = 0.0;
    while let (Ok(step), Ok(v)) = (cursor.read_u8(), cursor.read_f64::<BigEndian>()) {
        clock.advance(Duration::from_secs(u64::from(step % 16)));
        summary.observe(v);
        if v.is_finite() {
            observed += 1.0;
        }
    }

    let snapshot = summary.collect();
    assert_eq!(observed, snapshot.count);
    assert_eq!(1, snapshot.quantiles.len());
});

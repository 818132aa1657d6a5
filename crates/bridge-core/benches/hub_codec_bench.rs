//! Criterion benchmarks for the hub-protocol codec.
//!
//! Measures encoding, decoding and frame splitting for the messages the hub
//! sends during a scan session.  A batch scan can push one invocation per
//! page in quick succession, so the reader should stay well below a
//! millisecond per record.
//!
//! Run with:
//! ```bash
//! cargo bench --package bridge-core --bench hub_codec_bench
//! ```

use bridge_core::domain::events::{
    BatchScanCompletedPayload, BatchScanProgressPayload, ScanResultPayload,
};
use bridge_core::protocol::{decode_message, encode_message, HubFrameReader, RECORD_SEPARATOR};
use bridge_core::{HubMessage, RealtimeEvent};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

// ── Message fixtures ──────────────────────────────────────────────────────────

fn make_invocation(event: RealtimeEvent) -> HubMessage {
    HubMessage::Invocation {
        invocation_id: None,
        target: event.kind().wire_name().to_string(),
        arguments: event.to_arguments(),
    }
}

fn make_single_scan() -> HubMessage {
    make_invocation(RealtimeEvent::SingleScanResult(ScanResultPayload {
        scan_type: "barcode".to_string(),
        content: "4006381333931".to_string(),
    }))
}

fn make_batch_progress() -> HubMessage {
    make_invocation(RealtimeEvent::BatchScanProgress(BatchScanProgressPayload {
        scan_type: "document".to_string(),
        current_page: 7,
        total_pages: 20,
        content: "C:\\Scans\\2024-05-01\\page-0007.png".to_string(),
    }))
}

fn make_batch_completed() -> HubMessage {
    make_invocation(RealtimeEvent::BatchScanCompleted(BatchScanCompletedPayload {
        total_scans: 20,
    }))
}

fn fixtures() -> Vec<(&'static str, HubMessage)> {
    vec![
        ("Ping", HubMessage::Ping),
        ("SingleScanResult", make_single_scan()),
        ("BatchScanProgress", make_batch_progress()),
        ("BatchScanCompleted", make_batch_completed()),
        (
            "Close",
            HubMessage::Close {
                error: Some("server shutting down".to_string()),
                allow_reconnect: true,
            },
        ),
    ]
}

// ── Benchmark groups ──────────────────────────────────────────────────────────

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode_message");
    for (name, msg) in fixtures() {
        group.bench_with_input(BenchmarkId::new("msg", name), &msg, |b, msg| {
            b.iter(|| encode_message(black_box(msg)).expect("encode must succeed"))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_message");
    for (name, msg) in fixtures() {
        let record = encode_message(&msg).expect("encode must succeed for benchmark setup");
        let record = record.trim_end_matches(RECORD_SEPARATOR).to_string();
        group.bench_with_input(BenchmarkId::new("msg", name), &record, |b, record| {
            b.iter(|| decode_message(black_box(record)).expect("decode must succeed"))
        });
    }
    group.finish();
}

/// A 20-page batch delivered as a single frame, split and decoded.
fn bench_reader_batch_frame(c: &mut Criterion) {
    let mut frame = String::new();
    for _ in 0..20 {
        frame.push_str(&encode_message(&make_batch_progress()).expect("encode"));
    }
    frame.push_str(&encode_message(&make_batch_completed()).expect("encode"));

    c.bench_function("reader_batch_frame_21_records", |b| {
        b.iter(|| {
            let mut reader = HubFrameReader::new();
            reader.feed(black_box(&frame));
            let mut count = 0;
            while let Some(msg) = reader.next_message() {
                msg.expect("decode must succeed");
                count += 1;
            }
            count
        })
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_reader_batch_frame);
criterion_main!(benches);

//! Router dispatch benchmark suite.
//!
//! Measures the cost of routing inbound frames:
//! - Stream fan-out to 1, 8 and 64 subscribers
//! - Unary resolution against tables of 1, 16 and 100 pending requests
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;
use std::time::Duration;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use icd_client::protocol::frame::encode_payload;
use icd_client::{
    MessageType, OpenFileAck, Payload, RasterTileData, RequestId, Router, Subscription, TileData,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const SUBSCRIBER_COUNTS: &[usize] = &[1, 8, 64];
const PENDING_COUNTS: &[usize] = &[1, 16, 100];

// ============================================================================
// Helpers
// ============================================================================

fn tile_frame() -> Vec<u8> {
    let payload = Payload::from(RasterTileData {
        file_id: 0,
        tiles: vec![TileData {
            width: 256,
            height: 256,
            image_data: vec![0; 4096],
            ..Default::default()
        }],
        ..Default::default()
    });
    encode_payload(&payload, RequestId::new(0)).expect("encode tile")
}

fn ack_frame(file_id: i32) -> Vec<u8> {
    let payload = Payload::from(OpenFileAck {
        success: true,
        file_id,
        ..Default::default()
    });
    encode_payload(&payload, RequestId::new(0)).expect("encode ack")
}

fn drain(subscriptions: &mut [Subscription]) {
    for subscription in subscriptions {
        while subscription.try_recv().is_some() {}
    }
}

// ============================================================================
// Benchmark: Stream Fan-out
// ============================================================================

fn bench_stream_fanout(c: &mut Criterion) {
    let frame = tile_frame();

    let mut group = c.benchmark_group("stream_fanout");

    for &count in SUBSCRIBER_COUNTS {
        let router = Router::new(100);
        let epoch = router.open();
        let mut subscriptions: Vec<_> = (0..count)
            .map(|_| router.subscribe(&[MessageType::RasterTileData]))
            .collect();

        group.bench_with_input(BenchmarkId::new("subscribers", count), &count, |b, _| {
            b.iter(|| {
                black_box(router.dispatch(epoch, black_box(&frame)));
                drain(&mut subscriptions);
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Unary Resolution
// ============================================================================

fn bench_unary_resolution(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");

    let mut group = c.benchmark_group("unary_resolution");

    for &count in PENDING_COUNTS {
        let router = Router::new(count + 1);
        let epoch = router.open();
        let frame = ack_frame(count as i32);

        // Requests for other files stay queued ahead of the one resolved.
        let _queued: Vec<_> = (0..count as i32)
            .map(|file_id| {
                router
                    .register(
                        RequestId::new(1),
                        MessageType::OpenFileAck,
                        Some(Box::new(move |m: &icd_client::Message| {
                            m.payload.file_id() == Some(file_id)
                        })),
                        Duration::from_secs(60),
                    )
                    .expect("register")
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("pending", count), &count, |b, _| {
            b.to_async(&rt).iter(|| {
                let router = Arc::clone(&router);
                let frame = &frame;
                async move {
                    let pending = router
                        .register(
                            RequestId::new(2),
                            MessageType::OpenFileAck,
                            None,
                            Duration::from_secs(1),
                        )
                        .expect("register");
                    router.dispatch(epoch, frame);
                    black_box(pending.wait().await.expect("ack"))
                }
            });
        });
    }

    group.finish();
}

// ============================================================================
// Criterion Setup
// ============================================================================

criterion_group!(benches, bench_stream_fanout, bench_unary_resolution);
criterion_main!(benches);

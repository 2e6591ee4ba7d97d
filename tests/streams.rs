//! Stream channels and completion policies against a mock backend.

mod common;

use std::time::Duration;

use common::{MockBackend, Reply};
use icd_client::{
    AddRequiredTiles, CompletionPolicy, Error, ImageProperties, MessageType, MomentProgress,
    MomentRequest, MomentResponse, OpenFileAck, RasterTileData, RasterTileSync,
    RegionHistogramData, ResumeSession, ResumeSessionAck, SetCursor, SpatialProfileData,
    StartAnimation, StartAnimationAck,
};

fn histogram(file_id: i32) -> Reply {
    Reply::message(RegionHistogramData {
        file_id,
        region_id: -1,
        progress: 1.0,
        ..Default::default()
    })
}

fn sync(end_sync: bool) -> Reply {
    Reply::message(RasterTileSync {
        sync_id: 1,
        end_sync,
        ..Default::default()
    })
}

fn tile(x: i32) -> Reply {
    Reply::message(RasterTileData {
        sync_id: 1,
        tiles: vec![icd_client::TileData {
            x,
            ..Default::default()
        }],
        ..Default::default()
    })
}

#[tokio::test]
async fn open_file_pushes_histogram() -> anyhow::Result<()> {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::OpenFile => vec![
            Reply::message(OpenFileAck {
                success: true,
                file_id: 0,
                ..Default::default()
            }),
            histogram(0),
        ],
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let histograms = client
        .stream(CompletionPolicy::count(MessageType::RegionHistogramData, 1))
        .with_timeout(Duration::from_secs(2));
    let ack = client.open_file("set_QA", "M17_SWex.fits", "0", 0).await?;
    let histograms: Vec<RegionHistogramData> = histograms.collect_as().await?;

    assert!(ack.success);
    assert_eq!(histograms.len(), 1);
    assert_eq!(histograms[0].region_id, -1);
    assert!((histograms[0].progress - 1.0).abs() < f32::EPSILON);
    Ok(())
}

#[tokio::test]
async fn raster_tiles_are_merged_in_arrival_order() -> anyhow::Result<()> {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::AddRequiredTiles => vec![sync(false), tile(0), tile(1), tile(2), sync(true)],
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let tiles = client
        .stream(CompletionPolicy::raster_tiles(5)?)
        .with_timeout(Duration::from_secs(2));
    client.send_command(&AddRequiredTiles {
        file_id: 0,
        tiles: vec![0, 1, 2],
        ..Default::default()
    })?;
    let messages = tiles.collect().await?;

    let order: Vec<_> = messages.iter().map(|m| m.message_type()).collect();
    assert_eq!(
        order,
        vec![
            MessageType::RasterTileSync,
            MessageType::RasterTileData,
            MessageType::RasterTileData,
            MessageType::RasterTileData,
            MessageType::RasterTileSync,
        ]
    );
    let last = messages[4].get::<RasterTileSync>().expect("sync");
    assert!(last.end_sync);
    Ok(())
}

#[tokio::test]
async fn every_subscriber_sees_every_message() -> anyhow::Result<()> {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::SetCursor => vec![Reply::message(SpatialProfileData {
            x: 10,
            y: 20,
            ..Default::default()
        })],
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let mut first = client.subscribe(&[MessageType::SpatialProfileData]);
    let mut second = client.subscribe(&[MessageType::SpatialProfileData]);
    client.send_command(&SetCursor::default())?;

    let a = first.recv().await?;
    let b = second.recv().await?;
    assert_eq!(a, b);
    assert_eq!(a.get::<SpatialProfileData>().map(|p| (p.x, p.y)), Some((10, 20)));
    Ok(())
}

#[tokio::test]
async fn moment_progress_completes_at_one() -> anyhow::Result<()> {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::MomentRequest => {
            let mut replies: Vec<_> = [0.25, 0.5, 1.0]
                .into_iter()
                .map(|progress| Reply::message(MomentProgress { file_id: 0, progress }))
                .collect();
            replies.push(Reply::message(MomentResponse {
                success: true,
                ..Default::default()
            }));
            replies
        }
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let progress = client.stream(CompletionPolicy::progress(MessageType::MomentProgress));
    let response = client.moment(MomentRequest::default()).await?;
    let updates: Vec<MomentProgress> = progress.collect_as().await?;

    assert!(response.success);
    let values: Vec<_> = updates.iter().map(|p| p.progress).collect();
    assert_eq!(values, vec![0.25, 0.5, 1.0]);
    Ok(())
}

#[tokio::test]
async fn resume_session_catch_up_is_delivered() -> anyhow::Result<()> {
    // Catch-up histograms arrive before the ack.
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::ResumeSession => {
            let request: ResumeSession = inbound.body();
            let mut replies: Vec<_> = request
                .images
                .iter()
                .map(|image| histogram(image.file_id))
                .collect();
            replies.push(Reply::message(ResumeSessionAck {
                success: true,
                ..Default::default()
            }));
            replies
        }
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let images = (0..2)
        .map(|file_id| ImageProperties {
            directory: "set_QA".to_string(),
            file: format!("image_{file_id}.fits"),
            file_id,
            ..Default::default()
        })
        .collect();
    let catch_up = client
        .stream(CompletionPolicy::count(MessageType::RegionHistogramData, 2))
        .with_timeout(Duration::from_secs(2));

    let ack = client
        .resume_session(ResumeSession {
            images,
            ..Default::default()
        })
        .await?;
    let histograms: Vec<RegionHistogramData> = catch_up.collect_as().await?;

    assert!(ack.success);
    let files: Vec<_> = histograms.iter().map(|h| h.file_id).collect();
    assert_eq!(files, vec![0, 1]);
    Ok(())
}

#[tokio::test]
async fn start_animation_is_a_command_with_pushed_ack() -> anyhow::Result<()> {
    let backend = MockBackend::start(|inbound| match inbound.message_type() {
        MessageType::StartAnimation => vec![Reply::message(StartAnimationAck {
            success: true,
            animation_id: 4,
            ..Default::default()
        })],
        _ => Vec::new(),
    })
    .await;
    let client = backend.connected_client().await;

    let mut acks = client.subscribe(&[MessageType::StartAnimationAck]);
    client.start_animation(&StartAnimation {
        file_id: 0,
        frame_rate: 5,
        ..Default::default()
    })?;
    let ack = tokio::time::timeout(Duration::from_secs(2), acks.recv()).await??;

    assert_eq!(ack.get::<StartAnimationAck>().map(|a| a.animation_id), Some(4));
    assert_eq!(client.pending_count(), 0);
    assert_eq!(
        backend.received_types(),
        vec![MessageType::RegisterViewer, MessageType::StartAnimation]
    );
    Ok(())
}

#[tokio::test]
async fn absence_is_checked_by_quiescence() -> anyhow::Result<()> {
    let backend = MockBackend::silent().await;
    let client = backend.connected_client().await;

    let before = client.message_receiving();
    client.send_command(&SetCursor::default())?;

    assert!(client.is_quiet_for(Duration::from_millis(100)).await);
    assert_eq!(client.message_receiving(), before);
    Ok(())
}

#[tokio::test]
async fn close_ends_streams() {
    let backend = MockBackend::silent().await;
    let client = backend.connected_client().await;

    let tiles = client.stream(CompletionPolicy::raster_tiles(3).expect("policy"));
    let collect = tokio::spawn(tiles.collect());
    tokio::time::sleep(Duration::from_millis(20)).await;

    client.close();

    assert!(matches!(collect.await, Ok(Err(Error::ConnectionClosed))));
}

#[tokio::test]
async fn stream_times_out_without_messages() {
    let backend = MockBackend::silent().await;
    let client = backend.connected_client().await;

    let result = client
        .stream(CompletionPolicy::count(MessageType::ContourImageData, 1))
        .with_timeout(Duration::from_millis(50))
        .collect()
        .await;

    assert!(matches!(result, Err(Error::Timeout { .. })));
}

use std::time::Duration;

use canvote_sdk::poller::poller;

#[tokio::test]
async fn test_cancel_from_tick_stops_loop() {
    let (poller, handle) = poller(Duration::from_millis(5));
    let mut seen = 0;

    let ticks = poller
        .run(|| {
            seen += 1;
            if seen == 3 {
                handle.cancel();
            }
            std::future::ready(())
        })
        .await;

    assert_eq!(ticks, 3);
    assert!(handle.is_cancelled());
}

#[tokio::test]
async fn test_cancel_while_waiting() {
    let (poller, handle) = poller(Duration::from_secs(3600));
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
    });

    let ticks = tokio::time::timeout(Duration::from_secs(5), poller.run(|| async {}))
        .await
        .expect("poller ignored cancellation");
    assert_eq!(ticks, 1);
}

#[tokio::test]
async fn test_dropped_handle_stops_loop() {
    let (poller, handle) = poller(Duration::from_millis(5));
    drop(handle);

    let ticks = tokio::time::timeout(Duration::from_secs(5), poller.run(|| async {}))
        .await
        .expect("poller outlived its handle");
    assert_eq!(ticks, 0);
}

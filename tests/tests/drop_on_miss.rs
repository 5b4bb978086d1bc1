use pgw::Teid;
use pgw_tests::{Forward, framework::*};
use std::net::Ipv4Addr;

#[async_std::test]
async fn drop_on_miss() -> anyhow::Result<()> {
    let (pgw, sink, _logger) = init().await?;

    // Nothing allocated yet
    pgw.submit_uplink_packet(Teid(9999), vec![0x45]).await?;
    pgw.submit_downlink_packet(Ipv4Addr::new(192, 168, 1, 77), vec![0x45])
        .await?;
    sink.expect_no_forward().await?;

    // Session without a bearer has no downlink path
    let session = pgw.create_session("internet", SGW_ADDRESS, Teid(1))?;
    pgw.submit_downlink_packet(session.subscriber_address, vec![0x45])
        .await?;
    sink.expect_no_forward().await?;

    // The pipelines are still alive after the drops
    let bearer = pgw.create_bearer(&session, Teid(2))?;
    pgw.submit_uplink_packet(bearer.dp_teid, vec![0x45]).await?;
    let Forward::ToApn { gateway_address, .. } = sink.recv_forward().await? else {
        anyhow::bail!("Expected uplink forward");
    };
    assert_eq!(gateway_address, INTERNET_GATEWAY);

    pgw.graceful_shutdown().await;
    Ok(())
}

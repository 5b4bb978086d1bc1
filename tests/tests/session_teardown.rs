use pgw::Teid;
use pgw_tests::framework::*;

#[async_std::test]
async fn session_teardown() -> anyhow::Result<()> {
    let (pgw, sink, _logger) = init_with(small_subnet(1)).await?;

    // Session with two bearers
    let session = pgw.create_session("internet", SGW_ADDRESS, Teid(12345))?;
    let default = pgw.create_bearer(&session, Teid(1))?;
    let dedicated = pgw.create_bearer(&session, Teid(2))?;

    // Teardown removes both bearers
    pgw.delete_session(session.cp_teid);
    assert!(pgw.find_session_by_cp_teid(session.cp_teid).is_none());
    assert!(pgw.find_bearer_by_dp_teid(default.dp_teid).is_none());
    assert!(pgw.find_bearer_by_dp_teid(dedicated.dp_teid).is_none());
    assert_eq!(pgw.registry().bearer_count(), 0);

    // Late packets are dropped
    pgw.submit_uplink_packet(default.dp_teid, vec![1]).await?;
    pgw.submit_downlink_packet(session.subscriber_address, vec![2])
        .await?;
    sink.expect_no_forward().await?;

    // Repeated teardown is harmless
    pgw.delete_session(session.cp_teid);
    pgw.delete_bearer(default.dp_teid);

    // The only address in the subnet is free again
    let next = pgw.create_session("internet", SGW_ADDRESS, Teid(12346))?;
    assert_eq!(next.subscriber_address, session.subscriber_address);

    pgw.graceful_shutdown().await;
    Ok(())
}

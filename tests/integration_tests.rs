mod common;

use std::sync::Arc;

use common::{ProcFixture, TestNetworkBuilder};
use smnet::network::InterfaceFlags;
use smnet::prelude::*;

const NET_DEV: &str = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo:     500       5    0    0    0     0          0         0      500       5    0    0    0     0       0          0
  eth0:  100000    1000    1    2    0     0          0         0    50000     500    3    4    0     0       0          0
  eth1:     700       7    0    0    0     0          0         0      300       3    0    0    0     0       0          0
";

const NET_SNMP: &str = "\
Tcp: RtoAlgorithm ActiveOpens PassiveOpens CurrEstab
Tcp: 1 5 7 2
Udp: InDatagrams OutDatagrams
Udp: 40 41
";

const NET_ROUTE: &str = "\
Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT
eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0
eth0\t0001A8C0\t00000000\t0001\t0\t0\t100\t00FFFFFF\t0\t0\t0
";

fn u(metric: &Metric, key: &str) -> Option<u64> {
    metric.field(key).and_then(FieldValue::as_u64)
}

fn s<'a>(metric: &'a Metric, key: &str) -> Option<&'a str> {
    metric.field(key).and_then(FieldValue::as_str)
}

#[test]
fn test_default_policy_end_to_end() -> Result<()> {
    let smnet = TestNetworkBuilder::new()
        .with_up_interface("eth0", &["10.0.0.5/8"])
        .with_interface("eth1", InterfaceFlags::empty(), &[])
        .with_gateway("eth0", "10.0.0.1")
        .with_link("eth0", true, Some(10000))
        .with_protocol("Tcp", &[("ActiveOpens", 5)])
        .build()?;

    let mut buffer = MetricBuffer::new();
    smnet.gather(&mut buffer)?;

    assert_eq!(buffer.len(), 2);
    let eth0 = buffer.for_interface("eth0")[0];
    assert_eq!(eth0.name, MEASUREMENT);
    assert_eq!(u(eth0, "index"), Some(2));
    assert_eq!(u(eth0, "speed"), Some(10000));
    assert_eq!(s(eth0, "ip"), Some("10.0.0.5"));
    assert_eq!(s(eth0, "net_mask"), Some("255.0.0.0"));
    assert_eq!(s(eth0, "gateway"), Some("10.0.0.1"));
    assert_eq!(s(eth0, "mac"), Some("52:54:00:00:00:02"));
    assert_eq!(u(eth0, "run_status"), Some(2));
    assert_eq!(u(eth0, "bytes_recv"), Some(2000));

    let all = buffer.for_interface("all")[0];
    assert_eq!(all.field("tcp_activeopens").and_then(FieldValue::as_i64), Some(5));
    Ok(())
}

#[test]
fn test_allow_list_reports_unenumerated_names() -> Result<()> {
    let smnet = TestNetworkBuilder::new()
        .with_up_interface("eth0", &[])
        .with_counters_only("ppp0")
        .with_allow_list(&["ppp*", "lo"])
        .build()?;

    let mut buffer = MetricBuffer::new();
    smnet.gather(&mut buffer)?;

    let names: Vec<_> = buffer.metrics().iter().filter_map(|m| m.tag("interface")).collect();
    assert_eq!(names, vec!["lo", "ppp0"]);
    let lo = buffer.for_interface("lo")[0];
    assert_eq!(s(lo, "mac"), Some(""));
    assert_eq!(u(lo, "run_status"), Some(0));
    Ok(())
}

#[test]
fn test_no_matching_interfaces_still_reports_protocols() -> Result<()> {
    let smnet = TestNetworkBuilder::new()
        .with_allow_list(&["wlan0"])
        .with_protocol("Udp", &[("InDatagrams", 1)])
        .build()?;

    let mut buffer = MetricBuffer::new();
    smnet.gather(&mut buffer)?;

    assert_eq!(buffer.len(), 1);
    assert_eq!(buffer.metrics()[0].tag("interface"), Some("all"));
    Ok(())
}

#[test]
fn test_procfs_fixture_end_to_end() -> Result<()> {
    let proc = ProcFixture::new()?;
    proc.write("dev", NET_DEV)?;
    proc.write("snmp", NET_SNMP)?;
    proc.write("route", NET_ROUTE)?;

    let config = SmNetConfig {
        interfaces: vec!["eth0".to_string()],
        gateway_source: GatewaySource::ProcRoute,
        link_state: false,
        host_proc: Some(proc.root().to_path_buf()),
        ..SmNetConfig::default()
    };
    let smnet = SmNet::new(config)?;

    let mut buffer = MetricBuffer::new();
    smnet.gather(&mut buffer)?;

    let eth0 = buffer.for_interface("eth0");
    assert_eq!(eth0.len(), 1);
    assert_eq!(u(eth0[0], "bytes_recv"), Some(100000));
    assert_eq!(u(eth0[0], "bytes_sent"), Some(50000));
    assert_eq!(u(eth0[0], "err_in"), Some(1));
    assert_eq!(u(eth0[0], "drop_out"), Some(4));
    assert_eq!(u(eth0[0], "speed"), Some(0));
    #[cfg(target_endian = "little")]
    assert_eq!(s(eth0[0], "gateway"), Some("192.168.1.1"));

    let all = buffer.for_interface("all")[0];
    assert_eq!(all.field("tcp_currestab").and_then(FieldValue::as_i64), Some(2));
    assert_eq!(all.field("udp_outdatagrams").and_then(FieldValue::as_i64), Some(41));
    Ok(())
}

#[test]
fn test_missing_counters_file_fails_poll() -> Result<()> {
    let proc = ProcFixture::new()?;
    let config = SmNetConfig {
        gateway_source: GatewaySource::Disabled,
        link_state: false,
        host_proc: Some(proc.root().to_path_buf()),
        ..SmNetConfig::default()
    };
    let smnet = SmNet::new(config)?;

    let mut buffer = MetricBuffer::new();
    let err = smnet.gather(&mut buffer).unwrap_err();

    assert!(err.is_fatal());
    assert!(err.to_string().starts_with("error getting net io info"));
    assert!(buffer.is_empty());
    Ok(())
}

#[test]
fn test_concurrent_polls_agree() -> Result<()> {
    let smnet = Arc::new(
        TestNetworkBuilder::new()
            .with_up_interface("eth0", &["192.168.7.2/24"])
            .with_up_interface("eth1", &[])
            .build()?,
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let smnet = Arc::clone(&smnet);
            std::thread::spawn(move || {
                let mut buffer = MetricBuffer::new();
                smnet.gather(&mut buffer).map(|_| buffer.into_metrics())
            })
        })
        .collect();

    let results: Vec<Vec<Metric>> = handles.into_iter().map(|h| h.join().unwrap()).collect::<Result<_>>()?;
    assert!(results.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(results[0].len(), 2);
    assert_eq!(smnet.phase(), Phase::Idle);
    Ok(())
}

#[cfg(feature = "async")]
#[tokio::test]
async fn test_gather_async_polls_on_interval() -> Result<()> {
    let smnet = Arc::new(TestNetworkBuilder::new().with_up_interface("eth0", &[]).build()?);

    let mut interval = tokio::time::interval(std::time::Duration::from_millis(5));
    let mut polls = Vec::new();
    for _ in 0..3 {
        interval.tick().await;
        polls.push(Arc::clone(&smnet).gather_async().await?);
    }

    assert!(polls.iter().all(|metrics| metrics.len() == 1));
    Ok(())
}

#[test]
fn test_sample_config_builds_collector() -> Result<()> {
    let config = SmNetConfig::from_json_str(SAMPLE_CONFIG)?;
    let smnet = TestNetworkBuilder::new().with_up_interface("eth0", &[]).with_config(config).build()?;

    let mut buffer = MetricBuffer::new();
    smnet.gather(&mut buffer)?;

    assert_eq!(buffer.for_interface("eth0").len(), 1);
    assert!(!DESCRIPTION.is_empty());
    Ok(())
}

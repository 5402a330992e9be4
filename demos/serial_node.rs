//! Run a route selecting node on a GridConnect serial gateway.
//!
//! Usage: `serial_node [PORT] [NODE:EVENT=ROUTE,ROUTE,...]...`
//!
//! Each event argument teaches the node a long event and its candidate
//! routes, `0:EVENT=...` teaches a short event.

use anyhow::{bail, Context, Result};
use std::io::{ErrorKind, Read, Write};
use std::time::Instant;

use cbus_route_select::{EventId, EventNumber, NodeConfig, NodeNumber, NodeState};

const NODE_NUMBER: u16 = 4000;
const CAN_ID: u8 = 100;
const TIMING_WINDOW: u8 = 10;

fn parse_event(arg: &str) -> Result<(EventId, Vec<u8>)> {
    let (id, routes) = arg.split_once('=').context("Missing '=' in event")?;
    let (nn, en) = id.split_once(':').context("Missing ':' in event")?;
    let node = NodeNumber::new(nn.parse::<u16>()?)?;
    let event = EventNumber::new(en.parse::<u16>()?)?;
    let routes = routes
        .split(',')
        .map(|r| r.trim().parse::<u8>().context("Parse error"))
        .collect::<Result<Vec<_>>>()?;
    let id = if *node == 0 {
        EventId::short(event)
    } else {
        EventId::long(node, event)
    };
    Ok((id, routes))
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args();
    args.next(); // Skip program name
    let port = args.next().unwrap_or_else(|| "/dev/ttyACM0".to_string());

    let config = NodeConfig::new(NODE_NUMBER, CAN_ID)?.with_timing_window(TIMING_WINDOW);
    let mut node: NodeState = NodeState::new(config);
    for arg in args {
        let (id, routes) = parse_event(&arg).with_context(|| format!("Bad event {}", arg))?;
        node.events_mut().learn(id, &routes)?;
    }
    if node.events().is_empty() {
        bail!("No events given, nothing to select routes from");
    }

    let mut serial = serialport::new(&port, 115_200)
        .timeout(std::time::Duration::from_millis(100))
        .open()
        .with_context(|| format!("Failed to open serial port {}", port))?;

    let start = Instant::now();
    log::info!("Node {} listening on {}", NODE_NUMBER, port);

    loop {
        node = match node {
            NodeState::ReceiveData(recv) => {
                let mut buf = [0; 64];
                match serial.read(&mut buf) {
                    Ok(0) => break,
                    Ok(len) => recv.receive_data(&buf[..len], start.elapsed().as_millis() as u64),
                    Err(e) if e.kind() == ErrorKind::TimedOut => recv.into(),
                    Err(e) => return Err(e.into()),
                }
            }

            NodeState::SendData(send) => {
                log::info!("Announcing route {}", send.route());
                serial.write_all(send.get_data())?;
                send.data_sent()
            }
        };
    }
    Ok(())
}

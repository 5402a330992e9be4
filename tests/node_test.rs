mod common;

use common::{init_logging, run_node, SerialIOPlane, SerialInterface};
use std::io::Read;

use cbus_route_select::{event, node, EventId, EventTable, NodeConfig, NodeState};

type Node = NodeState<20, 8>;

// Buttons on node 100: A offers routes 1-3, B offers 3-5, C offers 3 and 9
const BUTTON_A_ON: &[u8] = b":SB040N9000640001;";
const BUTTON_A_OFF: &[u8] = b":SB040N9100640001;";
const BUTTON_B_ON: &[u8] = b":SB040N9000640002;";
const BUTTON_C_ON: &[u8] = b":SB040N9000640003;";

fn new_node() -> anyhow::Result<Node> {
    let config = NodeConfig::new(0x0101, 20)?.with_timing_window(1);
    let mut events = EventTable::new();
    events.learn(EventId::long(node(100), event(1)), &[1, 2, 3])?;
    events.learn(EventId::long(node(100), event(2)), &[3, 4, 5])?;
    events.learn(EventId::long(node(100), event(3)), &[3, 9])?;
    Ok(Node::with_events(config, events))
}

#[test]
fn node_main_loop() -> anyhow::Result<()> {
    init_logging();
    let serial_sim = SerialInterface::new(&[
        (10_000, BUTTON_A_ON),
        (10_010, BUTTON_A_OFF),
        (10_050, BUTTON_B_ON),
        (10_400, BUTTON_C_ON),
    ]);
    let mut serial = SerialIOPlane::new(&serial_sim);

    let node = run_node(new_node()?, &mut serial)?;

    // only B decided, route 3 from node 0x0101 on CAN id 20
    assert_eq!(serial_sim.borrow().sent_frames(), vec![":SB280N9001010003;"]);
    assert_eq!(node.selector().stored().to_slots()[..3], [3, 9, 0]);
    assert_eq!(node.selector().timer().last(), 10_400);
    Ok(())
}

#[test]
fn long_read_keeps_every_frame() -> anyhow::Result<()> {
    init_logging();
    let mut chunk = Vec::new();
    // two unlearned events of node 100 ahead of the presses
    chunk.extend_from_slice(b":SB040N9000640009;:SB040N9000640009;");
    chunk.extend_from_slice(BUTTON_A_ON);
    chunk.extend_from_slice(BUTTON_B_ON);
    assert!(chunk.len() > 64);
    let serial_sim = SerialInterface::new(&[(10_000, &chunk[..])]);
    let mut serial = SerialIOPlane::new(&serial_sim);

    let node = run_node(new_node()?, &mut serial)?;
    assert_eq!(serial_sim.borrow().sent_frames(), vec![":SB280N9001010003;"]);
    assert_eq!(node.selector().stored().to_slots()[..3], [3, 4, 5]);
    Ok(())
}

#[test]
fn press_sequence_from_clock_origin() -> anyhow::Result<()> {
    init_logging();
    let serial_sim = SerialInterface::new(&[
        (0, BUTTON_A_ON),
        (50, BUTTON_B_ON),
        (400, BUTTON_C_ON),
    ]);
    let mut serial = SerialIOPlane::new(&serial_sim);

    let node = run_node(new_node()?, &mut serial)?;
    assert_eq!(serial_sim.borrow().sent_frames(), vec![":SB280N9001010003;"]);
    assert_eq!(node.selector().stored().to_slots()[..3], [3, 9, 0]);
    Ok(())
}

#[test]
fn first_presses_never_decide() -> anyhow::Result<()> {
    init_logging();
    let serial_sim = SerialInterface::new(&[
        (1_000, BUTTON_A_ON),
        (2_000, BUTTON_B_ON),
        (3_000, BUTTON_B_ON),
    ]);
    let mut serial = SerialIOPlane::new(&serial_sim);

    run_node(new_node()?, &mut serial)?;
    assert!(serial_sim.borrow().sent_frames().is_empty());
    Ok(())
}

#[test]
fn garbage_between_frames() -> anyhow::Result<()> {
    init_logging();
    let serial_sim = SerialInterface::new(&[
        (5_000, &b"\r\n:SB040N9000640001;\r\n:X0000;noise"[..]),
        (5_030, &b":SB040N9000640002;\r\n"[..]),
    ]);
    let mut serial = SerialIOPlane::new(&serial_sim);

    run_node(new_node()?, &mut serial)?;
    assert_eq!(serial_sim.borrow().sent_frames(), vec![":SB280N9001010003;"]);
    Ok(())
}

#[test]
fn read_error_stops_loop() -> anyhow::Result<()> {
    let serial_sim = SerialInterface::new(&[(1_000, BUTTON_A_ON)]);
    let mut serial = SerialIOPlane::new(&serial_sim);
    serial_sim.borrow_mut().trigger_read_error();
    assert!(run_node(new_node()?, &mut serial).is_err());

    // the scripted data is still there afterwards
    let mut buf = [0; 32];
    assert_eq!(serial.read(&mut buf)?, BUTTON_A_ON.len());
    Ok(())
}

#[test]
fn write_error_is_reported() -> anyhow::Result<()> {
    let serial_sim = SerialInterface::new(&[(1_000, BUTTON_A_ON), (1_020, BUTTON_B_ON)]);
    let mut serial = SerialIOPlane::new(&serial_sim);
    serial_sim.borrow_mut().trigger_write_error();
    assert!(run_node(new_node()?, &mut serial).is_err());
    assert!(serial_sim.borrow().sent_frames().is_empty());
    Ok(())
}

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{Error, ErrorKind, Read, Write};
use std::rc::Rc;

use cbus_route_select::{Millis, NodeState};

/// Simulated GridConnect serial link. Each scripted chunk arrives at its own
/// timestamp, and is returned whole by a single read.
pub struct SerialInterface {
    rx: VecDeque<(Millis, Vec<u8>)>,
    tx: Vec<u8>,
    now: Millis,
    do_read_error: bool,
    do_write_error: bool,
}

pub struct SerialIOPlane(Rc<RefCell<SerialInterface>>);

impl SerialIOPlane {
    pub fn new(serial_if: &Rc<RefCell<SerialInterface>>) -> SerialIOPlane {
        SerialIOPlane(serial_if.clone())
    }

    /// Timestamp of the chunk returned by the last read.
    pub fn now(&self) -> Millis {
        self.0.borrow().now
    }
}

impl SerialInterface {
    pub fn new(script: &[(Millis, &[u8])]) -> Rc<RefCell<SerialInterface>> {
        Rc::new(RefCell::new(SerialInterface {
            rx: script.iter().map(|(t, d)| (*t, d.to_vec())).collect(),
            tx: Vec::new(),
            now: 0,
            do_read_error: false,
            do_write_error: false,
        }))
    }

    pub fn trigger_write_error(&mut self) {
        self.do_write_error = true;
    }

    pub fn trigger_read_error(&mut self) {
        self.do_read_error = true;
    }

    /// Everything the node wrote, split into GridConnect frames.
    pub fn sent_frames(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.tx)
            .split_inclusive(';')
            .map(str::to_string)
            .collect()
    }
}

impl Read for SerialIOPlane {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut inner = self.0.borrow_mut();
        if inner.do_read_error {
            inner.do_read_error = false;
            return Err(Error::new(ErrorKind::PermissionDenied, "IO read error"));
        }
        match inner.rx.pop_front() {
            Some((now, data)) => {
                assert!(data.len() <= buf.len(), "scripted chunk larger than read buffer");
                buf[..data.len()].copy_from_slice(&data);
                inner.now = now;
                Ok(data.len())
            }
            None => Ok(0),
        }
    }
}

impl Write for SerialIOPlane {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut inner = self.0.borrow_mut();
        if inner.do_write_error {
            inner.do_write_error = false;
            Err(Error::new(ErrorKind::PermissionDenied, "IO write error"))
        } else {
            inner.tx.write(buf)
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Run `node` until the scripted input is exhausted.
pub fn run_node<const N: usize, const CAP: usize>(
    mut node: NodeState<N, CAP>,
    serial: &mut SerialIOPlane,
) -> anyhow::Result<NodeState<N, CAP>> {
    loop {
        node = match node {
            NodeState::ReceiveData(recv) => {
                let mut buf = [0; 256];
                let len = serial.read(&mut buf)?;
                if len == 0 {
                    return Ok(recv.into());
                }
                recv.receive_data(&buf[..len], serial.now())
            }

            NodeState::SendData(send) => {
                serial.write_all(send.get_data())?;
                send.data_sent()
            }
        };
    }
}

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{Receiver, Sender, TryRecvError, TrySendError};
use hidapi::HidApi;

use super::{
    decode_status, output_report, ClientConfig, HidPort, HostError, HostResult, Listener,
};
use crate::command::LedCommand;
use crate::config::REPORT_CAPACITY;

/// Pause after a pass that found nothing to write.
const IDLE_BACKOFF: Duration = Duration::from_millis(1);

/// Connection to one LED controller.
///
/// Commands are queued by [`write_async`](Self::write_async) and written
/// by a dedicated IO thread, which also reads status reports between
/// writes. Dropping the client stops the thread after the queued commands
/// have been written.
pub struct LedClient {
    commands: Option<Sender<LedCommand>>,
    io_thread: Option<JoinHandle<()>>,
}

impl LedClient {
    /// Open the first device matching `config`'s VID/PID and start the IO
    /// thread.
    pub fn open<L: Listener>(listener: L, config: ClientConfig) -> HostResult<Self> {
        let api = HidApi::new()?;
        let device = api.open(config.vendor_id, config.product_id)?;
        tracing::info!(
            "Opened LED controller VID=0x{:04X} PID=0x{:04X}",
            config.vendor_id,
            config.product_id
        );
        Self::start(device, listener, config)
    }

    /// Start the IO thread on an already open port.
    pub fn start<P, L>(port: P, listener: L, config: ClientConfig) -> HostResult<Self>
    where
        P: HidPort + 'static,
        L: Listener,
    {
        let (tx, rx) = crossbeam::channel::bounded(config.queue_depth);
        let worker = IoWorker::new(port, listener, rx, &config);
        let io_thread = thread::Builder::new()
            .name("hidled-io".into())
            .spawn(move || worker.run())?;

        Ok(Self {
            commands: Some(tx),
            io_thread: Some(io_thread),
        })
    }

    /// Queue `command` for the IO thread and return immediately.
    pub fn write_async(&self, command: LedCommand) -> HostResult<()> {
        let commands = self.commands.as_ref().ok_or(HostError::Closed)?;
        commands.try_send(command).map_err(|e| match e {
            TrySendError::Full(_) => HostError::QueueFull,
            TrySendError::Disconnected(_) => HostError::Closed,
        })
    }

    /// Write what is still queued, stop the IO thread and close the device.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // The IO thread exits once the queue is drained and disconnected.
        drop(self.commands.take());
        if let Some(handle) = self.io_thread.take() {
            if handle.join().is_err() {
                tracing::warn!("IO thread panicked");
            }
        }
    }
}

impl Drop for LedClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Outcome of one [`IoWorker::work`] pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Work {
    Idle,
    Wrote,
    WriteFailed,
    Stop,
}

struct IoWorker<P, L> {
    port: P,
    listener: L,
    commands: Receiver<LedCommand>,
    read_timeout_ms: i32,
    write_retries: u32,
    buf: [u8; REPORT_CAPACITY],
}

impl<P: HidPort, L: Listener> IoWorker<P, L> {
    fn new(port: P, listener: L, commands: Receiver<LedCommand>, config: &ClientConfig) -> Self {
        Self {
            port,
            listener,
            commands,
            read_timeout_ms: i32::try_from(config.read_timeout.as_millis()).unwrap_or(i32::MAX),
            write_retries: config.write_retries,
            buf: [0; REPORT_CAPACITY],
        }
    }

    fn run(mut self) {
        tracing::debug!("IO thread started");
        loop {
            match self.work() {
                Work::Stop => break,
                Work::Idle => thread::sleep(IDLE_BACKOFF),
                Work::Wrote | Work::WriteFailed => {}
            }
        }
        tracing::debug!("IO thread stopped");
    }

    /// Read at most one status report, then write at most one command.
    fn work(&mut self) -> Work {
        match self.port.read_report(&mut self.buf, self.read_timeout_ms) {
            Ok(0) => {}
            Ok(n) => match decode_status(&self.buf[..n]) {
                Ok(status) => self.listener.on_status(status),
                Err(e) => {
                    tracing::warn!("Undecodable status report {:02X?}: {}", &self.buf[..n], e);
                    self.listener.on_error(e.into());
                }
            },
            Err(e) => {
                tracing::warn!("USB read failed: {}", e);
                self.listener.on_error(e.into());
            }
        }

        match self.commands.try_recv() {
            Ok(command) => match self.write(&command) {
                Ok(()) => Work::Wrote,
                Err(e) => {
                    self.listener.on_error(e);
                    Work::WriteFailed
                }
            },
            Err(TryRecvError::Empty) => Work::Idle,
            Err(TryRecvError::Disconnected) => Work::Stop,
        }
    }

    fn write(&mut self, command: &LedCommand) -> HostResult<()> {
        let report = output_report(command);
        let mut retries_left = self.write_retries;
        loop {
            match self.port.write_report(&report) {
                Ok(_) => return Ok(()),
                Err(e) if retries_left > 0 => {
                    retries_left -= 1;
                    tracing::debug!(
                        "Retrying write of {:02X?} ({} left): {}",
                        report,
                        retries_left,
                        e
                    );
                }
                Err(e) => {
                    tracing::warn!("USB write of {:02X?} failed: {}", report, e);
                    return Err(e.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use hidapi::HidError;

    use super::*;
    use crate::report::Status;
    use crate::Error;

    #[derive(Default)]
    struct PortState {
        reads: VecDeque<Result<Vec<u8>, String>>,
        write_failures: usize,
        write_attempts: usize,
        written: Vec<Vec<u8>>,
        /// Held by `read_report` until the test releases it.
        gate: Option<Receiver<()>>,
    }

    #[derive(Clone, Default)]
    struct MockPort {
        state: Arc<Mutex<PortState>>,
    }

    impl MockPort {
        fn with_reads(reads: Vec<Result<Vec<u8>, String>>) -> Self {
            let port = Self::default();
            port.state.lock().unwrap().reads = reads.into();
            port
        }

        fn written(&self) -> Vec<Vec<u8>> {
            self.state.lock().unwrap().written.clone()
        }
    }

    impl HidPort for MockPort {
        fn write_report(&mut self, report: &[u8]) -> Result<usize, HidError> {
            let mut state = self.state.lock().unwrap();
            state.write_attempts += 1;
            if state.write_failures > 0 {
                state.write_failures -= 1;
                return Err(HidError::HidApiError {
                    message: "pipe stalled".into(),
                });
            }
            state.written.push(report.to_vec());
            Ok(report.len())
        }

        fn read_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, HidError> {
            let gate = self.state.lock().unwrap().gate.take();
            if let Some(gate) = gate {
                let _ = gate.recv();
            }

            let next = self.state.lock().unwrap().reads.pop_front();
            match next {
                Some(Ok(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Some(Err(message)) => Err(HidError::HidApiError { message }),
                None => {
                    thread::sleep(Duration::from_millis(timeout_ms as u64));
                    Ok(0)
                }
            }
        }
    }

    type Events = Receiver<HostResult<Status>>;

    fn worker(
        port: MockPort,
        config: ClientConfig,
    ) -> (IoWorker<MockPort, Sender<HostResult<Status>>>, Sender<LedCommand>, Events) {
        let (event_tx, event_rx) = crossbeam::channel::unbounded::<HostResult<Status>>();
        let (cmd_tx, cmd_rx) = crossbeam::channel::bounded(config.queue_depth);
        (IoWorker::new(port, event_tx, cmd_rx, &config), cmd_tx, event_rx)
    }

    fn fast_config() -> ClientConfig {
        ClientConfig {
            read_timeout: Duration::from_millis(1),
            ..Default::default()
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Single IO passes
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn pass_reads_status_then_writes_command() {
        let port = MockPort::with_reads(vec![Ok(vec![0])]);
        let (mut io, commands, events) = worker(port.clone(), fast_config());

        commands
            .send(LedCommand::new([true, false, false, true]))
            .unwrap();
        assert_eq!(io.work(), Work::Wrote);

        assert!(matches!(events.try_recv(), Ok(Ok(Status::Success))));
        assert_eq!(port.written(), [vec![0u8, 1, 0, 0, 1]]);
    }

    #[test]
    fn empty_queue_is_idle_and_closed_queue_stops() {
        let (mut io, commands, events) = worker(MockPort::default(), fast_config());

        assert_eq!(io.work(), Work::Idle);
        assert!(events.try_recv().is_err());

        drop(commands);
        assert_eq!(io.work(), Work::Stop);
    }

    #[test]
    fn queued_commands_are_written_before_stopping() {
        let port = MockPort::default();
        let (mut io, commands, _events) = worker(port.clone(), fast_config());

        commands.send(LedCommand::new([true, false, false, false])).unwrap();
        commands.send(LedCommand::new([false, true, false, false])).unwrap();
        drop(commands);

        assert_eq!(io.work(), Work::Wrote);
        assert_eq!(io.work(), Work::Wrote);
        assert_eq!(io.work(), Work::Stop);
        assert_eq!(port.written(), [vec![0u8, 1, 0, 0, 0], vec![0, 0, 1, 0, 0]]);
    }

    #[test]
    fn read_errors_are_reported_and_do_not_block_writes() {
        let port = MockPort::with_reads(vec![Err("device unplugged".into()), Ok(vec![7])]);
        let (mut io, commands, events) = worker(port.clone(), fast_config());

        commands.send(LedCommand::new([true; 4])).unwrap();
        assert_eq!(io.work(), Work::Wrote);
        assert!(matches!(events.try_recv(), Ok(Err(HostError::Hid(_)))));

        assert_eq!(io.work(), Work::Idle);
        assert!(matches!(
            events.try_recv(),
            Ok(Err(HostError::Protocol(Error::UnknownStatus(7))))
        ));
        assert_eq!(port.written().len(), 1);
    }

    #[test]
    fn failed_write_is_retried() {
        let port = MockPort::default();
        port.state.lock().unwrap().write_failures = 2;
        let config = ClientConfig {
            write_retries: 2,
            ..fast_config()
        };
        let (mut io, commands, events) = worker(port.clone(), config);

        commands.send(LedCommand::new([false, false, true, false])).unwrap();
        assert_eq!(io.work(), Work::Wrote);

        assert_eq!(port.state.lock().unwrap().write_attempts, 3);
        assert_eq!(port.written(), [vec![0u8, 0, 0, 1, 0]]);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn write_error_reaches_listener_when_retries_run_out() {
        let port = MockPort::default();
        port.state.lock().unwrap().write_failures = 2;
        let config = ClientConfig {
            write_retries: 1,
            ..fast_config()
        };
        let (mut io, commands, events) = worker(port.clone(), config);

        commands.send(LedCommand::new([true; 4])).unwrap();
        assert_eq!(io.work(), Work::WriteFailed);
        assert!(matches!(events.try_recv(), Ok(Err(HostError::Hid(_)))));
        assert!(port.written().is_empty());

        // The next command goes through; the failed one is not resent.
        commands.send(LedCommand::new([false; 4])).unwrap();
        assert_eq!(io.work(), Work::Wrote);
        assert_eq!(port.written(), [vec![0u8; 5]]);
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Client with a running IO thread
    // ═══════════════════════════════════════════════════════════════════════

    #[test]
    fn client_writes_in_order_and_reports_statuses() {
        let port = MockPort::with_reads(vec![Ok(vec![0]), Ok(vec![1])]);
        let (events_tx, events) = crossbeam::channel::unbounded::<HostResult<Status>>();
        let client = LedClient::start(port.clone(), events_tx, fast_config()).unwrap();

        for i in 0..4 {
            let mut levels = [false; 4];
            levels[i] = true;
            client.write_async(LedCommand::new(levels)).unwrap();
        }

        let timeout = Duration::from_secs(5);
        assert!(matches!(events.recv_timeout(timeout), Ok(Ok(Status::Success))));
        assert!(matches!(events.recv_timeout(timeout), Ok(Ok(Status::Error))));

        client.close();
        assert_eq!(
            port.written(),
            [
                vec![0u8, 1, 0, 0, 0],
                vec![0, 0, 1, 0, 0],
                vec![0, 0, 0, 1, 0],
                vec![0, 0, 0, 0, 1],
            ]
        );
    }

    #[test]
    fn full_queue_rejects_new_commands() {
        let port = MockPort::default();
        let (release, gate) = crossbeam::channel::bounded(1);
        port.state.lock().unwrap().gate = Some(gate);

        let config = ClientConfig {
            queue_depth: 1,
            ..fast_config()
        };
        let (events_tx, _events) = crossbeam::channel::unbounded::<HostResult<Status>>();
        let client = LedClient::start(port.clone(), events_tx, config).unwrap();

        // The IO thread is parked in its first read.
        client.write_async(LedCommand::new([true; 4])).unwrap();
        assert!(matches!(
            client.write_async(LedCommand::new([false; 4])),
            Err(HostError::QueueFull)
        ));

        release.send(()).unwrap();
        drop(client);
        assert_eq!(port.written(), [vec![0u8, 1, 1, 1, 1]]);
    }
}

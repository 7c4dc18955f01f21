use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use dsky_core::constants::{DEFAULT_FLASH_HALF_PERIOD_MS, DEFAULT_LAMP_TEST_MS};
use dsky_core::{Dsky, KeyEvent, RenderableState};
use dsky_protocol::ChannelWrite;
use log::{debug, info, warn};

const SNAPSHOT_DEPTH: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    pub flash_half_period: Duration,
    pub lamp_test: Duration,
    pub refresh: Duration, // Tick interval when no input arrives
    pub queue_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            flash_half_period: Duration::from_millis(DEFAULT_FLASH_HALF_PERIOD_MS),
            lamp_test: Duration::from_millis(DEFAULT_LAMP_TEST_MS),
            refresh: Duration::from_millis(50),
            queue_depth: 64,
        }
    }
}

/// Messages accepted by the engine thread
#[derive(Clone, Debug)]
pub enum Inbound {
    /// Raw word from the transport, channel not yet validated
    Word { channel: u16, value: u16 },
    Key(KeyEvent),
    LampTest,
    /// Replies with the frame shown once every earlier message is applied
    Render(Sender<RenderableState>),
}

/// Handle to a running engine thread
pub struct DskyRuntime {
    pub inbound: Sender<Inbound>,
    pub snapshots: Receiver<RenderableState>,
    pub outbound: Receiver<ChannelWrite>,
    thread: JoinHandle<()>,
}

impl DskyRuntime {
    pub fn spawn(config: EngineConfig) -> Self {
        let (inbound, inbound_rx) = bounded(config.queue_depth);
        let (snapshot_tx, snapshots) = bounded(SNAPSHOT_DEPTH);
        let (outbound_tx, outbound) = bounded(config.queue_depth);

        // Only this thread ever touches the engine state
        let thread =
            std::thread::spawn(move || engine_thread(config, inbound_rx, snapshot_tx, outbound_tx));

        DskyRuntime {
            inbound,
            snapshots,
            outbound,
            thread,
        }
    }

    /// Frame after everything queued so far, or `None` on timeout
    ///
    /// Unlike the snapshot stream this does not depend on the display going
    /// quiet, so it returns even while fields are flashing.
    pub fn current_frame(&self, timeout: Duration) -> Option<RenderableState> {
        let (reply, frame) = bounded(1);
        self.inbound.send_timeout(Inbound::Render(reply), timeout).ok()?;
        frame.recv_timeout(timeout).ok()
    }

    /// Closes the inbound queue and waits for the engine to drain it
    pub fn shutdown(self) -> std::thread::Result<()> {
        drop(self.inbound);
        self.thread.join()
    }
}

fn handle_message(
    dsky: &mut Dsky,
    config: &EngineConfig,
    msg: Inbound,
    now: Duration,
    outbound: &Sender<ChannelWrite>,
) {
    match msg {
        Inbound::Word { channel, value } => {
            // Errors are logged by the engine and dropped here
            let _ = dsky.apply_raw(channel, value);
        }
        Inbound::Key(event) => {
            for write in dsky.press(event).iter() {
                match outbound.try_send(*write) {
                    Ok(()) => {}
                    Err(TrySendError::Full(w)) => warn!("Outbound queue full, dropping {:?}", w),
                    Err(TrySendError::Disconnected(_)) => debug!("No outbound listener"),
                }
            }
        }
        Inbound::LampTest => dsky.start_lamp_test(config.lamp_test, now),
        Inbound::Render(reply) => {
            if reply.try_send(dsky.render(now)).is_err() {
                debug!("Frame requester went away");
            }
        }
    }
}

// Owns the engine; exits once every inbound sender is gone
fn engine_thread(
    config: EngineConfig,
    rx: Receiver<Inbound>,
    snapshots: Sender<RenderableState>,
    outbound: Sender<ChannelWrite>,
) {
    let epoch = Instant::now();
    let mut dsky = Dsky::new(config.flash_half_period);
    let mut published: Option<RenderableState> = None;

    info!("DSKY engine started");
    loop {
        match rx.recv_timeout(config.refresh) {
            Ok(msg) => {
                let now = epoch.elapsed();
                handle_message(&mut dsky, &config, msg, now, &outbound);
                // Drain what is queued, bounded so ticks keep coming
                for msg in rx.try_iter().take(config.queue_depth) {
                    handle_message(&mut dsky, &config, msg, now, &outbound);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let now = epoch.elapsed();
        dsky.tick(now);
        let frame = dsky.render(now);
        if published == Some(frame) {
            continue;
        }
        match snapshots.try_send(frame) {
            Ok(()) => published = Some(frame),
            // Readers are behind; retry on the next tick
            Err(TrySendError::Full(_)) => {}
            Err(TrySendError::Disconnected(_)) => published = Some(frame),
        }
    }
    info!("DSKY engine stopped");
}

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};

use crate::delegate::forwarder::DelegateForwarder;
use crate::models::camera::Camera;
use crate::models::config::CaptureConfiguration;
use crate::models::device::CaptureDevice;
use crate::models::error::CaptureError;
use crate::models::media::Frame;
use crate::models::state::CaptureState;
use crate::recording::state_machine::{FrameOutcome, RecordingSession, RecordingStateMachine};
use crate::selector::device_selector::{change_capture_device, DeviceChange};
use crate::storage::finalize::spawn_finalize;
use crate::traits::capture_delegate::CaptureDelegate;
use crate::traits::capture_source::{CaptureSource, FrameCallback};
use crate::traits::device_catalog::DeviceCatalog;
use crate::traits::frame_delegate::FrameDelegate;
use crate::traits::movie_writer::MovieWriterFactory;
use crate::traits::photo_library::PhotoLibrary;

/// Frames waiting for the capture queue. A frame arriving while this is
/// full is dropped.
pub const FRAME_QUEUE_DEPTH: usize = 4;

/// Run id meaning "no run attached".
const DETACHED: u64 = 0;

/// Control messages to the capture queue. The queue is the only owner of
/// the recording state; everything else talks to it through these.
enum Command {
    Start(Camera),
    Stop,
    Trigger,
    Flush(Sender<()>),
    Shutdown,
}

/// A frame tagged with the run that delivered it.
type RunFrame = (u64, Frame);

/// Read-only view published by the capture queue.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    state: CaptureState,
    active_device: Option<CaptureDevice>,
    running: bool,
}

type SharedDelegate = Arc<RwLock<Option<Arc<dyn CaptureDelegate>>>>;

/// Camera capture controller.
///
/// Owns the capture source on a dedicated `capture-queue` thread that
/// serializes session configuration and per-frame recording work. Every
/// frame is also forwarded to the `FrameDelegate`, recording or not.
///
/// ```text
/// [CaptureSource] → callback ─┬→ [DelegateForwarder] → FrameDelegate
///                             └→ frame queue → capture-queue → [RecordingStateMachine] → [MovieWriter]
///                                                                     ↓ end
///                                               recording-finalize → [PhotoLibrary]
/// ```
///
/// Each start of the source is a new run with its own id. Frames from any
/// other run are discarded, so a stopped camera can never feed the next
/// recording.
pub struct CaptureController {
    commands: Sender<Command>,
    active_run: Arc<AtomicU64>,
    has_video_output: bool,
    current_camera: Mutex<Camera>,
    snapshot: Arc<RwLock<Snapshot>>,
    delegate: SharedDelegate,
    forwarder: Arc<DelegateForwarder>,
    worker: Option<thread::JoinHandle<()>>,
}

impl CaptureController {
    pub fn new<S, C, W, L>(
        source: S,
        catalog: C,
        writer_factory: W,
        photo_library: L,
        config: CaptureConfiguration,
    ) -> Result<Self, CaptureError>
    where
        S: CaptureSource + 'static,
        C: DeviceCatalog + 'static,
        W: MovieWriterFactory + 'static,
        L: PhotoLibrary + 'static,
    {
        config.validate().map_err(CaptureError::ConfigurationFailed)?;

        let has_video_output = source.has_video_output();
        let forwarder = Arc::new(DelegateForwarder::spawn(config.rotation_degrees)?);
        let active_run = Arc::new(AtomicU64::new(DETACHED));
        let snapshot = Arc::new(RwLock::new(Snapshot::default()));
        let delegate: SharedDelegate = Arc::new(RwLock::new(None));
        let (commands, command_rx) = unbounded();
        let (frame_tx, frame_rx) = bounded(FRAME_QUEUE_DEPTH);

        let worker = CaptureWorker {
            source: Box::new(source),
            catalog: Box::new(catalog),
            writer_factory: Box::new(writer_factory),
            photo_library: Arc::new(photo_library),
            machine: RecordingStateMachine::new(&config),
            config: config.clone(),
            run_id: DETACHED,
            last_run: DETACHED,
            active_run: Arc::clone(&active_run),
            frame_tx,
            backlog_drops: Arc::new(AtomicU64::new(0)),
            forwarder: Arc::clone(&forwarder),
            snapshot: Arc::clone(&snapshot),
            delegate: Arc::clone(&delegate),
            finalizers: Vec::new(),
        };

        let handle = thread::Builder::new()
            .name("capture-queue".into())
            .spawn(move || worker.run(command_rx, frame_rx))
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn capture queue: {}", e)))?;

        Ok(Self {
            commands,
            active_run,
            has_video_output,
            current_camera: Mutex::new(config.default_camera),
            snapshot,
            delegate,
            forwarder,
            worker: Some(handle),
        })
    }

    pub fn set_delegate(&self, delegate: Arc<dyn CaptureDelegate>) {
        *self.delegate.write() = Some(delegate);
    }

    pub fn set_frame_delegate(&self, delegate: Arc<dyn FrameDelegate>) {
        self.forwarder.set_delegate(Some(delegate));
    }

    pub fn clear_frame_delegate(&self) {
        self.forwarder.set_delegate(None);
    }

    pub fn state(&self) -> CaptureState {
        self.snapshot.read().state
    }

    pub fn current_camera(&self) -> Camera {
        *self.current_camera.lock()
    }

    /// Device backing the source's input, as last configured by the queue.
    pub fn active_device(&self) -> Option<CaptureDevice> {
        self.snapshot.read().active_device.clone()
    }

    pub fn is_running(&self) -> bool {
        self.snapshot.read().running
    }

    /// Select `camera`, apply the session preset and begin frame delivery.
    ///
    /// No-op when the source has no video output.
    pub fn start_capture(&self, camera: Camera) {
        if !self.has_video_output {
            log::warn!("No video output configured, ignoring start");
            return;
        }
        *self.current_camera.lock() = camera;
        self.send(Command::Start(camera));
    }

    /// Detach frame delivery, halt the source and finalize any open recording.
    ///
    /// The detach takes effect before this returns. Finalization and the
    /// photo-library save complete later and are reported through the
    /// `CaptureDelegate`.
    pub fn stop_capture(&self) {
        self.active_run.store(DETACHED, Ordering::SeqCst);
        self.send(Command::Stop);
    }

    /// Stop, then start with the other camera.
    pub fn switch_camera(&self) {
        self.stop_capture();
        let next = {
            let mut camera = self.current_camera.lock();
            *camera = camera.next();
            *camera
        };
        self.start_capture(next);
    }

    /// The user capture action: idle → start, capturing → end.
    pub fn capture(&self) {
        self.send(Command::Trigger);
    }

    /// Block until every command and frame enqueued so far has been handled,
    /// including delivery to the frame delegate.
    pub fn flush(&self) {
        let (done_tx, done_rx) = bounded(1);
        if self.commands.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
        self.forwarder.flush();
    }

    /// Stop the capture queue and wait for pending finalizations.
    ///
    /// A recording still open at this point is finalized and saved first.
    pub fn shutdown(&mut self) {
        self.active_run.store(DETACHED, Ordering::SeqCst);
        let Some(handle) = self.worker.take() else {
            return;
        };
        let _ = self.commands.send(Command::Shutdown);
        if handle.join().is_err() {
            log::error!("Capture queue panicked");
        }
        self.forwarder.shutdown();
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            log::warn!("Capture queue has shut down");
        }
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// State owned by the capture queue thread.
struct CaptureWorker {
    source: Box<dyn CaptureSource>,
    catalog: Box<dyn DeviceCatalog>,
    writer_factory: Box<dyn MovieWriterFactory>,
    photo_library: Arc<dyn PhotoLibrary>,
    machine: RecordingStateMachine,
    config: CaptureConfiguration,
    /// Run whose frames are accepted, or `DETACHED`.
    run_id: u64,
    last_run: u64,
    active_run: Arc<AtomicU64>,
    frame_tx: Sender<RunFrame>,
    backlog_drops: Arc<AtomicU64>,
    forwarder: Arc<DelegateForwarder>,
    snapshot: Arc<RwLock<Snapshot>>,
    delegate: SharedDelegate,
    finalizers: Vec<thread::JoinHandle<()>>,
}

impl CaptureWorker {
    fn run(mut self, commands: Receiver<Command>, frames: Receiver<RunFrame>) {
        loop {
            select! {
                recv(commands) -> msg => match msg {
                    Ok(Command::Start(camera)) => self.start(camera),
                    Ok(Command::Stop) => self.stop(),
                    Ok(Command::Trigger) => self.trigger(),
                    Ok(Command::Flush(done)) => {
                        while let Ok((run, frame)) = frames.try_recv() {
                            self.frame(run, frame);
                        }
                        let _ = done.send(());
                    }
                    Ok(Command::Shutdown) | Err(_) => break,
                },
                recv(frames) -> msg => {
                    if let Ok((run, frame)) = msg {
                        self.frame(run, frame);
                    }
                }
            }
        }
        self.shutdown();
    }

    /// Callback for one run of the source. It goes quiet as soon as the
    /// run is detached.
    fn frame_callback(&self, run: u64) -> FrameCallback {
        let active_run = Arc::clone(&self.active_run);
        let forwarder = Arc::clone(&self.forwarder);
        let frames = self.frame_tx.clone();
        let backlog_drops = Arc::clone(&self.backlog_drops);
        Arc::new(move |frame: Frame| {
            if active_run.load(Ordering::SeqCst) != run {
                return;
            }
            forwarder.forward(&frame);
            match frames.try_send((run, frame)) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => {}
                Err(TrySendError::Full((_, frame))) => {
                    backlog_drops.fetch_add(1, Ordering::SeqCst);
                    log::trace!("Capture queue full, dropping frame at {:.3}s", frame.timestamp.seconds());
                }
            }
        })
    }

    fn attach(&mut self) -> u64 {
        self.last_run += 1;
        self.run_id = self.last_run;
        self.active_run.store(self.run_id, Ordering::SeqCst);
        self.run_id
    }

    fn detach(&mut self) {
        self.run_id = DETACHED;
        self.active_run.store(DETACHED, Ordering::SeqCst);
    }

    fn start(&mut self, camera: Camera) {
        self.machine.set_camera(camera);

        let change = change_capture_device(self.catalog.as_ref(), self.source.as_mut(), camera.device_index());
        match &change {
            DeviceChange::NoDevice => log::warn!("No capture device for {:?} camera", camera),
            DeviceChange::Failed(device) => log::warn!("Could not switch to {}", device.localized_name),
            DeviceChange::Unchanged(_) | DeviceChange::Switched(_) => {}
        }
        if let Some(device) = change.device() {
            log::debug!("{:?} camera uses {}", camera, device.localized_name);
        }

        let preset = self.config.session_preset;
        self.source.begin_configuration();
        if self.source.can_set_session_preset(preset) {
            self.source.set_session_preset(preset);
        }
        self.source.commit_configuration();

        // A source left running by a failed stop belongs to a detached run.
        if self.source.is_running() && self.run_id == DETACHED {
            if let Err(e) = self.source.stop_running() {
                log::warn!("Failed to stop detached capture: {}", e);
            }
        }
        if !self.source.is_running() {
            let run = self.attach();
            log::debug!("Starting capture run {}", run);
            let callback = self.frame_callback(run);
            if let Err(e) = self.source.start_running(callback) {
                self.detach();
                log::error!("Failed to start capture: {}", e);
                self.report_error(&e);
            }
        }

        if self.machine.reset() {
            self.publish_state();
        }
        if self.config.record_on_start && self.machine.state().is_idle() {
            self.trigger();
        }
        self.publish_source();
    }

    fn stop(&mut self) {
        self.detach();
        if self.source.is_running() {
            if let Err(e) = self.source.stop_running() {
                log::warn!("Failed to stop capture: {}", e);
            }
        }
        self.absorb_backlog_drops();
        let before = self.machine.state();
        let session = self.machine.force_end();
        if before != self.machine.state() {
            self.publish_state();
        }
        if let Some(session) = session {
            self.finalize(session);
        }
        self.publish_source();
    }

    fn trigger(&mut self) {
        self.absorb_backlog_drops();
        let before = self.machine.state();
        let session = self.machine.trigger();
        if before != self.machine.state() {
            self.publish_state();
        }
        if let Some(session) = session {
            self.finalize(session);
        }
    }

    fn frame(&mut self, run: u64, frame: Frame) {
        if run != self.run_id {
            log::trace!("Discarding frame from run {} (current {})", run, self.run_id);
            return;
        }
        let before = self.machine.state();
        let outcome = self
            .machine
            .handle_frame(&frame, self.writer_factory.as_ref(), self.source.as_ref());
        if let FrameOutcome::Failed(ref e) = outcome {
            self.report_error(e);
        }
        self.absorb_backlog_drops();
        if before != self.machine.state() {
            self.publish_state();
        }
    }

    /// Move frames dropped at the full queue into the open recording's count.
    fn absorb_backlog_drops(&mut self) {
        let dropped = self.backlog_drops.swap(0, Ordering::SeqCst);
        if dropped > 0 && !self.machine.record_dropped(dropped) {
            log::trace!("Dropped {} frames outside a recording", dropped);
        }
    }

    fn finalize(&mut self, session: RecordingSession) {
        self.finalizers.retain(|h| !h.is_finished());
        let delegate = self.delegate.read().clone();
        match spawn_finalize(session, Arc::clone(&self.photo_library), delegate, self.config.write_metadata) {
            Ok(handle) => self.finalizers.push(handle),
            Err(e) => {
                log::error!("{}", e);
                self.report_error(&e);
            }
        }
    }

    fn shutdown(&mut self) {
        self.detach();
        if self.source.is_running() {
            if let Err(e) = self.source.stop_running() {
                log::warn!("Failed to stop capture on shutdown: {}", e);
            }
        }
        self.absorb_backlog_drops();
        if let Some(session) = self.machine.force_end() {
            self.publish_state();
            self.finalize(session);
        }
        for handle in self.finalizers.drain(..) {
            if handle.join().is_err() {
                log::error!("Finalize thread panicked");
            }
        }
    }

    fn publish_state(&self) {
        let state = self.machine.state();
        self.snapshot.write().state = state;
        let delegate = self.delegate.read().clone();
        if let Some(d) = delegate {
            d.on_state_changed(&state);
        }
    }

    fn publish_source(&self) {
        let mut snapshot = self.snapshot.write();
        snapshot.active_device = self.source.active_input();
        snapshot.running = self.source.is_running();
    }

    fn report_error(&self, error: &CaptureError) {
        let delegate = self.delegate.read().clone();
        if let Some(d) = delegate {
            d.on_error(error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        frame_at, two_camera_devices, unique_temp_dir, wait_for, ChannelDelegate, Event, MockCatalog, MockLibrary,
        MockSource, MockSourceHandle, MockWriterFactory,
    };
    use approx::assert_relative_eq;
    use std::path::PathBuf;
    use std::time::Duration;

    struct Harness {
        controller: CaptureController,
        source: MockSourceHandle,
        factory: MockWriterFactory,
        library: MockLibrary,
        events: Receiver<Event>,
        dir: PathBuf,
    }

    fn harness_with(source: MockSource, devices: Vec<CaptureDevice>, config: CaptureConfiguration) -> Harness {
        let dir = unique_temp_dir("controller");
        let factory = MockWriterFactory::new();
        let library = MockLibrary::authorized();
        let handle = source.handle();
        let controller = CaptureController::new(
            source,
            MockCatalog::new(devices),
            factory.clone(),
            library.clone(),
            CaptureConfiguration {
                output_directory: dir.clone(),
                ..config
            },
        )
        .unwrap();
        let (delegate, events) = ChannelDelegate::new();
        controller.set_delegate(delegate.clone());
        controller.set_frame_delegate(delegate);
        Harness {
            controller,
            source: handle,
            factory,
            library,
            events,
            dir,
        }
    }

    fn harness() -> Harness {
        harness_with(MockSource::new(), two_camera_devices(), CaptureConfiguration::default())
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.dir).ok();
        }
    }

    #[test]
    fn start_selects_camera_and_preset() {
        let h = harness();
        h.controller.start_capture(Camera::Front);
        h.controller.flush();

        assert_eq!(h.controller.active_device().unwrap().unique_id, "front-id");
        assert!(h.controller.is_running());
        let log = h.source.log();
        assert_eq!(log.presets, vec![crate::models::device::SessionPreset::Vga640x480]);
        assert_eq!(log.starts, 1);
        assert_eq!(h.controller.state(), CaptureState::Idle);
    }

    #[test]
    fn start_without_video_output_is_noop() {
        let mut source = MockSource::new();
        source.has_output = false;
        let h = harness_with(source, two_camera_devices(), CaptureConfiguration::default());

        h.controller.start_capture(Camera::Back);
        h.controller.flush();

        assert!(!h.controller.is_running());
        assert_eq!(h.source.log().starts, 0);
        assert_eq!(h.controller.current_camera(), Camera::Front);
    }

    #[test]
    fn start_with_no_devices_still_runs() {
        let h = harness_with(MockSource::new(), Vec::new(), CaptureConfiguration::default());
        h.controller.start_capture(Camera::Front);
        h.controller.flush();

        assert!(h.controller.active_device().is_none());
        assert!(h.controller.is_running());
    }

    #[test]
    fn frames_forward_regardless_of_state() {
        let h = harness();
        h.controller.start_capture(Camera::Front);
        h.controller.flush();

        assert!(h.source.deliver(frame_at(1.0)));
        assert!(h.source.deliver(frame_at(2.0)));
        h.controller.flush();

        let frames: Vec<Event> = h.events.try_iter().filter(|e| matches!(e, Event::Frame { .. })).collect();
        assert_eq!(frames.len(), 2);
        assert!(matches!(frames[0], Event::Frame { rotation: 90, .. }));
        assert_eq!(h.factory.created(), 0);
    }

    #[test]
    fn end_to_end_record_and_save() {
        let h = harness();
        h.controller.start_capture(Camera::Front);
        h.controller.capture();
        h.controller.flush();
        assert_eq!(h.controller.state(), CaptureState::Start);

        h.source.deliver(frame_at(10.0));
        h.controller.flush();
        assert_eq!(h.controller.state(), CaptureState::Capturing);
        assert_eq!(h.factory.created(), 1);

        h.source.deliver(frame_at(10.5));
        h.controller.flush();
        let appended = h.factory.appended();
        assert_eq!(appended.len(), 2);
        assert_eq!(appended[0].value, 0);
        assert_relative_eq!(appended[1].seconds(), 0.5);

        h.controller.stop_capture();
        let finished = wait_for(&h.events, |e| matches!(e, Event::Finished(_)));
        let Some(Event::Finished(result)) = finished else {
            panic!("recording was not saved");
        };
        assert_eq!(h.controller.state(), CaptureState::End);
        assert_eq!(h.factory.finished(), 1);
        assert_eq!(h.library.saved(), vec![result.file_path.clone()]);
        assert_eq!(result.metadata.camera, Some(Camera::Front));
        assert!(result.file_path.starts_with(&h.dir));
    }

    #[test]
    fn trigger_while_capturing_finalizes() {
        let h = harness();
        h.controller.start_capture(Camera::Back);
        h.controller.capture();
        h.controller.flush();
        h.source.deliver(frame_at(0.0));
        h.controller.flush();

        h.controller.capture();
        assert!(wait_for(&h.events, |e| matches!(e, Event::Finished(_))).is_some());
        assert_eq!(h.controller.state(), CaptureState::End);

        // Frames after the end are still forwarded but never recorded.
        h.source.deliver(frame_at(1.0));
        h.controller.flush();
        assert_eq!(h.factory.appended().len(), 1);
    }

    #[test]
    fn stop_detaches_frames() {
        let h = harness();
        h.controller.start_capture(Camera::Front);
        h.controller.flush();

        h.controller.stop_capture();
        h.controller.flush();
        assert!(!h.controller.is_running());
        assert_eq!(h.controller.state(), CaptureState::End);
        assert_eq!(h.source.log().stops, 1);
        assert!(!h.source.deliver(frame_at(0.0)));
    }

    #[test]
    fn writer_failure_reports_and_returns_to_idle() {
        let h = harness();
        h.factory.set_fail_create(true);
        h.controller.start_capture(Camera::Front);
        h.controller.capture();
        h.controller.flush();
        h.source.deliver(frame_at(0.0));
        h.controller.flush();

        assert_eq!(h.controller.state(), CaptureState::Idle);
        assert!(wait_for(&h.events, |e| matches!(e, Event::Error(CaptureError::WriterCreationFailed(_)))).is_some());
    }

    #[test]
    fn switch_camera_flips_selection() {
        let h = harness();
        h.controller.start_capture(Camera::Front);
        h.controller.flush();

        h.controller.switch_camera();
        h.controller.flush();
        assert_eq!(h.controller.current_camera(), Camera::Back);
        assert_eq!(h.controller.active_device().unwrap().unique_id, "back-id");
        assert!(h.controller.is_running());
        assert_eq!(h.controller.state(), CaptureState::Idle);

        h.controller.switch_camera();
        h.controller.flush();
        assert_eq!(h.controller.current_camera(), Camera::Front);
        assert_eq!(h.controller.active_device().unwrap().unique_id, "front-id");
    }

    #[test]
    fn switch_camera_ends_recording() {
        let h = harness();
        h.controller.start_capture(Camera::Front);
        h.controller.capture();
        h.controller.flush();
        h.source.deliver(frame_at(0.0));
        h.controller.flush();

        h.controller.switch_camera();
        assert!(wait_for(&h.events, |e| matches!(e, Event::Finished(_))).is_some());
        h.controller.flush();
        assert_eq!(h.controller.state(), CaptureState::Idle);
    }

    #[test]
    fn frames_from_previous_camera_never_reach_new_recording() {
        let h = harness_with(
            MockSource::new(),
            two_camera_devices(),
            CaptureConfiguration {
                record_on_start: true,
                ..Default::default()
            },
        );
        h.controller.start_capture(Camera::Front);
        h.controller.flush();
        let front_callback = h.source.callback().unwrap();
        h.source.deliver(frame_at(50.0));
        h.controller.flush();

        h.controller.switch_camera();
        front_callback(frame_at(50.5));
        h.controller.flush();
        front_callback(frame_at(50.6));
        h.source.deliver(frame_at(0.0));
        h.source.deliver(frame_at(0.1));
        h.controller.flush();

        assert_eq!(h.factory.created(), 2);
        let appended: Vec<f64> = h.factory.appended().iter().map(|t| t.seconds()).collect();
        assert_eq!(appended.len(), 3);
        assert_relative_eq!(appended[0], 0.0);
        assert_relative_eq!(appended[1], 0.0);
        assert_relative_eq!(appended[2], 0.1, epsilon = 1e-9);
        assert_eq!(h.controller.active_device().unwrap().unique_id, "back-id");
    }

    #[test]
    fn slow_writer_drops_frames_instead_of_queueing() {
        let h = harness();
        h.factory.set_append_delay(Duration::from_millis(50));
        h.controller.start_capture(Camera::Front);
        h.controller.capture();
        h.controller.flush();

        for i in 0..40 {
            assert!(h.source.deliver(frame_at(i as f64 / 30.0)));
        }
        h.controller.flush();
        assert!(h.factory.appended().len() < 40);

        // The frame delegate still saw every frame.
        let forwarded = h.events.try_iter().filter(|e| matches!(e, Event::Frame { .. })).count();
        assert_eq!(forwarded, 40);

        h.controller.capture();
        let Some(Event::Finished(result)) = wait_for(&h.events, |e| matches!(e, Event::Finished(_))) else {
            panic!("recording was not saved");
        };
        assert!(result.metadata.frames_dropped > 0);
        assert_eq!(result.metadata.frames_appended + result.metadata.frames_dropped, 40);
    }

    #[test]
    fn record_on_start_arms_recording() {
        let h = harness_with(
            MockSource::new(),
            two_camera_devices(),
            CaptureConfiguration {
                record_on_start: true,
                ..Default::default()
            },
        );
        h.controller.start_capture(Camera::Front);
        h.controller.flush();
        assert_eq!(h.controller.state(), CaptureState::Start);

        h.source.deliver(frame_at(5.0));
        h.controller.flush();
        assert_eq!(h.controller.state(), CaptureState::Capturing);
    }

    #[test]
    fn shutdown_finalizes_open_recording() {
        let mut h = harness();
        h.controller.start_capture(Camera::Front);
        h.controller.capture();
        h.controller.flush();
        h.source.deliver(frame_at(0.0));
        h.controller.flush();

        h.controller.shutdown();
        assert_eq!(h.library.saved().len(), 1);
        assert!(h.events.try_iter().any(|e| matches!(e, Event::Finished(_))));

        // Commands after shutdown are ignored.
        h.controller.capture();
        h.controller.flush();
    }

    #[test]
    fn invalid_config_is_rejected() {
        let result = CaptureController::new(
            MockSource::new(),
            MockCatalog::new(Vec::new()),
            MockWriterFactory::new(),
            MockLibrary::authorized(),
            CaptureConfiguration {
                media_timescale: -1,
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(CaptureError::ConfigurationFailed(_))));
    }
}

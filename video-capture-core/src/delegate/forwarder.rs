use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use crate::models::error::CaptureError;
use crate::models::media::{Frame, MediaTime, PixelBuffer};
use crate::traits::frame_delegate::FrameDelegate;

enum Dispatch {
    Frame {
        buffer: PixelBuffer,
        rotation_degrees: u32,
        timestamp: MediaTime,
    },
    Flush(Sender<()>),
    Shutdown,
}

/// Hands every captured frame to the registered `FrameDelegate` on a
/// dedicated `delegate-dispatch` thread, independent of recording state.
///
/// The delegate is looked up when the frame is dispatched. With none
/// registered the frame is dropped.
pub struct DelegateForwarder {
    tx: Sender<Dispatch>,
    delegate: Arc<RwLock<Option<Arc<dyn FrameDelegate>>>>,
    rotation_degrees: u32,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
}

impl DelegateForwarder {
    pub fn spawn(rotation_degrees: u32) -> Result<Self, CaptureError> {
        let (tx, rx) = unbounded();
        let delegate: Arc<RwLock<Option<Arc<dyn FrameDelegate>>>> = Arc::new(RwLock::new(None));

        let dispatch_delegate = Arc::clone(&delegate);
        let handle = thread::Builder::new()
            .name("delegate-dispatch".into())
            .spawn(move || dispatch_loop(rx, dispatch_delegate))
            .map_err(|e| CaptureError::Unknown(format!("failed to spawn dispatch thread: {}", e)))?;

        Ok(Self {
            tx,
            delegate,
            rotation_degrees,
            handle: Mutex::new(Some(handle)),
        })
    }

    pub fn set_delegate(&self, delegate: Option<Arc<dyn FrameDelegate>>) {
        *self.delegate.write() = delegate;
    }

    pub fn has_delegate(&self) -> bool {
        self.delegate.read().is_some()
    }

    /// Post `frame` to the dispatch thread. Never blocks.
    pub fn forward(&self, frame: &Frame) {
        let _ = self.tx.send(Dispatch::Frame {
            buffer: frame.buffer.clone(),
            rotation_degrees: self.rotation_degrees,
            timestamp: frame.timestamp,
        });
    }

    /// Block until every frame posted so far has been dispatched.
    pub fn flush(&self) {
        let (done_tx, done_rx) = bounded(1);
        if self.tx.send(Dispatch::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    /// Stop the dispatch thread after draining queued frames.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Dispatch::Shutdown);
        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for DelegateForwarder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn dispatch_loop(rx: Receiver<Dispatch>, delegate: Arc<RwLock<Option<Arc<dyn FrameDelegate>>>>) {
    while let Ok(message) = rx.recv() {
        match message {
            Dispatch::Frame {
                buffer,
                rotation_degrees,
                timestamp,
            } => {
                let current = delegate.read().clone();
                if let Some(d) = current {
                    d.on_frame(&buffer, rotation_degrees, timestamp);
                }
            }
            Dispatch::Flush(done) => {
                let _ = done.send(());
            }
            Dispatch::Shutdown => break,
        }
    }
}

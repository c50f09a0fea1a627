use crate::models::config::SessionPreset;
use crate::models::device::DeviceInput;
use crate::models::error::CaptureError;

/// The platform's hardware capture pipeline.
///
/// Owned by the `CaptureSession` on the session worker thread and never
/// touched anywhere else. Changes made between `begin_configuration` and
/// `commit_configuration` must become visible together at the commit.
pub trait CaptureBackend: Send {
    fn set_preset(&mut self, preset: SessionPreset);

    fn begin_configuration(&mut self);

    fn commit_configuration(&mut self);

    /// Whether the pipeline could take `input` right now.
    fn can_add_input(&self, input: &DeviceInput) -> bool;

    fn add_input(&mut self, input: &DeviceInput) -> Result<(), CaptureError>;

    fn remove_input(&mut self, input: &DeviceInput);

    fn start_running(&mut self);

    fn stop_running(&mut self);

    fn is_running(&self) -> bool;
}

//! Motion executor
//!
//! Owns the arm state and is the only thing that writes to the servos.
//! Everything is driven from `tick`, which the control loop calls once
//! per sample interval; no call here ever waits for motion to finish.

use armlet_hal::{ByteStore, StoreError};

use super::active::ActiveMove;
use super::session::{Capture, Playback};
use crate::calibration::{CalibrationError, CalibrationRecord, CalibrationStore, RecordingEntry};
use crate::config::MotionConfig;
use crate::motion::kinematics::{inverse_kinematics, pose_of};
use crate::motion::{plan_move, CartesianPose, Joint, JointAngles, MotionRequest, MoveStatus};
use crate::state::{Mode, ModeError, ModeEvent};
use crate::traits::{ArmHardware, HardwareError};

/// Pose the arm assumes at power-up
pub const HOME_POSE: CartesianPose = CartesianPose::new(0.0, 200.0, 100.0, 90.0);

/// Joint solution of `HOME_POSE`
const HOME_ANGLES: JointAngles = JointAngles::new(90.0, 60.88, 48.25, 90.0);

/// Joint angles of the home pose
pub fn home_angles() -> JointAngles {
    inverse_kinematics(&HOME_POSE).unwrap_or(HOME_ANGLES)
}

/// Snapshot of the arm
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ArmState {
    /// Last committed joint angles
    pub angles: JointAngles,
    /// Forward kinematics of `angles`
    pub pose: CartesianPose,
    /// Active mode
    pub mode: Mode,
    /// Entries captured so far, or the next entry to replay
    pub cursor: u32,
}

impl ArmState {
    pub fn at(angles: JointAngles) -> Self {
        Self {
            angles,
            pose: pose_of(&angles),
            mode: Mode::Normal,
            cursor: 0,
        }
    }

    fn commit(&mut self, angles: JointAngles) {
        self.angles = angles;
        self.pose = pose_of(&angles);
    }
}

/// Something the control loop may want to report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArmEvent {
    /// The trajectory in flight wrote its last sample
    MoveComplete,
    /// The executor changed mode on its own
    ModeChanged(Mode),
    /// A servo write or feedback read failed
    HardwareFault(HardwareError),
    /// The log could not be read or written
    StoreFault(StoreError),
}

/// Why a direct servo write was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoError {
    /// Learning or playback owns the servos
    Busy(Mode),
    Hardware(HardwareError),
}

impl From<HardwareError> for ServoError {
    fn from(e: HardwareError) -> Self {
        ServoError::Hardware(e)
    }
}

/// The arm: hardware, persisted data and the state tying them together
pub struct Arm<B, H> {
    hw: H,
    store: CalibrationStore<B>,
    config: MotionConfig,
    state: ArmState,
    active: Option<ActiveMove>,
    capture: Capture,
    playback: Option<Playback>,
    link_up: bool,
}

impl<B: ByteStore, H: ArmHardware> Arm<B, H> {
    /// Arm resting at the home pose in normal mode
    pub fn new(hw: H, store: CalibrationStore<B>, config: MotionConfig) -> Self {
        Self {
            hw,
            store,
            config,
            state: ArmState::at(home_angles()),
            active: None,
            capture: Capture::default(),
            playback: None,
            link_up: false,
        }
    }

    /// Load calibration for every feedback joint, falling back to defaults
    pub fn load_calibration(&mut self) -> [(Joint, Result<(), CalibrationError>); 3] {
        self.store.load_all()
    }

    /// Adopt the angles the servos report as the committed state
    pub fn sync_from_feedback(&mut self) -> Result<JointAngles, HardwareError> {
        let angles = self.read_feedback_angles()?.clamped_to_domain();
        self.state.commit(angles);
        Ok(angles)
    }

    /// Plan a move and start it on the next tick
    ///
    /// A trajectory already in flight is replaced, starting from the last
    /// sample it wrote. If planning fails nothing changes, including the
    /// trajectory in flight. Only the normal modes take moves.
    pub fn move_to(&mut self, request: &MotionRequest, now_ms: u64) -> MoveStatus {
        if !self.state.mode.is_normal() {
            return MoveStatus::OutOfRange;
        }

        let start = self
            .active
            .as_ref()
            .and_then(ActiveMove::last_written)
            .unwrap_or(self.state.angles);

        match plan_move(&start, request, &self.config) {
            Ok(plan) => {
                self.supersede();
                self.active = Some(ActiveMove::new(plan.trajectory, now_ms));
                plan.status
            }
            Err(e) => e.into(),
        }
    }

    /// Advance modes and motion by one control tick
    pub fn tick(&mut self, now_ms: u64) -> Option<ArmEvent> {
        let mode_event = match self.state.mode {
            Mode::Learning => self.step_learning(now_ms),
            Mode::LearningStop => self.finish_learning(),
            Mode::SinglePlay | Mode::LoopPlay => self.step_playback(now_ms),
            Mode::Normal | Mode::NormalConnected => None,
        };
        let motion_event = self.step_motion(now_ms);
        mode_event.or(motion_event)
    }

    /// Apply a mode event from the dispatcher
    ///
    /// Entering Learning detaches the servos before the old log is
    /// replaced, so a refused detach leaves both untouched. Leaving it
    /// persists the log and reattaches; a servo that will not reattach is
    /// reported as `ModeError::Hardware` even though the log is saved.
    pub fn set_mode(&mut self, event: ModeEvent, now_ms: u64) -> Result<Mode, ModeError> {
        if event.is_internal() {
            return Err(ModeError::InvalidTransition {
                from: self.state.mode,
                event,
            });
        }

        match event {
            ModeEvent::LinkUp | ModeEvent::LinkDown => {
                self.link_up = event == ModeEvent::LinkUp;
                if self.state.mode.is_normal() {
                    self.state.mode = self.state.mode.transition(event)?;
                }
                return Ok(self.state.mode);
            }
            ModeEvent::PlayOnce | ModeEvent::PlayLoop if self.state.mode.is_normal() => {
                if !self.store.has_recording()? {
                    return Err(ModeError::EmptyRecording);
                }
            }
            _ => {}
        }

        let next = self.state.mode.transition(event)?;
        match next {
            Mode::Learning => {
                if let Err(e) = self.hw.set_attached(false) {
                    let _ = self.hw.set_attached(true);
                    return Err(e.into());
                }
                if let Err(e) = self.store.begin_recording() {
                    let _ = self.hw.set_attached(true);
                    return Err(e.into());
                }
                self.supersede();
                self.capture = Capture::default();
                self.state.cursor = 0;
                self.state.mode = Mode::Learning;
            }
            Mode::LearningStop => {
                self.state.mode = Mode::LearningStop;
                // A failed flush keeps the mode and the next tick retries
                if let Some(ArmEvent::HardwareFault(e)) = self.finish_learning() {
                    return Err(e.into());
                }
            }
            Mode::SinglePlay | Mode::LoopPlay => {
                self.supersede();
                self.playback = Some(Playback::new(now_ms));
                self.state.cursor = 0;
                self.state.mode = next;
            }
            Mode::Normal | Mode::NormalConnected => self.stop(),
        }
        Ok(self.state.mode)
    }

    /// Forward kinematics of the committed angles
    pub fn current_pose(&self) -> CartesianPose {
        pose_of(&self.state.angles)
    }

    /// Current servo position from feedback
    ///
    /// With `raw` set the ADC count is returned as is.
    pub fn read_servo_angle(&mut self, joint: Joint, raw: bool) -> Result<f32, HardwareError> {
        let count = self.hw.read_feedback(joint)?;
        if raw {
            Ok(f32::from(count))
        } else {
            Ok(self.store.record(joint).angle(count))
        }
    }

    /// Drive a single servo directly, clamped to what the other joints allow
    ///
    /// Replaces any trajectory in flight. Returns the angle written.
    pub fn write_servo_angle(&mut self, joint: Joint, angle: f32) -> Result<f32, ServoError> {
        if !self.state.mode.is_normal() {
            return Err(ServoError::Busy(self.state.mode));
        }
        self.supersede();

        let mut angles = self.state.angles;
        let (min, max) = angles.limits(joint);
        let angle = if angle.is_nan() {
            angles.get(joint)
        } else {
            angle.clamp(min, max)
        };
        self.hw.write_servo(joint, angle)?;

        angles.set(joint, angle);
        self.state.commit(angles);
        Ok(angle)
    }

    pub fn attach_servo(&mut self, joint: Joint) -> Result<(), HardwareError> {
        self.hw.set_servo_attached(joint, true)
    }

    /// Let a servo go limp
    pub fn detach_servo(&mut self, joint: Joint) -> Result<(), HardwareError> {
        self.hw.set_servo_attached(joint, false)
    }

    pub fn attach_all(&mut self) -> Result<(), HardwareError> {
        self.hw.set_attached(true)
    }

    pub fn detach_all(&mut self) -> Result<(), HardwareError> {
        self.hw.set_attached(false)
    }

    pub fn gripper_catch(&mut self, catch: bool) {
        self.hw.set_gripper(catch);
    }

    pub fn pump_catch(&mut self, on: bool) {
        self.hw.set_pump(on);
    }

    /// Persist a new feedback calibration for `joint`
    pub fn store_calibration(
        &mut self,
        joint: Joint,
        record: CalibrationRecord,
    ) -> Result<(), CalibrationError> {
        self.store.store_calibration(joint, record)
    }

    pub fn state(&self) -> &ArmState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Check if a trajectory is in flight
    pub fn is_moving(&self) -> bool {
        self.active.is_some()
    }

    pub fn link_up(&self) -> bool {
        self.link_up
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn store(&self) -> &CalibrationStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CalibrationStore<B> {
        &mut self.store
    }

    pub fn hardware(&self) -> &H {
        &self.hw
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }

    fn read_feedback_angles(&mut self) -> Result<JointAngles, HardwareError> {
        let mut angles = JointAngles::default();
        for joint in Joint::ALL {
            let raw = self.hw.read_feedback(joint)?;
            angles.set(joint, self.store.record(joint).angle(raw));
        }
        Ok(angles)
    }

    /// Drop the trajectory in flight, keeping what it already wrote
    fn supersede(&mut self) {
        if let Some(last) = self.active.take().and_then(|active| active.last_written()) {
            self.state.commit(last);
        }
    }

    /// Enter `mode`, upgrading Normal when the link is up
    fn enter(&mut self, mode: Mode) {
        self.state.mode = match mode {
            Mode::Normal if self.link_up => Mode::NormalConnected,
            other => other,
        };
    }

    fn stop(&mut self) {
        self.supersede();
        if self.state.mode.is_learning() {
            // Best effort; the arm has to come back either way
            let _ = self.store.abandon_recording();
            let _ = self.hw.set_attached(true);
        }
        self.playback = None;
        self.enter(Mode::Normal);
    }

    fn step_motion(&mut self, now_ms: u64) -> Option<ArmEvent> {
        let active = self.active.as_mut()?;
        let sample = active.step(now_ms);
        let finished = active.is_finished();

        let fault = match sample {
            Some(angles) => self.hw.write_angles(&angles).err(),
            None => None,
        };

        if finished {
            self.supersede();
            return fault
                .map(ArmEvent::HardwareFault)
                .or(Some(ArmEvent::MoveComplete));
        }
        fault.map(ArmEvent::HardwareFault)
    }

    fn step_learning(&mut self, now_ms: u64) -> Option<ArmEvent> {
        let elapsed = self.capture.due(now_ms, self.config.capture_interval_ms)?;
        self.capture.mark(now_ms);

        let angles = match self.read_feedback_angles() {
            Ok(angles) => angles.clamped_to_domain(),
            Err(e) => return Some(ArmEvent::HardwareFault(e)),
        };
        self.state.commit(angles);

        let result = self
            .store
            .append_recording_sample(&RecordingEntry::new(angles, elapsed));
        self.state.cursor = self.store.recorded_entries();
        result.err().map(ArmEvent::StoreFault)
    }

    fn finish_learning(&mut self) -> Option<ArmEvent> {
        if let Err(e) = self.store.finish_recording() {
            return Some(ArmEvent::StoreFault(e));
        }
        let fault = self.hw.set_attached(true).err();

        if let Ok(next) = self.state.mode.transition(ModeEvent::RecordingFlushed) {
            self.enter(next);
        }
        fault
            .map(ArmEvent::HardwareFault)
            .or(Some(ArmEvent::ModeChanged(self.state.mode)))
    }

    fn step_playback(&mut self, now_ms: u64) -> Option<ArmEvent> {
        let mut playback = self.playback?;

        if playback.pending.is_none() {
            match self.store.read_recording_sample(playback.cursor) {
                Ok(Some(entry)) => playback.pending = Some(entry),
                Ok(None) => return self.end_of_log(playback),
                Err(e) => {
                    self.stop();
                    return Some(ArmEvent::StoreFault(e));
                }
            }
        }

        let mut fault = None;
        if playback.is_due(now_ms) {
            if let Some(entry) = playback.pending.take() {
                let angles = entry.angles.clamped_to_domain();
                fault = self.hw.write_angles(&angles).err();
                self.state.commit(angles);
                playback.cursor += 1;
                playback.last_write_ms = now_ms;
            }
        }

        self.state.cursor = playback.cursor;
        self.playback = Some(playback);
        fault.map(ArmEvent::HardwareFault)
    }

    fn end_of_log(&mut self, mut playback: Playback) -> Option<ArmEvent> {
        match self.state.mode.transition(ModeEvent::PlaybackEnd) {
            Ok(Mode::LoopPlay) => {
                playback.rewind();
                self.playback = Some(playback);
                self.state.cursor = 0;
                None
            }
            Ok(next) => {
                self.playback = None;
                self.enter(next);
                Some(ArmEvent::ModeChanged(self.state.mode))
            }
            Err(_) => {
                self.playback = None;
                None
            }
        }
    }
}

//! Conference session: local media controls, the participant roster and the
//! video grid derived from both.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::invite::{classroom_id_from_link, Invitation};
use super::media::{CaptureHandle, DeviceKind, MediaConstraints, MediaError, TrackKind};
use super::roster::{Participant, ParticipantView};
use super::{ScreenStep, ToggleState, ToggleStep};
use crate::chat::ChatPanel;
use crate::errors::AppError;

const PLACEHOLDER_STUDENTS: [&str; 2] = ["Student 1", "Student 2"];

/// Order of tiles in the video grid.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TileKey {
    Placeholder(usize),
    LocalCamera,
    ScreenShare,
    Participant(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TileRole {
    Teacher,
    Student,
    Participant,
    ScreenShare,
}

/// One box in the video grid.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoTile {
    pub id: String,
    pub label: String,
    pub role: TileRole,
    /// Capture handle the tile plays, if any
    pub source: Option<String>,
    pub dimmed: bool,
    /// Participant tiles carry their own mic/camera/share/leave buttons
    pub has_controls: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConferenceView {
    pub classroom_id: String,
    pub mic: ToggleState,
    pub camera: ToggleState,
    pub screen_sharing: bool,
    pub tiles: Vec<VideoTile>,
    pub participants: Vec<ParticipantView>,
}

/// Result of the join dialog.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum JoinOutcome {
    Joined { participant: ParticipantView },
    /// The link points at another classroom; the page should navigate there
    Redirect { url: String },
}

pub struct ConferenceSession {
    classroom_id: String,
    mic: ToggleState,
    camera: ToggleState,
    local: Option<CaptureHandle>,
    screen: Option<CaptureHandle>,
    screen_pending: bool,
    participants: BTreeMap<String, Participant>,
    grid: Vec<TileKey>,
    last_participant_stamp: i64,
}

fn device_of(kind: TrackKind) -> DeviceKind {
    match kind {
        TrackKind::Audio => DeviceKind::Microphone,
        TrackKind::Video => DeviceKind::Camera,
    }
}

impl ConferenceSession {
    /// Open the classroom with its placeholder students and welcome
    /// messages.
    pub fn open(classroom_id: String, chat: &mut ChatPanel, now: DateTime<Utc>) -> Self {
        chat.system_message("Welcome to the Virtual Classroom!", now);
        chat.system_message("Class will begin shortly.", now);

        tracing::info!("Opened classroom {}", classroom_id);
        Self {
            classroom_id,
            mic: ToggleState::Off,
            camera: ToggleState::Off,
            local: None,
            screen: None,
            screen_pending: false,
            participants: BTreeMap::new(),
            grid: (0..PLACEHOLDER_STUDENTS.len())
                .map(TileKey::Placeholder)
                .collect(),
            last_participant_stamp: 0,
        }
    }

    pub fn invitation(&self, base_url: &str) -> Invitation {
        Invitation::new(base_url, &self.classroom_id)
    }

    fn state(&self, kind: TrackKind) -> ToggleState {
        match kind {
            TrackKind::Audio => self.mic,
            TrackKind::Video => self.camera,
        }
    }

    fn set_state(&mut self, kind: TrackKind, state: ToggleState) {
        match kind {
            TrackKind::Audio => self.mic = state,
            TrackKind::Video => self.camera = state,
        }
    }

    fn show(&mut self, key: TileKey) {
        if !self.grid.contains(&key) {
            self.grid.push(key);
        }
    }

    fn hide(&mut self, key: &TileKey) {
        self.grid.retain(|k| k != key);
    }

    // ==================== LOCAL MEDIA ====================

    /// Start toggling the local microphone (`Audio`) or camera (`Video`).
    ///
    /// Turning a device off completes immediately. Turning it on moves the
    /// control to `Requesting` and asks the caller to acquire a capture; the
    /// outcome goes to [`complete_local_toggle`].
    ///
    /// [`complete_local_toggle`]: ConferenceSession::complete_local_toggle
    pub fn begin_local_toggle(&mut self, kind: TrackKind) -> ToggleStep {
        match self.state(kind) {
            ToggleState::Requesting => ToggleStep::Pending,
            ToggleState::On => {
                self.release_local(kind);
                ToggleStep::Done(ToggleState::Off)
            }
            ToggleState::Off => {
                self.set_state(kind, ToggleState::Requesting);
                let constraints = match kind {
                    TrackKind::Audio => MediaConstraints {
                        audio: true,
                        video: false,
                    },
                    TrackKind::Video => MediaConstraints {
                        audio: self.mic == ToggleState::On,
                        video: true,
                    },
                };
                ToggleStep::Acquire(constraints)
            }
        }
    }

    fn release_local(&mut self, kind: TrackKind) {
        if let Some(handle) = self.local.as_mut() {
            handle.stop_kind(kind);
        }
        if self.local.as_ref().is_some_and(|h| !h.is_live()) {
            self.local = None;
        }
        self.set_state(kind, ToggleState::Off);
        if kind == TrackKind::Video {
            self.hide(&TileKey::LocalCamera);
        }
    }

    /// Apply a capture outcome. A failure reverts the control to `Off`; a
    /// grant that arrives after the control moved on (for example after
    /// leaving the call) is stopped and discarded.
    pub fn complete_local_toggle(
        &mut self,
        kind: TrackKind,
        result: Result<CaptureHandle, MediaError>,
    ) -> Result<ToggleState, MediaError> {
        if self.state(kind) != ToggleState::Requesting {
            if let Ok(mut stale) = result {
                stale.stop_all();
            }
            return Ok(self.state(kind));
        }

        let granted = match result {
            Ok(handle) => handle,
            Err(e) => {
                self.set_state(kind, ToggleState::Off);
                return Err(e.for_device(device_of(kind)));
            }
        };

        match kind {
            TrackKind::Audio => match self.local.as_mut() {
                Some(local) => local.adopt(granted, TrackKind::Audio),
                None => self.local = Some(granted),
            },
            TrackKind::Video => {
                let mut fresh = granted;
                if let Some(mut old) = self.local.take() {
                    old.stop_kind(TrackKind::Video);
                    if fresh.has_live(TrackKind::Audio) {
                        old.stop_all();
                    } else {
                        fresh.adopt(old, TrackKind::Audio);
                    }
                }
                if self.mic != ToggleState::On {
                    fresh.stop_kind(TrackKind::Audio);
                }
                self.local = Some(fresh);
                self.show(TileKey::LocalCamera);
            }
        }

        self.set_state(kind, ToggleState::On);
        tracing::info!("Local {} on", device_of(kind));
        Ok(ToggleState::On)
    }

    /// Start or stop sharing the screen.
    pub fn begin_screen_share(&mut self) -> ScreenStep {
        if self.screen_pending {
            return ScreenStep::Pending;
        }
        if self.screen.is_some() {
            self.stop_screen_share();
            return ScreenStep::Stopped;
        }
        self.screen_pending = true;
        ScreenStep::Acquire
    }

    pub fn complete_screen_share(
        &mut self,
        result: Result<CaptureHandle, MediaError>,
    ) -> Result<bool, MediaError> {
        if !self.screen_pending {
            if let Ok(mut stale) = result {
                stale.stop_all();
            }
            return Ok(self.screen.is_some());
        }
        self.screen_pending = false;

        let handle = result.map_err(|e| e.for_device(DeviceKind::Screen))?;
        self.screen = Some(handle);
        self.show(TileKey::ScreenShare);
        Ok(true)
    }

    /// The user stopped the capture from the platform's own controls.
    pub fn screen_share_ended(&mut self) -> bool {
        let was_active = self.screen.is_some();
        self.stop_screen_share();
        was_active
    }

    fn stop_screen_share(&mut self) {
        if let Some(mut screen) = self.screen.take() {
            screen.stop_all();
        }
        self.hide(&TileKey::ScreenShare);
    }

    /// Leave the call: stop every local capture and empty the grid.
    pub fn leave_call(&mut self, chat: &mut ChatPanel, now: DateTime<Utc>) {
        if let Some(mut handle) = self.local.take() {
            handle.stop_all();
        }
        self.mic = ToggleState::Off;
        self.camera = ToggleState::Off;
        self.stop_screen_share();
        self.screen_pending = false;
        self.grid.clear();

        chat.system_message("You have left the classroom", now);
        tracing::info!("Left classroom {}", self.classroom_id);
    }

    // ==================== ROSTER ====================

    fn next_participant_id(&mut self, now: DateTime<Utc>) -> String {
        let stamp = now.timestamp_millis().max(self.last_participant_stamp + 1);
        self.last_participant_stamp = stamp;
        format!("participant-{}", stamp)
    }

    /// Add a participant, their tile, and a join announcement.
    pub fn join(
        &mut self,
        name: &str,
        chat: &mut ChatPanel,
        now: DateTime<Utc>,
    ) -> Result<ParticipantView, AppError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Please enter your name".to_string()));
        }

        let id = self.next_participant_id(now);
        let participant = Participant::new(id.clone(), name.to_string());
        let view = participant.view();
        self.participants.insert(id.clone(), participant);
        self.show(TileKey::Participant(id.clone()));

        chat.system_message(format!("{} has joined the classroom", name), now);
        tracing::info!("Participant {} ({}) joined", id, name);
        Ok(view)
    }

    /// Handle the join dialog: join here when the link names this classroom,
    /// otherwise redirect to it.
    pub fn join_classroom(
        &mut self,
        link: &str,
        name: &str,
        chat: &mut ChatPanel,
        now: DateTime<Utc>,
    ) -> Result<JoinOutcome, AppError> {
        let link = link.trim();
        if link.is_empty() || name.trim().is_empty() {
            return Err(AppError::Validation(
                "Please enter both the invite link and your name".to_string(),
            ));
        }

        if classroom_id_from_link(link) == self.classroom_id {
            let participant = self.join(name, chat, now)?;
            Ok(JoinOutcome::Joined { participant })
        } else {
            Ok(JoinOutcome::Redirect {
                url: link.to_string(),
            })
        }
    }

    /// Remove a participant, stopping their captures.
    pub fn leave(&mut self, id: &str, chat: &mut ChatPanel, now: DateTime<Utc>) -> Result<(), AppError> {
        let mut participant = self
            .participants
            .remove(id)
            .ok_or_else(|| AppError::NotFound(format!("Participant {} not found", id)))?;

        participant.release();
        self.hide(&TileKey::Participant(id.to_string()));

        chat.system_message(format!("{} has left the classroom", participant.name), now);
        tracing::info!("Participant {} ({}) left", id, participant.name);
        Ok(())
    }

    fn participant_mut(&mut self, id: &str) -> Result<&mut Participant, AppError> {
        self.participants
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Participant {} not found", id)))
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    pub fn begin_participant_toggle(&mut self, id: &str, kind: TrackKind) -> Result<ToggleStep, AppError> {
        Ok(self.participant_mut(id)?.begin_toggle(kind))
    }

    /// A grant for a participant who left meanwhile is stopped and dropped.
    pub fn complete_participant_toggle(
        &mut self,
        id: &str,
        kind: TrackKind,
        result: Result<CaptureHandle, MediaError>,
    ) -> Result<ToggleState, AppError> {
        match self.participants.get_mut(id) {
            Some(participant) => Ok(participant.complete_toggle(kind, result)?),
            None => {
                if let Ok(mut stale) = result {
                    stale.stop_all();
                }
                Err(AppError::NotFound(format!("Participant {} not found", id)))
            }
        }
    }

    pub fn begin_participant_screen_share(&mut self, id: &str) -> Result<ScreenStep, AppError> {
        Ok(self.participant_mut(id)?.begin_screen_share())
    }

    pub fn complete_participant_screen_share(
        &mut self,
        id: &str,
        result: Result<CaptureHandle, MediaError>,
    ) -> Result<bool, AppError> {
        match self.participants.get_mut(id) {
            Some(participant) => Ok(participant.complete_screen_share(result)?),
            None => {
                if let Ok(mut stale) = result {
                    stale.stop_all();
                }
                Err(AppError::NotFound(format!("Participant {} not found", id)))
            }
        }
    }

    pub fn participant_screen_share_ended(&mut self, id: &str) -> Result<bool, AppError> {
        Ok(self.participant_mut(id)?.screen_share_ended())
    }

    // ==================== PROJECTION ====================

    fn tile(&self, key: &TileKey) -> Option<VideoTile> {
        let tile = match key {
            TileKey::Placeholder(n) => VideoTile {
                id: format!("student{}Video", n + 1),
                label: PLACEHOLDER_STUDENTS.get(*n)?.to_string(),
                role: TileRole::Student,
                source: None,
                dimmed: false,
                has_controls: false,
            },
            TileKey::LocalCamera => VideoTile {
                id: "teacherVideo".to_string(),
                label: "Teacher".to_string(),
                role: TileRole::Teacher,
                source: self.local.as_ref().map(|h| h.id.clone()),
                dimmed: false,
                has_controls: false,
            },
            TileKey::ScreenShare => VideoTile {
                id: "screenShareBox".to_string(),
                label: "Screen Share".to_string(),
                role: TileRole::ScreenShare,
                source: self.screen.as_ref().map(|h| h.id.clone()),
                dimmed: false,
                has_controls: false,
            },
            TileKey::Participant(id) => {
                let participant = self.participants.get(id)?;
                VideoTile {
                    id: id.clone(),
                    label: participant.name.clone(),
                    role: TileRole::Participant,
                    source: participant.tile_source(),
                    dimmed: !participant.camera_on(),
                    has_controls: true,
                }
            }
        };
        Some(tile)
    }

    pub fn view(&self) -> ConferenceView {
        ConferenceView {
            classroom_id: self.classroom_id.clone(),
            mic: self.mic,
            camera: self.camera,
            screen_sharing: self.screen.is_some(),
            tiles: self.grid.iter().filter_map(|k| self.tile(k)).collect(),
            participants: self.participants.values().map(Participant::view).collect(),
        }
    }
}

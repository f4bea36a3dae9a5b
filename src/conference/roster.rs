//! Simulated participants and their media controls.

use serde::Serialize;

use super::media::{CaptureHandle, DeviceKind, MediaConstraints, MediaError, TrackKind};
use super::{ScreenStep, ToggleState, ToggleStep};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
    Joined,
    Speaking,
    Muted,
}

impl ParticipantStatus {
    pub fn text(&self) -> &'static str {
        match self {
            ParticipantStatus::Joined => "Joined",
            ParticipantStatus::Speaking => "Speaking",
            ParticipantStatus::Muted => "Muted",
        }
    }
}

/// A roster entry. The session's roster map is the authority; tiles and
/// roster rows are derived from it.
#[derive(Debug)]
pub struct Participant {
    pub id: String,
    pub name: String,
    mic: ToggleState,
    camera: ToggleState,
    status: ParticipantStatus,
    /// Shared audio+video capture, acquired on the first toggle
    handle: Option<CaptureHandle>,
    screen: Option<CaptureHandle>,
    screen_pending: bool,
}

/// Roster row as rendered.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantView {
    pub id: String,
    pub name: String,
    /// Avatar letter
    pub initial: String,
    pub mic: ToggleState,
    pub camera: ToggleState,
    pub mic_enabled: bool,
    pub cam_enabled: bool,
    pub status: ParticipantStatus,
    pub status_text: &'static str,
    pub sharing_screen: bool,
}

fn device_of(kind: TrackKind) -> DeviceKind {
    match kind {
        TrackKind::Audio => DeviceKind::Microphone,
        TrackKind::Video => DeviceKind::Camera,
    }
}

impl Participant {
    pub fn new(id: String, name: String) -> Self {
        Self {
            id,
            name,
            mic: ToggleState::Off,
            camera: ToggleState::Off,
            status: ParticipantStatus::Joined,
            handle: None,
            screen: None,
            screen_pending: false,
        }
    }

    fn state(&self, kind: TrackKind) -> ToggleState {
        match kind {
            TrackKind::Audio => self.mic,
            TrackKind::Video => self.camera,
        }
    }

    fn set_state(&mut self, kind: TrackKind, state: ToggleState) {
        match kind {
            TrackKind::Audio => {
                self.mic = state;
                match state {
                    ToggleState::On => self.status = ParticipantStatus::Speaking,
                    ToggleState::Off if self.status == ParticipantStatus::Speaking => {
                        self.status = ParticipantStatus::Muted
                    }
                    _ => {}
                }
            }
            TrackKind::Video => self.camera = state,
        }
    }

    /// Start toggling the mic or camera.
    ///
    /// Tracks already present on the shared handle are flipped in place.
    /// Otherwise a fresh handle is requested carrying every track the
    /// participant wants once this toggle lands.
    pub fn begin_toggle(&mut self, kind: TrackKind) -> ToggleStep {
        match self.state(kind) {
            ToggleState::Requesting => ToggleStep::Pending,
            ToggleState::On => {
                if let Some(track) = self.handle.as_mut().and_then(|h| h.live_track_mut(kind)) {
                    track.enabled = false;
                }
                self.set_state(kind, ToggleState::Off);
                ToggleStep::Done(ToggleState::Off)
            }
            ToggleState::Off => {
                if let Some(track) = self.handle.as_mut().and_then(|h| h.live_track_mut(kind)) {
                    track.enabled = true;
                    self.set_state(kind, ToggleState::On);
                    return ToggleStep::Done(ToggleState::On);
                }

                let constraints = MediaConstraints {
                    audio: kind == TrackKind::Audio || self.mic == ToggleState::On,
                    video: kind == TrackKind::Video || self.camera == ToggleState::On,
                };
                self.set_state(kind, ToggleState::Requesting);
                ToggleStep::Acquire(constraints)
            }
        }
    }

    /// Apply the outcome of a capture request started by [`begin_toggle`].
    ///
    /// [`begin_toggle`]: Participant::begin_toggle
    pub fn complete_toggle(
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

        let mut handle = match result {
            Ok(handle) => handle,
            Err(e) => {
                self.set_state(kind, ToggleState::Off);
                return Err(e.for_device(device_of(kind)));
            }
        };

        if let Some(mut old) = self.handle.take() {
            old.stop_all();
        }

        self.set_state(kind, ToggleState::On);
        for track in &mut handle.tracks {
            track.enabled = self.state(track.kind) == ToggleState::On;
        }
        self.handle = Some(handle);
        Ok(ToggleState::On)
    }

    pub fn begin_screen_share(&mut self) -> ScreenStep {
        if self.screen_pending {
            return ScreenStep::Pending;
        }
        self.screen_pending = true;
        ScreenStep::Acquire
    }

    /// A new screen capture replaces any previous one.
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
        if let Some(mut old) = self.screen.replace(handle) {
            old.stop_all();
        }
        Ok(true)
    }

    /// The capture was stopped from the platform's own UI; the tile falls
    /// back to the camera.
    pub fn screen_share_ended(&mut self) -> bool {
        match self.screen.take() {
            Some(mut screen) => {
                screen.stop_all();
                true
            }
            None => false,
        }
    }

    /// Stop every capture this participant owns.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.stop_all();
        }
        if let Some(mut screen) = self.screen.take() {
            screen.stop_all();
        }
        self.screen_pending = false;
        self.mic = ToggleState::Off;
        self.camera = ToggleState::Off;
    }

    /// Handle id the participant's tile should show.
    pub fn tile_source(&self) -> Option<String> {
        self.screen
            .as_ref()
            .or_else(|| {
                self.handle
                    .as_ref()
                    .filter(|_| self.camera == ToggleState::On)
            })
            .map(|h| h.id.clone())
    }

    pub fn camera_on(&self) -> bool {
        self.camera == ToggleState::On
    }

    #[cfg(test)]
    pub fn handle(&self) -> Option<&CaptureHandle> {
        self.handle.as_ref()
    }

    pub fn view(&self) -> ParticipantView {
        ParticipantView {
            id: self.id.clone(),
            name: self.name.clone(),
            initial: self
                .name
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default(),
            mic: self.mic,
            camera: self.camera,
            mic_enabled: self.mic == ToggleState::On,
            cam_enabled: self.camera == ToggleState::On,
            status: self.status,
            status_text: self.status.text(),
            sharing_screen: self.screen.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conference::media::CaptureSource;

    fn grant(constraints: MediaConstraints) -> Result<CaptureHandle, MediaError> {
        Ok(CaptureHandle::new(CaptureSource::Camera, &constraints.kinds()))
    }

    #[test]
    fn test_first_toggle_acquires_combined_handle() {
        let mut p = Participant::new("participant-1".into(), "ada".into());

        let ToggleStep::Acquire(constraints) = p.begin_toggle(TrackKind::Audio) else {
            panic!("expected a capture request");
        };
        assert_eq!(
            constraints,
            MediaConstraints {
                audio: true,
                video: false
            }
        );
        assert_eq!(p.view().mic, ToggleState::Requesting);
        assert!(matches!(p.begin_toggle(TrackKind::Audio), ToggleStep::Pending));

        assert_eq!(
            p.complete_toggle(TrackKind::Audio, grant(constraints)),
            Ok(ToggleState::On)
        );
        let view = p.view();
        assert!(view.mic_enabled);
        assert_eq!(view.status_text, "Speaking");
        assert_eq!(view.initial, "A");

        // Camera needs a new handle carrying both tracks
        let ToggleStep::Acquire(constraints) = p.begin_toggle(TrackKind::Video) else {
            panic!("expected a capture request");
        };
        assert!(constraints.audio && constraints.video);
        p.complete_toggle(TrackKind::Video, grant(constraints)).unwrap();

        let handle = p.handle().unwrap();
        assert!(handle.tracks.iter().all(|t| t.enabled && !t.stopped));
        assert!(p.tile_source().is_some());
    }

    #[test]
    fn test_toggle_off_and_on_reuses_handle() {
        let mut p = Participant::new("participant-1".into(), "Ada".into());
        let ToggleStep::Acquire(c) = p.begin_toggle(TrackKind::Audio) else {
            panic!("expected a capture request");
        };
        p.complete_toggle(TrackKind::Audio, grant(c)).unwrap();
        let handle_id = p.handle().unwrap().id.clone();

        assert!(matches!(
            p.begin_toggle(TrackKind::Audio),
            ToggleStep::Done(ToggleState::Off)
        ));
        assert_eq!(p.view().status_text, "Muted");
        assert!(!p.handle().unwrap().tracks[0].enabled);

        assert!(matches!(
            p.begin_toggle(TrackKind::Audio),
            ToggleStep::Done(ToggleState::On)
        ));
        assert_eq!(p.handle().unwrap().id, handle_id);
    }

    #[test]
    fn test_denied_request_returns_to_off() {
        let mut p = Participant::new("participant-1".into(), "Ada".into());
        p.begin_toggle(TrackKind::Video);

        let err = p
            .complete_toggle(
                TrackKind::Video,
                Err(MediaError::PermissionDenied(DeviceKind::Microphone)),
            )
            .unwrap_err();
        assert_eq!(err, MediaError::PermissionDenied(DeviceKind::Camera));
        assert_eq!(p.view().camera, ToggleState::Off);
        assert_eq!(p.view().status_text, "Joined");
    }

    #[test]
    fn test_screen_share_falls_back_to_camera() {
        let mut p = Participant::new("participant-1".into(), "Ada".into());
        let ToggleStep::Acquire(c) = p.begin_toggle(TrackKind::Video) else {
            panic!("expected a capture request");
        };
        p.complete_toggle(TrackKind::Video, grant(c)).unwrap();
        let camera_id = p.handle().unwrap().id.clone();

        assert_eq!(p.begin_screen_share(), ScreenStep::Acquire);
        let screen = CaptureHandle::new(CaptureSource::Display, &[TrackKind::Video]);
        let screen_id = screen.id.clone();
        assert_eq!(p.complete_screen_share(Ok(screen)), Ok(true));
        assert_eq!(p.tile_source(), Some(screen_id));

        assert!(p.screen_share_ended());
        assert_eq!(p.tile_source(), Some(camera_id));
        assert!(!p.screen_share_ended());
    }
}

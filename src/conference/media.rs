//! Capture devices as seen by the conference session.
//!
//! The browser performs the real capture; the session only sees handles and
//! their tracks, and the grant/deny outcome of each request.

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
    pub enabled: bool,
    pub stopped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    Camera,
    Display,
}

/// A granted capture: a set of live tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureHandle {
    pub id: String,
    pub source: CaptureSource,
    pub tracks: Vec<MediaTrack>,
}

impl CaptureHandle {
    pub fn new(source: CaptureSource, kinds: &[TrackKind]) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            source,
            tracks: kinds
                .iter()
                .map(|&kind| MediaTrack {
                    id: uuid::Uuid::new_v4().to_string(),
                    kind,
                    enabled: true,
                    stopped: false,
                })
                .collect(),
        }
    }

    /// The first live track of `kind`.
    pub fn live_track_mut(&mut self, kind: TrackKind) -> Option<&mut MediaTrack> {
        self.tracks
            .iter_mut()
            .find(|t| t.kind == kind && !t.stopped)
    }

    pub fn has_live(&self, kind: TrackKind) -> bool {
        self.tracks.iter().any(|t| t.kind == kind && !t.stopped)
    }

    pub fn is_live(&self) -> bool {
        self.tracks.iter().any(|t| !t.stopped)
    }

    /// Stop every live track of `kind`.
    pub fn stop_kind(&mut self, kind: TrackKind) {
        for track in self.tracks.iter_mut().filter(|t| t.kind == kind) {
            track.stopped = true;
        }
    }

    pub fn stop_all(&mut self) {
        for track in &mut self.tracks {
            track.stopped = true;
        }
    }

    /// Move the live tracks of `kind` from `other` into this handle.
    pub fn adopt(&mut self, other: CaptureHandle, kind: TrackKind) {
        self.tracks.extend(
            other
                .tracks
                .into_iter()
                .filter(|t| t.kind == kind && !t.stopped),
        );
    }
}

/// Which tracks a capture request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MediaConstraints {
    pub audio: bool,
    pub video: bool,
}

impl MediaConstraints {
    pub fn kinds(&self) -> Vec<TrackKind> {
        let mut kinds = Vec::with_capacity(2);
        if self.audio {
            kinds.push(TrackKind::Audio);
        }
        if self.video {
            kinds.push(TrackKind::Video);
        }
        kinds
    }
}

/// The device a failure is reported against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Microphone,
    Camera,
    Screen,
}

impl DeviceKind {
    fn for_constraints(constraints: MediaConstraints) -> Self {
        if constraints.video {
            DeviceKind::Camera
        } else {
            DeviceKind::Microphone
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeviceKind::Microphone => "microphone",
            DeviceKind::Camera => "camera",
            DeviceKind::Screen => "screen",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaError {
    #[error("Could not access {0}: permission denied")]
    PermissionDenied(DeviceKind),

    #[error("Could not access {0}: no device available")]
    NotFound(DeviceKind),

    #[error("Could not access {0}: device is busy")]
    Busy(DeviceKind),

    #[error("Capture request asked for no tracks")]
    EmptyConstraints,
}

impl MediaError {
    pub fn device_kind(&self) -> Option<DeviceKind> {
        match self {
            MediaError::PermissionDenied(kind)
            | MediaError::NotFound(kind)
            | MediaError::Busy(kind) => Some(*kind),
            MediaError::EmptyConstraints => None,
        }
    }

    /// Re-target the failure at the device the user actually toggled.
    pub fn for_device(self, device: DeviceKind) -> Self {
        match self {
            MediaError::PermissionDenied(_) => MediaError::PermissionDenied(device),
            MediaError::NotFound(_) => MediaError::NotFound(device),
            MediaError::Busy(_) => MediaError::Busy(device),
            MediaError::EmptyConstraints => MediaError::EmptyConstraints,
        }
    }
}

/// User-media and display-capture requests.
#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> Result<CaptureHandle, MediaError>;

    async fn get_display_media(&self) -> Result<CaptureHandle, MediaError>;
}

/// How [`SimulatedDevices`] answers permission prompts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaPolicy {
    #[default]
    Grant,
    Deny,
}

impl FromStr for MediaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grant" => Ok(MediaPolicy::Grant),
            "deny" => Ok(MediaPolicy::Deny),
            other => Err(format!("unknown media policy: {}", other)),
        }
    }
}

/// Local stand-in for the browser's capture devices.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedDevices {
    policy: MediaPolicy,
}

impl SimulatedDevices {
    pub fn new(policy: MediaPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl MediaDevices for SimulatedDevices {
    async fn get_user_media(
        &self,
        constraints: MediaConstraints,
    ) -> Result<CaptureHandle, MediaError> {
        let kinds = constraints.kinds();
        if kinds.is_empty() {
            return Err(MediaError::EmptyConstraints);
        }
        match self.policy {
            MediaPolicy::Grant => Ok(CaptureHandle::new(CaptureSource::Camera, &kinds)),
            MediaPolicy::Deny => Err(MediaError::PermissionDenied(DeviceKind::for_constraints(
                constraints,
            ))),
        }
    }

    async fn get_display_media(&self) -> Result<CaptureHandle, MediaError> {
        match self.policy {
            MediaPolicy::Grant => Ok(CaptureHandle::new(
                CaptureSource::Display,
                &[TrackKind::Video],
            )),
            MediaPolicy::Deny => Err(MediaError::PermissionDenied(DeviceKind::Screen)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_simulated_grant_builds_requested_tracks() {
        let devices = SimulatedDevices::new(MediaPolicy::Grant);
        let handle = devices
            .get_user_media(MediaConstraints {
                audio: true,
                video: true,
            })
            .await
            .unwrap();

        assert!(handle.has_live(TrackKind::Audio));
        assert!(handle.has_live(TrackKind::Video));
        assert!(handle.tracks.iter().all(|t| t.enabled));
    }

    #[tokio::test]
    async fn test_simulated_deny() {
        let devices = SimulatedDevices::new(MediaPolicy::Deny);
        let err = devices
            .get_user_media(MediaConstraints {
                audio: true,
                video: false,
            })
            .await
            .unwrap_err();
        assert_eq!(err, MediaError::PermissionDenied(DeviceKind::Microphone));

        let err = devices.get_display_media().await.unwrap_err();
        assert_eq!(err.device_kind(), Some(DeviceKind::Screen));
    }

    #[test]
    fn test_stop_kind_leaves_other_tracks() {
        let mut handle = CaptureHandle::new(
            CaptureSource::Camera,
            &[TrackKind::Audio, TrackKind::Video],
        );
        handle.stop_kind(TrackKind::Audio);

        assert!(!handle.has_live(TrackKind::Audio));
        assert!(handle.has_live(TrackKind::Video));
        assert!(handle.is_live());
    }

    #[test]
    fn test_policy_parses() {
        assert_eq!("DENY".parse::<MediaPolicy>().unwrap(), MediaPolicy::Deny);
        assert!("maybe".parse::<MediaPolicy>().is_err());
    }
}

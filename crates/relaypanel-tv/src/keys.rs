//! Android key codes and the remote buttons built on them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TvError;

/// Android `KEYCODE_*` value passed to `input keyevent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyCode(pub u16);

impl KeyCode {
    pub const HOME: KeyCode = KeyCode(3);
    pub const BACK: KeyCode = KeyCode(4);
    pub const DPAD_UP: KeyCode = KeyCode(19);
    pub const DPAD_DOWN: KeyCode = KeyCode(20);
    pub const DPAD_LEFT: KeyCode = KeyCode(21);
    pub const DPAD_RIGHT: KeyCode = KeyCode(22);
    pub const DPAD_CENTER: KeyCode = KeyCode(23);
    pub const VOLUME_UP: KeyCode = KeyCode(24);
    pub const VOLUME_DOWN: KeyCode = KeyCode(25);
    pub const POWER: KeyCode = KeyCode(26);
    pub const MENU: KeyCode = KeyCode(82);
    pub const MEDIA_PLAY_PAUSE: KeyCode = KeyCode(85);
    pub const MEDIA_STOP: KeyCode = KeyCode(86);
    pub const MEDIA_NEXT: KeyCode = KeyCode(87);
    pub const MEDIA_PREVIOUS: KeyCode = KeyCode(88);
    /// Microphone mute, not the speaker.
    pub const MUTE: KeyCode = KeyCode(91);
    pub const VOLUME_MUTE: KeyCode = KeyCode(164);
    pub const SETTINGS: KeyCode = KeyCode(176);
    pub const TV_INPUT: KeyCode = KeyCode(178);
    /// Vendor favourite button.
    pub const FAVOURITE: KeyCode = KeyCode(1554);

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A remote control button exposed over HTTP as `/tv/{name}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TvCommand {
    VolumeUp,
    VolumeDown,
    Power,
    Home,
    Back,
    MicMute,
    MediaPlayPause,
    MediaNext,
    MediaPrev,
    MediaStop,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    DpadCenter,
    Menu,
    Settings,
    SpeakerMute,
    InputSource,
    Favourite,
}

impl TvCommand {
    /// Every button, in the order the HTTP routes list them.
    pub const ALL: [TvCommand; 20] = [
        Self::VolumeUp,
        Self::VolumeDown,
        Self::Power,
        Self::Home,
        Self::Back,
        Self::MicMute,
        Self::MediaPlayPause,
        Self::MediaNext,
        Self::MediaPrev,
        Self::MediaStop,
        Self::DpadUp,
        Self::DpadDown,
        Self::DpadLeft,
        Self::DpadRight,
        Self::DpadCenter,
        Self::Menu,
        Self::Settings,
        Self::SpeakerMute,
        Self::InputSource,
        Self::Favourite,
    ];

    /// Route segment for this button.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VolumeUp => "volume_up",
            Self::VolumeDown => "volume_down",
            Self::Power => "power",
            Self::Home => "home",
            Self::Back => "back",
            Self::MicMute => "mic_mute",
            Self::MediaPlayPause => "media_play_pause",
            Self::MediaNext => "media_next",
            Self::MediaPrev => "media_prev",
            Self::MediaStop => "media_stop",
            Self::DpadUp => "dpad_up",
            Self::DpadDown => "dpad_down",
            Self::DpadLeft => "dpad_left",
            Self::DpadRight => "dpad_right",
            Self::DpadCenter => "dpad_center",
            Self::Menu => "menu",
            Self::Settings => "settings",
            Self::SpeakerMute => "speaker_mute",
            Self::InputSource => "input_source",
            Self::Favourite => "favourite",
        }
    }

    pub fn key_code(&self) -> KeyCode {
        match self {
            Self::VolumeUp => KeyCode::VOLUME_UP,
            Self::VolumeDown => KeyCode::VOLUME_DOWN,
            Self::Power => KeyCode::POWER,
            Self::Home => KeyCode::HOME,
            Self::Back => KeyCode::BACK,
            Self::MicMute => KeyCode::MUTE,
            Self::MediaPlayPause => KeyCode::MEDIA_PLAY_PAUSE,
            Self::MediaNext => KeyCode::MEDIA_NEXT,
            Self::MediaPrev => KeyCode::MEDIA_PREVIOUS,
            Self::MediaStop => KeyCode::MEDIA_STOP,
            Self::DpadUp => KeyCode::DPAD_UP,
            Self::DpadDown => KeyCode::DPAD_DOWN,
            Self::DpadLeft => KeyCode::DPAD_LEFT,
            Self::DpadRight => KeyCode::DPAD_RIGHT,
            Self::DpadCenter => KeyCode::DPAD_CENTER,
            Self::Menu => KeyCode::MENU,
            Self::Settings => KeyCode::SETTINGS,
            Self::SpeakerMute => KeyCode::VOLUME_MUTE,
            Self::InputSource => KeyCode::TV_INPUT,
            Self::Favourite => KeyCode::FAVOURITE,
        }
    }
}

impl fmt::Display for TvCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TvCommand {
    type Err = TvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str() == s)
            .ok_or_else(|| TvError::unknown_command(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case("volume_up", 24)]
    #[case("volume_down", 25)]
    #[case("power", 26)]
    #[case("home", 3)]
    #[case("back", 4)]
    #[case("mic_mute", 91)]
    #[case("media_play_pause", 85)]
    #[case("media_next", 87)]
    #[case("media_prev", 88)]
    #[case("media_stop", 86)]
    #[case("dpad_up", 19)]
    #[case("dpad_down", 20)]
    #[case("dpad_left", 21)]
    #[case("dpad_right", 22)]
    #[case("dpad_center", 23)]
    #[case("menu", 82)]
    #[case("settings", 176)]
    #[case("speaker_mute", 164)]
    #[case("input_source", 178)]
    #[case("favourite", 1554)]
    fn test_command_key_codes(#[case] name: &str, #[case] code: u16) {
        let command: TvCommand = name.parse().unwrap();
        assert_eq!(command.key_code(), KeyCode(code));
        assert_eq!(command.to_string(), name);
    }

    #[rstest]
    #[case("")]
    #[case("VOLUME_UP")]
    #[case("volume-up")]
    #[case("power_off")]
    fn test_unknown_commands(#[case] name: &str) {
        let error = name.parse::<TvCommand>().unwrap_err();
        assert!(error.is_unknown_command());
    }

    #[test]
    fn test_all_commands_are_distinct() {
        let names: HashSet<_> = TvCommand::ALL.iter().map(|c| c.as_str()).collect();
        let codes: HashSet<_> = TvCommand::ALL.iter().map(|c| c.key_code()).collect();
        assert_eq!(names.len(), TvCommand::ALL.len());
        assert_eq!(codes.len(), TvCommand::ALL.len());
    }

    #[test]
    fn test_serde_uses_route_names() {
        let json = serde_json::to_string(&TvCommand::MediaPlayPause).unwrap();
        assert_eq!(json, "\"media_play_pause\"");
    }
}

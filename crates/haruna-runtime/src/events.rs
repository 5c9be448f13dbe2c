//! Typed player events decoded from raw engine events

use std::os::raw::c_int;

use haruna_mpv_core::decode_raw;
use haruna_mpv_core::string::ptr_to_string;
use haruna_mpv_sys::*;
use serde_json::Value;

/// Why playback of a file ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndFileReason {
    Eof,
    Stop,
    Quit,
    Error,
    Redirect,
    Unknown(c_int),
}

impl From<mpv_end_file_reason> for EndFileReason {
    fn from(reason: mpv_end_file_reason) -> Self {
        match reason {
            MPV_END_FILE_REASON_EOF => Self::Eof,
            MPV_END_FILE_REASON_STOP => Self::Stop,
            MPV_END_FILE_REASON_QUIT => Self::Quit,
            MPV_END_FILE_REASON_ERROR => Self::Error,
            MPV_END_FILE_REASON_REDIRECT => Self::Redirect,
            other => Self::Unknown(other),
        }
    }
}

/// Engine log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    /// Module that emitted the line, e.g. `cplayer` or `ffmpeg`
    pub prefix: String,
    /// Level name as spelled by libmpv
    pub level: String,
    /// Message text without the trailing newline
    pub text: String,
}

/// Event published to the owning thread
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Shutdown,
    LogMessage(LogMessage),
    StartFile {
        playlist_entry_id: i64,
    },
    FileLoaded,
    EndFile {
        reason: EndFileReason,
        /// Engine status when `reason` is [`EndFileReason::Error`]
        error: Option<c_int>,
        playlist_entry_id: i64,
    },
    Idle,
    VideoReconfig,
    AudioReconfig,
    Seek,
    PlaybackRestart,
    /// An observed property changed; unavailable properties carry `Null`
    PropertyChanged {
        id: u64,
        name: String,
        value: Value,
    },
    /// The observed `track-list` property changed
    TracksChanged {
        id: u64,
        tracks: Value,
    },
    /// Reply to an asynchronous command
    CommandReply {
        id: u64,
        result: Result<Value, c_int>,
    },
    /// The engine dropped events because the queue was full
    QueueOverflow,
    /// Any event without a dedicated variant
    Other(mpv_event_id),
}

impl PlayerEvent {
    /// Classify a raw engine event
    ///
    /// Returns `None` for `MPV_EVENT_NONE`, which marks an empty queue.
    ///
    /// # Safety
    /// `event` and its payload must be valid for the duration of the call,
    /// as returned by `mpv_wait_event`.
    pub unsafe fn from_raw(event: &mpv_event) -> Option<Self> {
        // SAFETY: each payload cast matches the documented data type of its event id
        let event = unsafe {
            match event.event_id {
                MPV_EVENT_NONE => return None,
                MPV_EVENT_SHUTDOWN => Self::Shutdown,
                MPV_EVENT_LOG_MESSAGE => match event.data.cast::<mpv_event_log_message>().as_ref() {
                    Some(msg) => Self::LogMessage(LogMessage {
                        prefix: ptr_to_string(msg.prefix),
                        level: ptr_to_string(msg.level),
                        text: ptr_to_string(msg.text).trim_end_matches('\n').to_string(),
                    }),
                    None => Self::Other(MPV_EVENT_LOG_MESSAGE),
                },
                MPV_EVENT_START_FILE => Self::StartFile {
                    playlist_entry_id: event
                        .data
                        .cast::<mpv_event_start_file>()
                        .as_ref()
                        .map_or(0, |data| data.playlist_entry_id),
                },
                MPV_EVENT_FILE_LOADED => Self::FileLoaded,
                MPV_EVENT_END_FILE => match event.data.cast::<mpv_event_end_file>().as_ref() {
                    Some(data) => {
                        let reason = EndFileReason::from(data.reason);
                        Self::EndFile {
                            reason,
                            error: (reason == EndFileReason::Error).then_some(data.error),
                            playlist_entry_id: data.playlist_entry_id,
                        }
                    }
                    None => Self::Other(MPV_EVENT_END_FILE),
                },
                MPV_EVENT_IDLE => Self::Idle,
                MPV_EVENT_VIDEO_RECONFIG => Self::VideoReconfig,
                MPV_EVENT_AUDIO_RECONFIG => Self::AudioReconfig,
                MPV_EVENT_SEEK => Self::Seek,
                MPV_EVENT_PLAYBACK_RESTART => Self::PlaybackRestart,
                MPV_EVENT_PROPERTY_CHANGE => {
                    match event.data.cast::<mpv_event_property>().as_ref() {
                        Some(prop) => property_change(event.reply_userdata, prop),
                        None => Self::Other(MPV_EVENT_PROPERTY_CHANGE),
                    }
                }
                MPV_EVENT_COMMAND_REPLY => Self::CommandReply {
                    id: event.reply_userdata,
                    result: if event.error < 0 {
                        Err(event.error)
                    } else {
                        Ok(event
                            .data
                            .cast::<mpv_event_command>()
                            .as_ref()
                            .map_or(Value::Null, |cmd| decode_raw(&cmd.result)))
                    },
                },
                MPV_EVENT_QUEUE_OVERFLOW => Self::QueueOverflow,
                other => Self::Other(other),
            }
        };
        Some(event)
    }
}

/// # Safety
/// `prop` must come from a live property-change event.
unsafe fn property_change(id: u64, prop: &mpv_event_property) -> PlayerEvent {
    // SAFETY: the event owns the name and payload until the next wait
    let (name, value) = unsafe {
        let name = ptr_to_string(prop.name);
        let value = match prop.format {
            MPV_FORMAT_NODE => prop
                .data
                .cast::<mpv_node>()
                .as_ref()
                .map_or(Value::Null, |node| decode_raw(node)),
            _ => Value::Null,
        };
        (name, value)
    };

    if name == "track-list" {
        PlayerEvent::TracksChanged { id, tracks: value }
    } else {
        PlayerEvent::PropertyChanged { id, name, value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haruna_mpv_core::encode;
    use serde_json::json;
    use std::ffi::{CString, c_void};
    use std::ptr;

    fn raw_event(event_id: mpv_event_id, data: *mut c_void) -> mpv_event {
        mpv_event {
            event_id,
            error: 0,
            reply_userdata: 0,
            data,
        }
    }

    #[test]
    fn test_none_ends_queue() {
        let event = raw_event(MPV_EVENT_NONE, ptr::null_mut());
        assert_eq!(unsafe { PlayerEvent::from_raw(&event) }, None);
    }

    #[test]
    fn test_simple_events() {
        let cases = [
            (MPV_EVENT_SHUTDOWN, PlayerEvent::Shutdown),
            (MPV_EVENT_FILE_LOADED, PlayerEvent::FileLoaded),
            (MPV_EVENT_IDLE, PlayerEvent::Idle),
            (MPV_EVENT_SEEK, PlayerEvent::Seek),
            (MPV_EVENT_PLAYBACK_RESTART, PlayerEvent::PlaybackRestart),
            (MPV_EVENT_VIDEO_RECONFIG, PlayerEvent::VideoReconfig),
            (MPV_EVENT_AUDIO_RECONFIG, PlayerEvent::AudioReconfig),
            (MPV_EVENT_QUEUE_OVERFLOW, PlayerEvent::QueueOverflow),
            (MPV_EVENT_HOOK, PlayerEvent::Other(MPV_EVENT_HOOK)),
        ];
        for (id, expected) in cases {
            let event = raw_event(id, ptr::null_mut());
            assert_eq!(unsafe { PlayerEvent::from_raw(&event) }, Some(expected));
        }
    }

    #[test]
    fn test_end_file_error() {
        let mut data = mpv_event_end_file {
            reason: MPV_END_FILE_REASON_ERROR,
            error: MPV_ERROR_LOADING_FAILED,
            playlist_entry_id: 4,
            playlist_insert_id: 0,
            playlist_insert_num_entries: 0,
        };
        let event = raw_event(MPV_EVENT_END_FILE, ptr::from_mut(&mut data).cast());
        assert_eq!(
            unsafe { PlayerEvent::from_raw(&event) },
            Some(PlayerEvent::EndFile {
                reason: EndFileReason::Error,
                error: Some(MPV_ERROR_LOADING_FAILED),
                playlist_entry_id: 4,
            })
        );
    }

    #[test]
    fn test_end_file_eof_has_no_error() {
        let mut data = mpv_event_end_file {
            reason: MPV_END_FILE_REASON_EOF,
            error: 0,
            playlist_entry_id: 1,
            playlist_insert_id: 0,
            playlist_insert_num_entries: 0,
        };
        let event = raw_event(MPV_EVENT_END_FILE, ptr::from_mut(&mut data).cast());
        let Some(PlayerEvent::EndFile { reason, error, .. }) =
            (unsafe { PlayerEvent::from_raw(&event) })
        else {
            panic!("expected end-file");
        };
        assert_eq!(reason, EndFileReason::Eof);
        assert_eq!(error, None);
    }

    #[test]
    fn test_property_change_decodes_node() {
        let name = CString::new("volume").unwrap();
        let node = encode(&json!(75.5));
        let mut prop = mpv_event_property {
            name: name.as_ptr(),
            format: MPV_FORMAT_NODE,
            data: ptr::from_ref(node.as_raw()).cast_mut().cast(),
        };
        let mut event = raw_event(MPV_EVENT_PROPERTY_CHANGE, ptr::from_mut(&mut prop).cast());
        event.reply_userdata = 9;

        assert_eq!(
            unsafe { PlayerEvent::from_raw(&event) },
            Some(PlayerEvent::PropertyChanged {
                id: 9,
                name: "volume".into(),
                value: json!(75.5),
            })
        );
    }

    #[test]
    fn test_unavailable_property_is_null() {
        let name = CString::new("duration").unwrap();
        let mut prop = mpv_event_property {
            name: name.as_ptr(),
            format: MPV_FORMAT_NONE,
            data: ptr::null_mut(),
        };
        let event = raw_event(MPV_EVENT_PROPERTY_CHANGE, ptr::from_mut(&mut prop).cast());
        let Some(PlayerEvent::PropertyChanged { value, .. }) =
            (unsafe { PlayerEvent::from_raw(&event) })
        else {
            panic!("expected property change");
        };
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn test_track_list_change() {
        let name = CString::new("track-list").unwrap();
        let tracks = json!([{"id": 1, "type": "video"}, {"id": 1, "type": "audio"}]);
        let node = encode(&tracks);
        let mut prop = mpv_event_property {
            name: name.as_ptr(),
            format: MPV_FORMAT_NODE,
            data: ptr::from_ref(node.as_raw()).cast_mut().cast(),
        };
        let event = raw_event(MPV_EVENT_PROPERTY_CHANGE, ptr::from_mut(&mut prop).cast());
        assert_eq!(
            unsafe { PlayerEvent::from_raw(&event) },
            Some(PlayerEvent::TracksChanged { id: 0, tracks })
        );
    }

    #[test]
    fn test_log_message() {
        let prefix = CString::new("cplayer").unwrap();
        let level = CString::new("warn").unwrap();
        let text = CString::new("Audio device underrun\n").unwrap();
        let mut msg = mpv_event_log_message {
            prefix: prefix.as_ptr(),
            level: level.as_ptr(),
            text: text.as_ptr(),
            log_level: 30,
        };
        let event = raw_event(MPV_EVENT_LOG_MESSAGE, ptr::from_mut(&mut msg).cast());
        assert_eq!(
            unsafe { PlayerEvent::from_raw(&event) },
            Some(PlayerEvent::LogMessage(LogMessage {
                prefix: "cplayer".into(),
                level: "warn".into(),
                text: "Audio device underrun".into(),
            }))
        );
    }

    #[test]
    fn test_command_reply() {
        let mut cmd = mpv_event_command {
            result: mpv_node::none(),
        };
        let mut event = raw_event(MPV_EVENT_COMMAND_REPLY, ptr::from_mut(&mut cmd).cast());
        event.reply_userdata = 3;
        assert_eq!(
            unsafe { PlayerEvent::from_raw(&event) },
            Some(PlayerEvent::CommandReply {
                id: 3,
                result: Ok(Value::Null),
            })
        );

        event.error = MPV_ERROR_COMMAND;
        assert_eq!(
            unsafe { PlayerEvent::from_raw(&event) },
            Some(PlayerEvent::CommandReply {
                id: 3,
                result: Err(MPV_ERROR_COMMAND),
            })
        );
    }
}

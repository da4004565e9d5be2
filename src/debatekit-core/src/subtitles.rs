//! SRT subtitles from a timed transcript.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::DebateError;
use crate::transcript::Transcript;

/// `HH:MM:SS,mmm`
pub fn srt_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// One cue per utterance, `[speaker] text` on a single line.
///
/// Every utterance must already carry `start_ms`/`end_ms`.
pub fn render_srt(transcript: &Transcript) -> Result<String, DebateError> {
    let mut srt = String::new();
    for (index, u) in transcript.utterances.iter().enumerate() {
        let (Some(start), Some(end)) = (u.start_ms, u.end_ms) else {
            return Err(DebateError::InvalidTranscript(format!(
                "utterance {} has no audio timing; narrate the transcript first",
                index
            )));
        };
        let text = u.text.replace(['\r', '\n'], " ");
        let _ = write!(
            srt,
            "{}\n{} --> {}\n[{}] {}\n\n",
            index + 1,
            srt_timestamp(start),
            srt_timestamp(end),
            u.speaker,
            text.trim()
        );
    }
    Ok(srt)
}

pub fn write_srt(transcript: &Transcript, path: &Path) -> Result<(), DebateError> {
    let srt = render_srt(transcript)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, srt)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::{Role, RoleNames, TranscriptLog, Utterance};

    #[test]
    fn test_srt_timestamp() {
        assert_eq!(srt_timestamp(0), "00:00:00,000");
        assert_eq!(srt_timestamp(1_500), "00:00:01,500");
        assert_eq!(srt_timestamp(61_001), "00:01:01,001");
        assert_eq!(srt_timestamp(3_723_045), "01:02:03,045");
    }

    #[test]
    fn test_render_srt_cues() {
        let mut log = TranscriptLog::new("X", 1, RoleNames::default());
        log.append(Utterance::new("Moderator", Role::Moderator, "Welcome\nall.", 0));
        log.append(Utterance::new("A", Role::DebaterA, " Point one. ", 1));
        let mut transcript = log.finish();
        transcript.attach_audio(0, None, 0, 2_250).unwrap();
        transcript.attach_audio(1, None, 2_250, 65_000).unwrap();

        assert_eq!(
            render_srt(&transcript).unwrap(),
            "1\n00:00:00,000 --> 00:00:02,250\n[Moderator] Welcome all.\n\n\
             2\n00:00:02,250 --> 00:01:05,000\n[A] Point one.\n\n"
        );
    }

    #[test]
    fn test_untimed_transcript_is_rejected() {
        let mut log = TranscriptLog::new("X", 1, RoleNames::default());
        log.append(Utterance::new("Moderator", Role::Moderator, "Hi", 0));
        assert!(matches!(
            render_srt(&log.finish()),
            Err(DebateError::InvalidTranscript(_))
        ));
    }
}

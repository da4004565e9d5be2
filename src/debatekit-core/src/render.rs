//! Final video: solid background, narration track, burned-in subtitles.
//!
//! Thin wrapper over the `ffprobe` and `ffmpeg` binaries.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use crate::config::VideoConfig;
use crate::error::DebateError;

/// Duration of a media file in seconds, as reported by `ffprobe`.
pub async fn probe_duration(path: &Path) -> Result<f64, DebateError> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path)
        .output()
        .await
        .map_err(|e| DebateError::Render(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(DebateError::Render(format!(
            "ffprobe failed on {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout.trim().parse::<f64>().map_err(|_| {
        DebateError::Render(format!(
            "ffprobe returned no duration for {}: {:?}",
            path.display(),
            stdout.trim()
        ))
    })
}

/// Escape a path for use inside an ffmpeg filter argument.
fn escape_filter_path(path: &Path) -> String {
    path.display()
        .to_string()
        .replace('\\', "/")
        .replace(':', "\\:")
        .replace('\'', "\\'")
}

/// The `ffmpeg` argument list for a render.
pub fn ffmpeg_args(
    audio: &Path,
    subtitles: &Path,
    output: &Path,
    duration_secs: f64,
    video: &VideoConfig,
) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!(
            "color=c={}:s={}:d={:.3}",
            video.background, video.resolution, duration_secs
        ),
        "-i".to_string(),
        audio.display().to_string(),
        "-vf".to_string(),
        format!("subtitles={}", escape_filter_path(subtitles)),
        "-c:v".to_string(),
        "libx264".to_string(),
        "-pix_fmt".to_string(),
        "yuv420p".to_string(),
        "-c:a".to_string(),
        "aac".to_string(),
        "-shortest".to_string(),
        output.display().to_string(),
    ]
}

/// Render `output` from the narration track and its subtitles.
pub async fn render_video(
    audio: &Path,
    subtitles: &Path,
    output: &Path,
    video: &VideoConfig,
) -> Result<PathBuf, DebateError> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let duration = probe_duration(audio).await?;
    let result = Command::new("ffmpeg")
        .args(ffmpeg_args(audio, subtitles, output, duration, video))
        .output()
        .await
        .map_err(|e| DebateError::Render(format!("Failed to run ffmpeg: {}", e)))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        let tail: Vec<&str> = stderr.lines().rev().take(5).collect();
        return Err(DebateError::Render(format!(
            "ffmpeg exited with {}: {}",
            result.status,
            tail.into_iter().rev().collect::<Vec<_>>().join(" | ")
        )));
    }

    info!(path = %output.display(), duration_secs = duration, "video rendered");
    Ok(output.to_path_buf())
}

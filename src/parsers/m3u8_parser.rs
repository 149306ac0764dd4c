//! M3U8 master playlist parsing utilities

use anyhow::{anyhow, Context, Result};
use m3u8_rs::Playlist;
use std::path::Path;

use crate::core::models::{Resolution, StreamChoices, StreamInfo};

/// Extract the variant streams of a master playlist.
///
/// I-frame-only variants are ignored. A media playlist has no variants and
/// yields an empty list.
pub fn parse_stream_infos(content: &[u8]) -> Result<Vec<StreamInfo>> {
    let playlist = m3u8_rs::parse_playlist_res(content)
        .map_err(|e| anyhow!("Failed to parse m3u8 playlist: {}", e))?;

    let master = match playlist {
        Playlist::MasterPlaylist(master) => master,
        Playlist::MediaPlaylist(_) => {
            tracing::debug!("Media playlist has no variant streams");
            return Ok(Vec::new());
        }
    };

    let streams: Vec<StreamInfo> = master
        .variants
        .iter()
        .filter(|variant| !variant.is_i_frame)
        .map(|variant| StreamInfo {
            resolution: variant.resolution.as_ref().map(|r| Resolution {
                width: r.width,
                height: r.height,
            }),
            codecs: variant.codecs.clone(),
            frame_rate: variant.frame_rate,
        })
        .collect();

    tracing::debug!("Found {} variant streams", streams.len());
    Ok(streams)
}

/// Read a local playlist file and build the stream choices offered to the user
pub fn load_stream_choices(path: &Path) -> Result<StreamChoices> {
    let content =
        std::fs::read(path).with_context(|| format!("Failed to read playlist: {:?}", path))?;
    let streams = parse_stream_infos(&content)
        .with_context(|| format!("Invalid playlist: {:?}", path))?;
    Ok(StreamChoices::new(streams))
}

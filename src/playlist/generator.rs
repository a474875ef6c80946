use chrono::{DateTime, Utc};
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::errors::{PersistenceError, PersistenceResult};
use crate::models::{Catalog, Channel};
use crate::utils::datetime::DateTimeParser;
use crate::utils::{sanitize_file_stem, ChannelCategorizer};

/// Writes one M3U8 playlist per catalog group
pub struct PlaylistGenerator {
    output: OutputConfig,
    categorizer: ChannelCategorizer,
}

impl PlaylistGenerator {
    pub fn new(output: OutputConfig, categorizer: ChannelCategorizer) -> Self {
        Self {
            output,
            categorizer,
        }
    }

    /// Render the playlist of one group
    ///
    /// Channels are sorted by raw name. Each channel yields an entry for its
    /// primary URL and, when it differs, another for its secondary URL.
    pub fn generate_m3u_content(
        &self,
        group: &str,
        channels: &[Channel],
        generated_at: &DateTime<Utc>,
    ) -> String {
        let mut m3u = String::from("#EXTM3U\n");
        let _ = writeln!(
            m3u,
            "# Generated: {}",
            DateTimeParser::format_for_playlist(generated_at)
        );
        let _ = writeln!(m3u, "# Source: {}\n", self.output.source_label);

        let mut sorted: Vec<&Channel> = channels.iter().collect();
        sorted.sort_by(|a, b| a.raw_name.cmp(&b.raw_name));

        for channel in sorted {
            let group_title = self.categorizer.categorize(&channel.raw_name, group);

            if !channel.primary_url.is_empty() {
                self.push_entry(&mut m3u, channel, &group_title, &channel.primary_url);
            }

            if !channel.secondary_url.is_empty() && channel.secondary_url != channel.primary_url {
                self.push_entry(&mut m3u, channel, &group_title, &channel.secondary_url);
            }
        }

        m3u
    }

    fn push_entry(&self, m3u: &mut String, channel: &Channel, group_title: &str, url: &str) {
        let mut extinf = format!(
            "#EXTINF:-1 tvg-name=\"{}\" group-title=\"{}\"",
            channel.raw_name, group_title
        );

        if let Some(logo) = &channel.logo {
            extinf.push_str(&format!(" tvg-logo=\"{}\"", logo));
        }

        extinf.push_str(&format!(",{}\n", channel.display_name));

        m3u.push_str(&extinf);
        let _ = writeln!(m3u, "#EXTVLCOPT:http-user-agent={}", self.output.player_user_agent);
        let _ = writeln!(m3u, "{}\n", url);
    }

    /// Path of the playlist file for a group
    pub fn playlist_path(&self, group: &str) -> PathBuf {
        let filename = format!(
            "{}.{}",
            sanitize_file_stem(group),
            self.output.playlist_extension
        );
        self.output.dir.join(filename)
    }

    /// Save playlist content for a group to the output directory
    pub fn save_playlist(&self, group: &str, content: &str) -> PersistenceResult<PathBuf> {
        std::fs::create_dir_all(&self.output.dir)
            .map_err(|e| PersistenceError::write(&self.output.dir, e))?;

        let file_path = self.playlist_path(group);
        std::fs::write(&file_path, content)
            .map_err(|e| PersistenceError::write(&file_path, e))?;

        Ok(file_path)
    }

    /// Write the playlists of every group with at least one stream URL
    pub fn write_all(
        &self,
        catalog: &Catalog,
        generated_at: &DateTime<Utc>,
    ) -> PersistenceResult<Vec<PathBuf>> {
        let mut written = Vec::new();

        for (group, channels) in catalog.groups() {
            if !channels.iter().any(Channel::has_stream) {
                debug!("Skipping group {} without streams", group);
                continue;
            }

            let content = self.generate_m3u_content(group, channels, generated_at);
            let path = self.save_playlist(group, &content)?;
            info!("Created: {} ({} channels)", path.display(), channels.len());
            written.push(path);
        }

        Ok(written)
    }
}

//! Smart-search filtering
//!
//! Narrows a normalized result set to the episode and resolution the host
//! asked for. Constraints that are not set let every torrent through.

use crate::provider::{AnimeTorrent, SmartSearchOptions};

/// Constraints applied to a smart-search result set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SmartFilter {
    /// Target episode within the season
    pub episode_number: Option<u32>,
    /// Added to `episode_number` to get the alternative absolute episode
    pub absolute_offset: u32,
    /// Target resolution label such as `"1080p"`
    pub resolution: Option<String>,
    pub batch: bool,
}

impl SmartFilter {
    pub fn from_options(options: &SmartSearchOptions) -> Self {
        let resolution = options.resolution.trim();

        Self {
            episode_number: u32::try_from(options.episode_number)
                .ok()
                .filter(|n| *n > 0),
            absolute_offset: u32::try_from(options.media.absolute_season_offset).unwrap_or(0),
            resolution: (!resolution.is_empty()).then(|| resolution.to_string()),
            batch: options.batch,
        }
    }

    fn matches_episode(&self, torrent: &AnimeTorrent) -> bool {
        let Some(target) = self.episode_number else {
            return true;
        };
        let absolute = target.checked_add(self.absolute_offset);

        !torrent.is_batch
            && torrent
                .episode_number
                .is_some_and(|ep| ep == target || Some(ep) == absolute)
    }

    fn matches_resolution(&self, torrent: &AnimeTorrent) -> bool {
        let Some(ref target) = self.resolution else {
            return true;
        };

        match (parse_resolution(target), parse_resolution(&torrent.resolution)) {
            (Some(want), Some(have)) => want == have,
            _ => false,
        }
    }
}

/// Apply a smart filter, keeping the original relative order
///
/// Batch intent always yields nothing: the feed has no per-episode batch
/// entries to offer.
pub fn apply_smart_filter(torrents: Vec<AnimeTorrent>, filter: &SmartFilter) -> Vec<AnimeTorrent> {
    if filter.batch {
        return Vec::new();
    }

    torrents
        .into_iter()
        .filter(|t| filter.matches_episode(t) && filter.matches_resolution(t))
        .collect()
}

/// Numeric value of a resolution label, with the trailing unit stripped
fn parse_resolution(label: &str) -> Option<u32> {
    let label = label.trim();
    let digits = label
        .strip_suffix(|c: char| c.eq_ignore_ascii_case(&'p'))
        .unwrap_or(label);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Media;

    fn torrent(episode: Option<u32>, resolution: &str) -> AnimeTorrent {
        AnimeTorrent {
            name: format!("{:?} {}", episode, resolution),
            episode_number: episode,
            resolution: resolution.to_string(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<AnimeTorrent> {
        vec![
            torrent(Some(5), "720p"),
            torrent(Some(5), "1080p"),
            torrent(Some(6), "1080p"),
            torrent(Some(17), "1080p"),
            torrent(None, "1080p"),
        ]
    }

    #[test]
    fn test_batch_intent_is_always_empty() {
        let filter = SmartFilter {
            batch: true,
            ..Default::default()
        };
        assert!(apply_smart_filter(sample(), &filter).is_empty());

        let filter = SmartFilter {
            batch: true,
            episode_number: Some(5),
            resolution: Some("1080p".to_string()),
            absolute_offset: 12,
        };
        assert!(apply_smart_filter(sample(), &filter).is_empty());
    }

    #[test]
    fn test_no_constraints_keeps_everything() {
        let kept = apply_smart_filter(sample(), &SmartFilter::default());
        assert_eq!(kept, sample());
    }

    #[test]
    fn test_episode_with_absolute_offset() {
        let filter = SmartFilter {
            episode_number: Some(5),
            absolute_offset: 12,
            ..Default::default()
        };

        let episodes: Vec<Option<u32>> = apply_smart_filter(sample(), &filter)
            .iter()
            .map(|t| t.episode_number)
            .collect();
        assert_eq!(episodes, vec![Some(5), Some(5), Some(17)]);
    }

    #[test]
    fn test_episode_excludes_batches() {
        let mut batch = torrent(Some(5), "1080p");
        batch.is_batch = true;

        let filter = SmartFilter {
            episode_number: Some(5),
            ..Default::default()
        };
        assert!(apply_smart_filter(vec![batch], &filter).is_empty());
    }

    #[test]
    fn test_resolution_numeric_match() {
        let filter = SmartFilter {
            resolution: Some("1080p".to_string()),
            ..Default::default()
        };

        let kept = apply_smart_filter(
            vec![
                torrent(Some(1), "1080p"),
                torrent(Some(1), "720p"),
                torrent(Some(1), "1080P"),
                torrent(Some(1), "01080p"),
                torrent(Some(1), "p"),
                torrent(Some(1), ""),
            ],
            &filter,
        );

        let labels: Vec<&str> = kept.iter().map(|t| t.resolution.as_str()).collect();
        assert_eq!(labels, vec!["1080p", "1080P", "01080p"]);
    }

    #[test]
    fn test_unparsable_target_resolution_matches_nothing() {
        let filter = SmartFilter {
            resolution: Some("best".to_string()),
            ..Default::default()
        };
        assert!(apply_smart_filter(sample(), &filter).is_empty());
    }

    #[test]
    fn test_constraints_intersect() {
        let filter = SmartFilter {
            episode_number: Some(5),
            absolute_offset: 12,
            resolution: Some("1080p".to_string()),
            batch: false,
        };

        let kept = apply_smart_filter(sample(), &filter);
        assert_eq!(kept, vec![torrent(Some(5), "1080p"), torrent(Some(17), "1080p")]);
    }

    #[test]
    fn test_from_options() {
        let options = SmartSearchOptions {
            media: Media {
                absolute_season_offset: 24,
                ..Default::default()
            },
            episode_number: 0,
            resolution: " ".to_string(),
            ..Default::default()
        };

        let filter = SmartFilter::from_options(&options);
        assert_eq!(filter.episode_number, None);
        assert_eq!(filter.resolution, None);
        assert_eq!(filter.absolute_offset, 24);

        let options = SmartSearchOptions {
            episode_number: 3,
            resolution: "720p".to_string(),
            batch: true,
            ..Default::default()
        };
        let filter = SmartFilter::from_options(&options);
        assert_eq!(filter.episode_number, Some(3));
        assert_eq!(filter.resolution.as_deref(), Some("720p"));
        assert!(filter.batch);

        let options = SmartSearchOptions {
            episode_number: -1,
            ..Default::default()
        };
        assert_eq!(SmartFilter::from_options(&options).episode_number, None);
    }

    #[test]
    fn test_negative_offset_counts_as_zero() {
        let options = SmartSearchOptions {
            media: Media {
                absolute_season_offset: -12,
                ..Default::default()
            },
            episode_number: 5,
            ..Default::default()
        };

        let filter = SmartFilter::from_options(&options);
        assert_eq!(filter.absolute_offset, 0);

        let episodes: Vec<Option<u32>> = apply_smart_filter(sample(), &filter)
            .iter()
            .map(|t| t.episode_number)
            .collect();
        assert_eq!(episodes, vec![Some(5), Some(5)]);
    }
}

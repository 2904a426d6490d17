// Name resolver - Picks a destination name that is free in the store

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::StorePort;

/// Characters the store rejects in path components
const ILLEGAL_CHARS: &[char] = &['\\', '/', ':', '?', '*', '"', '<', '>', '|'];

/// Derives a safe, collision-free destination name
#[derive(Debug, Clone)]
pub struct NameResolver {
    prefix: String,
    extension: String,
    max_attempts: u32,
}

impl NameResolver {
    /// Create a resolver; `extension` is given without the dot
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
            max_attempts,
        }
    }

    /// Replace characters that are illegal in a store path component
    pub fn sanitize(name: &str) -> String {
        let replaced: String = name
            .chars()
            .map(|c| {
                if ILLEGAL_CHARS.contains(&c) || c.is_control() {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        replaced
            .trim_matches(|c: char| c.is_whitespace() || c == '.')
            .to_string()
    }

    /// Ensure the folder starts and ends with `/`
    pub fn normalize_folder(folder: &str) -> String {
        let trimmed = folder.trim().trim_matches('/');
        if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        }
    }

    /// Stem (name without extension) for the requested or synthesized name
    pub fn base_stem(&self, requested: Option<&str>, now: DateTime<Local>) -> String {
        let sanitized = requested.map(Self::sanitize).unwrap_or_default();
        let suffix = format!(".{}", self.extension);
        let cut = sanitized.len().saturating_sub(suffix.len());
        let stem = match sanitized.get(cut..) {
            Some(tail) if tail.eq_ignore_ascii_case(&suffix) => sanitized[..cut].trim_end().to_string(),
            _ => sanitized,
        };

        if stem.is_empty() {
            format!("{}_{}", self.prefix, now.format("%Y%m%d_%H%M%S"))
        } else {
            stem
        }
    }

    fn file_name(&self, stem: &str, attempt: u32) -> String {
        if attempt == 0 {
            format!("{}.{}", stem, self.extension)
        } else {
            format!("{}_{}.{}", stem, attempt, self.extension)
        }
    }

    /// Resolve a free destination name using the current local time
    pub async fn resolve(
        &self,
        store: &dyn StorePort,
        requested: Option<&str>,
        folder: &str,
    ) -> Result<DestinationName, DomainError> {
        self.resolve_at(store, requested, folder, Local::now()).await
    }

    /// Resolve a free destination name, synthesizing from `now` when needed
    pub async fn resolve_at(
        &self,
        store: &dyn StorePort,
        requested: Option<&str>,
        folder: &str,
        now: DateTime<Local>,
    ) -> Result<DestinationName, DomainError> {
        let folder = Self::normalize_folder(folder);
        let stem = self.base_stem(requested, now);

        for attempt in 0..=self.max_attempts {
            let candidate = DestinationName::new(folder.clone(), self.file_name(&stem, attempt));
            if !store.exists(&candidate.path()).await? {
                info!(path = %candidate, attempt, "Resolved destination name");
                return Ok(candidate);
            }
            debug!(path = %candidate, "Destination name taken");
        }

        Err(DomainError::NameExhausted(format!(
            "'{}' and {} numbered variants already exist in {}",
            self.file_name(&stem, 0),
            self.max_attempts,
            folder
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::MemoryStoreAdapter;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(NameResolver::sanitize("my:clip?*.mp4"), "my_clip__.mp4");
        assert_eq!(NameResolver::sanitize("a/b\\c|d\"e<f>g"), "a_b_c_d_e_f_g");
        assert_eq!(NameResolver::sanitize("  tab\there  "), "tab_here");
        assert_eq!(NameResolver::sanitize("..."), "");
    }

    #[test]
    fn test_normalize_folder() {
        assert_eq!(NameResolver::normalize_folder("/processed_videos/"), "/processed_videos/");
        assert_eq!(NameResolver::normalize_folder("processed_videos"), "/processed_videos/");
        assert_eq!(NameResolver::normalize_folder("//a/b//"), "/a/b/");
        assert_eq!(NameResolver::normalize_folder(""), "/");
    }

    #[test]
    fn test_base_stem() {
        let resolver = NameResolver::new("video_edited", "mp4", 10);
        assert_eq!(resolver.base_stem(Some("holiday"), fixed_now()), "holiday");
        assert_eq!(resolver.base_stem(Some("holiday.MP4"), fixed_now()), "holiday");
        assert_eq!(resolver.base_stem(Some("holiday.mov"), fixed_now()), "holiday.mov");
        assert_eq!(
            resolver.base_stem(None, fixed_now()),
            "video_edited_20240309_140507"
        );
        assert_eq!(
            resolver.base_stem(Some("   "), fixed_now()),
            "video_edited_20240309_140507"
        );
    }

    #[tokio::test]
    async fn test_resolve_free_name() {
        let store = MemoryStoreAdapter::new();
        let resolver = NameResolver::new("video_edited", "mp4", 10);

        let name = resolver
            .resolve_at(&store, Some("clip"), "processed_videos", fixed_now())
            .await
            .unwrap();
        assert_eq!(name.path(), "/processed_videos/clip.mp4");
        assert_eq!(name.file_name, "clip.mp4");
    }

    #[tokio::test]
    async fn test_resolve_appends_suffix_on_collision() {
        let store = MemoryStoreAdapter::new();
        store.insert_file("/out/clip.mp4", b"x".to_vec());
        store.insert_file("/out/clip_1.mp4", b"x".to_vec());
        let resolver = NameResolver::new("video_edited", "mp4", 10);

        let name = resolver
            .resolve_at(&store, Some("clip.mp4"), "/out/", fixed_now())
            .await
            .unwrap();
        assert_eq!(name.path(), "/out/clip_2.mp4");
    }

    #[tokio::test]
    async fn test_resolve_gives_up_after_max_attempts() {
        let store = MemoryStoreAdapter::new();
        store.insert_file("/out/clip.mp4", vec![]);
        for n in 1..=3 {
            store.insert_file(&format!("/out/clip_{}.mp4", n), vec![]);
        }
        let resolver = NameResolver::new("video_edited", "mp4", 3);

        let result = resolver
            .resolve_at(&store, Some("clip"), "/out/", fixed_now())
            .await;
        assert!(matches!(result, Err(DomainError::NameExhausted(_))));
        assert_eq!(store.exists_calls(), 4);
    }
}

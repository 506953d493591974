//! Asset classification and quota-driven eviction.
//!
//! A request is *dynamic* when its URL points into the images directory,
//! carries an image extension, or targets a known font/CDN host. Everything
//! else is *static*. Dynamic entries are refreshed in the background on a
//! cache hit and are the only ones subject to eviction.

use serde::{Deserialize, Serialize};
use url::Url;

/// Which store a request's response belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Static,
    Dynamic,
}

/// Dynamic asset classification rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Path fragment marking the images directory.
    #[serde(default = "default_image_dir")]
    pub image_dir: String,

    /// Image extensions, without the dot, matched case-insensitively.
    #[serde(default = "default_image_extensions")]
    pub image_extensions: Vec<String>,

    /// Font and CDN hosts whose responses are always dynamic.
    #[serde(default = "default_dynamic_hosts")]
    pub dynamic_hosts: Vec<String>,
}

fn default_image_dir() -> String {
    "/assets/images/".into()
}

fn default_image_extensions() -> Vec<String> {
    vec!["jpg".into(), "png".into(), "webp".into()]
}

fn default_dynamic_hosts() -> Vec<String> {
    vec!["fonts.googleapis.com".into(), "cdnjs.cloudflare.com".into()]
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            image_dir: default_image_dir(),
            image_extensions: default_image_extensions(),
            dynamic_hosts: default_dynamic_hosts(),
        }
    }
}

impl ClassifierConfig {
    /// Classify a request URL.
    pub fn classify(&self, url: &Url) -> AssetClass {
        if self.is_image(url) || self.has_image_extension(url) || self.is_dynamic_host(url) {
            AssetClass::Dynamic
        } else {
            AssetClass::Static
        }
    }

    /// Whether the URL points into the images directory.
    ///
    /// This is the filter eviction applies to the dynamic store.
    pub fn is_image(&self, url: &Url) -> bool {
        url.path().contains(&self.image_dir)
    }

    fn has_image_extension(&self, url: &Url) -> bool {
        let Some(last) = url.path_segments().and_then(|mut segments| segments.next_back()) else {
            return false;
        };
        let Some((_, ext)) = last.rsplit_once('.') else {
            return false;
        };
        self.image_extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }

    fn is_dynamic_host(&self, url: &Url) -> bool {
        url.host_str()
            .is_some_and(|host| self.dynamic_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)))
    }
}

/// Eviction policy applied when storage quota is exceeded.
///
/// Victims are the first `batch` image entries in enumeration order, which
/// approximates insertion order. This is not a recency policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvictionConfig {
    /// Image entry count above which eviction runs.
    #[serde(default = "default_threshold")]
    pub threshold: usize,

    /// Number of entries deleted per eviction.
    #[serde(default = "default_batch")]
    pub batch: usize,
}

fn default_threshold() -> usize {
    20
}

fn default_batch() -> usize {
    10
}

impl Default for EvictionConfig {
    fn default() -> Self {
        Self { threshold: default_threshold(), batch: default_batch() }
    }
}

impl EvictionConfig {
    /// Select the entries to delete from the listed image entries.
    pub fn select_victims<'a, T>(&self, image_entries: &'a [T]) -> &'a [T] {
        if image_entries.len() > self.threshold {
            &image_entries[..self.batch.min(image_entries.len())]
        } else {
            &[]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_classify_images_directory() {
        let classifier = ClassifierConfig::default();
        let u = url("https://moonlight.test/assets/images/food/");
        assert_eq!(classifier.classify(&u), AssetClass::Dynamic);
        assert!(classifier.is_image(&u));
    }

    #[test]
    fn test_classify_image_extension_outside_images_dir() {
        let classifier = ClassifierConfig::default();
        let u = url("https://moonlight.test/gallery/terrace.WEBP");
        assert_eq!(classifier.classify(&u), AssetClass::Dynamic);
        assert!(!classifier.is_image(&u));
    }

    #[test]
    fn test_classify_font_host() {
        let classifier = ClassifierConfig::default();
        let u = url("https://fonts.googleapis.com/css2?family=Playfair+Display:wght@400;600;700&display=swap");
        assert_eq!(classifier.classify(&u), AssetClass::Dynamic);
    }

    #[test]
    fn test_classify_static_pages_and_styles() {
        let classifier = ClassifierConfig::default();
        for s in ["https://moonlight.test/", "https://moonlight.test/menu2.html", "https://moonlight.test/assets/css/critical.css"] {
            assert_eq!(classifier.classify(&url(s)), AssetClass::Static, "{s}");
        }
    }

    #[test]
    fn test_classify_extension_in_query_is_static() {
        let classifier = ClassifierConfig::default();
        let u = url("https://moonlight.test/share?image=dish.jpg");
        assert_eq!(classifier.classify(&u), AssetClass::Static);
    }

    #[test]
    fn test_select_victims_over_threshold() {
        let policy = EvictionConfig::default();
        let entries: Vec<usize> = (0..25).collect();
        let victims = policy.select_victims(&entries);
        assert_eq!(victims, &(0..10).collect::<Vec<_>>()[..]);
    }

    #[test]
    fn test_select_victims_at_threshold() {
        let policy = EvictionConfig::default();
        let entries: Vec<usize> = (0..20).collect();
        assert!(policy.select_victims(&entries).is_empty());
    }

    #[test]
    fn test_select_victims_batch_larger_than_list() {
        let policy = EvictionConfig { threshold: 1, batch: 10 };
        let entries = vec!["a", "b", "c"];
        assert_eq!(policy.select_victims(&entries), &["a", "b", "c"]);
    }
}

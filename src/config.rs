use std::{net::SocketAddr, path::PathBuf};

use crate::layout::{PageLayout, PageSize};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MARGIN_MM: f32 = 20.0;
const DEFAULT_STORE_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub page_size: PageSize,
    pub margin_mm: f32,
    /// When set, every generated report is also written here as a PDF.
    pub archive_dir: Option<PathBuf>,
    /// Reports kept in memory before the oldest are evicted.
    pub store_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            page_size: PageSize::A4,
            margin_mm: DEFAULT_MARGIN_MM,
            archive_dir: None,
            store_capacity: DEFAULT_STORE_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Reads `PORT`, `REPORT_PAGE_SIZE`, `REPORT_MARGIN_MM`,
    /// `REPORT_ARCHIVE_DIR` and `REPORT_STORE_CAPACITY`. Unset or unparseable
    /// values keep their defaults.
    pub fn from_env() -> Self { Self::from_lookup(|key| std::env::var(key).ok()) }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = lookup("PORT").and_then(|v| v.parse().ok()).unwrap_or(defaults.port);
        let page_size = match lookup("REPORT_PAGE_SIZE") {
            Some(raw) => raw.parse::<PageSize>().unwrap_or_else(|e| {
                tracing::warn!("{e}, using A4");
                defaults.page_size
            }),
            None => defaults.page_size,
        };
        let margin_mm = lookup("REPORT_MARGIN_MM")
            .and_then(|v| v.parse::<f32>().ok())
            .filter(|m| (5.0..=60.0).contains(m))
            .unwrap_or(defaults.margin_mm);
        let archive_dir = lookup("REPORT_ARCHIVE_DIR").filter(|v| !v.trim().is_empty()).map(PathBuf::from);
        let store_capacity = lookup("REPORT_STORE_CAPACITY")
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.store_capacity);
        Self { port, page_size, margin_mm, archive_dir, store_capacity }
    }

    pub fn layout(&self) -> PageLayout { PageLayout::new(self.page_size, self.margin_mm) }

    pub fn addr(&self) -> SocketAddr { SocketAddr::from(([0, 0, 0, 0], self.port)) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.page_size, PageSize::A4);
        assert_eq!(config.layout(), PageLayout::default());
        assert_eq!(config.archive_dir, None);
        assert_eq!(config.store_capacity, 100);
    }

    #[test]
    fn reads_overrides() {
        let config =
            AppConfig::from_lookup(lookup(&[("PORT", "9000"), ("REPORT_PAGE_SIZE", "letter"), ("REPORT_MARGIN_MM", "15")]));
        assert_eq!(config.port, 9000);
        assert_eq!(config.layout().width, 215.9);
        assert_eq!(config.layout().margin, 15.0);

        let config =
            AppConfig::from_lookup(lookup(&[("REPORT_ARCHIVE_DIR", "/tmp/reports"), ("REPORT_STORE_CAPACITY", "5")]));
        assert_eq!(config.archive_dir, Some(PathBuf::from("/tmp/reports")));
        assert_eq!(config.store_capacity, 5);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config =
            AppConfig::from_lookup(lookup(&[("PORT", "abc"), ("REPORT_PAGE_SIZE", "tabloid"), ("REPORT_MARGIN_MM", "500")]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.page_size, PageSize::A4);
        assert_eq!(config.margin_mm, 20.0);
        let config = AppConfig::from_lookup(lookup(&[("REPORT_STORE_CAPACITY", "0")]));
        assert_eq!(config.store_capacity, 100);
    }
}

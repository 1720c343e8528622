use crate::pagination::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub images: ImageConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub labeling: LabelingConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.images.page_size > 0,
            "images.page_size must be at least 1"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Directory holding unlabeled images.
    pub root: String,
    /// Destination for labeled images; defaults to `<root>/labeled`.
    #[serde(default)]
    pub labeled: Option<String>,
    /// Glob patterns for file names that are never listed.
    #[serde(default)]
    pub exclude: Vec<String>,
    pub page_size: usize,
}

impl ImageConfig {
    pub fn root_dir(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }

    pub fn labeled_dir(&self) -> PathBuf {
        match &self.labeled {
            Some(dir) => PathBuf::from(dir),
            None => self.root_dir().join("labeled"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub addr: String,
    pub cors: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelingConfig {
    /// Check every tag against the class mapping before the image is moved.
    #[serde(default)]
    pub validate_before_move: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

pub fn load(path: Option<&str>) -> anyhow::Result<AppConfig> {
    let mut settings = config::Config::builder()
        .set_default("images.root", "static/images")?
        .set_default("images.page_size", DEFAULT_PAGE_SIZE as i64)?
        .set_default("images.exclude", Vec::<String>::new())?
        .set_default("server.addr", "127.0.0.1:5000")?
        .set_default("server.cors", true)?
        .set_default("labeling.validate_before_move", false)?
        .set_default("logging.level", "info")?;
    if let Some(p) = path {
        settings = settings.add_source(config::File::with_name(p));
    } else {
        settings = settings.add_source(config::File::with_name("config/default").required(false));
    }
    settings = settings.add_source(
        config::Environment::with_prefix("LABELER")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );
    let cfg: AppConfig = settings.build()?.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn defaults_apply_without_a_config_file() {
        let cfg = load(None).unwrap();
        assert_eq!(cfg.images.page_size, 5);
        assert!(cfg.images.exclude.is_empty());
        assert!(cfg.server.cors);
        assert!(!cfg.labeling.validate_before_move);
        assert_eq!(
            cfg.images.labeled_dir(),
            PathBuf::from(&cfg.images.root).join("labeled")
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("labeler.toml");
        fs::write(
            &path,
            r#"
            [images]
            root = "/data/frames"
            labeled = "/data/done"
            page_size = 10

            [labeling]
            validate_before_move = true
            "#,
        )
        .unwrap();

        let cfg = load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(cfg.images.root_dir(), PathBuf::from("/data/frames"));
        assert_eq!(cfg.images.labeled_dir(), PathBuf::from("/data/done"));
        assert_eq!(cfg.images.page_size, 10);
        assert!(cfg.labeling.validate_before_move);
    }

    #[test]
    fn zero_page_size_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("labeler.toml");
        fs::write(&path, "[images]\npage_size = 0\n").unwrap();

        let err = load(Some(path.to_str().unwrap())).unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn environment_overrides_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("labeler.toml");
        fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

        std::env::set_var("LABELER_SERVER__ADDR", "0.0.0.0:8099");
        std::env::set_var("LABELER_LOGGING__LEVEL", "debug");
        let cfg = load(Some(path.to_str().unwrap()));
        std::env::remove_var("LABELER_SERVER__ADDR");
        std::env::remove_var("LABELER_LOGGING__LEVEL");

        let cfg = cfg.unwrap();
        assert_eq!(cfg.server.addr, "0.0.0.0:8099");
        assert_eq!(cfg.logging.level, "debug");
    }
}

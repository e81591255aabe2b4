pub mod catalog;
pub mod completions;
pub mod payments;
pub mod review;
pub mod summary;

use cfdi_core::config::Config;
use std::path::{Path, PathBuf};

/// Invoices folder for a command: the positional argument when given,
/// otherwise `[invoices] dir` from config. Relative paths resolve against
/// `project_root`.
pub fn invoices_dir(arg: Option<&Path>, config: &Config, project_root: &Path) -> PathBuf {
    let dir = arg.unwrap_or(&config.invoices.dir);
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        project_root.join(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argument_overrides_config() {
        let config = Config::default();
        let root = Path::new("/work");
        assert_eq!(invoices_dir(None, &config, root), PathBuf::from("/work/cfdis"));
        assert_eq!(
            invoices_dir(Some(Path::new("2024")), &config, root),
            PathBuf::from("/work/2024")
        );
    }

    #[cfg(unix)]
    #[test]
    fn absolute_paths_are_kept() {
        let mut config = Config::default();
        config.invoices.dir = PathBuf::from("/srv/facturas");
        assert_eq!(
            invoices_dir(None, &config, Path::new("/work")),
            PathBuf::from("/srv/facturas")
        );
    }
}

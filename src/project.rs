// Sat Jan 17 2026 - Alex

use crate::config::{Config, ConfigError, CONFIG_FILE};
use crate::memory::{MemoryError, RegionTable};
use crate::relocation::OffsetMapper;
use crate::symbol::{SymbolSource, YamlSymbolSource};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("{0} is a file, not a project directory")]
    NotADirectory(PathBuf),

    #[error("{0} is missing, this does not look like a project")]
    MissingConfig(PathBuf),

    #[error("{0} exists but is not a file")]
    ConfigNotAFile(PathBuf),

    #[error("Failed to create project at {path}: {source}")]
    Scaffold {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Region table is invalid: {0}")]
    Regions(#[from] MemoryError),
}

/// A loaded project: its root directory and parsed config.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    config: Config,
}

#[derive(Debug)]
pub enum ProjectStatus {
    /// The directory was missing or empty and a fresh project was written.
    Created(PathBuf),
    Loaded(Project),
}

impl Project {
    pub fn new(root: PathBuf, config: Config) -> Self {
        Self { root, config }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolves a config path against the project root.
    pub fn path(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    pub fn symbols_dir(&self) -> PathBuf {
        self.path(&self.config.symbols_dir)
    }

    pub fn source_blocks(&self) -> PathBuf {
        self.path(&self.config.blocks.source)
    }

    pub fn target_blocks(&self) -> PathBuf {
        self.path(&self.config.blocks.target)
    }

    /// Builds the region table and an offset mapper over the project's
    /// symbol files.
    pub fn mapper(&self) -> Result<OffsetMapper, ProjectError> {
        let symbols = YamlSymbolSource::new(self.symbols_dir());
        let source_build = &self.config.source_build;
        let regions = RegionTable::from_specs(&self.config.regions, |section| {
            symbols.section_bounds(section, source_build)
        })?;

        Ok(OffsetMapper::new(
            regions,
            Box::new(symbols),
            source_build,
            &self.config.target_build,
        ))
    }
}

// Appended to scaffolded configs. Unquoted offsets such as 22e0000 are read
// by YAML as numbers, so the example quotes both sides.
const OFFSET_MAPS_EXAMPLE: &str = "
# Manual translations for offsets that cannot be converted automatically,
# source build offset -> target build offset. Quote both sides:
# offset_maps:
#   \"22e0180\": \"12e0188\"
";

/// Loads the project at `dir`, scaffolding one when the directory is missing
/// or empty.
pub fn load_project<P: AsRef<Path>>(dir: P) -> Result<ProjectStatus, ProjectError> {
    let root = dir.as_ref().to_path_buf();

    if root.is_file() {
        return Err(ProjectError::NotADirectory(root));
    }
    if !root.exists() || is_empty_dir(&root)? {
        log::info!("No project at {}, creating one", root.display());
        init_project(&root)?;
        return Ok(ProjectStatus::Created(root));
    }

    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Err(ProjectError::MissingConfig(config_path));
    }
    if !config_path.is_file() {
        return Err(ProjectError::ConfigNotAFile(config_path));
    }

    let config = Config::load(&config_path)?;
    config.validate()?;
    Ok(ProjectStatus::Loaded(Project::new(root, config)))
}

/// Writes a default project into `dir`. Existing files are left alone.
pub fn init_project(dir: &Path) -> Result<(), ProjectError> {
    let config = Config::default();
    let scaffold = |path: PathBuf| -> Result<(), ProjectError> {
        fs::create_dir_all(&path).map_err(|source| ProjectError::Scaffold { path, source })
    };

    scaffold(dir.to_path_buf())?;
    scaffold(dir.join(&config.symbols_dir))?;
    scaffold(dir.join(&config.blocks.source))?;
    scaffold(dir.join(&config.blocks.target))?;

    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        let mut text = config.to_yaml()?;
        text.push_str(OFFSET_MAPS_EXAMPLE);
        fs::write(&config_path, text).map_err(|source| ProjectError::Scaffold {
            path: config_path.clone(),
            source,
        })?;
    }
    Ok(())
}

fn is_empty_dir(dir: &Path) -> Result<bool, ProjectError> {
    let mut entries = fs::read_dir(dir).map_err(|source| ProjectError::Scaffold {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(entries.next().is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_directory_is_scaffolded() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("project");

        let status = load_project(&root).unwrap();
        assert!(matches!(status, ProjectStatus::Created(ref p) if p == &root));
        assert!(root.join(CONFIG_FILE).is_file());
        assert!(root.join("symbols").is_dir());
        assert!(root.join("blocks/source").is_dir());

        match load_project(&root).unwrap() {
            ProjectStatus::Loaded(project) => {
                assert_eq!(project.config().source_build, "EU");
                assert_eq!(project.target_blocks(), root.join("blocks/target"));
            }
            other => panic!("unexpected status {:?}", other),
        }
    }

    #[test]
    fn test_scaffolded_config_shows_quoted_override() {
        let tmp = TempDir::new().unwrap();
        init_project(tmp.path()).unwrap();

        let text = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(text.contains("#   \"22e0180\": \"12e0188\""));
        assert!(Config::from_yaml(&text).unwrap().offset_maps.is_empty());

        // The example works once uncommented.
        let enabled: String = text
            .lines()
            .filter(|l| l.starts_with("# offset_maps:") || l.starts_with("#   "))
            .map(|l| format!("{}\n", &l[2..]))
            .collect();
        let config = Config::from_yaml(&enabled).unwrap();
        assert_eq!(config.offset_maps["22e0180"], "12e0188");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_directory_is_scaffolded() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(load_project(tmp.path()).unwrap(), ProjectStatus::Created(_)));
    }

    #[test]
    fn test_file_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("rom.nds");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(load_project(&file), Err(ProjectError::NotADirectory(_))));
    }

    #[test]
    fn test_directory_without_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), b"x").unwrap();
        assert!(matches!(load_project(tmp.path()), Err(ProjectError::MissingConfig(_))));

        fs::create_dir(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(matches!(load_project(tmp.path()), Err(ProjectError::ConfigNotAFile(_))));
    }

    #[test]
    fn test_mapper_from_symbol_files() {
        let tmp = TempDir::new().unwrap();
        init_project(tmp.path()).unwrap();
        fs::write(
            tmp.path().join("config.yml"),
            "regions:\n  - name: overlay11\n  - name: special_process\n    start: 0x22E7B88\n    length: 0x810\n    target_start: 0x22E7248\n",
        )
        .unwrap();
        fs::write(
            tmp.path().join("symbols/overlay11.yml"),
            "overlay11:\n  address:\n    EU: 0x22DD8E0\n    NA: 0x22DCB80\n  length:\n    EU: 0x48C40\n    NA: 0x48C40\n  functions:\n    - name: FuncA\n      address:\n        EU: 0x22E0000\n        NA: 0x22DF2A0\n",
        )
        .unwrap();

        let project = match load_project(tmp.path()).unwrap() {
            ProjectStatus::Loaded(project) => project,
            other => panic!("unexpected status {:?}", other),
        };
        let mapper = project.mapper().unwrap();
        assert_eq!(mapper.regions().len(), 2);
        assert_eq!(
            mapper.translate(crate::memory::Address::new(0x22E0010), None).unwrap(),
            crate::memory::Address::new(0x22DF2B0)
        );
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "source_build: NA\n").unwrap();
        assert!(matches!(
            load_project(tmp.path()),
            Err(ProjectError::Config(ConfigError::Invalid(_)))
        ));
    }
}

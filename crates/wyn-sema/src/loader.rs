//! Module loader with a canonical-path cache.
//!
//! Maps `geometry::math` to `geometry/math.wyn` under the configured
//! base directory, parses the file, and caches the result so loading the
//! same module twice hands back the same `Program` instance.

use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustc_hash::FxHashMap;

use wyn_parser::Parse;

/// A module load failure.
#[derive(Debug)]
pub struct LoadError {
    pub path: PathBuf,
    pub message: String,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for LoadError {}

/// The loader. Owns the cache; the analyzer only asks for programs.
#[derive(Debug)]
pub struct ModuleLoader {
    base_dir: PathBuf,
    cache: FxHashMap<PathBuf, Rc<Parse>>,
}

impl ModuleLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache: FxHashMap::default(),
        }
    }

    /// The on-disk file for a module path like `geometry::math`.
    pub fn module_file(&self, module_path: &str) -> PathBuf {
        let rel: PathBuf = module_path.split("::").collect();
        self.base_dir.join(rel).with_extension("wyn")
    }

    /// Load and parse a module, caching by canonical path. Repeated loads
    /// of the same file return the same shared parse.
    pub fn load_module(&mut self, module_path: &str) -> Result<Rc<Parse>, LoadError> {
        let file = self.module_file(module_path);
        let key = std::fs::canonicalize(&file).unwrap_or_else(|_| file.clone());

        if let Some(cached) = self.cache.get(&key) {
            return Ok(Rc::clone(cached));
        }

        let source = std::fs::read_to_string(&file).map_err(|e| LoadError {
            path: file.clone(),
            message: e.to_string(),
        })?;
        let parse = Rc::new(wyn_parser::parse(&source));
        self.cache.insert(key, Rc::clone(&parse));
        Ok(parse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_file_maps_double_colons_to_directories() {
        let loader = ModuleLoader::new("/proj");
        assert_eq!(
            loader.module_file("geometry::math"),
            Path::new("/proj/geometry/math.wyn")
        );
        assert_eq!(loader.module_file("math"), Path::new("/proj/math.wyn"));
    }

    #[test]
    fn loading_twice_returns_the_same_program() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("math.wyn"), "pub fn pi() -> Float { return 3.14 }")
            .unwrap();

        let mut loader = ModuleLoader::new(dir.path());
        let a = loader.load_module("math").unwrap();
        let b = loader.load_module("math").unwrap();
        assert!(Rc::ptr_eq(&a, &b), "cache must return the same instance");
        assert_eq!(a.program.stmts.len(), b.program.stmts.len());
    }

    #[test]
    fn missing_module_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = ModuleLoader::new(dir.path());
        let err = loader.load_module("nope").unwrap_err();
        assert!(err.path.ends_with("nope.wyn"));
    }
}

//! On-disk cache of generated vertex streams.
//!
//! Named catalog entries are written once, the first time they are asked
//! for, and served from disk afterwards. The scratch slot is rewritten on
//! every custom request, and can be promoted to a named file with
//! [`VertexCache::save_scratch`].

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use nalgebra::Point3;

use crate::catalog::{self, Resolved, SystemId, FILE_EXTENSION, SCRATCH_FILE_NAME};
use crate::codec;
use crate::config::Config;
use crate::errors::LSystemError;
use crate::generator::{self, GenerateOptions};
use crate::l_system::LSystem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Served from an existing file.
    Hit,
    /// Generated and written by this call.
    Generated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedVertices {
    pub system: SystemId,
    pub path: PathBuf,
    pub status: CacheStatus,
    pub vertices: Vec<Point3<f32>>,
}

#[derive(Debug, Clone)]
pub struct VertexCache {
    dir: PathBuf,
    max_iterations: u32,
    options: GenerateOptions,
}

impl VertexCache {
    pub fn new<P: AsRef<Path>>(dir: P, max_iterations: u32) -> VertexCache {
        VertexCache {
            dir: dir.as_ref().to_path_buf(),
            max_iterations,
            options: GenerateOptions::default(),
        }
    }

    pub fn from_config(config: &Config) -> VertexCache {
        VertexCache {
            dir: config.cache_dir.clone(),
            max_iterations: config.max_iterations,
            options: GenerateOptions {
                reject_empty: config.reject_empty,
            },
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    fn check_iterations(&self, iterations: u32) -> Result<(), LSystemError> {
        if iterations > self.max_iterations {
            return Err(LSystemError::IterationLimit {
                requested: iterations,
                limit: self.max_iterations,
            });
        }
        Ok(())
    }

    /// "Get vertices for (id, iterations)". Catalog systems come from disk
    /// when already cached; id 0 always regenerates into the scratch slot.
    pub fn get_vertices(&self, system_id: u32, iterations: u32) -> Result<CachedVertices> {
        self.check_iterations(iterations)?;
        let resolved = catalog::resolve(system_id, iterations)?;
        if resolved.system == SystemId::Custom {
            return self.generate_into(&resolved, iterations);
        }

        let path = self.path_for(&resolved.file_name);
        if path.exists() {
            match self.load_path(&path) {
                Ok(vertices) => {
                    tracing::debug!(path = %path.display(), vertices = vertices.len(), "cache hit");
                    return Ok(CachedVertices {
                        system: resolved.system,
                        path,
                        status: CacheStatus::Hit,
                        vertices,
                    });
                }
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "discarding unreadable cache file");
                }
            }
        }
        self.generate_into(&resolved, iterations)
    }

    /// Generates a caller supplied grammar into the scratch slot, replacing
    /// whatever was there.
    pub fn get_custom(&self, grammar: LSystem, iterations: u32) -> Result<CachedVertices> {
        self.check_iterations(iterations)?;
        let resolved = catalog::resolve_custom(grammar)?;
        self.generate_into(&resolved, iterations)
    }

    /// Reads and validates a file in the cache directory.
    pub fn load_file(&self, file_name: &str) -> Result<Vec<Point3<f32>>> {
        self.load_path(&self.path_for(file_name))
    }

    pub fn scratch_path(&self) -> PathBuf {
        self.path_for(SCRATCH_FILE_NAME)
    }

    /// Moves the scratch file to `name` inside the cache directory, or to
    /// the canonical file name of `(system, iterations)` when no name is
    /// given. Names without an extension get `.bin` appended. An existing
    /// file under the target name is replaced.
    pub fn save_scratch(
        &self,
        name: Option<&str>,
        system: SystemId,
        iterations: u32,
    ) -> Result<PathBuf> {
        let file_name = match name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() || Path::new(name).file_name() != Some(OsStr::new(name)) {
                    bail!("'{}' is not a plain file name", name);
                }
                if Path::new(name).extension().is_some() {
                    name.to_string()
                } else {
                    format!("{}.{}", name, FILE_EXTENSION)
                }
            }
            None if system == SystemId::Custom => {
                bail!("a custom system has no canonical file name, give a name")
            }
            None => catalog::canonical_file_name(system, iterations),
        };

        let from = self.scratch_path();
        if !from.is_file() {
            bail!("nothing to save, {} does not exist", from.display());
        }
        let to = self.path_for(&file_name);
        std::fs::rename(&from, &to)
            .with_context(|| format!("saving {} as {}", from.display(), to.display()))?;
        tracing::info!(from = %from.display(), to = %to.display(), "saved scratch file");
        Ok(to)
    }

    fn load_path(&self, path: &Path) -> Result<Vec<Point3<f32>>> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        codec::read_vertices(&mut BufReader::new(file))
            .with_context(|| format!("decoding {}", path.display()))
    }

    fn generate_into(&self, resolved: &Resolved, iterations: u32) -> Result<CachedVertices> {
        let generated = generator::generate_resolved(resolved, iterations, self.options)?;
        let path = self.path_for(&generated.file_name);
        self.write_atomic(&path, &generated.vertices)?;
        Ok(CachedVertices {
            system: generated.system,
            path,
            status: CacheStatus::Generated,
            vertices: generated.vertices,
        })
    }

    /// Writes through a temp file in the same directory so a reader never
    /// sees a partial file under the final name.
    fn write_atomic(&self, path: &Path, vertices: &[Point3<f32>]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating cache dir {}", self.dir.display()))?;
        let tmp_path = path.with_extension(format!("tmp-{}", rand::random::<usize>()));
        let written = File::create(&tmp_path)
            .with_context(|| format!("creating {}", tmp_path.display()))
            .and_then(|file| {
                let mut writer = BufWriter::new(file);
                codec::write_vertices(&mut writer, vertices)
            })
            .and_then(|_| {
                std::fs::rename(&tmp_path, path)
                    .with_context(|| format!("moving cache file into {}", path.display()))
            });
        if let Err(err) = written {
            // The temp file may or may not exist depending on where we failed.
            let _ = std::fs::remove_file(&tmp_path);
            return Err(err);
        }
        tracing::info!(path = %path.display(), vertices = vertices.len(), "wrote cache file");
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::l_system::Rule;

    #[test]
    fn test_named_entry_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);

        let first = cache.get_vertices(SystemId::DragonCurve.id(), 3).unwrap();
        assert_eq!(first.status, CacheStatus::Generated);
        assert_eq!(first.path, dir.path().join("dragon_curve_vertices3.bin"));
        assert!(first.path.exists());

        let second = cache.get_vertices(SystemId::DragonCurve.id(), 3).unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(second.vertices, first.vertices);
    }

    #[test]
    fn test_existing_named_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);
        let planted = vec![Point3::new(9.0, 9.0, 9.0), Point3::new(8.0, 8.0, 8.0)];
        std::fs::write(
            dir.path().join("crystals_vertices2.bin"),
            codec::encode(&planted),
        )
        .unwrap();

        let got = cache.get_vertices(SystemId::Crystals.id(), 2).unwrap();
        assert_eq!(got.status, CacheStatus::Hit);
        assert_eq!(got.vertices, planted);
    }

    #[test]
    fn test_corrupt_file_is_regenerated() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);
        let path = dir.path().join("hilbert_curve_vertices2.bin");
        std::fs::write(&path, [0u8; 13]).unwrap();

        let got = cache.get_vertices(SystemId::HilbertCurve.id(), 2).unwrap();
        assert_eq!(got.status, CacheStatus::Generated);
        assert_eq!(cache.load_file("hilbert_curve_vertices2.bin").unwrap(), got.vertices);
    }

    #[test]
    fn test_scratch_is_always_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);

        let line = LSystem::new("F", "F", 0.0).with_rule(Rule::new("F", "FF"));
        let first = cache.get_custom(line, 1).unwrap();
        assert_eq!(first.path, cache.scratch_path());
        assert_eq!(first.vertices.len(), 4);

        let again = cache.get_vertices(SystemId::Custom.id(), 1).unwrap();
        assert_eq!(again.status, CacheStatus::Generated);
        assert_eq!(again.path, cache.scratch_path());
        // 0 -> 0[0]0: three segments.
        assert_eq!(again.vertices.len(), 6);
        assert_eq!(cache.load_file(SCRATCH_FILE_NAME).unwrap(), again.vertices);
    }

    #[test]
    fn test_errors_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path().join("nested"), 4);

        let err = cache.get_vertices(99, 1).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LSystemError>(),
            Some(&LSystemError::UnknownSystem(99))
        );
        let err = cache.get_vertices(SystemId::FractalTree.id(), 5).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LSystemError>(),
            Some(&LSystemError::IterationLimit {
                requested: 5,
                limit: 4
            })
        );
        let broken = LSystem::new("F]", "F", 0.0);
        assert!(cache.get_custom(broken, 0).is_err());
        assert!(!cache.dir().exists());
    }

    fn leftovers(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.contains(".tmp-"))
            .collect()
    }

    #[test]
    fn test_no_temp_files_after_write() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);
        cache.get_vertices(SystemId::Snowflake1.id(), 2).unwrap();
        assert!(leftovers(dir.path()).is_empty());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);
        // A non-empty directory squatting on the target name makes the
        // final rename fail after the temp file was fully written.
        let blocker = dir.path().join("dragon_curve_vertices2.bin");
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), b"x").unwrap();

        assert!(cache.get_vertices(SystemId::DragonCurve.id(), 2).is_err());
        assert!(leftovers(dir.path()).is_empty(), "{:?}", leftovers(dir.path()));
        assert!(blocker.join("keep").exists());
    }

    #[test]
    fn test_save_scratch_under_given_name() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);
        let line = LSystem::new("F", "F", 0.0).with_rule(Rule::new("F", "FF"));
        let scratch = cache.get_custom(line, 2).unwrap();

        let saved = cache
            .save_scratch(Some("long_line.bin"), SystemId::Custom, 2)
            .unwrap();
        assert_eq!(saved, dir.path().join("long_line.bin"));
        assert!(!cache.scratch_path().exists());
        assert_eq!(cache.load_file("long_line.bin").unwrap(), scratch.vertices);
    }

    #[test]
    fn test_save_scratch_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);
        let scratch = cache.get_vertices(SystemId::Custom.id(), 2).unwrap();

        let saved = cache.save_scratch(Some("bush"), SystemId::Custom, 2).unwrap();
        assert_eq!(saved, dir.path().join("bush.bin"));
        assert_eq!(cache.load_file("bush.bin").unwrap(), scratch.vertices);
    }

    #[test]
    fn test_save_scratch_canonical_name_is_a_cache_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);
        let grammar = SystemId::Bushes1.grammar();
        let scratch = cache.get_custom(grammar, 2).unwrap();

        let saved = cache.save_scratch(None, SystemId::Bushes1, 2).unwrap();
        assert_eq!(
            saved,
            dir.path().join(catalog::canonical_file_name(SystemId::Bushes1, 2))
        );
        let got = cache.get_vertices(SystemId::Bushes1.id(), 2).unwrap();
        assert_eq!(got.status, CacheStatus::Hit);
        assert_eq!(got.vertices, scratch.vertices);
    }

    #[test]
    fn test_save_scratch_errors() {
        let dir = tempfile::tempdir().unwrap();
        let cache = VertexCache::new(dir.path(), 10);
        // Nothing generated yet.
        assert!(cache.save_scratch(Some("x"), SystemId::Custom, 1).is_err());

        cache.get_vertices(SystemId::Custom.id(), 1).unwrap();
        assert!(cache.save_scratch(None, SystemId::Custom, 1).is_err());
        assert!(cache.save_scratch(Some("../escape"), SystemId::Custom, 1).is_err());
        assert!(cache.save_scratch(Some(""), SystemId::Custom, 1).is_err());
        // Failed saves leave the scratch file in place.
        assert!(cache.scratch_path().exists());
    }

    #[test]
    fn test_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            cache_dir: dir.path().to_path_buf(),
            reject_empty: true,
            ..Config::default()
        };
        let cache = VertexCache::from_config(&config);
        let empty = LSystem::new("X", "F", 0.0);
        let err = cache.get_custom(empty, 0).unwrap_err();
        assert_eq!(
            err.downcast_ref::<LSystemError>(),
            Some(&LSystemError::EmptyResult)
        );
    }
}

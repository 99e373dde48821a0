//! Package manifest loading.
//!
//! A manifest lists packages and their direct dependencies:
//!
//! ```json
//! { "packages": [ { "name": "app", "dependencies": ["lib"] } ] }
//! ```
//!
//! JSON, YAML and TOML (`[[packages]]`) spellings are accepted, chosen by
//! file extension.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::graph::DependencyGraph;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {0}")]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse manifest at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse manifest at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to parse manifest at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("unsupported manifest format: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("package entry {index} has an empty name")]
    EmptyName { index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    pub packages: Vec<PackageEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageEntry {
    pub name: String,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Json,
    Yaml,
    Toml,
}

impl ManifestFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            None | Some("json") => Some(ManifestFormat::Json),
            Some("yaml") | Some("yml") => Some(ManifestFormat::Yaml),
            Some("toml") => Some(ManifestFormat::Toml),
            Some(_) => None,
        }
    }
}

impl Manifest {
    /// Names declared by more than one entry, in first-seen order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for entry in &self.packages {
            if !seen.insert(entry.name.as_str()) && !duplicates.contains(&entry.name.as_str()) {
                duplicates.push(entry.name.as_str());
            }
        }
        duplicates
    }
}

pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    if !path.is_file() {
        return Err(ManifestError::NotFound(path.to_path_buf()));
    }
    let format = ManifestFormat::from_path(path)
        .ok_or_else(|| ManifestError::UnsupportedFormat(path.to_path_buf()))?;
    let contents = std::fs::read_to_string(path)?;
    parse_manifest(path, &contents, format)
}

pub fn parse_manifest(
    path: &Path,
    contents: &str,
    format: ManifestFormat,
) -> Result<Manifest, ManifestError> {
    let manifest: Manifest = match format {
        ManifestFormat::Json => {
            serde_json::from_str(contents).map_err(|source| ManifestError::Json {
                path: path.to_path_buf(),
                source,
            })?
        }
        ManifestFormat::Yaml => {
            serde_yaml::from_str(contents).map_err(|source| ManifestError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        }
        ManifestFormat::Toml => toml::from_str(contents).map_err(|source| ManifestError::Toml {
            path: path.to_path_buf(),
            source,
        })?,
    };

    if let Some(index) = manifest
        .packages
        .iter()
        .position(|entry| entry.name.trim().is_empty())
    {
        return Err(ManifestError::EmptyName { index });
    }
    Ok(manifest)
}

/// One vertex per entry, then one edge per listed dependency, in file order.
pub fn build_graph(manifest: &Manifest) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for entry in &manifest.packages {
        graph.add_vertex(&entry.name);
        for dep in &entry.dependencies {
            graph.add_edge(&entry.name, dep);
        }
    }
    graph
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::{build_graph, load_manifest, parse_manifest, ManifestError, ManifestFormat};

    const EXAMPLE_JSON: &str = r#"{
  "packages": [
    { "name": "p1", "dependencies": ["p2", "p3", "p4"] },
    { "name": "p2", "dependencies": ["p5"] },
    { "name": "p3", "dependencies": ["p6", "p7"] },
    { "name": "p4", "dependencies": ["p2", "p3"] }
  ]
}"#;

    fn unique_temp_dir(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("pkgorder-{prefix}-{pid}-{nanos}"))
    }

    #[test]
    fn json_manifest_builds_graph_in_file_order() {
        let manifest = parse_manifest(Path::new("example.json"), EXAMPLE_JSON, ManifestFormat::Json)
            .expect("parse example");
        let graph = build_graph(&manifest);

        assert_eq!(graph.order(), 7);
        assert_eq!(graph.size(), 8);
        assert_eq!(graph.vertices()[..4], ["p1", "p2", "p3", "p4"]);
        assert_eq!(
            graph.adjacent_vertices_of("p4").expect("p4 deps"),
            ["p2", "p3"]
        );
        assert_eq!(graph.adjacent_vertices_of("p7").expect("p7 deps").len(), 0);
    }

    #[test]
    fn yaml_and_toml_manifests_parse_the_same_shape() {
        let yaml = "packages:\n  - name: app\n    dependencies: [lib]\n  - name: lib\n    dependencies: []\n";
        let toml_src = "[[packages]]\nname = \"app\"\ndependencies = [\"lib\"]\n\n[[packages]]\nname = \"lib\"\ndependencies = []\n";

        let from_yaml = parse_manifest(Path::new("deps.yaml"), yaml, ManifestFormat::Yaml)
            .expect("parse yaml");
        let from_toml = parse_manifest(Path::new("deps.toml"), toml_src, ManifestFormat::Toml)
            .expect("parse toml");
        assert_eq!(from_yaml, from_toml);
        assert_eq!(from_yaml.packages[0].dependencies, ["lib"]);
    }

    #[test]
    fn missing_dependencies_field_fails_fast() {
        let err = parse_manifest(
            Path::new("broken.json"),
            r#"{"packages": [{"name": "a"}]}"#,
            ManifestFormat::Json,
        )
        .expect_err("dependencies are required");
        assert!(matches!(err, ManifestError::Json { .. }));
    }

    #[test]
    fn empty_package_name_is_rejected() {
        let err = parse_manifest(
            Path::new("broken.json"),
            r#"{"packages": [{"name": "a", "dependencies": []}, {"name": " ", "dependencies": []}]}"#,
            ManifestFormat::Json,
        )
        .expect_err("empty name");
        assert!(matches!(err, ManifestError::EmptyName { index: 1 }));
    }

    #[test]
    fn repeated_entries_merge_dependencies() {
        let manifest = parse_manifest(
            Path::new("dup.json"),
            r#"{"packages": [
                {"name": "a", "dependencies": ["b"]},
                {"name": "a", "dependencies": ["b", "c"]}
            ]}"#,
            ManifestFormat::Json,
        )
        .expect("parse");
        assert_eq!(manifest.duplicate_names(), ["a"]);
        let graph = build_graph(&manifest);
        assert_eq!(graph.order(), 3);
        assert_eq!(graph.adjacent_vertices_of("a").expect("a deps"), ["b", "c"]);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(
            ManifestFormat::from_path(Path::new("x.JSON")),
            Some(ManifestFormat::Json)
        );
        assert_eq!(
            ManifestFormat::from_path(Path::new("x.yml")),
            Some(ManifestFormat::Yaml)
        );
        assert_eq!(
            ManifestFormat::from_path(Path::new("x.toml")),
            Some(ManifestFormat::Toml)
        );
        assert_eq!(ManifestFormat::from_path(Path::new("x.xml")), None);
    }

    #[test]
    fn load_manifest_reads_file_and_reports_missing_path() {
        let root = unique_temp_dir("manifest-load");
        fs::create_dir_all(&root).expect("create root");
        let path = root.join("packages.json");
        fs::write(&path, EXAMPLE_JSON).expect("write manifest");

        let manifest = load_manifest(&path).expect("load manifest");
        assert_eq!(manifest.packages.len(), 4);

        let missing = root.join("absent.json");
        assert!(matches!(
            load_manifest(&missing),
            Err(ManifestError::NotFound(reported)) if reported == missing
        ));

        let _ = fs::remove_dir_all(root);
    }
}

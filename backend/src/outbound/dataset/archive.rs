//! Zip archive staging for packaged datasets.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::ZipArchive;

use crate::domain::ports::RegionDatasetSourceError;

/// Extracted archive contents; files are removed when dropped.
pub(super) struct StagedArchive {
    _staging: TempDir,
    /// Path of the single dataset member inside the staging directory.
    pub(super) dataset_path: PathBuf,
}

/// Extract `archive` into a temporary directory and locate its dataset.
///
/// Shapefiles take precedence over GeoJSON members; exactly one candidate of
/// the chosen kind must be present.
pub(super) fn stage_archive(archive: File) -> Result<StagedArchive, RegionDatasetSourceError> {
    let mut zip = ZipArchive::new(archive).map_err(|error| {
        RegionDatasetSourceError::decode(format!("invalid zip archive: {error}"))
    })?;
    let staging = tempfile::tempdir().map_err(|error| {
        RegionDatasetSourceError::read(format!("create staging directory: {error}"))
    })?;

    let mut extracted = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|error| {
            RegionDatasetSourceError::decode(format!("zip entry {index}: {error}"))
        })?;
        if entry.is_dir() {
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            return Err(RegionDatasetSourceError::decode(format!(
                "zip entry {} escapes the archive root",
                entry.name()
            )));
        };
        let target = staging.path().join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                RegionDatasetSourceError::read(format!("create {}: {error}", parent.display()))
            })?;
        }
        let mut output = File::create(&target).map_err(|error| {
            RegionDatasetSourceError::read(format!("create {}: {error}", target.display()))
        })?;
        std::io::copy(&mut entry, &mut output).map_err(|error| {
            RegionDatasetSourceError::decode(format!("extract {}: {error}", entry.name()))
        })?;
        extracted.push(target);
    }

    let dataset_path = select_dataset(&extracted)?;
    Ok(StagedArchive {
        _staging: staging,
        dataset_path,
    })
}

fn select_dataset(paths: &[PathBuf]) -> Result<PathBuf, RegionDatasetSourceError> {
    let with_extension = |wanted: &[&str]| {
        paths
            .iter()
            .filter(|path| has_extension(path, wanted))
            .collect::<Vec<_>>()
    };
    let shapefiles = with_extension(&["shp"]);
    let candidates = if shapefiles.is_empty() {
        with_extension(&["geojson", "json"])
    } else {
        shapefiles
    };

    match candidates.as_slice() {
        [single] => Ok((*single).clone()),
        [] => Err(RegionDatasetSourceError::unsupported(
            "archive contains no shapefile or GeoJSON member",
        )),
        many => Err(RegionDatasetSourceError::unsupported(format!(
            "archive contains {} candidate datasets; expected exactly one",
            many.len()
        ))),
    }
}

/// Case-insensitive extension check.
pub(super) fn has_extension(path: &Path, wanted: &[&str]) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            wanted
                .iter()
                .any(|candidate| extension.eq_ignore_ascii_case(candidate))
        })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rstest::rstest;
    use zip::write::SimpleFileOptions;

    use super::*;

    fn write_archive(dir: &Path, members: &[(&str, &str)]) -> PathBuf {
        let path = dir.join("bundle.zip");
        let file = File::create(&path).expect("create archive");
        let mut writer = zip::ZipWriter::new(file);
        for (name, body) in members {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start member");
            writer.write_all(body.as_bytes()).expect("write member");
        }
        writer.finish().expect("finish archive");
        path
    }

    #[rstest]
    fn stages_single_geojson_member() {
        let dir = tempfile::tempdir().expect("temp dir");
        let archive = write_archive(dir.path(), &[
            ("data/counties.geojson", r#"{"type":"FeatureCollection","features":[]}"#),
            ("README.txt", "county boundaries"),
        ]);

        let staged = stage_archive(File::open(archive).expect("open archive")).expect("staged");

        assert!(staged.dataset_path.ends_with("data/counties.geojson"));
        assert!(staged.dataset_path.is_file());
    }

    #[rstest]
    fn shapefiles_take_precedence_over_geojson() {
        let paths = vec![
            PathBuf::from("/stage/extra.geojson"),
            PathBuf::from("/stage/tl_2023_us_county.SHP"),
            PathBuf::from("/stage/tl_2023_us_county.dbf"),
        ];
        assert_eq!(
            select_dataset(&paths).expect("one shapefile"),
            PathBuf::from("/stage/tl_2023_us_county.SHP")
        );
    }

    #[rstest]
    #[case::empty(vec![PathBuf::from("/stage/readme.txt")])]
    #[case::ambiguous(vec![PathBuf::from("/stage/a.shp"), PathBuf::from("/stage/b.shp")])]
    fn rejects_archives_without_exactly_one_dataset(#[case] paths: Vec<PathBuf>) {
        let error = select_dataset(&paths).expect_err("selection should fail");
        assert!(matches!(error, RegionDatasetSourceError::Unsupported { .. }));
    }

    #[rstest]
    fn rejects_non_zip_input() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("broken.zip");
        std::fs::write(&path, b"plain text").expect("write file");

        let error = stage_archive(File::open(path).expect("open file"))
            .err()
            .expect("not a zip");
        assert!(matches!(error, RegionDatasetSourceError::Decode { .. }));
    }
}

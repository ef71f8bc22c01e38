//! ASCII point clouds: one `X Y Z` row per point.
//!
//! Fields are separated by whitespace, commas or semicolons. Extra columns
//! are ignored. Lines starting with `#` or `//` are comments, and a lone
//! integer before the first point (the PTS point count) is skipped.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use sio_filter::{filter_extensions, FormatHandler, HandlerResult};
use sio_shift::GlobalShiftManager;
use sio_types::{Entity, ErrorCode, LoadParameters, PointCloud, SaveParameters, Vector3};
use tracing::{debug, info, warn};

const FILTER: &str = "ASCII cloud (*.txt *.asc *.xyz *.pts)";

/// Name given to the loaded cloud. The dispatcher replaces the placeholder
/// with the file's base name.
const CLOUD_NAME: &str = "unnamed - Cloud";

/// Handler for ASCII point clouds.
///
/// Coordinates are read in double precision and stored in single precision,
/// so the first point of every file goes through the [`GlobalShiftManager`].
#[derive(Clone)]
pub struct AsciiCloudFilter {
    shift: Arc<GlobalShiftManager>,
}

impl AsciiCloudFilter {
    pub fn new(shift: Arc<GlobalShiftManager>) -> Self {
        Self { shift }
    }

    fn start_cloud(&self, first: Vector3, params: &mut LoadParameters) -> PointCloud {
        let decision = self.shift.handle(first, 0.0, params, None);
        if decision.applied {
            info!(shift = %decision.shift, "applying global shift to ASCII cloud");
            PointCloud::with_shift(decision.shift)
        } else {
            PointCloud::new()
        }
    }
}

fn split_fields(row: &str) -> Vec<&str> {
    row.split(|c: char| c.is_whitespace() || c == ',' || c == ';')
        .filter(|f| !f.is_empty())
        .collect()
}

fn parse_point(fields: &[&str]) -> Option<Vector3> {
    let [x, y, z] = match fields {
        [x, y, z, ..] => [x, y, z].map(|f| f.parse::<f64>().ok()),
        _ => return None,
    };
    let point = Vector3::new(x?, y?, z?);
    point.to_array().iter().all(|c| c.is_finite()).then_some(point)
}

impl FormatHandler for AsciiCloudFilter {
    fn file_filters(&self, _for_load: bool) -> Vec<String> {
        vec![FILTER.to_string()]
    }

    fn default_extension(&self) -> &str {
        "asc"
    }

    fn can_load_extension(&self, upper_ext: &str) -> bool {
        filter_extensions(FILTER).iter().any(|e| e == upper_ext)
    }

    fn name(&self) -> String {
        "ASCII".to_string()
    }

    fn load_file(
        &self,
        path: &Path,
        container: &mut Entity,
        params: &mut LoadParameters,
    ) -> HandlerResult<()> {
        let file = File::open(path).map_err(|err| {
            warn!(path = %path.display(), %err, "cannot open ASCII file");
            ErrorCode::Reading
        })?;

        let mut cloud: Option<PointCloud> = None;
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|err| {
                warn!(path = %path.display(), %err, "read error");
                ErrorCode::Reading
            })?;
            let row = line.trim();
            if row.is_empty() || row.starts_with('#') || row.starts_with("//") {
                continue;
            }

            let fields = split_fields(row);
            if cloud.is_none() && fields.len() == 1 && fields[0].parse::<u64>().is_ok() {
                continue;
            }

            let point = parse_point(&fields).ok_or_else(|| {
                warn!(path = %path.display(), line = index + 1, "expected at least 3 numeric fields");
                ErrorCode::MalformedFile
            })?;
            cloud
                .get_or_insert_with(|| self.start_cloud(point, params))
                .push_global(point);
        }

        let Some(cloud) = cloud else {
            return Err(ErrorCode::NoLoad.into());
        };
        debug!(path = %path.display(), points = cloud.len(), "ASCII cloud parsed");
        container.add_child(Entity::point_cloud(CLOUD_NAME, cloud));
        Ok(())
    }

    fn save_file(
        &self,
        entity: &Entity,
        path: &Path,
        _params: &SaveParameters,
    ) -> HandlerResult<()> {
        let clouds: Vec<&PointCloud> = entity
            .descendants()
            .filter_map(Entity::as_point_cloud)
            .collect();
        let cloud = match clouds.as_slice() {
            [cloud] => *cloud,
            [] => return Err(ErrorCode::BadEntityType.into()),
            _ => {
                warn!(clouds = clouds.len(), "ASCII files hold exactly one cloud");
                return Err(ErrorCode::BadEntityType.into());
            }
        };
        if cloud.is_empty() {
            return Err(ErrorCode::NoSave.into());
        }

        let file = File::create(path).map_err(|err| {
            warn!(path = %path.display(), %err, "cannot create ASCII file");
            ErrorCode::Writing
        })?;
        let mut out = BufWriter::new(file);
        let written: std::io::Result<()> = (0..cloud.len())
            .filter_map(|i| cloud.global_point(i))
            .try_for_each(|p| writeln!(out, "{} {} {}", p.x, p.y, p.z));
        written.and_then(|()| out.flush()).map_err(|err| {
            warn!(path = %path.display(), %err, "cannot write ASCII file");
            ErrorCode::Writing
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sio_shift::ShiftConfig;
    use sio_types::ShiftHandlingMode;

    fn filter() -> AsciiCloudFilter {
        AsciiCloudFilter::new(Arc::new(GlobalShiftManager::with_policy(ShiftConfig::default())))
    }

    fn load(content: &str, params: &mut LoadParameters) -> HandlerResult<Entity> {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cloud.xyz");
        std::fs::write(&path, content).unwrap();
        let mut container = Entity::group("");
        filter().load_file(&path, &mut container, params)?;
        Ok(container)
    }

    #[test]
    fn parses_separators_comments_and_count_header() {
        let content = "# survey\n3\n1 2 3\n4,5,6\n7;8;9 255 0 0\n// done\n";
        let container = load(content, &mut LoadParameters::default()).unwrap();

        assert_eq!(container.child_count(), 1);
        let child = &container.children()[0];
        assert_eq!(child.name(), "unnamed - Cloud");
        let cloud = child.as_point_cloud().unwrap();
        assert_eq!(cloud.points, vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        assert!(!cloud.is_shifted());
    }

    #[test]
    fn large_coordinates_are_shifted_and_remembered() {
        let mut params = LoadParameters::with_shift_storage(ShiftHandlingMode::ApplyAndRemember);
        let content = "501234.56 4200111.25 10.0\n501240.00 4200120.00 12.5\n";
        let container = load(content, &mut params).unwrap();

        let cloud = container.children()[0].as_point_cloud().unwrap();
        let expected_shift = Vector3::new(-501_200.0, -4_200_100.0, 0.0);
        assert_eq!(cloud.global_shift, expected_shift);
        assert_eq!(params.active_shift(), Some(expected_shift));

        let global = cloud.global_point(0).unwrap();
        assert!((global.x - 501_234.56).abs() < 1e-3);
        assert!((global.y - 4_200_111.25).abs() < 1e-3);
    }

    #[test]
    fn never_mode_keeps_raw_coordinates() {
        let mut params = LoadParameters::with_shift_storage(ShiftHandlingMode::Never);
        let container = load("501234.56 4200111.25 10.0\n", &mut params).unwrap();
        let cloud = container.children()[0].as_point_cloud().unwrap();
        assert!(!cloud.is_shifted());
        assert_eq!(params.active_shift(), None);
    }

    #[test]
    fn comment_only_file_is_nothing_to_load() {
        let err = load("# nothing\n\n", &mut LoadParameters::default()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NoLoad));
    }

    #[test]
    fn bad_row_is_malformed() {
        let err = load("1 2 3\n1 2 x\n", &mut LoadParameters::default()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MalformedFile));
        let err = load("1 2\n", &mut LoadParameters::default()).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::MalformedFile));
    }

    #[test]
    fn save_writes_global_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.asc");
        let mut cloud = PointCloud::with_shift(Vector3::new(-500_000.0, 0.0, 0.0));
        cloud.push_global(Vector3::new(500_001.0, 2.0, 3.0));
        let mut root = Entity::group("root");
        root.add_child(Entity::point_cloud("c", cloud));

        filter()
            .save_file(&root, &path, &SaveParameters::default())
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "500001 2 3\n");
    }

    #[test]
    fn save_requires_exactly_one_non_empty_cloud() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.asc");
        let params = SaveParameters::default();

        let err = filter().save_file(&Entity::group("g"), &path, &params).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadEntityType));

        let empty = Entity::point_cloud("c", PointCloud::new());
        let err = filter().save_file(&empty, &path, &params).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::NoSave));

        let mut two = Entity::group("g");
        two.add_child(Entity::point_cloud("a", PointCloud::new()));
        two.add_child(Entity::point_cloud("b", PointCloud::new()));
        let err = filter().save_file(&two, &path, &params).unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::BadEntityType));
    }

    #[test]
    fn accepts_all_advertised_extensions() {
        let f = filter();
        for ext in ["TXT", "ASC", "XYZ", "PTS"] {
            assert!(f.can_load_extension(ext));
        }
        assert!(!f.can_load_extension("SIO"));
    }
}

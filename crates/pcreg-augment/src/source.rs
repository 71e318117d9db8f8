use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

#[cfg(feature = "hdf5")]
use pcreg_3d::io::h5::read_hdf5_shapes;
use pcreg_3d::{
    io::{kitti::read_kitti_bin, npz::read_npz_fragment, ply::read_ply_binary},
    pointcloud::PointCloud,
};

use crate::DatasetError;

/// ModelNet40 categories with a label below this value form the seen half.
pub const MODELNET_SEEN_CATEGORIES: u32 = 20;

/// A read-only, indexable collection of point clouds.
pub trait PointCloudSource: Send + Sync {
    /// Number of point clouds.
    fn len(&self) -> usize;

    /// Whether the source holds no point clouds.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Load the point cloud at `index`.
    fn load(&self, index: usize) -> Result<PointCloud, DatasetError>;
}

/// Dataset partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// Training partition.
    Train,
    /// Test partition.
    Test,
    /// Validation partition.
    Val,
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Split::Train => "train",
            Split::Test => "test",
            Split::Val => "val",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Split {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "train" | "training" => Ok(Split::Train),
            "test" | "testing" => Ok(Split::Test),
            "val" | "validation" => Ok(Split::Val),
            _ => Err(DatasetError::UnknownName(s.to_string())),
        }
    }
}

/// The supported datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatasetKind {
    /// ModelNet40 CAD shapes.
    #[serde(rename = "modelnet40")]
    ModelNet40,
    /// 3DMatch RGB-D scene fragments.
    #[serde(rename = "3dmatch")]
    ThreeDMatch,
    /// KITTI object detection velodyne scans.
    #[serde(rename = "kitti-object")]
    KittiObject,
    /// KITTI tracking velodyne scans.
    #[serde(rename = "kitti-tracking")]
    KittiTracking,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DatasetKind::ModelNet40 => "modelnet40",
            DatasetKind::ThreeDMatch => "3dmatch",
            DatasetKind::KittiObject => "kitti-object",
            DatasetKind::KittiTracking => "kitti-tracking",
        };
        write!(f, "{name}")
    }
}

impl FromStr for DatasetKind {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "modelnet40" | "modelnet" => Ok(DatasetKind::ModelNet40),
            "3dmatch" | "threedmatch" => Ok(DatasetKind::ThreeDMatch),
            "kitti-object" | "kitti" => Ok(DatasetKind::KittiObject),
            "kitti-tracking" => Ok(DatasetKind::KittiTracking),
            _ => Err(DatasetError::UnknownName(s.to_string())),
        }
    }
}

/// List the files of `dir` with extension `ext`, sorted by path.
///
/// A missing directory yields an empty list.
fn list_files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, DatasetError> {
    if !dir.is_dir() {
        log::warn!("skipping missing directory {}", dir.display());
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == ext) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Sorted subdirectories of `dir`.
fn list_dirs(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn check_index(index: usize, len: usize) -> Result<(), DatasetError> {
    if index >= len {
        return Err(DatasetError::IndexOutOfRange { index, len });
    }
    Ok(())
}

fn modelnet_partition(split: Split) -> Result<&'static str, DatasetError> {
    match split {
        Split::Train => Ok("train"),
        Split::Test => Ok("test"),
        Split::Val => Err(DatasetError::UnknownSplit {
            dataset: "modelnet40",
            split,
        }),
    }
}

/// The `ply_data_<split>*.h5` files directly under `root`, sorted.
fn hdf5_partition_files(root: &Path, split: Split) -> Result<Vec<PathBuf>, DatasetError> {
    let prefix = format!("ply_data_{}", modelnet_partition(split)?);
    let files = list_files(root, "h5")?
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(&prefix))
        })
        .collect();
    Ok(files)
}

#[derive(Debug, Clone)]
enum Shapes {
    Memory(Vec<PointCloud>),
    Files(Vec<PathBuf>),
}

/// ModelNet40 shapes with their category labels.
#[derive(Debug, Clone)]
pub struct ModelNet40 {
    shapes: Shapes,
    labels: Vec<u32>,
    split: Split,
}

impl ModelNet40 {
    /// Wrap shapes already held in memory.
    pub fn from_arrays(
        clouds: Vec<PointCloud>,
        labels: Vec<u32>,
        split: Split,
    ) -> Result<Self, DatasetError> {
        if clouds.len() != labels.len() {
            return Err(DatasetError::LabelMismatch {
                clouds: clouds.len(),
                labels: labels.len(),
            });
        }
        Ok(Self {
            shapes: Shapes::Memory(clouds),
            labels,
            split,
        })
    }

    /// Index `root` as the HDF5 release when it holds `ply_data_<split>*.h5`
    /// files, as a PLY tree otherwise.
    pub fn open(root: impl AsRef<Path>, split: Split) -> Result<Self, DatasetError> {
        let root = root.as_ref();
        if hdf5_partition_files(root, split)?.is_empty() {
            return Self::from_ply_dir(root, split);
        }

        #[cfg(feature = "hdf5")]
        {
            Self::from_hdf5_dir(root, split)
        }
        #[cfg(not(feature = "hdf5"))]
        {
            Err(DatasetError::FeatureDisabled("hdf5"))
        }
    }

    /// Load the shapes of every `<root>/ply_data_<split>*.h5` file into memory.
    ///
    /// Files are read in sorted order and their shapes concatenated.
    #[cfg(feature = "hdf5")]
    pub fn from_hdf5_dir(root: impl AsRef<Path>, split: Split) -> Result<Self, DatasetError> {
        let root = root.as_ref();
        let files = hdf5_partition_files(root, split)?;
        if files.is_empty() {
            return Err(DatasetError::EmptySplit(root.to_path_buf()));
        }

        let mut clouds = Vec::new();
        let mut labels = Vec::new();
        for file in &files {
            let shapes = read_hdf5_shapes(file)?;
            clouds.extend(shapes.clouds);
            labels.extend(shapes.labels);
        }
        log::debug!(
            "loaded {} modelnet40 {split} shapes from {} files",
            clouds.len(),
            files.len()
        );

        Self::from_arrays(clouds, labels, split)
    }

    /// Index the PLY files under `<root>/<category>/<split>/*.ply`.
    ///
    /// Labels are assigned by sorted category name, so the layout
    /// must contain every category even when one has no file for this split.
    pub fn from_ply_dir(root: impl AsRef<Path>, split: Split) -> Result<Self, DatasetError> {
        let root = root.as_ref();
        let partition = modelnet_partition(split)?;

        let mut files = Vec::new();
        let mut labels = Vec::new();
        for (label, category) in list_dirs(root)?.iter().enumerate() {
            let shapes = list_files(&category.join(partition), "ply")?;
            labels.extend(std::iter::repeat(label as u32).take(shapes.len()));
            files.extend(shapes);
        }

        if files.is_empty() {
            return Err(DatasetError::EmptySplit(root.to_path_buf()));
        }
        log::debug!("indexed {} modelnet40 {split} shapes", files.len());

        Ok(Self {
            shapes: Shapes::Files(files),
            labels,
            split,
        })
    }

    /// Keep the seen categories for training and the unseen ones for testing.
    pub fn with_unseen(self) -> Self {
        let split = self.split;
        self.retain(|label| match split {
            Split::Train => label < MODELNET_SEEN_CATEGORIES,
            Split::Test => label >= MODELNET_SEEN_CATEGORIES,
            Split::Val => true,
        })
    }

    /// Keep only the shapes of one category.
    pub fn with_single_category(self, label: u32) -> Self {
        self.retain(|l| l == label)
    }

    /// Category label of every shape.
    pub fn labels(&self) -> &[u32] {
        &self.labels
    }

    /// The partition this source was built for.
    pub fn split(&self) -> Split {
        self.split
    }

    fn retain(self, keep: impl Fn(u32) -> bool) -> Self {
        let mask = self.labels.iter().map(|&l| keep(l)).collect::<Vec<_>>();
        let shapes = match self.shapes {
            Shapes::Memory(clouds) => Shapes::Memory(filter_by_mask(clouds, &mask)),
            Shapes::Files(files) => Shapes::Files(filter_by_mask(files, &mask)),
        };
        Self {
            shapes,
            labels: filter_by_mask(self.labels, &mask),
            split: self.split,
        }
    }
}

fn filter_by_mask<T>(items: Vec<T>, mask: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(mask)
        .filter_map(|(item, &keep)| keep.then_some(item))
        .collect()
}

impl PointCloudSource for ModelNet40 {
    fn len(&self) -> usize {
        self.labels.len()
    }

    fn load(&self, index: usize) -> Result<PointCloud, DatasetError> {
        check_index(index, self.len())?;
        match &self.shapes {
            Shapes::Memory(clouds) => Ok(clouds[index].clone()),
            Shapes::Files(files) => Ok(read_ply_binary(&files[index])?),
        }
    }
}

/// 3DMatch scene fragments stored as `<root>/<scene>*.npz`.
#[derive(Debug, Clone)]
pub struct ThreeDMatch {
    files: Vec<PathBuf>,
}

impl ThreeDMatch {
    /// Index the fragments of every scene listed in `split_file`.
    ///
    /// The split file holds whitespace separated scene prefixes; fragments are
    /// gathered in listing order, sorted within a scene.
    pub fn new(root: impl AsRef<Path>, split_file: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let root = root.as_ref();
        let scenes = std::fs::read_to_string(split_file)?;
        let fragments = list_files(root, "npz")?;

        let mut files = Vec::new();
        for scene in scenes.split_whitespace() {
            let matched = fragments.iter().filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(scene))
            });
            files.extend(matched.cloned());
        }

        if files.is_empty() {
            return Err(DatasetError::EmptySplit(root.to_path_buf()));
        }
        log::debug!("indexed {} 3dmatch fragments", files.len());

        Ok(Self { files })
    }

    /// Index a split using the list at `<root>/split/<split>_3dmatch.txt`.
    pub fn from_split(root: impl AsRef<Path>, split: Split) -> Result<Self, DatasetError> {
        let root = root.as_ref();
        if split == Split::Test {
            return Err(DatasetError::UnknownSplit {
                dataset: "3dmatch",
                split,
            });
        }
        let split_file = root.join("split").join(format!("{split}_3dmatch.txt"));
        Self::new(root, split_file)
    }

    /// Paths of the indexed fragments.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }
}

impl PointCloudSource for ThreeDMatch {
    fn len(&self) -> usize {
        self.files.len()
    }

    fn load(&self, index: usize) -> Result<PointCloud, DatasetError> {
        check_index(index, self.len())?;
        Ok(read_npz_fragment(&self.files[index])?)
    }
}

/// Directory layout of a KITTI benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KittiVariant {
    /// Scans directly under `velodyne/`.
    Object,
    /// Scans grouped by sequence under `velodyne/<sequence>/`.
    Tracking,
}

/// KITTI velodyne scans under `<root>/{training,testing}/velodyne`.
#[derive(Debug, Clone)]
pub struct Kitti {
    variant: KittiVariant,
    files: Vec<PathBuf>,
}

impl Kitti {
    /// Index the scans of a split.
    pub fn new(
        root: impl AsRef<Path>,
        split: Split,
        variant: KittiVariant,
    ) -> Result<Self, DatasetError> {
        let partition = match split {
            Split::Train => "training",
            Split::Test => "testing",
            Split::Val => {
                return Err(DatasetError::UnknownSplit {
                    dataset: "kitti",
                    split,
                })
            }
        };
        let dir = root.as_ref().join(partition).join("velodyne");

        let files = match variant {
            KittiVariant::Object => list_files(&dir, "bin")?,
            KittiVariant::Tracking => {
                let mut files = Vec::new();
                if dir.is_dir() {
                    for sequence in list_dirs(&dir)? {
                        files.extend(list_files(&sequence, "bin")?);
                    }
                }
                files
            }
        };

        if files.is_empty() {
            return Err(DatasetError::EmptySplit(dir));
        }
        log::debug!("indexed {} kitti {variant:?} scans", files.len());

        Ok(Self { variant, files })
    }

    /// The directory layout this source was indexed with.
    pub fn variant(&self) -> KittiVariant {
        self.variant
    }
}

impl PointCloudSource for Kitti {
    fn len(&self) -> usize {
        self.files.len()
    }

    fn load(&self, index: usize) -> Result<PointCloud, DatasetError> {
        check_index(index, self.len())?;
        Ok(read_kitti_bin(&self.files[index])?)
    }
}

/// One of the supported sources.
#[derive(Debug, Clone)]
pub enum DatasetSource {
    /// ModelNet40 shapes.
    ModelNet40(ModelNet40),
    /// 3DMatch fragments.
    ThreeDMatch(ThreeDMatch),
    /// KITTI object scans.
    KittiObject(Kitti),
    /// KITTI tracking scans.
    KittiTracking(Kitti),
}

impl DatasetSource {
    /// Index a dataset rooted at `root` with its default on-disk layout.
    pub fn open(kind: DatasetKind, root: impl AsRef<Path>, split: Split) -> Result<Self, DatasetError> {
        let root = root.as_ref();
        Ok(match kind {
            DatasetKind::ModelNet40 => Self::ModelNet40(ModelNet40::open(root, split)?),
            DatasetKind::ThreeDMatch => Self::ThreeDMatch(ThreeDMatch::from_split(root, split)?),
            DatasetKind::KittiObject => {
                Self::KittiObject(Kitti::new(root, split, KittiVariant::Object)?)
            }
            DatasetKind::KittiTracking => {
                Self::KittiTracking(Kitti::new(root, split, KittiVariant::Tracking)?)
            }
        })
    }

    /// Which dataset this source reads.
    pub fn kind(&self) -> DatasetKind {
        match self {
            Self::ModelNet40(_) => DatasetKind::ModelNet40,
            Self::ThreeDMatch(_) => DatasetKind::ThreeDMatch,
            Self::KittiObject(_) => DatasetKind::KittiObject,
            Self::KittiTracking(_) => DatasetKind::KittiTracking,
        }
    }

    fn inner(&self) -> &dyn PointCloudSource {
        match self {
            Self::ModelNet40(s) => s,
            Self::ThreeDMatch(s) => s,
            Self::KittiObject(s) | Self::KittiTracking(s) => s,
        }
    }
}

impl PointCloudSource for DatasetSource {
    fn len(&self) -> usize {
        self.inner().len()
    }

    fn load(&self, index: usize) -> Result<PointCloud, DatasetError> {
        self.inner().load(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use npyz::{npz::NpzWriter, WriterBuilder};
    use std::io::Write;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn write_ply(path: &Path, points: &[[f32; 3]]) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        write!(
            file,
            "ply\nformat binary_little_endian 1.0\nelement vertex {}\nproperty float x\nproperty float y\nproperty float z\nend_header\n",
            points.len()
        )?;
        for p in points {
            for v in p {
                file.write_all(&v.to_le_bytes())?;
            }
        }
        Ok(())
    }

    fn write_npz(path: &Path, points: &[[f32; 3]]) -> Result<(), Box<dyn std::error::Error>> {
        let mut npz = NpzWriter::create(path)?;
        let mut writer = npz
            .array::<f32>("pcd", Default::default())?
            .default_dtype()
            .shape(&[points.len() as u64, 3])
            .begin_nd()?;
        writer.extend(points.iter().flatten().copied())?;
        writer.finish()?;
        Ok(())
    }

    fn write_bin(path: &Path, points: &[[f32; 4]]) -> std::io::Result<()> {
        let bytes = points
            .iter()
            .flat_map(|p| p.iter().flat_map(|v| v.to_le_bytes()))
            .collect::<Vec<u8>>();
        std::fs::write(path, bytes)
    }

    #[test]
    fn test_split_and_kind_parse() -> TestResult {
        assert_eq!("train".parse::<Split>()?, Split::Train);
        assert_eq!("Testing".parse::<Split>()?, Split::Test);
        assert_eq!(Split::Val.to_string(), "val");
        assert!("dev".parse::<Split>().is_err());

        assert_eq!("3dmatch".parse::<DatasetKind>()?, DatasetKind::ThreeDMatch);
        assert_eq!("kitti_tracking".parse::<DatasetKind>()?, DatasetKind::KittiTracking);
        assert_eq!(DatasetKind::KittiObject.to_string(), "kitti-object");
        assert_eq!(serde_json::to_string(&DatasetKind::ModelNet40)?, "\"modelnet40\"");
        Ok(())
    }

    #[test]
    fn test_modelnet_from_arrays_filters() -> TestResult {
        let clouds = (0..40)
            .map(|i| PointCloud::new(vec![[i as f64, 0.0, 0.0]], None, None))
            .collect::<Vec<_>>();
        let labels = (0..40).collect::<Vec<u32>>();

        let train = ModelNet40::from_arrays(clouds.clone(), labels.clone(), Split::Train)?.with_unseen();
        assert_eq!(train.len(), 20);
        assert!(train.labels().iter().all(|&l| l < 20));

        let test = ModelNet40::from_arrays(clouds.clone(), labels.clone(), Split::Test)?.with_unseen();
        assert_eq!(test.len(), 20);
        assert_eq!(test.load(0)?.points()[0], [20.0, 0.0, 0.0]);

        let single = ModelNet40::from_arrays(clouds, labels, Split::Test)?.with_single_category(7);
        assert_eq!(single.len(), 1);
        assert_eq!(single.load(0)?.points()[0], [7.0, 0.0, 0.0]);
        assert!(matches!(
            single.load(1),
            Err(DatasetError::IndexOutOfRange { index: 1, len: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_modelnet_label_mismatch() {
        let clouds = vec![PointCloud::new(vec![[0.0; 3]], None, None)];
        assert!(matches!(
            ModelNet40::from_arrays(clouds, vec![], Split::Train),
            Err(DatasetError::LabelMismatch { clouds: 1, labels: 0 })
        ));
    }

    #[test]
    fn test_modelnet_from_ply_dir() -> TestResult {
        let root = tempfile::tempdir()?;
        for category in ["airplane", "bathtub"] {
            let dir = root.path().join(category).join("train");
            std::fs::create_dir_all(&dir)?;
            write_ply(&dir.join("b.ply"), &[[1.0, 2.0, 3.0]])?;
            write_ply(&dir.join("a.ply"), &[[0.0, 0.0, 0.0], [1.0, 1.0, 1.0]])?;
        }

        let source = ModelNet40::from_ply_dir(root.path(), Split::Train)?;
        assert_eq!(source.len(), 4);
        assert_eq!(source.labels(), &[0, 0, 1, 1]);
        // sorted within a category
        assert_eq!(source.load(0)?.len(), 2);
        assert_eq!(source.load(1)?.len(), 1);

        assert!(matches!(
            ModelNet40::from_ply_dir(root.path(), Split::Test),
            Err(DatasetError::EmptySplit(_))
        ));
        Ok(())
    }

    #[test]
    fn test_modelnet_open_layouts() -> TestResult {
        let root = tempfile::tempdir()?;
        let dir = root.path().join("chair").join("test");
        std::fs::create_dir_all(&dir)?;
        write_ply(&dir.join("chair_0001.ply"), &[[0.0, 0.0, 0.0]])?;

        let source = DatasetSource::open(DatasetKind::ModelNet40, root.path(), Split::Test)?;
        assert_eq!(source.kind(), DatasetKind::ModelNet40);
        assert_eq!(source.len(), 1);

        // partition files of the other split do not switch the layout
        std::fs::write(root.path().join("ply_data_train0.h5"), b"")?;
        assert_eq!(ModelNet40::open(root.path(), Split::Test)?.len(), 1);
        assert!(matches!(
            ModelNet40::open(root.path(), Split::Val),
            Err(DatasetError::UnknownSplit { .. })
        ));
        Ok(())
    }

    #[cfg(not(feature = "hdf5"))]
    #[test]
    fn test_modelnet_hdf5_needs_feature() -> TestResult {
        let root = tempfile::tempdir()?;
        std::fs::write(root.path().join("ply_data_train0.h5"), b"")?;
        assert!(matches!(
            ModelNet40::open(root.path(), Split::Train),
            Err(DatasetError::FeatureDisabled("hdf5"))
        ));
        Ok(())
    }

    #[cfg(feature = "hdf5")]
    #[test]
    fn test_modelnet_from_hdf5_dir() -> TestResult {
        let root = tempfile::tempdir()?;
        for (name, label) in [
            ("ply_data_train1.h5", 9u8),
            ("ply_data_train0.h5", 3),
            ("ply_data_test0.h5", 30),
        ] {
            let file = hdf5::File::create(root.path().join(name))?;
            file.new_dataset::<f32>()
                .shape((1, 2, 3))
                .create("data")?
                .write_raw(&[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0][..])?;
            file.new_dataset::<u8>()
                .shape((1, 1))
                .create("label")?
                .write_raw(&[label][..])?;
        }

        let source = ModelNet40::open(root.path(), Split::Train)?;
        assert_eq!(source.labels(), &[3, 9]);
        assert_eq!(source.load(1)?.points()[1], [3.0, 4.0, 5.0]);

        let unseen = ModelNet40::from_hdf5_dir(root.path(), Split::Test)?.with_unseen();
        assert_eq!(unseen.labels(), &[30]);
        Ok(())
    }

    #[test]
    fn test_threedmatch_split_file() -> TestResult {
        let root = tempfile::tempdir()?;
        for name in ["kitchen_000.npz", "kitchen_001.npz", "office_000.npz", "lab_000.npz"] {
            write_npz(&root.path().join(name), &[[0.0, 0.0, 0.0]])?;
        }
        write_ply(&root.path().join("office_001.ply"), &[[0.0, 0.0, 0.0]])?;
        std::fs::create_dir_all(root.path().join("split"))?;
        std::fs::write(root.path().join("split/train_3dmatch.txt"), "office\nkitchen\n")?;

        let source = ThreeDMatch::from_split(root.path(), Split::Train)?;
        let names = source
            .files()
            .iter()
            .filter_map(|p| p.file_name()?.to_str().map(str::to_string))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["office_000.npz", "kitchen_000.npz", "kitchen_001.npz"]);
        assert_eq!(source.load(2)?.len(), 1);

        assert!(matches!(
            ThreeDMatch::from_split(root.path(), Split::Test),
            Err(DatasetError::UnknownSplit { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_kitti_layouts() -> TestResult {
        let root = tempfile::tempdir()?;
        let object = root.path().join("training/velodyne");
        std::fs::create_dir_all(&object)?;
        write_bin(&object.join("000001.bin"), &[[1.0, 2.0, 3.0, 0.5]])?;
        write_bin(&object.join("000000.bin"), &[[0.0; 4], [1.0; 4]])?;

        let source = DatasetSource::open(DatasetKind::KittiObject, root.path(), Split::Train)?;
        assert_eq!(source.kind(), DatasetKind::KittiObject);
        assert_eq!(source.len(), 2);
        assert_eq!(source.load(0)?.len(), 2);
        assert_eq!(source.load(1)?.points(), &[[1.0, 2.0, 3.0]]);

        let tracking_root = tempfile::tempdir()?;
        for seq in ["0001", "0000"] {
            let dir = tracking_root.path().join("testing/velodyne").join(seq);
            std::fs::create_dir_all(&dir)?;
            write_bin(&dir.join("000000.bin"), &[[0.0; 4]])?;
        }
        let tracking = Kitti::new(tracking_root.path(), Split::Test, KittiVariant::Tracking)?;
        assert_eq!(tracking.len(), 2);
        assert_eq!(tracking.variant(), KittiVariant::Tracking);

        assert!(matches!(
            Kitti::new(tracking_root.path(), Split::Train, KittiVariant::Tracking),
            Err(DatasetError::EmptySplit(_))
        ));
        Ok(())
    }
}

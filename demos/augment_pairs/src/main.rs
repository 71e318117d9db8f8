use argh::FromArgs;
use std::path::PathBuf;

use pcreg::augment::{
    AugmentConfig, DatasetKind, DatasetSource, JitterConfig, OutlierConfig, RegistrationDataset,
    Sample, SampleRng, Split,
};
use pcreg::icp::{metrics::RegistrationMetrics, IcpConfig, IcpEstimator, RegistrationEstimator};
use pcreg::k3d::pointcloud::PointCloud;

#[derive(FromArgs)]
/// Draw registration pairs from a dataset and evaluate ICP on them
struct Args {
    /// dataset kind: modelnet40, 3dmatch, kitti-object or kitti-tracking
    #[argh(option)]
    dataset: DatasetKind,

    /// root directory of the dataset
    #[argh(option)]
    root: PathBuf,

    /// dataset split: train, test or val
    #[argh(option, default = "Split::Test")]
    split: Split,

    /// index of the first item
    #[argh(option, default = "0")]
    index: usize,

    /// number of consecutive items to evaluate
    #[argh(option, default = "1")]
    count: usize,

    /// seed of the augmentation, random when omitted
    #[argh(option)]
    seed: Option<u64>,

    /// path to a JSON augmentation config
    #[argh(option)]
    config: Option<PathBuf>,

    /// maximum Euler angle per axis in degrees
    #[argh(option)]
    max_angle: Option<f64>,

    /// maximum translation per axis
    #[argh(option)]
    max_translation: Option<f64>,

    /// add clipped gaussian jitter to the source
    #[argh(switch)]
    noise: bool,

    /// number of outliers added to the target
    #[argh(option)]
    outliers: Option<usize>,

    /// subsample the target to this many points
    #[argh(option)]
    subsample: Option<usize>,

    /// maximum number of ICP iterations
    #[argh(option, default = "50")]
    icp_iterations: usize,

    /// ICP correspondence rejection distance
    #[argh(option)]
    icp_threshold: Option<f64>,

    /// log the clouds to rerun
    #[argh(switch)]
    visualize: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => AugmentConfig::from_json_file(path)?,
        None => AugmentConfig::default(),
    };
    if let Some(max_angle) = args.max_angle {
        config.max_angle_deg = max_angle;
    }
    if let Some(max_translation) = args.max_translation {
        config.max_translation = max_translation;
    }
    if args.noise {
        config.noise.get_or_insert_with(JitterConfig::default);
    }
    if let Some(count) = args.outliers {
        config.outliers = Some(OutlierConfig {
            count,
            ..Default::default()
        });
    }
    if args.subsample.is_some() {
        config.num_subsampled_points = args.subsample;
    }

    let source = DatasetSource::open(args.dataset, &args.root, args.split)?;
    let dataset = RegistrationDataset::with_default_preprocess(source, config)?;
    println!("{} {}: #{} items", args.dataset, args.split, dataset.len());

    let estimator = IcpEstimator::new(IcpConfig {
        max_iterations: args.icp_iterations,
        max_correspondence_distance: args.icp_threshold,
        ..Default::default()
    });

    let rec = if args.visualize {
        Some(rerun::RecordingStreamBuilder::new("Registration pairs").spawn()?)
    } else {
        None
    };

    let mut metrics = RegistrationMetrics::new();
    let end = (args.index + args.count).min(dataset.len());
    for index in args.index..end {
        let mut rng = match args.seed {
            Some(seed) => SampleRng::for_index(seed, 0, index),
            None => SampleRng::from_entropy(),
        };
        let sample = dataset.get(index, &mut rng)?;

        let source_cloud = to_pointcloud(&sample.source);
        let target_cloud = to_pointcloud(&sample.target);
        let ground_truth = sample.inverse_transform().inverse();

        let result = estimator.estimate(&source_cloud, &target_cloud)?;
        log::info!(
            "item {index}: {} iterations, rmse {:.6}, fitness {:.3}",
            result.num_iterations,
            result.rmse,
            result.fitness
        );
        metrics.accumulate(&result.transform, &ground_truth);

        if let Some(rec) = &rec {
            let aligned = PointCloud::new(
                result.transform.transform_points(source_cloud.points()),
                None,
                None,
            );
            log_pointcloud(rec, &format!("{index}/target"), &target_cloud, "marine")?;
            log_pointcloud(rec, &format!("{index}/source"), &source_cloud, "white")?;
            log_pointcloud(rec, &format!("{index}/aligned"), &aligned, "gold")?;
            log_outliers(rec, &format!("{index}/outliers"), &sample)?;
        }
    }

    println!("{}", serde_json::to_string_pretty(&metrics.summary())?);

    Ok(())
}

fn to_pointcloud(points: &[[f32; 3]]) -> PointCloud {
    PointCloud::new(
        points
            .iter()
            .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
            .collect(),
        None,
        None,
    )
}

fn log_pointcloud(
    rec: &rerun::RecordingStream,
    name: &str,
    pointcloud: &PointCloud,
    color: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let points = pointcloud
        .points()
        .iter()
        .map(|p| rerun::Position3D::new(p[0] as f32, p[1] as f32, p[2] as f32))
        .collect::<Vec<_>>();

    let color = match color {
        "marine" => rerun::Color::from_rgb(90, 145, 199),
        "gold" => rerun::Color::from_rgb(255, 215, 0),
        _ => rerun::Color::from_rgb(255, 255, 255),
    };
    let colors = vec![color; points.len()];

    rec.log(name, &rerun::Points3D::new(points).with_colors(colors))?;

    Ok(())
}

// the mask indexes the target only when no subsampling happened
fn log_outliers(
    rec: &rerun::RecordingStream,
    name: &str,
    sample: &Sample,
) -> Result<(), Box<dyn std::error::Error>> {
    if sample.mask.len() != sample.target.len() {
        return Ok(());
    }
    let points = sample
        .target
        .iter()
        .zip(sample.mask.iter())
        .filter(|(_, &m)| m == 0)
        .map(|(p, _)| rerun::Position3D::new(p[0], p[1], p[2]))
        .collect::<Vec<_>>();
    let colors = vec![rerun::Color::from_rgb(220, 40, 40); points.len()];
    rec.log(name, &rerun::Points3D::new(points).with_colors(colors))?;
    Ok(())
}

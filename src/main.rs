use anyhow::{Context, Result};
use classify::Classifier;
use frame::FrameSource;
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::GestureController;
use source::{LandmarkSource, Replay, Selection, Subprocess, Timeouts};
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use structopt::StructOpt;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use trigger::DuckSource;

#[cfg(feature = "camera")]
mod camera;
#[cfg_attr(not(feature = "camera"), allow(dead_code))]
mod capture;
mod classify;
mod error;
mod features;
mod frame;
mod gesture;
mod hand;
mod landmark;
#[cfg(feature = "gui")]
mod overlay;
mod pipeline;
mod point;
mod pose;
mod source;
mod stabilizer;
mod trigger;

#[cfg(feature = "gui")]
fn show_frame(mut frame: opencv::core::Mat, rate_text: &str) -> Result<(), error::Error> {
    use error::Error;
    use opencv::{
        core::{Point2i, Scalar},
        imgproc::{FONT_HERSHEY_SIMPLEX, LINE_AA},
        prelude::*,
    };

    const WHITE: (f64, f64, f64) = (255.0, 255.0, 255.0);

    let origin = Point2i::new(frame.cols() - 120, frame.rows() - 10);
    opencv::imgproc::put_text(
        &mut frame,
        rate_text,
        origin,
        FONT_HERSHEY_SIMPLEX,
        0.5,
        Scalar::from(WHITE),
        1,       // thickness
        LINE_AA, // line_type
        false,   // bottom_left_origin
    )
    .map_err(Error::PutText)?;
    opencv::highgui::imshow("gesture-dino", &frame).map_err(Error::ImShow)
}

#[cfg(feature = "gui")]
fn wait_q(delay_ms: i32) -> Result<bool> {
    const Q_KEY: u8 = b'q';
    Ok(opencv::highgui::wait_key(delay_ms)? != i32::from(Q_KEY))
}

#[cfg(not(feature = "gui"))]
fn wait_q(_delay_ms: i32) -> Result<bool> {
    Ok(true)
}

#[derive(structopt::StructOpt)]
struct CaptureOpt {
    /// A v4l2 compatible device: /dev/videoDEVICE
    #[structopt(short, long, default_value = "0")]
    device: i32,

    /// The width of the input frame.
    #[structopt(long)]
    frame_width: Option<u16>,

    /// The height of the input frame.
    #[structopt(long)]
    frame_height: Option<u16>,

    /// Requested camera frame rate.
    #[structopt(long)]
    fps: Option<u16>,

    /// Use the camera image as is. The thumb test assumes a mirrored feed.
    #[structopt(long)]
    no_mirror: bool,

    /// Read the camera on its own thread, keeping only the newest frame.
    #[structopt(short, long)]
    background_capture: bool,

    /// How long a tick waits for a background frame before skipping it.
    #[structopt(long, default_value = "50")]
    capture_timeout_ms: u64,
}

#[derive(structopt::StructOpt)]
struct EstimatorOpt {
    /// Landmark estimator program. Receives frames on stdin, answers with JSON records.
    #[structopt(short, long, required_unless = "replay")]
    estimator: Option<String>,

    /// Argument passed to the estimator program. Repeatable.
    #[structopt(long = "estimator-arg", number_of_values = 1)]
    estimator_args: Vec<String>,

    /// Replay recorded JSON landmark records instead of using the camera.
    #[structopt(short, long, conflicts_with = "estimator")]
    replay: Option<PathBuf>,

    /// Minimum detection score for a subject to count as present.
    #[structopt(short = "c", long, default_value = "0.5")]
    min_confidence: f32,

    /// How long a tick waits for the estimator's reply before counting the frame as empty.
    #[structopt(long, default_value = "100")]
    estimator_timeout_ms: u64,

    /// How long to wait for the estimator to load its model.
    #[structopt(long, default_value = "30")]
    ready_timeout_secs: u64,
}

#[derive(structopt::StructOpt)]
struct Opt {
    #[structopt(flatten)]
    capture: CaptureOpt,

    #[structopt(flatten)]
    estimator: EstimatorOpt,

    #[structopt(flatten)]
    stabilizer: stabilizer::Config,

    /// Which label holds the duck: "stabilized" or "raw".
    #[structopt(long, default_value = "stabilized")]
    duck_source: DuckSource,

    /// Pipeline ticks per second.
    #[structopt(short, long, default_value = "30")]
    tick_rate: u32,

    #[structopt(short = "W", long, default_value = "1")]
    wait_key_ms: i32,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(short, long)]
    show_progress: bool,

    #[structopt(subcommand)]
    classify: classify::Classify,
}

const REPLAY_FRAME_WIDTH: u16 = 320;
const REPLAY_FRAME_HEIGHT: u16 = 240;

fn open_frames(opt: &CaptureOpt, replaying: bool) -> Result<Box<dyn FrameSource>> {
    if replaying {
        return Ok(Box::new(frame::Blank {
            width: opt.frame_width.unwrap_or(REPLAY_FRAME_WIDTH).into(),
            height: opt.frame_height.unwrap_or(REPLAY_FRAME_HEIGHT).into(),
        }));
    }

    #[cfg(feature = "camera")]
    {
        let camera = camera::Camera::open(
            opt.device,
            opt.frame_width,
            opt.frame_height,
            opt.fps,
            !opt.no_mirror,
        )
        .context("failed opening camera")?;

        if opt.background_capture {
            Ok(Box::new(capture::Threaded::spawn(
                camera,
                Duration::from_millis(opt.capture_timeout_ms),
            )))
        } else {
            Ok(Box::new(camera))
        }
    }

    #[cfg(not(feature = "camera"))]
    {
        anyhow::bail!(
            "device {} unavailable: built without the `camera` feature, use --replay",
            opt.device
        )
    }
}

fn open_estimator(opt: &EstimatorOpt, selection: Selection) -> Result<Box<dyn LandmarkSource>> {
    match (&opt.replay, &opt.estimator) {
        (Some(path), _) => Ok(Box::new(
            Replay::open(path, selection).context("failed opening replay")?,
        )),
        (None, Some(program)) => Ok(Box::new(
            Subprocess::spawn(
                program,
                &opt.estimator_args,
                selection,
                Timeouts {
                    ready: Duration::from_secs(opt.ready_timeout_secs),
                    reply: Duration::from_millis(opt.estimator_timeout_ms),
                },
            )
            .context("failed starting landmark estimator")?,
        )),
        (None, None) => anyhow::bail!("one of --estimator or --replay is required"),
    }
}

fn main() -> Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(opt.log_level),
    )?;

    let running = Arc::new(AtomicBool::new(true));
    let running_ctrl_c = running.clone();

    ctrlc::set_handler(move || {
        running_ctrl_c.store(false, Ordering::SeqCst);
    })
    .context("failed setting Ctrl-C handler")?;

    let config = pipeline::Config {
        stabilizer: opt
            .stabilizer
            .validate()
            .context("invalid stabilizer settings")?,
        duck_source: opt.duck_source,
    };
    let selection = Selection {
        expected_landmarks: opt.classify.expected_landmarks(),
        min_confidence: opt.estimator.min_confidence,
    };

    // the estimator may need a while to load its model; start it before the camera
    let estimator = open_estimator(&opt.estimator, selection)?;
    let frames = open_frames(&opt.capture, opt.estimator.replay.is_some())?;

    let modality = opt.classify.modality();
    let mut controller = GestureController::new(frames, estimator, opt.classify, config)
        .context("failed constructing gesture controller")?;
    controller.set_gesture_callback(|gesture| info!(message = "gesture detected", %gesture));

    info!(
        message = "starting gesture control, press Ctrl-C to quit",
        %modality,
        duck_source = ?opt.duck_source,
    );

    let pb = if opt.show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let tick = Duration::from_secs_f64(1.0 / f64::from(opt.tick_rate.max(1)));
    let started = Instant::now();

    while running.load(Ordering::SeqCst) && !controller.is_finished() {
        let tick_start = Instant::now();
        controller.update(false);

        let rate_text = format!(
            "{:.1} ticks/s",
            controller.frame_count() as f64 / started.elapsed().as_secs_f64()
        );

        #[cfg(feature = "gui")]
        if let Some(frame) = controller.annotated_frame() {
            show_frame(frame.context("failed drawing gestures")?, &rate_text)
                .context("failed showing frame")?;
        }

        if !wait_q(opt.wait_key_ms).context("failed waiting for 'q' key")? {
            running.store(false, Ordering::SeqCst);
        }

        if let Some(pb) = pb.as_ref() {
            pb.set_message(format!(
                "gesture: {:<5} raw: {:<5} duck: {:<5} frames: {} {}",
                controller.current_label(),
                controller.raw_label(),
                controller.is_duck_held(),
                controller.frame_count(),
                rate_text,
            ));
            pb.inc(1);
        }

        std::thread::sleep(tick.saturating_sub(tick_start.elapsed()));
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    controller.close();
    info!(message = "stopped", frames = controller.frame_count());

    Ok(())
}

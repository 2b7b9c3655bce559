use crate::{
    classify::Classifier,
    error::Error,
    frame::FrameSource,
    gesture::Gesture,
    source::LandmarkSource,
    stabilizer::{self, Stabilizer},
    trigger::{Actions, ControlMapper, DuckSource},
};
use tracing::{debug, info, trace, warn};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) stabilizer: stabilizer::Config,
    pub(crate) duck_source: DuckSource,
}

type GestureCallback = Box<dyn FnMut(Gesture)>;

/// Frame in, actions out. One `update` per game tick.
///
/// Every tick appends exactly one raw label to the stabilizer, even when the
/// camera or the estimator fails: such ticks count as "no subject".
pub(crate) struct GestureController<F, L, C>
where
    F: FrameSource,
    L: LandmarkSource,
    C: Classifier,
{
    frames: F,
    estimator: L,
    classifier: C,
    stabilizer: Stabilizer,
    mapper: ControlMapper,
    raw: Gesture,
    #[cfg(feature = "gui")]
    frame: Option<crate::frame::Frame>,
    #[cfg(feature = "gui")]
    landmarks: Option<crate::landmark::LandmarkSet>,
    frame_count: usize,
    on_change: Option<GestureCallback>,
}

impl<F, L, C> GestureController<F, L, C>
where
    F: FrameSource,
    L: LandmarkSource,
    C: Classifier,
{
    pub(crate) fn new(frames: F, estimator: L, classifier: C, config: Config) -> Result<Self, Error> {
        Ok(Self {
            frames,
            estimator,
            classifier,
            stabilizer: Stabilizer::new(config.stabilizer)?,
            mapper: ControlMapper::new(config.duck_source),
            raw: Gesture::Idle,
            #[cfg(feature = "gui")]
            frame: None,
            #[cfg(feature = "gui")]
            landmarks: None,
            frame_count: 0,
            on_change: None,
        })
    }

    /// Called with the new label whenever the stabilized gesture changes to something other than idle.
    pub(crate) fn set_gesture_callback<G>(&mut self, callback: G)
    where
        G: FnMut(Gesture) + 'static,
    {
        self.on_change = Some(Box::new(callback));
    }

    pub(crate) fn update(&mut self, game_over: bool) -> Actions {
        self.frame_count += 1;

        let frame = match self.frames.read() {
            Ok(frame) => Some(frame),
            Err(error) => {
                warn!(message = "skipping frame", frame = self.frame_count, %error);
                None
            }
        };

        let estimator = &mut self.estimator;
        let landmarks = frame
            .as_ref()
            .and_then(|frame| match estimator.detect(frame) {
                Ok(landmarks) => landmarks,
                Err(error) => {
                    warn!(message = "landmark detection failed", %error);
                    None
                }
            });

        self.raw = match landmarks.as_ref() {
            Some(landmarks) => self.classifier.classify(landmarks).unwrap_or_else(|error| {
                warn!(message = "classification failed", %error);
                Gesture::Idle
            }),
            None => Gesture::Idle,
        };

        let previous = self.stabilizer.stabilized();
        let stabilized = self.stabilizer.push(self.raw);
        trace!(frame = self.frame_count, raw = %self.raw, %stabilized);

        if stabilized != previous {
            debug!(message = "gesture changed", from = %previous, to = %stabilized);
            if stabilized != Gesture::Idle {
                if let Some(callback) = self.on_change.as_mut() {
                    callback(stabilized);
                }
            }
        }

        let actions = self.mapper.update(stabilized, self.raw, game_over);
        if actions.jump {
            info!(message = "jump", frame = self.frame_count);
        }
        if actions.restart {
            info!(message = "restart", frame = self.frame_count);
        }

        #[cfg(feature = "gui")]
        {
            self.frame = frame;
            self.landmarks = landmarks;
        }
        actions
    }

    pub(crate) fn is_jump_active_edge(&self) -> bool {
        self.mapper.actions().jump
    }

    pub(crate) fn is_restart_edge(&self) -> bool {
        self.mapper.actions().restart
    }

    pub(crate) fn is_duck_held(&self) -> bool {
        self.mapper.actions().duck
    }

    /// The stabilized gesture.
    pub(crate) fn current_label(&self) -> Gesture {
        self.stabilizer.stabilized()
    }

    /// The unsmoothed label of the most recent frame.
    pub(crate) fn raw_label(&self) -> Gesture {
        self.raw
    }

    pub(crate) fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Whether the landmark source has run dry.
    pub(crate) fn is_finished(&self) -> bool {
        self.estimator.is_exhausted()
    }

    /// The last frame with landmarks and gesture drawn on it, if a frame was read.
    #[cfg(feature = "gui")]
    pub(crate) fn annotated_frame(&self) -> Option<Result<opencv::core::Mat, Error>> {
        let history = self.stabilizer.history().collect::<Vec<_>>();
        self.frame.as_ref().map(|frame| {
            crate::overlay::Overlay {
                modality: self.classifier.modality(),
                landmarks: self.landmarks.as_ref(),
                stabilized: self.current_label(),
                raw: self.raw,
                history: &history,
                frame_count: self.frame_count,
            }
            .draw(frame)
        })
    }

    /// Forget all gesture history, as after re-initializing the estimator.
    pub(crate) fn reset(&mut self) {
        self.stabilizer.reset();
        self.mapper.reset();
        self.raw = Gesture::Idle;
    }

    pub(crate) fn close(&mut self) {
        self.frames.close();
    }
}

impl<F, L, C> Drop for GestureController<F, L, C>
where
    F: FrameSource,
    L: LandmarkSource,
    C: Classifier,
{
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, GestureController};
    use crate::{
        classify::{self, Classifier},
        error::Error,
        frame::{Frame, FrameSource},
        gesture::Gesture::{self, *},
        landmark::{testing, Keypoint, LandmarkSet, Modality},
        pose::PoseKeypoint,
        source::{LandmarkSource, Replay, Selection},
        trigger::DuckSource,
    };
    use std::{
        cell::RefCell,
        collections::VecDeque,
        io::Cursor,
        rc::Rc,
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc,
        },
    };

    /// Blank frames, except where the script says the read fails.
    struct Frames {
        failures: VecDeque<bool>,
        closed: Arc<AtomicUsize>,
    }

    impl Frames {
        fn reliable() -> Self {
            Self::failing(&[])
        }

        fn failing(failures: &[bool]) -> Self {
            Self {
                failures: failures.iter().copied().collect(),
                closed: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl FrameSource for Frames {
        fn read(&mut self) -> Result<Frame, Error> {
            if self.failures.pop_front().unwrap_or(false) {
                Err(Error::NoFrameReady)
            } else {
                Ok(Frame::blank(32, 24))
            }
        }

        fn close(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Encodes the label to produce in the x coordinate of the first landmark.
    struct Scripted(VecDeque<Option<Gesture>>);

    impl Scripted {
        fn new(labels: &[Option<Gesture>]) -> Self {
            Self(labels.iter().copied().collect())
        }
    }

    fn encode(gesture: Gesture) -> f32 {
        match gesture {
            Idle => 0.0,
            Jump => 0.1,
            Duck => 0.2,
            Run => 0.3,
        }
    }

    impl LandmarkSource for Scripted {
        fn detect(&mut self, _frame: &Frame) -> Result<Option<LandmarkSet>, Error> {
            Ok(self.0.pop_front().flatten().map(|gesture| {
                let mut landmarks = testing::centered(PoseKeypoint::COUNT);
                testing::set(&mut landmarks, 0, encode(gesture), 0.5);
                landmarks
            }))
        }

        fn is_exhausted(&self) -> bool {
            self.0.is_empty()
        }
    }

    struct Decode;

    impl Classifier for Decode {
        fn modality(&self) -> Modality {
            Modality::Pose
        }

        fn expected_landmarks(&self) -> usize {
            PoseKeypoint::COUNT
        }

        fn classify(&self, landmarks: &LandmarkSet) -> Result<Gesture, Error> {
            self.validate_landmark_count(landmarks.len())?;
            let x = landmarks.iter().next().map_or(0.0, |l| l.point.x());
            Ok([Idle, Jump, Duck, Run]
                .iter()
                .copied()
                .find(|&g| (encode(g) - x).abs() < 1e-6)
                .unwrap_or(Idle))
        }
    }

    type Controller = GestureController<Frames, Scripted, Decode>;

    fn controller(frames: Frames, labels: &[Option<Gesture>]) -> Controller {
        GestureController::new(frames, Scripted::new(labels), Decode, Config::default()).unwrap()
    }

    fn run(controller: &mut Controller, ticks: usize) -> Vec<Gesture> {
        (0..ticks)
            .map(|_| {
                controller.update(false);
                controller.current_label()
            })
            .collect()
    }

    #[test]
    fn constant_jump_fires_once() {
        let mut c = controller(Frames::reliable(), &[Some(Jump); 20]);
        let edges = (0..20)
            .filter(|_| {
                c.update(false);
                c.is_jump_active_edge()
            })
            .count();
        assert_eq!(edges, 1);
        assert_eq!(c.current_label(), Jump);
    }

    #[test]
    fn jump_edge_after_leading_gaps() {
        let mut c = controller(Frames::reliable(), &[None, None, Some(Jump), Some(Jump), Some(Jump)]);
        let labels = run(&mut c, 5);
        assert_eq!(labels, vec![Idle, Idle, Idle, Idle, Jump]);
        assert!(c.is_jump_active_edge());
    }

    #[test]
    fn no_subject_decays_jump() {
        let mut labels = vec![Some(Jump); 10];
        labels.extend(vec![None; 5]);
        let mut c = controller(Frames::reliable(), &labels);
        let stabilized = run(&mut c, 15);
        assert_eq!(stabilized[9], Jump);
        assert_eq!(&stabilized[12..], &[Idle, Idle, Idle]);
        assert_eq!(c.raw_label(), Idle);
    }

    #[test]
    fn failed_frames_count_as_idle() {
        // reads 3..=5 fail; the estimator is never asked for those frames
        let frames = Frames::failing(&[false, false, false, true, true, true]);
        let mut c = controller(frames, &[Some(Jump); 10]);
        let stabilized = run(&mut c, 6);
        assert_eq!(c.frame_count(), 6);
        assert_eq!(stabilized, vec![Idle, Idle, Jump, Jump, Jump, Idle]);
    }

    #[test]
    fn classification_error_counts_as_idle() {
        struct Broken;

        impl LandmarkSource for Broken {
            fn detect(&mut self, _frame: &Frame) -> Result<Option<LandmarkSet>, Error> {
                Ok(Some(testing::centered(7)))
            }
        }

        let mut c =
            GestureController::new(Frames::reliable(), Broken, Decode, Config::default()).unwrap();
        for _ in 0..5 {
            c.update(false);
            assert_eq!(c.raw_label(), Idle);
        }
    }

    #[test]
    fn held_duck() {
        let mut c = controller(Frames::reliable(), &[Some(Duck); 6]);
        let held = (0..6)
            .map(|_| {
                c.update(false);
                c.is_duck_held()
            })
            .collect::<Vec<_>>();
        assert_eq!(held, vec![false, false, true, true, true, true]);
    }

    #[test]
    fn raw_duck_source() {
        let config = Config {
            duck_source: DuckSource::Raw,
            ..Config::default()
        };
        let mut c = GestureController::new(
            Frames::reliable(),
            Scripted::new(&[Some(Duck), Some(Duck), Some(Duck), None]),
            Decode,
            config,
        )
        .unwrap();
        c.update(false);
        assert!(c.is_duck_held());
        c.update(false);
        c.update(false);
        c.update(false);
        assert_eq!(c.current_label(), Duck);
        assert!(!c.is_duck_held());
    }

    #[test]
    fn jump_restarts_after_game_over() {
        let mut c = controller(Frames::reliable(), &[Some(Jump); 4]);
        c.update(true);
        c.update(true);
        let actions = c.update(true);
        assert!(actions.restart);
        assert!(c.is_restart_edge());
        assert!(!c.is_jump_active_edge());
    }

    #[test]
    fn callback_on_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_callback = seen.clone();
        let mut labels = vec![Some(Jump); 3];
        labels.extend(vec![None; 3]);
        labels.extend(vec![Some(Duck); 3]);
        let mut c = controller(Frames::reliable(), &labels);
        c.set_gesture_callback(move |gesture| seen_callback.borrow_mut().push(gesture));
        run(&mut c, 9);
        assert_eq!(*seen.borrow(), vec![Jump, Duck]);
    }

    #[test]
    fn reset_forgets_history() {
        let mut c = controller(Frames::reliable(), &[Some(Jump); 5]);
        run(&mut c, 3);
        assert_eq!(c.current_label(), Jump);
        c.reset();
        assert_eq!(c.current_label(), Idle);
        assert_eq!(run(&mut c, 2), vec![Idle, Idle]);
    }

    #[cfg(feature = "gui")]
    #[test]
    fn annotated_frame_matches_input_size() {
        use opencv::prelude::*;

        let mut c = controller(Frames::reliable(), &[Some(Jump)]);
        c.update(false);
        let frame = c.annotated_frame().unwrap().unwrap();
        assert_eq!((frame.cols(), frame.rows()), (32, 24));
    }

    #[cfg(feature = "gui")]
    #[test]
    fn no_annotation_without_a_frame() {
        let mut c = controller(Frames::failing(&[true]), &[Some(Jump)]);
        assert!(c.annotated_frame().is_none());
        c.update(false);
        assert!(c.annotated_frame().is_none());
    }

    #[test]
    fn frames_closed_once_on_drop() {
        let frames = Frames::reliable();
        let closed = frames.closed.clone();
        let mut c = controller(frames, &[]);
        c.update(false);
        assert!(c.is_finished());
        drop(c);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn replayed_pose_jumps() {
        let mut raised = testing::centered(PoseKeypoint::COUNT);
        for (kind, y) in [
            (PoseKeypoint::LeftShoulder, 0.5),
            (PoseKeypoint::RightShoulder, 0.5),
            (PoseKeypoint::LeftWrist, 0.1),
            (PoseKeypoint::RightWrist, 0.1),
        ] {
            testing::set(&mut raised, kind.idx().unwrap(), 0.5, y);
        }
        let line = format!(
            r#"{{"detections": [{{"landmarks": [{}]}}]}}"#,
            raised
                .iter()
                .map(|l| format!(r#"{{"x": {}, "y": {}}}"#, l.point.x(), l.point.y()))
                .collect::<Vec<_>>()
                .join(", ")
        );
        let recording = vec![line; 4].join("\n");
        let classifier = classify::Classify::Pose(classify::pose::Classifier::default());
        let replay = Replay::new(
            Cursor::new(recording),
            Selection {
                expected_landmarks: classifier.expected_landmarks(),
                min_confidence: 0.5,
            },
        );
        let mut c =
            GestureController::new(Frames::reliable(), replay, classifier, Config::default())
                .unwrap();

        let edges = (0..5)
            .map(|_| {
                c.update(false);
                c.is_jump_active_edge()
            })
            .collect::<Vec<_>>();
        assert_eq!(edges, vec![false, false, true, false, false]);
        assert!(c.is_finished());
    }
}

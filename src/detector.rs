use serde_derive::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::candidate::Candidate;
use crate::class::VehicleClass;
use crate::config::DetectorConfig;
use crate::error::Error;
use crate::frame::Frame;
use crate::latch::Latch;
use crate::line::{LineCrossTest, LineSegment};

/// What one frame produced for the downstream counters and overlays.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct FrameOutcome {
    pub frame: u64,
    pub counted: bool,
    pub speed_triggered: bool,
    /// Present only on frames where a vehicle was counted.
    pub class: Option<VehicleClass>,
}

/// Returns the first item in `items` accepted by `pred`, in sequence order.
#[inline]
pub fn first_match<T, P>(items: &[T], mut pred: P) -> Option<&T>
where
    P: FnMut(&T) -> bool,
{
    items.iter().find(|&item| pred(item))
}

fn validate_candidates(candidates: &[Candidate]) -> Result<(), Error> {
    candidates.iter().try_for_each(Candidate::validate)
}

fn check_threshold(name: &str, value: f64) -> Result<f64, Error> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(Error::InvalidConfig(format!(
            "{} must be a positive number, got {}",
            name, value
        )))
    }
}

fn check_line(name: &str, coords: [[f64; 2]; 2]) -> Result<LineCrossTest, Error> {
    LineSegment::from_coords(coords)
        .map(LineCrossTest::new)
        .map_err(|err| Error::InvalidConfig(format!("{}: {}", name, err)))
}

/// Per-stream crossing engine: one counting line, one speed line, a latch for each and a
/// size classifier for the last counted blob.
///
/// Holds mutable per-stream state; each video stream owns its own detector.
#[derive(Debug, Clone)]
pub struct CrossingDetector {
    area_threshold: f64,
    vehicle_size_threshold: f64,
    counting: LineCrossTest,
    speed: LineCrossTest,
    counting_latch: Latch,
    speed_latch: Latch,
    last_matched_area: Option<f64>,
}

impl CrossingDetector {
    pub fn new(config: DetectorConfig) -> Result<Self, Error> {
        let area_threshold = check_threshold("area_threshold", config.area_threshold)?;
        let vehicle_size_threshold =
            check_threshold("vehicle_size_threshold", config.vehicle_size_threshold)?;

        let counting = check_line("counting_line", config.counting_line)?;
        let speed = check_line("speed_line", config.speed_line)?;

        if counting.line().is_vertical() || counting.line().is_horizontal() {
            warn!("counting line is axis-aligned and will never report a crossing");
        }
        if speed.line().is_vertical() || speed.line().is_horizontal() {
            warn!("speed line is axis-aligned and will never report a crossing");
        }

        Ok(Self {
            area_threshold,
            vehicle_size_threshold,
            counting,
            speed,
            counting_latch: Latch::from_engaged(config.counting_engaged),
            speed_latch: Latch::from_engaged(config.speed_engaged),
            last_matched_area: None,
        })
    }

    /// Keeps, in detection order, the candidates large enough to be vehicles.
    pub fn good_candidates(&self, candidates: &[Candidate]) -> Vec<Candidate> {
        candidates
            .iter()
            .filter(|c| c.area > self.area_threshold)
            .copied()
            .collect()
    }

    fn evaluate_line<'a>(
        test: &LineCrossTest,
        latch: &mut Latch,
        candidates: &'a [Candidate],
    ) -> Result<(Option<&'a Candidate>, bool), Error> {
        validate_candidates(candidates)?;

        let hit = first_match(candidates, |c| test.crosses_valid(&c.bbox()));
        let before = *latch;
        let rising = latch.observe(hit.is_some());

        if before != *latch {
            debug!("latch {:?} -> {:?}", before, *latch);
        }

        Ok((hit, rising))
    }

    /// Returns `true` on the first frame of a counting-line overlap episode.
    pub fn evaluate_counting_crossing(&mut self, candidates: &[Candidate]) -> Result<bool, Error> {
        let (hit, rising) =
            Self::evaluate_line(&self.counting, &mut self.counting_latch, candidates)?;

        if let Some(candidate) = hit {
            self.last_matched_area = Some(candidate.area);
        }

        Ok(rising)
    }

    /// Returns `true` on the first frame of a speed-line overlap episode.
    pub fn evaluate_speed_crossing(&mut self, candidates: &[Candidate]) -> Result<bool, Error> {
        let (_, rising) = Self::evaluate_line(&self.speed, &mut self.speed_latch, candidates)?;

        Ok(rising)
    }

    pub fn classify(&self) -> Result<VehicleClass, Error> {
        let area = self.last_matched_area.ok_or(Error::NoMatchedObject)?;

        Ok(VehicleClass::from_area(area, self.vehicle_size_threshold))
    }

    /// Area gate, both lines, and the class of a vehicle counted on this frame.
    pub fn process_frame(&mut self, frame: &Frame) -> Result<FrameOutcome, Error> {
        // reject the whole frame before either latch moves
        if let Err(err) = frame.validate() {
            warn!("frame {} rejected: {}", frame.index, err);
            return Err(err);
        }

        let good = self.good_candidates(&frame.candidates);

        let counted = self.evaluate_counting_crossing(&good)?;
        let speed_triggered = self.evaluate_speed_crossing(&good)?;

        let class = if counted {
            let class = self.classify()?;
            info!(
                "vehicle counted at frame {}: {} (area {:?})",
                frame.index, class, self.last_matched_area
            );
            Some(class)
        } else {
            None
        };

        if speed_triggered {
            info!("speed line triggered at frame {}", frame.index);
        }

        debug!(
            "frame {}: {} of {} candidates kept, counting={:?} speed={:?}",
            frame.index,
            good.len(),
            frame.len(),
            self.counting_latch,
            self.speed_latch
        );

        Ok(FrameOutcome {
            frame: frame.index,
            counted,
            speed_triggered,
            class,
        })
    }

    /// Back to `Idle` on both lines and forgets the last matched area.
    pub fn reset(&mut self) {
        self.counting_latch = Latch::Idle;
        self.speed_latch = Latch::Idle;
        self.last_matched_area = None;
    }

    #[inline]
    pub fn is_crossing_counting_line(&self) -> bool {
        self.counting_latch.is_engaged()
    }

    #[inline]
    pub fn is_crossing_speed_line(&self) -> bool {
        self.speed_latch.is_engaged()
    }

    #[inline]
    pub fn counting_latch(&self) -> Latch {
        self.counting_latch
    }

    #[inline]
    pub fn speed_latch(&self) -> Latch {
        self.speed_latch
    }

    #[inline]
    pub fn last_matched_area(&self) -> Option<f64> {
        self.last_matched_area
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BBox;

    // counting line y = x over [0, 100], speed line y = 200 - x over [100, 200]
    fn config() -> DetectorConfig {
        DetectorConfig::new(
            10.0,
            100.0,
            [[0.0, 0.0], [100.0, 100.0]],
            [[100.0, 100.0], [200.0, 0.0]],
        )
    }

    fn on_counting() -> Candidate {
        Candidate::from_bbox(BBox::ltwh(40.0, 40.0, 10.0, 10.0))
    }

    fn on_speed() -> Candidate {
        Candidate::from_bbox(BBox::ltwh(150.0, 40.0, 10.0, 10.0))
    }

    fn nowhere() -> Candidate {
        Candidate::from_bbox(BBox::ltwh(0.0, 80.0, 10.0, 10.0))
    }

    #[test]
    fn test_first_match_takes_sequence_order() {
        let items = [3, 8, 5, 9];

        assert_eq!(first_match(&items, |x| *x > 4), Some(&8));
        assert_eq!(first_match(&items, |x| *x > 10), None);
    }

    #[test]
    fn test_counting_edge_trigger() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        let frame = [on_counting()];

        let events: Vec<bool> = (0..5)
            .map(|_| detector.evaluate_counting_crossing(&frame).unwrap())
            .collect();
        assert_eq!(events, vec![true, false, false, false, false]);
        assert!(detector.is_crossing_counting_line());

        assert!(!detector.evaluate_counting_crossing(&[nowhere()]).unwrap());
        assert!(!detector.is_crossing_counting_line());
        assert!(detector.evaluate_counting_crossing(&frame).unwrap());
    }

    #[test]
    fn test_empty_frame_resets_latch() {
        let mut detector = CrossingDetector::new(config().with_engaged(true, true)).unwrap();

        assert!(!detector.evaluate_counting_crossing(&[]).unwrap());
        assert!(!detector.evaluate_speed_crossing(&[]).unwrap());
        assert_eq!(detector.counting_latch(), Latch::Idle);
        assert_eq!(detector.speed_latch(), Latch::Idle);
    }

    #[test]
    fn test_resumed_counting_latch_suppresses_first_event() {
        let mut detector = CrossingDetector::new(config().with_engaged(true, false)).unwrap();

        assert!(!detector.evaluate_counting_crossing(&[on_counting()]).unwrap());
        assert_eq!(detector.last_matched_area(), Some(100.0));
    }

    #[test]
    fn test_speed_matches_leave_counting_latch_alone() {
        let mut detector = CrossingDetector::new(config()).unwrap();

        for i in 0..6 {
            let frame = if i % 2 == 0 { vec![on_speed()] } else { vec![] };

            assert_eq!(detector.evaluate_speed_crossing(&frame).unwrap(), i % 2 == 0);
            assert_eq!(detector.counting_latch(), Latch::Idle);
        }
        assert_eq!(detector.last_matched_area(), None);
    }

    #[test]
    fn test_first_match_area_recorded() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        let small = Candidate::new(BBox::ltwh(10.0, 10.0, 5.0, 5.0), 20.0);
        let large = Candidate::new(BBox::ltwh(60.0, 60.0, 20.0, 20.0), 380.0);

        detector
            .evaluate_counting_crossing(&[nowhere(), large, small])
            .unwrap();
        assert_eq!(detector.last_matched_area(), Some(380.0));
    }

    #[test]
    fn test_invalid_rect_leaves_state_untouched() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        detector.evaluate_counting_crossing(&[on_counting()]).unwrap();

        let broken = Candidate::new(BBox::ltwh(0.0, 0.0, -4.0, 4.0), 50.0);
        let result = detector.evaluate_counting_crossing(&[broken]);

        assert!(matches!(result, Err(Error::InvalidGeometry { .. })));
        assert!(detector.is_crossing_counting_line());
        assert_eq!(detector.last_matched_area(), Some(100.0));

        // an invalid box behind a valid match still fails the call
        let big = Candidate::new(BBox::ltwh(40.0, 40.0, 10.0, 10.0), 300.0);
        let result = detector.evaluate_counting_crossing(&[big, broken]);
        assert!(result.is_err());
        assert!(detector.is_crossing_counting_line());
        assert_eq!(detector.last_matched_area(), Some(100.0));
    }

    #[test]
    fn test_invalid_rect_leaves_speed_latch_untouched() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        assert!(detector.evaluate_speed_crossing(&[on_speed()]).unwrap());

        let broken = Candidate::new(BBox::ltwh(150.0, 40.0, 10.0, 0.0), 50.0);
        let result = detector.evaluate_speed_crossing(&[broken]);
        assert!(matches!(result, Err(Error::InvalidGeometry { .. })));
        assert_eq!(detector.speed_latch(), Latch::Engaged);

        let result = detector.evaluate_speed_crossing(&[nowhere(), broken]);
        assert!(result.is_err());
        assert_eq!(detector.speed_latch(), Latch::Engaged);

        // still the same episode once valid input resumes
        assert!(!detector.evaluate_speed_crossing(&[on_speed()]).unwrap());

        let mut idle = CrossingDetector::new(config()).unwrap();
        assert!(idle.evaluate_speed_crossing(&[on_speed(), broken]).is_err());
        assert_eq!(idle.speed_latch(), Latch::Idle);
    }

    #[test]
    fn test_bad_blob_area_rejected_before_state_changes() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        let on_line = BBox::ltwh(40.0, 40.0, 10.0, 10.0);

        for area in [f64::NAN, -5.0, 0.0, f64::INFINITY] {
            let result = detector.evaluate_counting_crossing(&[Candidate::new(on_line, area)]);

            assert!(matches!(result, Err(Error::InvalidArea { .. })));
            assert_eq!(detector.counting_latch(), Latch::Idle);
            assert_eq!(detector.last_matched_area(), None);
            assert!(matches!(detector.classify(), Err(Error::NoMatchedObject)));
        }

        let result = detector.evaluate_speed_crossing(&[Candidate::new(on_line, f64::NAN)]);
        assert!(matches!(result, Err(Error::InvalidArea { .. })));
    }

    #[test]
    fn test_process_frame_rejects_bad_area_below_gate() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        let negative = Candidate::new(BBox::ltwh(0.0, 0.0, 5.0, 5.0), -1.0);

        let result = detector.process_frame(&Frame::new(3, vec![on_counting(), negative]));
        assert!(matches!(result, Err(Error::InvalidArea { .. })));
        assert!(!detector.is_crossing_counting_line());
        assert_eq!(detector.last_matched_area(), None);
    }

    #[test]
    fn test_classify_requires_match() {
        let mut detector = CrossingDetector::new(config()).unwrap();

        assert!(matches!(detector.classify(), Err(Error::NoMatchedObject)));

        let van = Candidate::new(BBox::ltwh(40.0, 40.0, 20.0, 20.0), 150.0);
        detector.evaluate_counting_crossing(&[van]).unwrap();
        assert_eq!(detector.classify().unwrap(), VehicleClass::Van);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut bad = config();
        bad.area_threshold = 0.0;
        assert!(matches!(
            CrossingDetector::new(bad),
            Err(Error::InvalidConfig(_))
        ));

        let mut bad = config();
        bad.vehicle_size_threshold = -5.0;
        assert!(matches!(
            CrossingDetector::new(bad),
            Err(Error::InvalidConfig(_))
        ));

        let mut bad = config();
        bad.speed_line = [[7.0, 7.0], [7.0, 7.0]];
        match CrossingDetector::new(bad) {
            Err(Error::InvalidConfig(msg)) => assert!(msg.starts_with("speed_line")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_good_candidates_keeps_order_and_strict_threshold() {
        let detector = CrossingDetector::new(config()).unwrap();
        let a = Candidate::new(BBox::ltwh(0.0, 0.0, 5.0, 5.0), 10.0);
        let b = Candidate::new(BBox::ltwh(0.0, 0.0, 5.0, 5.0), 25.0);
        let c = Candidate::new(BBox::ltwh(0.0, 0.0, 5.0, 5.0), 11.0);

        assert_eq!(detector.good_candidates(&[a, b, c]), vec![b, c]);
    }

    #[test]
    fn test_process_frame_counts_and_classifies() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        let frame = Frame::new(7, vec![on_counting(), on_speed()]);

        let outcome = detector.process_frame(&frame).unwrap();
        assert_eq!(
            outcome,
            FrameOutcome {
                frame: 7,
                counted: true,
                speed_triggered: true,
                class: Some(VehicleClass::Car),
            }
        );

        let outcome = detector.process_frame(&Frame::new(8, frame.candidates.clone())).unwrap();
        assert!(!outcome.counted);
        assert!(!outcome.speed_triggered);
        assert_eq!(outcome.class, None);
    }

    #[test]
    fn test_process_frame_ignores_small_blobs() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        let speck = Candidate::new(BBox::ltwh(40.0, 40.0, 3.0, 3.0), 9.0);

        let outcome = detector.process_frame(&Frame::new(0, vec![speck])).unwrap();
        assert!(!outcome.counted);
        assert_eq!(detector.last_matched_area(), None);
    }

    #[test]
    fn test_process_frame_rejects_before_any_latch_moves() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        let broken = Candidate::new(BBox::ltwh(150.0, 40.0, 0.0, 10.0), 50.0);

        let result = detector.process_frame(&Frame::new(0, vec![on_counting(), broken]));
        assert!(result.is_err());
        assert!(!detector.is_crossing_counting_line());
        assert!(!detector.is_crossing_speed_line());
        assert_eq!(detector.last_matched_area(), None);
    }

    #[test]
    fn test_reset_clears_state() {
        let mut detector = CrossingDetector::new(config()).unwrap();
        detector
            .process_frame(&Frame::new(0, vec![on_counting(), on_speed()]))
            .unwrap();

        detector.reset();
        assert!(!detector.is_crossing_counting_line());
        assert!(!detector.is_crossing_speed_line());
        assert!(matches!(detector.classify(), Err(Error::NoMatchedObject)));
    }
}

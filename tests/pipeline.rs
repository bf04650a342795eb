use std::cell::Cell;
use std::rc::Rc;

use image::GrayImage;

use colony_counter::detect::{BlobDetector, CircleCandidate, CircleFinder, HoughCircles, ScaleBlob};
use colony_counter::labels::{PALETTE_SIZE, dish_label};
use colony_counter::overlay::render_overlay;
use colony_counter::synthetic::{SyntheticDish, render_scan};
use colony_counter::{ColonyCounter, CounterConfig, CounterError, PipelineStage, PlateImage};

fn two_dish_scan() -> PlateImage {
    let dishes = [(500.0, 500.0), (2000.0, 500.0)].map(|(x, y)| SyntheticDish {
        center_x: x,
        center_y: y,
        radius: 480.0,
        level: 0.6,
    });
    render_scan(2500, 1000, 0.0, &dishes, &[]).expect("render failed")
}

fn candidate(score: f64, x: f64, y: f64, r: f64) -> CircleCandidate {
    CircleCandidate {
        score,
        center_x: x,
        center_y: y,
        radius: r,
    }
}

fn near(a: (f64, f64), b: (f64, f64), tol: f64) -> bool {
    (a.0 - b.0).abs() <= tol && (a.1 - b.1).abs() <= tol
}

/// Returns a fixed candidate list and counts how often it was asked.
struct FixedCircles {
    candidates: Vec<CircleCandidate>,
    calls: Rc<Cell<usize>>,
}

impl CircleFinder for FixedCircles {
    fn find_circles(&self, _edges: &GrayImage, _radius: f64, _max: usize) -> Vec<CircleCandidate> {
        self.calls.set(self.calls.get() + 1);
        self.candidates.clone()
    }
}

/// Real Hough search plus an extra near-duplicate of the strongest circle.
struct WithNearDuplicate(HoughCircles);

impl CircleFinder for WithNearDuplicate {
    fn find_circles(&self, edges: &GrayImage, radius: f64, max: usize) -> Vec<CircleCandidate> {
        let mut found = self.0.find_circles(edges, radius, max);
        if let Some(top) = found.first().copied() {
            found.push(candidate(top.score * 0.99, top.center_x + 5.0, top.center_y + 5.0, radius));
        }
        found
    }
}

/// Reports one blob at the center of whatever window it is shown.
struct CenterBlob;

impl BlobDetector for CenterBlob {
    fn detect_blobs(&self, image: &PlateImage) -> Vec<ScaleBlob> {
        vec![ScaleBlob {
            y: (image.height() / 2) as f64,
            x: (image.width() / 2) as f64,
            sigma: 2.0,
        }]
    }
}

fn small_counter(candidates: Vec<CircleCandidate>) -> (ColonyCounter, Rc<Cell<usize>>) {
    let image = PlateImage::from_pixels(100, 100, vec![0.0; 100 * 100]).expect("image");
    let config = CounterConfig {
        expected_dish_radius: 20.0,
        dedup_distance: 30.0,
        ..CounterConfig::default()
    };
    let calls = Rc::new(Cell::new(0));
    let counter = ColonyCounter::new(image, config)
        .expect("valid config")
        .with_circle_finder(FixedCircles {
            candidates,
            calls: Rc::clone(&calls),
        })
        .with_blob_detector(CenterBlob);
    (counter, calls)
}

#[test]
fn two_separated_dishes_are_found() {
    let mut counter = ColonyCounter::new(two_dish_scan(), CounterConfig::default()).expect("valid config");
    let plates = counter.locate_plates().expect("locate failed");

    assert_eq!(plates.len(), 2);
    assert_eq!(plates.masks.len(), 2);
    let centers: Vec<_> = plates.dishes.iter().map(|d| (d.center_x, d.center_y)).collect();
    for expected in [(500.0, 500.0), (2000.0, 500.0)] {
        assert!(
            centers.iter().any(|&c| near(c, expected, 3.0)),
            "no dish near {expected:?}: {centers:?}"
        );
    }
    // Dishes at 0.6 on a zero background have bright rims.
    assert_eq!(plates.rim_levels.len(), 2);
    for level in &plates.rim_levels {
        let level = level.expect("rim pixels");
        assert!(level > CounterConfig::default().rim_warning_level, "rim level {level}");
    }
    for (dish, mask) in plates.dishes.iter().zip(&plates.masks) {
        assert_eq!(dish.radius, 480.0);
        assert_eq!(mask.shape(), (2500, 1000));
        assert!(mask.contains(dish.center_x as usize, dish.center_y as usize));
    }
}

#[test]
fn near_duplicate_circle_is_suppressed() {
    let mut counter = ColonyCounter::new(two_dish_scan(), CounterConfig::default())
        .expect("valid config")
        .with_circle_finder(WithNearDuplicate(HoughCircles::default()));
    let plates = counter.locate_plates().expect("locate failed");
    assert_eq!(plates.len(), 2);
}

#[test]
fn plates_are_located_once() {
    let (mut counter, calls) = small_counter(vec![
        candidate(0.9, 25.0, 50.0, 20.0),
        candidate(0.8, 75.0, 50.0, 20.0),
    ]);
    assert_eq!(counter.stage(), PipelineStage::Initialized);

    let first = counter.locate_plates().expect("locate failed").clone();
    assert_eq!(counter.stage(), PipelineStage::PlatesLocated);
    let second = counter.locate_plates().expect("locate failed").clone();
    assert_eq!(first, second);
    assert_eq!(first.rim_levels, vec![Some(0.0), Some(0.0)]);

    counter.count_colonies().expect("count failed");
    assert_eq!(calls.get(), 1);
}

#[test]
fn counting_locates_plates_first() {
    let (mut counter, calls) = small_counter(vec![
        candidate(0.9, 25.0, 50.0, 20.0),
        candidate(0.8, 75.0, 50.0, 20.0),
    ]);

    let colonies = counter.count_colonies().expect("count failed").to_vec();
    assert_eq!(calls.get(), 1);
    assert_eq!(counter.stage(), PipelineStage::ColoniesCounted);
    assert_eq!(colonies.len(), 2);
    assert!(colonies.iter().all(|blobs| blobs.len() == 1));

    let again = counter.count_colonies().expect("count failed").to_vec();
    assert_eq!(colonies, again);
    assert_eq!(calls.get(), 1);
}

#[test]
fn blobs_are_reported_in_image_coordinates() {
    let (mut counter, _) = small_counter(vec![candidate(0.9, 25.0, 50.0, 20.0)]);
    let colonies = counter.count_colonies().expect("count failed");
    assert_eq!(colonies.len(), 1);
    // With no support radius the detector sees the whole trimmed scan.
    assert_eq!((colonies[0][0].x, colonies[0][0].y), (50.0, 50.0));
}

#[test]
fn no_candidates_is_an_error_and_leaves_counter_untouched() {
    let (mut counter, calls) = small_counter(Vec::new());

    let err = counter.locate_plates().expect_err("no dishes must fail");
    assert!(matches!(err, CounterError::EmptyCandidates));
    assert_eq!(counter.stage(), PipelineStage::Initialized);

    assert!(matches!(counter.count_colonies(), Err(CounterError::EmptyCandidates)));
    assert!(counter.report().is_err());
    assert_eq!(counter.stage(), PipelineStage::Initialized);
    assert_eq!(calls.get(), 3);
}

#[test]
fn report_pairs_dishes_with_labels_and_counts() {
    let (mut counter, _) = small_counter(vec![
        candidate(0.9, 25.0, 50.0, 20.0),
        candidate(0.8, 75.0, 50.0, 20.0),
    ]);
    let report = counter.report().expect("report failed");

    assert_eq!(report.plates.len(), 2);
    assert_eq!(report.total_colonies(), 2);
    assert_eq!(
        report.summary_lines(),
        vec![
            "2 Plates Detected".to_string(),
            "1 Colonies Detected. Shown in red".to_string(),
            "1 Colonies Detected. Shown in blue".to_string(),
        ]
    );

    let colonies = counter.count_colonies().expect("count failed").to_vec();
    for (plate, blobs) in report.plates.iter().zip(&colonies) {
        assert_eq!(&plate.colonies, blobs);
    }

    let json = report.to_json().expect("json failed");
    assert!(json.contains("\"colony_count\": 1"));
    assert!(json.contains("\"label\": \"blue\""));

    let overlay = render_overlay(counter.image(), &report).expect("overlay failed");
    assert_eq!(overlay.dimensions(), (100, 100));
}

#[test]
fn labels_cycle_after_palette() {
    assert_eq!(PALETTE_SIZE, 6);
    assert_eq!(dish_label(0).name, "red");
    assert_eq!(dish_label(PALETTE_SIZE), dish_label(0));
    assert_eq!(dish_label(PALETTE_SIZE + 3), dish_label(3));

    let names: Vec<_> = (0..PALETTE_SIZE).map(|i| dish_label(i).name).collect();
    let mut unique = names.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), PALETTE_SIZE);
}

#[test]
fn invalid_config_is_rejected() {
    let image = PlateImage::from_pixels(4, 4, vec![0.0; 16]).expect("image");

    let bad = [
        CounterConfig {
            candidate_cap: 0,
            ..CounterConfig::default()
        },
        CounterConfig {
            min_sigma: 20.0,
            ..CounterConfig::default()
        },
        CounterConfig {
            dedup_distance: -1.0,
            ..CounterConfig::default()
        },
        CounterConfig {
            blob_overlap: 1.5,
            ..CounterConfig::default()
        },
        CounterConfig {
            rim_band_width: 0.0,
            ..CounterConfig::default()
        },
    ];
    for config in bad {
        assert!(matches!(config.validate(), Err(CounterError::InvalidConfig(_))));
        assert!(ColonyCounter::new(image.clone(), config).is_err());
    }
    assert!(CounterConfig::default().validate().is_ok());
}

#[test]
fn malformed_pixel_buffers_are_rejected() {
    assert!(matches!(
        PlateImage::from_pixels(0, 5, Vec::new()),
        Err(CounterError::EmptyImage)
    ));
    assert!(matches!(
        PlateImage::from_pixels(3, 3, vec![0.0; 8]),
        Err(CounterError::PixelCount { expected: 9, found: 8 })
    ));
}

#[test]
fn only_decodable_image_paths_are_accepted() {
    assert!(PlateImage::is_decodable_path("scans/plate_01.png"));
    assert!(PlateImage::is_decodable_path("plate.JPG"));
    assert!(PlateImage::is_decodable_path("plate.tiff"));
    assert!(!PlateImage::is_decodable_path("notes.txt"));
    assert!(!PlateImage::is_decodable_path("README"));
}

//! The counting pipeline: scan -> dishes and masks -> colonies per dish.

use crate::config::CounterConfig;
use crate::detect::{BlobDetector, CannyEdges, CircleFinder, EdgeDetector, HoughCircles, LogBlobDetector};
use crate::error::CounterError;
use crate::labels::{PALETTE_SIZE, dish_label};
use crate::plate_image::PlateImage;
use crate::plates::{self, Blob, Dish, DishMask};
use crate::report::CountReport;

/// Where a [`ColonyCounter`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    /// Scan stored, nothing computed yet.
    Initialized,
    /// Dishes and masks computed and cached.
    PlatesLocated,
    /// Colony lists available for every dish.
    ColoniesCounted,
}

/// Located dishes with one mask per dish, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct Plates {
    pub dishes: Vec<Dish>,
    pub masks: Vec<DishMask>,
    /// Mean intensity of each dish's rim band, see [`plates::rim_level`].
    pub rim_levels: Vec<Option<f32>>,
}

impl Plates {
    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }
}

/// Locates dishes on one scan and counts the colonies inside each.
///
/// Plates are located once and cached; colonies are recounted on every
/// [`count_colonies`](Self::count_colonies) call.
pub struct ColonyCounter {
    image: PlateImage,
    config: CounterConfig,
    edge_detector: Box<dyn EdgeDetector>,
    circle_finder: Box<dyn CircleFinder>,
    blob_detector: Box<dyn BlobDetector>,
    plates: Option<Plates>,
    colonies: Option<Vec<Vec<Blob>>>,
}

impl ColonyCounter {
    /// Builds a counter with Canny edges, a Hough circle search and a
    /// Laplacian-of-Gaussian blob detector configured from `config`.
    pub fn new(image: PlateImage, config: CounterConfig) -> Result<Self, CounterError> {
        config.validate()?;
        Ok(Self {
            edge_detector: Box::new(CannyEdges::new(config.canny_low, config.canny_high)),
            circle_finder: Box::new(HoughCircles {
                threshold_ratio: config.peak_threshold_ratio,
                min_peak_distance: config.min_peak_distance,
            }),
            blob_detector: Box::new(LogBlobDetector {
                min_sigma: config.min_sigma,
                max_sigma: config.max_sigma,
                num_sigma: config.num_sigma,
                threshold: config.detection_threshold,
                overlap: config.blob_overlap,
            }),
            image,
            config,
            plates: None,
            colonies: None,
        })
    }

    pub fn with_edge_detector(mut self, detector: impl EdgeDetector + 'static) -> Self {
        self.edge_detector = Box::new(detector);
        self
    }

    pub fn with_circle_finder(mut self, finder: impl CircleFinder + 'static) -> Self {
        self.circle_finder = Box::new(finder);
        self
    }

    pub fn with_blob_detector(mut self, detector: impl BlobDetector + 'static) -> Self {
        self.blob_detector = Box::new(detector);
        self
    }

    pub fn image(&self) -> &PlateImage {
        &self.image
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn stage(&self) -> PipelineStage {
        match (&self.plates, &self.colonies) {
            (None, _) => PipelineStage::Initialized,
            (Some(_), None) => PipelineStage::PlatesLocated,
            (Some(_), Some(_)) => PipelineStage::ColoniesCounted,
        }
    }

    /// Dishes and masks, computed on the first call and cached afterwards.
    pub fn locate_plates(&mut self) -> Result<&Plates, CounterError> {
        let plates = match self.plates.take() {
            Some(plates) => plates,
            None => self.find_plates()?,
        };
        Ok(&*self.plates.insert(plates))
    }

    /// Detects the colonies of every dish, locating plates first if needed.
    ///
    /// Entry `i` of the result belongs to dish `i`.
    pub fn count_colonies(&mut self) -> Result<&[Vec<Blob>], CounterError> {
        self.recount().map(|(_, colonies)| colonies)
    }

    /// Counts colonies and pairs each dish with its label and blobs.
    pub fn report(&mut self) -> Result<CountReport, CounterError> {
        let (plates, colonies) = self.recount()?;
        Ok(CountReport::new(&plates.dishes, colonies))
    }

    fn recount(&mut self) -> Result<(&Plates, &[Vec<Blob>]), CounterError> {
        let plates = match self.plates.take() {
            Some(plates) => plates,
            None => self.find_plates()?,
        };
        let counted = self.detect_all(&plates);
        let plates = self.plates.insert(plates);
        let colonies = self.colonies.insert(counted?);
        Ok((&*plates, colonies.as_slice()))
    }

    fn find_plates(&self) -> Result<Plates, CounterError> {
        let edges = self.edge_detector.detect_edges(&self.image);
        let candidates = self.circle_finder.find_circles(
            &edges,
            self.config.expected_dish_radius,
            self.config.candidate_cap,
        );
        log::debug!("circle search returned {} candidates: {:?}", candidates.len(), candidates);

        let dishes = plates::locate_dishes(&candidates, self.config.dedup_distance)?;
        log::info!("{} Plates Detected", dishes.len());
        if dishes.len() > PALETTE_SIZE {
            log::warn!(
                "{} dishes but only {} labels, labels repeat from dish {}",
                dishes.len(),
                PALETTE_SIZE,
                PALETTE_SIZE
            );
        }

        let masks = plates::build_masks(&dishes, self.image.width(), self.image.height());
        let rim_levels = dishes
            .iter()
            .zip(&masks)
            .map(|(dish, mask)| plates::rim_level(&self.image, dish, mask, self.config.rim_band_width))
            .collect::<Result<Vec<_>, _>>()?;
        for (i, level) in rim_levels.iter().enumerate() {
            if let Some(level) = *level
                && level > self.config.rim_warning_level
            {
                log::warn!(
                    "{} dish rim intensity is {:.3}; trimming assumes a dark dish edge and the rim may be counted as colonies",
                    dish_label(i).name,
                    level
                );
            }
        }

        Ok(Plates {
            dishes,
            masks,
            rim_levels,
        })
    }

    fn detect_all(&self, plates: &Plates) -> Result<Vec<Vec<Blob>>, CounterError> {
        plates
            .masks
            .iter()
            .enumerate()
            .map(|(i, mask)| {
                let blobs = plates::detect_colonies(&self.image, mask, self.blob_detector.as_ref())?;
                log::info!("{} Colonies Detected. Shown in {}", blobs.len(), dish_label(i).name);
                Ok(blobs)
            })
            .collect()
    }
}

//! Home page carousel: a pure index state machine plus a timer task that
//! advances it.

use std::sync::Arc;
use std::time::Duration;

use lobianco_core::content::CarouselSlide;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Time each slide stays on screen.
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

/// Shown in place of the carousel when there are no slides.
pub const EMPTY_MESSAGE: &str = "Carrossel não configurado";

/// Current slide over a fixed slide list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Carousel {
    slides: Vec<CarouselSlide>,
    index: usize,
}

impl Carousel {
    pub fn new(slides: Vec<CarouselSlide>) -> Self {
        Self { slides, index: 0 }
    }

    pub fn slides(&self) -> &[CarouselSlide] {
        &self.slides
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&CarouselSlide> {
        self.slides.get(self.index)
    }

    /// Step forward, wrapping to the first slide.
    pub fn next(&mut self) -> usize {
        if !self.is_empty() {
            self.index = (self.index + 1) % self.len();
        }
        self.index
    }

    /// Step back, wrapping to the last slide.
    pub fn previous(&mut self) -> usize {
        if !self.is_empty() {
            self.index = if self.index == 0 {
                self.len() - 1
            } else {
                self.index - 1
            };
        }
        self.index
    }

    /// Jump to an indicator dot. Out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.len() {
            self.index = index;
            true
        } else {
            false
        }
    }

    /// Swap in a new slide list, keeping the index when it is still valid.
    pub fn replace_slides(&mut self, slides: Vec<CarouselSlide>) {
        self.slides = slides;
        if self.index >= self.slides.len() {
            self.index = 0;
        }
    }

    /// One flag per indicator dot, `true` for the active one.
    pub fn indicators(&self) -> Vec<bool> {
        (0..self.len()).map(|i| i == self.index).collect()
    }
}

/// Drives a [`Carousel`] on a timer. Index changes are published on a
/// watch channel. The timer restarts whenever the slide list changes and
/// is aborted on [`stop`](Self::stop) or drop.
pub struct CarouselRotator {
    carousel: Arc<Mutex<Carousel>>,
    period: Duration,
    index_tx: watch::Sender<usize>,
    task: Option<JoinHandle<()>>,
}

impl CarouselRotator {
    /// Start rotating. Must be called inside a tokio runtime.
    pub fn start(slides: Vec<CarouselSlide>) -> Self {
        Self::with_period(slides, DEFAULT_PERIOD)
    }

    pub fn with_period(slides: Vec<CarouselSlide>, period: Duration) -> Self {
        let (index_tx, _) = watch::channel(0);
        let mut rotator = Self {
            carousel: Arc::new(Mutex::new(Carousel::new(slides))),
            period,
            index_tx,
            task: None,
        };
        rotator.restart();
        rotator
    }

    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.index_tx.subscribe()
    }

    pub fn index(&self) -> usize {
        self.carousel.lock().index()
    }

    pub fn current(&self) -> Option<CarouselSlide> {
        self.carousel.lock().current().cloned()
    }

    pub fn snapshot(&self) -> Carousel {
        self.carousel.lock().clone()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub fn next(&self) -> usize {
        self.update(Carousel::next)
    }

    pub fn previous(&self) -> usize {
        self.update(Carousel::previous)
    }

    pub fn go_to(&self, index: usize) -> bool {
        let moved = self.carousel.lock().go_to(index);
        if moved {
            self.index_tx.send_replace(index);
        }
        moved
    }

    /// Install a new slide list. An identical list leaves the timer alone;
    /// anything else cancels it and starts a fresh one.
    pub fn replace_slides(&mut self, slides: Vec<CarouselSlide>) {
        {
            let mut carousel = self.carousel.lock();
            if carousel.slides() == slides.as_slice() {
                return;
            }
            carousel.replace_slides(slides);
            self.index_tx.send_replace(carousel.index());
        }
        self.restart();
    }

    /// Cancel the timer. Manual stepping keeps working.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::debug!("carousel timer stopped");
        }
    }

    fn update(&self, step: fn(&mut Carousel) -> usize) -> usize {
        let index = step(&mut self.carousel.lock());
        self.index_tx.send_replace(index);
        index
    }

    fn restart(&mut self) {
        self.stop();
        if self.carousel.lock().is_empty() {
            return;
        }

        let carousel = Arc::clone(&self.carousel);
        let index_tx = self.index_tx.clone();
        let period = self.period;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.task = Some(tokio::spawn(async move {
            loop {
                ticker.tick().await;
                let index = carousel.lock().next();
                index_tx.send_replace(index);
            }
        }));
        tracing::debug!(period_ms = period.as_millis() as u64, "carousel timer started");
    }
}

impl Drop for CarouselRotator {
    fn drop(&mut self) {
        self.stop();
    }
}

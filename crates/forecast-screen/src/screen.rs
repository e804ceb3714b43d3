//! The forecast screen presenter.

use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::{Duration, Instant};

use forecast_icons::{
    CachedImage, HttpImageFetcher, IconError, ImageCache, ImageCacheLoader, ImageFetcher,
    MemoryImageCache,
};
use forecast_weather::{
    Coordinates, ForecastSnapshot, ForecastSource, IconUrlBuilder, LocationRequest, WeatherError,
};
use tokio::runtime::Handle;

use crate::action::{LocationPrompt, ScreenAction, ScreenUpdate};
use crate::bindings::{IconBindings, IconTarget, Lookup};
use crate::content::{HeaderContent, RowContent, DEFAULT_DATE_FORMAT};

/// Messages sent from background work back to the screen's thread
#[derive(Debug)]
enum ScreenEvent {
    DataLoaded {
        generation: u64,
        result: Result<ForecastSnapshot, WeatherError>,
    },
    IconFetched {
        target: IconTarget,
        key: String,
        generation: u64,
        result: Result<CachedImage, IconError>,
    },
}

type Observer = Box<dyn FnMut(&ScreenUpdate)>;

/// State and behavior of the forecast screen, minus the drawing.
///
/// Lives on one thread. Forecast loads and icon downloads run on the tokio
/// runtime and post their results to a channel; nothing changes until the
/// owner calls [`ForecastScreen::pump`] or
/// [`ForecastScreen::pump_until_idle`].
pub struct ForecastScreen<S, C = MemoryImageCache, F = HttpImageFetcher> {
    source: Arc<S>,
    loader: ImageCacheLoader<C, F>,
    icon_urls: IconUrlBuilder,
    runtime: Handle,
    date_format: String,

    location: LocationRequest,
    snapshot: Option<ForecastSnapshot>,
    load_generation: u64,
    loading: bool,
    prompt: Option<LocationPrompt>,
    last_error: Option<String>,

    bindings: IconBindings,
    in_flight: usize,
    events_tx: Sender<ScreenEvent>,
    events_rx: Receiver<ScreenEvent>,
    observers: Vec<Observer>,
}

impl<S, C, F> ForecastScreen<S, C, F>
where
    S: ForecastSource,
    C: ImageCache + 'static,
    F: ImageFetcher,
{
    pub fn new(
        source: Arc<S>,
        loader: ImageCacheLoader<C, F>,
        icon_urls: IconUrlBuilder,
        runtime: Handle,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            source,
            loader,
            icon_urls,
            runtime,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            location: LocationRequest::Current,
            snapshot: None,
            load_generation: 0,
            loading: false,
            prompt: None,
            last_error: None,
            bindings: IconBindings::default(),
            in_flight: 0,
            events_tx,
            events_rx,
            observers: Vec::new(),
        }
    }

    /// strftime pattern for row dates
    pub fn with_date_format(mut self, pattern: impl Into<String>) -> Self {
        self.date_format = pattern.into();
        self
    }

    /// Register a callback for screen updates.
    pub fn subscribe(&mut self, observer: impl FnMut(&ScreenUpdate) + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn loader(&self) -> &ImageCacheLoader<C, F> {
        &self.loader
    }

    pub fn location(&self) -> LocationRequest {
        self.location
    }

    pub fn snapshot(&self) -> Option<&ForecastSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Location prompt currently shown, if any
    pub fn prompt(&self) -> Option<LocationPrompt> {
        self.prompt
    }

    /// User-facing message of the last failed load
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Background operations whose results haven't been pumped yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn dispatch(&mut self, action: ScreenAction) {
        tracing::debug!("Dispatching {:?}", action);
        match action {
            ScreenAction::Refresh => self.reload(),
            ScreenAction::RequestLocationChange => self.show_prompt(LocationPrompt::Change),
            ScreenAction::ChangeLocation {
                latitude,
                longitude,
            } => {
                self.prompt = None;
                match Coordinates::parse(&latitude, &longitude) {
                    Ok(coordinates) => {
                        tracing::info!("Location changed to {}", coordinates);
                        self.location = LocationRequest::Coordinates(coordinates);
                        self.reload();
                    }
                    Err(e) => {
                        tracing::warn!("Rejected location input: {}", e);
                    }
                }
            }
            ScreenAction::ResetToCurrentLocation => {
                self.prompt = None;
                self.location = LocationRequest::Current;
                self.reload();
            }
            ScreenAction::CancelLocationPrompt => {
                if let Some(prompt) = self.prompt.take() {
                    if prompt.reloads_on_cancel() {
                        self.reload();
                    }
                }
            }
        }
    }

    /// Start loading the forecast for the current location request.
    ///
    /// Only the most recent load is applied; older ones are dropped when
    /// they arrive.
    pub fn reload(&mut self) {
        self.load_generation += 1;
        let generation = self.load_generation;
        let request = self.location;
        let source = Arc::clone(&self.source);
        let tx = self.events_tx.clone();

        self.loading = true;
        self.in_flight += 1;
        tracing::debug!("Loading forecast for {:?}", request);

        let load = self.runtime.spawn(async move { source.load(request).await });
        self.runtime.spawn(async move {
            let result = match load.await {
                Ok(result) => result,
                Err(e) => Err(WeatherError::Task(e.to_string())),
            };
            let _ = tx.send(ScreenEvent::DataLoaded { generation, result });
        });
    }

    pub fn row_count(&self) -> usize {
        self.snapshot
            .as_ref()
            .map(|s| s.intervals.len())
            .unwrap_or(0)
    }

    /// Content for row `index`; starts the icon download on a cache miss.
    pub fn row(&mut self, index: usize) -> Option<RowContent> {
        let info = self.snapshot.as_ref()?.intervals.get(index)?.clone();
        let icon = self.resolve_icon(IconTarget::Row(index), info.icon_name());
        Some(RowContent::new(&info, &self.date_format, icon))
    }

    /// Header content; starts the icon download on a cache miss.
    pub fn header(&mut self) -> Option<HeaderContent> {
        let current = self.snapshot.as_ref()?.current.clone();
        let icon = self.resolve_icon(IconTarget::Header, current.icon_name());
        Some(HeaderContent::new(&current, icon))
    }

    /// Icon currently shown at `target`, without starting a download.
    pub fn icon(&self, target: IconTarget) -> Option<CachedImage> {
        self.bindings.image(target)
    }

    /// User-facing reason the icon at `target` is missing, when its last
    /// download failed.
    pub fn icon_error(&self, target: IconTarget) -> Option<&'static str> {
        self.bindings.failure(target)
    }

    /// Apply everything that has arrived so far. Returns the number of
    /// events handled.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
            handled += 1;
        }
        handled
    }

    /// Apply events until nothing is in flight or `timeout` passes.
    /// Returns true when idle.
    pub fn pump_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump();
            if self.in_flight == 0 {
                return true;
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }

            match self.events_rx.recv_timeout(remaining) {
                Ok(event) => self.handle_event(event),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    fn resolve_icon(&mut self, target: IconTarget, icon: Option<&str>) -> Option<CachedImage> {
        let Some(key) = icon else {
            tracing::warn!("{:?} has no weather icon", target);
            self.bindings.unbind(target);
            return None;
        };

        match self.bindings.lookup(target, key) {
            Lookup::Loaded(image) => return Some(image),
            Lookup::Pending | Lookup::Failed => return None,
            Lookup::Unbound => {}
        }

        if let Some(image) = self.loader.fetch_cached(key) {
            self.bindings.bind_loaded(target, key, image.clone());
            return Some(image);
        }

        let generation = self.bindings.bind(target, key);
        let Some(url) = self.icon_urls.url_for(key) else {
            tracing::debug!("Skipping icon {:?} for {:?}: no URL", key, target);
            self.bindings
                .mark_failed(target, generation, "Weather icon is not available.", false);
            return None;
        };

        let tx = self.events_tx.clone();
        let key = key.to_string();
        self.in_flight += 1;
        self.loader.fetch(url, move |result| {
            let _ = tx.send(ScreenEvent::IconFetched {
                target,
                key,
                generation,
                result,
            });
        });
        None
    }

    fn handle_event(&mut self, event: ScreenEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match event {
            ScreenEvent::DataLoaded { generation, result } => {
                self.finish_load(generation, result)
            }
            ScreenEvent::IconFetched {
                target,
                key,
                generation,
                result,
            } => self.finish_icon(target, &key, generation, result),
        }
    }

    fn finish_load(&mut self, generation: u64, result: Result<ForecastSnapshot, WeatherError>) {
        if generation != self.load_generation {
            tracing::debug!("Dropping superseded forecast load #{}", generation);
            return;
        }
        self.loading = false;

        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.last_error = None;
                // rows now show different data
                self.bindings.clear();
                self.notify(ScreenUpdate::DataReloaded);
            }
            Err(WeatherError::LocationRequired) => {
                tracing::info!("Device location unavailable, asking for coordinates");
                self.show_prompt(LocationPrompt::Required);
            }
            Err(e) => {
                tracing::warn!("Failed to load forecast: {}", e);
                let message = e.user_message().to_string();
                self.last_error = Some(message.clone());
                self.notify(ScreenUpdate::LoadFailed(message));
            }
        }
        self.notify(ScreenUpdate::RefreshFinished);
    }

    fn finish_icon(
        &mut self,
        target: IconTarget,
        key: &str,
        generation: u64,
        result: Result<CachedImage, IconError>,
    ) {
        match result {
            Ok(image) => {
                self.loader.store(key, image.clone());
                if self.bindings.apply(target, generation, image) {
                    let update = match target {
                        IconTarget::Header => ScreenUpdate::HeaderIconChanged,
                        IconTarget::Row(index) => ScreenUpdate::RowIconChanged(index),
                    };
                    self.notify(update);
                } else {
                    tracing::debug!("Discarding stale icon {} for {:?}", key, target);
                }
            }
            Err(e) => {
                if self
                    .bindings
                    .mark_failed(target, generation, e.user_message(), e.is_retryable())
                {
                    tracing::warn!("No icon for {:?}: {}", target, e);
                } else {
                    tracing::debug!("Ignoring failed icon {} for {:?}: {}", key, target, e);
                }
            }
        }
    }

    fn show_prompt(&mut self, prompt: LocationPrompt) {
        self.prompt = Some(prompt);
        self.notify(ScreenUpdate::LocationPrompt(prompt));
    }

    fn notify(&mut self, update: ScreenUpdate) {
        for observer in &mut self.observers {
            observer(&update);
        }
    }
}

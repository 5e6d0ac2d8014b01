//! The place list: owns every tracked place, keeps it free of duplicates,
//! persists it after each mutation and drives forecast loads.

use std::time::Duration;

use wxboard_core::{PlaceError, StorageError, TemperatureUnit};
use wxboard_weather::{ForecastProvider, GeocodingClient, Locator, Suggestion};

use crate::error_mapping::PlaceErrorExt;
use crate::format::{forecast_lines, ForecastLine};
use crate::place::{short_name, Place, CURRENT_LOCATION_LABEL};
use crate::store::PlaceStore;
use crate::view::{CardState, PlaceView};

const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_secs(10);

pub struct PlaceListManager {
    places: Vec<Place>,
    store: PlaceStore,
    geocoder: GeocodingClient,
    forecasts: ForecastProvider,
    locator: Locator,
    view: Box<dyn PlaceView>,
    unit: TemperatureUnit,
    location_timeout: Duration,
}

impl PlaceListManager {
    /// Build the manager with the list currently saved in `store`.
    pub fn new(
        store: PlaceStore,
        geocoder: GeocodingClient,
        forecasts: ForecastProvider,
        locator: Locator,
        view: Box<dyn PlaceView>,
    ) -> Self {
        let places = store.load();
        Self {
            places,
            store,
            geocoder,
            forecasts,
            locator,
            view,
            unit: TemperatureUnit::default(),
            location_timeout: DEFAULT_LOCATION_TIMEOUT,
        }
    }

    /// Unit the forecast provider reports temperatures in
    pub fn with_unit(mut self, unit: TemperatureUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_location_timeout(mut self, timeout: Duration) -> Self {
        self.location_timeout = timeout;
        self
    }

    pub fn places(&self) -> &[Place] {
        &self.places
    }

    pub fn get(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }

    pub fn geo_place(&self) -> Option<&Place> {
        self.places.iter().find(|p| p.is_geo)
    }

    pub fn geocoder(&self) -> &GeocodingClient {
        &self.geocoder
    }

    pub fn view(&mut self) -> &mut dyn PlaceView {
        self.view.as_mut()
    }

    /// Push the whole list and the location header to the view.
    pub fn render_all(&mut self) {
        for (index, place) in self.places.iter().enumerate() {
            self.view.place_added(place, index);
        }
        let header = self.places.iter().find(|p| p.is_geo).map(|p| p.display_name.as_str());
        self.view.location_header(header);
    }

    /// Add a city from the add form.
    ///
    /// Uses `pick` when its display name equals the trimmed input, otherwise
    /// the top geocoding result for the input. Loads the new place's forecast
    /// before returning its id.
    ///
    /// # Errors
    /// `EmptyQuery`, `NotFound`, `Duplicate` or `NetworkFailure`; the list is
    /// unchanged in every error case.
    pub async fn add_from_pick(
        &mut self,
        input: &str,
        pick: Option<&Suggestion>,
    ) -> Result<String, PlaceError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(PlaceError::EmptyQuery);
        }

        let candidate = match pick.filter(|p| p.display_name() == query) {
            Some(pick) => pick.clone(),
            None => self
                .geocoder
                .search(query, 1)
                .await
                .map_err(PlaceErrorExt::into_place_error)?
                .into_iter()
                .next()
                .ok_or_else(|| PlaceError::NotFound(query.to_string()))?,
        };

        self.check_duplicate(&candidate)?;

        let place = Place::from_suggestion(&candidate);
        let id = place.id.clone();
        tracing::info!("Adding place {} ({})", place.display_name, id);
        self.places.push(place);
        self.persist();

        let index = self.places.len() - 1;
        self.view.place_added(&self.places[index], index);

        self.load_forecast(&id).await;
        Ok(id)
    }

    fn check_duplicate(&self, candidate: &Suggestion) -> Result<(), PlaceError> {
        if let Some(existing) = self
            .places
            .iter()
            .find(|p| p.same_coords(candidate.latitude, candidate.longitude))
        {
            return Err(PlaceError::Duplicate(existing.display_name.clone()));
        }

        let label = candidate.display_name().to_lowercase();
        if let Some(existing) = self
            .places
            .iter()
            .find(|p| !p.is_geo && p.display_name.to_lowercase() == label)
        {
            return Err(PlaceError::Duplicate(existing.display_name.clone()));
        }

        Ok(())
    }

    /// Remove a place. Returns false when no place has this id.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.places.iter().position(|p| p.id == id) else {
            tracing::debug!("Remove ignored, no place {}", id);
            return false;
        };

        let removed = self.places.remove(index);
        tracing::info!("Removed place {} ({})", removed.display_name, removed.id);
        self.persist();

        self.view.place_removed(id);
        if removed.is_geo {
            self.view.location_header(None);
        }
        true
    }

    /// Create or move the geo place to the current device position.
    ///
    /// A position on top of a manually added city leaves the list unchanged.
    /// Returns the geo place's id, or `Ok(None)` when the position could not
    /// be used and `show_errors` is false.
    ///
    /// # Errors
    /// `PermissionDenied`, `PositionUnavailable` or `Duplicate`, only when
    /// `show_errors`.
    pub async fn upsert_geo(&mut self, show_errors: bool) -> Result<Option<String>, PlaceError> {
        let location = match self.locator.current_location(self.location_timeout).await {
            Ok(location) => location,
            Err(e) => {
                let err = e.into_place_error();
                if show_errors {
                    tracing::warn!("Position lookup failed: {}", err);
                    return Err(err);
                }
                tracing::debug!("Silent position lookup failed: {}", err);
                return Ok(None);
            }
        };

        if let Some(city) = self
            .places
            .iter()
            .find(|p| !p.is_geo && p.same_coords(location.latitude, location.longitude))
        {
            let err = PlaceError::Duplicate(city.display_name.clone());
            if show_errors {
                tracing::warn!("Position matches a tracked city: {}", err);
                return Err(err);
            }
            tracing::debug!("Position matches a tracked city: {}", err);
            return Ok(None);
        }

        let label = self
            .geocoder
            .label_for(&location)
            .await
            .unwrap_or_else(|| CURRENT_LOCATION_LABEL.to_string());

        let id = match self.places.iter_mut().find(|p| p.is_geo) {
            Some(geo) => {
                geo.lat = Some(location.latitude);
                geo.lon = Some(location.longitude);
                geo.name = short_name(&label);
                geo.display_name = label.clone();
                self.view.place_updated(geo);
                geo.id.clone()
            }
            None => {
                let place = Place::geo(location.latitude, location.longitude, &label);
                let id = place.id.clone();
                self.places.insert(0, place);
                self.view.place_added(&self.places[0], 0);
                id
            }
        };

        tracing::info!("Current location set to {}", label);
        self.persist();
        self.view.location_header(Some(&label));

        self.load_forecast(&id).await;
        Ok(Some(id))
    }

    /// Reload every forecast, one place at a time in list order.
    pub async fn refresh_all(&mut self) {
        self.refresh_except(None).await;
    }

    /// Like `refresh_all`, skipping the place with id `skip`.
    pub async fn refresh_except(&mut self, skip: Option<&str>) {
        let ids: Vec<String> = self
            .places
            .iter()
            .map(|p| p.id.clone())
            .filter(|id| Some(id.as_str()) != skip)
            .collect();

        for id in ids {
            self.load_forecast(&id).await;
        }
    }

    /// Load one place's forecast into its card. Failures only affect this
    /// card.
    pub async fn load_forecast(&mut self, id: &str) {
        self.view.card_state(id, &CardState::Loading);

        let state = match self.populate(id).await {
            Ok(lines) => CardState::Rendered(lines),
            Err(e) => {
                tracing::warn!("Forecast for {} failed: {}", id, e);
                CardState::Errored(e.user_message().to_string())
            }
        };

        self.view.card_state(id, &state);
    }

    async fn populate(&mut self, id: &str) -> Result<Vec<ForecastLine>, PlaceError> {
        let coords = self
            .get(id)
            .ok_or_else(|| PlaceError::NotFound(id.to_string()))?
            .coords();

        let (lat, lon) = match coords {
            Some(coords) => coords,
            None => self.resolve_coords(id).await?,
        };

        let days = self
            .forecasts
            .fetch_daily(lat, lon)
            .await
            .map_err(PlaceErrorExt::into_place_error)?;

        if days.is_empty() {
            return Err(PlaceError::NetworkFailure("forecast has no days".to_string()));
        }

        Ok(forecast_lines(&days, self.unit))
    }

    /// Geocode a place known only by name and store the result on it.
    async fn resolve_coords(&mut self, id: &str) -> Result<(f64, f64), PlaceError> {
        let name = self
            .get(id)
            .map(|p| p.name.clone())
            .ok_or_else(|| PlaceError::NotFound(id.to_string()))?;

        let hit = self
            .geocoder
            .search(&name, 1)
            .await
            .map_err(PlaceErrorExt::into_place_error)?
            .into_iter()
            .next()
            .ok_or_else(|| PlaceError::NotFound(name.clone()))?;

        if let Some(other) = self
            .places
            .iter()
            .find(|p| p.id != id && p.same_coords(hit.latitude, hit.longitude))
        {
            return Err(PlaceError::Duplicate(other.display_name.clone()));
        }

        if let Some(place) = self.places.iter_mut().find(|p| p.id == id) {
            place.lat = Some(hit.latitude);
            place.lon = Some(hit.longitude);
        }
        tracing::info!("Resolved {} to {}, {}", name, hit.latitude, hit.longitude);
        self.persist();

        Ok((hit.latitude, hit.longitude))
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.places) {
            let hint = e
                .downcast_ref::<StorageError>()
                .map_or("Saved places could not be updated.", StorageError::user_message);
            tracing::warn!("{} {:#}", hint, e);
        }
    }
}

//! Alert aggregator
//!
//! Orchestrates the weather and market sources, the alert rules and the
//! recommendation generator for one subject or a whole fleet, and drives the
//! dispatcher when warnings are found.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, FixedOffset, Utc};
use uuid::Uuid;

use shared::models::{
    sort_by_severity, Alert, AlertNotification, CropPrice, FleetAlerts, FleetSummary,
    LocationWeather, MarketSnapshot, MspRecord, NotificationStatistics, Subject,
    SubjectMarketView, SubjectOverview, SubjectSummary, WeatherSnapshot,
};
use shared::{recommendations, rules, validation, MessageCategory};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::external::{bounded, MarketSource, WeatherSource};
use crate::services::alert_session;
use crate::services::dispatcher::{BulkDispatchReport, NotificationDispatcher, Recipient};
use crate::store::{AlertSessionStore, NotificationLog, SubjectStore};

/// Window covered by the "last 7 days" statistic
const STATISTICS_WINDOW_DAYS: i64 = 7;

/// Entries per ranking on the fleet dashboard
const DASHBOARD_TOP_N: i64 = 5;

/// Tunables taken from configuration
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub source_timeout: Duration,
    pub major_locations: Vec<String>,
    pub dedupe_dispatch: bool,
    pub local_offset: FixedOffset,
    pub recent_limit: i64,
}

impl AggregatorSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            source_timeout: config.sources.timeout(),
            major_locations: config.alerts.major_locations.clone(),
            dedupe_dispatch: config.alerts.dedupe_dispatch,
            local_offset: config.alerts.local_offset(),
            recent_limit: config.statistics.recent_limit,
        }
    }
}

/// Who a bulk dispatch goes to
#[derive(Debug, Clone, PartialEq)]
pub enum BulkCriteria {
    SubjectIds(Vec<Uuid>),
    Location { pincode: String, crop: Option<String> },
}

/// Persistence collaborators the aggregator reads and writes through
#[derive(Clone)]
pub struct Stores {
    pub subjects: Arc<dyn SubjectStore>,
    pub notifications: Arc<dyn NotificationLog>,
    pub sessions: Arc<dyn AlertSessionStore>,
}

/// Alert aggregator service
#[derive(Clone)]
pub struct AlertAggregator {
    stores: Stores,
    weather: Arc<dyn WeatherSource>,
    market: Arc<dyn MarketSource>,
    dispatcher: NotificationDispatcher,
    settings: AggregatorSettings,
}

impl AlertAggregator {
    pub fn new(
        stores: Stores,
        weather: Arc<dyn WeatherSource>,
        market: Arc<dyn MarketSource>,
        dispatcher: NotificationDispatcher,
        settings: AggregatorSettings,
    ) -> Self {
        Self {
            stores,
            weather,
            market,
            dispatcher,
            settings,
        }
    }

    // ========================================================================
    // Source access
    // ========================================================================

    async fn load_subject(&self, subject_id: Uuid) -> AppResult<Subject> {
        self.stores
            .subjects
            .get(subject_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Farmer".to_string()))
    }

    async fn fetch_weather(&self, location: &str) -> AppResult<WeatherSnapshot> {
        bounded(
            self.settings.source_timeout,
            "weather lookup",
            self.weather.get_weather(location),
        )
        .await
    }

    /// Market price and MSP for the subject's crop; failures degrade to absent
    async fn fetch_market(&self, subject: &Subject) -> (Option<MarketSnapshot>, Option<MspRecord>) {
        let timeout = self.settings.source_timeout;

        let market = bounded(
            timeout,
            "market lookup",
            self.market.get_market(&subject.pincode, &subject.crop_name),
        )
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(subject_id = %subject.id, error = %e, "Market data unavailable");
            None
        });

        let msp = bounded(timeout, "MSP lookup", self.market.get_msp(&subject.crop_name))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(crop = %subject.crop_name, error = %e, "MSP data unavailable");
                None
            });

        (market, msp)
    }

    // ========================================================================
    // Single-subject mode
    // ========================================================================

    /// Personal dashboard: weather, market, alerts and recommendations.
    ///
    /// When any warning fires, one consolidated "Weather Alert" notification
    /// is dispatched, at most once per alert session when dedupe is enabled.
    #[tracing::instrument(skip(self))]
    pub async fn evaluate_for_subject(&self, subject_id: Uuid) -> AppResult<SubjectOverview> {
        let subject = self.load_subject(subject_id).await?;
        let weather = self.fetch_weather(&subject.pincode).await?;
        let (market, msp) = self.fetch_market(&subject).await;

        let weather_alerts = rules::weather_alerts(&weather.current);
        let market_alerts = rules::market_alerts(market.as_ref(), msp.as_ref());

        let mut alerts: Vec<Alert> = weather_alerts
            .iter()
            .chain(market_alerts.iter())
            .cloned()
            .collect();
        sort_by_severity(&mut alerts);

        let recommendations = recommendations::generate(
            &weather.current,
            market.as_ref(),
            msp.as_ref(),
            subject.soil_health,
        );
        let farming = recommendations::crop_insights(&weather.current, &subject);

        // Discovery order: weather warnings first, then market warnings
        let warnings: Vec<Alert> = weather_alerts
            .iter()
            .chain(market_alerts.iter())
            .filter(|a| a.is_warning())
            .cloned()
            .collect();
        let notification = self.notify_warnings(&subject, &warnings).await?;

        Ok(SubjectOverview {
            farmer: SubjectSummary::from(&subject),
            market: CropPrice::new(&subject.crop_name, market.as_ref(), msp.as_ref()),
            weather,
            weather_alerts,
            market_alerts,
            alerts,
            recommendations,
            farming,
            notification,
        })
    }

    async fn notify_warnings(
        &self,
        subject: &Subject,
        warnings: &[Alert],
    ) -> AppResult<AlertNotification> {
        if warnings.is_empty() {
            return Ok(AlertNotification::NotRequired);
        }

        let mut session = None;
        if self.settings.dedupe_dispatch {
            let today = Utc::now().with_timezone(&self.settings.local_offset).date_naive();
            let fingerprint = alert_session::fingerprint(subject.id, today, warnings);
            let claimed = self
                .stores
                .sessions
                .claim(&fingerprint, subject.id, today)
                .await?;
            if !claimed {
                tracing::debug!(subject_id = %subject.id, "Alert session already notified");
                return Ok(AlertNotification::AlreadySent { fingerprint });
            }
            session = Some((fingerprint, today));
        }

        let message = alert_message(warnings);
        let outcome = self
            .dispatcher
            .dispatch_to(subject, &message, MessageCategory::WeatherAlert)
            .await;

        // A failed dispatch must not suppress the next evaluation
        if let Some((fingerprint, day)) = session.filter(|_| !outcome.success) {
            if let Err(e) = self.stores.sessions.release(&fingerprint, day).await {
                tracing::warn!(subject_id = %subject.id, error = %e, "Failed to release alert session");
            }
        }
        Ok(AlertNotification::Dispatched { outcome })
    }

    /// Weather for the subject's location with its alerts
    #[tracing::instrument(skip(self))]
    pub async fn weather_for_subject(&self, subject_id: Uuid) -> AppResult<LocationWeather> {
        let subject = self.load_subject(subject_id).await?;
        let weather = self.fetch_weather(&subject.pincode).await?;
        Ok(location_weather(weather))
    }

    /// Current crop price against MSP plus the top crops in the area
    #[tracing::instrument(skip(self))]
    pub async fn market_for_subject(&self, subject_id: Uuid) -> AppResult<SubjectMarketView> {
        let subject = self.load_subject(subject_id).await?;
        let (market, msp) = self.fetch_market(&subject).await;

        let top_crops_in_area = bounded(
            self.settings.source_timeout,
            "top crops lookup",
            self.market.get_top_crops(&subject.pincode),
        )
        .await
        .unwrap_or_else(|e| {
            tracing::warn!(location = %subject.pincode, error = %e, "Top crops unavailable");
            Vec::new()
        });

        Ok(SubjectMarketView {
            current_crop: CropPrice::new(&subject.crop_name, market.as_ref(), msp.as_ref()),
            top_crops_in_area,
        })
    }

    // ========================================================================
    // Fleet / admin mode
    // ========================================================================

    /// Weather and alerts for any location
    #[tracing::instrument(skip(self))]
    pub async fn weather_for_location(&self, pincode: &str) -> AppResult<LocationWeather> {
        validation::validate_pincode(pincode).map_err(|m| AppError::validation("pincode", m))?;
        let weather = self.fetch_weather(pincode).await?;
        Ok(location_weather(weather))
    }

    /// Alerts across locations, severity-ordered.
    ///
    /// With a pincode: that location's weather alerts plus low-price alerts
    /// for its top crops. Without: weather alerts for every major location.
    /// A location whose data cannot be fetched is skipped, not fatal.
    #[tracing::instrument(skip(self))]
    pub async fn evaluate_fleet_alerts(&self, pincode: Option<&str>) -> AppResult<FleetAlerts> {
        let mut alerts = Vec::new();
        let mut skipped_locations = Vec::new();

        match pincode {
            Some(pincode) => {
                validation::validate_pincode(pincode)
                    .map_err(|m| AppError::validation("pincode", m))?;

                match self.fetch_weather(pincode).await {
                    Ok(weather) => alerts.extend(tagged_weather_alerts(&weather, pincode)),
                    Err(e) => {
                        tracing::warn!(location = %pincode, error = %e, "Skipping weather alerts");
                        skipped_locations.push(pincode.to_string());
                    }
                }
                alerts.extend(self.top_crop_alerts(pincode).await);
            }
            None => {
                for location in &self.settings.major_locations {
                    match self.fetch_weather(location).await {
                        Ok(weather) => alerts.extend(tagged_weather_alerts(&weather, location)),
                        Err(e) => {
                            tracing::warn!(location = %location, error = %e, "Skipping location");
                            skipped_locations.push(location.clone());
                        }
                    }
                }
            }
        }

        sort_by_severity(&mut alerts);

        Ok(FleetAlerts {
            total_alerts: alerts.len(),
            alerts,
            skipped_locations,
            timestamp: Utc::now(),
        })
    }

    async fn top_crop_alerts(&self, pincode: &str) -> Vec<Alert> {
        let timeout = self.settings.source_timeout;
        let top_crops = match bounded(timeout, "top crops lookup", self.market.get_top_crops(pincode))
            .await
        {
            Ok(crops) => crops,
            Err(e) => {
                tracing::warn!(location = %pincode, error = %e, "Skipping market alerts");
                return Vec::new();
            }
        };

        let mut alerts = Vec::new();
        for crop in &top_crops {
            let msp = match bounded(timeout, "MSP lookup", self.market.get_msp(&crop.name)).await {
                Ok(msp) => msp,
                Err(e) => {
                    tracing::warn!(crop = %crop.name, error = %e, "MSP data unavailable");
                    continue;
                }
            };
            if let Some(alert) = rules::top_crop_alert(crop, msp.as_ref()) {
                alerts.push(alert.at(pincode));
            }
        }
        alerts
    }

    /// Resolve the recipients and dispatch one message to each, in order
    #[tracing::instrument(skip(self, message))]
    pub async fn dispatch_bulk(
        &self,
        criteria: &BulkCriteria,
        message: &str,
        category: MessageCategory,
    ) -> AppResult<BulkDispatchReport> {
        validation::validate_message(message).map_err(|m| AppError::validation("message", m))?;

        let not_found = || AppError::NotFound("Farmers for the given criteria".to_string());

        let recipients = match criteria {
            BulkCriteria::SubjectIds(ids) if ids.is_empty() => {
                return Err(AppError::validation(
                    "farmer_ids",
                    "Either farmer IDs or pincode is required",
                ));
            }
            BulkCriteria::SubjectIds(ids) => {
                let found = self.stores.subjects.find_by_ids(ids).await?;
                if found.is_empty() {
                    return Err(not_found());
                }
                if found.len() < ids.len() {
                    tracing::warn!(
                        requested = ids.len(),
                        found = found.len(),
                        "Some farmer ids did not resolve"
                    );
                }
                Recipient::resolve(ids, found)
            }
            BulkCriteria::Location { pincode, crop } => {
                validation::validate_pincode(pincode)
                    .map_err(|m| AppError::validation("pincode", m))?;
                let found = self
                    .stores
                    .subjects
                    .find_by_location(pincode, crop.as_deref())
                    .await?;
                if found.is_empty() {
                    return Err(not_found());
                }
                found.into_iter().map(Recipient::Subject).collect::<Vec<_>>()
            }
        };

        Ok(self.dispatcher.dispatch_bulk(&recipients, message, category).await)
    }

    /// Dispatch totals, success rate, category counts and recent records
    #[tracing::instrument(skip(self))]
    pub async fn notification_statistics(&self) -> AppResult<NotificationStatistics> {
        let since = Utc::now() - ChronoDuration::days(STATISTICS_WINDOW_DAYS);
        let summary = self.stores.notifications.summarize(since).await?;
        let recent = self
            .stores
            .notifications
            .recent(self.settings.recent_limit)
            .await?;

        Ok(NotificationStatistics::from_summary(summary, recent))
    }

    /// Registration totals, newest farmers and the most common crops and pincodes
    #[tracing::instrument(skip(self))]
    pub async fn fleet_summary(&self) -> AppResult<FleetSummary> {
        let census = self.stores.subjects.census(DASHBOARD_TOP_N).await?;
        Ok(FleetSummary::from_census(census, Utc::now()))
    }
}

fn location_weather(weather: WeatherSnapshot) -> LocationWeather {
    let alerts = rules::weather_alerts(&weather.current);
    LocationWeather {
        weather,
        alerts,
        timestamp: Utc::now(),
    }
}

fn tagged_weather_alerts(weather: &WeatherSnapshot, location: &str) -> Vec<Alert> {
    rules::weather_alerts(&weather.current)
        .into_iter()
        .map(|alert| alert.at(location))
        .collect()
}

/// Consolidated text of every warning, in discovery order
pub fn alert_message(warnings: &[Alert]) -> String {
    let body: Vec<&str> = warnings
        .iter()
        .filter(|a| a.is_warning())
        .map(|a| a.message.as_str())
        .collect();
    format!("Alert: {}", body.join(" "))
}
